use domain::{
    DomainError, DomainEvent, DomainResult, EventRecord, FindOptions, PaginatedResult,
    PaginationOptions, RepositoryError, RepositoryResult, SortDirection, SortOption, TodoData,
    TodoEntity, TodoId, TodoRepository, TodoSortField, TodoSpecification, TodoStatus, UserId,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use shared::Config;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// 仕様を直接評価するインメモリのリポジトリ（開発/テスト用）
///
/// 集約は `TodoData` として保持し、読み出しのたびに `TodoEntity::from_data` で復元する。
pub struct InMemoryTodoRepository {
    todos: Mutex<HashMap<TodoId, TodoData>>,
    // 保存時に受け取ったイベント（アウトボックス観測用）
    outbox: Mutex<Vec<EventRecord>>,
    default_page_size: u32,
    max_page_size: u32,
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            todos: Mutex::new(HashMap::new()),
            outbox: Mutex::new(Vec::new()),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// 設定のページサイズを使う
    pub fn with_config(config: &Config) -> Self {
        Self {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
            ..Self::new()
        }
    }

    /// これまでに保存されたイベント
    pub fn outbox_events(&self) -> RepositoryResult<Vec<EventRecord>> {
        Ok(lock(&self.outbox)?.clone())
    }

    fn load_matching<F>(&self, filter: F) -> RepositoryResult<Vec<TodoEntity>>
    where
        F: Fn(&TodoEntity) -> bool,
    {
        let todos = lock(&self.todos)?;
        let mut matched = Vec::new();
        for data in todos.values() {
            let todo = TodoEntity::from_data(data.clone())?;
            if filter(&todo) {
                matched.push(todo);
            }
        }
        Ok(matched)
    }

    fn resolve_pagination(&self, options: &FindOptions) -> DomainResult<PaginationOptions> {
        match options.pagination {
            Some(pagination) => pagination.revalidate(self.max_page_size),
            None => PaginationOptions::with_max_limit(1, self.default_page_size, self.max_page_size),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> RepositoryResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Storage("in-memory store lock poisoned".to_string()))
}

fn status_rank(status: TodoStatus) -> usize {
    TodoStatus::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or(TodoStatus::ALL.len())
}

fn compare_by(a: &TodoEntity, b: &TodoEntity, sort: &SortOption) -> Ordering {
    let ordering = match sort.field {
        TodoSortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        TodoSortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        // 期限なしは方向に関係なく末尾
        TodoSortField::DueDate => match (a.due_date(), b.due_date()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        TodoSortField::Priority => a.priority().cmp(&b.priority()),
        TodoSortField::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
        TodoSortField::Status => status_rank(a.status()).cmp(&status_rank(b.status())),
    };

    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// ソート指定がなければ作成日時の降順。最後に ID で順序を確定させる。
fn sort_todos(todos: &mut [TodoEntity], sort: &[SortOption]) {
    let default_sort = [SortOption::desc(TodoSortField::CreatedAt)];
    let sort = if sort.is_empty() { &default_sort[..] } else { sort };

    todos.sort_by(|a, b| {
        sort.iter()
            .map(|option| compare_by(a, b, option))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id().cmp(b.id()))
    });
}

fn apply_options(
    mut todos: Vec<TodoEntity>,
    sort: &[SortOption],
    pagination: Option<PaginationOptions>,
) -> Vec<TodoEntity> {
    sort_todos(&mut todos, sort);

    match pagination {
        Some(pagination) => todos
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(pagination.limit() as usize)
            .collect(),
        None => todos,
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn save(&self, todo: &mut TodoEntity) -> RepositoryResult<Vec<DomainEvent>> {
        let records = todo
            .uncommitted_events()
            .iter()
            .map(DomainEvent::to_record)
            .collect::<Result<Vec<_>, DomainError>>()?;

        let mut todos = lock(&self.todos)?;
        let mut outbox = lock(&self.outbox)?;
        todos.insert(todo.id().clone(), todo.to_data());
        outbox.extend(records);

        let events = todo.clear_uncommitted_events();
        info!(
            "Todo を保存しました: todo_id={}, events={}",
            todo.id(),
            events.len()
        );
        Ok(events)
    }

    fn find_by_id(&self, id: &TodoId) -> RepositoryResult<Option<TodoEntity>> {
        let data = lock(&self.todos)?.get(id).cloned();
        data.map(TodoEntity::from_data)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn exists(&self, id: &TodoId) -> RepositoryResult<bool> {
        Ok(lock(&self.todos)?.contains_key(id))
    }

    fn find_by_user_id(
        &self,
        user_id: &UserId,
        options: &FindOptions,
    ) -> RepositoryResult<Vec<TodoEntity>> {
        self.find_by_specification(&TodoSpecification::user_todo(user_id.clone()), options)
    }

    fn find_by_specification(
        &self,
        specification: &TodoSpecification,
        options: &FindOptions,
    ) -> RepositoryResult<Vec<TodoEntity>> {
        let pagination = options
            .pagination
            .map(|pagination| pagination.revalidate(self.max_page_size))
            .transpose()?;
        let matched = self.load_matching(|todo| specification.is_satisfied_by(todo))?;
        debug!(
            "仕様で検索: {} -> {} 件",
            specification.description(),
            matched.len()
        );
        Ok(apply_options(matched, &options.sort, pagination))
    }

    fn count_by_specification(&self, specification: &TodoSpecification) -> RepositoryResult<u64> {
        let matched = self.load_matching(|todo| specification.is_satisfied_by(todo))?;
        Ok(matched.len() as u64)
    }

    fn count_by_user_id(
        &self,
        user_id: &UserId,
        specification: Option<&TodoSpecification>,
    ) -> RepositoryResult<u64> {
        let owned = TodoSpecification::user_todo(user_id.clone());
        let specification = match specification {
            Some(extra) => owned.and(extra.clone()),
            None => owned,
        };
        self.count_by_specification(&specification)
    }

    fn find_with_pagination(
        &self,
        options: &FindOptions,
        specification: Option<&TodoSpecification>,
    ) -> RepositoryResult<PaginatedResult<TodoEntity>> {
        let pagination = self.resolve_pagination(options)?;
        let matched = self.load_matching(|todo| {
            specification.map_or(true, |spec| spec.is_satisfied_by(todo))
        })?;
        let total_count = matched.len() as u64;

        let items = apply_options(matched, &options.sort, Some(pagination));

        debug!(
            "ページング検索: page={}, limit={}, total={}",
            pagination.page(),
            pagination.limit(),
            total_count
        );
        Ok(PaginatedResult::new(items, pagination, total_count))
    }

    fn delete(&self, id: &TodoId) -> RepositoryResult<bool> {
        let removed = lock(&self.todos)?.remove(id).is_some();
        if removed {
            info!("Todo を削除しました: todo_id={}", id);
        }
        Ok(removed)
    }

    fn delete_many(&self, ids: &[TodoId]) -> RepositoryResult<usize> {
        let mut todos = lock(&self.todos)?;
        let removed = ids.iter().filter(|id| todos.remove(*id).is_some()).count();
        info!("Todo を一括削除しました: {} 件", removed);
        Ok(removed)
    }

    fn delete_all_by_user_id(&self, user_id: &UserId) -> RepositoryResult<usize> {
        let mut todos = lock(&self.todos)?;
        let before = todos.len();
        todos.retain(|_, data| data.user_id != user_id.as_str());
        let removed = before - todos.len();
        info!(
            "ユーザーの Todo を全削除しました: user_id={}, {} 件",
            user_id, removed
        );
        Ok(removed)
    }
}
