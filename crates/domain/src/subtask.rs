use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{SubTaskId, TodoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SUB_TASK_TITLE_MAX_LENGTH: usize = 200;

/// 保存済みサブタスクの復元用データ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTaskData {
    pub id: String,
    pub title: String,
    pub order: i64,
    pub is_completed: bool,
    pub todo_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// サブタスク
///
/// 親 Todo に排他的に所有される。等価性は ID のみで判定する。
#[derive(Debug, Clone, Serialize)]
pub struct SubTaskEntity {
    id: SubTaskId,
    title: String,
    order: u32,
    is_completed: bool,
    todo_id: TodoId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_title(title: &str) -> DomainResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(
            "SubTask title cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > SUB_TASK_TITLE_MAX_LENGTH {
        return Err(DomainError::Validation(format!(
            "SubTask title cannot exceed {SUB_TASK_TITLE_MAX_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_order(order: i64) -> DomainResult<u32> {
    u32::try_from(order).map_err(|_| {
        DomainError::Validation(format!("SubTask order must be a non-negative integer: {order}"))
    })
}

impl SubTaskEntity {
    /// 新しいサブタスクを作成（親 Todo からのみ呼ばれる）
    pub(crate) fn create(title: &str, order: u32, todo_id: TodoId) -> DomainResult<Self> {
        let title = validate_title(title)?;
        let now = Utc::now();

        Ok(Self {
            id: SubTaskId::generate(),
            title,
            order,
            is_completed: false,
            todo_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// 保存済みデータから復元
    pub fn from_data(data: SubTaskData) -> DomainResult<Self> {
        Ok(Self {
            id: SubTaskId::from_string(data.id)?,
            title: validate_title(&data.title)?,
            order: validate_order(data.order)?,
            is_completed: data.is_completed,
            todo_id: TodoId::from_string(data.todo_id)?,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    pub fn id(&self) -> &SubTaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn todo_id(&self) -> &TodoId {
        &self.todo_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn update_title(&mut self, title: &str) -> DomainResult<()> {
        self.title = validate_title(title)?;
        self.touch();
        Ok(())
    }

    pub fn update_order(&mut self, order: i64) -> DomainResult<()> {
        self.order = validate_order(order)?;
        self.touch();
        Ok(())
    }

    pub fn mark_as_completed(&mut self) {
        self.is_completed = true;
        self.touch();
    }

    pub fn mark_as_not_completed(&mut self) {
        self.is_completed = false;
        self.touch();
    }

    pub fn toggle_completion(&mut self) {
        self.is_completed = !self.is_completed;
        self.touch();
    }

    /// タイトルの部分一致（大文字小文字を区別しない、空文字は常に不一致）
    pub fn matches_search_term(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        self.title.to_lowercase().contains(&term.to_lowercase())
    }

    pub fn to_data(&self) -> SubTaskData {
        SubTaskData {
            id: self.id.to_string(),
            title: self.title.clone(),
            order: i64::from(self.order),
            is_completed: self.is_completed,
            todo_id: self.todo_id.to_string(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // 並び替えは親が連番を保証するので検証不要
    pub(crate) fn set_order(&mut self, order: u32) {
        if self.order != order {
            self.order = order;
            self.touch();
        }
    }

    // 復元時の正規化用（更新日時は変えない）
    pub(crate) fn restore_order(&mut self, order: u32) {
        self.order = order;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl PartialEq for SubTaskEntity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubTaskEntity {}
