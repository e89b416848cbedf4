use crate::errors::{DomainError, DomainResult};
use crate::events::{DomainEvent, TodoEvent};
use crate::subtask::{SubTaskData, SubTaskEntity};
use crate::value_objects::{CompletionRate, DueDate, Priority, SubTaskId, TodoId, TodoStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const TITLE_MAX_LENGTH: usize = 200;
pub const DESCRIPTION_MAX_LENGTH: usize = 2000;

/// Todo 作成時の入力
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodoData {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DueDate>,
    pub user_id: String,
}

/// 保存済み Todo の復元用データ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoData {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TodoStatus,
    pub due_date: Option<DueDate>,
    pub user_id: String,
    pub sub_tasks: Vec<SubTaskData>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_title(title: &str) -> DomainResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("Title cannot be empty".to_string()));
    }
    if trimmed.chars().count() > TITLE_MAX_LENGTH {
        return Err(DomainError::Validation(format!(
            "Title cannot exceed {TITLE_MAX_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// 空白のみの説明は None として扱う
fn validate_description(description: Option<&str>) -> DomainResult<Option<String>> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        return Err(DomainError::Validation(format!(
            "Description cannot exceed {DESCRIPTION_MAX_LENGTH} characters"
        )));
    }
    Ok(Some(description.to_string()))
}

/// Todo 集約ルート
///
/// サブタスクのライフサイクルとステータス遷移を管理し、変更ごとにドメインイベントを1件記録する。
/// 失敗した操作は状態を一切変更しない。
#[derive(Debug, Clone)]
pub struct TodoEntity {
    id: TodoId,
    title: String,
    description: Option<String>,
    priority: Priority,
    status: TodoStatus,
    due_date: Option<DueDate>,
    user_id: UserId,
    sub_tasks: Vec<SubTaskEntity>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    uncommitted_events: Vec<DomainEvent>,
}

impl TodoEntity {
    /// 新しい Todo を作成し、`TodoCreated` を記録する
    pub fn create(data: CreateTodoData) -> DomainResult<Self> {
        let title = validate_title(&data.title)?;
        let description = validate_description(data.description.as_deref())?;
        let user_id = UserId::from_string(data.user_id)?;
        let priority = data.priority.unwrap_or_default();
        let now = Utc::now();

        let mut todo = Self {
            id: TodoId::generate(),
            title,
            description,
            priority,
            status: TodoStatus::Pending,
            due_date: data.due_date,
            user_id,
            sub_tasks: Vec::new(),
            completed_at: None,
            created_at: now,
            updated_at: now,
            uncommitted_events: Vec::new(),
        };

        todo.record(
            TodoEvent::TodoCreated {
                title: todo.title.clone(),
                priority,
                status: TodoStatus::Pending,
            },
            now,
        );
        Ok(todo)
    }

    /// 保存済みデータから復元（イベントは記録しない）
    pub fn from_data(data: TodoData) -> DomainResult<Self> {
        let id = TodoId::from_string(data.id)?;
        let title = validate_title(&data.title)?;
        let description = validate_description(data.description.as_deref())?;
        let user_id = UserId::from_string(data.user_id)?;

        let mut sub_tasks = data
            .sub_tasks
            .into_iter()
            .map(SubTaskEntity::from_data)
            .collect::<DomainResult<Vec<_>>>()?;
        if let Some(foreign) = sub_tasks.iter().find(|task| task.todo_id() != &id) {
            return Err(DomainError::Validation(format!(
                "SubTask {} belongs to todo {}, not {}",
                foreign.id(),
                foreign.todo_id(),
                id
            )));
        }

        // order は 0..n-1 の連番に揃える
        sub_tasks.sort_by_key(|task| task.order());
        let contiguous = (0u32..).zip(sub_tasks.iter()).all(|(order, task)| task.order() == order);
        if !contiguous {
            warn!(todo_id = %id, "renumbering non-contiguous sub task orders");
            for (order, task) in (0u32..).zip(sub_tasks.iter_mut()) {
                task.restore_order(order);
            }
        }

        // completed_at は COMPLETED のときだけ値を持つ
        let completed_at = match (data.status, data.completed_at) {
            (TodoStatus::Completed, Some(at)) => Some(at),
            (TodoStatus::Completed, None) => {
                warn!(todo_id = %id, "completed todo without completed_at, using updated_at");
                Some(data.updated_at)
            }
            (status, Some(_)) => {
                warn!(todo_id = %id, %status, "dropping completed_at of unfinished todo");
                None
            }
            (_, None) => None,
        };

        Ok(Self {
            id,
            title,
            description,
            priority: data.priority,
            status: data.status,
            due_date: data.due_date,
            user_id,
            sub_tasks,
            completed_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
            uncommitted_events: Vec::new(),
        })
    }

    pub fn to_data(&self) -> TodoData {
        TodoData {
            id: self.id.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.status,
            due_date: self.due_date,
            user_id: self.user_id.to_string(),
            sub_tasks: self.sub_tasks.iter().map(SubTaskEntity::to_data).collect(),
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> &TodoId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> TodoStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<DueDate> {
        self.due_date
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn sub_tasks(&self) -> &[SubTaskEntity] {
        &self.sub_tasks
    }

    pub fn sub_task(&self, sub_task_id: &SubTaskId) -> Option<&SubTaskEntity> {
        self.sub_tasks.iter().find(|task| task.id() == sub_task_id)
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    // --- サブタスク ---

    pub fn add_sub_task(&mut self, title: &str) -> DomainResult<&SubTaskEntity> {
        let order = u32::try_from(self.sub_tasks.len())
            .map_err(|_| DomainError::Validation("Too many subtasks".to_string()))?;
        let sub_task = SubTaskEntity::create(title, order, self.id.clone())?;
        let now = Utc::now();

        let event = TodoEvent::SubTaskAdded {
            sub_task_id: sub_task.id().clone(),
            title: sub_task.title().to_string(),
            order,
        };
        self.sub_tasks.push(sub_task);
        self.updated_at = now;
        self.record(event, now);

        Ok(&self.sub_tasks[self.sub_tasks.len() - 1])
    }

    /// サブタスクを削除し、残りを 0..n-1 に振り直す
    pub fn remove_sub_task(&mut self, sub_task_id: &SubTaskId) -> DomainResult<()> {
        let index = self.sub_task_index(sub_task_id)?;
        let removed = self.sub_tasks.remove(index);

        for (order, task) in (0u32..).zip(self.sub_tasks.iter_mut()) {
            task.set_order(order);
        }

        let now = Utc::now();
        self.updated_at = now;
        self.record(
            TodoEvent::SubTaskRemoved {
                sub_task_id: removed.id().clone(),
                title: removed.title().to_string(),
            },
            now,
        );
        Ok(())
    }

    pub fn update_sub_task_title(&mut self, sub_task_id: &SubTaskId, title: &str) -> DomainResult<()> {
        let index = self.sub_task_index(sub_task_id)?;
        let task = &mut self.sub_tasks[index];
        let old_title = task.title().to_string();
        task.update_title(title)?;
        let new_title = task.title().to_string();

        let now = Utc::now();
        self.updated_at = now;
        self.record(
            TodoEvent::SubTaskTitleUpdated {
                sub_task_id: sub_task_id.clone(),
                old_title,
                new_title,
            },
            now,
        );
        Ok(())
    }

    pub fn complete_sub_task(&mut self, sub_task_id: &SubTaskId) -> DomainResult<()> {
        let index = self.sub_task_index(sub_task_id)?;
        self.sub_tasks[index].mark_as_completed();
        self.record_sub_task_completion(index);
        Ok(())
    }

    pub fn toggle_sub_task_completion(&mut self, sub_task_id: &SubTaskId) -> DomainResult<()> {
        let index = self.sub_task_index(sub_task_id)?;
        self.sub_tasks[index].toggle_completion();
        self.record_sub_task_completion(index);
        Ok(())
    }

    pub fn completed_sub_task_count(&self) -> usize {
        self.sub_tasks.iter().filter(|task| task.is_completed()).count()
    }

    // --- ステータス ---

    pub fn mark_as_completed(&mut self) -> DomainResult<()> {
        let now = self.transition_to(TodoStatus::Completed)?;
        self.record(TodoEvent::TodoCompleted { completed_at: now }, now);
        Ok(())
    }

    pub fn mark_as_in_progress(&mut self) -> DomainResult<()> {
        let now = self.transition_to(TodoStatus::InProgress)?;
        self.record(TodoEvent::TodoStarted { started_at: now }, now);
        Ok(())
    }

    pub fn mark_as_cancelled(&mut self) -> DomainResult<()> {
        let now = self.transition_to(TodoStatus::Cancelled)?;
        self.record(TodoEvent::TodoCancelled { cancelled_at: now }, now);
        Ok(())
    }

    /// 完了・キャンセル済みの Todo を PENDING に戻す
    pub fn reopen(&mut self) -> DomainResult<()> {
        if !self.status.is_finished() {
            return Err(DomainError::InvalidStatusTransition(
                "Only completed or cancelled todos can be reopened".to_string(),
            ));
        }

        let now = Utc::now();
        self.status = TodoStatus::Pending;
        self.completed_at = None;
        self.updated_at = now;
        self.record(TodoEvent::TodoReopened { reopened_at: now }, now);
        Ok(())
    }

    // --- 属性の更新 ---

    pub fn update_title(&mut self, title: &str) -> DomainResult<()> {
        let new_title = validate_title(title)?;
        let now = Utc::now();
        let old_title = std::mem::replace(&mut self.title, new_title.clone());
        self.updated_at = now;
        self.record(TodoEvent::TodoTitleUpdated { old_title, new_title }, now);
        Ok(())
    }

    pub fn update_description(&mut self, description: Option<&str>) -> DomainResult<()> {
        let new_description = validate_description(description)?;
        let now = Utc::now();
        let old_description = std::mem::replace(&mut self.description, new_description.clone());
        self.updated_at = now;
        self.record(
            TodoEvent::TodoDescriptionUpdated {
                old_description,
                new_description,
            },
            now,
        );
        Ok(())
    }

    pub fn update_priority(&mut self, priority: Priority) {
        let now = Utc::now();
        let old_priority = std::mem::replace(&mut self.priority, priority);
        self.updated_at = now;
        self.record(
            TodoEvent::TodoPriorityUpdated {
                old_priority,
                new_priority: priority,
            },
            now,
        );
    }

    /// 期限日を変更する（None で期限なし）
    pub fn update_due_date(&mut self, due_date: Option<DueDate>) {
        let now = Utc::now();
        let old_due_date = std::mem::replace(&mut self.due_date, due_date);
        self.updated_at = now;
        self.record(
            TodoEvent::TodoDueDateUpdated {
                old_due_date,
                new_due_date: due_date,
            },
            now,
        );
    }

    // --- 問い合わせ ---

    /// 完了率: COMPLETED なら 100%、サブタスクなしなら 0%、それ以外は完了サブタスクの割合
    pub fn completion_rate(&self) -> CompletionRate {
        if self.status.is_completed() {
            return CompletionRate::complete();
        }
        if self.sub_tasks.is_empty() {
            return CompletionRate::zero();
        }
        let completed = self.completed_sub_task_count() as f64;
        CompletionRate::clamped(completed / self.sub_tasks.len() as f64 * 100.0)
    }

    pub fn is_overdue(&self) -> bool {
        if self.status.is_finished() {
            return false;
        }
        self.due_date.is_some_and(|due| due.is_overdue())
    }

    pub fn is_due_today(&self) -> bool {
        self.due_date.is_some_and(|due| due.is_today())
    }

    pub fn is_due_within_days(&self, days: u32) -> bool {
        self.due_date.is_some_and(|due| due.is_within_days(days))
    }

    /// タイトルまたは説明の部分一致（大文字小文字を区別しない）
    pub fn matches_search_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return false;
        }
        self.title.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }

    // --- イベント ---

    pub fn uncommitted_events(&self) -> &[DomainEvent] {
        &self.uncommitted_events
    }

    /// 未コミットのイベントを取り出して空にする
    pub fn clear_uncommitted_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    fn sub_task_index(&self, sub_task_id: &SubTaskId) -> DomainResult<usize> {
        self.sub_tasks
            .iter()
            .position(|task| task.id() == sub_task_id)
            .ok_or_else(|| DomainError::SubTaskNotFound(sub_task_id.to_string()))
    }

    fn record_sub_task_completion(&mut self, index: usize) {
        let task = &self.sub_tasks[index];
        let event = TodoEvent::SubTaskCompletionChanged {
            sub_task_id: task.id().clone(),
            is_completed: task.is_completed(),
        };
        let now = Utc::now();
        self.updated_at = now;
        self.record(event, now);
    }

    fn transition_to(&mut self, target: TodoStatus) -> DomainResult<DateTime<Utc>> {
        self.status.validate_transition(target)?;

        let now = Utc::now();
        self.status = target;
        self.completed_at = target.is_completed().then_some(now);
        self.updated_at = now;
        Ok(now)
    }

    fn record(&mut self, event: TodoEvent, occurred_at: DateTime<Utc>) {
        self.uncommitted_events
            .push(DomainEvent::new(self.id.clone(), event, occurred_at));
    }
}

impl PartialEq for TodoEntity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TodoEntity {}
