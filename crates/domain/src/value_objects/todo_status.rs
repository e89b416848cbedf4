use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Todo のステータス
///
/// 遷移表:
/// - PENDING     → IN_PROGRESS / COMPLETED / CANCELLED
/// - IN_PROGRESS → PENDING / COMPLETED / CANCELLED
/// - COMPLETED   → なし（終端）
/// - CANCELLED   → なし（終端）
///
/// 同一ステータスへの遷移は終端状態を含め常に許可される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 4] = [
        TodoStatus::Pending,
        TodoStatus::InProgress,
        TodoStatus::Completed,
        TodoStatus::Cancelled,
    ];

    /// 自身以外への遷移先
    pub fn allowed_transitions(&self) -> &'static [TodoStatus] {
        match self {
            TodoStatus::Pending => &[
                TodoStatus::InProgress,
                TodoStatus::Completed,
                TodoStatus::Cancelled,
            ],
            TodoStatus::InProgress => &[
                TodoStatus::Pending,
                TodoStatus::Completed,
                TodoStatus::Cancelled,
            ],
            TodoStatus::Completed | TodoStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: TodoStatus) -> bool {
        *self == target || self.allowed_transitions().contains(&target)
    }

    /// 遷移を検証し、違反の種類ごとに異なるメッセージを返す
    pub fn validate_transition(&self, target: TodoStatus) -> DomainResult<()> {
        if self.can_transition_to(target) {
            return Ok(());
        }

        let message = match (self, target) {
            (TodoStatus::Completed, TodoStatus::Cancelled) => {
                "Cannot cancel a completed todo".to_string()
            }
            (TodoStatus::Cancelled, _) => "Cannot change the status of a cancelled todo".to_string(),
            (from, to) => format!("Invalid status transition: {from} -> {to}"),
        };
        Err(DomainError::InvalidStatusTransition(message))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TodoStatus::Pending)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, TodoStatus::InProgress)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TodoStatus::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TodoStatus::Cancelled)
    }

    /// 未完了（PENDING または IN_PROGRESS）
    pub fn is_active(&self) -> bool {
        matches!(self, TodoStatus::Pending | TodoStatus::InProgress)
    }

    /// 終了済み（COMPLETED または CANCELLED）
    pub fn is_finished(&self) -> bool {
        matches!(self, TodoStatus::Completed | TodoStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "PENDING",
            TodoStatus::InProgress => "IN_PROGRESS",
            TodoStatus::Completed => "COMPLETED",
            TodoStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "未着手",
            TodoStatus::InProgress => "進行中",
            TodoStatus::Completed => "完了",
            TodoStatus::Cancelled => "キャンセル",
        }
    }
}

impl FromStr for TodoStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(TodoStatus::Pending),
            "IN_PROGRESS" => Ok(TodoStatus::InProgress),
            "COMPLETED" => Ok(TodoStatus::Completed),
            "CANCELLED" => Ok(TodoStatus::Cancelled),
            _ => Err(DomainError::InvalidStatus(format!("Invalid status: {s}"))),
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
