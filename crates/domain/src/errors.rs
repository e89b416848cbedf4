use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Invalid SubTaskId: {0}")]
    InvalidSubTaskId(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    // メッセージ内容で遷移違反の種類を区別する
    #[error("{0}")]
    InvalidStatusTransition(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    #[error("Invalid completion rate: {0}")]
    InvalidCompletionRate(String),

    #[error("SubTask not found: {0}")]
    SubTaskNotFound(String),

    #[error("Event serialization error: {0}")]
    EventSerialization(String),

    #[error("Event deserialization error: {0}")]
    EventDeserialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_message_is_passed_through() {
        let error = DomainError::InvalidStatusTransition("Cannot cancel a completed todo".into());
        assert_eq!(error.to_string(), "Cannot cancel a completed todo");
    }

    #[test]
    fn test_validation_error_message() {
        let error = DomainError::Validation("Title cannot be empty".into());
        assert_eq!(error.to_string(), "Validation error: Title cannot be empty");
    }
}
