use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::{Uuid, Variant, Version};

/// ハイフン区切り 36 文字の UUID 表記のみを受け付ける
fn parse_hyphenated_uuid(s: &str) -> Option<Uuid> {
    if s.len() != 36 {
        return None;
    }
    Uuid::try_parse(s).ok()
}

fn is_uuid_v4(s: &str) -> bool {
    parse_hyphenated_uuid(s)
        .map(|uuid| {
            uuid.get_version() == Some(Version::Random) && uuid.get_variant() == Variant::RFC4122
        })
        .unwrap_or(false)
}

fn is_uuid(s: &str) -> bool {
    parse_hyphenated_uuid(s).is_some()
}

/// Todo の識別子（UUID v4）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoId(String);

impl TodoId {
    /// 新しい TodoId を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// 文字列から TodoId を作成
    pub fn from_string(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTodoId(
                "Todo ID cannot be empty".to_string(),
            ));
        }
        if !is_uuid_v4(&id) {
            return Err(DomainError::InvalidTodoId(format!(
                "Todo ID must be a UUID v4: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TodoId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(value)
    }
}

impl From<TodoId> for String {
    fn from(id: TodoId) -> Self {
        id.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUserId(
                "User ID cannot be empty".to_string(),
            ));
        }
        if !is_uuid(&id) {
            return Err(DomainError::InvalidUserId(format!(
                "User ID must be a UUID: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// サブタスクID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubTaskId(String);

impl SubTaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if !is_uuid(&id) {
            return Err(DomainError::InvalidSubTaskId(format!(
                "SubTask ID must be a UUID: {id}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubTaskId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(value)
    }
}

impl From<SubTaskId> for String {
    fn from(id: SubTaskId) -> Self {
        id.0
    }
}

impl fmt::Display for SubTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_id_generate_is_valid() {
        let id = TodoId::generate();
        assert!(TodoId::from_string(id.as_str()).is_ok());
    }

    #[test]
    fn test_todo_id_rejects_invalid_values() {
        assert!(TodoId::from_string("").is_err());
        assert!(TodoId::from_string("   ").is_err());
        assert!(TodoId::from_string("not-a-uuid").is_err());
        // v1 の UUID は受け付けない
        assert!(TodoId::from_string("c232ab00-9414-11ec-b3c8-9f6bdeced846").is_err());
        // ハイフンなし表記も受け付けない
        assert!(TodoId::from_string("67e5504410b1426f9247bb680e5fe0c8").is_err());
        assert!(TodoId::from_string("67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
    }

    #[test]
    fn test_todo_id_equality_by_value() {
        let a = TodoId::from_string("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let b = TodoId::from_string("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_user_id_validation() {
        assert!(UserId::from_string("").is_err());
        assert!(UserId::from_string("user123").is_err());
        assert!(UserId::from_string("c232ab00-9414-11ec-b3c8-9f6bdeced846").is_ok());
        assert!(UserId::from_string(UserId::generate().to_string()).is_ok());
    }

    #[test]
    fn test_identifier_serde_validates() {
        let id = TodoId::generate();
        let json = serde_json::to_string(&id).unwrap();
        let back: TodoId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<TodoId>("\"bogus\"").is_err());
    }
}
