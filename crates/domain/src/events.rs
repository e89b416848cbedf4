use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{DueDate, Priority, SubTaskId, TodoId, TodoStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Todo 集約が発行するイベント
///
/// `event_type` + `payload` の隣接タグ形式でシリアライズされる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload")]
pub enum TodoEvent {
    TodoCreated {
        title: String,
        priority: Priority,
        status: TodoStatus,
    },
    TodoStarted {
        started_at: DateTime<Utc>,
    },
    TodoCompleted {
        completed_at: DateTime<Utc>,
    },
    TodoCancelled {
        cancelled_at: DateTime<Utc>,
    },
    TodoReopened {
        reopened_at: DateTime<Utc>,
    },
    TodoTitleUpdated {
        old_title: String,
        new_title: String,
    },
    TodoDescriptionUpdated {
        old_description: Option<String>,
        new_description: Option<String>,
    },
    TodoPriorityUpdated {
        old_priority: Priority,
        new_priority: Priority,
    },
    TodoDueDateUpdated {
        old_due_date: Option<DueDate>,
        new_due_date: Option<DueDate>,
    },
    SubTaskAdded {
        sub_task_id: SubTaskId,
        title: String,
        order: u32,
    },
    SubTaskRemoved {
        sub_task_id: SubTaskId,
        title: String,
    },
    SubTaskTitleUpdated {
        sub_task_id: SubTaskId,
        old_title: String,
        new_title: String,
    },
    SubTaskCompletionChanged {
        sub_task_id: SubTaskId,
        is_completed: bool,
    },
}

impl TodoEvent {
    /// イベントタイプ名を取得
    pub fn event_type(&self) -> &'static str {
        match self {
            TodoEvent::TodoCreated { .. } => "TodoCreated",
            TodoEvent::TodoStarted { .. } => "TodoStarted",
            TodoEvent::TodoCompleted { .. } => "TodoCompleted",
            TodoEvent::TodoCancelled { .. } => "TodoCancelled",
            TodoEvent::TodoReopened { .. } => "TodoReopened",
            TodoEvent::TodoTitleUpdated { .. } => "TodoTitleUpdated",
            TodoEvent::TodoDescriptionUpdated { .. } => "TodoDescriptionUpdated",
            TodoEvent::TodoPriorityUpdated { .. } => "TodoPriorityUpdated",
            TodoEvent::TodoDueDateUpdated { .. } => "TodoDueDateUpdated",
            TodoEvent::SubTaskAdded { .. } => "SubTaskAdded",
            TodoEvent::SubTaskRemoved { .. } => "SubTaskRemoved",
            TodoEvent::SubTaskTitleUpdated { .. } => "SubTaskTitleUpdated",
            TodoEvent::SubTaskCompletionChanged { .. } => "SubTaskCompletionChanged",
        }
    }

    /// ペイロードを JSON オブジェクトとして取得
    pub fn payload(&self) -> DomainResult<Map<String, Value>> {
        let value = serde_json::to_value(self)
            .map_err(|e| DomainError::EventSerialization(e.to_string()))?;

        match value {
            Value::Object(mut object) => match object.remove("payload") {
                Some(Value::Object(payload)) => Ok(payload),
                _ => Err(DomainError::EventSerialization(format!(
                    "Missing payload for {}",
                    self.event_type()
                ))),
            },
            _ => Err(DomainError::EventSerialization(format!(
                "Unexpected event shape for {}",
                self.event_type()
            ))),
        }
    }
}

/// 保存・転送用のイベントレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: Map<String, Value>,
}

/// 集約ID・発生日時を伴うドメインイベント
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEvent {
    event_id: String,
    aggregate_id: TodoId,
    occurred_at: DateTime<Utc>,
    event: TodoEvent,
}

impl DomainEvent {
    pub fn new(aggregate_id: TodoId, event: TodoEvent, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_id: ulid::Ulid::new().to_string(),
            aggregate_id,
            occurred_at,
            event,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn aggregate_id(&self) -> &TodoId {
        &self.aggregate_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn event(&self) -> &TodoEvent {
        &self.event
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    pub fn payload(&self) -> DomainResult<Map<String, Value>> {
        self.event.payload()
    }

    pub fn to_record(&self) -> DomainResult<EventRecord> {
        Ok(EventRecord {
            event_id: self.event_id.clone(),
            aggregate_id: self.aggregate_id.to_string(),
            event_type: self.event_type().to_string(),
            occurred_at: self.occurred_at,
            payload: self.payload()?,
        })
    }

    /// レコードからイベントを復元
    pub fn from_record(record: EventRecord) -> DomainResult<Self> {
        let aggregate_id = TodoId::from_string(record.aggregate_id)?;

        let mut tagged = Map::new();
        tagged.insert("event_type".to_string(), Value::String(record.event_type));
        tagged.insert("payload".to_string(), Value::Object(record.payload));

        let event: TodoEvent = serde_json::from_value(Value::Object(tagged))
            .map_err(|e| DomainError::EventDeserialization(e.to_string()))?;

        Ok(Self {
            event_id: record.event_id,
            aggregate_id,
            occurred_at: record.occurred_at,
            event,
        })
    }

    /// イベントをJSONにシリアライズ
    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string(&self.to_record()?)
            .map_err(|e| DomainError::EventSerialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        let record: EventRecord = serde_json::from_str(json)
            .map_err(|e| DomainError::EventDeserialization(e.to_string()))?;
        Self::from_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let event = TodoEvent::TodoCreated {
            title: "Buy milk".to_string(),
            priority: Priority::Normal,
            status: TodoStatus::Pending,
        };
        assert_eq!(event.event_type(), "TodoCreated");
    }

    #[test]
    fn test_payload_is_flat_object() {
        let event = TodoEvent::TodoTitleUpdated {
            old_title: "old".to_string(),
            new_title: "new".to_string(),
        };
        let payload = event.payload().unwrap();
        assert_eq!(payload.get("old_title"), Some(&Value::String("old".into())));
        assert_eq!(payload.get("new_title"), Some(&Value::String("new".into())));
        assert!(payload.get("event_type").is_none());
    }

    #[test]
    fn test_domain_event_json_restores_event() {
        let todo_id = TodoId::generate();
        let event = DomainEvent::new(
            todo_id.clone(),
            TodoEvent::SubTaskAdded {
                sub_task_id: SubTaskId::generate(),
                title: "牛乳を買う".to_string(),
                order: 0,
            },
            Utc::now(),
        );

        let json = event.to_json().unwrap();
        let restored = DomainEvent::from_json(&json).unwrap();

        assert_eq!(restored, event);
        assert_eq!(restored.aggregate_id(), &todo_id);
        assert_eq!(restored.event_type(), "SubTaskAdded");
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let record = EventRecord {
            event_id: ulid::Ulid::new().to_string(),
            aggregate_id: TodoId::generate().to_string(),
            event_type: "TodoArchived".to_string(),
            occurred_at: Utc::now(),
            payload: Map::new(),
        };
        assert!(matches!(
            DomainEvent::from_record(record),
            Err(DomainError::EventDeserialization(_))
        ));
    }
}
