use crate::specification::{Criterion, Specification};
use crate::todo::TodoEntity;
use crate::value_objects::{Priority, TodoStatus, UserId};
use serde::Serialize;

/// Todo に対する条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TodoCriterion {
    OwnedBy(UserId),
    Completed,
    Pending,
    HighPriority,
    Overdue,
    DueToday,
    DueWithinDays(u32),
    StatusIs(TodoStatus),
    PriorityAtLeast(Priority),
    SearchTerm(String),
}

pub type TodoSpecification = Specification<TodoCriterion>;

impl Criterion for TodoCriterion {
    type Candidate = TodoEntity;

    fn is_satisfied_by(&self, todo: &TodoEntity) -> bool {
        match self {
            TodoCriterion::OwnedBy(user_id) => todo.user_id() == user_id,
            TodoCriterion::Completed => todo.status().is_completed(),
            TodoCriterion::Pending => todo.status().is_active(),
            TodoCriterion::HighPriority => todo.priority().is_high(),
            TodoCriterion::Overdue => {
                !todo.status().is_finished() && todo.due_date().is_some_and(|due| due.is_overdue())
            }
            TodoCriterion::DueToday => todo.is_due_today(),
            TodoCriterion::DueWithinDays(days) => todo.is_due_within_days(*days),
            TodoCriterion::StatusIs(status) => todo.status() == *status,
            TodoCriterion::PriorityAtLeast(priority) => !todo.priority().is_lower_than(priority),
            TodoCriterion::SearchTerm(term) => todo.matches_search_term(term),
        }
    }

    fn description(&self) -> String {
        match self {
            TodoCriterion::OwnedBy(user_id) => format!("todos of user {user_id}"),
            TodoCriterion::Completed => "completed todos".to_string(),
            TodoCriterion::Pending => "pending todos".to_string(),
            TodoCriterion::HighPriority => "high priority todos".to_string(),
            TodoCriterion::Overdue => "overdue todos".to_string(),
            TodoCriterion::DueToday => "todos due today".to_string(),
            TodoCriterion::DueWithinDays(days) => format!("todos due within {days} days"),
            TodoCriterion::StatusIs(status) => format!("todos with status {status}"),
            TodoCriterion::PriorityAtLeast(priority) => {
                format!("todos with priority {priority} or higher")
            }
            TodoCriterion::SearchTerm(term) => format!("todos matching \"{term}\""),
        }
    }
}

impl Specification<TodoCriterion> {
    /// 指定ユーザーの Todo
    pub fn user_todo(user_id: UserId) -> Self {
        Self::leaf(TodoCriterion::OwnedBy(user_id))
    }

    pub fn completed_todo() -> Self {
        Self::leaf(TodoCriterion::Completed)
    }

    /// PENDING または IN_PROGRESS の Todo
    pub fn pending_todo() -> Self {
        Self::leaf(TodoCriterion::Pending)
    }

    /// 優先度 HIGH 以上の Todo
    pub fn high_priority_todo() -> Self {
        Self::leaf(TodoCriterion::HighPriority)
    }

    /// 期限切れかつ未完了の Todo
    pub fn overdue_todo() -> Self {
        Self::leaf(TodoCriterion::Overdue)
    }

    pub fn due_today() -> Self {
        Self::leaf(TodoCriterion::DueToday)
    }

    pub fn due_within_days(days: u32) -> Self {
        Self::leaf(TodoCriterion::DueWithinDays(days))
    }

    pub fn status_is(status: TodoStatus) -> Self {
        Self::leaf(TodoCriterion::StatusIs(status))
    }

    pub fn priority_at_least(priority: Priority) -> Self {
        Self::leaf(TodoCriterion::PriorityAtLeast(priority))
    }

    pub fn search_term(term: impl Into<String>) -> Self {
        Self::leaf(TodoCriterion::SearchTerm(term.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::CreateTodoData;
    use crate::value_objects::{local_today, DueDate};
    use chrono::Duration;

    fn todo_for(user_id: &UserId, title: &str, priority: Priority, due_in_days: Option<i64>) -> TodoEntity {
        TodoEntity::create(CreateTodoData {
            title: title.to_string(),
            priority: Some(priority),
            due_date: due_in_days
                .map(|days| DueDate::new(local_today() + Duration::days(days), true).unwrap()),
            user_id: user_id.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_user_and_pending() {
        let u1 = UserId::generate();
        let u2 = UserId::generate();

        let pending = todo_for(&u1, "pending", Priority::Normal, None);
        let mut started = todo_for(&u1, "started", Priority::Normal, None);
        started.mark_as_in_progress().unwrap();
        let mut done = todo_for(&u1, "done", Priority::Normal, None);
        done.mark_as_completed().unwrap();
        let other = todo_for(&u2, "other", Priority::Normal, None);

        let todos = vec![pending, started, done, other];
        let spec = TodoSpecification::user_todo(u1.clone()).and(TodoSpecification::pending_todo());

        let titles: Vec<&str> = spec.filter(&todos).iter().map(|t| t.title()).collect();
        assert_eq!(titles, vec!["pending", "started"]);
    }

    #[test]
    fn test_priority_specs() {
        let user = UserId::generate();
        let low = todo_for(&user, "low", Priority::Low, None);
        let high = todo_for(&user, "high", Priority::High, None);
        let urgent = todo_for(&user, "urgent", Priority::Urgent, None);

        let spec = TodoSpecification::high_priority_todo();
        assert!(!spec.is_satisfied_by(&low));
        assert!(spec.is_satisfied_by(&high));
        assert!(spec.is_satisfied_by(&urgent));

        let at_least_normal = TodoSpecification::priority_at_least(Priority::Normal);
        assert!(!at_least_normal.is_satisfied_by(&low));
        assert!(at_least_normal.is_satisfied_by(&high));
    }

    #[test]
    fn test_date_specs() {
        let user = UserId::generate();
        let mut overdue = todo_for(&user, "late", Priority::Normal, Some(-1));
        let today = todo_for(&user, "today", Priority::Normal, Some(0));
        let soon = todo_for(&user, "soon", Priority::Normal, Some(3));
        let none = todo_for(&user, "none", Priority::Normal, None);

        let overdue_spec = TodoSpecification::overdue_todo();
        assert!(overdue_spec.is_satisfied_by(&overdue));
        assert!(!overdue_spec.is_satisfied_by(&today));
        assert!(!overdue_spec.is_satisfied_by(&none));

        assert!(TodoSpecification::due_today().is_satisfied_by(&today));
        assert!(!TodoSpecification::due_today().is_satisfied_by(&soon));

        let within = TodoSpecification::due_within_days(3);
        assert!(within.is_satisfied_by(&today));
        assert!(within.is_satisfied_by(&soon));
        assert!(!within.is_satisfied_by(&overdue));
        assert!(!within.is_satisfied_by(&none));

        overdue.mark_as_completed().unwrap();
        assert!(!overdue_spec.is_satisfied_by(&overdue));
    }

    #[test]
    fn test_status_and_search() {
        let user = UserId::generate();
        let mut todo = todo_for(&user, "Buy Milk", Priority::Normal, None);
        todo.mark_as_cancelled().unwrap();

        assert!(TodoSpecification::status_is(TodoStatus::Cancelled).is_satisfied_by(&todo));
        assert!(!TodoSpecification::completed_todo().is_satisfied_by(&todo));
        assert!(!TodoSpecification::pending_todo().is_satisfied_by(&todo));
        assert!(TodoSpecification::search_term("milk").is_satisfied_by(&todo));
    }

    #[test]
    fn test_descriptions() {
        let user = UserId::from_string("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let spec = TodoSpecification::user_todo(user)
            .and(TodoSpecification::high_priority_todo().or(TodoSpecification::due_within_days(2)))
            .and(TodoSpecification::completed_todo().not());

        assert_eq!(
            spec.description(),
            "((todos of user 67e55044-10b1-426f-9247-bb680e5fe0c8 AND (high priority todos OR todos due within 2 days)) AND NOT completed todos)"
        );
    }

    #[test]
    fn test_serializes_for_debugging() {
        let spec = TodoSpecification::pending_todo().and(TodoSpecification::due_within_days(7));
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "and": [
                    { "leaf": { "kind": "pending" } },
                    { "leaf": { "kind": "due_within_days", "value": 7 } }
                ]
            })
        );
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn any_leaf(user: UserId) -> impl Strategy<Value = TodoSpecification> {
            prop_oneof![
                Just(TodoSpecification::user_todo(user)),
                Just(TodoSpecification::completed_todo()),
                Just(TodoSpecification::pending_todo()),
                Just(TodoSpecification::high_priority_todo()),
                Just(TodoSpecification::overdue_todo()),
                Just(TodoSpecification::due_today()),
                (0u32..5).prop_map(TodoSpecification::due_within_days),
            ]
        }

        fn any_todo(user: UserId) -> impl Strategy<Value = TodoEntity> {
            let owner = prop_oneof![Just(user), Just(UserId::generate())];
            (
                owner,
                proptest::sample::select(Priority::ALL.to_vec()),
                proptest::option::of(-3i64..5),
                0u8..3,
            )
                .prop_map(|(owner, priority, due, status)| {
                    let mut todo = todo_for(&owner, "task", priority, due);
                    match status {
                        1 => todo.mark_as_in_progress().unwrap(),
                        2 => todo.mark_as_completed().unwrap(),
                        _ => {}
                    }
                    todo
                })
        }

        fn fixture() -> impl Strategy<Value = (TodoSpecification, TodoSpecification, TodoSpecification, TodoEntity)> {
            let user = UserId::generate();
            (
                any_leaf(user.clone()),
                any_leaf(user.clone()),
                any_leaf(user.clone()),
                any_todo(user),
            )
        }

        proptest! {
            #[test]
            fn algebra_matches_boolean_logic((a, b, _c, todo) in fixture()) {
                let (x, y) = (a.is_satisfied_by(&todo), b.is_satisfied_by(&todo));
                prop_assert_eq!(a.clone().and(b.clone()).is_satisfied_by(&todo), x && y);
                prop_assert_eq!(a.clone().or(b.clone()).is_satisfied_by(&todo), x || y);
                prop_assert_eq!(a.not().is_satisfied_by(&todo), !x);
            }

            #[test]
            fn composition_is_associative((a, b, c, todo) in fixture()) {
                let left = a.clone().and(b.clone()).and(c.clone());
                let right = a.clone().and(b.clone().and(c.clone()));
                prop_assert_eq!(left.is_satisfied_by(&todo), right.is_satisfied_by(&todo));

                let left = a.clone().or(b.clone()).or(c.clone());
                let right = a.or(b.or(c));
                prop_assert_eq!(left.is_satisfied_by(&todo), right.is_satisfied_by(&todo));
            }
        }
    }
}
