//! Todo ドメインモデル
//!
//! 値オブジェクト、Todo 集約（サブタスクを含む）、ドメインイベント、
//! 合成可能な仕様、およびリポジトリ境界を提供する。I/O は一切行わない。

pub mod errors;
pub mod events;
pub mod repository;
pub mod specification;
pub mod subtask;
pub mod todo;
pub mod todo_specification;
pub mod value_objects;

pub use errors::*;
pub use events::*;
pub use repository::*;
pub use specification::*;
pub use subtask::*;
pub use todo::*;
pub use todo_specification::*;
pub use value_objects::*;
