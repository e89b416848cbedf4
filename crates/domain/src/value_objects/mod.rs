pub mod completion_rate;
pub mod due_date;
pub mod identifiers;
pub mod priority;
pub mod todo_status;

pub use completion_rate::*;
pub use due_date::*;
pub use identifiers::*;
pub use priority::*;
pub use todo_status::*;
