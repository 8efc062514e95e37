pub mod task;
pub mod user;
pub mod timestamp;

pub use task::{Task, TaskInput, TaskPriority, TaskQuery, TaskStatus};
pub use user::{Role, User, UserInput, UserQuery};

/// Anything held in an entity store: it must be addressable by its API id.
pub trait Entity: Clone {
    fn id(&self) -> i64;
}

impl Entity for Task {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Entity for User {
    fn id(&self) -> i64 {
        self.id
    }
}
