pub mod engine;
pub mod error;

pub use engine::{ActorIdentity, WorkflowEngine};
pub use error::WorkflowError;
