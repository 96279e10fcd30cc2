//! Session state and the coordinator that owns the live-session registry.

mod coordinator;
mod session;

pub use coordinator::{Coordinator, CoordinatorHandle, SessionEntry};
pub use session::{Session, SessionId, SessionRecord};
