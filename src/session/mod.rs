/// Session management module - Gateway

mod manager;

pub use manager::{Session, SessionManager, SessionStatus};
