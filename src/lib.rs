pub mod app;
pub mod backend;
pub mod cli;
pub mod constants;
pub mod conversation;
pub mod navigation;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, AppEvent, AppState, Config};
pub use backend::{ChatBackend, HttpBackend};
pub use conversation::{ConversationStore, MessageExchange, SchedulingFlow};
pub use navigation::{ViewNavigator, ViewState};
pub use session::SessionManager;
pub use utils::AssistantError;
