// Gateway module for conversation - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod exchange;
mod message;
mod scheduling;
mod store;

// Public re-exports - the ONLY way to access conversation functionality
pub use exchange::{quick_action_utterance, ExchangeOutcome, MessageExchange, QuickAction};
pub use message::{IdGenerator, Message, MessageId, MessageOrigin};
pub use scheduling::{SchedulingFlow, SchedulingState};
pub use store::ConversationStore;
