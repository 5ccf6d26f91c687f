/// Runtime orchestrator module - Gateway

mod non_interactive;
mod orchestrator;
mod terminal;

pub use non_interactive::{format_result, run_once, NonInteractiveResult};
pub use orchestrator::Orchestrator;
pub use terminal::{help_text, parse_command, run_interactive, Renderer, Repl, ReplCommand, Step};
