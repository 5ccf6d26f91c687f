use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::app::{AppEvent, AppState, NotificationLevel, UIConfig};
use crate::backend::{BookingConfirmation, ChatBackend, ChatRequest};
use crate::constants::{CALENDAR_FILE_NAME, TYPING_INDICATOR};
use crate::conversation::{Message, QuickAction};
use crate::navigation::ViewState;
use crate::utils::log_error;

/// A line of user input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Free text for the assistant
    Say(String),
    /// Quick-action token (known or not)
    Quick(String),
    /// Zero-based slot index
    Pick(usize),
    Dismiss,
    View(ViewState),
    /// Export the held booking to an `.ics` file
    Calendar(PathBuf),
    Back,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

/// Parse one input line
pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Say(line.to_string());
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next().map(str::trim).unwrap_or("");

    match name.as_str() {
        "schedule" => ReplCommand::Quick(QuickAction::Schedule.token().to_string()),
        "slots" | "availability" => {
            ReplCommand::Quick(QuickAction::CheckAvailability.token().to_string())
        }
        "faq" => ReplCommand::Quick(QuickAction::Faq.token().to_string()),
        "cancel" => ReplCommand::Quick(QuickAction::Cancel.token().to_string()),
        "action" if !arg.is_empty() => ReplCommand::Quick(arg.to_string()),
        "pick" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => ReplCommand::Pick(n - 1),
            _ => ReplCommand::Unknown(line.to_string()),
        },
        "dismiss" => ReplCommand::Dismiss,
        "view" => match ViewState::from_str(arg) {
            Some(view) => ReplCommand::View(view),
            None => ReplCommand::Unknown(line.to_string()),
        },
        "calendar" | "ics" => ReplCommand::Calendar(PathBuf::from(if arg.is_empty() {
            CALENDAR_FILE_NAME
        } else {
            arg
        })),
        "back" => ReplCommand::Back,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "bye" => ReplCommand::Quit,
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

pub fn help_text() -> String {
    [
        "Type a message and press Enter to talk to the assistant.",
        "",
        "  /schedule        ask to schedule an appointment",
        "  /slots           ask which slots are available",
        "  /faq             ask about clinic services",
        "  /cancel          ask to cancel an appointment",
        "  /action TOKEN    send a quick action by token",
        "  /pick N          book the N-th offered slot",
        "  /dismiss         close the slot list",
        "  /view VIEW       switch to chat, faq or confirmation",
        "  /calendar [PATH] save the booking as an .ics file",
        "  /back            return to the chat",
        "  /quit            leave",
    ]
    .join("\n")
}

/// Formats observer events as terminal output
pub struct Renderer {
    ui: UIConfig,
}

impl Renderer {
    pub fn new(ui: UIConfig) -> Self {
        Self { ui }
    }

    /// Text to print for `event`, if any
    pub fn render(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::SessionReady { session_id, .. } => {
                Some(format!("{}", format!("Connected (session {})", session_id).dimmed()))
            }
            AppEvent::Notification { level, text } => Some(match level {
                NotificationLevel::Success => format!("{} {}", "✔".green(), text.green()),
                NotificationLevel::Error => format!("{} {}", "✖".red(), text.red()),
            }),
            AppEvent::MessageAppended(message) => Some(self.render_message(message)),
            AppEvent::AwaitingReply(true) => Some(format!("{}", TYPING_INDICATOR.dimmed())),
            AppEvent::SlotsOffered(slots) => {
                let mut out = format!("{}", "Available slots:".bold());
                for (i, slot) in slots.iter().enumerate() {
                    out.push_str(&format!("\n  {}. {} — {}", i + 1, slot.date, slot.time));
                }
                out.push_str(&format!("\n{}", "Use /pick N to book, /dismiss to close".dimmed()));
                Some(out)
            }
            AppEvent::BookingConfirmed(confirmation) => Some(render_confirmation(confirmation)),
            AppEvent::ViewChanged(ViewState::Faq) => Some(format!(
                "{}\n{}",
                "── FAQ ──".bold(),
                "Ask about hours, location or insurance. /back returns to the chat.".dimmed()
            )),
            AppEvent::ViewChanged(ViewState::Conversation) => {
                Some(format!("{}", "── Chat ──".bold()))
            }
            AppEvent::AwaitingReply(false)
            | AppEvent::InputChanged(_)
            | AppEvent::SlotsCleared
            | AppEvent::ViewChanged(ViewState::Confirmation) => None,
        }
    }

    fn render_message(&self, message: &Message) -> String {
        let speaker = if message.is_user() {
            "You".cyan().bold()
        } else if message.is_error {
            "Assistant".red().bold()
        } else {
            "Assistant".magenta().bold()
        };

        let body = if message.is_error {
            message.text.red().to_string()
        } else {
            message.text.clone()
        };

        if self.ui.show_timestamps {
            format!(
                "[{}] {}: {}",
                message.timestamp.format("%H:%M"),
                speaker,
                body
            )
        } else {
            format!("{}: {}", speaker, body)
        }
    }
}

fn render_confirmation(confirmation: &BookingConfirmation) -> String {
    let mut out = format!("{}\n", "── Appointment Confirmed ──".green().bold());
    out.push_str(&format!("  Booking ID:  {}\n", confirmation.booking_id));
    out.push_str(&format!(
        "  When:        {} at {} ({} min)\n",
        confirmation.appointment_date, confirmation.appointment_time, confirmation.duration_minutes
    ));
    out.push_str(&format!(
        "  Type:        {}\n",
        confirmation.appointment_type_label()
    ));
    out.push_str(&format!("  Patient:     {}\n", confirmation.patient_name()));
    out.push_str(&format!(
        "  Contact:     {} / {}\n",
        confirmation.patient_info.email, confirmation.patient_info.phone
    ));
    out.push_str(&format!("{}", "/back to return to the chat".dimmed()));
    out
}

/// What the loop should do after a command
#[derive(Debug)]
pub enum Step {
    /// Lines to print, and an exchange to run if one was started
    Continue {
        output: Vec<String>,
        request: Option<ChatRequest>,
    },
    Quit,
}

/// Line-based front end over [`AppState`].
///
/// All output, including rendered events, comes back from its methods in
/// the order it happened; nothing prints behind the caller's back.
pub struct Repl {
    state: AppState,
    backend: Arc<dyn ChatBackend>,
    events: broadcast::Receiver<AppEvent>,
    renderer: Renderer,
}

impl Repl {
    pub fn new(state: AppState, ui: UIConfig) -> Self {
        Self {
            backend: state.backend(),
            events: state.subscribe(),
            renderer: Renderer::new(ui),
            state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Initialize the session and render what it produced
    pub async fn start(&mut self) -> Vec<String> {
        let result = self.state.initialize().await;
        let mut output = self.drain_events();
        if let Err(e) = result {
            log_error("session", &e);
            output.push(format!(
                "{}",
                "Chat is unavailable. Restart to try again.".yellow()
            ));
        }
        output.push(format!("{}", "Type /help for commands.".dimmed()));
        output
    }

    /// Apply one command. Exchanges are only started here; run them with
    /// [`Repl::complete`].
    pub fn handle(&mut self, command: ReplCommand) -> Step {
        let mut notice = None;
        let request = match command {
            ReplCommand::Say(text) => {
                self.state.set_input(text);
                let request = self.state.begin_submit();
                if request.is_none() && self.state.session().is_none() {
                    notice = Some("Not connected; message not sent.".yellow());
                }
                request
            }
            ReplCommand::Quick(token) => self.state.begin_quick_action(&token),
            ReplCommand::Pick(index) => {
                if index < self.state.offered_slots().len() {
                    self.state.begin_select_slot_at(index)
                } else {
                    notice = Some(format!("No slot {} on offer.", index + 1).yellow());
                    None
                }
            }
            ReplCommand::Dismiss => {
                self.state.dismiss_slots();
                None
            }
            ReplCommand::View(view) => {
                if let Err(e) = self.state.go_to(view) {
                    notice = Some(e.to_string().yellow());
                }
                None
            }
            ReplCommand::Calendar(path) => {
                match self.state.export_calendar(&path) {
                    Ok(()) => notice = Some(format!("Saved {}", path.display()).green()),
                    Err(e) => notice = Some(e.to_string().yellow()),
                }
                None
            }
            ReplCommand::Back => {
                self.state.return_to_conversation();
                None
            }
            ReplCommand::Help => {
                notice = Some(help_text().normal());
                None
            }
            ReplCommand::Quit => return Step::Quit,
            ReplCommand::Unknown(input) => {
                notice = Some(format!("Unknown command: {} (try /help)", input).yellow());
                None
            }
            ReplCommand::Empty => None,
        };

        let mut output = self.drain_events();
        if let Some(notice) = notice {
            output.push(notice.to_string());
        }
        Step::Continue { output, request }
    }

    /// Run a started exchange and render its outcome
    pub async fn complete(&mut self, request: ChatRequest) -> Vec<String> {
        let result = self.backend.send_message(&request).await;
        self.state.finish_send(result);
        self.drain_events()
    }

    fn drain_events(&mut self) -> Vec<String> {
        let mut output = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => output.extend(self.renderer.render(&event)),
                Err(TryRecvError::Lagged(skipped)) => {
                    log_error("renderer", format!("dropped {} events", skipped));
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        output
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

/// Interactive line-based chat loop
pub async fn run_interactive(state: AppState, ui: UIConfig) -> Result<()> {
    let mut repl = Repl::new(state, ui);

    println!("{}", "Initializing Medical Appointment Assistant...".bold());
    print_lines(repl.start().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match repl.handle(parse_command(&line)) {
            Step::Quit => break,
            Step::Continue { output, request } => {
                print_lines(output);
                if let Some(request) = request {
                    print_lines(repl.complete(request).await);
                }
            }
        }
    }

    Ok(())
}
