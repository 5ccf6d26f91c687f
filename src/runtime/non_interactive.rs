use serde::{Deserialize, Serialize};

use crate::{
    app::AppState,
    backend::{BookingConfirmation, SuggestedSlot},
    cli::OutputFormat,
};

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// The message that was sent
    pub prompt: String,
    /// The assistant's reply text, if the exchange happened
    pub response: Option<String>,
    /// Whether the reply is the inline error message
    pub is_error: bool,
    /// Slots offered by the reply
    pub suggested_slots: Vec<SuggestedSlot>,
    /// Booking made by this exchange
    pub booking_confirmation: Option<BookingConfirmation>,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

impl NonInteractiveResult {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty() && !self.is_error
    }
}

/// Initialize a session and exchange a single message
pub async fn run_once(state: &mut AppState, prompt: &str) -> NonInteractiveResult {
    let start_time = std::time::Instant::now();
    let mut result = NonInteractiveResult {
        prompt: prompt.to_string(),
        response: None,
        is_error: false,
        suggested_slots: Vec::new(),
        booking_confirmation: None,
        errors: Vec::new(),
        duration_ms: 0,
    };

    if let Err(e) = state.initialize().await {
        result.errors.push(format!("Session error: {}", e));
    } else if !state.send(prompt).await {
        result.errors.push("Nothing to send".to_string());
    } else if let Some(reply) = state.messages().last() {
        result.response = Some(reply.text.clone());
        result.is_error = reply.is_error;
        result.suggested_slots = state.offered_slots().to_vec();
        result.booking_confirmation = state.confirmation().cloned();
    }

    result.duration_ms = start_time.elapsed().as_millis();
    result
}

/// Format the result according to the output format
pub fn format_result(result: &NonInteractiveResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
            format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
        }),
        OutputFormat::Text => {
            let mut output = String::new();
            if let Some(response) = &result.response {
                output.push_str(response);
            }

            if !result.suggested_slots.is_empty() {
                output.push_str("\n\n--- Available slots ---\n");
                for (i, slot) in result.suggested_slots.iter().enumerate() {
                    output.push_str(&format!("{}. {} {}\n", i + 1, slot.date, slot.time));
                }
            }

            if let Some(confirmation) = &result.booking_confirmation {
                output.push_str("\n\n--- Booking ---\n");
                output.push_str(&format!(
                    "{}: {} on {} at {}\n",
                    confirmation.booking_id,
                    confirmation.appointment_type_label(),
                    confirmation.appointment_date,
                    confirmation.appointment_time
                ));
            }

            if !result.errors.is_empty() {
                output.push_str("\n--- Errors ---\n");
                for error in &result.errors {
                    output.push_str(&format!("• {}\n", error));
                }
            }

            output
        }
    }
}
