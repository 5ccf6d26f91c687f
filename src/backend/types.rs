use serde::{Deserialize, Serialize};

use crate::constants::{CALENDAR_LOCATION, CALENDAR_PRODID};

/// Body of a successful `GET /api/init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    pub session_id: String,
    pub user_id: String,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub user_id: String,
}

/// A suggested appointment slot. Both fields are display strings; no
/// timezone handling happens on this side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestedSlot {
    pub date: String,
    pub time: String,
}

impl SuggestedSlot {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

/// Patient details echoed back with a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Terminal artifact of a successful booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub appointment_type: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    pub patient_info: PatientInfo,
}

impl BookingConfirmation {
    /// `general_consultation` -> `General Consultation`
    pub fn appointment_type_label(&self) -> String {
        self.appointment_type
            .split(|c: char| c == '_' || c == '-')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn patient_name(&self) -> String {
        format!(
            "{} {}",
            self.patient_info.first_name, self.patient_info.last_name
        )
        .trim()
        .to_string()
    }

    /// Single-event iCalendar document for this booking.
    ///
    /// Start time is floating (no `Z`): the backend sends clinic-local
    /// display strings.
    pub fn to_ics(&self) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", CALENDAR_PRODID),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}@medassist", escape_ics_text(&self.booking_id)),
            format!(
                "SUMMARY:{}",
                escape_ics_text(&format!(
                    "Medical Appointment - {}",
                    self.appointment_type_label()
                ))
            ),
            format!(
                "DTSTART:{}T{}",
                digits(&self.appointment_date),
                ics_time(&self.appointment_time)
            ),
            format!("DURATION:PT{}M", self.duration_minutes),
            format!(
                "DESCRIPTION:{}",
                escape_ics_text(&format!("Appointment with {}", self.patient_name()))
            ),
            format!("LOCATION:{}", CALENDAR_LOCATION),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];

        let mut ics = lines.join("\r\n");
        ics.push_str("\r\n");
        ics
    }
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// `10:00` -> `100000`, `9:30` -> `093000`
fn ics_time(time: &str) -> String {
    let mut out = digits(time);
    if out.len() % 2 == 1 {
        out.insert(0, '0');
    }
    while out.len() < 6 {
        out.push('0');
    }
    out
}

fn escape_ics_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | ';' | ',' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Reply to a chat exchange.
///
/// `response` is the primary assistant text. The remaining fields are side
/// channels riding on the same payload; each is independently optional and
/// the core branches on presence through [`ChatReply::side_channels`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_action: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_slots: Option<Vec<SuggestedSlot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_confirmation: Option<BookingConfirmation>,
}

/// Decoded side channels of a reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideChannels {
    pub booking_confirmation: Option<BookingConfirmation>,
    /// Present only when the reply carried a non-empty slot list
    pub suggested_slots: Option<Vec<SuggestedSlot>>,
}

impl ChatReply {
    /// Plain text reply with no side channels
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            requires_action: None,
            action_type: None,
            suggested_slots: None,
            booking_confirmation: None,
        }
    }

    pub fn with_slots(mut self, slots: Vec<SuggestedSlot>) -> Self {
        self.suggested_slots = Some(slots);
        self
    }

    pub fn with_confirmation(mut self, confirmation: BookingConfirmation) -> Self {
        self.booking_confirmation = Some(confirmation);
        self
    }

    pub fn side_channels(&self) -> SideChannels {
        SideChannels {
            booking_confirmation: self.booking_confirmation.clone(),
            suggested_slots: self
                .suggested_slots
                .as_ref()
                .filter(|slots| !slots.is_empty())
                .cloned(),
        }
    }
}
