/// Constants module to avoid magic strings in the codebase

// Network Configuration
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const INIT_PATH: &str = "/api/init";
pub const CHAT_PATH: &str = "/api/chat";
pub const HEALTH_PATH: &str = "/";

// Observer bus
pub const EVENT_CHANNEL_CAPACITY: usize = 128;

// Canned conversation texts
pub const WELCOME_MESSAGE_ID: &str = "welcome";
pub const WELCOME_MESSAGE: &str = "Hello! I'm your medical appointment scheduling assistant. \
I'm here to help you schedule appointments, check availability, and answer any questions about our clinic.

How can I assist you today? I can help you with:

• Scheduling a new appointment
• Checking available time slots
• Answering questions about our services
• Providing clinic information

What would you like to do?";
pub const EXCHANGE_ERROR_MESSAGE: &str = "I apologize, but I encountered an issue processing your request. \
Please try again or contact our office directly.";

// Notifications
pub const INIT_FAILURE_NOTICE: &str = "Failed to initialize chat session";
pub const BOOKING_SUCCESS_NOTICE: &str = "Appointment booked successfully!";

// Calendar export
pub const CALENDAR_FILE_NAME: &str = "appointment.ics";
pub const CALENDAR_LOCATION: &str = "Medical Clinic";
pub const CALENDAR_PRODID: &str = "-//medassist//Appointment Assistant//EN";

// Presentation
pub const TYPING_INDICATOR: &str = "Assistant is typing...";
