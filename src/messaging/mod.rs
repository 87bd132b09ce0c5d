//! Outbound messaging clients.
//!
//! Both transports expose the same minimal capability — send a text to a
//! number — so the reply layer stays transport-agnostic.

pub mod twilio;
pub mod whatsapp;

pub use twilio::TwilioClient;
pub use whatsapp::WhatsAppClient;
