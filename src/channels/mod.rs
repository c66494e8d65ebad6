//! Outbound delivery channels.

pub mod email;

pub use email::{Dispatcher, MailTransport, SmtpMailer};
