pub mod api;
pub mod ics;
pub mod state;
pub mod transport;

pub use api::EmailNotifier;
pub use transport::{Mailer, SmtpMailer};
