//! Outbound mail: the collaborator trait and tracked dispatch
//!
//! Delivery backends live in the infrastructure crate. Handlers never await a
//! send; they hand the message to [`MailDispatcher`], which runs it as a
//! tracked background task.

mod dispatcher;
mod mailer;

#[cfg(test)]
mod tests;

pub use dispatcher::MailDispatcher;
pub use mailer::{MailTemplate, Mailer, OutboundMail};
