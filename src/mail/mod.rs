//! Share notification email.
//!
//! [`ShareEmail`] renders the message sent to each recipient of a share;
//! a [`Mailer`] delivers it.

mod sender;
mod template;

pub use sender::{EmailMessage, HttpMailer, LogMailer, Mailer};
pub use template::{ShareEmail, DEFAULT_SENDER_NAME};

use std::sync::Arc;

use crate::config::MailConfig;
use crate::Result;

/// Build the mailer selected by `config.enabled`.
pub fn create_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    if config.enabled {
        Ok(Arc::new(HttpMailer::new(config)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}
