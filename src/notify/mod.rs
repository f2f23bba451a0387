//! Notice delivery seam
//!
//! Senders deliver self-state notices to contacts of one type. The
//! [`Dispatcher`] resolves every configured contact to a sender once, at
//! startup, and fans notices out to all of them.

mod file;
mod terminal;

pub use file::FileSender;
pub use terminal::TerminalSender;

use crate::domain::Contact;
use crate::error::{ConfigError, SendError};
use crate::selfstate::SelfStateNotice;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Notification channel for one contact type
#[async_trait]
pub trait Sender: Send + Sync {
    /// Contact type this sender delivers to
    fn contact_type(&self) -> &str;

    /// Deliver a notice to a contact
    async fn send(&self, contact: &Contact, notice: &SelfStateNotice) -> Result<(), SendError>;
}

/// Per-dispatch delivery summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans notices out to the configured contacts, in order
pub struct Dispatcher {
    senders: HashMap<String, Arc<dyn Sender>>,
    contacts: Vec<Contact>,
}

impl Dispatcher {
    /// Create a dispatcher with no senders and no contacts
    pub fn new() -> Self {
        Self {
            senders: HashMap::new(),
            contacts: Vec::new(),
        }
    }

    /// Dispatcher with the built-in terminal and file senders registered
    pub fn with_builtin_senders() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Arc::new(TerminalSender::stderr()));
        dispatcher.register(Arc::new(TerminalSender::stdout()));
        dispatcher.register(Arc::new(FileSender::new()));
        dispatcher
    }

    /// Register a sender, replacing any previous sender of the same type
    pub fn register(&mut self, sender: Arc<dyn Sender>) {
        self.senders
            .insert(sender.contact_type().to_string(), sender);
    }

    /// Attach the contact list
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownContactType` if any contact has no
    /// registered sender.
    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Result<Self, ConfigError> {
        for contact in &contacts {
            contact.validate()?;
            if !self.senders.contains_key(&contact.contact_type) {
                return Err(ConfigError::UnknownContactType(
                    contact.contact_type.clone(),
                ));
            }
        }
        self.contacts = contacts;
        Ok(self)
    }

    /// Configured contacts
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Number of registered senders
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    /// Send a notice to every contact; failures are logged and skipped
    pub async fn dispatch(&self, notice: &SelfStateNotice) -> DispatchReport {
        let mut report = DispatchReport::default();

        for contact in &self.contacts {
            let Some(sender) = self.senders.get(&contact.contact_type) else {
                log::error!("No sender for contact {}", contact);
                report.failed += 1;
                continue;
            };

            match sender.send(contact, notice).await {
                Ok(()) => {
                    log::debug!("Sent {} notice to {}", notice.kind, contact);
                    report.delivered += 1;
                }
                Err(e) => {
                    log::error!("Failed to send {} notice to {}: {}", notice.kind, contact, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_builtin_senders()
    }
}
