//! File sender
//!
//! Appends one JSON line per notice to the file named by the contact value.

use super::Sender;
use crate::domain::Contact;
use crate::error::SendError;
use crate::selfstate::SelfStateNotice;
use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Sender for contacts of type `file`
#[derive(Debug, Default)]
pub struct FileSender;

impl FileSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sender for FileSender {
    fn contact_type(&self) -> &str {
        "file"
    }

    async fn send(&self, contact: &Contact, notice: &SelfStateNotice) -> Result<(), SendError> {
        let mut line = serde_json::to_string(notice)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&contact.value)
            .await
            .map_err(|e| SendError::Delivery {
                contact: contact.to_string(),
                message: e.to_string(),
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
