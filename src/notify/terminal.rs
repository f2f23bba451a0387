//! Terminal/console sender
//!
//! Writes notices to stdout or stderr, colored when the terminal supports it.

use super::Sender;
use crate::domain::Contact;
use crate::error::SendError;
use crate::selfstate::{NoticeKind, SelfStateNotice};
use async_trait::async_trait;
use std::io::{self, Write};

/// Terminal sender for contact types `stderr` and `stdout`
pub struct TerminalSender {
    /// Use stderr instead of stdout
    use_stderr: bool,
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalSender {
    /// Sender for contacts of type `stderr`
    pub fn stderr() -> Self {
        Self {
            use_stderr: true,
            use_colors: Self::supports_color(),
        }
    }

    /// Sender for contacts of type `stdout`
    pub fn stdout() -> Self {
        Self {
            use_stderr: false,
            use_colors: Self::supports_color(),
        }
    }

    /// Disable colors
    pub fn no_color(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
    }

    fn format_notice(&self, contact: &Contact, notice: &SelfStateNotice) -> String {
        format!("{} @{} {}", self.format_kind(notice.kind), contact.value, notice)
    }

    fn format_kind(&self, kind: NoticeKind) -> String {
        if !self.use_colors {
            return kind.to_string();
        }

        let color_code = match kind {
            NoticeKind::Alert => "\x1b[31m",    // Red
            NoticeKind::Recovery => "\x1b[32m", // Green
        };

        format!("{}{}\x1b[0m", color_code, kind)
    }
}

#[async_trait]
impl Sender for TerminalSender {
    fn contact_type(&self) -> &str {
        if self.use_stderr {
            "stderr"
        } else {
            "stdout"
        }
    }

    async fn send(&self, contact: &Contact, notice: &SelfStateNotice) -> Result<(), SendError> {
        let message = self.format_notice(contact, notice);

        if self.use_stderr {
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            writeln!(handle, "{}", message)?;
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", message)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BreachReason;

    #[test]
    fn test_contact_types() {
        assert_eq!(TerminalSender::stderr().contact_type(), "stderr");
        assert_eq!(TerminalSender::stdout().contact_type(), "stdout");
    }

    #[test]
    fn test_format_without_color() {
        let sender = TerminalSender::stdout().no_color();
        let contact = Contact::new("stdout", "ops").unwrap();
        let notice = SelfStateNotice::alert(vec![BreachReason::HealthDegraded], 0);

        let line = sender.format_notice(&contact, &notice);
        assert!(line.starts_with("ALERT @ops ["));
        assert!(line.contains("health degraded"));
    }

    #[tokio::test]
    async fn test_send_to_stdout() {
        let sender = TerminalSender::stdout().no_color();
        let contact = Contact::new("stdout", "ops").unwrap();
        let notice = SelfStateNotice::recovery(0);
        assert!(sender.send(&contact, &notice).await.is_ok());
    }
}
