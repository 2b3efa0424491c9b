//! Outgoing mail. No transport is wired in; [`LogMailer`] writes each message
//! to the log so operators can relay credentials by hand.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
#[error("Failed to send mail to {recipient}: {reason}")]
pub struct MailError {
    pub recipient: String,
    pub reason: String,
}

#[async_trait]
pub trait Mailer: Send + Sync + fmt::Debug {
    /// Welcome mail carrying the generated volunteer ID and temporary password.
    async fn send_credentials(
        &self,
        email: &str,
        name: &str,
        volunteer_id: &str,
        temporary_password: &str,
    ) -> Result<(), MailError>;

    async fn send_password_reset(&self, email: &str, name: &str, reset_token: &str) -> Result<(), MailError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

fn check_recipient(email: &str) -> Result<(), MailError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(MailError {
            recipient: email.to_string(),
            reason: "invalid address".to_string(),
        })
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_credentials(
        &self,
        email: &str,
        name: &str,
        volunteer_id: &str,
        temporary_password: &str,
    ) -> Result<(), MailError> {
        check_recipient(email)?;
        info!(to = email, subject = "Welcome to NSS - Your Volunteer Credentials", "Mail queued");
        debug!(
            "Welcome {}! Your Volunteer ID: {}, Temporary Password: {}",
            name, volunteer_id, temporary_password
        );
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, name: &str, reset_token: &str) -> Result<(), MailError> {
        check_recipient(email)?;
        info!(to = email, subject = "Password Reset Request - NSS", "Mail queued");
        debug!("Hello {}! Reset your password using this token: {}", name, reset_token);
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentMail {
        Credentials {
            email: String,
            volunteer_id: String,
            temporary_password: String,
        },
        PasswordReset {
            email: String,
            token: String,
        },
    }

    /// Keeps every message in memory so tests can read tokens and passwords.
    #[derive(Debug, Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<SentMail>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<SentMail> {
            self.sent.lock().unwrap().clone()
        }

        pub fn last_reset_token(&self, email: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|mail| match mail {
                SentMail::PasswordReset { email: to, token } if to == email => Some(token),
                _ => None,
            })
        }

        pub fn credentials_for(&self, email: &str) -> Option<(String, String)> {
            self.sent().into_iter().find_map(|mail| match mail {
                SentMail::Credentials {
                    email: to,
                    volunteer_id,
                    temporary_password,
                } if to == email => Some((volunteer_id, temporary_password)),
                _ => None,
            })
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_credentials(
            &self,
            email: &str,
            _name: &str,
            volunteer_id: &str,
            temporary_password: &str,
        ) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(SentMail::Credentials {
                email: email.to_string(),
                volunteer_id: volunteer_id.to_string(),
                temporary_password: temporary_password.to_string(),
            });
            Ok(())
        }

        async fn send_password_reset(&self, email: &str, _name: &str, reset_token: &str) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(SentMail::PasswordReset {
                email: email.to_string(),
                token: reset_token.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_rejects_bad_address() {
        let mailer = LogMailer;
        assert!(mailer.send_password_reset("a@b.c", "A", "token").await.is_ok());

        let err = mailer.send_password_reset("nobody", "A", "token").await.unwrap_err();
        assert_eq!(err.recipient, "nobody");
    }
}
