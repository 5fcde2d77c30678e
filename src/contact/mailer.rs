//! Outgoing mail: composition and transports.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use uuid::Uuid;

use crate::config::{MailConfig, MailTransport};
use crate::contact::form::{escape_html, ContactSubmission};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("mail transport I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
}

/// A composed message, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Header values are single-line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

impl OutgoingMail {
    pub fn compose(
        submission: &ContactSubmission,
        admin_email: &str,
        x_mailer: &str,
        submission_id: Uuid,
    ) -> Self {
        let name = escape_html(&submission.name);
        let project = escape_html(&submission.project);
        let message = escape_html(&submission.message);

        let headers = vec![
            ("From".to_string(), submission.email.clone()),
            ("Reply-To".to_string(), submission.email.clone()),
            ("X-Mailer".to_string(), header_value(x_mailer)),
            ("X-Submission-Id".to_string(), submission_id.to_string()),
            ("Content-Type".to_string(), "text/plain; charset=utf-8".to_string()),
        ];

        let body = format!(
            "Name: {name}\nEmail: {email}\nProject: {project}\nMessage:\n{message}",
            email = submission.email,
        );

        Self {
            to: header_value(admin_email),
            subject: header_value(&format!("New Contact Form Submission from {name}")),
            headers,
            body,
        }
    }

    /// Full message text: headers, blank line, body.
    pub fn to_message(&self) -> String {
        let mut out = format!("To: {}\nSubject: {}\n", self.to, self.subject);
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\n');
        out
    }
}

pub trait Mailer: Send + Sync {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>>;
}

/// Pipes messages to `sendmail -t -i`.
pub struct SendmailMailer {
    program: PathBuf,
}

impl SendmailMailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let program = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| MailError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // An early exit closes the pipe; the exit status below decides.
            match stdin.write_all(mail.to_message().as_bytes()).await {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(MailError::Exit {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(to = %mail.to, "Mail handed to sendmail");
        Ok(())
    }
}

impl Mailer for SendmailMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(self.deliver(mail))
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            tracing::info!(to = %mail.to, subject = %mail.subject, bytes = mail.body.len(), "Mail (log transport)");
            tracing::debug!(message = %mail.to_message(), "Mail contents");
            Ok(())
        })
    }
}

pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match config.transport {
        MailTransport::Sendmail => Arc::new(SendmailMailer::new(&config.sendmail_path)),
        MailTransport::Log => Arc::new(LogMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Jo <Admin>\r\nBcc: x@evil.test".into(),
            email: "jo@folio.dev".into(),
            project: "Site & shop".into(),
            message: "Hello\nthere".into(),
        }
    }

    #[test]
    fn test_compose() {
        let id = Uuid::new_v4();
        let mail = OutgoingMail::compose(&submission(), "me@folio.dev", "folio-site/test", id);

        assert_eq!(mail.to, "me@folio.dev");
        assert_eq!(mail.subject, "New Contact Form Submission from Jo &lt;Admin&gt;  Bcc: x@evil.test");
        assert!(mail.headers.contains(&("Reply-To".to_string(), "jo@folio.dev".to_string())));
        assert!(mail.headers.contains(&("X-Submission-Id".to_string(), id.to_string())));
        assert!(mail.body.contains("Project: Site &amp; shop\n"));
        assert!(mail.body.ends_with("Message:\nHello\nthere"));

        let text = mail.to_message();
        assert!(text.starts_with("To: me@folio.dev\nSubject: New Contact"));
        assert!(text.contains("\n\nName: "));
        let header_block = text.split("\n\n").next().unwrap();
        assert_eq!(header_block.lines().filter(|l| l.starts_with("Bcc:")).count(), 0);
    }

    #[tokio::test]
    async fn test_log_mailer_succeeds() {
        let mail = OutgoingMail::compose(&submission(), "me@folio.dev", "x", Uuid::new_v4());
        LogMailer.send(&mail).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_sendmail_binary() {
        let mail = OutgoingMail::compose(&submission(), "me@folio.dev", "x", Uuid::new_v4());
        let err = SendmailMailer::new("/nonexistent/sendmail").send(&mail).await.unwrap_err();
        assert!(matches!(err, MailError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sendmail_exit_status() {
        let mail = OutgoingMail::compose(&submission(), "me@folio.dev", "x", Uuid::new_v4());
        SendmailMailer::new("true").send(&mail).await.unwrap();

        let err = SendmailMailer::new("false").send(&mail).await.unwrap_err();
        assert!(matches!(err, MailError::Exit { .. }));
    }
}
