//! Digest delivery through the local mail client.
//!
//! The digest is handed to a `sendmail`-compatible program (`sendmail -t -i`
//! by default) as a complete RFC 5322 message on stdin; the program reads the
//! recipients from the headers and takes care of transport.

use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, instrument};

/// Failures while handing a message to the mail program.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("cannot start mail program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write message to mail program: {0}")]
    Write(#[source] std::io::Error),
    #[error("mail program exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
}

/// A single HTML email.
#[derive(Debug, Clone)]
pub struct Email {
    pub to: String,
    pub from: Option<String>,
    pub subject: String,
    pub html_body: String,
}

fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

impl Email {
    /// Serialize as an RFC 5322 message with an HTML body.
    pub fn to_message(&self) -> String {
        let mut message = String::new();
        message.push_str(&format!("To: {}\r\n", header_value(&self.to)));
        if let Some(from) = &self.from {
            message.push_str(&format!("From: {}\r\n", header_value(from)));
        }
        message.push_str(&format!("Subject: {}\r\n", header_value(&self.subject)));
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/html; charset=utf-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");
        message.push_str("\r\n");
        message.push_str(&self.html_body);
        message
    }
}

/// Trait for anything able to deliver an [`Email`].
pub trait Mailer {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Delivers mail by piping it into a local `sendmail`-compatible program.
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    program: String,
    args: Vec<String>,
}

impl SendmailMailer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["-t".to_string(), "-i".to_string()],
        }
    }

    /// Replace the default `-t -i` arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Mailer for SendmailMailer {
    #[instrument(level = "info", skip_all, fields(program = %self.program, to = %email.to))]
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| MailError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(email.to_message().as_bytes())
                .await
                .map_err(MailError::Write)?;
            stdin.shutdown().await.map_err(MailError::Write)?;
        }

        let output = child.wait_with_output().await.map_err(MailError::Write)?;
        if !output.status.success() {
            return Err(MailError::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(bytes = email.html_body.len(), "Handed digest to mail program");
        Ok(())
    }
}
