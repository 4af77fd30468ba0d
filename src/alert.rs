use crate::config::AlertConfig;
use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fs;
use std::path::Path;

pub const ALERT_SUBJECT: &str = "RuneScape Reddit -- Data Collection Failure";

/// Outbound channel for failure alerts.
pub trait AlertSink {
    fn send_alert(&self, subject: &str, body: &str) -> Result<()>;
}

/// Plaintext SMTP submission, with login when credentials are configured.
pub struct SmtpAlerter {
    cfg: AlertConfig,
}

impl SmtpAlerter {
    pub fn new(cfg: AlertConfig) -> Self {
        Self { cfg }
    }
}

impl AlertSink for SmtpAlerter {
    fn send_alert(&self, subject: &str, body: &str) -> Result<()> {
        let from: Mailbox = self.cfg.sender.parse().with_context(|| format!("sender address {}", self.cfg.sender))?;
        let to: Mailbox = self.cfg.receiver.parse().with_context(|| format!("receiver address {}", self.cfg.receiver))?;
        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("build alert email")?;

        let mut builder = SmtpTransport::builder_dangerous(&self.cfg.smtp_host).port(self.cfg.smtp_port);
        if let (Some(user), Some(pass)) = (&self.cfg.username, &self.cfg.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        builder
            .build()
            .send(&email)
            .with_context(|| format!("send alert via {}:{}", self.cfg.smtp_host, self.cfg.smtp_port))?;
        Ok(())
    }
}

/// Alert body for a failed collection on `date`, embedding that day's log verbatim.
pub fn compose_alert_body(date: &str, log_contents: &str) -> String {
    format!(
        "Hello, we are just informing you that there was an error collecting OSRS Reddit post data on: {date}.\n\
         \n\
         Log output:\n\
         {log_contents}\n\
         \n\
         Sincerely,\n\
         \n\
         The OSRS Content Team\n"
    )
}

/// Read today's log and send it. A missing log still produces an alert.
pub fn send_failure_alert(sink: &dyn AlertSink, log_file: &Path, date: &str) -> Result<()> {
    let log_contents = match fs::read_to_string(log_file) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Could not read log file {}: {}", log_file.display(), e);
            format!("(log file {} could not be read: {})", log_file.display(), e)
        }
    };
    sink.send_alert(ALERT_SUBJECT, &compose_alert_body(date, &log_contents))?;
    tracing::info!("Email sent.");
    Ok(())
}
