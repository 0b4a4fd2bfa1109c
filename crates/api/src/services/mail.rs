//! Transactional email delivery.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. The service
//! core only composes subject and body; delivery failures surface as typed
//! errors and are never retried here.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use digizone_core::Email;

use crate::config::EmailConfig;

/// HTML template for the verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.html")]
struct VerificationCodeEmailHtml<'a> {
    code: &'a str,
}

/// Plain text template for the verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.txt")]
struct VerificationCodeEmailText<'a> {
    code: &'a str,
}

/// HTML template for the temporary password email.
#[derive(Template)]
#[template(path = "email/temporary_password.html")]
struct TemporaryPasswordEmailHtml<'a> {
    password: &'a str,
}

/// Plain text template for the temporary password email.
#[derive(Template)]
#[template(path = "email/temporary_password.txt")]
struct TemporaryPasswordEmailText<'a> {
    password: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

/// Outbound notification gateway.
///
/// The accounts service is generic over this trait so unit tests can capture
/// outbound mail instead of talking to an SMTP relay.
#[allow(async_fn_in_trait)]
pub trait Mailer: Send + Sync {
    /// Send the email-verification code.
    async fn send_verification_code(&self, to: &Email, code: &str) -> Result<(), MailError>;

    /// Send a freshly generated temporary password.
    ///
    /// This is the only channel that ever carries the plaintext.
    async fn send_temporary_password(&self, to: &Email, password: &str) -> Result<(), MailError>;
}

/// SMTP-backed mailer.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &Email,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

impl Mailer for SmtpMailer {
    async fn send_verification_code(&self, to: &Email, code: &str) -> Result<(), MailError> {
        let html = VerificationCodeEmailHtml { code }.render()?;
        let text = VerificationCodeEmailText { code }.render()?;

        self.send_multipart_email(to, "Verify your Digizone account", &text, &html)
            .await
    }

    async fn send_temporary_password(&self, to: &Email, password: &str) -> Result<(), MailError> {
        let html = TemporaryPasswordEmailHtml { password }.render()?;
        let text = TemporaryPasswordEmailText { password }.render()?;

        self.send_multipart_email(to, "Your Digizone password was reset", &text, &html)
            .await
    }
}
