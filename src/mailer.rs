//! Builds the message and hands it to the relay

use std::fmt::{self, Display, Formatter};

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use crate::{
    config::{MailerConfig, Tls, PASSWORD_VAR, USERNAME_VAR},
    error::{self, Error},
    BoxError,
};

/// Success payload of a send
///
/// Displays as `Email sent successfully`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sent;

impl Display for Sent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Email sent successfully")
    }
}

/// Sends plaintext emails through the configured relay
///
/// Every call to [`Mailer::send`] opens its own session, upgrades it with
/// `STARTTLS`, authenticates, delivers and closes it. Nothing is shared
/// between calls, so a `Mailer` can be used from several threads at once.
#[derive(Debug, Clone)]
pub struct Mailer {
    config: MailerConfig,
}

impl Mailer {
    /// Creates a mailer for the given relay
    pub fn new(config: MailerConfig) -> Mailer {
        Mailer { config }
    }

    /// Creates a mailer configured from the `SMTP_*` environment variables
    pub fn from_env() -> Result<Mailer, Error> {
        MailerConfig::from_env().map(Mailer::new)
    }

    /// The configuration this mailer was created with
    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Builds the message `send` would deliver
    ///
    /// The sender is the configured username. Addresses are parsed here, so a
    /// malformed one is rejected before any connection is attempted, and so is
    /// an empty subject or body.
    pub fn message(&self, to: &str, subject: &str, body: &str) -> Result<Message, Error> {
        if subject.is_empty() {
            return Err(error::input("subject is empty"));
        }
        if body.is_empty() {
            return Err(error::input("body is empty"));
        }

        let username = self
            .config
            .username
            .as_deref()
            .ok_or_else(|| error::config(format!("{USERNAME_VAR} is not set")))?;

        // the login doubles as the From address, so it has to be one
        let from: Mailbox = username.parse().map_err(|e| {
            error::address(format!("{USERNAME_VAR} {username:?} is not an email address: {e}"))
        })?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| error::address(format!("recipient {to:?}: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())
            .map_err(error::message)
    }

    /// Sends one email through a fresh session with the relay
    pub fn send(&self, to: &str, subject: &str, body: &str) -> Result<Sent, Error> {
        let message = self.message(to, subject, body)?;
        let transport = self.transport()?;

        tracing::debug!(
            server = %self.config.server,
            port = self.config.port,
            tls = %self.config.tls,
            "opening smtp session"
        );

        self.deliver(&transport, &message)
    }

    /// Sends one email through the given transport instead of the relay
    pub fn send_with<T>(
        &self,
        transport: &T,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<Sent, Error>
    where
        T: Transport,
        T::Error: Into<BoxError>,
    {
        let message = self.message(to, subject, body)?;
        self.deliver(transport, &message)
    }

    fn deliver<T>(&self, transport: &T, message: &Message) -> Result<Sent, Error>
    where
        T: Transport,
        T::Error: Into<BoxError>,
    {
        let to = message.envelope().to();

        match transport.send(message) {
            Ok(_) => {
                tracing::info!(?to, "email accepted by relay");
                Ok(Sent)
            }
            Err(e) => {
                let err = error::transport(e);
                tracing::warn!(?to, error = %err, "email not sent");
                Err(err)
            }
        }
    }

    /// Builds a non-pooled transport: each `send` connects and quits on its own
    fn transport(&self) -> Result<SmtpTransport, Error> {
        let credentials = match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                Credentials::new(username.clone(), password.clone())
            }
            _ => {
                return Err(error::config(format!(
                    "{USERNAME_VAR} and {PASSWORD_VAR} must both be set"
                )))
            }
        };

        let server = self.config.server.as_str();
        let builder = match self.config.tls {
            Tls::Starttls => SmtpTransport::starttls_relay(server).map_err(error::transport)?,
            Tls::Wrapper => SmtpTransport::relay(server).map_err(error::transport)?,
            Tls::None => SmtpTransport::builder_dangerous(server),
        };

        Ok(builder
            .port(self.config.port)
            .credentials(credentials)
            .build())
    }
}
