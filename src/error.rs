//! Error type returned by every failing send

use std::{error::Error as StdError, fmt};

use crate::BoxError;

/// The errors that may occur while building or delivering an email
///
/// Whatever the cause, the error displays as `Failed to send email: <cause>`.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if the configuration was invalid or incomplete
    pub fn is_config(&self) -> bool {
        matches!(self.inner.kind, Kind::Config)
    }

    /// Returns true if the subject or the body was empty
    pub fn is_input(&self) -> bool {
        matches!(self.inner.kind, Kind::Input)
    }

    /// Returns true if the sender or recipient address could not be parsed
    pub fn is_address(&self) -> bool {
        matches!(self.inner.kind, Kind::Address)
    }

    /// Returns true if the message could not be built
    pub fn is_message(&self) -> bool {
        matches!(self.inner.kind, Kind::Message)
    }

    /// Returns true if the transport failed: connection, TLS, authentication or relay rejection
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport)
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// Missing or malformed configuration value
    Config,
    /// Empty subject or body
    Input,
    /// Unparsable email address
    Address,
    /// Message builder rejected the input
    Message,
    /// Failure reported by the transport
    Transport,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("relay_mailer::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Failed to send email: ")?;

        let label = match self.inner.kind {
            Kind::Config => Some("invalid configuration"),
            Kind::Input => Some("invalid input"),
            Kind::Address => Some("invalid address"),
            Kind::Message => Some("cannot build message"),
            // transport errors already describe themselves
            Kind::Transport => None,
        };

        match (label, &self.inner.source) {
            (Some(label), Some(e)) => write!(f, "{label}: {e}"),
            (Some(label), None) => f.write_str(label),
            (None, Some(e)) => write!(f, "{e}"),
            (None, None) => f.write_str("transport error"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn std::error::Error + 'static) = &**e;
            r
        })
    }
}

pub(crate) fn config<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Config, Some(e))
}

pub(crate) fn input<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Input, Some(e))
}

pub(crate) fn address<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Address, Some(e))
}

pub(crate) fn message<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Message, Some(e))
}

pub(crate) fn transport<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transport, Some(e))
}
