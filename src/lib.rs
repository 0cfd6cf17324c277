//! Send a plaintext notification email through an SMTP relay.
//!
//! The relay is described by a [`MailerConfig`], usually read from the
//! `SMTP_*` environment variables. Each [`Mailer::send`] call opens a
//! session, upgrades it with `STARTTLS`, authenticates, delivers a single
//! `text/plain` message and closes the session. The SMTP exchange itself is
//! done by [lettre](https://lettre.rs).
//!
//! ```rust,no_run
//! use relay_mailer::Mailer;
//!
//! let mailer = Mailer::from_env()?;
//!
//! match mailer.send("user@example.com", "Hi", "Hello") {
//!     Ok(sent) => println!("{sent}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # Ok::<(), relay_mailer::Error>(())
//! ```
//!
//! Failures never panic: connection, TLS, authentication and relay errors
//! all come back as an [`Error`] displaying `Failed to send email: <cause>`.

#![deny(unsafe_code, unstable_features, missing_debug_implementations)]

#[cfg(not(any(feature = "native-tls", feature = "rustls", feature = "boring-tls")))]
compile_error!("one of the native-tls, rustls or boring-tls features must be enabled");

pub mod config;
mod error;
mod mailer;

pub use crate::{
    config::{MailerConfig, Tls},
    error::Error,
    mailer::{Mailer, Sent},
};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
