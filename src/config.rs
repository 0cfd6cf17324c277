//! Relay configuration, usually read from the environment
//!
//! | Variable        | Default          | Description                          |
//! |-----------------|------------------|--------------------------------------|
//! | `SMTP_SERVER`   | `smtp.gmail.com` | Relay hostname                       |
//! | `SMTP_PORT`     | `587`            | Relay port                           |
//! | `SMTP_USERNAME` |                  | Login, also used as the `From` address |
//! | `SMTP_PASSWORD` |                  | Password                             |
//! | `SMTP_TLS`      | `starttls`       | `starttls`, `tls` or `none`          |

use std::{
    env::{self, VarError},
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use crate::error::{self, Error};

/// Relay used when `SMTP_SERVER` is unset
pub const DEFAULT_SERVER: &str = "smtp.gmail.com";
/// Submission port, used when `SMTP_PORT` is unset
pub const DEFAULT_PORT: u16 = 587;

/// Relay hostname
pub const SERVER_VAR: &str = "SMTP_SERVER";
/// Relay port
pub const PORT_VAR: &str = "SMTP_PORT";
/// Login, also the sender address
pub const USERNAME_VAR: &str = "SMTP_USERNAME";
/// Password
pub const PASSWORD_VAR: &str = "SMTP_PASSWORD";
/// Encryption mode, see [`Tls`]
pub const TLS_VAR: &str = "SMTP_TLS";

const VARS: [&str; 5] = [SERVER_VAR, PORT_VAR, USERNAME_VAR, PASSWORD_VAR, TLS_VAR];

/// How the session with the relay is encrypted
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tls {
    /// Connect in plaintext, then upgrade with `STARTTLS` before authenticating.
    /// Fails if the relay does not offer the upgrade.
    #[default]
    Starttls,
    /// Encrypt from the first byte (submissions, usually port 465)
    Wrapper,
    /// No encryption at all
    ///
    /// Credentials travel in the clear. Only meant for local relays and tests.
    None,
}

impl FromStr for Tls {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(Tls::Starttls),
            "tls" => Ok(Tls::Wrapper),
            "none" => Ok(Tls::None),
            other => Err(error::config(format!(
                "{TLS_VAR} must be one of starttls, tls or none, got {other:?}"
            ))),
        }
    }
}

impl Display for Tls {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tls::Starttls => "starttls",
            Tls::Wrapper => "tls",
            Tls::None => "none",
        })
    }
}

/// Everything needed to reach and log into the relay
///
/// Built once and handed to [`Mailer::new`](crate::Mailer::new). Username and
/// password are optional here: their absence only becomes an error when a send
/// is attempted.
#[derive(Clone, PartialEq, Eq)]
pub struct MailerConfig {
    /// Relay hostname
    pub server: String,
    pub port: u16,
    /// Login, also used as the `From` address
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: Tls,
}

impl Default for MailerConfig {
    fn default() -> Self {
        MailerConfig {
            server: DEFAULT_SERVER.to_owned(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            tls: Tls::default(),
        }
    }
}

impl MailerConfig {
    /// Creates a configuration for the given relay, without credentials
    pub fn new<S: Into<String>>(server: S, port: u16) -> MailerConfig {
        MailerConfig {
            server: server.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the login, which is also the sender address
    pub fn credentials<U, P>(mut self, username: U, password: P) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the encryption mode
    pub fn tls(mut self, tls: Tls) -> Self {
        self.tls = tls;
        self
    }

    /// Reads the configuration from the process environment
    ///
    /// Only the `SMTP_*` variables are looked at, so unrelated variables that
    /// are not valid unicode do no harm. An `SMTP_*` variable that is not
    /// valid unicode is a configuration error.
    pub fn from_env() -> Result<MailerConfig, Error> {
        let mut vars = Vec::with_capacity(VARS.len());

        for name in VARS {
            match env::var(name) {
                Ok(value) => vars.push((name, value)),
                Err(VarError::NotPresent) => (),
                Err(e @ VarError::NotUnicode(_)) => {
                    return Err(error::config(format!("{name}: {e}")));
                }
            }
        }

        Self::from_vars(vars)
    }

    /// Reads the configuration from a list of `(name, value)` pairs
    ///
    /// Unknown names are ignored and empty values count as unset.
    pub fn from_vars<I, K, V>(vars: I) -> Result<MailerConfig, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = MailerConfig::default();

        for (name, value) in vars {
            let value = value.into();
            if value.is_empty() {
                continue;
            }

            match name.as_ref() {
                SERVER_VAR => config.server = value,
                PORT_VAR => {
                    config.port = value.trim().parse().map_err(|e| {
                        error::config(format!("{PORT_VAR} must be a port number: {e}"))
                    })?;
                }
                USERNAME_VAR => config.username = Some(value),
                PASSWORD_VAR => config.password = Some(value),
                TLS_VAR => config.tls = value.parse()?,
                _ => (),
            }
        }

        Ok(config)
    }
}

impl Debug for MailerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("tls", &self.tls)
            .finish()
    }
}
