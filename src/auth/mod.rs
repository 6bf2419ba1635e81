//! Credential acquisition.
//!
//! The core never decides *how* credentials are obtained. It depends on
//! the `CredentialProvider` capability, and the binary picks one of the
//! two strategies below from configuration:
//! - `ServiceCredentials` — unattended deployments, token read from an env var
//! - `InteractiveCredentials` — operator pastes a token at startup

use anyhow::Result;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::io::BufRead;
use tracing::{debug, info};

use crate::config::{AppConfig, AuthConfig, AuthMode};
use crate::types::SignalError;

/// Default env var consulted when `token_env` is not configured.
const DEFAULT_TOKEN_ENV: &str = "SIGNALCAST_SERVICE_TOKEN";

/// Bearer credentials for the prediction and sentiment services.
#[derive(Clone)]
pub struct Credentials {
    token: SecretString,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credentials([REDACTED])")
    }
}

/// Abstraction over credential acquisition strategies.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn obtain(&self) -> Result<Credentials>;

    /// Strategy name for logging.
    fn name(&self) -> &str;
}

/// Build the provider selected in `[auth]`.
pub fn from_config(cfg: &AuthConfig) -> Box<dyn CredentialProvider> {
    match cfg.mode {
        AuthMode::Service => Box::new(ServiceCredentials::new(
            cfg.token_env.clone().unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string()),
        )),
        AuthMode::Interactive => Box::new(InteractiveCredentials),
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct ServiceCredentials {
    token_env: String,
}

impl ServiceCredentials {
    pub fn new(token_env: impl Into<String>) -> Self {
        Self {
            token_env: token_env.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for ServiceCredentials {
    async fn obtain(&self) -> Result<Credentials> {
        let token = AppConfig::resolve_env(&self.token_env)?;
        if token.trim().is_empty() {
            return Err(SignalError::Credentials(format!("{} is empty", self.token_env)).into());
        }
        debug!(env = %self.token_env, "Service token resolved");
        Ok(Credentials::new(token.trim()))
    }

    fn name(&self) -> &str {
        "service"
    }
}

// ---------------------------------------------------------------------------
// Interactive
// ---------------------------------------------------------------------------

pub struct InteractiveCredentials;

impl InteractiveCredentials {
    /// Read a single non-empty token line.
    fn read_token<R: BufRead>(mut reader: R) -> Result<Credentials> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let token = line.trim();
        if token.is_empty() {
            return Err(SignalError::Credentials("no token entered".into()).into());
        }
        Ok(Credentials::new(token))
    }
}

#[async_trait]
impl CredentialProvider for InteractiveCredentials {
    async fn obtain(&self) -> Result<Credentials> {
        info!("Waiting for an access token on stdin");
        eprint!("Paste access token: ");
        tokio::task::spawn_blocking(|| {
            let stdin = std::io::stdin();
            Self::read_token(stdin.lock())
        })
        .await?
    }

    fn name(&self) -> &str {
        "interactive"
    }
}
