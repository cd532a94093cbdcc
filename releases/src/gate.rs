//! Route guard in front of the browser.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use tracing::info;

/// An authenticated caller. Opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
}

/// Source of the currently authenticated principal.
#[async_trait]
pub trait AuthOracle: Send + Sync {
    async fn current_principal(&self) -> Option<Principal>;
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    /// No principal: send the caller to the login route instead.
    Redirect { to: String },
}

/// Checks every navigation against the oracle. Nothing is cached between
/// checks.
pub struct AccessGate {
    oracle: Arc<dyn AuthOracle>,
    login_path: String,
}

impl AccessGate {
    pub fn new(oracle: Arc<dyn AuthOracle>, login_path: impl Into<String>) -> Self {
        Self {
            oracle,
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub async fn check(&self, path: &str) -> GateDecision {
        if path == self.login_path {
            return GateDecision::Proceed;
        }
        match self.oracle.current_principal().await {
            Some(principal) => {
                debug!("Principal {} may open {path}", principal.id);
                GateDecision::Proceed
            }
            None => {
                info!("No authenticated principal for {path}, redirecting to {}", self.login_path);
                GateDecision::Redirect {
                    to: self.login_path.clone(),
                }
            }
        }
    }
}
