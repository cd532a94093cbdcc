use async_trait::async_trait;
use diig_releases::AuthOracle;
use diig_releases::Principal;

/// Environment variable naming the signed-in principal.
pub const PRINCIPAL_ENV_VAR: &str = "DIIG_PRINCIPAL";

/// Reads the principal from [`PRINCIPAL_ENV_VAR`] on every query.
#[derive(Debug, Default)]
pub struct EnvOracle;

#[async_trait]
impl AuthOracle for EnvOracle {
    async fn current_principal(&self) -> Option<Principal> {
        let id = std::env::var(PRINCIPAL_ENV_VAR).ok()?;
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        Some(Principal { id: id.to_string() })
    }
}
