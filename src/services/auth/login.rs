use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::services::auth::credentials::{CredentialError, CredentialVerifier};
use crate::services::auth::principal::Principal;
use crate::services::auth::token_codec::TokenCodec;

/// Service-level result of a successful login.
///
/// Handlers map this into the HTTP DTO (LoginResponse).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub principal: Principal,
}

/// Orchestrates credential verification and token issuance.
///
/// This is the only component that mints access tokens.
#[derive(Clone)]
pub struct LoginService {
    verifier: Arc<dyn CredentialVerifier>,
    codec: Arc<TokenCodec>,
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl LoginService {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, codec: Arc<TokenCodec>) -> Self {
        Self { verifier, codec }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        let principal = match self.verifier.verify(username, password).await {
            Ok(principal) => principal,
            Err(CredentialError::Rejected) => {
                warn!(username = %username, "login rejected");
                return Err(AppError::AuthenticationFailed);
            }
            Err(err @ CredentialError::Backend(_)) => {
                error!(error = %err, "credential verification failed");
                return Err(AppError::Internal);
            }
        };

        let token = self.codec.encode(&principal, Utc::now())?;
        info!(subject = %principal.subject(), "access token issued");

        Ok(IssuedToken { token, principal })
    }
}
