use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::error::AppError;
use crate::services::auth::principal::Principal;
use crate::services::auth::secret::SecretKey;

/// Lifetime of every access token.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Reasons a presented token is rejected.
///
/// `kind()` is the machine-readable value returned to clients in the `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is not a well-formed signed token")]
    Malformed,
    #[error("token signature is not valid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed => "TokenMalformed",
            Self::InvalidSignature => "TokenInvalidSignature",
            Self::Expired => "TokenExpired",
        }
    }
}

/// Access token claims.
///
/// - `roles` is the plain list of role names, sorted so encoding is deterministic
/// - `iat` / `exp` are epoch seconds
#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
}

/// HS256 signer/verifier for access tokens.
///
/// Both keys are derived from the same `SecretKey`, and a single instance is
/// shared (via `Arc`) by the login path and the request authenticator.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_seconds", &TOKEN_TTL_SECONDS)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(key: &SecretKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller-supplied `now` in `decode`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    pub fn ttl() -> Duration {
        Duration::seconds(TOKEN_TTL_SECONDS)
    }

    /// Sign a token for `principal`, valid from `now` for one hour.
    pub fn encode(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, AppError> {
        let iat = now.timestamp();
        let claims = AccessTokenClaims {
            sub: principal.subject().to_string(),
            roles: principal.roles().iter().cloned().collect(),
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |e| {
                error!(error = %e, "failed to sign access token");
                AppError::Internal
            },
        )
    }

    /// Verify `token` and rebuild the principal it was issued for.
    ///
    /// Checks run in a fixed order: structure, then signature, then expiry.
    /// The signature comparison is the HMAC primitive's constant-time verify.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        if !is_well_formed(token) {
            return Err(TokenError::Malformed);
        }

        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            _ => TokenError::Malformed,
        })?;

        let claims = data.claims;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.sub.trim().is_empty() {
            return Err(TokenError::Malformed);
        }

        Ok(Principal::new(claims.sub, claims.roles))
    }
}

/// Three non-empty, dot-separated, unpadded base64url segments.
fn is_well_formed(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3
        && segments
            .iter()
            .all(|s| !s.is_empty() && URL_SAFE_NO_PAD.decode(s).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::secret::SECRET_KEY_LEN;
    use chrono::TimeZone;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SecretKey::from_bytes([42u8; SECRET_KEY_LEN]))
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn ana() -> Principal {
        Principal::new("ana", ["ROLE_USER"])
    }

    #[test]
    fn round_trips_within_validity_window() {
        let codec = codec();
        let t = issued_at();
        let token = codec.encode(&ana(), t).unwrap();

        for offset in [0, 1, 1800, TOKEN_TTL_SECONDS - 1] {
            let decoded = codec.decode(&token, t + Duration::seconds(offset)).unwrap();
            assert_eq!(decoded, ana());
        }
    }

    #[test]
    fn expires_after_ttl() {
        let codec = codec();
        let t = issued_at();
        let token = codec.encode(&ana(), t).unwrap();

        for offset in [TOKEN_TTL_SECONDS, TOKEN_TTL_SECONDS + 1, 86_400] {
            let err = codec
                .decode(&token, t + Duration::seconds(offset))
                .unwrap_err();
            assert_eq!(err, TokenError::Expired);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let codec = codec();
        let t = issued_at();
        let a = Principal::new("bob", ["ROLE_USER", "ROLE_ADMIN"]);
        let b = Principal::new("bob", ["ROLE_ADMIN", "ROLE_USER", "ROLE_USER"]);

        assert_eq!(codec.encode(&a, t).unwrap(), codec.encode(&b, t).unwrap());
    }

    #[test]
    fn roles_round_trip_as_a_set() {
        let codec = codec();
        let t = issued_at();
        let p = Principal::new("bob", ["ROLE_USER", "ROLE_ADMIN", "ROLE_ADMIN"]);
        let decoded = codec.decode(&codec.encode(&p, t).unwrap(), t).unwrap();

        assert_eq!(decoded.roles().len(), 2);
        assert!(decoded.has_role("ROLE_ADMIN"));
        assert!(decoded.has_role("ROLE_USER"));
    }

    #[test]
    fn payload_carries_expected_claims() {
        let codec = codec();
        let t = issued_at();
        let token = codec.encode(&ana(), t).unwrap();

        let payload = token.split('.').nth(1).unwrap();
        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

        assert_eq!(claims["sub"], "ana");
        assert_eq!(claims["roles"], serde_json::json!(["ROLE_USER"]));
        assert_eq!(claims["iat"], t.timestamp());
        assert_eq!(claims["exp"], t.timestamp() + TOKEN_TTL_SECONDS);
    }

    #[test]
    fn any_flipped_signature_bit_is_rejected() {
        let codec = codec();
        let t = issued_at();
        let token = codec.encode(&ana(), t).unwrap();
        let (signed, signature) = token.rsplit_once('.').unwrap();
        let signature = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for byte in 0..signature.len() {
            for bit in 0..8 {
                let mut tampered = signature.clone();
                tampered[byte] ^= 1 << bit;
                let forged = format!("{signed}.{}", URL_SAFE_NO_PAD.encode(&tampered));

                assert_eq!(
                    codec.decode(&forged, t).unwrap_err(),
                    TokenError::InvalidSignature
                );
            }
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let t = issued_at();
        let token = codec.encode(&ana(), t).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();

        let forged_claims = serde_json::json!({
            "sub": "ana",
            "roles": ["ROLE_ADMIN"],
            "iat": t.timestamp(),
            "exp": t.timestamp() + TOKEN_TTL_SECONDS,
        });
        let forged_payload = URL_SAFE_NO_PAD.encode(forged_claims.to_string());
        parts[1] = &forged_payload;

        assert_eq!(
            codec.decode(&parts.join("."), t).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let t = issued_at();
        let other = TokenCodec::new(&SecretKey::from_bytes([1u8; SECRET_KEY_LEN]));
        let token = other.encode(&ana(), t).unwrap();

        assert_eq!(
            codec().decode(&token, t).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn structurally_invalid_tokens_are_malformed() {
        let codec = codec();
        let t = issued_at();

        for token in ["", "garbage", "a.b", "a.b.c.d", "..", "a..c", "a.b.c!", "abc.d*f.ghi"] {
            assert_eq!(
                codec.decode(token, t).unwrap_err(),
                TokenError::Malformed,
                "token {token:?}"
            );
        }
    }

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(TokenError::Malformed.kind(), "TokenMalformed");
        assert_eq!(TokenError::InvalidSignature.kind(), "TokenInvalidSignature");
        assert_eq!(TokenError::Expired.kind(), "TokenExpired");
    }
}
