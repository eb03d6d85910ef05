//! Process-wide HMAC signing key.
//!
//! The key is generated once at start-up and handed to the `TokenCodec`.
//! It is never written anywhere, so a restart invalidates every token issued
//! by the previous process.

pub const SECRET_KEY_LEN: usize = 32;

/// Symmetric key used to sign and verify access tokens.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    /// Draw a fresh key from the OS CSPRNG.
    pub fn generate() -> Result<Self, getrandom::Error> {
        let mut bytes = [0u8; SECRET_KEY_LEN];
        getrandom::fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}
