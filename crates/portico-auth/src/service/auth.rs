//! JWT token service

use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use moka::sync::Cache;

use crate::model::{AuthSettings, PorticoJwtPayload, TokenRejection};

/// Issues, verifies and rotates bearer credentials against one shared secret.
///
/// Holds no per-session state: every credential is self-describing, so a
/// rotation needs nothing but the claims of the credential being replaced.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    /// Recently verified credentials, to skip repeated signature checks
    verified: Cache<String, PorticoJwtPayload>,
}

impl TokenService {
    pub fn new(secret_key: &str, lifetime: Duration) -> jsonwebtoken::errors::Result<Self> {
        if secret_key.trim().is_empty() {
            return Err(ErrorKind::InvalidKeyFormat.into());
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_base64_secret(secret_key)?,
            decoding_key: DecodingKey::from_base64_secret(secret_key)?,
            validation,
            lifetime,
            verified: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(300))
                .build(),
        })
    }

    pub fn from_settings(settings: &AuthSettings) -> jsonwebtoken::errors::Result<Self> {
        Self::new(&settings.secret_key, settings.token_lifetime)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mint a fresh credential for `sub` expiring one lifetime from now
    pub fn issue(&self, sub: &str) -> jsonwebtoken::errors::Result<String> {
        let now = chrono::Utc::now().timestamp();
        self.sign(&PorticoJwtPayload {
            sub: sub.to_string(),
            exp: now + self.lifetime.as_secs() as i64,
            iat: now,
        })
    }

    /// Sign arbitrary claims with the shared secret
    pub fn sign(&self, claims: &PorticoJwtPayload) -> jsonwebtoken::errors::Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<PorticoJwtPayload, TokenRejection> {
        if token.is_empty() {
            return Err(TokenRejection::Missing);
        }

        if let Some(claims) = self.verified.get(token) {
            if claims.exp > chrono::Utc::now().timestamp() {
                return Ok(claims);
            }
            self.verified.invalidate(token);
            return Err(TokenRejection::Expired);
        }

        let data = decode::<PorticoJwtPayload>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenRejection::from(e.kind()))?;

        self.verified.insert(token.to_string(), data.claims.clone());
        Ok(data.claims)
    }

    /// Mint a replacement credential carrying the same subject.
    ///
    /// The new expiry is exactly one lifetime from now and never more, so
    /// repeated renewals cannot stretch a session. It is strictly later than
    /// the replaced expiry whenever the replaced credential was minted in an
    /// earlier second.
    pub fn rotate(
        &self,
        claims: &PorticoJwtPayload,
    ) -> jsonwebtoken::errors::Result<(String, PorticoJwtPayload)> {
        let now = chrono::Utc::now().timestamp();
        let renewed = PorticoJwtPayload {
            sub: claims.sub.clone(),
            exp: now + self.lifetime.as_secs() as i64,
            iat: now,
        };
        let token = self.sign(&renewed)?;
        Ok((token, renewed))
    }
}
