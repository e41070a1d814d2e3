use std::{error::Error as StdError, fmt};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied claims embedded in an access token.
pub type Claims = Map<String, Value>;

// Stamped by the issuer; never taken from the caller.
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

// Errors returned by access-token issuance and verification.
#[derive(Debug)]
pub enum AccessJwtError {
    Sign(jsonwebtoken::errors::Error),
    Verify(jsonwebtoken::errors::Error),
    TtlOverflow,
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sign(e) => write!(f, "jwt signing failed: {}", e),
            Self::Verify(e) => write!(f, "jwt verification failed: {}", e),
            Self::TtlOverflow => write!(f, "token lifetime overflows the clock"),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Sign(e) | Self::Verify(e) => Some(e),
            Self::TtlOverflow => None,
        }
    }
}

/// Decoded access-token payload.
///
/// `claims` holds exactly what was passed to [`AccessJwt::issue`] (minus
/// `iat`/`exp`, which live in their own fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub claims: Claims,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn email(&self) -> Option<&str> {
        self.claims.get("email").and_then(Value::as_str)
    }
}

/// HS256 access-token issuer and verifier.
///
/// Tokens are self-contained: validity depends only on the signature and
/// `exp`. Nothing is stored server-side, so verification is repeatable.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AccessJwt {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl fmt::Debug for AccessJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AccessJwt")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl AccessJwt {
    pub fn new(secret: &[u8], ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        // Claims are caller-defined; an `aud` in them must not make the token unverifiable.
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign `claims` into a token that expires `ttl_seconds` from now.
    pub fn issue(&self, claims: Claims) -> Result<String, AccessJwtError> {
        self.issue_at(claims, chrono::Utc::now().timestamp())
    }

    fn issue_at(&self, mut claims: Claims, now: i64) -> Result<String, AccessJwtError> {
        for key in RESERVED_CLAIMS {
            claims.remove(key);
        }

        let ttl = i64::try_from(self.ttl_seconds).map_err(|_| AccessJwtError::TtlOverflow)?;
        let exp = now.checked_add(ttl).ok_or(AccessJwtError::TtlOverflow)?;

        let payload = TokenClaims {
            claims,
            iat: now,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &payload, &self.encoding_key).map_err(AccessJwtError::Sign)
    }

    /// Check signature and expiry, then decode the payload.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AccessJwtError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AccessJwtError::Verify)
    }
}
