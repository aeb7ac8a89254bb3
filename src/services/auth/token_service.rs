use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no name provided")]
    InvalidInput,

    #[error("malformed token")]
    MalformedToken,

    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("failed to sign token")]
    Signing,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::MalformedToken,
        }
    }
}

/// Wire claims.
///
/// `name` is kept as a raw JSON value so a token whose subject is missing or
/// not a string still decodes; the auth gate decides what to do with it.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nbf: Option<i64>,
    exp: i64,
}

/// JOSE header as sent, before `alg` is narrowed to a known algorithm.
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

/// `alg` of a compact JWS (`header.payload.signature`).
fn header_alg(token: &str) -> Result<String, TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::MalformedToken);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::MalformedToken)?;
    let header: RawHeader =
        serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedToken)?;
    Ok(header.alg)
}

/// Claims of a token whose signature and expiry have been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: Option<String>,
    pub not_before: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<TokenClaims> for Claims {
    type Error = TokenError;

    fn try_from(c: TokenClaims) -> Result<Self, Self::Error> {
        let expires_at =
            DateTime::from_timestamp(c.exp, 0).ok_or(TokenError::MalformedToken)?;
        let not_before = match c.nbf {
            Some(nbf) => Some(DateTime::from_timestamp(nbf, 0).ok_or(TokenError::MalformedToken)?),
            None => None,
        };

        Ok(Self {
            subject: c.name.and_then(|v| v.as_str().map(str::to_owned)),
            not_before,
            expires_at,
        })
    }
}

/// Issues and verifies HS256 identity tokens with a single shared secret.
///
/// Tokens are stateless: validity is bounded by `exp` only, there is no
/// server-side revocation.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: TimeDelta,
    // Claims read without the signature, used to report expiry first.
    peek: Validation,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("algorithm", &ALGORITHM)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut peek = Validation::new(ALGORITHM);
        peek.insecure_disable_signature_validation();
        peek.validate_exp = false;
        peek.validate_nbf = false;
        peek.validate_aud = false;

        // exp / nbf are compared in `verify` with exact `now >= exp` semantics.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECONDS),
            peek,
            validation,
        }
    }

    /// Override the token lifetime. A negative value mints already-expired
    /// tokens, which is only useful for tooling and tests.
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    /// Issue a token for `subject` valid from now until now + ttl.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::InvalidInput);
        }

        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            error!(ttl = ?self.ttl, "token lifetime out of range");
            TokenError::Signing
        })?;
        let claims = TokenClaims {
            name: Some(serde_json::Value::String(subject.to_owned())),
            nbf: Some(now.timestamp()),
            exp: expires_at.timestamp(),
        };

        debug!(subject, exp = claims.exp, "issuing token");

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::Signing
        })
    }

    /// Verify `token` and return its claims.
    ///
    /// Checks run in this order: structure, algorithm, expiry, signature,
    /// not-before. Expiry is judged before the signature, so an elapsed token
    /// is reported as `Expired` whoever signed it.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // Read as a plain string so `none` and unknown names are reported as
        // an algorithm mismatch rather than a parse failure.
        let alg = header_alg(token)?;
        if alg != ALGORITHM_NAME {
            debug!(alg = %alg, "rejecting token with unexpected algorithm");
            return Err(TokenError::UnexpectedAlgorithm);
        }

        let now = Utc::now().timestamp();

        let unverified =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.peek)?.claims;
        if now >= unverified.exp {
            return Err(TokenError::Expired);
        }

        let claims =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?.claims;
        if let Some(nbf) = claims.nbf
            && now < nbf
        {
            return Err(TokenError::NotYetValid);
        }

        Claims::try_from(claims)
    }
}
