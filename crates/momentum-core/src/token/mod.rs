//! User bearer tokens.
//!
//! Tokens are HMAC-SHA256 based and bind a single user id.
//! Format: `momentum_ut_<user_id>_<hmac_hex>`

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Token prefix used to identify momentum user tokens.
const TOKEN_PREFIX: &str = "momentum_ut_";

/// Environment variable holding the hex-encoded token secret.
pub const SECRET_ENV: &str = "MOMENTUM_TOKEN_SECRET";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    #[error("invalid user ID in token: {0}")]
    InvalidUserId(String),

    #[error("token HMAC verification failed")]
    HmacMismatch,

    #[error("missing token secret")]
    MissingSecret,
}

/// Secret used to sign and verify tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
}

impl TokenConfig {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Decode a hex-encoded secret, as written by `momentum init`.
    pub fn from_hex(secret_hex: &str) -> Result<Self, TokenError> {
        if secret_hex.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let secret = hex::decode(secret_hex.trim())
            .map_err(|e| TokenError::InvalidFormat(format!("token secret is not valid hex: {e}")))?;
        Ok(Self::new(secret))
    }
}

/// Issue a token for `user_id`. The HMAC covers `user:<user_id>`.
pub fn generate_token(config: &TokenConfig, user_id: Uuid) -> String {
    let mac = compute_hmac(&config.secret, signed_message(user_id).as_bytes());
    format!("{TOKEN_PREFIX}{user_id}_{}", hex::encode(mac))
}

/// Verify a token and return the user id it binds.
pub fn validate_token(config: &TokenConfig, token: &str) -> Result<Uuid, TokenError> {
    let rest = token.strip_prefix(TOKEN_PREFIX).ok_or_else(|| {
        TokenError::InvalidFormat(format!("token must start with '{TOKEN_PREFIX}'"))
    })?;

    // A hyphenated UUID is 36 bytes.
    if rest.len() < 36 || !rest.is_char_boundary(36) {
        return Err(TokenError::InvalidFormat(
            "token too short to contain a valid UUID".to_string(),
        ));
    }
    let (user_id_str, after_user_id) = rest.split_at(36);
    let user_id =
        Uuid::parse_str(user_id_str).map_err(|e| TokenError::InvalidUserId(e.to_string()))?;

    let hmac_hex = after_user_id.strip_prefix('_').ok_or_else(|| {
        TokenError::InvalidFormat("expected underscore after user id".to_string())
    })?;
    let provided_mac = hex::decode(hmac_hex)
        .map_err(|e| TokenError::InvalidFormat(format!("invalid hex in hmac: {e}")))?;

    let mut mac = new_mac(&config.secret);
    mac.update(signed_message(user_id).as_bytes());
    mac.verify_slice(&provided_mac)
        .map_err(|_| TokenError::HmacMismatch)?;

    Ok(user_id)
}

fn signed_message(user_id: Uuid) -> String {
    format!("user:{user_id}")
}

fn compute_hmac(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = new_mac(key);
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn new_mac(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC can take key of any size")
}
