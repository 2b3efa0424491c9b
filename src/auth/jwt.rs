//! Minimal HS256 JWT encoding and verification.
//!
//! Tokens use base64url without padding. Only the `HS256`/`JWT` header is
//! accepted and signatures are checked with `Hmac::verify_slice`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Unsupported token header")]
    UnsupportedHeader,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

/// Claims carried by every token, checked for expiry on decode.
pub trait Expiring {
    fn expires_at(&self) -> i64;
}

fn b64url_decode(s: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD.decode(s.as_bytes()).map_err(|_| TokenError::Malformed)
}

fn mac(secret: &[u8]) -> Result<Hmac<Sha256>, TokenError> {
    Hmac::<Sha256>::new_from_slice(secret).map_err(|e| TokenError::Encoding(e.to_string()))
}

/// Encode claims as an HS256-signed JWT.
pub fn encode_hs256<T: Serialize>(secret: &[u8], claims: &T) -> Result<String, TokenError> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };

    let header_json = serde_json::to_vec(&header).map_err(|e| TokenError::Encoding(e.to_string()))?;
    let claims_json = serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac = mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

/// Decode an HS256 JWT, verify its signature and reject it once `now`
/// (unix seconds) has reached the `exp` claim.
pub fn decode_hs256<T>(secret: &[u8], token: &str, now: i64) -> Result<T, TokenError>
where
    T: DeserializeOwned + Expiring,
{
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let header: JwtHeader =
        serde_json::from_slice(&b64url_decode(header_b64)?).map_err(|_| TokenError::Malformed)?;
    if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
        return Err(TokenError::UnsupportedHeader);
    }

    let signature = b64url_decode(sig_b64)?;
    let mut mac = mac(secret)?;
    mac.update(format!("{}.{}", header_b64, payload_b64).as_bytes());
    mac.verify_slice(&signature).map_err(|_| TokenError::BadSignature)?;

    let claims: T =
        serde_json::from_slice(&b64url_decode(payload_b64)?).map_err(|_| TokenError::Malformed)?;
    if claims.expires_at() <= now {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}
