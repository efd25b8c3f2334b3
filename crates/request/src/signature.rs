//! HMAC-SHA256 request signing.
//!
//! The signature covers the method, publish key, path, sorted encoded query,
//! and body, one per line. It is sent as `signature=v2.<base64url>` with the
//! `=` padding stripped.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{HttpMethod, PubSubError, SecretKey};

type HmacSha256 = Hmac<Sha256>;

/// Version prefix of the signature value.
pub const SIGNATURE_VERSION: &str = "v2";

/// Builds the newline-separated string the signature is computed over.
pub fn signing_input(
    method: HttpMethod,
    publish_key: &str,
    path: &str,
    encoded_query: &str,
    body: &[u8],
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}",
        method,
        publish_key,
        path,
        encoded_query,
        String::from_utf8_lossy(body)
    )
}

/// Signs `input` with `secret`, returning the `v2.`-prefixed value.
pub fn sign(secret: &SecretKey, input: &str) -> Result<String, PubSubError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_str().as_bytes())
        .map_err(|e| PubSubError::construction(format!("invalid secret key: {e}")))?;
    mac.update(input.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(format!("{SIGNATURE_VERSION}.{}", URL_SAFE_NO_PAD.encode(digest)))
}
