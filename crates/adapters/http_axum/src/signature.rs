//! GitHub webhook signature verification (`X-Hub-Signature-256`).
//!
//! GitHub signs the raw request body with HMAC-SHA256 keyed by the webhook
//! secret and sends `sha256=<hex digest>`. The digest is compared in
//! constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Why a webhook signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature header missing")]
    Missing,
    #[error("signature header is not of the form sha256=<hex>")]
    Malformed,
    #[error("signature does not match payload")]
    Mismatch,
    #[error("webhook secret cannot be used as an HMAC key")]
    InvalidKey,
}

fn mac(secret: &[u8], body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(body);
    Ok(mac)
}

/// Compute the `sha256=<hex>` header value for `body`.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidKey`] if the HMAC cannot be keyed.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let digest = mac(secret, body)?.finalize().into_bytes();
    Ok(format!("{PREFIX}{}", hex::encode(digest)))
}

/// Check `header` against the HMAC of `body`.
///
/// # Errors
///
/// Returns the [`SignatureError`] describing why the signature is rejected.
pub fn verify(secret: &[u8], body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let digest = header
        .trim()
        .strip_prefix(PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(digest).map_err(|_| SignatureError::Malformed)?;
    mac(secret, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"It's a Secret to Everybody";
    const BODY: &[u8] = b"Hello, World!";

    #[test]
    fn should_match_published_github_example() {
        // Test vector from GitHub's "Validating webhook deliveries" guide.
        assert_eq!(
            sign(SECRET, BODY).unwrap(),
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn should_accept_correct_signature() {
        let header = sign(SECRET, BODY).unwrap();
        assert_eq!(verify(SECRET, BODY, Some(&header)), Ok(()));
    }

    #[test]
    fn should_reject_tampered_body() {
        let header = sign(SECRET, BODY).unwrap();
        assert_eq!(
            verify(SECRET, b"Hello, World?", Some(&header)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn should_reject_wrong_secret() {
        let header = sign(b"other", BODY).unwrap();
        assert_eq!(
            verify(SECRET, BODY, Some(&header)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn should_reject_missing_header() {
        assert_eq!(verify(SECRET, BODY, None), Err(SignatureError::Missing));
    }

    #[test]
    fn should_reject_header_without_prefix() {
        let header = sign(SECRET, BODY).unwrap();
        let bare = header.trim_start_matches(PREFIX);
        assert_eq!(
            verify(SECRET, BODY, Some(bare)),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn should_reject_non_hex_digest() {
        assert_eq!(
            verify(SECRET, BODY, Some("sha256=zz")),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn should_reject_truncated_digest() {
        let header = sign(SECRET, BODY).unwrap();
        assert_eq!(
            verify(SECRET, BODY, Some(&header[..header.len() - 2])),
            Err(SignatureError::Mismatch)
        );
    }
}
