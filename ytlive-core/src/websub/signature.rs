use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::Error;

type HmacSha1 = Hmac<Sha1>;

/// Builds the `X-Hub-Signature` value the hub sends for `body`.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, Error> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Signature(e.to_string()))?;
    mac.update(body);
    Ok(format!("sha1={}", hex::encode(mac.finalize().into_bytes())))
}

/// Checks `header` (`sha1=<hex>`) against the HMAC-SHA1 of `body`. The
/// digest comparison runs in constant time.
pub fn verify(secret: &str, body: &[u8], header: &str) -> bool {
    let Some(digest_hex) = header.trim().strip_prefix("sha1=") else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha1::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
