use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex HMAC-SHA256 of `body`. An optional `sha256=` prefix is allowed.
pub fn verify(secret: &str, body: &[u8], provided: &str) -> bool {
    let provided = provided.trim();
    let provided = provided.strip_prefix("sha256=").unwrap_or(provided);
    let Some(expected) = sign(secret, body) else {
        return false;
    };
    ConstantTimeEq::ct_eq(
        provided.to_ascii_lowercase().as_bytes(),
        expected.as_bytes(),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_signature() {
        let body = br#"{"event":"interview.status-change"}"#;
        let sig = sign("whsec", body).unwrap();
        assert!(verify("whsec", body, &sig));
        assert!(verify("whsec", body, &format!("sha256={}", sig.to_uppercase())));
        assert!(!verify("other", body, &sig));
        assert!(!verify("whsec", b"tampered", &sig));
    }
}
