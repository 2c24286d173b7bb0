/* aham-router/src/auth.rs

Inbound authorization against a single static bearer secret.

- The Authorization header must equal `Bearer <secret>` exactly: scheme case,
  spacing and surrounding whitespace all count.
- Comparison is constant-time over the full header value.
- CORS preflight (OPTIONS) bypasses the check; that short-circuit lives in the
  server middleware.

*/

#![forbid(unsafe_code)]

/// Outcome of checking an Authorization header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Missing,
    Invalid,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        matches!(self, Verification::Valid)
    }
}

/// Verify a raw Authorization header value against the configured secret.
pub fn verify_bearer(secret: &str, auth_header: Option<&str>) -> Verification {
    let Some(raw) = auth_header else {
        return Verification::Missing;
    };
    if raw.is_empty() {
        return Verification::Missing;
    }

    let expected = format!("Bearer {secret}");
    if ct_eq(raw.as_bytes(), expected.as_bytes()) {
        Verification::Valid
    } else {
        Verification::Invalid
    }
}

/// Constant-time equality for two byte slices.
fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
