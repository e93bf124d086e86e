use sha2::{Digest, Sha256};

/// Proof that the caller presented the administrator key. Administrative
/// operations take one of these, so they cannot be reached without it.
#[derive(Debug, Clone)]
pub struct AdminCapability {
    _private: (),
}

impl AdminCapability {
    /// Mint a capability if `presented` matches the configured key.
    /// Both sides are digested first so the comparison is over fixed-length
    /// values.
    pub fn verify(presented: &str, configured: &str) -> Option<Self> {
        if configured.is_empty() {
            return None;
        }

        let presented = Sha256::digest(presented.as_bytes());
        let configured = Sha256::digest(configured.as_bytes());

        (presented == configured).then_some(Self { _private: () })
    }
}
