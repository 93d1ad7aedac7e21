use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque reference to an externally-held ciphertext.
///
/// The registry only stores, orders, and hashes these; decryption happens
/// in the external oracle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CiphertextHandle(pub [u8; 32]);

impl CiphertextHandle {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for CiphertextHandle {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Identity of a record submitter.
///
/// Carried through to the observation stream only; authorization itself is
/// enforced upstream of the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PartyId(pub [u8; 32]);

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_displays_as_hex() {
        let handle = CiphertextHandle([0xab; 32]);
        assert_eq!(handle.to_string(), "ab".repeat(32));
    }
}
