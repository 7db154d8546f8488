//! Pseudonymous author fingerprints.
//!
//! Commit author emails never leave the fetch phase in the clear. Each
//! email is reduced to a fixed-length, non-reversible fingerprint that is
//! stable across runs and processes, so the same author always aggregates
//! under the same key.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of an author fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 40;

/// A deterministic, fixed-length pseudonym for a commit author.
///
/// The fingerprint is the SHA-256 digest of the author email, hex-encoded
/// and truncated to [`FINGERPRINT_LEN`] characters (160 bits). The digest
/// step makes the pseudonym non-reversible; the truncation keeps the
/// published `char(40)` column shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorFingerprint(String);

impl AuthorFingerprint {
    /// Computes the fingerprint of an author email.
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        let digest = Sha256::digest(email.as_bytes());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_LEN);
        Self(encoded)
    }

    /// Returns the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the fingerprint, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AuthorFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
