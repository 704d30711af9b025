//! Whole-document checksums and verification.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::domain::{AnchorEvidence, Primary};
use crate::error::{AnchorError, Result};

/// Algorithms available for the document checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumAlgorithm {
    /// MD5 (weak, kept for compatibility with stored fragment identifiers)
    Md5,
    /// SHA-1 (weak)
    Sha1,
    /// SHA-256
    #[default]
    Sha256,
    /// Byte length only, as 8 big-endian bytes
    Length,
}

impl ChecksumAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Length => "length",
        }
    }

    /// Digest the UTF-8 encoding of `content`
    pub fn digest(&self, content: &str) -> Vec<u8> {
        let bytes = content.as_bytes();
        match self {
            ChecksumAlgorithm::Md5 => Md5::digest(bytes).to_vec(),
            ChecksumAlgorithm::Sha1 => Sha1::digest(bytes).to_vec(),
            ChecksumAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                hasher.finalize().to_vec()
            }
            ChecksumAlgorithm::Length => (bytes.len() as u64).to_be_bytes().to_vec(),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = AnchorError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha" | "sha1" | "sha-1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(ChecksumAlgorithm::Sha256),
            "length" => Ok(ChecksumAlgorithm::Length),
            _ => Err(AnchorError::UnsupportedAlgorithm(name.to_string())),
        }
    }
}

/// Digest a primary's full content
pub fn checksum<P: Primary + ?Sized>(primary: &P, algorithm: ChecksumAlgorithm) -> Result<Vec<u8>> {
    let content = primary.content()?;
    Ok(algorithm.digest(&content))
}

/// True iff the primary's current content digests to the stored checksum.
///
/// A `true` result means the document is unchanged since capture and the
/// original span can be reused without relocation.
pub fn verify<P: Primary + ?Sized>(evidence: &AnchorEvidence, primary: &P) -> Result<bool> {
    if primary.kind() != evidence.primary_kind() {
        return Err(AnchorError::InvalidPrimary {
            expected: evidence.primary_kind(),
            actual: primary.kind(),
        });
    }

    let digest = checksum(primary, evidence.algorithm())?;
    Ok(digest == evidence.checksum())
}
