use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{ConcealError, SdAlg};

/// Minimum salt size, in bytes.
pub const MIN_SALT_SIZE: usize = 128 / 8;

/// Maximum salt size, in bytes.
pub const MAX_SALT_SIZE: usize = 1024;

/// Salt size used when none is configured, in bytes.
pub const DEFAULT_SALT_SIZE: usize = MIN_SALT_SIZE;

/// Concealing options.
///
/// Can be deserialized from a configuration document:
/// ```json
/// { "hashAlg": "sha-512", "bytesOfSalt": 32 }
/// ```
/// Missing fields take their default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclosureOptions {
    /// Hash algorithm. Defaults to the algorithm already in use by the
    /// concealed object, or [`SdAlg::Sha256`].
    #[serde(rename = "hashAlg", skip_serializing_if = "Option::is_none")]
    pub sd_alg: Option<SdAlg>,

    /// Number of random bytes in each salt.
    #[serde(rename = "bytesOfSalt")]
    pub salt_size: usize,
}

impl Default for DisclosureOptions {
    fn default() -> Self {
        Self {
            sd_alg: None,
            salt_size: DEFAULT_SALT_SIZE,
        }
    }
}

impl DisclosureOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hash algorithm.
    pub fn with_sd_alg(self, sd_alg: SdAlg) -> Self {
        Self {
            sd_alg: Some(sd_alg),
            ..self
        }
    }

    /// Sets the salt size, in bytes.
    pub fn with_salt_size(self, salt_size: usize) -> Self {
        Self { salt_size, ..self }
    }

    /// Resolves these options against the hash algorithm `current` already
    /// used by an object.
    ///
    /// Fails if both algorithms are defined and differ, or if the salt size
    /// is not between [`MIN_SALT_SIZE`] and [`MAX_SALT_SIZE`].
    pub fn resolve(&self, current: Option<SdAlg>) -> Result<ResolvedOptions, ConcealError> {
        let sd_alg = match (current, self.sd_alg) {
            (Some(expected), Some(found)) if expected != found => {
                return Err(ConcealError::InconsistentSdAlg { expected, found })
            }
            (current, requested) => current.or(requested).unwrap_or_default(),
        };

        if self.salt_size < MIN_SALT_SIZE {
            return Err(ConcealError::SaltTooShort(self.salt_size));
        }

        if self.salt_size > MAX_SALT_SIZE {
            return Err(ConcealError::SaltTooLong(self.salt_size));
        }

        Ok(ResolvedOptions {
            sd_alg,
            salt_size: self.salt_size,
        })
    }
}

/// Options after resolution, ready to conceal claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Hash algorithm.
    pub sd_alg: SdAlg,

    /// Salt size, in bytes.
    pub salt_size: usize,
}

impl ResolvedOptions {
    /// Draws a fresh salt from `rng`.
    pub fn generate_salt(&self, rng: &mut (impl CryptoRng + RngCore)) -> String {
        let mut salt_bytes = vec![0u8; self.salt_size];
        rng.fill_bytes(&mut salt_bytes);
        BASE64_URL_SAFE_NO_PAD.encode(salt_bytes)
    }
}
