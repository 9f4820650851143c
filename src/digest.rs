use std::{fmt, str::FromStr};

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::{disclosure::Disclosure, DecodeError};

/// Hash algorithm turning disclosures into digests.
///
/// An object uses a single algorithm for all of its digests, advertised
/// through the top-level `_sd_alg` claim.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SdAlg {
    /// `sha-256`, used when nothing else is configured.
    #[default]
    Sha256,

    /// `sha-512`.
    Sha512,
}

impl SdAlg {
    /// Every supported algorithm.
    pub const ALL: [Self; 2] = [Self::Sha256, Self::Sha512];

    /// Hash function name, as found in `_sd_alg`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha-256",
            Self::Sha512 => "sha-512",
        }
    }

    /// Computes the digest of `disclosure`.
    ///
    /// Only the encoded form is hashed, so the same disclosure always gives
    /// the same digest.
    pub fn hash(&self, disclosure: &Disclosure) -> String {
        match self {
            Self::Sha256 => encode_digest::<Sha256>(disclosure),
            Self::Sha512 => encode_digest::<Sha512>(disclosure),
        }
    }
}

fn encode_digest<D: Digest>(disclosure: &Disclosure) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(D::digest(disclosure.as_bytes()))
}

impl fmt::Display for SdAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SdAlg {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| DecodeError::UnknownSdAlg(s.to_owned()))
    }
}

impl Serialize for SdAlg {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SdAlg {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
