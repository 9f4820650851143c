use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    utils::{find_reserved_claim_name, is_reserved_claim_name},
    ConcealError, DisclosureBuf, SdAlg, SdPayload,
};

/// Claims with selectively disclosable values.
///
/// Holds the concealed payload and every disclosure created so far, in
/// creation order. Each digest found in the payload (at any depth) has
/// exactly one matching disclosure, and conversely.
///
/// All operations borrow the object and return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct SdObject {
    pub(crate) payload: SdPayload,
    pub(crate) disclosures: Vec<DisclosureBuf>,
}

impl SdObject {
    /// Wraps the given claims, without concealing anything.
    ///
    /// The value must serialize into a JSON object that does not use the
    /// reserved `_sd` and `_sd_alg` claim names, at any depth. Array items
    /// of the form `{"...": <string>}` are rejected as well since they
    /// would read as concealed items.
    pub fn pure<T: ?Sized + Serialize>(value: &T) -> Result<Self, ConcealError> {
        match serde_json::to_value(value)? {
            Value::Object(claims) => Self::from_claims(claims),
            _ => Err(ConcealError::PayloadNotAnObject),
        }
    }

    /// Wraps the given JSON object, without concealing anything.
    pub fn from_claims(claims: Map<String, Value>) -> Result<Self, ConcealError> {
        let reserved = claims.iter().find_map(|(name, value)| {
            if is_reserved_claim_name(name) {
                Some(name.as_str())
            } else {
                find_reserved_claim_name(value)
            }
        });

        if let Some(name) = reserved {
            return Err(ConcealError::ReservedClaimName(name.to_owned()));
        }

        Ok(Self {
            payload: SdPayload {
                claims,
                sd: Vec::new(),
                sd_alg: None,
            },
            disclosures: Vec::new(),
        })
    }

    /// Starts a new object from the plaintext claims of `payload`.
    ///
    /// The new object uses the hash algorithm of `payload` but holds none of
    /// its digests, which makes it suitable as the result of a
    /// [`Self::flat_map`] function.
    pub fn derive(payload: &SdPayload) -> Self {
        Self {
            payload: SdPayload {
                claims: payload.claims.clone(),
                sd: Vec::new(),
                sd_alg: payload.sd_alg,
            },
            disclosures: Vec::new(),
        }
    }

    /// Concealed payload.
    pub fn payload(&self) -> &SdPayload {
        &self.payload
    }

    /// Disclosures, in creation order.
    pub fn disclosures(&self) -> &[DisclosureBuf] {
        &self.disclosures
    }

    /// Hash algorithm in use, if any digest was computed.
    pub fn sd_alg(&self) -> Option<SdAlg> {
        self.payload.sd_alg
    }

    /// Builds the JSON object of the concealed payload.
    pub fn to_value(&self) -> Value {
        self.payload.to_value()
    }

    /// Returns the concealed payload and the disclosures.
    pub fn into_parts(self) -> (SdPayload, Vec<DisclosureBuf>) {
        (self.payload, self.disclosures)
    }

    /// Replaces the plaintext claims with the output of `f`.
    ///
    /// `f` is given the whole payload. Digests, hash algorithm and
    /// disclosures are kept as is, and any `_sd` or `_sd_alg` entry returned
    /// by `f` is ignored. `f` is expected to preserve concealed values: a
    /// dropped nested digest leaves a disclosure without counterpart.
    pub fn map(&self, f: impl FnOnce(&SdPayload) -> Map<String, Value>) -> Self {
        let mut claims = f(&self.payload);
        claims.retain(|name, _| !is_reserved_claim_name(name));

        Self {
            payload: SdPayload {
                claims,
                sd: self.payload.sd.clone(),
                sd_alg: self.payload.sd_alg,
            },
            disclosures: self.disclosures.clone(),
        }
    }

    /// Merges this object with the one returned by `f`.
    ///
    /// The result has the claims of the returned object, the digests of both
    /// objects and the disclosures of both objects (this object's first).
    /// Fails if both objects use a different hash algorithm.
    ///
    /// Digests nested in this object's claims only survive if the returned
    /// object carries them. Start from [`Self::derive`] to keep them: a
    /// returned object built from scratch leaves their disclosures without
    /// counterpart.
    pub fn flat_map(
        &self,
        f: impl FnOnce(&SdPayload) -> Result<SdObject, ConcealError>,
    ) -> Result<Self, ConcealError> {
        let other = f(&self.payload)?;
        let sd_alg = merge_sd_alg(self.payload.sd_alg, other.payload.sd_alg)?;

        let mut sd = self.payload.sd.clone();
        sd.extend(other.payload.sd);

        let mut disclosures = self.disclosures.clone();
        disclosures.extend(other.disclosures);

        Ok(Self {
            payload: SdPayload {
                claims: other.payload.claims,
                sd,
                sd_alg,
            },
            disclosures,
        })
    }
}

/// Combines two optional hash algorithms, failing if both are defined and
/// differ.
pub(crate) fn merge_sd_alg(
    current: Option<SdAlg>,
    other: Option<SdAlg>,
) -> Result<Option<SdAlg>, ConcealError> {
    match (current, other) {
        (Some(expected), Some(found)) if expected != found => {
            Err(ConcealError::InconsistentSdAlg { expected, found })
        }
        (current, other) => Ok(current.or(other)),
    }
}
