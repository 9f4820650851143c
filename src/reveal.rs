use std::{
    borrow::Borrow,
    collections::{hash_map::Entry, HashMap, HashSet},
};

use serde_json::{Map, Value};

use crate::{
    utils::{as_concealed_array_item, is_reserved_claim_name, visit_digests},
    DecodeError, DecodedDisclosure, Disclosure, DisclosureBuf, DisclosureDescription, SdAlg,
    SdObject, SD_ALG_CLAIM_NAME, SD_CLAIM_NAME,
};

/// Reveal error.
///
/// Error type used by [`reveal_claims`] and [`verify_disclosures`].
#[derive(Debug, thiserror::Error)]
pub enum RevealError {
    /// Disclosure decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Unused disclosure.
    #[error("unused disclosure `{0}`")]
    UnusedDisclosure(DisclosureBuf),

    /// Disclosure matching no digest.
    #[error("disclosure `{0}` matches no digest")]
    UnknownDisclosure(DisclosureBuf),

    /// Digest matching no disclosure.
    #[error("digest `{0}` matches no disclosure")]
    MissingDisclosure(String),

    /// The same digest appears more than once.
    #[error("digest `{0}` appears more than once")]
    DuplicateDigest(String),

    /// Claim collision.
    #[error("claim collision on `{0}`")]
    Collision(String),

    /// `_sd` claim value is not an array.
    #[error("`_sd` claim value is not an array")]
    SdClaimValueNotArray,

    /// Invalid disclosure hash.
    #[error("invalid disclosure hash value")]
    InvalidDisclosureHash,

    /// Disclosure used multiple times.
    #[error("disclosure is used multiple times")]
    DisclosureUsedMultipleTimes,

    /// Expected object entry, found array item disclosure.
    #[error("expected object entry disclosure, found array item disclosure")]
    ExpectedObjectEntryDisclosure,

    /// Expected array item disclosure, found object entry disclosure.
    #[error("expected array item disclosure, found object entry disclosure")]
    ExpectedArrayItemDisclosure,

    /// Revealed value is not an object.
    #[error("revealed value is not an object")]
    NotAnObject,
}

impl SdObject {
    /// Checks that every digest of this object has exactly one matching
    /// disclosure, and conversely.
    pub fn verify_disclosures(&self) -> Result<(), RevealError> {
        verify_disclosures(
            &self.to_value(),
            self.payload.sd_alg.unwrap_or_default(),
            &self.disclosures,
        )
    }

    /// Reveals all the concealed claims of this object.
    pub fn reveal(&self) -> Result<Map<String, Value>, RevealError> {
        reveal_claims(
            &self.to_value(),
            self.payload.sd_alg.unwrap_or_default(),
            &self.disclosures,
        )
    }
}

/// Checks the one-to-one correspondence between the digests found in
/// `claims` (or in the disclosed values) and the given disclosures.
pub fn verify_disclosures(
    claims: &Value,
    sd_alg: SdAlg,
    disclosures: &[impl Borrow<Disclosure>],
) -> Result<(), RevealError> {
    let mut digests = HashSet::new();
    let mut duplicate = None;
    let mut collect = |digest: &str| {
        if !digests.insert(digest.to_owned()) && duplicate.is_none() {
            duplicate = Some(digest.to_owned());
        }
    };

    visit_digests(claims, &mut collect);

    let mut hashes = Vec::with_capacity(disclosures.len());
    for disclosure in disclosures {
        let disclosure = disclosure.borrow();
        let decoded = DecodedDisclosure::new(disclosure)?;
        visit_digests(decoded.description.value(), &mut collect);
        hashes.push((sd_alg.hash(disclosure), disclosure));
    }

    if let Some(digest) = duplicate {
        return Err(RevealError::DuplicateDigest(digest));
    }

    for (hash, disclosure) in hashes {
        if !digests.remove(&hash) {
            return Err(RevealError::UnknownDisclosure(disclosure.to_owned()));
        }
    }

    match digests.into_iter().next() {
        Some(digest) => Err(RevealError::MissingDisclosure(digest)),
        None => Ok(()),
    }
}

struct InProgressDisclosure<'a> {
    decoded: DecodedDisclosure<'a>,
    found: bool,
}

/// Reveals the concealed claims using the given disclosures.
///
/// Digests without disclosure are dropped, so a subset of the disclosures
/// reveals a subset of the claims. Every given disclosure must be used.
pub fn reveal_claims(
    claims: &Value,
    sd_alg: SdAlg,
    disclosures: &[impl Borrow<Disclosure>],
) -> Result<Map<String, Value>, RevealError> {
    let mut in_progress = HashMap::with_capacity(disclosures.len());
    for disclosure in disclosures {
        let disclosure = disclosure.borrow();
        match in_progress.entry(sd_alg.hash(disclosure)) {
            Entry::Occupied(_) => return Err(RevealError::DisclosureUsedMultipleTimes),
            Entry::Vacant(entry) => {
                entry.insert(InProgressDisclosure {
                    decoded: DecodedDisclosure::new(disclosure)?,
                    found: false,
                });
            }
        }
    }

    let mut object = claims.as_object().ok_or(RevealError::NotAnObject)?.clone();
    object.shift_remove(SD_ALG_CLAIM_NAME);
    reveal_object(&mut object, &mut in_progress)?;

    log::debug!("revealed claims using {} disclosures", disclosures.len());

    for disclosure in in_progress.into_values() {
        if !disclosure.found {
            return Err(RevealError::UnusedDisclosure(
                disclosure.decoded.encoded.to_owned(),
            ));
        }
    }

    Ok(object)
}

/// Marks the disclosure with the given digest as found and returns its
/// description.
fn take_disclosure(
    digest: &str,
    in_progress: &mut HashMap<String, InProgressDisclosure>,
) -> Result<Option<DisclosureDescription>, RevealError> {
    match in_progress.get_mut(digest) {
        Some(disclosure) => {
            if disclosure.found {
                return Err(RevealError::DisclosureUsedMultipleTimes);
            }

            disclosure.found = true;
            Ok(Some(disclosure.decoded.description.clone()))
        }
        None => Ok(None),
    }
}

fn reveal_value(
    value: &mut Value,
    in_progress: &mut HashMap<String, InProgressDisclosure>,
) -> Result<(), RevealError> {
    match value {
        Value::Object(object) => reveal_object(object, in_progress),
        Value::Array(array) => reveal_array(array, in_progress),
        _ => Ok(()),
    }
}

fn reveal_object(
    object: &mut Map<String, Value>,
    in_progress: &mut HashMap<String, InProgressDisclosure>,
) -> Result<(), RevealError> {
    let sd = object.shift_remove(SD_CLAIM_NAME);

    for value in object.values_mut() {
        reveal_value(value, in_progress)?;
    }

    let digests = match sd {
        Some(Value::Array(digests)) => digests,
        Some(_) => return Err(RevealError::SdClaimValueNotArray),
        None => return Ok(()),
    };

    for digest in digests {
        let digest = digest.as_str().ok_or(RevealError::InvalidDisclosureHash)?;

        // Undisclosed digest.
        let Some(description) = take_disclosure(digest, in_progress)? else {
            continue;
        };

        match description {
            DisclosureDescription::ObjectEntry { key, mut value } => {
                if is_reserved_claim_name(&key) || object.contains_key(&key) {
                    return Err(RevealError::Collision(key));
                }

                reveal_value(&mut value, in_progress)?;
                object.insert(key, value);
            }
            DisclosureDescription::ArrayItem(_) => {
                return Err(RevealError::ExpectedObjectEntryDisclosure)
            }
        }
    }

    Ok(())
}

fn reveal_array(
    array: &mut Vec<Value>,
    in_progress: &mut HashMap<String, InProgressDisclosure>,
) -> Result<(), RevealError> {
    let items = std::mem::take(array);

    for mut item in items {
        let description = match as_concealed_array_item(&item) {
            Some(digest) => match take_disclosure(digest, in_progress)? {
                Some(description) => description,
                // Undisclosed item.
                None => continue,
            },
            None => {
                reveal_value(&mut item, in_progress)?;
                array.push(item);
                continue;
            }
        };

        match description {
            DisclosureDescription::ArrayItem(mut value) => {
                reveal_value(&mut value, in_progress)?;
                array.push(value);
            }
            DisclosureDescription::ObjectEntry { .. } => {
                return Err(RevealError::ExpectedArrayItemDisclosure)
            }
        }
    }

    Ok(())
}
