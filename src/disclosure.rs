use std::{borrow::Borrow, fmt, ops::Deref};

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde_json::Value;

use crate::utils::is_url_safe_base64_char;

/// Disclosure decoding error.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A disclosure is malformed.
    #[error("a disclosure is malformed")]
    DisclosureMalformed,

    /// Unknown value of `_sd_alg`.
    #[error("unknown value of _sd_alg `{0}`")]
    UnknownSdAlg(String),

    /// Bubbled up error from serde_json.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Invalid SD-JWT disclosure.
#[derive(Debug, thiserror::Error)]
#[error("invalid SD-JWT disclosure: `{0}`")]
pub struct InvalidDisclosure<T>(pub T);

/// Encoded disclosure.
///
/// An encoded disclosure is a url-safe base-64 string encoding (without
/// padding) an array containing the disclosure's parameters.
#[derive(PartialEq, Eq, Hash)]
pub struct Disclosure([u8]);

impl Disclosure {
    /// Parses the given `disclosure` bytes.
    ///
    /// Returns an error if the input value is not a valid url-safe base64
    /// string without padding.
    pub fn new<T: ?Sized + AsRef<[u8]>>(disclosure: &T) -> Result<&Self, InvalidDisclosure<&T>> {
        let bytes = disclosure.as_ref();
        if !bytes.is_empty() && bytes.iter().copied().all(is_url_safe_base64_char) {
            Ok(unsafe { Self::new_unchecked(bytes) })
        } else {
            Err(InvalidDisclosure(disclosure))
        }
    }

    /// Creates a new disclosure out of the given `bytes` without validation.
    ///
    /// # Safety
    ///
    /// The input bytes **must** be a valid url-safe base64 string without
    /// padding.
    pub unsafe fn new_unchecked(bytes: &[u8]) -> &Self {
        std::mem::transmute(bytes)
    }

    /// Returns the bytes of the encoded disclosure.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the encoded disclosure as a string.
    pub fn as_str(&self) -> &str {
        unsafe {
            // SAFETY: disclosures are url-safe base-64 strings.
            std::str::from_utf8_unchecked(&self.0)
        }
    }

    /// Decode this disclosure.
    pub fn decode(&self) -> Result<DecodedDisclosure, DecodeError> {
        DecodedDisclosure::new(self)
    }
}

impl AsRef<[u8]> for Disclosure {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<str> for Disclosure {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl fmt::Debug for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl ToOwned for Disclosure {
    type Owned = DisclosureBuf;

    fn to_owned(&self) -> Self::Owned {
        DisclosureBuf(self.as_bytes().to_owned())
    }
}

/// Owned encoded disclosure.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DisclosureBuf(Vec<u8>);

impl DisclosureBuf {
    /// Encodes a disclosure from its salt and description.
    ///
    /// The parameters are serialized as a compact JSON array then encoded
    /// with url-safe base64 without padding. Encoding is deterministic.
    pub fn encode_from_parts(salt: &str, description: &DisclosureDescription) -> Self {
        Self(
            BASE64_URL_SAFE_NO_PAD
                .encode(description.to_value(salt).to_string())
                .into_bytes(),
        )
    }

    /// Borrows the disclosure.
    pub fn as_disclosure(&self) -> &Disclosure {
        unsafe {
            // SAFETY: `self.0` is a disclosure by construction.
            Disclosure::new_unchecked(&self.0)
        }
    }
}

impl Deref for DisclosureBuf {
    type Target = Disclosure;

    fn deref(&self) -> &Self::Target {
        self.as_disclosure()
    }
}

impl Borrow<Disclosure> for DisclosureBuf {
    fn borrow(&self) -> &Disclosure {
        self.as_disclosure()
    }
}

impl AsRef<Disclosure> for DisclosureBuf {
    fn as_ref(&self) -> &Disclosure {
        self.as_disclosure()
    }
}

impl fmt::Display for DisclosureBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_disclosure().fmt(f)
    }
}

impl fmt::Debug for DisclosureBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_disclosure().fmt(f)
    }
}

impl serde::Serialize for DisclosureBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for DisclosureBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Disclosure::new(&s)
            .map(ToOwned::to_owned)
            .map_err(serde::de::Error::custom)
    }
}

/// Decoded disclosure.
#[derive(Debug, PartialEq)]
pub struct DecodedDisclosure<'a> {
    /// Encoded disclosure.
    pub encoded: &'a Disclosure,

    /// Salt.
    pub salt: String,

    /// Disclosed value.
    pub description: DisclosureDescription,
}

impl<'a> DecodedDisclosure<'a> {
    /// Decodes the given disclosure.
    pub fn new(encoded: &'a (impl ?Sized + AsRef<[u8]>)) -> Result<Self, DecodeError> {
        let base64 = encoded.as_ref();
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(base64)
            .map_err(|_| DecodeError::DisclosureMalformed)?;

        let encoded = unsafe {
            // SAFETY: by decoding `base64` we validated the disclosure.
            Disclosure::new_unchecked(base64)
        };

        let json: Value = serde_json::from_slice(&bytes)?;

        match json {
            Value::Array(values) => match values.as_slice() {
                [salt, name, value] => Ok(DecodedDisclosure {
                    encoded,
                    salt: salt
                        .as_str()
                        .ok_or(DecodeError::DisclosureMalformed)?
                        .to_owned(),
                    description: DisclosureDescription::ObjectEntry {
                        key: name
                            .as_str()
                            .ok_or(DecodeError::DisclosureMalformed)?
                            .to_owned(),
                        value: value.clone(),
                    },
                }),
                [salt, value] => Ok(DecodedDisclosure {
                    encoded,
                    salt: salt
                        .as_str()
                        .ok_or(DecodeError::DisclosureMalformed)?
                        .to_owned(),
                    description: DisclosureDescription::ArrayItem(value.clone()),
                }),
                _ => Err(DecodeError::DisclosureMalformed),
            },
            _ => Err(DecodeError::DisclosureMalformed),
        }
    }

}

/// Disclosed value, with its position in the claims.
#[derive(Debug, Clone, PartialEq)]
pub enum DisclosureDescription {
    /// Object property, `[salt, key, value]`.
    ObjectEntry {
        /// Property name.
        key: String,

        /// Property value.
        value: Value,
    },

    /// Array element, `[salt, value]`.
    ArrayItem(Value),
}

impl DisclosureDescription {
    /// Builds the JSON array of the disclosure with the given salt.
    pub fn to_value(&self, salt: &str) -> Value {
        match self {
            Self::ObjectEntry { key, value } => {
                Value::Array(vec![salt.into(), key.to_owned().into(), value.clone()])
            }
            Self::ArrayItem(value) => Value::Array(vec![salt.into(), value.clone()]),
        }
    }

    /// Returns the disclosed value.
    pub fn value(&self) -> &Value {
        match self {
            Self::ObjectEntry { value, .. } => value,
            Self::ArrayItem(value) => value,
        }
    }
}
