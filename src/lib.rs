//! Composable builder for Selective Disclosure JWT ([SD-JWT]) claims.
//!
//! [SD-JWT]: <https://datatracker.ietf.org/doc/draft-ietf-oauth-selective-disclosure-jwt/>
//!
//! # Usage
//!
//! An [`SdObject`] holds a set of claims where some values have been
//! replaced by salted digests, together with the *disclosures* needed to
//! reveal them again. Objects are never modified in place: every operation
//! returns a new object and leaves its receiver untouched.
//! ```text
//! ┌────────┐                 ┌──────────┐                              ┌──────────┐
//! │        │                 │          │   property / array / nested  │          │
//! │ claims │ ─► SdObject ─►  │ SdObject │ ───────────────────────────► │ SdObject │ ─► sign ─► SdJwtBuf
//! │        │    ::pure       │          │   map / flat_map             │          │
//! └────────┘                 └──────────┘                              └──────────┘
//! ```
//!
//! ```
//! use serde_json::json;
//! use ssi_sd_object::{DisclosureOptions, SdObject};
//!
//! let person = json!({
//!     "id": 12,
//!     "name": "John Doe",
//!     "nationalities": ["DE", "FR"],
//!     "affiliation": { "id": 3, "name": "ABC Inc." }
//! });
//!
//! let object = SdObject::pure(&person)?
//!     .property(&["name"], DisclosureOptions::default())?
//!     .array("nationalities", &[1], DisclosureOptions::default())?
//!     .nested("affiliation", |affiliation| {
//!         SdObject::pure(affiliation)?.property(&["name"], DisclosureOptions::default())
//!     })?;
//!
//! assert_eq!(object.disclosures().len(), 3);
//! object.verify_disclosures()?;
//! assert_eq!(serde_json::Value::Object(object.reveal()?), person);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The concealed payload is then signed by any [`ClaimsSigner`] and joined
//! with the disclosures into the compact `<jwt>~<disclosure>~…~` form
//! ([`SdJwtBuf`]).
#![warn(missing_docs)]
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) mod utils;

mod digest;
pub use digest::*;

mod disclosure;
pub use disclosure::*;

mod options;
pub use options::*;

mod object;
pub use object::*;

mod conceal;
pub use conceal::*;

mod reveal;
pub use reveal::*;

mod serialized;
pub use serialized::*;

const SD_CLAIM_NAME: &str = "_sd";
const SD_ALG_CLAIM_NAME: &str = "_sd_alg";
const ARRAY_CLAIM_ITEM_PROPERTY_NAME: &str = "...";

/// Claims of an [`SdObject`].
///
/// The reserved `_sd` and `_sd_alg` entries are kept apart from the other
/// claims, which never contain them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdPayload {
    /// Plaintext claims.
    #[serde(flatten)]
    claims: Map<String, Value>,

    /// Digests of the concealed properties, in creation order.
    #[serde(rename = "_sd", default, skip_serializing_if = "Vec::is_empty")]
    sd: Vec<String>,

    /// Hash algorithm used to generate the digests.
    #[serde(rename = "_sd_alg", default, skip_serializing_if = "Option::is_none")]
    sd_alg: Option<SdAlg>,
}

impl SdPayload {
    /// Plaintext claims.
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Returns the plaintext claim with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Digests of the concealed properties (`_sd`).
    pub fn sd(&self) -> &[String] {
        &self.sd
    }

    /// Hash algorithm (`_sd_alg`), if any digest was computed.
    pub fn sd_alg(&self) -> Option<SdAlg> {
        self.sd_alg
    }

    /// Builds the JSON object of this payload.
    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    /// Turns this payload into a JSON object.
    ///
    /// `_sd` is omitted when empty and `_sd_alg` when undefined.
    pub fn into_value(self) -> Value {
        let mut object = self.claims;

        if !self.sd.is_empty() {
            object.insert(
                SD_CLAIM_NAME.to_owned(),
                Value::Array(self.sd.into_iter().map(Value::String).collect()),
            );
        }

        if let Some(sd_alg) = self.sd_alg {
            object.insert(SD_ALG_CLAIM_NAME.to_owned(), sd_alg.name().into());
        }

        Value::Object(object)
    }
}

impl From<SdPayload> for Value {
    fn from(value: SdPayload) -> Self {
        value.into_value()
    }
}
