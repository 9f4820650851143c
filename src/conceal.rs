use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

use rand::{thread_rng, CryptoRng, RngCore};
use serde_json::Value;

use crate::{
    object::merge_sd_alg,
    utils::{is_reserved_claim_name, new_concealed_array_item},
    DisclosureBuf, DisclosureDescription, DisclosureOptions, SdAlg, SdObject,
};

/// Error that can occur during concealing.
#[derive(Debug, thiserror::Error)]
pub enum ConcealError {
    /// The requested hash algorithm differs from the one already in use.
    #[error("inconsistent hash algorithms: `{expected}` is in use but `{found}` was requested")]
    InconsistentSdAlg {
        /// Algorithm in use.
        expected: SdAlg,

        /// Requested algorithm.
        found: SdAlg,
    },

    /// The salt is too short.
    #[error("salt must be at least {} bytes, got {0}", crate::MIN_SALT_SIZE)]
    SaltTooShort(usize),

    /// The salt is too long.
    #[error("salt must be at most {} bytes, got {0}", crate::MAX_SALT_SIZE)]
    SaltTooLong(usize),

    /// Claim to conceal not found.
    #[error("claim `{0}` not found")]
    ClaimNotFound(String),

    /// The same claim was selected more than once.
    #[error("claim `{0}` selected more than once")]
    DuplicateClaimName(String),

    /// Array index out of bounds.
    #[error("index {index} is out of bounds for claim `{claim}` of length {len}")]
    IndexOutOfBounds {
        /// Array claim name.
        claim: String,

        /// Requested index.
        index: usize,

        /// Array length.
        len: usize,
    },

    /// Claim name reserved by SD-JWT.
    #[error("claim name `{0}` is reserved")]
    ReservedClaimName(String),

    /// Claim name does not identify a single property.
    #[error("claim name `{0}` does not identify a single property")]
    AmbiguousClaimName(String),

    /// Claim value is not an array.
    #[error("claim `{0}` is not an array")]
    NotAnArray(String),

    /// Claim value is not an object.
    #[error("claim `{0}` is not an object")]
    NotAnObject(String),

    /// Concealed JSON value is not an object.
    #[error("concealed JSON value is not an object")]
    PayloadNotAnObject,

    /// Serialization failed.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Class of a [`ConcealError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inconsistent configuration, such as mixed hash algorithms.
    Configuration,

    /// Invalid input: salt size, claim name or index.
    Validation,

    /// A claim does not have the expected shape.
    Type,

    /// Claims could not be serialized.
    Serialization,
}

impl ConcealError {
    /// Class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InconsistentSdAlg { .. } => ErrorKind::Configuration,
            Self::SaltTooShort(_)
            | Self::SaltTooLong(_)
            | Self::ClaimNotFound(_)
            | Self::DuplicateClaimName(_)
            | Self::IndexOutOfBounds { .. }
            | Self::ReservedClaimName(_)
            | Self::AmbiguousClaimName(_) => ErrorKind::Validation,
            Self::NotAnArray(_) | Self::NotAnObject(_) | Self::PayloadNotAnObject => {
                ErrorKind::Type
            }
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Function building the concealed value of a nested object.
pub type NestedConceal<'a> = Box<dyn FnOnce(&Value) -> Result<SdObject, ConcealError> + 'a>;

/// Concealing operation.
///
/// All variants share the salt, digest and disclosure mechanics and only
/// differ in how the concealed value is located and replaced.
pub enum Redaction<'a> {
    /// Conceals top-level properties, moving their digest to `_sd`.
    Properties(Vec<String>),

    /// Conceals the items of an array property, in place.
    ArrayItems {
        /// Array claim name.
        claim: String,

        /// Indexes of the items to conceal.
        indices: Vec<usize>,
    },

    /// Replaces an object property with a concealed version of itself.
    Nested {
        /// Object claim name.
        claim: String,

        /// Builds the concealed value from the current one.
        conceal: NestedConceal<'a>,
    },
}

impl<'a> Redaction<'a> {
    /// Conceals the given top-level properties.
    pub fn properties(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Properties(names.into_iter().map(Into::into).collect())
    }

    /// Conceals the given items of the `claim` array.
    pub fn array_items(claim: impl Into<String>, indices: impl IntoIterator<Item = usize>) -> Self {
        Self::ArrayItems {
            claim: claim.into(),
            indices: indices.into_iter().collect(),
        }
    }

    /// Conceals the `claim` object using `conceal`.
    pub fn nested(
        claim: impl Into<String>,
        conceal: impl FnOnce(&Value) -> Result<SdObject, ConcealError> + 'a,
    ) -> Self {
        Self::Nested {
            claim: claim.into(),
            conceal: Box::new(conceal),
        }
    }
}

impl fmt::Debug for Redaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Properties(names) => f.debug_tuple("Properties").field(names).finish(),
            Self::ArrayItems { claim, indices } => f
                .debug_struct("ArrayItems")
                .field("claim", claim)
                .field("indices", indices)
                .finish(),
            Self::Nested { claim, .. } => f
                .debug_struct("Nested")
                .field("claim", claim)
                .finish_non_exhaustive(),
        }
    }
}

impl SdObject {
    /// Applies the given concealing operation.
    pub fn apply(
        &self,
        redaction: Redaction,
        options: DisclosureOptions,
    ) -> Result<Self, ConcealError> {
        self.apply_with(redaction, options, &mut thread_rng())
    }

    /// Applies the given concealing operation, drawing salts from `rng`.
    ///
    /// On failure no object is returned and `self` is left untouched.
    pub fn apply_with(
        &self,
        redaction: Redaction,
        options: DisclosureOptions,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Self, ConcealError> {
        match redaction {
            Redaction::Properties(names) => self.conceal_properties(&names, options, rng),
            Redaction::ArrayItems { claim, indices } => {
                self.conceal_array_items(&claim, &indices, options, rng)
            }
            Redaction::Nested { claim, conceal } => {
                self.conceal_nested(&claim, options.sd_alg, conceal)
            }
        }
    }

    /// Makes the given top-level claims selectively disclosable.
    pub fn property(
        &self,
        names: &[impl AsRef<str>],
        options: DisclosureOptions,
    ) -> Result<Self, ConcealError> {
        self.property_with(names, options, &mut thread_rng())
    }

    /// Makes the given top-level claims selectively disclosable, drawing
    /// salts from `rng`.
    pub fn property_with(
        &self,
        names: &[impl AsRef<str>],
        options: DisclosureOptions,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Self, ConcealError> {
        self.apply_with(
            Redaction::properties(names.iter().map(|name| name.as_ref().to_owned())),
            options,
            rng,
        )
    }

    /// Makes the given items of the `claim` array selectively disclosable.
    pub fn array(
        &self,
        claim: &str,
        indices: &[usize],
        options: DisclosureOptions,
    ) -> Result<Self, ConcealError> {
        self.array_with(claim, indices, options, &mut thread_rng())
    }

    /// Makes the given items of the `claim` array selectively disclosable,
    /// drawing salts from `rng`.
    pub fn array_with(
        &self,
        claim: &str,
        indices: &[usize],
        options: DisclosureOptions,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Self, ConcealError> {
        self.apply_with(
            Redaction::array_items(claim, indices.iter().copied()),
            options,
            rng,
        )
    }

    /// Replaces the `claim` object with the concealed object built by `f`.
    ///
    /// The digests computed by `f` stay inside the nested object. Its
    /// disclosures are appended after the ones of `self`.
    pub fn nested(
        &self,
        claim: &str,
        f: impl FnOnce(&Value) -> Result<SdObject, ConcealError>,
    ) -> Result<Self, ConcealError> {
        self.apply(Redaction::nested(claim, f), DisclosureOptions::default())
    }

    fn conceal_properties(
        &self,
        names: &[String],
        options: DisclosureOptions,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Self, ConcealError> {
        let resolved = options.resolve(self.payload.sd_alg)?;

        let mut selected = HashSet::with_capacity(names.len());
        for name in names {
            if is_reserved_claim_name(name) {
                return Err(ConcealError::ReservedClaimName(name.clone()));
            }

            if !self.payload.claims.contains_key(name) {
                return Err(ConcealError::ClaimNotFound(name.clone()));
            }

            if !selected.insert(name.as_str()) {
                return Err(ConcealError::DuplicateClaimName(name.clone()));
            }
        }

        let mut result = self.clone();
        for name in names {
            let value = result
                .payload
                .claims
                .shift_remove(name)
                .ok_or_else(|| ConcealError::ClaimNotFound(name.clone()))?;

            let disclosure = DisclosureBuf::encode_from_parts(
                &resolved.generate_salt(rng),
                &DisclosureDescription::ObjectEntry {
                    key: name.clone(),
                    value,
                },
            );

            let digest = resolved.sd_alg.hash(&disclosure);
            log::trace!("concealed property `{name}`: {digest}");

            result.payload.sd.push(digest);
            result.disclosures.push(disclosure);
        }

        result.payload.sd_alg = Some(resolved.sd_alg);
        log::debug!(
            "concealed {} properties using {}",
            names.len(),
            resolved.sd_alg
        );

        Ok(result)
    }

    fn conceal_array_items(
        &self,
        claim: &str,
        indices: &[usize],
        options: DisclosureOptions,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Self, ConcealError> {
        let resolved = options.resolve(self.payload.sd_alg)?;

        let mut result = self.clone();
        let array = match result.payload.claims.get_mut(claim) {
            Some(Value::Array(array)) => array,
            Some(_) => return Err(ConcealError::NotAnArray(claim.to_owned())),
            None => return Err(ConcealError::ClaimNotFound(claim.to_owned())),
        };

        let indices: BTreeSet<usize> = indices.iter().copied().collect();
        if let Some(&index) = indices.last() {
            if index >= array.len() {
                return Err(ConcealError::IndexOutOfBounds {
                    claim: claim.to_owned(),
                    index,
                    len: array.len(),
                });
            }
        }

        for &i in &indices {
            let item = &mut array[i];

            let disclosure = DisclosureBuf::encode_from_parts(
                &resolved.generate_salt(rng),
                &DisclosureDescription::ArrayItem(item.take()),
            );

            let digest = resolved.sd_alg.hash(&disclosure);
            log::trace!("concealed item {i} of `{claim}`: {digest}");

            *item = new_concealed_array_item(digest);
            result.disclosures.push(disclosure);
        }

        result.payload.sd_alg = Some(resolved.sd_alg);
        log::debug!(
            "concealed {} items of `{claim}` using {}",
            indices.len(),
            resolved.sd_alg
        );

        Ok(result)
    }

    fn conceal_nested(
        &self,
        claim: &str,
        requested: Option<SdAlg>,
        conceal: NestedConceal,
    ) -> Result<Self, ConcealError> {
        if claim.is_empty() {
            return Err(ConcealError::AmbiguousClaimName(claim.to_owned()));
        }

        if is_reserved_claim_name(claim) {
            return Err(ConcealError::ReservedClaimName(claim.to_owned()));
        }

        let expected = merge_sd_alg(self.payload.sd_alg, requested)?;

        let value = self
            .payload
            .claims
            .get(claim)
            .ok_or_else(|| ConcealError::ClaimNotFound(claim.to_owned()))?;

        if !value.is_object() {
            return Err(ConcealError::NotAnObject(claim.to_owned()));
        }

        let (mut nested, disclosures) = conceal(value)?.into_parts();

        // The algorithm is shared by the whole object and only appears at
        // the top level.
        merge_sd_alg(expected, nested.sd_alg)?;
        let sd_alg = self.payload.sd_alg.or(nested.sd_alg.take());

        log::debug!(
            "concealed nested claim `{claim}` with {} disclosures",
            disclosures.len()
        );

        let mut result = self.clone();
        result
            .payload
            .claims
            .insert(claim.to_owned(), nested.into_value());
        result.payload.sd_alg = sd_alg;
        result.disclosures.extend(disclosures);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{utils::as_concealed_array_item, ErrorKind};
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    /// Random generator counting the number of draws.
    struct CountingRng {
        inner: StdRng,
        draws: usize,
    }

    impl CountingRng {
        fn new() -> Self {
            Self {
                inner: StdRng::seed_from_u64(0),
                draws: 0,
            }
        }
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.draws += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    impl CryptoRng for CountingRng {}

    fn person() -> SdObject {
        SdObject::pure(&json!({
            "id": 12,
            "name": "John Doe",
            "nationalities": ["DE", "FR"],
            "phoneNumbers": [8012345678u64, 9087654321u64],
            "affiliation": { "id": 3, "name": "ABC Inc." }
        }))
        .unwrap()
    }

    #[test]
    fn property_removes_claim() {
        let object = SdObject::pure(&json!({ "id": 12, "name": "John Doe" }))
            .unwrap()
            .property(&["name"], DisclosureOptions::default())
            .unwrap();

        assert_eq!(object.payload().get("name"), None);
        assert_eq!(object.payload().get("id"), Some(&json!(12)));
        assert_eq!(object.payload().sd().len(), 1);
        assert_eq!(object.sd_alg(), Some(SdAlg::Sha256));
        assert_eq!(object.disclosures().len(), 1);

        let disclosure = &object.disclosures()[0];
        assert_eq!(SdAlg::Sha256.hash(disclosure), object.payload().sd()[0]);

        let decoded = disclosure.decode().unwrap();
        assert_eq!(
            decoded.description,
            DisclosureDescription::ObjectEntry {
                key: "name".to_owned(),
                value: json!("John Doe")
            }
        );
        assert_eq!(
            decoded.description.to_value(&decoded.salt),
            json!([decoded.salt, "name", "John Doe"])
        );
    }

    #[test]
    fn property_order_follows_names() {
        let object = person()
            .property(&["id", "name"], DisclosureOptions::default())
            .unwrap();

        let keys: Vec<_> = object
            .disclosures()
            .iter()
            .map(|d| match d.decode().unwrap().description {
                DisclosureDescription::ObjectEntry { key, .. } => key,
                DisclosureDescription::ArrayItem(_) => unreachable!(),
            })
            .collect();

        assert_eq!(keys, ["id", "name"]);
    }

    #[test]
    fn property_failures_leave_source_untouched() {
        let object = person();

        let err = object
            .property(&["name", "missing"], DisclosureOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConcealError::ClaimNotFound(ref name) if name == "missing"));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = object
            .property(&["name", "name"], DisclosureOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConcealError::DuplicateClaimName(_)));

        let err = object
            .property(&["_sd_alg"], DisclosureOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConcealError::ReservedClaimName(_)));

        assert_eq!(object, person());
    }

    #[test]
    fn salt_floor_draws_no_randomness() {
        let mut rng = CountingRng::new();

        let err = person()
            .property_with(
                &["name"],
                DisclosureOptions::new().with_salt_size(8),
                &mut rng,
            )
            .unwrap_err();

        assert!(matches!(err, ConcealError::SaltTooShort(8)));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(rng.draws, 0);

        let err = person()
            .array_with(
                "nationalities",
                &[0],
                DisclosureOptions::new().with_salt_size(15),
                &mut rng,
            )
            .unwrap_err();

        assert!(matches!(err, ConcealError::SaltTooShort(15)));
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn oversized_salt_is_rejected() {
        let mut rng = CountingRng::new();

        let err = person()
            .property_with(
                &["name"],
                DisclosureOptions::new().with_salt_size(usize::MAX),
                &mut rng,
            )
            .unwrap_err();

        assert!(matches!(err, ConcealError::SaltTooLong(usize::MAX)));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn one_salt_per_disclosure() {
        let mut rng = CountingRng::new();

        let object = person()
            .property_with(&["id", "name"], DisclosureOptions::default(), &mut rng)
            .unwrap();

        assert_eq!(rng.draws, 2);

        let salts: HashSet<_> = object
            .disclosures()
            .iter()
            .map(|d| d.decode().unwrap().salt)
            .collect();
        assert_eq!(salts.len(), 2);
    }

    #[test]
    fn array_preserves_order() {
        let object = SdObject::pure(&json!({ "nationalities": ["DE", "FR"] }))
            .unwrap()
            .array("nationalities", &[1], DisclosureOptions::default())
            .unwrap();

        let array = object.payload().get("nationalities").unwrap();
        let items = array.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], json!("DE"));

        let digest = as_concealed_array_item(&items[1]).unwrap();
        assert_eq!(SdAlg::Sha256.hash(&object.disclosures()[0]), digest);
        assert_eq!(
            object.disclosures()[0].decode().unwrap().description,
            DisclosureDescription::ArrayItem(json!("FR"))
        );

        // Array items are not listed in `_sd`.
        assert!(object.payload().sd().is_empty());
        assert_eq!(object.sd_alg(), Some(SdAlg::Sha256));
    }

    #[test]
    fn array_indices_have_set_semantics() {
        let object = person()
            .array("phoneNumbers", &[1, 0, 1], DisclosureOptions::default())
            .unwrap();

        assert_eq!(object.disclosures().len(), 2);
        assert_eq!(
            object.disclosures()[0].decode().unwrap().description,
            DisclosureDescription::ArrayItem(json!(8012345678u64))
        );
        assert_eq!(
            object.disclosures()[1].decode().unwrap().description,
            DisclosureDescription::ArrayItem(json!(9087654321u64))
        );
    }

    #[test]
    fn array_mixed_item_types() {
        let object = SdObject::pure(&json!({ "mixed": [1, "two", { "three": 3 }, [4], null] }))
            .unwrap()
            .array("mixed", &[0, 2, 3], DisclosureOptions::default())
            .unwrap();

        let items = object.payload().get("mixed").unwrap().as_array().unwrap();
        assert!(as_concealed_array_item(&items[0]).is_some());
        assert_eq!(items[1], json!("two"));
        assert!(as_concealed_array_item(&items[2]).is_some());
        assert!(as_concealed_array_item(&items[3]).is_some());
        assert_eq!(items[4], Value::Null);
        object.verify_disclosures().unwrap();
    }

    #[test]
    fn array_failures() {
        let object = person();

        let err = object
            .array("nationalities", &[0, 2], DisclosureOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConcealError::IndexOutOfBounds { index: 2, len: 2, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = object
            .array("name", &[0], DisclosureOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConcealError::NotAnArray(_)));
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = object
            .array("missing", &[0], DisclosureOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConcealError::ClaimNotFound(_)));

        assert_eq!(object, person());
    }

    #[test]
    fn array_inconsistent_algorithm() {
        let object = person()
            .property(&["name"], DisclosureOptions::new().with_sd_alg(SdAlg::Sha512))
            .unwrap();

        let err = object
            .array(
                "nationalities",
                &[0],
                DisclosureOptions::new().with_sd_alg(SdAlg::Sha256),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        // Omitting the algorithm reuses the one in use.
        let object = object
            .array("nationalities", &[0], DisclosureOptions::default())
            .unwrap();
        assert_eq!(
            SdAlg::Sha512.hash(&object.disclosures()[1]),
            as_concealed_array_item(&object.payload().get("nationalities").unwrap()[0]).unwrap()
        );
    }

    #[test]
    fn nested_keeps_digests_at_depth() {
        let object = person()
            .nested("affiliation", |affiliation| {
                SdObject::pure(affiliation)?.property(&["name"], DisclosureOptions::default())
            })
            .unwrap();

        assert!(object.payload().sd().is_empty());
        assert_eq!(object.sd_alg(), Some(SdAlg::Sha256));

        let affiliation = object.payload().get("affiliation").unwrap();
        assert_eq!(affiliation.get("name"), None);
        assert_eq!(affiliation.get("id"), Some(&json!(3)));
        assert_eq!(affiliation["_sd"].as_array().unwrap().len(), 1);
        assert_eq!(affiliation.get("_sd_alg"), None);

        assert_eq!(
            SdAlg::Sha256.hash(&object.disclosures()[0]),
            affiliation["_sd"][0]
        );
    }

    #[test]
    fn nested_disclosures_follow_parent() {
        let object = person()
            .property(&["name"], DisclosureOptions::default())
            .unwrap()
            .nested("affiliation", |affiliation| {
                SdObject::pure(affiliation)?.property(&["id"], DisclosureOptions::default())
            })
            .unwrap();

        assert_eq!(object.disclosures().len(), 2);
        assert_eq!(SdAlg::Sha256.hash(&object.disclosures()[0]), object.payload().sd()[0]);
    }

    #[test]
    fn nested_failures() {
        let object = person();
        let conceal =
            |v: &Value| SdObject::pure(v)?.property(&["name"], DisclosureOptions::default());

        assert!(matches!(
            object.nested("missing", conceal).unwrap_err(),
            ConcealError::ClaimNotFound(_)
        ));

        let err = object.nested("nationalities", conceal).unwrap_err();
        assert!(matches!(err, ConcealError::NotAnObject(_)));
        assert_eq!(err.kind(), ErrorKind::Type);

        assert!(matches!(
            object.nested("", conceal).unwrap_err(),
            ConcealError::AmbiguousClaimName(_)
        ));

        assert!(matches!(
            object.nested("_sd", conceal).unwrap_err(),
            ConcealError::ReservedClaimName(_)
        ));

        // Errors of the nested function are propagated.
        assert!(matches!(
            object
                .nested("affiliation", |v| SdObject::pure(v)?
                    .property(&["missing"], DisclosureOptions::default()))
                .unwrap_err(),
            ConcealError::ClaimNotFound(_)
        ));
    }

    #[test]
    fn nested_inconsistent_algorithm() {
        let object = person()
            .property(&["name"], DisclosureOptions::new().with_sd_alg(SdAlg::Sha256))
            .unwrap();

        let err = object
            .nested("affiliation", |affiliation| {
                SdObject::pure(affiliation)?
                    .property(&["name"], DisclosureOptions::new().with_sd_alg(SdAlg::Sha512))
            })
            .unwrap_err();

        assert!(matches!(
            err,
            ConcealError::InconsistentSdAlg {
                expected: SdAlg::Sha256,
                found: SdAlg::Sha512
            }
        ));
    }

    #[test]
    fn nested_hoists_algorithm() {
        let object = person()
            .nested("affiliation", |affiliation| {
                SdObject::pure(affiliation)?
                    .property(&["name"], DisclosureOptions::new().with_sd_alg(SdAlg::Sha512))
            })
            .unwrap();

        assert_eq!(object.sd_alg(), Some(SdAlg::Sha512));
        assert_eq!(object.to_value()["_sd_alg"], json!("sha-512"));
        assert_eq!(object.payload().get("affiliation").unwrap().get("_sd_alg"), None);

        // Later operations must keep using it.
        let err = object
            .property(&["id"], DisclosureOptions::new().with_sd_alg(SdAlg::Sha256))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn apply_redaction() {
        let mut rng = StdRng::seed_from_u64(42);

        let object = person()
            .apply_with(
                Redaction::properties(["id"]),
                DisclosureOptions::default(),
                &mut rng,
            )
            .unwrap()
            .apply_with(
                Redaction::array_items("nationalities", [0]),
                DisclosureOptions::default(),
                &mut rng,
            )
            .unwrap()
            .apply_with(
                Redaction::nested("affiliation", |v| {
                    SdObject::pure(v)?.property(&["id"], DisclosureOptions::default())
                }),
                DisclosureOptions::default(),
                &mut rng,
            )
            .unwrap();

        assert_eq!(object.disclosures().len(), 3);
        object.verify_disclosures().unwrap();
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let conceal = |seed| {
            person()
                .property_with(
                    &["name"],
                    DisclosureOptions::default(),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap()
        };

        assert_eq!(conceal(1), conceal(1));
        assert_ne!(conceal(1), conceal(2));
    }
}
