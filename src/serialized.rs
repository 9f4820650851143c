use std::{borrow::Borrow, fmt, str::FromStr};

use crate::{utils::is_url_safe_base64_char, Disclosure, SdObject, SdPayload};

/// JOSE `typ` header value of SD-JWT secured credentials.
pub const SD_JWT_VC_LD_TYPE: &str = "vc+ld+json+sd-jwt";

/// Invalid SD-JWT error.
#[derive(Debug, thiserror::Error)]
#[error("invalid SD-JWT: `{0}`")]
pub struct InvalidSdJwt<T = String>(pub T);

/// Signs concealed claims into a compact JWT.
///
/// The signer is responsible for the JOSE header and the signature
/// algorithm. It must sign the JSON object of the given payload as is.
pub trait ClaimsSigner {
    /// Signature error.
    type Error;

    /// Returns the compact serialization of the signed JWT.
    fn sign_claims(&self, claims: &SdPayload) -> Result<String, Self::Error>;
}

impl<S: ?Sized + ClaimsSigner> ClaimsSigner for &S {
    type Error = S::Error;

    fn sign_claims(&self, claims: &SdPayload) -> Result<String, Self::Error> {
        S::sign_claims(*self, claims)
    }
}

/// Signature error.
#[derive(Debug, thiserror::Error)]
pub enum SignError<E> {
    /// The signer failed.
    #[error("signing failed: {0}")]
    Signer(E),

    /// The signer did not return a compact JWT.
    #[error(transparent)]
    InvalidSdJwt(#[from] InvalidSdJwt),
}

impl SdObject {
    /// Signs the concealed payload and appends the disclosures.
    pub fn sign<S: ClaimsSigner>(&self, signer: S) -> Result<SdJwtBuf, SignError<S::Error>> {
        let jwt = signer
            .sign_claims(&self.payload)
            .map_err(SignError::Signer)?;

        log::debug!(
            "signed SD-JWT with {} disclosures",
            self.disclosures.len()
        );

        Ok(SdJwtBuf::from_parts(&jwt, &self.disclosures)?)
    }
}

/// Owned SD-JWT in compact form.
///
/// # Grammar
///
/// ```abnf
/// ALPHA = %x41-5A / %x61-7A ; A-Z / a-z
/// DIGIT = %x30-39 ; 0-9
/// BASE64URL = 1*(ALPHA / DIGIT / "-" / "_")
/// JWT = BASE64URL "." BASE64URL "." *BASE64URL
/// DISCLOSURE = BASE64URL
/// SD-JWT = JWT "~" *[DISCLOSURE "~"]
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SdJwtBuf(String);

impl SdJwtBuf {
    /// Parses the given string as an SD-JWT.
    pub fn new(input: String) -> Result<Self, InvalidSdJwt> {
        if Self::validate(input.as_bytes()) {
            Ok(Self(input))
        } else {
            Err(InvalidSdJwt(input))
        }
    }

    /// Joins a compact JWT with its disclosures, in the given order.
    pub fn from_parts(
        jwt: &str,
        disclosures: &[impl Borrow<Disclosure>],
    ) -> Result<Self, InvalidSdJwt> {
        let mut result = String::with_capacity(
            jwt.len()
                + 1
                + disclosures
                    .iter()
                    .map(|d| d.borrow().as_bytes().len() + 1)
                    .sum::<usize>(),
        );

        result.push_str(jwt);
        result.push('~');
        for disclosure in disclosures {
            result.push_str(disclosure.borrow().as_str());
            result.push('~');
        }

        Self::new(result)
    }

    /// Checks that the given input is an SD-JWT.
    pub fn validate(bytes: &[u8]) -> bool {
        let Some(jwt_end) = bytes.iter().position(|&c| c == b'~') else {
            return false;
        };

        if !validate_jwt(&bytes[..jwt_end]) {
            return false;
        }

        // Every disclosure is terminated by a `~`.
        match bytes[jwt_end + 1..].split_last() {
            None => true,
            Some((&b'~', disclosures)) => disclosures
                .split(|&c| c == b'~')
                .all(|d| !d.is_empty() && d.iter().copied().all(is_url_safe_base64_char)),
            Some(_) => false,
        }
    }

    /// Returns this SD-JWT as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the underlying bytes of the SD-JWT.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn jwt_end(&self) -> usize {
        self.0.find('~').unwrap_or(self.0.len())
    }

    /// Returns the issuer-signed JWT.
    pub fn jwt(&self) -> &str {
        &self.0[..self.jwt_end()]
    }

    /// Returns an iterator over the disclosures, in order.
    pub fn disclosures(&self) -> impl Iterator<Item = &Disclosure> {
        self.0[self.jwt_end()..]
            .split('~')
            .filter(|d| !d.is_empty())
            .map(|d| unsafe {
                // SAFETY: we already validated the SD-JWT and know it is
                // composed of valid disclosures.
                Disclosure::new_unchecked(d.as_bytes())
            })
    }

    /// Returns the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Checks the `header.payload.signature` structure of a compact JWT.
fn validate_jwt(bytes: &[u8]) -> bool {
    let mut parts = bytes.split(|&c| c == b'.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    !header.is_empty()
        && !payload.is_empty()
        && [header, payload, signature]
            .iter()
            .all(|part| part.iter().copied().all(is_url_safe_base64_char))
}

impl AsRef<str> for SdJwtBuf {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<[u8]> for SdJwtBuf {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for SdJwtBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl fmt::Debug for SdJwtBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl FromStr for SdJwtBuf {
    type Err = InvalidSdJwt;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl serde::Serialize for SdJwtBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for SdJwtBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
