use serde_json::{Map, Value};

use crate::{ARRAY_CLAIM_ITEM_PROPERTY_NAME, SD_ALG_CLAIM_NAME, SD_CLAIM_NAME};

pub const fn is_url_safe_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_')
}

pub fn is_reserved_claim_name(name: &str) -> bool {
    matches!(name, SD_CLAIM_NAME | SD_ALG_CLAIM_NAME)
}

/// Returns the digest carried by an array item marker (`{"...": digest}`),
/// if `value` is one.
pub fn as_concealed_array_item(value: &Value) -> Option<&str> {
    match value {
        Value::Object(object) if object.len() == 1 => object
            .get(ARRAY_CLAIM_ITEM_PROPERTY_NAME)
            .and_then(Value::as_str),
        _ => None,
    }
}

pub fn new_concealed_array_item(digest: String) -> Value {
    let mut object = Map::new();
    object.insert(ARRAY_CLAIM_ITEM_PROPERTY_NAME.to_owned(), digest.into());
    Value::Object(object)
}

/// Finds the first reserved name used by `value`, at any depth.
///
/// Reserved names are the `_sd` and `_sd_alg` object keys, and `...` for an
/// array item that would read as a concealed item.
pub fn find_reserved_claim_name(value: &Value) -> Option<&str> {
    match value {
        Value::Object(object) => object.iter().find_map(|(key, value)| {
            if is_reserved_claim_name(key) {
                Some(key.as_str())
            } else {
                find_reserved_claim_name(value)
            }
        }),
        Value::Array(items) => items.iter().find_map(|item| {
            if as_concealed_array_item(item).is_some() {
                Some(ARRAY_CLAIM_ITEM_PROPERTY_NAME)
            } else {
                find_reserved_claim_name(item)
            }
        }),
        _ => None,
    }
}

/// Visits every digest found in `value`, at any depth.
///
/// Digests are either the items of an `_sd` array or the value of an array
/// item marker.
pub fn visit_digests<'a>(value: &'a Value, f: &mut impl FnMut(&'a str)) {
    match value {
        Value::Object(object) => {
            for (key, value) in object {
                if key == SD_CLAIM_NAME {
                    if let Value::Array(digests) = value {
                        digests.iter().filter_map(Value::as_str).for_each(&mut *f);
                    }
                } else {
                    visit_digests(value, f)
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match as_concealed_array_item(item) {
                    Some(digest) => f(digest),
                    None => visit_digests(item, f),
                }
            }
        }
        _ => (),
    }
}
