//! Typed field access over parsed JSON objects.
//!
//! The JWT and JWKS decoders both need to distinguish "field absent" from
//! "field present with the wrong type" from "field present with an
//! unrepresentable value". `#[derive(Deserialize)]` collapses those into one
//! error, so extraction goes through [`ObjectReader`] instead.
//!
//! Lookup names are dotted paths descending through nested objects
//! (`"realm_access.roles"`). Names that start with `http://` or `https://`
//! keep the scheme, authority, and first path segment as a single atomic key
//! before dot-splitting, so namespaced custom claims like
//! `"https://example.com/claims.nested.key"` resolve as
//! `["https://example.com/claims", "nested", "key"]`.

use serde_json::{Map, Value};

/// Why a field lookup did not produce a value of the requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindError {
    /// No value exists at the path.
    Missing,
    /// A value exists but has the wrong JSON type (including a non-object
    /// intermediate step of a dotted path).
    WrongType,
    /// A numeric value exists but cannot be represented in the requested
    /// integer range.
    OutOfRange,
}

/// Read-only typed accessor over a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectReader<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> ObjectReader<'a> {
    /// Wrap a parsed JSON object.
    pub fn new(object: &'a Map<String, Value>) -> Self {
        Self { object }
    }

    /// Look up the raw value at a dotted path.
    ///
    /// # Errors
    ///
    /// [`FindError::Missing`] if any step is absent, [`FindError::WrongType`]
    /// if an intermediate step is not an object.
    pub fn get_value(&self, name: &str) -> Result<&'a Value, FindError> {
        let path = split_claim_path(name);
        let mut current = self.object;
        let last = path.len() - 1;
        for (i, key) in path.iter().enumerate() {
            let found = current.get(key.as_str()).ok_or(FindError::Missing)?;
            if i == last {
                return Ok(found);
            }
            current = found.as_object().ok_or(FindError::WrongType)?;
        }
        Err(FindError::Missing)
    }

    /// Look up a string value.
    pub fn get_string(&self, name: &str) -> Result<&'a str, FindError> {
        self.get_value(name)?.as_str().ok_or(FindError::WrongType)
    }

    /// Look up a boolean value.
    pub fn get_bool(&self, name: &str) -> Result<bool, FindError> {
        self.get_value(name)?.as_bool().ok_or(FindError::WrongType)
    }

    /// Look up a numeric value as a signed 64-bit integer.
    ///
    /// JSON doubles are truncated toward zero; this is lossy for magnitudes
    /// at or above 2^53.
    pub fn get_i64(&self, name: &str) -> Result<i64, FindError> {
        number_as_i64(self.get_value(name)?)
    }

    /// Look up a numeric value as an unsigned 64-bit integer.
    pub fn get_u64(&self, name: &str) -> Result<u64, FindError> {
        let value = self.get_value(name)?;
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(u)
                } else if let Some(f) = n.as_f64() {
                    if f >= 0.0 && f < u64::MAX as f64 {
                        Ok(f.trunc() as u64)
                    } else {
                        Err(FindError::OutOfRange)
                    }
                } else {
                    Err(FindError::OutOfRange)
                }
            }
            _ => Err(FindError::WrongType),
        }
    }

    /// Look up a value that is either a single string or an array of strings.
    ///
    /// A single string yields a one-element list; an array must contain only
    /// strings.
    pub fn get_string_list(&self, name: &str) -> Result<Vec<String>, FindError> {
        match self.get_value(name)? {
            Value::String(s) => Ok(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_owned).ok_or(FindError::WrongType))
                .collect(),
            _ => Err(FindError::WrongType),
        }
    }
}

fn number_as_i64(value: &Value) -> Result<i64, FindError> {
    let Value::Number(n) = value else {
        return Err(FindError::WrongType);
    };
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if let Some(f) = n.as_f64() {
        // i64::MAX as f64 rounds up to 2^63, so a strict upper bound keeps
        // the cast in range.
        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return Ok(f.trunc() as i64);
        }
    }
    Err(FindError::OutOfRange)
}

/// Split a claim name into lookup steps.
///
/// Scheme-prefixed names keep `scheme://authority/first-segment` as one
/// atomic key; a scheme-prefixed name with no path at all is a single key.
fn split_claim_path(name: &str) -> Vec<String> {
    if !(name.starts_with("http://") || name.starts_with("https://")) {
        return name.split('.').map(str::to_owned).collect();
    }
    let mut pieces = name.splitn(4, '/');
    let scheme = pieces.next().unwrap_or_default();
    let _empty = pieces.next();
    let authority = pieces.next().unwrap_or_default();
    let Some(rest) = pieces.next() else {
        return vec![name.to_owned()];
    };
    let mut segments = rest.split('.');
    let head = segments.next().unwrap_or_default();
    let mut path = vec![format!("{scheme}//{authority}/{head}")];
    path.extend(segments.map(str::to_owned));
    path
}
