//! Element-wise decoding of list-shaped payloads.
//!
//! Every list endpoint (auth methods, builds, jobs, log frames) goes
//! through [`decode_elements`]: the container must be a JSON array, but one
//! malformed record never discards its valid siblings. Callers only see the
//! error channel when the container itself is the wrong shape.

use std::marker::PhantomData;

use serde_json::Value;

use contrail_types::DeserializationError;

/// Decode a raw payload into a lazy sequence of parsed elements.
///
/// `parse_one` turns a single record into an item or a
/// [`DeserializationError`]; failed records are dropped (logged at debug)
/// and the rest continue in input order. A payload that is not a JSON
/// array fails up front with `InvalidFormat` and yields nothing.
pub fn decode_elements<T, F>(data: &[u8], parse_one: F) -> Result<Elements<T, F>, DeserializationError>
where
    F: Fn(&Value) -> Result<T, DeserializationError>,
{
    let payload: Value = serde_json::from_slice(data).map_err(|_| {
        DeserializationError::invalid_format("Could not interpret payload as JSON")
    })?;

    let Value::Array(records) = payload else {
        return Err(DeserializationError::invalid_format(
            "Expected payload to be a JSON array",
        ));
    };

    Ok(Elements {
        records: records.into_iter(),
        parse_one,
        _item: PhantomData,
    })
}

/// Iterator over successfully parsed elements of an array payload.
pub struct Elements<T, F> {
    records: std::vec::IntoIter<Value>,
    parse_one: F,
    _item: PhantomData<fn() -> T>,
}

impl<T, F> Iterator for Elements<T, F>
where
    F: Fn(&Value) -> Result<T, DeserializationError>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let record = self.records.next()?;
            match (self.parse_one)(&record) {
                Ok(item) => return Some(item),
                Err(err) => {
                    tracing::debug!(error = %err, "Dropping malformed record");
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Require a string field on a record. A present-but-null value is a
/// type mismatch, not a missing field.
pub fn require_str<'a>(record: &'a Value, field: &str) -> Result<&'a str, DeserializationError> {
    match record.get(field) {
        None => Err(DeserializationError::missing_field(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(DeserializationError::type_mismatch(field, "a string")),
    }
}

/// Require an integer field on a record. As with [`require_str`], null is
/// a type mismatch.
pub fn require_i64(record: &Value, field: &str) -> Result<i64, DeserializationError> {
    match record.get(field) {
        None => Err(DeserializationError::missing_field(field)),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| DeserializationError::type_mismatch(field, "an integer")),
    }
}

/// Read an optional unsigned integer field; absence is fine, the wrong
/// type is not.
pub fn optional_u64(record: &Value, field: &str) -> Result<Option<u64>, DeserializationError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| DeserializationError::type_mismatch(field, "an unsigned integer")),
    }
}

/// Read an optional array-of-strings field; absent means empty.
pub fn optional_str_array(record: &Value, field: &str) -> Result<Vec<String>, DeserializationError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(DeserializationError::type_mismatch(field, "an array of strings")),
            })
            .collect(),
        Some(_) => Err(DeserializationError::type_mismatch(field, "an array of strings")),
    }
}
