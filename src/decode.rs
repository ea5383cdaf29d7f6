use crate::check::{check, check_unknown};
use crate::field::Record;
use crate::merge::{merge, Merged};
use crate::normalize::normalize;
use crate::shape;
use crate::skeleton::Skeleton;
use serde::Serialize;
use serde_json::{Map, Value};
use serde_path_to_error::Segment;
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    max_depth: usize,
    deny_unknown_fields: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            deny_unknown_fields: false,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many records deep a type may nest. `0` removes the limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Rejects document keys that no declared field accounts for, instead of
    /// ignoring them.
    pub fn with_deny_unknown_fields(mut self, deny_unknown_fields: bool) -> Self {
        self.deny_unknown_fields = deny_unknown_fields;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("type constraint: {0}")]
    TypeConstraint(String),

    #[error("invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("missing required field: <{path}>")]
    MissingField { path: String },

    #[error("unknown field: <{path}>")]
    UnknownField { path: String },

    #[error("max depth exceeded")]
    MaxDepthExceeded,
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Decodes `data` into a `T`, failing if any required field of `T` is absent
/// or null.
///
/// ```
/// use required_json::{decode, DecodeError, DecodeOptions, Field, Record};
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User {
///     name: String,
///     #[serde(default)]
///     age: u32,
/// }
///
/// impl Record for User {
///     const FIELDS: &'static [Field] = &[Field::leaf("name"), Field::leaf("age,optional")];
/// }
///
/// assert_eq!(
///     User { name: "a".to_owned(), age: 0 },
///     decode::<User>(br#"{"name":"a"}"#, DecodeOptions::new()).unwrap()
/// );
///
/// assert_eq!(
///     DecodeError::MissingField { path: "name".to_owned() },
///     decode::<User>(br#"{"age":3}"#, DecodeOptions::new()).unwrap_err()
/// );
/// ```
pub fn decode<T: Record>(data: &[u8], options: DecodeOptions) -> Result<T> {
    let result = parse::<T>(data, options).and_then(|(document, skeleton)| {
        let merged = merge(&skeleton, &document);
        let output = typed(&Value::Object(stripped(&document, &merged)), &merged)?;
        presence::<T>(&merged, &document, options)?;
        Ok(output)
    });

    finish::<T, _>(result)
}

/// Like [`decode`], but populates an existing value.
///
/// Keys the document supplies overwrite the corresponding fields of `output`,
/// nested objects key by key; everything else keeps its current value,
/// including fields serde skips. On error `output` is left untouched.
///
/// Skipped fields survive only for types whose derived `Deserialize` can fill
/// a value in place; other types are rebuilt and their skipped fields reset to
/// their defaults.
pub fn decode_into<T: Record + Serialize>(
    data: &[u8],
    output: &mut T,
    options: DecodeOptions,
) -> Result<()> {
    let result = parse::<T>(data, options).and_then(|(document, skeleton)| {
        let merged = merge(&skeleton, &document);

        let mut base = match serde_json::to_value(&*output) {
            Ok(Value::Object(base)) => base,
            Ok(_) => {
                return Err(DecodeError::TypeConstraint(
                    "output must serialize as an object".to_owned(),
                ))
            }
            Err(err) => {
                return Err(DecodeError::TypeConstraint(format!(
                    "output is not serializable: {}",
                    err
                )))
            }
        };

        overlay(&mut base, stripped(&document, &merged));
        let base = Value::Object(base);

        typed::<T>(&base, &merged)?;
        presence::<T>(&merged, &document, options)?;

        T::deserialize_in_place(&base, output).map_err(|err| mismatch(err.to_string()))
    });

    finish::<T, _>(result)
}

/// Verifies the record type, then parses the document and builds the
/// skeleton of its required keys.
fn parse<T: Record>(
    data: &[u8],
    options: DecodeOptions,
) -> Result<(Map<String, Value>, Skeleton)> {
    tracing::debug!(
        record = std::any::type_name::<T>(),
        len = data.len(),
        "decoding"
    );

    shape::verify::<T>(options.max_depth)?;

    let document: Map<String, Value> =
        serde_json::from_slice(data).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;

    let skeleton = Skeleton::of::<T>(options.max_depth)?;
    tracing::trace!(required = skeleton.entries().len(), "built skeleton");

    Ok((document, skeleton))
}

/// Runs after a successful typed decode. serde accepts an absent key when the
/// field defaults, so presence is checked again here.
fn presence<T: Record>(
    merged: &Merged,
    document: &Map<String, Value>,
    options: DecodeOptions,
) -> Result<()> {
    check(merged)?;

    if options.deny_unknown_fields {
        check_unknown(T::FIELDS, document)?;
    }

    Ok(())
}

/// Copies `document` without the nulls that sit in required slots.
///
/// serde reports an absent key only once it has read every sibling, while a
/// null fails on the spot. Dropping them lets a type mismatch next to the null
/// be reported first.
fn stripped(document: &Map<String, Value>, merged: &Merged) -> Map<String, Value> {
    let mut document = document.clone();
    strip(&mut document, merged);
    document
}

fn strip(document: &mut Map<String, Value>, merged: &Merged) {
    if let Merged::Object(entries) = merged {
        for (name, node) in entries {
            if let Some(Value::Null) = document.get(*name) {
                document.remove(*name);
            } else if let Some(Value::Object(nested)) = document.get_mut(*name) {
                strip(nested, node);
            }
        }
    }
}

fn typed<T: Record>(document: &Value, merged: &Merged) -> Result<T> {
    serde_path_to_error::deserialize(document).map_err(|err| {
        if is_presence_failure(&err, merged) {
            if let Err(missing) = check(merged) {
                return missing;
            }
        }

        let path = err.path().to_string();
        if path == "." {
            mismatch(err.inner().to_string())
        } else {
            mismatch(format!("{}: {}", path, err.inner()))
        }
    })
}

/// Whether serde failed because a value is absent or null at a slot the
/// presence check also treats as missing.
fn is_presence_failure(
    err: &serde_path_to_error::Error<serde_json::Error>,
    merged: &Merged,
) -> bool {
    let message = err.inner().to_string();

    let mut location = Vec::new();
    for segment in err.path().iter() {
        match segment {
            Segment::Map { key } => location.push(key.as_str()),
            _ => return false,
        }
    }

    if let Some(rest) = message.strip_prefix("missing field `") {
        match rest.split('`').next() {
            Some(name) => location.push(name),
            None => return false,
        }
    } else if !message.starts_with("invalid type: null")
        && !message.starts_with("invalid type: unit value")
    {
        return false;
    }

    merged.get(&location).map_or(false, Merged::is_missing)
}

fn mismatch(raw: String) -> DecodeError {
    DecodeError::TypeMismatch(normalize(&raw))
}

fn finish<T, R>(result: Result<R>) -> Result<R> {
    match &result {
        Ok(_) => tracing::debug!(record = std::any::type_name::<T>(), "decoded"),
        Err(err) => tracing::debug!(
            record = std::any::type_name::<T>(),
            error = %err,
            "decode failed"
        ),
    }

    result
}

fn overlay(base: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        if let Value::Object(nested) = value {
            if let Some(Value::Object(existing)) = base.get_mut(&key) {
                overlay(existing, nested);
                continue;
            }

            base.insert(key, Value::Object(nested));
        } else {
            base.insert(key, value);
        }
    }
}
