use crate::decode::DecodeError;
use crate::field::{Field, Kind, Record};

/// The required-field shape of a record type.
///
/// Every key is the external name of a required field. Nested records become
/// `Object`s; everything else is a `Null` placeholder waiting to be filled in
/// by the document. Entries are kept in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Skeleton {
    Null,
    Object(Vec<(&'static str, Skeleton)>),
}

impl Skeleton {
    /// Builds the skeleton of `T`, nesting at most `max_depth` records deep
    /// (`0` for no limit).
    pub fn of<T: Record>(max_depth: usize) -> Result<Self, DecodeError> {
        build(T::FIELDS, max_depth)
    }

    /// The entries of an `Object`. A `Null` has none.
    pub fn entries(&self) -> &[(&'static str, Skeleton)] {
        match self {
            Skeleton::Null => &[],
            Skeleton::Object(entries) => entries,
        }
    }
}

pub fn build(fields: &[Field], max_depth: usize) -> Result<Skeleton, DecodeError> {
    build_at(fields, 1, max_depth)
}

fn build_at(fields: &[Field], depth: usize, max_depth: usize) -> Result<Skeleton, DecodeError> {
    if max_depth != 0 && depth > max_depth {
        return Err(DecodeError::MaxDepthExceeded);
    }

    let mut entries = Vec::with_capacity(fields.len());
    for field in fields {
        if !field.is_required() {
            continue;
        }

        let name = match field.name() {
            Some(name) => name,
            None => continue,
        };

        let node = match field.kind() {
            Kind::Leaf => Skeleton::Null,
            Kind::Record(nested) => build_at(nested.fields(), depth + 1, max_depth)?,
        };

        entries.push((name, node));
    }

    Ok(Skeleton::Object(entries))
}
