use crate::shape::{self, Layout};
use serde::de::DeserializeOwned;

/// A record type whose required fields can be checked before decoding.
///
/// `FIELDS` lists the record's fields in declaration order. Each entry carries
/// a tag in the usual `"name,modifier,..."` form: the first segment is the
/// field's external (JSON) name, and an `optional` modifier marks a field that
/// may be absent. A name of `-`, or an empty name, excludes the field from
/// presence checking altogether.
///
/// ```
/// use required_json::{Field, Record};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Address {
///     zip: String,
/// }
///
/// impl Record for Address {
///     const FIELDS: &'static [Field] = &[Field::leaf("zip")];
/// }
///
/// #[derive(Deserialize)]
/// struct Person {
///     name: String,
///     #[serde(default)]
///     age: u32,
///     address: Address,
/// }
///
/// impl Record for Person {
///     const FIELDS: &'static [Field] = &[
///         Field::leaf("name"),
///         Field::leaf("age,optional"),
///         Field::record::<Address>("address"),
///     ];
/// }
/// ```
///
/// The tags must agree with the names serde uses for the struct; a mismatch is
/// reported as [`DecodeError::TypeConstraint`][`crate::DecodeError::TypeConstraint`]
/// when decoding.
pub trait Record: DeserializeOwned {
    const FIELDS: &'static [Field];
}

/// One entry of [`Record::FIELDS`]: a struct field's tag and whether it holds
/// a nested record.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    tag: &'static str,
    kind: Kind,
}

/// What a field holds, as far as presence checking is concerned.
#[derive(Clone, Copy, Debug)]
pub enum Kind {
    /// A scalar, array, map, or any indirection. Never descended into.
    Leaf,
    /// A struct that implements [`Record`], checked field by field.
    Record(Nested),
}

/// The metadata of a nested record field, resolved lazily.
#[derive(Clone, Copy, Debug)]
pub struct Nested {
    fields: fn() -> &'static [Field],
    layout: fn() -> Layout,
}

impl Nested {
    pub fn fields(&self) -> &'static [Field] {
        (self.fields)()
    }

    pub(crate) fn layout(&self) -> Layout {
        (self.layout)()
    }
}

fn fields_of<T: Record>() -> &'static [Field] {
    T::FIELDS
}

impl Field {
    pub const fn leaf(tag: &'static str) -> Self {
        Self {
            tag,
            kind: Kind::Leaf,
        }
    }

    /// A field holding the record `T`.
    ///
    /// Self-references, boxed or optional, must be declared with
    /// [`Field::leaf`]; a record that refers back to an enclosing one is
    /// rejected as a type constraint.
    pub const fn record<T: Record>(tag: &'static str) -> Self {
        Self {
            tag,
            kind: Kind::Record(Nested {
                fields: fields_of::<T>,
                layout: shape::layout::<T>,
            }),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The external name, or `None` if the field is excluded.
    pub fn name(&self) -> Option<&'static str> {
        match self.tag.split(',').next() {
            Some("") | Some("-") | None => None,
            Some(name) => Some(name),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.tag.split(',').skip(1).any(|modifier| modifier == "optional")
    }

    pub fn is_required(&self) -> bool {
        self.name().is_some() && !self.is_optional()
    }

    pub fn nested(&self) -> Option<&'static [Field]> {
        match self.kind {
            Kind::Leaf => None,
            Kind::Record(nested) => Some(nested.fields()),
        }
    }
}
