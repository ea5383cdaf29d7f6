use crate::decode::DecodeError;
use crate::field::{Field, Kind, Record};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use std::collections::HashSet;

/// How a type presents itself to serde's data model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layout {
    Struct {
        name: &'static str,
        fields: &'static [&'static str],
    },
    Map,
    Other(&'static str),
}

/// Asks `T`'s `Deserialize` impl which shape it expects, without any input.
///
/// The recorder answers every request with an error, so nothing is ever
/// constructed; it only records the first method `T` calls.
pub(crate) fn layout<T: DeserializeOwned>() -> Layout {
    let mut layout = Layout::Other("unknown");
    let _ = T::deserialize(Recorder {
        layout: &mut layout,
    });
    layout
}

/// Checks that `T` is a plain record and that its declared fields agree with
/// the fields serde knows about, recursively for nested records.
pub(crate) fn verify<T: Record>(max_depth: usize) -> Result<(), DecodeError> {
    match layout::<T>() {
        Layout::Other(kind) => Err(DecodeError::TypeConstraint(format!(
            "record must be a struct not '{}'",
            kind
        ))),
        layout => verify_fields(T::FIELDS, layout, &mut vec![layout], max_depth),
    }
}

// `enclosing` holds the layouts from the root record down to `layout`.
fn verify_fields(
    fields: &[Field],
    layout: Layout,
    enclosing: &mut Vec<Layout>,
    max_depth: usize,
) -> Result<(), DecodeError> {
    if max_depth != 0 && enclosing.len() > max_depth {
        return Err(DecodeError::MaxDepthExceeded);
    }

    let mut seen = HashSet::new();
    for field in fields {
        let name = match field.name() {
            Some(name) => name,
            None => continue,
        };

        if !seen.insert(name) {
            return Err(DecodeError::TypeConstraint(format!(
                "field '{}' is declared more than once",
                name
            )));
        }

        // Structs with flattened members deserialize as maps and don't list
        // their fields, so there is nothing to compare against.
        if let Layout::Struct {
            name: record,
            fields: known,
        } = layout
        {
            if !known.contains(&name) {
                return Err(DecodeError::TypeConstraint(format!(
                    "field '{}' is not a field of struct {}",
                    name, record
                )));
            }
        }

        if let Kind::Record(nested) = field.kind() {
            match nested.layout() {
                Layout::Other(kind) => {
                    return Err(DecodeError::TypeConstraint(format!(
                        "field '{}' must be a struct not '{}'",
                        name, kind
                    )));
                }
                layout @ Layout::Struct { name: record, .. } if enclosing.contains(&layout) => {
                    return Err(DecodeError::TypeConstraint(format!(
                        "field '{}' refers back to struct {}, declare it as a leaf",
                        name, record
                    )));
                }
                layout => {
                    enclosing.push(layout);
                    verify_fields(nested.fields(), layout, enclosing, max_depth)?;
                    enclosing.pop();
                }
            }
        }
    }

    Ok(())
}

struct Recorder<'a> {
    layout: &'a mut Layout,
}

impl Recorder<'_> {
    fn found<T>(self, layout: Layout) -> Result<T, de::value::Error> {
        *self.layout = layout;
        Err(de::Error::custom("layout recorded"))
    }
}

macro_rules! recorded_kinds {
    ($($method:ident => $kind:literal,)*) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                self.found(Layout::Other($kind))
            }
        )*
    };
}

impl<'de> Deserializer<'de> for Recorder<'_> {
    type Error = de::value::Error;

    recorded_kinds! {
        deserialize_any => "any",
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "str",
        deserialize_string => "string",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_option => "option",
        deserialize_unit => "unit",
        deserialize_seq => "seq",
        deserialize_identifier => "identifier",
        deserialize_ignored_any => "any",
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.found(Layout::Map)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.found(Layout::Struct { name, fields })
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.found(Layout::Other("unit struct"))
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.found(Layout::Other("newtype struct"))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.found(Layout::Other("tuple"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.found(Layout::Other("tuple struct"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.found(Layout::Other("enum"))
    }
}
