use crate::decode::DecodeError;
use crate::field::Field;
use crate::merge::Merged;
use serde_json::{Map, Value};

/// Finds the first required value missing from a merged tree.
///
/// Entries are visited depth-first in declaration order, and the error names
/// the dotted path of the first `Null` found.
pub fn check(merged: &Merged) -> Result<(), DecodeError> {
    let mut vm = Vm { tokens: vec![] };
    vm.check(merged)
}

/// Finds the first document key that no declared field accounts for.
///
/// Optional fields count as declared. Nested records are only descended into
/// when the document holds an object for them.
pub fn check_unknown(fields: &[Field], document: &Map<String, Value>) -> Result<(), DecodeError> {
    let mut vm = Vm { tokens: vec![] };
    vm.check_unknown(fields, document)
}

struct Vm<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Vm<'a> {
    fn check(&mut self, merged: &Merged) -> Result<(), DecodeError> {
        if let Merged::Object(entries) = merged {
            for (name, value) in entries {
                self.tokens.push(*name);
                match value {
                    Merged::Object(_) => self.check(value)?,
                    Merged::Null => return Err(self.missing()),
                    Merged::Value(_) => {}
                }
                self.tokens.pop();
            }
        }

        Ok(())
    }

    fn check_unknown(
        &mut self,
        fields: &[Field],
        document: &'a Map<String, Value>,
    ) -> Result<(), DecodeError> {
        for (key, value) in document {
            self.tokens.push(key);

            let field = match fields.iter().find(|field| field.name() == Some(key.as_str())) {
                Some(field) => field,
                None => {
                    return Err(DecodeError::UnknownField {
                        path: self.tokens.join("."),
                    })
                }
            };

            if let (Some(nested), Value::Object(object)) = (field.nested(), value) {
                self.check_unknown(nested, object)?;
            }

            self.tokens.pop();
        }

        Ok(())
    }

    fn missing(&self) -> DecodeError {
        let path = self.tokens.join(".");
        tracing::trace!(%path, "required field missing");
        DecodeError::MissingField { path }
    }
}
