#![no_main]
use libfuzzer_sys::fuzz_target;
use required_json::{decode, DecodeError, DecodeOptions, Field, Record};
use serde::Deserialize;

#[derive(Deserialize)]
#[allow(dead_code)]
struct Address {
    street: String,
    #[serde(default)]
    zip: Option<String>,
}

impl Record for Address {
    const FIELDS: &'static [Field] = &[Field::leaf("street"), Field::leaf("zip,optional")];
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Person {
    name: String,
    #[serde(default)]
    age: u32,
    address: Address,
    #[serde(default)]
    tags: Vec<String>,
}

impl Record for Person {
    const FIELDS: &'static [Field] = &[
        Field::leaf("name"),
        Field::leaf("age,optional"),
        Field::record::<Address>("address"),
        Field::leaf("tags,optional"),
    ];
}

fuzz_target!(|data: &[u8]| {
    for options in [
        DecodeOptions::new(),
        DecodeOptions::new().with_deny_unknown_fields(true),
    ] {
        // Whatever the input, a well-formed record type never trips the
        // shape guard.
        if let Err(DecodeError::TypeConstraint(err)) = decode::<Person>(data, options) {
            panic!("unexpected type constraint: {}", err);
        }
    }
});
