//! Decode JSON into Rust records while enforcing that every required field is
//! present.
//!
//! serde happily fills in defaults or ignores absent keys depending on how a
//! struct is annotated, and reports a missing value as a type error when the
//! key is explicitly `null`. This crate adds a presence check around the typed
//! decode: each [`Record`] lists its fields with their JSON names, and a field
//! not tagged `optional` must appear with a non-null value. Nested records are
//! checked recursively and failures name the dotted path of the first missing
//! field. A value of the wrong type is reported as a mismatch even when other
//! required fields are missing.
//!
//! Checking runs in three steps: a [`Skeleton`] of required keys is built from
//! the record's [`Field`]s, the parsed document is [`merge()`]d onto it, and the
//! merged tree is [`check()`]ed for holes. [`decode()`] and [`decode_into`] run the
//! whole pipeline.

mod check;
mod decode;
mod field;
mod merge;
mod normalize;
mod shape;
mod skeleton;

pub use check::*;
pub use decode::*;
pub use field::*;
pub use merge::*;
pub use normalize::*;
pub use skeleton::*;
