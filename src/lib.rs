//! H3M Map Decoder
//!
//! A Rust library for reading Heroes of Might and Magic III map files
//! (RoE, AB, SoD, HotA and WoG) into a typed, serializable model.

#[macro_use]
mod macros;

pub mod catalog;
pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod fingerprint;
pub mod map;
pub mod objects;
pub mod validate;

pub use catalog::{Catalog, Catalogs, Identifier, NameTable, ObjectTemplate, Resolver};
pub use codec::{
    Codepage, DetectingDecoder, Faction, Format, PlayerColor, Position, Resource, StringDecoder,
    Tagged, Utf8Lossy, Version,
};
pub use diagnostics::{
    CollectSink, Diagnostic, DiagnosticKind, DiagnosticSink, NullSink, Severity, TracingSink,
};
pub use error::{Error, FailureClass, Result};
pub use fingerprint::{find_duplicates, fingerprint, Fingerprint};
pub use map::{decode_bytes, decode_file, decode_map, DecodeOptions, Map};
pub use objects::{MapObject, ObjectClass, ObjectPayload};
pub use validate::{validate, Finding};
