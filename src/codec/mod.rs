pub mod container;
pub mod reader;
pub mod strings;
pub mod types;
#[cfg(test)]
pub mod writer;

pub use container::{is_compressed, open_container};
pub use reader::{BinaryReader, Polarity, DEFAULT_MAX_STRING_LEN};
pub use strings::{Codepage, DetectingDecoder, StringDecoder, Utf8Lossy};
pub use types::*;
#[cfg(test)]
pub use writer::BinaryWriter;
