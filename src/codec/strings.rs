use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;

/// Turns the raw bytes of a map string into text.
///
/// Map strings carry no encoding marker; which code page applies depends on
/// the language of the game the map was made with.
pub trait StringDecoder: fmt::Debug {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str>;
}

impl<T: StringDecoder + ?Sized> StringDecoder for &T {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        (**self).decode(bytes)
    }
}

/// A single-byte legacy code page
#[derive(Clone, Copy)]
pub struct Codepage(&'static Encoding);

impl Codepage {
    /// Western European, used by the English and most European releases
    pub const WINDOWS_1252: Codepage = Codepage(encoding_rs::WINDOWS_1252);
    /// Central European (Polish, Czech releases)
    pub const WINDOWS_1250: Codepage = Codepage(encoding_rs::WINDOWS_1250);
    /// Cyrillic (Russian releases)
    pub const WINDOWS_1251: Codepage = Codepage(encoding_rs::WINDOWS_1251);

    pub fn new(encoding: &'static Encoding) -> Self {
        Self(encoding)
    }

    /// Look up a code page by WHATWG label, e.g. `"windows-1251"`
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.as_bytes()).map(Self)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Codepage {
    fn default() -> Self {
        Self::WINDOWS_1252
    }
}

impl fmt::Debug for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Codepage").field(&self.0.name()).finish()
    }
}

impl StringDecoder for Codepage {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, _had_errors) = self.0.decode_without_bom_handling(bytes);
        text
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8Lossy;

impl StringDecoder for Utf8Lossy {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        String::from_utf8_lossy(bytes)
    }
}

/// Picks UTF-8 for byte strings that contain non-ASCII bytes and are valid
/// UTF-8 (maps saved by third-party editors), and falls back to a legacy
/// code page otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetectingDecoder {
    pub fallback: Codepage,
}

impl DetectingDecoder {
    pub fn new(fallback: Codepage) -> Self {
        Self { fallback }
    }
}

impl StringDecoder for DetectingDecoder {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        if bytes.is_ascii() {
            return self.fallback.decode(bytes);
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => self.fallback.decode(bytes),
        }
    }
}
