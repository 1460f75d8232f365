use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::strings::StringDecoder;
use super::types::{IdWidth, Position, Tagged, WireEnum};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::{Error, Result};

/// Soft ceiling for string lengths; longer strings are reported but read
pub const DEFAULT_MAX_STRING_LEN: usize = 30_000;

/// How a set bit in an allow-list bitmask is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    SetMeansAllowed,
    SetMeansForbidden,
}

/// Forward-only binary reader for H3M data.
///
/// Every read advances the position by exactly the bytes it consumed.
/// Range violations and other soft failures go to the diagnostic sink and
/// the raw value is returned unchanged.
pub struct BinaryReader<'a> {
    source: &'a mut dyn Read,
    pos: u64,
    sink: &'a dyn DiagnosticSink,
    strings: &'a dyn StringDecoder,
    max_string_len: usize,
}

fn io_error(err: io::Error, offset: u64, needed: usize) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::Truncated { offset, needed }
    } else {
        Error::Io(err)
    }
}

impl<'a> BinaryReader<'a> {
    pub fn new(
        source: &'a mut dyn Read,
        sink: &'a dyn DiagnosticSink,
        strings: &'a dyn StringDecoder,
    ) -> Self {
        Self {
            source,
            pos: 0,
            sink,
            strings,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }

    pub fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max;
        self
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn sink(&self) -> &'a dyn DiagnosticSink {
        self.sink
    }

    /// Report a soft failure at `offset`
    pub fn report(&self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }

    fn check_range(&self, offset: u64, value: i64, min: i64, max: i64, what: &str) {
        if value < min || value > max {
            self.report(
                Diagnostic::new(DiagnosticKind::OutOfRange, offset, what)
                    .with_value(value)
                    .with_expected(min, max),
            );
        }
    }

    /// Read `n` bytes. Memory grows with the data actually present, so a
    /// corrupt length cannot force a huge allocation up front.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let offset = self.pos;
        let mut buf = Vec::with_capacity(n.min(64 * 1024));
        let got = (&mut *self.source)
            .take(n as u64)
            .read_to_end(&mut buf)
            .map_err(|e| io_error(e, offset, n))?;
        self.pos += got as u64;
        if got < n {
            return Err(Error::Truncated { offset, needed: n });
        }
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let offset = self.pos;
        let v = self.source.read_u8().map_err(|e| io_error(e, offset, 1))?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        let offset = self.pos;
        let v = self.source.read_i8().map_err(|e| io_error(e, offset, 1))?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let offset = self.pos;
        let v = self
            .source
            .read_u16::<LittleEndian>()
            .map_err(|e| io_error(e, offset, 2))?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let offset = self.pos;
        let v = self
            .source
            .read_u32::<LittleEndian>()
            .map_err(|e| io_error(e, offset, 4))?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let offset = self.pos;
        let v = self
            .source
            .read_i32::<LittleEndian>()
            .map_err(|e| io_error(e, offset, 4))?;
        self.pos += 4;
        Ok(v)
    }

    /// Read an unsigned integer of `width` bytes (1, 2 or 4)
    pub fn read_uint(&mut self, width: usize) -> Result<u32> {
        match width {
            1 => self.read_u8().map(u32::from),
            2 => self.read_u16().map(u32::from),
            4 => self.read_u32(),
            _ => Err(Error::Malformed {
                offset: self.pos,
                reason: format!("unsupported integer width {width}"),
            }),
        }
    }

    /// Read an unsigned integer and report it when outside `min..=max`
    pub fn read_uint_in(&mut self, width: usize, min: u32, max: u32, what: &str) -> Result<u32> {
        let offset = self.pos;
        let v = self.read_uint(width)?;
        self.check_range(offset, v as i64, min as i64, max as i64, what);
        Ok(v)
    }

    pub fn read_u8_in(&mut self, min: u8, max: u8, what: &str) -> Result<u8> {
        let offset = self.pos;
        let v = self.read_u8()?;
        self.check_range(offset, v as i64, min as i64, max as i64, what);
        Ok(v)
    }

    pub fn read_i8_in(&mut self, min: i8, max: i8, what: &str) -> Result<i8> {
        let offset = self.pos;
        let v = self.read_i8()?;
        self.check_range(offset, v as i64, min as i64, max as i64, what);
        Ok(v)
    }

    pub fn read_u32_in(&mut self, min: u32, max: u32, what: &str) -> Result<u32> {
        self.read_uint_in(4, min, max, what)
    }

    pub fn read_i32_in(&mut self, min: i32, max: i32, what: &str) -> Result<i32> {
        let offset = self.pos;
        let v = self.read_i32()?;
        self.check_range(offset, v as i64, min as i64, max as i64, what);
        Ok(v)
    }

    /// Read a boolean byte. Anything other than 0 or 1 is reported and
    /// treated as true.
    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.pos;
        let v = self.read_u8()?;
        if v > 1 {
            self.report(
                Diagnostic::new(DiagnosticKind::BadBool, offset, "boolean byte")
                    .with_value(v as i64)
                    .with_expected(0, 1),
            );
        }
        Ok(v != 0)
    }

    /// Read a string prefixed with a 4-byte signed length
    pub fn read_string(&mut self) -> Result<String> {
        let offset = self.pos;
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::NegativeLength { offset, len });
        }
        let len = len as usize;
        if len > self.max_string_len {
            self.report(
                Diagnostic::new(DiagnosticKind::LongString, offset, "string length")
                    .with_value(len as i64)
                    .with_expected(0, self.max_string_len as i64),
            );
        }

        let start = self.pos;
        let mut bytes = Vec::with_capacity(len.min(4096));
        let got = (&mut *self.source)
            .take(len as u64)
            .read_to_end(&mut bytes)
            .map_err(|e| io_error(e, start, len))?;
        self.pos += got as u64;
        if got < len {
            return Err(Error::Truncated { offset: start, needed: len });
        }
        Ok(self.strings.decode(&bytes).into_owned())
    }

    /// Read `byte_count` bytes as bits, least significant bit first
    pub fn read_flags(&mut self, byte_count: usize) -> Result<Vec<bool>> {
        let bytes = self.read_bytes(byte_count)?;
        Ok(bytes
            .iter()
            .flat_map(|b| (0..8).map(move |bit| b & (1 << bit) != 0))
            .collect())
    }

    /// Read `bit_count` bits padded up to whole bytes
    pub fn read_bits(&mut self, bit_count: usize) -> Result<Vec<bool>> {
        let mut bits = self.read_flags(bit_count.div_ceil(8))?;
        bits.truncate(bit_count);
        Ok(bits)
    }

    /// Read a bitmask and return the indices it marks as allowed
    pub fn read_allow_list(&mut self, bit_count: usize, polarity: Polarity) -> Result<Vec<u32>> {
        let bits = self.read_bits(bit_count)?;
        let allowed_when = polarity == Polarity::SetMeansAllowed;
        Ok(bits
            .into_iter()
            .enumerate()
            .filter(|(_, set)| *set == allowed_when)
            .map(|(i, _)| i as u32)
            .collect())
    }

    /// Read an enumeration tag of `width` bytes. Unknown values are
    /// reported and kept as [`Tagged::Unknown`].
    pub fn read_enum<T: WireEnum>(&mut self, width: usize) -> Result<Tagged<T>> {
        let offset = self.pos;
        let raw = self.read_uint(width)?;
        let tag = Tagged::<T>::from_raw(raw);
        if !tag.is_known() {
            self.report(
                Diagnostic::new(DiagnosticKind::UnknownTag, offset, format!("unknown {} value", T::NAME))
                    .with_value(raw as i64),
            );
        }
        Ok(tag)
    }

    /// Read an owner byte where 0xFF means "nobody"
    pub fn read_owner<T: WireEnum>(&mut self) -> Result<Option<Tagged<T>>> {
        self.read_optional_enum()
    }

    /// Read a one-byte enumeration tag where 0xFF means "not set"
    pub fn read_optional_enum<T: WireEnum>(&mut self) -> Result<Option<Tagged<T>>> {
        let offset = self.pos;
        let raw = self.read_u8()?;
        if raw == 0xFF {
            return Ok(None);
        }
        let tag = Tagged::<T>::from_raw(raw as u32);
        if !tag.is_known() {
            self.report(
                Diagnostic::new(DiagnosticKind::UnknownTag, offset, format!("unknown {} value", T::NAME))
                    .with_value(raw as i64),
            );
        }
        Ok(Some(tag))
    }

    /// Read a version-dependent identifier, mapping the sentinel to `None`
    pub fn read_optional_id(&mut self, width: IdWidth) -> Result<Option<u32>> {
        let raw = self.read_uint(width.bytes())?;
        Ok((raw != width.sentinel()).then_some(raw))
    }

    pub fn read_position(&mut self) -> Result<Position> {
        Ok(Position {
            x: self.read_u8()?,
            y: self.read_u8()?,
            z: self.read_u8()?,
        })
    }

    /// Discard `n` bytes without looking at them
    pub fn skip(&mut self, n: usize) -> Result<()> {
        let offset = self.pos;
        let copied = io::copy(&mut (&mut *self.source).take(n as u64), &mut io::sink())
            .map_err(|e| io_error(e, offset, n))?;
        self.pos += copied;
        if (copied as usize) < n {
            return Err(Error::Truncated { offset, needed: n });
        }
        Ok(())
    }

    /// Discard `n` padding bytes, reporting any that are not zero
    pub fn skip_zero(&mut self, n: usize) -> Result<()> {
        let offset = self.pos;
        let bytes = self.read_bytes(n)?;
        if let Some(i) = bytes.iter().position(|b| *b != 0) {
            self.report(
                Diagnostic::new(DiagnosticKind::NonZeroPadding, offset + i as u64, format!("{n}-byte padding"))
                    .with_value(bytes[i] as i64),
            );
        }
        Ok(())
    }

    /// Consume everything left in the source
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        let mut rest = Vec::new();
        let got = self.source.read_to_end(&mut rest)?;
        self.pos += got as u64;
        Ok(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::strings::Codepage;
    use crate::codec::types::{Format, Resource};
    use crate::diagnostics::CollectSink;

    fn with_reader<T>(data: &[u8], f: impl FnOnce(&mut BinaryReader) -> T) -> (T, CollectSink) {
        let sink = CollectSink::new();
        let mut source = data;
        let result = {
            let mut reader = BinaryReader::new(&mut source, &sink, &Codepage::WINDOWS_1252);
            f(&mut reader)
        };
        (result, sink)
    }

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let (pos, _) = with_reader(&data, |reader| {
            assert_eq!(reader.read_u8().unwrap(), 0x01);
            assert_eq!(reader.read_u16().unwrap(), 0x0302);
            assert_eq!(reader.read_u32().unwrap(), 0x07060504);
            reader.position()
        });
        assert_eq!(pos, 7);
    }

    #[test]
    fn test_truncated_read_is_fatal() {
        let (result, _) = with_reader(&[0x01, 0x02], |reader| {
            reader.read_u8().unwrap();
            reader.read_u32()
        });
        match result {
            Err(Error::Truncated { offset, needed }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_range_violation_is_soft() {
        let (value, sink) = with_reader(&[9], |reader| reader.read_u8_in(0, 4, "difficulty").unwrap());
        assert_eq!(value, 9);
        let diags = sink.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::OutOfRange);
        assert_eq!(diags[0].expected, Some((0, 4)));
    }

    #[test]
    fn test_read_bool() {
        let (values, sink) = with_reader(&[0, 1, 2], |reader| {
            (reader.read_bool().unwrap(), reader.read_bool().unwrap(), reader.read_bool().unwrap())
        });
        assert_eq!(values, (false, true, true));
        assert_eq!(sink.count(DiagnosticKind::BadBool), 1);
    }

    #[test]
    fn test_read_string() {
        let data = [0x05, 0x00, 0x00, 0x00, b'h', b'e', b'l', b'l', b'o'];
        let (s, _) = with_reader(&data, |reader| reader.read_string().unwrap());
        assert_eq!(s, "hello");
    }

    #[test]
    fn test_negative_string_length() {
        let data = (-1i32).to_le_bytes();
        let (result, _) = with_reader(&data, |reader| reader.read_string());
        assert!(matches!(result, Err(Error::NegativeLength { len: -1, offset: 0 })));
    }

    #[test]
    fn test_long_string_is_soft() {
        let mut data = 6i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"abcdef");
        let sink = CollectSink::new();
        let mut source = data.as_slice();
        let mut reader =
            BinaryReader::new(&mut source, &sink, &Codepage::WINDOWS_1252).with_max_string_len(4);
        assert_eq!(reader.read_string().unwrap(), "abcdef");
        assert_eq!(sink.count(DiagnosticKind::LongString), 1);
    }

    #[test]
    fn test_truncated_string() {
        let mut data = 10i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"abc");
        let (result, _) = with_reader(&data, |reader| reader.read_string());
        assert!(matches!(result, Err(Error::Truncated { offset: 4, needed: 10 })));
    }

    #[test]
    fn test_read_bits_file_order() {
        let (bits, _) = with_reader(&[0b0000_0101, 0b0000_0010], |reader| reader.read_bits(10).unwrap());
        assert_eq!(
            bits,
            vec![true, false, true, false, false, false, false, false, false, true]
        );
    }

    #[test]
    fn test_allow_list_polarity() {
        let (all, _) = with_reader(&[0; 9], |reader| {
            reader.read_allow_list(70, Polarity::SetMeansForbidden).unwrap()
        });
        assert_eq!(all, (0..70).collect::<Vec<u32>>());

        let (none, _) = with_reader(&[0xFF; 9], |reader| {
            reader.read_allow_list(70, Polarity::SetMeansForbidden).unwrap()
        });
        assert!(none.is_empty());

        let (some, _) = with_reader(&[0b0001_0010], |reader| {
            reader.read_allow_list(8, Polarity::SetMeansAllowed).unwrap()
        });
        assert_eq!(some, vec![1, 4]);
    }

    #[test]
    fn test_read_enum_unknown_is_soft() {
        let (tags, sink) = with_reader(&[3, 42], |reader| {
            (
                reader.read_enum::<Resource>(1).unwrap(),
                reader.read_enum::<Resource>(1).unwrap(),
            )
        });
        assert_eq!(tags.0, Tagged::Known(Resource::Sulfur));
        assert_eq!(tags.1, Tagged::Unknown(42));
        assert_eq!(sink.count(DiagnosticKind::UnknownTag), 1);
    }

    #[test]
    fn test_optional_id_sentinels() {
        let (ids, _) = with_reader(&[0xFF, 0x07], |reader| {
            (
                reader.read_optional_id(Format::RoE.id_width()).unwrap(),
                reader.read_optional_id(Format::RoE.id_width()).unwrap(),
            )
        });
        assert_eq!(ids, (None, Some(7)));

        let (ids, _) = with_reader(&[0xFF, 0xFF, 0xFF, 0x00], |reader| {
            (
                reader.read_optional_id(Format::SoD.id_width()).unwrap(),
                reader.read_optional_id(Format::SoD.id_width()).unwrap(),
            )
        });
        assert_eq!(ids, (None, Some(0xFF)));
    }

    #[test]
    fn test_skip_zero_reports_padding() {
        let (pos, sink) = with_reader(&[0, 0, 5, 0], |reader| {
            reader.skip_zero(4).unwrap();
            reader.position()
        });
        assert_eq!(pos, 4);
        let diags = sink.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::NonZeroPadding);
        assert_eq!(diags[0].offset, 2);
    }

    #[test]
    fn test_skip_past_end() {
        let (result, _) = with_reader(&[0, 0], |reader| reader.skip(3));
        assert!(matches!(result, Err(Error::Truncated { offset: 0, needed: 3 })));
    }
}
