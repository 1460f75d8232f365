use super::types::{Format, Position};

/// Little-endian byte builder for synthetic map streams in tests
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn write_zeros(&mut self, n: usize) -> &mut Self {
        self.data.resize(self.data.len() + n, 0);
        self
    }

    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.data.push(v);
        self
    }

    pub fn write_i8(&mut self, v: i8) -> &mut Self {
        self.write_u8(v as u8)
    }

    pub fn write_bool(&mut self, v: bool) -> &mut Self {
        self.write_u8(u8::from(v))
    }

    pub fn write_u16_le(&mut self, v: u16) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_u32_le(&mut self, v: u32) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_i32_le(&mut self, v: i32) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    /// String with a 4-byte signed length prefix
    pub fn write_string(&mut self, s: &str) -> &mut Self {
        self.write_i32_le(s.len() as i32);
        self.write_bytes(s.as_bytes())
    }

    /// Identifier sized for `format`: one byte in RoE, two afterwards
    pub fn write_id(&mut self, format: Format, v: u32) -> &mut Self {
        if format.at_least_ab() {
            self.write_u16_le(v as u16)
        } else {
            self.write_u8(v as u8)
        }
    }

    /// The "absent" sentinel for a version-sized identifier
    pub fn write_no_id(&mut self, format: Format) -> &mut Self {
        self.write_id(format, format.id_width().sentinel())
    }

    pub fn write_position(&mut self, pos: Position) -> &mut Self {
        self.write_u8(pos.x).write_u8(pos.y).write_u8(pos.z)
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reader::BinaryReader;
    use crate::codec::strings::Codepage;
    use crate::diagnostics::NullSink;

    #[test]
    fn test_written_string_reads_back() {
        let mut writer = BinaryWriter::new();
        writer.write_string("Arrogance").write_u16_le(0x1234);
        let data = writer.into_vec();
        assert_eq!(&data[..4], &[9, 0, 0, 0]);

        let mut source = data.as_slice();
        let mut reader = BinaryReader::new(&mut source, &NullSink, &Codepage::WINDOWS_1252);
        assert_eq!(reader.read_string().unwrap(), "Arrogance");
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
    }

    #[test]
    fn test_id_width_follows_format() {
        let mut writer = BinaryWriter::new();
        writer.write_no_id(Format::RoE).write_no_id(Format::SoD);
        assert_eq!(writer.into_vec(), vec![0xFF, 0xFF, 0xFF]);
    }
}
