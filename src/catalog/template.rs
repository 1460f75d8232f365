use bitflags::bitflags;
use serde::Serialize;

use crate::codec::{BinaryReader, WireEnum};
use crate::error::{Error, Result};
use crate::objects::ObjectClass;

bitflags! {
    /// Terrains an object may be placed on
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct TerrainMask: u16 {
        const DIRT = 1 << 0;
        const SAND = 1 << 1;
        const GRASS = 1 << 2;
        const SNOW = 1 << 3;
        const SWAMP = 1 << 4;
        const ROUGH = 1 << 5;
        const SUBTERRANEAN = 1 << 6;
        const LAVA = 1 << 7;
        const WATER = 1 << 8;
        const ROCK = 1 << 9;
        const HIGHLANDS = 1 << 10;
        const WASTELAND = 1 << 11;
        const _ = !0;
    }
}

bitflags! {
    /// Map editor palette groups the object is listed under
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct EditorCategory: u16 {
        const TERRAIN = 1 << 0;
        const TOWNS = 1 << 1;
        const MONSTERS = 1 << 2;
        const HEROES = 1 << 3;
        const ARTIFACTS = 1 << 4;
        const TREASURE = 1 << 5;
        const _ = !0;
    }
}

/// 8 columns × 6 rows occupancy grid, stored as the six raw bytes.
/// The wire counts from the bottom-right corner: byte 0 is the bottom row
/// and bit 0 the rightmost column. Rows and columns below are counted from
/// the top-left, so row `r`, column `c` is bit `7 - c` of byte `5 - r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct OccupancyMask(pub [u8; 6]);

impl OccupancyMask {
    pub const ROWS: usize = 6;
    pub const COLUMNS: usize = 8;

    /// Cells outside the grid are never set
    pub fn is_set(&self, row: usize, column: usize) -> bool {
        if row >= Self::ROWS || column >= Self::COLUMNS {
            return false;
        }
        (self.0[Self::ROWS - 1 - row] >> (7 - column)) & 1 == 1
    }

    /// Parse the 48-character `0`/`1` form used by template definition
    /// files, written row by row from the top-left corner
    pub fn from_text(text: &str) -> Option<Self> {
        if text.len() != Self::ROWS * Self::COLUMNS {
            return None;
        }
        let mut bytes = [0u8; 6];
        for (i, c) in text.chars().enumerate() {
            let bit = match c {
                '0' => 0,
                '1' => 1,
                _ => return None,
            };
            bytes[Self::ROWS - 1 - i / 8] |= bit << (7 - i % 8);
        }
        Some(Self(bytes))
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        let mut bytes = [0u8; 6];
        for b in bytes.iter_mut() {
            *b = reader.read_u8()?;
        }
        Ok(Self(bytes))
    }
}

/// One reusable object definition referenced by object instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectTemplate {
    pub animation_file: String,
    pub block_mask: OccupancyMask,
    pub visit_mask: OccupancyMask,
    pub terrain: TerrainMask,
    pub category: EditorCategory,
    pub id: u32,
    pub sub_id: u32,
    pub kind: u8,
    pub background: bool,
}

impl ObjectTemplate {
    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let animation_file = reader.read_string()?;
        let block_mask = OccupancyMask::read(reader)?;
        let visit_mask = OccupancyMask::read(reader)?;
        let terrain = TerrainMask::from_bits_retain(reader.read_u16()?);
        let category = EditorCategory::from_bits_retain(reader.read_u16()?);
        let id = reader.read_u32()?;
        let sub_id = reader.read_u32()?;
        let kind = reader.read_u8()?;
        let background = reader.read_bool()?;
        reader.skip_zero(16)?;
        Ok(Self {
            animation_file,
            block_mask,
            visit_mask,
            terrain,
            category,
            id,
            sub_id,
            kind,
            background,
        })
    }

    pub fn class(&self) -> Option<ObjectClass> {
        ObjectClass::from_raw(self.id)
    }

    /// Catalog lookup key: the animation file name, lowercased
    pub fn key(&self) -> String {
        self.animation_file.to_ascii_lowercase()
    }

    /// Same template: animation file compared case-insensitively, every
    /// other field exactly
    pub fn matches(&self, other: &ObjectTemplate) -> bool {
        self.animation_file.eq_ignore_ascii_case(&other.animation_file)
            && self.block_mask == other.block_mask
            && self.visit_mask == other.visit_mask
            && self.terrain == other.terrain
            && self.category == other.category
            && self.id == other.id
            && self.sub_id == other.sub_id
            && self.kind == other.kind
            && self.background == other.background
    }

    /// Parse one line of a template definition file:
    /// `file block visit terrain category id subid type background`
    pub fn parse_line(line: &str) -> std::result::Result<Self, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 9 {
            return Err(format!("expected 9 fields, got {}", fields.len()));
        }
        let mask = |s: &str, what: &str| {
            OccupancyMask::from_text(s).ok_or_else(|| format!("invalid {what} mask {s:?}"))
        };
        let flags = |s: &str, what: &str| {
            u16::from_str_radix(s, 2).map_err(|_| format!("invalid {what} flags {s:?}"))
        };
        let number = |s: &str, what: &str| {
            s.parse::<u32>().map_err(|_| format!("invalid {what} {s:?}"))
        };
        let background = match fields[8] {
            "0" => false,
            "1" => true,
            other => return Err(format!("invalid background flag {other:?}")),
        };
        let kind = number(fields[7], "type")?;
        Ok(Self {
            animation_file: fields[0].to_string(),
            block_mask: mask(fields[1], "block")?,
            visit_mask: mask(fields[2], "visit")?,
            terrain: TerrainMask::from_bits_retain(flags(fields[3], "terrain")?),
            category: EditorCategory::from_bits_retain(flags(fields[4], "category")?),
            id: number(fields[5], "id")?,
            sub_id: number(fields[6], "subid")?,
            kind: u8::try_from(kind).map_err(|_| format!("type {kind} out of range"))?,
            background,
        })
    }
}

/// Parse a template definition file. Blank lines and `//` comments are
/// skipped. Files exported by the original editor start with a bare
/// template count, which is skipped as well.
pub fn parse_template_definitions(text: &str, origin: &str) -> Result<Vec<ObjectTemplate>> {
    let mut templates = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if index == 0 && line.parse::<u32>().is_ok() {
            continue;
        }
        let template = ObjectTemplate::parse_line(line).map_err(|reason| Error::Table {
            origin: origin.to_string(),
            line: index + 1,
            reason,
        })?;
        templates.push(template);
    }
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "AVWmrnd0.def 111111111111111111111111111111111111111111111101 000000000000000000000000000000000000000000000001 111111111 100000000 54 0 1 0";

    #[test]
    fn test_parse_line() {
        let t = ObjectTemplate::parse_line(LINE).unwrap();
        assert_eq!(t.animation_file, "AVWmrnd0.def");
        assert_eq!(t.id, 54);
        assert_eq!(t.sub_id, 0);
        assert_eq!(t.kind, 1);
        assert!(!t.background);
        assert_eq!(t.terrain.bits(), 0b1_1111_1111);
        assert_eq!(t.category.bits(), 0b1_0000_0000);
        assert!(!t.block_mask.is_set(5, 6));
        assert!(t.block_mask.is_set(5, 7));
        assert!(t.visit_mask.is_set(5, 7));
        assert_eq!(t.class(), Some(ObjectClass::Monster));
    }

    #[test]
    fn test_occupancy_text_matches_wire_order() {
        // One blocked, visitable tile in the bottom-right corner
        let block = OccupancyMask::from_text(
            "111111111111111111111111111111111111111111111110",
        )
        .unwrap();
        let visit = OccupancyMask::from_text(
            "000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(block, OccupancyMask([0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]));
        assert_eq!(visit, OccupancyMask([0x01, 0, 0, 0, 0, 0]));
        assert!(visit.is_set(5, 7));
        assert!(!visit.is_set(0, 7));
        assert!(!block.is_set(5, 7));
        assert!(block.is_set(0, 0));

        let top_left = OccupancyMask::from_text(
            "100000000000000000000000000000000000000000000000",
        )
        .unwrap();
        assert_eq!(top_left.0, [0, 0, 0, 0, 0, 0x80]);
        assert!(top_left.is_set(0, 0));
        assert!(OccupancyMask::from_text("01").is_none());
    }

    #[test]
    fn test_occupancy_outside_grid() {
        let mask = OccupancyMask([0xFF; 6]);
        assert!(mask.is_set(5, 7));
        assert!(!mask.is_set(6, 0));
        assert!(!mask.is_set(0, 8));
    }

    #[test]
    fn test_text_template_matches_wire_template() {
        let mut w = crate::codec::BinaryWriter::new();
        w.write_string("AVWmrnd0.def");
        w.write_bytes(&[0xFD, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        w.write_bytes(&[0x01, 0, 0, 0, 0, 0]);
        w.write_u16_le(0x1FF).write_u16_le(0x100);
        w.write_u32_le(54).write_u32_le(0).write_u8(1).write_u8(0);
        w.write_zeros(16);
        let bytes = w.into_vec();

        let sink = crate::diagnostics::NullSink;
        let strings = crate::codec::Codepage::WINDOWS_1252;
        let mut source: &[u8] = &bytes;
        let mut reader = BinaryReader::new(&mut source, &sink, &strings);
        let wire = ObjectTemplate::read(&mut reader).unwrap();
        assert_eq!(wire, ObjectTemplate::parse_line(LINE).unwrap());
        assert!(wire.visit_mask.is_set(5, 7));
        assert!(!wire.block_mask.is_set(5, 6));
    }

    #[test]
    fn test_matches_ignores_file_case() {
        let a = ObjectTemplate::parse_line(LINE).unwrap();
        let mut b = a.clone();
        b.animation_file = "avwmrnd0.DEF".to_string();
        assert!(a.matches(&b));
        b.sub_id = 1;
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_parse_definitions() {
        let text = format!("2\n{LINE}\n\n// comment\n{}\n", LINE.replace(" 54 0 ", " 54 1 "));
        let templates = parse_template_definitions(&text, "objects.txt").unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].sub_id, 1);

        let err = parse_template_definitions("a b c", "objects.txt").unwrap_err();
        assert!(matches!(err, Error::Table { line: 1, .. }));
    }
}
