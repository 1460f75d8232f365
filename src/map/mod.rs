//! Whole-map decoding.
//!
//! A map is read in one forward pass. The format tag comes first and
//! decides the width and presence of nearly everything after it, so the
//! decoder threads a [`Context`] carrying the version and a resolver bound
//! to that version through every section reader.

pub mod events;
pub mod header;
pub mod heroes;
pub mod terrain;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{Catalog, Catalogs, Identifier, ObjectTemplate, Resolver};
use crate::codec::{
    open_container, BinaryReader, Codepage, Format, IdWidth, Polarity, StringDecoder, Version,
    WireEnum, DEFAULT_MAX_STRING_LEN,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::{Error, Result};
use crate::objects::common::{skill_count, SPELL_COUNT};
use crate::objects::{MapObject, ObjectPayload};

pub use events::{Rumor, TimedEvent};
pub use header::{
    AiTactic, Difficulty, HotaInfo, LeadHero, LossCondition, MainTown, MapInfo, MapOptions,
    NamedHero, PlayerSetup, PlayerSlot, Teams, VictoryCondition, VictoryGoal,
};
pub use heroes::{DisposedHero, HeroCustomization, HeroEntry, HeroRoster};
pub use terrain::{MirrorFlags, RiverType, RoadType, Terrain, TerrainType, Tile, TileGrid};

/// Objects may hang over the right and bottom edges by this many tiles
const EDGE_OVERHANG: u32 = 8;

/// Per-decode state shared by every section reader
pub(crate) struct Context<'c> {
    pub version: Version,
    pub resolver: Resolver<'c>,
}

impl<'c> Context<'c> {
    pub(crate) fn new(version: Version, catalogs: &'c Catalogs) -> Self {
        Self {
            version,
            resolver: catalogs.bind(version.format),
        }
    }

    pub(crate) fn resolve(
        &self,
        reader: &BinaryReader,
        catalog: Catalog,
        raw: u32,
        offset: u64,
    ) -> Identifier {
        self.resolver.resolve(catalog, raw, reader.sink(), offset)
    }

    /// Version-width identifier; the sentinel reads as `None`
    pub(crate) fn read_id(&self, reader: &mut BinaryReader, catalog: Catalog) -> Result<Option<Identifier>> {
        self.read_id_width(reader, catalog, self.version.id_width())
    }

    /// One-byte identifier regardless of version; 0xFF reads as `None`
    pub(crate) fn read_id_u8(&self, reader: &mut BinaryReader, catalog: Catalog) -> Result<Option<Identifier>> {
        self.read_id_width(reader, catalog, IdWidth::Byte)
    }

    fn read_id_width(
        &self,
        reader: &mut BinaryReader,
        catalog: Catalog,
        width: IdWidth,
    ) -> Result<Option<Identifier>> {
        let offset = reader.position();
        let raw = reader.read_optional_id(width)?;
        Ok(raw.map(|raw| self.resolve(reader, catalog, raw, offset)))
    }

    /// Allow-list bitmask over a catalog's ids, resolved
    pub(crate) fn read_allowed(
        &self,
        reader: &mut BinaryReader,
        bits: usize,
        polarity: Polarity,
        catalog: Catalog,
    ) -> Result<Vec<Identifier>> {
        let offset = reader.position();
        let allowed = reader.read_allow_list(bits, polarity)?;
        Ok(allowed
            .into_iter()
            .map(|raw| self.resolve(reader, catalog, raw, offset))
            .collect())
    }
}

/// Knobs for a single decode
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Strings longer than this are reported, but still read
    pub max_string_len: usize,
    /// Report non-zero bytes after the last section
    pub check_trailing: bool,
    pub strings: Arc<dyn StringDecoder + Send + Sync>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
            check_trailing: true,
            strings: Arc::new(Codepage::WINDOWS_1252),
        }
    }
}

/// A fully decoded map. Built once per decode and never changed after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Map {
    pub info: MapInfo,
    /// Always eight slots, in colour order
    pub players: Vec<PlayerSlot>,
    pub victory: VictoryCondition,
    pub loss: LossCondition,
    pub teams: Option<Teams>,
    pub heroes: HeroRoster,
    pub options: MapOptions,
    /// AB+
    pub allowed_artifacts: Option<Vec<Identifier>>,
    /// SoD+
    pub allowed_spells: Option<Vec<Identifier>>,
    /// SoD+
    pub allowed_skills: Option<Vec<u32>>,
    pub rumors: Vec<Rumor>,
    pub terrain: Terrain,
    pub templates: Vec<ObjectTemplate>,
    pub objects: Vec<MapObject>,
    pub events: Vec<TimedEvent>,
}

impl Map {
    pub fn format(&self) -> Format {
        self.info.version.format
    }

    /// Template of a placed object
    pub fn template_of(&self, object: &MapObject) -> Option<&ObjectTemplate> {
        self.templates.get(object.template as usize)
    }
}

/// Decode a raw (already decompressed) map stream
pub fn decode_map(
    source: &mut dyn Read,
    catalogs: &Catalogs,
    options: &DecodeOptions,
    sink: &dyn DiagnosticSink,
) -> Result<Map> {
    let strings: &dyn StringDecoder = options.strings.as_ref();
    let mut reader = BinaryReader::new(source, sink, strings).with_max_string_len(options.max_string_len);

    let raw = reader.read_u32()?;
    let format = Format::from_raw(raw).ok_or_else(|| Error::Malformed {
        offset: 0,
        reason: format!("unknown format tag {raw:#x}"),
    })?;
    let span = tracing::debug_span!("decode_map", format = format.short_name());
    let _enter = span.enter();

    let info = MapInfo::read(&mut reader, format)?;
    tracing::debug!(
        hota_revision = ?info.version.hota_revision,
        size = info.size,
        two_levels = info.two_levels,
        name = %info.name,
        "map header"
    );
    let ctx = Context::new(info.version, catalogs);

    let players = PlayerSlot::read_all(&mut reader, &ctx)?;
    let victory = VictoryCondition::read(&mut reader, &ctx)?;
    let loss = LossCondition::read(&mut reader)?;
    let teams = Teams::read(&mut reader)?;
    let mut heroes = HeroRoster::read_availability(&mut reader, &ctx)?;
    let map_options = MapOptions::read(&mut reader, info.version)?;
    let allowed_artifacts = read_allowed_artifacts(&mut reader, &ctx)?;
    let (allowed_spells, allowed_skills) = if info.version.at_least_sod() {
        let spells = ctx.read_allowed(&mut reader, SPELL_COUNT, Polarity::SetMeansForbidden, Catalog::Spell)?;
        let skills = reader.read_allow_list(skill_count(&ctx), Polarity::SetMeansForbidden)?;
        (Some(spells), Some(skills))
    } else {
        (None, None)
    };
    let rumors = Rumor::read_list(&mut reader)?;
    heroes.read_customizations(&mut reader, &ctx)?;

    let terrain = Terrain::read(&mut reader, info.size, info.two_levels)?;
    let templates = read_templates(&mut reader)?;
    let objects = read_objects(&mut reader, &ctx, &info, &templates)?;
    let events = TimedEvent::read_list(&mut reader, &ctx)?;
    tracing::debug!(
        templates = templates.len(),
        objects = objects.len(),
        events = events.len(),
        "map body"
    );

    if options.check_trailing {
        check_trailing(&mut reader)?;
    }

    Ok(Map {
        info,
        players,
        victory,
        loss,
        teams,
        heroes,
        options: map_options,
        allowed_artifacts,
        allowed_spells,
        allowed_skills,
        rumors,
        terrain,
        templates,
        objects,
        events,
    })
}

/// Decode a map held in memory, gzip-wrapped or raw
pub fn decode_bytes(
    data: &[u8],
    catalogs: &Catalogs,
    options: &DecodeOptions,
    sink: &dyn DiagnosticSink,
) -> Result<Map> {
    let mut source = open_container(data)?;
    decode_map(&mut source, catalogs, options, sink)
}

/// Decode a map file, gzip-wrapped or raw
pub fn decode_file(
    path: impl AsRef<Path>,
    catalogs: &Catalogs,
    options: &DecodeOptions,
    sink: &dyn DiagnosticSink,
) -> Result<Map> {
    let file = File::open(path.as_ref())?;
    let mut source = open_container(file)?;
    decode_map(&mut source, catalogs, options, sink)
}

fn read_allowed_artifacts(reader: &mut BinaryReader, ctx: &Context) -> Result<Option<Vec<Identifier>>> {
    let bits = match ctx.version.format {
        Format::RoE => return Ok(None),
        Format::AB => 129,
        Format::SoD | Format::WoG => 144,
        Format::HotA => {
            let mut count = reader.read_u32()?;
            // A count of 16 is followed by five unexplained bytes and then
            // the real count
            if count == 16 {
                reader.skip(5)?;
                count = reader.read_u32()?;
            }
            count as usize
        }
    };
    let allowed = ctx.read_allowed(reader, bits, Polarity::SetMeansForbidden, Catalog::Artifact)?;
    Ok(Some(allowed))
}

fn read_templates(reader: &mut BinaryReader) -> Result<Vec<ObjectTemplate>> {
    let count = reader.read_u32()?;
    let mut templates = Vec::with_capacity(count.min(4096) as usize);
    for _ in 0..count {
        templates.push(ObjectTemplate::read(reader)?);
    }
    Ok(templates)
}

fn read_objects(
    reader: &mut BinaryReader,
    ctx: &Context,
    info: &MapInfo,
    templates: &[ObjectTemplate],
) -> Result<Vec<MapObject>> {
    let count = reader.read_u32()?;
    let mut objects = Vec::with_capacity(count.min(16384) as usize);
    for _ in 0..count {
        let offset = reader.position();
        let position = reader.read_position()?;
        let limit = info.size + EDGE_OVERHANG;
        if u32::from(position.x) >= limit
            || u32::from(position.y) >= limit
            || position.z >= info.levels()
        {
            reader.report(Diagnostic::new(
                DiagnosticKind::PositionOutOfBounds,
                offset,
                format!("object at ({}, {}, {})", position.x, position.y, position.z),
            ));
        }

        let index_offset = reader.position();
        let index = reader.read_u32()?;
        let template = templates.get(index as usize).ok_or(Error::TemplateIndex {
            offset: index_offset,
            index,
            count: templates.len(),
        })?;
        reader.skip_zero(5)?;

        let payload = ObjectPayload::decode(reader, ctx, template)?;
        tracing::trace!(
            x = position.x,
            y = position.y,
            z = position.z,
            id = template.id,
            sub_id = template.sub_id,
            "object"
        );
        objects.push(MapObject { position, template: index, payload });
    }
    Ok(objects)
}

fn check_trailing(reader: &mut BinaryReader) -> Result<()> {
    let start = reader.position();
    let rest = reader.read_remaining()?;
    if let Some(i) = rest.iter().position(|b| *b != 0) {
        reader.report(
            Diagnostic::new(
                DiagnosticKind::TrailingData,
                start + i as u64,
                format!("{} bytes after the last section", rest.len()),
            )
            .with_value(i64::from(rest[i])),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BinaryWriter, Position, Tagged};
    use crate::diagnostics::CollectSink;
    use crate::error::FailureClass;
    use crate::objects::testing::decode;
    use crate::objects::{GrailObject, ObjectClass, SeerHut};

    struct TemplateIds {
        id: u32,
        sub_id: u32,
    }

    /// Write every section up to and including the rumors, with two
    /// active players and all lists empty
    fn write_preamble(w: &mut BinaryWriter, version: Version, size: u32, two_levels: bool) {
        let format = version.format;
        w.write_u32_le(format.raw());
        if let Some(revision) = version.hota_revision {
            w.write_u32_le(revision);
            if revision >= 1 {
                w.write_bool(false).write_bool(false);
            }
            if revision >= 2 {
                w.write_u32_le(12);
            }
        }
        w.write_bool(true).write_u32_le(size).write_bool(two_levels);
        w.write_string("Test").write_string("Synthetic map").write_u8(1);
        if format.at_least_ab() {
            w.write_u8(0);
        }

        for slot in 0..8 {
            if slot < 2 {
                w.write_bool(true).write_bool(true).write_u8(0);
                if format.at_least_sod() {
                    w.write_bool(false);
                }
                if format.at_least_ab() {
                    w.write_bytes(&[0xFF, 0x03]);
                } else {
                    w.write_u8(0xFF);
                }
                w.write_bool(false).write_bool(false).write_bool(false).write_u8(0xFF);
                if format.at_least_ab() {
                    w.write_u8(0).write_u32_le(0);
                }
            } else {
                let unused = if format.at_least_sod() {
                    13
                } else if format.at_least_ab() {
                    12
                } else {
                    6
                };
                w.write_bool(false).write_bool(false).write_zeros(unused);
            }
        }

        w.write_u8(0xFF).write_u8(0xFF).write_u8(0);

        match format {
            Format::RoE => {
                w.write_zeros(16);
            }
            Format::HotA => {
                w.write_u32_le(179).write_zeros(23);
            }
            _ => {
                w.write_zeros(20);
            }
        }
        if format.at_least_ab() {
            w.write_u32_le(0);
        }
        if format.at_least_sod() {
            w.write_u8(0);
        }

        w.write_zeros(31);
        if format == Format::HotA {
            w.write_bool(false).write_zeros(3);
        }
        if version.hota_at_least(1) {
            w.write_zeros(6);
        }
        if version.hota_at_least(3) {
            w.write_u32_le(u32::MAX);
        }

        match format {
            Format::RoE => {}
            Format::AB => {
                w.write_zeros(17);
            }
            Format::SoD | Format::WoG => {
                w.write_zeros(18);
            }
            Format::HotA => {
                w.write_u32_le(165).write_zeros(21);
            }
        }
        if format.at_least_sod() {
            w.write_zeros(9).write_zeros(4);
        }

        w.write_u32_le(0);

        if format.at_least_sod() {
            if format == Format::HotA {
                w.write_u32_le(0);
            } else {
                w.write_zeros(156);
            }
        }

        let levels = if two_levels { 2 } else { 1 };
        w.write_zeros(levels * size as usize * size as usize * 7);
    }

    fn write_template(w: &mut BinaryWriter, ids: &TemplateIds) {
        w.write_string("AVXtest.def").write_zeros(12);
        w.write_u16_le(0x1FF).write_u16_le(0);
        w.write_u32_le(ids.id).write_u32_le(ids.sub_id).write_u8(0).write_u8(0);
        w.write_zeros(16);
    }

    fn minimal_map(version: Version, size: u32) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        write_preamble(&mut w, version, size, false);
        w.write_u32_le(0).write_u32_le(0).write_u32_le(0);
        w.into_vec()
    }

    fn versions() -> [Version; 7] {
        [
            Version::new(Format::RoE),
            Version::new(Format::AB),
            Version::new(Format::SoD),
            Version::new(Format::WoG),
            Version::hota(0),
            Version::hota(1),
            Version::hota(3),
        ]
    }

    fn decode_with(data: &[u8], sink: &CollectSink) -> Result<Map> {
        decode_bytes(data, &Catalogs::new(), &DecodeOptions::default(), sink)
    }

    #[test]
    fn test_minimal_map_each_format() {
        for version in versions() {
            let data = minimal_map(version, 36);
            let sink = CollectSink::new();
            let map = decode_with(&data, &sink).unwrap();
            let format = version.format;
            assert_eq!(map.format(), format);
            assert_eq!(map.info.version, version);
            assert!(sink.is_empty(), "{version:?}: {:?}", sink.snapshot());
            assert_eq!(map.players.len(), 8);
            assert_eq!(map.info.level_limit.is_some(), format.at_least_ab());
            assert_eq!(map.allowed_artifacts.is_some(), format.at_least_ab());
            assert_eq!(map.allowed_spells.is_some(), format.at_least_sod());
            let setup = map.players[0].setup.as_ref().unwrap();
            assert_eq!(setup.customized_alignment.is_some(), format.at_least_sod());
            let factions = if format.at_least_ab() { 10 } else { 8 };
            assert_eq!(setup.allowed_factions.len(), factions, "{version:?}");
        }
    }

    #[test]
    fn test_roe_size_18_end_to_end() {
        let data = minimal_map(Version::new(Format::RoE), 18);
        let sink = CollectSink::new();
        let map = decode_with(&data, &sink).unwrap();
        assert!(map.objects.is_empty());
        assert!(map.rumors.is_empty());
        assert!(map.templates.is_empty());
        assert!(map.events.is_empty());
        assert_eq!(map.victory, VictoryCondition::Standard);
        assert_eq!(map.loss, LossCondition::Standard);
        assert_eq!(map.players.iter().filter(|p| p.is_active()).count(), 2);
        assert_eq!(map.terrain.ground.size, 18);
        assert_eq!(map.terrain.ground.tiles.len(), 18 * 18);
        assert!(map.terrain.ground.tiles.iter().all(|t| *t == Tile::default()));
        assert!(map.terrain.underground.is_none());
        assert_eq!(map.heroes.allowed().count(), 0);
    }

    #[test]
    fn test_gzip_wrapped_map() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let raw = minimal_map(Version::new(Format::SoD), 36);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&raw).unwrap();
        let compressed = encoder.finish().unwrap();
        let map = decode_bytes(&compressed, &Catalogs::new(), &DecodeOptions::default(), &CollectSink::new()).unwrap();
        assert_eq!(map.format(), Format::SoD);
    }

    #[test]
    fn test_unknown_format_tag() {
        let err = decode_with(&[0x99, 0, 0, 0], &CollectSink::new()).unwrap_err();
        assert!(matches!(err, Error::Malformed { offset: 0, .. }));
        assert_eq!(err.class(), FailureClass::Stream);
    }

    #[test]
    fn test_truncated_map_is_hard() {
        let mut data = minimal_map(Version::new(Format::AB), 36);
        data.truncate(data.len() - 5);
        let err = decode_with(&data, &CollectSink::new()).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
    }

    fn map_with_objects(templates: &[TemplateIds], objects: &[(Position, u32, Vec<u8>)]) -> Vec<u8> {
        let version = Version::new(Format::SoD);
        let mut w = BinaryWriter::new();
        write_preamble(&mut w, version, 36, true);
        w.write_u32_le(templates.len() as u32);
        for ids in templates {
            write_template(&mut w, ids);
        }
        w.write_u32_le(objects.len() as u32);
        for (position, index, payload) in objects {
            w.write_position(*position).write_u32_le(*index).write_zeros(5).write_bytes(payload);
        }
        w.write_u32_le(0);
        w.into_vec()
    }

    #[test]
    fn test_template_index_bounds() {
        let templates = [TemplateIds { id: 8, sub_id: 0 }, TemplateIds { id: 36, sub_id: 0 }];
        let radius = 3i32.to_le_bytes();

        let data = map_with_objects(&templates, &[(Position::new(1, 1, 0), 1, radius.to_vec())]);
        let sink = CollectSink::new();
        let map = decode_with(&data, &sink).unwrap();
        assert_eq!(map.objects.len(), 1);
        assert_eq!(map.objects[0].payload, ObjectPayload::Grail(GrailObject { radius: Some(3) }));
        assert_eq!(map.template_of(&map.objects[0]).unwrap().class(), Some(ObjectClass::Grail));

        let data = map_with_objects(&templates, &[(Position::new(1, 1, 0), 2, vec![])]);
        let err = decode_with(&data, &CollectSink::new()).unwrap_err();
        assert!(matches!(err, Error::TemplateIndex { index: 2, count: 2, .. }));
        assert_eq!(err.class(), FailureClass::Reference);
    }

    #[test]
    fn test_position_overhang() {
        let templates = [TemplateIds { id: 8, sub_id: 0 }];
        let data = map_with_objects(
            &templates,
            &[
                (Position::new(43, 43, 1), 0, vec![]),
                (Position::new(44, 0, 0), 0, vec![]),
                (Position::new(0, 0, 2), 0, vec![]),
            ],
        );
        let sink = CollectSink::new();
        let map = decode_with(&data, &sink).unwrap();
        assert_eq!(map.objects.len(), 3);
        assert_eq!(sink.count(DiagnosticKind::PositionOutOfBounds), 2);
    }

    #[test]
    fn test_seer_hut_without_quest_in_map() {
        let templates = [TemplateIds { id: 83, sub_id: 0 }];
        let data = map_with_objects(&templates, &[(Position::new(5, 5, 0), 0, vec![0; 4])]);
        let sink = CollectSink::new();
        let map = decode_with(&data, &sink).unwrap();
        let ObjectPayload::SeerHut(SeerHut { tasks }) = &map.objects[0].payload else {
            panic!("expected a seer hut");
        };
        assert!(tasks.iter().all(|task| task.quest.is_none() && task.reward.is_none()));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_trailing_bytes() {
        let mut data = minimal_map(Version::new(Format::RoE), 36);
        data.extend_from_slice(&[0, 0, 7]);
        let sink = CollectSink::new();
        decode_with(&data, &sink).unwrap();
        let diags = sink.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::TrailingData);
        assert_eq!(diags[0].value, Some(7));

        let mut data = minimal_map(Version::new(Format::RoE), 36);
        data.extend_from_slice(&[0; 124]);
        let sink = CollectSink::new();
        decode_with(&data, &sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_id_sentinels() {
        let ctx_read = |version: Version, data: &[u8]| {
            decode(version, &Catalogs::new(), data, |r, c| c.read_id(r, Catalog::Artifact)).0
        };
        assert_eq!(ctx_read(Version::new(Format::RoE), &[0xFF]), None);
        assert_eq!(ctx_read(Version::new(Format::RoE), &[0xFE]), Some(Identifier::new(0xFE)));
        assert_eq!(ctx_read(Version::new(Format::AB), &[0xFF, 0xFF]), None);
        assert_eq!(ctx_read(Version::new(Format::AB), &[0xFF, 0x00]), Some(Identifier::new(0xFF)));
        assert_eq!(ctx_read(Version::hota(3), &[0x34, 0x12]), Some(Identifier::new(0x1234)));
    }

    #[test]
    fn test_inverted_spell_mask() {
        let (all, consumed, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &[0; 9], |r, c| {
            c.read_allowed(r, SPELL_COUNT, Polarity::SetMeansForbidden, Catalog::Spell)
        });
        assert_eq!(consumed, 9);
        assert_eq!(all.len(), SPELL_COUNT);

        let (none, _, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &[0xFF; 9], |r, c| {
            c.read_allowed(r, SPELL_COUNT, Polarity::SetMeansForbidden, Catalog::Spell)
        });
        assert!(none.is_empty());
    }

    #[test]
    fn test_hota_artifact_count_sixteen() {
        let mut w = BinaryWriter::new();
        w.write_u32_le(16).write_bytes(&[1, 2, 3, 4, 5]).write_u32_le(10).write_bytes(&[0b1111_1110, 0b11]);
        let data = w.into_vec();
        let (allowed, consumed, _) = decode(Version::hota(3), &Catalogs::new(), &data, |r, c| {
            read_allowed_artifacts(r, c)
        });
        assert_eq!(consumed as usize, data.len());
        assert_eq!(allowed, Some(vec![Identifier::new(0)]));
    }

    #[test]
    fn test_unresolved_names_only_for_configured_catalogs() {
        let mut catalogs = Catalogs::new();
        catalogs.set_names(
            Catalog::Artifact,
            crate::catalog::NameTable::with_default([(1, "Centaur's Axe".to_string())].into_iter().collect()),
        );
        let (ids, _, sink) = decode(Version::new(Format::AB), &catalogs, &[1, 0, 2, 0], |r, c| {
            Ok(vec![c.read_id(r, Catalog::Artifact)?, c.read_id(r, Catalog::Monster)?])
        });
        assert_eq!(ids[0].as_ref().unwrap().name.as_deref(), Some("Centaur's Axe"));
        assert!(ids[1].as_ref().unwrap().name.is_none());
        assert_eq!(sink.count(DiagnosticKind::UnresolvedName), 0);

        let (_, _, sink) = decode(Version::new(Format::AB), &catalogs, &[9, 0], |r, c| {
            c.read_id(r, Catalog::Artifact)
        });
        assert_eq!(sink.count(DiagnosticKind::UnresolvedName), 1);
    }

    #[test]
    fn test_map_serializes() {
        let data = minimal_map(Version::hota(3), 36);
        let map = decode_with(&data, &CollectSink::new()).unwrap();
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["info"]["version"]["format"], "HotA");
        assert_eq!(json["victory"]["type"], "standard");
        assert_eq!(json["players"][0]["setup"]["ai_tactic"], "Random");
        assert!(matches!(map.info.difficulty, Tagged::Known(Difficulty::Normal)));
    }
}
