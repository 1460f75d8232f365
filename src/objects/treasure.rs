//! Pickups, boxes, events and the small fixed-layout adventure objects.

use serde::Serialize;

use super::common::{
    read_owner_padded, read_players, skill_count, CreatureStack, Guard, PrimarySkills, Resources,
    SecondarySkill,
};
use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, PlayerColor, Polarity, Resource, Tagged};
use crate::error::Result;
use crate::map::Context;

/// Everything a Pandora's box or an event hands to the visiting hero
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxContent {
    pub guard: Option<Guard>,
    pub experience: u32,
    pub mana: i32,
    pub morale: i8,
    pub luck: i8,
    pub resources: Resources,
    pub primary_skills: PrimarySkills,
    pub secondary_skills: Vec<SecondarySkill>,
    /// Entries holding the empty id are kept as `None`
    pub artifacts: Vec<Option<Identifier>>,
    pub spells: Vec<Option<Identifier>>,
    pub creatures: Vec<CreatureStack>,
}

impl BoxContent {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let guard = Guard::read(reader, ctx)?;
        let experience = reader.read_u32()?;
        let mana = reader.read_i32()?;
        let morale = reader.read_i8_in(-3, 3, "morale")?;
        let luck = reader.read_i8_in(-3, 3, "luck")?;
        let resources = Resources::read(reader)?;
        let primary_skills = PrimarySkills::read(reader)?;

        let skill_total = reader.read_u8()?;
        let mut secondary_skills = Vec::with_capacity(skill_total as usize);
        for _ in 0..skill_total {
            secondary_skills.push(SecondarySkill::read(reader)?);
        }

        let artifact_total = reader.read_u8()?;
        let mut artifacts = Vec::with_capacity(artifact_total as usize);
        for _ in 0..artifact_total {
            artifacts.push(ctx.read_id(reader, Catalog::Artifact)?);
        }

        let spell_total = reader.read_u8()?;
        let mut spells = Vec::with_capacity(spell_total as usize);
        for _ in 0..spell_total {
            spells.push(ctx.read_id_u8(reader, Catalog::Spell)?);
        }

        let creatures = CreatureStack::read_list(reader, ctx)?;
        reader.skip_zero(8)?;

        Ok(Self {
            guard,
            experience,
            mana,
            morale,
            luck,
            resources,
            primary_skills,
            secondary_skills,
            artifacts,
            spells,
            creatures,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventObject {
    #[serde(flatten)]
    pub content: BoxContent,
    pub players: Vec<PlayerColor>,
    pub computer: bool,
    pub remove_after_visit: bool,
    /// Only stored by HotA 1.7; earlier maps let humans trigger every event
    pub human: bool,
}

impl EventObject {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let content = BoxContent::read(reader, ctx)?;
        let players = read_players(reader)?;
        let computer = reader.read_bool()?;
        let remove_after_visit = reader.read_bool()?;
        reader.skip_zero(4)?;
        let human = if ctx.version.hota_at_least(3) {
            reader.read_bool()?
        } else {
            true
        };
        Ok(Self { content, players, computer, remove_after_visit, human })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactObject {
    /// Taken from the template; `None` for the random artifact classes
    pub artifact: Option<Identifier>,
    pub guard: Option<Guard>,
}

impl ArtifactObject {
    pub(crate) fn read(
        reader: &mut BinaryReader,
        ctx: &Context,
        artifact: Option<Identifier>,
    ) -> Result<Self> {
        Ok(Self { artifact, guard: Guard::read(reader, ctx)? })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellScrollObject {
    pub guard: Option<Guard>,
    pub spell: Identifier,
}

impl SpellScrollObject {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let guard = Guard::read(reader, ctx)?;
        let offset = reader.position();
        let raw = reader.read_u32()?;
        Ok(Self { guard, spell: ctx.resolve(reader, Catalog::Spell, raw, offset) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceObject {
    /// Taken from the template; `None` for random resources
    pub resource: Option<Tagged<Resource>>,
    pub guard: Option<Guard>,
    /// Zero means a random amount
    pub amount: u32,
}

impl ResourceObject {
    pub(crate) fn read(
        reader: &mut BinaryReader,
        ctx: &Context,
        resource: Option<Tagged<Resource>>,
    ) -> Result<Self> {
        let guard = Guard::read(reader, ctx)?;
        let amount = reader.read_u32()?;
        reader.skip_zero(4)?;
        Ok(Self { resource, guard, amount })
    }
}

/// Text of a sign post or an ocean bottle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageObject {
    pub text: String,
}

impl MessageObject {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Self> {
        let text = reader.read_string()?;
        reader.skip_zero(4)?;
        Ok(Self { text })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShrineObject {
    /// `None` for a random spell of the shrine's level
    pub spell: Option<Identifier>,
}

impl ShrineObject {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let spell = ctx.read_id_u8(reader, Catalog::Spell)?;
        reader.skip_zero(3)?;
        Ok(Self { spell })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrailObject {
    /// Only present for templates with a sub-id below 1000
    pub radius: Option<i32>,
}

impl GrailObject {
    pub(crate) fn read(reader: &mut BinaryReader, sub_id: u32) -> Result<Self> {
        let radius = if sub_id < 1000 {
            Some(reader.read_i32()?)
        } else {
            None
        };
        Ok(Self { radius })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WitchHutObject {
    /// Skills the hut may teach; RoE huts store nothing and allow any
    pub skills: Option<Vec<u32>>,
}

impl WitchHutObject {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let skills = if ctx.version.at_least_ab() {
            Some(reader.read_allow_list(skill_count(ctx), Polarity::SetMeansAllowed)?)
        } else {
            None
        };
        Ok(Self { skills })
    }
}

wire_enum! {
    pub enum ScholarBonus {
        PrimarySkill = 0,
        SecondarySkill = 1,
        Spell = 2,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScholarObject {
    /// `None` for a random bonus
    pub bonus: Option<Tagged<ScholarBonus>>,
    /// Skill or spell index; its meaning depends on `bonus`
    pub value: u8,
}

impl ScholarObject {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Self> {
        let bonus = reader.read_optional_enum()?;
        let value = reader.read_u8()?;
        reader.skip_zero(6)?;
        Ok(Self { bonus, value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MineObject {
    pub resource: Tagged<Resource>,
    pub owner: Option<Tagged<PlayerColor>>,
}

impl MineObject {
    pub(crate) fn read(reader: &mut BinaryReader, resource: Tagged<Resource>) -> Result<Self> {
        Ok(Self { resource, owner: read_owner_padded(reader)? })
    }
}

/// An abandoned mine and the resources it may turn out to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbandonedMineObject {
    pub resources: Vec<Resource>,
}

impl AbandonedMineObject {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Self> {
        let flags = reader.read_flags(4)?;
        let resources = Resource::ALL
            .into_iter()
            .zip(flags)
            .filter_map(|(resource, set)| set.then_some(resource))
            .collect();
        Ok(Self { resources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalogs, NameTable};
    use crate::codec::{BinaryWriter, Format, Version};
    use crate::diagnostics::DiagnosticKind;
    use crate::objects::testing::decode;

    fn empty_box(w: &mut BinaryWriter) {
        w.write_bool(false).write_u32_le(0).write_i32_le(0).write_i8(0).write_i8(0);
        w.write_zeros(28).write_zeros(4);
        w.write_u8(0).write_u8(0).write_u8(0).write_u8(0);
        w.write_zeros(8);
    }

    #[test]
    fn test_pandoras_box_lists() {
        let mut w = BinaryWriter::new();
        w.write_bool(false).write_u32_le(1500).write_i32_le(-10).write_i8(2).write_i8(-4);
        w.write_zeros(24).write_i32_le(2500);
        w.write_bytes(&[1, 0, 0, 2]);
        w.write_u8(1).write_u8(7).write_u8(3);
        w.write_u8(2).write_id(Format::AB, 4).write_no_id(Format::AB);
        w.write_u8(1).write_u8(15);
        w.write_u8(1).write_id(Format::AB, 100).write_u16_le(12);
        w.write_zeros(8);
        let data = w.into_vec();

        let mut catalogs = Catalogs::new();
        catalogs.set_names(
            Catalog::Spell,
            NameTable::with_default([(15, "Magic Arrow".to_string())].into_iter().collect()),
        );
        let (content, consumed, sink) = decode(Version::new(Format::AB), &catalogs, &data, |r, c| {
            BoxContent::read(r, c)
        });
        assert_eq!(consumed as usize, data.len());
        assert_eq!(content.experience, 1500);
        assert_eq!(content.mana, -10);
        assert_eq!(content.luck, -4);
        assert_eq!(sink.count(DiagnosticKind::OutOfRange), 1);
        assert_eq!(content.resources.0[6], 2500);
        assert_eq!(content.primary_skills.knowledge, 2);
        assert_eq!(content.secondary_skills.len(), 1);
        assert_eq!(content.artifacts, vec![Some(Identifier::new(4)), None]);
        assert_eq!(content.spells.len(), 1);
        assert_eq!(content.spells[0].as_ref().unwrap().name.as_deref(), Some("Magic Arrow"));
        assert_eq!(content.creatures[0].count, 12);
    }

    #[test]
    fn test_event_human_flag_by_revision() {
        let mut w = BinaryWriter::new();
        empty_box(&mut w);
        w.write_u8(0b11).write_bool(true).write_bool(false).write_zeros(4);
        let data = w.into_vec();
        let (event, consumed, _) = decode(Version::hota(2), &Catalogs::new(), &data, |r, c| {
            EventObject::read(r, c)
        });
        assert_eq!(consumed as usize, data.len());
        assert!(event.human);
        assert!(event.computer);
        assert_eq!(event.players, vec![PlayerColor::Red, PlayerColor::Blue]);

        let mut w = BinaryWriter::new();
        empty_box(&mut w);
        w.write_u8(0).write_bool(false).write_bool(true).write_zeros(4).write_bool(false);
        let data = w.into_vec();
        let (event, consumed, _) = decode(Version::hota(3), &Catalogs::new(), &data, |r, c| {
            EventObject::read(r, c)
        });
        assert_eq!(consumed as usize, data.len());
        assert!(!event.human);
        assert!(event.remove_after_visit);
    }

    #[test]
    fn test_spell_scroll_reads_wide_id() {
        let data = [0, 53, 0, 0, 0];
        let (scroll, consumed, _) = decode(Version::new(Format::RoE), &Catalogs::new(), &data, |r, c| {
            SpellScrollObject::read(r, c)
        });
        assert_eq!(consumed, 5);
        assert!(scroll.guard.is_none());
        assert_eq!(scroll.spell, Identifier::new(53));
    }

    #[test]
    fn test_resource_and_message() {
        let data = [0, 0xF4, 0x01, 0, 0, 0, 0, 0, 0];
        let (res, consumed, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &data, |r, c| {
            ResourceObject::read(r, c, Some(Tagged::Known(Resource::Gold)))
        });
        assert_eq!(consumed, 9);
        assert_eq!(res.amount, 500);

        let mut w = BinaryWriter::new();
        w.write_string("Turn back").write_zeros(4);
        let data = w.into_vec();
        let (msg, consumed, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &data, |r, _| {
            MessageObject::read(r)
        });
        assert_eq!(consumed as usize, data.len());
        assert_eq!(msg.text, "Turn back");
    }

    #[test]
    fn test_grail_radius_depends_on_subtype() {
        let data = 4i32.to_le_bytes();
        let (grail, consumed, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &data, |r, _| {
            GrailObject::read(r, 0)
        });
        assert_eq!((grail.radius, consumed), (Some(4), 4));

        let (grail, consumed, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &data, |r, _| {
            GrailObject::read(r, 1000)
        });
        assert_eq!((grail.radius, consumed), (None, 0));
    }

    #[test]
    fn test_witch_hut_skill_mask() {
        let (hut, consumed, _) = decode(Version::new(Format::RoE), &Catalogs::new(), &[], |r, c| {
            WitchHutObject::read(r, c)
        });
        assert_eq!(consumed, 0);
        assert!(hut.skills.is_none());

        let data = [0b0000_0001, 0, 0, 0b0001_0000];
        let (hut, consumed, _) = decode(Version::hota(3), &Catalogs::new(), &data, |r, c| {
            WitchHutObject::read(r, c)
        });
        assert_eq!(consumed, 4);
        assert_eq!(hut.skills, Some(vec![0, 28]));
    }

    #[test]
    fn test_scholar_and_shrine() {
        let (scholar, consumed, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &[0xFF, 0, 0, 0, 0, 0, 0, 0], |r, _| {
            ScholarObject::read(r)
        });
        assert_eq!(consumed, 8);
        assert!(scholar.bonus.is_none());

        let (shrine, consumed, _) = decode(Version::new(Format::SoD), &Catalogs::new(), &[9, 0, 0, 0], |r, c| {
            ShrineObject::read(r, c)
        });
        assert_eq!(consumed, 4);
        assert_eq!(shrine.spell, Some(Identifier::new(9)));
    }

    #[test]
    fn test_abandoned_mine_resources() {
        let (mine, consumed, sink) = decode(Version::new(Format::SoD), &Catalogs::new(), &[0b0100_0101, 0, 0, 0], |r, _| {
            AbandonedMineObject::read(r)
        });
        assert_eq!(consumed, 4);
        assert!(sink.is_empty());
        assert_eq!(mine.resources, vec![Resource::Wood, Resource::Ore, Resource::Gold]);
    }
}
