use serde::Serialize;

use super::common::{
    CreatureSet, Formation, Gender, HeroArtifacts, PrimarySkills, SecondarySkill, SPELL_COUNT,
};
use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, PlayerColor, Polarity, Tagged};
use crate::error::Result;
use crate::map::Context;

/// A hero standing on the map, a random hero, or a hero held in a prison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroObject {
    /// Quest identifier other objects use to refer to this hero (AB+)
    pub identifier: Option<u32>,
    pub owner: Option<Tagged<PlayerColor>>,
    /// `None` for random heroes
    pub hero: Option<Identifier>,
    pub name: Option<String>,
    pub experience: Option<u32>,
    pub portrait: Option<u8>,
    pub skills: Option<Vec<SecondarySkill>>,
    pub garrison: Option<CreatureSet>,
    pub formation: Tagged<Formation>,
    pub artifacts: Option<HeroArtifacts>,
    /// `None` when the hero does not patrol
    pub patrol_radius: Option<u8>,
    pub biography: Option<String>,
    pub gender: Option<Tagged<Gender>>,
    pub spells: Option<Vec<Identifier>>,
    pub primary_skills: Option<PrimarySkills>,
}

impl HeroObject {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let version = ctx.version;
        let identifier = if version.at_least_ab() {
            Some(reader.read_u32()?)
        } else {
            None
        };
        let owner = reader.read_owner()?;
        let hero = ctx.read_id_u8(reader, Catalog::Hero)?;
        let name = read_optional_string(reader)?;

        let experience = if version.at_least_sod() {
            if reader.read_bool()? {
                Some(reader.read_u32()?)
            } else {
                None
            }
        } else {
            // Older formats always store the field and use zero for "default"
            Some(reader.read_u32()?).filter(|exp| *exp > 0)
        };

        let portrait = if reader.read_bool()? {
            Some(reader.read_u8()?)
        } else {
            None
        };
        let skills = if reader.read_bool()? {
            Some(SecondarySkill::read_list(reader)?)
        } else {
            None
        };
        let garrison = if reader.read_bool()? {
            Some(CreatureSet::read(reader, ctx)?)
        } else {
            None
        };
        let formation = reader.read_enum(1)?;
        let artifacts = HeroArtifacts::read(reader, ctx)?;
        let patrol_radius = Some(reader.read_u8()?).filter(|r| *r != 0xFF);

        let (biography, gender) = if version.at_least_ab() {
            (read_optional_string(reader)?, reader.read_optional_enum()?)
        } else {
            (None, None)
        };

        let spells = if version.at_least_sod() {
            if reader.read_bool()? {
                Some(ctx.read_allowed(reader, SPELL_COUNT, Polarity::SetMeansAllowed, Catalog::Spell)?)
            } else {
                None
            }
        } else if version.at_least_ab() {
            ctx.read_id_u8(reader, Catalog::Spell)?.map(|spell| vec![spell])
        } else {
            None
        };

        let primary_skills = if version.at_least_sod() && reader.read_bool()? {
            Some(PrimarySkills::read(reader)?)
        } else {
            None
        };
        reader.skip_zero(16)?;

        Ok(Self {
            identifier,
            owner,
            hero,
            name,
            experience,
            portrait,
            skills,
            garrison,
            formation,
            artifacts,
            patrol_radius,
            biography,
            gender,
            spells,
            primary_skills,
        })
    }
}

/// HotA/SoD placeholder filled in by the campaign's carried-over hero
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroPlaceholder {
    pub owner: Option<Tagged<PlayerColor>>,
    /// The specific hero, or `None` to take the strongest by `power_rank`
    pub hero: Option<Identifier>,
    pub power_rank: Option<u8>,
}

impl HeroPlaceholder {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let owner = reader.read_owner()?;
        let hero = ctx.read_id_u8(reader, Catalog::Hero)?;
        let power_rank = if hero.is_none() {
            Some(reader.read_u8()?)
        } else {
            None
        };
        Ok(Self { owner, hero, power_rank })
    }
}

fn read_optional_string(reader: &mut BinaryReader) -> Result<Option<String>> {
    if reader.read_bool()? {
        Ok(Some(reader.read_string()?))
    } else {
        Ok(None)
    }
}
