//! The map's hero roster: which heroes are available, reserved for
//! campaigns, limited to some players, or customized.

use indexmap::IndexMap;
use serde::Serialize;

use super::Context;
use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, Format, PlayerColor, Polarity, Tagged};
use crate::error::Result;
use crate::objects::common::{read_players, Gender, HeroArtifacts, PrimarySkills, SecondarySkill, SPELL_COUNT};

/// Heroes addressed by the fixed-size hero tables of AB, SoD and WoG
const CLASSIC_HERO_COUNT: usize = 156;
const ROE_HERO_COUNT: usize = 128;

/// Availability restricted to some players (SoD+)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisposedHero {
    pub portrait: u8,
    pub name: String,
    pub players: Vec<PlayerColor>,
}

/// Per-hero overrides from the map's hero settings (SoD+)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HeroCustomization {
    pub experience: Option<u32>,
    pub skills: Option<Vec<SecondarySkill>>,
    pub artifacts: Option<HeroArtifacts>,
    pub biography: Option<String>,
    pub gender: Option<Tagged<Gender>>,
    pub spells: Option<Vec<Identifier>>,
    pub primary_skills: Option<PrimarySkills>,
}

impl HeroCustomization {
    fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let experience = if reader.read_bool()? {
            Some(reader.read_u32()?)
        } else {
            None
        };
        let skills = if reader.read_bool()? {
            Some(SecondarySkill::read_list(reader)?)
        } else {
            None
        };
        let artifacts = HeroArtifacts::read(reader, ctx)?;
        let biography = if reader.read_bool()? {
            Some(reader.read_string()?)
        } else {
            None
        };
        let gender = reader.read_optional_enum()?;
        let spells = if reader.read_bool()? {
            Some(ctx.read_allowed(reader, SPELL_COUNT, Polarity::SetMeansAllowed, Catalog::Spell)?)
        } else {
            None
        };
        let primary_skills = if reader.read_bool()? {
            Some(PrimarySkills::read(reader)?)
        } else {
            None
        };
        Ok(Self {
            experience,
            skills,
            artifacts,
            biography,
            gender,
            spells,
            primary_skills,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroEntry {
    pub hero: Identifier,
    /// Present in the allowed-heroes mask
    pub allowed: bool,
    /// Held back for a campaign placeholder (AB+)
    pub reserved: bool,
    pub disposed: Option<DisposedHero>,
    pub customization: Option<HeroCustomization>,
}

impl HeroEntry {
    fn new(hero: Identifier) -> Self {
        Self {
            hero,
            allowed: false,
            reserved: false,
            disposed: None,
            customization: None,
        }
    }
}

/// Heroes keyed by id, in the order they were first mentioned
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct HeroRoster(IndexMap<u32, HeroEntry>);

impl HeroRoster {
    pub fn get(&self, hero: u32) -> Option<&HeroEntry> {
        self.0.get(&hero)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeroEntry> {
        self.0.values()
    }

    pub fn allowed(&self) -> impl Iterator<Item = &HeroEntry> {
        self.iter().filter(|entry| entry.allowed)
    }

    fn entry(&mut self, hero: Identifier) -> &mut HeroEntry {
        self.0
            .entry(hero.value)
            .or_insert_with(|| HeroEntry::new(hero))
    }

    /// Allowed heroes, campaign reservations and disposed heroes, which
    /// follow the teams block
    pub(crate) fn read_availability(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let version = ctx.version;
        let mut roster = HeroRoster::default();

        let hero_bits = match version.format {
            Format::RoE => ROE_HERO_COUNT,
            Format::HotA => reader.read_u32_in(0, 512, "hero count")? as usize,
            Format::AB | Format::SoD | Format::WoG => CLASSIC_HERO_COUNT,
        };
        for hero in ctx.read_allowed(reader, hero_bits, Polarity::SetMeansAllowed, Catalog::Hero)? {
            roster.entry(hero).allowed = true;
        }

        if version.at_least_ab() {
            let count = reader.read_u32()?;
            for _ in 0..count {
                if let Some(hero) = ctx.read_id_u8(reader, Catalog::Hero)? {
                    roster.entry(hero).reserved = true;
                }
            }
        }

        if version.at_least_sod() {
            let count = reader.read_u8()?;
            for _ in 0..count {
                let offset = reader.position();
                let raw = reader.read_u8()?;
                let hero = ctx.resolve(reader, Catalog::Hero, u32::from(raw), offset);
                let disposed = DisposedHero {
                    portrait: reader.read_u8()?,
                    name: reader.read_string()?,
                    players: read_players(reader)?,
                };
                roster.entry(hero).disposed = Some(disposed);
            }
        }
        Ok(roster)
    }

    /// Hero customizations, which follow the rumors (SoD+)
    pub(crate) fn read_customizations(&mut self, reader: &mut BinaryReader, ctx: &Context) -> Result<()> {
        let version = ctx.version;
        if !version.at_least_sod() {
            return Ok(());
        }
        let count = if version.is_hota() {
            reader.read_u32_in(0, 512, "hero count")?
        } else {
            CLASSIC_HERO_COUNT as u32
        };
        for raw in 0..count {
            let offset = reader.position();
            if !reader.read_bool()? {
                continue;
            }
            let hero = ctx.resolve(reader, Catalog::Hero, raw, offset);
            let customization = HeroCustomization::read(reader, ctx)?;
            self.entry(hero).customization = Some(customization);
        }
        Ok(())
    }
}
