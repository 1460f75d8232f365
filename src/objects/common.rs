//! Building blocks shared by several object payloads and by the map-level
//! hero customizations.

use serde::Serialize;

use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, PlayerColor, Polarity, Tagged};
use crate::error::Result;
use crate::map::Context;

/// Garrison and guard slots per army
pub const ARMY_SLOTS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatureStack {
    pub creature: Identifier,
    pub count: u16,
}

impl CreatureStack {
    /// Creature id (version-sized) followed by a u16 count. The count is
    /// consumed even when the id is the empty-slot sentinel.
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Option<Self>> {
        let creature = ctx.read_id(reader, Catalog::Monster)?;
        let count = reader.read_u16()?;
        Ok(creature.map(|creature| CreatureStack { creature, count }))
    }

    /// `u8` count of stacks; empty entries are dropped
    pub(crate) fn read_list(reader: &mut BinaryReader, ctx: &Context) -> Result<Vec<Self>> {
        let count = reader.read_u8()?;
        let mut stacks = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if let Some(stack) = Self::read(reader, ctx)? {
                stacks.push(stack);
            }
        }
        Ok(stacks)
    }
}

/// Seven army slots in order; `None` marks an empty slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CreatureSet(pub Vec<Option<CreatureStack>>);

impl CreatureSet {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let mut slots = Vec::with_capacity(ARMY_SLOTS);
        for _ in 0..ARMY_SLOTS {
            slots.push(CreatureStack::read(reader, ctx)?);
        }
        Ok(Self(slots))
    }

    pub fn stacks(&self) -> impl Iterator<Item = &CreatureStack> {
        self.0.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

/// Amounts of the seven resources, wood first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Resources(pub [i32; 7]);

impl Resources {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Self> {
        let mut amounts = [0i32; 7];
        for amount in amounts.iter_mut() {
            *amount = reader.read_i32()?;
        }
        Ok(Self(amounts))
    }
}

/// Message shown on pickup, with optional guards standing over the object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guard {
    pub message: String,
    pub guards: Option<CreatureSet>,
}

impl Guard {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Option<Self>> {
        if !reader.read_bool()? {
            return Ok(None);
        }
        let message = reader.read_string()?;
        let guards = if reader.read_bool()? {
            Some(CreatureSet::read(reader, ctx)?)
        } else {
            None
        };
        reader.skip_zero(4)?;
        Ok(Some(Guard { message, guards }))
    }
}

wire_enum! {
    pub enum SkillLevel {
        Basic = 1,
        Advanced = 2,
        Expert = 3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecondarySkill {
    pub skill: u8,
    pub level: Tagged<SkillLevel>,
}

impl SecondarySkill {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Self> {
        let skill = reader.read_u8()?;
        let level = reader.read_enum(1)?;
        Ok(Self { skill, level })
    }

    /// `u32` count followed by the skills
    pub(crate) fn read_list(reader: &mut BinaryReader) -> Result<Vec<Self>> {
        let count = reader.read_u32()?;
        let mut skills = Vec::with_capacity(count.min(32) as usize);
        for _ in 0..count {
            skills.push(Self::read(reader)?);
        }
        Ok(skills)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PrimarySkills {
    pub attack: u8,
    pub defense: u8,
    pub spell_power: u8,
    pub knowledge: u8,
}

impl PrimarySkills {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            attack: reader.read_u8()?,
            defense: reader.read_u8()?,
            spell_power: reader.read_u8()?,
            knowledge: reader.read_u8()?,
        })
    }
}

/// Equipped artifacts by slot plus the backpack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroArtifacts {
    pub slots: Vec<Option<Identifier>>,
    pub backpack: Vec<Option<Identifier>>,
}

impl HeroArtifacts {
    /// Guarded by a leading bool; the slot count grew by one (the fifth
    /// miscellaneous slot) in SoD.
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Option<Self>> {
        if !reader.read_bool()? {
            return Ok(None);
        }
        let slot_count = if ctx.version.at_least_sod() { 19 } else { 18 };
        let mut slots = Vec::with_capacity(slot_count);
        for _ in 0..slot_count {
            slots.push(ctx.read_id(reader, Catalog::Artifact)?);
        }
        let bag_count = reader.read_u16()?;
        let mut backpack = Vec::with_capacity(bag_count as usize);
        for _ in 0..bag_count {
            backpack.push(ctx.read_id(reader, Catalog::Artifact)?);
        }
        Ok(Some(Self { slots, backpack }))
    }
}

wire_enum! {
    pub enum Formation {
        Spread = 0,
        Grouped = 1,
    }
}

wire_enum! {
    pub enum Gender {
        Male = 0,
        Female = 1,
    }
}

/// One-byte player mask, bit `n` set for player colour `n`
pub(crate) fn read_players(reader: &mut BinaryReader) -> Result<Vec<PlayerColor>> {
    let bits = reader.read_allow_list(8, Polarity::SetMeansAllowed)?;
    Ok(bits
        .into_iter()
        .map(|i| PlayerColor::ALL[i as usize])
        .collect())
}

/// Owner byte followed by three bytes of padding
pub(crate) fn read_owner_padded(reader: &mut BinaryReader) -> Result<Option<Tagged<PlayerColor>>> {
    let owner = reader.read_owner()?;
    reader.skip_zero(3)?;
    Ok(owner)
}

/// Number of secondary skills in the game; HotA added Interference
pub(crate) fn skill_count(ctx: &Context) -> usize {
    if ctx.version.is_hota() {
        29
    } else {
        28
    }
}

/// Spells in the game, as addressed by every spell bitmask
pub(crate) const SPELL_COUNT: usize = 70;
