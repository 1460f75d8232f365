use serde::Serialize;

use super::common::{read_owner_padded, CreatureSet, Resources};
use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, Faction, PlayerColor, Polarity, Tagged};
use crate::error::Result;
use crate::map::Context;

wire_enum! {
    /// How a wandering monster reacts to an approaching hero
    pub enum Disposition {
        Compliant = 0,
        Friendly = 1,
        Aggressive = 2,
        Hostile = 3,
        Savage = 4,
    }
}

/// Message and treasure handed over when the monster is defeated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonsterTreasure {
    pub message: String,
    pub resources: Resources,
    pub artifact: Option<Identifier>,
}

/// HotA 1.7 per-stack behaviour overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonsterBehavior {
    /// -1 for the game default
    pub aggression: i32,
    pub join_for_money_only: bool,
    pub join_percent: i32,
    pub upgraded_stack: i32,
    pub split_stack: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonsterObject {
    /// Taken from the template; `None` for random monsters
    pub creature: Option<Identifier>,
    pub identifier: Option<u32>,
    /// Zero means a random count
    pub count: u16,
    pub disposition: Tagged<Disposition>,
    pub treasure: Option<MonsterTreasure>,
    pub never_flees: bool,
    pub grows: bool,
    pub behavior: Option<MonsterBehavior>,
}

impl MonsterObject {
    pub(crate) fn read(
        reader: &mut BinaryReader,
        ctx: &Context,
        creature: Option<Identifier>,
    ) -> Result<Self> {
        let identifier = if ctx.version.at_least_ab() {
            Some(reader.read_u32()?)
        } else {
            None
        };
        let count = reader.read_u16()?;
        let disposition = reader.read_enum(1)?;
        let treasure = if reader.read_bool()? {
            Some(MonsterTreasure {
                message: reader.read_string()?,
                resources: Resources::read(reader)?,
                artifact: ctx.read_id(reader, Catalog::Artifact)?,
            })
        } else {
            None
        };
        let never_flees = reader.read_bool()?;
        let grows = !reader.read_bool()?;
        reader.skip_zero(2)?;

        let behavior = if ctx.version.hota_at_least(3) {
            Some(MonsterBehavior {
                aggression: reader.read_i32()?,
                join_for_money_only: reader.read_bool()?,
                join_percent: reader.read_i32_in(0, 100, "join percent")?,
                upgraded_stack: reader.read_i32()?,
                split_stack: reader.read_i32()?,
            })
        } else {
            None
        };

        Ok(Self {
            creature,
            identifier,
            count,
            disposition,
            treasure,
            never_flees,
            grows,
            behavior,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GarrisonObject {
    pub owner: Option<Tagged<PlayerColor>>,
    pub army: CreatureSet,
    pub removable_units: bool,
}

impl GarrisonObject {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let owner = read_owner_padded(reader)?;
        let army = CreatureSet::read(reader, ctx)?;
        let removable_units = if ctx.version.at_least_ab() {
            reader.read_bool()?
        } else {
            true
        };
        reader.skip_zero(8)?;
        Ok(Self { owner, army, removable_units })
    }
}

/// A placed creature generator. `generator` names it when the catalog for
/// that generator family has an entry for the subtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DwellingObject {
    pub generator: Option<Identifier>,
    pub owner: Option<Tagged<PlayerColor>>,
}

impl DwellingObject {
    pub(crate) fn read(reader: &mut BinaryReader, generator: Option<Identifier>) -> Result<Self> {
        Ok(Self { generator, owner: read_owner_padded(reader)? })
    }
}

/// Which parts a random dwelling record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RandomDwellingShape {
    pub faction_source: bool,
    pub level_range: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomDwellingObject {
    pub owner: Option<Tagged<PlayerColor>>,
    /// Quest identifier of the town whose faction the dwelling follows
    pub linked_town: Option<u32>,
    /// Allowed factions when the dwelling is not linked to a town
    pub factions: Option<Vec<Tagged<Faction>>>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
}

impl RandomDwellingObject {
    pub(crate) fn read(reader: &mut BinaryReader, shape: RandomDwellingShape) -> Result<Self> {
        let owner = read_owner_padded(reader)?;
        let mut linked_town = None;
        let mut factions = None;
        if shape.faction_source {
            let identifier = reader.read_u32()?;
            if identifier == 0 {
                let bits = reader.read_allow_list(16, Polarity::SetMeansAllowed)?;
                factions = Some(bits.into_iter().map(Tagged::from_raw).collect());
            } else {
                linked_town = Some(identifier);
            }
        }
        let (min_level, max_level) = if shape.level_range {
            (
                Some(reader.read_u8_in(0, 6, "dwelling level")?),
                Some(reader.read_u8_in(0, 6, "dwelling level")?),
            )
        } else {
            (None, None)
        };
        Ok(Self { owner, linked_town, factions, min_level, max_level })
    }
}

wire_enum! {
    /// Subtypes of the generic creature bank object
    pub enum BankSite {
        CyclopsStockpile = 0,
        DwarvenTreasury = 1,
        GriffinConservatory = 2,
        ImpCache = 3,
        MedusaStores = 4,
        NagaBank = 5,
        DragonFlyHive = 6,
    }
}

/// HotA 1.7 guard and reward presets for a bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankSetup {
    /// -1 for a random guard preset
    pub guard_preset: i32,
    /// -1 random, 0 none, 1 present
    pub upgraded_stack: i8,
    /// `None` entries are random artifacts
    pub artifacts: Vec<Option<Identifier>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatureBankObject {
    /// Set only for the generic bank object, from its subtype
    pub site: Option<Tagged<BankSite>>,
    pub setup: Option<BankSetup>,
}

impl CreatureBankObject {
    pub(crate) fn read(
        reader: &mut BinaryReader,
        ctx: &Context,
        site: Option<Tagged<BankSite>>,
    ) -> Result<Self> {
        let setup = if ctx.version.hota_at_least(3) {
            let guard_preset = reader.read_i32()?;
            let upgraded_stack = reader.read_i8_in(-1, 1, "upgraded stack")?;
            let count = reader.read_u32()?;
            let mut artifacts = Vec::with_capacity(count.min(16) as usize);
            for _ in 0..count {
                let offset = reader.position();
                let raw = reader.read_i32()?;
                artifacts.push(
                    (raw >= 0).then(|| ctx.resolve(reader, Catalog::Artifact, raw as u32, offset)),
                );
            }
            Some(BankSetup { guard_preset, upgraded_stack, artifacts })
        } else {
            None
        };
        Ok(Self { site, setup })
    }
}
