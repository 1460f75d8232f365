use serde::Serialize;

use super::common::{CreatureSet, Formation, SPELL_COUNT};
use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, Faction, PlayerColor, Polarity, Tagged};
use crate::error::Result;
use crate::map::events::TimedEvent;
use crate::map::Context;

/// Bits in each building mask
const BUILDING_BITS: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TownBuildings {
    /// Explicit built and forbidden building indices
    Custom { built: Vec<u32>, forbidden: Vec<u32> },
    /// Default buildings for the faction, optionally with a fort
    Standard { fort: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TownEvent {
    #[serde(flatten)]
    pub event: TimedEvent,
    pub buildings: Vec<u32>,
    /// Extra creatures per dwelling level
    pub creatures: [u16; 7],
}

impl TownEvent {
    fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let event = TimedEvent::read(reader, ctx)?;
        let buildings = reader.read_allow_list(BUILDING_BITS, Polarity::SetMeansAllowed)?;
        let mut creatures = [0u16; 7];
        for count in creatures.iter_mut() {
            *count = reader.read_u16()?;
        }
        reader.skip_zero(4)?;
        Ok(Self { event, buildings, creatures })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TownObject {
    pub identifier: Option<u32>,
    /// Taken from the template; `None` for random towns
    pub faction: Option<Tagged<Faction>>,
    pub owner: Option<Tagged<PlayerColor>>,
    pub name: Option<String>,
    pub garrison: Option<CreatureSet>,
    pub formation: Tagged<Formation>,
    pub buildings: TownBuildings,
    /// Spells the mage guild always offers (AB+)
    pub obligatory_spells: Option<Vec<Identifier>>,
    /// Spells the mage guild may offer
    pub possible_spells: Vec<Identifier>,
    pub spell_research: Option<bool>,
    pub events: Vec<TownEvent>,
    /// Player whose alignment a random town follows (SoD+)
    pub alignment: Option<u8>,
}

impl TownObject {
    pub(crate) fn read(
        reader: &mut BinaryReader,
        ctx: &Context,
        faction: Option<Tagged<Faction>>,
    ) -> Result<Self> {
        let version = ctx.version;
        let identifier = if version.at_least_ab() {
            Some(reader.read_u32()?)
        } else {
            None
        };
        let owner = reader.read_owner()?;
        let name = if reader.read_bool()? {
            Some(reader.read_string()?)
        } else {
            None
        };
        let garrison = if reader.read_bool()? {
            Some(CreatureSet::read(reader, ctx)?)
        } else {
            None
        };
        let formation = reader.read_enum(1)?;

        let buildings = if reader.read_bool()? {
            TownBuildings::Custom {
                built: reader.read_allow_list(BUILDING_BITS, Polarity::SetMeansAllowed)?,
                forbidden: reader.read_allow_list(BUILDING_BITS, Polarity::SetMeansAllowed)?,
            }
        } else {
            TownBuildings::Standard { fort: reader.read_bool()? }
        };

        let obligatory_spells = if version.at_least_ab() {
            Some(ctx.read_allowed(reader, SPELL_COUNT, Polarity::SetMeansAllowed, Catalog::Spell)?)
        } else {
            None
        };
        let possible_spells =
            ctx.read_allowed(reader, SPELL_COUNT, Polarity::SetMeansForbidden, Catalog::Spell)?;
        let spell_research = if version.hota_at_least(1) {
            Some(reader.read_bool()?)
        } else {
            None
        };

        let event_count = reader.read_u32()?;
        let mut events = Vec::with_capacity(event_count.min(64) as usize);
        for _ in 0..event_count {
            events.push(TownEvent::read(reader, ctx)?);
        }

        let alignment = if version.at_least_sod() {
            Some(reader.read_u8()?).filter(|a| *a != 0xFF)
        } else {
            None
        };
        reader.skip_zero(3)?;

        Ok(Self {
            identifier,
            faction,
            owner,
            name,
            garrison,
            formation,
            buildings,
            obligatory_spells,
            possible_spells,
            spell_research,
            events,
            alignment,
        })
    }
}
