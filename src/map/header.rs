//! Everything between the format tag and the hero lists: basic map
//! information, the eight player slots, win/loss conditions and teams.

use serde::Serialize;

use super::Context;
use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, Faction, Format, PlayerColor, Polarity, Position, Resource, Tagged, Version};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{Error, Result};

wire_enum! {
    pub enum Difficulty {
        Easy = 0,
        Normal = 1,
        Hard = 2,
        Expert = 3,
        Impossible = 4,
    }
}

/// Fields HotA adds right after the format tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotaInfo {
    pub revision: u32,
    pub mirror: Option<bool>,
    pub arena: Option<bool>,
    /// Number of terrain types the map was made for
    pub terrain_types: Option<u32>,
}

impl HotaInfo {
    fn read(reader: &mut BinaryReader) -> Result<Self> {
        let revision = reader.read_u32()?;
        let (mirror, arena) = if revision >= 1 {
            (Some(reader.read_bool()?), Some(reader.read_bool()?))
        } else {
            (None, None)
        };
        let terrain_types = if revision >= 2 {
            Some(reader.read_u32()?)
        } else {
            None
        };
        Ok(Self { revision, mirror, arena, terrain_types })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapInfo {
    pub version: Version,
    pub hota: Option<HotaInfo>,
    pub any_players: bool,
    /// Width and height in tiles
    pub size: u32,
    pub two_levels: bool,
    pub name: String,
    pub description: String,
    pub difficulty: Tagged<Difficulty>,
    /// Highest level heroes may reach (AB+); zero means no limit
    pub level_limit: Option<u8>,
}

impl MapInfo {
    /// Read the basic information block that follows the format tag
    pub(crate) fn read(reader: &mut BinaryReader, format: Format) -> Result<Self> {
        let hota = if format == Format::HotA {
            Some(HotaInfo::read(reader)?)
        } else {
            None
        };
        let version = Version {
            format,
            hota_revision: hota.map(|h| h.revision),
        };

        let any_players = reader.read_bool()?;
        let size = reader.read_u32_in(1, 256, "map size")?;
        let two_levels = reader.read_bool()?;
        let name = reader.read_string()?;
        let description = reader.read_string()?;
        let offset = reader.position();
        let difficulty = Tagged::from_raw(u32::from(reader.read_u8()?));
        if !difficulty.is_known() {
            reader.report(
                Diagnostic::new(DiagnosticKind::OutOfRange, offset, "difficulty")
                    .with_value(difficulty.raw() as i64)
                    .with_expected(0, 4),
            );
        }
        let level_limit = if format.at_least_ab() {
            Some(reader.read_u8_in(0, 100, "hero level limit")?)
        } else {
            None
        };

        Ok(Self {
            version,
            hota,
            any_players,
            size,
            two_levels,
            name,
            description,
            difficulty,
            level_limit,
        })
    }

    pub fn levels(&self) -> u8 {
        if self.two_levels {
            2
        } else {
            1
        }
    }
}

wire_enum! {
    /// Play style of a computer-controlled player
    pub enum AiTactic {
        Random = 0,
        Warrior = 1,
        Builder = 2,
        Explorer = 3,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainTown {
    pub position: Position,
    /// AB+; earlier maps always generate a hero at the main town
    pub generate_hero: bool,
    /// AB+; `None` keeps the town's own type
    pub town_type: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadHero {
    pub hero: Identifier,
    pub portrait: u8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedHero {
    pub hero: Identifier,
    pub name: String,
}

/// Setup of a player slot that humans or the computer may take
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSetup {
    pub ai_tactic: Tagged<AiTactic>,
    /// SoD+
    pub customized_alignment: Option<bool>,
    pub allowed_factions: Vec<Tagged<Faction>>,
    pub random_faction: bool,
    pub main_town: Option<MainTown>,
    pub random_hero: bool,
    pub lead_hero: Option<LeadHero>,
    /// Heroes the player starts with (AB+)
    pub heroes: Vec<NamedHero>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSlot {
    pub color: PlayerColor,
    pub can_be_human: bool,
    pub can_be_computer: bool,
    /// `None` when neither humans nor the computer may play this colour
    pub setup: Option<PlayerSetup>,
}

impl PlayerSlot {
    pub fn is_active(&self) -> bool {
        self.can_be_human || self.can_be_computer
    }

    fn read(reader: &mut BinaryReader, ctx: &Context, color: PlayerColor) -> Result<Self> {
        let version = ctx.version;
        let can_be_human = reader.read_bool()?;
        let can_be_computer = reader.read_bool()?;
        if !(can_be_human || can_be_computer) {
            // Disabled slots keep stale editor data here
            let unused = if version.at_least_sod() {
                13
            } else if version.at_least_ab() {
                12
            } else {
                6
            };
            reader.skip(unused)?;
            return Ok(Self { color, can_be_human, can_be_computer, setup: None });
        }

        let ai_tactic = reader.read_enum(1)?;
        let customized_alignment = if version.at_least_sod() {
            Some(reader.read_bool()?)
        } else {
            None
        };
        let faction_bits = if version.at_least_ab() { 16 } else { 8 };
        let allowed_factions = reader
            .read_allow_list(faction_bits, Polarity::SetMeansAllowed)?
            .into_iter()
            .map(Tagged::from_raw)
            .collect();
        let random_faction = reader.read_bool()?;

        let main_town = if reader.read_bool()? {
            let (generate_hero, town_type) = if version.at_least_ab() {
                let generate_hero = reader.read_bool()?;
                let town_type = Some(reader.read_u8()?).filter(|t| *t != 0xFF);
                (generate_hero, town_type)
            } else {
                (true, None)
            };
            Some(MainTown { position: reader.read_position()?, generate_hero, town_type })
        } else {
            None
        };

        let random_hero = reader.read_bool()?;
        let lead_hero = match ctx.read_id_u8(reader, Catalog::Hero)? {
            Some(hero) => Some(LeadHero {
                hero,
                portrait: reader.read_u8()?,
                name: reader.read_string()?,
            }),
            None => None,
        };

        let mut heroes = Vec::new();
        if version.at_least_ab() {
            reader.skip(1)?;
            let count = reader.read_u32()?;
            heroes.reserve(count.min(64) as usize);
            for _ in 0..count {
                let offset = reader.position();
                let raw = reader.read_u8()?;
                heroes.push(NamedHero {
                    hero: ctx.resolve(reader, Catalog::Hero, u32::from(raw), offset),
                    name: reader.read_string()?,
                });
            }
        }

        Ok(Self {
            color,
            can_be_human,
            can_be_computer,
            setup: Some(PlayerSetup {
                ai_tactic,
                customized_alignment,
                allowed_factions,
                random_faction,
                main_town,
                random_hero,
                lead_hero,
                heroes,
            }),
        })
    }

    /// The eight slots in colour order
    pub(crate) fn read_all(reader: &mut BinaryReader, ctx: &Context) -> Result<Vec<Self>> {
        PlayerColor::ALL
            .into_iter()
            .map(|color| Self::read(reader, ctx, color))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "goal", rename_all = "snake_case")]
pub enum VictoryGoal {
    AcquireArtifact { artifact: Option<Identifier> },
    AccumulateCreatures { creature: Option<Identifier>, count: u32 },
    AccumulateResources { resource: Tagged<Resource>, amount: u32 },
    UpgradeTown { position: Position, hall_level: u8, castle_level: u8 },
    BuildGrail { position: Position },
    DefeatHero { position: Position },
    CaptureTown { position: Position },
    DefeatMonster { position: Position },
    FlagDwellings,
    FlagMines,
    TransportArtifact { artifact: Option<Identifier>, position: Position },
    EliminateMonsters,
    Survive { days: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VictoryCondition {
    /// Defeat every enemy
    Standard,
    Special {
        /// The standard condition also wins
        allow_normal: bool,
        applies_to_ai: bool,
        #[serde(flatten)]
        goal: VictoryGoal,
    },
}

impl VictoryCondition {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        if tag == 0xFF {
            return Ok(VictoryCondition::Standard);
        }
        if tag > 12 {
            return Err(Error::Unsupported {
                offset,
                what: "victory condition",
                tag: u32::from(tag),
            });
        }
        let allow_normal = reader.read_bool()?;
        let applies_to_ai = reader.read_bool()?;

        let goal = match tag {
            0 => VictoryGoal::AcquireArtifact { artifact: ctx.read_id(reader, Catalog::Artifact)? },
            1 => VictoryGoal::AccumulateCreatures {
                creature: ctx.read_id(reader, Catalog::Monster)?,
                count: reader.read_u32()?,
            },
            2 => VictoryGoal::AccumulateResources {
                resource: reader.read_enum(1)?,
                amount: reader.read_u32()?,
            },
            3 => VictoryGoal::UpgradeTown {
                position: reader.read_position()?,
                hall_level: reader.read_u8_in(0, 2, "hall level")?,
                castle_level: reader.read_u8_in(0, 2, "castle level")?,
            },
            4 => VictoryGoal::BuildGrail { position: reader.read_position()? },
            5 => VictoryGoal::DefeatHero { position: reader.read_position()? },
            6 => VictoryGoal::CaptureTown { position: reader.read_position()? },
            7 => VictoryGoal::DefeatMonster { position: reader.read_position()? },
            8 => VictoryGoal::FlagDwellings,
            9 => VictoryGoal::FlagMines,
            10 => VictoryGoal::TransportArtifact {
                artifact: ctx.read_id_u8(reader, Catalog::Artifact)?,
                position: reader.read_position()?,
            },
            11 => VictoryGoal::EliminateMonsters,
            _ => VictoryGoal::Survive { days: reader.read_u32()? },
        };
        Ok(VictoryCondition::Special { allow_normal, applies_to_ai, goal })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LossCondition {
    /// Lose every town and hero
    Standard,
    LoseTown { position: Position },
    LoseHero { position: Position },
    TimeExpires { days: u16 },
}

impl LossCondition {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Self> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        Ok(match tag {
            0xFF => LossCondition::Standard,
            0 => LossCondition::LoseTown { position: reader.read_position()? },
            1 => LossCondition::LoseHero { position: reader.read_position()? },
            2 => LossCondition::TimeExpires { days: reader.read_u16()? },
            _ => {
                return Err(Error::Unsupported {
                    offset,
                    what: "loss condition",
                    tag: u32::from(tag),
                })
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Teams {
    pub count: u8,
    /// Team number per player colour
    pub members: [u8; 8],
}

impl Teams {
    pub(crate) fn read(reader: &mut BinaryReader) -> Result<Option<Self>> {
        let count = reader.read_u8_in(0, 8, "team count")?;
        if count == 0 {
            return Ok(None);
        }
        let mut members = [0u8; 8];
        for member in members.iter_mut() {
            *member = reader.read_u8()?;
        }
        Ok(Some(Self { count, members }))
    }
}

/// Game options stored after the hero lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MapOptions {
    /// HotA: whether special months (plagues, creature months) may occur
    pub special_months: Option<bool>,
    /// HotA 1.7: combat round limit, `None` when unlimited
    pub round_limit: Option<u32>,
}

impl MapOptions {
    pub(crate) fn read(reader: &mut BinaryReader, version: Version) -> Result<Self> {
        reader.skip_zero(31)?;
        let mut options = MapOptions::default();
        if version.is_hota() {
            options.special_months = Some(reader.read_bool()?);
            reader.skip_zero(3)?;
        }
        if version.hota_at_least(1) {
            // Purpose unknown; observed values vary between maps
            reader.skip(1)?;
            reader.skip_zero(5)?;
        }
        if version.hota_at_least(3) {
            let limit = reader.read_u32()?;
            options.round_limit = (limit != u32::MAX).then_some(limit);
        }
        Ok(options)
    }
}
