//! Seer huts and quest guards.
//!
//! A seer hut carries one or more tasks. Each task is a quest (a tagged
//! union over what the player must do) and, only when a quest is present,
//! a reward (a second tagged union over what the player receives).

use serde::Serialize;

use super::common::{CreatureStack, PrimarySkills, SecondarySkill};
use crate::catalog::{Catalog, Identifier};
use crate::codec::{BinaryReader, PlayerColor, Resource, Tagged};
use crate::error::{Error, Result};
use crate::map::Context;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "goal", rename_all = "snake_case")]
pub enum QuestGoal {
    ExperienceLevel { level: u32 },
    PrimarySkills(PrimarySkills),
    /// Quest identifier of the hero object to defeat
    DefeatHero { target: u32 },
    /// Quest identifier of the monster object to defeat
    DefeatMonster { target: u32 },
    /// One entry per wire slot; `None` where the slot holds the empty id
    Artifacts { artifacts: Vec<Option<Identifier>> },
    Creatures { creatures: Vec<CreatureStack> },
    Resources { amounts: [u32; 7] },
    BeHero { hero: Option<Identifier> },
    BePlayer { player: Tagged<PlayerColor> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    #[serde(flatten)]
    pub goal: QuestGoal,
    /// Last day to complete the quest, -1 for no deadline
    pub deadline: i32,
    pub proposal: String,
    pub progress: String,
    pub completion: String,
}

impl Quest {
    /// Read a tagged quest. Tag 0 means "no quest" and has no body.
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Option<Self>> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let goal = match tag {
            0 => return Ok(None),
            1 => QuestGoal::ExperienceLevel { level: reader.read_u32()? },
            2 => QuestGoal::PrimarySkills(PrimarySkills::read(reader)?),
            3 => QuestGoal::DefeatHero { target: reader.read_u32()? },
            4 => QuestGoal::DefeatMonster { target: reader.read_u32()? },
            5 => {
                let count = reader.read_u8()?;
                let mut artifacts = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    artifacts.push(ctx.read_id(reader, Catalog::Artifact)?);
                }
                QuestGoal::Artifacts { artifacts }
            }
            6 => QuestGoal::Creatures { creatures: CreatureStack::read_list(reader, ctx)? },
            7 => {
                let mut amounts = [0u32; 7];
                for amount in amounts.iter_mut() {
                    *amount = reader.read_u32()?;
                }
                QuestGoal::Resources { amounts }
            }
            8 => QuestGoal::BeHero { hero: ctx.read_id_u8(reader, Catalog::Hero)? },
            9 => QuestGoal::BePlayer { player: reader.read_enum(1)? },
            _ => {
                return Err(Error::Unsupported { offset, what: "quest", tag: tag as u32 });
            }
        };
        Ok(Some(Quest {
            goal,
            deadline: reader.read_i32()?,
            proposal: reader.read_string()?,
            progress: reader.read_string()?,
            completion: reader.read_string()?,
        }))
    }

    /// RoE seer huts only ask for a single artifact and carry no texts
    fn read_artifact_only(reader: &mut BinaryReader, ctx: &Context) -> Result<Option<Self>> {
        let artifact = ctx.read_id(reader, Catalog::Artifact)?;
        Ok(artifact.map(|artifact| Quest {
            goal: QuestGoal::Artifacts { artifacts: vec![Some(artifact)] },
            deadline: -1,
            proposal: String::new(),
            progress: String::new(),
            completion: String::new(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reward", rename_all = "snake_case")]
pub enum Reward {
    Nothing,
    Experience { amount: u32 },
    Mana { amount: u32 },
    Morale { bonus: i8 },
    Luck { bonus: i8 },
    Resource { resource: Tagged<Resource>, amount: u32 },
    PrimarySkill { skill: u8, amount: u8 },
    SecondarySkill(SecondarySkill),
    Artifact { artifact: Option<Identifier> },
    Spell { spell: Option<Identifier> },
    Creatures { creature: Option<Identifier>, count: u16 },
}

impl Reward {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        Ok(match tag {
            0 => Reward::Nothing,
            1 => Reward::Experience { amount: reader.read_u32()? },
            2 => Reward::Mana { amount: reader.read_u32()? },
            3 => Reward::Morale { bonus: reader.read_i8_in(-3, 3, "morale reward")? },
            4 => Reward::Luck { bonus: reader.read_i8_in(-3, 3, "luck reward")? },
            5 => Reward::Resource {
                resource: reader.read_enum(1)?,
                amount: reader.read_u32()?,
            },
            6 => Reward::PrimarySkill {
                skill: reader.read_u8_in(0, 3, "primary skill")?,
                amount: reader.read_u8()?,
            },
            7 => Reward::SecondarySkill(SecondarySkill::read(reader)?),
            8 => Reward::Artifact { artifact: ctx.read_id(reader, Catalog::Artifact)? },
            9 => Reward::Spell { spell: ctx.read_id_u8(reader, Catalog::Spell)? },
            10 => Reward::Creatures {
                creature: ctx.read_id(reader, Catalog::Monster)?,
                count: reader.read_u16()?,
            },
            _ => {
                return Err(Error::Unsupported { offset, what: "reward", tag: tag as u32 });
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeerTask {
    pub quest: Option<Quest>,
    /// Present exactly when `quest` is
    pub reward: Option<Reward>,
    pub repeatable: bool,
}

impl SeerTask {
    fn read(reader: &mut BinaryReader, ctx: &Context, repeatable: bool) -> Result<Self> {
        let quest = if ctx.version.at_least_ab() {
            Quest::read(reader, ctx)?
        } else {
            Quest::read_artifact_only(reader, ctx)?
        };
        let reward = if quest.is_some() {
            Some(Reward::read(reader, ctx)?)
        } else {
            reader.skip_zero(1)?;
            None
        };
        Ok(Self { quest, reward, repeatable })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeerHut {
    pub tasks: Vec<SeerTask>,
}

impl SeerHut {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let mut tasks = Vec::new();
        if ctx.version.hota_at_least(3) {
            let count = reader.read_u32()?;
            for _ in 0..count {
                tasks.push(SeerTask::read(reader, ctx, false)?);
            }
            let repeatable = reader.read_u32()?;
            for _ in 0..repeatable {
                tasks.push(SeerTask::read(reader, ctx, true)?);
            }
        } else {
            tasks.push(SeerTask::read(reader, ctx, false)?);
        }
        reader.skip_zero(2)?;
        Ok(Self { tasks })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestGuard {
    pub quest: Option<Quest>,
}

impl QuestGuard {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        Ok(Self { quest: Quest::read(reader, ctx)? })
    }
}
