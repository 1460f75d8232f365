//! Object instances and the payload each object class carries.
//!
//! The payload layout is selected by the template's class id. Classes not
//! listed in [`ObjectClass`] carry no payload bytes at all.

pub mod army;
pub mod common;
pub mod hero;
pub mod quest;
pub mod town;
pub mod treasure;

use serde::Serialize;

use crate::catalog::{Catalog, ObjectTemplate};
use crate::codec::{BinaryReader, Faction, PlayerColor, Position, Resource, Tagged, WireEnum};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::Result;
use crate::map::Context;

pub use army::{
    BankSetup, BankSite, CreatureBankObject, Disposition, DwellingObject, GarrisonObject,
    MonsterBehavior, MonsterObject, MonsterTreasure, RandomDwellingObject,
};
pub use common::{
    CreatureSet, CreatureStack, Formation, Gender, Guard, HeroArtifacts, PrimarySkills, Resources,
    SecondarySkill, SkillLevel,
};
pub use hero::{HeroObject, HeroPlaceholder};
pub use quest::{Quest, QuestGoal, QuestGuard, Reward, SeerHut, SeerTask};
pub use town::{TownBuildings, TownEvent, TownObject};
pub use treasure::{
    AbandonedMineObject, ArtifactObject, BoxContent, EventObject, GrailObject, MessageObject,
    MineObject, ResourceObject, ScholarBonus, ScholarObject, ShrineObject, SpellScrollObject,
    WitchHutObject,
};

use army::RandomDwellingShape;

wire_enum! {
    /// Object class ids that carry a payload
    pub enum ObjectClass {
        Artifact = 5,
        PandorasBox = 6,
        CreatureBank = 16,
        CreatureGenerator1 = 17,
        CreatureGenerator2 = 18,
        CreatureGenerator3 = 19,
        CreatureGenerator4 = 20,
        DerelictShip = 24,
        DragonUtopia = 25,
        Event = 26,
        Garrison = 33,
        Hero = 34,
        Grail = 36,
        Lighthouse = 42,
        MonolithOneWayEntrance = 43,
        MonolithOneWayExit = 44,
        MonolithTwoWay = 45,
        Mine = 53,
        Monster = 54,
        OceanBottle = 59,
        Prison = 62,
        RandomArtifact = 65,
        RandomTreasureArtifact = 66,
        RandomMinorArtifact = 67,
        RandomMajorArtifact = 68,
        RandomRelic = 69,
        RandomHero = 70,
        RandomMonster = 71,
        RandomMonster1 = 72,
        RandomMonster2 = 73,
        RandomMonster3 = 74,
        RandomMonster4 = 75,
        RandomResource = 76,
        RandomTown = 77,
        Resource = 79,
        Scholar = 81,
        SeerHut = 83,
        Crypt = 84,
        Shipwreck = 85,
        Shipyard = 87,
        ShrineOfMagicIncantation = 88,
        ShrineOfMagicGesture = 89,
        ShrineOfMagicThought = 90,
        Sign = 91,
        SpellScroll = 93,
        Town = 98,
        WitchHut = 113,
        RandomMonster5 = 162,
        RandomMonster6 = 163,
        RandomMonster7 = 164,
        HeroPlaceholder = 214,
        QuestGuard = 215,
        RandomDwelling = 216,
        RandomDwellingLevel = 217,
        RandomDwellingFaction = 218,
        Garrison2 = 219,
        AbandonedMine = 220,
    }
}

wire_enum! {
    /// Monolith subtype; portals of one colour connect to each other
    pub enum MonolithColor {
        Blue = 0,
        Pink = 1,
        Orange = 2,
        Yellow = 3,
        Purple = 4,
        Green = 5,
        Red = 6,
        Turquoise = 7,
    }
}

/// Owner of a lighthouse or shipyard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggableObject {
    pub owner: Option<Tagged<PlayerColor>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonolithObject {
    pub color: Tagged<MonolithColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectPayload {
    /// Classes without payload bytes
    Empty,
    Hero(HeroObject),
    Placeholder(HeroPlaceholder),
    Monster(MonsterObject),
    Town(TownObject),
    SeerHut(SeerHut),
    QuestGuard(QuestGuard),
    Event(EventObject),
    PandorasBox(BoxContent),
    Artifact(ArtifactObject),
    SpellScroll(SpellScrollObject),
    Resource(ResourceObject),
    Message(MessageObject),
    Shrine(ShrineObject),
    Grail(GrailObject),
    WitchHut(WitchHutObject),
    Scholar(ScholarObject),
    Garrison(GarrisonObject),
    Mine(MineObject),
    AbandonedMine(AbandonedMineObject),
    Dwelling(DwellingObject),
    RandomDwelling(RandomDwellingObject),
    Flaggable(FlaggableObject),
    CreatureBank(CreatureBankObject),
    Monolith(MonolithObject),
}

impl ObjectPayload {
    /// Decode the payload bytes for an instance of `template`
    pub(crate) fn decode(
        reader: &mut BinaryReader,
        ctx: &Context,
        template: &ObjectTemplate,
    ) -> Result<Self> {
        let Some(class) = template.class() else {
            return Ok(ObjectPayload::Empty);
        };
        let sub_id = template.sub_id;
        let offset = reader.position();

        use ObjectClass as C;
        let payload = match class {
            C::Hero | C::RandomHero | C::Prison => {
                ObjectPayload::Hero(HeroObject::read(reader, ctx)?)
            }
            C::HeroPlaceholder => ObjectPayload::Placeholder(HeroPlaceholder::read(reader, ctx)?),
            C::Monster => {
                let creature = ctx.resolve(reader, Catalog::Monster, sub_id, offset);
                ObjectPayload::Monster(MonsterObject::read(reader, ctx, Some(creature))?)
            }
            C::RandomMonster
            | C::RandomMonster1
            | C::RandomMonster2
            | C::RandomMonster3
            | C::RandomMonster4
            | C::RandomMonster5
            | C::RandomMonster6
            | C::RandomMonster7 => ObjectPayload::Monster(MonsterObject::read(reader, ctx, None)?),
            C::Town => {
                let faction = subtype::<Faction>(reader, class, sub_id);
                ObjectPayload::Town(TownObject::read(reader, ctx, Some(faction))?)
            }
            C::RandomTown => ObjectPayload::Town(TownObject::read(reader, ctx, None)?),
            C::SeerHut => ObjectPayload::SeerHut(SeerHut::read(reader, ctx)?),
            C::QuestGuard => ObjectPayload::QuestGuard(QuestGuard::read(reader, ctx)?),
            C::Event => ObjectPayload::Event(EventObject::read(reader, ctx)?),
            C::PandorasBox => ObjectPayload::PandorasBox(BoxContent::read(reader, ctx)?),
            C::Artifact => {
                let artifact = ctx.resolve(reader, Catalog::Artifact, sub_id, offset);
                ObjectPayload::Artifact(ArtifactObject::read(reader, ctx, Some(artifact))?)
            }
            C::RandomArtifact
            | C::RandomTreasureArtifact
            | C::RandomMinorArtifact
            | C::RandomMajorArtifact
            | C::RandomRelic => ObjectPayload::Artifact(ArtifactObject::read(reader, ctx, None)?),
            C::SpellScroll => ObjectPayload::SpellScroll(SpellScrollObject::read(reader, ctx)?),
            C::Resource => {
                let resource = subtype::<Resource>(reader, class, sub_id);
                ObjectPayload::Resource(ResourceObject::read(reader, ctx, Some(resource))?)
            }
            C::RandomResource => ObjectPayload::Resource(ResourceObject::read(reader, ctx, None)?),
            C::Sign | C::OceanBottle => ObjectPayload::Message(MessageObject::read(reader)?),
            C::ShrineOfMagicIncantation | C::ShrineOfMagicGesture | C::ShrineOfMagicThought => {
                ObjectPayload::Shrine(ShrineObject::read(reader, ctx)?)
            }
            C::Grail => ObjectPayload::Grail(GrailObject::read(reader, sub_id)?),
            C::WitchHut => ObjectPayload::WitchHut(WitchHutObject::read(reader, ctx)?),
            C::Scholar => ObjectPayload::Scholar(ScholarObject::read(reader)?),
            C::Garrison | C::Garrison2 => ObjectPayload::Garrison(GarrisonObject::read(reader, ctx)?),
            // Sub-id 7 of the ordinary mine class is the abandoned mine
            C::Mine if sub_id != 7 => {
                let resource = subtype::<Resource>(reader, class, sub_id);
                ObjectPayload::Mine(MineObject::read(reader, resource)?)
            }
            C::Mine | C::AbandonedMine => {
                ObjectPayload::AbandonedMine(AbandonedMineObject::read(reader)?)
            }
            C::CreatureGenerator1 => {
                let generator = ctx.resolve(reader, Catalog::Generator1, sub_id, offset);
                ObjectPayload::Dwelling(DwellingObject::read(reader, Some(generator))?)
            }
            C::CreatureGenerator4 => {
                let generator = ctx.resolve(reader, Catalog::Generator4, sub_id, offset);
                ObjectPayload::Dwelling(DwellingObject::read(reader, Some(generator))?)
            }
            C::CreatureGenerator2 | C::CreatureGenerator3 => {
                ObjectPayload::Dwelling(DwellingObject::read(reader, None)?)
            }
            C::RandomDwelling => ObjectPayload::RandomDwelling(RandomDwellingObject::read(
                reader,
                RandomDwellingShape { faction_source: true, level_range: true },
            )?),
            C::RandomDwellingLevel => ObjectPayload::RandomDwelling(RandomDwellingObject::read(
                reader,
                RandomDwellingShape { faction_source: true, level_range: false },
            )?),
            C::RandomDwellingFaction => ObjectPayload::RandomDwelling(RandomDwellingObject::read(
                reader,
                RandomDwellingShape { faction_source: false, level_range: true },
            )?),
            C::Lighthouse | C::Shipyard => ObjectPayload::Flaggable(FlaggableObject {
                owner: common::read_owner_padded(reader)?,
            }),
            C::CreatureBank => {
                let site = subtype::<BankSite>(reader, class, sub_id);
                ObjectPayload::CreatureBank(CreatureBankObject::read(reader, ctx, Some(site))?)
            }
            C::DerelictShip | C::DragonUtopia | C::Crypt | C::Shipwreck => {
                ObjectPayload::CreatureBank(CreatureBankObject::read(reader, ctx, None)?)
            }
            C::MonolithOneWayEntrance | C::MonolithOneWayExit | C::MonolithTwoWay => {
                ObjectPayload::Monolith(MonolithObject {
                    color: subtype::<MonolithColor>(reader, class, sub_id),
                })
            }
        };
        Ok(payload)
    }
}

/// Reinterpret a template sub-id as a secondary enumeration. Values outside
/// the known set are kept raw and reported.
fn subtype<T: WireEnum>(reader: &BinaryReader, class: ObjectClass, sub_id: u32) -> Tagged<T> {
    let tag = Tagged::<T>::from_raw(sub_id);
    if !tag.is_known() {
        reader.report(
            Diagnostic::new(
                DiagnosticKind::UnknownSubtype,
                reader.position(),
                format!("{class:?} with unknown {} subtype", T::NAME),
            )
            .with_value(sub_id as i64),
        );
    }
    tag
}

/// One placed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapObject {
    pub position: Position,
    /// Index into the map's template list
    pub template: u32,
    #[serde(flatten)]
    pub payload: ObjectPayload,
}
