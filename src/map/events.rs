use serde::Serialize;

use super::Context;
use crate::codec::{BinaryReader, PlayerColor};
use crate::error::Result;
use crate::objects::common::{read_players, Resources};

/// A scheduled event, either map-wide or attached to a town
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimedEvent {
    pub name: String,
    pub message: String,
    pub resources: Resources,
    pub players: Vec<PlayerColor>,
    /// Only stored from SoD on; earlier events always apply to humans
    pub human: bool,
    pub computer: bool,
    pub first_day: u16,
    /// Days between repeats, zero for a one-off event
    pub interval: u8,
}

impl TimedEvent {
    pub(crate) fn read(reader: &mut BinaryReader, ctx: &Context) -> Result<Self> {
        let name = reader.read_string()?;
        let message = reader.read_string()?;
        let resources = Resources::read(reader)?;
        let players = read_players(reader)?;
        let human = if ctx.version.at_least_sod() {
            reader.read_bool()?
        } else {
            true
        };
        let computer = reader.read_bool()?;
        let first_day = reader.read_u16()?;
        let interval = reader.read_u8()?;
        reader.skip_zero(17)?;
        Ok(Self {
            name,
            message,
            resources,
            players,
            human,
            computer,
            first_day,
            interval,
        })
    }

    /// `u32` count followed by the events
    pub(crate) fn read_list(reader: &mut BinaryReader, ctx: &Context) -> Result<Vec<Self>> {
        let count = reader.read_u32()?;
        let mut events = Vec::with_capacity(count.min(256) as usize);
        for _ in 0..count {
            events.push(Self::read(reader, ctx)?);
        }
        Ok(events)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rumor {
    pub name: String,
    pub text: String,
}

impl Rumor {
    pub(crate) fn read_list(reader: &mut BinaryReader) -> Result<Vec<Self>> {
        let count = reader.read_u32()?;
        let mut rumors = Vec::with_capacity(count.min(256) as usize);
        for _ in 0..count {
            rumors.push(Rumor {
                name: reader.read_string()?,
                text: reader.read_string()?,
            });
        }
        Ok(rumors)
    }
}
