use bitflags::bitflags;
use serde::Serialize;

use crate::codec::{BinaryReader, Position, Tagged};
use crate::error::Result;

wire_enum! {
    pub enum TerrainType {
        Dirt = 0,
        Sand = 1,
        Grass = 2,
        Snow = 3,
        Swamp = 4,
        Rough = 5,
        Subterranean = 6,
        Lava = 7,
        Water = 8,
        Rock = 9,
        Highlands = 10,
        Wasteland = 11,
    }
}

wire_enum! {
    pub enum RiverType {
        NoRiver = 0,
        Clear = 1,
        Icy = 2,
        Muddy = 3,
        Lava = 4,
    }
}

wire_enum! {
    pub enum RoadType {
        NoRoad = 0,
        Dirt = 1,
        Gravel = 2,
        Cobblestone = 3,
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct MirrorFlags: u8 {
        const TERRAIN_HORIZONTAL = 1 << 0;
        const TERRAIN_VERTICAL = 1 << 1;
        const RIVER_HORIZONTAL = 1 << 2;
        const RIVER_VERTICAL = 1 << 3;
        const ROAD_HORIZONTAL = 1 << 4;
        const ROAD_VERTICAL = 1 << 5;
        /// Water tile drawn as shoreline
        const SHORE = 1 << 6;
        const FAVORABLE_WINDS = 1 << 7;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub terrain: Tagged<TerrainType>,
    /// Picture index within the terrain's sprite sheet
    pub variant: u8,
    pub river: Tagged<RiverType>,
    pub river_dir: u8,
    pub road: Tagged<RoadType>,
    pub road_dir: u8,
    pub mirror: MirrorFlags,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            terrain: Tagged::Known(TerrainType::Dirt),
            variant: 0,
            river: Tagged::Known(RiverType::NoRiver),
            river_dir: 0,
            road: Tagged::Known(RoadType::NoRoad),
            road_dir: 0,
            mirror: MirrorFlags::empty(),
        }
    }
}

impl Tile {
    fn read(reader: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            terrain: reader.read_enum(1)?,
            variant: reader.read_u8()?,
            river: reader.read_enum(1)?,
            river_dir: reader.read_u8()?,
            road: reader.read_enum(1)?,
            road_dir: reader.read_u8()?,
            mirror: MirrorFlags::from_bits_retain(reader.read_u8()?),
        })
    }

    /// River piece index, when the tile has a river
    pub fn river_direction(&self) -> Option<u8> {
        (self.river != Tagged::Known(RiverType::NoRiver)).then_some(self.river_dir)
    }

    /// Road piece index, when the tile has a road
    pub fn road_direction(&self) -> Option<u8> {
        (self.road != Tagged::Known(RoadType::NoRoad)).then_some(self.road_dir)
    }
}

/// One level of square terrain, stored row by row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileGrid {
    pub size: u32,
    pub tiles: Vec<Tile>,
}

impl TileGrid {
    pub(crate) fn read(reader: &mut BinaryReader, size: u32) -> Result<Self> {
        let count = size as usize * size as usize;
        // The size is only range-checked softly; let the stream prove it
        let mut tiles = Vec::with_capacity(count.min(256 * 256));
        for _ in 0..count {
            tiles.push(Tile::read(reader)?);
        }
        Ok(Self { size, tiles })
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Tile> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.tiles.get((y * self.size + x) as usize)
    }

    /// Tiles with their location; `level` fills in `z`. Tiles whose
    /// coordinates do not fit a wire position (maps wider than 256) are
    /// left out; use [`TileGrid::get`] to reach them.
    pub fn iter(&self, level: u8) -> impl Iterator<Item = (Position, &Tile)> {
        let size = self.size as usize;
        self.tiles.iter().enumerate().filter_map(move |(i, tile)| {
            let x = u8::try_from(i % size).ok()?;
            let y = u8::try_from(i / size).ok()?;
            Some((Position::new(x, y, level), tile))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Terrain {
    pub ground: TileGrid,
    pub underground: Option<TileGrid>,
}

impl Terrain {
    pub(crate) fn read(reader: &mut BinaryReader, size: u32, two_levels: bool) -> Result<Self> {
        let ground = TileGrid::read(reader, size)?;
        let underground = if two_levels {
            Some(TileGrid::read(reader, size)?)
        } else {
            None
        };
        Ok(Self { ground, underground })
    }

    pub fn level(&self, z: u8) -> Option<&TileGrid> {
        match z {
            0 => Some(&self.ground),
            1 => self.underground.as_ref(),
            _ => None,
        }
    }
}
