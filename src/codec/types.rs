use serde::Serialize;

/// An enumeration that is stored on the wire as a raw integer tag.
pub trait WireEnum: Sized + Copy {
    /// Type name used in diagnostics
    const NAME: &'static str;

    fn from_raw(raw: u32) -> Option<Self>;

    fn raw(self) -> u32;
}

/// A tag value as read from the stream: either a recognised variant or
/// the raw number when the value falls outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Tagged<T> {
    Known(T),
    Unknown(u32),
}

impl<T: WireEnum> Tagged<T> {
    pub fn from_raw(raw: u32) -> Self {
        match T::from_raw(raw) {
            Some(v) => Self::Known(v),
            None => Self::Unknown(raw),
        }
    }

    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown(_) => None,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Known(v) => v.raw(),
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl<T> From<T> for Tagged<T> {
    fn from(v: T) -> Self {
        Self::Known(v)
    }
}

wire_enum! {
    /// Map format generation, stored as the first u32 of the stream
    pub enum Format {
        RoE = 0x0E,
        AB = 0x15,
        SoD = 0x1C,
        HotA = 0x20,
        WoG = 0x33,
    }
}

impl Format {
    pub const ALL: [Format; 5] = [Format::RoE, Format::AB, Format::SoD, Format::HotA, Format::WoG];

    /// True for every format that carries the Armageddon's Blade additions
    pub fn at_least_ab(self) -> bool {
        !matches!(self, Format::RoE)
    }

    /// True for every format that carries the Shadow of Death additions.
    /// HotA and WoG both branch off SoD.
    pub fn at_least_sod(self) -> bool {
        matches!(self, Format::SoD | Format::HotA | Format::WoG)
    }

    /// Width of spell/artifact/monster references
    pub fn id_width(self) -> IdWidth {
        if self.at_least_ab() {
            IdWidth::Word
        } else {
            IdWidth::Byte
        }
    }

    /// Overlay lookup order for name and template tables, most specific
    /// first. The universal default table always follows the last entry.
    pub fn fallback_chain(self) -> &'static [Format] {
        match self {
            Format::RoE => &[Format::RoE],
            Format::AB => &[Format::AB, Format::RoE],
            Format::SoD => &[Format::SoD, Format::AB, Format::RoE],
            Format::HotA => &[Format::HotA, Format::SoD, Format::AB, Format::RoE],
            Format::WoG => &[Format::WoG, Format::SoD, Format::AB, Format::RoE],
        }
    }

    /// Short lowercase name used in table file names
    pub fn short_name(self) -> &'static str {
        match self {
            Format::RoE => "roe",
            Format::AB => "ab",
            Format::SoD => "sod",
            Format::HotA => "hota",
            Format::WoG => "wog",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.short_name().eq_ignore_ascii_case(name))
    }
}

/// The format tag together with the HotA sub-revision, which gates
/// additional fields inside the HotA branch only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Version {
    pub format: Format,
    pub hota_revision: Option<u32>,
}

impl Version {
    pub fn new(format: Format) -> Self {
        Self { format, hota_revision: None }
    }

    pub fn hota(revision: u32) -> Self {
        Self { format: Format::HotA, hota_revision: Some(revision) }
    }

    pub fn at_least_ab(self) -> bool {
        self.format.at_least_ab()
    }

    pub fn at_least_sod(self) -> bool {
        self.format.at_least_sod()
    }

    pub fn is_hota(self) -> bool {
        self.format == Format::HotA
    }

    /// True only for HotA maps at or above the given sub-revision
    pub fn hota_at_least(self, revision: u32) -> bool {
        matches!(self.hota_revision, Some(r) if r >= revision)
    }

    pub fn id_width(self) -> IdWidth {
        self.format.id_width()
    }
}

/// Encoded width of a version-dependent identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdWidth {
    /// One byte, 0xFF means absent
    Byte,
    /// Two bytes, 0xFFFF means absent
    Word,
}

impl IdWidth {
    pub fn bytes(self) -> usize {
        match self {
            IdWidth::Byte => 1,
            IdWidth::Word => 2,
        }
    }

    pub fn sentinel(self) -> u32 {
        match self {
            IdWidth::Byte => 0xFF,
            IdWidth::Word => 0xFFFF,
        }
    }
}

wire_enum! {
    /// Player colour, also used as the owner of flaggable objects
    pub enum PlayerColor {
        Red = 0,
        Blue = 1,
        Tan = 2,
        Green = 3,
        Orange = 4,
        Purple = 5,
        Teal = 6,
        Pink = 7,
    }
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 8] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Tan,
        PlayerColor::Green,
        PlayerColor::Orange,
        PlayerColor::Purple,
        PlayerColor::Teal,
        PlayerColor::Pink,
    ];
}

wire_enum! {
    pub enum Resource {
        Wood = 0,
        Mercury = 1,
        Ore = 2,
        Sulfur = 3,
        Crystal = 4,
        Gems = 5,
        Gold = 6,
    }
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Wood,
        Resource::Mercury,
        Resource::Ore,
        Resource::Sulfur,
        Resource::Crystal,
        Resource::Gems,
        Resource::Gold,
    ];
}

wire_enum! {
    /// Town faction. Conflux arrived with AB, Cove with HotA.
    pub enum Faction {
        Castle = 0,
        Rampart = 1,
        Tower = 2,
        Inferno = 3,
        Necropolis = 4,
        Dungeon = 5,
        Stronghold = 6,
        Fortress = 7,
        Conflux = 8,
        Cove = 9,
    }
}

/// Tile coordinate; `z` is 0 for the surface and 1 for the underground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl Position {
    pub fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }
}
