use std::io;

use crc32fast::Hasher;
use indexmap::IndexMap;
use serde::Serialize;

use crate::catalog::ObjectTemplate;
use crate::map::{Map, Terrain, TimedEvent};
use crate::objects::MapObject;

/// CRC-32 of a map's structural content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u32);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// The parts of a map that make two files "the same map". Name,
/// description and player setup are left out so a re-titled copy still
/// matches.
#[derive(Serialize)]
struct Structure<'a> {
    terrain: &'a Terrain,
    templates: &'a [ObjectTemplate],
    objects: &'a [MapObject],
    events: &'a [TimedEvent],
}

/// Feeds serialized bytes straight into the hasher
struct HashWriter(Hasher);

impl io::Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fingerprint over the JSON form of terrain, templates, objects and events
pub fn fingerprint(map: &Map) -> serde_json::Result<Fingerprint> {
    let structure = Structure {
        terrain: &map.terrain,
        templates: &map.templates,
        objects: &map.objects,
        events: &map.events,
    };
    let mut writer = HashWriter(Hasher::new());
    serde_json::to_writer(&mut writer, &structure)?;
    Ok(Fingerprint(writer.0.finalize()))
}

/// Groups of keys sharing a fingerprint, in order of first appearance.
/// Keys with a unique fingerprint are left out.
pub fn find_duplicates<K>(entries: impl IntoIterator<Item = (K, Fingerprint)>) -> Vec<Vec<K>> {
    let mut groups: IndexMap<Fingerprint, Vec<K>> = IndexMap::new();
    for (key, fingerprint) in entries {
        groups.entry(fingerprint).or_default().push(key);
    }
    groups
        .into_values()
        .filter(|group| group.len() > 1)
        .collect()
}
