//! Name and template catalogs, and the per-decode resolver bound to one
//! map format.

mod loader;
pub mod names;
pub mod template;

use std::fmt;

use ahash::AHashMap;
use serde::Serialize;

use crate::codec::Format;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};

pub use names::{parse_name_table, NameTable};
pub use template::{
    parse_template_definitions, EditorCategory, ObjectTemplate, OccupancyMask, TerrainMask,
};

/// The id spaces a map refers to by number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    Hero,
    Spell,
    Artifact,
    Monster,
    /// Level 1 creature generators (object id 17)
    Generator1,
    /// Multi-creature generators (object id 20)
    Generator4,
}

impl Catalog {
    pub const ALL: [Catalog; 6] = [
        Catalog::Hero,
        Catalog::Spell,
        Catalog::Artifact,
        Catalog::Monster,
        Catalog::Generator1,
        Catalog::Generator4,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// File stem of the table files for this catalog
    pub fn file_stem(self) -> &'static str {
        match self {
            Catalog::Hero => "heroes",
            Catalog::Spell => "spells",
            Catalog::Artifact => "artifacts",
            Catalog::Monster => "monsters",
            Catalog::Generator1 => "generators1",
            Catalog::Generator4 => "generators4",
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A resolved numeric reference. Equality and hashing look at `value`
/// only; `name` is whatever the catalog knew about it.
#[derive(Debug, Clone, Serialize)]
pub struct Identifier {
    pub value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identifier {
    pub fn new(value: u32) -> Self {
        Self { value, name: None }
    }

    pub fn named(value: u32, name: impl Into<String>) -> Self {
        Self { value, name: Some(name.into()) }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

type TemplateLayer = AHashMap<String, Vec<ObjectTemplate>>;

/// Known object templates: a default set plus per-format overlays, each
/// indexed by lowercased animation file name.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    default: TemplateLayer,
    overlays: AHashMap<Format, TemplateLayer>,
}

fn layer(templates: Vec<ObjectTemplate>) -> TemplateLayer {
    let mut by_file = TemplateLayer::new();
    for template in templates {
        by_file.entry(template.key()).or_insert_with(Vec::new).push(template);
    }
    by_file
}

impl TemplateTable {
    pub fn set_default(&mut self, templates: Vec<ObjectTemplate>) {
        self.default = layer(templates);
    }

    pub fn set_overlay(&mut self, format: Format, templates: Vec<ObjectTemplate>) {
        self.overlays.insert(format, layer(templates));
    }

    pub fn len(&self) -> usize {
        self.default.values().map(Vec::len).sum::<usize>()
            + self
                .overlays
                .values()
                .flat_map(|l| l.values())
                .map(Vec::len)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every table the decoder can consult. Built once, then shared read-only
/// between decodes; each decode binds its own [`Resolver`].
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    names: [NameTable; 6],
    templates: TemplateTable,
}

impl Catalogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self, catalog: Catalog) -> &NameTable {
        &self.names[catalog.index()]
    }

    pub fn names_mut(&mut self, catalog: Catalog) -> &mut NameTable {
        &mut self.names[catalog.index()]
    }

    pub fn set_names(&mut self, catalog: Catalog, table: NameTable) {
        self.names[catalog.index()] = table;
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateTable {
        &mut self.templates
    }

    /// Build the lookup chains for one format. The returned resolver
    /// borrows the tables and is never reconfigured.
    pub fn bind(&self, format: Format) -> Resolver<'_> {
        let names = Catalog::ALL.map(|catalog| {
            let table = self.names(catalog);
            NameChain {
                tables: format
                    .fallback_chain()
                    .iter()
                    .filter_map(|f| table.overlay(*f))
                    .chain(std::iter::once(table.default_table()))
                    .collect(),
                configured: !table.is_empty(),
            }
        });
        let templates = format
            .fallback_chain()
            .iter()
            .filter_map(|f| self.templates.overlays.get(f))
            .chain(std::iter::once(&self.templates.default))
            .collect();
        Resolver { format, names, templates }
    }
}

#[derive(Debug)]
struct NameChain<'a> {
    tables: Vec<&'a AHashMap<u32, String>>,
    configured: bool,
}

/// Catalog lookups for one format, most specific table first
#[derive(Debug)]
pub struct Resolver<'a> {
    format: Format,
    names: [NameChain<'a>; 6],
    templates: Vec<&'a TemplateLayer>,
}

impl<'a> Resolver<'a> {
    pub fn format(&self) -> Format {
        self.format
    }

    /// First name found along the chain, without reporting anything
    pub fn lookup(&self, catalog: Catalog, raw: u32) -> Option<&'a str> {
        self.names[catalog.index()]
            .tables
            .iter()
            .copied()
            .find_map(|t| t.get(&raw))
            .map(String::as_str)
    }

    /// Resolve a raw id. A miss is reported unless the catalog has no
    /// entries at all.
    pub fn resolve(
        &self,
        catalog: Catalog,
        raw: u32,
        sink: &dyn DiagnosticSink,
        offset: u64,
    ) -> Identifier {
        match self.lookup(catalog, raw) {
            Some(name) => Identifier::named(raw, name),
            None => {
                if self.names[catalog.index()].configured {
                    sink.report(
                        Diagnostic::new(
                            DiagnosticKind::UnresolvedName,
                            offset,
                            format!("no {catalog} entry for id"),
                        )
                        .with_value(raw as i64),
                    );
                }
                Identifier::new(raw)
            }
        }
    }

    /// Known templates equal to `candidate`, from the first layer along the
    /// chain that has any. Empty when nothing matches.
    pub fn match_templates(&self, candidate: &ObjectTemplate) -> Vec<&'a ObjectTemplate> {
        let key = candidate.key();
        for layer in self.templates.iter().copied() {
            let Some(known) = layer.get(&key) else {
                continue;
            };
            let hits: Vec<_> = known.iter().filter(|t| t.matches(candidate)).collect();
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectSink;

    fn table(entries: &[(u32, &str)]) -> AHashMap<u32, String> {
        entries.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_hota_stops_at_sod() {
        let mut catalogs = Catalogs::new();
        let heroes = catalogs.names_mut(Catalog::Hero);
        heroes.set_overlay(Format::SoD, table(&[(7, "Sir Mullich")]));
        heroes.set_overlay(Format::RoE, table(&[(7, "Mullich"), (8, "Adela")]));

        let resolver = catalogs.bind(Format::HotA);
        let sink = CollectSink::new();
        let id = resolver.resolve(Catalog::Hero, 7, &sink, 0);
        assert_eq!(id.name.as_deref(), Some("Sir Mullich"));
        assert_eq!(resolver.resolve(Catalog::Hero, 8, &sink, 0).name.as_deref(), Some("Adela"));
        assert!(sink.is_empty());

        let roe = catalogs.bind(Format::RoE);
        assert_eq!(roe.lookup(Catalog::Hero, 7), Some("Mullich"));
    }

    #[test]
    fn test_default_is_terminal() {
        let mut catalogs = Catalogs::new();
        catalogs.set_names(Catalog::Spell, NameTable::with_default(table(&[(0, "Summon Boat")])));
        catalogs
            .names_mut(Catalog::Spell)
            .set_overlay(Format::WoG, table(&[(1, "Scuttle Boat")]));

        let wog = catalogs.bind(Format::WoG);
        assert_eq!(wog.lookup(Catalog::Spell, 0), Some("Summon Boat"));
        assert_eq!(wog.lookup(Catalog::Spell, 1), Some("Scuttle Boat"));
        assert_eq!(catalogs.bind(Format::SoD).lookup(Catalog::Spell, 1), None);
    }

    #[test]
    fn test_miss_reported_only_when_configured() {
        let mut catalogs = Catalogs::new();
        catalogs.set_names(Catalog::Artifact, NameTable::with_default(table(&[(0, "Grail")])));
        let resolver = catalogs.bind(Format::AB);
        let sink = CollectSink::new();

        let id = resolver.resolve(Catalog::Monster, 12, &sink, 4);
        assert_eq!(id, Identifier::new(12));
        assert!(id.name.is_none());
        assert!(sink.is_empty());

        let id = resolver.resolve(Catalog::Artifact, 99, &sink, 4);
        assert!(id.name.is_none());
        assert_eq!(sink.count(DiagnosticKind::UnresolvedName), 1);
    }

    #[test]
    fn test_identifier_equality_ignores_name() {
        assert_eq!(Identifier::named(3, "Orrin"), Identifier::new(3));
        assert_ne!(Identifier::new(3), Identifier::new(4));
    }

    #[test]
    fn test_match_templates() {
        let line = "AVWmrnd0.def 111111111111111111111111111111111111111111111101 000000000000000000000000000000000000000000000001 111111111 100000000 54 0 1 0";
        let known = ObjectTemplate::parse_line(line).unwrap();
        let mut catalogs = Catalogs::new();
        catalogs.templates_mut().set_default(vec![known.clone()]);

        let resolver = catalogs.bind(Format::SoD);
        let mut candidate = known.clone();
        candidate.animation_file = "AVWMRND0.DEF".to_string();
        assert_eq!(resolver.match_templates(&candidate).len(), 1);

        candidate.sub_id = 3;
        assert!(resolver.match_templates(&candidate).is_empty());
    }

    #[test]
    fn test_template_overlay_wins() {
        let line = "AVXprsn0.def 000000000000000000000000000000000000000000000000 000000000000000000000000000000000000000000000100 111111111 100000000 62 0 0 0";
        let prison = ObjectTemplate::parse_line(line).unwrap();
        let mut catalogs = Catalogs::new();
        catalogs.templates_mut().set_overlay(Format::HotA, vec![prison.clone()]);
        catalogs.templates_mut().set_default(vec![prison.clone()]);

        let hits = catalogs.bind(Format::HotA).match_templates(&prison);
        assert_eq!(hits.len(), 1);
        assert!(catalogs.bind(Format::RoE).match_templates(&prison).len() == 1);
        assert_eq!(catalogs.templates().len(), 2);
    }
}
