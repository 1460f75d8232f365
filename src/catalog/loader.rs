use std::io;
use std::path::Path;

use super::{parse_name_table, parse_template_definitions, Catalog, Catalogs};
use crate::codec::Format;
use crate::error::Result;

const TEMPLATE_STEM: &str = "objects";

/// Read a table file, treating a missing file as absent
fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Catalogs {
    /// Load every table found in `dir`.
    ///
    /// Default tables live at `<catalog>.txt`, overlays at
    /// `<catalog>.<format>.txt` (e.g. `heroes.sod.txt`), and template
    /// definitions at `objects.txt` / `objects.<format>.txt`. Missing files
    /// leave the corresponding table empty.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Catalogs> {
        let dir = dir.as_ref();
        let mut catalogs = Catalogs::new();

        for catalog in Catalog::ALL {
            let stem = catalog.file_stem();
            let path = dir.join(format!("{stem}.txt"));
            if let Some(text) = read_optional(&path)? {
                let table = parse_name_table(&text, &path.display().to_string())?;
                tracing::debug!(catalog = stem, entries = table.len(), "loaded default name table");
                catalogs.names_mut(catalog).set_default(table);
            }
            for format in Format::ALL {
                let path = dir.join(format!("{stem}.{}.txt", format.short_name()));
                if let Some(text) = read_optional(&path)? {
                    let table = parse_name_table(&text, &path.display().to_string())?;
                    tracing::debug!(catalog = stem, ?format, entries = table.len(), "loaded name overlay");
                    catalogs.names_mut(catalog).set_overlay(format, table);
                }
            }
        }

        let path = dir.join(format!("{TEMPLATE_STEM}.txt"));
        if let Some(text) = read_optional(&path)? {
            let templates = parse_template_definitions(&text, &path.display().to_string())?;
            tracing::debug!(templates = templates.len(), "loaded template definitions");
            catalogs.templates_mut().set_default(templates);
        }
        for format in Format::ALL {
            let path = dir.join(format!("{TEMPLATE_STEM}.{}.txt", format.short_name()));
            if let Some(text) = read_optional(&path)? {
                let templates = parse_template_definitions(&text, &path.display().to_string())?;
                tracing::debug!(?format, templates = templates.len(), "loaded template overlay");
                catalogs.templates_mut().set_overlay(format, templates);
            }
        }

        Ok(catalogs)
    }
}
