//! Cross-checks a decoded map against the known object templates.
//!
//! A template the catalog has never seen usually means a map made with a
//! newer editor or a mod. Each unmatched template is reported once, plus
//! once for every object instance that uses it.

use serde::Serialize;

use crate::catalog::{Catalogs, ObjectTemplate};
use crate::codec::Position;
use crate::map::Map;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum Finding {
    /// Declared template with no known counterpart
    UnknownTemplate {
        index: u32,
        animation_file: String,
        id: u32,
        sub_id: u32,
    },
    /// Object placed from an unknown template
    UnknownObject {
        index: usize,
        position: Position,
        template: u32,
    },
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::UnknownTemplate { index, animation_file, id, sub_id } => {
                write!(f, "template #{index} ({animation_file}, {id}/{sub_id}) is not in the catalog")
            }
            Finding::UnknownObject { index, position, template } => write!(
                f,
                "object #{index} at ({}, {}, {}) uses unknown template #{template}",
                position.x, position.y, position.z
            ),
        }
    }
}

/// Every template and object the catalog cannot account for, templates
/// first, each group in map order
pub fn validate(map: &Map, catalogs: &Catalogs) -> Vec<Finding> {
    let resolver = catalogs.bind(map.format());
    let unknown: Vec<bool> = map
        .templates
        .iter()
        .map(|template| resolver.match_templates(template).is_empty())
        .collect();

    let mut findings: Vec<Finding> = map
        .templates
        .iter()
        .zip(&unknown)
        .enumerate()
        .filter(|(_, (_, unknown))| **unknown)
        .map(|(index, (template, _))| unknown_template(index as u32, template))
        .collect();

    for (index, object) in map.objects.iter().enumerate() {
        if unknown.get(object.template as usize).copied().unwrap_or(true) {
            findings.push(Finding::UnknownObject {
                index,
                position: object.position,
                template: object.template,
            });
        }
    }

    tracing::debug!(
        templates = map.templates.len(),
        objects = map.objects.len(),
        findings = findings.len(),
        "validated map"
    );
    findings
}

fn unknown_template(index: u32, template: &ObjectTemplate) -> Finding {
    Finding::UnknownTemplate {
        index,
        animation_file: template.animation_file.clone(),
        id: template.id,
        sub_id: template.sub_id,
    }
}
