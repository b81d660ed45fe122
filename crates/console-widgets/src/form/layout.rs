//! Row grouping of search and button fields.

use super::config::{AreaConfiguration, AreaType};
use super::descriptor::FieldDescriptor;
use std::collections::BTreeMap;

/// Fields that render together on one display row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup<'a> {
    pub row: u32,
    pub search: Vec<&'a FieldDescriptor>,
    pub buttons: Vec<&'a FieldDescriptor>,
}

impl<'a> RowGroup<'a> {
    /// Search fields followed by button fields.
    pub fn fields(&self) -> impl Iterator<Item = &'a FieldDescriptor> + '_ {
        self.search.iter().chain(self.buttons.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.search.len() + self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition the first search area and the first button area by row.
///
/// Rows come out in ascending order. Within a row, search fields precede
/// button fields and each keeps its configuration order.
pub fn group_rows(config: &AreaConfiguration) -> Vec<RowGroup<'_>> {
    let mut rows: BTreeMap<u32, RowGroup<'_>> = BTreeMap::new();

    for area_type in [AreaType::Search, AreaType::Buttons] {
        let Some(area) = config.area(area_type) else {
            continue;
        };
        for field in &area.fields {
            let group = rows.entry(field.row).or_insert_with(|| RowGroup {
                row: field.row,
                search: Vec::new(),
                buttons: Vec::new(),
            });
            match area_type {
                AreaType::Search => group.search.push(field),
                AreaType::Buttons => group.buttons.push(field),
            }
        }
    }

    rows.into_values().collect()
}

/// Interactive field ids in visual order, used for focus traversal.
pub fn focus_order(config: &AreaConfiguration) -> Vec<String> {
    group_rows(config)
        .iter()
        .flat_map(|g| g.fields())
        .filter(|f| f.kind.is_interactive())
        .map(|f| f.id.clone())
        .collect()
}
