use indexmap::IndexMap;
use lib_table::{TableRow, TableStore};

use crate::{
    error::AppResult, registry::ModelRegistry, verdict::Verdict, writer::ResultWriter,
};

/// A row queued for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub row_index: usize,
    pub image_url: String,
}

/// Rows bound for one remote model, in dataset order. Chunk results are
/// mapped back positionally, so member order must match the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub model_id: String,
    pub threshold: f32,
    pub members: Vec<GroupMember>,
}

/// Single pass over the dataset: rows missing a url or category, or already
/// carrying a verdict, are skipped untouched; rows whose category has no
/// registered model get `UnknownCategory` written straight away and are not
/// grouped; everything else lands in the group keyed by its remote model id.
/// Group order is first-seen.
pub fn group_rows<S: TableStore>(
    rows: &[TableRow],
    registry: &ModelRegistry,
    writer: &mut ResultWriter<'_, S>,
) -> AppResult<IndexMap<String, Group>> {
    let mut groups: IndexMap<String, Group> = IndexMap::new();

    for row in rows {
        if row.image_url.is_empty() || row.category.is_empty() || !row.verdict.is_empty() {
            continue;
        }

        let Some(model) = registry.lookup(&row.category) else {
            tracing::warn!(
                "No model registered for category '{}' (row {})",
                row.category,
                row.index
            );
            writer.write(row.index, &Verdict::UnknownCategory)?;
            continue;
        };

        groups
            .entry(model.model_id.clone())
            .or_insert_with(|| Group {
                model_id: model.model_id.clone(),
                threshold: model.threshold,
                members: Vec::new(),
            })
            .members
            .push(GroupMember {
                row_index: row.index,
                image_url: row.image_url.clone(),
            });
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker_config::ModelEntry;
    use lib_table::MemoryTable;

    fn registry() -> ModelRegistry {
        ModelRegistry::from_entries(&[
            ModelEntry {
                category: "Grill".to_string(),
                id: "grill-model".to_string(),
                threshold: 0.93,
            },
            ModelEntry {
                category: "Piping".to_string(),
                id: "piping-model".to_string(),
                threshold: 0.92,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_incomplete_and_processed_rows_are_left_untouched() {
        let mut table = MemoryTable::from_cells(&[
            ("", "Grill", ""),
            ("http://b", "", ""),
            ("http://c", "Grill", "✅ grill (95.0%)"),
            ("http://d", "Grill", ""),
        ]);
        let rows = table.read_rows().unwrap();
        let registry = registry();

        let mut writer = ResultWriter::new(&mut table);
        let groups = group_rows(&rows, &registry, &mut writer).unwrap();

        let grill = &groups["grill-model"];
        assert_eq!(grill.members.len(), 1);
        assert_eq!(grill.members[0].row_index, 3);

        // Skips had no side effects.
        assert_eq!(writer.rows_written(), 0);
        assert_eq!(table.verdict(0), "");
        assert_eq!(table.verdict(1), "");
        assert_eq!(table.verdict(2), "✅ grill (95.0%)");
    }

    #[test]
    fn test_unknown_category_is_written_immediately_not_grouped() {
        let mut table = MemoryTable::from_cells(&[
            ("http://a", "Ducting", ""),
            ("http://b", "Grill", ""),
        ]);
        let rows = table.read_rows().unwrap();
        let registry = registry();

        let mut writer = ResultWriter::new(&mut table);
        let groups = group_rows(&rows, &registry, &mut writer).unwrap();

        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("grill-model"));
        assert_eq!(table.verdict(0), "❌ Unknown type");
        assert_eq!(table.verdict(1), "");
    }

    #[test]
    fn test_member_and_group_order_follow_the_dataset() {
        let mut table = MemoryTable::from_cells(&[
            ("http://a", "Grill", ""),
            ("http://b", "Piping", ""),
            ("http://c", "Grill", ""),
            ("http://d", "Piping", ""),
        ]);
        let rows = table.read_rows().unwrap();
        let registry = registry();

        let mut writer = ResultWriter::new(&mut table);
        let groups = group_rows(&rows, &registry, &mut writer).unwrap();

        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec!["grill-model", "piping-model"]);

        let grill_rows: Vec<_> = groups["grill-model"]
            .members
            .iter()
            .map(|m| m.row_index)
            .collect();
        assert_eq!(grill_rows, vec![0, 2]);

        let piping_rows: Vec<_> = groups["piping-model"]
            .members
            .iter()
            .map(|m| m.row_index)
            .collect();
        assert_eq!(piping_rows, vec![1, 3]);

        assert_eq!(groups["grill-model"].threshold, 0.93);
    }
}
