//! Foreign-key joins across collections.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;

use crate::model::ID_FIELD;
use crate::model::Value;

use super::Table;

/// Declares a foreign-key relation to resolve during tabular retrieval.
///
/// `field` names the source column holding the foreign record's `_id`;
/// `type_name` is the target collection type it resolves against. Nested
/// relations are resolved on the target table before the merge, enabling
/// chained joins across several collections.
///
/// # Example
///
/// ```
/// use bubble_lib::Relation;
///
/// let relation = Relation::new("fooBar", "barType")
///     .nest(Relation::new("barBaz", "bazType"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    field: String,
    type_name: String,
    nested: Vec<Relation>,
}

impl Relation {
    /// Declares a relation from `field` to the `type_name` collection.
    pub fn new(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            type_name: type_name.into(),
            nested: Vec::new(),
        }
    }

    /// Adds a relation to resolve on the target table first.
    pub fn nest(mut self, relation: Relation) -> Self {
        self.nested.push(relation);
        self
    }

    /// Returns the source field holding the foreign ID.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the target collection type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the relations to resolve on the target table.
    pub fn nested(&self) -> &[Relation] {
        &self.nested
    }
}

/// Left-outer merge of `target` into `source` on
/// `source[field] == target._id`.
///
/// Every target column is prefixed with `{field}_` before the merge, so the
/// target's `_id` lands as `{field}__id`. Rows without a match keep `Null`
/// in all joined columns; the row count of the result equals the source
/// table's. On duplicate target IDs the first occurrence wins.
///
/// A `field` absent from the source table skips the merge with a warning
/// and returns the source unchanged.
pub(crate) fn merge_left(source: Table, target: &Table, field: &str) -> Table {
    let Some(key_column) = source.column_index(field) else {
        warn!(field, "Join skipped: field not present in source table");
        return source;
    };

    let width = target.columns().len();
    let mut index: HashMap<&str, usize> = HashMap::new();
    if let Some(id_column) = target.column_index(ID_FIELD) {
        for (row_index, row) in target.rows().iter().enumerate() {
            let Some(id) = row[id_column].as_str() else {
                continue;
            };
            match index.entry(id) {
                Entry::Vacant(entry) => {
                    entry.insert(row_index);
                }
                Entry::Occupied(_) => {
                    warn!(field, id, "Duplicate target _id in join; keeping first match");
                }
            }
        }
    } else {
        warn!(field, "Target table has no _id column; all rows will be unmatched");
    }

    let (mut columns, rows) = source.into_parts();
    columns.extend(target.columns().iter().map(|c| format!("{field}_{c}")));

    let rows = rows
        .into_iter()
        .map(|mut row| {
            let matched = row[key_column]
                .as_str()
                .and_then(|id| index.get(id))
                .map(|&i| target.rows()[i].clone());
            match matched {
                Some(target_row) => row.extend(target_row),
                None => row.extend(std::iter::repeat_n(Value::Null, width)),
            }
            row
        })
        .collect();

    Table::new(columns, rows)
}
