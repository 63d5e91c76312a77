//! Row-oriented table of categorical trait attributes.

use crate::attribute::{AttributeValue, TraitKey};
use crate::error::TraitsError;

/// One row per trait, one column per named attribute.
///
/// Every row also carries a label: the trait index it had in the table it was
/// derived from. Fresh tables label rows `0..n`; [`split`] keeps the parent's
/// labels so sub-collection rows can be traced back.
///
/// [`split`]: crate::SpatialDistribution::split_distribution_collection
#[derive(Clone, Debug, PartialEq)]
pub struct TraitTable {
    attributes: Vec<String>,
    rows: Vec<Vec<AttributeValue>>,
    labels: Vec<usize>,
}

impl TraitTable {
    /// Creates an empty table with the given schema.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::DuplicateAttribute`] if a name repeats.
    pub fn new<S: Into<String>>(
        attributes: impl IntoIterator<Item = S>,
    ) -> Result<Self, TraitsError> {
        let attributes: Vec<String> = attributes.into_iter().map(Into::into).collect();
        for (i, name) in attributes.iter().enumerate() {
            if attributes[..i].contains(name) {
                return Err(TraitsError::DuplicateAttribute(name.clone()));
            }
        }
        Ok(Self {
            attributes,
            rows: Vec::new(),
            labels: Vec::new(),
        })
    }

    /// Creates a table from a schema and rows of values in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::RowWidth`] if a row's length differs from the
    /// schema, or [`TraitsError::DuplicateAttribute`].
    pub fn from_rows<S: Into<String>>(
        attributes: impl IntoIterator<Item = S>,
        rows: Vec<Vec<AttributeValue>>,
    ) -> Result<Self, TraitsError> {
        let mut table = Self::new(attributes)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Appends a row, returning its position.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::RowWidth`] if the row does not match the schema.
    pub fn push_row(&mut self, values: Vec<AttributeValue>) -> Result<usize, TraitsError> {
        let row = self.rows.len();
        if values.len() != self.attributes.len() {
            return Err(TraitsError::RowWidth {
                row,
                expected: self.attributes.len(),
                actual: values.len(),
            });
        }
        self.rows.push(values);
        self.labels.push(row);
        Ok(row)
    }

    /// Attribute names in schema order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Returns the column position of `attribute`.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::UnknownAttribute`] if the schema lacks it.
    pub fn attribute_position(&self, attribute: &str) -> Result<usize, TraitsError> {
        self.attributes
            .iter()
            .position(|a| a == attribute)
            .ok_or_else(|| TraitsError::UnknownAttribute(attribute.to_string()))
    }

    /// Number of trait rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the row at `row`, in schema order.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub fn row(&self, row: usize) -> &[AttributeValue] {
        &self.rows[row]
    }

    /// Value of `row` at column position `column`.
    pub fn value(&self, row: usize, column: usize) -> &AttributeValue {
        &self.rows[row][column]
    }

    /// Value of `row` for the named attribute.
    pub fn get(&self, row: usize, attribute: &str) -> Result<&AttributeValue, TraitsError> {
        let column = self.attribute_position(attribute)?;
        Ok(self.value(row, column))
    }

    /// Identity label of `row` (its trait index in the originating table).
    pub fn label(&self, row: usize) -> usize {
        self.labels[row]
    }

    /// All row labels, in row order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Builds the grouping key of `row` over the given column positions.
    pub fn key(&self, row: usize, columns: &[usize]) -> TraitKey {
        TraitKey::new(columns.iter().map(|&c| self.value(row, c).clone()).collect())
    }

    /// Copies the given rows (with their labels) into a new table.
    pub(crate) fn select(&self, rows: &[usize]) -> Self {
        Self {
            attributes: self.attributes.clone(),
            rows: rows.iter().map(|&r| self.rows[r].clone()).collect(),
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> TraitTable {
        TraitTable::from_rows(
            ["name", "type"],
            vec![
                vec!["a".into(), "x".into()],
                vec!["b".into(), "y".into()],
                vec!["c".into(), "y".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_by_attribute_name() {
        let table = abc();
        assert_eq!(table.get(1, "type").unwrap(), &AttributeValue::from("y"));
        assert_eq!(
            table.get(0, "color"),
            Err(TraitsError::UnknownAttribute("color".into()))
        );
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = TraitTable::from_rows(["name"], vec![vec!["a".into(), "x".into()]]);
        assert_eq!(
            result,
            Err(TraitsError::RowWidth {
                row: 0,
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        assert_eq!(
            TraitTable::new(["name", "name"]),
            Err(TraitsError::DuplicateAttribute("name".into()))
        );
    }

    #[test]
    fn test_select_keeps_labels() {
        let sub = abc().select(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.labels(), &[2, 0]);
        assert_eq!(sub.row(0)[0], AttributeValue::from("c"));
    }

    #[test]
    fn test_key_follows_column_order() {
        let table = abc();
        let key = table.key(1, &[1, 0]);
        assert_eq!(key, ["y", "b"].into_iter().collect::<TraitKey>());
    }
}
