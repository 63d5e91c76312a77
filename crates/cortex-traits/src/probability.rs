//! Dense probability tables: rows are traits, columns are distribution groups.

use crate::error::TraitsError;

/// Row-major `f64` table where entry `(t, g)` is the probability mass of
/// trait `t` under distribution group `g`.
///
/// Rows carry identity labels alongside the [`TraitTable`](crate::TraitTable)
/// labels; the two are always derived together.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityTable {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
    labels: Vec<usize>,
}

impl ProbabilityTable {
    /// Creates an all-zero table.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            values: vec![0.0; rows * columns],
            labels: (0..rows).collect(),
        }
    }

    /// Creates a table from rows of probabilities.
    ///
    /// An empty `rows` produces a `0 x 0` table; use [`zeros`](Self::zeros)
    /// for rows without columns.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::RowWidth`] if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, TraitsError> {
        let columns = rows.first().map_or(0, Vec::len);
        let mut table = Self::zeros(rows.len(), columns);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != columns {
                return Err(TraitsError::RowWidth {
                    row: r,
                    expected: columns,
                    actual: row.len(),
                });
            }
            table.values[r * columns..(r + 1) * columns].copy_from_slice(&row);
        }
        Ok(table)
    }

    /// Creates a table with `rows` traits from per-group columns.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::RowWidth`] (with `row` naming the column) if a
    /// column does not hold exactly `rows` entries.
    pub fn from_columns(rows: usize, columns: Vec<Vec<f64>>) -> Result<Self, TraitsError> {
        let mut table = Self::zeros(rows, columns.len());
        for (c, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(TraitsError::RowWidth {
                    row: c,
                    expected: rows,
                    actual: column.len(),
                });
            }
            for (r, &p) in column.iter().enumerate() {
                table.set(r, c, p);
            }
        }
        Ok(table)
    }

    /// Number of trait rows.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of distribution-group columns.
    pub fn num_columns(&self) -> usize {
        self.columns
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entry at `(row, column)`.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.columns + column]
    }

    pub(crate) fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[row * self.columns + column] = value;
    }

    pub(crate) fn add(&mut self, row: usize, column: usize, value: f64) {
        self.values[row * self.columns + column] += value;
    }

    /// All entries of one row (one trait across every group).
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.columns..(row + 1) * self.columns]
    }

    /// Iterates over one column (one group across every trait).
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |r| self.get(r, column))
    }

    /// Total mass of one column.
    pub fn column_sum(&self, column: usize) -> f64 {
        self.column(column).sum()
    }

    /// Total mass of every column.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.columns];
        for r in 0..self.rows {
            for (sum, p) in sums.iter_mut().zip(self.row(r)) {
                *sum += p;
            }
        }
        sums
    }

    /// Total mass of one trait, summed over all groups.
    pub fn row_sum(&self, row: usize) -> f64 {
        self.row(row).iter().sum()
    }

    /// Identity labels of the rows.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Copies the given rows (with their labels) into a new table.
    pub(crate) fn select_rows(&self, rows: &[usize]) -> Self {
        let mut values = Vec::with_capacity(rows.len() * self.columns);
        for &r in rows {
            values.extend_from_slice(self.row(r));
        }
        Self {
            rows: rows.len(),
            columns: self.columns,
            values,
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        }
    }
}

/// Rescales every column to sum to 1.
///
/// Columns whose sum is 0 carry no information and pass through unchanged,
/// as do empty tables. Row labels are preserved.
pub fn normalize_distribution_collection(mut table: ProbabilityTable) -> ProbabilityTable {
    let sums = table.column_sums();
    for r in 0..table.rows {
        for (c, &sum) in sums.iter().enumerate() {
            if sum != 0.0 {
                let p = table.get(r, c);
                table.set(r, c, p / sum);
            }
        }
    }
    table
}
