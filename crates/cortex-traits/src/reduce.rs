//! Marginalization of a collection onto a single attribute.

use rustc_hash::FxHashMap;

use crate::attribute::AttributeValue;
use crate::collection::SpatialDistribution;
use crate::error::TraitsError;
use crate::probability::ProbabilityTable;
use crate::traits_table::TraitTable;

impl SpatialDistribution {
    /// Collapses the collection onto `attribute`.
    ///
    /// The result has one trait row per distinct value of `attribute` (a
    /// single-column traits table) and the same distribution groups. A row's
    /// mass in each group is the summed mass of every original row sharing
    /// that value, so column totals are unchanged. Rows are ordered by
    /// descending total mass; ties keep first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::UnknownAttribute`] if `attribute` is not in the
    /// traits schema, even when the table is empty.
    pub fn reduce_distribution_collection(
        &self,
        attribute: &str,
    ) -> Result<SpatialDistribution, TraitsError> {
        let column = self.traits().attribute_position(attribute)?;
        let traits = self.traits();
        let distributions = self.distributions();

        let mut groups: Vec<(&AttributeValue, Vec<usize>)> = Vec::new();
        let mut group_of: FxHashMap<&AttributeValue, usize> = FxHashMap::default();
        for row in 0..traits.len() {
            let value = traits.value(row, column);
            let g = *group_of.entry(value).or_insert_with(|| {
                groups.push((value, Vec::new()));
                groups.len() - 1
            });
            groups[g].1.push(row);
        }

        let mass: Vec<f64> = groups
            .iter()
            .map(|(_, rows)| rows.iter().map(|&r| distributions.row_sum(r)).sum())
            .collect();
        let mut order: Vec<usize> = (0..groups.len()).collect();
        order.sort_by(|&a, &b| mass[b].total_cmp(&mass[a]));

        let mut reduced = ProbabilityTable::zeros(groups.len(), distributions.num_columns());
        let mut reduced_traits = TraitTable::new([attribute])?;
        for (new_row, &g) in order.iter().enumerate() {
            let (value, rows) = &groups[g];
            for &r in rows {
                for (c, &p) in distributions.row(r).iter().enumerate() {
                    reduced.add(new_row, c, p);
                }
            }
            reduced_traits.push_row(vec![(*value).clone()])?;
        }

        tracing::debug!(
            attribute,
            rows_in = traits.len(),
            rows_out = groups.len(),
            "reduced distribution collection"
        );
        Ok(self.derive(reduced, reduced_traits))
    }
}
