//! Partitioning of a collection into independent per-key sub-collections.

use rustc_hash::FxHashMap;

use crate::attribute::TraitKey;
use crate::collection::SpatialDistribution;
use crate::error::TraitsError;
use crate::probability::normalize_distribution_collection;

/// One sub-collection produced by a split, with the value tuple it was built for.
#[derive(Clone, Debug)]
pub struct SplitEntry {
    /// Attribute values shared by every trait in `collection`, in the order
    /// the attributes were requested.
    pub key: TraitKey,
    /// Traits matching `key` with their renormalized distributions.
    pub collection: SpatialDistribution,
}

/// Ordered result of [`SpatialDistribution::split_distribution_collection`].
#[derive(Clone, Debug, Default)]
pub struct SplitCollection {
    entries: Vec<SplitEntry>,
}

impl SplitCollection {
    /// Returns the sub-collection for `key`.
    pub fn get(&self, key: &TraitKey) -> Option<&SpatialDistribution> {
        self.entries
            .iter()
            .find(|e| &e.key == key)
            .map(|e| &e.collection)
    }

    /// Keys in split order.
    pub fn keys(&self) -> impl Iterator<Item = &TraitKey> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Entries in split order.
    pub fn iter(&self) -> std::slice::Iter<'_, SplitEntry> {
        self.entries.iter()
    }

    /// Number of sub-collections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the split produced nothing (no trait rows).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for SplitCollection {
    type Item = SplitEntry;
    type IntoIter = std::vec::IntoIter<SplitEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a SplitCollection {
    type Item = &'a SplitEntry;
    type IntoIter = std::slice::Iter<'a, SplitEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl SpatialDistribution {
    /// Partitions the collection by the value tuple of `attributes`.
    ///
    /// Each sub-collection keeps the matching trait rows (all attributes and
    /// identity labels intact, table order preserved) and their probability
    /// rows. Every column is renormalized over the retained rows; columns with
    /// no retained mass stay all-zero. Keys appear in first-seen order while
    /// scanning rows by descending total mass.
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::EmptyAttributes`] for an empty attribute list and
    /// [`TraitsError::UnknownAttribute`] for names outside the schema.
    pub fn split_distribution_collection<S: AsRef<str>>(
        &self,
        attributes: &[S],
    ) -> Result<SplitCollection, TraitsError> {
        if attributes.is_empty() {
            return Err(TraitsError::EmptyAttributes);
        }
        let columns = attributes
            .iter()
            .map(|a| self.traits().attribute_position(a.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups: Vec<(TraitKey, Vec<usize>)> = Vec::new();
        let mut group_of: FxHashMap<TraitKey, usize> = FxHashMap::default();
        for row in self.rows_by_descending_mass() {
            let key = self.traits().key(row, &columns);
            let g = match group_of.get(&key) {
                Some(&g) => g,
                None => {
                    group_of.insert(key.clone(), groups.len());
                    groups.push((key, Vec::new()));
                    groups.len() - 1
                }
            };
            groups[g].1.push(row);
        }

        let entries: Vec<SplitEntry> = groups
            .into_iter()
            .map(|(key, mut rows)| {
                rows.sort_unstable();
                let distributions =
                    normalize_distribution_collection(self.distributions().select_rows(&rows));
                let traits = self.traits().select(&rows);
                SplitEntry {
                    key,
                    collection: self.derive(distributions, traits),
                }
            })
            .collect();

        tracing::debug!(
            rows = self.traits().len(),
            groups = entries.len(),
            "split distribution collection"
        );
        Ok(SplitCollection { entries })
    }
}
