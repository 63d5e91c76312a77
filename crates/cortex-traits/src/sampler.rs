//! Seeded per-entity sampling.
//!
//! Every entity draws from its own `ChaCha8Rng`, derived from a run seed and
//! the entity's position in the input. Results are therefore identical no
//! matter how many worker threads split the batch or in which order they run.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::DVec3;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::attribute::AttributeValue;
use crate::collection::SpatialDistribution;
use crate::conditional::{Assignment, AssignmentSummary, Unassigned};
use crate::error::TraitsError;

/// Derive a u64 seed for one entity from the run seed and entity index.
pub fn derive_entity_seed(seed: u64, entity: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    (entity as u64).hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for one entity.
pub fn entity_rng(seed: u64, entity: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_entity_seed(seed, entity))
}

/// Draws an index with probability proportional to `weights[i]`.
///
/// Returns `None` when the weights carry no mass (empty, all zero, or
/// otherwise unusable). Zero-weight entries are never chosen.
pub fn weighted_choice<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    WeightedIndex::new(weights).ok().map(|dist| dist.sample(rng))
}

/// Runs per-entity work with one derived RNG per entity, optionally in parallel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySampler {
    seed: u64,
    /// Worker threads; 0 picks one per CPU.
    threads: usize,
}

impl EntitySampler {
    /// Creates a sampler with an automatic thread count.
    pub fn new(seed: u64) -> Self {
        Self { seed, threads: 0 }
    }

    /// Sets the worker thread count (0 = one per CPU, 1 = run inline).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// The run seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configured thread count.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// RNG for the entity at `entity`.
    pub fn rng_for(&self, entity: usize) -> ChaCha8Rng {
        entity_rng(self.seed, entity)
    }

    fn worker_count(&self, entities: usize) -> usize {
        let threads = if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        };
        threads.clamp(1, entities.max(1))
    }

    /// Computes `f(entity, rng)` for every entity in `0..count`.
    ///
    /// Output order always matches entity order. Entities are split into
    /// contiguous ranges, one per worker thread.
    pub fn map_entities<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize, &mut ChaCha8Rng) -> T + Sync,
    {
        let workers = self.worker_count(count);
        if workers <= 1 {
            return (0..count)
                .map(|entity| f(entity, &mut self.rng_for(entity)))
                .collect();
        }

        let chunk = count.div_ceil(workers);
        let sampler = *self;
        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..count)
                .step_by(chunk)
                .map(|start| {
                    let end = (start + chunk).min(count);
                    scope.spawn(move || {
                        (start..end)
                            .map(|entity| f(entity, &mut sampler.rng_for(entity)))
                            .collect::<Vec<T>>()
                    })
                })
                .collect();

            let mut out = Vec::with_capacity(count);
            for handle in handles {
                match handle.join() {
                    Ok(part) => out.extend(part),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            out
        })
    }
}

impl SpatialDistribution {
    /// Draws a trait for `position` from its group column, without constraints.
    pub fn sample_at<R: Rng + ?Sized>(
        &self,
        position: DVec3,
        voxel_dimensions: DVec3,
        rng: &mut R,
    ) -> Assignment {
        let Some(group) = self.group_for_position(position, voxel_dimensions) else {
            return Assignment::Unassigned(Unassigned::NoDistribution);
        };
        let weights: Vec<f64> = self.distributions().column(group).collect();
        match weighted_choice(&weights, rng) {
            Some(row) => Assignment::Trait(row),
            None => Assignment::Unassigned(Unassigned::ZeroProbability),
        }
    }

    /// Reduces onto `attribute`, samples every position, and returns the
    /// chosen value per position (`None` where nothing could be assigned).
    ///
    /// # Errors
    ///
    /// Returns [`TraitsError::UnknownAttribute`] if `attribute` is not in the
    /// traits schema.
    pub fn assign_attribute(
        &self,
        positions: &[DVec3],
        attribute: &str,
        sampler: &EntitySampler,
    ) -> Result<Vec<Option<AttributeValue>>, TraitsError> {
        let reduced = self.reduce_distribution_collection(attribute)?;
        let assignments = assign_from_spatial_distribution(
            positions,
            &reduced,
            reduced.voxel_dimensions(),
            sampler,
        )?;
        Ok(assignments
            .into_iter()
            .map(|a| a.trait_index().map(|row| reduced.traits().value(row, 0).clone()))
            .collect())
    }
}

/// Samples one unconditioned trait per position, in input order.
///
/// Each position is translated to a voxel with `voxel_dimensions`, its group
/// column is looked up in the collection's field, and a row is drawn weighted
/// by that column.
///
/// # Errors
///
/// Returns [`TraitsError::Voxel`] if `voxel_dimensions` is not positive.
pub fn assign_from_spatial_distribution(
    positions: &[DVec3],
    collection: &SpatialDistribution,
    voxel_dimensions: DVec3,
    sampler: &EntitySampler,
) -> Result<Vec<Assignment>, TraitsError> {
    cortex_voxel::validate_voxel_dimensions(voxel_dimensions)?;
    let assignments = sampler.map_entities(positions.len(), |entity, rng| {
        collection.sample_at(positions[entity], voxel_dimensions, rng)
    });

    let summary = AssignmentSummary::from_assignments(&assignments);
    tracing::debug!(
        entities = positions.len(),
        assigned = summary.assigned,
        unassigned = summary.unassigned(),
        "sampled spatial distribution"
    );
    Ok(assignments)
}
