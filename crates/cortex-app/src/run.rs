//! One assignment run: positions in, one attribute value per position out.

use std::path::Path;

use cortex_config::Config;
use cortex_traits::{
    AssignmentSummary, AttributeValue, EntitySampler, RecipeLoader, RonRecipe,
    SYNAPSE_CLASS_ATTRIBUTE, SpatialDistribution, SynapseClass, assign_from_spatial_distribution,
    assign_synapse_class_randomly, parse_synapse_classes,
};
use glam::DVec3;
use tracing::{info, warn};

use crate::error::AppError;

/// Reads a RON list of `(x, y, z)` tuples.
pub fn load_positions(path: &Path) -> Result<Vec<DVec3>, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|source| AppError::ReadPositions {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Vec<(f64, f64, f64)> = ron::from_str(&contents).map_err(AppError::ParsePositions)?;
    info!("Loaded {} positions from {}", raw.len(), path.display());
    Ok(raw
        .into_iter()
        .map(|(x, y, z)| DVec3::new(x, y, z))
        .collect())
}

/// Assigns `config.recipe.attribute` to every position by sampling the
/// reduced recipe.
pub fn assign_from_recipe(
    config: &Config,
    positions: &[DVec3],
) -> Result<Vec<Option<AttributeValue>>, AppError> {
    let recipe = RonRecipe::new(&config.recipe.path).load()?;
    let attribute = config.recipe.attribute.as_str();
    let values = assign_attribute_logged(&recipe, attribute, positions, &sampler(config))?;
    if attribute != SYNAPSE_CLASS_ATTRIBUTE {
        return Ok(values);
    }
    Ok(parse_synapse_classes(&values)?
        .into_iter()
        .map(|class| class.map(|c| AttributeValue::from(c.name())))
        .collect())
}

/// Flips one coin per position using `config.synapse.inhibitory_proportion`.
pub fn assign_synapse_classes(
    config: &Config,
    positions: &[DVec3],
) -> Result<Vec<Option<AttributeValue>>, AppError> {
    let mut rng = sampler(config).rng_for(0);
    let classes = assign_synapse_class_randomly(
        positions.len(),
        config.synapse.inhibitory_proportion,
        &mut rng,
    )?;
    let inhibitory = classes
        .iter()
        .filter(|c| **c == SynapseClass::Inhibitory)
        .count();
    info!(
        "Assigned synapse classes: {} inhibitory, {} excitatory",
        inhibitory,
        classes.len() - inhibitory
    );
    Ok(classes
        .into_iter()
        .map(|c| Some(AttributeValue::from(c.name())))
        .collect())
}

fn sampler(config: &Config) -> EntitySampler {
    EntitySampler::new(config.sampling.seed).with_threads(config.sampling.threads)
}

fn assign_attribute_logged(
    recipe: &SpatialDistribution,
    attribute: &str,
    positions: &[DVec3],
    sampler: &EntitySampler,
) -> Result<Vec<Option<AttributeValue>>, AppError> {
    let reduced = recipe.reduce_distribution_collection(attribute)?;
    let assignments = assign_from_spatial_distribution(
        positions,
        &reduced,
        reduced.voxel_dimensions(),
        sampler,
    )?;

    let summary = AssignmentSummary::from_assignments(&assignments);
    info!(
        "Assigned {attribute} to {} of {} positions ({} values)",
        summary.assigned,
        assignments.len(),
        reduced.traits().len()
    );
    if summary.unassigned() > 0 {
        warn!(
            no_distribution = summary.no_distribution,
            zero_probability = summary.zero_probability,
            no_compatible_trait = summary.no_compatible_trait,
            "{} positions left unassigned",
            summary.unassigned()
        );
    }

    Ok(assignments
        .into_iter()
        .map(|a| a.trait_index().map(|row| reduced.traits().value(row, 0).clone()))
        .collect())
}

/// Serializes the values as a RON list and writes them to `output`, or stdout.
pub fn write_output(
    values: &[Option<AttributeValue>],
    output: Option<&Path>,
) -> Result<(), AppError> {
    let serialized = ron::ser::to_string_pretty(values, ron::ser::PrettyConfig::new())
        .map_err(AppError::Serialize)?;
    match output {
        Some(path) => {
            std::fs::write(path, serialized).map_err(AppError::WriteOutput)?;
            info!("Wrote {} assignments to {}", values.len(), path.display());
        }
        None => println!("{serialized}"),
    }
    Ok(())
}
