//! Task descriptor construction.
//!
//! Expands the categorical axes (topic × tone × length) into an ordered task
//! set with dense ids starting at 1. Ids are assigned outer-to-inner, so the
//! same axes always yield the same ids and core parameters.
//!
//! Experimental runs attach a [`TaskVariant`] (structure, ambiguity, noise)
//! to each descriptor. The variant is drawn from a per-descriptor RNG seeded
//! from the base seed and the descriptor id, so the draw never influences id
//! assignment and a fixed seed reproduces it exactly.

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Value used when an optional axis has no candidates.
const UNKNOWN_AXIS_VALUE: &str = "unknown";

/// Mixing constant for per-descriptor seeds (golden ratio, 64-bit).
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Core categorical axes of the task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAxes {
    pub topics: Vec<String>,
    pub tones: Vec<String>,
    pub lengths: Vec<String>,
}

impl Default for TaskAxes {
    fn default() -> Self {
        Self {
            topics: to_strings(&[
                "a project deadline delay",
                "a team meeting reminder",
                "customer issue resolution",
                "interview follow-up",
            ]),
            tones: to_strings(&["Professional", "Friendly", "Sympathetic"]),
            lengths: to_strings(&["Short", "Medium", "Long"]),
        }
    }
}

impl TaskAxes {
    /// Number of descriptors in the full cross-product.
    pub fn combinations(&self) -> usize {
        self.topics.len() * self.tones.len() * self.lengths.len()
    }
}

/// Optional axes used for robustness and diversity experiments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAxes {
    pub structures: Vec<String>,
    pub ambiguity_levels: Vec<String>,
    pub noise_levels: Vec<String>,
}

impl Default for VariantAxes {
    fn default() -> Self {
        Self {
            structures: to_strings(&["paragraph", "bullets", "numbered", "mixed"]),
            ambiguity_levels: to_strings(&["low", "medium", "high"]),
            noise_levels: to_strings(&["low", "medium", "high"]),
        }
    }
}

/// One value per optional axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskVariant {
    pub structure_type: String,
    pub ambiguity_level: String,
    pub noise_level: String,
}

/// Immutable unit of work: one generation request and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    id: u64,
    topic: String,
    tone: String,
    length: String,
    variant: Option<TaskVariant>,
}

impl TaskDescriptor {
    /// Creates a descriptor without optional axes.
    pub fn new(
        id: u64,
        topic: impl Into<String>,
        tone: impl Into<String>,
        length: impl Into<String>,
    ) -> Self {
        Self {
            id,
            topic: topic.into(),
            tone: tone.into(),
            length: length.into(),
            variant: None,
        }
    }

    /// Attaches optional axis values.
    pub fn with_variant(mut self, variant: TaskVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }

    pub fn length(&self) -> &str {
        &self.length
    }

    pub fn variant(&self) -> Option<&TaskVariant> {
        self.variant.as_ref()
    }
}

/// Builds ordered task sets from [`TaskAxes`].
///
/// # Example
///
/// ```
/// use mail_forge::tasks::{TaskAxes, TaskSetBuilder};
///
/// let tasks = TaskSetBuilder::new(TaskAxes::default()).build();
/// assert_eq!(tasks.len(), 36);
/// assert_eq!(tasks[0].id(), 1);
/// assert_eq!(tasks[35].id(), 36);
/// ```
#[derive(Debug, Clone)]
pub struct TaskSetBuilder {
    axes: TaskAxes,
    variants: Option<VariantAxes>,
    seed: Option<u64>,
}

impl TaskSetBuilder {
    /// Creates a builder over the given core axes.
    pub fn new(axes: TaskAxes) -> Self {
        Self {
            axes,
            variants: None,
            seed: None,
        }
    }

    /// Draws one value per optional axis for every descriptor.
    pub fn with_variants(mut self, variants: VariantAxes) -> Self {
        self.variants = Some(variants);
        self
    }

    /// Fixes the base seed for variant draws (None = fresh entropy per build).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the full cross-product.
    pub fn build(&self) -> Vec<TaskDescriptor> {
        self.build_where(|_, _, _| true)
    }

    /// Builds the subset of combinations accepted by `keep`.
    ///
    /// Ids stay dense: the n-th kept combination gets id n.
    pub fn build_where<F>(&self, keep: F) -> Vec<TaskDescriptor>
    where
        F: Fn(&str, &str, &str) -> bool,
    {
        let base_seed = self.seed.unwrap_or_else(|| {
            use rand::RngExt;
            rand::rng().random()
        });

        let mut tasks = Vec::with_capacity(self.axes.combinations());
        let mut next_id = 1u64;

        for topic in &self.axes.topics {
            for tone in &self.axes.tones {
                for length in &self.axes.lengths {
                    if !keep(topic, tone, length) {
                        continue;
                    }

                    let mut task = TaskDescriptor::new(next_id, topic, tone, length);
                    if let Some(ref variants) = self.variants {
                        task = task.with_variant(draw_variant(variants, base_seed, next_id));
                    }
                    tasks.push(task);
                    next_id += 1;
                }
            }
        }

        tracing::debug!(
            tasks = tasks.len(),
            variants = self.variants.is_some(),
            "Built task descriptor set"
        );

        tasks
    }
}

/// Draws a variant from an RNG private to descriptor `id`.
fn draw_variant(axes: &VariantAxes, base_seed: u64, id: u64) -> TaskVariant {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed ^ id.wrapping_mul(SEED_MIX));
    let mut pick = |values: &[String]| {
        values
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_AXIS_VALUE.to_string())
    };

    TaskVariant {
        structure_type: pick(&axes.structures),
        ambiguity_level: pick(&axes.ambiguity_levels),
        noise_level: pick(&axes.noise_levels),
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cross_product_ids_are_dense() {
        let tasks = TaskSetBuilder::new(TaskAxes::default()).build();

        assert_eq!(tasks.len(), 36);
        for (index, task) in tasks.iter().enumerate() {
            assert_eq!(task.id(), index as u64 + 1);
            assert!(task.variant().is_none());
        }
    }

    #[test]
    fn test_enumeration_order_outer_to_inner() {
        let tasks = TaskSetBuilder::new(TaskAxes::default()).build();

        assert_eq!(tasks[0].topic(), "a project deadline delay");
        assert_eq!(tasks[0].tone(), "Professional");
        assert_eq!(tasks[0].length(), "Short");

        assert_eq!(tasks[1].length(), "Medium");
        assert_eq!(tasks[3].tone(), "Friendly");
        assert_eq!(tasks[9].topic(), "a team meeting reminder");
        assert_eq!(tasks[35].topic(), "interview follow-up");
        assert_eq!(tasks[35].tone(), "Sympathetic");
        assert_eq!(tasks[35].length(), "Long");
    }

    #[test]
    fn test_variants_do_not_change_core_parameters() {
        let plain = TaskSetBuilder::new(TaskAxes::default()).build();
        let first = TaskSetBuilder::new(TaskAxes::default())
            .with_variants(VariantAxes::default())
            .with_seed(1)
            .build();
        let second = TaskSetBuilder::new(TaskAxes::default())
            .with_variants(VariantAxes::default())
            .with_seed(2)
            .build();

        for ((p, a), b) in plain.iter().zip(&first).zip(&second) {
            assert_eq!(p.id(), a.id());
            assert_eq!(p.id(), b.id());
            assert_eq!(p.topic(), a.topic());
            assert_eq!(p.tone(), b.tone());
            assert_eq!(p.length(), b.length());
            assert!(a.variant().is_some());
        }
    }

    #[test]
    fn test_fixed_seed_reproduces_variants() {
        let builder = TaskSetBuilder::new(TaskAxes::default())
            .with_variants(VariantAxes::default())
            .with_seed(42);

        assert_eq!(builder.build(), builder.build());
    }

    #[test]
    fn test_variant_draw_independent_of_subset() {
        let builder = TaskSetBuilder::new(TaskAxes::default())
            .with_variants(VariantAxes::default())
            .with_seed(7);

        let full = builder.build();
        let subset = builder.build_where(|topic, _, _| topic == "a project deadline delay");

        assert_eq!(subset.len(), 9);
        for (a, b) in full.iter().zip(&subset) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_subset_ids_stay_dense() {
        let tasks = TaskSetBuilder::new(TaskAxes::default())
            .build_where(|_, tone, length| tone == "Friendly" && length != "Long");

        assert_eq!(tasks.len(), 8);
        let ids: Vec<u64> = tasks.iter().map(TaskDescriptor::id).collect();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_empty_variant_axis_falls_back_to_unknown() {
        let axes = VariantAxes {
            structures: vec![],
            ..VariantAxes::default()
        };
        let tasks = TaskSetBuilder::new(TaskAxes::default())
            .with_variants(axes)
            .with_seed(3)
            .build();

        let variant = tasks[0].variant().expect("variant attached");
        assert_eq!(variant.structure_type, "unknown");
        assert_ne!(variant.noise_level, "unknown");
    }

    #[test]
    fn test_empty_axes_build_nothing() {
        let axes = TaskAxes {
            topics: vec![],
            ..TaskAxes::default()
        };
        assert!(TaskSetBuilder::new(axes).build().is_empty());
    }
}
