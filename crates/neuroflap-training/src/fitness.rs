//! Transforms from a member's raw score to the fitness used for selection.

/// Maps a non-negative raw score to a selection fitness.
///
/// Implementations must be strictly increasing over the score domain so that a member
/// that survives longer is never less likely to be selected.
pub trait FitnessTransform: Send + Sync {
    fn fitness(&self, score: u32) -> f32;
}

impl<F> FitnessTransform for F
where
    F: Fn(u32) -> f32 + Send + Sync,
{
    fn fitness(&self, score: u32) -> f32 {
        self(score)
    }
}

/// Built-in fitness transforms, selectable from configuration.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::FromStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FitnessKind {
    /// `score²`; rewards longevity super-linearly.
    #[default]
    #[display("squared")]
    Squared,
    /// `score`.
    #[display("linear")]
    Linear,
}

impl FitnessTransform for FitnessKind {
    #[expect(clippy::cast_precision_loss)]
    fn fitness(&self, score: u32) -> f32 {
        let score = score as f32;
        match self {
            Self::Squared => score * score,
            Self::Linear => score,
        }
    }
}
