use map_runtime::RulesetError;
use thiserror::Error;

/// Failures surfaced to the caller of [`crate::generate_map`].
///
/// Per-tile edge cases (out-of-range neighbours, empty categories, exhausted
/// constraints) resolve locally and never show up here.
#[derive(Debug, Error)]
pub enum MapGenError {
    #[error("invalid map dimensions {width}x{height} for {values} height samples")]
    InvalidDimensions {
        width: u32,
        height: u32,
        values: usize,
    },
    #[error("height sample {index} is not a finite number")]
    NonFiniteHeight { index: usize },
    #[error("parameter {name} = {value} is outside 0..=100")]
    ParameterOutOfRange { name: &'static str, value: u8 },
    #[error(transparent)]
    Ruleset(#[from] RulesetError),
}
