use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{error::MapGenError, grid::MAX_LEVEL};

/// Level every tile receives when the input field has no variance.
pub const FLAT_FIELD_LEVEL: i32 = MAX_LEVEL / 2;

/// Raw elevation input, row-major, arbitrary numeric range.
#[derive(Debug, Clone)]
pub struct ElevationField {
    pub width: u32,
    pub height: u32,
    values: Arc<Vec<f32>>,
}

impl ElevationField {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, MapGenError> {
        if width == 0 || height == 0 || values.len() != (width as usize) * (height as usize) {
            return Err(MapGenError::InvalidDimensions {
                width,
                height,
                values: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(MapGenError::NonFiniteHeight { index });
        }
        Ok(Self {
            width,
            height,
            values: Arc::new(values),
        })
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Linear rescale into `0..=MAX_LEVEL`.
    ///
    /// A zero-variance field maps every tile to [`FLAT_FIELD_LEVEL`].
    pub fn normalised_levels(&self) -> Vec<i32> {
        let mut min_v = f32::MAX;
        let mut max_v = f32::MIN;
        for &v in self.values.iter() {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        if (max_v - min_v).abs() < f32::EPSILON {
            tracing::warn!(
                target: "mapgen::heightfield",
                value = min_v,
                fallback = FLAT_FIELD_LEVEL,
                "mapgen.heightfield.degenerate"
            );
            return vec![FLAT_FIELD_LEVEL; self.values.len()];
        }
        let span = f64::from(max_v) - f64::from(min_v);
        self.values
            .iter()
            .map(|&v| {
                let scaled = (f64::from(v) - f64::from(min_v)) / span * f64::from(MAX_LEVEL);
                (scaled.round() as i32).clamp(0, MAX_LEVEL)
            })
            .collect()
    }
}

/// Shape knobs for the value-noise field builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeightNoiseOptions {
    pub continent_scale: f32,
    pub mountain_scale: f32,
    /// Strength of the radial drop towards the map edge; 0 disables it.
    pub island_falloff: f32,
    /// Quantises the field into plateaus with sharp steps between them.
    pub terraces: u32,
}

impl Default for HeightNoiseOptions {
    fn default() -> Self {
        Self {
            continent_scale: 0.6,
            mountain_scale: 0.6,
            island_falloff: 0.25,
            terraces: 0,
        }
    }
}

/// Fractal value-noise height field.
///
/// Stand-in for a production terrain generator; used by the CLI, the app
/// startup system and the benchmarks.
pub fn fractal_height_field(
    width: u32,
    height: u32,
    seed: u64,
    options: &HeightNoiseOptions,
) -> Result<ElevationField, MapGenError> {
    let continent_freq = 2.0 + options.continent_scale.clamp(0.1, 1.5) * 6.0;
    let mountain_freq = 6.0 + options.mountain_scale.clamp(0.2, 2.5) * 16.0;
    let continent_seed = mix_seed(0x9E37_0001, seed, 0);
    let ridge_seed = mix_seed(0xC0F3_0001, seed, 0x85EB);

    let mut values = Vec::with_capacity((width as usize) * (height as usize));
    for y in 0..height {
        for x in 0..width {
            let nx = x as f32 / width.max(1) as f32;
            let ny = y as f32 / height.max(1) as f32;

            let continent = fbm_noise(
                nx * continent_freq,
                ny * continent_freq,
                4,
                2.0,
                0.5,
                continent_seed,
            );
            let ridge_source = fbm_noise(
                nx * mountain_freq,
                ny * mountain_freq,
                3,
                2.1,
                0.45,
                ridge_seed,
            );
            let ridged = (1.0 - (ridge_source - 0.5).abs() * 2.0)
                .clamp(0.0, 1.0)
                .powf(1.6);

            let mut value = continent * 0.75 + ridged * (0.2 + options.mountain_scale * 0.25);

            let dx = nx - 0.5;
            let dy = ny - 0.5;
            let radial = (dx * dx + dy * dy).sqrt();
            value -= radial.powf(1.8) * options.island_falloff.max(0.0);

            let mut value = value.clamp(0.0, 1.0);
            if options.terraces > 1 {
                let steps = options.terraces as f32;
                value = (value * steps).floor() / steps;
            }
            values.push(value);
        }
    }

    ElevationField::new(width, height, values)
}

fn fbm_noise(x: f32, y: f32, octaves: u32, lacunarity: f32, gain: f32, seed: u32) -> f32 {
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut sum = 0.0;
    let mut normaliser = 0.0;
    for i in 0..octaves {
        let s = seed.wrapping_add(i);
        sum += value_noise(x * frequency, y * frequency, s) * amplitude;
        normaliser += amplitude;
        frequency *= lacunarity;
        amplitude *= gain;
    }
    (sum / normaliser).clamp(0.0, 1.0)
}

fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let xf = x - x0 as f32;
    let yf = y - y0 as f32;

    let v00 = hash2(x0, y0, seed);
    let v10 = hash2(x0 + 1, y0, seed);
    let v01 = hash2(x0, y0 + 1, seed);
    let v11 = hash2(x0 + 1, y0 + 1, seed);

    let i1 = lerp(v00, v10, smooth_step(xf));
    let i2 = lerp(v01, v11, smooth_step(xf));
    lerp(i1, i2, smooth_step(yf))
}

fn smooth_step(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn hash2(x: i32, y: i32, seed: u32) -> f32 {
    let mut n = x as u32;
    n = n.wrapping_mul(0x6C8E_9CF5) ^ (y as u32).wrapping_mul(0xB529_7A4D) ^ seed;
    n ^= n >> 13;
    n = n.wrapping_mul(0x1B56_C4E9);
    n ^= n >> 11;
    ((n >> 8) & 0xFFFF) as f32 / 65535.0
}

fn mix_seed(base: u32, seed: u64, salt: u32) -> u32 {
    let seed_low = seed as u32;
    let seed_high = (seed >> 32) as u32;
    base ^ seed_low.rotate_left(7) ^ seed_high.rotate_left(11) ^ salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        let err = ElevationField::new(3, 3, vec![0.0; 8]).unwrap_err();
        assert!(matches!(
            err,
            MapGenError::InvalidDimensions { values: 8, .. }
        ));
        assert!(ElevationField::new(0, 3, Vec::new()).is_err());
    }

    #[test]
    fn rejects_nan_samples() {
        let err = ElevationField::new(2, 1, vec![1.0, f32::NAN]).unwrap_err();
        assert!(matches!(err, MapGenError::NonFiniteHeight { index: 1 }));
    }

    #[test]
    fn normalisation_spans_full_range() {
        let field = ElevationField::new(3, 1, vec![-50.0, 0.0, 50.0]).expect("valid field");
        assert_eq!(field.normalised_levels(), vec![0, MAX_LEVEL / 2, MAX_LEVEL]);
    }

    #[test]
    fn flat_field_uses_fallback_level() {
        let field = ElevationField::new(2, 2, vec![7.5; 4]).expect("valid field");
        assert_eq!(field.normalised_levels(), vec![FLAT_FIELD_LEVEL; 4]);
    }

    #[test]
    fn fractal_field_is_seed_stable() {
        let options = HeightNoiseOptions::default();
        let a = fractal_height_field(24, 16, 9, &options).expect("field");
        let b = fractal_height_field(24, 16, 9, &options).expect("field");
        let c = fractal_height_field(24, 16, 10, &options).expect("field");
        assert_eq!(a.values(), b.values());
        assert_ne!(a.values(), c.values());
        assert!(a.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
