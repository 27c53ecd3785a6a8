use std::f64::consts::TAU;

use fieldconfig::RenderConfig;
use rand::Rng;
use serde::Serialize;

/// Per-line attributes fixed at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSpec {
    /// Base position along the axis perpendicular to the lines.
    pub offset: f64,
    /// Jitter phase in `[0, 2π)`.
    pub phase: f64,
    pub width: f64,
    pub brightness: f64,
}

/// The set of lines spanning the current viewport diagonal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineField {
    lines: Vec<LineSpec>,
    diagonal: f64,
}

impl LineField {
    pub fn generate<R: Rng + ?Sized>(config: &RenderConfig, diagonal: f64, rng: &mut R) -> Self {
        let mut field = Self::default();
        field.regenerate(config, diagonal, rng);
        field
    }

    /// Discards every line and spreads `config.line_count` new ones evenly
    /// over `[0, diagonal]`, each nudged by up to `±spacing`.
    pub fn regenerate<R: Rng + ?Sized>(
        &mut self,
        config: &RenderConfig,
        diagonal: f64,
        rng: &mut R,
    ) {
        let count = config.line_count as usize;
        self.diagonal = diagonal;
        self.lines.clear();
        self.lines.reserve(count);
        for index in 0..count {
            let even = index as f64 / count as f64 * diagonal;
            self.lines.push(LineSpec {
                offset: even + sample(rng, -config.spacing, config.spacing),
                phase: sample(rng, 0.0, TAU),
                width: sample(rng, config.width.min, config.width.max),
                brightness: sample(rng, config.brightness.min, config.brightness.max),
            });
        }
    }

    pub fn lines(&self) -> &[LineSpec] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineSpec> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Diagonal the field was generated for.
    pub fn diagonal(&self) -> f64 {
        self.diagonal
    }
}

// Uniform in [min, max); a collapsed range yields `min` instead of panicking.
fn sample<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldconfig::ValueRange;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config_with(count: u32) -> RenderConfig {
        RenderConfig {
            line_count: count,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn produces_requested_count_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let diagonal = 1000.0;
        for count in [0, 1, 2, 42, 500] {
            let config = config_with(count);
            let field = LineField::generate(&config, diagonal, &mut rng);
            assert_eq!(field.len(), count as usize);
            for line in field.iter() {
                assert!(line.offset >= -config.spacing);
                assert!(line.offset <= diagonal + config.spacing);
                assert!((0.0..=TAU).contains(&line.phase));
                assert!(line.width >= config.width.min && line.width <= config.width.max);
                assert!(
                    line.brightness >= config.brightness.min
                        && line.brightness <= config.brightness.max
                );
            }
        }
    }

    #[test]
    fn offsets_follow_even_distribution() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = config_with(10);
        let field = LineField::generate(&config, 1000.0, &mut rng);
        for (index, line) in field.iter().enumerate() {
            let even = index as f64 * 100.0;
            assert!((line.offset - even).abs() <= config.spacing);
        }
    }

    #[test]
    fn regeneration_replaces_previous_lines() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut field = LineField::generate(&config_with(42), 1000.0, &mut rng);
        field.regenerate(&config_with(5), 400.0, &mut rng);
        assert_eq!(field.len(), 5);
        assert_eq!(field.diagonal(), 400.0);
        assert!(field.iter().all(|line| line.offset <= 400.0 + 26.0));

        field.regenerate(&config_with(0), 400.0, &mut rng);
        assert!(field.is_empty());
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let config = config_with(16);
        let a = LineField::generate(&config, 900.0, &mut StdRng::seed_from_u64(77));
        let b = LineField::generate(&config, 900.0, &mut StdRng::seed_from_u64(77));
        let c = LineField::generate(&config, 900.0, &mut StdRng::seed_from_u64(78));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn collapsed_ranges_do_not_panic() {
        let config = RenderConfig {
            line_count: 4,
            spacing: 0.0,
            width: ValueRange::new(1.5, 1.5),
            brightness: ValueRange::new(1.0, 1.0),
            ..RenderConfig::default()
        };
        let field = LineField::generate(&config, 400.0, &mut StdRng::seed_from_u64(3));
        let offsets: Vec<f64> = field.iter().map(|line| line.offset).collect();
        assert_eq!(offsets, vec![0.0, 100.0, 200.0, 300.0]);
        assert!(field.iter().all(|line| line.width == 1.5 && line.brightness == 1.0));
    }

    #[test]
    fn zero_diagonal_keeps_offsets_within_spacing() {
        let config = config_with(8);
        let field = LineField::generate(&config, 0.0, &mut StdRng::seed_from_u64(4));
        assert_eq!(field.len(), 8);
        assert!(field.iter().all(|line| line.offset.abs() <= config.spacing));
    }
}
