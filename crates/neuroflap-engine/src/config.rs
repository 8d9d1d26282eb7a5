use neuroflap_nn::ValueRange;
use neuroflap_training::FitnessKind;

use crate::{ConfigError, Pipe};

/// Parameters of a training run.
///
/// Missing fields take their [`Default`] value when deserializing; unknown fields are
/// rejected.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub population_size: usize,
    pub mutation_rate: f32,
    /// Fittest members copied unchanged into the next generation.
    pub elite_count: usize,
    pub hidden_layer_sizes: Vec<usize>,
    pub weight_range: ValueRange,
    pub bias_range: ValueRange,
    pub fitness: FitnessKind,
    /// Screen width in pixels.
    pub width: f32,
    /// Screen height in pixels.
    pub height: f32,
    /// Ticks per simulated second.
    pub fps: u32,
    /// Simulated seconds before a generation is cut short.
    pub lifetime_secs: u32,
    pub bird_x: f32,
    pub bird_y: f32,
    pub bird_size: f32,
    /// Seed of the world's random generator; drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            mutation_rate: 0.05,
            elite_count: 0,
            hidden_layer_sizes: vec![5],
            weight_range: ValueRange::new(-1.0, 1.0),
            bias_range: ValueRange::new(-1.0, 1.0),
            fitness: FitnessKind::Squared,
            width: 1000.0,
            height: 800.0,
            fps: 60,
            lifetime_secs: 30,
            bird_x: 150.0,
            bird_y: 400.0,
            bird_size: 40.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Number of ticks after which a generation ends even if birds are alive.
    #[must_use]
    pub fn max_ticks(&self) -> u64 {
        u64::from(self.lifetime_secs) * u64::from(self.fps)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate {
                rate: self.mutation_rate,
            });
        }
        if self.elite_count >= self.population_size {
            return Err(ConfigError::TooManyElites {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if self.hidden_layer_sizes.is_empty() {
            return Err(ConfigError::NoHiddenLayers);
        }
        if let Some(index) = self.hidden_layer_sizes.iter().position(|&size| size == 0) {
            return Err(ConfigError::EmptyHiddenLayer { index });
        }
        for (name, range) in [
            ("weight range", self.weight_range),
            ("bias range", self.bias_range),
        ] {
            if range.validate().is_err() {
                return Err(ConfigError::InvalidRange {
                    name,
                    low: range.low,
                    high: range.high,
                });
            }
        }
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("bird size", self.bird_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if self.fps == 0 {
            return Err(ConfigError::Zero { name: "fps" });
        }
        if self.lifetime_secs == 0 {
            return Err(ConfigError::Zero {
                name: "lifetime_secs",
            });
        }

        let fits = |start: f32, limit: f32| {
            start.is_finite() && start >= 0.0 && start + self.bird_size <= limit
        };
        if !(fits(self.bird_x, self.width) && fits(self.bird_y, self.height)) {
            return Err(ConfigError::BirdOutsideScreen {
                x: self.bird_x,
                y: self.bird_y,
                size: self.bird_size,
                width: self.width,
                height: self.height,
            });
        }

        let min_height = 3.0 * Pipe::SPACING;
        if self.height < min_height {
            return Err(ConfigError::ScreenTooShort {
                height: self.height,
                min: min_height,
            });
        }
        Ok(())
    }
}
