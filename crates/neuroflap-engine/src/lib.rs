//! Headless Flappy Bird environment that trains birds by neuroevolution.
//!
//! - [`SimulationConfig`] - Every tunable of a training run, loadable from JSON
//! - [`Pipe`] - Obstacle pair with a fixed vertical gap, scrolling left
//! - [`Bird`] - The [`Member`](neuroflap_training::Member) implementation: observes the
//!   closest pipe, decides whether to jump and accumulates one point per tick survived
//! - [`World`] - Tick driver that spawns pipes, steps birds and ends generations
//!
//! # Example
//!
//! ```
//! use neuroflap_engine::{SimulationConfig, World};
//!
//! let config = SimulationConfig {
//!     population_size: 10,
//!     lifetime_secs: 2,
//!     seed: Some(7),
//!     ..SimulationConfig::default()
//! };
//! let mut world = World::new(config)?;
//! let summary = world.run_generation()?;
//! assert_eq!(summary.generation, 1);
//! assert_eq!(world.generation(), 2);
//! # Ok::<(), neuroflap_engine::SimulationError>(())
//! ```

use neuroflap_nn::NetworkError;
use neuroflap_training::GeneticError;

pub use self::{bird::*, config::*, geometry::*, pipe::*, world::*};

mod bird;
mod config;
mod geometry;
mod pipe;
mod world;

/// Rejected [`SimulationConfig`] value.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be positive")]
    EmptyPopulation,
    #[display("mutation rate must be within [0, 1] (got {rate})")]
    MutationRate { rate: f32 },
    #[display("elite count {elite_count} must be smaller than the population size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("at least one hidden layer is required")]
    NoHiddenLayers,
    #[display("hidden layer {index} has no neurons")]
    EmptyHiddenLayer { index: usize },
    #[display("invalid {name} [{low}, {high})")]
    InvalidRange {
        name: &'static str,
        low: f32,
        high: f32,
    },
    #[display("{name} must be a positive number (got {value})")]
    NotPositive { name: &'static str, value: f32 },
    #[display("{name} must be positive")]
    Zero { name: &'static str },
    #[display("bird at ({x}, {y}) with size {size} does not fit on a {width}x{height} screen")]
    BirdOutsideScreen {
        x: f32,
        y: f32,
        size: f32,
        width: f32,
        height: f32,
    },
    #[display("screen height {height} is too small for pipes (need at least {min})")]
    ScreenTooShort { height: f32, min: f32 },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SimulationError {
    #[display("invalid configuration: {_0}")]
    #[from]
    Config(ConfigError),
    #[display("{_0}")]
    #[from]
    Genetic(GeneticError),
    #[display("{_0}")]
    #[from]
    Network(NetworkError),
}
