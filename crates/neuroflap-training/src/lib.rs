//! Genetic algorithm over populations of neural-network members.
//!
//! - [`Member`] - Capability every agent implements: network, score, fitness,
//!   liveness, reset and crossover
//! - [`FitnessTransform`] - Pluggable mapping from raw score to fitness
//!   ([`FitnessKind::Squared`] by default)
//! - [`Population`] - Fixed-size set of members with fitness-proportional selection
//! - [`GeneticAlgorithm`] - Evaluate, analyse, evolve and reset state machine
//!
//! The environment owns the clock: it steps members while the algorithm is in the
//! evaluating phase and calls [`GeneticAlgorithm::next_generation`] once it decides
//! the generation is over.

use neuroflap_nn::NetworkError;

pub use self::{fitness::*, genetic::*, member::*, population::*};

mod fitness;
mod genetic;
mod member;
mod population;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum GeneticError {
    #[display("population must contain at least one member")]
    EmptyPopulation,
    #[display("mutation rate must be within [0, 1] (got {rate})")]
    InvalidMutationRate { rate: f32 },
    #[display("elite count {elite_count} must be smaller than the population size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("cannot {operation} while {phase}")]
    UnexpectedPhase {
        operation: &'static str,
        phase: GenerationPhase,
    },
    #[display("{_0}")]
    #[from]
    Network(NetworkError),
}
