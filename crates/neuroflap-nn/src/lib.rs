//! Fixed-shape matrices and feedforward neural networks for neuroevolution.
//!
//! This crate provides the numeric half of the neuroevolution engine:
//!
//! - [`Matrix`] - Dense row-major matrix with value-returning arithmetic and a
//!   per-element crossover operator
//! - [`crossover_gene`] - The scalar genetic operator every weight and bias goes through
//! - [`Activation`] - Scalar activation functions applied after each layer
//! - [`Layer`] - Declarative description of one layer (kind, size, activation, init ranges)
//! - [`NeuralNetwork`] - Weights and biases built from a layer stack, with a forward pass
//!   and a structural crossover producing a [`Chromosome`]
//! - [`crossover_chromosome`] - Network crossover with [`crossover_gene`] bound to a weight
//!   range and a bias range
//!
//! Randomness is always supplied by the caller as `&mut R where R: Rng + ?Sized`, so
//! seeding a generator makes network construction and crossover reproducible.
//!
//! # Example
//!
//! ```
//! use neuroflap_nn::{Activation, Layer, NeuralNetwork, ValueRange};
//! use rand::{SeedableRng as _, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let range = ValueRange::new(-1.0, 1.0);
//! let layers = vec![
//!     Layer::input(5),
//!     Layer::hidden(5, Activation::Relu, range, range),
//!     Layer::output(2, Activation::Linear, range, range),
//! ];
//!
//! let network = NeuralNetwork::from_layers(layers, &mut rng)?;
//! let action = network.feedforward(&[0.5, -0.2, 0.0, 0.0, 0.0])?;
//! assert_eq!(action.len(), 2);
//! assert!(action.iter().all(|v| v.is_finite()));
//! # Ok::<(), neuroflap_nn::NetworkError>(())
//! ```

pub use self::{activation::*, gene::*, layer::*, matrix::*, network::*};

mod activation;
mod gene;
mod layer;
mod matrix;
mod network;

/// Errors raised by [`Matrix`] construction and arithmetic.
///
/// Every variant describes a caller error; nothing is retried and no partial
/// matrix is produced.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum MatrixError {
    #[display("matrix dimensions must be positive (got {rows}x{cols})")]
    EmptyShape { rows: usize, cols: usize },
    #[display("cannot build a {rows}x{cols} matrix from {len} elements")]
    LengthMismatch { rows: usize, cols: usize, len: usize },
    #[display("shape mismatch in {operation}: {left:?} vs {right:?}")]
    ShapeMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[display("element {index} is not a finite number ({value})")]
    InvalidElement { index: usize, value: f32 },
    #[display("cannot divide a matrix by zero")]
    DivisionByZero,
    #[display("invalid value range [{low}, {high})")]
    InvalidRange { low: f32, high: f32 },
    #[display("mutation rate must be within [0, 1] (got {rate})")]
    InvalidMutationRate { rate: f32 },
}

/// Errors raised while building, evaluating or recombining a [`NeuralNetwork`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum NetworkError {
    #[display("a network needs an input and an output layer (got {count} layers)")]
    TooFewLayers { count: usize },
    #[display("the first layer must be an input layer")]
    MissingInputLayer,
    #[display("the last layer must be an output layer")]
    MissingOutputLayer,
    #[display("layer {index} is an {kind} layer in an interior position")]
    MisplacedLayer { index: usize, kind: LayerKind },
    #[display("layer {index} has no neurons")]
    EmptyLayer { index: usize },
    #[display("expected an input of length {expected}, got {actual}")]
    InputLength { expected: usize, actual: usize },
    #[display("chromosome has {actual} layers, network expects {expected}")]
    ChromosomeLayers { expected: usize, actual: usize },
    #[display("chromosome does not match the network shape at layer {layer}")]
    ChromosomeShape { layer: usize },
    #[display("{_0}")]
    #[from]
    Matrix(MatrixError),
}
