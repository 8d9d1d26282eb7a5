use std::iter;

use rand::Rng;

use crate::{Layer, LayerKind, Matrix, MatrixError, NetworkError, ValueRange, crossover_gene};

/// Complete set of trainable parameters of a network.
///
/// `weights[i]` and `biases[i]` belong to the `i + 1`-th layer of the stack (the
/// input layer has no parameters).
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl Chromosome {
    /// Number of trainable layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Total number of genes (weight and bias elements).
    #[must_use]
    pub fn gene_count(&self) -> usize {
        self.weights
            .iter()
            .chain(&self.biases)
            .map(Matrix::element_count)
            .sum()
    }
}

/// Feedforward network built from a validated layer stack.
///
/// The layer shapes are fixed for the lifetime of the network; only the values of
/// the weights and biases can be replaced, in bulk, through
/// [`replace_chromosome`](Self::replace_chromosome).
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    layers: Vec<Layer>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

impl NeuralNetwork {
    /// Builds a network with randomly initialized parameters.
    ///
    /// The first layer must be the only input layer and the last layer the only output
    /// layer. Layer `i` gets a `size[i]`×`size[i - 1]` weight matrix and a `size[i]`×1
    /// bias matrix, drawn from the layer's weight and bias ranges.
    pub fn from_layers<R>(layers: Vec<Layer>, rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        validate_layers(&layers)?;

        let mut weights = Vec::with_capacity(layers.len() - 1);
        let mut biases = Vec::with_capacity(layers.len() - 1);
        for (index, (prev, layer)) in iter::zip(&layers, &layers[1..]).enumerate() {
            let Some(params) = layer.params() else {
                return Err(NetworkError::MisplacedLayer {
                    index: index + 1,
                    kind: layer.kind(),
                });
            };
            weights.push(Matrix::random(
                params.size,
                prev.size(),
                params.weight_range,
                rng,
            )?);
            biases.push(Matrix::random(params.size, 1, params.bias_range, rng)?);
        }

        Ok(Self {
            layers,
            weights,
            biases,
        })
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers[0].size()
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }

    #[must_use]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[Matrix] {
        &self.biases
    }

    #[must_use]
    pub fn chromosome(&self) -> Chromosome {
        Chromosome {
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        }
    }

    /// Replaces all weights and biases at once.
    ///
    /// The chromosome must match the network's shapes exactly and contain only finite
    /// values; on error the network is left untouched.
    pub fn replace_chromosome(&mut self, chromosome: Chromosome) -> Result<(), NetworkError> {
        self.validate_chromosome(&chromosome)?;
        self.weights = chromosome.weights;
        self.biases = chromosome.biases;
        Ok(())
    }

    /// Runs a forward pass.
    ///
    /// For every layer after the input: `a = activation(W · a + b)`.
    pub fn feedforward(&self, input: &[f32]) -> Result<Vec<f32>, NetworkError> {
        let expected = self.input_size();
        if input.len() != expected {
            return Err(NetworkError::InputLength {
                expected,
                actual: input.len(),
            });
        }

        let mut activations = Matrix::column(input)?;
        for ((layer, weights), bias) in iter::zip(&self.layers[1..], &self.weights).zip(&self.biases)
        {
            let z = weights.matmul(&activations)?.add(bias)?;
            activations = layer.activation().apply_matrix(&z);
        }
        Ok(activations.into_vec())
    }

    /// Combines two parents into an offspring chromosome without modifying either.
    ///
    /// Every weight element goes through `weight_combiner` and every bias element
    /// through `bias_combiner`, each called as `(element_a, element_b, roll, rng)`
    /// with a fresh uniform roll in `[0, 1)`.
    pub fn crossover<R, W, B>(
        a: &Self,
        b: &Self,
        rng: &mut R,
        mut weight_combiner: W,
        mut bias_combiner: B,
    ) -> Result<Chromosome, NetworkError>
    where
        R: Rng + ?Sized,
        W: FnMut(f32, f32, f32, &mut R) -> f32,
        B: FnMut(f32, f32, f32, &mut R) -> f32,
    {
        if a.weights.len() != b.weights.len() {
            return Err(NetworkError::ChromosomeLayers {
                expected: a.weights.len(),
                actual: b.weights.len(),
            });
        }

        let mut weights = Vec::with_capacity(a.weights.len());
        let mut biases = Vec::with_capacity(a.biases.len());
        for (wa, wb) in iter::zip(&a.weights, &b.weights) {
            weights.push(wa.crossover_with(wb, rng, &mut weight_combiner)?);
        }
        for (ba, bb) in iter::zip(&a.biases, &b.biases) {
            biases.push(ba.crossover_with(bb, rng, &mut bias_combiner)?);
        }
        Ok(Chromosome { weights, biases })
    }

    /// Checks that [`replace_chromosome`](Self::replace_chromosome) would accept
    /// `chromosome`, without replacing anything.
    pub fn validate_chromosome(&self, chromosome: &Chromosome) -> Result<(), NetworkError> {
        if chromosome.weights.len() != self.weights.len()
            || chromosome.biases.len() != self.biases.len()
        {
            return Err(NetworkError::ChromosomeLayers {
                expected: self.weights.len(),
                actual: chromosome.weights.len().max(chromosome.biases.len()),
            });
        }
        let shapes_match = |ours: &[Matrix], theirs: &[Matrix]| {
            iter::zip(ours, theirs).position(|(a, b)| a.shape() != b.shape())
        };
        let mismatch = shapes_match(&self.weights, &chromosome.weights)
            .into_iter()
            .chain(shapes_match(&self.biases, &chromosome.biases))
            .min();
        if let Some(i) = mismatch {
            return Err(NetworkError::ChromosomeShape { layer: i + 1 });
        }
        for matrix in chromosome.weights.iter().chain(&chromosome.biases) {
            matrix.check_finite()?;
        }
        Ok(())
    }
}

fn validate_layers(layers: &[Layer]) -> Result<(), NetworkError> {
    if layers.len() < 2 {
        return Err(NetworkError::TooFewLayers {
            count: layers.len(),
        });
    }
    if !layers[0].kind().is_input() {
        return Err(NetworkError::MissingInputLayer);
    }
    if !layers[layers.len() - 1].kind().is_output() {
        return Err(NetworkError::MissingOutputLayer);
    }
    let last = layers.len() - 1;
    for (index, layer) in layers.iter().enumerate() {
        let kind = layer.kind();
        let misplaced = match kind {
            LayerKind::Input => index != 0,
            LayerKind::Output => index != last,
            LayerKind::Hidden => false,
        };
        if misplaced {
            return Err(NetworkError::MisplacedLayer { index, kind });
        }
        if layer.size() == 0 {
            return Err(NetworkError::EmptyLayer { index });
        }
        if let Some(params) = layer.params() {
            params.weight_range.validate()?;
            params.bias_range.validate()?;
        }
    }
    Ok(())
}

/// Offspring chromosome of two networks sharing the same stack, with every gene
/// decided by [`crossover_gene`] against the given ranges.
///
/// Used by callers that keep the weight and bias ranges outside the network.
pub fn crossover_chromosome<R>(
    a: &NeuralNetwork,
    b: &NeuralNetwork,
    mutation_rate: f32,
    weight_range: ValueRange,
    bias_range: ValueRange,
    rng: &mut R,
) -> Result<Chromosome, NetworkError>
where
    R: Rng + ?Sized,
{
    if !(0.0..=1.0).contains(&mutation_rate) {
        return Err(MatrixError::InvalidMutationRate {
            rate: mutation_rate,
        }
        .into());
    }
    weight_range.validate()?;
    bias_range.validate()?;
    NeuralNetwork::crossover(
        a,
        b,
        rng,
        |x, y, roll, rng| crossover_gene(x, y, roll, mutation_rate, weight_range, rng),
        |x, y, roll, rng| crossover_gene(x, y, roll, mutation_rate, bias_range, rng),
    )
}
