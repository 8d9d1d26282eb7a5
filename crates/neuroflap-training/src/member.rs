use neuroflap_nn::{Chromosome, NetworkError, NeuralNetwork, ValueRange, crossover_chromosome};
use rand::Rng;

/// Participant of the genetic algorithm.
///
/// A member owns a [`NeuralNetwork`] whose parameters form its chromosome, accumulates a
/// raw score while the environment runs, and exposes the fitness derived from it.
pub trait Member {
    fn network(&self) -> &NeuralNetwork;

    fn network_mut(&mut self) -> &mut NeuralNetwork;

    /// Range fresh weight genes are drawn from when mutating.
    fn weight_range(&self) -> ValueRange;

    /// Range fresh bias genes are drawn from when mutating.
    fn bias_range(&self) -> ValueRange;

    /// Raw score accumulated during the current generation.
    fn score(&self) -> u32;

    /// Selection fitness of the current generation; `0` after [`reset`](Self::reset).
    fn fitness(&self) -> f32;

    fn is_alive(&self) -> bool;

    /// Zeroes score and fitness, revives the member and restores its start state.
    fn reset(&mut self);

    fn chromosome(&self) -> Chromosome {
        self.network().chromosome()
    }

    /// Replaces the network parameters in bulk.
    fn set_chromosome(&mut self, chromosome: Chromosome) -> Result<(), NetworkError> {
        self.network_mut().replace_chromosome(chromosome)
    }

    /// Produces the chromosome this member will adopt next generation.
    ///
    /// Every gene goes through [`crossover_gene`](neuroflap_nn::crossover_gene): weights
    /// bound to [`weight_range`](Self::weight_range), biases to
    /// [`bias_range`](Self::bias_range). Neither parent is modified.
    fn crossover<R>(
        &self,
        parent_a: &Self,
        parent_b: &Self,
        mutation_rate: f32,
        rng: &mut R,
    ) -> Result<Chromosome, NetworkError>
    where
        Self: Sized,
        R: Rng + ?Sized,
    {
        crossover_chromosome(
            parent_a.network(),
            parent_b.network(),
            mutation_rate,
            self.weight_range(),
            self.bias_range(),
            rng,
        )
    }
}
