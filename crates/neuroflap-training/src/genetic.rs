//! Generation state machine driving selection, crossover and mutation.
//!
//! A generation runs through four phases, always in this order:
//!
//! 1. **Evaluating** - The environment steps every member and accumulates scores
//! 2. **Analysing** - [`GeneticAlgorithm::analyse`] records a [`GenerationSummary`] and
//!    advances the generation counter
//! 3. **Evolving** - [`GeneticAlgorithm::evolve`] produces one offspring chromosome per
//!    member slot and commits them all
//! 4. **Resetting** - [`GeneticAlgorithm::reset`] zeroes scores and revives every member
//!
//! Nothing transitions on its own: the environment decides when a generation is over
//! (tick budget exhausted or no member alive) and calls
//! [`GeneticAlgorithm::next_generation`], which runs phases 2 to 4 back to back.
//!
//! # Selection
//!
//! Parents are drawn with probability proportional to their fitness from the
//! population as it was when evolution started; offspring are only written back once
//! every slot has been computed. When no member has positive fitness the draw is
//! uniform (see [`Population::select_parent`]).
//!
//! # Elitism
//!
//! With an elite count `k > 0` the `k` fittest members' chromosomes are copied
//! unchanged into slots `0..k`. The default of `0` makes every slot an offspring.

use std::iter;

use neuroflap_nn::Chromosome;
use neuroflap_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::{GeneticError, Member, Population};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum GenerationPhase {
    #[display("evaluating")]
    Evaluating,
    #[display("analysing")]
    Analysing,
    #[display("evolving")]
    Evolving,
    #[display("resetting")]
    Resetting,
}

/// Statistics recorded when a generation is analysed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    /// One-based generation number.
    pub generation: usize,
    pub best_index: usize,
    pub best_score: u32,
    pub best_fitness: f32,
    /// Members still alive when the generation ended.
    pub alive: usize,
    pub fitness: DescriptiveStats,
}

#[derive(Debug, Clone)]
pub struct GeneticAlgorithm<M> {
    population: Population<M>,
    mutation_rate: f32,
    elite_count: usize,
    generation: usize,
    phase: GenerationPhase,
    history: Vec<GenerationSummary>,
    best_fitness: Option<f32>,
}

impl<M> GeneticAlgorithm<M>
where
    M: Member,
{
    /// Creates the algorithm over an initial, randomly initialized population.
    ///
    /// Starts at generation 1 in the [`Evaluating`](GenerationPhase::Evaluating) phase.
    pub fn new(members: Vec<M>, mutation_rate: f32) -> Result<Self, GeneticError> {
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(GeneticError::InvalidMutationRate {
                rate: mutation_rate,
            });
        }
        Ok(Self {
            population: Population::new(members)?,
            mutation_rate,
            elite_count: 0,
            generation: 1,
            phase: GenerationPhase::Evaluating,
            history: vec![],
            best_fitness: None,
        })
    }

    /// Carries the `elite_count` fittest chromosomes over unchanged each generation.
    pub fn with_elite_count(mut self, elite_count: usize) -> Result<Self, GeneticError> {
        if elite_count >= self.population.len() {
            return Err(GeneticError::TooManyElites {
                elite_count,
                population_size: self.population.len(),
            });
        }
        self.elite_count = elite_count;
        Ok(self)
    }

    #[must_use]
    pub fn population(&self) -> &Population<M> {
        &self.population
    }

    /// Mutable access for the environment during the evaluating phase.
    pub fn population_mut(&mut self) -> &mut Population<M> {
        &mut self.population
    }

    #[must_use]
    pub fn mutation_rate(&self) -> f32 {
        self.mutation_rate
    }

    #[must_use]
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    /// Current one-based generation number.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    #[must_use]
    pub fn history(&self) -> &[GenerationSummary] {
        &self.history
    }

    /// Highest fitness observed in any analysed generation.
    #[must_use]
    pub fn best_fitness(&self) -> Option<f32> {
        self.best_fitness
    }

    #[must_use]
    pub fn num_alive(&self) -> usize {
        self.population.num_alive()
    }

    /// Records the statistics of the generation that just finished evaluating.
    pub fn analyse(&mut self) -> Result<GenerationSummary, GeneticError> {
        self.expect_phase("analyse", GenerationPhase::Evaluating)?;

        let fitnesses = self.population.fitnesses();
        let fitness = DescriptiveStats::new(fitnesses).ok_or(GeneticError::EmptyPopulation)?;
        let best_index = self.population.best_index();
        let best = &self.population.members()[best_index];
        let summary = GenerationSummary {
            generation: self.generation,
            best_index,
            best_score: best.score(),
            best_fitness: best.fitness(),
            alive: self.population.num_alive(),
            fitness,
        };

        self.best_fitness = Some(
            self.best_fitness
                .map_or(summary.best_fitness, |f| f.max(summary.best_fitness)),
        );
        self.history.push(summary);
        self.generation += 1;
        self.phase = GenerationPhase::Analysing;

        tracing::info!(
            generation = summary.generation,
            best_score = summary.best_score,
            best_fitness = summary.best_fitness,
            mean_fitness = summary.fitness.mean,
            alive = summary.alive,
            "generation analysed"
        );
        Ok(summary)
    }

    /// Replaces every member's chromosome with the next generation's.
    ///
    /// Every offspring is validated against its slot before any is committed. On error
    /// the population is unchanged and the phase goes back to
    /// [`Analysing`](GenerationPhase::Analysing), so `evolve` can be retried or the
    /// generation [`reset`](Self::reset).
    pub fn evolve<R>(&mut self, rng: &mut R) -> Result<(), GeneticError>
    where
        R: Rng + ?Sized,
    {
        self.expect_phase("evolve", GenerationPhase::Analysing)?;
        self.phase = GenerationPhase::Evolving;

        let result = self.breed(rng).and_then(|offspring| self.commit(offspring));
        if result.is_err() {
            self.phase = GenerationPhase::Analysing;
        }
        result
    }

    fn breed<R>(&self, rng: &mut R) -> Result<Vec<Chromosome>, GeneticError>
    where
        R: Rng + ?Sized,
    {
        let fitnesses = self.population.fitnesses();
        if fitnesses.iter().all(|&f| f <= 0.0) {
            tracing::warn!(
                generation = self.generation - 1,
                "no member has positive fitness; selecting parents uniformly"
            );
        }

        let mut ranked = (0..fitnesses.len()).collect::<Vec<_>>();
        ranked.sort_by(|&a, &b| fitnesses[b].total_cmp(&fitnesses[a]));

        let members = self.population.members();
        let mut offspring: Vec<Chromosome> = Vec::with_capacity(members.len());
        for &elite in &ranked[..self.elite_count] {
            offspring.push(members[elite].chromosome());
        }
        for member in &members[self.elite_count..] {
            let a = self.population.select_parent(rng);
            let b = self.population.select_parent(rng);
            tracing::trace!(parent_a = a, parent_b = b, "crossover");
            offspring.push(member.crossover(&members[a], &members[b], self.mutation_rate, rng)?);
        }

        for (member, chromosome) in iter::zip(members, &offspring) {
            member.network().validate_chromosome(chromosome)?;
        }
        Ok(offspring)
    }

    fn commit(&mut self, offspring: Vec<Chromosome>) -> Result<(), GeneticError> {
        for (member, chromosome) in iter::zip(self.population.members_mut(), offspring) {
            member.set_chromosome(chromosome)?;
        }
        tracing::debug!(
            elites = self.elite_count,
            offspring = self.population.len() - self.elite_count,
            "population evolved"
        );
        Ok(())
    }

    /// Zeroes every member's score, revives it and returns to the evaluating phase.
    ///
    /// Allowed from any phase.
    pub fn reset(&mut self) {
        self.phase = GenerationPhase::Resetting;
        self.population.reset_all();
        self.phase = GenerationPhase::Evaluating;
    }

    /// Runs analyse, evolve and reset as one step.
    pub fn next_generation<R>(&mut self, rng: &mut R) -> Result<GenerationSummary, GeneticError>
    where
        R: Rng + ?Sized,
    {
        let summary = self.analyse()?;
        self.evolve(rng)?;
        self.reset();
        Ok(summary)
    }

    fn expect_phase(
        &self,
        operation: &'static str,
        expected: GenerationPhase,
    ) -> Result<(), GeneticError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GeneticError::UnexpectedPhase {
                operation,
                phase: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use neuroflap_nn::{Activation, Layer, NetworkError, NeuralNetwork, ValueRange};

    use super::*;
    use crate::tests::TestMember;

    fn algorithm(size: usize, rate: f32, seed: u64) -> (GeneticAlgorithm<TestMember>, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let members = TestMember::many(size, &mut rng);
        (GeneticAlgorithm::new(members, rate).unwrap(), rng)
    }

    #[test]
    fn test_kill_and_reset() {
        let (mut ga, _) = algorithm(5, 0.1, 0);
        let members = ga.population_mut().members_mut();
        members[0].alive = false;
        members[3].alive = false;
        members[1].score = 7;
        assert_eq!(ga.num_alive(), 3);

        ga.reset();
        assert_eq!(ga.num_alive(), 5);
        assert!(ga.population().fitnesses().iter().all(|&f| f == 0.0));
        assert!(ga.phase().is_evaluating());
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(
            GeneticAlgorithm::new(TestMember::many(3, &mut rng), 1.5),
            Err(GeneticError::InvalidMutationRate { .. })
        ));
        assert!(matches!(
            GeneticAlgorithm::<TestMember>::new(vec![], 0.1),
            Err(GeneticError::EmptyPopulation)
        ));
        let ga = GeneticAlgorithm::new(TestMember::many(3, &mut rng), 0.1).unwrap();
        assert!(matches!(
            ga.with_elite_count(3),
            Err(GeneticError::TooManyElites {
                elite_count: 3,
                population_size: 3
            })
        ));
    }

    #[test]
    fn test_phase_order() {
        let (mut ga, mut rng) = algorithm(4, 0.1, 2);
        assert!(matches!(
            ga.evolve(&mut rng),
            Err(GeneticError::UnexpectedPhase {
                operation: "evolve",
                phase: GenerationPhase::Evaluating
            })
        ));

        ga.analyse().unwrap();
        assert!(ga.phase().is_analysing());
        assert!(matches!(
            ga.analyse(),
            Err(GeneticError::UnexpectedPhase {
                operation: "analyse",
                ..
            })
        ));

        ga.evolve(&mut rng).unwrap();
        assert!(ga.phase().is_evolving());
        ga.reset();
        assert!(ga.phase().is_evaluating());
    }

    #[test]
    fn test_analyse_records_summary() {
        let (mut ga, _) = algorithm(3, 0.1, 3);
        let members = ga.population_mut().members_mut();
        members[0].score = 2;
        members[1].score = 10;
        members[1].alive = false;
        members[2].score = 4;

        let summary = ga.analyse().unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.best_index, 1);
        assert_eq!(summary.best_score, 10);
        assert_eq!(summary.best_fitness, 100.0);
        assert_eq!(summary.alive, 2);
        assert_eq!(summary.fitness.total, 120.0);
        assert_eq!(ga.generation(), 2);
        assert_eq!(ga.history(), &[summary]);
        assert_eq!(ga.best_fitness(), Some(100.0));
    }

    #[test]
    fn test_population_size_is_invariant() {
        let (mut ga, mut rng) = algorithm(6, 0.2, 4);
        for generation in 0..20 {
            for (i, member) in ga.population_mut().members_mut().iter_mut().enumerate() {
                member.score = u32::try_from((i * 7 + generation) % 5).unwrap();
            }
            ga.next_generation(&mut rng).unwrap();
            assert_eq!(ga.population().len(), 6);
        }
        assert_eq!(ga.generation(), 21);
        assert_eq!(ga.history().len(), 20);
    }

    #[test]
    fn test_zero_mutation_offspring_come_from_selected_parents() {
        let (mut ga, mut rng) = algorithm(4, 0.0, 5);
        // Only member 2 has positive fitness, so it is both parents of every slot.
        ga.population_mut().members_mut()[2].score = 3;
        let parent = ga.population().members()[2].chromosome();

        ga.next_generation(&mut rng).unwrap();
        for member in ga.population().members() {
            assert_eq!(member.chromosome(), parent);
        }
    }

    #[test]
    fn test_failed_evolve_commits_nothing() {
        let (mut ga, mut rng) = algorithm(3, 0.5, 9);
        let range = ValueRange::new(-1.0, 1.0);
        let layers = vec![
            Layer::input(3),
            Layer::output(2, Activation::Linear, range, range),
        ];
        let members = ga.population_mut().members_mut();
        members[2].network = NeuralNetwork::from_layers(layers, &mut rng).unwrap();
        // every slot breeds from member 0, whose stack does not fit slot 2
        members[0].score = 4;
        let before = ga
            .population()
            .members()
            .iter()
            .map(Member::chromosome)
            .collect::<Vec<_>>();

        ga.analyse().unwrap();
        let expected = GeneticError::Network(NetworkError::ChromosomeLayers {
            expected: 1,
            actual: 2,
        });
        assert_eq!(ga.evolve(&mut rng), Err(expected.clone()));
        assert!(ga.phase().is_analysing());
        let after = ga
            .population()
            .members()
            .iter()
            .map(Member::chromosome)
            .collect::<Vec<_>>();
        assert_eq!(after, before);

        // still retryable, and the generation can be abandoned with a reset
        assert_eq!(ga.evolve(&mut rng), Err(expected));
        ga.reset();
        assert!(ga.phase().is_evaluating());
    }

    #[test]
    fn test_elites_are_carried_over() {
        let (ga, mut rng) = algorithm(5, 1.0, 6);
        let mut ga = ga.with_elite_count(2).unwrap();
        let members = ga.population_mut().members_mut();
        members[3].score = 9;
        members[1].score = 4;
        let best = members[3].chromosome();
        let second = members[1].chromosome();

        ga.next_generation(&mut rng).unwrap();
        let members = ga.population().members();
        assert_eq!(members[0].chromosome(), best);
        assert_eq!(members[1].chromosome(), second);
        // full mutation: the remaining slots are fresh
        assert_ne!(members[2].chromosome(), best);
    }

    #[test]
    fn test_same_seed_same_evolution() {
        let run = |seed| {
            let (mut ga, mut rng) = algorithm(5, 0.3, seed);
            for _ in 0..3 {
                for (i, member) in ga.population_mut().members_mut().iter_mut().enumerate() {
                    member.score = u32::try_from(i).unwrap();
                }
                ga.next_generation(&mut rng).unwrap();
            }
            ga.population()
                .members()
                .iter()
                .map(Member::chromosome)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7), run(8));
    }
}
