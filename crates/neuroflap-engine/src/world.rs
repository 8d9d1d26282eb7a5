use std::sync::Arc;

use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use neuroflap_training::{FitnessTransform, GenerationSummary, GeneticAlgorithm};

use crate::{Bird, Pipe, SimulationConfig, SimulationError};

/// Tick driver of the headless game.
///
/// Owns the population of birds, the pipes on screen and the random generator. Each
/// [`step`](Self::step) advances the game by one tick and, once every bird is dead or
/// the generation's tick budget is spent, runs the genetic algorithm to produce the
/// next generation.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    rng: Pcg32,
    genetic: GeneticAlgorithm<Bird>,
    pipes: Vec<Pipe>,
    tick: u64,
    spawn_counter: u32,
    pipes_spawned: u32,
}

impl World {
    /// Validates `config` and creates the first generation with the configured fitness.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let fitness = Arc::new(config.fitness);
        Self::with_fitness(config, fitness)
    }

    /// Like [`new`](Self::new) but scoring birds with a custom fitness transform.
    pub fn with_fitness(
        config: SimulationConfig,
        fitness: Arc<dyn FitnessTransform>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_os_rng(),
        };
        let birds = (0..config.population_size)
            .map(|_| Bird::new(&config, Arc::clone(&fitness), &mut rng))
            .collect::<Result<Vec<_>, _>>()?;
        let genetic = GeneticAlgorithm::new(birds, config.mutation_rate)?
            .with_elite_count(config.elite_count)?;

        tracing::info!(
            population = config.population_size,
            mutation_rate = config.mutation_rate,
            hidden_layers = ?config.hidden_layer_sizes,
            seed = ?config.seed,
            "world created"
        );

        Ok(Self {
            config,
            rng,
            genetic,
            pipes: vec![],
            tick: 0,
            spawn_counter: 0,
            pipes_spawned: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current one-based generation number.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.genetic.generation()
    }

    /// Ticks elapsed in the current generation.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn max_ticks(&self) -> u64 {
        self.config.max_ticks()
    }

    #[must_use]
    pub fn num_alive(&self) -> usize {
        self.genetic.num_alive()
    }

    /// Simulated seconds elapsed in the current generation.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn elapsed_secs(&self) -> f32 {
        self.tick as f32 / self.config.fps as f32
    }

    #[must_use]
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    #[must_use]
    pub fn birds(&self) -> &[Bird] {
        self.genetic.population().members()
    }

    #[must_use]
    pub fn genetic_algorithm(&self) -> &GeneticAlgorithm<Bird> {
        &self.genetic
    }

    /// The pipe nearest to the birds whose right edge is still ahead of them.
    #[must_use]
    pub fn closest_pipe(&self) -> Option<&Pipe> {
        closest_pipe(&self.pipes, self.config.bird_x, self.config.width)
    }

    /// Advances the game by one tick.
    ///
    /// Returns the summary of the finished generation when this tick started a new one.
    pub fn step(&mut self) -> Result<Option<GenerationSummary>, SimulationError> {
        let mut summary = None;
        if self.tick == self.max_ticks() || self.genetic.num_alive() == 0 {
            summary = Some(self.genetic.next_generation(&mut self.rng)?);
            tracing::debug!(
                ticks = self.tick,
                pipes_spawned = self.pipes_spawned,
                "generation finished"
            );
            self.pipes.clear();
            self.tick = 0;
            self.spawn_counter = 0;
            self.pipes_spawned = 0;
        }

        self.advance_pipes();

        let closest = closest_pipe(&self.pipes, self.config.bird_x, self.config.width);
        for bird in self.genetic.population_mut().members_mut() {
            bird.update(closest)?;
        }

        self.tick += 1;
        Ok(summary)
    }

    /// Spawns a pipe when the spawn interval has elapsed, then moves every pipe and
    /// drops the ones that left the screen.
    fn advance_pipes(&mut self) {
        if self.spawn_counter % Pipe::spawn_interval_for(self.pipes_spawned) == 0 {
            #[expect(clippy::cast_precision_loss)]
            let speed = Pipe::speed_for(self.pipes_spawned) / self.config.fps as f32;
            let pipe = Pipe::new(self.config.width, self.config.height, speed, &mut self.rng);
            self.pipes.push(pipe);
            self.pipes_spawned += 1;
            self.spawn_counter = 0;
        }

        for pipe in &mut self.pipes {
            pipe.update();
        }
        self.pipes.retain(|pipe| !pipe.is_offscreen());
        self.spawn_counter += 1;
    }

    /// Steps until the current generation ends and returns its summary.
    pub fn run_generation(&mut self) -> Result<GenerationSummary, SimulationError> {
        loop {
            if let Some(summary) = self.step()? {
                return Ok(summary);
            }
        }
    }

    /// Runs `generations` full generations.
    pub fn run(&mut self, generations: usize) -> Result<Vec<GenerationSummary>, SimulationError> {
        (0..generations).map(|_| self.run_generation()).collect()
    }
}

fn closest_pipe(pipes: &[Pipe], bird_x: f32, width: f32) -> Option<&Pipe> {
    let mut closest = None;
    let mut best = width;
    for pipe in pipes {
        let distance = pipe.x() + Pipe::WIDTH - bird_x;
        if 0.0 < distance && distance < best {
            best = distance;
            closest = Some(pipe);
        }
    }
    closest
}
