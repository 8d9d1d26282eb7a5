use std::{fmt, sync::Arc};

use rand::Rng;

use neuroflap_nn::{Activation, Layer, NetworkError, NeuralNetwork, ValueRange};
use neuroflap_training::{FitnessTransform, Member};

use crate::{Pipe, Rect, SimulationConfig};

/// Agent whose jumps are decided by a neural network.
///
/// Every tick the bird observes its own state and the closest pipe ahead, jumps when
/// its second output exceeds the first, falls under gravity and scores one point if
/// it is still alive afterwards.
#[derive(Clone)]
pub struct Bird {
    network: NeuralNetwork,
    weight_range: ValueRange,
    bias_range: ValueRange,
    fitness_transform: Arc<dyn FitnessTransform>,
    x: f32,
    start_y: f32,
    y: f32,
    size: f32,
    velocity: f32,
    x_lim: f32,
    y_lim: f32,
    score: u32,
    alive: bool,
}

impl fmt::Debug for Bird {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bird")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("velocity", &self.velocity)
            .field("score", &self.score)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}

impl Bird {
    pub const GRAVITY: f32 = 1.0;
    pub const LIFT: f32 = -25.0;
    /// Fastest upward velocity.
    pub const MIN_VELOCITY: f32 = -15.0;
    pub const OBSERVATION_LEN: usize = 5;
    pub const ACTION_LEN: usize = 2;

    /// Creates a bird at the configured start position with a random network.
    pub fn new<R>(
        config: &SimulationConfig,
        fitness_transform: Arc<dyn FitnessTransform>,
        rng: &mut R,
    ) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let layers = Self::layers(
            &config.hidden_layer_sizes,
            config.weight_range,
            config.bias_range,
        );
        Ok(Self {
            network: NeuralNetwork::from_layers(layers, rng)?,
            weight_range: config.weight_range,
            bias_range: config.bias_range,
            fitness_transform,
            x: config.bird_x,
            start_y: config.bird_y,
            y: config.bird_y,
            size: config.bird_size,
            velocity: 0.0,
            x_lim: config.width,
            y_lim: config.height,
            score: 0,
            alive: true,
        })
    }

    /// Layer stack of a bird's network: 5 inputs, ReLU hidden layers, 2 linear outputs.
    #[must_use]
    pub fn layers(
        hidden_layer_sizes: &[usize],
        weight_range: ValueRange,
        bias_range: ValueRange,
    ) -> Vec<Layer> {
        let mut layers = Vec::with_capacity(hidden_layer_sizes.len() + 2);
        layers.push(Layer::input(Self::OBSERVATION_LEN));
        layers.extend(
            hidden_layer_sizes
                .iter()
                .map(|&size| Layer::hidden(size, Activation::Relu, weight_range, bias_range)),
        );
        layers.push(Layer::output(
            Self::ACTION_LEN,
            Activation::Linear,
            weight_range,
            bias_range,
        ));
        layers
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Sets the velocity, never going faster upwards than [`Self::MIN_VELOCITY`].
    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity.max(Self::MIN_VELOCITY);
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    #[must_use]
    pub fn is_offscreen(&self) -> bool {
        self.y < 0.0 || self.y + self.size > self.y_lim
    }

    /// Network input: normalized height and velocity, then the closest pipe's top
    /// height, bottom height and x position (zero when there is no pipe).
    #[must_use]
    pub fn observation(&self, closest_pipe: Option<&Pipe>) -> [f32; Self::OBSERVATION_LEN] {
        let mut observation = [
            self.y / self.y_lim,
            self.velocity / Self::MIN_VELOCITY,
            0.0,
            0.0,
            0.0,
        ];
        if let Some(pipe) = closest_pipe {
            observation[2] = pipe.top_height() / self.y_lim;
            observation[3] = pipe.bottom_height() / self.y_lim;
            observation[4] = pipe.x() / self.x_lim;
        }
        observation
    }

    pub fn jump(&mut self) {
        self.set_velocity(self.velocity + Self::LIFT);
    }

    /// Applies gravity, then moves by the new velocity.
    pub fn advance(&mut self) {
        self.set_velocity(self.velocity + Self::GRAVITY);
        self.y += self.velocity;
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Runs one tick: think, move, then die or score.
    ///
    /// Dead birds are left untouched.
    pub fn update(&mut self, closest_pipe: Option<&Pipe>) -> Result<(), NetworkError> {
        if !self.alive {
            return Ok(());
        }

        let action = self.network.feedforward(&self.observation(closest_pipe))?;
        if action[0] < action[1] {
            self.jump();
        }
        self.advance();

        let rect = self.rect();
        if self.is_offscreen() || closest_pipe.is_some_and(|pipe| pipe.collides_with(&rect)) {
            self.alive = false;
            return Ok(());
        }
        self.score += 1;
        Ok(())
    }
}

impl Member for Bird {
    fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }

    fn weight_range(&self) -> ValueRange {
        self.weight_range
    }

    fn bias_range(&self) -> ValueRange {
        self.bias_range
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn fitness(&self) -> f32 {
        self.fitness_transform.fitness(self.score)
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn reset(&mut self) {
        self.velocity = 0.0;
        self.y = self.start_y;
        self.score = 0;
        self.alive = true;
    }
}

#[cfg(test)]
mod tests {
    use neuroflap_nn::Matrix;
    use neuroflap_training::FitnessKind;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            width: 800.0,
            height: 600.0,
            bird_x: 100.0,
            bird_y: 300.0,
            bird_size: 20.0,
            hidden_layer_sizes: vec![4, 4],
            ..SimulationConfig::default()
        }
    }

    fn bird() -> Bird {
        let mut rng = Pcg32::seed_from_u64(0);
        Bird::new(&config(), Arc::new(FitnessKind::Squared), &mut rng).unwrap()
    }

    /// A bird whose network always outputs `[0, jump]` regardless of input.
    fn scripted_bird(jump: bool) -> Bird {
        let mut bird = bird();
        let mut chromosome = bird.chromosome();
        for weights in &mut chromosome.weights {
            *weights = Matrix::zeros(weights.rows(), weights.cols()).unwrap();
        }
        let last = chromosome.biases.len() - 1;
        for bias in &mut chromosome.biases[..last] {
            *bias = Matrix::zeros(bias.rows(), 1).unwrap();
        }
        chromosome.biases[last] =
            Matrix::column(&[0.0, if jump { 1.0 } else { -1.0 }]).unwrap();
        bird.set_chromosome(chromosome).unwrap();
        bird
    }

    #[test]
    fn test_network_shape() {
        let bird = bird();
        let sizes: Vec<_> = bird.network().layers().iter().map(Layer::size).collect();
        assert_eq!(sizes, vec![5, 4, 4, 2]);
    }

    #[test]
    fn test_observation() {
        let mut bird = bird();
        bird.set_velocity(-7.5);
        assert_eq!(bird.observation(None), [0.5, 0.5, 0.0, 0.0, 0.0]);

        let pipe = Pipe::with_gap(400.0, 300.0, 600.0, 5.0);
        let observation = bird.observation(Some(&pipe));
        assert_eq!(observation[2], 0.5);
        assert_eq!(observation[3], 500.0 / 600.0);
        assert_eq!(observation[4], 0.5);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut bird = bird();
        bird.set_velocity(-100.0);
        assert_eq!(bird.velocity(), Bird::MIN_VELOCITY);
        bird.set_velocity(8.0);
        assert_eq!(bird.velocity(), 8.0);
    }

    #[test]
    fn test_jump_and_advance() {
        let mut bird = bird();
        bird.jump();
        assert_eq!(bird.velocity(), Bird::MIN_VELOCITY);
        bird.advance();
        assert_eq!(bird.velocity(), -14.0);
        assert_eq!(bird.y(), 286.0);

        bird.set_velocity(0.0);
        bird.advance();
        assert_eq!(bird.velocity(), 1.0);
        assert_eq!(bird.y(), 287.0);
    }

    #[test]
    fn test_offscreen() {
        let mut bird = bird();
        assert!(!bird.is_offscreen());
        bird.y = -1.0;
        assert!(bird.is_offscreen());
        bird.y = 581.0;
        assert!(bird.is_offscreen());
        bird.y = 580.0;
        assert!(!bird.is_offscreen());
    }

    #[test]
    fn test_update_scores_while_alive() {
        let mut bird = scripted_bird(false);
        for _ in 0..3 {
            bird.update(None).unwrap();
        }
        assert!(bird.is_alive());
        assert_eq!(bird.score(), 3);
        assert_eq!(bird.fitness(), 9.0);
        // falling: 1 + 2 + 3
        assert_eq!(bird.y(), 306.0);
    }

    #[test]
    fn test_update_jumps_when_second_output_is_larger() {
        let mut bird = scripted_bird(true);
        bird.update(None).unwrap();
        assert_eq!(bird.velocity(), -14.0);
        assert_eq!(bird.y(), 286.0);
    }

    #[test]
    fn test_dies_when_falling_offscreen() {
        let mut bird = scripted_bird(false);
        let mut ticks = 0;
        while bird.is_alive() {
            bird.update(None).unwrap();
            ticks += 1;
            assert!(ticks < 1_000);
        }
        assert!(bird.y() + bird.size() > 600.0);
        assert_eq!(bird.score(), ticks - 1);

        let score = bird.score();
        bird.update(None).unwrap();
        assert_eq!(bird.score(), score);
    }

    #[test]
    fn test_dies_on_pipe_collision() {
        let mut bird = scripted_bird(false);
        // top obstacle reaches below the bird
        let pipe = Pipe::with_gap(90.0, 400.0, 600.0, 5.0);
        bird.update(Some(&pipe)).unwrap();
        assert!(!bird.is_alive());
        assert_eq!(bird.score(), 0);
    }

    #[test]
    fn test_reset() {
        let mut bird = scripted_bird(false);
        for _ in 0..5 {
            bird.update(None).unwrap();
        }
        bird.kill();
        bird.reset();
        assert!(bird.is_alive());
        assert_eq!(bird.score(), 0);
        assert_eq!(bird.fitness(), 0.0);
        assert_eq!(bird.y(), 300.0);
        assert_eq!(bird.velocity(), 0.0);
    }

    #[test]
    fn test_custom_fitness_transform() {
        let mut rng = Pcg32::seed_from_u64(1);
        let transform = |score: u32| -> f32 { if score > 0 { 1.0 } else { 0.0 } };
        let mut bird = Bird::new(&config(), Arc::new(transform), &mut rng).unwrap();
        bird.score = 4;
        assert_eq!(bird.fitness(), 1.0);
    }
}
