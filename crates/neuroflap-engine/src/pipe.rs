use rand::Rng;

use neuroflap_nn::ValueRange;

use crate::Rect;

/// A top and a bottom obstacle with a vertical gap of [`Pipe::SPACING`] between them.
///
/// Pipes spawn at the right edge of the screen and move left by a fixed number of
/// pixels per tick. Later pipes move faster and spawn more often.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    x: f32,
    top_height: f32,
    bottom_height: f32,
    speed: f32,
}

impl Pipe {
    pub const WIDTH: f32 = 50.0;
    /// Height of the gap between the two obstacles.
    pub const SPACING: f32 = 200.0;

    /// Pixels per second.
    pub const START_SPEED: u32 = 200;
    pub const MAX_SPEED: u32 = 2000;
    pub const ACC_SPEED: u32 = 10;

    /// Ticks between spawns.
    pub const START_SPAWN_INTERVAL: u32 = 100;
    pub const MIN_SPAWN_INTERVAL: u32 = 50;
    pub const ACC_SPAWN_INTERVAL: u32 = 2;

    /// Spawns a pipe at `x = x_lim` with a random gap position.
    ///
    /// The top obstacle height is drawn from `[SPACING, y_lim - 2 * SPACING)`.
    /// `speed` is in pixels per tick.
    pub fn new<R>(x_lim: f32, y_lim: f32, speed: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let top_height = ValueRange::new(Self::SPACING, y_lim - 2.0 * Self::SPACING).sample(rng);
        Self::with_gap(x_lim, top_height, y_lim, speed)
    }

    /// Creates a pipe at `x` whose top obstacle is `top_height` pixels tall.
    #[must_use]
    pub fn with_gap(x: f32, top_height: f32, y_lim: f32, speed: f32) -> Self {
        Self {
            x,
            top_height,
            bottom_height: y_lim - top_height + Self::SPACING,
            speed,
        }
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn top_height(&self) -> f32 {
        self.top_height
    }

    #[must_use]
    pub fn bottom_height(&self) -> f32 {
        self.bottom_height
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// The top and bottom obstacles.
    #[must_use]
    pub fn rects(&self) -> [Rect; 2] {
        [
            Rect::new(self.x, 0.0, Self::WIDTH, self.top_height),
            Rect::new(
                self.x,
                self.top_height + Self::SPACING,
                Self::WIDTH,
                self.bottom_height,
            ),
        ]
    }

    #[must_use]
    pub fn collides_with(&self, rect: &Rect) -> bool {
        self.rects().iter().any(|r| r.intersects(rect))
    }

    #[must_use]
    pub fn is_offscreen(&self) -> bool {
        self.x < -Self::WIDTH
    }

    /// Moves the pipe one tick to the left; offscreen pipes stay where they are.
    pub fn update(&mut self) {
        if !self.is_offscreen() {
            self.x -= self.speed;
        }
    }

    /// Speed in pixels per second of the pipe spawned after `pipes_spawned` others.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn speed_for(pipes_spawned: u32) -> f32 {
        let speed = Self::START_SPEED.saturating_add(pipes_spawned.saturating_mul(Self::ACC_SPEED));
        speed.min(Self::MAX_SPEED) as f32
    }

    /// Ticks to wait before spawning the pipe that follows `pipes_spawned` others.
    #[must_use]
    pub fn spawn_interval_for(pipes_spawned: u32) -> u32 {
        Self::START_SPAWN_INTERVAL
            .saturating_sub(pipes_spawned.saturating_mul(Self::ACC_SPAWN_INTERVAL))
            .max(Self::MIN_SPAWN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const X_LIM: f32 = 1000.0;
    const Y_LIM: f32 = 800.0;

    #[test]
    fn test_new_pipe_geometry() {
        let mut rng = Pcg32::seed_from_u64(0);
        for _ in 0..1_000 {
            let pipe = Pipe::new(X_LIM, Y_LIM, 5.0, &mut rng);
            assert_eq!(pipe.x(), X_LIM);
            assert!((Pipe::SPACING..=Y_LIM - 2.0 * Pipe::SPACING).contains(&pipe.top_height()));
            assert_eq!(
                pipe.bottom_height(),
                Y_LIM - pipe.top_height() + Pipe::SPACING
            );
        }
    }

    #[test]
    fn test_rects() {
        let pipe = Pipe::with_gap(300.0, 250.0, Y_LIM, 5.0);
        let [top, bottom] = pipe.rects();
        assert_eq!(top, Rect::new(300.0, 0.0, Pipe::WIDTH, 250.0));
        assert_eq!(bottom, Rect::new(300.0, 450.0, Pipe::WIDTH, 750.0));
    }

    #[test]
    fn test_collision() {
        let pipe = Pipe::with_gap(300.0, 250.0, Y_LIM, 5.0);
        assert!(pipe.collides_with(&Rect::new(290.0, 200.0, 40.0, 40.0)));
        assert!(pipe.collides_with(&Rect::new(310.0, 430.0, 40.0, 40.0)));
        assert!(!pipe.collides_with(&Rect::new(310.0, 300.0, 40.0, 40.0)));
        assert!(!pipe.collides_with(&Rect::new(100.0, 200.0, 40.0, 40.0)));
    }

    #[test]
    fn test_update_and_offscreen() {
        let mut pipe = Pipe::with_gap(-40.0, 250.0, Y_LIM, 5.0);
        assert!(!pipe.is_offscreen());
        pipe.update();
        assert_eq!(pipe.x(), -45.0);
        pipe.update();
        pipe.update();
        assert_eq!(pipe.x(), -55.0);
        assert!(pipe.is_offscreen());
        pipe.update();
        assert_eq!(pipe.x(), -55.0);
    }

    #[test]
    fn test_speed_for() {
        assert_eq!(Pipe::speed_for(0), 200.0);
        assert_eq!(Pipe::speed_for(10), 300.0);
        assert_eq!(Pipe::speed_for(180), 2000.0);
        assert_eq!(Pipe::speed_for(500), 2000.0);
        assert_eq!(Pipe::speed_for(u32::MAX), 2000.0);
    }

    #[test]
    fn test_spawn_interval_for() {
        assert_eq!(Pipe::spawn_interval_for(0), 100);
        assert_eq!(Pipe::spawn_interval_for(10), 80);
        assert_eq!(Pipe::spawn_interval_for(25), 50);
        assert_eq!(Pipe::spawn_interval_for(100), 50);
        assert_eq!(Pipe::spawn_interval_for(u32::MAX), 50);
    }
}
