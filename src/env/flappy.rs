use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use super::{Environment, ACTION_COUNT, FLAP, STATE_SIZE};
use crate::error::{AgentError, Result};

/// Geometry, physics and reward settings of the pipe course.
///
/// Distances are in pixels, times in seconds, velocities in pixels per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlappyConfig {
    pub width: f32,
    pub height: f32,
    /// Fixed horizontal position of the bird's centre.
    pub bird_x: f32,
    /// Vertical position of the bird's centre at the start of an episode.
    pub bird_start_y: f32,
    /// Side of the bird's square hitbox.
    pub bird_size: f32,
    pub gravity: f32,
    /// Vertical velocity set by a flap (negative is up).
    pub flap_velocity: f32,
    pub scroll_speed: f32,
    pub pipe_width: f32,
    /// Height of the opening between the top and bottom pipe.
    pub pipe_gap: f32,
    /// Seconds between two pipe pairs.
    pub spawn_interval: f32,
    /// Range the gap centre is drawn from.
    pub gap_min: f32,
    pub gap_max: f32,
    /// Simulated seconds per tick.
    pub time_step: f32,
    /// Velocity is divided by this when observed.
    pub velocity_scale: f32,
    pub alive_reward: f32,
    pub death_reward: f32,
    pub seed: Option<u64>,
}

impl Default for FlappyConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            bird_x: 100.0,
            bird_start_y: 300.0,
            bird_size: 30.0,
            gravity: 1000.0,
            flap_velocity: -350.0,
            scroll_speed: 200.0,
            pipe_width: 50.0,
            pipe_gap: 150.0,
            spawn_interval: 1.5,
            gap_min: 100.0,
            gap_max: 500.0,
            time_step: 1.0 / 60.0,
            velocity_scale: 1000.0,
            alive_reward: 0.1,
            death_reward: -100.0,
            seed: None,
        }
    }
}

impl FlappyConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("bird_size", self.bird_size),
            ("scroll_speed", self.scroll_speed),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("spawn_interval", self.spawn_interval),
            ("time_step", self.time_step),
            ("velocity_scale", self.velocity_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AgentError::invalid_parameter(name, "must be a positive number"));
            }
        }
        let finite = [
            ("gravity", self.gravity),
            ("flap_velocity", self.flap_velocity),
            ("alive_reward", self.alive_reward),
            ("death_reward", self.death_reward),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(AgentError::invalid_parameter(name, "must be a finite number"));
            }
        }
        // Gap centres are drawn from [gap_min, gap_max], which must sit inside the world
        if !(0.0..=self.height).contains(&self.gap_min) {
            return Err(AgentError::invalid_parameter("gap_min", "must lie inside the world"));
        }
        if !(0.0..=self.height).contains(&self.gap_max) {
            return Err(AgentError::invalid_parameter("gap_max", "must lie inside the world"));
        }
        if self.gap_min > self.gap_max {
            return Err(AgentError::invalid_parameter("gap_min", "must not exceed gap_max"));
        }
        if !(0.0..=self.height).contains(&self.bird_start_y) {
            return Err(AgentError::invalid_parameter("bird_start_y", "must lie inside the world"));
        }
        Ok(())
    }
}

/// A pipe pair scrolling towards the bird.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    /// Horizontal centre of the pair.
    pub x: f32,
    /// Vertical centre of the opening.
    pub gap_y: f32,
    passed: bool,
}

/// Headless pipe course with one flapping bird.
///
/// Each [`Environment::step`] advances the simulation by one fixed
/// `time_step`. The bird dies when its hitbox touches a pipe or leaves the
/// world vertically. Surviving a tick earns `alive_reward`; dying earns
/// `death_reward`.
pub struct FlappyEnv {
    config: FlappyConfig,
    bird_y: f32,
    bird_velocity: f32,
    pipes: Vec<Pipe>,
    spawn_timer: f32,
    gap_distribution: Uniform<f32>,
    rng: StdRng,
    reward: f32,
    done: bool,
    score: u64,
    pipes_passed: u64,
}

impl FlappyEnv {
    pub fn new(config: FlappyConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let gap_distribution = Uniform::new_inclusive(config.gap_min, config.gap_max);
        let mut env = FlappyEnv {
            bird_y: config.bird_start_y,
            bird_velocity: 0.0,
            pipes: Vec::new(),
            spawn_timer: 0.0,
            gap_distribution,
            rng,
            reward: 0.0,
            done: false,
            score: 0,
            pipes_passed: 0,
            config,
        };
        env.reset();
        Ok(env)
    }

    pub fn config(&self) -> &FlappyConfig {
        &self.config
    }

    pub fn bird_y(&self) -> f32 {
        self.bird_y
    }

    pub fn bird_velocity(&self) -> f32 {
        self.bird_velocity
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    /// Ticks survived in the current episode.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Pipe pairs the bird has fully cleared in the current episode.
    pub fn pipes_passed(&self) -> u64 {
        self.pipes_passed
    }

    fn spawn_pipe(&mut self) {
        let gap_y = self.gap_distribution.sample(&mut self.rng);
        self.pipes.push(Pipe {
            x: self.config.width,
            gap_y,
            passed: false,
        });
    }

    fn collides(&self) -> bool {
        let half = self.config.bird_size / 2.0;
        let (top, bottom) = (self.bird_y - half, self.bird_y + half);
        if top < 0.0 || bottom > self.config.height {
            return true;
        }
        let reach = (self.config.pipe_width + self.config.bird_size) / 2.0;
        let half_gap = self.config.pipe_gap / 2.0;
        self.pipes.iter().any(|pipe| {
            (pipe.x - self.config.bird_x).abs() < reach
                && (top < pipe.gap_y - half_gap || bottom > pipe.gap_y + half_gap)
        })
    }
}

impl Environment for FlappyEnv {
    fn state_size(&self) -> usize {
        STATE_SIZE
    }

    fn action_count(&self) -> usize {
        ACTION_COUNT
    }

    fn observe(&self) -> Array1<f32> {
        // Closest pipe the bird has not yet left behind
        let next_pipe = self
            .pipes
            .iter()
            .map(|pipe| (pipe.x - self.config.bird_x, pipe))
            .filter(|(dist, _)| *dist > -30.0)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        let (pipe_dist, gap_y) = match next_pipe {
            Some((dist, pipe)) => (dist / self.config.width, pipe.gap_y / self.config.height),
            None => (1.0, 0.5),
        };

        array![
            self.bird_y / self.config.height,
            self.bird_velocity / self.config.velocity_scale,
            pipe_dist,
            gap_y
        ]
    }

    fn step(&mut self, action: usize) {
        if self.done {
            return;
        }
        let dt = self.config.time_step;

        if action == FLAP {
            self.bird_velocity = self.config.flap_velocity;
        }
        self.bird_velocity += self.config.gravity * dt;
        self.bird_y += self.bird_velocity * dt;

        let shift = self.config.scroll_speed * dt;
        for pipe in &mut self.pipes {
            pipe.x -= shift;
        }
        self.pipes.retain(|pipe| pipe.x >= -50.0);

        self.spawn_timer += dt;
        if self.spawn_timer >= self.config.spawn_interval {
            self.spawn_timer -= self.config.spawn_interval;
            self.spawn_pipe();
        }

        let bird_left = self.config.bird_x - self.config.bird_size / 2.0;
        let half_pipe = self.config.pipe_width / 2.0;
        for pipe in &mut self.pipes {
            if !pipe.passed && pipe.x + half_pipe < bird_left {
                pipe.passed = true;
                self.pipes_passed += 1;
            }
        }

        if self.collides() {
            self.done = true;
            self.reward = self.config.death_reward;
        } else {
            self.score += 1;
            self.reward = self.config.alive_reward;
        }
    }

    fn reward(&self) -> f32 {
        self.reward
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn reset(&mut self) {
        self.bird_y = self.config.bird_start_y;
        self.bird_velocity = 0.0;
        self.pipes.clear();
        self.spawn_timer = 0.0;
        self.reward = 0.0;
        self.done = false;
        self.score = 0;
        self.pipes_passed = 0;
        self.spawn_pipe();
    }

    fn obstacles_passed(&self) -> u64 {
        self.pipes_passed
    }
}
