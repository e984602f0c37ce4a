//! Tuning parameters for a simulation run

use anyhow::{ensure, Result};

use super::types::{DT, MAX_VELOCITY, SAFETY_DISTANCE, SPAWN_PROBABILITY};

/// Parameters shared by every driver and by the spawn policy
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Length of one simulation step
    pub dt: f32,
    /// Velocity of a vehicle that is not stopped
    pub max_velocity: f32,
    /// Gap kept to the vehicle ahead
    pub safety_distance: f32,
    /// Probability of spawning one driver per step
    pub spawn_probability: f32,
    /// Seed for reproducible runs; `None` uses the thread RNG
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: DT,
            max_velocity: MAX_VELOCITY,
            safety_distance: SAFETY_DISTANCE,
            spawn_probability: SPAWN_PROBABILITY,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_spawn_probability(mut self, spawn_probability: f32) -> Self {
        self.spawn_probability = spawn_probability;
        self
    }

    /// Distance a moving vehicle covers in one step
    pub fn step_distance(&self) -> f32 {
        self.dt * self.max_velocity
    }

    /// Rejects parameter sets the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.dt.is_finite() && self.dt > 0.0,
            "time step must be positive, got {}",
            self.dt
        );
        ensure!(
            self.max_velocity.is_finite() && self.max_velocity > 0.0,
            "max velocity must be positive, got {}",
            self.max_velocity
        );
        ensure!(
            self.safety_distance.is_finite() && self.safety_distance >= 0.0,
            "safety distance must be non-negative, got {}",
            self.safety_distance
        );
        ensure!(
            (0.0..=1.0).contains(&self.spawn_probability),
            "spawn probability must be within [0, 1], got {}",
            self.spawn_probability
        );
        Ok(())
    }
}
