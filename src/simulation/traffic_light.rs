//! Fixed-cycle traffic light
//!
//! A light is a list of phase durations that alternate green and red,
//! starting with green. The active phase is a pure function of the absolute
//! simulation time, so a light never accumulates state of its own.

use anyhow::{ensure, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficLight {
    phases: Vec<f32>,
    /// Cumulative end time of each phase within one cycle
    boundaries: Vec<f32>,
    cycle_time: f32,
    phase: usize,
}

impl TrafficLight {
    /// Builds a light from phase durations.
    ///
    /// Zero-length phases are allowed and are simply never active, which is
    /// how a light can start on red: `[0.0, red, green]`.
    pub fn new(phases: Vec<f32>) -> Result<Self> {
        ensure!(!phases.is_empty(), "traffic light needs at least one phase");
        ensure!(
            phases.iter().all(|d| d.is_finite() && *d >= 0.0),
            "traffic light phases must be finite and non-negative: {:?}",
            phases
        );

        let boundaries: Vec<f32> = phases
            .iter()
            .scan(0.0, |acc, d| {
                *acc += d;
                Some(*acc)
            })
            .collect();
        let cycle_time = boundaries.last().copied().unwrap_or(0.0);
        ensure!(
            cycle_time > 0.0,
            "traffic light cycle time must be positive: {:?}",
            phases
        );

        Ok(Self {
            phases,
            boundaries,
            cycle_time,
            phase: 0,
        })
    }

    /// Phase active at `time`: the first phase whose cumulative boundary lies
    /// strictly after the time within the cycle.
    pub fn phase_at(&self, time: f32) -> usize {
        let in_cycle = time.rem_euclid(self.cycle_time);
        let index = self.boundaries.partition_point(|b| *b <= in_cycle);
        // rem_euclid may round up to the cycle time itself
        index.min(self.boundaries.len() - 1)
    }

    pub fn update_state(&mut self, time: f32) {
        self.phase = self.phase_at(time);
    }

    pub fn is_red(&self) -> bool {
        self.phase % 2 == 1
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    pub fn cycle_time(&self) -> f32 {
        self.cycle_time
    }
}
