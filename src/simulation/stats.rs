//! Run statistics

/// Counters accumulated over a simulation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimStats {
    pub ticks: u64,
    pub total_drivers_spawned: u64,
    pub total_drivers_completed: u64,
}

impl SimStats {
    /// Share of spawned drivers that finished their route, in percent
    pub fn completion_rate(&self) -> f32 {
        if self.total_drivers_spawned > 0 {
            self.total_drivers_completed as f32 / self.total_drivers_spawned as f32 * 100.0
        } else {
            0.0
        }
    }
}
