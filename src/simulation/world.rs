//! Main simulation world that ties everything together
//!
//! `SimWorld` owns the road network and every active driver, advances the
//! clock in fixed steps and exposes the state a renderer needs.

use std::collections::BTreeMap;

use anyhow::{ensure, Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::config::SimConfig;
use super::driver::Driver;
use super::road_network::RoadNetwork;
use super::stats::SimStats;
use super::types::{DriverId, Point, SegmentId};
use super::vehicle::Vehicle;

/// Where a vehicle is and how fast it goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub driver: DriverId,
    pub segment: SegmentId,
    pub position: Point,
    pub velocity: f32,
}

/// Colour of one traffic light and where to draw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub segment: SegmentId,
    pub anchor: Point,
    pub is_red: bool,
}

/// The main simulation world
pub struct SimWorld {
    network: RoadNetwork,

    /// Active drivers; ids grow monotonically so iteration is insertion order
    drivers: BTreeMap<DriverId, Driver>,

    config: SimConfig,

    /// Simulation time
    time: f32,

    /// Next ID to assign
    next_id: usize,

    /// Seeded RNG for reproducible runs; the thread RNG is used otherwise
    rng: Option<StdRng>,

    stats: SimStats,
}

impl SimWorld {
    pub fn new(mut network: RoadNetwork, config: SimConfig) -> Result<Self> {
        config.validate().context("invalid simulation config")?;

        for (segment, successors) in network.branch_points() {
            warn!(
                "{} has {} successors; routes only follow the first one",
                segment, successors
            );
        }

        network.update_traffic_lights(0.0);
        let rng = config.seed.map(StdRng::seed_from_u64);

        Ok(Self {
            network,
            drivers: BTreeMap::new(),
            config,
            time: 0.0,
            next_id: 0,
            rng,
            stats: SimStats::default(),
        })
    }

    fn random_bool(&mut self, probability: f32) -> bool {
        let probability = f64::from(probability);
        match &mut self.rng {
            Some(rng) => rng.random_bool(probability),
            None => rand::rng().random_bool(probability),
        }
    }

    fn random_index(&mut self, len: usize) -> usize {
        match &mut self.rng {
            Some(rng) => rng.random_range(0..len),
            None => rand::rng().random_range(0..len),
        }
    }

    fn next_driver_id(&mut self) -> DriverId {
        let id = DriverId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Active drivers in insertion order
    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    pub fn driver(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(&id)
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// Adds a driver at the start of `entry`, routed along its successor chain
    pub fn spawn_driver(&mut self, entry: SegmentId) -> Result<DriverId> {
        let route = self.network.find_path(entry);
        ensure!(!route.is_empty(), "cannot spawn on unknown {}", entry);
        self.insert_driver(route, 0.0)
    }

    /// Adds a driver `offset` units along the first segment of `route`.
    ///
    /// The driver only shows up in segment occupancy after the next
    /// rebuild, see [`SimWorld::refresh_occupancy`].
    pub fn insert_driver(&mut self, route: Vec<SegmentId>, offset: f32) -> Result<DriverId> {
        for segment in &route {
            ensure!(
                self.network.segment(*segment).is_some(),
                "route contains unknown {}",
                segment
            );
        }
        if let Some(first) = route.first().and_then(|id| self.network.segment(*id)) {
            ensure!(
                offset <= first.length(),
                "offset {} is past the end of {}",
                offset,
                first.id()
            );
        }

        let id = self.next_driver_id();
        let driver = Driver::new_at(id, Vehicle::new(self.config.max_velocity), route, offset)?;
        debug!("Spawned {} on route {:?}", id, driver.route());

        self.drivers.insert(id, driver);
        self.stats.total_drivers_spawned += 1;
        Ok(id)
    }

    /// Advances the simulation by one time step
    pub fn step(&mut self) -> Result<()> {
        self.time += self.config.dt;
        self.stats.ticks += 1;

        // Drivers must see the lights of the new time
        self.network.update_traffic_lights(self.time);

        self.update_drivers()?;
        self.remove_finished_drivers();
        self.maybe_spawn_driver()?;

        // Next step's car-following reads this
        self.refresh_occupancy();

        Ok(())
    }

    /// Runs `ticks` steps, stopping at the first error
    pub fn run_for(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Decides, moves and hands over each driver in turn, so later drivers
    /// already see the moves of earlier ones.
    fn update_drivers(&mut self) -> Result<()> {
        let driver_ids: Vec<DriverId> = self.drivers.keys().copied().collect();

        for driver_id in driver_ids {
            let Some(mut driver) = self.drivers.remove(&driver_id) else {
                continue;
            };

            driver.drive(&self.network, &self.drivers, &self.config);
            driver.vehicle_mut().integrate(self.config.dt);
            let handover = driver.check_if_end_of_segment_reached(&self.network);

            self.drivers.insert(driver_id, driver);
            handover.with_context(|| format!("failed to advance {}", driver_id))?;
        }

        Ok(())
    }

    fn remove_finished_drivers(&mut self) {
        let before = self.drivers.len();
        self.drivers.retain(|id, driver| {
            if driver.to_be_removed() {
                debug!("Removing {} after its route", id);
                false
            } else {
                true
            }
        });
        self.stats.total_drivers_completed += (before - self.drivers.len()) as u64;
    }

    fn maybe_spawn_driver(&mut self) -> Result<Option<DriverId>> {
        if !self.random_bool(self.config.spawn_probability) {
            return Ok(None);
        }

        let entry_count = self.network.entry_segments().len();
        if entry_count == 0 {
            return Ok(None);
        }
        let index = self.random_index(entry_count);
        let entry = self.network.entry_segments()[index];

        self.spawn_driver(entry).map(Some)
    }

    /// Rebuilds every segment's occupancy from the current drivers
    pub fn refresh_occupancy(&mut self) {
        for segment in self.network.segments_mut() {
            segment.clear_cars();
        }

        for (id, driver) in &self.drivers {
            let vehicle = driver.vehicle();
            if let Some(segment) = vehicle
                .current_segment()
                .and_then(|segment| self.network.segment_mut(segment))
            {
                segment.insert_car(vehicle.offset(), *id);
            }
        }
    }

    /// Position and velocity of every active vehicle
    pub fn vehicle_states(&self) -> Vec<VehicleState> {
        self.drivers
            .values()
            .filter_map(|driver| {
                let vehicle = driver.vehicle();
                Some(VehicleState {
                    driver: driver.id(),
                    segment: vehicle.current_segment()?,
                    position: vehicle.position(&self.network)?,
                    velocity: vehicle.velocity(),
                })
            })
            .collect()
    }

    /// Colour and anchor of every traffic light
    pub fn traffic_light_states(&self) -> Vec<LightState> {
        self.network
            .segments()
            .iter()
            .filter_map(|segment| {
                segment.traffic_light().map(|light| LightState {
                    segment: segment.id(),
                    anchor: segment.light_anchor(),
                    is_red: light.is_red(),
                })
            })
            .collect()
    }

    /// Logs a summary of the world state
    pub fn log_summary(&self) {
        info!("=== Traffic Simulation Summary ===");
        info!("Time: {:.1} ({} ticks)", self.time, self.stats.ticks);
        info!(
            "Segments: {}, Connections: {}, Traffic lights: {}",
            self.network.segment_count(),
            self.network.connection_count(),
            self.network.traffic_light_count()
        );
        info!("Active drivers: {}", self.drivers.len());

        for light in self.traffic_light_states() {
            info!(
                "  Light on {}: {}",
                light.segment,
                if light.is_red { "red" } else { "green" }
            );
        }

        for state in self.vehicle_states() {
            info!(
                "  {} on {}: position={}, velocity={:.1}",
                state.driver, state.segment, state.position, state.velocity
            );
        }
    }
}
