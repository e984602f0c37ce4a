//! Driver behaviour
//!
//! A driver owns one vehicle and the route it follows. Each step it decides
//! whether the vehicle may move (car-following and red-light checks), and
//! after the vehicle has moved it hands the vehicle over to the next segment
//! of the route.

use std::collections::BTreeMap;

use anyhow::{ensure, Context, Result};
use log::{debug, warn};

use super::config::SimConfig;
use super::road_network::RoadNetwork;
use super::segment::Segment;
use super::types::{DriverId, SegmentId};
use super::vehicle::Vehicle;

#[derive(Debug, Clone)]
pub struct Driver {
    id: DriverId,
    vehicle: Vehicle,
    route: Vec<SegmentId>,
    /// Index of the next segment to enter; everything before it is consumed
    cursor: usize,
    to_be_removed: bool,
}

impl Driver {
    /// Places `vehicle` at the start of the route's first segment
    pub fn new(id: DriverId, vehicle: Vehicle, route: Vec<SegmentId>) -> Result<Self> {
        Self::new_at(id, vehicle, route, 0.0)
    }

    /// Places `vehicle` `offset` units along the route's first segment
    pub fn new_at(
        id: DriverId,
        mut vehicle: Vehicle,
        route: Vec<SegmentId>,
        offset: f32,
    ) -> Result<Self> {
        let first = *route.first().with_context(|| format!("{} has an empty route", id))?;
        ensure!(
            offset.is_finite() && offset >= 0.0,
            "{} cannot start at offset {}",
            id,
            offset
        );
        vehicle.place(first, offset);

        Ok(Self {
            id,
            vehicle,
            route,
            cursor: 1,
            to_be_removed: false,
        })
    }

    pub fn id(&self) -> DriverId {
        self.id
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn vehicle_mut(&mut self) -> &mut Vehicle {
        &mut self.vehicle
    }

    /// The full route, including segments already driven
    pub fn route(&self) -> &[SegmentId] {
        &self.route
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Segments still to be entered, in order
    pub fn remaining_route(&self) -> &[SegmentId] {
        &self.route[self.cursor.min(self.route.len())..]
    }

    pub fn to_be_removed(&self) -> bool {
        self.to_be_removed
    }

    /// Puts the vehicle back at the start of its route
    pub fn restart_route(&mut self) {
        self.vehicle.place(self.route[0], 0.0);
        self.cursor = 1;
        self.to_be_removed = false;
    }

    fn next_segment(&mut self) -> Option<SegmentId> {
        let next = self.route.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(next)
    }

    /// Whether a vehicle at full speed covers `distance` within one step
    fn would_reach(distance: f32, config: &SimConfig) -> bool {
        distance < config.step_distance()
    }

    /// Sets the velocity for this step: stopped when closing in on the
    /// vehicle ahead or on a red light, full speed otherwise.
    pub fn drive(
        &mut self,
        network: &RoadNetwork,
        drivers: &BTreeMap<DriverId, Driver>,
        config: &SimConfig,
    ) {
        if self.too_close_to_next_car(network, drivers, config)
            || self.too_close_to_red_light(network, config)
        {
            self.vehicle.stop();
        } else {
            self.vehicle.go();
        }
    }

    fn current_segment<'a>(&self, network: &'a RoadNetwork) -> Option<&'a Segment> {
        network.segment(self.vehicle.current_segment()?)
    }

    fn too_close_to_next_car(
        &self,
        network: &RoadNetwork,
        drivers: &BTreeMap<DriverId, Driver>,
        config: &SimConfig,
    ) -> bool {
        match self.distance_to_next_vehicle(network, drivers) {
            Some(distance) => Self::would_reach(distance - config.safety_distance, config),
            None => false,
        }
    }

    fn too_close_to_red_light(&self, network: &RoadNetwork, config: &SimConfig) -> bool {
        let Some(segment) = self.current_segment(network) else {
            return false;
        };
        match segment.traffic_light() {
            Some(light) if light.is_red() => {
                Self::would_reach(segment.length() - self.vehicle.offset(), config)
            }
            _ => false,
        }
    }

    /// Distance along the route to the nearest vehicle ahead.
    ///
    /// Looks at the vehicles listed after this one on the current segment,
    /// then at the remaining route segments in order, stopping at the first
    /// segment that has any vehicle. Offsets are read from the live drivers,
    /// so a leader already moved this step is seen at its new offset, on the
    /// segment it is on now.
    pub fn distance_to_next_vehicle(
        &self,
        network: &RoadNetwork,
        drivers: &BTreeMap<DriverId, Driver>,
    ) -> Option<f32> {
        let segment = self.current_segment(network)?;
        let own_offset = self.vehicle.offset();

        let mut listed = segment.cars().skip_while(|id| *id != self.id);
        let leader = if listed.next().is_some() {
            listed.find_map(|id| drivers.get(&id))
        } else {
            // Not indexed yet, e.g. placed since the last rebuild
            segment
                .cars()
                .filter_map(|id| drivers.get(&id))
                .find(|other| other.id != self.id && other.vehicle.offset() > own_offset)
        };
        let mut travelled = segment.length() - own_offset;
        if let Some(leader) = leader {
            let leader_segment = leader.vehicle.current_segment();
            if leader_segment == Some(segment.id()) {
                return Some(leader.vehicle.offset() - own_offset);
            }
            // The leader crossed over earlier this step but is still indexed
            // here; measure it on the segment it moved onto.
            if leader_segment.is_some() && leader_segment == self.remaining_route().first().copied()
            {
                return Some(travelled + leader.vehicle.offset());
            }
        }

        for next in self.remaining_route() {
            let next = network.segment(*next)?;
            if let Some(leader) = next.cars().find_map(|id| drivers.get(&id)) {
                return Some(travelled + leader.vehicle.offset());
            }
            travelled += next.length();
        }

        None
    }

    /// Moves the vehicle onto the next route segment once it has run past
    /// the end of the current one.
    ///
    /// The overshoot is carried into the next segment once; it is not
    /// distributed over further segments even if it exceeds the next length.
    /// With the route exhausted the driver is flagged for removal and the
    /// vehicle stays at the end of its last segment.
    pub fn check_if_end_of_segment_reached(&mut self, network: &RoadNetwork) -> Result<()> {
        let segment_id = self
            .vehicle
            .current_segment()
            .with_context(|| format!("{} has no current segment", self.id))?;
        let length = network
            .segment(segment_id)
            .with_context(|| format!("{} is on unknown {}", self.id, segment_id))?
            .length();

        if self.vehicle.offset() <= length {
            return Ok(());
        }

        match self.next_segment() {
            Some(next) => {
                let next_length = network
                    .segment(next)
                    .with_context(|| format!("{} routed onto unknown {}", self.id, next))?
                    .length();
                let carried = self.vehicle.offset() - length;
                if carried > next_length {
                    warn!(
                        "{} carries {:.1} onto {} which is only {:.1} long",
                        self.id, carried, next, next_length
                    );
                }
                debug!("{} moved from {} to {}", self.id, segment_id, next);
                self.vehicle.place(next, carried);
            }
            None => {
                debug!("{} reached the end of its route", self.id);
                self.vehicle.set_offset(length);
                self.to_be_removed = true;
            }
        }

        Ok(())
    }
}
