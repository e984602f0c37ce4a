//! Vehicle kinematics
//!
//! Standalone implementation; the owning driver decides the velocity.

use super::road_network::RoadNetwork;
use super::types::{Point, SegmentId};

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    current_segment: Option<SegmentId>,
    /// Distance travelled along the current segment
    offset: f32,
    velocity: f32,
    max_velocity: f32,
}

impl Vehicle {
    /// A vehicle that is not yet placed on any segment
    pub fn new(max_velocity: f32) -> Self {
        Self {
            current_segment: None,
            offset: 0.0,
            velocity: max_velocity,
            max_velocity,
        }
    }

    pub fn current_segment(&self) -> Option<SegmentId> {
        self.current_segment
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    pub fn is_stopped(&self) -> bool {
        self.velocity == 0.0
    }

    pub(crate) fn place(&mut self, segment: SegmentId, offset: f32) {
        self.current_segment = Some(segment);
        self.offset = offset;
    }

    pub(crate) fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    pub(crate) fn stop(&mut self) {
        self.velocity = 0.0;
    }

    pub(crate) fn go(&mut self) {
        self.velocity = self.max_velocity;
    }

    pub fn integrate(&mut self, dt: f32) {
        self.offset += dt * self.velocity;
    }

    /// World position, if the vehicle is on a known segment
    pub fn position(&self, network: &RoadNetwork) -> Option<Point> {
        let segment = network.segment(self.current_segment?)?;
        Some(segment.get_position(self.offset))
    }
}
