//! Directed road segments
//!
//! A segment is a straight stretch of road from `start` to `end`. Besides its
//! fixed geometry it carries an optional traffic light at its end, the
//! segments a vehicle may continue onto, and an index of the vehicles on it.

use anyhow::{ensure, Result};
use ordered_float::OrderedFloat;
use sorted_vec::SortedVec;

use super::traffic_light::TrafficLight;
use super::types::{DriverId, Point, SegmentId, LIGHT_ANCHOR_OFFSET};

#[derive(Debug, Clone)]
pub struct Segment {
    id: SegmentId,
    start: Point,
    end: Point,
    length: f32,
    successors: Vec<SegmentId>,
    traffic_light: Option<TrafficLight>,
    /// Vehicles on this segment as of the last occupancy rebuild, ordered by
    /// offset then id. Never owns the vehicles.
    cars: SortedVec<(OrderedFloat<f32>, DriverId)>,
}

impl Segment {
    pub fn new(id: SegmentId, start: Point, end: Point) -> Result<Self> {
        let length = start.distance(&end);
        ensure!(
            length.is_finite() && length > 0.0,
            "{} from {} to {} has no length",
            id,
            start,
            end
        );

        Ok(Self {
            id,
            start,
            end,
            length,
            successors: Vec::new(),
            traffic_light: None,
            cars: SortedVec::new(),
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn add_successor(&mut self, successor: SegmentId) {
        self.successors.push(successor);
    }

    pub fn successors(&self) -> &[SegmentId] {
        &self.successors
    }

    pub fn set_traffic_light(&mut self, light: TrafficLight) {
        self.traffic_light = Some(light);
    }

    pub fn traffic_light(&self) -> Option<&TrafficLight> {
        self.traffic_light.as_ref()
    }

    pub fn traffic_light_mut(&mut self) -> Option<&mut TrafficLight> {
        self.traffic_light.as_mut()
    }

    /// Where a renderer places this segment's light
    pub fn light_anchor(&self) -> Point {
        self.end + Point::new(LIGHT_ANCHOR_OFFSET, 0.0)
    }

    /// World position `offset` units along the segment
    pub fn get_position(&self, offset: f32) -> Point {
        self.start + (self.end - self.start) * offset / self.length
    }

    /// Drivers on the segment, nearest to the start first
    pub fn cars(&self) -> impl Iterator<Item = DriverId> + '_ {
        self.cars.iter().map(|(_, id)| *id)
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub(crate) fn clear_cars(&mut self) {
        self.cars.clear();
    }

    pub(crate) fn insert_car(&mut self, offset: f32, driver: DriverId) {
        self.cars.insert((OrderedFloat(offset), driver));
    }
}
