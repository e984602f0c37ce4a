//! Core types for the traffic simulation
//!
//! Geometry, identifiers and the default tuning constants.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Identifier of a segment; indexes the network's segment list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub usize);

/// Identifier of a driver (and the vehicle it owns)
///
/// Allocated monotonically by the world, so ordering by id is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverId(pub usize);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment#{}", self.0)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver#{}", self.0)
    }
}

/// A 2D point in world units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Point, t: f32) -> Point {
        *self + (*other - *self) * t
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, scalar: f32) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, scalar: f32) -> Point {
        Point::new(self.x / scalar, self.y / scalar)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Fixed simulation time step
pub const DT: f32 = 5.0;

/// Speed of a moving vehicle; vehicles are either at this speed or stopped
pub const MAX_VELOCITY: f32 = 1.0;

/// Minimum gap kept to the vehicle ahead
pub const SAFETY_DISTANCE: f32 = 50.0;

/// Chance per step that a new driver enters the network
pub const SPAWN_PROBABILITY: f32 = 0.02;

/// Horizontal offset from a segment end to where its light is drawn
pub const LIGHT_ANCHOR_OFFSET: f32 = 50.0;
