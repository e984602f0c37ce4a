//! Reference road networks
//!
//! Coordinates are in screen units with y pointing down, matching the
//! window a renderer would draw into.

use anyhow::Result;

use super::road_network::{RoadNetwork, RoadNetworkBuilder};
use super::types::Point;

/// Green for one half-cycle, red for the other
pub const GREEN_FIRST: [f32; 2] = [150.0, 150.0];

/// The same cycle shifted by half: the zero-length green makes it start red
pub const RED_FIRST: [f32; 3] = [0.0, 150.0, 150.0];

/// Two consecutive segments, one entry, no lights
pub fn two_segment_chain() -> Result<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let a = builder.add_segment(Point::new(0.0, 0.0), Point::new(100.0, 0.0))?;
    let b = builder.add_segment(Point::new(100.0, 0.0), Point::new(100.0, 100.0))?;
    builder.add_successor(a, b)?;
    builder.add_entry(a)?;
    builder.build()
}

/// Two signalled approaches merging into one exit road.
///
/// ```text
///  a \
///     >-- c
///  b /
/// ```
/// The lights on `a` and `b` run in opposite phase.
pub fn simple_y_merge() -> Result<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let merge = Point::new(400.0, 300.0);

    let a = builder.add_segment(Point::new(100.0, 100.0), merge)?;
    let b = builder.add_segment(Point::new(100.0, 500.0), merge)?;
    let c = builder.add_segment(merge, Point::new(800.0, 300.0))?;

    builder.add_successor(a, c)?;
    builder.add_successor(b, c)?;
    builder.set_traffic_light(a, GREEN_FIRST.to_vec())?;
    builder.set_traffic_light(b, RED_FIRST.to_vec())?;
    builder.add_entry(a)?;
    builder.add_entry(b)?;
    builder.build()
}

/// Two entry roads, each followed by a signalled approach, merging into a
/// long exit road.
///
/// ```text
///  a -- c \
///          >-- e
///  b -- d /
/// ```
pub fn extended_two_entry() -> Result<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let merge = Point::new(500.0, 300.0);

    let a = builder.add_segment(Point::new(50.0, 100.0), Point::new(300.0, 180.0))?;
    let b = builder.add_segment(Point::new(50.0, 500.0), Point::new(300.0, 420.0))?;
    let c = builder.add_segment(Point::new(300.0, 180.0), merge)?;
    let d = builder.add_segment(Point::new(300.0, 420.0), merge)?;
    let e = builder.add_segment(merge, Point::new(950.0, 300.0))?;

    builder.add_successor(a, c)?;
    builder.add_successor(b, d)?;
    builder.add_successor(c, e)?;
    builder.add_successor(d, e)?;
    builder.set_traffic_light(c, GREEN_FIRST.to_vec())?;
    builder.set_traffic_light(d, RED_FIRST.to_vec())?;
    builder.add_entry(a)?;
    builder.add_entry(b)?;
    builder.build()
}
