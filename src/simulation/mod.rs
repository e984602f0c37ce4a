//! Standalone traffic simulation module
//!
//! This module contains the whole simulation engine: road network, traffic
//! lights, vehicles, drivers and the world that steps them. It has no
//! rendering dependencies and can be driven from tests or the headless host.

mod config;
mod driver;
mod road_network;
pub mod scenarios;
mod segment;
mod stats;
mod traffic_light;
mod types;
mod vehicle;
mod world;

pub use config::SimConfig;
pub use driver::Driver;
pub use road_network::{RoadNetwork, RoadNetworkBuilder};
pub use segment::Segment;
pub use stats::SimStats;
pub use traffic_light::TrafficLight;
pub use types::{
    DriverId, Point, SegmentId, DT, LIGHT_ANCHOR_OFFSET, MAX_VELOCITY, SAFETY_DISTANCE,
    SPAWN_PROBABILITY,
};
pub use vehicle::Vehicle;
pub use world::{LightState, SimWorld, VehicleState};
