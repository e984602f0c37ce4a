//! Signalized traffic simulation library
//!
//! Vehicles follow fixed routes over a directed road network, keeping a
//! safety distance to the vehicle ahead and stopping at red lights.

pub mod simulation;
