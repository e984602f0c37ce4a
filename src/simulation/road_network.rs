//! Road network graph
//!
//! The network is assembled once through [`RoadNetworkBuilder`] and frozen
//! afterwards; only traffic-light phases and the per-segment occupancy index
//! change while the simulation runs.

use std::collections::HashMap;

use anyhow::{bail, ensure, Context, Result};
use log::debug;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use super::segment::Segment;
use super::traffic_light::TrafficLight;
use super::types::{Point, SegmentId};

/// Collects segments, connections, lights and entry points, then validates
/// the whole topology in [`RoadNetworkBuilder::build`].
#[derive(Default)]
pub struct RoadNetworkBuilder {
    segments: Vec<Segment>,
    entries: Vec<SegmentId>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment from `start` to `end`; fails when the two coincide
    pub fn add_segment(&mut self, start: Point, end: Point) -> Result<SegmentId> {
        let id = SegmentId(self.segments.len());
        self.segments.push(Segment::new(id, start, end)?);
        Ok(id)
    }

    /// Lets vehicles continue from `from` onto `to`
    pub fn add_successor(&mut self, from: SegmentId, to: SegmentId) -> Result<()> {
        self.check_known(to)?;
        self.segment_mut(from)?.add_successor(to);
        Ok(())
    }

    /// Places a light at the end of `segment`
    pub fn set_traffic_light(&mut self, segment: SegmentId, phases: Vec<f32>) -> Result<()> {
        let light = TrafficLight::new(phases)
            .with_context(|| format!("invalid traffic light on {}", segment))?;
        self.segment_mut(segment)?.set_traffic_light(light);
        Ok(())
    }

    /// Marks `segment` as a place where new drivers may appear
    pub fn add_entry(&mut self, segment: SegmentId) -> Result<()> {
        self.check_known(segment)?;
        if !self.entries.contains(&segment) {
            self.entries.push(segment);
        }
        Ok(())
    }

    pub fn build(self) -> Result<RoadNetwork> {
        ensure!(!self.segments.is_empty(), "road network has no segments");
        ensure!(!self.entries.is_empty(), "road network has no entry segments");

        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = self
            .segments
            .iter()
            .map(|segment| graph.add_node(segment.id()))
            .collect();
        for segment in &self.segments {
            for successor in segment.successors() {
                graph.add_edge(nodes[segment.id().0], nodes[successor.0], ());
            }
        }

        // Route planning walks successor chains to their end, which never
        // happens on a cycle.
        if is_cyclic_directed(&graph) {
            bail!("road network contains a cycle");
        }

        debug!(
            "Built road network: {} segments, {} connections, {} entries",
            graph.node_count(),
            graph.edge_count(),
            self.entries.len()
        );

        Ok(RoadNetwork {
            segments: self.segments,
            entries: self.entries,
            graph,
        })
    }

    fn check_known(&self, id: SegmentId) -> Result<()> {
        ensure!(id.0 < self.segments.len(), "unknown {}", id);
        Ok(())
    }

    fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment> {
        self.segments
            .get_mut(id.0)
            .with_context(|| format!("unknown {}", id))
    }
}

/// A frozen, acyclic set of segments
pub struct RoadNetwork {
    segments: Vec<Segment>,
    entries: Vec<SegmentId>,
    /// Successor relation, one node per segment in segment order
    graph: DiGraph<SegmentId, ()>,
}

impl RoadNetwork {
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
        self.segments.iter_mut()
    }

    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.get_mut(id.0)
    }

    pub fn entry_segments(&self) -> &[SegmentId] {
        &self.entries
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn traffic_light_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| segment.traffic_light().is_some())
            .count()
    }

    /// Route from `start` to the end of its successor chain, `start` included.
    ///
    /// Only the first successor of each segment is followed. An unknown
    /// `start` yields an empty route.
    pub fn find_path(&self, start: SegmentId) -> Vec<SegmentId> {
        let mut path = Vec::new();
        let mut current = self.segment(start);

        // The builder rejects cycles; the bound keeps the walk finite anyway.
        while let Some(segment) = current {
            if path.len() == self.segments.len() {
                break;
            }
            path.push(segment.id());
            current = segment
                .successors()
                .first()
                .and_then(|next| self.segment(*next));
        }

        path
    }

    /// Recomputes every light's phase for the absolute time `time`
    pub fn update_traffic_lights(&mut self, time: f32) {
        for light in self
            .segments
            .iter_mut()
            .filter_map(|segment| segment.traffic_light_mut())
        {
            light.update_state(time);
        }
    }

    /// Successor counts keyed by segment, for segments that branch
    pub fn branch_points(&self) -> HashMap<SegmentId, usize> {
        self.graph
            .node_indices()
            .filter_map(|node| {
                let out = self.graph.neighbors(node).count();
                (out > 1).then(|| (self.graph[node], out))
            })
            .collect()
    }
}
