//! Car-following, red-light and segment hand-over tests

use std::collections::BTreeMap;

use signal_sim::simulation::scenarios::two_segment_chain;
use signal_sim::simulation::{
    Driver, DriverId, Point, RoadNetwork, RoadNetworkBuilder, SegmentId, SimConfig, SimWorld,
    Vehicle,
};

/// DT = 5, max velocity = 1, safety distance = 50, no random spawns
fn quiet_config() -> SimConfig {
    SimConfig::default().with_spawn_probability(0.0).with_seed(1)
}

/// A single 300-unit segment, optionally with a light at its end
fn straight_road(light: Option<Vec<f32>>) -> RoadNetwork {
    let mut builder = RoadNetworkBuilder::new();
    let road = builder
        .add_segment(Point::new(0.0, 0.0), Point::new(300.0, 0.0))
        .unwrap();
    if let Some(phases) = light {
        builder.set_traffic_light(road, phases).unwrap();
    }
    builder.add_entry(road).unwrap();
    builder.build().unwrap()
}

fn world_with(network: RoadNetwork, placements: &[(Vec<SegmentId>, f32)]) -> (SimWorld, Vec<DriverId>) {
    let mut world = SimWorld::new(network, quiet_config()).unwrap();
    let ids = placements
        .iter()
        .map(|(route, offset)| world.insert_driver(route.clone(), *offset).unwrap())
        .collect();
    world.refresh_occupancy();
    (world, ids)
}

fn offset_of(world: &SimWorld, id: DriverId) -> f32 {
    world.driver(id).unwrap().vehicle().offset()
}

fn velocity_of(world: &SimWorld, id: DriverId) -> f32 {
    world.driver(id).unwrap().vehicle().velocity()
}

#[test]
fn test_trailing_vehicle_stops_inside_safety_distance() {
    let road = SegmentId(0);
    let (mut world, ids) = world_with(
        straight_road(None),
        &[(vec![road], 100.0), (vec![road], 52.0)],
    );
    let (leader, trailer) = (ids[0], ids[1]);

    world.step().unwrap();

    assert_eq!(velocity_of(&world, leader), 1.0);
    assert_eq!(offset_of(&world, leader), 105.0);
    assert_eq!(velocity_of(&world, trailer), 0.0);
    assert_eq!(offset_of(&world, trailer), 52.0);
}

#[test]
fn test_trailing_vehicle_keeps_going_with_enough_gap() {
    let road = SegmentId(0);
    let (mut world, ids) = world_with(
        straight_road(None),
        &[(vec![road], 200.0), (vec![road], 100.0)],
    );

    world.step().unwrap();

    assert_eq!(velocity_of(&world, ids[1]), 1.0);
    assert_eq!(offset_of(&world, ids[1]), 105.0);
}

#[test]
fn test_queue_closes_up_to_safety_distance() {
    let road = SegmentId(0);
    let (mut world, ids) = world_with(
        straight_road(Some(vec![0.0, 10_000.0])),
        &[(vec![road], 280.0), (vec![road], 0.0)],
    );

    world.run_for(100).unwrap();

    let leader = offset_of(&world, ids[0]);
    let trailer = offset_of(&world, ids[1]);
    assert!(velocity_of(&world, ids[1]) == 0.0);
    assert!(leader - trailer >= 50.0, "gap {} too small", leader - trailer);
    assert!(leader - trailer < 50.0 + 5.0, "gap {} too large", leader - trailer);
}

#[test]
fn test_vehicle_ahead_found_on_next_route_segment() {
    let network = two_segment_chain().unwrap();
    let (a, b) = (SegmentId(0), SegmentId(1));
    let (mut world, ids) = world_with(network, &[(vec![b], 10.0), (vec![a, b], 80.0)]);

    let follower = world.driver(ids[1]).unwrap();
    let drivers: BTreeMap<DriverId, Driver> =
        world.drivers().map(|d| (d.id(), d.clone())).collect();
    assert_eq!(
        follower.distance_to_next_vehicle(world.network(), &drivers),
        Some(30.0)
    );

    world.step().unwrap();
    assert_eq!(velocity_of(&world, ids[1]), 0.0);
    assert_eq!(velocity_of(&world, ids[0]), 1.0);
}

#[test]
fn test_no_vehicle_ahead_means_no_hazard() {
    let network = two_segment_chain().unwrap();
    let (world, ids) = world_with(network, &[(vec![SegmentId(0), SegmentId(1)], 20.0)]);

    let driver = world.driver(ids[0]).unwrap();
    let drivers: BTreeMap<DriverId, Driver> =
        world.drivers().map(|d| (d.id(), d.clone())).collect();
    assert_eq!(driver.distance_to_next_vehicle(world.network(), &drivers), None);
}

#[test]
fn test_red_light_stops_vehicle_near_segment_end() {
    let road = SegmentId(0);
    // zero-length green: red for the whole first 10000 time units
    let (mut world, ids) = world_with(
        straight_road(Some(vec![0.0, 10_000.0])),
        &[(vec![road], 297.0), (vec![road], 100.0)],
    );

    world.step().unwrap();
    assert_eq!(velocity_of(&world, ids[0]), 0.0);
    assert_eq!(offset_of(&world, ids[0]), 297.0);
    assert_eq!(velocity_of(&world, ids[1]), 1.0);

    world.run_for(10).unwrap();
    assert_eq!(offset_of(&world, ids[0]), 297.0);
    assert_eq!(world.driver_count(), 2);
}

#[test]
fn test_green_light_lets_vehicle_leave() {
    let road = SegmentId(0);
    let (mut world, ids) = world_with(
        straight_road(Some(vec![10_000.0, 10.0])),
        &[(vec![road], 297.0)],
    );

    world.step().unwrap();
    assert!(world.driver(ids[0]).is_none());
    assert_eq!(world.stats().total_drivers_completed, 1);
}

#[test]
fn test_overshoot_carries_onto_next_segment() {
    let network = two_segment_chain().unwrap();
    let (a, b) = (SegmentId(0), SegmentId(1));
    let (mut world, ids) = world_with(network, &[(vec![a, b], 98.0)]);

    world.step().unwrap();

    let driver = world.driver(ids[0]).unwrap();
    assert_eq!(driver.vehicle().current_segment(), Some(b));
    assert_eq!(driver.vehicle().offset(), 3.0);
    assert_eq!(driver.cursor(), 2);
    assert!(driver.remaining_route().is_empty());
    assert!(!driver.to_be_removed());
}

#[test]
fn test_reaching_exactly_the_end_does_not_cross() {
    let network = two_segment_chain().unwrap();
    let (a, b) = (SegmentId(0), SegmentId(1));
    let (mut world, ids) = world_with(network, &[(vec![a, b], 95.0)]);

    world.step().unwrap();

    let vehicle = world.driver(ids[0]).unwrap().vehicle();
    assert_eq!(vehicle.current_segment(), Some(a));
    assert_eq!(vehicle.offset(), 100.0);
}

#[test]
fn test_exhausted_route_flags_driver_and_keeps_last_segment() {
    let network = two_segment_chain().unwrap();
    let b = SegmentId(1);
    let config = quiet_config();

    let mut driver = Driver::new_at(DriverId(0), Vehicle::new(1.0), vec![b], 98.0).unwrap();
    driver.drive(&network, &BTreeMap::new(), &config);
    driver.vehicle_mut().integrate(config.dt);
    driver.check_if_end_of_segment_reached(&network).unwrap();

    assert!(driver.to_be_removed());
    assert_eq!(driver.vehicle().current_segment(), Some(b));
    assert_eq!(driver.vehicle().offset(), 100.0);
}

#[test]
fn test_driver_route_cursor() {
    let route = vec![SegmentId(0), SegmentId(1)];
    let mut driver = Driver::new(DriverId(3), Vehicle::new(1.0), route.clone()).unwrap();

    assert_eq!(driver.vehicle().current_segment(), Some(SegmentId(0)));
    assert_eq!(driver.vehicle().offset(), 0.0);
    assert_eq!(driver.remaining_route(), &[SegmentId(1)]);
    assert_eq!(driver.route(), route.as_slice());

    driver.vehicle_mut().integrate(50.0);
    driver.restart_route();
    assert_eq!(driver.vehicle().offset(), 0.0);
    assert_eq!(driver.cursor(), 1);

    assert!(Driver::new(DriverId(4), Vehicle::new(1.0), vec![]).is_err());
}

#[test]
fn test_insert_driver_validates_route() {
    let network = two_segment_chain().unwrap();
    let mut world = SimWorld::new(network, quiet_config()).unwrap();

    assert!(world.insert_driver(vec![SegmentId(9)], 0.0).is_err());
    assert!(world.insert_driver(vec![SegmentId(0)], 150.0).is_err());
    assert!(world.insert_driver(vec![], 0.0).is_err());
    assert!(world.spawn_driver(SegmentId(9)).is_err());
    assert_eq!(world.driver_count(), 0);
}

#[test]
fn test_follower_measures_leader_that_crossed_this_step() {
    let network = two_segment_chain().unwrap();
    let (a, b) = (SegmentId(0), SegmentId(1));
    let (mut world, ids) = world_with(network, &[(vec![a, b], 98.0), (vec![a, b], 0.0)]);
    let (leader, follower) = (ids[0], ids[1]);

    world.step().unwrap();

    let leader_vehicle = world.driver(leader).unwrap().vehicle();
    assert_eq!(leader_vehicle.current_segment(), Some(b));
    assert_eq!(leader_vehicle.offset(), 3.0);

    // 100 - 0 + 3 = 103 ahead, well beyond the safety distance
    assert_eq!(velocity_of(&world, follower), 1.0);
    assert_eq!(offset_of(&world, follower), 5.0);
}

#[test]
fn test_overshoot_past_short_segment_is_carried_once() {
    let mut builder = RoadNetworkBuilder::new();
    let a = builder.add_segment(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
    let b = builder.add_segment(Point::new(100.0, 0.0), Point::new(102.0, 0.0)).unwrap();
    let c = builder.add_segment(Point::new(102.0, 0.0), Point::new(200.0, 0.0)).unwrap();
    builder.add_successor(a, b).unwrap();
    builder.add_successor(b, c).unwrap();
    builder.add_entry(a).unwrap();
    let network = builder.build().unwrap();

    let (mut world, ids) = world_with(network, &[(vec![a, b, c], 99.0)]);
    world.step().unwrap();

    let driver = world.driver(ids[0]).unwrap();
    assert_eq!(driver.vehicle().current_segment(), Some(b));
    assert_eq!(driver.vehicle().offset(), 4.0);
    assert!(driver.vehicle().offset() > 2.0, "carry is not spread over b");
    assert_eq!(driver.cursor(), 2);
    assert_eq!(driver.remaining_route(), &[c]);
    assert!(!driver.to_be_removed());

    world.step().unwrap();
    let driver = world.driver(ids[0]).unwrap();
    assert_eq!(driver.vehicle().current_segment(), Some(c));
    assert_eq!(driver.vehicle().offset(), 7.0);
}
