use crate::config::{WORLD_H, WORLD_W};
use crate::test_harness::TestCity;

#[test]
fn empty_city_starts_clean() {
    let city = TestCity::new();
    assert_eq!(city.grid().width, WORLD_W);
    assert_eq!(city.grid().height, WORLD_H);
    assert_eq!(city.population(), 0);
    assert_eq!(city.powered_tiles(), 0);
}

#[test]
fn each_fixed_update_runs_one_phase_at_fast_speed() {
    let mut city = TestCity::new();
    city.tick(5);
    assert_eq!(city.city().clock.steps, 5);
    assert_eq!(city.city().clock.phase(), 5);
}

#[test]
fn empty_city_stays_empty_for_a_hundred_cycles() {
    let mut city = TestCity::new();
    let funds = city.funds();
    city.tick_cycles(100);
    assert_eq!(city.population(), 0);
    assert_eq!(city.funds(), funds, "nothing to tax and nothing to maintain");
    assert_eq!(city.powered_tiles(), 0);
    assert_eq!(city.city().calendar.year(), 1902);
    assert!(city.city().maps.traffic.is_all(0));
    assert!(city.city().maps.land_value.is_all(0));
}
