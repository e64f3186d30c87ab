use crate::budget::Funding;
use crate::config::CYCLES_PER_YEAR;
use crate::notifications::NotificationPriority;
use crate::test_harness::TestCity;
use crate::tiles::ZoneKind;

/// One hundred road tiles: 90 a year to maintain at medium difficulty.
fn road_network(city: TestCity) -> TestCity {
    city.with_road(10, 10, 59, 10).with_road(10, 20, 59, 20)
}

fn run_one_year(city: &mut TestCity) {
    city.tick_cycles(CYCLES_PER_YEAR as u32 + 1);
}

#[test]
fn yearly_upkeep_is_charged_once() {
    let mut city = road_network(TestCity::new());
    let start = city.funds();
    city.tick_cycles(CYCLES_PER_YEAR as u32);
    assert_eq!(city.funds(), start, "nothing is charged before the year ends");
    city.tick_cycles(1);
    assert_eq!(city.funds(), start - 90);
    assert_eq!(city.city().budget.effectiveness.road, 100);
}

#[test]
fn short_treasury_funds_roads_partially_and_warns() {
    let mut city = road_network(TestCity::new()).with_treasury(45);
    run_one_year(&mut city);
    assert_eq!(city.funds(), 0);
    assert_eq!(city.city().budget.effectiveness.road, 50);
    assert!(city
        .notifications()
        .journal
        .iter()
        .any(|e| e.text.starts_with("Insufficient funds")));
    assert!(city.notification_count(NotificationPriority::Warning) >= 1);
}

#[test]
fn manual_funding_skips_the_shortfall_warning() {
    let mut city = road_network(TestCity::new()).with_treasury(45);
    city.city_mut().set_auto_budget(false);
    city.city_mut().set_funding(Funding {
        road: 0.5,
        ..Funding::FULL
    });
    run_one_year(&mut city);
    assert_eq!(city.funds(), 0);
    assert_eq!(city.city().budget.effectiveness.road, 50);
    assert!(city.notifications().journal.is_empty());
}

#[test]
fn stations_are_paid_after_roads() {
    let mut city = road_network(TestCity::new())
        .with_zone(ZoneKind::FireStation, 80, 80)
        .with_zone(ZoneKind::PoliceStation, 90, 80)
        .with_treasury(140);
    run_one_year(&mut city);
    let eff = city.city().budget.effectiveness;
    assert_eq!(eff.road, 100);
    assert_eq!(eff.fire, 50);
    assert_eq!(eff.police, 0);
    assert_eq!(city.funds(), 0);
}

#[test]
fn spending_never_drives_the_treasury_negative() {
    let mut city = road_network(TestCity::new()).with_treasury(0);
    city.city_mut().charge(1_000);
    run_one_year(&mut city);
    assert_eq!(city.funds(), 0);
    assert_eq!(city.city().budget.effectiveness.road, 0);
}

#[test]
fn evaluation_runs_with_the_budget() {
    let mut city = road_network(TestCity::new());
    run_one_year(&mut city);
    let eval = &city.city().evaluation;
    assert_ne!(eval.delta, 0);
    assert_eq!(eval.approval as u32, eval.score / 10);
}
