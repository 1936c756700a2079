//! Tests for life event application
//!
//! All tests use zero returns so each path is exact arithmetic on the flows.

use super::{assert_path, fixed_path, flat_params};
use crate::model::{LifeEvent, LifeEventKind, SimulationParams};
use crate::simulation::{YearFlows, apply_life_events};

fn working_params(years: u32) -> SimulationParams {
    SimulationParams {
        starting_portfolio: 1_000_000.0,
        annual_contribution: 80_000.0,
        annual_spend: 50_000.0,
        retirement_spend: 30_000.0,
        inflation_rate: 0.05,
        ..flat_params(years)
    }
}

#[test]
fn test_layoff_severance_replaces_contribution_and_retirement_sticks() {
    let params = SimulationParams {
        life_events: vec![
            LifeEvent::bare(LifeEventKind::Layoff, 2027).with_param("severance", 20_000.0),
        ],
        ..working_params(3)
    };
    let path = fixed_path(&params, 0.0);

    // Year 1: severance in, retirement spend out. Later years: no contribution,
    // retirement spend stays pinned (not the inflated pre-retirement spend).
    assert_path(
        &path,
        &[1_000_000.0, 990_000.0, 960_000.0, 930_000.0],
    );
}

#[test]
fn test_quit_without_params_contributes_nothing() {
    let params = SimulationParams {
        life_events: vec![LifeEvent::bare(LifeEventKind::Quit, 2028)],
        ..working_params(3)
    };
    let path = fixed_path(&params, 0.0);

    // Year 1 working: +80k - 50k; year 2 quits: -30k; year 3 retired: -30k
    assert_path(&path, &[1_000_000.0, 1_030_000.0, 1_000_000.0, 970_000.0]);
}

#[test]
fn test_quit_with_part_time_income() {
    let params = SimulationParams {
        life_events: vec![
            LifeEvent::bare(LifeEventKind::Quit, 2027).with_param("partTimeIncome", 12_000.0),
        ],
        ..working_params(1)
    };
    let path = fixed_path(&params, 0.0);
    assert_path(&path, &[1_000_000.0, 982_000.0]);
}

#[test]
fn test_default_quit_event_uses_part_time_income() {
    // `LifeEvent::new` seeds `severance: 0`, which must not mask the income
    let quit = LifeEvent::new(LifeEventKind::Quit, 2027).with_param("partTimeIncome", 12_000.0);
    assert_eq!(quit.param("severance"), Some(0.0));

    let params = SimulationParams {
        life_events: vec![quit],
        ..working_params(1)
    };
    assert_path(&fixed_path(&params, 0.0), &[1_000_000.0, 982_000.0]);
}

#[test]
fn test_layoff_prefers_severance_over_part_time_income() {
    let both = LifeEvent::new(LifeEventKind::Layoff, 2030)
        .with_param("severance", 40_000.0)
        .with_param("partTimeIncome", 5_000.0);
    let part_time_only =
        LifeEvent::bare(LifeEventKind::Layoff, 2030).with_param("partTimeIncome", 5_000.0);

    let mut flows = YearFlows {
        contribution: 0.0,
        expense: 0.0,
    };
    let mut retired = false;
    apply_life_events([&both], 30_000.0, &mut flows, &mut retired);
    assert_eq!(flows.contribution, 40_000.0);
    assert!(retired);

    apply_life_events([&part_time_only], 30_000.0, &mut flows, &mut retired);
    assert_eq!(flows.contribution, 5_000.0);
    assert_eq!(flows.expense, 30_000.0);
}

#[test]
fn test_college_uses_defaults_and_529_offset() {
    let mut flows = YearFlows {
        contribution: 0.0,
        expense: 10_000.0,
    };
    let mut retired = false;

    let bare = LifeEvent::bare(LifeEventKind::College, 2030);
    apply_life_events([&bare], 0.0, &mut flows, &mut retired);
    assert_eq!(flows.expense, 65_000.0);

    let with_plan = LifeEvent::new(LifeEventKind::College, 2030);
    apply_life_events([&with_plan], 0.0, &mut flows, &mut retired);
    assert_eq!(flows.expense, 65_000.0 + 35_000.0);

    let annual_key = LifeEvent::bare(LifeEventKind::College, 2030)
        .with_param("annualCost", 40_000.0)
        .with_param("plan529Annual", 15_000.0);
    apply_life_events([&annual_key], 0.0, &mut flows, &mut retired);
    assert_eq!(flows.expense, 100_000.0 + 25_000.0);
    assert!(!retired);
}

#[test]
fn test_one_time_flows() {
    let events = [
        LifeEvent::bare(LifeEventKind::Windfall, 2030).with_param("amount", 100_000.0),
        LifeEvent::bare(LifeEventKind::Expense, 2030).with_param("amount", 7_000.0),
        LifeEvent::bare(LifeEventKind::Purchase, 2030).with_param("downPayment", 200_000.0),
        LifeEvent::bare(LifeEventKind::Windfall, 2030),
    ];
    let mut flows = YearFlows {
        contribution: 1_000.0,
        expense: 2_000.0,
    };
    let mut retired = false;
    apply_life_events(&events, 0.0, &mut flows, &mut retired);

    assert_eq!(flows.contribution, 101_000.0);
    assert_eq!(flows.expense, 209_000.0);
}

#[test]
fn test_same_year_events_apply_in_list_order() {
    let windfall = LifeEvent::bare(LifeEventKind::Windfall, 2030).with_param("amount", 10_000.0);
    let layoff = LifeEvent::bare(LifeEventKind::Layoff, 2030).with_param("severance", 5_000.0);
    let start = YearFlows {
        contribution: 80_000.0,
        expense: 50_000.0,
    };

    let mut flows = start;
    let mut retired = false;
    apply_life_events([&windfall, &layoff], 30_000.0, &mut flows, &mut retired);
    assert_eq!(flows.contribution, 5_000.0);
    assert_eq!(flows.expense, 30_000.0);

    let mut flows = start;
    apply_life_events([&layoff, &windfall], 30_000.0, &mut flows, &mut retired);
    assert_eq!(flows.contribution, 15_000.0);
    assert!(retired);
}

#[test]
fn test_expense_before_quit_is_overwritten() {
    let expense = LifeEvent::bare(LifeEventKind::Expense, 2030).with_param("amount", 10_000.0);
    let quit = LifeEvent::bare(LifeEventKind::Quit, 2030);
    let start = YearFlows {
        contribution: 0.0,
        expense: 50_000.0,
    };

    let mut flows = start;
    let mut retired = false;
    apply_life_events([&expense, &quit], 30_000.0, &mut flows, &mut retired);
    assert_eq!(flows.expense, 30_000.0);

    let mut flows = start;
    apply_life_events([&quit, &expense], 30_000.0, &mut flows, &mut retired);
    assert_eq!(flows.expense, 40_000.0);
}

#[test]
fn test_events_match_calendar_year_from_anchor() {
    let windfall = |year| LifeEvent::bare(LifeEventKind::Windfall, year).with_param("amount", 1_000.0);
    let params = SimulationParams {
        start_calendar_year: 2040,
        // Year 0 is never simulated, and 2026 is outside this horizon
        life_events: vec![windfall(2040), windfall(2026), windfall(2041), windfall(2043)],
        ..flat_params(3)
    };
    let path = fixed_path(&params, 0.0);
    assert_path(&path, &[500_000.0, 501_000.0, 501_000.0, 502_000.0]);
}

#[test]
fn test_events_while_retired_add_to_retirement_spend() {
    let params = SimulationParams {
        life_events: vec![
            LifeEvent::bare(LifeEventKind::Quit, 2027),
            LifeEvent::bare(LifeEventKind::College, 2028).with_param("annualCost", 20_000.0),
        ],
        ..working_params(2)
    };
    let path = fixed_path(&params, 0.0);
    assert_path(&path, &[1_000_000.0, 970_000.0, 920_000.0]);
}
