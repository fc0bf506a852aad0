//! Stepping-loop scenario tests.
//!
//! The default configuration pays down a 2.5M loan (15% deposit) at 14 000
//! per month against 4% interest, a two-bracket interest deduction and a
//! paydown-proportion amortization floor. Expected values below are worked
//! out from those numbers.

use crate::config::{RuleText, SimulationConfig, TimeStep};
use crate::model::Termination;
use crate::simulator::{RateSchedule, Simulator, StepOptions};

fn default_sim() -> Simulator {
    Simulator::new(SimulationConfig::default())
}

#[test]
fn first_period_math_matches_hand_computation() {
    let points: Vec<_> = default_sim()
        .steps(StepOptions::default())
        .flatten()
        .collect();
    let first = points[0];

    // Corrected balance 2 125 000; raw yearly interest 85 000 falls inside
    // the 30% deduction bracket, leaving 59 500 effective. Paydown
    // proportion 0.85 selects the 3% amortization floor (63 750). The
    // configured 168 000 yearly payment covers the 165 250 required.
    assert_eq!(first.time, 0.0);
    assert!((first.balance - 2_125_000.0).abs() < 1e-9);
    assert!((first.interest - 59_500.0 / 12.0).abs() < 1e-6);
    assert!((first.payment - 14_000.0).abs() < 1e-6);
    assert!((first.fees - 3_500.0).abs() < 1e-6);
    assert!((first.amortization - 66_500.0 / 12.0).abs() < 1e-6);
}

#[test]
fn every_point_conserves_payment() {
    let points: Vec<_> = default_sim()
        .steps(StepOptions::default())
        .flatten()
        .collect();
    assert!(!points.is_empty());

    for point in &points {
        let recomposed = point.interest + point.amortization + point.fees;
        assert!(
            (point.payment - recomposed).abs() < 1e-6,
            "at t={}: payment {} vs interest+amortization+fees {}",
            point.time,
            point.payment,
            recomposed
        );
    }
}

#[test]
fn balance_follows_the_update_rule() {
    let config = SimulationConfig::default();
    let time_step = config.time_step.factor();
    let points: Vec<_> = Simulator::new(config)
        .steps(StepOptions::default())
        .flatten()
        .collect();

    for pair in points.windows(2) {
        let expected = pair[0].balance - pair[0].amortization * 12.0 * time_step;
        assert!(
            (pair[1].balance - expected).abs() < 1e-6,
            "at t={}: balance {} vs reconstructed {}",
            pair[1].time,
            pair[1].balance,
            expected
        );
    }
}

#[test]
fn sufficient_payment_pays_off_in_finite_time() {
    let mut steps = default_sim().steps(StepOptions::default());
    let points: Vec<_> = steps.by_ref().flatten().collect();

    assert_eq!(steps.termination(), Some(Termination::PaidOff));
    let last = points.last().unwrap();
    assert!(last.time < 100.0, "expected payoff before the end time");

    // Bounded by one point per period.
    let max_periods = (100.0 * 12.0) as usize + 1;
    assert!(points.len() <= max_periods);
}

#[test]
fn insufficient_payment_truncates_silently() {
    let config = SimulationConfig {
        payment: 5_000.0,
        ..SimulationConfig::default()
    };
    let mut steps = Simulator::new(config).steps(StepOptions::default());
    assert_eq!(steps.by_ref().count(), 0);
    assert_eq!(steps.termination(), Some(Termination::InsufficientPayment));
}

#[test]
fn insufficient_payment_is_clamped_when_allowed() {
    let config = SimulationConfig {
        payment: 5_000.0,
        ..SimulationConfig::default()
    };
    let options = StepOptions {
        allow_insufficient_payment: true,
        ..StepOptions::default()
    };
    let mut steps = Simulator::new(config).steps(options);
    let points: Vec<_> = steps.by_ref().flatten().collect();

    assert!(!points.is_empty());
    // Clamped up to required interest + fees + minimum amortization.
    assert!((points[0].payment - 165_250.0 / 12.0).abs() < 1e-6);

    // Paying only the proportional minimum shrinks the balance
    // geometrically, so the run exhausts the time limit instead of
    // reaching zero.
    assert_eq!(steps.termination(), Some(Termination::EndTime));
    assert!(points.last().unwrap().balance > 0.0);
}

#[test]
fn accumulated_only_surfaces_just_the_final_point() {
    let options = StepOptions {
        accumulated_only: true,
        ..StepOptions::default()
    };
    let accumulated: Vec<_> = default_sim().steps(options).collect();
    assert_eq!(accumulated.len(), 1);
    let final_point = accumulated[0].expect("run pays off, so a point surfaces");

    let streamed_last = default_sim()
        .steps(StepOptions::default())
        .flatten()
        .last()
        .unwrap();
    assert_eq!(final_point, streamed_last);
}

#[test]
fn accumulated_only_yields_nothing_when_end_time_cuts_the_run() {
    let options = StepOptions {
        accumulated_only: true,
        end_time: 1.0,
        ..StepOptions::default()
    };
    let mut steps = default_sim().steps(options);
    assert_eq!(steps.by_ref().count(), 0);
    assert_eq!(steps.termination(), Some(Termination::EndTime));
}

#[test]
fn run_continues_past_zero_when_not_ending_at_zero() {
    let options = StepOptions {
        end_time: 5.0,
        end_at_zero: false,
        override_payment: Some(100_000.0),
        allow_insufficient_payment: true,
        ..StepOptions::default()
    };
    let points: Vec<_> = default_sim().steps(options).flatten().collect();

    // One point per period for the whole five years, within one period of
    // rounding at the boundary.
    assert!(points.len() >= 60 && points.len() <= 61, "{}", points.len());
    assert!(points.iter().any(|p| p.balance < 0.0));
}

#[test]
fn output_is_monthly_equivalent_regardless_of_step_size() {
    let weekly = SimulationConfig {
        time_step: TimeStep::parse("1w").unwrap(),
        ..SimulationConfig::default()
    };
    let monthly_first = default_sim()
        .steps(StepOptions::default())
        .flatten()
        .next()
        .unwrap();
    let weekly_first = Simulator::new(weekly)
        .steps(StepOptions::default())
        .flatten()
        .next()
        .unwrap();

    assert!((monthly_first.interest - weekly_first.interest).abs() < 1e-6);
    assert!((monthly_first.payment - weekly_first.payment).abs() < 1e-6);
    assert!((monthly_first.amortization - weekly_first.amortization).abs() < 1e-6);
}

#[test]
fn depreciation_accelerates_balance_decline() {
    let depreciating = SimulationConfig {
        depreciation: 0.1,
        ..SimulationConfig::default()
    };
    let plain: Vec<_> = default_sim()
        .steps(StepOptions::default())
        .flatten()
        .take(2)
        .collect();
    let depreciated: Vec<_> = Simulator::new(depreciating)
        .steps(StepOptions::default())
        .flatten()
        .take(2)
        .collect();

    assert_eq!(plain[0].balance, depreciated[0].balance);
    assert!(depreciated[1].balance < plain[1].balance);
}

#[test]
fn stepped_rate_schedule_switches_mid_run() {
    // Zero deduction so the emitted interest directly implies the rate.
    let config = SimulationConfig {
        interest_deduction: RuleText::zero(),
        ..SimulationConfig::default()
    };
    let options = StepOptions {
        allow_insufficient_payment: true,
        ..StepOptions::default()
    };
    let schedule = RateSchedule::Stepped {
        before: 0.02,
        after: 0.10,
        at: 0.5,
    };
    let points: Vec<_> = Simulator::new(config)
        .steps_with_rate(options, schedule)
        .flatten()
        .collect();

    let implied = |p: &crate::model::DataPoint| p.interest * 12.0 / p.balance;

    let early = points.iter().find(|p| p.time < 0.5).unwrap();
    let late = points.iter().find(|p| p.time >= 0.5).unwrap();
    assert!((implied(early) - 0.02).abs() < 1e-9);
    assert!((implied(late) - 0.10).abs() < 1e-9);
}
