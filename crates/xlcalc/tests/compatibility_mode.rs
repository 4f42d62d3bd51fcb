//! Tests for the process-wide compatibility mode
//!
//! Kept in its own test binary, since it changes global state.

use pretty_assertions::assert_eq;
use xlcalc::prelude::*;

fn npv() -> f64 {
    let call = Call::new().arg(0.06).arg(1).arg(2).arg(3);
    call_function("NPV", call).unwrap().as_f64().unwrap()
}

#[test]
fn test_mode_switch_affects_new_contexts() {
    assert_eq!(xlcalc::compatibility(), Compatibility::Excel);
    let pinned = EvaluationContext::new();
    assert!((npv() - 5.2422470).abs() < 1e-6);

    xlcalc::set_compatibility(Compatibility::Python);
    assert_eq!(EvaluationContext::new().compatibility(), Compatibility::Python);
    assert!((npv() - 5.556781772872908).abs() < 1e-9);

    // Contexts created earlier keep their snapshot
    assert_eq!(pinned.compatibility(), Compatibility::Excel);

    xlcalc::set_compatibility(Compatibility::Excel);
    assert!((npv() - 5.2422470).abs() < 1e-6);
}
