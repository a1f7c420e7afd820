//! Tests for the process-wide enable switch.
//!
//! The switch is read once, when a function is wrapped. These tests
//! share one process-global flag, so they serialize on a mutex.

use argus_core::value::HostFn;
use argus_core::{Value, argscheck, checks_enabled, set_checks_enabled};
use std::rc::Rc;
use std::sync::Mutex;

static SWITCH: Mutex<()> = Mutex::new(());

fn echo() -> HostFn {
    Rc::new(|args: &[Value]| Ok(args.to_vec()))
}

#[test]
fn test_disabled_wrapper_never_raises() {
    let _guard = SWITCH.lock().unwrap();
    set_checks_enabled(false);
    assert!(!checks_enabled());

    let f = argscheck("f(string, int)", echo()).expect("wrap failed");
    // No signature was compiled at all
    assert!(f.signature().is_none());
    // Mismatched and excess arguments alike come straight back
    let results = f
        .call(&[Value::Int(1), Value::Int(2), Value::Int(3)])
        .expect("disabled wrapper raised");
    assert_eq!(results, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

    // Even an unparsable declaration is ignored while disabled
    assert!(argscheck("f(", echo()).is_ok());

    set_checks_enabled(true);
}

#[test]
fn test_toggling_after_wrap_has_no_effect() {
    let _guard = SWITCH.lock().unwrap();
    set_checks_enabled(true);

    let checked = argscheck("f(string)", echo()).expect("wrap failed");
    set_checks_enabled(false);
    // Wrapped while enabled: still checks
    assert!(checked.call(&[Value::Int(1)]).is_err());

    // Wrapped while disabled: never checks, even after re-enabling
    let unchecked = argscheck("f(string)", echo()).expect("wrap failed");
    set_checks_enabled(true);
    assert!(unchecked.call(&[Value::Int(1)]).is_ok());
}
