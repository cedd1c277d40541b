use startstop::{LifecycleGuard, LifecycleState};

const MAX_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    Start,
    Stop,
    Teardown,
}

const CALLS: [Call; 3] = [Call::Start, Call::Stop, Call::Teardown];

/// Every call sequence up to `MAX_LEN`, including the empty one
fn sequences() -> Vec<Vec<Call>> {
    let mut all = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];

    for _ in 0..MAX_LEN {
        let mut next = Vec::new();
        for seq in &frontier {
            for call in CALLS {
                let mut extended: Vec<Call> = seq.clone();
                extended.push(call);
                next.push(extended);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }

    all
}

fn apply(guard: &LifecycleGuard, call: Call) -> bool {
    match call {
        Call::Start => guard.start(),
        Call::Stop => guard.stop(),
        Call::Teardown => guard.destructor_check(),
    }
}

#[test]
fn test_transition_laws_hold_for_all_sequences() {
    for seq in sequences() {
        let guard = LifecycleGuard::new();
        let mut start_wins = 0;
        let mut stop_wins = 0;

        for &call in &seq {
            let before = guard.state();
            let applied = apply(&guard, call);
            let after = guard.state();

            match call {
                Call::Start => {
                    assert_eq!(applied, before == LifecycleState::NotStarted, "{:?}", seq);
                    if applied {
                        start_wins += 1;
                        assert_eq!(after, LifecycleState::Started);
                    }
                }
                Call::Stop => {
                    assert_eq!(applied, before != LifecycleState::Stopped, "{:?}", seq);
                    if applied {
                        stop_wins += 1;
                        assert_eq!(after, LifecycleState::Stopped);
                    }
                }
                Call::Teardown => {
                    assert_eq!(applied, before == LifecycleState::Started, "{:?}", seq);
                    if applied {
                        stop_wins += 1;
                    }
                }
            }

            if !applied {
                assert_eq!(before, after, "refused call changed state in {:?}", seq);
            }
            if before.is_terminal() {
                assert!(!applied, "call succeeded after stop in {:?}", seq);
            }
        }

        assert!(start_wins <= 1, "{:?}", seq);
        assert!(stop_wins <= 1, "{:?}", seq);
    }
}

#[test]
fn test_flags_are_monotonic() {
    for seq in sequences() {
        let guard = LifecycleGuard::new();
        let mut was_started = false;
        let mut was_stopped = false;

        for &call in &seq {
            apply(&guard, call);
            assert!(!was_started || guard.is_started(), "{:?}", seq);
            assert!(!was_stopped || guard.is_stopped(), "{:?}", seq);
            was_started = guard.is_started();
            was_stopped = guard.is_stopped();
        }
    }
}

#[test]
fn test_drop_law_for_all_sequences() {
    for seq in sequences() {
        let guard = LifecycleGuard::new();
        let probe = guard.probe();

        for &call in &seq {
            apply(&guard, call);
        }
        let before_drop = guard.state();
        drop(guard);

        let expected = match before_drop {
            LifecycleState::NotStarted => LifecycleState::NotStarted,
            LifecycleState::Started | LifecycleState::Stopped => LifecycleState::Stopped,
        };
        assert_eq!(probe.state(), expected, "{:?}", seq);
    }
}

#[test]
fn test_scenario_f_through_owner() {
    struct Connection {
        lifecycle: LifecycleGuard,
    }

    let connection = Connection {
        lifecycle: LifecycleGuard::new(),
    };
    let probe = connection.lifecycle.probe();

    assert!(connection.lifecycle.start());
    drop(connection);

    assert!(probe.is_started());
    assert!(probe.is_stopped());
}
