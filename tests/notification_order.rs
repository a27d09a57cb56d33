use pulsar_reactivity::{create_effect, create_scope, create_signal, current_scope, signal};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_mixed_subscribers_keep_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (count, set_count) = create_signal(0);

    let log_first = log.clone();
    count.on_change(move |v| log_first.borrow_mut().push(format!("first {v}")));

    let log_fx = log.clone();
    let count_fx = count.clone();
    let _effect = create_effect(move || {
        let v = count_fx.get();
        log_fx.borrow_mut().push(format!("effect {v}"));
    });

    let log_last = log.clone();
    count.on_change(move |v| log_last.borrow_mut().push(format!("last {v}")));
    log.borrow_mut().clear();

    for v in 1..=3 {
        set_count.set(v);
    }

    let expected: Vec<String> = (1..=3)
        .flat_map(|v| [format!("first {v}"), format!("effect {v}"), format!("last {v}")])
        .collect();
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn test_rerun_from_another_scope_stays_with_owner() {
    let trigger = signal(0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let owner = create_scope();
    owner.run(|| {
        let trigger = trigger.clone();
        let seen = seen.clone();
        create_effect(move || {
            let _ = trigger.get();
            let (value, _set) = create_signal(0);
            seen.borrow_mut().push((value, current_scope().is_some()));
        });
    });

    let other = create_scope();
    other.run(|| trigger.set(1));
    other.dispose();

    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, scoped)| *scoped));
        assert!(!seen[1].0.is_disposed());
    }

    owner.dispose();
    assert!(seen.borrow().iter().all(|(value, _)| value.is_disposed()));
}
