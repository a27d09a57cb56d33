use pulsar_reactivity::{cloned, create_effect, create_signal, effect, signal, untrack};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn ergonomic_cloned_macro() {
    let a = signal(10);
    let b = signal(20);

    // Old way (painful)
    let _sum_old = {
        let a = a.clone();
        let b = b.clone();
        move || a.get() + b.get()
    };

    // New way (ergonomic)
    let sum = cloned!(a, b => move || a.get() + b.get());

    assert_eq!(sum(), 30);

    a.set(15);
    assert_eq!(sum(), 35);
}

#[test]
fn ergonomic_cloned_macro_in_effect() {
    let a = signal(0);
    let b = signal(0);
    let runs = Rc::new(Cell::new(0));

    let _e = create_effect(cloned!(a, b, runs => move || {
        let _ = a.get();
        let _ = b.get();
        runs.set(runs.get() + 1);
    }));

    a.set(1);
    b.set(1);
    assert_eq!(runs.get(), 3);
}

#[test]
fn ergonomic_effect_macro() {
    let count = signal(0);
    let log = Rc::new(RefCell::new(Vec::new()));

    let _e = effect!(count, log => {
        log.borrow_mut().push(count.get());
    });

    count.set(1);
    count.set(2);

    assert_eq!(*log.borrow(), vec![0, 1, 2]);
}

#[test]
fn ergonomic_effect_macro_without_deps() {
    let hits = Rc::new(Cell::new(0));
    let hits_clone = hits.clone();

    let _e = effect!(hits_clone.set(hits_clone.get() + 1));

    assert_eq!(hits.get(), 1);
}

#[test]
fn ergonomic_getter_setter_pair() {
    let (count, set_count) = create_signal(0);
    let get = count.getter();
    let set = set_count.setter();

    // Increment the way an onclick handler would
    set(get() + 1);
    set(get() + 1);

    assert_eq!(get(), 2);
    assert_eq!(count.get(), 2);
}

#[test]
fn ergonomic_untrack_inside_effect() {
    let tracked = signal(0);
    let ignored = signal(0);
    let runs = Rc::new(Cell::new(0));

    let _e = effect!(tracked, ignored, runs => {
        let _ = tracked.get();
        let _ = untrack(|| ignored.get());
        runs.set(runs.get() + 1);
    });

    ignored.set(1);
    assert_eq!(runs.get(), 1);

    tracked.set(1);
    assert_eq!(runs.get(), 2);
}

#[test]
fn ergonomic_split_signal() {
    let both = signal(String::from("a"));
    let (read, write) = both.split();

    write.update(|s| s.push('b'));
    assert_eq!(read.get(), "ab");
    assert_eq!(both.get(), "ab");
}
