//! The counter widget end to end: mount, click through, unmount.

use pulsar_reactivity::demo::Counter;
use pulsar_reactivity::{create_effect, create_scope, create_signal};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn counter_story_renders_and_increments() {
    let counter = Counter::mount(0);
    assert_eq!(
        counter.render_html(),
        "<div style=\"padding: 20px;\"><div>Count: 0</div><button>Increment</button></div>"
    );

    for _ in 0..10 {
        counter.click();
    }

    assert_eq!(counter.label(), "Count: 10");
    assert_eq!(counter.render_count(), 11);
}

#[test]
fn counter_story_unmount_is_final() {
    let counter = Counter::mount(3);
    counter.unmount();

    for _ in 0..3 {
        assert!(!counter.click());
    }

    assert_eq!(counter.count(), 3);
    assert_eq!(counter.label(), "Count: 3");
    assert_eq!(counter.render_count(), 1);
}

#[test]
fn counter_story_by_hand() {
    // The same widget assembled from the primitives directly
    let text = Rc::new(RefCell::new(String::new()));
    let scope = create_scope();

    let (count, set_count) = scope
        .run(|| {
            let (count, set_count) = create_signal(0);
            let text = text.clone();
            let count_for_render = count.clone();
            create_effect(move || {
                *text.borrow_mut() = format!("Count: {}", count_for_render.get());
            });
            (count, set_count)
        })
        .expect("scope is live");

    let on_click = move || set_count.set(count.get_untracked() + 1);
    on_click();
    on_click();
    assert_eq!(*text.borrow(), "Count: 2");

    scope.dispose();
    assert!(!on_click());
    assert_eq!(*text.borrow(), "Count: 2");
}
