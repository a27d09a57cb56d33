// ============================================================================
// pulsar-reactivity - Counter Demo
// A "Count: N" label with an increment button, kept in sync by an effect
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::primitives::effect::create_effect;
use crate::primitives::scope::{create_root, Scope};
use crate::primitives::signal::{create_signal, ReadSignal, WriteSignal};

/// A mounted counter widget.
///
/// The widget owns a root scope. The `count` signal and the render effect
/// live inside it, so [`Counter::unmount`] freezes the counter: clicks stop
/// changing the count and the label keeps its last rendering.
///
/// # Example
///
/// ```
/// use pulsar_reactivity::demo::Counter;
///
/// let counter = Counter::mount(0);
/// assert_eq!(counter.label(), "Count: 0");
///
/// counter.click();
/// counter.click();
/// assert_eq!(counter.label(), "Count: 2");
///
/// counter.unmount();
/// counter.click();
/// assert_eq!(counter.label(), "Count: 2");
/// ```
pub struct Counter {
    scope: Scope,
    count: ReadSignal<i64>,
    set_count: WriteSignal<i64>,
    label: Rc<RefCell<String>>,
    renders: Rc<Cell<usize>>,
}

impl Counter {
    /// Mount a counter starting at `initial` and render it once.
    pub fn mount(initial: i64) -> Self {
        let label = Rc::new(RefCell::new(String::new()));
        let renders = Rc::new(Cell::new(0));

        let (scope, (count, set_count)) = create_root(|| {
            let (count, set_count) = create_signal(initial);
            create_effect(cloned!(count, label, renders => move || {
                *label.borrow_mut() = format!("Count: {}", count.get());
                renders.set(renders.get() + 1);
            }));
            (count, set_count)
        });

        log::debug!("counter mounted at {initial}");

        Self {
            scope,
            count,
            set_count,
            label,
            renders,
        }
    }

    /// The increment button's handler. Returns true if the count changed.
    pub fn click(&self) -> bool {
        let next = self.count.get_untracked().saturating_add(1);
        self.set_count.set(next)
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.count.get_untracked()
    }

    /// Text of the count label as last rendered.
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    /// How many times the label has been rendered.
    pub fn render_count(&self) -> usize {
        self.renders.get()
    }

    /// Markup of the widget as last rendered.
    pub fn render_html(&self) -> String {
        format!(
            "<div style=\"padding: 20px;\"><div>{}</div><button>Increment</button></div>",
            self.label.borrow()
        )
    }

    /// Whether the widget is still live (not yet unmounted).
    pub fn is_mounted(&self) -> bool {
        !self.scope.is_disposed()
    }

    /// Tear the widget down. Idempotent.
    pub fn unmount(&self) {
        if self.is_mounted() {
            log::debug!("counter unmounted at {}", self.count());
        }
        self.scope.dispose();
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("count", &self.count())
            .field("mounted", &self.is_mounted())
            .field("renders", &self.render_count())
            .finish()
    }
}
