use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A zero-argument callback a runner invokes on every tick.
///
/// Cloning is cheap and preserves identity: two `Action`s are the
/// [`same`](Self::same) if they share one closure allocation. A fresh closure
/// built on every render is a different action, even if its code is identical.
#[derive(Clone)]
pub struct Action(Rc<dyn Fn()>);

impl Action {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn run(&self) {
        (self.0)();
    }

    #[must_use]
    pub fn same(&self, other: &Action) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// The single cell a tick reads the current action from.
///
/// Owned by one runner and shared only with that runner's tick closure. The
/// tick never captures an `Action` directly; it goes through here, so an
/// update between two ticks is seen starting with the next one.
#[derive(Debug, Default)]
pub struct LatestActionSlot {
    action: RefCell<Option<Action>>,
    ticks: Cell<u64>,
}

impl LatestActionSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `action` unless the slot already holds the same one.
    ///
    /// Returns whether the slot changed.
    pub fn replace(&self, action: Action) -> bool {
        let mut slot = self.action.borrow_mut();
        if slot.as_ref().is_some_and(|current| current.same(&action)) {
            return false;
        }
        *slot = Some(action);
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action.borrow().is_none()
    }

    /// Deliver one tick: run the stored action, if any.
    ///
    /// An empty slot is a silent no-op. The tick is counted either way.
    /// Returns whether an action ran.
    pub fn fire(&self) -> bool {
        self.ticks.set(self.ticks.get().saturating_add(1));
        // Clone out so the action may itself replace the slot's contents.
        let action = self.action.borrow().clone();
        match action {
            Some(action) => {
                action.run();
                true
            }
            None => false,
        }
    }

    /// Ticks delivered so far, including no-op ones.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}
