//! Observer-list backed reactive container.
//!
//! A [`Store`] holds one value behind an [`Rc`] and a list of observers.
//! Observers are called synchronously on the thread that mutates the store:
//! once with the current value when they subscribe, then after every `set`,
//! `update` or `reset`. Values are always replaced wholesale, so a snapshot
//! taken with [`Store::get`] never changes under the caller.
//!
//! Cloning a `Store` clones the handle; both handles share the same value and
//! observer list.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Observer<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: RefCell<Rc<T>>,
    default: Rc<T>,
    observers: RefCell<Vec<(u64, Observer<T>)>>,
    next_id: Cell<u64>,
    generation: Cell<u64>,
}

pub struct Store<T> {
    inner: Rc<Inner<T>>,
}

impl<T: 'static> Store<T> {
    /// Creates a store holding `default`. [`Store::reset`] returns to this
    /// exact allocation.
    pub fn new(default: T) -> Self {
        let default = Rc::new(default);
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(Rc::clone(&default)),
                default,
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                generation: Cell::new(0),
            }),
        }
    }

    /// Current snapshot.
    pub fn get(&self) -> Rc<T> {
        Rc::clone(&self.inner.value.borrow())
    }

    /// The fixed value `reset` restores.
    pub fn default_value(&self) -> Rc<T> {
        Rc::clone(&self.inner.default)
    }

    /// Registers `observer` and immediately calls it with the current value.
    ///
    /// The observer stays registered until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let observer: Observer<T> = Rc::new(observer);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Rc::clone(&observer)));

        let current = self.get();
        observer(&current);

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.observers.borrow_mut().retain(|(key, _)| *key != id);
                }
            })),
        }
    }

    /// Replaces the value and notifies every observer.
    pub fn set(&self, value: T) {
        self.replace(Rc::new(value));
    }

    /// Sets the value to `f(current)`.
    ///
    /// If `f` panics the store keeps its previous value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.get());
        self.set(next);
    }

    /// Like [`Store::update`], but `f` may fail. On `Err` nothing is
    /// published and the error is handed back to the caller.
    pub fn try_update<E, F>(&self, f: F) -> Result<(), E>
    where
        F: FnOnce(&T) -> Result<T, E>,
    {
        let next = f(&self.get())?;
        self.set(next);
        Ok(())
    }

    /// Restores the default value.
    pub fn reset(&self) {
        self.replace(Rc::clone(&self.inner.default));
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    fn replace(&self, value: Rc<T>) {
        *self.inner.value.borrow_mut() = Rc::clone(&value);
        let generation = self.inner.generation.get().wrapping_add(1);
        self.inner.generation.set(generation);

        // Observers may subscribe, unsubscribe or set again while being
        // notified, so no borrow is held across the calls.
        let observers: Vec<Observer<T>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();

        for observer in observers {
            // A nested replace has already told everyone about a newer value.
            if self.inner.generation.get() != generation {
                break;
            }
            observer(&value);
        }
    }
}

impl<T: Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.observers.borrow().len())
            .finish()
    }
}

/// Handle returned by [`Store::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keeps the observer registered for as long as the store lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

