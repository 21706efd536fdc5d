mod combinators;
mod resolution;
mod state;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::scheduler::Schedule;
use crate::value::Value;

pub use combinators::DeferredParts;
pub use state::State;

use resolution::run_reaction;

/// Outcome of a handler: `Ok` is its return value, `Err` a raised reason.
pub type Completion = Result<Value, Value>;

/// A `then` continuation handler.
pub type Handler = Box<dyn FnOnce(Value) -> Completion>;

/// A `finally` handler. Its return value is waited on (when it is a
/// thenable) but never observed downstream.
pub type FinallyHandler = Box<dyn FnOnce() -> Completion>;

/// Callback queued while pending; invoked exactly once with the settled
/// payload, in registration order.
type Waiter = Box<dyn FnOnce(Value)>;

struct DeferredCell {
    state: State,
    fulfillment_waiters: Vec<Waiter>,
    rejection_waiters: Vec<Waiter>,
}

/// The eventually-available result of a deferred computation.
///
/// Cheap-clone handle over shared state; clones observe the same
/// settlement. All settlement and handler invocation goes through the
/// scheduler the value was created with, never synchronously.
#[derive(Clone)]
pub struct Deferred {
    cell: Rc<RefCell<DeferredCell>>,
    scheduler: Rc<dyn Schedule>,
}

/// Fulfillment capability bound to one [`Deferred`].
#[derive(Clone)]
pub struct Resolver {
    target: Deferred,
}

impl Resolver {
    /// Schedule fulfillment with `value`, stored verbatim. A no-op once the
    /// target is settled.
    pub fn resolve(&self, value: impl Into<Value>) {
        self.target.settle(false, value.into());
    }
}

/// Rejection capability bound to one [`Deferred`].
#[derive(Clone)]
pub struct Rejecter {
    target: Deferred,
}

impl Rejecter {
    /// Schedule rejection with `reason`. A no-op once the target is settled.
    pub fn reject(&self, reason: impl Into<Value>) {
        self.target.settle(true, reason.into());
    }
}

impl Deferred {
    /// Construct from a producer, invoked synchronously exactly once with
    /// the two settlement capabilities. A producer `Err` rejects the new
    /// value; construction itself never fails.
    pub fn new<F>(scheduler: &Rc<dyn Schedule>, producer: F) -> Self
    where
        F: FnOnce(Resolver, Rejecter) -> Result<(), Value>,
    {
        let deferred = Self::pending(scheduler.clone());
        let resolver = Resolver {
            target: deferred.clone(),
        };
        let rejecter = Rejecter {
            target: deferred.clone(),
        };
        if let Err(raised) = producer(resolver, rejecter) {
            deferred.settle(true, raised);
        }
        deferred
    }

    pub(crate) fn pending(scheduler: Rc<dyn Schedule>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(DeferredCell {
                state: State::Pending,
                fulfillment_waiters: Vec::new(),
                rejection_waiters: Vec::new(),
            })),
            scheduler,
        }
    }

    /// Current state snapshot. For tooling and tests; chaining goes through
    /// [`Deferred::then`].
    pub fn state(&self) -> State {
        self.cell.borrow().state.clone()
    }

    /// Register continuations and get the new deferred value their outcome
    /// settles. `None` handlers default to identity (fulfillment) and
    /// re-raise (rejection).
    pub fn then(&self, on_fulfilled: Option<Handler>, on_rejected: Option<Handler>) -> Deferred {
        let next = Deferred::pending(self.scheduler.clone());
        let snapshot = self.cell.borrow().state.clone();
        match snapshot {
            State::Fulfilled(value) => self.schedule_reaction(&next, on_fulfilled, false, value),
            State::Rejected(reason) => self.schedule_reaction(&next, on_rejected, true, reason),
            State::Pending => {
                let on_fulfilled =
                    Self::waiter(self.scheduler.clone(), next.clone(), on_fulfilled, false);
                let on_rejected =
                    Self::waiter(self.scheduler.clone(), next.clone(), on_rejected, true);
                let mut cell = self.cell.borrow_mut();
                cell.fulfillment_waiters.push(on_fulfilled);
                cell.rejection_waiters.push(on_rejected);
            }
        }
        next
    }

    /// Sugar for `then(None, Some(on_rejected))`.
    pub fn catch(&self, on_rejected: Handler) -> Deferred {
        self.then(None, Some(on_rejected))
    }

    /// Run `on_finally` on either settlement path without observing the
    /// outcome. A thenable returned from the handler delays downstream
    /// settlement; afterwards the original value passes through and the
    /// original reason is re-raised. A raise from the handler replaces the
    /// outcome.
    pub fn finally(&self, on_finally: FinallyHandler) -> Deferred {
        // One handler, two paths; only the path that runs takes it.
        let shared = Rc::new(RefCell::new(Some(on_finally)));

        let on_fulfilled: Handler = {
            let shared = shared.clone();
            let scheduler = self.scheduler.clone();
            Box::new(move |value| {
                let followup = match shared.borrow_mut().take() {
                    Some(handler) => handler()?,
                    None => Value::Undefined,
                };
                let passthrough = Self::await_followup(&scheduler, followup)
                    .then(Some(Box::new(move |_| Ok(value))), None);
                Ok(Value::Deferred(passthrough))
            })
        };

        let on_rejected: Handler = {
            let scheduler = self.scheduler.clone();
            Box::new(move |reason| {
                let followup = match shared.borrow_mut().take() {
                    Some(handler) => handler()?,
                    None => Value::Undefined,
                };
                let reraise = Self::await_followup(&scheduler, followup)
                    .then(Some(Box::new(move |_| Err(reason))), None);
                Ok(Value::Deferred(reraise))
            })
        };

        self.then(Some(on_fulfilled), Some(on_rejected))
    }

    /// A deferred that adopts a `finally` handler's return value. The
    /// identity hop routes it through the resolution procedure, so a
    /// returned deferred or foreign thenable gates downstream settlement;
    /// `resolve` alone would store a thenable verbatim.
    fn await_followup(scheduler: &Rc<dyn Schedule>, followup: Value) -> Deferred {
        Deferred::resolve(scheduler, followup).then(None, None)
    }

    /// Schedule the settlement body. The `Pending` gate runs inside the
    /// scheduled task, so attempts after the first winner are no-ops.
    pub(crate) fn settle(&self, rejected: bool, payload: Value) {
        let target = self.clone();
        self.scheduler
            .schedule(Box::new(move || target.settle_now(rejected, payload)));
    }

    fn settle_now(&self, rejected: bool, payload: Value) {
        let (waiters, discarded) = {
            let mut cell = self.cell.borrow_mut();
            if !matches!(cell.state, State::Pending) {
                return;
            }
            cell.state = if rejected {
                State::Rejected(payload.clone())
            } else {
                State::Fulfilled(payload.clone())
            };
            let fulfillment = std::mem::take(&mut cell.fulfillment_waiters);
            let rejection = std::mem::take(&mut cell.rejection_waiters);
            if rejected {
                (rejection, fulfillment)
            } else {
                (fulfillment, rejection)
            }
        };
        drop(discarded);
        for waiter in waiters {
            waiter(payload.clone());
        }
    }

    fn schedule_reaction(
        &self,
        next: &Deferred,
        handler: Option<Handler>,
        rejected: bool,
        payload: Value,
    ) {
        let next = next.clone();
        self.scheduler
            .schedule(Box::new(move || run_reaction(&next, handler, rejected, payload)));
    }

    // A waiter's body schedules the handler run; settlement drains waiters,
    // so the handler sits two deferral hops behind the settling call.
    fn waiter(
        scheduler: Rc<dyn Schedule>,
        next: Deferred,
        handler: Option<Handler>,
        rejected: bool,
    ) -> Waiter {
        Box::new(move |payload| {
            scheduler.schedule(Box::new(move || run_reaction(&next, handler, rejected, payload)));
        })
    }

    pub(crate) fn same_cell(&self, other: &Deferred) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("state", &self.state()).finish()
    }
}
