use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::errors::DeferredError;
use crate::scheduler::Schedule;
use crate::value::Value;

use super::{Deferred, Rejecter, Resolver};

/// A fresh deferred value together with its raw settlement capabilities,
/// for callers that settle from outside a producer (conformance-test
/// adapters in particular).
pub struct DeferredParts {
    pub value: Deferred,
    pub resolver: Resolver,
    pub rejecter: Rejecter,
}

impl Deferred {
    /// Wrap `value` in an already-scheduled fulfillment. An own deferred
    /// value is returned unchanged; a foreign thenable is stored verbatim
    /// and only probed by later `then` machinery.
    pub fn resolve(scheduler: &Rc<dyn Schedule>, value: impl Into<Value>) -> Deferred {
        match value.into() {
            Value::Deferred(deferred) => deferred,
            other => Deferred::new(scheduler, |resolver, _| {
                resolver.resolve(other);
                Ok(())
            }),
        }
    }

    /// A deferred value scheduled to reject with `reason`.
    pub fn reject(scheduler: &Rc<dyn Schedule>, reason: impl Into<Value>) -> Deferred {
        let reason = reason.into();
        Deferred::new(scheduler, |_, rejecter| {
            rejecter.reject(reason);
            Ok(())
        })
    }

    /// Settle with every entry's result in input order, or with the first
    /// rejection. Only a `Value::List` is accepted; anything else rejects
    /// with [`DeferredError::NotIterable`]. Losing entries keep running and
    /// their results are discarded.
    pub fn all(scheduler: &Rc<dyn Schedule>, items: impl Into<Value>) -> Deferred {
        let Value::List(items) = items.into() else {
            return Deferred::reject(scheduler, DeferredError::NotIterable);
        };

        let aggregate = Deferred::pending(scheduler.clone());
        if items.is_empty() {
            aggregate.settle(false, Value::List(Vec::new()));
            return aggregate;
        }

        let total = items.len();
        let results = Rc::new(RefCell::new(vec![Value::Undefined; total]));
        let completed = Rc::new(Cell::new(0usize));
        for (index, item) in items.into_iter().enumerate() {
            let results = results.clone();
            let completed = completed.clone();
            let on_fulfilled = aggregate.clone();
            let on_rejected = aggregate.clone();
            let _ = Deferred::resolve(scheduler, item).then(
                Some(Box::new(move |value| {
                    results.borrow_mut()[index] = value;
                    completed.set(completed.get() + 1);
                    if completed.get() == total {
                        let collected = std::mem::take(&mut *results.borrow_mut());
                        on_fulfilled.settle(false, Value::List(collected));
                    }
                    Ok(Value::Undefined)
                })),
                Some(Box::new(move |reason| {
                    on_rejected.settle(true, reason);
                    Ok(Value::Undefined)
                })),
            );
        }
        aggregate
    }

    /// Settle with whichever entry settles first; later outcomes hit the
    /// settled gate and are discarded, not cancelled. Only a `Value::List`
    /// is accepted.
    pub fn race(scheduler: &Rc<dyn Schedule>, items: impl Into<Value>) -> Deferred {
        let Value::List(items) = items.into() else {
            return Deferred::reject(scheduler, DeferredError::NotIterable);
        };

        let aggregate = Deferred::pending(scheduler.clone());
        for item in items {
            let on_fulfilled = aggregate.clone();
            let on_rejected = aggregate.clone();
            let _ = Deferred::resolve(scheduler, item).then(
                Some(Box::new(move |value| {
                    on_fulfilled.settle(false, value);
                    Ok(Value::Undefined)
                })),
                Some(Box::new(move |reason| {
                    on_rejected.settle(true, reason);
                    Ok(Value::Undefined)
                })),
            );
        }
        aggregate
    }

    /// Factory for externally-settled deferred values.
    pub fn deferred(scheduler: &Rc<dyn Schedule>) -> DeferredParts {
        let value = Deferred::pending(scheduler.clone());
        DeferredParts {
            resolver: Resolver {
                target: value.clone(),
            },
            rejecter: Rejecter {
                target: value.clone(),
            },
            value,
        }
    }
}
