//! The resolution procedure: how an arbitrary handler outcome is unwrapped
//! into a concrete settlement of the target deferred value.
//!
//! Dispatch order is load-bearing: own-type adoption before the foreign
//! thenable probe before the plain-value fallback.

use std::cell::Cell;
use std::rc::Rc;

use crate::errors::DeferredError;
use crate::value::{ForeignThenable, SettledCallback, Value};

use super::{Deferred, Handler, State};

/// Run one scheduled continuation against `payload` and settle `next` from
/// its completion. A missing handler passes fulfillment through and
/// re-raises rejection.
pub(super) fn run_reaction(
    next: &Deferred,
    handler: Option<Handler>,
    rejected: bool,
    payload: Value,
) {
    let completion = match handler {
        Some(handler) => handler(payload),
        None if rejected => Err(payload),
        None => Ok(payload),
    };
    match completion {
        Ok(outcome) => resolve_into(next, outcome),
        Err(reason) => next.settle(true, reason),
    }
}

/// Settle `target` from an arbitrary `outcome`.
pub(super) fn resolve_into(target: &Deferred, outcome: Value) {
    match outcome {
        Value::Deferred(source) => {
            if source.same_cell(target) {
                // Self-referential chains fail fast instead of deadlocking.
                target.settle(true, Value::Error(DeferredError::ChainCycle));
                return;
            }
            adopt_deferred(target, &source);
        }
        Value::Foreign(object) => adopt_foreign(target, object),
        plain => target.settle(false, plain),
    }
}

/// Adopt the eventual outcome of another deferred value of this
/// implementation, recursing so chains of any depth reach their terminal
/// outcome.
fn adopt_deferred(target: &Deferred, source: &Deferred) {
    match source.state() {
        State::Pending => {
            let adopt = target.clone();
            let forward = target.clone();
            let _ = source.then(
                Some(Box::new(move |value| {
                    resolve_into(&adopt, value);
                    Ok(Value::Undefined)
                })),
                Some(Box::new(move |reason| {
                    forward.settle(true, reason);
                    Ok(Value::Undefined)
                })),
            );
        }
        State::Fulfilled(value) => target.settle(false, value),
        State::Rejected(reason) => target.settle(true, reason),
    }
}

fn adopt_foreign(target: &Deferred, object: Rc<dyn ForeignThenable>) {
    let member = match object.clone().probe_then() {
        Ok(member) => member,
        // A raising accessor rejects outright, never retried or swallowed.
        Err(raised) => {
            target.settle(true, raised);
            return;
        }
    };
    let Some(then_method) = member else {
        // No callable `then`: the object is a plain value.
        target.settle(false, Value::Foreign(object));
        return;
    };

    // Shared first-invocation guard across both callbacks and the
    // synchronous-raise path; whichever fires first wins.
    let called = Rc::new(Cell::new(false));
    let on_fulfilled: SettledCallback = {
        let called = called.clone();
        let target = target.clone();
        Box::new(move |value| {
            if called.replace(true) {
                return;
            }
            resolve_into(&target, value);
        })
    };
    let on_rejected: SettledCallback = {
        let called = called.clone();
        let target = target.clone();
        Box::new(move |reason| {
            if called.replace(true) {
                return;
            }
            target.settle(true, reason);
        })
    };

    if let Err(raised) = then_method(on_fulfilled, on_rejected) {
        if !called.replace(true) {
            target.settle(true, raised);
        }
    }
}
