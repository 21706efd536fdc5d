use std::rc::Rc;

use super::Value;

/// Callback handed to a foreign `then` method. Guarded by the resolution
/// procedure: only the first invocation across the pair is honored.
pub type SettledCallback = Box<dyn Fn(Value)>;

/// A one-shot `then` method. It may invoke either callback any number of
/// times, synchronously or arbitrarily later, and `Err` is a synchronous
/// raise out of the method itself.
pub type ThenMethod = Box<dyn FnOnce(SettledCallback, SettledCallback) -> Result<(), Value>>;

/// Interoperability contract with foreign deferred implementations.
///
/// `probe_then` models the member lookup: `Err` is a raising accessor,
/// `Ok(None)` an object without a callable `then` (treated as a plain
/// value), `Ok(Some(_))` a callable thenable.
pub trait ForeignThenable {
    fn probe_then(self: Rc<Self>) -> Result<Option<ThenMethod>, Value>;
}
