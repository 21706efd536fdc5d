pub mod deferred;
pub mod errors;
pub mod scheduler;
pub mod value;

pub use deferred::{
    Completion, Deferred, DeferredParts, FinallyHandler, Handler, Rejecter, Resolver, State,
};
pub use errors::DeferredError;
pub use scheduler::{EventLoop, Schedule, Task};
pub use value::{ForeignThenable, SettledCallback, ThenMethod, Value};

use std::rc::Rc;

/// Convenience function to run deferred work end-to-end: hands `f` the
/// scheduler of a fresh event loop, drives the loop to idle, and returns
/// `f`'s output.
pub fn run<R>(f: impl FnOnce(&Rc<dyn Schedule>) -> R) -> R {
    let event_loop = EventLoop::new();
    let scheduler = event_loop.scheduler();
    let out = f(&scheduler);
    event_loop.run_until_idle();
    out
}
