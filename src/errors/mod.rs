use miette::Diagnostic;
use thiserror::Error;

/// Faults raised by the library itself. They travel as rejection reasons
/// inside [`crate::Value::Error`]; everything a producer, handler, or
/// thenable raises is carried verbatim and never wrapped in one of these.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum DeferredError {
    #[error("chaining cycle detected for deferred value")]
    ChainCycle,

    #[error("expected an ordered, indexable collection")]
    NotIterable,
}
