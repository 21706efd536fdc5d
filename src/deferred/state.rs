use crate::value::Value;

/// Settlement state. `Pending` transitions at most once, to either settled
/// variant; the payload is immutable from then on.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}
