pub mod inventory;
pub mod mediator;
pub mod reconcile;
pub mod sync;

pub use mediator::{Decision, FailureMediator, PolicyMediator};
pub use reconcile::{reconcile, ReconcilePlan};
pub use sync::synchronize;
