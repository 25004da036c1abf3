//! Cursor/queue synchronization.

mod reconciler;
mod swipe;

pub use reconciler::{
    Cursor, PositionOutcome, PositionReconciler, ReleaseToken, SLOT_EPSILON, SyncPlan,
};
pub use swipe::SwipeGate;
