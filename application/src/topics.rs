//! Council topic names
//!
//! Every event the service publishes or consumes travels over one of
//! these topics. Adapters receive the full list via [`all`] so they can
//! create missing topics during `connect`.

/// Inbound prompt submissions.
pub const QUEUE: &str = "council.queue";

/// Lifecycle notifications, one per status transition.
pub const STATUS_CHANGED: &str = "council.statusChanged";

/// Final answers, published once per processed prompt.
pub const SAVED: &str = "council.saved";

/// Every topic the service uses.
pub fn all() -> [&'static str; 3] {
    [QUEUE, STATUS_CHANGED, SAVED]
}
