use chrono::{DateTime, Utc};

/// A fact emitted by a bill or party aggregate.
///
/// Events never change once emitted; `version` tracks the schema of the
/// payload so old history entries stay readable.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable name, e.g. `"invoicing.bill.issued"`.
    fn event_type(&self) -> &'static str;

    fn version(&self) -> u32;

    /// Business time of the change.
    fn occurred_at(&self) -> DateTime<Utc>;
}
