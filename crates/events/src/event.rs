use chrono::NaiveDate;

/// A domain event.
///
/// Events are immutable facts, versioned for schema evolution, and stamped
/// with the **business date** they describe. Circulation runs on explicit
/// calendar dates (no clock, no timezone), so business time is a `NaiveDate`
/// rather than a timestamp.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "catalog.book.registered").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn schema_version(&self) -> u32;

    /// The calendar date the event describes.
    fn occurred_on(&self) -> NaiveDate;
}
