//! Local records, batches, and the transport messages derived from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::Category;

/// A record timestamp in milliseconds since the Unix epoch.
///
/// Watermarks compare these directly, so ordering matters more than wall
/// clock accuracy.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch timestamp, doubling as the "already synced" baseline a
    /// first-ever run writes when it finds nothing to archive.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a new Timestamp from milliseconds since the Unix epoch.
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the raw millisecond value.
    pub fn millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// One raw local record as handed over by an item source.
///
/// The field map carries source columns (sender, body, duration, ...) opaque
/// to the engine; only converters interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Local store row id
    pub id: i64,
    /// Record timestamp, the value watermarks advance over
    pub timestamp: Timestamp,
    /// Source columns, keyed by column name
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    /// Create a record with an empty field map.
    pub fn new(id: i64, timestamp: Timestamp) -> Self {
        Self { id, timestamp, fields: BTreeMap::new() }
    }

    /// Add a source column (builder style).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a source column.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// An ordered, finite sequence of records for one category.
///
/// Produced by an item source bounded by the remaining run budget; consumed
/// exactly once through the batch queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// The category every record in this batch belongs to
    pub category: Category,
    /// The records, oldest first
    pub records: Vec<Record>,
}

impl Batch {
    /// Create a batch for one category.
    pub fn new(category: Category, records: Vec<Record>) -> Self {
        Self { category, records }
    }

    /// An empty batch for one category.
    pub fn empty(category: Category) -> Self {
        Self { category, records: Vec::new() }
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A unique identifier for one transport message.
///
/// UUID v4, displayed in mail Message-ID form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(uuid::Uuid);

impl MessageId {
    /// Create a new random MessageId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}@msgvault>", self.0)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

/// One transport message ready to be appended to a remote folder.
///
/// The payload is opaque to the engine; converters decide its shape.
#[derive(Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Message identity, generated at conversion time
    pub id: MessageId,
    /// Timestamp of the record this message was derived from
    pub date: Timestamp,
    /// Raw message payload
    pub raw: Vec<u8>,
}

impl MailMessage {
    /// Create a message with a fresh id.
    pub fn new(date: Timestamp, raw: Vec<u8>) -> Self {
        Self { id: MessageId::new(), date, raw }
    }
}

impl fmt::Debug for MailMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep payloads out of logs
        f.debug_struct("MailMessage")
            .field("id", &self.id)
            .field("date", &self.date)
            .field("raw", &format!("<{} bytes>", self.raw.len()))
            .finish()
    }
}

/// The outcome of converting one chunk of records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversion {
    /// Transport messages derived from the chunk, possibly fewer than the
    /// chunk's records if the converter declined some
    pub messages: Vec<MailMessage>,
    /// Maximum record timestamp among the converted messages; `None` when
    /// nothing was converted
    pub max_timestamp: Option<Timestamp>,
}

impl Conversion {
    /// A conversion that produced no messages.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of converted messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversion produced no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_ordering() {
        let t1 = Timestamp::new(1_000);
        let t2 = Timestamp::new(2_000);
        assert!(t1 < t2);
        assert_eq!(t1.max(t2), t2);
    }

    #[test]
    fn timestamp_zero_is_smallest() {
        assert!(Timestamp::ZERO <= Timestamp::new(0));
        assert!(Timestamp::ZERO < Timestamp::new(1));
    }

    #[test]
    fn timestamp_serializes_as_number() {
        let json = serde_json::to_string(&Timestamp::new(1234)).unwrap();
        assert_eq!(json, "1234");
    }

    #[test]
    fn record_field_lookup() {
        let rec = Record::new(7, Timestamp::new(100))
            .with_field("address", "+15551234")
            .with_field("body", "hello");
        assert_eq!(rec.field("address"), Some("+15551234"));
        assert_eq!(rec.field("missing"), None);
    }

    #[test]
    fn batch_counts() {
        let batch = Batch::new(
            Category::Sms,
            vec![Record::new(1, Timestamp::new(10)), Record::new(2, Timestamp::new(20))],
        );
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert!(Batch::empty(Category::Mms).is_empty());
    }

    #[test]
    fn message_id_display_is_mail_shaped() {
        let id = MessageId::new();
        let display = id.to_string();
        assert!(display.starts_with('<'));
        assert!(display.ends_with("@msgvault>"));
    }

    #[test]
    fn mail_message_debug_redacts_payload() {
        let msg = MailMessage::new(Timestamp::new(5), vec![1, 2, 3, 4]);
        let debug = format!("{:?}", msg);
        assert!(debug.contains("<4 bytes>"));
        assert!(!debug.contains("[1, 2, 3, 4]"));
    }

    #[test]
    fn empty_conversion_has_no_timestamp() {
        let conv = Conversion::empty();
        assert!(conv.is_empty());
        assert_eq!(conv.max_timestamp, None);
    }
}
