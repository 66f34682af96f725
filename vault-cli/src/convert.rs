//! Plain-text rendering of records into archivable messages.

use async_trait::async_trait;

use msgvault_core::Chunk;
use msgvault_engine::Converter;
use msgvault_types::{BackupError, Category, Conversion, MailMessage, MessageId, Record};

/// Converter rendering each record as a small plain-text message.
///
/// The `address` field becomes the `From` header and the `body` field the
/// message body. Records without a body render their remaining fields as
/// `key: value` lines instead, which suits call logs.
#[derive(Debug, Default)]
pub struct TextConverter;

impl TextConverter {
    /// Create a text converter.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Converter for TextConverter {
    async fn convert(&self, chunk: &Chunk) -> Result<Conversion, BackupError> {
        let mut messages = Vec::with_capacity(chunk.len());
        let mut max_timestamp = None;
        for record in &chunk.records {
            let id = MessageId::new();
            let raw = render(chunk.category, record, &id);
            messages.push(MailMessage { id, date: record.timestamp, raw });
            max_timestamp = max_timestamp.max(Some(record.timestamp));
        }
        Ok(Conversion { messages, max_timestamp })
    }
}

fn render(category: Category, record: &Record, id: &MessageId) -> Vec<u8> {
    let mut text = String::new();
    text.push_str(&format!(
        "From: {}\r\n",
        record.field("address").unwrap_or("unknown")
    ));
    text.push_str(&format!("Subject: {} {}\r\n", category, record.id));
    text.push_str(&format!("Message-ID: {}\r\n", id));
    text.push_str(&format!(
        "X-Archived-Timestamp: {}\r\n",
        record.timestamp.millis()
    ));
    text.push_str("\r\n");
    match record.field("body") {
        Some(body) => text.push_str(body),
        None => {
            // No body, so list the remaining fields instead
            for (key, value) in &record.fields {
                if key != "address" {
                    text.push_str(&format!("{}: {}\r\n", key, value));
                }
            }
        }
    }
    text.into_bytes()
}
