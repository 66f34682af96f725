//! Record categories and their remote folder grouping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A kind of local record being archived.
///
/// The set is fixed and totally ordered by backup priority: text messages
/// drain first, then multimedia messages, then call log entries, then
/// third-party chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Plain text messages
    Sms,
    /// Multimedia messages
    Mms,
    /// Call log entries
    CallLog,
    /// Third-party chat messages
    Chat,
}

impl Category {
    /// All categories in fixed backup priority order.
    pub const IN_PRIORITY_ORDER: [Category; 4] =
        [Category::Sms, Category::Mms, Category::CallLog, Category::Chat];

    /// Position of this category in the fixed backup priority order.
    pub fn priority(&self) -> usize {
        match self {
            Category::Sms => 0,
            Category::Mms => 1,
            Category::CallLog => 2,
            Category::Chat => 3,
        }
    }

    /// The remote folder group this category is archived into.
    ///
    /// Text and multimedia messages share one folder; call log entries and
    /// chat messages each get their own.
    pub fn folder_group(&self) -> FolderGroup {
        match self {
            Category::Sms | Category::Mms => FolderGroup::Messages,
            Category::CallLog => FolderGroup::Calls,
            Category::Chat => FolderGroup::Chats,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Sms => write!(f, "SMS"),
            Category::Mms => write!(f, "MMS"),
            Category::CallLog => write!(f, "call log"),
            Category::Chat => write!(f, "chat"),
        }
    }
}

/// A remote folder destination shared by one or more categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderGroup {
    /// Text and multimedia messages
    Messages,
    /// Call log entries
    Calls,
    /// Third-party chat messages
    Chats,
}

impl FolderGroup {
    /// Stable folder name used by store implementations.
    pub fn folder_name(&self) -> &'static str {
        match self {
            FolderGroup::Messages => "messages",
            FolderGroup::Calls => "calls",
            FolderGroup::Chats => "chats",
        }
    }
}

impl fmt::Display for FolderGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder_name())
    }
}
