use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{EventKind, Purchase, Viewport};

/// One synthetic analytics hit, independent of wire format.
///
/// `referrer` is `None` for direct traffic.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingEvent {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub url: String,
    pub referrer: Option<String>,
    pub page: String,
    pub viewport: Viewport,
    pub locale: String,
    pub user_agent: String,
    pub purchase: Option<Purchase>,
}

impl TrackingEvent {
    /// Purchase events carry an amount and nothing else does
    pub fn is_consistent(&self) -> bool {
        (self.kind == EventKind::Purchase) == self.purchase.is_some()
    }
}
