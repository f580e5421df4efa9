//! Wire formats for tracking events.
//!
//! Two incompatible layouts are in circulation and a deployment sticks to one:
//!
//! - `flat`: short keys (`uid`, `sid`, `t`, `e`, ...), `t` in epoch milliseconds,
//!   direct traffic sent as `ref: "direct"`.
//! - `nested`: long keys with page context under `data`, `timestamp` in epoch
//!   seconds (fractional, millisecond precision), direct traffic sent as an
//!   empty `referrer`.

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use super::catalog::DIRECT_REFERRER;
use crate::domain::{EventKind, TrackingEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PayloadSchema {
    #[default]
    Flat,
    Nested,
}

impl PayloadSchema {
    /// Serialize `event` into the JSON body for this schema
    pub fn encode(self, event: &TrackingEvent) -> serde_json::Result<Vec<u8>> {
        match self {
            PayloadSchema::Flat => serde_json::to_vec(&FlatPayload::from(event)),
            PayloadSchema::Nested => serde_json::to_vec(&NestedPayload::from(event)),
        }
    }
}

#[derive(Debug, Serialize)]
struct FlatPayload<'a> {
    uid: Uuid,
    sid: Uuid,
    t: i64,
    e: EventKind,
    url: &'a str,
    #[serde(rename = "ref")]
    referrer: &'a str,
    p: &'a str,
    vp: String,
    lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<&'a str>,
}

impl<'a> From<&'a TrackingEvent> for FlatPayload<'a> {
    fn from(event: &'a TrackingEvent) -> Self {
        Self {
            uid: event.user_id,
            sid: event.session_id,
            t: event.timestamp.timestamp_millis(),
            e: event.kind,
            url: &event.url,
            referrer: event.referrer.as_deref().unwrap_or(DIRECT_REFERRER),
            p: &event.page,
            vp: event.viewport.to_string(),
            lang: &event.locale,
            value: event.purchase.as_ref().map(|p| p.value),
            currency: event.purchase.as_ref().map(|p| p.currency.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
struct NestedPayload<'a> {
    event_name: EventKind,
    timestamp: f64,
    user_id: Uuid,
    session_id: Uuid,
    url: &'a str,
    referrer: &'a str,
    user_agent: &'a str,
    data: NestedData<'a>,
}

#[derive(Debug, Serialize)]
struct NestedData<'a> {
    page: &'a str,
    viewport: String,
    locale: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<&'a str>,
}

impl<'a> From<&'a TrackingEvent> for NestedPayload<'a> {
    fn from(event: &'a TrackingEvent) -> Self {
        Self {
            event_name: event.kind,
            timestamp: event.timestamp.timestamp_millis() as f64 / 1000.0,
            user_id: event.user_id,
            session_id: event.session_id,
            url: &event.url,
            referrer: event.referrer.as_deref().unwrap_or_default(),
            user_agent: &event.user_agent,
            data: NestedData {
                page: &event.page,
                viewport: event.viewport.to_string(),
                locale: &event.locale,
                value: event.purchase.as_ref().map(|p| p.value),
                currency: event.purchase.as_ref().map(|p| p.currency.as_str()),
            },
        }
    }
}
