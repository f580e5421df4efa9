use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::TrackingEvent;
use crate::payload::PayloadSchema;
use crate::stats::ThroughputCounter;
use crate::transport::EventTransport;

/// How a single POST ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected { status: u16 },
    /// No response (connection error, timeout, unencodable body)
    Failed,
}

/// Encodes, posts and accounts for one event at a time
pub struct EventSender {
    transport: Arc<dyn EventTransport>,
    url: String,
    schema: PayloadSchema,
    spoof_user_agent: bool,
    counter: Arc<ThroughputCounter>,
}

impl EventSender {
    pub fn new(
        transport: Arc<dyn EventTransport>,
        url: String,
        schema: PayloadSchema,
        spoof_user_agent: bool,
        counter: Arc<ThroughputCounter>,
    ) -> Self {
        Self {
            transport,
            url,
            schema,
            spoof_user_agent,
            counter,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send(&self, event: &TrackingEvent) -> Outcome {
        let body = match self.schema.encode(event) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "failed to encode event");
                self.counter.record_failed();
                return Outcome::Failed;
            }
        };

        let user_agent = self.spoof_user_agent.then_some(event.user_agent.as_str());
        match self.transport.post(&self.url, user_agent, body).await {
            Ok(delivery) if delivery.is_accepted() => {
                self.counter.record_accepted();
                Outcome::Accepted
            }
            Ok(delivery) => {
                self.counter.record_rejected();
                warn!(status = delivery.status, body = %delivery.body, "unexpected response status");
                Outcome::Rejected {
                    status: delivery.status,
                }
            }
            Err(e) => {
                self.counter.record_failed();
                debug!(error = %e, "request failed");
                Outcome::Failed
            }
        }
    }
}
