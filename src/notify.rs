//! Optional push notification of the run report.
//!
//! The notifier POSTs a `{subject, body}` JSON payload to a configured
//! webhook endpoint. Delivery is strictly best-effort: by the time the
//! report goes out the snapshot is already saved, so a dead endpoint must
//! never fail the run.

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

use crate::report::RunReport;

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    subject: &'a str,
    body: &'a str,
}

/// Pushes run reports to an HTTP webhook.
pub struct WebhookNotifier {
    client: Arc<Client>,
    endpoint: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `endpoint` with the shared client.
    pub fn new(client: Arc<Client>, endpoint: impl Into<String>) -> Self {
        WebhookNotifier {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// POSTs one notification; any non-2xx answer counts as failure.
    pub async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let payload = NotificationPayload { subject, body };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach notification endpoint {}", self.endpoint))?;

        if !response.status().is_success() {
            bail!(
                "Notification endpoint {} answered HTTP {}",
                self.endpoint,
                response.status().as_u16()
            );
        }
        Ok(())
    }
}

/// Delivers the report if a notifier is configured; failures are logged only.
pub async fn deliver_report(notifier: Option<&WebhookNotifier>, report: &RunReport) {
    let Some(notifier) = notifier else {
        debug!("No notification endpoint configured; skipping delivery");
        return;
    };

    match notifier.send(&report.subject(), &report.body()).await {
        Ok(()) => debug!("Report notification delivered"),
        Err(e) => warn!("Failed to deliver report notification: {e:#}"),
    }
}
