// Threshold endpoints
//
// `POST /threshold` reports semantic failures inside a 2xx body as
// messages prefixed with "Error". This module returns the messages
// verbatim; interpreting them is the caller's business.

use serde_json::Value;
use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{ThresholdTable, ThresholdUpdate};

impl ControllerClient {
    /// `GET /thresholds` as `{"<dpid>": [{port, threshold, max_threshold}]}`.
    pub async fn list_thresholds(&self) -> Result<ThresholdTable, Error> {
        self.get("thresholds").await
    }

    /// `POST /threshold` with a list of updates.
    ///
    /// Returns the controller's messages in order. Non-string entries are
    /// rendered as compact JSON so nothing is silently dropped.
    pub async fn update_thresholds(
        &self,
        updates: &[ThresholdUpdate],
    ) -> Result<Vec<String>, Error> {
        debug!(count = updates.len(), "updating thresholds");
        let messages: Vec<Value> = self.post("threshold", &updates).await?;
        Ok(messages
            .into_iter()
            .map(|m| match m {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }
}
