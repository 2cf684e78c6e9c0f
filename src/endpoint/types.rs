/*!
 * Endpoint Types
 * Configuration shared by the transmit and receive wrappers
 */

use crate::core::limits::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};

/// Caller-installed cancellation probe polled inside blocking retry loops
///
/// Returning true unwinds the blocking call with
/// [`LinkError::Interrupted`](crate::core::types::LinkError::Interrupted).
pub type InterruptCheck = Box<dyn Fn() -> bool + Send>;

/// Configuration for one endpoint role bound to one queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Queue name; resolves to the backing shared-memory file
    pub name: String,
    /// Queue slot capacity (at most capacity - 1 packets in flight)
    pub capacity: usize,
    /// Delete any pre-existing queue of this name before opening
    pub fresh: bool,
    /// Maximum sustained message rate in messages per second
    pub max_rate: Option<f64>,
}

impl EndpointConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    #[must_use]
    pub fn max_rate(mut self, rate: f64) -> Self {
        self.max_rate = Some(rate);
        self
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            capacity: DEFAULT_QUEUE_CAPACITY,
            fresh: false,
            max_rate: None,
        }
    }
}
