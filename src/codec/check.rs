/*!
 * Response Validation
 * Confirms a response answers the caller's own in-flight request
 */

use super::transaction::Transaction;
use crate::core::types::{Address, LinkError, LinkResult};
use crate::protocol::command::Opcode;
use log::warn;
use serde::{Deserialize, Serialize};

/// What to do when a response does not match the outstanding request
///
/// Protocol-bridging and test-harness contexts prefer to log and continue;
/// everything else should fail hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Mismatches are errors
    Fatal,
    /// Mismatches are logged and otherwise ignored
    Warn,
}

/// Shape of the response the requester is waiting for
#[derive(Debug, Clone)]
pub struct Expected {
    /// Response opcode the request calls for
    pub opcode: Opcode,
    /// Operand size exponent of the request
    pub size: u8,
    /// Operand units sent but not yet acknowledged
    pub outstanding: u32,
    /// Destination address the response must carry
    pub destination: Address,
}

/// Checks responses against the outstanding request per a fixed policy
#[derive(Debug, Clone)]
pub struct ResponseChecker {
    policy: Policy,
}

impl ResponseChecker {
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Flag any way `response` fails to answer `expected`
    ///
    /// Mismatched opcode, mismatched operand size, a declared length larger
    /// than what is outstanding, or a wrong destination address each count.
    /// Under [`Policy::Warn`] the faults are logged and the call succeeds.
    pub fn check(&self, response: &Transaction, expected: &Expected) -> LinkResult<()> {
        let mut faults: Vec<String> = Vec::new();

        let opcode = response.cmd.opcode();
        if opcode != expected.opcode {
            faults.push(format!("opcode {} != expected {}", opcode, expected.opcode));
        }
        if response.cmd.size() != expected.size {
            faults.push(format!(
                "size {} != expected {}",
                response.cmd.size(),
                expected.size
            ));
        }
        if response.cmd.burst_units() > expected.outstanding {
            faults.push(format!(
                "length of {} units exceeds {} outstanding",
                response.cmd.burst_units(),
                expected.outstanding
            ));
        }
        if response.destination != expected.destination {
            faults.push(format!(
                "destination {:#x} != expected {:#x}",
                response.destination, expected.destination
            ));
        }

        if faults.is_empty() {
            return Ok(());
        }
        let detail = faults.join("; ");
        match self.policy {
            Policy::Warn => {
                warn!("Response mismatch ({}): {}", detail, response);
                Ok(())
            }
            Policy::Fatal => Err(LinkError::ResponseMismatch(detail)),
        }
    }
}
