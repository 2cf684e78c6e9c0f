/*!
 * Core Types
 * Common types and error handling used across the crate
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory address carried by a transaction (destination or source)
pub type Address = u64;

/// Size type for byte counts and slot counts
pub type Size = usize;

/// Common result type for transport and codec operations
///
/// # Must Use
/// Transport failures must be handled to avoid losing queue state
pub type LinkResult<T> = Result<T, LinkError>;

/// Unified error type with miette diagnostics
///
/// Transient capacity conditions (queue full/empty) are never errors; they
/// are boolean returns on the non-blocking operations. This enum covers the
/// remaining taxonomy: region failures, bad configuration, protocol
/// violations, and cooperative interruption.
#[derive(Error, Debug, Clone, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum LinkError {
    /// Backing shared-memory region could not be created, mapped, or removed
    #[error("shared region operation failed: {0}")]
    #[diagnostic(
        code(shmlink::region),
        help("Check that the queue name resolves to a writable location and that the backing file is not owned by another user.")
    )]
    Region(String),

    /// Queue or endpoint configuration is invalid
    #[error("invalid configuration: {0}")]
    #[diagnostic(
        code(shmlink::invalid_config),
        help("Queue capacity must be at least 2 slots and the queue name must be non-empty.")
    )]
    InvalidConfig(String),

    /// Existing region does not match the requested queue geometry
    #[error("incompatible queue '{name}': {reason}")]
    #[diagnostic(
        code(shmlink::incompatible_queue),
        help("A stale queue from a previous run can be removed by name (delete, or open the endpoint with `fresh`).")
    )]
    IncompatibleQueue { name: String, reason: String },

    /// Peer sent data that violates the wire protocol
    #[error("protocol violation: {0}")]
    #[diagnostic(
        code(shmlink::protocol_violation),
        help("The peer declared a transfer the receiver cannot represent. Both sides must be built with the same wire geometry.")
    )]
    ProtocolViolation(String),

    /// A response does not answer the outstanding request
    #[error("response mismatch: {0}")]
    #[diagnostic(
        code(shmlink::response_mismatch),
        help("The response's opcode, operand size, length, or destination does not match the in-flight request. Check for unrelated traffic sharing the channel.")
    )]
    ResponseMismatch(String),

    /// A blocking operation observed the caller's interrupt check
    #[error("operation interrupted before completion")]
    #[diagnostic(
        code(shmlink::interrupted),
        help("The installed interrupt check fired inside a blocking retry loop. The operation did not complete.")
    )]
    Interrupted,
}
