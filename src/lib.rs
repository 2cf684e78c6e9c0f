/*!
 * Shmlink
 * Shared-memory packet transport with a layered memory-transaction protocol
 *
 * Two processes exchange fixed-size packets through lock-free SPSC ring
 * buffers living in named shared-memory regions; the codec layer maps
 * logical read/write/atomic transactions onto packet sequences.
 */

pub mod codec;
pub mod core;
pub mod endpoint;
pub mod protocol;
pub mod transport;

// Re-exports
pub use codec::{
    can_merge, merge, recv_transaction, send_transaction, Expected, Policy, ResponseChecker,
    Transaction,
};
pub use crate::core::limits;
pub use crate::core::types::{Address, LinkError, LinkResult, Size};
pub use endpoint::{EndpointConfig, InterruptCheck, RateLimiter, RxEndpoint, TxEndpoint};
pub use protocol::{AtomicOp, Command, Opcode, Packet, FLAG_LAST};
pub use transport::{RingBuffer, SharedRegion};
