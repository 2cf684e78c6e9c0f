/*!
 * Wire Geometry Limits
 *
 * Centralized location for the fixed wire-format constants. Packet and slot
 * sizes are build-time constants, not negotiated at runtime: both sides of a
 * queue must be compiled with the same values, and the queue header records
 * them so a mismatch is detected at attach time.
 */

/// Transaction payload bytes carried per packet (header or continuation)
/// [PERF] One cache line holds a full chunk plus the packet prefix
pub const PACKET_PAYLOAD_BYTES: usize = 32;

/// Bytes of the transaction header riding in a header packet's data field:
/// command word (4) + destination address (8) + source address (8)
pub const TXN_HEADER_BYTES: usize = 20;

/// Fixed data capacity of every packet slot
/// Sized so a header packet fits the transaction header and one full chunk
pub const PACKET_DATA_BYTES: usize = TXN_HEADER_BYTES + PACKET_PAYLOAD_BYTES;

/// Largest operand size exponent the command word can carry (2^7 = 128 bytes)
pub const MAX_SIZE_EXP: u8 = 7;

/// Largest burst length field value (burst of 256 operand units)
pub const MAX_BURST_LEN: u8 = 255;

/// Reassembly cap on a single transaction's payload (8KB)
/// A received command word declaring more than this is a protocol error;
/// the wire format itself could express up to (255+1) << 7 = 32KB
pub const MAX_BURST_BYTES: usize = 8 * 1024;

/// Minimum slot count for a queue
/// One slot is always kept unused to tell "full" from "empty"
pub const MIN_QUEUE_CAPACITY: usize = 2;

/// Default slot count for endpoints that do not specify one
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
