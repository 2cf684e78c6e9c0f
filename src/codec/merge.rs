/*!
 * Adjacency Merge
 * Coalesces two contiguous, compatible transactions into one
 */

use super::transaction::Transaction;
use crate::core::limits::MAX_BURST_BYTES;
use crate::protocol::command::{CMD_EOM_FIELD, CMD_LEN_FIELD};

/// Command bits allowed to differ between merge candidates
const MERGE_VARIANT_BITS: u32 = CMD_LEN_FIELD | CMD_EOM_FIELD;

/// Whether `second` may be folded onto the end of `first`
///
/// Requires mergeable-class opcodes on both sides, command words equal
/// outside the burst-length and end-of-message fields, end-of-message still
/// clear on `first`, exactly contiguous destination addresses (and source
/// addresses, for requests that expect a response), and a combined burst
/// that still fits the length field and the reassembly cap.
#[must_use]
pub fn can_merge(first: &Transaction, second: &Transaction) -> bool {
    if !first.cmd.opcode().is_mergeable() || !second.cmd.opcode().is_mergeable() {
        return false;
    }
    if (first.cmd.raw() | MERGE_VARIANT_BITS) != (second.cmd.raw() | MERGE_VARIANT_BITS) {
        return false;
    }
    if first.cmd.eom() {
        return false;
    }
    let first_bytes = first.byte_len() as u64;
    if second.destination != first.destination.wrapping_add(first_bytes) {
        return false;
    }
    // Source contiguity binds only where the source routes a response back
    if first.cmd.opcode().expects_response()
        && second.source != first.source.wrapping_add(first_bytes)
    {
        return false;
    }
    let units = first.cmd.burst_units() + second.cmd.burst_units();
    if units > 256 {
        return false;
    }
    (units as usize) << first.cmd.size() <= MAX_BURST_BYTES
}

/// Fold `second` onto the end of `first`
///
/// Payload bytes are concatenated, burst lengths are summed (plus the
/// implicit unit), and `second`'s end-of-message flag is adopted. Calling
/// this on a pair for which [`can_merge`] is false is a caller bug.
pub fn merge(first: &mut Transaction, second: &Transaction) {
    assert!(
        can_merge(first, second),
        "merge called on a non-mergeable transaction pair"
    );
    let first_bytes = first.byte_len();
    let second_bytes = second.byte_len();
    first.data.truncate(first_bytes);
    first.data.extend_from_slice(&second.data[..second_bytes]);

    let units = first.cmd.burst_units() + second.cmd.burst_units();
    first.cmd = first
        .cmd
        .with_len((units - 1) as u8)
        .with_eom(second.cmd.eom());
}
