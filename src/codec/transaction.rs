/*!
 * Transaction
 * Logical memory operation spanning one or more packets
 */

use crate::core::limits::{MAX_BURST_BYTES, PACKET_PAYLOAD_BYTES};
use crate::core::types::Address;
use crate::protocol::command::{AtomicOp, Command, Opcode};
use std::fmt;

/// One logical read/write/atomic operation
///
/// The source address is meaningful only for request opcodes that expect a
/// response. The payload length is fully determined by the command word:
/// `(len+1) << size` bytes for data-bearing opcodes, zero otherwise.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub destination: Address,
    pub source: Address,
    pub cmd: Command,
    pub data: Vec<u8>,
}

impl Transaction {
    /// Placeholder transaction; compares equal to any other invalid one
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            destination: 0,
            source: 0,
            cmd: Command(0),
            data: Vec::new(),
        }
    }

    /// Read request for `(len+1) << size` bytes at `destination`
    #[must_use]
    pub fn read(destination: Address, source: Address, size: u8, len: u8) -> Self {
        Self {
            destination,
            source,
            cmd: Command::pack(Opcode::ReadRequest, size, len, 0, 0, true, false, false),
            data: Vec::new(),
        }
    }

    /// Write request carrying `data`, which must be a whole number of
    /// `2^size`-byte units no larger than the burst cap
    #[must_use]
    pub fn write(destination: Address, source: Address, size: u8, data: Vec<u8>) -> Self {
        let cmd = Self::data_cmd(Opcode::WriteRequest, size, &data);
        Self {
            destination,
            source,
            cmd,
            data,
        }
    }

    /// Posted write: delivered without acknowledgement
    #[must_use]
    pub fn posted_write(destination: Address, size: u8, data: Vec<u8>) -> Self {
        let cmd = Self::data_cmd(Opcode::PostedWrite, size, &data);
        Self {
            destination,
            source: 0,
            cmd,
            data,
        }
    }

    /// Atomic read-modify-write of a single `2^size`-byte operand
    #[must_use]
    pub fn atomic(
        destination: Address,
        source: Address,
        op: AtomicOp,
        size: u8,
        data: Vec<u8>,
    ) -> Self {
        assert_eq!(
            data.len(),
            1usize << size,
            "atomic operand must be exactly one unit"
        );
        Self {
            destination,
            source,
            cmd: Command::pack(Opcode::AtomicRequest, size, op as u8, 0, 0, true, false, false),
            data,
        }
    }

    /// Read response carrying the requested bytes back to `destination`
    #[must_use]
    pub fn read_response(destination: Address, size: u8, data: Vec<u8>) -> Self {
        let cmd = Self::data_cmd(Opcode::ReadResponse, size, &data);
        Self {
            destination,
            source: 0,
            cmd,
            data,
        }
    }

    /// Write acknowledgement; carries no data
    #[must_use]
    pub fn write_response(destination: Address) -> Self {
        Self {
            destination,
            source: 0,
            cmd: Command::pack(Opcode::WriteResponse, 0, 0, 0, 0, true, false, false),
            data: Vec::new(),
        }
    }

    /// Payload bytes this transaction carries on the wire
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.cmd.payload_bytes()
    }

    /// Packets needed on the wire: one header plus continuations
    #[must_use]
    pub fn num_packets(&self) -> usize {
        let nbytes = self.byte_len();
        if nbytes <= PACKET_PAYLOAD_BYTES {
            1
        } else {
            1 + (nbytes - PACKET_PAYLOAD_BYTES).div_ceil(PACKET_PAYLOAD_BYTES)
        }
    }

    fn data_cmd(opcode: Opcode, size: u8, data: &[u8]) -> Command {
        let unit = 1usize << size;
        assert!(
            !data.is_empty() && data.len() % unit == 0,
            "payload must be a whole number of {}-byte units",
            unit
        );
        let units = data.len() / unit;
        assert!(
            units <= 256 && data.len() <= MAX_BURST_BYTES,
            "payload exceeds the maximum burst"
        );
        Command::pack(opcode, size, (units - 1) as u8, 0, 0, true, false, false)
    }
}

/// Equality per the protocol rules
///
/// Two invalid transactions are equal regardless of any other field.
/// Otherwise the command words must match exactly; link opcodes compare
/// equal with no further checks; addressed opcodes must agree on the
/// destination, requests also on the source, and data-bearing opcodes on
/// the full declared byte range, which must be populated on both sides.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        let opcode = self.cmd.opcode();
        if opcode == Opcode::Invalid && other.cmd.opcode() == Opcode::Invalid {
            return true;
        }
        if self.cmd.raw() != other.cmd.raw() {
            return false;
        }
        if opcode.is_link() {
            return true;
        }
        if self.destination != other.destination {
            return false;
        }
        if opcode.is_request() && self.source != other.source {
            return false;
        }
        if opcode.has_data() {
            let nbytes = self.byte_len();
            if self.data.len() < nbytes || other.data.len() < nbytes {
                return false;
            }
            return self.data[..nbytes] == other.data[..nbytes];
        }
        true
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dst={:#018x} src={:#018x} bytes={}",
            self.cmd,
            self.destination,
            self.source,
            self.byte_len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transactions_always_equal() {
        let mut a = Transaction::invalid();
        let b = Transaction::invalid();
        a.destination = 0xDEAD;
        a.data = vec![1, 2, 3];
        assert_eq!(a, b);
    }

    #[test]
    fn test_request_equality_requires_source() {
        let a = Transaction::write(0x1000, 0x2000, 2, vec![0xAA; 8]);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.source = 0x3000;
        assert_ne!(a, b);
    }

    #[test]
    fn test_response_equality_ignores_source() {
        let a = Transaction::read_response(0x1000, 0, vec![0x55; 4]);
        let mut b = a.clone();
        b.source = 0x9999;
        assert_eq!(a, b);
    }

    #[test]
    fn test_data_compared_over_declared_range_only() {
        let a = Transaction::write(0x1000, 0x2000, 0, vec![1, 2, 3, 4]);
        let mut b = a.clone();
        b.data.push(0xFF);
        // trailing bytes beyond the declared range do not participate
        assert_eq!(a, b);
        b.data[0] = 9;
        assert_ne!(a, b);
    }

    #[test]
    fn test_unpopulated_declared_range_is_unequal() {
        let a = Transaction::write(0x1000, 0x2000, 0, vec![1, 2, 3, 4]);
        let mut b = a.clone();
        b.data.truncate(2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_num_packets() {
        let single = Transaction::posted_write(0, 0, vec![0; 32]);
        assert_eq!(single.num_packets(), 1);
        let fragmented = Transaction::posted_write(0, 0, vec![0; 128]);
        assert_eq!(fragmented.num_packets(), 4);
        let read = Transaction::read(0, 0, 2, 31);
        assert_eq!(read.num_packets(), 1);
    }

    #[test]
    #[should_panic(expected = "whole number")]
    fn test_ragged_payload_is_a_caller_bug() {
        let _ = Transaction::write(0, 0, 2, vec![0; 6]);
    }
}
