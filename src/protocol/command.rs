/*!
 * Command Word
 * Bit-packed 32-bit command field: opcode, operand size, burst length,
 * and control flags
 */

use crate::core::limits::MAX_SIZE_EXP;
use serde::{Deserialize, Serialize};
use std::fmt;

// Bit layout, LSB up. The len and atype fields alias the same range; the
// outer opcode selects which interpretation is live.
const OPCODE_SHIFT: u32 = 0;
const OPCODE_MASK: u32 = 0x1F;
const SIZE_SHIFT: u32 = 5;
const SIZE_MASK: u32 = 0x7;
const LEN_SHIFT: u32 = 8;
const LEN_MASK: u32 = 0xFF;
const QOS_SHIFT: u32 = 16;
const QOS_MASK: u32 = 0xF;
const PROT_SHIFT: u32 = 20;
const PROT_MASK: u32 = 0x3;
const EOM_SHIFT: u32 = 22;
const EOF_SHIFT: u32 = 23;
const EX_SHIFT: u32 = 24;

/// Bits of the command word holding the burst length / atomic sub-opcode
pub const CMD_LEN_FIELD: u32 = LEN_MASK << LEN_SHIFT;

/// Bit of the command word holding the end-of-message flag
pub const CMD_EOM_FIELD: u32 = 1 << EOM_SHIFT;

/// Request/response kind carried in the low five command bits
///
/// Requests use odd wire values, responses even; the link pair sits at the
/// top of the 5-bit space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Opcode {
    Invalid = 0x00,
    ReadRequest = 0x01,
    ReadResponse = 0x02,
    WriteRequest = 0x03,
    WriteResponse = 0x04,
    PostedWrite = 0x05,
    RdmaRequest = 0x07,
    AtomicRequest = 0x09,
    LinkResponse = 0x1E,
    LinkRequest = 0x1F,
}

impl Opcode {
    /// Decode a 5-bit wire value; reserved encodings decode as `Invalid`
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            0x01 => Opcode::ReadRequest,
            0x02 => Opcode::ReadResponse,
            0x03 => Opcode::WriteRequest,
            0x04 => Opcode::WriteResponse,
            0x05 => Opcode::PostedWrite,
            0x07 => Opcode::RdmaRequest,
            0x09 => Opcode::AtomicRequest,
            0x1E => Opcode::LinkResponse,
            0x1F => Opcode::LinkRequest,
            _ => Opcode::Invalid,
        }
    }

    /// Wire encoding of this opcode
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Request-class opcode (carries a meaningful source address)
    ///
    /// # Performance
    /// Hot path - called per packet during equality and merge checks
    #[inline(always)]
    #[must_use]
    pub const fn is_request(self) -> bool {
        matches!(
            self,
            Opcode::ReadRequest
                | Opcode::WriteRequest
                | Opcode::PostedWrite
                | Opcode::RdmaRequest
                | Opcode::AtomicRequest
        )
    }

    /// Response-class opcode
    #[inline(always)]
    #[must_use]
    pub const fn is_response(self) -> bool {
        matches!(self, Opcode::ReadResponse | Opcode::WriteResponse)
    }

    /// Link-layer opcode (no addressing, no data)
    #[inline(always)]
    #[must_use]
    pub const fn is_link(self) -> bool {
        matches!(self, Opcode::LinkRequest | Opcode::LinkResponse)
    }

    /// Opcode carries payload bytes on the wire
    ///
    /// Plain reads, RDMA requests, write acknowledgements, and link traffic
    /// carry zero data regardless of the declared size and length fields.
    #[inline(always)]
    #[must_use]
    pub const fn has_data(self) -> bool {
        matches!(
            self,
            Opcode::WriteRequest
                | Opcode::PostedWrite
                | Opcode::AtomicRequest
                | Opcode::ReadResponse
        )
    }

    /// Adjacent transactions of this opcode may be coalesced
    #[inline(always)]
    #[must_use]
    pub const fn is_mergeable(self) -> bool {
        matches!(
            self,
            Opcode::WriteRequest | Opcode::PostedWrite | Opcode::ReadResponse
        )
    }

    /// Read-modify-write atomic request
    #[inline(always)]
    #[must_use]
    pub const fn is_atomic(self) -> bool {
        matches!(self, Opcode::AtomicRequest)
    }

    /// Request opcode that expects a response transaction back
    #[inline(always)]
    #[must_use]
    pub const fn expects_response(self) -> bool {
        matches!(
            self,
            Opcode::ReadRequest | Opcode::WriteRequest | Opcode::AtomicRequest
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Invalid => "INVALID",
            Opcode::ReadRequest => "READ-REQ",
            Opcode::ReadResponse => "READ-RESP",
            Opcode::WriteRequest => "WRITE-REQ",
            Opcode::WriteResponse => "WRITE-RESP",
            Opcode::PostedWrite => "WRITE-POSTED",
            Opcode::RdmaRequest => "RDMA-REQ",
            Opcode::AtomicRequest => "ATOMIC-REQ",
            Opcode::LinkResponse => "LINK-RESP",
            Opcode::LinkRequest => "LINK-REQ",
        };
        f.write_str(name)
    }
}

/// Atomic sub-opcode, aliased into the burst-length bit range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AtomicOp {
    Add = 0x00,
    And = 0x01,
    Or = 0x02,
    Xor = 0x03,
    Max = 0x04,
    Min = 0x05,
    MaxU = 0x06,
    MinU = 0x07,
    Swap = 0x08,
}

impl AtomicOp {
    /// Decode an atomic sub-opcode; reserved encodings decode as `None`
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0x00 => Some(AtomicOp::Add),
            0x01 => Some(AtomicOp::And),
            0x02 => Some(AtomicOp::Or),
            0x03 => Some(AtomicOp::Xor),
            0x04 => Some(AtomicOp::Max),
            0x05 => Some(AtomicOp::Min),
            0x06 => Some(AtomicOp::MaxU),
            0x07 => Some(AtomicOp::MinU),
            0x08 => Some(AtomicOp::Swap),
            _ => None,
        }
    }
}

impl fmt::Display for AtomicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtomicOp::Add => "ADD",
            AtomicOp::And => "AND",
            AtomicOp::Or => "OR",
            AtomicOp::Xor => "XOR",
            AtomicOp::Max => "MAX",
            AtomicOp::Min => "MIN",
            AtomicOp::MaxU => "MAXU",
            AtomicOp::MinU => "MINU",
            AtomicOp::Swap => "SWAP",
        };
        f.write_str(name)
    }
}

/// Bit-packed 32-bit command word
///
/// The raw representation is canonical for the wire. The len and atype
/// fields occupy the same bit range; accessors branch on the opcode class
/// rather than splitting the word into a tagged union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command(pub u32);

impl Command {
    /// Pack a command word from its component fields
    ///
    /// `len` carries the burst length minus one for non-atomic opcodes and
    /// the atomic sub-opcode for atomic requests. Out-of-range fields are a
    /// caller error.
    #[must_use]
    pub fn pack(
        opcode: Opcode,
        size: u8,
        len: u8,
        qos: u8,
        prot: u8,
        eom: bool,
        eof: bool,
        ex: bool,
    ) -> Self {
        assert!(size <= MAX_SIZE_EXP, "operand size exponent out of range");
        assert!(u32::from(qos) <= QOS_MASK, "qos field out of range");
        assert!(u32::from(prot) <= PROT_MASK, "prot field out of range");
        let mut raw = (u32::from(opcode.bits()) & OPCODE_MASK) << OPCODE_SHIFT;
        raw |= (u32::from(size) & SIZE_MASK) << SIZE_SHIFT;
        raw |= (u32::from(len) & LEN_MASK) << LEN_SHIFT;
        raw |= (u32::from(qos) & QOS_MASK) << QOS_SHIFT;
        raw |= (u32::from(prot) & PROT_MASK) << PROT_SHIFT;
        raw |= u32::from(eom) << EOM_SHIFT;
        raw |= u32::from(eof) << EOF_SHIFT;
        raw |= u32::from(ex) << EX_SHIFT;
        Command(raw)
    }

    /// Raw 32-bit wire value
    #[inline(always)]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline(always)]
    #[must_use]
    pub const fn opcode(self) -> Opcode {
        Opcode::from_bits(((self.0 >> OPCODE_SHIFT) & OPCODE_MASK) as u8)
    }

    /// Operand width exponent: operands are `2^size` bytes wide
    #[inline(always)]
    #[must_use]
    pub const fn size(self) -> u8 {
        ((self.0 >> SIZE_SHIFT) & SIZE_MASK) as u8
    }

    /// Burst length minus one
    ///
    /// Atomic requests reinterpret this bit range as the sub-opcode and
    /// always have burst length zero.
    #[inline(always)]
    #[must_use]
    pub const fn len(self) -> u8 {
        if self.opcode().is_atomic() {
            0
        } else {
            ((self.0 >> LEN_SHIFT) & LEN_MASK) as u8
        }
    }

    /// Number of operand-sized units in the burst
    #[inline(always)]
    #[must_use]
    pub const fn burst_units(self) -> u32 {
        self.len() as u32 + 1
    }

    /// Atomic sub-opcode, present only for atomic requests
    #[inline]
    #[must_use]
    pub const fn atomic_op(self) -> Option<AtomicOp> {
        if self.opcode().is_atomic() {
            AtomicOp::from_bits(((self.0 >> LEN_SHIFT) & LEN_MASK) as u8)
        } else {
            None
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn qos(self) -> u8 {
        ((self.0 >> QOS_SHIFT) & QOS_MASK) as u8
    }

    #[inline(always)]
    #[must_use]
    pub const fn prot(self) -> u8 {
        ((self.0 >> PROT_SHIFT) & PROT_MASK) as u8
    }

    /// End of logical message
    #[inline(always)]
    #[must_use]
    pub const fn eom(self) -> bool {
        (self.0 >> EOM_SHIFT) & 1 != 0
    }

    /// End of frame
    #[inline(always)]
    #[must_use]
    pub const fn eof(self) -> bool {
        (self.0 >> EOF_SHIFT) & 1 != 0
    }

    /// Exclusive-access request
    #[inline(always)]
    #[must_use]
    pub const fn ex(self) -> bool {
        (self.0 >> EX_SHIFT) & 1 != 0
    }

    /// Copy of this command with the burst-length field replaced
    #[inline]
    #[must_use]
    pub const fn with_len(self, len: u8) -> Self {
        Command((self.0 & !(LEN_MASK << LEN_SHIFT)) | ((len as u32) << LEN_SHIFT))
    }

    /// Copy of this command with the end-of-message flag replaced
    #[inline]
    #[must_use]
    pub const fn with_eom(self, eom: bool) -> Self {
        Command((self.0 & !(1 << EOM_SHIFT)) | ((eom as u32) << EOM_SHIFT))
    }

    /// Payload bytes this command declares: `(len+1) << size` for
    /// data-bearing opcodes, zero otherwise
    #[inline]
    #[must_use]
    pub const fn payload_bytes(self) -> usize {
        if self.opcode().has_data() {
            (self.len() as usize + 1) << self.size()
        } else {
            0
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} size={} len={} qos={} prot={}",
            self.opcode(),
            self.size(),
            self.len(),
            self.qos(),
            self.prot()
        )?;
        if let Some(op) = self.atomic_op() {
            write!(f, " atype={}", op)?;
        }
        if self.eom() {
            f.write_str(" eom")?;
        }
        if self.eof() {
            f.write_str(" eof")?;
        }
        if self.ex() {
            f.write_str(" ex")?;
        }
        Ok(())
    }
}
