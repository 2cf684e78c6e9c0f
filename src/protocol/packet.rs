/*!
 * Packet Layout
 * Fixed-size wire record moved atomically through a queue slot
 */

use crate::core::limits::PACKET_DATA_BYTES;
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Flags bit 0: last fragment of the current transaction
pub const FLAG_LAST: u32 = 1 << 0;

/// Fixed-size packet record
///
/// Byte-packed, no padding; the layout is shared across processes and must
/// not change between builds that attach to the same queue.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Packet {
    /// Routing identifier consumed by external packet routers
    pub destination: u32,
    /// Bit 0 = last fragment; remaining bits reserved
    pub flags: u32,
    /// Opaque data payload, fixed capacity per build
    pub data: [u8; PACKET_DATA_BYTES],
}

const _: () = assert!(std::mem::size_of::<Packet>() == 8 + PACKET_DATA_BYTES);
const _: () = assert!(std::mem::align_of::<Packet>() == 4);

impl Packet {
    /// Zeroed packet
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::zeroed()
    }

    /// Last-fragment flag
    #[inline(always)]
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.flags & FLAG_LAST != 0
    }

    /// Set or clear the last-fragment flag
    #[inline]
    pub fn set_last(&mut self, last: bool) {
        if last {
            self.flags |= FLAG_LAST;
        } else {
            self.flags &= !FLAG_LAST;
        }
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("destination", &format_args!("{:#010x}", self.destination))
            .field("flags", &self.flags)
            .field("data", &format_args!("[u8; {}]", self.data.len()))
            .finish()
    }
}
