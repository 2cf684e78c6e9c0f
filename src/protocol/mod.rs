/*!
 * Protocol Module
 * Wire-format constants, command word bit fields, and packet layout
 */

pub mod command;
pub mod packet;

// Re-export public API
pub use command::{AtomicOp, Command, Opcode, CMD_EOM_FIELD, CMD_LEN_FIELD};
pub use packet::{Packet, FLAG_LAST};
