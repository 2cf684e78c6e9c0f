/*!
 * Fragmentation Codec
 * Serializes transactions into packet sequences and reassembles them
 */

use super::transaction::Transaction;
use crate::core::limits::{MAX_BURST_BYTES, PACKET_PAYLOAD_BYTES, TXN_HEADER_BYTES};
use crate::core::types::{Address, LinkError, LinkResult};
use crate::endpoint::rx::RxEndpoint;
use crate::endpoint::tx::TxEndpoint;
use crate::protocol::command::Command;
use crate::protocol::packet::Packet;

/// Serialize `txn` into packets and push them through `tx`
///
/// The header packet carries the command word, both addresses, and the
/// opening payload chunk; continuation packets carry only payload bytes.
/// The header is attempted first: when non-blocking and the queue is full,
/// the call returns `Ok(false)` with nothing sent. Once the header is out
/// the call is committed and every continuation is retried until delivered,
/// even in non-blocking mode; a half-delivered transaction cannot be
/// repaired at this layer. Returns `Ok(true)` when the full transaction is
/// on the wire.
pub fn send_transaction(
    txn: &Transaction,
    tx: &mut TxEndpoint,
    blocking: bool,
) -> LinkResult<bool> {
    let nbytes = txn.byte_len();
    if nbytes > MAX_BURST_BYTES {
        return Err(LinkError::ProtocolViolation(format!(
            "transaction declares {} bytes, cap is {}",
            nbytes, MAX_BURST_BYTES
        )));
    }
    if txn.data.len() < nbytes {
        return Err(LinkError::ProtocolViolation(format!(
            "transaction declares {} bytes but carries {}",
            nbytes,
            txn.data.len()
        )));
    }

    let first = nbytes.min(PACKET_PAYLOAD_BYTES);
    let mut packet = Packet::new();
    packet.destination = route_id(txn.destination);
    packet.set_last(nbytes <= PACKET_PAYLOAD_BYTES);
    packet.data[0..4].copy_from_slice(&txn.cmd.raw().to_le_bytes());
    packet.data[4..12].copy_from_slice(&txn.destination.to_le_bytes());
    packet.data[12..20].copy_from_slice(&txn.source.to_le_bytes());
    packet.data[TXN_HEADER_BYTES..TXN_HEADER_BYTES + first].copy_from_slice(&txn.data[..first]);

    if blocking {
        tx.send_blocking(&packet)?;
    } else if !tx.send(&packet) {
        return Ok(false);
    }

    // Header delivered; the remaining fragments must follow no matter what
    let mut offset = first;
    while offset < nbytes {
        let chunk = (nbytes - offset).min(PACKET_PAYLOAD_BYTES);
        let mut cont = Packet::new();
        cont.destination = route_id(txn.destination);
        cont.set_last(offset + chunk == nbytes);
        cont.data[..chunk].copy_from_slice(&txn.data[offset..offset + chunk]);
        tx.send_blocking(&cont)?;
        offset += chunk;
    }
    Ok(true)
}

/// Receive one transaction from `rx`, reassembling fragments
///
/// When non-blocking and no header packet is queued, returns `Ok(false)`
/// and leaves `txn` untouched. Once a header arrives the declared byte
/// count is honored: the payload buffer is sized to exactly
/// `(len+1) << size` bytes and continuation packets are received (retrying
/// each) until it is full. A declared length above the reassembly cap is a
/// protocol error. Payload-free opcodes never consume continuations.
pub fn recv_transaction(
    txn: &mut Transaction,
    rx: &mut RxEndpoint,
    blocking: bool,
) -> LinkResult<bool> {
    let mut packet = Packet::new();
    if blocking {
        rx.recv_blocking(&mut packet)?;
    } else if !rx.recv(&mut packet) {
        return Ok(false);
    }

    let cmd = Command(read_u32_le(&packet.data[0..4]));
    let destination = read_u64_le(&packet.data[4..12]);
    let source = read_u64_le(&packet.data[12..20]);

    let nbytes = cmd.payload_bytes();
    if nbytes > MAX_BURST_BYTES {
        return Err(LinkError::ProtocolViolation(format!(
            "peer declared {} bytes for {}, cap is {}",
            nbytes,
            cmd.opcode(),
            MAX_BURST_BYTES
        )));
    }

    txn.data.clear();
    txn.data.resize(nbytes, 0);
    let first = nbytes.min(PACKET_PAYLOAD_BYTES);
    txn.data[..first].copy_from_slice(&packet.data[TXN_HEADER_BYTES..TXN_HEADER_BYTES + first]);

    let mut offset = first;
    while offset < nbytes {
        let mut cont = Packet::new();
        rx.recv_blocking(&mut cont)?;
        let chunk = (nbytes - offset).min(PACKET_PAYLOAD_BYTES);
        txn.data[offset..offset + chunk].copy_from_slice(&cont.data[..chunk]);
        offset += chunk;
    }

    txn.destination = destination;
    txn.source = source;
    txn.cmd = cmd;
    Ok(true)
}

/// Routing identifier carried in the packet prefix: the low destination
/// word, consumed by external packet routers only
#[inline]
fn route_id(destination: Address) -> u32 {
    destination as u32
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}

#[inline]
fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    u64::from_le_bytes(word)
}
