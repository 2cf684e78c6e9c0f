/*!
 * Transmit Endpoint
 * Producer-side handle adding blocking and rate-limit semantics
 */

use super::rate::RateLimiter;
use super::types::{EndpointConfig, InterruptCheck};
use crate::core::types::{LinkError, LinkResult};
use crate::protocol::packet::Packet;
use crate::transport::ring::RingBuffer;
use log::info;
use std::thread;

/// Transmit side of one queue
///
/// Construction binds the endpoint to its queue; a handle that exists is
/// always usable. Exactly one transmit endpoint may be live per queue.
pub struct TxEndpoint {
    ring: RingBuffer,
    limiter: Option<RateLimiter>,
    interrupt: Option<InterruptCheck>,
}

impl TxEndpoint {
    /// Open the transmit side of the queue named in `config`
    ///
    /// With `config.fresh`, any stale queue of the same name is deleted
    /// first.
    pub fn open(config: &EndpointConfig) -> LinkResult<Self> {
        if config.fresh {
            RingBuffer::delete(&config.name)?;
        }
        let ring = RingBuffer::open(&config.name, config.capacity)?;
        info!(
            "Opened TX endpoint on queue '{}' ({} slots{})",
            config.name,
            config.capacity,
            match config.max_rate {
                Some(rate) => format!(", {:.0} msg/s max", rate),
                None => String::new(),
            }
        );
        Ok(Self {
            ring,
            limiter: config.max_rate.map(RateLimiter::new),
            interrupt: None,
        })
    }

    /// Install a cancellation probe polled inside blocking retry loops
    pub fn set_interrupt_check(&mut self, check: InterruptCheck) {
        self.interrupt = Some(check);
    }

    /// Push one packet; returns false when the queue is full
    ///
    /// # Performance
    /// Hot path - delegates straight to the ring, no throttling
    #[inline]
    pub fn send(&mut self, packet: &Packet) -> bool {
        let sent = self.ring.send(packet);
        if sent {
            if let Some(limiter) = &mut self.limiter {
                limiter.mark();
            }
        }
        sent
    }

    /// Push one packet, retrying until it is accepted
    ///
    /// Yields the scheduling quantum between attempts, or sleeps out the
    /// configured minimum inter-message period when a rate limit is set.
    /// Unwinds with [`LinkError::Interrupted`] if the installed interrupt
    /// check fires.
    pub fn send_blocking(&mut self, packet: &Packet) -> LinkResult<()> {
        loop {
            if let Some(limiter) = &mut self.limiter {
                limiter.pace();
            }
            if self.ring.send(packet) {
                if let Some(limiter) = &mut self.limiter {
                    limiter.mark();
                }
                return Ok(());
            }
            if let Some(check) = &self.interrupt {
                if check() {
                    return Err(LinkError::Interrupted);
                }
            }
            thread::yield_now();
        }
    }

    /// Number of packets currently queued
    #[inline]
    pub fn size(&self) -> usize {
        self.ring.size()
    }

    /// Queue name this endpoint is bound to
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.ring.name()
    }

    /// Underlying ring, for collaborators that hand the queue's region to
    /// a remote device
    #[inline]
    #[must_use]
    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }
}
