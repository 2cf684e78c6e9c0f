/*!
 * Receive Endpoint
 * Consumer-side handle adding blocking and rate-limit semantics
 */

use super::rate::RateLimiter;
use super::types::{EndpointConfig, InterruptCheck};
use crate::core::types::{LinkError, LinkResult};
use crate::protocol::packet::Packet;
use crate::transport::ring::RingBuffer;
use log::info;
use std::thread;

/// Receive side of one queue
///
/// Exactly one receive endpoint may be live per queue.
pub struct RxEndpoint {
    ring: RingBuffer,
    limiter: Option<RateLimiter>,
    interrupt: Option<InterruptCheck>,
}

impl RxEndpoint {
    /// Open the receive side of the queue named in `config`
    pub fn open(config: &EndpointConfig) -> LinkResult<Self> {
        if config.fresh {
            RingBuffer::delete(&config.name)?;
        }
        let ring = RingBuffer::open(&config.name, config.capacity)?;
        info!(
            "Opened RX endpoint on queue '{}' ({} slots{})",
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

    /// Pop the oldest packet; returns false when the queue is empty
    ///
    /// # Performance
    /// Hot path - delegates straight to the ring, no throttling
    #[inline]
    pub fn recv(&mut self, packet: &mut Packet) -> bool {
        let received = self.ring.recv(packet);
        if received {
            if let Some(limiter) = &mut self.limiter {
                limiter.mark();
            }
        }
        received
    }

    /// Copy the oldest packet without popping it
    #[inline]
    pub fn recv_peek(&mut self, packet: &mut Packet) -> bool {
        self.ring.recv_peek(packet)
    }

    /// Pop the oldest packet, retrying until one arrives
    ///
    /// Yields the scheduling quantum between attempts, or sleeps out the
    /// configured minimum inter-message period when a rate limit is set.
    /// Unwinds with [`LinkError::Interrupted`] if the installed interrupt
    /// check fires.
    pub fn recv_blocking(&mut self, packet: &mut Packet) -> LinkResult<()> {
        loop {
            if let Some(limiter) = &mut self.limiter {
                limiter.pace();
            }
            if self.ring.recv(packet) {
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
