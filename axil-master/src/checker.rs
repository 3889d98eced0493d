//! Bus protocol checker.
//!
//! Watches both halves of the bus every tick and reports the first rule broken:
//!
//! - once `valid` is raised it stays high, with the same payload, until `ready`;
//! - a channel reports done exactly on the ticks its handshake holds.

use thiserror::Error;

use crate::master::{BusIn, BusOut, ChannelId};
use crate::payload::{Addr, RRes, WReq, WRes};
use crate::signal::{transfers, Ready, Valid};

/// Protocol violation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// `valid` dropped before the handshake.
    #[error("tick {tick}: `{channel}` valid retracted before ready")]
    ValidRetracted {
        /// Tick of the violation.
        tick: u64,
        /// Offending channel.
        channel: ChannelId,
    },

    /// Payload changed while `valid` waited for `ready`.
    #[error("tick {tick}: `{channel}` payload changed while waiting for ready")]
    PayloadChanged {
        /// Tick of the violation.
        tick: u64,
        /// Offending channel.
        channel: ChannelId,
    },

    /// Done reported without a handshake.
    #[error("tick {tick}: `{channel}` reported done without a handshake")]
    SpuriousDone {
        /// Tick of the violation.
        tick: u64,
        /// Offending channel.
        channel: ChannelId,
    },

    /// Handshake without a done.
    #[error("tick {tick}: `{channel}` handshake was not reported as done")]
    MissedDone {
        /// Tick of the violation.
        tick: u64,
        /// Offending channel.
        channel: ChannelId,
    },
}

/// Stability monitor of one channel.
#[derive(Debug, Clone)]
struct Monitor<P> {
    channel: ChannelId,
    pending: Option<P>,
}

impl<P: Clone + PartialEq> Monitor<P> {
    fn new(channel: ChannelId) -> Self { Self { channel, pending: None } }

    fn observe(&mut self, tick: u64, fwd: &Valid<P>, bwd: &Ready) -> Result<bool, ProtocolError> {
        let channel = self.channel;
        if let Some(pending) = &self.pending {
            if !fwd.valid {
                return Err(ProtocolError::ValidRetracted { tick, channel });
            }
            if pending != &fwd.inner {
                return Err(ProtocolError::PayloadChanged { tick, channel });
            }
        }

        let handshake = transfers(fwd, bwd);
        self.pending = (fwd.valid && !handshake).then(|| fwd.inner.clone());
        Ok(handshake)
    }
}

/// Bus protocol checker.
#[derive(Debug, Clone)]
pub struct ProtocolChecker {
    aw: Monitor<Addr>,
    w: Monitor<WReq>,
    b: Monitor<WRes>,
    ar: Monitor<Addr>,
    r: Monitor<RRes>,
    handshakes: u64,
}

impl Default for ProtocolChecker {
    fn default() -> Self { Self::new() }
}

impl ProtocolChecker {
    /// Creates a new checker with nothing pending.
    pub fn new() -> Self {
        Self {
            aw: Monitor::new(ChannelId::Aw),
            w: Monitor::new(ChannelId::W),
            b: Monitor::new(ChannelId::B),
            ar: Monitor::new(ChannelId::Ar),
            r: Monitor::new(ChannelId::R),
            handshakes: 0,
        }
    }

    /// Number of handshakes seen.
    pub fn handshakes(&self) -> u64 { self.handshakes }

    /// Checks one tick of bus traffic against the channels reported done on that tick.
    pub fn observe(&mut self, tick: u64, out: &BusOut, inp: &BusIn, dones: &[ChannelId]) -> Result<(), ProtocolError> {
        let handshakes = [
            (ChannelId::Aw, self.aw.observe(tick, &out.aw, &inp.aw)?),
            (ChannelId::W, self.w.observe(tick, &out.w, &inp.w)?),
            (ChannelId::B, self.b.observe(tick, &inp.b, &out.b)?),
            (ChannelId::Ar, self.ar.observe(tick, &out.ar, &inp.ar)?),
            (ChannelId::R, self.r.observe(tick, &inp.r, &out.r)?),
        ];

        for (channel, handshake) in handshakes {
            match (handshake, dones.contains(&channel)) {
                (true, false) => return Err(ProtocolError::MissedDone { tick, channel }),
                (false, true) => return Err(ProtocolError::SpuriousDone { tick, channel }),
                (true, true) => self.handshakes += 1,
                (false, false) => (),
            }
        }
        Ok(())
    }

    /// Forgets every pending transfer.
    pub fn reset(&mut self) { *self = Self { handshakes: self.handshakes, ..Self::new() } }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aw(valid: bool, addr: u64) -> BusOut { BusOut { aw: Valid::new(valid, Addr::new(addr)), ..BusOut::default() } }

    #[test]
    fn accepts_a_held_request() {
        let mut checker = ProtocolChecker::new();
        for tick in 0..3 {
            checker.observe(tick, &aw(true, 0x10), &BusIn::default(), &[]).unwrap();
        }
        let ready = BusIn { aw: Ready::new(true), ..BusIn::default() };
        checker.observe(3, &aw(true, 0x10), &ready, &[ChannelId::Aw]).unwrap();
        checker.observe(4, &aw(false, 0), &BusIn::default(), &[]).unwrap();
        assert_eq!(checker.handshakes(), 1);
    }

    #[test]
    fn rejects_retraction_and_changes() {
        let mut checker = ProtocolChecker::new();
        checker.observe(0, &aw(true, 0x10), &BusIn::default(), &[]).unwrap();
        assert_eq!(
            checker.observe(1, &aw(false, 0x10), &BusIn::default(), &[]),
            Err(ProtocolError::ValidRetracted { tick: 1, channel: ChannelId::Aw })
        );

        let mut checker = ProtocolChecker::new();
        checker.observe(0, &aw(true, 0x10), &BusIn::default(), &[]).unwrap();
        assert_eq!(
            checker.observe(1, &aw(true, 0x14), &BusIn::default(), &[]),
            Err(ProtocolError::PayloadChanged { tick: 1, channel: ChannelId::Aw })
        );
    }

    #[test]
    fn done_must_match_handshake() {
        let mut checker = ProtocolChecker::new();
        let rvalid = BusIn { r: Valid::valid(RRes::default()), ..BusIn::default() };
        assert_eq!(
            checker.observe(0, &BusOut::default(), &rvalid, &[ChannelId::R]),
            Err(ProtocolError::SpuriousDone { tick: 0, channel: ChannelId::R })
        );

        let mut checker = ProtocolChecker::new();
        let rready = BusOut { r: Ready::new(true), ..BusOut::default() };
        let err = checker.observe(7, &rready, &rvalid, &[]).unwrap_err();
        assert_eq!(err, ProtocolError::MissedDone { tick: 7, channel: ChannelId::R });
        assert_eq!(err.to_string(), "tick 7: `r` handshake was not reported as done");
    }
}
