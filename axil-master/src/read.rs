//! Read transaction sequencer.
//!
//! ```text
//!   Idle ──start edge──▶ Addr ──ar done──▶ Data ──r done──▶ Idle
//! ```

use crate::channel::{ChannelOutput, Sink, Source};
use crate::config::{Config, Width};
use crate::payload::{Addr, RRes};

/// State of the read sequencer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Waiting for a start edge.
    #[default]
    Idle,
    /// Address channel in flight.
    Addr,
    /// Waiting for the read data.
    Data,
}

/// Request fields sampled by the read sequencer every cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    /// Start line; a rising edge starts a transaction.
    pub start: bool,

    /// Target address.
    pub addr: u64,
}

/// Start commands issued to the read channels for one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadCommand {
    /// Start for `ar`, with the address to drive.
    pub ar: Option<Addr>,

    /// Start for `r`.
    pub r: Option<()>,
}

/// Registers of the read sequencer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadRegs {
    state: ReadState,
    start_prev: bool,
    addr: u64,
    done: bool,
    data: u64,
    resp: u64,
}

/// Read transaction sequencer.
#[derive(Debug, Clone)]
pub struct ReadSequencer {
    config: Config,
    regs: ReadRegs,
}

impl ReadSequencer {
    /// Creates a new sequencer in its reset state.
    pub fn new(config: Config) -> Self { Self { config, regs: ReadRegs::default() } }

    /// Current state.
    pub fn state(&self) -> ReadState { self.regs.state }

    /// Returns whether no read is in flight.
    pub fn is_idle(&self) -> bool { self.regs.state == ReadState::Idle }

    /// Completion pulse of the previous cycle's data handshake.
    pub fn done(&self) -> bool { self.regs.done }

    /// Data of the last completed read.
    pub fn data(&self) -> u64 { self.regs.data }

    /// Response code of the last completed read.
    pub fn resp(&self) -> u64 { self.regs.resp }

    /// Address latched for the current (or last) read.
    pub fn addr(&self) -> u64 { self.regs.addr }

    /// Start commands for this cycle and the next registers.
    pub fn eval(
        &self, req: &ReadRequest, ar: &ChannelOutput<Addr, Source>, r: &ChannelOutput<RRes, Sink>,
    ) -> (ReadCommand, ReadRegs) {
        let regs = &self.regs;
        let edge = req.start && !regs.start_prev;
        let mut next = ReadRegs { start_prev: req.start, done: false, ..regs.clone() };
        let mut command = ReadCommand::default();

        match regs.state {
            ReadState::Idle if edge && !regs.done => {
                next.addr = self.config.truncate(Width::Addr, req.addr);
                next.state = ReadState::Addr;
                command.ar = Some(Addr::new(next.addr));
            }
            ReadState::Idle => {
                if edge {
                    log::warn!("[read] start ignored: completion of the previous read is being reported");
                }
            }
            ReadState::Addr => {
                if edge {
                    log::warn!("[read] start ignored: read from {:#x} in flight", regs.addr);
                }
                command.ar = Some(Addr::new(regs.addr));
                if ar.done() {
                    next.state = ReadState::Data;
                    command.r = Some(());
                }
            }
            ReadState::Data => {
                if edge {
                    log::warn!("[read] start ignored: read from {:#x} in flight", regs.addr);
                }
                command.r = Some(());
                if let Some(res) = &r.transfer {
                    next.state = ReadState::Idle;
                    next.done = true;
                    next.data = res.data;
                    next.resp = res.resp;
                }
            }
        }

        (command, next)
    }

    /// Commits the next registers.
    pub fn commit(&mut self, next: ReadRegs) {
        if next.state != self.regs.state {
            log::debug!("[read] {:?} -> {:?} (addr {:#x})", self.regs.state, next.state, next.addr);
        }
        if next.done {
            log::debug!("[read] done: addr {:#x}, data {:#x}, resp {:#b}", next.addr, next.data, next.resp);
        }
        self.regs = next;
    }

    /// Synchronous clear.
    pub fn reset(&mut self) { self.regs = ReadRegs::default(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::payload::resp;
    use crate::signal::{Ready, Valid};

    struct Harness {
        seq: ReadSequencer,
        ar: Channel<Addr, Source>,
        r: Channel<RRes, Sink>,
    }

    impl Harness {
        fn new() -> Self {
            let config = Config::default();
            Self { seq: ReadSequencer::new(config), ar: Channel::new("ar", config), r: Channel::new("r", config) }
        }

        fn tick(&mut self, req: &ReadRequest, ar: bool, r: Option<RRes>) -> ReadCommand {
            let ar_peer = Ready::new(ar);
            let r_peer = r.map_or_else(Valid::invalid, Valid::valid);

            let (command, next) = self.seq.eval(req, &self.ar.output(&ar_peer), &self.r.output(&r_peer));
            let ar_next = self.ar.next(command.ar, &ar_peer);
            let r_next = self.r.next(command.r, &r_peer);

            self.seq.commit(next);
            self.ar.commit(ar_next);
            self.r.commit(r_next);
            command
        }
    }

    fn start(addr: u64) -> ReadRequest { ReadRequest { start: true, addr } }

    #[test]
    fn data_requested_only_after_address() {
        let mut h = Harness::new();
        let beat = RRes { data: 0x1234, resp: resp::OKAY };

        let command = h.tick(&start(0x44), false, Some(beat));
        assert_eq!(command.ar, Some(Addr::new(0x44)));
        assert_eq!(command.r, None);

        for _ in 0..3 {
            assert_eq!(h.tick(&ReadRequest::default(), false, Some(beat)).r, None);
            assert_eq!(h.seq.state(), ReadState::Addr);
            assert!(!h.r.drive().ready);
        }

        assert_eq!(h.tick(&ReadRequest::default(), true, Some(beat)).r, Some(()));
        assert_eq!(h.seq.state(), ReadState::Data);
        assert!(h.ar.is_idle());
    }

    #[test]
    fn captures_data_and_response() {
        let mut h = Harness::new();
        h.tick(&start(0x44), false, None);
        h.tick(&ReadRequest::default(), true, None);
        h.tick(&ReadRequest::default(), false, None);
        assert!(!h.seq.done());

        h.tick(&ReadRequest::default(), false, Some(RRes { data: 0xbeef, resp: resp::DECERR }));
        assert!(h.seq.done());
        assert!(h.seq.is_idle());
        assert_eq!(h.seq.data(), 0xbeef);
        assert_eq!(h.seq.resp(), resp::DECERR);

        h.tick(&ReadRequest::default(), false, None);
        assert!(!h.seq.done());
    }

    #[test]
    fn start_on_completion_pulse_is_ignored() {
        let mut h = Harness::new();
        let beat = RRes { data: 1, resp: resp::OKAY };
        h.tick(&start(0x4), false, None);
        h.tick(&ReadRequest::default(), true, None);
        h.tick(&ReadRequest::default(), false, Some(beat));
        assert!(h.seq.done());

        assert_eq!(h.tick(&start(0x8), false, None).ar, None);
        assert!(h.seq.is_idle());

        h.tick(&ReadRequest::default(), false, None);
        assert_eq!(h.tick(&start(0x8), false, None).ar, Some(Addr::new(0x8)));
        assert_eq!(h.seq.state(), ReadState::Addr);
    }
}
