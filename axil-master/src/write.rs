//! Write transaction sequencer.
//!
//! ```text
//!   Idle ──start edge──▶ AddrData ──aw done ∧ w done──▶ Resp ──b done──▶ Idle
//! ```
//!
//! `aw` and `w` are independent channels: they are started together and may complete in either order
//! or on the same cycle. The response channel is only started once both have completed.

use crate::channel::{ChannelOutput, Sink, Source};
use crate::config::{Config, Width};
use crate::payload::{Addr, WReq, WRes};

/// State of the write sequencer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// Waiting for a start edge.
    #[default]
    Idle,
    /// Address and data channels in flight.
    AddrData,
    /// Waiting for the write response.
    Resp,
}

/// Request fields sampled by the write sequencer every cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteRequest {
    /// Start line; a rising edge starts a transaction.
    pub start: bool,

    /// Target address.
    pub addr: u64,

    /// Write data.
    pub data: u64,
}

/// Start commands issued to the write channels for one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteCommand {
    /// Start for `aw`, with the address to drive.
    pub aw: Option<Addr>,

    /// Start for `w`, with the data to drive.
    pub w: Option<WReq>,

    /// Start for `b`.
    pub b: Option<()>,
}

/// Registers of the write sequencer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteRegs {
    state: WriteState,
    start_prev: bool,
    addr: u64,
    data: u64,
    aw_done: bool,
    w_done: bool,
    done: bool,
    resp: u64,
}

/// Write transaction sequencer.
#[derive(Debug, Clone)]
pub struct WriteSequencer {
    config: Config,
    regs: WriteRegs,
}

impl WriteSequencer {
    /// Creates a new sequencer in its reset state.
    pub fn new(config: Config) -> Self { Self { config, regs: WriteRegs::default() } }

    /// Current state.
    pub fn state(&self) -> WriteState { self.regs.state }

    /// Returns whether no write is in flight.
    pub fn is_idle(&self) -> bool { self.regs.state == WriteState::Idle }

    /// Completion pulse of the previous cycle's response handshake.
    pub fn done(&self) -> bool { self.regs.done }

    /// Response code of the last completed write.
    pub fn resp(&self) -> u64 { self.regs.resp }

    /// Address latched for the current (or last) write.
    pub fn addr(&self) -> u64 { self.regs.addr }

    /// Data latched for the current (or last) write.
    pub fn data(&self) -> u64 { self.regs.data }

    fn data_beat(&self, data: u64) -> WReq { WReq { data, strb: self.config.all_strobes() } }

    /// Start commands for this cycle and the next registers.
    pub fn eval(
        &self, req: &WriteRequest, aw: &ChannelOutput<Addr, Source>, w: &ChannelOutput<WReq, Source>,
        b: &ChannelOutput<WRes, Sink>,
    ) -> (WriteCommand, WriteRegs) {
        let regs = &self.regs;
        let edge = req.start && !regs.start_prev;
        let mut next = WriteRegs { start_prev: req.start, done: false, ..regs.clone() };
        let mut command = WriteCommand::default();

        match regs.state {
            WriteState::Idle if edge && !regs.done => {
                next.addr = self.config.truncate(Width::Addr, req.addr);
                next.data = self.config.truncate(Width::Data, req.data);
                next.aw_done = false;
                next.w_done = false;
                next.state = WriteState::AddrData;
                command.aw = Some(Addr::new(next.addr));
                command.w = Some(self.data_beat(next.data));
            }
            WriteState::Idle => {
                if edge {
                    log::warn!("[write] start ignored: completion of the previous write is being reported");
                }
            }
            WriteState::AddrData => {
                if edge {
                    log::warn!("[write] start ignored: write to {:#x} in flight", regs.addr);
                }
                next.aw_done = regs.aw_done || aw.done();
                next.w_done = regs.w_done || w.done();
                if !regs.aw_done {
                    command.aw = Some(Addr::new(regs.addr));
                }
                if !regs.w_done {
                    command.w = Some(self.data_beat(regs.data));
                }
                if next.aw_done && next.w_done {
                    next.state = WriteState::Resp;
                    command.b = Some(());
                }
            }
            WriteState::Resp => {
                if edge {
                    log::warn!("[write] start ignored: write to {:#x} in flight", regs.addr);
                }
                command.b = Some(());
                if let Some(res) = &b.transfer {
                    next.state = WriteState::Idle;
                    next.done = true;
                    next.resp = res.resp;
                }
            }
        }

        (command, next)
    }

    /// Commits the next registers.
    pub fn commit(&mut self, next: WriteRegs) {
        if next.state != self.regs.state {
            log::debug!("[write] {:?} -> {:?} (addr {:#x})", self.regs.state, next.state, next.addr);
        }
        if next.done {
            log::debug!("[write] done: addr {:#x}, resp {:#b}", next.addr, next.resp);
        }
        self.regs = next;
    }

    /// Synchronous clear.
    pub fn reset(&mut self) { self.regs = WriteRegs::default(); }
}
