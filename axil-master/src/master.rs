//! Master interface: two sequencers wired to five channel engines.

use std::fmt;

use arrayvec::ArrayVec;
use static_assertions::assert_impl_all;

use crate::channel::{Channel, ChannelState, Phase, Sink, Source};
use crate::config::Config;
use crate::payload::{Addr, RRes, WReq, WRes};
use crate::read::{ReadRegs, ReadRequest, ReadSequencer, ReadState};
use crate::signal::{PortDecl, Ready, Signal, Valid};
use crate::write::{WriteRegs, WriteRequest, WriteSequencer, WriteState};

/// Address channel engine (`aw`, `ar`).
pub type AddrChannel = Channel<Addr, Source>;

/// Write data channel engine (`w`).
pub type WDataChannel = Channel<WReq, Source>;

/// Write response channel engine (`b`).
pub type WRespChannel = Channel<WRes, Sink>;

/// Read data channel engine (`r`).
pub type RDataChannel = Channel<RRes, Sink>;

/// Number of bus channels.
pub const CHANNEL_COUNT: usize = 5;

/// Bus channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelId {
    /// Write address.
    Aw,
    /// Write data.
    W,
    /// Write response.
    B,
    /// Read address.
    Ar,
    /// Read data.
    R,
}

impl ChannelId {
    /// Every channel, in port order.
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [ChannelId::Aw, ChannelId::W, ChannelId::B, ChannelId::Ar, ChannelId::R];

    /// Channel name as it appears in port names.
    pub fn name(self) -> &'static str {
        match self {
            ChannelId::Aw => "aw",
            ChannelId::W => "w",
            ChannelId::B => "b",
            ChannelId::Ar => "ar",
            ChannelId::R => "r",
        }
    }

    /// Returns whether the master drives `valid` on this channel.
    pub fn is_source(self) -> bool { matches!(self, ChannelId::Aw | ChannelId::W | ChannelId::Ar) }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Set of channels, e.g. those started or completing on one tick.
pub type ChannelSet = ArrayVec<ChannelId, CHANNEL_COUNT>;

/// Request fields, sampled every tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Write start line; a rising edge starts a write.
    pub write_start: bool,

    /// Read start line; a rising edge starts a read.
    pub read_start: bool,

    /// Target address, shared by both start lines.
    pub addr: u64,

    /// Write data.
    pub write_data: u64,
}

impl Request {
    /// Raises the write start line.
    pub fn write(addr: u64, data: u64) -> Self { Self { write_start: true, addr, write_data: data, ..Self::default() } }

    /// Raises the read start line.
    pub fn read(addr: u64) -> Self { Self { read_start: true, addr, ..Self::default() } }
}

/// Result fields, visible every tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// One-tick write completion pulse.
    pub write_done: bool,

    /// Write response code, valid with `write_done`.
    pub write_resp: u64,

    /// One-tick read completion pulse.
    pub read_done: bool,

    /// Read data, valid with `read_done`.
    pub read_data: u64,

    /// Read response code, valid with `read_done`.
    pub read_resp: u64,

    /// Both pipelines are idle.
    pub idle: bool,
}

/// Master-driven half of the bus.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BusOut {
    /// m_axil_aw{addr,prot,valid}
    pub aw: Valid<Addr>,
    /// m_axil_w{data,strb,valid}
    pub w: Valid<WReq>,
    /// m_axil_bready
    pub b: Ready,
    /// m_axil_ar{addr,prot,valid}
    pub ar: Valid<Addr>,
    /// m_axil_rready
    pub r: Ready,
}

/// Responder-driven half of the bus.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BusIn {
    /// m_axil_awready
    pub aw: Ready,
    /// m_axil_wready
    pub w: Ready,
    /// m_axil_b{resp,valid}
    pub b: Valid<WRes>,
    /// m_axil_arready
    pub ar: Ready,
    /// m_axil_r{data,resp,valid}
    pub r: Valid<RRes>,
}

/// Port direction, seen from the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Driven by the responder.
    Input,
    /// Driven by the master.
    Output,
}

/// Bus-side port of the master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Direction.
    pub dir: Direction,

    /// Name and width.
    pub decl: PortDecl,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.dir {
            Direction::Input => "input ",
            Direction::Output => "output",
        };
        write!(f, "{dir} {}", self.decl)
    }
}

/// Everything computed for one tick, before commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Channels whose `start` is asserted this tick.
    pub starts: ChannelSet,

    /// Channels whose handshake completes this tick.
    pub dones: ChannelSet,

    write: WriteRegs,
    read: ReadRegs,
    aw: ChannelState<Addr>,
    w: ChannelState<WReq>,
    b: ChannelState<WRes>,
    ar: ChannelState<Addr>,
    r: ChannelState<RRes>,
}

/// AXI-Lite master interface.
#[derive(Debug, Clone)]
pub struct MasterInterface {
    config: Config,
    write: WriteSequencer,
    read: ReadSequencer,
    aw: AddrChannel,
    w: WDataChannel,
    b: WRespChannel,
    ar: AddrChannel,
    r: RDataChannel,
}

assert_impl_all!(MasterInterface: Send, Sync, Clone);

impl MasterInterface {
    /// Creates a new master in its reset state.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            write: WriteSequencer::new(config),
            read: ReadSequencer::new(config),
            aw: Channel::new(ChannelId::Aw.name(), config),
            w: Channel::new(ChannelId::W.name(), config),
            b: Channel::new(ChannelId::B.name(), config),
            ar: Channel::new(ChannelId::Ar.name(), config),
            r: Channel::new(ChannelId::R.name(), config),
        }
    }

    /// Bus configuration.
    pub fn config(&self) -> &Config { &self.config }

    /// Write sequencer.
    pub fn write_sequencer(&self) -> &WriteSequencer { &self.write }

    /// Read sequencer.
    pub fn read_sequencer(&self) -> &ReadSequencer { &self.read }

    /// Write sequencer state.
    pub fn write_state(&self) -> WriteState { self.write.state() }

    /// Read sequencer state.
    pub fn read_state(&self) -> ReadState { self.read.state() }

    /// Returns whether both pipelines are idle.
    pub fn is_idle(&self) -> bool { self.write.is_idle() && self.read.is_idle() }

    /// Phase of a channel engine.
    pub fn channel_phase(&self, id: ChannelId) -> Phase {
        match id {
            ChannelId::Aw => self.aw.phase(),
            ChannelId::W => self.w.phase(),
            ChannelId::B => self.b.phase(),
            ChannelId::Ar => self.ar.phase(),
            ChannelId::R => self.r.phase(),
        }
    }

    /// Channels whose engine is active.
    pub fn active_channels(&self) -> ChannelSet {
        ChannelId::ALL.into_iter().filter(|id| self.channel_phase(*id) == Phase::Active).collect()
    }

    /// Master-driven half of the bus for this tick.
    pub fn bus(&self) -> BusOut {
        BusOut { aw: self.aw.drive(), w: self.w.drive(), b: self.b.drive(), ar: self.ar.drive(), r: self.r.drive() }
    }

    /// Result fields for this tick.
    pub fn response(&self) -> Response {
        Response {
            write_done: self.write.done(),
            write_resp: self.write.resp(),
            read_done: self.read.done(),
            read_data: self.read.data(),
            read_resp: self.read.resp(),
            idle: self.is_idle(),
        }
    }

    /// Computes this tick from the current registers without changing them.
    pub fn eval(&self, req: &Request, bus: &BusIn) -> Step {
        let aw = self.aw.output(&bus.aw);
        let w = self.w.output(&bus.w);
        let b = self.b.output(&bus.b);
        let ar = self.ar.output(&bus.ar);
        let r = self.r.output(&bus.r);

        let write_req = WriteRequest { start: req.write_start, addr: req.addr, data: req.write_data };
        let read_req = ReadRequest { start: req.read_start, addr: req.addr };
        let (write_cmd, write) = self.write.eval(&write_req, &aw, &w, &b);
        let (read_cmd, read) = self.read.eval(&read_req, &ar, &r);

        let starts = [
            (ChannelId::Aw, write_cmd.aw.is_some()),
            (ChannelId::W, write_cmd.w.is_some()),
            (ChannelId::B, write_cmd.b.is_some()),
            (ChannelId::Ar, read_cmd.ar.is_some()),
            (ChannelId::R, read_cmd.r.is_some()),
        ];
        let dones = [
            (ChannelId::Aw, aw.done()),
            (ChannelId::W, w.done()),
            (ChannelId::B, b.done()),
            (ChannelId::Ar, ar.done()),
            (ChannelId::R, r.done()),
        ];

        Step {
            starts: starts.into_iter().filter_map(|(id, on)| on.then_some(id)).collect(),
            dones: dones.into_iter().filter_map(|(id, on)| on.then_some(id)).collect(),
            write,
            read,
            aw: self.aw.next(write_cmd.aw, &bus.aw),
            w: self.w.next(write_cmd.w, &bus.w),
            b: self.b.next(write_cmd.b, &bus.b),
            ar: self.ar.next(read_cmd.ar, &bus.ar),
            r: self.r.next(read_cmd.r, &bus.r),
        }
    }

    /// Commits a tick computed by [`MasterInterface::eval`].
    pub fn commit(&mut self, step: Step) {
        self.write.commit(step.write);
        self.read.commit(step.read);
        self.aw.commit(step.aw);
        self.w.commit(step.w);
        self.b.commit(step.b);
        self.ar.commit(step.ar);
        self.r.commit(step.r);
    }

    /// Advances one tick.
    pub fn tick(&mut self, req: &Request, bus: &BusIn) {
        let step = self.eval(req, bus);
        self.commit(step);
    }

    /// Synchronous clear of every sequencer and channel engine.
    pub fn reset(&mut self) {
        self.write.reset();
        self.read.reset();
        self.aw.reset();
        self.w.reset();
        self.b.reset();
        self.ar.reset();
        self.r.reset();
    }

    /// Bus-side ports, named `m_axil_<channel><member>`.
    pub fn ports(&self) -> Vec<Port> {
        ChannelId::ALL
            .into_iter()
            .flat_map(|id| {
                let members = match id {
                    ChannelId::Aw | ChannelId::Ar => Addr::port_decls(&self.config),
                    ChannelId::W => WReq::port_decls(&self.config),
                    ChannelId::B => WRes::port_decls(&self.config),
                    ChannelId::R => RRes::port_decls(&self.config),
                };
                let (fwd, bwd) =
                    if id.is_source() { (Direction::Output, Direction::Input) } else { (Direction::Input, Direction::Output) };
                let prefix = format!("m_axil_{id}");

                members
                    .into_iter()
                    .chain([PortDecl::new("valid", 1)])
                    .map(move |decl| (fwd, decl))
                    .chain([(bwd, PortDecl::new("ready", 1))])
                    .map(move |(dir, decl)| Port { dir, decl: decl.prefixed(&prefix) })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
