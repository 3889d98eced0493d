//! Memory-backed AXI-Lite responder model.
//!
//! The responder sits on the other side of the bus from [`MasterInterface`](crate::MasterInterface).
//! Its `ready` lines rise a configurable number of ticks after the master's `valid`, and its `valid`
//! lines rise a configurable number of ticks after the request they answer was accepted. It answers
//! one write and one read at a time.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, Width};
use crate::master::{BusIn, BusOut};
use crate::payload::{resp, Addr, RRes, WReq, WRes};
use crate::signal::{transfers, Ready, Valid};

/// How long the responder holds back one of its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Exactly this many ticks.
    Fixed(u32),
    /// Drawn uniformly from `0..=max` for every transfer.
    Random {
        /// Longest delay.
        max: u32,
    },
    /// Forever: the channel never completes.
    Never,
}

impl Default for Delay {
    fn default() -> Self { Delay::Fixed(0) }
}

impl Delay {
    fn draw(self, rng: &mut StdRng) -> Option<u32> {
        match self {
            Delay::Fixed(ticks) => Some(ticks),
            Delay::Random { max } => Some(rng.gen_range(0..=max)),
            Delay::Never => None,
        }
    }
}

/// Delay of every responder-driven line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// `awready` after `awvalid`.
    pub aw: Delay,
    /// `wready` after `wvalid`.
    pub w: Delay,
    /// `bvalid` after both `aw` and `w` were accepted.
    pub b: Delay,
    /// `arready` after `arvalid`.
    pub ar: Delay,
    /// `rvalid` after `ar` was accepted.
    pub r: Delay,
}

impl Delays {
    /// The same delay on every channel.
    pub fn uniform(delay: Delay) -> Self { Self { aw: delay, w: delay, b: delay, ar: delay, r: delay } }
}

/// Ready line rising `target` ticks after `valid` is first seen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Acceptor {
    waited: u32,
    target: Option<u32>,
}

impl Acceptor {
    fn armed(delay: Delay, rng: &mut StdRng) -> Self { Self { waited: 0, target: delay.draw(rng) } }

    fn ready(&self, valid: bool) -> bool { valid && self.target.map_or(false, |target| self.waited >= target) }

    fn next(&self, valid: bool, ready: bool, delay: Delay, rng: &mut StdRng) -> Self {
        if valid && ready {
            Self::armed(delay, rng)
        } else if valid {
            Self { waited: self.waited.saturating_add(1), ..*self }
        } else {
            *self
        }
    }
}

/// Response waiting to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending<P> {
    payload: P,
    remaining: Option<u32>,
}

impl<P: Copy> Pending<P> {
    fn is_due(&self) -> bool { self.remaining == Some(0) }

    fn drive(&self) -> Valid<P> { Valid::new(self.is_due(), self.payload) }

    fn countdown(&self) -> Self { Self { remaining: self.remaining.map(|ticks| ticks.saturating_sub(1)), ..*self } }
}

/// Memory-backed AXI-Lite responder.
#[derive(Debug, Clone)]
pub struct Responder {
    config: Config,
    delays: Delays,
    rng: StdRng,
    memory: HashMap<u64, u64>,
    faults: HashSet<u64>,
    limit: Option<u64>,
    aw: Acceptor,
    w: Acceptor,
    ar: Acceptor,
    aw_req: Option<Addr>,
    w_req: Option<WReq>,
    b: Option<Pending<WRes>>,
    r: Option<Pending<RRes>>,
    writes: u64,
    reads: u64,
}

impl Responder {
    /// Creates a new responder with empty memory.
    pub fn new(config: Config, delays: Delays) -> Self { Self::with_seed(config, delays, 0) }

    /// Creates a new responder drawing random delays from `seed`.
    pub fn with_seed(config: Config, delays: Delays, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            config,
            delays,
            aw: Acceptor::armed(delays.aw, &mut rng),
            w: Acceptor::armed(delays.w, &mut rng),
            ar: Acceptor::armed(delays.ar, &mut rng),
            rng,
            memory: HashMap::new(),
            faults: HashSet::new(),
            limit: None,
            aw_req: None,
            w_req: None,
            b: None,
            r: None,
            writes: 0,
            reads: 0,
        }
    }

    /// Bus configuration.
    pub fn config(&self) -> &Config { &self.config }

    /// Current delays.
    pub fn delays(&self) -> Delays { self.delays }

    /// Replaces the delays. Channels already waiting keep their current target.
    pub fn set_delays(&mut self, delays: Delays) {
        self.delays = delays;
        for (acceptor, delay) in [(&mut self.aw, delays.aw), (&mut self.w, delays.w), (&mut self.ar, delays.ar)] {
            if acceptor.waited == 0 {
                *acceptor = Acceptor::armed(delay, &mut self.rng);
            }
        }
    }

    /// Answers accesses to the word containing `addr` with SLVERR.
    pub fn fail_at(&mut self, addr: u64) {
        let word = self.word(addr);
        self.faults.insert(word);
    }

    /// Answers accesses at or above `bytes` with DECERR.
    pub fn set_limit(&mut self, bytes: u64) { self.limit = Some(bytes); }

    /// Word containing `addr`.
    pub fn peek(&self, addr: u64) -> u64 { self.memory.get(&self.word(addr)).copied().unwrap_or(0) }

    /// Overwrites the word containing `addr`.
    pub fn poke(&mut self, addr: u64, data: u64) {
        let (word, data) = (self.word(addr), self.config.truncate(Width::Data, data));
        self.memory.insert(word, data);
    }

    /// Number of writes answered.
    pub fn writes(&self) -> u64 { self.writes }

    /// Number of reads answered.
    pub fn reads(&self) -> u64 { self.reads }

    fn word(&self, addr: u64) -> u64 { addr / self.config.strb_width() as u64 }

    fn check(&self, addr: u64) -> u64 {
        if self.limit.map_or(false, |limit| addr >= limit) {
            resp::DECERR
        } else if self.faults.contains(&self.word(addr)) {
            resp::SLVERR
        } else {
            resp::OKAY
        }
    }

    fn store(&mut self, addr: &Addr, req: &WReq) -> WRes {
        self.writes += 1;
        let code = self.check(addr.addr);
        if code != resp::OKAY {
            return WRes { resp: code };
        }

        let current = self.peek(addr.addr);
        let lanes = (0..self.config.strb_width()).filter(|&lane| req.strb & (1_u64 << lane) != 0);
        let merged = lanes.fold(current, |word, lane| {
            let byte = 0xff_u64 << (lane * 8);
            (word & !byte) | (req.data & byte)
        });
        let word = self.word(addr.addr);
        self.memory.insert(word, merged);
        WRes { resp: resp::OKAY }
    }

    fn load(&mut self, addr: &Addr) -> RRes {
        self.reads += 1;
        match self.check(addr.addr) {
            resp::OKAY => RRes { data: self.peek(addr.addr), resp: resp::OKAY },
            code => RRes { data: 0, resp: code },
        }
    }

    /// Responder-driven half of the bus for this tick.
    pub fn drive(&self, bus: &BusOut) -> BusIn {
        let write_free = self.b.is_none();
        BusIn {
            aw: Ready::new(write_free && self.aw_req.is_none() && self.aw.ready(bus.aw.valid)),
            w: Ready::new(write_free && self.w_req.is_none() && self.w.ready(bus.w.valid)),
            b: self.b.as_ref().map_or_else(Valid::invalid, Pending::drive),
            ar: Ready::new(self.r.is_none() && self.ar.ready(bus.ar.valid)),
            r: self.r.as_ref().map_or_else(Valid::invalid, Pending::drive),
        }
    }

    /// Advances one tick, given the master-driven half of the bus.
    pub fn tick(&mut self, bus: &BusOut) {
        let lines = self.drive(bus);

        self.aw = self.aw.next(bus.aw.valid, lines.aw.ready, self.delays.aw, &mut self.rng);
        self.w = self.w.next(bus.w.valid, lines.w.ready, self.delays.w, &mut self.rng);
        self.ar = self.ar.next(bus.ar.valid, lines.ar.ready, self.delays.ar, &mut self.rng);

        if transfers(&bus.aw, &lines.aw) {
            self.aw_req = Some(bus.aw.inner);
        }
        if transfers(&bus.w, &lines.w) {
            self.w_req = Some(bus.w.inner);
        }

        self.b = match self.b {
            Some(_) if transfers(&lines.b, &bus.b) => None,
            b => b.map(|pending| pending.countdown()),
        };
        if self.b.is_none() {
            if let (Some(addr), Some(req)) = (self.aw_req, self.w_req) {
                let payload = self.store(&addr, &req);
                log::debug!("[responder] write {:#x} <- {:#x}: resp {:#b}", addr.addr, req.data, payload.resp);
                self.b = Some(Pending { payload, remaining: self.delays.b.draw(&mut self.rng) });
                self.aw_req = None;
                self.w_req = None;
            }
        }

        self.r = match self.r {
            Some(_) if transfers(&lines.r, &bus.r) => None,
            r => r.map(|pending| pending.countdown()),
        };
        if transfers(&bus.ar, &lines.ar) {
            let payload = self.load(&bus.ar.inner);
            log::debug!("[responder] read {:#x} -> {:#x}: resp {:#b}", bus.ar.inner.addr, payload.data, payload.resp);
            self.r = Some(Pending { payload, remaining: self.delays.r.draw(&mut self.rng) });
        }
    }

    /// Drops every request in progress; memory is kept.
    pub fn reset(&mut self) {
        self.aw = Acceptor::armed(self.delays.aw, &mut self.rng);
        self.w = Acceptor::armed(self.delays.w, &mut self.rng);
        self.ar = Acceptor::armed(self.delays.ar, &mut self.rng);
        self.aw_req = None;
        self.w_req = None;
        self.b = None;
        self.r = None;
    }
}
