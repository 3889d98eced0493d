//! Simulation driver.
//!
//! Runs a [`MasterInterface`] against a [`Responder`] on one clock, checking every tick of bus traffic
//! with a [`ProtocolChecker`]. Each tick follows the same order: the master's registered outputs are
//! shown to the responder, the responder's lines are shown to the master, both compute their next
//! state, and both commit.

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::checker::{ProtocolChecker, ProtocolError};
use crate::config::Config;
use crate::master::{BusIn, BusOut, ChannelSet, MasterInterface, Request, Response};
use crate::read::ReadState;
use crate::responder::{Delays, Responder};
use crate::write::WriteState;

/// Simulation error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// The named pipeline already has a transaction in flight.
    #[error("{0} pipeline is busy")]
    Busy(&'static str),

    /// The transaction did not complete within the given number of ticks.
    #[error("no completion within {0} ticks")]
    Timeout(u64),

    /// The bus broke the valid/ready rules.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Everything observed on one tick, before commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Tick number, starting at 0.
    pub tick: u64,

    /// Request fields applied.
    pub request: Request,

    /// Master-driven lines.
    pub bus_out: BusOut,

    /// Responder-driven lines.
    pub bus_in: BusIn,

    /// Result fields.
    pub response: Response,

    /// Channels started.
    pub starts: ChannelSet,

    /// Channels completing.
    pub dones: ChannelSet,

    /// Write sequencer state.
    pub write_state: WriteState,

    /// Read sequencer state.
    pub read_state: ReadState,
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_state = format!("{:?}", self.write_state);
        let read_state = format!("{:?}", self.read_state);
        write!(
            f,
            "{:>6} | write {write_state:<8} read {read_state:<4} | start [{}] done [{}]",
            self.tick,
            self.starts.iter().join(" "),
            self.dones.iter().join(" ")
        )?;
        if self.response.write_done {
            write!(f, " | write_done resp={:#b}", self.response.write_resp)?;
        }
        if self.response.read_done {
            write!(f, " | read_done data={:#x} resp={:#b}", self.response.read_data, self.response.read_resp)?;
        }
        Ok(())
    }
}

/// Master and responder on one clock.
#[derive(Debug, Clone)]
pub struct Simulation {
    master: MasterInterface,
    responder: Responder,
    checker: ProtocolChecker,
    tick: u64,
    last: Request,
}

impl Simulation {
    /// Creates a new simulation from reset.
    pub fn new(config: Config, delays: Delays) -> Self { Self::with_responder(Responder::new(config, delays)) }

    /// Creates a new simulation around a prepared responder.
    pub fn with_responder(responder: Responder) -> Self {
        let config = *responder.config();
        Self {
            master: MasterInterface::new(config),
            responder,
            checker: ProtocolChecker::new(),
            tick: 0,
            last: Request::default(),
        }
    }

    /// Number of ticks run.
    pub fn tick(&self) -> u64 { self.tick }

    /// The master.
    pub fn master(&self) -> &MasterInterface { &self.master }

    /// The responder.
    pub fn responder(&self) -> &Responder { &self.responder }

    /// The responder, e.g. to change its delays between transactions.
    pub fn responder_mut(&mut self) -> &mut Responder { &mut self.responder }

    /// The protocol checker.
    pub fn checker(&self) -> &ProtocolChecker { &self.checker }

    /// Result fields visible on the coming tick.
    pub fn response(&self) -> Response { self.master.response() }

    /// Runs one tick with the given request fields.
    pub fn step(&mut self, req: &Request) -> Result<Trace, SimError> {
        let bus_out = self.master.bus();
        let bus_in = self.responder.drive(&bus_out);
        let response = self.master.response();
        let step = self.master.eval(req, &bus_in);
        self.checker.observe(self.tick, &bus_out, &bus_in, &step.dones)?;

        if response.write_done {
            log::info!("[sim] tick {}: write done, resp {:#b}", self.tick, response.write_resp);
        }
        if response.read_done {
            log::info!("[sim] tick {}: read done, data {:#x}, resp {:#b}", self.tick, response.read_data, response.read_resp);
        }

        let trace = Trace {
            tick: self.tick,
            request: *req,
            bus_out,
            bus_in,
            response,
            starts: step.starts.clone(),
            dones: step.dones.clone(),
            write_state: self.master.write_state(),
            read_state: self.master.read_state(),
        };

        self.master.commit(step);
        self.responder.tick(&trace.bus_out);
        self.tick += 1;
        self.last = *req;
        Ok(trace)
    }

    /// Runs `ticks` ticks with the given request fields held.
    pub fn run(&mut self, req: &Request, ticks: u64) -> Result<Vec<Trace>, SimError> {
        (0..ticks).map(|_| self.step(req)).collect()
    }

    /// Runs idle ticks until `done` holds, for at most `limit` ticks.
    fn wait(&mut self, limit: u64, done: impl Fn(&Response) -> bool) -> Result<Response, SimError> {
        let start = self.tick;
        loop {
            let response = self.master.response();
            if done(&response) {
                return Ok(response);
            }
            if self.tick - start >= limit {
                return Err(SimError::Timeout(limit));
            }
            self.step(&Request::default())?;
        }
    }

    /// Performs one write and returns its response code.
    ///
    /// Returns [`SimError::Busy`] if a write is in flight and [`SimError::Timeout`] if it does not
    /// complete within `limit` ticks of its start.
    pub fn write(&mut self, addr: u64, data: u64, limit: u64) -> Result<u64, SimError> {
        if !self.master.write_sequencer().is_idle() {
            return Err(SimError::Busy("write"));
        }
        // a start edge needs a low line before it, and is refused while a done pulse is shown
        if self.last.write_start || self.master.response().write_done {
            self.step(&Request::default())?;
        }

        self.step(&Request::write(addr, data))?;
        let response = self.wait(limit, |response| response.write_done)?;
        Ok(response.write_resp)
    }

    /// Performs one read and returns its data and response code.
    ///
    /// Errors as [`Simulation::write`].
    pub fn read(&mut self, addr: u64, limit: u64) -> Result<(u64, u64), SimError> {
        if !self.master.read_sequencer().is_idle() {
            return Err(SimError::Busy("read"));
        }
        if self.last.read_start || self.master.response().read_done {
            self.step(&Request::default())?;
        }

        self.step(&Request::read(addr))?;
        let response = self.wait(limit, |response| response.read_done)?;
        Ok((response.read_data, response.read_resp))
    }

    /// Runs idle ticks until both pipelines are idle, returning the number of ticks run.
    pub fn run_until_idle(&mut self, limit: u64) -> Result<u64, SimError> {
        let start = self.tick;
        self.wait(limit, |response| response.idle)?;
        Ok(self.tick - start)
    }

    /// Synchronous clear of the master, the responder and the checker. Responder memory is kept.
    pub fn reset(&mut self) {
        log::debug!("[sim] tick {}: reset", self.tick);
        self.master.reset();
        self.responder.reset();
        self.checker.reset();
        self.last = Request::default();
    }
}
