//! Valid/ready channel handshake engine.
//!
//! One engine drives one channel of the bus. It is a two-phase automaton: `start` moves it from
//! [`Phase::Idle`] to [`Phase::Active`], and the handshake moves it back. What the engine drives and
//! what it waits for depends on its [`Role`]:
//!
//! - [`Source`] latches a payload on `start`, drives it with `valid` and waits for the peer's `ready`.
//! - [`Sink`] drives `ready` on `start`, waits for the peer's `valid` and captures the peer's payload.
//!
//! Drive signals are registered, so they only depend on the phase. The done pulse is the handshake
//! itself: it is high exactly on the cycle the transfer happens.

use std::fmt;
use std::marker::PhantomData;

use crate::config::Config;
use crate::signal::{Ready, Signal, Valid};

/// Phase of a channel engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No handshake in progress.
    #[default]
    Idle,
    /// Driving `valid` (source) or `ready` (sink) until the handshake.
    Active,
}

/// Registers of a channel engine.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChannelState<P> {
    /// Phase.
    pub phase: Phase,

    /// Payload being driven (source) or last captured (sink).
    pub payload: P,
}

impl<P> ChannelState<P> {
    /// Returns whether the engine is active.
    pub fn is_active(&self) -> bool { self.phase == Phase::Active }
}

/// Side of the handshake an engine plays on a channel carrying `P`.
pub trait Role<P: Signal>: fmt::Debug + Default + Clone + Copy + PartialEq {
    /// Role name.
    const NAME: &'static str;

    /// Signals driven by the engine.
    type Drive: fmt::Debug + Clone + PartialEq;

    /// Signals driven by the peer.
    type Peer: fmt::Debug + Default + Clone + PartialEq;

    /// Value presented together with `start`.
    type Start: fmt::Debug + Clone;

    /// Drive signals for the given registers.
    fn drive(state: &ChannelState<P>) -> Self::Drive;

    /// Payload crossing the channel if the handshake holds this cycle.
    fn handshake(state: &ChannelState<P>, peer: &Self::Peer) -> Option<P>;

    /// Payload register after `Idle -> Active`.
    fn launch(held: &P, start: Self::Start) -> P;

    /// Payload register after `Active -> Idle`.
    fn complete(held: &P, transferred: P) -> P;
}

/// Drives payload and `valid`, waits for `ready`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Source;

/// Drives `ready`, waits for `valid` and captures the payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sink;

impl<P: Signal> Role<P> for Source {
    type Drive = Valid<P>;
    type Peer = Ready;
    type Start = P;

    const NAME: &'static str = "source";

    fn drive(state: &ChannelState<P>) -> Valid<P> { Valid::new(state.is_active(), state.payload.clone()) }

    fn handshake(state: &ChannelState<P>, peer: &Ready) -> Option<P> {
        (state.is_active() && peer.ready).then(|| state.payload.clone())
    }

    fn launch(_held: &P, start: P) -> P { start }

    fn complete(held: &P, _transferred: P) -> P { held.clone() }
}

impl<P: Signal> Role<P> for Sink {
    type Drive = Ready;
    type Peer = Valid<P>;
    type Start = ();

    const NAME: &'static str = "sink";

    fn drive(state: &ChannelState<P>) -> Ready { Ready::new(state.is_active()) }

    fn handshake(state: &ChannelState<P>, peer: &Valid<P>) -> Option<P> {
        (state.is_active() && peer.valid).then(|| peer.inner.clone())
    }

    fn launch(held: &P, _start: ()) -> P { held.clone() }

    fn complete(_held: &P, transferred: P) -> P { transferred }
}

/// Outputs of a channel engine for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutput<P: Signal, R: Role<P>> {
    /// Signals driven onto the channel.
    pub drive: R::Drive,

    /// The engine is idle.
    pub idle: bool,

    /// Payload transferred this cycle, if the handshake holds.
    pub transfer: Option<P>,
}

impl<P: Signal, R: Role<P>> ChannelOutput<P, R> {
    /// Done pulse: the handshake completes this cycle.
    pub fn done(&self) -> bool { self.transfer.is_some() }
}

/// Channel handshake engine.
#[derive(Debug, Clone)]
pub struct Channel<P: Signal, R: Role<P>> {
    name: &'static str,
    config: Config,
    state: ChannelState<P>,
    _marker: PhantomData<R>,
}

impl<P: Signal, R: Role<P>> Channel<P, R> {
    /// Creates a new engine in its reset state.
    pub fn new(name: &'static str, config: Config) -> Self {
        Self { name, config, state: ChannelState::default(), _marker: PhantomData }
    }

    /// Channel name.
    pub fn name(&self) -> &'static str { self.name }

    /// Current registers.
    pub fn state(&self) -> &ChannelState<P> { &self.state }

    /// Current phase.
    pub fn phase(&self) -> Phase { self.state.phase }

    /// Returns whether the engine is idle.
    pub fn is_idle(&self) -> bool { self.state.phase == Phase::Idle }

    /// Payload register.
    pub fn payload(&self) -> &P { &self.state.payload }

    /// Signals driven onto the channel this cycle.
    pub fn drive(&self) -> R::Drive { R::drive(&self.state) }

    /// Outputs for this cycle, given the peer's signals.
    pub fn output(&self, peer: &R::Peer) -> ChannelOutput<P, R> {
        ChannelOutput {
            drive: self.drive(),
            idle: self.is_idle(),
            transfer: R::handshake(&self.state, peer).map(|payload| payload.truncate(&self.config)),
        }
    }

    /// Next registers, given this cycle's `start` and the peer's signals.
    ///
    /// `start` is ignored while the engine is active.
    pub fn next(&self, start: Option<R::Start>, peer: &R::Peer) -> ChannelState<P> {
        match self.state.phase {
            Phase::Idle => match start {
                Some(start) => ChannelState {
                    phase: Phase::Active,
                    payload: R::launch(&self.state.payload, start).truncate(&self.config),
                },
                None => self.state.clone(),
            },
            Phase::Active => match self.output(peer).transfer {
                Some(transferred) => {
                    ChannelState { phase: Phase::Idle, payload: R::complete(&self.state.payload, transferred) }
                }
                None => self.state.clone(),
            },
        }
    }

    /// Commits the next registers.
    pub fn commit(&mut self, next: ChannelState<P>) {
        if next.phase != self.state.phase {
            match next.phase {
                Phase::Active => log::trace!("[{}] {} start: {:?}", self.name, R::NAME, next.payload),
                Phase::Idle => log::trace!("[{}] {} done: {:?}", self.name, R::NAME, next.payload),
            }
        }
        self.state = next;
    }

    /// Advances one cycle.
    pub fn tick(&mut self, start: Option<R::Start>, peer: &R::Peer) -> ChannelOutput<P, R> {
        let output = self.output(peer);
        let next = self.next(start, peer);
        self.commit(next);
        output
    }

    /// Synchronous clear: back to idle with a zero payload.
    pub fn reset(&mut self) { self.state = ChannelState::default(); }
}
