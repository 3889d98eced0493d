//! Signals carried by valid/ready channels.

use std::fmt;

use crate::config::Config;

/// Port declaration of a payload member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDecl {
    /// Port name.
    pub name: String,

    /// Width in bits.
    pub width: usize,
}

impl PortDecl {
    /// Creates a new port declaration.
    pub fn new(name: &str, width: usize) -> Self { Self { name: name.to_string(), width } }

    /// Returns the declaration with `prefix` prepended to its name.
    pub fn prefixed(&self, prefix: &str) -> Self { Self { name: format!("{prefix}{}", self.name), width: self.width } }
}

impl fmt::Display for PortDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 1 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "[{}:0] {}", self.width - 1, self.name)
        }
    }
}

/// Payload record of a channel.
///
/// Usually derived with `#[derive(Signal)]`, which describes each `u64` member with its width.
pub trait Signal: fmt::Debug + Clone + Default + PartialEq {
    /// Port declarations of the members, in declaration order.
    fn port_decls(config: &Config) -> Vec<PortDecl>;

    /// Drops the bits of every member above its configured width.
    fn truncate(self, config: &Config) -> Self;
}

/// Valid/ready channel's forward signals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Valid<P> {
    /// Inner data
    pub inner: P,

    /// Valid bit
    pub valid: bool,
}

impl<P> Valid<P> {
    /// Creates new forward signals.
    pub fn new(valid: bool, inner: P) -> Self { Self { inner, valid } }

    /// Creates valid forward signals.
    pub fn valid(inner: P) -> Self { Self::new(true, inner) }

    /// Maps the inner value.
    pub fn map_inner<Q>(self, f: impl FnOnce(P) -> Q) -> Valid<Q> { Valid { inner: f(self.inner), valid: self.valid } }
}

impl<P: Default> Valid<P> {
    /// Creates invalid forward signals.
    pub fn invalid() -> Self { Self::new(false, P::default()) }
}

/// Ready signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Ready bit
    pub ready: bool,
}

impl Ready {
    /// Creates a new ready signal.
    pub fn new(ready: bool) -> Self { Self { ready } }
}

/// Returns whether a transfer happens on a channel this cycle.
pub fn transfers<P>(fwd: &Valid<P>, bwd: &Ready) -> bool { fwd.valid && bwd.ready }
