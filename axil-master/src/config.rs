//! Bus configuration.

use static_assertions::const_assert;
use thiserror::Error;

/// Width of the protection code carried on the address channels.
pub const PROT_WIDTH: usize = 3;

/// Width of the response code carried on the `b` and `r` channels.
pub const RESP_WIDTH: usize = 2;

/// Widest address or data bus a value register can hold.
pub const MAX_WIDTH: usize = u64::BITS as usize;

// Error: AXI lite protection code is 3 bits wide
const_assert!(PROT_WIDTH == 3);

// Error: AXI lite response code is 2 bits wide
const_assert!(RESP_WIDTH == 2);

// Error: value registers require byte (8-bit) granularity
const_assert!(MAX_WIDTH % 8 == 0);

/// Configuration error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The address bus is empty or wider than a value register.
    #[error("address width must be within 1..=64, got {0}")]
    AddrWidth(usize),

    /// The data bus is empty or wider than a value register.
    #[error("data width must be within 8..=64, got {0}")]
    DataWidth(usize),

    /// The data bus is not a whole number of bytes.
    #[error("data width requires byte (8-bit) granularity, got {0}")]
    DataGranularity(usize),
}

/// Width of a payload member, resolved against a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Address bus width.
    Addr,
    /// Data bus width.
    Data,
    /// Write strobe width (one bit per data byte).
    Strb,
    /// Width fixed by the protocol.
    Fixed(usize),
}

/// Bus widths, fixed for the lifetime of a master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    addr_width: usize,
    data_width: usize,
}

impl Config {
    /// Creates a new configuration.
    pub fn new(addr_width: usize, data_width: usize) -> Result<Self, ConfigError> {
        if addr_width == 0 || addr_width > MAX_WIDTH {
            return Err(ConfigError::AddrWidth(addr_width));
        }
        if data_width < 8 || data_width > MAX_WIDTH {
            return Err(ConfigError::DataWidth(data_width));
        }
        if data_width % 8 != 0 {
            return Err(ConfigError::DataGranularity(data_width));
        }

        Ok(Self { addr_width, data_width })
    }

    /// Address bus width in bits.
    pub fn addr_width(&self) -> usize { self.addr_width }

    /// Data bus width in bits.
    pub fn data_width(&self) -> usize { self.data_width }

    /// Write strobe width in bits.
    pub fn strb_width(&self) -> usize { self.data_width / 8 }

    /// Resolves a member width.
    pub fn resolve(&self, width: Width) -> usize {
        match width {
            Width::Addr => self.addr_width,
            Width::Data => self.data_width,
            Width::Strb => self.strb_width(),
            Width::Fixed(width) => width,
        }
    }

    /// Drops the bits of `value` above the resolved width.
    pub fn truncate(&self, width: Width, value: u64) -> u64 { value & mask(self.resolve(width)) }

    /// Strobe value with every byte lane enabled.
    pub fn all_strobes(&self) -> u64 { mask(self.strb_width()) }
}

impl Default for Config {
    fn default() -> Self { Self { addr_width: 32, data_width: 32 } }
}

/// Returns a value with the low `width` bits set.
pub const fn mask(width: usize) -> u64 {
    if width >= MAX_WIDTH {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}
