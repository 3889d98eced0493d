//! AXI-Lite channel payloads.

use crate::*;

/// Response codes carried on `bresp` and `rresp`.
pub mod resp {
    /// Normal access success.
    pub const OKAY: u64 = 0b00;
    /// Exclusive access success.
    pub const EXOKAY: u64 = 0b01;
    /// Responder error.
    pub const SLVERR: u64 = 0b10;
    /// Decode error: no responder at the address.
    pub const DECERR: u64 = 0b11;
}

/// m_axil_aw*, m_axil_ar*.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct Addr {
    /// Target address.
    #[width(addr)]
    pub addr: u64,

    /// Protection code; always zero for this master.
    #[width(3)]
    pub prot: u64,
}

impl Addr {
    /// Creates an unprivileged, secure, data access to `addr`.
    pub fn new(addr: u64) -> Self { Self { addr, prot: 0 } }
}

/// m_axil_w*.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct WReq {
    /// Write data.
    #[width(data)]
    pub data: u64,

    /// Byte lane strobes.
    #[width(strb)]
    pub strb: u64,
}

/// m_axil_b*.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct WRes {
    /// Write response code.
    #[width(2)]
    pub resp: u64,
}

/// m_axil_r*.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct RRes {
    /// Read data.
    #[width(data)]
    pub data: u64,

    /// Read response code.
    #[width(2)]
    pub resp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_port_decls() {
        let config = Config::new(16, 64).unwrap();
        assert_eq!(Addr::port_decls(&config), vec![PortDecl::new("addr", 16), PortDecl::new("prot", 3)]);
        assert_eq!(WReq::port_decls(&config), vec![PortDecl::new("data", 64), PortDecl::new("strb", 8)]);
        assert_eq!(WRes::port_decls(&config), vec![PortDecl::new("resp", 2)]);
        assert_eq!(RRes::port_decls(&config), vec![PortDecl::new("data", 64), PortDecl::new("resp", 2)]);
    }

    #[test]
    fn derived_truncate() {
        let config = Config::new(8, 16).unwrap();
        assert_eq!(Addr { addr: 0x1234, prot: 0xf }.truncate(&config), Addr { addr: 0x34, prot: 0x7 });
        assert_eq!(RRes { data: 0xdead_beef, resp: 0x6 }.truncate(&config), RRes { data: 0xbeef, resp: resp::SLVERR });
    }

    #[derive(Debug, Default, Clone, PartialEq, Signal)]
    struct Beat {
        #[member(name = "payload")]
        #[width(data)]
        data: u64,

        #[width(1)]
        last: u64,
    }

    #[test]
    fn renamed_member() {
        let config = Config::default();
        assert_eq!(Beat::port_decls(&config), vec![PortDecl::new("payload", 32), PortDecl::new("last", 1)]);
        assert_eq!(Beat { data: 1 << 40, last: 3 }.truncate(&config), Beat { data: 0, last: 1 });
    }
}
