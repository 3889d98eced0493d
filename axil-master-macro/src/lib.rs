//! Implementation of proc macros on bus payload records.
//!
//! # Note
//!
//! To use `#[derive(Signal)]` on a struct, every field must be a `u64` register annotated with its
//! width, and `Signal`, `PortDecl`, `Config` and `Width` must be in scope (`use axil_master::*`).
//!
//! For example, the write-data payload of the bus and its derived implementation are as follows.
//!
//! ```ignore
//! #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
//! pub struct WReq {
//!     #[width(data)]
//!     data: u64,
//!     #[member(name = "strb")]
//!     #[width(strb)]
//!     strobe: u64,
//! }
//!
//! impl Signal for WReq {
//!     fn port_decls(config: &Config) -> Vec<PortDecl> {
//!         vec![
//!             PortDecl::new("data", config.resolve(Width::Data)),
//!             PortDecl::new("strb", config.resolve(Width::Strb)),
//!         ]
//!     }
//!     fn truncate(self, config: &Config) -> Self {
//!         Self { data: config.truncate(Width::Data, self.data), strobe: config.truncate(Width::Strb, self.strobe) }
//!     }
//! }
//! ```

mod signal;
mod utils;

use proc_macro::{self, TokenStream};

#[proc_macro_derive(Signal, attributes(member, width))]
pub fn signal(input: TokenStream) -> TokenStream { signal::derive(input) }
