//! AXI-Lite master: valid/ready channel engines composed into write and read transaction sequencers.
//!
//! The bus is modelled cycle by cycle. Every component computes its next registers from one snapshot
//! of the current registers and this tick's inputs, and all of them commit together, so no component
//! ever observes another component's next state within the same tick.
//!
//! ```text
//!              request                          bus (valid/ready per channel)
//!   caller ─────────────▶ ┌──────────────────┐ ───── aw ─────▶
//!                         │ WriteSequencer   │ ───── w  ─────▶
//!   caller ◀───────────── │                  │ ◀──── b  ──────   responder
//!              response   │ ReadSequencer    │ ───── ar ─────▶
//!                         └──────────────────┘ ◀──── r  ──────
//!                              MasterInterface
//! ```

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::invalid_rust_codeblocks)]
#![deny(rustdoc::bare_urls)]
#![deny(unreachable_pub)]
//
#![allow(clippy::new_without_default)]
#![allow(elided_lifetimes_in_paths)]

pub mod channel;
pub mod checker;
pub mod config;
pub mod master;
pub mod payload;
pub mod read;
pub mod responder;
pub mod signal;
pub mod sim;
pub mod write;

pub use axil_master_macro::Signal;
pub use channel::*;
pub use checker::*;
pub use config::*;
pub use master::*;
pub use payload::*;
pub use read::*;
pub use responder::*;
pub use signal::*;
pub use sim::*;
pub use write::*;
