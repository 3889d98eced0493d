//! Command-line front end for the AXI-Lite master.
//!
//! Lists the bus-side ports, prints a tick-by-tick trace of one write and read-back, or runs
//! randomized traffic against the responder model. Set `RUST_LOG` to see the engines at work.

mod traffic;

use axil_master::{Config, ConfigError, Delay, Delays, Request, SimError, Simulation};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use thiserror::Error;

/// AXI-Lite master simulator.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Address bus width in bits.
    #[arg(long, default_value_t = 32)]
    addr_width: usize,

    /// Data bus width in bits.
    #[arg(long, default_value_t = 32)]
    data_width: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the bus-side ports.
    Ports,
    /// Print every tick of one write followed by a read of the same address.
    Wave {
        /// Target address.
        #[arg(long, default_value_t = 0x10)]
        addr: u64,

        /// Write data.
        #[arg(long, default_value_t = 0xcafe)]
        data: u64,

        /// Responder delay on every channel.
        #[arg(long, default_value_t = 0)]
        delay: u32,
    },
    /// Run randomized write/read-back traffic.
    Run {
        /// Number of transactions.
        #[arg(short, long, default_value_t = 1000)]
        transactions: u64,

        /// Seed for addresses, data and responder delays.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Longest responder delay, in ticks.
        #[arg(long, default_value_t = 4)]
        max_delay: u32,

        /// Number of distinct words addressed.
        #[arg(long, default_value_t = 64)]
        words: u64,

        /// Ticks to wait for one transaction before giving up.
        #[arg(long, default_value_t = 256)]
        limit: u64,
    },
}

#[derive(Debug, Error)]
enum ExampleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("read {addr:#x}: expected {expected:#x}, got {actual:#x}")]
    Mismatch { addr: u64, expected: u64, actual: u64 },

    #[error("{addr:#x}: unexpected response {resp:#b}")]
    Response { addr: u64, resp: u64 },
}

fn wave(config: Config, addr: u64, data: u64, delay: u32) -> Result<(), ExampleError> {
    let mut sim = Simulation::new(config, Delays::uniform(Delay::Fixed(delay)));
    let mut traces = vec![sim.step(&Request::write(addr, data))?];

    while !sim.response().write_done {
        traces.push(sim.step(&Request::default())?);
    }
    traces.push(sim.step(&Request::read(addr))?);
    while !sim.response().read_done {
        traces.push(sim.step(&Request::default())?);
    }
    traces.push(sim.step(&Request::default())?);

    println!("{}", traces.iter().join("\n"));
    Ok(())
}

fn main() -> Result<(), ExampleError> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::new(cli.addr_width, cli.data_width)?;

    match cli.command {
        Command::Ports => {
            let master = axil_master::MasterInterface::new(config);
            println!("{}", master.ports().iter().join("\n"));
        }
        Command::Wave { addr, data, delay } => wave(config, addr, data, delay)?,
        Command::Run { transactions, seed, max_delay, words, limit } => {
            log::info!("running {transactions} transactions (seed {seed}, delays up to {max_delay})");
            let traffic = traffic::Traffic { transactions, seed, max_delay, words, limit };
            let summary = traffic::run(config, &traffic)?;
            println!(
                "{} writes, {} reads, {} handshakes in {} ticks",
                summary.writes, summary.reads, summary.handshakes, summary.ticks
            );
        }
    }
    Ok(())
}
