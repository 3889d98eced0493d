//! Randomized write/read-back traffic against the responder model.

use std::collections::HashMap;

use axil_master::{mask, resp, Config, Delay, Delays, Responder, Simulation, Width};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ExampleError;

/// Traffic parameters.
#[derive(Debug, Clone, Copy)]
pub struct Traffic {
    pub transactions: u64,
    pub seed: u64,
    pub max_delay: u32,
    pub words: u64,
    pub limit: u64,
}

/// Outcome of a traffic run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    pub writes: u64,
    pub reads: u64,
    pub ticks: u64,
    pub handshakes: u64,
}

pub fn run(config: Config, traffic: &Traffic) -> Result<Summary, ExampleError> {
    let delays = Delays::uniform(Delay::Random { max: traffic.max_delay });
    let mut sim = Simulation::with_responder(Responder::with_seed(config, delays, traffic.seed));
    let mut rng = StdRng::seed_from_u64(traffic.seed);
    let mut model = HashMap::new();
    let mut summary = Summary::default();

    let stride = config.strb_width() as u64;
    for _ in 0..traffic.transactions {
        let addr = config.truncate(Width::Addr, rng.gen_range(0..traffic.words.max(1)) * stride);

        if rng.gen_bool(0.5) {
            let data = rng.gen::<u64>() & mask(config.data_width());
            let code = sim.write(addr, data, traffic.limit)?;
            if code != resp::OKAY {
                return Err(ExampleError::Response { addr, resp: code });
            }
            model.insert(addr, data);
            summary.writes += 1;
        } else {
            let (actual, code) = sim.read(addr, traffic.limit)?;
            if code != resp::OKAY {
                return Err(ExampleError::Response { addr, resp: code });
            }
            let expected = model.get(&addr).copied().unwrap_or(0);
            if actual != expected {
                return Err(ExampleError::Mismatch { addr, expected, actual });
            }
            summary.reads += 1;
        }
    }

    sim.run_until_idle(traffic.limit)?;
    summary.ticks = sim.tick();
    summary.handshakes = sim.checker().handshakes();
    Ok(summary)
}
