use axil_master::*;

fn sim() -> Simulation { Simulation::new(Config::default(), Delays::default()) }

fn idle() -> Request { Request::default() }

#[test]
fn write_completes_on_third_tick() {
    let mut sim = sim();

    let t0 = sim.step(&Request::write(0x10, 0xcafe)).unwrap();
    assert_eq!(t0.starts.as_slice(), &[ChannelId::Aw, ChannelId::W]);
    assert_eq!(t0.bus_out, BusOut::default());

    let t1 = sim.step(&idle()).unwrap();
    assert_eq!(t1.bus_out.aw, Valid::valid(Addr::new(0x10)));
    assert_eq!(t1.bus_out.w, Valid::valid(WReq { data: 0xcafe, strb: 0xf }));
    assert!(t1.bus_in.aw.ready && t1.bus_in.w.ready);
    assert_eq!(t1.dones.as_slice(), &[ChannelId::Aw, ChannelId::W]);

    let t2 = sim.step(&idle()).unwrap();
    assert_eq!(t2.bus_in.b, Valid::valid(WRes { resp: resp::OKAY }));
    assert!(t2.bus_out.b.ready);
    assert_eq!(t2.dones.as_slice(), &[ChannelId::B]);
    assert!(!t2.response.write_done);

    let t3 = sim.step(&idle()).unwrap();
    assert!(t3.response.write_done);
    assert_eq!(t3.response.write_resp, resp::OKAY);
    assert!(t3.response.idle);

    let t4 = sim.step(&idle()).unwrap();
    assert!(!t4.response.write_done);
    assert_eq!(sim.responder().peek(0x10), 0xcafe);
}

#[test]
fn address_and_data_ready_at_different_ticks() {
    let delays = Delays { aw: Delay::Fixed(3), w: Delay::Fixed(1), ..Delays::default() };
    let mut sim = Simulation::new(Config::default(), delays);

    let traces = sim.run(&Request::write(0x20, 0x1234), 1).unwrap();
    let traces = traces.into_iter().chain(sim.run(&idle(), 7).unwrap()).collect::<Vec<_>>();

    let w_done = traces.iter().position(|t| t.dones.contains(&ChannelId::W));
    let aw_done = traces.iter().position(|t| t.dones.contains(&ChannelId::Aw));
    assert_eq!(w_done, Some(2));
    assert_eq!(aw_done, Some(4));

    assert!(traces[1..=4].iter().all(|t| t.write_state == WriteState::AddrData));
    assert!(traces[..4].iter().all(|t| !t.starts.contains(&ChannelId::B)));
    // `w` stays idle once done, `aw` keeps waiting
    assert!(!traces[3].bus_out.w.valid);
    assert!(traces[3].bus_out.aw.valid);

    assert!(traces[4].starts.contains(&ChannelId::B));
    assert_eq!(traces[5].write_state, WriteState::Resp);
    assert!(traces[6].response.write_done);
}

#[test]
fn start_on_read_done_is_ignored() {
    let mut sim = sim();
    sim.responder_mut().poke(0x8, 0x55);
    sim.step(&Request::read(0x4)).unwrap();
    sim.run(&idle(), 2).unwrap();

    let t3 = sim.step(&Request::read(0x8)).unwrap();
    assert!(t3.response.read_done);
    assert!(t3.starts.is_empty());
    assert_eq!(sim.master().read_state(), ReadState::Idle);

    // the line is still high: no edge, no read
    let t4 = sim.step(&Request::read(0x8)).unwrap();
    assert!(t4.starts.is_empty());
    assert_eq!(sim.responder().reads(), 1);
}

#[test]
fn start_one_tick_after_read_done_is_accepted() {
    let mut sim = sim();
    sim.responder_mut().poke(0x8, 0x55);
    sim.step(&Request::read(0x4)).unwrap();
    sim.run(&idle(), 2).unwrap();

    let t3 = sim.step(&idle()).unwrap();
    assert!(t3.response.read_done);

    let t4 = sim.step(&Request::read(0x8)).unwrap();
    assert_eq!(t4.starts.as_slice(), &[ChannelId::Ar]);
    assert_eq!(sim.master().read_state(), ReadState::Addr);

    sim.run(&idle(), 2).unwrap();
    let response = sim.response();
    assert!(response.read_done);
    assert_eq!(response.read_data, 0x55);
}

#[test]
fn held_start_triggers_one_write() {
    let mut sim = sim();
    let traces = sim.run(&Request::write(0x30, 3), 5).unwrap();
    let traces = traces.into_iter().chain(sim.run(&idle(), 4).unwrap()).collect::<Vec<_>>();

    assert_eq!(traces.iter().filter(|t| t.response.write_done).count(), 1);
    assert_eq!(traces.iter().filter(|t| t.dones.contains(&ChannelId::Aw)).count(), 1);
    assert_eq!(sim.responder().writes(), 1);
}

#[test]
fn round_trip() {
    let mut sim = sim();
    assert_eq!(sim.write(0x100, 0xdead_beef, 16), Ok(resp::OKAY));
    assert_eq!(sim.read(0x100, 16), Ok((0xdead_beef, resp::OKAY)));

    // no further pulses
    let traces = sim.run(&idle(), 8).unwrap();
    assert!(traces.iter().skip(1).all(|t| !t.response.write_done && !t.response.read_done));
    assert!(traces.iter().all(|t| t.response.idle));
}

#[test]
fn idle_from_reset() {
    let mut sim = sim();
    for trace in sim.run(&idle(), 32).unwrap() {
        assert_eq!(trace.bus_out, BusOut::default());
        assert!(trace.response.idle);
        assert!(trace.starts.is_empty() && trace.dones.is_empty());
    }
    assert!(sim.master().active_channels().is_empty());
}

#[test]
fn unresponsive_responder_stalls() {
    let delays = Delays { aw: Delay::Never, ..Delays::default() };
    let mut sim = Simulation::new(Config::default(), delays);
    assert_eq!(sim.write(0x40, 1, 64), Err(SimError::Timeout(64)));

    let trace = sim.step(&idle()).unwrap();
    assert_eq!(trace.write_state, WriteState::AddrData);
    assert_eq!(trace.bus_out.aw, Valid::valid(Addr::new(0x40)));
    assert_eq!(sim.master().active_channels().as_slice(), &[ChannelId::Aw]);

    // reads are independent of the stalled write
    assert_eq!(sim.read(0x40, 16), Ok((0, resp::OKAY)));
}

#[test]
fn write_and_read_in_parallel() {
    let mut sim = sim();
    sim.responder_mut().poke(0x4, 0x77);

    let req = Request { write_start: true, read_start: true, addr: 0x4, write_data: 0x99 };
    let t0 = sim.step(&req).unwrap();
    assert_eq!(t0.starts.as_slice(), &[ChannelId::Aw, ChannelId::W, ChannelId::Ar]);

    let t1 = sim.step(&idle()).unwrap();
    assert_eq!(t1.dones.as_slice(), &[ChannelId::Aw, ChannelId::W, ChannelId::Ar]);

    let t2 = sim.step(&idle()).unwrap();
    assert_eq!(t2.dones.as_slice(), &[ChannelId::B, ChannelId::R]);

    let response = sim.response();
    assert!(response.write_done && response.read_done);
    // the responder stores the write before serving a read accepted on the same tick
    assert_eq!(response.read_data, 0x99);
    assert_eq!(sim.responder().peek(0x4), 0x99);
}

#[test]
fn reset_mid_transaction() {
    let mut sim = Simulation::new(Config::default(), Delays::uniform(Delay::Fixed(4)));
    sim.step(&Request { write_start: true, read_start: true, addr: 0x8, write_data: 1 }).unwrap();
    sim.run(&idle(), 2).unwrap();
    assert!(!sim.response().idle);

    sim.reset();
    assert_eq!(sim.master().bus(), BusOut::default());
    assert_eq!(sim.response(), Response { idle: true, ..Response::default() });
    assert!(sim.master().active_channels().is_empty());

    assert_eq!(sim.write(0xc, 2, 32), Ok(resp::OKAY));
    assert_eq!(sim.read(0xc, 32), Ok((2, resp::OKAY)));
}

#[test]
fn error_responses_are_passed_through() {
    let mut responder = Responder::new(Config::default(), Delays::default());
    responder.fail_at(0x40);
    responder.set_limit(0x1000);
    let mut sim = Simulation::with_responder(responder);

    assert_eq!(sim.write(0x40, 1, 16), Ok(resp::SLVERR));
    assert_eq!(sim.read(0x40, 16), Ok((0, resp::SLVERR)));
    assert_eq!(sim.write(0x1000, 1, 16), Ok(resp::DECERR));
    assert_eq!(sim.read(0x1000, 16), Ok((0, resp::DECERR)));
    assert_eq!(sim.write(0x44, 1, 16), Ok(resp::OKAY));
}

#[test]
fn start_while_busy_is_ignored() {
    let mut sim = Simulation::new(Config::default(), Delays::uniform(Delay::Fixed(2)));
    sim.step(&Request::write(0x10, 1)).unwrap();
    sim.step(&idle()).unwrap();

    let trace = sim.step(&Request::write(0x20, 2)).unwrap();
    assert_eq!(trace.bus_out.aw, Valid::valid(Addr::new(0x10)));
    assert_eq!(sim.write(0x20, 2, 8), Err(SimError::Busy("write")));

    sim.run_until_idle(32).unwrap();
    sim.run(&idle(), 4).unwrap();
    assert_eq!(sim.responder().writes(), 1);
    assert_eq!(sim.responder().peek(0x10), 1);
    assert_eq!(sim.responder().peek(0x20), 0);
}

#[test]
fn values_are_truncated_to_bus_widths() {
    let config = Config::new(8, 16).unwrap();
    let mut sim = Simulation::new(config, Delays::default());

    let trace = sim.step(&Request::write(0x1fe, 0xabcd_1234)).unwrap();
    assert!(trace.starts.contains(&ChannelId::Aw));
    let trace = sim.step(&idle()).unwrap();
    assert_eq!(trace.bus_out.aw.inner.addr, 0xfe);
    assert_eq!(trace.bus_out.w.inner, WReq { data: 0x1234, strb: 0x3 });

    sim.run_until_idle(16).unwrap();
    assert_eq!(sim.read(0xfe, 16), Ok((0x1234, resp::OKAY)));
}
