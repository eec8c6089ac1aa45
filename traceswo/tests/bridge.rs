mod common;

use common::{FakeBulkIn, make_bridge, receive};
use traceswo::Config;
use traceswo::capture::CaptureOutcome;
use traceswo::driver::line::LineParameters;
use traceswo::drain::DrainOutcome;

#[test]
fn test_line_configured_on_creation() {
    let bridge = make_bridge::<256>(FakeBulkIn::always_ready(), Config::default());
    assert_eq!(bridge.baud(), 800_000);
    bridge.with_receiver(|uart| {
        assert_eq!(uart.line, LineParameters::new(800_000, 8));
        assert_eq!(uart.line_changes, 1);
    });
}

#[test]
fn test_set_baud_resets_data_bits() {
    let bridge = make_bridge::<256>(FakeBulkIn::always_ready(), Config::default());

    bridge.set_line_parameters(LineParameters::new(115_200, 7));
    assert_eq!(bridge.baud(), 115_200);
    bridge.with_receiver(|uart| assert_eq!(uart.line.data_bits, 7));

    bridge.set_baud(2_000_000);
    assert_eq!(bridge.baud(), 2_000_000);
    bridge.with_receiver(|uart| assert_eq!(uart.line.data_bits, 8));
}

#[test]
fn test_data_is_held_until_idle() {
    let bridge = make_bridge::<256>(FakeBulkIn::always_ready(), Config::default());

    bridge.with_receiver(|uart| uart.feed(b"partial"));
    let outcome = bridge.on_interrupt();
    assert_eq!(
        outcome,
        CaptureOutcome {
            captured: 7,
            idle: false,
            overflow: false
        }
    );
    assert_eq!(bridge.available(), 7);
    bridge.with_transport(|usb| assert!(usb.offered.is_empty()));

    // Receive timeout without new data flushes the trailing bytes
    bridge.with_receiver(|uart| uart.timeout = true);
    let outcome = bridge.on_interrupt();
    assert!(outcome.idle);
    assert_eq!(bridge.available(), 0);
    bridge.with_transport(|usb| assert_eq!(usb.stream(), b"partial"));
}

#[test]
fn test_saturated_buffer_drops_and_flushes() {
    let bridge = make_bridge::<8>(FakeBulkIn::default(), Config::default());

    bridge.with_receiver(|uart| uart.feed(b"ABCDEFG"));
    assert!(!bridge.on_interrupt().flush_needed());
    assert_eq!(bridge.available(), 7);

    bridge.with_receiver(|uart| uart.feed(b"H"));
    let outcome = bridge.on_interrupt();
    assert!(outcome.overflow);
    assert_eq!(outcome.captured, 0);

    // The flush sent the whole buffer in one packet
    assert_eq!(bridge.available(), 0);
    bridge.with_transport(|usb| {
        assert_eq!(usb.offered, [7]);
        assert_eq!(usb.in_flight.as_deref(), Some(&b"ABCDEFG"[..]));
    });

    let stats = bridge.statistics();
    assert_eq!(stats.capture.captured, 7);
    assert_eq!(stats.capture.overflows, 1);
    assert_eq!(stats.drain.sent, 7);
}

#[test]
fn test_flush_under_back_pressure_keeps_data() {
    let bridge = make_bridge::<8>(FakeBulkIn::default(), Config::default());
    bridge.with_transport(|usb| usb.in_flight = Some(b"busy".to_vec()));

    bridge.with_receiver(|uart| uart.feed(b"ABCDEFGH"));
    let outcome = bridge.on_interrupt();
    assert!(outcome.overflow);
    assert_eq!(bridge.available(), 7);
    assert_eq!(bridge.statistics().drain.rejected, 1);

    bridge.with_transport(|usb| assert!(usb.complete()));
    assert_eq!(bridge.on_transfer_complete(), DrainOutcome::Sent(7));
    bridge.with_transport(|usb| {
        usb.complete();
        assert_eq!(usb.stream(), b"busyABCDEFG");
    });
}

#[test]
fn test_wrapped_buffer_drains_in_two_steps() {
    let bridge = make_bridge::<8>(FakeBulkIn::always_ready(), Config::default());

    // Advance both indices to 6
    receive(bridge, b"012345", true);
    assert_eq!(bridge.available(), 0);

    // read = 6, write = 2
    receive(bridge, b"6789", false);
    assert_eq!(bridge.available(), 4);

    assert_eq!(bridge.tick(), DrainOutcome::Sent(2));
    assert_eq!(bridge.tick(), DrainOutcome::Sent(2));
    assert_eq!(bridge.tick(), DrainOutcome::Idle);

    bridge.with_transport(|usb| {
        assert_eq!(usb.offered, [6, 2, 2]);
        assert_eq!(usb.stream(), b"0123456789");
    });
}

#[test]
fn test_redundant_drain_does_not_touch_transport() {
    let bridge = make_bridge::<64>(FakeBulkIn::always_ready(), Config::default());
    receive(bridge, b"trace", false);

    assert_eq!(bridge.drain(), DrainOutcome::Sent(5));
    assert_eq!(bridge.drain(), DrainOutcome::Idle);
    assert_eq!(bridge.tick(), DrainOutcome::Idle);
    assert_eq!(bridge.on_transfer_complete(), DrainOutcome::Idle);
    bridge.with_transport(|usb| assert_eq!(usb.offered, [5]));
}

#[test]
fn test_completion_pipelines_packets() {
    let bridge = make_bridge::<256>(FakeBulkIn::default(), Config::default());
    let data: Vec<u8> = (0..200u8).collect();
    receive(bridge, &data, false);
    assert_eq!(bridge.available(), 200);

    // The tick starts the transfer, each completion sends the next packet
    assert_eq!(bridge.tick(), DrainOutcome::Sent(64));
    let mut sent = vec![64];
    loop {
        bridge.with_transport(|usb| usb.complete());
        match bridge.on_transfer_complete() {
            DrainOutcome::Sent(length) => sent.push(length),
            DrainOutcome::Idle => break,
            outcome => panic!("unexpected {outcome:?}"),
        }
    }

    assert_eq!(sent, [64, 64, 64, 8]);
    bridge.with_transport(|usb| assert_eq!(usb.stream(), data));
    assert_eq!(bridge.statistics().drain.packets, 4);
}

#[test]
fn test_sustained_input_with_slow_host() {
    let bridge = make_bridge::<64>(FakeBulkIn::default(), Config::default());
    let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    // The host reads one packet per 128 received bytes
    for (i, chunk) in data.chunks(16).enumerate() {
        receive(bridge, chunk, false);
        if i % 8 == 7 {
            bridge.with_transport(|usb| usb.complete());
            bridge.on_transfer_complete();
        }
    }
    while bridge.available() > 0 {
        bridge.with_transport(|usb| usb.complete());
        bridge.tick();
    }
    bridge.with_transport(|usb| usb.complete());

    let stats = bridge.statistics();
    let stream = bridge.with_transport(|usb| usb.stream());
    assert_eq!(stream.len() as u32, stats.drain.sent);
    assert_eq!(stats.drain.sent, stats.capture.captured);
    assert!(stats.capture.overflows > 0);

    // Delivered bytes keep their order
    let mut position = 0;
    for byte in stream {
        let offset = data[position..].iter().position(|&b| b == byte).unwrap();
        position += offset + 1;
    }
}

#[test]
fn test_interrupt_and_thread_contexts() {
    const COUNT: usize = 20_000;
    let bridge = make_bridge::<128>(FakeBulkIn::always_ready(), Config::default());

    std::thread::scope(|s| {
        // Receiver interrupt, paced so the buffer never saturates
        s.spawn(|| {
            let mut next = 0usize;
            while next < COUNT {
                if bridge.available() < 64 {
                    let chunk: Vec<u8> = (next..COUNT.min(next + 8)).map(|i| i as u8).collect();
                    let fed = bridge.with_receiver(|uart| uart.feed(&chunk));
                    next += fed;
                }
                bridge.on_interrupt();
                std::thread::yield_now();
            }
            bridge.with_receiver(|uart| uart.timeout = true);
            bridge.on_interrupt();
        });

        // Periodic tick
        s.spawn(|| {
            while bridge.statistics().drain.sent < COUNT as u32 {
                bridge.tick();
                std::thread::yield_now();
            }
        });
    });

    let stream = bridge.with_transport(|usb| usb.stream());
    assert_eq!(stream.len(), COUNT);
    assert!(stream.iter().enumerate().all(|(i, &byte)| byte == i as u8));
    assert_eq!(bridge.statistics().capture.overflows, 0);
}
