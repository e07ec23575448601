// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor specs: port-scan windowing and listener baseline behavior.

use sentinel_adapters::{
    EstablishedConn, FakeProcessProbe, FakeSocketProbe, ListenerRecord, Proto,
};
use sentinel_core::{FakeClock, Scalar};
use sentinel_monitors::{Monitor, NetworkMonitor, PortScanMonitor};
use std::collections::HashSet;
use std::time::Duration;

fn conn(remote: &str, port: u16) -> EstablishedConn {
    EstablishedConn {
        remote_addr: remote.to_string(),
        local_port: port,
    }
}

#[tokio::test]
async fn twelve_ports_in_window_fire_one_scan_event() {
    let sockets = FakeSocketProbe::new();
    let clock = FakeClock::new();
    let mut monitor =
        PortScanMonitor::new(Duration::from_secs(10), sockets.clone(), clock.clone());

    sockets.set_established((0..12).map(|i| conn("1.2.3.4", 1000 + i)).collect());
    let events = monitor.poll().await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "port_scan_detected");
    assert_eq!(events[0].data["unique_ports"], Scalar::Int(12));

    // a 13th port inside the window stays silent until the window empties
    sockets.set_established(vec![conn("1.2.3.4", 9999)]);
    assert!(monitor.poll().await.unwrap().is_empty());

    // everything ages out, the IP re-arms, a fresh burst fires again
    clock.advance(Duration::from_secs(121));
    sockets.set_established(vec![]);
    assert!(monitor.poll().await.unwrap().is_empty());
    sockets.set_established((0..12).map(|i| conn("1.2.3.4", 2000 + i)).collect());
    assert_eq!(monitor.poll().await.unwrap().len(), 1);
}

#[tokio::test]
async fn ephemeral_listener_is_absorbed_silently() {
    let sockets = FakeSocketProbe::new();
    let processes = FakeProcessProbe::new();
    let mut monitor = NetworkMonitor::new(
        Duration::from_secs(15),
        sockets.clone(),
        processes,
        &[],
        HashSet::new(),
    );
    monitor.setup().await.unwrap();

    sockets.set_listeners(vec![ListenerRecord {
        proto: Proto::Tcp,
        local_addr: "0.0.0.0".to_string(),
        local_port: 55000,
        pid: 4242,
    }]);

    assert!(monitor.poll().await.unwrap().is_empty());
    assert!(monitor.poll().await.unwrap().is_empty());
}

#[tokio::test]
async fn baseline_listeners_never_alert_but_new_ones_do() {
    let sockets = FakeSocketProbe::new();
    let processes = FakeProcessProbe::new();
    let mut monitor = NetworkMonitor::new(
        Duration::from_secs(15),
        sockets.clone(),
        processes,
        &[],
        HashSet::new(),
    );

    sockets.set_listeners(vec![ListenerRecord {
        proto: Proto::Tcp,
        local_addr: "0.0.0.0".to_string(),
        local_port: 445,
        pid: 4,
    }]);
    monitor.setup().await.unwrap();
    assert!(monitor.poll().await.unwrap().is_empty());

    sockets.set_listeners(vec![
        ListenerRecord {
            proto: Proto::Tcp,
            local_addr: "0.0.0.0".to_string(),
            local_port: 445,
            pid: 4,
        },
        ListenerRecord {
            proto: Proto::Tcp,
            local_addr: "0.0.0.0".to_string(),
            local_port: 4444,
            pid: 4242,
        },
    ]);

    let events = monitor.poll().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data["local_port"], Scalar::Int(4444));
    assert_eq!(events[0].data["trusted"], Scalar::Bool(false));
}
