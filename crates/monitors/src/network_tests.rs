// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sentinel_adapters::{FakeProcessProbe, FakeSocketProbe, ListenerRecord, ProcessRecord};
use sentinel_core::Scalar;

fn listener(proto: Proto, port: u16, pid: u32) -> ListenerRecord {
    ListenerRecord {
        proto,
        local_addr: "0.0.0.0".to_string(),
        local_port: port,
        pid,
    }
}

fn process(name: &str, pid: u32) -> ProcessRecord {
    ProcessRecord {
        name: name.to_string(),
        pid,
        session: "Services".to_string(),
        mem_usage: "1,024 K".to_string(),
        path: String::new(),
    }
}

fn monitor(
    trusted: &[&str],
    ignored: &[u16],
) -> (NetworkMonitor<FakeSocketProbe, FakeProcessProbe>, FakeSocketProbe, FakeProcessProbe) {
    let sockets = FakeSocketProbe::new();
    let processes = FakeProcessProbe::new();
    let trusted: Vec<String> = trusted.iter().map(|s| s.to_string()).collect();
    let monitor = NetworkMonitor::new(
        Duration::from_secs(15),
        sockets.clone(),
        processes.clone(),
        &trusted,
        ignored.iter().copied().collect(),
    );
    (monitor, sockets, processes)
}

#[tokio::test]
async fn baseline_is_silent() {
    let (mut monitor, sockets, _) = monitor(&[], &[]);
    sockets.set_listeners(vec![listener(Proto::Tcp, 135, 4), listener(Proto::Udp, 5353, 9)]);

    monitor.setup().await.unwrap();
    let events = monitor.poll().await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn new_listener_emits_with_process_resolution() {
    let (mut monitor, sockets, processes) = monitor(&["svchost.exe"], &[]);
    sockets.set_listeners(vec![listener(Proto::Tcp, 135, 4)]);
    monitor.setup().await.unwrap();

    processes.set_processes(vec![process("nc.exe", 4242)]);
    sockets.set_listeners(vec![listener(Proto::Tcp, 135, 4), listener(Proto::Tcp, 4444, 4242)]);
    let events = monitor.poll().await.unwrap();

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.source, "network");
    assert_eq!(event.event_type, "new_listener");
    assert_eq!(event.data["local_port"], Scalar::Int(4444));
    assert_eq!(event.data["process"], Scalar::from("nc.exe"));
    assert_eq!(event.data["proto"], Scalar::from("TCP"));
    assert_eq!(event.data["trusted"], Scalar::Bool(false));
}

#[tokio::test]
async fn trusted_flag_is_case_insensitive() {
    let (mut monitor, sockets, processes) = monitor(&["SvcHost.exe"], &[]);
    monitor.setup().await.unwrap();

    processes.set_processes(vec![process("svchost.exe", 880)]);
    sockets.set_listeners(vec![listener(Proto::Tcp, 8443, 880)]);
    let events = monitor.poll().await.unwrap();

    assert_eq!(events[0].data["trusted"], Scalar::Bool(true));
}

#[tokio::test]
async fn unknown_pid_resolves_to_unknown() {
    let (mut monitor, sockets, _) = monitor(&[], &[]);
    monitor.setup().await.unwrap();

    sockets.set_listeners(vec![listener(Proto::Tcp, 4444, 31337)]);
    let events = monitor.poll().await.unwrap();
    assert_eq!(events[0].data["process"], Scalar::from("unknown"));
}

#[tokio::test]
async fn ephemeral_ports_are_absorbed_silently() {
    let (mut monitor, sockets, _) = monitor(&[], &[]);
    monitor.setup().await.unwrap();

    sockets.set_listeners(vec![listener(Proto::Tcp, 55000, 77)]);
    assert!(monitor.poll().await.unwrap().is_empty());
    // still silent on the next tick
    assert!(monitor.poll().await.unwrap().is_empty());
}

#[tokio::test]
async fn ignored_ports_are_absorbed_silently() {
    let (mut monitor, sockets, _) = monitor(&[], &[8080]);
    monitor.setup().await.unwrap();

    sockets.set_listeners(vec![listener(Proto::Tcp, 8080, 77)]);
    assert!(monitor.poll().await.unwrap().is_empty());
}

#[tokio::test]
async fn same_port_new_pid_is_a_new_listener() {
    let (mut monitor, sockets, _) = monitor(&[], &[]);
    sockets.set_listeners(vec![listener(Proto::Tcp, 8000, 100)]);
    monitor.setup().await.unwrap();

    sockets.set_listeners(vec![listener(Proto::Tcp, 8000, 200)]);
    let events = monitor.poll().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data["pid"], Scalar::Int(200));
}

#[tokio::test]
async fn state_lists_listeners_sorted_by_port() {
    let (mut monitor, sockets, _) = monitor(&[], &[]);
    sockets.set_listeners(vec![
        listener(Proto::Tcp, 445, 4),
        listener(Proto::Tcp, 135, 4),
        listener(Proto::Udp, 5353, 9),
    ]);
    monitor.setup().await.unwrap();

    let state = monitor.state();
    assert_eq!(state["total"], 3);
    let ports: Vec<u64> = state["listeners"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["local_port"].as_u64().unwrap())
        .collect();
    assert_eq!(ports, vec![135, 445, 5353]);
}

#[tokio::test]
async fn probe_failure_propagates_for_the_runner_to_log() {
    let (mut monitor, sockets, _) = monitor(&[], &[]);
    monitor.setup().await.unwrap();

    sockets.set_fail(true);
    assert!(monitor.poll().await.is_err());

    // and the next tick recovers
    sockets.set_fail(false);
    assert!(monitor.poll().await.is_ok());
}
