// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const NETSTAT_OUTPUT: &str = r#"
Active Connections

  Proto  Local Address          Foreign Address        State           PID
  TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1234
  TCP    [::]:445               [::]:0                 LISTENING       4
  TCP    10.0.0.5:49811         93.184.216.34:443      ESTABLISHED     884
  TCP    10.0.0.5:3389          203.0.113.9:51000      ESTABLISHED     912
  TCP    127.0.0.1:8080         127.0.0.1:52100        ESTABLISHED     77
  TCP    0.0.0.0:49152          0.0.0.0:0              LISTENING       700
  UDP    0.0.0.0:5353           *:*                                    5678
  UDP    [::1]:1900             *:*                                    5678
"#;

#[test]
fn parses_tcp_and_udp_listeners() {
    let listeners = parse_listeners(NETSTAT_OUTPUT);

    assert_eq!(listeners.len(), 5);
    assert_eq!(
        listeners[0],
        ListenerRecord {
            proto: Proto::Tcp,
            local_addr: "0.0.0.0".to_string(),
            local_port: 135,
            pid: 1234,
        }
    );
    // IPv6 listener keeps its bracketed address form
    assert_eq!(listeners[1].local_addr, "[::]");
    assert_eq!(listeners[1].local_port, 445);
    // UDP rows have no state column
    assert_eq!(listeners[3].proto, Proto::Udp);
    assert_eq!(listeners[3].local_port, 5353);
}

#[test]
fn established_rows_become_remote_port_pairs() {
    let connections = parse_established(NETSTAT_OUTPUT);

    assert_eq!(
        connections,
        vec![
            EstablishedConn {
                remote_addr: "93.184.216.34".to_string(),
                local_port: 49811,
            },
            EstablishedConn {
                remote_addr: "203.0.113.9".to_string(),
                local_port: 3389,
            },
            // loopback filtering is the port-scan monitor's job
            EstablishedConn {
                remote_addr: "127.0.0.1".to_string(),
                local_port: 8080,
            },
        ]
    );
}

#[test]
fn garbage_lines_are_skipped() {
    let listeners = parse_listeners("TCP\nnot a row at all\nTCP x y LISTENING pid\n");
    assert!(listeners.is_empty());
    assert!(parse_established("???").is_empty());
}

#[test]
fn ipv6_remote_addresses_lose_their_brackets() {
    let out = "  TCP    [::1]:9000    [2001:db8::1]:40000    ESTABLISHED    55\n";
    let connections = parse_established(out);
    assert_eq!(connections[0].remote_addr, "2001:db8::1");
    assert_eq!(connections[0].local_port, 9000);
}
