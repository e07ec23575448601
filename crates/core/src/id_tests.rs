// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn uuid_ids_are_short_hex() {
    let id = UuidIdGen.next();
    assert_eq!(id.len(), 12);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn uuid_ids_are_unique() {
    let gen = UuidIdGen;
    assert_ne!(gen.next(), gen.next());
}

#[test]
fn sequential_ids_count_up() {
    let gen = SequentialIdGen::new("evt");
    assert_eq!(gen.next(), "evt-1");
    assert_eq!(gen.next(), "evt-2");
}

#[test]
fn sequential_clones_share_the_counter() {
    let gen = SequentialIdGen::new("a");
    let clone = gen.clone();
    assert_eq!(gen.next(), "a-1");
    assert_eq!(clone.next(), "a-2");
}
