// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_pin_is_empty() {
    let pin = Pin::new(AgentId::new("executor"), false);
    assert!(pin.files.is_empty());
    assert!(pin.content_cache.is_empty());
    assert!(!pin.locked);
}

#[test]
fn checksum_of_returns_recorded_value() {
    let mut pin = Pin::new(AgentId::new("executor"), true);
    pin.files.insert(PathBuf::from("pkg/util.go"), 0xDEAD_BEEF);
    assert_eq!(pin.checksum_of(&PathBuf::from("pkg/util.go")), Some(0xDEAD_BEEF));
    assert_eq!(pin.checksum_of(&PathBuf::from("pkg/other.go")), None);
}
