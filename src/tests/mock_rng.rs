// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A deterministic RNG for reproducing protocol flows in tests.

use rand::{CryptoRng, RngCore};

/// A simple RNG that cycles through a given byte sequence.
pub(crate) struct CycleRng {
    values: Vec<u8>,
}

impl CycleRng {
    pub fn new(values: Vec<u8>) -> Self {
        assert!(!values.is_empty());
        Self { values }
    }
}

impl RngCore for CycleRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.values[0];
            self.values.rotate_left(1);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for CycleRng {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_values() {
        let mut rng = CycleRng::new(vec![1, 2, 3]);
        let mut out = [0u8; 7];
        rng.fill_bytes(&mut out);
        assert_eq!(out, [1, 2, 3, 1, 2, 3, 1]);
    }
}
