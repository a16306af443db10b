// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A uniform facade over extendable-output functions.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};

/// Identifies an extendable-output function.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Xof {
    /// SHAKE-128
    Shake128,
    /// SHAKE-256
    Shake256,
}

impl Xof {
    /// The target security level of the function in bits.
    pub fn security_level(&self) -> usize {
        match self {
            Xof::Shake128 => 128,
            Xof::Shake256 => 256,
        }
    }

    /// Absorbs the concatenation of `inputs` and squeezes `length` output
    /// bytes.
    pub fn read(&self, inputs: &[&[u8]], length: usize) -> Vec<u8> {
        match self {
            Xof::Shake128 => read_parts::<Shake128>(inputs, length),
            Xof::Shake256 => read_parts::<Shake256>(inputs, length),
        }
    }
}

fn read_parts<X: ExtendableOutput + Update + Default>(
    inputs: &[&[u8]],
    length: usize,
) -> Vec<u8> {
    let mut hasher = X::default();
    for input in inputs {
        hasher.update(input);
    }
    let mut out = vec![0u8; length];
    hasher.finalize_xof().read(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake_empty_input_known_answers() {
        assert_eq!(
            hex::encode(Xof::Shake128.read(&[], 32)),
            "7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef26"
        );
        assert_eq!(
            hex::encode(Xof::Shake256.read(&[], 32)),
            "46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f"
        );
    }

    #[test]
    fn split_input_is_equivalent_to_concatenation() {
        assert_eq!(
            Xof::Shake256.read(&[b"ab", b"cd"], 64),
            Xof::Shake256.read(&[b"abcd"], 64)
        );
    }

    #[test]
    fn output_is_a_prefix_of_longer_output() {
        let short = Xof::Shake128.read(&[b"prefix property"], 16);
        let long = Xof::Shake128.read(&[b"prefix property"], 64);
        assert_eq!(short[..], long[..16]);
    }
}
