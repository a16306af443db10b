// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Implements the `expand_message_xmd` and `expand_message_xof` functions
//! from RFC 9380 §5.3.

use crate::errors::InternalError;
use crate::hash::Hash;
use crate::serialization::i2osp;
use crate::xof::Xof;

const MAX_DST_LENGTH: usize = 255;
const OVERSIZE_DST_PREFIX: &[u8] = b"H2C-OVERSIZE-DST-";

/// Corresponds to the expand_message_xmd() function defined in RFC 9380
/// §5.3.1.
///
/// # Panics
/// Panics on an empty `dst`; domain separation is not optional.
pub fn expand_message_xmd(
    hash: Hash,
    msg: &[u8],
    dst: &[u8],
    len_in_bytes: usize,
) -> Result<Vec<u8>, InternalError> {
    assert!(!dst.is_empty(), "zero-length DST");

    // Oversized DSTs are replaced by their hash under a fixed prefix.
    let dst = if dst.len() > MAX_DST_LENGTH {
        hash.hash(&[OVERSIZE_DST_PREFIX, dst])
    } else {
        dst.to_vec()
    };

    let b_in_bytes = hash.output_size();
    let s_in_bytes = hash.block_size();

    // ell = ceil(len_in_bytes / b_in_bytes)
    let ell = len_in_bytes.div_ceil(b_in_bytes);

    // ABORT if ell > 255 or len_in_bytes > 65535 or len(DST) > 255
    if ell > 255 || len_in_bytes > 65535 || dst.len() > MAX_DST_LENGTH {
        return Err(InternalError::ExpandLengthError);
    }

    // DST_prime = DST || I2OSP(len(DST), 1)
    let dst_prime = [&dst[..], &i2osp(dst.len(), 1)?[..]].concat();

    // Z_pad = I2OSP(0, s_in_bytes)
    let z_pad = vec![0u8; s_in_bytes];
    // l_i_b_str = I2OSP(len_in_bytes, 2)
    let l_i_b_str = i2osp(len_in_bytes, 2)?;

    // b_0 = H(Z_pad || msg || l_i_b_str || I2OSP(0, 1) || DST_prime)
    let b_0 = hash.hash(&[&z_pad, msg, &l_i_b_str, &[0u8], &dst_prime]);

    // b_1 = H(b_0 || I2OSP(1, 1) || DST_prime)
    let b_1 = hash.hash(&[&b_0, &[1u8], &dst_prime]);

    let mut uniform_bytes = Vec::with_capacity(ell * b_in_bytes);
    uniform_bytes.extend_from_slice(&b_1);

    // b_i = H(strxor(b_0, b_(i - 1)) || I2OSP(i, 1) || DST_prime)
    let mut b_prev = b_1;
    for i in 2..=ell {
        let xored: Vec<u8> = b_0.iter().zip(b_prev.iter()).map(|(x, y)| x ^ y).collect();
        b_prev = hash.hash(&[&xored, &i2osp(i, 1)?, &dst_prime]);
        uniform_bytes.extend_from_slice(&b_prev);
    }

    uniform_bytes.truncate(len_in_bytes);
    Ok(uniform_bytes)
}

/// Corresponds to the expand_message_xof() function defined in RFC 9380
/// §5.3.2.
///
/// # Panics
/// Panics on an empty `dst`; domain separation is not optional.
pub fn expand_message_xof(
    xof: Xof,
    msg: &[u8],
    dst: &[u8],
    len_in_bytes: usize,
) -> Result<Vec<u8>, InternalError> {
    assert!(!dst.is_empty(), "zero-length DST");

    let dst = if dst.len() > MAX_DST_LENGTH {
        // output length is ceil(2k / 8) for target security level k
        let length = (2 * xof.security_level()).div_ceil(8);
        xof.read(&[OVERSIZE_DST_PREFIX, dst], length)
    } else {
        dst.to_vec()
    };

    if len_in_bytes > 65535 || dst.len() > MAX_DST_LENGTH {
        return Err(InternalError::ExpandLengthError);
    }

    // uniform_bytes = H(msg || I2OSP(len_in_bytes, 2) || DST || I2OSP(len(DST), 1))
    Ok(xof.read(
        &[msg, &i2osp(len_in_bytes, 2)?, &dst, &i2osp(dst.len(), 1)?],
        len_in_bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors taken from RFC 9380, Appendix K.1
    // (expand_message_xmd with SHA-256).
    #[test]
    fn expand_message_xmd_sha256_vectors() {
        let dst = b"QUUX-V01-CS02-with-expander-SHA256-128";
        let q128_msg: Vec<u8> = b"q128_"
            .iter()
            .copied()
            .chain(core::iter::repeat(b'q').take(128))
            .collect();
        let a512_msg: Vec<u8> = b"a512_"
            .iter()
            .copied()
            .chain(core::iter::repeat(b'a').take(512))
            .collect();

        let cases: &[(&[u8], &str)] = &[
            (
                b"",
                "68a985b87eb6b46952128911f2a4412bbc302a9d759667f87f7a21d803f07371",
            ),
            (
                b"abc",
                "d8ccab23b5985ccea865c6c97b6e5b8350e794e603b4b97902f53a8a0d605615",
            ),
            (
                b"abcdef0123456789",
                "eff31487c770a893cfb36f912fbfcbff40d5661771ca4b2cb4eafe524333f5c1",
            ),
            (
                &q128_msg,
                "b23a1d2b4d97b2ef7785562a7e8bac7eed54ed6e97e29aa51bfe3f12ddad1ff9",
            ),
            (
                &a512_msg,
                "4623227bcc01293b8c130bf771da8c298dede7383243dc0993d2d94823958c4c",
            ),
        ];

        for (msg, expected) in cases {
            let out = expand_message_xmd(Hash::Sha256, msg, dst, 0x20).unwrap();
            assert_eq!(hex::encode(out), *expected);
        }
    }

    #[test]
    fn expand_message_xmd_multi_block_output() {
        // len_in_bytes > hash output forces the chaining loop
        let out = expand_message_xmd(Hash::Sha256, b"msg", b"some-dst", 96).unwrap();
        assert_eq!(out.len(), 96);
        // prefix property over the same parameters does NOT hold for xmd;
        // distinct lengths must produce unrelated streams
        let out2 = expand_message_xmd(Hash::Sha256, b"msg", b"some-dst", 32).unwrap();
        assert_ne!(out[..32], out2[..]);
    }

    #[test]
    fn expand_message_xmd_rejects_oversized_requests() {
        assert!(expand_message_xmd(Hash::Sha256, b"msg", b"dst", 65536).is_err());
        // ell > 255
        assert!(expand_message_xmd(Hash::Sha256, b"msg", b"dst", 255 * 32 + 1).is_err());
    }

    #[test]
    fn oversized_dst_is_rehashed() {
        let long_dst = vec![b'x'; 300];
        let out = expand_message_xmd(Hash::Sha256, b"msg", &long_dst, 32).unwrap();
        let rehashed = Hash::Sha256.hash(&[OVERSIZE_DST_PREFIX, &long_dst]);
        let expected = expand_message_xmd(Hash::Sha256, b"msg", &rehashed, 32).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    #[should_panic(expected = "zero-length DST")]
    fn empty_dst_panics() {
        let _ = expand_message_xmd(Hash::Sha256, b"msg", b"", 32);
    }

    #[test]
    fn expand_message_xof_lengths_and_determinism() {
        let a = expand_message_xof(Xof::Shake128, b"msg", b"dst", 48).unwrap();
        let b = expand_message_xof(Xof::Shake128, b"msg", b"dst", 48).unwrap();
        assert_eq!(a.len(), 48);
        assert_eq!(a, b);
        // different dst, different stream
        let c = expand_message_xof(Xof::Shake128, b"msg", b"dst2", 48).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn expand_message_xof_oversized_dst() {
        let long_dst = vec![b'y'; 256];
        let out = expand_message_xof(Xof::Shake256, b"msg", &long_dst, 32).unwrap();
        let rehashed = Xof::Shake256.read(&[OVERSIZE_DST_PREFIX, &long_dst], 64);
        let expected = expand_message_xof(Xof::Shake256, b"msg", &rehashed, 32).unwrap();
        assert_eq!(out, expected);
    }
}
