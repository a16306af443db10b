// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Byte-level primitives shared by every wire format in the crate: the
//! I2OSP/OS2IP conversions of RFC 8017 and the 2-byte length-prefixed
//! vector encoding used by the protocol messages.

use crate::errors::{InternalError, ProtocolError};

/// Corresponds to the I2OSP() function from RFC 8017: converts a
/// nonnegative integer into its big-endian representation of exactly
/// `length` bytes.
pub(crate) fn i2osp(input: usize, length: usize) -> Result<Vec<u8>, InternalError> {
    if length > 8 {
        return Err(InternalError::SizeError {
            name: "i2osp length",
            len: 8,
            actual_len: length,
        });
    }

    let sized_bytes = &input.to_be_bytes()[core::mem::size_of::<usize>() - length..];
    if input as u128 >= (1 << (8 * length as u128)) {
        return Err(InternalError::SizeError {
            name: "i2osp value",
            len: length,
            actual_len: core::mem::size_of::<usize>(),
        });
    }

    Ok(sized_bytes.to_vec())
}

/// Corresponds to the OS2IP() function from RFC 8017: interprets up to
/// eight big-endian bytes as a nonnegative integer.
pub(crate) fn os2ip(input: &[u8]) -> Result<usize, InternalError> {
    if input.len() > core::mem::size_of::<usize>() {
        return Err(InternalError::SizeError {
            name: "os2ip input",
            len: core::mem::size_of::<usize>(),
            actual_len: input.len(),
        });
    }

    let mut output = [0u8; core::mem::size_of::<usize>()];
    output[core::mem::size_of::<usize>() - input.len()..].copy_from_slice(input);
    Ok(usize::from_be_bytes(output))
}

/// Returns `I2OSP(len(input), length) || input`.
pub(crate) fn serialize_with_length(
    input: &[u8],
    length: usize,
) -> Result<Vec<u8>, InternalError> {
    Ok([&i2osp(input.len(), length)?[..], input].concat())
}

/// Encodes each part as a vector with an `x`-byte length prefix,
/// concatenating the results.
pub(crate) fn encode_vecs(prefix_len: usize, inputs: &[&[u8]]) -> Result<Vec<u8>, InternalError> {
    let mut out = Vec::new();
    for input in inputs {
        out.extend_from_slice(&serialize_with_length(input, prefix_len)?);
    }
    Ok(out)
}

/// Splits `data` into exactly `count` vectors, each carrying an `x`-byte
/// length prefix. Trailing bytes after the last vector are rejected.
pub(crate) fn decode_vecs(
    data: &[u8],
    count: usize,
    prefix_len: usize,
) -> Result<Vec<Vec<u8>>, ProtocolError> {
    let mut out = Vec::with_capacity(count);
    let mut remaining = data;

    for _ in 0..count {
        if remaining.len() < prefix_len {
            return Err(ProtocolError::DecodingError);
        }
        let length = os2ip(&remaining[..prefix_len]).map_err(|_| ProtocolError::DecodingError)?;
        if remaining.len() < prefix_len + length {
            return Err(ProtocolError::DecodingError);
        }
        out.push(remaining[prefix_len..prefix_len + length].to_vec());
        remaining = &remaining[prefix_len + length..];
    }

    if !remaining.is_empty() {
        return Err(ProtocolError::DecodingError);
    }

    Ok(out)
}

/// Constant-time xor of two equal-length byte strings.
pub(crate) fn xor(a: &[u8], b: &[u8]) -> Result<Vec<u8>, InternalError> {
    if a.len() != b.len() {
        return Err(InternalError::SizeError {
            name: "xor",
            len: a.len(),
            actual_len: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i2osp_fixed_width() {
        assert_eq!(i2osp(0, 1).unwrap(), vec![0]);
        assert_eq!(i2osp(1, 1).unwrap(), vec![1]);
        assert_eq!(i2osp(255, 1).unwrap(), vec![255]);
        assert_eq!(i2osp(256, 2).unwrap(), vec![1, 0]);
        assert_eq!(i2osp(65535, 2).unwrap(), vec![255, 255]);
        assert_eq!(i2osp(259, 3).unwrap(), vec![0, 1, 3]);
    }

    #[test]
    fn i2osp_rejects_oversized_values() {
        assert!(i2osp(256, 1).is_err());
        assert!(i2osp(65536, 2).is_err());
    }

    #[test]
    fn os2ip_roundtrip() {
        for value in [0usize, 1, 255, 256, 65535, 65536, 1 << 24] {
            let bytes = i2osp(value, 4).unwrap();
            assert_eq!(os2ip(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn vector_encoding_roundtrip() {
        let parts: [&[u8]; 3] = [b"alpha", b"", b"gamma-delta"];
        let encoded = encode_vecs(2, &parts).unwrap();
        let decoded = decode_vecs(&encoded, 3, 2).unwrap();
        assert_eq!(decoded.len(), 3);
        for (part, decoded) in parts.iter().zip(decoded.iter()) {
            assert_eq!(&part[..], &decoded[..]);
        }
    }

    #[test]
    fn vector_decoding_rejects_truncation() {
        let encoded = encode_vecs(2, &[b"alpha", b"beta"]).unwrap();
        assert!(decode_vecs(&encoded[..encoded.len() - 1], 2, 2).is_err());
        assert!(decode_vecs(&encoded[..1], 2, 2).is_err());
        // trailing garbage
        let mut extended = encoded;
        extended.push(0);
        assert!(decode_vecs(&extended, 2, 2).is_err());
    }

    #[test]
    fn xor_requires_equal_lengths() {
        assert!(xor(&[0, 1], &[1]).is_err());
        assert_eq!(xor(&[0b1010, 0xff], &[0b0110, 0xff]).unwrap(), vec![0b1100, 0]);
    }
}
