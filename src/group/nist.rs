// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! NIST P-256 / P-384 / P-521 backends of the group abstraction.
//!
//! Point and scalar arithmetic is delegated to the `p256`/`p384`/`p521`
//! crates; the Simplified SWU map runs over `num-bigint` field arithmetic
//! and hands affine coordinates back to the curve crates, following the
//! hash-to-curve suites of RFC 9380 §8.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

pub(super) struct SswuParams {
    /// field characteristic
    p: BigInt,
    /// curve coefficient a = -3 (reduced)
    a: BigInt,
    /// curve coefficient b
    b: BigInt,
    /// non-square z of the suite (reduced)
    z: BigInt,
}

pub(super) fn hex_to_bigint(hex: &str) -> BigInt {
    BigInt::parse_bytes(hex.as_bytes(), 16).expect("invalid hex constant")
}

impl SswuParams {
    pub(super) fn new(p_hex: &str, b_hex: &str, z: i64) -> Self {
        let p = hex_to_bigint(p_hex);
        let a = &p - 3;
        let b = hex_to_bigint(b_hex);
        let z = (&p + z).mod_floor(&p);
        Self { p, a, b, z }
    }

    fn reduce(&self, x: &BigInt) -> BigInt {
        x.mod_floor(&self.p)
    }

    fn add(&self, x: &BigInt, y: &BigInt) -> BigInt {
        self.reduce(&(x + y))
    }

    fn mul(&self, x: &BigInt, y: &BigInt) -> BigInt {
        self.reduce(&(x * y))
    }

    fn square(&self, x: &BigInt) -> BigInt {
        self.mul(x, x)
    }

    fn neg(&self, x: &BigInt) -> BigInt {
        self.reduce(&-self.reduce(x))
    }

    fn pow(&self, x: &BigInt, e: &BigInt) -> BigInt {
        self.reduce(x).modpow(e, &self.p)
    }

    /// inv0(x) = x^(p - 2); maps 0 to 0 as the draft requires.
    fn inv0(&self, x: &BigInt) -> BigInt {
        self.pow(x, &(&self.p - 2))
    }

    /// sqrt for p = 3 mod 4: x^((p + 1) / 4).
    fn sqrt(&self, x: &BigInt) -> BigInt {
        self.pow(x, &((&self.p + 1) >> 2))
    }

    fn sgn0(&self, x: &BigInt) -> bool {
        self.reduce(x).is_odd()
    }

    fn is_zero(&self, x: &BigInt) -> bool {
        self.reduce(x) == BigInt::from(0)
    }

    /// Corresponds to the sqrt_ratio_3mod4() function defined in RFC 9380,
    /// Appendix F.2.1.2.
    fn sqrt_ratio_3mod4(&self, u: &BigInt, v: &BigInt) -> (bool, BigInt) {
        // c1 = (q - 3) / 4
        let c1 = (&self.p - 3) >> 2;
        // c2 = sqrt(-Z)
        let c2 = self.sqrt(&self.neg(&self.z));

        // 1. tv1 = v^2
        let mut tv1 = self.square(v);
        // 2. tv2 = u * v
        let tv2 = self.mul(u, v);
        // 3. tv1 = tv1 * tv2
        tv1 = self.mul(&tv1, &tv2);
        // 4. y1 = tv1^c1
        let mut y1 = self.pow(&tv1, &c1);
        // 5. y1 = y1 * tv2
        y1 = self.mul(&y1, &tv2);
        // 6. y2 = y1 * c2
        let y2 = self.mul(&y1, &c2);
        // 7. tv3 = y1^2
        let mut tv3 = self.square(&y1);
        // 8. tv3 = tv3 * v
        tv3 = self.mul(&tv3, v);
        // 9. isQR = tv3 == u
        let is_qr = tv3 == self.reduce(u);
        // 10. y = CMOV(y2, y1, isQR)
        let y = cmov(&y2, &y1, is_qr);
        (is_qr, y)
    }
}

fn cmov(a: &BigInt, b: &BigInt, c: bool) -> BigInt {
    if c {
        b.clone()
    } else {
        a.clone()
    }
}

/// Corresponds to the map_to_curve_simple_swu() function defined in
/// RFC 9380, Appendix F.2, returning affine coordinates.
pub(super) fn map_to_curve_simple_swu(u: &BigInt, f: &SswuParams) -> (BigInt, BigInt) {
    // 1.  tv1 = u^2
    let mut tv1 = f.square(u);
    // 2.  tv1 = Z * tv1
    tv1 = f.mul(&f.z, &tv1);
    // 3.  tv2 = tv1^2
    let mut tv2 = f.square(&tv1);
    // 4.  tv2 = tv2 + tv1
    tv2 = f.add(&tv2, &tv1);
    // 5.  tv3 = tv2 + 1
    let mut tv3 = f.add(&tv2, &BigInt::one());
    // 6.  tv3 = B * tv3
    tv3 = f.mul(&f.b, &tv3);
    // 7.  tv4 = CMOV(Z, -tv2, tv2 != 0)
    let mut tv4 = cmov(&f.z, &f.neg(&tv2), !f.is_zero(&tv2));
    // 8.  tv4 = A * tv4
    tv4 = f.mul(&f.a, &tv4);
    // 9.  tv2 = tv3^2
    tv2 = f.square(&tv3);
    // 10. tv6 = tv4^2
    let mut tv6 = f.square(&tv4);
    // 11. tv5 = A * tv6
    let mut tv5 = f.mul(&f.a, &tv6);
    // 12. tv2 = tv2 + tv5
    tv2 = f.add(&tv2, &tv5);
    // 13. tv2 = tv2 * tv3
    tv2 = f.mul(&tv2, &tv3);
    // 14. tv6 = tv6 * tv4
    tv6 = f.mul(&tv6, &tv4);
    // 15. tv5 = B * tv6
    tv5 = f.mul(&f.b, &tv6);
    // 16. tv2 = tv2 + tv5
    tv2 = f.add(&tv2, &tv5);
    // 17. x = tv1 * tv3
    let mut x = f.mul(&tv1, &tv3);
    // 18. (is_gx1_square, y1) = sqrt_ratio(tv2, tv6)
    let (is_gx1_square, y1) = f.sqrt_ratio_3mod4(&tv2, &tv6);
    // 19. y = tv1 * u
    let mut y = f.mul(&tv1, u);
    // 20. y = y * y1
    y = f.mul(&y, &y1);
    // 21. x = CMOV(x, tv3, is_gx1_square)
    x = cmov(&x, &tv3, is_gx1_square);
    // 22. y = CMOV(y, y1, is_gx1_square)
    y = cmov(&y, &y1, is_gx1_square);
    // 23. e1 = sgn0(u) == sgn0(y)
    let e1 = f.sgn0(u) == f.sgn0(&y);
    // 24. y = CMOV(-y, y, e1)
    y = cmov(&f.neg(&y), &y, e1);
    // 25. x = x / tv4
    x = f.mul(&x, &f.inv0(&tv4));

    (x, y)
}

/// Big-endian, zero-padded fixed-width encoding of a reduced field value.
pub(super) fn bigint_to_fixed_bytes(value: &BigInt, length: usize) -> Vec<u8> {
    let (_, bytes) = value.to_bytes_be();
    assert!(bytes.len() <= length, "field value exceeds target width");
    let mut out = vec![0u8; length];
    out[length - bytes.len()..].copy_from_slice(&bytes);
    out
}

macro_rules! nist_backend {
    (
        $name:ident, $pkg:ident, $hash:expr, $l:expr, $scalar_len:expr, $field_len:expr,
        $h2c:expr, $p_hex:expr, $b_hex:expr, $z:expr, $order_hex:expr
    ) => {
        pub(super) mod $name {
            use ::$pkg::elliptic_curve::group::Group as GroupTrait;
            use ::$pkg::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
            use ::$pkg::elliptic_curve::{Field, PrimeField};
            use ::$pkg::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
            use num_bigint::BigInt;
            use once_cell::sync::Lazy;
            use rand::{CryptoRng, RngCore};

            use crate::errors::InternalError;
            use crate::hash_to_field::hash_to_field;

            pub(crate) const SCALAR_LENGTH: usize = $scalar_len;
            pub(crate) const ELEMENT_LENGTH: usize = 1 + $field_len;
            pub(crate) const H2C_SUITE: &str = $h2c;

            // `L` parameter of the hash-to-curve suite
            const L: usize = $l;

            static PARAMS: Lazy<super::SswuParams> =
                Lazy::new(|| super::SswuParams::new($p_hex, $b_hex, $z));
            static ORDER: Lazy<BigInt> = Lazy::new(|| super::hex_to_bigint($order_hex));

            pub(crate) fn identity() -> ProjectivePoint {
                <ProjectivePoint as GroupTrait>::identity()
            }

            pub(crate) fn base() -> ProjectivePoint {
                <ProjectivePoint as GroupTrait>::generator()
            }

            pub(crate) fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
                loop {
                    let scalar = <Scalar as Field>::random(&mut *rng);
                    if !bool::from(scalar.is_zero()) {
                        break scalar;
                    }
                }
            }

            pub(crate) fn hash_to_scalar(
                input: &[u8],
                dst: &[u8],
            ) -> Result<Scalar, InternalError> {
                let values = hash_to_field($hash, input, dst, 1, L, &ORDER)?;
                scalar_from_reduced(&values[0])
            }

            fn scalar_from_reduced(value: &BigInt) -> Result<Scalar, InternalError> {
                let bytes = super::bigint_to_fixed_bytes(value, SCALAR_LENGTH);
                let repr = FieldBytes::clone_from_slice(&bytes);
                Option::from(Scalar::from_repr(repr)).ok_or(InternalError::InvalidEncoding)
            }

            pub(crate) fn hash_to_group(
                input: &[u8],
                dst: &[u8],
            ) -> Result<ProjectivePoint, InternalError> {
                let u = hash_to_field($hash, input, dst, 2, L, &PARAMS.p)?;
                let q0 = map_to_point(&u[0])?;
                let q1 = map_to_point(&u[1])?;
                Ok(q0 + q1)
            }

            pub(crate) fn encode_to_group(
                input: &[u8],
                dst: &[u8],
            ) -> Result<ProjectivePoint, InternalError> {
                let u = hash_to_field($hash, input, dst, 1, L, &PARAMS.p)?;
                map_to_point(&u[0])
            }

            fn map_to_point(u: &BigInt) -> Result<ProjectivePoint, InternalError> {
                let (x, y) = super::map_to_curve_simple_swu(u, &PARAMS);
                let x_bytes = super::bigint_to_fixed_bytes(&x, $field_len);
                let y_bytes = super::bigint_to_fixed_bytes(&y, $field_len);
                let encoded = EncodedPoint::from_affine_coordinates(
                    FieldBytes::from_slice(&x_bytes),
                    FieldBytes::from_slice(&y_bytes),
                    false,
                );
                let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(
                    &encoded,
                ))
                .ok_or(InternalError::HashToCurveError)?;
                Ok(ProjectivePoint::from(affine))
            }

            pub(crate) fn deserialize_scalar(input: &[u8]) -> Result<Scalar, InternalError> {
                if input.len() != SCALAR_LENGTH {
                    return Err(InternalError::ShortBuffer);
                }
                let repr = FieldBytes::clone_from_slice(input);
                Option::from(Scalar::from_repr(repr)).ok_or(InternalError::InvalidEncoding)
            }

            pub(crate) fn deserialize_element(
                input: &[u8],
            ) -> Result<ProjectivePoint, InternalError> {
                if input.len() != ELEMENT_LENGTH {
                    return Err(InternalError::ShortBuffer);
                }
                // fixed-width all-zero string stands in for the SEC1
                // infinity encoding
                if input.iter().all(|&b| b == 0) {
                    return Ok(identity());
                }
                let encoded =
                    EncodedPoint::from_bytes(input).map_err(|_| InternalError::InvalidEncoding)?;
                let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(
                    &encoded,
                ))
                .ok_or(InternalError::InvalidEncoding)?;
                Ok(ProjectivePoint::from(affine))
            }

            pub(crate) fn encode(point: &ProjectivePoint) -> Vec<u8> {
                if bool::from(point.is_identity()) {
                    return vec![0u8; ELEMENT_LENGTH];
                }
                point.to_affine().to_encoded_point(true).as_bytes().to_vec()
            }
        }
    };
}

nist_backend!(
    p256_backend,
    p256,
    crate::hash::Hash::Sha256,
    48,
    32,
    32,
    "P256_XMD:SHA-256_SSWU_RO_",
    "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
    "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
    -10,
    "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"
);

nist_backend!(
    p384_backend,
    p384,
    crate::hash::Hash::Sha384,
    72,
    48,
    48,
    "P384_XMD:SHA-384_SSWU_RO_",
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
     ffffffff0000000000000000ffffffff",
    "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875a\
     c656398d8a2ed19d2a85c8edd3ec2aef",
    -12,
    "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf\
     581a0db248b0a77aecec196accc52973"
);

nist_backend!(
    p521_backend,
    p521,
    crate::hash::Hash::Sha512,
    98,
    66,
    66,
    "P521_XMD:SHA-512_SSWU_RO_",
    "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
     ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
     ffff",
    "0051953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef1\
     09e156193951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b50\
     3f00",
    -4,
    "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
     fffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e9138\
     6409"
);

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors taken from RFC 9380, Appendix J.1.1
    // (suite P256_XMD:SHA-256_SSWU_RO_). Expected values are the SEC1
    // compressed encodings of the published affine points.
    #[test]
    fn p256_hash_to_curve_suite_vectors() {
        let dst = b"QUUX-V01-CS02-with-P256_XMD:SHA-256_SSWU_RO_";
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

        // (msg, P.x, parity of P.y)
        let cases: &[(&[u8], &str, u8)] = &[
            (
                b"",
                "2c15230b26dbc6fc9a37051158c95b79656e17a1a920b11394ca91c44247d3e4",
                0x03, // y = ...c43e8415 is odd
            ),
            (
                b"abc",
                "0bb8b87485551aa43ed54f009230450b492fead5f1cc91658775dac4a3388a0f",
                0x02, // y = ...d424212e is even
            ),
            (
                b"abcdef0123456789",
                "65038ac8f2b1def042a5df0b33b1f4eca6bff7cb0f9c6c1526811864e544ed80",
                0x03, // y = ...f9b56ca3 is odd
            ),
            (
                &q128_msg,
                "4be61ee205094282ba8a2042bcb48d88dfbb609301c49aa8b078533dc65a0b5d",
                0x02, // y = ...bfb3c29e is even
            ),
            (
                &a512_msg,
                "457ae2981f70ca85d8e24c308b14db22f3e3862c5ea0f652ca38b5e49cd64bc5",
                0x02, // y = ...0f4757dc is even
            ),
        ];

        for (msg, x_hex, tag) in cases {
            let point = p256_backend::hash_to_group(msg, dst).unwrap();
            let encoded = p256_backend::encode(&point);
            assert_eq!(encoded[0], *tag);
            assert_eq!(hex::encode(&encoded[1..]), *x_hex);
        }
    }

    #[test]
    fn sswu_output_satisfies_curve_equation() {
        // y^2 = x^3 - 3x + b over each field
        for (p_hex, b_hex, z) in [
            (
                "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
                "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
                -10i64,
            ),
            (
                "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe\
                 ffffffff0000000000000000ffffffff",
                "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875a\
                 c656398d8a2ed19d2a85c8edd3ec2aef",
                -12,
            ),
        ] {
            let params = SswuParams::new(p_hex, b_hex, z);
            for seed in 1u64..20 {
                let u = BigInt::from(seed) * BigInt::from(seed) * BigInt::from(7919);
                let (x, y) = map_to_curve_simple_swu(&u, &params);
                let lhs = params.square(&y);
                let rhs = params.add(
                    &params.add(&params.pow(&x, &BigInt::from(3)), &params.mul(&params.a, &x)),
                    &params.b,
                );
                assert_eq!(lhs, rhs, "off-curve output for u derived from {seed}");
            }
        }
    }

    #[test]
    fn fixed_width_bigint_encoding() {
        let v = BigInt::from(0x0102u32);
        assert_eq!(bigint_to_fixed_bytes(&v, 4), vec![0, 0, 1, 2]);
        assert_eq!(bigint_to_fixed_bytes(&BigInt::from(0), 3), vec![0, 0, 0]);
    }
}
