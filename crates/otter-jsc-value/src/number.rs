//! ECMA-262 integer conversions on raw IEEE-754 bits.

/// ES5 §9.5 ToInt32.
///
/// Rounds towards zero, then keeps the 32 least significant bits of the
/// result in two's-complement. Works directly on the bit pattern, so no
/// float arithmetic or saturating casts are involved.
pub fn to_int32(number: f64) -> i32 {
    let bits = number.to_bits() as i64;
    let exp = ((bits >> 52) & 0x7ff) as i32 - 0x3ff;

    // exp < 0: nothing left of the binary point (±0, subnormals, |x| < 1).
    // exp > 83: the 52-bit mantissa sits entirely above bit 31.
    // Infinity and NaN have exp == 0x400 and land here as well.
    if !(0..=83).contains(&exp) {
        return 0;
    }

    // Align the mantissa so its 2^0 place lands on bit 0
    let mut result = if exp > 52 {
        (bits << (exp - 52)) as i32
    } else {
        (bits >> (52 - exp)) as i32
    };

    // Below 2^32 the implicit leading one is inside the result, and the
    // shift may have dragged exponent/sign bits in above it.
    if exp < 32 {
        let missing_one = 1i32 << exp;
        result &= missing_one.wrapping_sub(1);
        result = result.wrapping_add(missing_one);
    }

    if bits < 0 {
        result.wrapping_neg()
    } else {
        result
    }
}

/// ES5 §9.6 ToUint32. Same bits as [`to_int32`], read as unsigned.
pub fn to_uint32(number: f64) -> u32 {
    to_int32(number) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TWO_31: f64 = 2147483648.0;
    const TWO_32: f64 = 4294967296.0;

    /// Straight transcription of the §9.5 steps in float arithmetic
    fn reference_to_int32(number: f64) -> i32 {
        if !number.is_finite() {
            return 0;
        }
        let int32bit = number.trunc().rem_euclid(TWO_32);
        if int32bit >= TWO_31 {
            (int32bit - TWO_32) as i32
        } else {
            int32bit as i32
        }
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(to_int32(4294967297.0), 1);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(-1.5), -1);
    }

    #[test]
    fn test_zero_infinity_nan() {
        assert_eq!(to_int32(0.0), 0);
        assert_eq!(to_int32(-0.0), 0);
        assert_eq!(to_int32(f64::INFINITY), 0);
        assert_eq!(to_int32(f64::NEG_INFINITY), 0);
        assert_eq!(to_int32(-f64::NAN), 0);
    }

    #[test]
    fn test_subnormals_and_fractions() {
        assert_eq!(to_int32(f64::from_bits(1)), 0);
        assert_eq!(to_int32(f64::MIN_POSITIVE / 2.0), 0);
        assert_eq!(to_int32(0.999_999), 0);
        assert_eq!(to_int32(-0.5), 0);
        assert_eq!(to_int32(1.0), 1);
        assert_eq!(to_int32(2.75), 2);
    }

    #[test]
    fn test_wraparound_boundaries() {
        assert_eq!(to_int32(TWO_31 - 1.0), i32::MAX);
        assert_eq!(to_int32(TWO_31), i32::MIN);
        assert_eq!(to_int32(-TWO_31), i32::MIN);
        assert_eq!(to_int32(-TWO_31 - 1.0), i32::MAX);
        assert_eq!(to_int32(TWO_32), 0);
        assert_eq!(to_int32(TWO_32 - 1.0), -1);
        assert_eq!(to_int32(-TWO_32 - 3.0), -3);
    }

    #[test]
    fn test_large_exponents() {
        // 2^53 + 2: mantissa already integral, exp == 53
        assert_eq!(to_int32(9007199254740994.0), 2);
        // (2^52 + 1) * 2^31: the lowest mantissa bit lands on bit 31
        assert_eq!(to_int32(4503599627370497.0 * TWO_31), i32::MIN);
        // exp == 84 leaves nothing in the low word
        assert_eq!(to_int32(4503599627370497.0 * TWO_32), 0);
        assert_eq!(to_int32(1e300), 0);
        assert_eq!(to_int32(f64::MAX), 0);
        assert_eq!(to_int32(f64::MIN), 0);
    }

    #[test]
    fn test_to_uint32() {
        assert_eq!(to_uint32(-1.0), u32::MAX);
        assert_eq!(to_uint32(TWO_31), 2147483648);
        assert_eq!(to_uint32(TWO_32 + 5.0), 5);
        assert_eq!(to_uint32(f64::NAN), 0);
    }

    #[test]
    fn test_matches_reference_on_edge_set() {
        let edges = [
            0.0,
            -0.0,
            0.5,
            -0.5,
            1.0,
            -1.0,
            TWO_31,
            -TWO_31,
            TWO_32,
            -TWO_32,
            TWO_32 + 0.5,
            9007199254740991.0,
            -9007199254740991.0,
            1.8446744073709552e19,
            f64::EPSILON,
            f64::MIN_POSITIVE,
            f64::MAX,
            f64::MIN,
        ];
        for n in edges {
            assert_eq!(to_int32(n), reference_to_int32(n), "ToInt32({n:e})");
        }
    }

    proptest! {
        #[test]
        fn prop_matches_reference_on_any_bit_pattern(bits in any::<u64>()) {
            let n = f64::from_bits(bits);
            prop_assert_eq!(to_int32(n), reference_to_int32(n));
        }

        #[test]
        fn prop_matches_reference_near_int_range(n in -1.0e12f64..1.0e12f64) {
            prop_assert_eq!(to_int32(n), reference_to_int32(n));
        }

        #[test]
        fn prop_matches_reference_by_exponent(
            exp in 0u64..=90,
            mantissa in 0u64..(1u64 << 52),
            negative in any::<bool>(),
        ) {
            let bits = ((negative as u64) << 63) | ((exp + 0x3ff) << 52) | mantissa;
            let n = f64::from_bits(bits);
            prop_assert_eq!(to_int32(n), reference_to_int32(n));
        }

        #[test]
        fn prop_int32_values_round_trip(i in any::<i32>()) {
            prop_assert_eq!(to_int32(i as f64), i);
            prop_assert_eq!(to_uint32(i as f64), i as u32);
        }
    }
}
