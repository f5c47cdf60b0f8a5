//! sRGB decode table generated by build.rs.

include!(concat!(env!("OUT_DIR"), "/srgb_lut.rs"));

/// Linear-light value of an 8-bit sRGB code.
#[inline]
pub fn srgb_code_to_linear(code: u8) -> f32 {
    SRGB_TO_LINEAR[code as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_and_monotonic() {
        assert_eq!(srgb_code_to_linear(0), 0.0);
        assert!((srgb_code_to_linear(255) - 1.0).abs() < 1e-6);
        for code in 1..=255u8 {
            assert!(srgb_code_to_linear(code) > srgb_code_to_linear(code - 1));
        }
    }

    #[test]
    fn test_mid_gray() {
        // sRGB 188 sits just above 50% linear light
        let v = srgb_code_to_linear(188);
        assert!((v - 0.5029).abs() < 1e-3, "got {v}");
    }
}
