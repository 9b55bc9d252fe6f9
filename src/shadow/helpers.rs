//! Bit-range math for fields packed into 32-bit method registers.
//!
//! These helpers are useful when implementing custom channels or decoders that
//! need to reason about the same `[high:low]` ranges a [`Method`](crate::shadow::Method)
//! describes.

use crate::shadow::ShadowError;

/// Validates an inclusive bit range within a 32-bit register.
///
/// # Errors
/// * [`ShadowError::InvalidBitRange`] - if `low > high` or `high > 31`
pub fn check_range(high: u8, low: u8) -> Result<(), ShadowError> {
    if low > high || high > 31 {
        return Err(ShadowError::InvalidBitRange { high, low });
    }
    Ok(())
}

/// Returns the in-place mask for bits `[high:low]`.
///
/// The range must already satisfy [`check_range`].
///
/// # Example
/// ```
/// use method_shadow::shadow::helpers::field_mask;
///
/// assert_eq!(field_mask(7, 4), 0x0000_00F0);
/// assert_eq!(field_mask(31, 0), 0xFFFF_FFFF);
/// assert_eq!(field_mask(31, 31), 0x8000_0000);
/// ```
pub const fn field_mask(high: u8, low: u8) -> u32 {
    let width = (high - low + 1) as u32;
    let ones = if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    };
    ones << (low as u32)
}

/// Replaces the masked bits of `current` with `value` shifted into place.
///
/// Bits of `value` that do not fit the field are dropped.
///
/// # Example
/// ```
/// use method_shadow::shadow::helpers::{field_mask, insert_field};
///
/// let mask = field_mask(7, 4);
/// assert_eq!(insert_field(0xFFFF_FF0F, mask, 4, 0xA), 0xFFFF_FFAF);
/// assert_eq!(insert_field(0, mask, 4, 0x1F), 0xF0);
/// ```
pub const fn insert_field(current: u32, mask: u32, shift: u8, value: u32) -> u32 {
    (current & !mask) | ((value << (shift as u32)) & mask)
}

/// Extracts the masked bits of `register` shifted down to bit 0.
pub const fn extract_field(register: u32, mask: u32, shift: u8) -> u32 {
    (register & mask) >> (shift as u32)
}

#[test]
fn bit_range_edge_cases() {
    // Inverted range
    assert_eq!(
        check_range(3, 4),
        Err(ShadowError::InvalidBitRange { high: 3, low: 4 })
    );

    // Past the register
    assert_eq!(
        check_range(32, 0),
        Err(ShadowError::InvalidBitRange { high: 32, low: 0 })
    );

    // Single bit
    assert_eq!(check_range(0, 0), Ok(()));
    assert_eq!(field_mask(0, 0), 0x1);

    // Full register keeps every bit on insert
    assert_eq!(insert_field(0x1234_5678, u32::MAX, 0, 0xCAFE_F00D), 0xCAFE_F00D);

    // Top bit round-trips
    let mask = field_mask(31, 31);
    assert_eq!(extract_field(insert_field(0, mask, 31, 1), mask, 31), 1);
}
