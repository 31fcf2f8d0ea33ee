use alloy::primitives::U256;
use fastnum::{
    UD256, bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Decimals of the native currency (FLR, SGB, C2FLR).
pub const NATIVE_DECIMALS: u8 = 18;

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    /// Converter for amounts of the native currency expressed in wei.
    pub fn native() -> Self {
        Self::new(NATIVE_DECIMALS)
    }

    pub fn from_unsigned(&self, value: U256) -> UD256 {
        // U256 always fits into the 256 bit mantissa
        let unscaled = bint::UInt::<4>::from_le_slice(value.as_le_slice()).unwrap_or_default();
        UnsignedDecimal::<4>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    pub fn to_unsigned(&self, value: UD256) -> U256 {
        let rescaled = value.rescale(self.decimals as i16);
        U256::from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
    }

    /// Exact conversion, `None` if `value` is not finite, has more
    /// fractional digits than the converter keeps or exceeds [`U256::MAX`].
    pub fn try_to_unsigned(&self, value: UD256) -> Option<U256> {
        if !value.is_finite() {
            return None;
        }
        let value = value.reduce();
        if value.fractional_digits_count() > self.decimals as i16
            || value > self.from_unsigned(U256::MAX)
        {
            return None;
        }
        Some(self.to_unsigned(value))
    }
}
