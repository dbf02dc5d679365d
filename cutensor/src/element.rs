use crate::bindings::{
    CUTENSOR_COMPUTE_DESC_32F, CUTENSOR_COMPUTE_DESC_64F, cutensorComputeDescriptor_t,
    cutensorDataType_t,
};
use half::{bf16, f16};

/// Host element types cuTENSOR can contract.
pub trait Element: Copy + 'static {
    /// Type of `alpha` and `beta`, fixed by the compute descriptor.
    type Scalar: Copy;

    const DATA_TYPE: cutensorDataType_t;

    fn compute_desc() -> cutensorComputeDescriptor_t;

    fn scalar(value: f64) -> Self::Scalar;
}

macro_rules! impl_element {
    ($ty:ty => $data:ident; $compute:ident, $scalar:ty) => {
        impl Element for $ty {
            type Scalar = $scalar;

            const DATA_TYPE: cutensorDataType_t = cutensorDataType_t::$data;

            #[inline]
            fn compute_desc() -> cutensorComputeDescriptor_t {
                unsafe { $compute }
            }

            #[inline]
            fn scalar(value: f64) -> Self::Scalar {
                value as _
            }
        }
    };
}

// 半精度数据在 32 位下累加
impl_element!( f16 => CUTENSOR_R_16F ; CUTENSOR_COMPUTE_DESC_32F, f32);
impl_element!(bf16 => CUTENSOR_R_16BF; CUTENSOR_COMPUTE_DESC_32F, f32);
impl_element!( f32 => CUTENSOR_R_32F ; CUTENSOR_COMPUTE_DESC_32F, f32);
impl_element!( f64 => CUTENSOR_R_64F ; CUTENSOR_COMPUTE_DESC_64F, f64);

#[test]
fn test_scalar() {
    assert_eq!(<f16 as Element>::scalar(0.5), 0.5f32);
    assert_eq!(<f32 as Element>::scalar(2.), 2f32);
    assert_eq!(<f64 as Element>::scalar(-1.25), -1.25f64);
    assert_eq!(<f32 as Element>::DATA_TYPE, cutensorDataType_t::CUTENSOR_R_32F);
}
