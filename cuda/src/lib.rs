#![cfg(nvidia)]

#[macro_use]
#[allow(unused, non_upper_case_globals, non_camel_case_types, non_snake_case)]
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

    #[macro_export]
    macro_rules! driver {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe, clippy::macro_metavars_in_unsafe)]
            let err = unsafe { $f };
            assert_eq!(err, CUresult::CUDA_SUCCESS, "{}", stringify!($f));
        }};
    }
}

mod context;
mod dev_mem;
mod device;
mod event;
mod stream;

pub trait AsRaw {
    type Raw;

    /// # Safety
    ///
    /// The caller must ensure that the returned item is dropped before the original item.
    unsafe fn as_raw(&self) -> Self::Raw;
}

/// 驱动报告没有可用设备。
#[derive(thiserror::Error, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[error("no CUDA device available")]
pub struct NoDevice;

/// 初始化驱动。其他错误视为环境损坏，直接终止。
pub fn init() -> Result<(), NoDevice> {
    use bindings::{CUresult, cuInit};
    match unsafe { cuInit(0) } {
        CUresult::CUDA_SUCCESS => Ok(()),
        CUresult::CUDA_ERROR_NO_DEVICE => Err(NoDevice),
        err => panic!("cuInit(0) failed: {err:?}"),
    }
}

pub use context::{Context, CurrentCtx};
pub use dev_mem::DevMem;
pub use device::{ComputeCapability, Device};
pub use event::Event;
pub use stream::Stream;
