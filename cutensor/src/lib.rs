#![cfg(cutensor)]

#[macro_use]
#[allow(unused, non_upper_case_globals, non_camel_case_types, non_snake_case)]
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

    macro_rules! cutensor {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe, clippy::macro_metavars_in_unsafe)]
            let status = unsafe { $f };
            $crate::Error::check(status, stringify!($f))
        }};
    }
}

mod contraction;
mod descriptor;
mod element;
mod error;
mod handle;

pub use contraction::{Contraction, Plan};
pub use descriptor::{TensorDescriptor, TensorLayout};
pub use element::Element;
pub use error::Error;
pub use handle::Cutensor;

/// `cuMemAlloc` 返回的地址至少按 256 字节对齐。
pub const DEVICE_ALIGNMENT: u32 = 256;
