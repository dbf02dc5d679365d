use crate::bindings::{cutensorGetErrorString, cutensorStatus_t};
use std::ffi::CStr;

/// A cuTENSOR call that returned anything but success.
#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
#[error("{call} failed with {status:?}: {message}")]
pub struct Error {
    pub call: &'static str,
    pub status: cutensorStatus_t,
    pub message: String,
}

impl Error {
    pub(crate) fn check(status: cutensorStatus_t, call: &'static str) -> Result<(), Self> {
        if status == cutensorStatus_t::CUTENSOR_STATUS_SUCCESS {
            return Ok(());
        }
        let message = unsafe { CStr::from_ptr(cutensorGetErrorString(status)) }
            .to_string_lossy()
            .into_owned();
        let call = call.split('(').next().unwrap_or(call).trim();
        log::debug!("{call} -> {status:?}");
        Err(Self {
            call,
            status,
            message,
        })
    }

    /// 调用前就能判定的非法参数，按 cuTENSOR 的惯例记为 `INVALID_VALUE`。
    pub(crate) fn invalid(call: &'static str, message: String) -> Self {
        Self {
            call,
            status: cutensorStatus_t::CUTENSOR_STATUS_INVALID_VALUE,
            message,
        }
    }
}

#[test]
fn test_check() {
    assert_eq!(
        Error::check(cutensorStatus_t::CUTENSOR_STATUS_SUCCESS, "cutensorCreate(&mut h)"),
        Ok(())
    );

    let err = Error::check(
        cutensorStatus_t::CUTENSOR_STATUS_INVALID_VALUE,
        "cutensorCreate(&mut handle)",
    )
    .unwrap_err();
    assert_eq!(err.call, "cutensorCreate");
    assert_eq!(err.status, cutensorStatus_t::CUTENSOR_STATUS_INVALID_VALUE);
    assert!(!err.message.is_empty());
    assert!(err.to_string().starts_with("cutensorCreate failed with"));
}

#[test]
fn test_invalid() {
    let err = Error::invalid("cutensorContract", "C holds 8 bytes, plan expects 24".into());
    assert_eq!(err.status, cutensorStatus_t::CUTENSOR_STATUS_INVALID_VALUE);
    assert_eq!(
        err.to_string(),
        "cutensorContract failed with CUTENSOR_STATUS_INVALID_VALUE: C holds 8 bytes, plan expects 24"
    );
}
