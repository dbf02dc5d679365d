use crate::{AsRaw, Device, bindings as cuda};
use std::ptr::null_mut;

/// 设备的主上下文。
#[derive(PartialEq, Eq, Hash, Debug)]
pub struct Context {
    ctx: cuda::CUcontext,
    dev: cuda::CUdevice,
}

impl Device {
    #[inline]
    pub fn retain_primary(&self) -> Context {
        let dev = unsafe { self.as_raw() };
        let mut ctx = null_mut();
        driver!(cuDevicePrimaryCtxRetain(&mut ctx, dev));
        Context { ctx, dev }
    }
}

impl Drop for Context {
    #[inline]
    fn drop(&mut self) {
        driver!(cuDevicePrimaryCtxRelease_v2(self.dev));
    }
}

impl AsRaw for Context {
    type Raw = cuda::CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ctx
    }
}

impl Context {
    /// 将上下文压栈，在闭包返回后出栈。
    #[inline]
    pub fn apply<T>(&self, f: impl FnOnce(&CurrentCtx) -> T) -> T {
        driver!(cuCtxPushCurrent_v2(self.ctx));
        let _guard = PopOnDrop(self.ctx);
        f(&CurrentCtx(self.ctx))
    }
}

struct PopOnDrop(cuda::CUcontext);

impl Drop for PopOnDrop {
    #[inline]
    fn drop(&mut self) {
        let mut top = null_mut();
        driver!(cuCtxPopCurrent_v2(&mut top));
        assert_eq!(top, self.0)
    }
}

/// 当前线程栈顶的上下文，依赖上下文的资源都从这里创建。
#[repr(transparent)]
pub struct CurrentCtx(cuda::CUcontext);

impl AsRaw for CurrentCtx {
    type Raw = cuda::CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl CurrentCtx {
    #[inline]
    pub fn dev(&self) -> Device {
        let mut dev = 0;
        driver!(cuCtxGetDevice(&mut dev));
        Device::from_raw(dev)
    }

    #[inline]
    pub fn synchronize(&self) {
        driver!(cuCtxSynchronize());
    }
}

#[test]
fn test_apply() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let ctx = Device::new(0).retain_primary();
    let raw = ctx.apply(|current| {
        let mut top = null_mut();
        driver!(cuCtxGetCurrent(&mut top));
        assert_eq!(top, unsafe { current.as_raw() });
        assert_eq!(unsafe { current.dev().as_raw() }, unsafe { Device::new(0).as_raw() });
        current.synchronize();
        top
    });
    assert_eq!(raw, unsafe { ctx.as_raw() });

    let mut top = null_mut();
    driver!(cuCtxGetCurrent(&mut top));
    assert!(top.is_null());
}
