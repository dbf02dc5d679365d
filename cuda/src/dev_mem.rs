use crate::{AsRaw, CurrentCtx, Stream, bindings as cuda};
use std::{
    alloc::Layout,
    ffi::c_void,
    marker::PhantomData,
    mem::size_of_val,
};

/// 一段显存，生命周期不超过分配它的上下文。
#[derive(Debug)]
pub struct DevMem<'ctx> {
    ptr: cuda::CUdeviceptr,
    len: usize,
    _ctx: PhantomData<&'ctx CurrentCtx>,
}

impl CurrentCtx {
    pub fn malloc<T: Copy>(&self, len: usize) -> DevMem<'_> {
        let len = Layout::array::<T>(len).unwrap().size();
        let mut ptr = 0;
        driver!(cuMemAlloc_v2(&mut ptr, len));
        DevMem {
            ptr,
            len,
            _ctx: PhantomData,
        }
    }

    pub fn from_host<T: Copy>(&self, slice: &[T]) -> DevMem<'_> {
        let ans = self.malloc::<T>(slice.len());
        driver!(cuMemcpyHtoD_v2(ans.ptr, slice.as_ptr().cast(), ans.len));
        ans
    }
}

impl Drop for DevMem<'_> {
    #[inline]
    fn drop(&mut self) {
        driver!(cuMemFree_v2(self.ptr));
    }
}

impl AsRaw for DevMem<'_> {
    type Raw = cuda::CUdeviceptr;

    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ptr
    }
}

impl DevMem<'_> {
    /// 字节数。
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const c_void {
        self.ptr as _
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        self.ptr as _
    }
}

impl Stream<'_> {
    /// 异步拷贝到显存。
    pub fn memcpy_h2d<T: Copy>(&self, dst: &mut DevMem, src: &[T]) {
        let len = size_of_val(src);
        assert_eq!(len, dst.len);
        driver!(cuMemcpyHtoDAsync_v2(
            dst.ptr,
            src.as_ptr().cast(),
            len,
            self.as_raw()
        ));
    }

    /// 异步拷贝回内存，读 `dst` 前必须同步流。
    pub fn memcpy_d2h<T: Copy>(&self, dst: &mut [T], src: &DevMem) {
        let len = size_of_val(dst);
        assert_eq!(len, src.len);
        driver!(cuMemcpyDtoHAsync_v2(
            dst.as_mut_ptr().cast(),
            src.ptr,
            len,
            self.as_raw()
        ));
    }

    #[inline]
    pub fn memset0(&self, dst: &mut DevMem) {
        driver!(cuMemsetD8Async(dst.ptr, 0, dst.len, self.as_raw()));
    }
}

#[test]
fn test_copy() {
    use rand::Rng;

    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    crate::Device::new(0).retain_primary().apply(|ctx| {
        let mut rng = rand::rng();
        let host = (0..1024)
            .map(|_| rng.random_range(-1.0f32..1.0))
            .collect::<Vec<_>>();

        let stream = ctx.stream();
        let mut dev = ctx.malloc::<f32>(host.len());
        assert_eq!(dev.len(), size_of_val(&*host));
        assert!(!dev.is_empty());
        stream.memcpy_h2d(&mut dev, &host);

        let mut back = vec![0.0f32; host.len()];
        stream.memcpy_d2h(&mut back, &dev);
        stream.synchronize();
        assert_eq!(back, host);

        stream.memset0(&mut dev);
        stream.memcpy_d2h(&mut back, &dev);
        stream.synchronize();
        assert!(back.iter().all(|&x| x == 0.));

        let dev = ctx.from_host(&host);
        stream.memcpy_d2h(&mut back, &dev);
        stream.synchronize();
        assert_eq!(back, host);
    })
}
