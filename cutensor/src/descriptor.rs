use crate::{Cutensor, DEVICE_ALIGNMENT, Element, Error, bindings::cutensorTensorDescriptor_t};
use cuda::AsRaw;
use std::{marker::PhantomData, ptr::null_mut};

/// Extents and element strides of a dense tensor, outermost mode first.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TensorLayout {
    extents: Vec<i64>,
    strides: Vec<i64>,
}

impl TensorLayout {
    /// Packed layout where the last mode is contiguous.
    pub fn row_major(extents: &[usize]) -> Self {
        let extents = extents.iter().map(|&d| d as i64).collect::<Vec<_>>();
        let mut strides = vec![1; extents.len()];
        for i in (1..extents.len()).rev() {
            strides[i - 1] = strides[i] * extents[i];
        }
        Self { extents, strides }
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.extents.len()
    }

    #[inline]
    pub fn extents(&self) -> &[i64] {
        &self.extents
    }

    #[inline]
    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    /// Number of elements covered, gaps included.
    pub fn span(&self) -> usize {
        if self.extents.contains(&0) {
            return 0;
        }
        self.extents
            .iter()
            .zip(&self.strides)
            .map(|(&d, &s)| (d - 1) * s)
            .sum::<i64>() as usize
            + 1
    }
}

pub struct TensorDescriptor<'h, T> {
    raw: cutensorTensorDescriptor_t,
    ndim: usize,
    bytes: usize,
    _phantom: PhantomData<(&'h (), T)>,
}

impl<'h, T: Element> TensorDescriptor<'h, T> {
    pub fn new(handle: &'h Cutensor, layout: &TensorLayout) -> Result<Self, Error> {
        let mut raw = null_mut();
        cutensor!(cutensorCreateTensorDescriptor(
            handle.as_raw(),
            &mut raw,
            layout.ndim() as _,
            layout.extents().as_ptr(),
            layout.strides().as_ptr(),
            T::DATA_TYPE,
            DEVICE_ALIGNMENT,
        ))?;
        Ok(Self {
            raw,
            ndim: layout.ndim(),
            bytes: layout.span() * size_of::<T>(),
            _phantom: PhantomData,
        })
    }
}

impl<T> TensorDescriptor<'_, T> {
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// 张量覆盖的显存字节数。
    #[inline]
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl<T> Drop for TensorDescriptor<'_, T> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = cutensor!(cutensorDestroyTensorDescriptor(self.raw)) {
            log::warn!("{e}")
        }
    }
}

impl<T> AsRaw for TensorDescriptor<'_, T> {
    type Raw = cutensorTensorDescriptor_t;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

#[test]
fn test_row_major() {
    let layout = TensorLayout::row_major(&[96, 64]);
    assert_eq!(layout.extents(), [96, 64]);
    assert_eq!(layout.strides(), [64, 1]);
    assert_eq!(layout.span(), 96 * 64);

    let layout = TensorLayout::row_major(&[2, 3, 4]);
    assert_eq!(layout.strides(), [12, 4, 1]);
    assert_eq!(layout.span(), 24);

    assert_eq!(TensorLayout::row_major(&[3, 0]).span(), 0);
}

#[test]
fn test_descriptor() {
    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    cuda::Device::new(0).retain_primary().apply(|ctx| {
        let handle = Cutensor::new(ctx).unwrap();
        let desc =
            TensorDescriptor::<f32>::new(&handle, &TensorLayout::row_major(&[96, 128])).unwrap();
        assert_eq!(desc.ndim(), 2);
        assert_eq!(desc.bytes(), 96 * 128 * 4);
    })
}
