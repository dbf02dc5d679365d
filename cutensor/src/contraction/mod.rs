use crate::{
    Cutensor, Element, Error, TensorDescriptor,
    bindings::{cutensorOperationDescriptor_t, cutensorPlanPreference_t, cutensorPlan_t},
};
use cuda::AsRaw;
use std::{ffi::c_void, marker::PhantomData, ptr::null_mut};

/// `D = alpha * A * B + beta * C` 的操作描述，`D` 与 `C` 共用描述符和缓冲区。
///
/// 模式用字符标记，`A` 和 `B` 共有而 `C` 没有的模式被收缩掉。
pub struct Contraction<'h, T> {
    raw: cutensorOperationDescriptor_t,
    sizes: [usize; 3],
    _phantom: PhantomData<(&'h (), T)>,
}

impl<'h, T: Element> Contraction<'h, T> {
    pub fn new(
        handle: &'h Cutensor,
        (a, modes_a): (&TensorDescriptor<'h, T>, &[char]),
        (b, modes_b): (&TensorDescriptor<'h, T>, &[char]),
        (c, modes_c): (&TensorDescriptor<'h, T>, &[char]),
    ) -> Result<Self, Error> {
        let modes_a = modes(a, modes_a);
        let modes_b = modes(b, modes_b);
        let modes_c = modes(c, modes_c);

        let mut raw = null_mut();
        cutensor!(cutensorCreateContraction(
            handle.as_raw(),
            &mut raw,
            a.as_raw(),
            modes_a.as_ptr(),
            cutensorOperator_t::CUTENSOR_OP_IDENTITY,
            b.as_raw(),
            modes_b.as_ptr(),
            cutensorOperator_t::CUTENSOR_OP_IDENTITY,
            c.as_raw(),
            modes_c.as_ptr(),
            cutensorOperator_t::CUTENSOR_OP_IDENTITY,
            c.as_raw(),
            modes_c.as_ptr(),
            T::compute_desc(),
        ))?;
        Ok(Self {
            raw,
            sizes: [a.bytes(), b.bytes(), c.bytes()],
            _phantom: PhantomData,
        })
    }
}

fn modes<T>(desc: &TensorDescriptor<T>, modes: &[char]) -> Vec<i32> {
    assert_eq!(desc.ndim(), modes.len(), "one mode per tensor dimension");
    modes.iter().map(|&c| c as i32).collect()
}

impl<T> Drop for Contraction<'_, T> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = cutensor!(cutensorDestroyOperationDescriptor(self.raw)) {
            log::warn!("{e}")
        }
    }
}

impl<T> AsRaw for Contraction<'_, T> {
    type Raw = cutensorOperationDescriptor_t;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

/// 为一个收缩选定的内核与工作空间。
pub struct Plan<'h, T> {
    raw: cutensorPlan_t,
    workspace_size: usize,
    sizes: [usize; 3],
    _phantom: PhantomData<(&'h (), T)>,
}

struct PlanPreference(cutensorPlanPreference_t);

impl Drop for PlanPreference {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = cutensor!(cutensorDestroyPlanPreference(self.0)) {
            log::warn!("{e}")
        }
    }
}

impl<'h, T: Element> Plan<'h, T> {
    /// 默认算法，工作空间上限取默认偏好下的估计值。
    pub fn new(handle: &'h Cutensor, op: &Contraction<'h, T>) -> Result<Self, Error> {
        let handle = unsafe { handle.as_raw() };

        let mut pref = null_mut();
        cutensor!(cutensorCreatePlanPreference(
            handle,
            &mut pref,
            cutensorAlgo_t::CUTENSOR_ALGO_DEFAULT,
            cutensorJitMode_t::CUTENSOR_JIT_MODE_NONE,
        ))?;
        let pref = PlanPreference(pref);

        let mut estimate = 0u64;
        cutensor!(cutensorEstimateWorkspaceSize(
            handle,
            op.raw,
            pref.0,
            cutensorWorksizePreference_t::CUTENSOR_WORKSPACE_DEFAULT,
            &mut estimate,
        ))?;

        let mut raw = null_mut();
        cutensor!(cutensorCreatePlan(handle, &mut raw, op.raw, pref.0, estimate))?;
        let mut plan = Self {
            raw,
            workspace_size: estimate as _,
            sizes: op.sizes,
            _phantom: PhantomData,
        };

        // 实际需要的工作空间可能小于估计值
        let mut required = 0u64;
        cutensor!(cutensorPlanGetAttribute(
            handle,
            plan.raw,
            cutensorPlanAttribute_t::CUTENSOR_PLAN_REQUIRED_WORKSPACE,
            (&raw mut required).cast::<c_void>(),
            size_of::<u64>(),
        ))?;
        plan.workspace_size = required as _;
        log::debug!("contraction plan: workspace {required} of {estimate} estimated bytes");
        Ok(plan)
    }
}

impl<T> Plan<'_, T> {
    /// 执行计划所需的工作空间字节数，可能为 0。
    #[inline]
    pub fn workspace_size(&self) -> usize {
        self.workspace_size
    }

    #[inline]
    pub(crate) fn operand_sizes(&self) -> [usize; 3] {
        self.sizes
    }
}

impl<T> Drop for Plan<'_, T> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = cutensor!(cutensorDestroyPlan(self.raw)) {
            log::warn!("{e}")
        }
    }
}

impl<T> AsRaw for Plan<'_, T> {
    type Raw = cutensorPlan_t;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.raw
    }
}

#[cfg(test)]
mod test;
