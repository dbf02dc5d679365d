use crate::{Element, Error, Plan, bindings::cutensorHandle_t};
use cuda::{AsRaw, CurrentCtx, DevMem, Stream};
use std::{marker::PhantomData, ptr::null_mut};

/// cuTENSOR 库句柄，绑定在创建它的上下文上。
pub struct Cutensor<'ctx>(cutensorHandle_t, PhantomData<&'ctx CurrentCtx>);

impl Drop for Cutensor<'_> {
    #[inline]
    fn drop(&mut self) {
        if let Err(e) = cutensor!(cutensorDestroy(self.0)) {
            log::warn!("{e}")
        }
    }
}

impl AsRaw for Cutensor<'_> {
    type Raw = cutensorHandle_t;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl<'ctx> Cutensor<'ctx> {
    #[inline]
    pub fn new(_ctx: &'ctx CurrentCtx) -> Result<Self, Error> {
        let mut handle = null_mut();
        cutensor!(cutensorCreate(&mut handle))?;
        Ok(Self(handle, PhantomData))
    }

    /// 在 `stream` 上执行 `C = alpha * A * B + beta * C`。
    ///
    /// 缓冲区大小按描述符检查，`workspace` 不能小于 [`Plan::workspace_size`]，
    /// 不满足时返回 `CUTENSOR_STATUS_INVALID_VALUE`，不会发起调用。
    #[allow(clippy::too_many_arguments)]
    pub fn contract<T: Element>(
        &self,
        plan: &Plan<'_, T>,
        alpha: f64,
        a: &DevMem,
        b: &DevMem,
        beta: f64,
        c: &mut DevMem,
        workspace: Option<&mut DevMem>,
        stream: &Stream,
    ) -> Result<(), Error> {
        let [a_len, b_len, c_len] = plan.operand_sizes();
        for (name, len, expected) in [
            ("A", a.len(), a_len),
            ("B", b.len(), b_len),
            ("C", c.len(), c_len),
        ] {
            if len != expected {
                return Err(Error::invalid(
                    "cutensorContract",
                    format!("{name} holds {len} bytes, plan expects {expected}"),
                ));
            }
        }

        let (workspace, workspace_size) = match workspace {
            Some(mem) => (mem.as_mut_ptr(), mem.len()),
            None => (null_mut(), 0),
        };
        if workspace_size < plan.workspace_size() {
            return Err(Error::invalid(
                "cutensorContract",
                format!(
                    "workspace holds {workspace_size} bytes, plan requires {}",
                    plan.workspace_size()
                ),
            ));
        }

        let alpha = T::scalar(alpha);
        let beta = T::scalar(beta);
        let c = c.as_mut_ptr();
        cutensor!(cutensorContract(
            self.0,
            plan.as_raw(),
            (&raw const alpha).cast(),
            a.as_ptr(),
            b.as_ptr(),
            (&raw const beta).cast(),
            c,
            c,
            workspace,
            workspace_size as _,
            stream.as_raw().cast(),
        ))
    }
}
