use crate::{AsRaw, Stream, bindings as cuda};
use std::{ptr::null_mut, time::Duration};

#[repr(transparent)]
pub struct Event(cuda::CUevent);

impl Drop for Event {
    #[inline]
    fn drop(&mut self) {
        driver!(cuEventDestroy_v2(self.0));
    }
}

impl Stream<'_> {
    /// 在流上记录一个事件，用于计时。
    pub fn record(&self) -> Event {
        let mut event = null_mut();
        driver!(cuEventCreate(&mut event, CUevent_flags::CU_EVENT_DEFAULT as _));
        driver!(cuEventRecord(event, self.as_raw()));
        Event(event)
    }
}

impl Event {
    #[inline]
    pub fn synchronize(&self) {
        driver!(cuEventSynchronize(self.0));
    }

    /// 两个事件都必须已经完成。
    pub fn elapse_from(&self, start: &Self) -> Duration {
        let mut ms = 0.0;
        driver!(cuEventElapsedTime(&mut ms, start.0, self.0));
        Duration::from_secs_f32(ms / 1000.0)
    }
}

#[test]
fn test_elapse() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    crate::Device::new(0).retain_primary().apply(|ctx| {
        let stream = ctx.stream();
        let start = stream.record();
        let end = stream.record();
        end.synchronize();
        assert!(end.elapse_from(&start) >= Duration::ZERO);
    })
}
