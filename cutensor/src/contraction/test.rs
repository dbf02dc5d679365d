use crate::{Contraction, Cutensor, Element, Plan, TensorDescriptor, TensorLayout};
use cuda::{CurrentCtx, Device};

/// 在新建的流上收缩 `A[modes_a] · B[modes_b] -> C[modes_c]`，返回 `C`。
fn contract<T: Element + Default>(
    ctx: &CurrentCtx,
    (a, shape_a, modes_a): (&[T], &[usize], &[char]),
    (b, shape_b, modes_b): (&[T], &[usize], &[char]),
    (c, shape_c, modes_c): (&[T], &[usize], &[char]),
    alpha: f64,
    beta: f64,
) -> Vec<T> {
    let stream = ctx.stream();
    let dev_a = ctx.from_host(a);
    let dev_b = ctx.from_host(b);
    let mut dev_c = ctx.from_host(c);

    let handle = Cutensor::new(ctx).unwrap();
    let desc_a = TensorDescriptor::<T>::new(&handle, &TensorLayout::row_major(shape_a)).unwrap();
    let desc_b = TensorDescriptor::<T>::new(&handle, &TensorLayout::row_major(shape_b)).unwrap();
    let desc_c = TensorDescriptor::<T>::new(&handle, &TensorLayout::row_major(shape_c)).unwrap();
    let op = Contraction::new(
        &handle,
        (&desc_a, modes_a),
        (&desc_b, modes_b),
        (&desc_c, modes_c),
    )
    .unwrap();
    let plan = Plan::new(&handle, &op).unwrap();
    let mut workspace =
        (plan.workspace_size() > 0).then(|| ctx.malloc::<u8>(plan.workspace_size()));

    handle
        .contract(
            &plan,
            alpha,
            &dev_a,
            &dev_b,
            beta,
            &mut dev_c,
            workspace.as_mut(),
            &stream,
        )
        .unwrap();

    let mut ans = vec![T::default(); c.len()];
    stream.memcpy_d2h(&mut ans, &dev_c);
    stream.synchronize();
    ans
}

#[test]
fn test_matmul() {
    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    Device::new(0).retain_primary().apply(|ctx| {
        // |10 10|    |1 1 1 1|   |1 1|
        // |20 20| <- |2 2 2 2| · |2 2|
        // |30 30|    |3 3 3 3|   |3 3|
        //                        |4 4|
        let a: [f32; 12] = std::array::from_fn(|i| (i / 4 + 1) as _);
        let b: [f32; 8] = std::array::from_fn(|i| (i / 2 + 1) as _);
        let c = contract(
            ctx,
            (&a, &[3, 4], &['m', 'k']),
            (&b, &[4, 2], &['k', 'n']),
            (&[0.; 6], &[3, 2], &['m', 'n']),
            1.,
            0.,
        );
        assert_eq!(c, [10., 10., 20., 20., 30., 30.]);
    })
}

#[test]
fn test_accumulate() {
    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    Device::new(0).retain_primary().apply(|ctx| {
        // 2 · A · B + C，C 初始全为 1
        let a: [f32; 12] = std::array::from_fn(|i| (i / 4 + 1) as _);
        let b: [f32; 8] = std::array::from_fn(|i| (i / 2 + 1) as _);
        let c = contract(
            ctx,
            (&a, &[3, 4], &['m', 'k']),
            (&b, &[4, 2], &['k', 'n']),
            (&[1.; 6], &[3, 2], &['m', 'n']),
            2.,
            1.,
        );
        assert_eq!(c, [21., 21., 41., 41., 61., 61.]);
    })
}

#[test]
fn test_transposed_operand() {
    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    Device::new(0).retain_primary().apply(|ctx| {
        // B 按 (n, k) 存储，只需要交换模式标记
        // |1 2 3 4|
        // |1 2 3 4|
        let a: [f64; 12] = std::array::from_fn(|i| (i / 4 + 1) as _);
        let b: [f64; 8] = std::array::from_fn(|i| (i % 4 + 1) as _);
        let c = contract(
            ctx,
            (&a, &[3, 4], &['m', 'k']),
            (&b, &[2, 4], &['n', 'k']),
            (&[0.; 6], &[3, 2], &['m', 'n']),
            1.,
            0.,
        );
        assert_eq!(c, [10., 10., 20., 20., 30., 30.]);
    })
}

#[test]
fn test_size_mismatch() {
    use crate::bindings::cutensorStatus_t::CUTENSOR_STATUS_INVALID_VALUE;

    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    Device::new(0).retain_primary().apply(|ctx| {
        let stream = ctx.stream();
        let handle = Cutensor::new(ctx).unwrap();
        let desc_a =
            TensorDescriptor::<f32>::new(&handle, &TensorLayout::row_major(&[3, 4])).unwrap();
        let desc_b =
            TensorDescriptor::<f32>::new(&handle, &TensorLayout::row_major(&[4, 2])).unwrap();
        let desc_c =
            TensorDescriptor::<f32>::new(&handle, &TensorLayout::row_major(&[3, 2])).unwrap();
        let op = Contraction::new(
            &handle,
            (&desc_a, &['m', 'k']),
            (&desc_b, &['k', 'n']),
            (&desc_c, &['m', 'n']),
        )
        .unwrap();
        let plan = Plan::new(&handle, &op).unwrap();

        let a = ctx.malloc::<f32>(12);
        let b = ctx.malloc::<f32>(8);
        // C 少一行
        let mut c = ctx.malloc::<f32>(4);
        let mut workspace =
            (plan.workspace_size() > 0).then(|| ctx.malloc::<u8>(plan.workspace_size()));
        let err = handle
            .contract(&plan, 1., &a, &b, 0., &mut c, workspace.as_mut(), &stream)
            .unwrap_err();
        assert_eq!(err.status, CUTENSOR_STATUS_INVALID_VALUE);
        assert_eq!(err.message, "C holds 16 bytes, plan expects 24");

        if plan.workspace_size() > 0 {
            let mut c = ctx.malloc::<f32>(6);
            let err = handle
                .contract(&plan, 1., &a, &b, 0., &mut c, None, &stream)
                .unwrap_err();
            assert_eq!(err.status, CUTENSOR_STATUS_INVALID_VALUE);
            assert!(err.message.starts_with("workspace holds 0 bytes"));
        }
    })
}
