use crate::matrix::Matrix;
use anyhow::{Context, Result, ensure};
use cuda::{CurrentCtx, Device};
use cutensor::{Contraction, Cutensor, Plan, TensorDescriptor, TensorLayout};
use log::{debug, info};
use std::time::Duration;

/// Computes `a · b` with cuTENSOR on device 0.
///
/// Returns the product and the time spent in the contraction kernel.
pub fn contract(a: &Matrix, b: &Matrix) -> Result<(Matrix, Duration)> {
    Device::new(0).retain_primary().apply(|ctx| {
        let dev = ctx.dev();
        info!(
            "device: {} (sm_{}, {} MiB)",
            dev.name(),
            dev.compute_capability().to_arch_string(),
            dev.total_memory() >> 20,
        );
        contract_on(ctx, a, b)
    })
}

fn contract_on(ctx: &CurrentCtx, a: &Matrix, b: &Matrix) -> Result<(Matrix, Duration)> {
    let (m, k) = a.shape();
    let (k_, n) = b.shape();
    ensure!(k == k_, "cannot contract {m}x{k} with {k_}x{n}");

    let mut c = Matrix::zeros(m, n);

    let stream = ctx.stream();
    let mut dev_a = ctx.malloc::<f32>(m * k);
    let mut dev_b = ctx.malloc::<f32>(k * n);
    let mut dev_c = ctx.malloc::<f32>(m * n);
    stream.memcpy_h2d(&mut dev_a, a.as_slice());
    stream.memcpy_h2d(&mut dev_b, b.as_slice());
    stream.memcpy_h2d(&mut dev_c, c.as_slice());

    let handle = Cutensor::new(ctx).context("create cuTENSOR handle")?;
    let desc_a = TensorDescriptor::<f32>::new(&handle, &TensorLayout::row_major(&[m, k]))?;
    let desc_b = TensorDescriptor::<f32>::new(&handle, &TensorLayout::row_major(&[k, n]))?;
    let desc_c = TensorDescriptor::<f32>::new(&handle, &TensorLayout::row_major(&[m, n]))?;
    let op = Contraction::new(
        &handle,
        (&desc_a, &['m', 'k']),
        (&desc_b, &['k', 'n']),
        (&desc_c, &['m', 'n']),
    )
    .context("describe contraction")?;
    let plan = Plan::new(&handle, &op).context("plan contraction")?;

    debug!("workspace: {} bytes", plan.workspace_size());
    let mut workspace =
        (plan.workspace_size() > 0).then(|| ctx.malloc::<u8>(plan.workspace_size()));

    let start = stream.record();
    handle
        .contract(
            &plan,
            1.,
            &dev_a,
            &dev_b,
            0.,
            &mut dev_c,
            workspace.as_mut(),
            &stream,
        )
        .context("contract")?;
    let end = stream.record();

    stream.memcpy_d2h(c.as_mut_slice(), &dev_c);
    stream.synchronize();
    Ok((c, end.elapse_from(&start)))
}

#[cfg(test)]
mod test {
    use super::contract;
    use crate::matrix::Matrix;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_small() {
        if let Err(cuda::NoDevice) = cuda::init() {
            return;
        }
        let a = Matrix::from_vec(3, 4, (0..12).map(|i| (i / 4 + 1) as _).collect());
        let b = Matrix::from_vec(4, 2, (0..8).map(|i| (i / 2 + 1) as _).collect());
        let (c, _) = contract(&a, &b).unwrap();
        assert_eq!(c.as_slice(), [10., 10., 20., 20., 30., 30.]);
    }

    #[test]
    fn test_reference() {
        if let Err(cuda::NoDevice) = cuda::init() {
            return;
        }
        let mut rng = StdRng::seed_from_u64(7);
        let a = Matrix::random(96, 64, &mut rng);
        let b = Matrix::random(64, 128, &mut rng);
        let (c, _) = contract(&a, &b).unwrap();
        assert_eq!(c.shape(), (96, 128));
        assert!(c.max_abs_diff(&a.matmul(&b)) < 1e-4);
    }

    #[test]
    fn test_shape_mismatch() {
        if let Err(cuda::NoDevice) = cuda::init() {
            return;
        }
        assert!(contract(&Matrix::zeros(2, 3), &Matrix::zeros(2, 3)).is_err());
    }
}
