#![cfg_attr(not(cutensor), allow(dead_code))]

#[cfg(cutensor)]
mod device;
mod matrix;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const M: usize = 96;
const K: usize = 64;
const N: usize = 128;
const OUTPUT: &str = "contraction_result.txt";
/// 与 f64 累加的参考结果之间允许的最大绝对误差。
const TOLERANCE: f32 = 1e-3;

fn main() -> Result<()> {
    init_logging("info");
    run()
}

/// `RUST_LOG` 覆盖默认级别，库里的 `log` 记录也经由这里输出。
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

#[cfg(cutensor)]
fn run() -> Result<()> {
    use anyhow::{Context, ensure};
    use log::info;
    use matrix::Matrix;

    cuda::init().context("initialize CUDA driver")?;

    let mut rng = rand::rng();
    let a = Matrix::random(M, K, &mut rng);
    let b = Matrix::random(K, N, &mut rng);

    let (c, elapsed) = device::contract(&a, &b).context("contraction on device")?;
    info!("contracted {M}x{K} · {K}x{N} in {elapsed:?}");

    let error = c.max_abs_diff(&a.matmul(&b));
    info!("max abs error against host reference: {error:e}");
    ensure!(
        error <= TOLERANCE,
        "device result deviates from host reference by {error}"
    );

    c.save(OUTPUT).with_context(|| format!("write {OUTPUT}"))?;
    info!("result written to {OUTPUT}");
    Ok(())
}

#[cfg(not(cutensor))]
fn run() -> Result<()> {
    anyhow::bail!("built without CUDA toolkit or cuTENSOR, nothing to run")
}
