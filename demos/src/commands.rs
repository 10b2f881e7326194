use std::{path::Path, time::Instant};

use anyhow::{anyhow, Context, Result};
use burn::prelude::*;
use esnet_burn::{EsNet, EsNetConfig};

use crate::backend::{SelectedBackend, SelectedDevice};

/// Loads an `EsNetConfig` from JSON, or returns the default one.
pub fn load_config(path: Option<&Path>) -> Result<EsNetConfig> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading model configuration");
            EsNetConfig::load(path).map_err(|err| {
                anyhow!("failed to read config from {}: {err:?}", path.display())
            })
        }
        None => Ok(EsNetConfig::new()),
    }
}

fn build_model(config: &EsNetConfig, device: &SelectedDevice) -> Result<EsNet<SelectedBackend>> {
    let model = config
        .init::<SelectedBackend>(device)
        .context("failed to initialize ESNet")?;
    Ok(model)
}

/// Prints the output shape of every stage for a `[batch, in_channels, height, width]` input.
pub fn summary(
    config: &EsNetConfig,
    batch: usize,
    height: usize,
    width: usize,
    device: &SelectedDevice,
) -> Result<()> {
    let model = build_model(config, device)?;
    let input =
        Tensor::<SelectedBackend, 4>::zeros([batch, config.in_channels, height, width], device);
    let input_dims = input.dims();

    let output = model.forward_features(input)?;

    println!("ESNet summary");
    println!("  parameters: {}", model.num_params());
    println!("  input:      {input_dims:?}");
    println!("  encoder1:   {:?}", output.encoder1.dims());
    println!("  encoder2:   {:?}", output.encoder2.dims());
    println!("  encoder3:   {:?}", output.encoder3.dims());
    println!("  decoder1:   {:?}", output.decoder1.dims());
    println!("  decoder2:   {:?}", output.decoder2.dims());
    println!("  logits:     {:?}", output.logits.dims());

    Ok(())
}

/// Times `iterations` forward passes on a square input.
pub fn bench(
    config: &EsNetConfig,
    iterations: usize,
    size: usize,
    device: &SelectedDevice,
) -> Result<()> {
    let model = build_model(config, device)?;

    tracing::info!(iterations, size, "starting benchmark");
    let start = Instant::now();
    let mut timings = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start_ = Instant::now();
        let x = Tensor::<SelectedBackend, 4>::zeros([1, config.in_channels, size, size], device);
        let logits = model.forward(x)?;
        // Synchronize so asynchronous backends are timed end to end
        let _ = logits.into_data();
        timings.push(start_.elapsed());
    }
    let total = start.elapsed();

    println!(
        "Total time: {:?}, Speed: {:.2} it/s",
        total,
        iterations as f32 / total.as_secs_f32()
    );
    println!("{timings:?}");

    Ok(())
}

/// Writes `config` as JSON to `output`.
pub fn write_config(config: &EsNetConfig, output: &Path) -> Result<()> {
    config
        .save(output)
        .with_context(|| format!("failed to write config to {}", output.display()))?;
    tracing::info!(path = %output.display(), "saved model configuration");
    Ok(())
}
