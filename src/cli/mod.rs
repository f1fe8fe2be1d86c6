// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with `clap` and routes to Layer 2. This is
// also where the backend is chosen: `--device cpu` runs on
// NdArray, `--device gpu` on Wgpu, both wrapped in Autodiff
// for training.
//
//   1. `prepare` — raw TSV → derived train.csv / test.csv
//   2. `run`     — prepare, fine-tune, predict, write submission
//   3. `predict` — reload a finished run, write submission
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::backend::{Autodiff, NdArray, Wgpu};
use clap::Parser;
use commands::{Commands, DataArgs, DeviceKind, PredictArgs, RunArgs};

type CpuBackend = NdArray<f32>;
type GpuBackend = Wgpu;

#[derive(Parser, Debug)]
#[command(
    name = "script-emotion",
    version,
    about = "Fine-tune a six-emotion intensity regressor on script lines and write a submission."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => run_prepare(args),
            Commands::Run(args)     => run_pipeline(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_prepare(args: DataArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    let counts = PrepareUseCase::new(args.into()).execute()?;
    println!(
        "Prepared {} training rows and {} test rows.",
        counts.train_rows, counts.test_rows
    );
    Ok(())
}

fn run_pipeline(args: RunArgs) -> Result<()> {
    use crate::application::run_use_case::RunUseCase;

    let device   = args.device;
    let use_case = RunUseCase::new(args.into());
    tracing::info!("Running on {:?}", device);

    let summary = match device {
        DeviceKind::Cpu => use_case.execute::<Autodiff<CpuBackend>>(Default::default())?,
        DeviceKind::Gpu => use_case.execute::<Autodiff<GpuBackend>>(Default::default())?,
    };

    println!(
        "Trained {} steps in {:.1}s (final loss {:.4}, final lr {:e}). Wrote {} rows to {}",
        summary.report.global_steps,
        summary.report.elapsed_secs,
        summary.report.epoch_losses.last().copied().unwrap_or(f64::NAN),
        summary.report.final_lr,
        summary.rows,
        summary.submission.display(),
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(args.data.into(), args.output_dir, args.model_name);
    let out = match args.device {
        DeviceKind::Cpu => use_case.execute::<CpuBackend>(Default::default())?,
        DeviceKind::Gpu => use_case.execute::<GpuBackend>(Default::default())?,
    };
    println!("Submission written to {}", out.display());
    Ok(())
}
