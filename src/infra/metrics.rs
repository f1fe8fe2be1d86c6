// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per logged training step.
//
// Output file: <output_dir>/metrics.csv
//
//   global_step,epoch,batch,loss,steps_per_sec,lr
//   100,0,99,3.912345,4.21,0.0000092
//   200,0,199,3.501234,4.23,0.0000084
//
// `loss` is the mean summed loss over the steps since the
// previous row. Writing here is best-effort: the trainer logs
// a warning on failure and keeps training.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};
use serde::Serialize;

const HEADER: [&str; 6] = ["global_step", "epoch", "batch", "loss", "steps_per_sec", "lr"];

/// One observation of the training loop. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepLog {
    /// Optimizer steps taken so far (1-based once a step has run)
    pub global_step: usize,

    /// 0-based epoch index
    pub epoch: usize,

    /// 0-based batch index within the epoch
    pub batch: usize,

    /// Mean loss over the steps since the previous log
    #[serde(rename = "loss")]
    pub mean_loss: f64,

    /// global_step divided by seconds since training started
    pub steps_per_sec: f64,

    /// Learning rate after this step's schedule update
    pub lr: f64,
}

/// Logs step metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut wtr = csv::Writer::from_path(&csv_path)?;
            wtr.write_record(HEADER)?;
            wtr.flush()?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one step's metrics as a new row.
    /// Fails if the file has been removed since `new`.
    pub fn log(&self, m: &StepLog) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.serialize(m)?;
        wtr.flush()?;
        Ok(())
    }
}
