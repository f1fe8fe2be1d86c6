// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands `prepare`, `run`, `predict`
// and all their configurable flags.
//
// clap's derive macros generate --help text, missing-argument
// errors and string → number conversion.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::{
    prepare_use_case::DataPaths,
    run_use_case::{RunConfig, DEFAULT_MODEL_NAME},
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse the raw TSV files and write derived train.csv / test.csv
    Prepare(DataArgs),

    /// Prepare, fine-tune, predict the test set and write the submission
    Run(RunArgs),

    /// Reload a finished run and write a fresh submission
    Predict(PredictArgs),
}

/// Where training runs.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    /// NdArray backend on the CPU
    Cpu,
    /// Wgpu backend on the default GPU adapter
    Gpu,
}

/// Input file locations shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory holding the raw TSV files; derived files are written here too
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, default_value = "train_dataset_v2.tsv")]
    pub train_file: String,

    #[arg(long, default_value = "test_dataset.tsv")]
    pub test_file: String,

    /// Submission template with an `id` column
    #[arg(long, default_value = "submit_example.tsv")]
    pub submit_file: String,
}

impl From<DataArgs> for DataPaths {
    fn from(a: DataArgs) -> Self {
        DataPaths {
            data_dir:    a.data_dir,
            train_file:  a.train_file,
            test_file:   a.test_file,
            submit_file: a.submit_file,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory for weights, config, metrics and the submission
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Directory with tokenizer.json and optionally encoder.mpk
    #[arg(long, default_value = "models/chinese-roberta-wwm-ext")]
    pub model_dir: PathBuf,

    /// Model name; "large" in the name selects the large architecture
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Vocabulary cap when building a fallback tokenizer
    #[arg(long, default_value_t = 21128)]
    pub vocab_size: usize,

    /// Override the number of encoder layers
    #[arg(long)]
    pub encoder_layers: Option<usize>,

    /// Override the encoder hidden width
    #[arg(long)]
    pub hidden_dim: Option<usize>,

    /// Override the number of attention heads; hidden_dim must divide evenly
    #[arg(long)]
    pub num_heads: Option<usize>,

    /// Override the feed-forward inner width
    #[arg(long)]
    pub d_ff: Option<usize>,

    #[arg(long, default_value_t = 1)]
    pub epochs: usize,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1e-5)]
    pub lr: f64,

    #[arg(long, default_value_t = 0.0)]
    pub weight_decay: f64,

    /// Fraction of all steps spent on linear warmup
    #[arg(long, default_value_t = 0.0)]
    pub warmup_ratio: f64,

    /// Tokens per sample including [CLS] and [SEP]
    #[arg(long, default_value_t = 128)]
    pub max_len: usize,

    /// Shuffle seed; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log every this many optimizer steps
    #[arg(long, default_value_t = 100)]
    pub log_every: usize,

    /// Data loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    #[arg(long, value_enum, default_value_t = DeviceKind::Cpu)]
    pub device: DeviceKind,
}

/// The application layer never sees clap types.
impl From<RunArgs> for RunConfig {
    fn from(a: RunArgs) -> Self {
        RunConfig {
            paths:          a.data.into(),
            output_dir:     a.output_dir,
            model_dir:      a.model_dir,
            model_name:     a.model_name,
            vocab_size:     a.vocab_size,
            encoder_layers: a.encoder_layers,
            hidden_dim:     a.hidden_dim,
            num_heads:      a.num_heads,
            d_ff:           a.d_ff,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            learning_rate:  a.lr,
            weight_decay:   a.weight_decay,
            warmup_ratio:   a.warmup_ratio,
            max_len:        a.max_len,
            seed:           a.seed,
            log_every:      a.log_every,
            num_workers:    a.num_workers,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output directory of the earlier `run`
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    #[arg(long, value_enum, default_value_t = DeviceKind::Cpu)]
    pub device: DeviceKind,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_run_defaults_match_run_config() {
        let cli = Cli::try_parse_from(["script-emotion", "run"]).unwrap();
        let Commands::Run(args) = cli.command else { panic!("expected run") };
        assert_eq!(args.device, DeviceKind::Cpu);

        let cfg: RunConfig = args.into();
        let def = RunConfig::default();
        assert_eq!(cfg.model_name, def.model_name);
        assert_eq!(cfg.batch_size, def.batch_size);
        assert_eq!(cfg.max_len, def.max_len);
        assert_eq!(cfg.learning_rate, def.learning_rate);
        assert_eq!(cfg.paths, def.paths);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "script-emotion", "run", "--epochs", "3", "--device", "gpu",
            "--seed", "5", "--encoder-layers", "4", "--data-dir", "d",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else { panic!("expected run") };
        assert_eq!(args.device, DeviceKind::Gpu);
        let cfg: RunConfig = args.into();
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.seed, Some(5));
        assert_eq!(cfg.encoder_layers, Some(4));
        assert_eq!(cfg.paths.raw_train(), PathBuf::from("d").join("train_dataset_v2.tsv"));
    }

    #[test]
    fn test_unknown_device_is_rejected() {
        assert!(Cli::try_parse_from(["script-emotion", "run", "--device", "tpu"]).is_err());
    }
}
