// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw TSV files to tensor batches, and back
// out to the submission file.
//
//   train_dataset_v2.tsv / test_dataset.tsv
//       │
//       ▼
//   TrainFileLoader / TestFileLoader  → raw rows
//       │
//       ▼
//   LabelPreprocessor → parsed labels, composed text
//       │
//       ▼
//   write_derived / DerivedFileLoader → train.csv, test.csv
//       │
//       ▼
//   SampleEncoder     → fixed-length ids + mask + targets
//       │
//       ▼
//   EmotionDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   EmotionBatcher    → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader (training, shuffled) / ordered_batches (inference)
//
//   predictions ──▶ SubmissionWriter → baseline_<model>.tsv
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Raw and derived TSV readers, derived file writer
pub mod loader;

/// Emotion label parsing and row filtering
pub mod preprocessor;

/// Text → fixed-length token ids and attention mask
pub mod encoder;

/// Implements Burn's Dataset trait for encoded samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Writes predictions into the submission template
pub mod submission;
