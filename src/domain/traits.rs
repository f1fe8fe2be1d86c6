// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer reads rows through `LineSource` and
// never learns which file format sits behind it:
//   - TrainFileLoader → raw training TSV (4 fields per line)
//   - TestFileLoader  → raw test TSV with a header
//   - DerivedFileLoader → intermediate train.csv / test.csv
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

// ─── LineSource ───────────────────────────────────────────────────────────────
/// Any component that can load a list of rows from a source.
pub trait LineSource {
    /// The row type this source yields.
    type Line;

    /// Load every valid row. Recoverable per-row problems are
    /// logged and skipped by the implementation.
    fn load_all(&self) -> Result<Vec<Self::Line>>;
}
