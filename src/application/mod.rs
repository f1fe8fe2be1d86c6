// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers into the three workflows the
// CLI exposes.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing or printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Raw TSV → derived train.csv / test.csv
pub mod prepare_use_case;

// prepare → encode → train → predict → submission
pub mod run_use_case;

// Saved checkpoint → predict → submission
pub mod predict_use_case;
