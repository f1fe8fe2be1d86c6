// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   checkpoint.rs      — Saving and loading model weights
//                        with Burn's CompactRecorder, the
//                        optional pretrained encoder record,
//                        and the run config as JSON so a
//                        later `predict` can rebuild the model.
//
//   tokenizer_store.rs — Loads the model's tokenizer.json, or
//                        builds a character-level vocabulary
//                        from the corpus when there is none.
//
//   metrics.rs         — Appends step logs (loss, speed, lr)
//                        to a CSV file for later plotting.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer loading with corpus fallback
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
