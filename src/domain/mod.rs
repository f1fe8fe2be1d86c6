// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define what the
// pipeline works with: script lines, emotion records and the
// data error taxonomy.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The fixed-arity six-emotion record
pub mod emotions;

// Raw, test and derived script rows
pub mod script_line;

// Errors raised while reading and parsing rows
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
