// ============================================================
// Layer 4 — Label Preprocessor
// ============================================================
// Turns raw training rows into derived rows with six integer
// labels.
//
// Raw emotions field:   "0,1,2,3,0,1"
//                          │ │ │ │ │ └ sorrow
//                          │ │ │ │ └── fear
//                          │ │ │ └──── anger
//                          │ │ └────── fright
//                          │ └──────── joy
//                          └────────── love
//
// Each value is an intensity: 0 none, 1 weak, 2 medium, 3 strong.
// Training later divides by 3 (Emotions::normalized) so targets
// live in [0,1] next to a sigmoid.
//
// Rows are dropped, never repaired:
//   - empty emotions field  → dropped (unlabelled line)
//   - unparsable emotions   → logged, dropped
//
// Reference: Rust Book §9 (Recoverable Errors with Result)

use crate::domain::{
    emotions::{Emotions, MAX_INTENSITY},
    error::DataError,
    script_line::{DerivedRow, ScriptLine},
};

/// Parse "a,b,c,d,e,f" into six intensities in fixed order.
pub fn parse_emotions(raw: &str) -> Result<Emotions<u8>, DataError> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 6 {
        return Err(DataError::label_parse(
            raw,
            format!("expected 6 comma-separated values, found {}", parts.len()),
        ));
    }

    let mut values = [0u8; 6];
    for (slot, part) in values.iter_mut().zip(&parts) {
        let v: u8 = part
            .trim()
            .parse()
            .map_err(|e| DataError::label_parse(raw, format!("'{part}': {e}")))?;
        if v > MAX_INTENSITY {
            return Err(DataError::label_parse(
                raw,
                format!("intensity {v} outside 0..={MAX_INTENSITY}"),
            ));
        }
        *slot = v;
    }

    Ok(Emotions::from_array(values))
}

pub struct LabelPreprocessor;

impl LabelPreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Label every line that carries a usable emotions field.
    pub fn process(&self, lines: &[ScriptLine]) -> Vec<DerivedRow> {
        let mut rows     = Vec::with_capacity(lines.len());
        let mut unlabeled = 0usize;
        let mut rejected  = 0usize;

        for line in lines {
            if line.emotions.trim().is_empty() {
                unlabeled += 1;
                continue;
            }
            match parse_emotions(&line.emotions) {
                Ok(labels) => rows.push(DerivedRow::from_train(line, labels)),
                Err(e) => {
                    rejected += 1;
                    tracing::warn!("Skipping row id={}: {e}", line.id);
                }
            }
        }

        tracing::debug!(
            "Labelled {} rows ({} without emotions, {} rejected)",
            rows.len(),
            unlabeled,
            rejected,
        );
        rows
    }
}

impl Default for LabelPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario_row() {
        let line   = ScriptLine::new("1", "你好", "张三", "0,1,2,3,0,1");
        let labels = parse_emotions(&line.emotions).unwrap();
        assert_eq!(labels.into_array(), [0, 1, 2, 3, 0, 1]);

        let targets = labels.normalized().into_array();
        let expected = [0.0, 0.333, 0.667, 1.0, 0.0, 0.333];
        for (t, e) in targets.iter().zip(expected) {
            assert!((t - e).abs() < 1e-3, "{t} vs {e}");
        }
    }

    #[test]
    fn test_all_levels_accepted() {
        for v in 0..=3u8 {
            let raw    = [v; 6].map(|x| x.to_string()).join(",");
            let labels = parse_emotions(&raw).unwrap();
            assert!(labels.into_array().iter().all(|&x| x == v));
        }
    }

    #[test]
    fn test_rejects_wrong_arity() {
        assert!(matches!(parse_emotions("0,1,2"), Err(DataError::LabelParse { .. })));
        assert!(parse_emotions("0,1,2,3,0,1,2").is_err());
    }

    #[test]
    fn test_rejects_non_integer_and_out_of_range() {
        assert!(parse_emotions("0,1,x,3,0,1").is_err());
        assert!(parse_emotions("0,1,2,4,0,1").is_err());
        assert!(parse_emotions("0,-1,2,3,0,1").is_err());
    }

    #[test]
    fn test_process_drops_empty_and_bad_rows() {
        let lines = vec![
            ScriptLine::new("1", "a", "x", "0,1,2,3,0,1"),
            ScriptLine::new("2", "b", "y", ""),
            ScriptLine::new("3", "c", "z", "9,9,9,9,9,9"),
            ScriptLine::new("4", "d", "w", "1,1,1,1,1,1"),
        ];
        let rows = LabelPreprocessor::new().process(&lines);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);
        assert_eq!(rows[0].text, "a角色: x");
        assert_eq!(rows[1].labels().into_array(), [1; 6]);
    }
}
