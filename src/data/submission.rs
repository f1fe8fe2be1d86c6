// ============================================================
// Layer 4 — Submission Writer
// ============================================================
// Fills the example submission with predictions:
//
//   submit_example.tsv            baseline_<model>.tsv
//   id      emotion               id      emotion
//   1_1     ...           ──▶     1_1     1.2,0.3,0,0,0.5,2
//
// Every template column is kept as-is; `emotion` is added or
// overwritten with the six intensities in the fixed order
// love, joy, fright, anger, fear, sorrow. Values use f32's
// shortest round-trip formatting.
//
// Rows are matched by position, so the template must have
// exactly one row per prediction.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::data::loader::tsv_reader;
use crate::domain::{emotions::Emotions, error::DataError};

const ID_COLUMN:      &str = "id";
const EMOTION_COLUMN: &str = "emotion";

/// Last `/`-separated segment of a model name:
/// "hfl/chinese-roberta-wwm-ext" → "chinese-roberta-wwm-ext".
pub fn model_short_name(model_name: &str) -> &str {
    model_name.rsplit('/').next().unwrap_or(model_name)
}

/// `<output_dir>/baseline_<short name>.tsv`
pub fn submission_path(output_dir: &Path, model_name: &str) -> PathBuf {
    output_dir.join(format!("baseline_{}.tsv", model_short_name(model_name)))
}

/// "love,joy,fright,anger,fear,sorrow"
pub fn format_emotions(values: &Emotions<f32>) -> String {
    values
        .into_array()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub struct SubmissionWriter {
    template: PathBuf,
}

impl SubmissionWriter {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self { template: template.into() }
    }

    /// Write `predictions` into a copy of the template at `out`.
    /// Returns the number of rows written.
    pub fn write(&self, predictions: &[Emotions<f32>], out: &Path) -> Result<usize> {
        let mut rdr = tsv_reader(&self.template)?;
        let mut headers = rdr.headers().map_err(DataError::from)?.clone();

        if !headers.iter().any(|h| h == ID_COLUMN) {
            return Err(DataError::MissingColumn(ID_COLUMN.to_string()))
                .with_context(|| format!("Bad submission template '{}'", self.template.display()));
        }

        let records = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(DataError::from)
            .with_context(|| format!("Cannot read '{}'", self.template.display()))?;

        if records.len() != predictions.len() {
            return Err(DataError::RowCountMismatch {
                expected: records.len(),
                actual:   predictions.len(),
            }
            .into());
        }

        let emotion_idx = match headers.iter().position(|h| h == EMOTION_COLUMN) {
            Some(idx) => idx,
            None => {
                headers.push_field(EMOTION_COLUMN);
                headers.len() - 1
            }
        };

        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(out)
            .map_err(DataError::from)
            .with_context(|| format!("Cannot create '{}'", out.display()))?;
        wtr.write_record(&headers).map_err(DataError::from)?;

        for (record, values) in records.iter().zip(predictions) {
            let formatted = format_emotions(values);
            let mut fields: Vec<&str> = record.iter().collect();
            if fields.len() <= emotion_idx {
                fields.resize(emotion_idx + 1, "");
            }
            fields[emotion_idx] = &formatted;
            wtr.write_record(&fields).map_err(DataError::from)?;
        }
        wtr.flush().map_err(DataError::from)?;

        tracing::info!("Wrote {} predictions to '{}'", predictions.len(), out.display());
        Ok(predictions.len())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample(love: f32) -> Emotions<f32> {
        Emotions { love, joy: 0.3, fright: 0.0, anger: 0.0, fear: 0.5, sorrow: 2.0 }
    }

    #[test]
    fn test_short_name() {
        assert_eq!(model_short_name("hfl/chinese-roberta-wwm-ext"), "chinese-roberta-wwm-ext");
        assert_eq!(model_short_name("bert-base"), "bert-base");
        assert_eq!(
            submission_path(Path::new("out"), "hfl/x"),
            Path::new("out").join("baseline_x.tsv")
        );
    }

    #[test]
    fn test_format_uses_shortest_decimal() {
        assert_eq!(format_emotions(&sample(1.2)), "1.2,0.3,0,0,0.5,2");
    }

    #[test]
    fn test_writes_emotion_column_in_row_order() {
        let dir      = tempfile::tempdir().unwrap();
        let template = dir.path().join("submit_example.tsv");
        let out      = dir.path().join("baseline_x.tsv");
        fs::write(&template, "id\temotion\n1_1\t\n1_2\t\n").unwrap();

        let n = SubmissionWriter::new(&template)
            .write(&[sample(1.2), sample(3.0)], &out)
            .unwrap();
        assert_eq!(n, 2);

        let written = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines, ["id\temotion", "1_1\t1.2,0.3,0,0,0.5,2", "1_2\t3,0.3,0,0,0.5,2"]);
    }

    #[test]
    fn test_appends_emotion_column_when_absent() {
        let dir      = tempfile::tempdir().unwrap();
        let template = dir.path().join("submit.tsv");
        let out      = dir.path().join("out.tsv");
        fs::write(&template, "id\n7\n").unwrap();

        SubmissionWriter::new(&template).write(&[sample(0.0)], &out).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().nth(1), Some("7\t0,0.3,0,0,0.5,2"));
    }

    #[test]
    fn test_row_count_mismatch_is_an_error() {
        let dir      = tempfile::tempdir().unwrap();
        let template = dir.path().join("submit.tsv");
        fs::write(&template, "id\temotion\n1\t\n2\t\n3\t\n").unwrap();

        let err = SubmissionWriter::new(&template)
            .write(&[sample(1.0), sample(1.0)], &dir.path().join("out.tsv"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::RowCountMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_missing_id_column_is_an_error() {
        let dir      = tempfile::tempdir().unwrap();
        let template = dir.path().join("submit.tsv");
        fs::write(&template, "key\temotion\n1\t\n").unwrap();

        let err = SubmissionWriter::new(&template)
            .write(&[sample(1.0)], &dir.path().join("out.tsv"))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::MissingColumn(_))));
    }
}
