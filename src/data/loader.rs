// ============================================================
// Layer 4 — File Loaders
// ============================================================
// Reads the three kinds of tab-separated input:
//
//   TrainFileLoader   — raw training file. Header line, then
//                       id \t content \t character \t emotions
//                       Lines with any other field count are
//                       logged and skipped (MalformedRow).
//
//   TestFileLoader    — raw test file with a header; only the
//                       id/content/character columns are used.
//
//   DerivedFileLoader — the intermediate train.csv / test.csv
//                       written by `write_derived`.
//
// The derived files keep the .csv name but are tab-separated,
// so script text containing commas never needs quoting.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::{
    error::DataError,
    script_line::{DerivedRow, ScriptLine, TestLine},
    traits::LineSource,
};

const TRAIN_FIELDS: usize = 4;

/// Split one raw training line into its four fields.
/// `line_no` is 1-based and counts the header.
pub fn split_train_line(line: &str, line_no: usize) -> Result<ScriptLine, DataError> {
    let fields: Vec<&str> = line.split('\t').collect();
    match fields.as_slice() {
        [id, content, character, emotions] => {
            Ok(ScriptLine::new(*id, *content, *character, *emotions))
        }
        _ => Err(DataError::MalformedRow {
            line:     line_no,
            expected: TRAIN_FIELDS,
            found:    fields.len(),
        }),
    }
}

// ─── TrainFileLoader ──────────────────────────────────────────────────────────
pub struct TrainFileLoader {
    path: PathBuf,
}

impl TrainFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LineSource for TrainFileLoader {
    type Line = ScriptLine;

    fn load_all(&self) -> Result<Vec<ScriptLine>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read training file '{}'", self.path.display()))?;

        let mut lines     = Vec::new();
        let mut malformed = 0usize;

        // First line is the header
        for (idx, line) in raw.lines().enumerate().skip(1) {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            match split_train_line(line, idx + 1) {
                Ok(l) => lines.push(l),
                Err(e) => {
                    malformed += 1;
                    tracing::warn!("{e}");
                }
            }
        }

        tracing::info!(
            "Read {} training rows from '{}' ({} malformed)",
            lines.len(),
            self.path.display(),
            malformed,
        );
        Ok(lines)
    }
}

// ─── TestFileLoader ───────────────────────────────────────────────────────────
pub struct TestFileLoader {
    path: PathBuf,
}

impl TestFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LineSource for TestFileLoader {
    type Line = TestLine;

    fn load_all(&self) -> Result<Vec<TestLine>> {
        let mut rdr = tsv_reader(&self.path)?;
        let mut lines = Vec::new();
        for record in rdr.deserialize() {
            let line: TestLine = record
                .with_context(|| format!("Bad row in test file '{}'", self.path.display()))?;
            lines.push(line);
        }
        tracing::info!("Read {} test rows from '{}'", lines.len(), self.path.display());
        Ok(lines)
    }
}

// ─── Derived files ────────────────────────────────────────────────────────────
pub struct DerivedFileLoader {
    path: PathBuf,
}

impl DerivedFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LineSource for DerivedFileLoader {
    type Line = DerivedRow;

    fn load_all(&self) -> Result<Vec<DerivedRow>> {
        let mut rdr  = tsv_reader(&self.path)?;
        let mut rows = Vec::new();
        for record in rdr.deserialize() {
            let row: DerivedRow = record
                .with_context(|| format!("Bad row in '{}'", self.path.display()))?;
            rows.push(row);
        }
        tracing::debug!("Loaded {} derived rows from '{}'", rows.len(), self.path.display());
        Ok(rows)
    }
}

/// Write derived rows with header
/// `id content character text love joy fright anger fear sorrow`.
pub fn write_derived(path: &Path, rows: &[DerivedRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(DataError::from)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    for row in rows {
        wtr.serialize(row).map_err(DataError::from)?;
    }
    wtr.flush().map_err(DataError::from)?;
    tracing::info!("Wrote {} rows to '{}'", rows.len(), path.display());
    Ok(())
}

pub(crate) fn tsv_reader(path: &Path) -> Result<csv::Reader<fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(DataError::from)
        .with_context(|| format!("Cannot open '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preprocessor::LabelPreprocessor;
    use crate::domain::script_line::TestLine;

    #[test]
    fn test_split_rejects_wrong_field_count() {
        let err = split_train_line("1\tonly two", 5).unwrap_err();
        assert!(matches!(err, DataError::MalformedRow { line: 5, expected: 4, found: 2 }));
        assert!(split_train_line("1\ta\tb\tc\td", 6).is_err());
    }

    #[test]
    fn test_train_loader_skips_header_and_malformed() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.tsv");
        fs::write(
            &path,
            "id\tcontent\tcharacter\temotions\n\
             1\t你好\t张三\t0,1,2,3,0,1\n\
             2\tbroken line\n\
             3\t再见\t李四\t\n",
        )
        .unwrap();

        let lines = TrainFileLoader::new(&path).load_all().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].character, "张三");
        assert_eq!(lines[1].emotions, "");
    }

    #[test]
    fn test_test_loader_ignores_extra_columns() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.tsv");
        fs::write(&path, "id\tcontent\tcharacter\textra\n7\t台词\t王五\tz\n").unwrap();

        let lines = TestFileLoader::new(&path).load_all().unwrap();
        assert_eq!(
            lines,
            vec![TestLine { id: "7".into(), content: "台词".into(), character: "王五".into() }]
        );
    }

    #[test]
    fn test_derived_file_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let path  = dir.path().join("train.csv");
        let lines = vec![ScriptLine::new("1", "hello, world", "A", "0,1,2,3,0,1")];
        let rows  = LabelPreprocessor::new().process(&lines);

        write_derived(&path, &rows).unwrap();
        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with(
            "id\tcontent\tcharacter\ttext\tlove\tjoy\tfright\tanger\tfear\tsorrow"
        ));

        let back = DerivedFileLoader::new(&path).load_all().unwrap();
        assert_eq!(back, rows);
    }
}
