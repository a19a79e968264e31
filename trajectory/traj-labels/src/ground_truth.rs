//! Ground-truth segmentation file.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{LabelError, Result};

/// Key matched against the recording's file name.
pub const FILENAME_KEY: &str = "filename";

/// A parsed ground-truth file: a JSON array of per-recording entries.
///
/// Entries are kept as raw JSON so every annotation field passes through
/// untouched. Only the `filename` key is interpreted.
///
/// # Example
///
/// ```
/// use traj_labels::GroundTruthFile;
///
/// let file = GroundTruthFile::parse(
///     "labels.json",
///     r#"[{"filename": "a.bag", "segments": [0, 120]}]"#,
/// )
/// .unwrap();
///
/// let entry = file.find("a.bag").unwrap();
/// assert_eq!(entry["segments"][1], 120);
/// assert!(file.find("b.bag").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthFile {
    path: PathBuf,
    entries: Vec<Value>,
}

impl GroundTruthFile {
    /// Reads and parses a label file.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Io`] if the file cannot be read,
    /// [`LabelError::Parse`] if it is not JSON, or
    /// [`LabelError::NotAnArray`] if the top level is not an array.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LabelError::io(path.display().to_string(), e.to_string()))?;
        Self::parse(path, &text)
    }

    /// Parses label JSON; `path` is used for error messages.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::Parse`] or [`LabelError::NotAnArray`].
    pub fn parse(path: impl AsRef<Path>, text: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let value: Value = serde_json::from_str(text)
            .map_err(|e| LabelError::parse(path.display().to_string(), e.to_string()))?;

        let entries = match value {
            Value::Array(entries) => entries,
            other => {
                return Err(LabelError::NotAnArray {
                    path: path.display().to_string(),
                    found: kind(&other),
                });
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "loaded ground truth");
        Ok(Self { path, entries })
    }

    /// Path the file was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// First entry whose `filename` equals `name` exactly.
    ///
    /// Entries that are not objects, or whose `filename` is missing or not a
    /// string, never match.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|entry| filename_of(entry) == Some(name))
    }

    /// `filename` of every entry that has one, in file order.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(filename_of)
    }
}

fn filename_of(entry: &Value) -> Option<&str> {
    entry.as_object()?.get(FILENAME_KEY)?.as_str()
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Looks up the ground-truth entry for a recording.
///
/// The recording's base name (`bag_path` without directories) is matched
/// against each entry's `filename`; the first match is returned.
///
/// A missing label file or a missing entry is logged as a warning and
/// yields `Ok(None)`.
///
/// # Errors
///
/// Returns a [`LabelError`] if the label file exists but cannot be read or
/// parsed.
///
/// # Example
///
/// ```
/// use traj_labels::get_ground_truth_segmentation;
///
/// let dir = tempfile::tempdir().unwrap();
/// let labels = dir.path().join("labels.json");
/// std::fs::write(&labels, r#"[{"filename": "a.bag", "k": 1}]"#).unwrap();
///
/// let entry = get_ground_truth_segmentation(&labels, "/data/runs/a.bag").unwrap();
/// assert_eq!(entry.unwrap()["k"], 1);
/// ```
pub fn get_ground_truth_segmentation(
    label_path: impl AsRef<Path>,
    bag_path: impl AsRef<Path>,
) -> Result<Option<Value>> {
    let label_path = label_path.as_ref();
    if !label_path.exists() {
        warn!(
            path = %label_path.display(),
            "JSON ground truth segmentation file not found"
        );
        return Ok(None);
    }

    let file = GroundTruthFile::load(label_path)?;
    let name = bag_path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let entry = file.find(&name).cloned();
    if entry.is_none() {
        warn!(
            path = %label_path.display(),
            filename = %name,
            "Segmentation data not found"
        );
    }
    Ok(entry)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const LABELS: &str = r#"[
        {"filename": "a.bag", "k": 1},
        {"filename": "b.bag", "k": 2},
        {"filename": "a.bag", "k": 3}
    ]"#;

    #[test]
    fn find_first_match_wins() {
        let file = GroundTruthFile::parse("labels.json", LABELS).unwrap();
        assert_eq!(file.len(), 3);
        assert_eq!(file.find("a.bag"), Some(&json!({"filename": "a.bag", "k": 1})));
        assert_eq!(file.find("b.bag").unwrap()["k"], 2);
        assert!(file.find("c.bag").is_none());
    }

    #[test]
    fn find_is_exact() {
        let file = GroundTruthFile::parse("labels.json", LABELS).unwrap();
        assert!(file.find("A.bag").is_none());
        assert!(file.find("a.bag ").is_none());
        assert!(file.find("a").is_none());
    }

    #[test]
    fn odd_entries_are_skipped() {
        let text = r#"[3, "a.bag", {"filename": 7}, {"name": "a.bag"}, {"filename": "a.bag", "ok": true}]"#;
        let file = GroundTruthFile::parse("labels.json", text).unwrap();
        assert_eq!(file.find("a.bag").unwrap()["ok"], true);
        assert_eq!(file.filenames().collect::<Vec<_>>(), vec!["a.bag"]);
    }

    #[test]
    fn empty_array() {
        let file = GroundTruthFile::parse("labels.json", "[]").unwrap();
        assert!(file.is_empty());
        assert!(file.find("a.bag").is_none());
    }

    #[test]
    fn rejects_non_array() {
        let err = GroundTruthFile::parse("labels.json", r#"{"filename": "a.bag"}"#).unwrap_err();
        assert!(matches!(err, LabelError::NotAnArray { found: "object", .. }));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = GroundTruthFile::parse("labels.json", "[{").unwrap_err();
        assert!(matches!(err, LabelError::Parse { .. }));
    }

    #[test]
    fn filenames_in_order() {
        let file = GroundTruthFile::parse("labels.json", LABELS).unwrap();
        assert_eq!(
            file.filenames().collect::<Vec<_>>(),
            vec!["a.bag", "b.bag", "a.bag"]
        );
        assert_eq!(file.path(), Path::new("labels.json"));
    }
}
