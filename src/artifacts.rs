use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;

use crate::chart::NamedPayload;

// ---------------------------------------------------------------------------
// Artifact persistence
// ---------------------------------------------------------------------------

/// Write each payload to `<dir>/<artifact>.json`, creating `dir` if needed.
/// Returns the written paths in payload order.
///
/// Fails before writing anything when two artifacts map to the same file
/// name.
pub fn write_artifacts(dir: &Path, payloads: &[NamedPayload]) -> Result<Vec<PathBuf>> {
    let mut stems: HashMap<String, &str> = HashMap::new();
    for named in payloads {
        let stem = file_stem(&named.artifact);
        if let Some(first) = stems.insert(stem.clone(), &named.artifact) {
            bail!(
                "artifacts '{first}' and '{}' would both be written to {stem}.json",
                named.artifact
            );
        }
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    payloads
        .iter()
        .map(|named| {
            let path = dir.join(format!("{}.json", file_stem(&named.artifact)));
            let json = serde_json::to_string_pretty(&named.payload)
                .with_context(|| format!("serialising {}", named.artifact))?;
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            debug!("wrote {}", path.display());
            Ok(path)
        })
        .collect()
}

/// Artifact name made safe for use as a file name.
fn file_stem(artifact: &str) -> String {
    artifact
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::payload::{ChartPayload, Series};

    #[test]
    fn writes_one_file_per_payload() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let payloads = vec![NamedPayload {
            artifact: "data_rowlength_Sales/Region".into(),
            payload: ChartPayload::RowLength(Series::new("Sales/Region", vec![3, 4])),
        }];

        let paths = write_artifacts(&out, &payloads).unwrap();
        assert_eq!(paths, vec![out.join("data_rowlength_Sales_Region.json")]);

        let text = std::fs::read_to_string(&paths[0]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["data"], serde_json::json!([3, 4]));
    }

    #[test]
    fn rejects_artifacts_sharing_a_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let payload = |artifact: &str| NamedPayload {
            artifact: artifact.into(),
            payload: ChartPayload::RowLength(Series::new("x", vec![1])),
        };
        let payloads = vec![
            payload("data_rowlength_Sales/Region"),
            payload("data_rowlength_Sales_Region"),
        ];

        let err = write_artifacts(&out, &payloads).unwrap_err();
        assert!(err.to_string().contains("data_rowlength_Sales_Region.json"));
        assert!(!out.exists());
    }

    #[test]
    fn file_stems_keep_unicode_letters() {
        assert_eq!(file_stem("data_pieplot_Şehir Adı"), "data_pieplot_Şehir_Adı");
    }
}
