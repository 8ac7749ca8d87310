use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not persist report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes the report through a temp file in the destination directory and
/// renames it into place. A failure on any path leaves no partial file
/// visible at the destination; the temp file cleans itself up on drop.
pub fn write_report(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf, StorageError> {
    let final_path = dir.join(filename);
    let wrap = |source: std::io::Error, path: &Path| StorageError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(|e| wrap(e, &final_path))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| wrap(e, &final_path))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| wrap(e, &final_path))?;
    tmp.flush().map_err(|e| wrap(e, &final_path))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| wrap(e, &final_path))?;
    tmp.persist(&final_path)
        .map_err(|e| wrap(e.error, &final_path))?;

    tracing::debug!(path = %final_path.display(), "report persisted");
    Ok(final_path)
}

pub fn cache_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".cache").join("redsona"))
}

/// Best-effort append to the run audit log. Failures are ignored; the
/// audit trail must never fail an analysis run.
pub fn audit(action: &str, data: serde_json::Value) {
    let home = match std::env::var("HOME") {
        Ok(h) => h,
        Err(_) => return,
    };
    let path = PathBuf::from(home).join(".config/redsona/audit.jsonl");
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": chrono::Utc::now().timestamp(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| f.write_all(line.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::write_report;
    use tempfile::TempDir;

    #[test]
    fn writes_report_into_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("output");
        let path = write_report(&dir, "user_persona.txt", "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
        assert_eq!(path, dir.join("user_persona.txt"));
    }

    #[test]
    fn overwrites_previous_report_in_place() {
        let tmp = TempDir::new().unwrap();
        write_report(tmp.path(), "user_persona.txt", "first\n").unwrap();
        let path = write_report(tmp.path(), "user_persona.txt", "second\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second\n");
    }

    #[test]
    fn leaves_no_temp_files_behind() {
        let tmp = TempDir::new().unwrap();
        write_report(tmp.path(), "user_persona.txt", "x\n").unwrap();
        let entries: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["user_persona.txt"]);
    }
}
