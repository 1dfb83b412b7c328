//! Batch loading — ingest records from files and directory trees.
//!
//! A malformed file is recorded against its path in the log and the batch
//! moves on; one bad record never aborts the rest.

use std::path::Path;

use registra_core::ResourceRecord;

use crate::collection::RecordKey;
use crate::engine::IngestEngine;
use crate::error::IngestError;
use crate::load_log::LoadLog;

impl IngestEngine {
    /// Ingest one record from a JSON file, accumulating into `log`.
    pub fn load_file(&self, path: &Path, validate: bool, log: &mut LoadLog) {
        let key = RecordKey::id(path.to_string_lossy());

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(source) => {
                log.add_failure(
                    key,
                    None,
                    vec![IngestError::Read {
                        path: path.to_path_buf(),
                        source,
                    }],
                );
                return;
            }
        };

        match serde_json::from_str::<ResourceRecord>(&contents) {
            Ok(record) => self.ingest_into(&record, validate, log),
            Err(source) => {
                tracing::warn!("skipping unparseable file {}", path.display());
                log.add_failure(
                    key,
                    None,
                    vec![IngestError::Json {
                        path: path.to_path_buf(),
                        source,
                    }],
                );
            }
        }
    }

    /// Ingest every `.json` file under `dir`, recursively. Dot-files and
    /// dot-directories are skipped.
    pub fn load_dir(&self, dir: &Path, validate: bool) -> LoadLog {
        let mut log = LoadLog::new("dataset resources");
        self.load_dir_into(dir, validate, &mut log);
        log
    }

    fn load_dir_into(&self, dir: &Path, validate: bool, log: &mut LoadLog) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                log.add_failure(
                    RecordKey::id(dir.to_string_lossy()),
                    None,
                    vec![IngestError::Read {
                        path: dir.to_path_buf(),
                        source,
                    }],
                );
                return;
            }
        };

        let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if name.starts_with('.') {
                continue;
            }
            if path.is_dir() {
                self.load_dir_into(&path, validate, log);
            } else if name.ends_with(".json") {
                self.load_file(&path, validate, log);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use registra_synth::EndpointConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &Path, name: &str, value: serde_json::Value) {
        fs::write(dir.join(name), value.to_string()).expect("write");
    }

    #[test]
    fn loads_a_directory_tree() {
        let data = TempDir::new().expect("tempdir");
        write_json(data.path(), "a.json", json!({"id": "R1", "version": "1.0.0"}));
        let sub = data.path().join("more");
        fs::create_dir(&sub).expect("mkdir");
        write_json(&sub, "b.json", json!({"id": "R2", "version": "1.0.0"}));

        let (engine, handles) = IngestEngine::in_memory(EndpointConfig::default());
        let log = engine.load_dir(data.path(), false);

        assert_eq!(log.failure_count(), 0);
        assert_eq!(handles.versions.len(), 2);
        assert_eq!(handles.latest.len(), 2);
    }

    #[test]
    fn skips_dot_files_and_non_json() {
        let data = TempDir::new().expect("tempdir");
        write_json(data.path(), "a.json", json!({"id": "R1", "version": "1.0.0"}));
        write_json(data.path(), ".hidden.json", json!({"id": "H1"}));
        fs::write(data.path().join("notes.txt"), "not json").expect("write");
        let hidden_dir = data.path().join(".cache");
        fs::create_dir(&hidden_dir).expect("mkdir");
        write_json(&hidden_dir, "c.json", json!({"id": "C1"}));

        let (engine, handles) = IngestEngine::in_memory(EndpointConfig::default());
        let log = engine.load_dir(data.path(), false);

        assert_eq!(log.failure_count(), 0);
        assert_eq!(handles.versions.len(), 1);
    }

    #[test]
    fn malformed_json_is_recorded_against_the_file() {
        let data = TempDir::new().expect("tempdir");
        fs::write(data.path().join("bad.json"), "{ not json").expect("write");
        write_json(data.path(), "good.json", json!({"id": "R1", "version": "1.0.0"}));

        let (engine, handles) = IngestEngine::in_memory(EndpointConfig::default());
        let log = engine.load_dir(data.path(), false);

        assert_eq!(log.failure_count(), 1);
        let failures = log.failures(None);
        assert!(failures[0].key.id.ends_with("bad.json"));
        assert!(matches!(failures[0].errors()[0], IngestError::Json { .. }));

        // The good record still made it in.
        assert_eq!(handles.versions.len(), 1);
    }
}
