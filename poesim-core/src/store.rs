//! On-disk sample storage: one JSON file per recombination, named by a
//! zero-padded, monotonically increasing identifier (`00042.json`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid sample {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One observed recombination: the two inputs and the result, as raw item text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub input1: Vec<String>,
    pub input2: Vec<String>,
    pub output: Vec<String>,
}

/// A directory of stored samples.
#[derive(Debug, Clone)]
pub struct SampleStore {
    dir: PathBuf,
}

impl SampleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sample files, sorted by name (and therefore by identifier).
    pub fn sample_paths(&self) -> Result<Vec<PathBuf>, CorpusError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| CorpusError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CorpusError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// All samples in identifier order, labelled by file name.
    pub fn load_all(&self) -> Result<Vec<(String, Sample)>, CorpusError> {
        let paths = self.sample_paths()?;
        let mut samples = Vec::with_capacity(paths.len());
        for path in paths {
            let sample = read_sample(&path)?;
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            samples.push((label, sample));
        }
        log::info!(
            "Loaded {} samples from {}",
            samples.len(),
            self.dir.display()
        );
        Ok(samples)
    }

    /// Identifier the next recorded sample will get.
    ///
    /// One past the numeric stem of the last file; files with non-numeric
    /// stems are ignored.
    pub fn next_id(&self) -> Result<u32, CorpusError> {
        let last = self
            .sample_paths()?
            .iter()
            .filter_map(|p| p.file_stem()?.to_str()?.parse::<u32>().ok())
            .max();
        Ok(last.map_or(1, |id| id + 1))
    }

    /// Write `sample` under the next identifier and return its path.
    pub fn record(&self, sample: &Sample) -> Result<PathBuf, CorpusError> {
        fs::create_dir_all(&self.dir).map_err(|source| CorpusError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(format!("{:05}.json", self.next_id()?));
        let json = serde_json::to_string_pretty(sample).map_err(|source| CorpusError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| CorpusError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Recorded sample {}", path.display());
        Ok(path)
    }
}

fn read_sample(path: &Path) -> Result<Sample, CorpusError> {
    let text = fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CorpusError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tag: &str) -> Sample {
        Sample {
            input1: vec![format!("{} left", tag)],
            input2: vec![format!("{} right", tag)],
            output: vec![format!("{} out", tag)],
        }
    }

    #[test]
    fn test_record_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path());

        assert_eq!(store.next_id().unwrap(), 1);
        let first = store.record(&sample("a")).unwrap();
        let second = store.record(&sample("b")).unwrap();

        assert_eq!(first.file_name().unwrap(), "00001.json");
        assert_eq!(second.file_name().unwrap(), "00002.json");
        assert_eq!(store.next_id().unwrap(), 3);
    }

    #[test]
    fn test_load_all_in_id_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path());
        fs::write(
            dir.path().join("00010.json"),
            serde_json::to_string(&sample("ten")).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join("00002.json"),
            serde_json::to_string(&sample("two")).unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let samples = store.load_all().unwrap();
        let labels: Vec<_> = samples.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["00002.json", "00010.json"]);
        assert_eq!(samples[0].1, sample("two"));
        assert_eq!(store.next_id().unwrap(), 11);
    }

    #[test]
    fn test_invalid_sample_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("00001.json"), r#"{"input1": []}"#).unwrap();
        let err = SampleStore::new(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, CorpusError::Json { .. }));
        assert!(err.to_string().contains("00001.json"));
    }

    #[test]
    fn test_missing_directory() {
        let err = SampleStore::new("/nonexistent/samples").load_all().unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
    }
}
