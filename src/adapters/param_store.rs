//! INI-backed store for optimized strategy parameters.
//!
//! A full run saves the winning parameter set here; a quick run reads it
//! back instead of searching again.

use crate::domain::error::BandtraderError;
use crate::domain::strategy::StrategyParameters;
use configparser::ini::Ini;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct ParamStore {
    path: PathBuf,
}

impl ParamStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back saved parameters. A missing file means nothing has been
    /// saved yet and is not an error.
    pub fn load(&self) -> Result<Option<StrategyParameters>, BandtraderError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut ini = Ini::new();
        ini.load(&self.path)
            .map_err(|reason| BandtraderError::ConfigParse {
                file: self.path.display().to_string(),
                reason,
            })?;

        let count: u32 = parse_key(&ini, &self.path, "count")?;
        let pct: f64 = parse_key(&ini, &self.path, "pct")?;
        let window: usize = parse_key(&ini, &self.path, "window")?;

        let params = StrategyParameters::new(count, pct, window);
        params.validate()?;
        Ok(Some(params))
    }

    pub fn save(&self, params: &StrategyParameters) -> Result<(), BandtraderError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut ini = Ini::new();
        ini.set("parameters", "count", Some(params.count.to_string()));
        ini.set("parameters", "pct", Some(params.pct.to_string()));
        ini.set("parameters", "window", Some(params.window.to_string()));
        ini.write(&self.path)?;
        Ok(())
    }
}

fn parse_key<T: FromStr>(ini: &Ini, path: &Path, key: &str) -> Result<T, BandtraderError>
where
    T::Err: fmt::Display,
{
    let raw = ini
        .get("parameters", key)
        .ok_or_else(|| BandtraderError::ConfigInvalid {
            section: "parameters".to_string(),
            key: key.to_string(),
            reason: format!("missing from {}", path.display()),
        })?;
    raw.trim()
        .parse()
        .map_err(|e| BandtraderError::ConfigInvalid {
            section: "parameters".to_string(),
            key: key.to_string(),
            reason: format!("invalid value {raw:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = ParamStore::new(dir.path().join("best_params.ini"));
        let params = StrategyParameters::new(35, 0.25, 20);

        store.save(&params).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, params);
    }

    #[test]
    fn saved_file_uses_the_parameters_section() {
        let dir = tempdir().unwrap();
        let store = ParamStore::new(dir.path().join("best_params.ini"));

        store.save(&StrategyParameters::default()).unwrap();

        let content = fs::read_to_string(dir.path().join("best_params.ini")).unwrap();
        assert!(content.contains("[parameters]"));
        assert!(content.contains("count"));
        assert!(content.contains("window"));
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = tempdir().unwrap();
        let store = ParamStore::new(dir.path().join("absent.ini"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn load_rejects_missing_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.ini");
        fs::write(&path, "[parameters]\ncount = 50\n").unwrap();
        let store = ParamStore::new(path);

        let err = store.load().unwrap_err();
        assert!(matches!(err, BandtraderError::ConfigInvalid { key, .. } if key == "pct"));
    }

    #[test]
    fn load_rejects_garbage_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.ini");
        fs::write(
            &path,
            "[parameters]\ncount = 50\npct = 0.3\nwindow = banana\n",
        )
        .unwrap();
        let store = ParamStore::new(path);

        let err = store.load().unwrap_err();
        assert!(matches!(err, BandtraderError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn load_rejects_out_of_range_pct() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.ini");
        fs::write(&path, "[parameters]\ncount = 50\npct = 7.0\nwindow = 30\n").unwrap();
        let store = ParamStore::new(path);

        let err = store.load().unwrap_err();
        assert!(matches!(err, BandtraderError::InvalidParameter { name, .. } if name == "pct"));
    }
}
