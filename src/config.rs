use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::PhysicsModel;
use crate::particles::DEFAULT_CAP;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) enable_braille: bool,
    pub(crate) sound_enabled: bool,
    pub(crate) model: PhysicsModel,
    pub(crate) seed: u64,
    pub(crate) particle_cap: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            enable_braille: true,
            sound_enabled: true,
            model: PhysicsModel::Simple,
            seed: 0x5AB1_u64,
            particle_cap: DEFAULT_CAP,
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "sublimation", "Sublimation")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("sublimation.log"),
    })
}

/// Missing or unreadable settings fall back to defaults.
pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(e) => log::warn!("ignoring {}: {}", path.display(), e),
        }
    }
    Settings::default()
}

/// Flips sound for this run and carries the choice into the saved copy,
/// which otherwise never sees command-line overrides.
pub(crate) fn toggle_sound(runtime: &mut Settings, saved: &mut Settings) -> bool {
    runtime.sound_enabled = !runtime.sound_enabled;
    saved.sound_enabled = runtime.sound_enabled;
    runtime.sound_enabled
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sublimation-test-{}-{}",
            std::process::id(),
            name
        ));
        fs::create_dir_all(&dir).unwrap();
        dir.join("settings.json")
    }

    #[test]
    fn saved_settings_load_back() {
        let path = scratch("roundtrip");
        let s = Settings {
            model: PhysicsModel::Extended,
            sound_enabled: false,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_or_partial_files_fall_back() {
        let path = scratch("corrupt");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());

        fs::write(&path, r#"{ "model": "extended" }"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.model, PhysicsModel::Extended);
        assert_eq!(s.fps_cap, 30);
    }
}
