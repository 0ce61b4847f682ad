mod app;
mod audio;
mod config;
mod error;
mod input;
mod lesson;
mod model;
mod observe;
mod particles;
mod physics;
mod render;
mod session;
mod timer;

use anyhow::{Context, Result};
use clap::Parser;
use std::{
    fs::{File, OpenOptions},
    path::Path,
};

use crate::config::{load_settings, project_paths, Settings};
use crate::model::PhysicsModel;

/// Terminal lesson: naphthalene sublimation and deposition.
#[derive(Parser, Debug)]
struct Args {
    /// Physics formulation (overrides settings.json)
    #[arg(long, value_enum)]
    model: Option<PhysicsModel>,

    /// Particle RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per second cap
    #[arg(long)]
    fps: Option<u32>,

    /// Plain ASCII apparatus instead of braille
    #[arg(long, default_value_t = false)]
    ascii: bool,

    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Silence the terminal bell cues
    #[arg(long, default_value_t = false)]
    mute: bool,
}

impl Args {
    /// Settings for this run only; `saved` is left as loaded.
    fn overlay(&self, saved: &Settings) -> Settings {
        let mut s = saved.clone();
        if let Some(model) = self.model {
            s.model = model;
        }
        if let Some(seed) = self.seed {
            s.seed = seed;
        }
        if let Some(fps) = self.fps {
            s.fps_cap = fps;
        }
        if self.ascii {
            s.enable_braille = false;
        }
        if self.no_color {
            s.enable_color = false;
        }
        if self.mute {
            s.sound_enabled = false;
        }
        s
    }
}

/// Each run starts a fresh log.
fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))
}

/// Logs go to a file; stderr would scribble over the alternate screen.
fn init_logging(path: &Path) -> Result<()> {
    let file = open_log(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = project_paths()?;
    init_logging(&paths.log_path)?;

    let saved = load_settings(&paths.settings_path);
    let settings = args.overlay(&saved);

    app::run(saved, settings, paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{save_settings_atomic, toggle_sound};
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sublimation-main-{}-{}",
            std::process::id(),
            name
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn flags_apply_to_one_run_only() {
        let path = scratch("flags").join("settings.json");
        let _ = fs::remove_file(&path);

        let saved = load_settings(&path);
        let args = Args::parse_from(["sublimation", "--model", "extended", "--mute", "--ascii"]);
        let run = args.overlay(&saved);
        assert_eq!(run.model, PhysicsModel::Extended);
        assert!(!run.sound_enabled);
        assert!(!run.enable_braille);
        save_settings_atomic(&path, &saved).unwrap();

        let next = Args::parse_from(["sublimation"]).overlay(&load_settings(&path));
        assert_eq!(next, Settings::default());
    }

    #[test]
    fn sound_toggle_outlives_the_mute_flag() {
        let path = scratch("toggle").join("settings.json");
        let _ = fs::remove_file(&path);

        let mut saved = Settings {
            sound_enabled: false,
            ..Settings::default()
        };
        let mut run = Args::parse_from(["sublimation", "--mute", "--seed", "7"]).overlay(&saved);
        assert!(toggle_sound(&mut run, &mut saved));
        save_settings_atomic(&path, &saved).unwrap();

        let next = Args::parse_from(["sublimation"]).overlay(&load_settings(&path));
        assert!(next.sound_enabled);
        assert_eq!(next.seed, Settings::default().seed);
    }

    #[test]
    fn log_file_is_truncated_each_run() {
        let path = scratch("log").join("sublimation.log");
        fs::write(&path, "previous session\n").unwrap();
        drop(open_log(&path).unwrap());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }
}
