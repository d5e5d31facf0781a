use crate::globe::hit::HIT_THRESHOLD;
use crate::globe::view::{RenderMode, START_ROTATION_Y, START_TILT};
use crate::globe::GlobeOptions;
use crate::settings::GlobeSettings;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Environment override for the motion preference.
pub const REDUCED_MOTION_ENV: &str = "TERMGLOBE_REDUCED_MOTION";

/// Default wait before mounting a globe that is barely on screen.
const INIT_FALLBACK: Duration = Duration::from_secs(2);

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobeArgs {
    /// Locations JSON file (defaults to the built-in set)
    #[arg(short, long)]
    pub locations: Option<PathBuf>,

    /// Landmass outline JSON file (defaults to the built-in outlines)
    #[arg(long)]
    pub landmass: Option<PathBuf>,

    /// Map texture: file path, file:// or http(s):// URL (repeatable, tried in order)
    #[arg(short = 'x', long = "texture")]
    pub textures: Vec<String>,

    /// Disable animation: one static frame, repainted only on input
    #[arg(short, long)]
    pub reduced_motion: bool,

    /// Exit after this many seconds (print: seconds of animation to simulate)
    #[arg(short, long)]
    pub time: Option<f64>,

    /// Random seed for stars and particles
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Everything a run needs, after merging flags, environment and settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeConfig {
    pub mode: RenderMode,
    pub reduced_motion: bool,
    pub auto_rotate: bool,
    pub start_rotation_y: f64,
    pub start_tilt: f64,
    pub hit_threshold: f64,
    pub locations: Option<PathBuf>,
    pub landmass: Option<PathBuf>,
    pub textures: Vec<String>,
    pub seed: Option<u64>,
    pub time: Option<f64>,
    pub init_fallback: Duration,
}

/// Read a motion preference value. Unknown values are ignored.
pub fn parse_motion_pref(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "reduce" => Some(true),
        "0" | "false" | "no" | "off" | "no-preference" => Some(false),
        _ => None,
    }
}

impl GlobeConfig {
    /// Priority: CLI flag, then environment, then config file. The flag can
    /// only switch reduced motion on.
    pub fn resolve(mode: RenderMode, args: &GlobeArgs, env_motion: Option<&str>, settings: &GlobeSettings) -> Self {
        let reduced_motion = args.reduced_motion
            || env_motion
                .and_then(parse_motion_pref)
                .or(settings.reduced_motion)
                .unwrap_or(false);

        let textures = if args.textures.is_empty() {
            settings.textures.clone()
        } else {
            args.textures.clone()
        };

        Self {
            mode,
            reduced_motion,
            auto_rotate: settings.auto_rotate.unwrap_or(true),
            start_rotation_y: settings.start_rotation_y.unwrap_or(START_ROTATION_Y),
            start_tilt: settings.start_tilt.unwrap_or(START_TILT),
            hit_threshold: settings.hit_threshold.filter(|t| *t > 0.0).unwrap_or(HIT_THRESHOLD),
            locations: args.locations.clone().or_else(|| settings.locations.clone()),
            landmass: args.landmass.clone().or_else(|| settings.landmass.clone()),
            textures,
            seed: args.seed,
            time: args.time.filter(|t| t.is_finite() && *t >= 0.0),
            init_fallback: settings.init_fallback_ms.map(Duration::from_millis).unwrap_or(INIT_FALLBACK),
        }
    }

    /// Resolve against the process environment.
    pub fn from_env(mode: RenderMode, args: &GlobeArgs, settings: &GlobeSettings) -> Self {
        let env = std::env::var(REDUCED_MOTION_ENV).ok();
        Self::resolve(mode, args, env.as_deref(), settings)
    }

    pub fn globe_options(&self) -> GlobeOptions {
        GlobeOptions {
            mode: self.mode,
            reduced_motion: self.reduced_motion,
            auto_rotate: self.auto_rotate,
            start_rotation_y: self.start_rotation_y,
            start_tilt: self.start_tilt,
            hit_threshold: self.hit_threshold,
            textures: self.textures.clone(),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_pref_values() {
        assert_eq!(parse_motion_pref("reduce"), Some(true));
        assert_eq!(parse_motion_pref(" TRUE "), Some(true));
        assert_eq!(parse_motion_pref("no-preference"), Some(false));
        assert_eq!(parse_motion_pref("maybe"), None);
    }

    #[test]
    fn flag_beats_env_beats_settings() {
        let settings = GlobeSettings {
            reduced_motion: Some(true),
            ..GlobeSettings::default()
        };
        let mut args = GlobeArgs::default();

        let cfg = GlobeConfig::resolve(RenderMode::Sphere, &args, Some("0"), &settings);
        assert!(!cfg.reduced_motion);
        let cfg = GlobeConfig::resolve(RenderMode::Sphere, &args, Some("garbage"), &settings);
        assert!(cfg.reduced_motion);
        let cfg = GlobeConfig::resolve(RenderMode::Sphere, &args, None, &GlobeSettings::default());
        assert!(!cfg.reduced_motion);

        args.reduced_motion = true;
        let cfg = GlobeConfig::resolve(RenderMode::Sphere, &args, Some("0"), &GlobeSettings::default());
        assert!(cfg.reduced_motion);
    }

    #[test]
    fn cli_textures_replace_configured_ones() {
        let settings = GlobeSettings {
            textures: vec!["/a.png".into()],
            hit_threshold: Some(-4.0),
            ..GlobeSettings::default()
        };
        let cfg = GlobeConfig::resolve(RenderMode::Flat, &GlobeArgs::default(), None, &settings);
        assert_eq!(cfg.textures, vec!["/a.png".to_string()]);
        assert_eq!(cfg.hit_threshold, HIT_THRESHOLD);

        let args = GlobeArgs {
            textures: vec!["/b.png".into()],
            ..GlobeArgs::default()
        };
        let cfg = GlobeConfig::resolve(RenderMode::Flat, &args, None, &settings);
        assert_eq!(cfg.textures, vec!["/b.png".to_string()]);
        assert_eq!(cfg.globe_options().mode, RenderMode::Flat);
    }
}
