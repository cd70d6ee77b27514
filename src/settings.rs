use std::path::{Path, PathBuf};

use image::Rgb;

use crate::components::colors::{COLOR_HISTORY_CAPACITY, parse_hex_color, to_hex};
use crate::components::history::HISTORY_CAPACITY;
use crate::error::PaintError;
use crate::gallery::GALLERY_CAPACITY;

/// Painter settings that persist across sessions.
///
/// Stored as `key=value` lines; unknown keys and unparsable values are
/// ignored so an old or hand-edited file never prevents startup.
#[derive(Clone, Debug, PartialEq)]
pub struct PainterSettings {
    /// Maximum number of undo snapshots
    pub history_capacity: usize,
    /// Recently used colors kept in the palette
    pub color_history_capacity: usize,
    /// Artworks kept in the local gallery
    pub gallery_capacity: usize,
    pub brush_size: u32,
    pub brush_color: Rgb<u8>,
    /// A press released within this many pixels of where it started counts
    /// as a click (stamp) rather than a drag.
    pub click_tolerance: f32,
    /// Push an undo snapshot at the end of every painted stroke.
    pub snapshot_strokes: bool,
    /// Asset key of the base rock image
    pub base_image: String,
    /// Asset keys of the stamp carousel, in order
    pub stamps: Vec<String>,
    /// Seed for spray, glitter and stamp rotation
    pub seed: u32,
}

impl Default for PainterSettings {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            color_history_capacity: COLOR_HISTORY_CAPACITY,
            gallery_capacity: GALLERY_CAPACITY,
            brush_size: 10,
            brush_color: Rgb([0xFF, 0x69, 0xB4]),
            click_tolerance: 3.0,
            snapshot_strokes: false,
            base_image: "rock_base1.png".to_string(),
            stamps: vec![
                "stamp_rock1.png".to_string(),
                "stamp_rock2.png".to_string(),
                "stamp_rock3.png".to_string(),
            ],
            seed: 0x5EED,
        }
    }
}

impl PainterSettings {
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            return Some(PathBuf::from(appdata).join("RockPaint").join("rockpaint_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("RockPaint")
                    .join("rockpaint_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?;
            Some(config_dir.join("rockpaint").join("rockpaint_settings.cfg"))
        }
    }

    /// Load from the platform settings file, falling back to defaults.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), PaintError> {
        let path = Self::settings_path()
            .ok_or_else(|| PaintError::InvalidInput("no settings directory".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PaintError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())?;
        Ok(())
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "history_capacity={}\n\
             color_history_capacity={}\n\
             gallery_capacity={}\n\
             brush_size={}\n\
             brush_color={}\n\
             click_tolerance={}\n\
             snapshot_strokes={}\n\
             base_image={}\n\
             stamps={}\n\
             seed={}\n",
            self.history_capacity,
            self.color_history_capacity,
            self.gallery_capacity,
            self.brush_size,
            to_hex(self.brush_color),
            self.click_tolerance,
            self.snapshot_strokes,
            self.base_image,
            self.stamps.join(","),
            self.seed,
        )
    }

    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "history_capacity" => {
                    if let Ok(v) = val.parse::<usize>() { s.history_capacity = v.max(1); }
                }
                "color_history_capacity" => {
                    if let Ok(v) = val.parse::<usize>() { s.color_history_capacity = v.max(1); }
                }
                "gallery_capacity" => {
                    if let Ok(v) = val.parse::<usize>() { s.gallery_capacity = v.max(1); }
                }
                "brush_size" => {
                    if let Ok(v) = val.parse::<u32>() { s.brush_size = v.max(1); }
                }
                "brush_color" => {
                    if let Ok(c) = parse_hex_color(val) { s.brush_color = c; }
                }
                "click_tolerance" => {
                    if let Ok(v) = val.parse::<f32>() && v >= 0.0 { s.click_tolerance = v; }
                }
                "snapshot_strokes" => {
                    s.snapshot_strokes = val == "true";
                }
                "base_image" => {
                    if !val.is_empty() { s.base_image = val.to_string(); }
                }
                "stamps" => {
                    s.stamps = val
                        .split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "seed" => {
                    if let Ok(v) = val.parse::<u32>() { s.seed = v; }
                }
                _ => {}
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_string_round_trips() {
        let mut settings = PainterSettings::default();
        settings.brush_size = 7;
        settings.snapshot_strokes = true;
        settings.stamps = vec!["a.png".into(), "b.png".into()];
        settings.brush_color = Rgb([1, 2, 3]);
        assert_eq!(PainterSettings::parse(&settings.to_config_string()), settings);
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let s = PainterSettings::parse(
            "history_capacity=lots\nbrush_color=#zzzzzz\nclick_tolerance=-4\nunknown=1\nnot a line\n",
        );
        assert_eq!(s, PainterSettings::default());
    }

    #[test]
    fn huge_capacities_do_not_preallocate() {
        let s = PainterSettings::parse(
            "history_capacity=18446744073709551615\ncolor_history_capacity=1000000000000000000\n",
        );
        assert_eq!(s.history_capacity, usize::MAX);
        let project = crate::project::Project::new(s);
        assert_eq!(project.history().capacity(), usize::MAX);
        assert_eq!(project.color_history().capacity(), 1_000_000_000_000_000_000);
        assert_eq!(project.color_history().len(), 3);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("rockpaint-no-such-dir").join("settings.cfg");
        assert_eq!(PainterSettings::load_from(&path), PainterSettings::default());
    }
}
