/*
 * Framework configuration: the default font, the theme palette and the metrics
 * the dialog adapter lays out with. Stored as JSON; every field has a default
 * so partial files are accepted. Dialog metrics are logical (96 DPI) units and
 * are scaled against the dialog's own DPI when applied.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::{DialogKind, ImageSource};
use crate::styling_primitives::{FontDescription, Theme};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    pub font: FontDescription,
    /// Used when the requested family is not installed.
    pub fallback_font_family: String,
    pub theme: Theme,
    pub dialogs: DialogConfig,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            font: FontDescription::default(),
            fallback_font_family: "Tahoma".to_string(),
            theme: Theme::default(),
            dialogs: DialogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogBehavior {
    pub resizable: bool,
    pub shadow: bool,
    /// Resize to a fraction of the work area instead of the natural size.
    pub large: bool,
}

impl Default for DialogBehavior {
    fn default() -> Self {
        Self {
            resizable: true,
            shadow: true,
            large: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    pub title_bar_height: i32,
    pub border_width: i32,
    pub caption_icon_size: i32,
    /// Width of the band along each edge that resizes instead of dragging.
    pub resize_margin: i32,
    /// Percentage of the work area used by "large" dialogs.
    pub large_size_percent: i32,
    pub caption_icon: Option<ImageSource>,
    pub file: DialogBehavior,
    pub folder: DialogBehavior,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            title_bar_height: 30,
            border_width: 1,
            caption_icon_size: 16,
            resize_margin: 6,
            large_size_percent: 80,
            caption_icon: None,
            file: DialogBehavior::default(),
            folder: DialogBehavior {
                resizable: false,
                shadow: true,
                large: false,
            },
        }
    }
}

impl DialogConfig {
    pub fn behavior(&self, kind: DialogKind) -> DialogBehavior {
        match kind {
            DialogKind::OpenFile | DialogKind::SaveFile => self.file,
            DialogKind::BrowseFolder => self.folder,
        }
    }
}

impl FrameworkConfig {
    pub fn from_json_str(text: &str) -> PlatformResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /*
     * Loads the configuration from `path`. A missing file is not an error: the
     * framework runs with defaults until a configuration is saved. Anything
     * else that goes wrong (unreadable or malformed file) is reported.
     */
    pub fn load_from_file(path: &Path) -> PlatformResult<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!(
                    "Config: No configuration at {}, using defaults.",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(PlatformError::Config(format!(
                    "Failed to open {}: {e}",
                    path.display()
                )));
            }
        };
        let config: FrameworkConfig = serde_json::from_reader(BufReader::new(file))?;
        log::debug!("Config: Loaded configuration from {}.", path.display());
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> PlatformResult<()> {
        let file = File::create(path).map_err(|e| {
            PlatformError::Config(format!("Failed to create {}: {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        log::debug!("Config: Saved configuration to {}.", path.display());
        Ok(())
    }
}
