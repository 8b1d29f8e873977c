//! Display configuration
//!
//! Styling for the heatmap strip and detail-view overlays, the selection
//! limit, and figure sizes. Every field has a default, so a JSON file only
//! needs the keys it changes:
//!
//! ```json
//! { "selection_limit": 3, "strip": { "color": [0, 0, 255], "size": 4, "pick_radius": 5 } }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dispatch::DEFAULT_SELECTION_LIMIT;
use crate::render::{LineStyle, MarkerStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Markers of the pickable strip beside the heatmap
    pub strip: MarkerStyle,
    /// Detail-view overlay styles: IP first, then control
    pub browser_styles: [LineStyle; 2],
    /// Largest selection that still spawns detail views
    pub selection_limit: usize,
    pub heatmap_size: (u32, u32),
    pub detail_size: (u32, u32),
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            strip: MarkerStyle::default(),
            browser_styles: [
                LineStyle::new((255, 0, 0), 2).labeled("IP"),
                LineStyle::new((0, 0, 0), 1).labeled("control"),
            ],
            selection_limit: DEFAULT_SELECTION_LIMIT,
            heatmap_size: (800, 1000),
            detail_size: (900, 500),
        }
    }
}

impl DisplayConfig {
    /// Load from a JSON file; missing keys take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        log::debug!("Loaded display config from {}", path.as_ref().display());
        Ok(config)
    }
}
