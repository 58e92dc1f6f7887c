//! Font registration for the `ab_glyph` text path, which does not discover OS fonts.
//!
//! The first readable TrueType file from `GDPV_FONT` or a list of common system
//! locations is registered as the "sans-serif" family, once per process.

use log::{debug, warn};
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable naming a `.ttf` file to use for chart text.
pub const FONT_ENV: &str = "GDPV_FONT";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Path of the registered chart font, registering one on first use.
pub fn ensure_font_registered() -> Option<&'static Path> {
    REGISTERED.get_or_init(register_first_font).as_deref()
}

pub fn font_available() -> bool {
    ensure_font_registered().is_some()
}

fn register_first_font() -> Option<PathBuf> {
    let from_env = std::env::var_os(FONT_ENV).map(PathBuf::from);
    let candidates = from_env
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters keeps a reference to the font data for the rest of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font("sans-serif", FontStyle::Normal, bytes).is_ok() {
            debug!("chart font: {}", path.display());
            return Some(path);
        }
        warn!("{} is not a usable TrueType font", path.display());
    }

    warn!("no TrueType font found; set {} to render charts", FONT_ENV);
    None
}
