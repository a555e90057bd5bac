//! Image URL building for pre-optimized variants.
//!
//! Optimized images live under a fixed base directory and follow the
//! naming convention `<base_path><name>[-<width>w].<ext>`. Every function
//! here is a pure string computation: nothing touches the filesystem and
//! nothing checks that the referenced file exists.
//!
//! ```
//! use luxeimg::image::{build_image_url, select_breakpoint, ImageFormat};
//!
//! let width = select_breakpoint(800);
//! assert_eq!(width, 1024);
//! assert_eq!(
//!     build_image_url("sofa-polish", Some(width), ImageFormat::Webp),
//!     "/images/optimized/sofa-polish-1024w.webp"
//! );
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Directory every optimized variant lives under
pub const DEFAULT_BASE_PATH: &str = "/images/optimized/";

/// Fixed responsive breakpoints in CSS pixels, strictly ascending.
pub const BREAKPOINTS: [u32; 6] = [320, 640, 768, 1024, 1280, 1920];

const LARGEST_BREAKPOINT: u32 = BREAKPOINTS[BREAKPOINTS.len() - 1];

/// Output format of an optimized variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Avif,
    Webp,
    Jpg,
}

impl ImageFormat {
    /// Formats in preference order. Callers pick one; nothing negotiates.
    pub const PREFERENCE: [ImageFormat; 3] = [ImageFormat::Avif, ImageFormat::Webp, ImageFormat::Jpg];

    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Avif => "avif",
            ImageFormat::Webp => "webp",
            ImageFormat::Jpg => "jpg",
        }
    }

    /// MIME type used for the `type` attribute of a `<source>` element
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Avif => "image/avif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Jpg => "image/jpeg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avif" => Ok(ImageFormat::Avif),
            "webp" => Ok(ImageFormat::Webp),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// A single image variant, built ad hoc at call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Key the variant file names are derived from
    pub base_name: String,
    /// Explicit pixel width; `None` selects the unsuffixed original
    pub width: Option<u32>,
    pub format: ImageFormat,
}

impl ImageDescriptor {
    pub fn new(base_name: impl Into<String>, width: Option<u32>, format: ImageFormat) -> Self {
        Self {
            base_name: base_name.into(),
            width,
            format,
        }
    }

    /// URL under the default base path
    pub fn url(&self) -> String {
        build_image_url(&self.base_name, self.width, self.format)
    }
}

/// One `<source>` of a `<picture>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PictureSource {
    pub format: ImageFormat,
    pub mime_type: String,
    pub srcset: String,
}

/// URL builder bound to a base directory.
///
/// The free functions in this module use [`DEFAULT_BASE_PATH`]; construct a
/// builder when the site serves optimized images from somewhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    base_path: String,
}

impl ImageUrlBuilder {
    /// A trailing `/` is appended to a non-empty base path that lacks one.
    pub fn new(base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.is_empty() && !base_path.ends_with('/') {
            base_path.push('/');
        }
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `<base_path><base_name>[-<size>w].<ext>`. An empty `base_name` is
    /// passed through as-is.
    pub fn image_url(&self, base_name: &str, size: Option<u32>, format: ImageFormat) -> String {
        match size {
            Some(w) => format!("{}{}-{}w.{}", self.base_path, base_name, w, format.extension()),
            None => format!("{}{}.{}", self.base_path, base_name, format.extension()),
        }
    }

    /// `srcset` value with one `<url> <w>w` candidate per breakpoint,
    /// ascending.
    pub fn responsive_set(&self, base_name: &str, format: ImageFormat) -> String {
        BREAKPOINTS
            .iter()
            .map(|&w| format!("{} {}w", self.image_url(base_name, Some(w), format), w))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One source per format, in [`ImageFormat::PREFERENCE`] order.
    pub fn picture_sources(&self, base_name: &str) -> Vec<PictureSource> {
        ImageFormat::PREFERENCE
            .iter()
            .map(|&format| PictureSource {
                format,
                mime_type: format.mime_type().to_string(),
                srcset: self.responsive_set(base_name, format),
            })
            .collect()
    }

    /// Largest JPEG variant, for the `<img>` fallback inside `<picture>`
    pub fn fallback_src(&self, base_name: &str) -> String {
        self.image_url(base_name, Some(LARGEST_BREAKPOINT), ImageFormat::Jpg)
    }
}

impl Default for ImageUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

pub fn build_image_url(base_name: &str, size: Option<u32>, format: ImageFormat) -> String {
    ImageUrlBuilder::default().image_url(base_name, size, format)
}

pub fn build_responsive_set(base_name: &str, format: ImageFormat) -> String {
    ImageUrlBuilder::default().responsive_set(base_name, format)
}

pub fn picture_sources(base_name: &str) -> Vec<PictureSource> {
    ImageUrlBuilder::default().picture_sources(base_name)
}

pub fn fallback_src(base_name: &str) -> String {
    ImageUrlBuilder::default().fallback_src(base_name)
}

/// Smallest breakpoint that covers `container_width`, or the largest
/// breakpoint when the container is wider than all of them.
pub fn select_breakpoint(container_width: u32) -> u32 {
    BREAKPOINTS
        .iter()
        .copied()
        .find(|&b| b >= container_width)
        .unwrap_or(LARGEST_BREAKPOINT)
}

/// [`select_breakpoint`] for fractional CSS pixel widths.
///
/// Fractions round up so the chosen variant never undershoots the
/// container. Negative and non-finite widths are rejected.
pub fn try_select_breakpoint(container_width: f64) -> Result<u32> {
    if !container_width.is_finite() || container_width < 0.0 {
        return Err(Error::InvalidWidth(container_width));
    }
    let ceil = container_width.ceil();
    if ceil > LARGEST_BREAKPOINT as f64 {
        return Ok(LARGEST_BREAKPOINT);
    }
    Ok(select_breakpoint(ceil as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_with_width_has_suffix() {
        for &w in BREAKPOINTS.iter() {
            for f in ImageFormat::PREFERENCE {
                let url = build_image_url("teak-table", Some(w), f);
                assert!(url.starts_with("/images/optimized/teak-table"));
                assert!(url.ends_with(&format!("-{}w.{}", w, f)), "{}", url);
            }
        }
    }

    #[test]
    fn url_without_width_has_no_suffix() {
        assert_eq!(
            build_image_url("teak-table", None, ImageFormat::Avif),
            "/images/optimized/teak-table.avif"
        );
    }

    #[test]
    fn empty_base_name_passes_through() {
        assert_eq!(build_image_url("", None, ImageFormat::Jpg), "/images/optimized/.jpg");
        assert_eq!(build_image_url("", Some(320), ImageFormat::Jpg), "/images/optimized/-320w.jpg");
    }

    #[test]
    fn descriptor_builds_same_url() {
        let d = ImageDescriptor::new("cabinet", Some(768), ImageFormat::Jpg);
        assert_eq!(d.url(), build_image_url("cabinet", Some(768), ImageFormat::Jpg));
        assert_eq!(ImageDescriptor::new("cabinet", None, ImageFormat::Jpg).url(), "/images/optimized/cabinet.jpg");
    }

    #[test]
    fn responsive_set_lists_every_breakpoint() {
        let set = build_responsive_set("hero", ImageFormat::Webp);
        let entries: Vec<&str> = set.split(", ").collect();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0], "/images/optimized/hero-320w.webp 320w");
        assert_eq!(entries[5], "/images/optimized/hero-1920w.webp 1920w");
    }

    #[test]
    fn breakpoint_selection_boundaries() {
        assert_eq!(select_breakpoint(0), 320);
        assert_eq!(select_breakpoint(320), 320);
        assert_eq!(select_breakpoint(321), 640);
        assert_eq!(select_breakpoint(800), 1024);
        assert_eq!(select_breakpoint(1024), 1024);
        assert_eq!(select_breakpoint(2000), 1920);
        assert_eq!(select_breakpoint(u32::MAX), 1920);
    }

    #[test]
    fn fractional_widths_round_up() {
        assert_eq!(try_select_breakpoint(320.0).unwrap(), 320);
        assert_eq!(try_select_breakpoint(320.2).unwrap(), 640);
        assert_eq!(try_select_breakpoint(1e12).unwrap(), 1920);
        assert_eq!(try_select_breakpoint(-0.0).unwrap(), 320);
    }

    #[test]
    fn invalid_widths_are_rejected() {
        assert!(matches!(try_select_breakpoint(-1.0), Err(Error::InvalidWidth(_))));
        assert!(try_select_breakpoint(f64::NAN).is_err());
        assert!(try_select_breakpoint(f64::INFINITY).is_err());
    }

    #[test]
    fn format_parsing() {
        assert_eq!("WEBP".parse::<ImageFormat>().unwrap(), ImageFormat::Webp);
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpg);
        assert!(matches!("png".parse::<ImageFormat>(), Err(Error::UnknownFormat(_))));
    }

    #[test]
    fn builder_normalizes_base_path() {
        let b = ImageUrlBuilder::new("https://cdn.example.com/img");
        assert_eq!(b.base_path(), "https://cdn.example.com/img/");
        assert_eq!(
            b.image_url("chair", Some(640), ImageFormat::Avif),
            "https://cdn.example.com/img/chair-640w.avif"
        );
    }

    #[test]
    fn picture_sources_follow_preference_order() {
        let sources = picture_sources("door");
        let formats: Vec<_> = sources.iter().map(|s| s.format).collect();
        assert_eq!(formats, ImageFormat::PREFERENCE.to_vec());
        assert_eq!(sources[2].mime_type, "image/jpeg");
        assert_eq!(fallback_src("door"), "/images/optimized/door-1920w.jpg");
    }
}
