//! Luxe Polish image layer
//!
//! Responsive image URLs for pre-optimized variants and viewport-driven
//! lazy loading for the Luxe Polish marketing site.
//!
//! # Features
//!
//! - **URL building**: `<base>/<name>[-<w>w].<ext>` paths, `srcset`
//!   strings over fixed breakpoints and `<picture>` sources per format
//! - **Breakpoint selection**: pick the variant width for a container
//! - **Lazy loading**: a controller that swaps in deferred sources as
//!   elements approach the viewport, over an injected intersection provider
//!
//! # Example
//!
//! ```
//! use luxeimg::dom::Document;
//! use luxeimg::lazy::LazyLoadController;
//! use luxeimg::layout::layout_document;
//! use luxeimg::platform::ViewportPlatform;
//! use luxeimg::{Config, Viewport};
//!
//! let config = Config {
//!     viewport: Viewport { width: 375, height: 400 },
//!     ..Default::default()
//! };
//! let html = r#"<img width="300" height="900"><img class="lazy" data-src="/images/optimized/sofa-640w.webp">"#;
//! let mut doc = Document::parse_html(html).unwrap();
//! layout_document(&mut doc, config.viewport);
//!
//! let platform = ViewportPlatform::new(config.viewport, config.lazy.root_margin);
//! let mut controller = LazyLoadController::from_platform(config.lazy.clone(), &platform);
//! controller.activate(&doc);
//! assert!(controller.process(&mut doc).is_empty());
//!
//! platform.root().scroll_to(600);
//! assert_eq!(controller.process(&mut doc).len(), 1);
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{Config, ImageConfig, LazyLoadConfig};

pub mod dom;
pub mod image;
pub mod layout;
pub mod lazy;

// Intersection primitive and the platform surface that may offer it
pub mod platform;

pub use image::{build_image_url, build_responsive_set, select_breakpoint, try_select_breakpoint, ImageFormat, BREAKPOINTS};
pub use lazy::{LazyLoadController, LoadState};

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.lazy.root_margin, 50);
    }

    #[test]
    fn test_viewport() {
        let viewport = Viewport {
            width: 1920,
            height: 1080,
        };
        assert_eq!(select_breakpoint(viewport.width), 1920);
    }
}
