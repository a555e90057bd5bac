//! Very small block layout: enough geometry for viewport intersection

use crate::dom::Document;
use crate::Viewport;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Grow by `margin` on every side
    pub fn expand(&self, margin: u32) -> Rect {
        let m = margin.min(i32::MAX as u32) as i32;
        Rect {
            x: self.x.saturating_sub(m),
            y: self.y.saturating_sub(m),
            width: self.width.saturating_add(margin.saturating_mul(2)),
            height: self.height.saturating_add(margin.saturating_mul(2)),
        }
    }

    /// Edge-touching rectangles intersect, matching IntersectionObserver.
    /// A zero-area target still intersects when it lies inside `self`.
    pub fn intersects(&self, other: &Rect) -> bool {
        (self.x as i64) <= other.right()
            && (other.x as i64) <= self.right()
            && (self.y as i64) <= other.bottom()
            && (other.y as i64) <= self.bottom()
    }
}

const MARGIN: u32 = 8;
const DEFAULT_IMG_WIDTH: u32 = 300;
const DEFAULT_IMG_HEIGHT: u32 = 150;

fn block_height(tag: &str) -> Option<u32> {
    // 8px glyphs, scale 2 for headings, plus padding
    match tag {
        "h1" | "h2" | "h3" => Some(8 * 2 + 8 * 2),
        "p" => Some(8 + 6 * 2),
        _ => None,
    }
}

fn dimension(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().trim_end_matches("px").parse::<u32>().ok())
}

/// Stack `img`, heading and paragraph boxes vertically with an 8px margin
/// and record each box on its element. Other elements get no box and so
/// never intersect the viewport.
pub fn layout_document(document: &mut Document, viewport: Viewport) {
    let mut y = MARGIN;
    let max_width = viewport.width.saturating_sub(MARGIN * 2);

    for (_, el) in document.iter_mut() {
        let (width, height) = if el.tag() == "img" {
            let w = dimension(el.attr("width")).unwrap_or(DEFAULT_IMG_WIDTH);
            let h = dimension(el.attr("height")).unwrap_or(DEFAULT_IMG_HEIGHT);
            (w.min(max_width), h)
        } else if let Some(h) = block_height(el.tag()) {
            (max_width, h)
        } else {
            continue;
        };

        el.set_bounds(Rect::new(MARGIN as i32, y.min(i32::MAX as u32) as i32, width, height));
        y = y.saturating_add(height).saturating_add(MARGIN);
    }
}
