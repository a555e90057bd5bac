use luxeimg::image::{build_image_url, build_responsive_set, select_breakpoint, ImageFormat, BREAKPOINTS};

#[test]
fn sized_urls_end_with_width_and_extension() {
    for name in ["sofa-polish", "dining-table", ""] {
        for &w in BREAKPOINTS.iter() {
            for format in ImageFormat::PREFERENCE {
                let url = build_image_url(name, Some(w), format);
                assert!(url.starts_with(&format!("/images/optimized/{}", name)));
                assert!(url.ends_with(&format!("-{}w.{}", w, format.extension())));
            }
        }
    }
}

#[test]
fn unsized_url_has_no_width_suffix() {
    let url = build_image_url("wardrobe", None, ImageFormat::Jpg);
    assert_eq!(url, "/images/optimized/wardrobe.jpg");
    assert!(!url.contains("w."));
}

#[test]
fn srcset_is_ascending_and_matches_single_urls() {
    let set = build_responsive_set("hero-banner", ImageFormat::Webp);
    let entries: Vec<&str> = set.split(',').map(str::trim).collect();
    assert_eq!(entries.len(), 6);

    let mut last = 0u32;
    for (entry, &w) in entries.iter().zip(BREAKPOINTS.iter()) {
        let (url, descriptor) = entry.rsplit_once(' ').expect("url and width descriptor");
        let width: u32 = descriptor.trim_end_matches('w').parse().expect("numeric width");
        assert!(width > last);
        last = width;
        assert_eq!(width, w);
        assert_eq!(url, build_image_url("hero-banner", Some(w), ImageFormat::Webp));
    }
}

#[test]
fn breakpoint_selection_table() {
    assert_eq!(select_breakpoint(0), 320);
    assert_eq!(select_breakpoint(800), 1024);
    assert_eq!(select_breakpoint(2000), 1920);
    assert_eq!(select_breakpoint(1024), 1024);
}

#[test]
fn selected_breakpoint_always_covers_or_is_largest() {
    for width in (0..2500).step_by(37) {
        let b = select_breakpoint(width);
        assert!(BREAKPOINTS.contains(&b));
        assert!(b >= width || b == 1920);
        // nothing smaller would also have covered it
        assert!(BREAKPOINTS.iter().filter(|&&x| x < b).all(|&x| x < width));
    }
}
