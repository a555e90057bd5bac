use luxeimg::{Config, Error};
use std::fs;

#[test]
fn config_loads_from_json_file() {
    let dir = std::env::temp_dir().join(format!("luxeimg-config-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("luxeimg.json");
    fs::write(
        &path,
        r#"{ "image": { "base_path": "https://cdn.luxepolish.in/img" }, "lazy": { "root_margin": 200 } }"#,
    )
    .expect("write config");

    let cfg = Config::from_json_file(&path).expect("valid config");
    assert_eq!(cfg.lazy.root_margin, 200);
    assert_eq!(
        cfg.image.url_builder().image_url("sofa", Some(320), luxeimg::ImageFormat::Avif),
        "https://cdn.luxepolish.in/img/sofa-320w.avif"
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_config_file_is_an_io_error() {
    let res = Config::from_json_file("/nonexistent/luxeimg.json");
    assert!(matches!(res, Err(Error::Io(_))));
}
