use std::path::Path;

use tessera::config::Config;
use tessera::{demo, parser, Error, Preview};

fn tutorial_source() -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/tutorial.layout");
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn tutorial_file_matches_builtin_screen() {
    let parsed = parser::parse(&tutorial_source()).unwrap();
    assert_eq!(parsed, demo::tutorial_screen());
}

#[test]
fn tutorial_file_needs_its_image() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/tutorial.layout");
    let preview = Preview::from_file(&path, &Config::default()).unwrap();
    match preview.render(200, 200) {
        Err(Error::MissingImage(id)) => assert_eq!(id, demo::CARD_IMAGE),
        other => panic!("expected a missing image, got {:?}", other.map(|fb| fb.width)),
    }
}

#[test]
fn tutorial_renders_with_asset_dir() {
    let dir = tempfile::tempdir().unwrap();
    let img = image::RgbaImage::from_pixel(32, 20, image::Rgba([200, 16, 46, 255]));
    img.save(dir.path().join("aj1.png")).unwrap();

    let config = Config {
        width: 480,
        height: 1280,
        assets_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/tutorial.layout");
    let preview = Preview::from_file(&path, &config).unwrap();
    let fb = preview.render(config.width, config.height).unwrap();
    assert_eq!((fb.width, fb.height), (480, 1280));

    let out = dir.path().join("tutorial.png");
    fb.save_png(&out).unwrap();
    assert!(out.metadata().unwrap().len() > 0);
}

#[test]
fn parse_errors_carry_positions() {
    let src = "column {\n    text \"ok\"\n    row width=12px\n}\n";
    let err = parser::parse(src).unwrap_err();
    assert_eq!((err.line, err.col), (3, 15));
}
