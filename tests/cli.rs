use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn photobooth_cmd() -> Command {
    Command::cargo_bin("photobooth").expect("binary exists")
}

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbaImage::from_pixel(width, height, image::Rgba([250, 120, 140, 255]))
        .save(path)
        .unwrap();
}

fn exported_pngs(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with("photobooth-") && name.ends_with(".png"))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn help_prints_usage() {
    photobooth_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Photobooth frames"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("shoot"));
}

#[test]
fn shoot_requires_a_camera_source() {
    photobooth_cmd()
        .arg("shoot")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn export_builds_frame_from_scene() {
    let temp = TempDir::new().unwrap();
    write_png(&temp.path().join("photo.png"), 32, 24);
    write_png(&temp.path().join("sticker.png"), 10, 10);
    std::fs::write(
        temp.path().join("scene.toml"),
        r##"
orientation = "square"

[background]
color = "#ffe4ec"

[[photos]]
path = "photo.png"

[[photos]]
path = "photo.png"

[[stickers]]
path = "sticker.png"
size = 40
"##,
    )
    .unwrap();
    let out = temp.path().join("out");

    photobooth_cmd()
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .arg("export")
        .arg("--scene")
        .arg(temp.path().join("scene.toml"))
        .arg("--output")
        .arg(&out)
        .args(["--scale", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("photobooth-"));

    let files = exported_pngs(&out);
    assert_eq!(files.len(), 1);
    let frame = image::open(out.join(&files[0])).unwrap();
    assert_eq!(frame.width(), 600);
}

#[test]
fn export_without_photos_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("empty.toml"), "orientation = \"vertical\"\n").unwrap();
    let out = temp.path().join("out");

    photobooth_cmd()
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .arg("export")
        .arg("--scene")
        .arg(temp.path().join("empty.toml"))
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one photo"));

    assert!(exported_pngs(&out).is_empty());
}

#[test]
fn shoot_with_still_image_exports_strip() {
    let temp = TempDir::new().unwrap();
    let still = temp.path().join("still.png");
    write_png(&still, 64, 48);
    let out = temp.path().join("out");

    photobooth_cmd()
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .arg("shoot")
        .arg("--still")
        .arg(&still)
        .args(["--shots", "2", "--scale", "1"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let files = exported_pngs(&out);
    assert_eq!(files.len(), 1);
    let frame = image::open(out.join(&files[0])).unwrap();
    assert_eq!(frame.width(), 800);
    assert_eq!(frame.height(), 600);
}

#[test]
fn shoot_rejects_too_many_shots() {
    let temp = TempDir::new().unwrap();
    let still = temp.path().join("still.png");
    write_png(&still, 8, 8);

    photobooth_cmd()
        .arg("shoot")
        .arg("--still")
        .arg(&still)
        .args(["--shots", "5"])
        .assert()
        .failure();
}

#[test]
fn shoot_scene_photos_are_ignored_with_a_warning() {
    let temp = TempDir::new().unwrap();
    let still = temp.path().join("still.png");
    write_png(&still, 16, 12);
    let scene = temp.path().join("overlay.toml");
    std::fs::write(
        &scene,
        "orientation = \"square\"\n\n[[photos]]\npath = \"never-read.png\"\n",
    )
    .unwrap();
    let out = temp.path().join("out");

    photobooth_cmd()
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .arg("shoot")
        .arg("--still")
        .arg(&still)
        .args(["--shots", "1", "--scale", "1"])
        .arg("--scene")
        .arg(&scene)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring 1 scene photos"));

    let files = exported_pngs(&out);
    assert_eq!(files.len(), 1);
    let frame = image::open(out.join(&files[0])).unwrap();
    assert_eq!(frame.width(), 600);
}
