//! End-to-end export through the real `image` backend and filesystem store.

use image::{ImageEncoder, RgbImage};
use resize_export::acquire::{Acquired, FilePicker};
use resize_export::catalog::lookup;
use resize_export::config::AppConfig;
use resize_export::export::{ExportOutcome, ExportPhase, FailureStage};
use resize_export::session::Session;
use resize_export::store::CollisionPolicy;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    let writer = std::io::BufWriter::new(std::fs::File::create(path).unwrap());
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

fn write_solid_jpeg(path: &Path, color: [u8; 3]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_pixel(48, 48, image::Rgb(color));
    let writer = std::io::BufWriter::new(std::fs::File::create(path).unwrap());
    image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 100)
        .write_image(img.as_raw(), 48, 48, image::ExtendedColorType::Rgb8)
        .unwrap();
}

fn center_pixel(path: &Path) -> [u8; 3] {
    let img = image::open(path).unwrap().to_rgb8();
    img.get_pixel(img.width() / 2, img.height() / 2).0
}

fn config_in(tmp: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.export.directory = tmp.path().join("exports");
    config.resize.work_dir = tmp.path().join("work");
    config
}

#[tokio::test]
async fn exports_chosen_image_at_exact_resolution() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.jpg");
    let b = tmp.path().join("b.jpg");
    write_jpeg(&a, 120, 90);
    write_jpeg(&b, 300, 200);

    let mut session = Session::from_config(&config_in(&tmp));
    session.acquire(&FilePicker::new(Some(a))).unwrap();
    session.acquire(&FilePicker::new(Some(b))).unwrap();
    session.acquire(&FilePicker::cancelled()).unwrap();
    assert_eq!(session.selection().len(), 2);
    session.toggle_choice(1).unwrap();

    let controller = session.open_chosen().unwrap();
    controller
        .choose_resolution(lookup("1080x1350").unwrap())
        .unwrap();
    let outcome = controller.export().await.unwrap();

    let expected = tmp.path().join("exports/resizedImage.jpg");
    assert_eq!(
        outcome,
        ExportOutcome::Success {
            stored_ref: expected.clone()
        }
    );
    assert_eq!(image::image_dimensions(&expected).unwrap(), (1080, 1350));
    assert_eq!(std::fs::read_dir(tmp.path().join("work")).unwrap().count(), 0);
    assert_eq!(
        controller.phase(),
        ExportPhase::ResolutionChosen(lookup("1080x1350").unwrap())
    );

    let added = session.record_outcome(&outcome).unwrap();
    assert_eq!(PathBuf::from(added.source_ref()), expected);
}

#[tokio::test]
async fn repeated_exports_overwrite_by_default() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src.jpg");
    write_jpeg(&src, 64, 64);

    let mut session = Session::from_config(&config_in(&tmp));
    session.acquire(&FilePicker::new(Some(src))).unwrap();
    session.toggle_choice(0).unwrap();
    let controller = session.open_chosen().unwrap();

    controller
        .choose_resolution(lookup("1080x1920").unwrap())
        .unwrap();
    let first = controller.export().await.unwrap();
    controller
        .choose_resolution(lookup("1080x1350").unwrap())
        .unwrap();
    let second = controller.export().await.unwrap();

    assert_eq!(first.stored_ref(), second.stored_ref());
    let stored = second.stored_ref().unwrap();
    assert_eq!(image::image_dimensions(stored).unwrap(), (1080, 1350));
}

#[tokio::test]
async fn unique_policy_keeps_every_export() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src.jpg");
    write_jpeg(&src, 64, 64);

    let mut config = config_in(&tmp);
    config.export.collision = CollisionPolicy::Unique;
    let mut session = Session::from_config(&config);
    session.acquire(&FilePicker::new(Some(src))).unwrap();
    session.toggle_choice(0).unwrap();
    let controller = session.open_chosen().unwrap();
    controller
        .choose_resolution(lookup("1080x1920").unwrap())
        .unwrap();

    let first = controller.export().await.unwrap();
    let second = controller.export().await.unwrap();

    assert_eq!(
        first.stored_ref().unwrap(),
        tmp.path().join("exports/resizedImage.jpg")
    );
    assert_eq!(
        second.stored_ref().unwrap(),
        tmp.path().join("exports/resizedImage-1.jpg")
    );
}

#[tokio::test]
async fn source_removed_after_acquisition_fails_at_resize() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("gone.jpg");
    write_jpeg(&src, 32, 32);

    let mut session = Session::from_config(&config_in(&tmp));
    let added = session.acquire(&FilePicker::new(Some(src.clone()))).unwrap();
    assert!(added.is_some());
    std::fs::remove_file(&src).unwrap();
    session.toggle_choice(0).unwrap();

    let controller = session.open_chosen().unwrap();
    controller
        .choose_resolution(lookup("2160x2700").unwrap())
        .unwrap();
    let outcome = controller.export().await.unwrap();

    assert!(matches!(
        outcome,
        ExportOutcome::Failure {
            stage: FailureStage::Resize,
            ..
        }
    ));
    assert!(!tmp.path().join("exports").exists());
    assert!(session.record_outcome(&outcome).is_none());
}

#[tokio::test]
async fn blocked_export_directory_fails_at_store() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src.jpg");
    write_jpeg(&src, 32, 32);
    let blocker = tmp.path().join("exports");
    std::fs::write(&blocker, b"a file where the directory should be").unwrap();

    let mut session = Session::from_config(&config_in(&tmp));
    session.accept(Acquired::Cancelled);
    session.acquire(&FilePicker::new(Some(src))).unwrap();
    session.toggle_choice(0).unwrap();
    let controller = session.open_chosen().unwrap();
    controller
        .choose_resolution(lookup("1080x1920").unwrap())
        .unwrap();

    let outcome = controller.export().await.unwrap();

    assert!(matches!(
        outcome,
        ExportOutcome::Failure {
            stage: FailureStage::Store,
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn same_named_sources_export_concurrently_without_mixing() {
    let tmp = TempDir::new().unwrap();
    let red = tmp.path().join("a/x.jpg");
    let blue = tmp.path().join("b/x.jpg");
    write_solid_jpeg(&red, [230, 20, 20]);
    write_solid_jpeg(&blue, [20, 20, 230]);

    let mut config = config_in(&tmp);
    config.export.collision = CollisionPolicy::Unique;
    let mut session = Session::from_config(&config);
    session.acquire(&FilePicker::new(Some(red))).unwrap();
    session.acquire(&FilePicker::new(Some(blue))).unwrap();

    session.toggle_choice(0).unwrap();
    let red_export = session.open_chosen().unwrap();
    session.toggle_choice(1).unwrap();
    let blue_export = session.open_chosen().unwrap();
    let resolution = lookup("1080x1350").unwrap();
    red_export.choose_resolution(resolution).unwrap();
    blue_export.choose_resolution(resolution).unwrap();

    let (red_outcome, blue_outcome) = tokio::join!(red_export.export(), blue_export.export());
    let red_stored = red_outcome.unwrap().stored_ref().unwrap().to_path_buf();
    let blue_stored = blue_outcome.unwrap().stored_ref().unwrap().to_path_buf();

    assert_ne!(red_stored, blue_stored);
    let [r, _, b] = center_pixel(&red_stored);
    assert!(r > 180 && b < 80, "red export has pixel {:?}", (r, b));
    let [r, _, b] = center_pixel(&blue_stored);
    assert!(b > 180 && r < 80, "blue export has pixel {:?}", (r, b));
    assert_eq!(std::fs::read_dir(tmp.path().join("work")).unwrap().count(), 0);
}
