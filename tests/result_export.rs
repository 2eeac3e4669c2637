use std::io::{Cursor, Read};

use image::{ImageFormat, Rgb, RgbImage};
use mask_studio::{
    convert, Delivery, ExportArtifact, ExportFormat, ExportJob, Quality, ResultExporter,
};

/// Noisy enough that JPEG quality makes a visible difference.
fn photo_png(seed: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(64, 64, |x, y| {
        let v = x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ seed;
        Rgb([(v * 7) as u8, (v * 13) as u8, (v * 3) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[test]
fn lossy_quality_changes_output() {
    let bytes = photo_png(1);
    for (format, extension) in [(ExportFormat::Jpeg, "jpg"), (ExportFormat::WebP, "webp")] {
        let (low, ext) = convert(&bytes, format, Quality::new(10)).unwrap();
        let (high, _) = convert(&bytes, format, Quality::new(90)).unwrap();
        assert_eq!(ext, extension);
        assert_ne!(low, high, "{format:?}");
        assert!(low.len() < high.len(), "{format:?}");
        for bytes in [&low, &high] {
            let decoded = image::load_from_memory(bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (64, 64));
        }
    }
}

#[test]
fn archive_holds_numbered_entries() {
    let exporter = ResultExporter::default();
    let report = exporter
        .export_all(
            &[photo_png(1), photo_png(2), photo_png(3)],
            ExportJob {
                format: ExportFormat::Png,
                quality: None,
                delivery: Delivery::Archive,
            },
        )
        .unwrap();
    assert!(report.skipped.is_empty());
    let ExportArtifact::Archive(archive) = report.artifact else {
        panic!("expected archive");
    };
    assert_eq!(archive.name, "edited-images.zip");

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    let names: Vec<_> = zip.file_names().map(str::to_owned).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(
        sorted,
        vec!["edited-image-1.png", "edited-image-2.png", "edited-image-3.png"]
    );

    let mut entry = zip.by_name("edited-image-2.png").unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().width(), 64);
}

#[test]
fn individual_files_are_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let report = ResultExporter::default()
        .export_all(
            &[photo_png(4)],
            ExportJob {
                format: ExportFormat::Jpeg,
                quality: Some(Quality::new(50)),
                delivery: Delivery::Individual,
            },
        )
        .unwrap();
    let paths = report.artifact.write_to(dir.path()).unwrap();
    assert_eq!(paths, vec![dir.path().join("edited-image-1.jpg")]);
    let written = std::fs::read(&paths[0]).unwrap();
    assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::Jpeg);
}
