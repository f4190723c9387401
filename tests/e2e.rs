//! End-to-end tests for png2pdf.
//!
//! Images are generated in memory with the `image` crate and every produced
//! PDF is parsed back with `lopdf`, so these tests need no fixtures and no
//! external tools.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::Document;
use png2pdf::{
    compute_placement, convert, convert_files, convert_to_file, AlphaMode, ChannelProgressCallback,
    Conversion, ConversionConfig, ConversionProgressCallback, NoopProgressCallback, Orientation,
    PageSize, Png2PdfError, ProgressCallback,
};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn encode(img: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("PNG encoding should succeed");
    buf
}

fn png(w: u32, h: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        w,
        h,
        Rgb([40, 90, 160]),
    )))
}

fn transparent_png(w: u32, h: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        w,
        h,
        Rgba([255, 0, 0, 100]),
    )))
}

/// Per page, the pixel size of the first image drawn on it.
fn page_image_sizes(pdf: &[u8]) -> Vec<(i64, i64)> {
    let doc = Document::load_mem(pdf).expect("output must be a parseable PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            let image_id = xobjects.get(b"Im1").unwrap().as_reference().unwrap();
            let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
            (
                image.dict.get(b"Width").unwrap().as_i64().unwrap(),
                image.dict.get(b"Height").unwrap().as_i64().unwrap(),
            )
        })
        .collect()
}

#[derive(Default)]
struct PercentRecorder {
    seen: Mutex<Vec<f64>>,
}

impl ConversionProgressCallback for PercentRecorder {
    fn on_progress(&self, percent: f64) {
        self.seen.lock().unwrap().push(percent);
    }
}

// ── Layout scenarios ─────────────────────────────────────────────────────────

#[test]
fn test_wide_image_spans_page_width() {
    let p = compute_placement(200.0, 100.0, 210.0, 297.0);
    assert_eq!(p.draw_width, 210.0);
    assert_eq!(p.draw_height, 105.0);
    assert_eq!(p.offset_x, 0.0);
    assert_eq!(p.offset_y, 96.0);
}

#[test]
fn test_tall_image_spans_page_height() {
    let p = compute_placement(100.0, 200.0, 210.0, 297.0);
    assert_eq!(p.draw_height, 297.0);
    assert_eq!(p.draw_width, 148.5);
    assert_eq!(p.offset_y, 0.0);
    assert_eq!(p.offset_x, 30.75);
}

// ── Conversion scenarios ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_input_is_invalid() {
    let result = convert(Vec::new(), &ConversionConfig::default()).await;
    assert!(
        matches!(result, Err(Png2PdfError::InvalidInput { .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_undecodable_image_fails_whole_run() {
    init_tracing();
    let result = convert(
        vec![b"\x89PNG\r\n\x1a\nnot really".to_vec()],
        &ConversionConfig::default(),
    )
    .await;
    assert!(
        matches!(result, Err(Png2PdfError::DecodeFailure { page: 1, .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_bad_image_in_the_middle_aborts() {
    let result = convert(
        vec![png(10, 10), b"garbage".to_vec(), png(10, 10)],
        &ConversionConfig::default(),
    )
    .await;
    match result {
        Err(e) => assert_eq!(e.page(), Some(2)),
        Ok(_) => panic!("a bad image must abort the run"),
    }
}

#[tokio::test]
async fn test_three_images_make_three_pages_in_order() {
    init_tracing();
    let output = convert(
        vec![png(30, 10), png(10, 30), png(20, 20)],
        &ConversionConfig::default(),
    )
    .await
    .expect("conversion should succeed");

    assert_eq!(output.stats.total_pages, 3);
    assert_eq!(
        output.pages.iter().map(|p| p.page_num).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        page_image_sizes(&output.pdf),
        vec![(30, 10), (10, 30), (20, 20)]
    );
}

#[tokio::test]
async fn test_single_image_makes_single_page() {
    let output = convert(vec![png(5, 5)], &ConversionConfig::default())
        .await
        .unwrap();
    assert_eq!(page_image_sizes(&output.pdf).len(), 1);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let recorder = Arc::new(PercentRecorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(recorder.clone() as ProgressCallback)
        .build()
        .unwrap();

    convert((0..4).map(|_| png(8, 8)).collect(), &config)
        .await
        .unwrap();

    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_progress_resets_between_runs() {
    let recorder = Arc::new(PercentRecorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(recorder.clone() as ProgressCallback)
        .build()
        .unwrap();

    convert(vec![png(2, 2)], &config).await.unwrap();
    convert(vec![png(2, 2)], &config).await.unwrap();

    let seen = recorder.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![0.0, 100.0, 0.0, 100.0]);
}

#[tokio::test]
async fn test_channel_progress() {
    let (cb, mut rx) = ChannelProgressCallback::channel();
    let config = ConversionConfig::builder()
        .progress_callback(cb)
        .build()
        .unwrap();

    let handle = tokio::spawn(async move { convert(vec![png(3, 3), png(3, 3)], &config).await });
    let mut values = Vec::new();
    while let Some(v) = rx.recv().await {
        values.push(v);
    }
    handle.await.unwrap().unwrap();
    assert_eq!(values, vec![0.0, 50.0, 100.0]);
}

#[tokio::test]
async fn test_landscape_letter_media_box() {
    let config = ConversionConfig::builder()
        .page_size(PageSize::Letter)
        .orientation(Orientation::Landscape)
        .build()
        .unwrap();
    let output = convert(vec![png(100, 50)], &config).await.unwrap();

    let doc = Document::load_mem(&output.pdf).unwrap();
    let pages_id = doc
        .catalog()
        .unwrap()
        .get(b"Pages")
        .unwrap()
        .as_reference()
        .unwrap();
    let pages = doc.get_object(pages_id).unwrap().as_dict().unwrap();
    let media_box = pages.get(b"MediaBox").unwrap().as_array().unwrap();
    let w = media_box[2].as_float().unwrap();
    let h = media_box[3].as_float().unwrap();
    assert!((w - 792.0).abs() < 0.01, "width {w}");
    assert!((h - 612.0).abs() < 0.01, "height {h}");
}

#[tokio::test]
async fn test_transparency_modes() {
    let masked = convert(vec![transparent_png(4, 4)], &ConversionConfig::default())
        .await
        .unwrap();
    let flattened = convert(
        vec![transparent_png(4, 4)],
        &ConversionConfig::builder()
            .alpha(AlphaMode::Flatten)
            .build()
            .unwrap(),
    )
    .await
    .unwrap();

    let has_smask = |pdf: &[u8]| {
        let doc = Document::load_mem(pdf).unwrap();
        doc.objects.values().any(|o| {
            o.as_stream()
                .map(|s| s.dict.get(b"SMask").is_ok())
                .unwrap_or(false)
        })
    };
    assert!(has_smask(&masked.pdf));
    assert!(!has_smask(&flattened.pdf));
}

#[tokio::test]
async fn test_conversion_object_runs_once() {
    let conversion = Conversion::new(vec![png(2, 3)], &ConversionConfig::default()).unwrap();
    assert_eq!(conversion.total_pages(), 1);
    // `run` consumes the invocation; a second run needs a new Conversion.
    let output = conversion.run().await.unwrap();
    assert!(output.pdf.starts_with(b"%PDF"));
}

// ── File-based entry points ──────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_files_preserves_argument_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for (name, w) in [("z.png", 11u32), ("a.png", 22), ("m.png", 33)] {
        let p = dir.path().join(name);
        std::fs::write(&p, png(w, 7)).unwrap();
        paths.push(p);
    }

    let output = convert_files(&paths, &ConversionConfig::default())
        .await
        .unwrap();
    assert_eq!(page_image_sizes(&output.pdf), vec![(11, 7), (22, 7), (33, 7)]);
}

#[tokio::test]
async fn test_convert_files_missing_file() {
    let result = convert_files(
        &[PathBuf::from("/definitely/not/a/real/image.png")],
        &ConversionConfig::default(),
    )
    .await;
    assert!(
        matches!(result, Err(Png2PdfError::FileNotFound { .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_convert_to_file_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    std::fs::write(&input, png(12, 34)).unwrap();
    let out = dir.path().join("nested/out.pdf");

    let output = convert_to_file(&[input], &out, &ConversionConfig::default())
        .await
        .unwrap();

    let written = std::fs::read(&out).unwrap();
    assert_eq!(written, output.pdf);
    assert_eq!(page_image_sizes(&written), vec![(12, 34)]);
}

#[tokio::test]
async fn test_failed_run_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"not a png").unwrap();
    let out = dir.path().join("out.pdf");

    let result = convert_to_file(&[input], &out, &ConversionConfig::default()).await;
    assert!(result.is_err());
    assert!(!out.exists());
}

// ── Runtime integration ──────────────────────────────────────────────────────

#[test]
fn test_block_on_convert() {
    let output = tokio_test::block_on(convert(vec![png(6, 2)], &ConversionConfig::default()))
        .expect("conversion should succeed");
    assert_eq!(output.pages[0].image_width, 6);
}

#[test]
fn test_noop_callback_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NoopProgressCallback>();
    assert_send_sync::<ConversionConfig>();
}
