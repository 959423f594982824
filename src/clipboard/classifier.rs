use std::io::Cursor;
use std::path::PathBuf;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use url::Url;

use super::content::{Content, Thumbnail, WebLink};
use super::rtf;
use super::snapshot::ClipboardSnapshot;

pub const THUMBNAIL_MAX_WIDTH: u32 = 80;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 18;

/// Picks one representation from the snapshot.
/// Priority: image, files, rich text, string.
pub fn classify(snapshot: &ClipboardSnapshot) -> Option<Content> {
    if snapshot.is_empty() {
        return None;
    }

    if let Some(image) = classify_image(snapshot) {
        return Some(image);
    }

    if let Some(paths) = file_paths(&snapshot.files) {
        return Some(Content::FileReference(paths));
    }

    if let Some(data) = &snapshot.rtf {
        match rtf::extract_plain_text(data) {
            Some(plain_fallback) => {
                return Some(Content::RichText {
                    rtf: data.clone(),
                    plain_fallback,
                })
            }
            None => log::debug!("RTF payload ({} bytes) did not decode, skipping", data.len()),
        }
    }

    snapshot.text.as_deref().map(classify_text)
}

/// A string is a WebUrl when it is an absolute http(s) URL with a host.
pub fn classify_text(text: &str) -> Content {
    match WebLink::parse(text) {
        Some(link) => Content::WebUrl(link),
        None => Content::PlainText(text.to_string()),
    }
}

fn classify_image(snapshot: &ClipboardSnapshot) -> Option<Content> {
    if let Some(tiff) = &snapshot.tiff {
        return Some(Content::Image {
            thumbnail: make_thumbnail(tiff),
            tiff: tiff.clone(),
        });
    }

    let png = snapshot.png.as_ref()?;
    match png_to_tiff(png) {
        Ok(tiff) => Some(Content::Image {
            thumbnail: make_thumbnail(&tiff),
            tiff,
        }),
        Err(e) => {
            log::debug!("PNG payload could not be normalized: {}", e);
            None
        }
    }
}

fn png_to_tiff(png: &[u8]) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory_with_format(png, ImageFormat::Png)?;
    let rgba = DynamicImage::ImageRgba8(decoded.to_rgba8());
    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::Tiff)?;
    Ok(out.into_inner())
}

/// Target size for a `width` x `height` image: fits inside the thumbnail
/// bounds, keeps the aspect ratio, never grows.
pub fn thumbnail_size(width: u32, height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let scale = (THUMBNAIL_MAX_HEIGHT as f64 / height as f64)
        .min(THUMBNAIL_MAX_WIDTH as f64 / width as f64)
        .min(1.0);
    let scaled_w = ((width as f64 * scale).round() as u32).max(1);
    let scaled_h = ((height as f64 * scale).round() as u32).max(1);
    (scaled_w, scaled_h)
}

/// Never fails: undecodable bytes give an empty thumbnail.
pub fn make_thumbnail(bytes: &[u8]) -> Thumbnail {
    let source = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            log::debug!("thumbnail decode failed: {}", e);
            return Thumbnail::empty();
        }
    };

    let (width, height) = thumbnail_size(source.width(), source.height());
    if width == 0 {
        return Thumbnail::empty();
    }

    let rgba = if (width, height) == (source.width(), source.height()) {
        source.to_rgba8()
    } else {
        source
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgba8()
    };

    Thumbnail {
        width,
        height,
        rgba: rgba.into_raw(),
    }
}

fn file_paths(files: &[String]) -> Option<Vec<PathBuf>> {
    let paths: Vec<PathBuf> = files
        .iter()
        .filter_map(|entry| file_path_from_entry(entry.trim()))
        .collect();
    if paths.is_empty() {
        None
    } else {
        Some(paths)
    }
}

/// Accepts `file://` URIs and absolute paths.
pub(crate) fn file_path_from_entry(entry: &str) -> Option<PathBuf> {
    if entry.starts_with("file://") {
        return Url::parse(entry).ok()?.to_file_path().ok();
    }
    let path = PathBuf::from(entry);
    path.is_absolute().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn web_urls_need_http_scheme_and_host() {
        assert!(matches!(classify_text("https://example.com/x"), Content::WebUrl(_)));
        assert!(matches!(classify_text("http://example.com"), Content::WebUrl(_)));
        assert!(matches!(classify_text("ftp://example.com"), Content::PlainText(_)));
        assert!(matches!(classify_text("https://"), Content::PlainText(_)));
        assert!(matches!(classify_text("example.com"), Content::PlainText(_)));
        assert!(matches!(
            classify_text("see https://example.com"),
            Content::PlainText(_)
        ));
    }

    #[test]
    fn copied_url_pastes_back_unchanged() {
        for text in ["https://example.com", "https://EXAMPLE.com/a?b=1", "http://example.com/ü"] {
            assert_eq!(classify_text(text).paste_text().as_deref(), Some(text));
        }
        assert_ne!(
            classify_text("https://example.com"),
            classify_text("https://example.com/")
        );
    }

    #[test]
    fn plain_text_is_kept_verbatim() {
        let snapshot = ClipboardSnapshot::text("  hello world \n");
        assert_eq!(
            classify(&snapshot),
            Some(Content::PlainText("  hello world \n".into()))
        );
    }

    #[test]
    fn empty_snapshot_is_not_classified() {
        assert_eq!(classify(&ClipboardSnapshot::default()), None);
    }

    #[test]
    fn image_wins_over_text() {
        let snapshot = ClipboardSnapshot {
            png: Some(png_bytes(160, 36)),
            text: Some("caption".into()),
            ..Default::default()
        };
        match classify(&snapshot) {
            Some(Content::Image { tiff, thumbnail }) => {
                assert!(!tiff.is_empty());
                assert_eq!((thumbnail.width, thumbnail.height), (80, 18));
                assert_eq!(thumbnail.rgba.len(), 80 * 18 * 4);
            }
            other => panic!("expected image, got {:?}", other.map(|c| c.kind())),
        }
    }

    #[test]
    fn png_is_normalized_to_tiff() {
        let png = png_bytes(4, 4);
        let snapshot = ClipboardSnapshot {
            png: Some(png.clone()),
            ..Default::default()
        };
        let Some(Content::Image { tiff, .. }) = classify(&snapshot) else {
            panic!("expected image");
        };
        assert_ne!(tiff, png);
        assert_eq!(
            image::guess_format(&tiff).unwrap(),
            ImageFormat::Tiff
        );
    }

    #[test]
    fn undecodable_native_image_gets_placeholder_thumbnail() {
        let snapshot = ClipboardSnapshot {
            tiff: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        let Some(Content::Image { thumbnail, .. }) = classify(&snapshot) else {
            panic!("expected image");
        };
        assert!(thumbnail.is_empty());
    }

    #[test]
    fn broken_png_falls_through_to_text() {
        let snapshot = ClipboardSnapshot {
            png: Some(vec![0, 1, 2]),
            text: Some("fallback".into()),
            ..Default::default()
        };
        assert_eq!(classify(&snapshot), Some(Content::PlainText("fallback".into())));
    }

    #[test]
    fn thumbnail_never_upscales_and_keeps_aspect() {
        assert_eq!(thumbnail_size(40, 10), (40, 10));
        assert_eq!(thumbnail_size(800, 100), (80, 10));
        assert_eq!(thumbnail_size(100, 180), (10, 18));
        assert_eq!(thumbnail_size(0, 10), (0, 0));
    }

    #[test]
    fn files_beat_rich_text_and_text() {
        let snapshot = ClipboardSnapshot {
            files: vec!["file:///tmp/a.txt".into(), "/tmp/b.txt".into(), "relative".into()],
            rtf: Some(br"{\rtf1 hi}".to_vec()),
            text: Some("a.txt".into()),
            ..Default::default()
        };
        assert_eq!(
            classify(&snapshot),
            Some(Content::FileReference(vec![
                PathBuf::from("/tmp/a.txt"),
                PathBuf::from("/tmp/b.txt"),
            ]))
        );
    }

    #[test]
    fn rich_text_carries_plain_fallback() {
        let snapshot = ClipboardSnapshot {
            rtf: Some(br"{\rtf1\ansi {\fonttbl\f0 Helvetica;}\f0 Hi there}".to_vec()),
            text: Some("Hi there".into()),
            ..Default::default()
        };
        match classify(&snapshot) {
            Some(Content::RichText { plain_fallback, .. }) => assert_eq!(plain_fallback, "Hi there"),
            other => panic!("expected rich text, got {:?}", other.map(|c| c.kind())),
        }
    }

    #[test]
    fn undecodable_rich_text_is_skipped() {
        let snapshot = ClipboardSnapshot {
            rtf: Some(b"not rtf".to_vec()),
            text: Some("https://example.com/x".into()),
            ..Default::default()
        };
        assert!(matches!(classify(&snapshot), Some(Content::WebUrl(_))));
    }
}
