use std::path::PathBuf;

use url::Url;

const DISPLAY_LIMIT: usize = 80;

/// Downscaled RGBA8 preview of an image entry.
/// A 0x0 thumbnail stands in for images that could not be decoded.
#[derive(Debug, Clone, Default)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Thumbnail {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An http(s) link, kept exactly as it was copied.
///
/// Equality, display and paste all use the copied text; the parsed form is
/// only there to vouch for the scheme and host.
#[derive(Debug, Clone)]
pub struct WebLink {
    raw: String,
    url: Url,
}

impl WebLink {
    /// Accepts an absolute http or https URL with a host and no whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() || text.chars().any(char::is_whitespace) {
            return None;
        }
        let url = Url::parse(text).ok()?;
        let web_scheme = matches!(url.scheme(), "http" | "https");
        let has_host = url.host_str().is_some_and(|h| !h.is_empty());
        (web_scheme && has_host).then(|| Self {
            raw: text.to_string(),
            url,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl PartialEq for WebLink {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for WebLink {}

/// One classified clipboard payload.
#[derive(Debug, Clone)]
pub enum Content {
    PlainText(String),
    WebUrl(WebLink),
    FileReference(Vec<PathBuf>),
    RichText { rtf: Vec<u8>, plain_fallback: String },
    Image { tiff: Vec<u8>, thumbnail: Thumbnail },
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Content::PlainText(a), Content::PlainText(b)) => a == b,
            (Content::WebUrl(a), Content::WebUrl(b)) => a == b,
            (Content::FileReference(a), Content::FileReference(b)) => a == b,
            (Content::RichText { rtf: a, .. }, Content::RichText { rtf: b, .. }) => a == b,
            (Content::Image { tiff: a, .. }, Content::Image { tiff: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Content {}

impl Content {
    /// Stable per-variant label; doubles as the `type` tag of persisted records.
    pub fn kind(&self) -> &'static str {
        match self {
            Content::PlainText(_) => "plainText",
            Content::WebUrl(_) => "webURL",
            Content::FileReference(_) => "fileURL",
            Content::RichText { .. } => "richText",
            Content::Image { .. } => "image",
        }
    }

    /// Single-line label for menus and `clipstack list`.
    pub fn display_text(&self) -> String {
        match self {
            Content::PlainText(text) => truncate_display(text),
            Content::WebUrl(link) => link.as_str().to_string(),
            Content::FileReference(paths) => paths
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| p.display().to_string())
                })
                .collect::<Vec<_>>()
                .join(", "),
            Content::RichText { plain_fallback, .. } => truncate_display(plain_fallback),
            Content::Image { .. } => "Image".to_string(),
        }
    }

    /// Text written to the clipboard when this entry is pasted back.
    /// Images have no text form.
    pub fn paste_text(&self) -> Option<String> {
        match self {
            Content::PlainText(text) => Some(text.clone()),
            Content::WebUrl(link) => Some(link.as_str().to_string()),
            Content::FileReference(paths) => Some(
                paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Content::RichText { plain_fallback, .. } => Some(plain_fallback.clone()),
            Content::Image { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Content::Image { .. })
    }
}

fn truncate_display(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > DISPLAY_LIMIT {
        let head: String = trimmed.chars().take(DISPLAY_LIMIT).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}
