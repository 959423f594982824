/// Raw representations available on the clipboard at one instant.
///
/// Platform adapters fill in whatever they could read; the classifier picks
/// one of them by priority.
#[derive(Debug, Clone, Default)]
pub struct ClipboardSnapshot {
    /// Native bitmap (TIFF) bytes.
    pub tiff: Option<Vec<u8>>,
    /// PNG bytes, used when no native bitmap is present.
    pub png: Option<Vec<u8>>,
    /// File references, either `file://` URIs or absolute paths.
    pub files: Vec<String>,
    pub rtf: Option<Vec<u8>>,
    pub text: Option<String>,
}

impl ClipboardSnapshot {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiff.is_none()
            && self.png.is_none()
            && self.files.is_empty()
            && self.rtf.is_none()
            && self.text.is_none()
    }
}
