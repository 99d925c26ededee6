//! Image selection for the composer's attach control.
//!
//! The picker turns a raw path (typed into its path prompt, pasted into the composer, or produced
//! by a clipboard capture) into a [`SelectedImage`]. It enforces the accepted file types and the
//! single-image cap; the size limit is the composer's business, so oversized files are still
//! returned here and rejected there.

use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use composer_protocol::models::ACCEPTED_IMAGE_EXTENSIONS;
use tempfile::TempPath;

use super::textarea::TextArea;
use crate::clipboard_paste::EncodedImageFormat;
use crate::clipboard_paste::normalize_pasted_path;
use crate::clipboard_paste::pasted_image_format;
use crate::locale::MessageLocale;

/// Maximum number of images the picker hands to the composer per selection.
pub const MAX_SELECTED_IMAGES: usize = 1;

/// An image file chosen by the user, with the metadata the composer needs to validate it.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub byte_size: u64,
    pub format: EncodedImageFormat,
    pub dimensions: Option<(u32, u32)>,
    /// Set for clipboard captures; the file is removed once the last clone is dropped.
    temp_file: Option<Arc<TempPath>>,
}

impl PartialEq for SelectedImage {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.byte_size == other.byte_size
            && self.format == other.format
            && self.dimensions == other.dimensions
    }
}

impl Eq for SelectedImage {}

impl SelectedImage {
    pub fn new(path: impl Into<PathBuf>, byte_size: u64) -> Self {
        let path = path.into();
        let format = pasted_image_format(&path);
        Self {
            path,
            byte_size,
            format,
            dimensions: None,
            temp_file: None,
        }
    }

    /// An image backed by a temp file, such as a clipboard capture. Dropping a rejected or
    /// replaced image deletes the file.
    pub fn from_temp_file(temp: TempPath, byte_size: u64) -> Self {
        let mut image = Self::new(temp.to_path_buf(), byte_size);
        image.temp_file = Some(Arc::new(temp));
        image
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickError {
    #[error("input is not a single file path: {0}")]
    NotAPath(String),
    #[error("unsupported image type `{extension}`: {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a readable image: {}", .0.display())]
    NotAnImage(PathBuf),
}

impl PickError {
    /// Message shown to the user for this rejection.
    pub fn toast_message(&self, locale: MessageLocale) -> String {
        match self {
            PickError::NotAPath(raw) => locale.image_not_found(raw.trim()),
            PickError::UnsupportedFormat { extension, .. } => {
                let extension = if extension.is_empty() {
                    "(none)"
                } else {
                    extension.as_str()
                };
                locale.unsupported_image_type(extension, &ACCEPTED_IMAGE_EXTENSIONS.join(", "))
            }
            PickError::NotFound(path) => locale.image_not_found(&path.display().to_string()),
            PickError::NotAnImage(path) => locale.not_an_image(&path.display().to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ImagePicker {
    /// Path prompt buffer; `Some` while the prompt is open.
    input: Option<TextArea>,
}

impl ImagePicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.input.is_some()
    }

    /// Open the path prompt with an empty buffer.
    pub fn open(&mut self) {
        self.input = Some(TextArea::new());
    }

    pub fn cancel(&mut self) {
        self.input = None;
    }

    pub fn input(&self) -> Option<&TextArea> {
        self.input.as_ref()
    }

    pub fn input_mut(&mut self) -> Option<&mut TextArea> {
        self.input.as_mut()
    }

    /// Close the prompt and return what was typed into it.
    pub fn take_input(&mut self) -> Option<String> {
        self.input.take().map(|input| input.text().to_string())
    }

    /// Resolve raw user input into a selection capped at [`MAX_SELECTED_IMAGES`].
    pub fn select_path(&self, raw: &str) -> Result<Vec<SelectedImage>, PickError> {
        let image = resolve_image(raw)?;
        Ok(cap_selection(vec![image]))
    }
}

/// Truncate a selection to the picker's maximum count.
pub fn cap_selection(mut selection: Vec<SelectedImage>) -> Vec<SelectedImage> {
    selection.truncate(MAX_SELECTED_IMAGES);
    selection
}

/// Turn pasted or typed text into an image on disk, checking type and readability.
pub fn resolve_image(raw: &str) -> Result<SelectedImage, PickError> {
    let path = normalize_pasted_path(raw).ok_or_else(|| PickError::NotAPath(raw.to_string()))?;
    let extension = image_extension(&path);
    if !ACCEPTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(PickError::UnsupportedFormat { path, extension });
    }

    let metadata = match std::fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(PickError::NotFound(path)),
    };

    let dimensions = match image::image_dimensions(&path) {
        Ok(dimensions) => dimensions,
        Err(err) => {
            tracing::debug!("image probe failed for {}: {err}", path.display());
            return Err(PickError::NotAnImage(path));
        }
    };

    let mut image = SelectedImage::new(path, metadata.len());
    image.dimensions = Some(dimensions);
    Ok(image)
}

fn image_extension(path: &Path) -> String {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_protocol::models::MAX_IMAGE_BYTES;
    use pretty_assertions::assert_eq;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::new(3, 2)
            .save_with_format(&path, image::ImageFormat::Png)
            .expect("write png fixture");
        path
    }

    #[test]
    fn resolves_png_with_size_and_dimensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_png(dir.path(), "cat.png");
        let image = resolve_image(&path.display().to_string()).expect("resolve");
        assert_eq!(image.path, path);
        assert_eq!(image.format, EncodedImageFormat::Png);
        assert_eq!(image.dimensions, Some((3, 2)));
        assert_eq!(
            image.byte_size,
            std::fs::metadata(&path).expect("metadata").len()
        );
    }

    #[test]
    fn oversized_files_are_still_returned() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_png(dir.path(), "big.png");
        let file = std::fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .expect("open fixture");
        file.set_len(MAX_IMAGE_BYTES + 1).expect("grow fixture");

        let image = resolve_image(&path.display().to_string()).expect("resolve");
        assert_eq!(image.byte_size, MAX_IMAGE_BYTES + 1);
    }

    #[test]
    fn rejects_unaccepted_extensions() {
        let err = resolve_image("/tmp/animation.gif").expect_err("gif is not accepted");
        assert_eq!(
            err,
            PickError::UnsupportedFormat {
                path: PathBuf::from("/tmp/animation.gif"),
                extension: "gif".to_string(),
            }
        );
        assert_eq!(
            err.toast_message(MessageLocale::En),
            "unsupported image type: gif (accepted: jpg, png, jpeg)"
        );
    }

    #[test]
    fn rejects_missing_and_unreadable_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.png");
        assert_eq!(
            resolve_image(&missing.display().to_string()),
            Err(PickError::NotFound(missing))
        );

        let fake = dir.path().join("fake.jpg");
        std::fs::write(&fake, "not really a jpeg").expect("write fixture");
        assert_eq!(
            resolve_image(&fake.display().to_string()),
            Err(PickError::NotAnImage(fake))
        );
    }

    #[test]
    fn multi_token_text_is_not_a_path() {
        assert_eq!(
            resolve_image("look at this picture"),
            Err(PickError::NotAPath("look at this picture".to_string()))
        );
    }

    #[test]
    fn selections_are_capped_at_one() {
        let selection = cap_selection(vec![
            SelectedImage::new("/tmp/a.png", 1),
            SelectedImage::new("/tmp/b.png", 2),
        ]);
        assert_eq!(selection, vec![SelectedImage::new("/tmp/a.png", 1)]);
    }

    #[test]
    fn prompt_open_and_take() {
        let mut picker = ImagePicker::new();
        assert!(!picker.is_open());
        picker.open();
        picker
            .input_mut()
            .expect("prompt open")
            .insert_str("/tmp/cat.png");
        assert_eq!(picker.take_input().as_deref(), Some("/tmp/cat.png"));
        assert!(!picker.is_open());
    }

    #[test]
    fn temp_backed_image_is_deleted_with_last_clone() {
        let temp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .expect("temp file")
            .into_temp_path();
        let image = SelectedImage::from_temp_file(temp, 10);
        let path = image.path.clone();
        assert_eq!(image.format, EncodedImageFormat::Png);

        let staged = image.clone();
        drop(image);
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }
}
