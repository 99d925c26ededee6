use std::path::Path;
use std::path::PathBuf;

use tempfile::TempPath;

#[derive(Debug, Clone, thiserror::Error)]
pub enum PasteImageError {
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
    #[error("no image on clipboard: {0}")]
    NoImage(String),
    #[error("could not encode image: {0}")]
    EncodeFailed(String),
    #[error("io error: {0}")]
    IoError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedImageFormat {
    Png,
    Jpeg,
    Other,
}

impl EncodedImageFormat {
    pub fn label(self) -> &'static str {
        match self {
            EncodedImageFormat::Png => "PNG",
            EncodedImageFormat::Jpeg => "JPEG",
            EncodedImageFormat::Other => "IMG",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PastedImageInfo {
    pub width: u32,
    pub height: u32,
    pub encoded_format: EncodedImageFormat,
}

/// Capture an image from the system clipboard and encode it as PNG.
#[cfg(not(target_os = "android"))]
pub fn paste_image_as_png() -> Result<(Vec<u8>, PastedImageInfo), PasteImageError> {
    let _span = tracing::debug_span!("paste_image_as_png").entered();
    let mut cb = arboard::Clipboard::new()
        .map_err(|e| PasteImageError::ClipboardUnavailable(e.to_string()))?;
    let img = cb
        .get_image()
        .map_err(|e| PasteImageError::NoImage(e.to_string()))?;
    let w = u32::try_from(img.width)
        .map_err(|_| PasteImageError::EncodeFailed("image too wide".into()))?;
    let h = u32::try_from(img.height)
        .map_err(|_| PasteImageError::EncodeFailed("image too tall".into()))?;
    tracing::debug!("clipboard image {w}x{h}");

    let Some(rgba_img) = image::RgbaImage::from_raw(w, h, img.bytes.into_owned()) else {
        return Err(PasteImageError::EncodeFailed("invalid RGBA buffer".into()));
    };
    let dyn_img = image::DynamicImage::ImageRgba8(rgba_img);

    let mut png: Vec<u8> = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut png);
    dyn_img
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| PasteImageError::EncodeFailed(e.to_string()))?;

    Ok((
        png,
        PastedImageInfo {
            width: w,
            height: h,
            encoded_format: EncodedImageFormat::Png,
        },
    ))
}

/// Android/Termux does not support arboard; return a clear error.
#[cfg(target_os = "android")]
pub fn paste_image_as_png() -> Result<(Vec<u8>, PastedImageInfo), PasteImageError> {
    Err(PasteImageError::ClipboardUnavailable(
        "clipboard image paste is unsupported on Android".into(),
    ))
}

/// Write the clipboard image to a temp file and return it with its info.
///
/// The file is deleted when the returned [`TempPath`] is dropped.
pub fn paste_image_to_temp_png() -> Result<(TempPath, PastedImageInfo), PasteImageError> {
    let (png, info) = paste_image_as_png()?;
    let tmp = tempfile::Builder::new()
        .prefix("composer-clipboard-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| PasteImageError::IoError(e.to_string()))?;
    std::fs::write(tmp.path(), &png).map_err(|e| PasteImageError::IoError(e.to_string()))?;
    Ok((tmp.into_temp_path(), info))
}

/// Normalize pasted text that may represent a filesystem path.
///
/// Supports:
/// - `file://` URLs (converted to local paths)
/// - Windows/UNC paths
/// - shell-escaped single paths (via `shlex`)
pub fn normalize_pasted_path(pasted: &str) -> Option<PathBuf> {
    let pasted = pasted.trim();
    if pasted.is_empty() {
        return None;
    }

    if let Ok(url) = url::Url::parse(pasted)
        && url.scheme() == "file"
    {
        return url.to_file_path().ok();
    }

    // POSIX shlex treats backslashes as escapes, so unquoted Windows paths are taken verbatim.
    let looks_like_windows_path = {
        let drive = pasted
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && pasted.get(1..2) == Some(":")
            && pasted.get(2..3).is_some_and(|s| s == "\\" || s == "/");
        let unc = pasted.starts_with("\\\\");
        drive || unc
    };
    if looks_like_windows_path {
        #[cfg(target_os = "linux")]
        {
            if is_probably_wsl()
                && let Some(converted) = convert_windows_path_to_wsl(pasted)
            {
                return Some(converted);
            }
        }
        return Some(PathBuf::from(pasted));
    }

    let parts: Vec<String> = shlex::Shlex::new(pasted).collect();
    if parts.len() == 1 {
        return parts.into_iter().next().map(PathBuf::from);
    }

    None
}

#[cfg(target_os = "linux")]
pub fn is_probably_wsl() -> bool {
    if let Ok(version) = std::fs::read_to_string("/proc/version") {
        let version_lower = version.to_lowercase();
        if version_lower.contains("microsoft") || version_lower.contains("wsl") {
            return true;
        }
    }

    std::env::var_os("WSL_DISTRO_NAME").is_some() || std::env::var_os("WSL_INTEROP").is_some()
}

#[cfg(target_os = "linux")]
fn convert_windows_path_to_wsl(input: &str) -> Option<PathBuf> {
    if input.starts_with("\\\\") {
        return None;
    }

    let drive_letter = input.chars().next()?.to_ascii_lowercase();
    if !drive_letter.is_ascii_lowercase() || input.get(1..2) != Some(":") {
        return None;
    }

    let mut result = PathBuf::from(format!("/mnt/{drive_letter}"));
    for component in input
        .get(2..)?
        .trim_start_matches(['\\', '/'])
        .split(['\\', '/'])
        .filter(|component| !component.is_empty())
    {
        result.push(component);
    }

    Some(result)
}

/// Infer an image format for the provided path based on its extension.
pub fn pasted_image_format(path: &Path) -> EncodedImageFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => EncodedImageFormat::Png,
        Some("jpg") | Some("jpeg") => EncodedImageFormat::Jpeg,
        _ => EncodedImageFormat::Other,
    }
}

#[cfg(test)]
mod pasted_paths_tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn normalize_file_url() {
        let result = normalize_pasted_path("file:///tmp/cat.png").expect("should parse file URL");
        assert_eq!(result, PathBuf::from("/tmp/cat.png"));
    }

    #[test]
    fn normalize_shell_escaped_single_path() {
        let result = normalize_pasted_path("/home/user/My\\ Cat.jpeg")
            .expect("should unescape shell-escaped path");
        assert_eq!(result, PathBuf::from("/home/user/My Cat.jpeg"));
    }

    #[test]
    fn normalize_quoted_path() {
        let result =
            normalize_pasted_path("'/home/user/My Cat.png'").expect("should strip quotes");
        assert_eq!(result, PathBuf::from("/home/user/My Cat.png"));
    }

    #[test]
    fn normalize_multiple_tokens_returns_none() {
        assert!(normalize_pasted_path("send this /tmp/a.png").is_none());
        assert!(normalize_pasted_path("   ").is_none());
    }

    #[test]
    fn pasted_image_format_is_case_insensitive() {
        assert_eq!(
            pasted_image_format(Path::new("/a/b/c.PNG")),
            EncodedImageFormat::Png
        );
        assert_eq!(
            pasted_image_format(Path::new("/a/b/c.Jpeg")),
            EncodedImageFormat::Jpeg
        );
        assert_eq!(
            pasted_image_format(Path::new("/a/b/c.webp")),
            EncodedImageFormat::Other
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn windows_drive_paths_convert_under_wsl() {
        assert_eq!(
            convert_windows_path_to_wsl(r"C:\Users\Alice\cat.png"),
            Some(PathBuf::from("/mnt/c/Users/Alice/cat.png"))
        );
        assert_eq!(convert_windows_path_to_wsl(r"\\server\share\cat.png"), None);
    }
}
