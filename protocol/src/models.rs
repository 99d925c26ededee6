//! Attachment labels and limits shared by the composer and its callers.

/// Largest image, in bytes, that may be staged in the composer (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// File extensions (lowercase, without the dot) accepted for image attachments.
pub const ACCEPTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg"];

/// Label rendered for a staged local image.
pub fn local_image_label_text(label_number: usize) -> String {
    format!("[Image #{label_number}]")
}
