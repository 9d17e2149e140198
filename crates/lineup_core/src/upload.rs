//! Image upload policy
//!
//! Contract of the external upload path. The playback core never looks at
//! image bytes; this is what the uploader checks before anything is stored.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Invalid image type {0}. Only JPEG, PNG, and WebP are allowed.")]
    UnsupportedType(String),

    #[error("Image size too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Image is empty")]
    Empty,

    #[error("Invalid object key component: {0:?}")]
    InvalidKey(String),
}

/// One resize variant served by the image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageVariant {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePolicy {
    pub allowed_types: &'static [&'static str],
    pub max_bytes: u64,
    /// Advisory; resizing is done by the image service
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
    pub variants: &'static [ImageVariant],
}

pub const IMAGE_VARIANTS: &[ImageVariant] = &[
    ImageVariant { name: "thumbnail", width: 100, height: 100 },
    ImageVariant { name: "template", width: 320, height: 320 },
    ImageVariant { name: "preview", width: 640, height: 640 },
];

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            allowed_types: &["image/jpeg", "image/png", "image/webp"],
            max_bytes: 5 * 1024 * 1024,
            max_width: 1920,
            max_height: 1080,
            quality: 85,
            variants: IMAGE_VARIANTS,
        }
    }
}

impl ImagePolicy {
    /// Check an upload's declared type and size; returns the file extension to
    /// store it under.
    pub fn check(&self, content_type: &str, size: u64) -> Result<&'static str, UploadError> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if !self.allowed_types.contains(&content_type.as_str()) {
            return Err(UploadError::UnsupportedType(content_type));
        }
        if size == 0 {
            return Err(UploadError::Empty);
        }
        if size > self.max_bytes {
            return Err(UploadError::TooLarge { size, max: self.max_bytes });
        }
        Ok(extension_for(&content_type))
    }

    pub fn variant(&self, name: &str) -> Option<&ImageVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Storage key for an item image: `projects/{project}/items/{item}/image.{ext}`
pub fn object_key(project_id: &str, item_id: &str, extension: &str) -> Result<String, UploadError> {
    for part in [project_id, item_id, extension] {
        if part.is_empty() || part.contains('/') || part.contains("..") {
            return Err(UploadError::InvalidKey(part.to_string()));
        }
    }
    Ok(format!("projects/{}/items/{}/image.{}", project_id, item_id, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_types() {
        let policy = ImagePolicy::default();
        assert_eq!(policy.check("image/jpeg", 1024), Ok("jpg"));
        assert_eq!(policy.check("image/png", 1024), Ok("png"));
        assert_eq!(policy.check("IMAGE/WEBP", 1024), Ok("webp"));
    }

    #[test]
    fn test_rejects_other_types() {
        let policy = ImagePolicy::default();
        assert!(matches!(policy.check("image/gif", 10), Err(UploadError::UnsupportedType(t)) if t == "image/gif"));
        assert!(policy.check("application/pdf", 10).is_err());
    }

    #[test]
    fn test_size_limits() {
        let policy = ImagePolicy::default();
        assert_eq!(policy.check("image/png", 0), Err(UploadError::Empty));
        assert!(policy.check("image/png", 5 * 1024 * 1024).is_ok());
        assert_eq!(
            policy.check("image/png", 5 * 1024 * 1024 + 1),
            Err(UploadError::TooLarge { size: 5 * 1024 * 1024 + 1, max: 5 * 1024 * 1024 })
        );
    }

    #[test]
    fn test_object_key() {
        assert_eq!(
            object_key("p1", "temp-abc", "webp").unwrap(),
            "projects/p1/items/temp-abc/image.webp"
        );
        assert!(object_key("p1", "../x", "png").is_err());
        assert!(object_key("", "i", "png").is_err());
    }

    #[test]
    fn test_variants() {
        let policy = ImagePolicy::default();
        assert_eq!(policy.variant("template").map(|v| v.width), Some(320));
        assert!(policy.variant("poster").is_none());
    }
}
