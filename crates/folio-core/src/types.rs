use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::target::is_image_path;

/// Kind tag of a speculative preload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Page,
    Image,
}

impl ResourceKind {
    /// Returns the config/CLI-facing name for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Image => "image",
        }
    }

    /// Destination annotation used in a `<link rel="prefetch" as=...>` hint.
    pub fn hint_destination(&self) -> &'static str {
        match self {
            Self::Page => "document",
            Self::Image => "image",
        }
    }

    /// Infer the kind from a resource path: known image extensions are
    /// images, everything else is treated as a page.
    pub fn infer(id: &str) -> Self {
        if is_image_path(id) {
            Self::Image
        } else {
            Self::Page
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource identifier (URL or site-relative path) plus its kind.
///
/// Produced transiently by the intent detector, the seed list or the image
/// cascade; never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreloadCandidate {
    pub id: String,
    pub kind: ResourceKind,
}

impl PreloadCandidate {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn page(id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Page)
    }

    pub fn image(id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Image)
    }

    /// Build a candidate whose kind is inferred from the path extension.
    pub fn inferred(id: impl Into<String>) -> Self {
        let id = id.into();
        let kind = ResourceKind::infer(&id);
        Self { id, kind }
    }
}

impl std::fmt::Display for PreloadCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.kind)
    }
}

/// Priority tier of an image associated with a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageTier {
    /// Visible as soon as the page renders; fetched first.
    Thumbnail,
    /// Full-resolution assets fetched after a short delay.
    Secondary,
}

/// Output format for CLI responses
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
