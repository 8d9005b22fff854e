//! Page -> image association table, split into priority tiers.

use folio_config::FolioConfig;
use folio_core::ImageTier;
use std::collections::HashMap;

/// Images whose path contains `thumbnail_marker` are thumbnail tier.
pub fn image_tier(image: &str, thumbnail_marker: &str) -> ImageTier {
    if image.contains(thumbnail_marker) {
        ImageTier::Thumbnail
    } else {
        ImageTier::Secondary
    }
}

/// Images of one page, in declaration order within each tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TieredImages {
    /// Visible immediately (thumbnails); scheduled as soon as the page lands.
    pub thumbnails: Vec<String>,
    /// Full-resolution assets; scheduled after the secondary delay.
    pub secondary: Vec<String>,
}

impl TieredImages {
    pub fn is_empty(&self) -> bool {
        self.thumbnails.is_empty() && self.secondary.is_empty()
    }
}

/// Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct PageImageAssociation {
    pages: HashMap<String, TieredImages>,
}

impl PageImageAssociation {
    /// Partition each page's images: paths containing `thumbnail_marker`
    /// are thumbnail tier, everything else is secondary.
    pub fn new<I, P, S>(pages: I, thumbnail_marker: &str) -> Self
    where
        I: IntoIterator<Item = (P, Vec<S>)>,
        P: Into<String>,
        S: Into<String>,
    {
        let pages = pages
            .into_iter()
            .map(|(page, images)| {
                let mut tiers = TieredImages::default();
                for image in images {
                    let image = image.into();
                    match image_tier(&image, thumbnail_marker) {
                        ImageTier::Thumbnail => tiers.thumbnails.push(image),
                        ImageTier::Secondary => tiers.secondary.push(image),
                    }
                }
                (page.into(), tiers)
            })
            .collect();
        Self { pages }
    }

    pub fn from_config(config: &FolioConfig) -> Self {
        Self::new(
            config
                .pages
                .iter()
                .map(|(page, images)| (page.clone(), images.images.clone())),
            &config.prefetch.thumbnail_marker,
        )
    }

    /// Images for a page, or None when the page has none.
    pub fn lookup(&self, page: &str) -> Option<&TieredImages> {
        self.pages.get(page).filter(|tiers| !tiers.is_empty())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
