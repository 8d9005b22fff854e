//! Built-in tables for the portfolio site.

use folio_core::ResourceKind;
use std::collections::BTreeMap;

use crate::config::{PageImages, SeedEntry};

/// Key under which the landing page's seeds are stored. A current path of
/// `/` or one ending in `/` also resolves to this key.
pub const HOME_PAGE_KEY: &str = "index.html";

/// Class markers of navigation links, primary buttons and filter tabs.
pub const NAV_CLASSES: &[&str] = &["nav-link", "btn-primary", "tab-btn"];

const PAGE_IMAGES: &[(&str, &[&str])] = &[
    ("pages/about.html", &["images/avatar.jpg"]),
    (
        "pages/portfolio.html",
        &[
            "images/thumbs/NN_Thumbnail.jpg",
            "images/fulls/NN_Tuner.png",
            "images/thumbs/tuning_deep_learning.png",
            "images/thumbs/airbnb.jpeg",
            "images/thumbs/sentiment_analysis.png",
            "images/thumbs/google_play.png",
            "images/thumbs/movie_theater.jpg",
            "images/fulls/movie_theater_diagram.png",
        ],
    ),
    ("pages/experience.html", &[]),
    ("pages/skills.html", &["images/icons/Tableau.png"]),
    ("pages/contact.html", &[]),
];

// (current page key, [(resource, kind, extra delay ms)])
const SEEDS: &[(&str, &[(&str, ResourceKind, u64)])] = &[
    (
        HOME_PAGE_KEY,
        &[
            ("pages/portfolio.html", ResourceKind::Page, 1000),
            ("pages/about.html", ResourceKind::Page, 1000),
            ("images/avatar.jpg", ResourceKind::Image, 500),
        ],
    ),
    (
        "portfolio.html",
        &[
            ("pages/experience.html", ResourceKind::Page, 500),
            ("pages/contact.html", ResourceKind::Page, 500),
        ],
    ),
    (
        "about.html",
        &[
            ("pages/skills.html", ResourceKind::Page, 500),
            ("pages/portfolio.html", ResourceKind::Page, 500),
        ],
    ),
];

const IDLE_RESOURCES: &[&str] = &[
    "pages/about.html",
    "pages/portfolio.html",
    "pages/skills.html",
    "pages/experience.html",
    "pages/contact.html",
    "images/bg.jpg",
];

pub fn page_images() -> BTreeMap<String, PageImages> {
    PAGE_IMAGES
        .iter()
        .map(|(page, images)| {
            (
                page.to_string(),
                PageImages {
                    images: images.iter().map(|i| i.to_string()).collect(),
                },
            )
        })
        .collect()
}

pub fn seeds() -> BTreeMap<String, Vec<SeedEntry>> {
    SEEDS
        .iter()
        .map(|(page, entries)| {
            let entries = entries
                .iter()
                .map(|(id, kind, delay_ms)| SeedEntry {
                    id: id.to_string(),
                    kind: Some(*kind),
                    delay_ms: *delay_ms,
                })
                .collect();
            (page.to_string(), entries)
        })
        .collect()
}

pub fn idle_resources() -> Vec<String> {
    IDLE_RESOURCES.iter().map(|r| r.to_string()).collect()
}
