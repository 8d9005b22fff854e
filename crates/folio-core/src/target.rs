//! Navigation-target qualification.
//!
//! A hovered link only becomes a page candidate when its target is an
//! internal HTML document. Everything else (other origins, `mailto:`/`tel:`
//! and other schemes, in-page fragments) is rejected up front.

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Why a link target does not qualify for page prefetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRejection {
    Empty,
    Fragment,
    MailTo,
    Tel,
    /// Absolute URL, protocol-relative URL or any other scheme.
    External,
    /// Internal, but not an `.html` document.
    NotDocument,
}

impl std::fmt::Display for TargetRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "empty target",
            Self::Fragment => "in-page fragment",
            Self::MailTo => "mailto link",
            Self::Tel => "tel link",
            Self::External => "external target",
            Self::NotDocument => "not an html document",
        };
        f.write_str(s)
    }
}

/// Qualify a link target as an internal page and return its identifier
/// (the target with any `#fragment` removed).
///
/// Identifiers are site-root-relative. A relative href is not resolved
/// against the page it appears on, so callers must pass hrefs already
/// written relative to the site root.
pub fn qualify_page_target(href: &str) -> Result<&str, TargetRejection> {
    let href = href.trim();
    if href.is_empty() {
        return Err(TargetRejection::Empty);
    }
    if href.starts_with('#') {
        return Err(TargetRejection::Fragment);
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("mailto:") {
        return Err(TargetRejection::MailTo);
    }
    if lower.starts_with("tel:") {
        return Err(TargetRejection::Tel);
    }
    if href.starts_with("//") || has_scheme(href) {
        return Err(TargetRejection::External);
    }

    let id = strip_fragment(href);
    let path = id.split('?').next().unwrap_or(id);
    if !path.to_ascii_lowercase().ends_with(".html") {
        return Err(TargetRejection::NotDocument);
    }
    Ok(id)
}

/// Drop a trailing `#fragment` so `about.html#bio` and `about.html` share
/// one ledger entry.
pub fn strip_fragment(href: &str) -> &str {
    match href.find('#') {
        Some(idx) => &href[..idx],
        None => href,
    }
}

/// True when the path ends in a known raster/vector image extension.
pub fn is_image_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"
fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
