use anyhow::{Context, Result};
use folio_core::{OutputFormat, qualify_page_target};
use folio_scheduler::NavElement;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::page_view::{determine_site_root, load_config};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(a|button)\b([^>]*)>").expect("static regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\b(id|class|href|data-href)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("static regex")
});

/// Extract every `<a>`/`<button>` carrying one of `nav_classes`.
///
/// Elements without an `id` attribute get `<file>#<n>`, numbered in
/// document order. Buttons may carry their target in `data-href`.
pub(crate) fn extract_nav_elements(
    html: &str,
    source: &str,
    nav_classes: &[String],
) -> Vec<NavElement> {
    let mut out = Vec::new();
    for (index, tag) in TAG_RE.captures_iter(html).enumerate() {
        let attrs = tag.get(2).map_or("", |m| m.as_str());
        let mut id = None;
        let mut href = None;
        let mut data_href = None;
        let mut classes = Vec::new();
        for attr in ATTR_RE.captures_iter(attrs) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .map_or("", |m| m.as_str())
                .to_string();
            match attr[1].to_ascii_lowercase().as_str() {
                "id" => id = Some(value),
                "href" => href = Some(value),
                "data-href" => data_href = Some(value),
                _ => classes = value.split_whitespace().map(str::to_string).collect(),
            }
        }

        let element = NavElement {
            id: id.unwrap_or_else(|| format!("{source}#{index}")),
            href: href.or(data_href),
            classes,
        };
        if element.has_any_class(nav_classes) {
            out.push(element);
        }
    }
    out
}

/// Handle `folio scan`.
pub(crate) fn handle_scan(cd: Option<String>, files: Vec<PathBuf>, format: OutputFormat) -> Result<()> {
    let site_root = determine_site_root(cd.as_deref())?;
    let config = load_config(&site_root)?;
    let nav_classes = &config.prefetch.nav_classes;

    let mut rows = Vec::new();
    for file in &files {
        let html = read_html(&site_root, file)?;
        let source = file.display().to_string();
        for element in extract_nav_elements(&html, &source, nav_classes) {
            rows.push((source.clone(), element));
        }
    }

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = rows
                .iter()
                .map(|(file, element)| {
                    let target = element.href.as_deref().unwrap_or_default();
                    let (page, rejected) = match qualify_page_target(target) {
                        Ok(page) => (Some(page.to_string()), None),
                        Err(reason) => (None, Some(reason.to_string())),
                    };
                    serde_json::json!({
                        "file": file,
                        "element": element,
                        "page": page,
                        "rejected": rejected,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                eprintln!("No navigational elements found.");
            }
            for (file, element) in &rows {
                let target = element.href.as_deref().unwrap_or_default();
                let verdict = match qualify_page_target(target) {
                    Ok(page) => format!("-> {page}"),
                    Err(reason) => format!("skip ({reason})"),
                };
                println!("{file}: {} [{}] {verdict}", element.id, element.classes.join(" "));
            }
        }
    }
    Ok(())
}

fn read_html(site_root: &Path, file: &Path) -> Result<String> {
    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        site_root.join(file)
    };
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
#[path = "scan_cmd_tests.rs"]
mod tests;
