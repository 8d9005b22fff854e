use super::*;

fn classes() -> Vec<String> {
    vec!["nav-link".into(), "btn-primary".into(), "tab-btn".into()]
}

const PAGE: &str = r#"
<nav>
  <a class="nav-link active" href="index.html">Home</a>
  <a id="nav-about" class='nav-link' href='pages/about.html'>About</a>
  <a class="footer" href="pages/contact.html">Contact</a>
  <A CLASS="nav-link" HREF="mailto:me@example.com">Mail</A>
</nav>
<button class="tab-btn" data-href="pages/skills.html">Skills</button>
<a href="pages/portfolio.html"
   class="btn-primary">See work</a>
"#;

#[test]
fn test_extracts_only_watched_elements() {
    let found = extract_nav_elements(PAGE, "index.html", &classes());
    let hrefs: Vec<_> = found.iter().map(|e| e.href.as_deref().unwrap()).collect();
    assert_eq!(
        hrefs,
        vec![
            "index.html",
            "pages/about.html",
            "mailto:me@example.com",
            "pages/skills.html",
            "pages/portfolio.html",
        ]
    );
}

#[test]
fn test_ids_and_classes() {
    let found = extract_nav_elements(PAGE, "index.html", &classes());
    assert_eq!(found[0].id, "index.html#0");
    assert_eq!(found[0].classes, vec!["nav-link", "active"]);
    assert_eq!(found[1].id, "nav-about");
    // Numbering counts every tag, watched or not
    assert_eq!(found[4].id, "index.html#5");
}

#[test]
fn test_custom_class_list() {
    let found = extract_nav_elements(PAGE, "index.html", &["footer".to_string()]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].href.as_deref(), Some("pages/contact.html"));
}

#[test]
fn test_element_without_target() {
    let found = extract_nav_elements(r#"<button class="tab-btn">All</button>"#, "x", &classes());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].href, None);
}
