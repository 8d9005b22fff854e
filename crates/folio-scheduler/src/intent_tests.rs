use super::*;
use crate::admission::Admission;
use crate::association::PageImageAssociation;
use crate::test_support::{MockFetcher, drain, scheduler_with};

const DEBOUNCE: Duration = Duration::from_millis(150);

fn detector(fetcher: Arc<MockFetcher>, max_concurrent: usize) -> IntentDetector {
    let scheduler = scheduler_with(fetcher, PageImageAssociation::default(), max_concurrent);
    IntentDetector::new(scheduler, DEBOUNCE, vec!["nav-link".into(), "tab-btn".into()])
}

fn link(id: &str, href: &str) -> NavElement {
    NavElement::new(id, href).with_class("nav-link")
}

#[tokio::test(start_paused = true)]
async fn test_sustained_hover_issues_one_request() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);
    let about = link("nav-about", "about.html");

    assert_eq!(
        detector.on_hover_start(&about),
        HoverDecision::Armed("about.html".into())
    );
    tokio::time::advance(Duration::from_millis(200)).await;
    drain().await;

    assert_eq!(fetcher.calls(), vec!["about.html".to_string()]);
    // Already emitted: leaving now retracts nothing
    assert!(!detector.on_hover_end(&about));
    assert_eq!(detector.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_before_debounce_cancels() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);
    let about = link("nav-about", "about.html");

    detector.on_hover_start(&about);
    tokio::time::advance(Duration::from_millis(100)).await;
    assert!(detector.on_hover_end(&about));

    tokio::time::advance(Duration::from_millis(500)).await;
    drain().await;
    assert!(fetcher.calls().is_empty());
    assert!(!detector.scheduler().is_recorded("about.html"));
}

#[tokio::test(start_paused = true)]
async fn test_debounce_boundary() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);
    detector.on_hover_start(&link("nav-about", "about.html"));

    tokio::time::advance(Duration::from_millis(149)).await;
    drain().await;
    assert!(fetcher.calls().is_empty());

    tokio::time::advance(Duration::from_millis(1)).await;
    drain().await;
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rehover_replaces_timer() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);
    let about = link("nav-about", "about.html");

    detector.on_hover_start(&about);
    tokio::time::advance(Duration::from_millis(100)).await;
    detector.on_hover_start(&about);
    assert_eq!(detector.pending_count(), 1);

    // The first timer would have fired at 150 ms
    tokio::time::advance(Duration::from_millis(100)).await;
    drain().await;
    assert!(fetcher.calls().is_empty());

    tokio::time::advance(Duration::from_millis(50)).await;
    drain().await;
    assert_eq!(fetcher.call_count("about.html"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_non_qualifying_targets_rejected() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);

    let cases = [
        ("mailto:me@example.com", TargetRejection::MailTo),
        ("tel:+15550100", TargetRejection::Tel),
        ("https://github.com/someone", TargetRejection::External),
        ("#projects", TargetRejection::Fragment),
        ("resume.pdf", TargetRejection::NotDocument),
        ("", TargetRejection::Empty),
    ];
    for (href, reason) in cases {
        assert_eq!(
            detector.on_hover_start(&link("x", href)),
            HoverDecision::Rejected(HoverRejection::Target(reason)),
            "{href}"
        );
    }

    let unmarked = NavElement::new("footer", "about.html").with_class("footer-link");
    assert_eq!(
        detector.on_hover_start(&unmarked),
        HoverDecision::Rejected(HoverRejection::Unwatched)
    );

    let no_href = NavElement {
        id: "tab".into(),
        href: None,
        classes: vec!["tab-btn".into()],
    };
    assert_eq!(
        detector.on_hover_start(&no_href),
        HoverDecision::Rejected(HoverRejection::Target(TargetRejection::Empty))
    );

    assert_eq!(detector.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fragment_shares_ledger_entry() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);

    detector.on_hover_start(&link("a", "about.html"));
    tokio::time::advance(DEBOUNCE).await;
    drain().await;

    assert_eq!(
        detector.on_hover_start(&link("b", "about.html#bio")),
        HoverDecision::Rejected(HoverRejection::AlreadyRecorded)
    );
}

#[tokio::test(start_paused = true)]
async fn test_four_hovers_at_capacity_three() {
    let fetcher = MockFetcher::manual();
    let detector = detector(fetcher.clone(), 3);
    let pages = ["a.html", "b.html", "c.html", "d.html"];

    for page in pages {
        assert!(matches!(
            detector.on_hover_start(&link(page, page)),
            HoverDecision::Armed(_)
        ));
    }
    tokio::time::advance(DEBOUNCE).await;
    drain().await;

    let scheduler = detector.scheduler();
    assert_eq!(scheduler.in_flight(), 3);
    let stats = scheduler.stats();
    assert_eq!(stats.admitted, 3);
    assert_eq!(stats.at_capacity, 1);
    let rejected: Vec<_> = pages.iter().filter(|p| !scheduler.is_recorded(p)).collect();
    assert_eq!(rejected.len(), 1);
    let rejected = rejected[0];

    // Full: new hovers are turned away before arming
    assert_eq!(
        detector.on_hover_start(&link(rejected, rejected)),
        HoverDecision::Rejected(HoverRejection::AtCapacity)
    );

    let done = pages.iter().find(|p| scheduler.is_recorded(p)).unwrap();
    fetcher.release(done, true);
    drain().await;

    assert!(matches!(
        detector.on_hover_start(&link(rejected, rejected)),
        HoverDecision::Armed(_)
    ));
    tokio::time::advance(DEBOUNCE).await;
    drain().await;
    assert!(scheduler.is_recorded(rejected));
    assert_eq!(fetcher.call_count(rejected), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timer_fire_rechecks_admission() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);

    detector.on_hover_start(&link("nav-about", "about.html"));
    // Recorded by another path before the debounce elapses
    assert_eq!(
        detector
            .scheduler()
            .schedule(PreloadCandidate::page("about.html")),
        Admission::Admitted
    );
    tokio::time::advance(DEBOUNCE).await;
    drain().await;
    assert_eq!(fetcher.call_count("about.html"), 1);
    assert_eq!(detector.scheduler().stats().duplicates, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_detector_cancels_armed_timers() {
    let fetcher = MockFetcher::immediate();
    let detector = detector(fetcher.clone(), 3);
    let scheduler = detector.scheduler().clone();

    detector.on_hover_start(&link("nav-about", "about.html"));
    drop(detector);

    scheduler.wait_idle().await;
    assert!(fetcher.calls().is_empty());
}
