//! Breadth-first crawler behavior over an in-memory site.

mod common;

use std::sync::Arc;

use common::{FakeContextFactory, FakeSite};
use webwatcher::crawl_engine::{CrawlError, PageCrawler};
use webwatcher::monitor::{Monitor, NewMonitor};

fn monitor(url: &str, deep_crawl: bool, depth: u32) -> Monitor {
    let mut new = NewMonitor::new(url, "owner@example.com");
    new.deep_crawl = deep_crawl;
    new.deep_crawl_depth = Some(depth);
    new.into_monitor("m1".to_string())
}

fn factory(site: FakeSite) -> FakeContextFactory {
    FakeContextFactory::new(Arc::new(site))
}

#[tokio::test]
async fn single_page_text_is_whitespace_collapsed() {
    let contexts = factory(FakeSite::new().page("https://site.test/", "  Hello\n\n  world\t ", &[]));
    let context = contexts.context();

    let document = PageCrawler::new(50)
        .crawl(&context, &monitor("https://site.test/", false, 1), false)
        .await
        .unwrap();

    assert_eq!(document.render(), "Hello world");
}

#[tokio::test]
async fn depth_two_follows_seed_links_but_not_grandchildren() {
    let contexts = factory(
        FakeSite::new()
            .page("https://site.test/", "Root", &["/a", "/b"])
            .page("https://site.test/a", "Ay", &["/c"])
            .page("https://site.test/b", "Bee", &[])
            .page("https://site.test/c", "Cee", &[]),
    );
    let context = contexts.context();

    let document = PageCrawler::new(50)
        .crawl(&context, &monitor("https://site.test/", true, 2), false)
        .await
        .unwrap();

    assert_eq!(document.page_count(), 3);
    assert_eq!(contexts.site.navigation_count("https://site.test/c"), 0);
    assert_eq!(
        document.render(),
        "--- https://site.test/ ---\nRoot\n\n\
         --- https://site.test/a ---\nAy\n\n\
         --- https://site.test/b ---\nBee"
    );
}

#[tokio::test]
async fn links_to_other_hosts_are_never_visited() {
    let contexts = factory(
        FakeSite::new()
            .page(
                "https://site.test/",
                "Root",
                &["https://other.test/x", "https://blog.site.test/y", "/local#frag"],
            )
            .page("https://site.test/local", "Local", &[])
            .page("https://other.test/x", "Elsewhere", &[])
            .page("https://blog.site.test/y", "Blog", &[]),
    );
    let context = contexts.context();

    let document = PageCrawler::new(50)
        .crawl(&context, &monitor("https://site.test/", true, 3), false)
        .await
        .unwrap();

    assert_eq!(
        document.urls().collect::<Vec<_>>(),
        vec!["https://site.test/", "https://site.test/local"]
    );
    assert_eq!(contexts.site.navigation_count("https://other.test/x"), 0);
    assert_eq!(contexts.site.navigation_count("https://blog.site.test/y"), 0);
}

#[tokio::test]
async fn shallow_monitor_ignores_links_even_with_large_depth() {
    let contexts = factory(
        FakeSite::new()
            .page("https://site.test/", "Root", &["/a"])
            .page("https://site.test/a", "Ay", &[]),
    );
    let context = contexts.context();

    let document = PageCrawler::new(50)
        .crawl(&context, &monitor("https://site.test/", false, 5), false)
        .await
        .unwrap();

    assert_eq!(document.page_count(), 1);
    assert_eq!(contexts.site.navigations(), vec!["https://site.test/".to_string()]);
}

#[tokio::test]
async fn failing_child_page_is_skipped() {
    let contexts = factory(
        FakeSite::new()
            .page("https://site.test/", "Root", &["/broken", "/ok"])
            .unreachable("https://site.test/broken")
            .page("https://site.test/ok", "Fine", &[]),
    );
    let context = contexts.context();

    let document = PageCrawler::new(50)
        .crawl(&context, &monitor("https://site.test/", true, 2), false)
        .await
        .unwrap();

    assert_eq!(
        document.urls().collect::<Vec<_>>(),
        vec!["https://site.test/", "https://site.test/ok"]
    );
}

#[tokio::test]
async fn unreachable_seed_fails_the_crawl() {
    let contexts = factory(FakeSite::new().unreachable("https://down.test/"));
    let context = contexts.context();

    let err = PageCrawler::new(50)
        .crawl(&context, &monitor("https://down.test/", true, 2), false)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::SeedUnreachable { .. }));
}

#[tokio::test]
async fn malformed_monitor_url_is_rejected_before_navigation() {
    let contexts = factory(FakeSite::new());
    let context = contexts.context();

    let err = PageCrawler::new(50)
        .crawl(&context, &monitor("not a url", false, 1), false)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::InvalidSeed { .. }));
    assert!(contexts.site.navigations().is_empty());
}

#[tokio::test]
async fn page_cap_stops_the_crawl() {
    let contexts = factory(
        FakeSite::new()
            .page("https://site.test/", "Root", &["/1", "/2", "/3"])
            .page("https://site.test/1", "One", &[])
            .page("https://site.test/2", "Two", &[])
            .page("https://site.test/3", "Three", &[]),
    );
    let context = contexts.context();

    let document = PageCrawler::new(2)
        .crawl(&context, &monitor("https://site.test/", true, 2), false)
        .await
        .unwrap();

    assert_eq!(document.page_count(), 2);
    assert_eq!(contexts.site.navigations().len(), 2);
}

#[tokio::test]
async fn cycles_visit_each_page_once() {
    let contexts = factory(
        FakeSite::new()
            .page("https://site.test/", "Root", &["/a"])
            .page("https://site.test/a", "Ay", &["/", "/a#again"]),
    );
    let context = contexts.context();

    let document = PageCrawler::new(50)
        .crawl(&context, &monitor("https://site.test/", true, 5), false)
        .await
        .unwrap();

    assert_eq!(document.page_count(), 2);
    assert_eq!(contexts.site.navigation_count("https://site.test/"), 1);
    assert_eq!(contexts.site.navigation_count("https://site.test/a"), 1);
}

#[tokio::test]
async fn preloaded_seed_is_read_without_navigating() {
    use webwatcher::browser::BrowsingContext;

    let contexts = factory(FakeSite::new().page("https://site.test/", "Members area", &[]));
    let context = contexts.context();
    context.goto("https://site.test/").await.unwrap();

    let document = PageCrawler::new(50)
        .crawl(&context, &monitor("https://site.test/", false, 1), true)
        .await
        .unwrap();

    assert_eq!(document.render(), "Members area");
    assert_eq!(contexts.site.navigation_count("https://site.test/"), 1);
}
