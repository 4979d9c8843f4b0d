//! Integration tests for `Router::batch_route`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use waypost::{
    ApiProvider, ErrorKind, Operation, ProviderDefinition, RateLimit, ResearchOp, Result,
    RoutedRequest, Waypost,
};

/// Sleeps for the number of milliseconds encoded in the title, then echoes it.
/// Tracks peak concurrency.
#[derive(Default)]
struct DelayedEcho {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl ApiProvider for DelayedEcho {
    fn name(&self) -> &str {
        "echo"
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        let Operation::Research(ResearchOp::GetWikipedia(page)) = operation else {
            return Err(waypost::providers::traits::unsupported(operation));
        };
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay: u64 = page.title.parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(json!({ "title": page.title }))
    }
}

fn echo_def() -> ProviderDefinition {
    ProviderDefinition::new("echo", "Echo", "research").capabilities(["encyclopedia"])
}

fn page(title: &str) -> RoutedRequest {
    RoutedRequest::new("research", "get_wikipedia").param("title", title)
}

#[tokio::test(start_paused = true)]
async fn results_keep_input_order() {
    let router = Waypost::builder()
        .provider(echo_def(), Arc::new(DelayedEcho::default()))
        .build()
        .unwrap();

    // r2 is the slowest.
    let requests = vec![page("10"), page("500"), page("20")];
    let responses = router.batch_route(&requests).await;

    let titles: Vec<&str> = responses
        .iter()
        .map(|r| r.data.as_ref().unwrap()["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["10", "500", "20"]);
}

#[tokio::test(start_paused = true)]
async fn failures_stay_in_their_slot() {
    let router = Waypost::builder()
        .provider(echo_def(), Arc::new(DelayedEcho::default()))
        .build()
        .unwrap();

    let requests = vec![
        page("30"),
        RoutedRequest::new("sports", "scores"),
        page("5"),
    ];
    let responses = router.batch_route(&requests).await;

    assert_eq!(responses.len(), 3);
    assert!(responses[0].success);
    assert_eq!(responses[1].error_kind(), Some(ErrorKind::Unsupported));
    assert!(responses[2].success);
}

#[tokio::test]
async fn empty_batch_returns_empty() {
    let router = Waypost::builder()
        .provider(echo_def(), Arc::new(DelayedEcho::default()))
        .build()
        .unwrap();
    assert!(router.batch_route(&[]).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn uncapped_batch_runs_everything_at_once() {
    let echo = Arc::new(DelayedEcho::default());
    let router = Waypost::builder()
        .provider(echo_def(), echo.clone())
        .build()
        .unwrap();

    let requests: Vec<_> = (0..6).map(|i| page(&format!("{}", 100 + i))).collect();
    router.batch_route(&requests).await;
    assert_eq!(echo.peak.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn concurrency_cap_bounds_in_flight_requests() {
    let echo = Arc::new(DelayedEcho::default());
    let router = Waypost::builder()
        .provider(echo_def(), echo.clone())
        .batch_concurrency(2)
        .build()
        .unwrap();

    let requests: Vec<_> = (0..6).map(|i| page(&format!("{}", 100 - i * 10))).collect();
    let responses = router.batch_route(&requests).await;

    assert!(echo.peak.load(Ordering::SeqCst) <= 2);
    let titles: Vec<String> = responses
        .iter()
        .map(|r| r.data.as_ref().unwrap()["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["100", "90", "80", "70", "60", "50"]);
}

#[tokio::test(start_paused = true)]
async fn burst_never_dispatches_past_quota() {
    let echo = Arc::new(DelayedEcho::default());
    let router = Waypost::builder()
        .provider(
            echo_def().rate_limit(RateLimit::new(2, Duration::from_secs(60))),
            echo.clone(),
        )
        .build()
        .unwrap();

    // Distinct titles, so every request misses the cache.
    let requests: Vec<_> = (0..5).map(|i| page(&format!("{}", 50 + i))).collect();
    let responses = router.batch_route(&requests).await;

    assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
    assert_eq!(responses.iter().filter(|r| r.success).count(), 2);
    let limited = responses
        .iter()
        .filter(|r| r.error_kind() == Some(ErrorKind::RateLimited))
        .count();
    assert_eq!(limited, 3);

    let status = router.registry().rate_limit_status("echo").unwrap();
    assert_eq!(status.used, 2);
    assert_eq!(status.remaining, 0);
    assert_eq!(router.registry().usage("echo").unwrap().request_count, 2);
}
