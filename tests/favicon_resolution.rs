mod common;

use bytes::Bytes;
use std::sync::Arc;

use common::{
    Gate, PNG_BYTES, RecordingRemoteStore, StubFetcher, StubProber, duckduckgo_url, google_url,
    remote_url, service,
};
use favicon_resolver::errors::PublishError;
use favicon_resolver::models::{
    DisplayDirective, DisplayState, FallbackTile, IconImage, IconSource, ResolutionOutcome,
};
use favicon_resolver::services::{FileIconStore, IconCache};
use favicon_resolver::utils::color_for_domain;

fn resolved_source(outcome: &ResolutionOutcome) -> Option<IconSource> {
    match outcome.state() {
        Some(DisplayState::Resolved(IconImage::Remote(candidate))) => Some(candidate.source),
        _ => None,
    }
}

#[tokio::test]
async fn test_widest_candidate_wins() {
    let prober = Arc::new(
        StubProber::new()
            .with(remote_url("github.com"), 200)
            .with(google_url("github.com"), 128)
            .with(duckduckgo_url("github.com"), 16),
    );
    let remote = Arc::new(RecordingRemoteStore::new());
    let service = service(prober.clone(), remote.clone(), Arc::new(StubFetcher::new()), IconCache::in_memory());

    let resolver = service.resolver();
    let outcome = resolver.resolve("https://www.github.com/rust-lang", "GitHub").await;
    resolver.flush().await;

    assert_eq!(resolved_source(&outcome), Some(IconSource::RemoteStore));
    assert_eq!(prober.calls(), 3);
    assert!(remote.published().is_empty(), "remote store winners are never published");
}

#[tokio::test]
async fn test_tie_prefers_remote_store() {
    let prober = Arc::new(
        StubProber::new()
            .with(google_url("example.org"), 128)
            .with(remote_url("example.org"), 128),
    );
    let service = service(
        prober,
        Arc::new(RecordingRemoteStore::new()),
        Arc::new(StubFetcher::new()),
        IconCache::in_memory(),
    );

    let outcome = service.resolver().resolve("https://example.org", "").await;
    assert_eq!(resolved_source(&outcome), Some(IconSource::RemoteStore));
}

#[tokio::test]
async fn test_no_usable_candidate_falls_back_to_letter_tile() {
    let prober = Arc::new(
        StubProber::new()
            .with(google_url("example.com"), 16)
            .with(duckduckgo_url("example.com"), 8),
    );
    let remote = Arc::new(RecordingRemoteStore::new());
    let service = service(prober, remote.clone(), Arc::new(StubFetcher::new()), IconCache::in_memory());

    let resolver = service.resolver();
    let outcome = resolver.resolve("https://example.com/a/b", "Example").await;
    resolver.flush().await;

    let expected = FallbackTile {
        letter: "E".to_string(),
        color: color_for_domain("example.com"),
    };
    assert_eq!(outcome, ResolutionOutcome::Applied(DisplayState::Fallback(expected.clone())));
    assert_eq!(resolver.state().await, DisplayState::Fallback(expected));
    assert!(remote.published().is_empty());

    match resolver.state().await.directive() {
        DisplayDirective::Fallback { letter, color } => {
            assert_eq!(letter, "E");
            assert_eq!(color.to_string(), color_for_domain("example.com").to_string());
        }
        other => panic!("expected fallback directive, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unresolvable_url_uses_title_letter_without_probing() {
    let prober = Arc::new(StubProber::new());
    let service = service(
        prober.clone(),
        Arc::new(RecordingRemoteStore::new()),
        Arc::new(StubFetcher::new()),
        IconCache::in_memory(),
    );
    let resolver = service.resolver();

    let outcome = resolver.resolve("notes/today", "notes").await;
    match outcome.state() {
        Some(DisplayState::Fallback(tile)) => {
            assert_eq!(tile.letter, "N");
            assert_eq!(tile.color, color_for_domain(""));
        }
        other => panic!("expected fallback, got {other:?}"),
    }

    let outcome = resolver.resolve("", "").await;
    match outcome.state() {
        Some(DisplayState::Fallback(tile)) => assert_eq!(tile.letter, "?"),
        other => panic!("expected fallback, got {other:?}"),
    }

    assert_eq!(prober.calls(), 0);
}

#[tokio::test]
async fn test_cache_hit_skips_probes() {
    let prober = Arc::new(StubProber::new().with(google_url("rust-lang.org"), 256));
    let remote = Arc::new(RecordingRemoteStore::new());
    let cache = IconCache::in_memory();
    cache.set(&remote_url("rust-lang.org"), Bytes::from_static(PNG_BYTES)).await;
    let service = service(prober.clone(), remote.clone(), Arc::new(StubFetcher::new()), cache);

    let resolver = service.resolver();
    let outcome = resolver.resolve("https://www.rust-lang.org/learn", "Rust").await;
    resolver.flush().await;

    match outcome.state() {
        Some(DisplayState::Resolved(IconImage::Cached { key, bytes })) => {
            assert_eq!(key, &remote_url("rust-lang.org"));
            assert_eq!(bytes.as_ref(), PNG_BYTES);
        }
        other => panic!("expected cached image, got {other:?}"),
    }
    match resolver.state().await.directive() {
        DisplayDirective::Image { src, cached, .. } => {
            assert!(cached);
            assert!(src.starts_with("data:image/png;base64,"));
        }
        other => panic!("expected image directive, got {other:?}"),
    }
    assert_eq!(prober.calls(), 0);
    assert!(remote.published().is_empty());
}

#[tokio::test]
async fn test_remote_store_winner_populates_cache() {
    let prober = Arc::new(StubProber::new().with(remote_url("docs.rs"), 64));
    let fetcher = Arc::new(StubFetcher::new().with(remote_url("docs.rs"), PNG_BYTES));
    let cache = IconCache::in_memory();
    let service = service(
        prober.clone(),
        Arc::new(RecordingRemoteStore::new()),
        fetcher.clone(),
        cache.clone(),
    );

    let first = service.resolver();
    let outcome = first.resolve("https://docs.rs/tokio", "docs").await;
    assert_eq!(resolved_source(&outcome), Some(IconSource::RemoteStore));
    first.flush().await;
    assert_eq!(first.pending_tasks().await, 0);

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(
        cache.get(&remote_url("docs.rs")).await,
        Some(Bytes::from_static(PNG_BYTES))
    );

    let second = service.resolver();
    let outcome = second.resolve("https://docs.rs/serde", "docs").await;
    assert!(matches!(
        outcome.state(),
        Some(DisplayState::Resolved(IconImage::Cached { .. }))
    ));
    assert_eq!(prober.calls(), 3, "second lookup is served from the cache");
}

#[tokio::test]
async fn test_cache_population_failure_is_swallowed() {
    let prober = Arc::new(StubProber::new().with(remote_url("docs.rs"), 64));
    let cache = IconCache::in_memory();
    let service = service(
        prober,
        Arc::new(RecordingRemoteStore::new()),
        Arc::new(StubFetcher::new()),
        cache.clone(),
    );

    let resolver = service.resolver();
    let outcome = resolver.resolve("https://docs.rs", "").await;
    resolver.flush().await;

    assert_eq!(resolved_source(&outcome), Some(IconSource::RemoteStore));
    assert!(cache.get(&remote_url("docs.rs")).await.is_none());
}

#[tokio::test]
async fn test_large_provider_winner_is_published() {
    let prober = Arc::new(
        StubProber::new()
            .with(remote_url("crates.io"), 32)
            .with(google_url("crates.io"), 128),
    );
    let remote = Arc::new(RecordingRemoteStore::new());
    let service = service(prober, remote.clone(), Arc::new(StubFetcher::new()), IconCache::in_memory());

    let resolver = service.resolver();
    let outcome = resolver.resolve("https://crates.io/crates/bytes", "crates").await;
    resolver.flush().await;

    assert_eq!(resolved_source(&outcome), Some(IconSource::Google));
    assert_eq!(
        remote.published(),
        vec![("crates.io".to_string(), google_url("crates.io"))]
    );
}

#[tokio::test]
async fn test_small_provider_winner_is_not_published() {
    let prober = Arc::new(StubProber::new().with(duckduckgo_url("lwn.net"), 64));
    let remote = Arc::new(RecordingRemoteStore::new());
    let service = service(prober, remote.clone(), Arc::new(StubFetcher::new()), IconCache::in_memory());

    let resolver = service.resolver();
    let outcome = resolver.resolve("https://lwn.net", "").await;
    resolver.flush().await;

    assert_eq!(resolved_source(&outcome), Some(IconSource::DuckDuckGo));
    assert!(remote.published().is_empty());
}

#[tokio::test]
async fn test_publish_failure_leaves_display_untouched() {
    let prober = Arc::new(StubProber::new().with(google_url("crates.io"), 256));
    let remote = Arc::new(RecordingRemoteStore::failing());
    let service = service(prober, remote.clone(), Arc::new(StubFetcher::new()), IconCache::in_memory());

    let resolver = service.resolver();
    let outcome = resolver.resolve("https://crates.io", "").await;
    resolver.flush().await;

    assert_eq!(resolved_source(&outcome), Some(IconSource::Google));
    assert_eq!(resolver.state().await, outcome.state().cloned().unwrap());
    assert_eq!(remote.published().len(), 1, "attempted once, never retried");
}

#[tokio::test]
async fn test_fast_narrow_icon_waits_for_slow_wide_icon() {
    let gate = Gate::new("remote.test");
    let prober = Arc::new(
        StubProber::new()
            .with(remote_url("wide.test"), 200)
            .with(google_url("wide.test"), 64)
            .gated(gate.clone()),
    );
    let service = service(
        prober.clone(),
        Arc::new(RecordingRemoteStore::new()),
        Arc::new(StubFetcher::new()),
        IconCache::in_memory(),
    );
    let resolver = Arc::new(service.resolver());

    let pending = {
        let resolver = resolver.clone();
        tokio::spawn(async move { resolver.resolve("https://wide.test", "").await })
    };
    gate.wait_entered().await;
    while prober.settled() < 2 {
        tokio::task::yield_now().await;
    }
    assert!(
        resolver.state().await.is_loading(),
        "ranking must not start before every source settles"
    );

    gate.open();
    let outcome = pending.await.unwrap();
    assert_eq!(resolved_source(&outcome), Some(IconSource::RemoteStore));
    match outcome.state() {
        Some(DisplayState::Resolved(IconImage::Remote(candidate))) => {
            assert_eq!(candidate.width, 200)
        }
        other => panic!("expected remote image, got {other:?}"),
    }
}

#[tokio::test]
async fn test_superseded_resolution_is_discarded() {
    let gate = Gate::new("slow.test");
    let prober = Arc::new(
        StubProber::new()
            .with(google_url("slow.test"), 256)
            .with(remote_url("fast.test"), 64)
            .gated(gate.clone()),
    );
    let remote = Arc::new(RecordingRemoteStore::new());
    let service = service(prober, remote.clone(), Arc::new(StubFetcher::new()), IconCache::in_memory());
    let resolver = Arc::new(service.resolver());

    let stale = {
        let resolver = resolver.clone();
        tokio::spawn(async move { resolver.resolve("https://slow.test", "Slow").await })
    };
    gate.wait_entered().await;

    let fresh = resolver.resolve("https://fast.test", "Fast").await;
    assert_eq!(resolved_source(&fresh), Some(IconSource::RemoteStore));

    gate.open();
    let stale = stale.await.unwrap();
    resolver.flush().await;

    assert_eq!(stale, ResolutionOutcome::Superseded);
    assert_eq!(resolver.state().await, fresh.state().cloned().unwrap());
    assert!(
        remote.published().is_empty(),
        "superseded resolutions schedule no publish-back"
    );
}

#[tokio::test]
async fn test_teardown_discards_in_flight_result() {
    let gate = Gate::new("slow.test");
    let prober = Arc::new(
        StubProber::new()
            .with(google_url("slow.test"), 256)
            .gated(gate.clone()),
    );
    let remote = Arc::new(RecordingRemoteStore::new());
    let service = service(prober, remote.clone(), Arc::new(StubFetcher::new()), IconCache::in_memory());
    let resolver = Arc::new(service.resolver());

    let in_flight = {
        let resolver = resolver.clone();
        tokio::spawn(async move { resolver.resolve("https://slow.test", "").await })
    };
    gate.wait_entered().await;
    let before = resolver.generation();
    resolver.teardown().await;
    assert!(resolver.generation() > before);

    gate.open();
    assert_eq!(in_flight.await.unwrap(), ResolutionOutcome::Superseded);
    assert!(resolver.state().await.is_loading());
    resolver.flush().await;
    assert!(remote.published().is_empty());
}

#[tokio::test]
async fn test_file_cache_survives_service_restart() {
    let dir = tempfile::tempdir().unwrap();
    let prober = Arc::new(StubProber::new().with(remote_url("tokio.rs"), 180));
    let fetcher = Arc::new(StubFetcher::new().with(remote_url("tokio.rs"), PNG_BYTES));

    {
        let store = FileIconStore::open(dir.path()).await.unwrap();
        let service = service(
            prober.clone(),
            Arc::new(RecordingRemoteStore::new()),
            fetcher.clone(),
            IconCache::new(Arc::new(store)),
        );
        let resolver = service.resolver();
        resolver.resolve("https://tokio.rs", "").await;
        resolver.flush().await;
    }

    let store = FileIconStore::open(dir.path()).await.unwrap();
    assert_eq!(store.stats().await.unwrap().entries, 1);
    let service = service(
        prober.clone(),
        Arc::new(RecordingRemoteStore::new()),
        fetcher,
        IconCache::new(Arc::new(store)),
    );
    let outcome = service.resolver().resolve("https://www.tokio.rs/blog", "").await;

    assert!(matches!(
        outcome.state(),
        Some(DisplayState::Resolved(IconImage::Cached { .. }))
    ));
    assert_eq!(prober.calls(), 3);
}

#[tokio::test]
async fn test_seed_remote_publishes_high_resolution_provider_icon() {
    let remote = Arc::new(RecordingRemoteStore::new());
    let service = service(
        Arc::new(StubProber::new()),
        remote.clone(),
        Arc::new(StubFetcher::new()),
        IconCache::in_memory(),
    );

    let receipt = service.seed_remote("https://www.github.com/new").await.unwrap();
    assert_eq!(receipt.public_id, "favicons/github.com");
    assert_eq!(
        remote.published(),
        vec![("github.com".to_string(), google_url("github.com"))]
    );

    let missing = service.seed_remote("not a url").await;
    assert!(matches!(missing, Err(PublishError::MissingInput { .. })));
}
