mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{DownStore, FakeUpstream, accounts, init_test_env, upstream_for};
use yaps_mcp::cache::{MemoryStore, SharedStore, Store, keys::LEADERBOARD_KEY};
use yaps_mcp::rate_limit::{BackedRateLimiter, PassThroughRateLimiter, SharedRateLimiter};
use yaps_mcp::yaps::{LEADERBOARD_SIZE, LeaderboardService, ScoreService};

const TTL: Duration = Duration::from_secs(3600);

fn pass_through() -> SharedRateLimiter {
    Arc::new(PassThroughRateLimiter::new(100, 5))
}

fn leaderboard(
    upstream: Arc<FakeUpstream>,
    store: Option<SharedStore>,
    limiter: SharedRateLimiter,
    tracked: Vec<String>,
) -> LeaderboardService {
    // 积分缓存时间短于排行榜，方便观察重建
    let scores = Arc::new(ScoreService::new(upstream, store.clone(), 1));
    LeaderboardService::new(scores, limiter, store, tracked, TTL, Duration::ZERO)
}

#[tokio::test]
async fn keeps_top_ten_in_descending_order() {
    let tracked = accounts(15);
    let fake = Arc::new(upstream_for(&tracked));
    let service = leaderboard(fake.clone(), None, pass_through(), tracked);

    let entries = service.get_leaderboard().await;

    assert_eq!(fake.calls(), 15);
    assert_eq!(entries.len(), LEADERBOARD_SIZE);
    assert_eq!(entries[0].yaps_l24h, 141.0);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.rank, i + 1);
    }
    assert!(entries.windows(2).all(|w| w[0].yaps_l24h > w[1].yaps_l24h));
}

#[tokio::test]
async fn fewer_accounts_than_board_size() {
    let tracked = accounts(4);
    let service = leaderboard(Arc::new(upstream_for(&tracked)), None, pass_through(), tracked);
    assert_eq!(service.get_leaderboard().await.len(), 4);
}

#[tokio::test]
async fn rate_limit_stops_the_build_without_error() {
    init_test_env();
    let tracked = accounts(15);
    let fake = Arc::new(upstream_for(&tracked));
    let store = Arc::new(MemoryStore::new());
    let limiter: SharedRateLimiter = Arc::new(BackedRateLimiter::new(store.clone(), 3, 5));
    let service = leaderboard(fake.clone(), Some(store), limiter, tracked.clone());

    let entries = service.get_leaderboard().await;

    assert_eq!(fake.calls(), 3);
    assert_eq!(fake.requested(), tracked[..3].to_vec());
    assert_eq!(entries.len(), 3);
}

#[tokio::test]
async fn single_account_failure_is_skipped() {
    init_test_env();
    let tracked = vec!["alice".to_string(), "mallory".to_string(), "bob".to_string()];
    let fake = Arc::new(
        FakeUpstream::new()
            .with_score("alice", 10.0, 100.0)
            .with_score("bob", 20.0, 100.0)
            .with_failure("mallory"),
    );
    let service = leaderboard(fake.clone(), None, pass_through(), tracked);

    let entries = service.get_leaderboard().await;
    let names: Vec<_> = entries.iter().map(|e| e.username.as_str()).collect();

    assert_eq!(fake.calls(), 3);
    assert_eq!(names, vec!["bob", "alice"]);
}

#[tokio::test]
async fn all_failures_give_an_empty_board() {
    init_test_env();
    let tracked = vec!["ghost".to_string()];
    let service = leaderboard(Arc::new(FakeUpstream::new()), None, pass_through(), tracked);
    assert!(service.get_leaderboard().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn store_serves_repeated_reads() {
    let tracked = accounts(5);
    let fake = Arc::new(upstream_for(&tracked));
    let store = Arc::new(MemoryStore::new());
    let service = leaderboard(fake.clone(), Some(store.clone()), pass_through(), tracked);

    let first = service.get_leaderboard().await;
    assert!(store.exists(LEADERBOARD_KEY).await.unwrap());
    assert_eq!(store.ttl(LEADERBOARD_KEY).await, Some(TTL));

    let second = service.get_leaderboard().await;
    assert_eq!(first, second);
    assert_eq!(fake.calls(), 5);
}

#[tokio::test]
async fn in_memory_board_without_store() {
    let tracked = accounts(5);
    let fake = Arc::new(upstream_for(&tracked));
    let service = leaderboard(fake.clone(), None, pass_through(), tracked);

    service.get_leaderboard().await;
    service.get_leaderboard().await;
    assert_eq!(fake.calls(), 5);
}

#[tokio::test]
async fn unavailable_store_falls_back_to_memory() {
    init_test_env();
    let tracked = accounts(5);
    let fake = Arc::new(upstream_for(&tracked));
    let service = leaderboard(fake.clone(), Some(Arc::new(DownStore)), pass_through(), tracked);

    let first = service.get_leaderboard().await;
    let second = service.get_leaderboard().await;
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
    assert_eq!(fake.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn rebuilds_after_ttl() {
    let tracked = accounts(5);
    let fake = Arc::new(upstream_for(&tracked));
    let store = Arc::new(MemoryStore::new());
    let service = leaderboard(fake.clone(), Some(store), pass_through(), tracked);

    service.get_leaderboard().await;
    tokio::time::advance(Duration::from_secs(1800)).await;
    service.get_leaderboard().await;
    assert_eq!(fake.calls(), 5);

    tokio::time::advance(Duration::from_secs(1801)).await;
    service.get_leaderboard().await;
    assert_eq!(fake.calls(), 10);
}

#[tokio::test(start_paused = true)]
async fn waits_between_account_fetches() {
    let tracked = accounts(4);
    let fake = Arc::new(upstream_for(&tracked));
    let scores = Arc::new(ScoreService::new(fake, None, 300));
    let service = LeaderboardService::new(
        scores,
        pass_through(),
        None,
        tracked,
        TTL,
        Duration::from_millis(100),
    );

    let started = tokio::time::Instant::now();
    service.refresh().await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn refresh_task_rebuilds_on_interval() {
    let tracked = accounts(3);
    let fake = Arc::new(upstream_for(&tracked));
    let service = Arc::new(leaderboard(fake.clone(), None, pass_through(), tracked));

    let task = service.clone().spawn_refresh_task(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(fake.calls(), 3);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fake.calls(), 6);
    task.abort();
}
