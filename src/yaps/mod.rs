// YAPS 积分业务
// 上游客户端、积分查询、对比和排行榜

pub mod client;
pub mod comparison;
pub mod leaderboard;
pub mod model;
pub mod score;

pub use client::{ScoreUpstream, YapsApiClient};
pub use comparison::ComparisonService;
pub use leaderboard::{LEADERBOARD_SIZE, LeaderboardService, rank_scores};
pub use model::{
    LeaderboardEntry, QualitativeLabel, ScoreComparison, ScoreDeltas, ScoreSnapshot,
    UpstreamScore, YapsScore, comparison_summary, format_leaderboard, percentile_for,
};
pub use score::ScoreService;
