/// 积分缓存键前缀
const SCORE_PREFIX: &str = "score:";

/// 对比结果缓存键前缀
const COMPARISON_PREFIX: &str = "yaps:comparison:";

/// 每日排行榜缓存键
pub const LEADERBOARD_KEY: &str = "yaps:leaderboard:daily";

/// 上游调用限流计数器键
pub const RATE_LIMIT_KEY: &str = "yaps:ratelimit";

/// 生成积分缓存键，username 必须已规范化
pub fn score_key(username: &str) -> String {
    format!("{}{}", SCORE_PREFIX, username)
}

/// 生成对比缓存键，与参数顺序无关
pub fn comparison_key(username_a: &str, username_b: &str) -> String {
    let (first, second) = if username_a <= username_b {
        (username_a, username_b)
    } else {
        (username_b, username_a)
    };
    format!("{}{}:{}", COMPARISON_PREFIX, first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_key_ignores_argument_order() {
        assert_eq!(comparison_key("alice", "bob"), comparison_key("bob", "alice"));
        assert_eq!(comparison_key("alice", "bob"), "yaps:comparison:alice:bob");
    }

    #[test]
    fn score_key_uses_prefix() {
        assert_eq!(score_key("alice"), "score:alice");
    }
}
