use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// 根据 30 天积分划分的粗略百分位
///
/// 这是固定阈值表，不是统计意义上的百分位。阈值均为严格大于。
pub fn percentile_for(yaps_l30d: f64) -> u8 {
    match yaps_l30d {
        s if s > 1000.0 => 99,
        s if s > 500.0 => 95,
        s if s > 250.0 => 90,
        s if s > 100.0 => 75,
        s if s > 50.0 => 50,
        s if s > 25.0 => 25,
        _ => 10,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualitativeLabel {
    Legendary,
    Elite,
    Outstanding,
    Excellent,
    Good,
    Average,
    Developing,
}

impl QualitativeLabel {
    pub fn from_percentile(percentile: u8) -> Self {
        match percentile {
            99.. => QualitativeLabel::Legendary,
            95.. => QualitativeLabel::Elite,
            90.. => QualitativeLabel::Outstanding,
            75.. => QualitativeLabel::Excellent,
            50.. => QualitativeLabel::Good,
            25.. => QualitativeLabel::Average,
            _ => QualitativeLabel::Developing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualitativeLabel::Legendary => "Legendary",
            QualitativeLabel::Elite => "Elite",
            QualitativeLabel::Outstanding => "Outstanding",
            QualitativeLabel::Excellent => "Excellent",
            QualitativeLabel::Good => "Good",
            QualitativeLabel::Average => "Average",
            QualitativeLabel::Developing => "Developing",
        }
    }
}

impl fmt::Display for QualitativeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 上游接口返回的原始积分
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamScore {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub yaps_all: f64,
    pub yaps_l24h: f64,
    pub yaps_l7d: f64,
    pub yaps_l30d: f64,
}

impl UpstreamScore {
    /// 所有积分必须是非负有限数
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("yaps_all", self.yaps_all),
            ("yaps_l24h", self.yaps_l24h),
            ("yaps_l7d", self.yaps_l7d),
            ("yaps_l30d", self.yaps_l30d),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            Some((name, value)) => Err(format!("invalid {} in upstream payload: {}", name, value)),
            None => Ok(()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// 账号积分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YapsScore {
    pub user_id: String,
    pub username: String,
    pub yaps_all: f64,
    pub yaps_l24h: f64,
    pub yaps_l7d: f64,
    pub yaps_l30d: f64,
    pub percentile: u8,
    pub qualitative_label: QualitativeLabel,
}

impl YapsScore {
    pub fn from_upstream(username: String, raw: UpstreamScore) -> Self {
        let percentile = percentile_for(raw.yaps_l30d);
        Self {
            user_id: raw.user_id,
            username,
            yaps_all: raw.yaps_all,
            yaps_l24h: raw.yaps_l24h,
            yaps_l7d: raw.yaps_l7d,
            yaps_l30d: raw.yaps_l30d,
            percentile,
            qualitative_label: QualitativeLabel::from_percentile(percentile),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "@{} has a YAPS score of {:.1} over the last 30 days, placing them in the {}th percentile ({}).",
            self.username, self.yaps_l30d, self.percentile, self.qualitative_label
        )
    }
}

/// 对比结果里的精简积分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub user_id: String,
    pub username: String,
    pub yaps_all: f64,
    pub yaps_l24h: f64,
    pub yaps_l30d: f64,
}

impl From<&YapsScore> for ScoreSnapshot {
    fn from(score: &YapsScore) -> Self {
        Self {
            user_id: score.user_id.clone(),
            username: score.username.clone(),
            yaps_all: score.yaps_all,
            yaps_l24h: score.yaps_l24h,
            yaps_l30d: score.yaps_l30d,
        }
    }
}

/// a − b
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDeltas {
    pub yaps_all: f64,
    pub yaps_l24h: f64,
    pub yaps_l30d: f64,
}

impl ScoreDeltas {
    pub fn between(a: &ScoreSnapshot, b: &ScoreSnapshot) -> Self {
        Self {
            yaps_all: a.yaps_all - b.yaps_all,
            yaps_l24h: a.yaps_l24h - b.yaps_l24h,
            yaps_l30d: a.yaps_l30d - b.yaps_l30d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComparison {
    pub user_a: ScoreSnapshot,
    pub user_b: ScoreSnapshot,
    pub deltas: ScoreDeltas,
    pub summary: String,
}

impl ScoreComparison {
    pub fn new(user_a: ScoreSnapshot, user_b: ScoreSnapshot) -> Self {
        let deltas = ScoreDeltas::between(&user_a, &user_b);
        let summary = comparison_summary(&user_a, &user_b, &deltas);
        Self {
            user_a,
            user_b,
            deltas,
            summary,
        }
    }

    /// 让 `user_a` 对应 `first`，缓存里的结果可能是反向保存的
    pub fn oriented(self, first: &str) -> Self {
        if self.user_a.username == first || self.user_b.username != first {
            return self;
        }
        Self::new(self.user_b, self.user_a)
    }
}

/// 生成对比摘要
///
/// 差值严格大于 0 才算 a 领先，差值为 0 时算 b 领先。
pub fn comparison_summary(a: &ScoreSnapshot, b: &ScoreSnapshot, deltas: &ScoreDeltas) -> String {
    let leader_24h = if deltas.yaps_l24h > 0.0 { &a.username } else { &b.username };
    let leader_30d = if deltas.yaps_l30d > 0.0 { &a.username } else { &b.username };
    let abs_24h = deltas.yaps_l24h.abs();
    let abs_30d = deltas.yaps_l30d.abs();

    if leader_24h == leader_30d {
        format!(
            "@{} shows stronger engagement with {:.1} more YAPS in last 24h and {:.1} more in last 30 days.",
            leader_24h, abs_24h, abs_30d
        )
    } else {
        format!(
            "@{} leads in recent activity ({:.1} more YAPS in 24h) while @{} has better long-term metrics ({:.1} more YAPS over 30 days).",
            leader_24h, abs_24h, leader_30d, abs_30d
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub username: String,
    pub yaps_l24h: f64,
    pub yaps_all: f64,
}

pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "No data available for the leaderboard.".to_string();
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|e| format!("{}. @{}: {:.1} YAPS", e.rank, e.username, e.yaps_l24h))
        .collect();
    format!(
        "Top {} YAPS accounts in the last 24 hours:\n\n{}",
        entries.len(),
        lines.join("\n")
    )
}
