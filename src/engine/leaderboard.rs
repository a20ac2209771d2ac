//! 排行榜
//!
//! 只统计每个学生在每个项目下的最新提交，且必须已经定稿。
//! 结果缓存在单个全局键下，写操作不会主动失效缓存。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::ScoringEngine;
use crate::cache::ObjectCache;
use crate::errors::Result;
use crate::models::leaderboard::responses::{LeaderboardEntry, LeaderboardResponse, LeaderboardRow};

pub const LEADERBOARD_CACHE_KEY: &str = "leaderboard:global";

/// 按总分降序排列，同分保持扫描顺序
pub fn rank_rows(mut rows: Vec<LeaderboardRow>) -> Vec<LeaderboardEntry> {
    rows.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            student: row.student,
            project_title: row.project_title,
            overall_score: row.overall_score,
            submission_id: row.submission_id,
        })
        .collect()
}

/// 排行榜缓存
///
/// 条目自带 computed_at，过期判断不依赖缓存后端的 TTL 实现。
pub struct LeaderboardCache {
    cache: Arc<dyn ObjectCache>,
    ttl: Duration,
}

impl LeaderboardCache {
    pub fn new(cache: Arc<dyn ObjectCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn max_age(&self) -> TimeDelta {
        TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX)
    }

    async fn get_fresh(&self, now: DateTime<Utc>) -> Option<LeaderboardResponse> {
        let snapshot = self
            .cache
            .get_json::<LeaderboardResponse>(LEADERBOARD_CACHE_KEY)
            .await?;
        if now.signed_duration_since(snapshot.computed_at) < self.max_age() {
            Some(snapshot)
        } else {
            debug!("Leaderboard snapshot from {} expired", snapshot.computed_at);
            None
        }
    }

    async fn store(&self, snapshot: &LeaderboardResponse) {
        self.cache
            .insert_json(LEADERBOARD_CACHE_KEY, snapshot, self.ttl.as_secs())
            .await;
    }
}

impl ScoringEngine {
    pub async fn get_leaderboard(&self) -> Result<LeaderboardResponse> {
        self.leaderboard_at(Utc::now()).await
    }

    pub(crate) async fn leaderboard_at(&self, now: DateTime<Utc>) -> Result<LeaderboardResponse> {
        if let Some(snapshot) = self.leaderboard.get_fresh(now).await {
            debug!("Leaderboard cache hit ({} entries)", snapshot.items.len());
            return Ok(snapshot);
        }
        debug!("Leaderboard cache miss, recomputing");

        let rows = self.storage.list_leaderboard_rows().await?;
        let snapshot = LeaderboardResponse {
            items: rank_rows(rows),
            computed_at: now,
        };
        self.leaderboard.store(&snapshot).await;
        Ok(snapshot)
    }
}
