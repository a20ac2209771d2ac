//! 本地关键词评分
//!
//! 统计报告中命中的不同关键词数量，按比例折算为三个维度的分数。

use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::AutoScorer;
use crate::engine::round_score;
use crate::errors::Result;
use crate::models::projects::entities::Rubric;

/// 单个维度的满分
const MAX_SCORE_PER_CRITERION: f64 = 33.0;

const QUALITY_KEYWORDS: [&str; 8] = [
    "comprehensive",
    "thorough",
    "robust",
    "well-structured",
    "clear",
    "detailed",
    "analysis",
    "testing",
];

const INNOVATION_KEYWORDS: [&str; 8] = [
    "novel",
    "innovative",
    "creative",
    "unique",
    "breakthrough",
    "paradigm",
    "new",
    "advanced",
];

const IMPACT_KEYWORDS: [&str; 8] = [
    "impactful",
    "significant",
    "potential",
    "useful",
    "effective",
    "scalable",
    "application",
    "benefit",
];

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid digits regex"));
static PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Invalid punctuation regex"));

/// 小写、去数字、去标点后切词
fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let without_digits = DIGITS_RE.replace_all(&lowered, "");
    let cleaned = PUNCT_RE.replace_all(&without_digits, "");
    cleaned.split_whitespace().map(str::to_string).collect()
}

pub struct KeywordScorer {
    criteria: Vec<(&'static str, HashSet<String>)>,
}

impl KeywordScorer {
    pub fn new() -> Self {
        // 关键词与正文走同一套规范化，"well-structured" 才能命中
        let normalize = |words: &[&str]| -> HashSet<String> {
            words.iter().flat_map(|w| tokenize(w)).collect()
        };

        Self {
            criteria: vec![
                ("quality", normalize(&QUALITY_KEYWORDS)),
                ("innovation", normalize(&INNOVATION_KEYWORDS)),
                ("impact", normalize(&IMPACT_KEYWORDS)),
            ],
        }
    }

    fn criterion_score(keywords: &HashSet<String>, tokens: &HashSet<String>) -> f64 {
        let hits = keywords.intersection(tokens).count() as f64;
        let per_keyword = MAX_SCORE_PER_CRITERION / keywords.len() as f64;
        round_score(hits * per_keyword).min(MAX_SCORE_PER_CRITERION)
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AutoScorer for KeywordScorer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn score(&self, text: &str, _rubrics: &[Rubric]) -> Result<serde_json::Value> {
        let tokens: HashSet<String> = tokenize(text).into_iter().collect();

        let mut result = serde_json::Map::new();
        for (criterion, keywords) in &self.criteria {
            result.insert(
                format!("{criterion}_score"),
                json!(Self::criterion_score(keywords, &tokens)),
            );
        }
        Ok(serde_json::Value::Object(result))
    }
}
