//! 自动评分适配器
//!
//! 外部评分器返回一个 JSON 对象，`<criterion>_score` 键给出分数，
//! `<criterion>_feedback` 键给出可选的文字反馈。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{ProjectFlowError, Result};
use crate::integrations::AutoScorer;
use crate::models::projects::entities::Rubric;

const SCORE_SUFFIX: &str = "_score";
const FEEDBACK_SUFFIX: &str = "_feedback";

/// 评分器返回的单个分数值
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreValue {
    /// 纯数字
    Number(f64),
    /// `{"value": n, "feedback": "..."}`
    WrappedNumber { value: f64, feedback: Option<String> },
    /// 其他任何形态，按 0 分处理
    Other(Value),
}

impl ScoreValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(v) => ScoreValue::Number(v),
                None => ScoreValue::Other(value.clone()),
            },
            Value::Object(map) => match map.get("value").and_then(Value::as_f64) {
                Some(v) => ScoreValue::WrappedNumber {
                    value: v,
                    feedback: map
                        .get("feedback")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                },
                None => ScoreValue::Other(value.clone()),
            },
            _ => ScoreValue::Other(value.clone()),
        }
    }

    /// 归一化为数值
    pub fn normalize(&self) -> f64 {
        match self {
            ScoreValue::Number(v) | ScoreValue::WrappedNumber { value: v, .. } => *v,
            ScoreValue::Other(_) => 0.0,
        }
    }

    fn feedback(&self) -> Option<&str> {
        match self {
            ScoreValue::WrappedNumber { feedback, .. } => feedback.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriterionScore {
    pub score: f64,
    pub feedback: Option<String>,
}

/// 归一化后的评分结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedScores {
    pub criteria: BTreeMap<String, CriterionScore>,
    /// 各项之和，不做上限截断
    pub total: f64,
}

impl NormalizedScores {
    pub fn from_response(response: &Value) -> Result<Self> {
        let Value::Object(map) = response else {
            return Err(ProjectFlowError::scoring_failed(format!(
                "评分结果不是 JSON 对象: {response}"
            )));
        };

        let mut criteria = BTreeMap::new();
        for (key, raw) in map {
            let Some(criterion) = key.strip_suffix(SCORE_SUFFIX) else {
                continue;
            };
            if criterion.is_empty() {
                continue;
            }

            let value = ScoreValue::from_json(raw);
            if let ScoreValue::Other(other) = &value {
                debug!("Non-numeric score for '{}' counted as 0: {}", criterion, other);
            }
            let feedback = value.feedback().map(str::to_string).or_else(|| {
                map.get(&format!("{criterion}{FEEDBACK_SUFFIX}"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

            criteria.insert(
                criterion.to_string(),
                CriterionScore {
                    score: value.normalize(),
                    feedback,
                },
            );
        }

        let total: f64 = criteria.values().map(|c| c.score).sum();
        Ok(Self { criteria, total })
    }
}

/// 调用外部评分器并归一化结果
pub struct ScorerAdapter {
    scorer: Arc<dyn AutoScorer>,
    timeout: Duration,
}

impl ScorerAdapter {
    pub fn new(scorer: Arc<dyn AutoScorer>, timeout: Duration) -> Self {
        Self { scorer, timeout }
    }

    pub async fn score_submission(&self, text: &str, rubrics: &[Rubric]) -> Result<NormalizedScores> {
        if text.trim().is_empty() {
            return Err(ProjectFlowError::missing_content("提交没有可评分的正文"));
        }
        if rubrics.is_empty() {
            return Err(ProjectFlowError::no_rubrics("项目没有评分标准"));
        }

        let response = match tokio::time::timeout(self.timeout, self.scorer.score(text, rubrics)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Scorer '{}' failed: {}", self.scorer.name(), e);
                return Err(match e {
                    ProjectFlowError::ScoringFailed(_) => e,
                    other => ProjectFlowError::scoring_failed(other.to_string()),
                });
            }
            Err(_) => {
                warn!(
                    "Scorer '{}' timed out after {}ms",
                    self.scorer.name(),
                    self.timeout.as_millis()
                );
                return Err(ProjectFlowError::scoring_failed(format!(
                    "评分超时 ({}ms)",
                    self.timeout.as_millis()
                )));
            }
        };

        NormalizedScores::from_response(&response).inspect_err(|e| {
            warn!("Scorer '{}' returned a malformed response: {}", self.scorer.name(), e);
        })
    }
}
