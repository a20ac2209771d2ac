//! 远程评分服务

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::AutoScorer;
use crate::errors::{ProjectFlowError, Result};
use crate::models::projects::entities::Rubric;

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    text: &'a str,
    rubrics: Vec<RubricPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct RubricPayload<'a> {
    criterion: &'a str,
    max_points: f64,
}

/// 把正文和评分标准 POST 到外部评分服务，原样返回 JSON
pub struct HttpScorer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpScorer {
    pub fn new(endpoint: &str) -> Result<Self> {
        if endpoint.trim().is_empty() {
            return Err(ProjectFlowError::validation_failed(
                "scoring.endpoint is required for the http backend",
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("projectflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProjectFlowError::scoring_failed(format!("构建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl AutoScorer for HttpScorer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn score(&self, text: &str, rubrics: &[Rubric]) -> Result<serde_json::Value> {
        let body = ScoreRequest {
            text,
            rubrics: rubrics
                .iter()
                .map(|r| RubricPayload {
                    criterion: &r.criterion,
                    max_points: r.max_points,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        debug!("Scorer responded with status {}", response.status());
        Ok(response.json::<serde_json::Value>().await?)
    }
}
