use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::errors::{ProjectFlowError, Result};
use crate::integrations::IdentityVerifier;
use crate::models::users::entities::{Identity, UserRole};

// JWT Claims 结构体（由外部身份服务签发）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (用户名)
    pub role: String, // 用户角色
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize, // Expiration time (时间戳)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// HS256 令牌校验
pub struct JwtIdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.issuer.as_deref())
    }

    // 验证 JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ProjectFlowError::authentication(format!("令牌无效: {e}")))
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> Result<Identity> {
        let claims = self.verify_token(token)?;

        if claims.sub.trim().is_empty() {
            return Err(ProjectFlowError::authentication("令牌缺少用户名"));
        }
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(ProjectFlowError::authentication)?;

        Ok(Identity {
            username: claims.sub,
            role,
            email: claims.email.filter(|e| !e.trim().is_empty()),
        })
    }
}
