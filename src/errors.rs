//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 评审引擎的错误（E1xx）直接映射到对外的机器可读代码，
//! 基础设施错误（E0xx）只在日志中保留细节。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_projectflow_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ProjectFlowError {
            $($variant(String),)*
        }

        impl ProjectFlowError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ProjectFlowError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ProjectFlowError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ProjectFlowError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ProjectFlowError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ProjectFlowError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_projectflow_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    Serialization("E009", "Serialization Error"),
    Authentication("E012", "Authentication Error"),
    DeadlineExpired("E101", "Deadline Expired"),
    AttemptLimitReached("E102", "Attempt Limit Reached"),
    NotFound("E103", "Resource Not Found"),
    // 与 NotFound 共用 E103，HTTP 层据此返回评分标准专属业务码
    RubricNotFound("E103", "Rubric Not Found"),
    Forbidden("E104", "Forbidden"),
    NoEvaluations("E105", "No Evaluations"),
    NoRubrics("E106", "No Rubrics"),
    MissingContent("E107", "Missing Content"),
    ScoringFailed("E108", "Scoring Failed"),
    ValidationFailed("E109", "Validation Failed"),
    StoreUnavailable("E110", "Store Unavailable"),
}

impl ProjectFlowError {
    /// 面向终端用户的消息
    ///
    /// 外部协作方（数据库、缓存、评分服务）的原始错误文本不会直接暴露。
    pub fn public_message(&self) -> &str {
        match self {
            ProjectFlowError::StoreUnavailable(_)
            | ProjectFlowError::DatabaseConfig(_)
            | ProjectFlowError::DatabaseConnection(_) => "存储服务暂时不可用，请稍后重试",
            ProjectFlowError::CacheConnection(_) | ProjectFlowError::CachePluginNotFound(_) => {
                "缓存服务暂时不可用，请稍后重试"
            }
            ProjectFlowError::ScoringFailed(_) => "自动评分服务调用失败，请稍后重试",
            ProjectFlowError::Serialization(_) => "数据处理失败",
            _ => self.message(),
        }
    }

    /// 是否可以由调用方安全重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProjectFlowError::StoreUnavailable(_)
                | ProjectFlowError::ScoringFailed(_)
                | ProjectFlowError::CacheConnection(_)
        )
    }

    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ProjectFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ProjectFlowError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ProjectFlowError {
    fn from(err: sea_orm::DbErr) -> Self {
        ProjectFlowError::StoreUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for ProjectFlowError {
    fn from(err: std::io::Error) -> Self {
        ProjectFlowError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for ProjectFlowError {
    fn from(err: serde_json::Error) -> Self {
        ProjectFlowError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ProjectFlowError {
    fn from(err: reqwest::Error) -> Self {
        ProjectFlowError::ScoringFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProjectFlowError>;
