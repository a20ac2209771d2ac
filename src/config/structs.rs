use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub scoring: ScoringConfig,
    pub leaderboard: LeaderboardConfig,
    pub notification: NotificationConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "ProjectFlow".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket_path: String::new(),
            workers: 0,
            max_workers: 8,
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request: 30000,
            client_disconnect: 5000,
            keep_alive: 30,
        }
    }
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 4 * 1024 * 1024,
        }
    }
}

/// JWT 配置
///
/// 令牌由外部身份服务签发，这里只负责校验。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    #[serde(skip_serializing)] // 不序列化到JSON响应中
    pub secret: String,
    pub issuer: Option<String>,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "projectflow.db".to_string(),
            pool_size: 10,
            timeout: 30,
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: String,
    pub default_ttl: u64,
    pub redis: RedisConfig,
    pub memory: MemoryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: "moka".to_string(),
            default_ttl: 3600,
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub key_prefix: String,
    pub pool_size: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "projectflow:".to_string(),
            pool_size: 10,
        }
    }
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub max_capacity: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { max_age: 3600 }
    }
}

/// 上传文件配置（报告文本从这里读取）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
        }
    }
}

/// 自动评分配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub ml_weight: f64,       // 自动评分在总分中的权重 [0, 1]
    pub backend: String,      // keyword | http
    pub endpoint: String,     // http 后端地址
    pub timeout_ms: u64,      // 单次评分调用超时
    pub max_attempts: i64,    // 每个学生每个项目的最大提交次数
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ml_weight: 0.3,
            backend: "keyword".to_string(),
            endpoint: String::new(),
            timeout_ms: 15000,
            max_attempts: 3,
        }
    }
}

/// 排行榜配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub ttl_secs: u64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

/// 邮件通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub sender: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sender: "noreply@projectflow.local".to_string(),
        }
    }
}
