use tokio::signal;
use tracing::{error, warn};

/// 等待 Ctrl+C，收到后返回以便 HTTP 服务优雅退出
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => warn!("Shutdown signal received, draining in-flight requests..."),
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}
