use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::LeaderboardService;

// 懒加载的全局 LEADERBOARD_SERVICE 实例
static LEADERBOARD_SERVICE: Lazy<LeaderboardService> = Lazy::new(LeaderboardService::new_lazy);

pub async fn get_leaderboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    LEADERBOARD_SERVICE.get_leaderboard(&req).await
}

// 配置路由（公开，无需登录）
pub fn configure_leaderboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/leaderboard")
            .service(web::resource("").route(web::get().to(get_leaderboard))),
    );
}
