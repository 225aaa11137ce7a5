pub mod auth;

pub mod awards;

pub mod bids;

pub mod categories;

pub mod departments;

pub mod notifications;

pub mod tenders;

pub use auth::configure_auth_routes;
pub use awards::configure_award_routes;
pub use bids::configure_bid_routes;
pub use categories::configure_category_routes;
pub use departments::configure_department_routes;
pub use notifications::configure_notification_routes;
pub use tenders::configure_tender_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_department_routes)
        .configure(configure_category_routes)
        .configure(configure_tender_routes)
        .configure(configure_bid_routes)
        .configure(configure_award_routes)
        .configure(configure_notification_routes);
}

#[cfg(test)]
mod tests;
