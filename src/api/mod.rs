// ============================================================================
// HTTP API (actix-web)
// ============================================================================
//
// GET/POST        /products, /orders
// GET/PUT/DELETE  /products/{id}, /orders/{id}
// GET             /analytics/dashboard, /analytics/sales, /analytics
// GET/PUT         /mode
// GET             /health, /metrics
//
// Data responses carry `X-Data-Source: remote|local`.
//
// ============================================================================

mod errors;
mod handlers;

use actix_web::web;

use crate::domain::{CatalogItem, Order};
use crate::metrics::metrics_handler;

pub use errors::ApiError;
pub use handlers::{ModeView, DATA_SOURCE_HEADER, SERVICE_NAME};

/// Register every route. Expects `web::Data<DataController>` and
/// `web::Data<Arc<Metrics>>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/products", web::get().to(handlers::list::<CatalogItem>))
        .route("/products", web::post().to(handlers::create::<CatalogItem>))
        .route("/products/{id}", web::get().to(handlers::get::<CatalogItem>))
        .route("/products/{id}", web::put().to(handlers::update::<CatalogItem>))
        .route("/products/{id}", web::delete().to(handlers::delete::<CatalogItem>))
        .route("/orders", web::get().to(handlers::list::<Order>))
        .route("/orders", web::post().to(handlers::create::<Order>))
        .route("/orders/{id}", web::get().to(handlers::get::<Order>))
        .route("/orders/{id}", web::put().to(handlers::update::<Order>))
        .route("/orders/{id}", web::delete().to(handlers::delete::<Order>))
        .route("/analytics", web::get().to(handlers::analytics))
        .route("/analytics/dashboard", web::get().to(handlers::dashboard))
        .route("/analytics/sales", web::get().to(handlers::sales))
        .route("/mode", web::get().to(handlers::get_mode))
        .route("/mode", web::put().to(handlers::set_mode))
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(metrics_handler));
}

/// Unparseable JSON bodies get the same `{message}` shape as other errors
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::calendar::Calendar;
    use crate::clock::FixedClock;
    use crate::controller::DataController;
    use crate::metrics::Metrics;
    use crate::store::EntityStore;

    fn controller() -> (web::Data<DataController>, web::Data<Arc<Metrics>>) {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()));
        let metrics = Arc::new(Metrics::new().unwrap());
        let controller = DataController::new(
            EntityStore::in_memory(clock),
            None,
            None,
            Calendar::utc(),
            metrics.clone(),
        )
        .unwrap();
        (web::Data::new(controller), web::Data::new(metrics))
    }

    macro_rules! app {
        () => {{
            let (controller, metrics) = controller();
            test::init_service(App::new().app_data(controller).app_data(metrics).configure(configure)).await
        }};
    }

    #[actix_web::test]
    async fn test_product_lifecycle() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(json!({"name": "Mug", "price": 4.5, "stock": 3}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get(DATA_SOURCE_HEADER).unwrap(), "local");
        let created: Value = test::read_body_json(resp).await;
        let id = created["_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri(&format!("/products/{id}")).to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        let req = test::TestRequest::delete().uri(&format!("/products/{id}")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete().uri(&format!("/products/{id}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }

    #[actix_web::test]
    async fn test_list_shape() {
        let app = app!();
        for name in ["Mug", "Lamp", "Pen"] {
            let req = test::TestRequest::post()
                .uri("/products")
                .set_json(json!({ "name": name }))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get().uri("/products?limit=2&page=2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["products"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"], json!({"current": 2, "pages": 2, "total": 3, "limit": 2}));
    }

    #[actix_web::test]
    async fn test_missing_order_is_404() {
        let app = app!();
        let req = test::TestRequest::get().uri("/orders/nope").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"message": "order not found: nope"}));
    }

    #[actix_web::test]
    async fn test_invalid_input_is_400() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/products")
            .set_json(json!({"name": "Mug", "price": -3}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/orders")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body.get("message").is_some());
    }

    #[actix_web::test]
    async fn test_sales_report_by_day() {
        let app = app!();
        for (total, created_at) in [
            (100, "2024-01-01T10:00:00Z"),
            (50, "2024-01-01T15:00:00Z"),
            (200, "2024-01-02T09:00:00Z"),
        ] {
            let req = test::TestRequest::post()
                .uri("/orders")
                .set_json(json!({"pricing": {"total": total}, "createdAt": created_at}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/analytics/sales?startDate=2024-01-01&endDate=2024-01-02&groupBy=day")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!({"salesData": [
                {"period": "2024-01-01", "revenue": 150, "orders": 2, "avgOrderValue": 75},
                {"period": "2024-01-02", "revenue": 200, "orders": 1, "avgOrderValue": 200}
            ]})
        );
    }

    #[actix_web::test]
    async fn test_dashboard_and_summary_shapes() {
        let app = app!();

        let req = test::TestRequest::get().uri("/analytics/dashboard").to_request();
        let dashboard: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dashboard["overview"]["orders"], json!({"current": 0, "previous": 0, "change": 0}));

        let req = test::TestRequest::get().uri("/analytics?period=year").to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["summary"]["totalOrders"], 0);
        assert_eq!(summary["trends"], json!({"revenue": []}));
    }

    #[actix_web::test]
    async fn test_mode_endpoints() {
        let app = app!();

        let req = test::TestRequest::get().uri("/mode").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mode"], "local");
        assert_eq!(body["override"], Value::Null);

        // no remote configured, so the preference is saved but local stays effective
        let req = test::TestRequest::put()
            .uri("/mode")
            .set_json(json!({"mode": "remote"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["preferred"], "remote");
        assert_eq!(body["mode"], "local");

        let req = test::TestRequest::put()
            .uri("/mode")
            .set_json(json!({"mode": "hybrid"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_health_and_metrics() {
        let app = app!();

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"status": "healthy", "service": SERVICE_NAME, "mode": "local"}));

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
