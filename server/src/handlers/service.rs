use actix_web::{web, HttpResponse, Responder};
use whiteboard_system::serde_json::json;

pub fn configure_service_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Whiteboard server is running!" }))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use whiteboard_system::serde_json::Value;

    #[actix_rt::test]
    async fn it_reports_health() {
        let mut app = test::init_service(App::new().configure(configure_service_handlers)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::read_response_json(&mut app, req).await;

        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[actix_rt::test]
    async fn it_greets_on_root() {
        let mut app = test::init_service(App::new().configure(configure_service_handlers)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::read_response_json(&mut app, req).await;

        assert!(body["message"].as_str().map_or(false, |m| m.contains("running")));
    }
}
