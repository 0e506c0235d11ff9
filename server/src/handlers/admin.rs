use crate::admin::{AdminCommand, SessionSummary};
use crate::server::{ServerCommand, ServerTx};
use actix_web::error;
use actix_web::web::{self, HttpRequest, HttpResponse};
use actix_web::Responder;
use actix_web::Result;
use askama_actix::Template;

#[derive(Template)]
#[template(path = "admin-index.html")]
pub struct AdminIndexTemplate {
    sessions: Vec<SessionSummary>,
    sessions_url: String,
}

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(web::resource("/").route(web::get().to(admin_index)))
            .service(
                web::resource("/sessions")
                    .name("admin_sessions")
                    .route(web::get().to(list_sessions)),
            ),
    );
}

async fn fetch_sessions(srv_tx: &web::Data<ServerTx>) -> Result<Vec<SessionSummary>> {
    let (tx, rx) = tokio::sync::oneshot::channel::<Vec<SessionSummary>>();

    srv_tx
        .get_ref()
        .clone()
        .send(ServerCommand::Admin(AdminCommand::ListSessions { tx }))
        .await
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?;

    rx.await
        .map_err(|_| error::ErrorInternalServerError("Receiver await error"))
}

pub async fn admin_index(
    req: HttpRequest,
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder> {
    let sessions = fetch_sessions(&srv_tx).await?;
    let sessions_url = req
        .url_for_static("admin_sessions")
        .map_err(|_| error::ErrorInternalServerError("Internal Server Error"))?
        .to_string();
    Ok(AdminIndexTemplate {
        sessions,
        sessions_url,
    })
}

pub async fn list_sessions(srv_tx: web::Data<ServerTx>) -> Result<impl Responder> {
    let sessions = fetch_sessions(&srv_tx).await?;
    Ok(HttpResponse::Ok().json(sessions))
}
