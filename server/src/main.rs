use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};

use whiteboard_server::config::ServerConfig;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;
use whiteboard_system::SessionRegistry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let registry = match config.palette_seed {
        Some(seed) => SessionRegistry::with_seed(seed),
        None => SessionRegistry::new(),
    };
    let srv_tx = spawn_server(registry, config.engine_queue);

    let bind_address = config.bind_address();
    log::info!("Server running on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_url)
                    .allowed_methods(vec!["GET", "POST"]),
            )
            .wrap(middleware::Logger::default())
            .data(srv_tx.clone())
            .data(config.clone())
            .configure(handlers::root)
    })
    .bind(bind_address)?
    .run()
    .await
}
