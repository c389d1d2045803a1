use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    middlewares::authentication,
    modules::{
        UserRepo,
        interaction::{repository_pg::InteractionRepositoryPg, service::InteractionService},
        matching::{repository_pg::MatchRepositoryPg, service::MatchService},
        message::{repository_pg::MessageRepositoryPg, service::MessageService},
        room::{repository_pg::RoomRepositoryPg, service::RoomService},
        user::repository_pg::UserRepositoryPg,
        websocket::{gateway::SharedBackend, server::ChatServer},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    LazyLock::force(&ENV);
    if let Err(e) = tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish()) {
        log::warn!("Tracing subscriber already installed: {}", e);
    }

    let db_pool = connect_database().await.map_err(|e| {
        log::error!("Database connection error: {}", e);
        std::io::Error::other("Database connection error")
    })?;

    let redis_cache = RedisCache::new().await.map_err(|e| {
        log::error!("Redis connection error: {}", e);
        std::io::Error::other("Redis connection error")
    })?;

    let user_repo: Arc<UserRepo> = Arc::new(UserRepo::new(
        Arc::new(UserRepositoryPg::new(db_pool.clone())),
        Arc::new(redis_cache),
        ENV.user_cache_ttl,
    ));
    let interaction_repo = Arc::new(InteractionRepositoryPg::new(db_pool.clone()));
    let match_repo = Arc::new(MatchRepositoryPg::new(db_pool.clone()));
    let room_repo = Arc::new(RoomRepositoryPg::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));

    let chat_server = ChatServer::new().start();

    let room_service = RoomService::with_dependencies(room_repo, user_repo.clone());
    let interaction_service =
        InteractionService::with_dependencies(interaction_repo.clone(), user_repo.clone());
    let match_service = MatchService::with_dependencies(
        interaction_repo,
        match_repo.clone(),
        user_repo.clone(),
        room_service.clone(),
    );
    let message_service = MessageService::with_dependencies(
        message_repo,
        match_repo,
        user_repo,
        room_service.clone(),
        chat_server.clone(),
        ENV.allow_post_after_unmatch,
    );

    // Services hold their own locks; share one instance across workers.
    let room_service = web::Data::new(room_service);
    let interaction_service = web::Data::new(interaction_service);
    let match_service = web::Data::new(match_service);
    let message_service = web::Data::new(message_service);
    let chat_backend: web::Data<dyn modules::websocket::gateway::ChatBackend> =
        web::Data::from(message_service.clone().into_inner() as SharedBackend);
    let chat_server = web::Data::new(chat_server);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(room_service.clone())
            .app_data(interaction_service.clone())
            .app_data(match_service.clone())
            .app_data(message_service.clone())
            .app_data(chat_backend.clone())
            .app_data(chat_server.clone())
            .service(health_check)
            .service(
                web::scope("/api")
                    .wrap(from_fn(authentication))
                    .configure(modules::matching::route::configure)
                    .configure(modules::interaction::route::configure)
                    .configure(modules::room::route::configure),
            )
            .service(
                web::scope("/ws")
                    .wrap(from_fn(authentication))
                    .service(modules::websocket::handler::chat_socket),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
