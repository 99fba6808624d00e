use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod auth;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod services;

use config::Config;
use db::create_mysql_pool;
use services::media::MediaClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );

    let mysql_pool = create_mysql_pool(&config)
        .await
        .expect("Failed to create MySQL pool");

    log::info!("Database connection established and schema synced");

    let media_client = MediaClient::new(&config);
    if !media_client.is_configured() {
        log::warn!("Cloudinary credentials missing; image uploads are disabled");
    }

    let openapi = api::ApiDoc::openapi();

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.server.cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(mysql_pool.clone()))
            .app_data(web::Data::new(media_client.clone()))
            .route(
                "/api/docs",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/api/docs/"))
                        .finish()
                }),
            )
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(api::auth::register))
                            .route("/login", web::post().to(api::auth::login)),
                    )
                    .service(
                        web::scope("/users")
                            .route("/me", web::get().to(api::users::me))
                            .route("/me", web::put().to(api::users::update_me))
                            .route("/{id}/follow", web::post().to(api::follow::follow_user))
                            .route("/{id}/unfollow", web::post().to(api::follow::unfollow_user))
                            .route("/{id}/followers", web::get().to(api::follow::followers))
                            .route("/{id}/following", web::get().to(api::follow::following))
                            .route(
                                "/{username}",
                                web::get().to(api::users::profile_by_username),
                            ),
                    )
                    .service(
                        web::scope("/posts")
                            .route("", web::post().to(api::posts::create_post))
                            .route("/public", web::get().to(api::posts::public_feed))
                            .route("/mine", web::get().to(api::posts::my_posts))
                            .route("/user/{user_id}", web::get().to(api::posts::user_posts))
                            .route("/{post_id}", web::get().to(api::posts::get_post))
                            .route("/{post_id}", web::delete().to(api::posts::delete_post))
                            .route("/{post_id}/like", web::post().to(api::posts::toggle_like))
                            .route(
                                "/{post_id}/comments",
                                web::post().to(api::posts::add_comment),
                            )
                            .route(
                                "/{post_id}/comments",
                                web::get().to(api::posts::get_comments),
                            )
                            .route(
                                "/{post_id}/comments/{comment_id}",
                                web::delete().to(api::posts::delete_comment),
                            ),
                    ),
            )
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
