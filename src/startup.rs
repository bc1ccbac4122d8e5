use std::net::TcpListener;

use actix_web::{dev::Server, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::{
    auth::jwt::Tokenizer,
    configuration::Settings,
    db_interaction::ensure_admin_user,
    error::ApiError,
    routes::{
        add_cart_item, add_menu_item, checkout, create_restaurant, create_user, delete_cart,
        delete_menu_item, delete_restaurant, get_cart, get_menu, get_my_orders, get_order,
        get_profile, get_restaurant, get_restaurant_orders, get_restaurants, health_check, login,
        register, remove_cart_item, update_cart_item, update_menu_item, update_order_status,
        update_profile, update_restaurant
    },
    utils::{build_pool, get_pooled_connection, DbPool}
};

pub struct Application{
    pub host: String,
    pub port: u16,
    server: Server
}

impl Application {
    pub async fn new(settings: Settings) -> Result<Self, anyhow::Error>{
        let pool = web::Data::new(build_pool(&settings.database));

        if let Some(admin) = settings.admin.clone() {
            let conn = get_pooled_connection(&pool).await?;
            ensure_admin_user(conn, admin).await?;
        }

        let tokenizer = web::Data::new(Tokenizer::new(&settings.jwt));

        let listener = TcpListener::bind((settings.application.host.as_str(), settings.application.port))?;
        let port = listener.local_addr()?.port();

        let server = run(listener, pool, tokenizer)?;

        Ok(Application{
            host: settings.application.host,
            port,
            server
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error>{
        self.server.await
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::InvalidArgument(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| ApiError::InvalidArgument(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::InvalidArgument(err.to_string()).into())
}

pub fn run(
    listener: TcpListener,
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>
) -> Result<Server, anyhow::Error>{
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(pool.clone())
            .app_data(tokenizer.clone())
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/create-user", web::post().to(create_user))
            )
            .service(
                web::scope("/users")
                    .route("/profile", web::get().to(get_profile))
                    .route("/profile", web::put().to(update_profile))
            )
            .service(
                web::scope("/restaurants")
                    .route("", web::get().to(get_restaurants))
                    .route("", web::post().to(create_restaurant))
                    .route("/{id}", web::get().to(get_restaurant))
                    .route("/{id}", web::put().to(update_restaurant))
                    .route("/{id}", web::delete().to(delete_restaurant))
                    .route("/{id}/menu", web::get().to(get_menu))
                    .route("/{id}/menu", web::post().to(add_menu_item))
                    .route("/{id}/orders", web::get().to(get_restaurant_orders))
            )
            .service(
                web::scope("/menu")
                    .route("/{id}", web::put().to(update_menu_item))
                    .route("/{id}", web::delete().to(delete_menu_item))
            )
            .service(
                web::scope("/cart")
                    .route("", web::get().to(get_cart))
                    .route("", web::delete().to(delete_cart))
                    .route("/add", web::post().to(add_cart_item))
                    .route("/update/{id}", web::put().to(update_cart_item))
                    .route("/item", web::delete().to(remove_cart_item))
                    .route("/remove", web::post().to(remove_cart_item))
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(checkout))
                    .route("/me", web::get().to(get_my_orders))
                    .route("/{id}", web::get().to(get_order))
                    .route("/{id}/status", web::patch().to(update_order_status))
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
