mod models;
mod routes;
mod db;
mod services;
mod utils;
mod middleware;

use actix_web::{App, HttpServer, web};

use crate::utils::email::Mailer;
use crate::utils::token_blacklist::TokenBlacklist;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    println!("🔌 Connecting to database...");
    let db = web::Data::new(
        db::establish_connection()
            .await
            .expect("Failed to connect to database"),
    );
    println!("✅ Database connected!");

    // Blacklist de tokens en mémoire (vidée à chaque redémarrage, limitation assumée)
    let blacklist = web::Data::new(TokenBlacklist::new());

    // Mailer SMTP partagé (notification de blocage + récupération de mot de passe)
    let mailer = web::Data::new(Mailer::from_env());

    println!("🚀 Starting server on http://127.0.0.1:8000");

    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(blacklist.clone())
            .app_data(mailer.clone())
            .configure(routes::configure_routes)
    })
        .bind(("127.0.0.1", 8000))?
        .run()
        .await
}
