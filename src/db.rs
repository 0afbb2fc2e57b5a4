// Connexion à la base PostgreSQL des precios (schéma legacy en espagnol :
// usuarios, productos, plazas_mercado, precios, historial_precios)

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;

pub async fn establish_connection() -> Result<DatabaseConnection, DbErr> {
    let database_url =
        env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env file");

    Database::connect(&database_url).await
}
