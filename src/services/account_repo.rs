// Implémentation SeaORM du AccountRepository : chaque écriture est une
// transaction avec SELECT ... FOR UPDATE pour que deux tentatives de login
// simultanées sur le même compte ne se perdent pas d'updates.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
};

use crate::models::users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users, Model as UserModel,
};
use crate::services::login::{AccountRecord, AccountRepository};

pub struct SeaOrmAccountRepository {
    db: std::sync::Arc<DatabaseConnection>,
}

impl SeaOrmAccountRepository {
    pub fn new(db: std::sync::Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_record(user: UserModel) -> AccountRecord {
    AccountRecord {
        usuario_id: user.usuario_id,
        nombre: user.nombre,
        correo: user.correo,
        contrasena_hash: user.contrasena_hash,
        rol: user.rol,
        intentos_fallidos: user.intentos_fallidos,
        cuenta_bloqueada_hasta: user.cuenta_bloqueada_hasta,
    }
}

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn find_by_email(&self, correo: &str) -> Result<Option<AccountRecord>, String> {
        let user = Users::find()
            .filter(UserColumn::Correo.eq(correo))
            .one(self.db.as_ref())
            .await
            .map_err(|e| format!("Database error: {}", e))?;

        Ok(user.map(to_record))
    }

    async fn clear_lock(&self, usuario_id: i32) -> Result<(), String> {
        let txn = self.db.begin().await.map_err(|e| format!("Transaction begin error: {}", e))?;

        let user = Users::find_by_id(usuario_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| format!("Query error: {}", e))?
            .ok_or_else(|| format!("User {} not found", usuario_id))?;

        let mut active: UserActiveModel = user.into();
        active.intentos_fallidos = Set(0);
        active.cuenta_bloqueada_hasta = Set(None);
        active.update(&txn).await.map_err(|e| format!("Update error: {}", e))?;

        txn.commit().await.map_err(|e| format!("Transaction commit error: {}", e))
    }

    async fn record_failure(&self, usuario_id: i32) -> Result<i32, String> {
        let txn = self.db.begin().await.map_err(|e| format!("Transaction begin error: {}", e))?;

        let user = Users::find_by_id(usuario_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| format!("Query error: {}", e))?
            .ok_or_else(|| format!("User {} not found", usuario_id))?;

        let intentos = user.intentos_fallidos + 1;
        let mut active: UserActiveModel = user.into();
        active.intentos_fallidos = Set(intentos);
        active.update(&txn).await.map_err(|e| format!("Update error: {}", e))?;

        txn.commit().await.map_err(|e| format!("Transaction commit error: {}", e))?;

        Ok(intentos)
    }

    async fn lock_account(&self, usuario_id: i32, hasta: NaiveDateTime) -> Result<(), String> {
        let txn = self.db.begin().await.map_err(|e| format!("Transaction begin error: {}", e))?;

        let user = Users::find_by_id(usuario_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| format!("Query error: {}", e))?
            .ok_or_else(|| format!("User {} not found", usuario_id))?;

        let mut active: UserActiveModel = user.into();
        active.cuenta_bloqueada_hasta = Set(Some(hasta));
        active.update(&txn).await.map_err(|e| format!("Update error: {}", e))?;

        txn.commit().await.map_err(|e| format!("Transaction commit error: {}", e))
    }
}
