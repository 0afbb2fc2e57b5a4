// ============================================================================
// SERVICE : PLAZAS DE MERCADO
// ============================================================================
//
// Description:
//   Lecture et administration des plazas : consultation du détail, création
//   (admin), changement d'état activa/inactiva (admin).
//
// Points d'attention:
//   - Une plaza est identifiée par (nombre, ciudad) insensible à la casse :
//     pas de doublon à la création
//   - Les coordonnées arrivent en texte "(lat, lng)" et sont validées avant
//     insertion
//   - estado ne prend que deux valeurs : 'activa' / 'inactiva'
//
// ============================================================================

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::models::dto::{PlazaCreate, PlazaDetalle};
use crate::models::plaza::{self, Entity as Plazas};
use crate::models::users::{Column as UserColumn, Entity as Users};
use crate::utils::password::verify_password;
use sea_orm::{ColumnTrait, QueryFilter};

#[derive(Debug, PartialEq)]
pub enum PlazaError {
    /// Une plaza du même nom existe déjà dans la même ville
    Duplicada,
    CoordenadasInvalidas,
    NoEncontrada,
    EstadoInvalido,
    AccesoDenegado,
    Db(String),
}

/// Parse des coordonnées "(6.25, -75.56)" → (lat, lng)
pub fn parse_coordenadas(texto: &str) -> Option<(f64, f64)> {
    let interior = texto.trim().strip_prefix('(')?.strip_suffix(')')?;
    let mut partes = interior.split(',');
    let lat: f64 = partes.next()?.trim().parse().ok()?;
    let lng: f64 = partes.next()?.trim().parse().ok()?;
    if partes.next().is_some() {
        return None;
    }
    Some((lat, lng))
}

fn to_detalle(plaza: plaza::Model) -> PlazaDetalle {
    // tipos_productos est stocké en CSV, exposé en liste
    let tipos_productos = plaza
        .tipos_productos
        .as_deref()
        .map(|csv| {
            csv.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    PlazaDetalle {
        plaza_id: plaza.plaza_id,
        nombre: plaza.nombre,
        direccion: plaza.direccion,
        ciudad: plaza.ciudad,
        horarios: plaza.horarios,
        numero_comerciantes: plaza.numero_comerciantes,
        tipos_productos,
        datos_contacto: plaza.datos_contacto,
        estado: plaza.estado,
    }
}

/// Détail d'une plaza par id. None si elle n'existe pas.
pub async fn obtener_plaza_por_id(
    db: &DatabaseConnection,
    plaza_id: i32,
) -> Result<Option<PlazaDetalle>, String> {
    let plaza = Plazas::find_by_id(plaza_id)
        .one(db)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(plaza.map(to_detalle))
}

/// Création d'une plaza (réservée à l'admin, vérifié par l'appelant).
pub async fn crear_plaza(
    db: &DatabaseConnection,
    datos: PlazaCreate,
) -> Result<plaza::Model, PlazaError> {
    let (lat, lng) = parse_coordenadas(&datos.coordenadas).ok_or(PlazaError::CoordenadasInvalidas)?;

    let existentes = Plazas::find()
        .all(db)
        .await
        .map_err(|e| PlazaError::Db(format!("Database error: {}", e)))?;

    let duplicada = existentes.iter().any(|p| {
        p.nombre.eq_ignore_ascii_case(&datos.nombre) && p.ciudad.eq_ignore_ascii_case(&datos.ciudad)
    });
    if duplicada {
        return Err(PlazaError::Duplicada);
    }

    let nueva = plaza::ActiveModel {
        nombre: Set(datos.nombre),
        direccion: Set(Some(datos.direccion)),
        ciudad: Set(datos.ciudad),
        coordenadas: Set(Some(format!("({}, {})", lat, lng))),
        horarios: Set(datos.horarios),
        numero_comerciantes: Set(datos.numero_comerciantes),
        tipos_productos: Set(datos.tipos_productos),
        datos_contacto: Set(datos.datos_contacto),
        estado: Set(Some("activa".to_string())),
        fecha_actualizacion: Set(Some(Utc::now().naive_utc())),
        ..Default::default()
    };

    nueva
        .insert(db)
        .await
        .map_err(|e| PlazaError::Db(format!("Error al crear plaza: {}", e)))
}

/// Passage d'une plaza à 'activa' ou 'inactiva' (réservé à l'admin).
pub async fn actualizar_estado(
    db: &DatabaseConnection,
    plaza_id: i32,
    estado: &str,
) -> Result<plaza::Model, PlazaError> {
    if estado != "activa" && estado != "inactiva" {
        return Err(PlazaError::EstadoInvalido);
    }

    let plaza = Plazas::find_by_id(plaza_id)
        .one(db)
        .await
        .map_err(|e| PlazaError::Db(format!("Database error: {}", e)))?
        .ok_or(PlazaError::NoEncontrada)?;

    let mut active: plaza::ActiveModel = plaza.into();
    active.estado = Set(Some(estado.to_string()));
    active.fecha_actualizacion = Set(Some(Utc::now().naive_utc()));

    active
        .update(db)
        .await
        .map_err(|e| PlazaError::Db(format!("Error al actualizar plaza: {}", e)))
}

/// Vérifie que les credentials en query string appartiennent à un admin.
/// Utilisé par la création de plaza, qui n'utilise pas le header Bearer.
pub async fn verificar_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<(), PlazaError> {
    let user = Users::find()
        .filter(UserColumn::Correo.eq(email))
        .one(db)
        .await
        .map_err(|e| PlazaError::Db(format!("Database error: {}", e)))?
        .ok_or(PlazaError::AccesoDenegado)?;

    if !verify_password(password, &user.contrasena_hash).unwrap_or(false) {
        return Err(PlazaError::AccesoDenegado);
    }
    if user.rol != "admin" {
        return Err(PlazaError::AccesoDenegado);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordenadas_valid() {
        assert_eq!(parse_coordenadas("(6.25, -75.56)"), Some((6.25, -75.56)));
        assert_eq!(parse_coordenadas(" (1,2) "), Some((1.0, 2.0)));
    }

    #[test]
    fn test_parse_coordenadas_invalid() {
        assert_eq!(parse_coordenadas("6.25, -75.56"), None);
        assert_eq!(parse_coordenadas("(abc, 2)"), None);
        assert_eq!(parse_coordenadas("(1, 2, 3)"), None);
        assert_eq!(parse_coordenadas("()"), None);
    }
}
