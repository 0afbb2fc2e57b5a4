// ============================================================================
// SERVICE : PRÉDICTION DE PRIX
// ============================================================================
//
// Description:
//   Prévision des prix au kilogramme à partir du CSV historique nettoyé
//   (data/precios_productos_limpio.csv, séparateur ';'). Pipeline :
//   nettoyage → filtre produit → retrait des outliers (IQR) → mise à
//   l'échelle min-max → régression linéaire sur la série → projection
//   mensuelle avec bande de confiance à 95% (± 1.96 sigma).
//
// Points d'attention:
//   - Les prix du CSV sont formatés en devise ("$1,234.56") et sont
//     nettoyés avant parsing
//   - Les prédictions sont bornées à la plage observée [min, max] du
//     produit (le clip se fait dans l'espace mis à l'échelle [0, 1])
//   - Les montants renvoyés sont reformatés en devise
//
// ============================================================================

use chrono::{Months, NaiveDate};
use polars::prelude::*;
use std::env;
use std::path::PathBuf;

use crate::models::dto::PredictedPrice;

const COLUMNA_FECHA: &str = "Fecha";
const COLUMNA_PRODUCTO: &str = "Productos";
const COLUMNA_PRECIO: &str = "Precio Por Kilogramo";

/// Niveau de confiance de la bande de prédiction, en pourcentage.
pub const NIVEL_CONFIANZA: f64 = 95.0;
const Z_95: f64 = 1.96;

fn ruta_csv() -> String {
    env::var("PRICES_CSV_PATH").unwrap_or_else(|_| "data/precios_productos_limpio.csv".to_string())
}

pub fn predict_prices(product_name: &str, months_ahead: usize) -> Result<Vec<PredictedPrice>, String> {
    predecir_desde_csv(&ruta_csv(), product_name, months_ahead)
}

/// Nettoie un montant formaté ("$1,234.56" → 1234.56)
fn limpiar_precio(texto: &str) -> Option<f64> {
    let limpio: String = texto.chars().filter(|c| *c != '$' && *c != ',').collect();
    let limpio = limpio.trim();
    if limpio.is_empty() {
        return None;
    }
    limpio.parse().ok()
}

fn parsear_fecha(texto: &str) -> Option<NaiveDate> {
    let texto = texto.trim();
    NaiveDate::parse_from_str(texto, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(texto, "%d/%m/%Y"))
        .ok()
}

/// Percentile avec interpolation linéaire (entrée triée)
fn percentil(ordenados: &[f64], p: f64) -> f64 {
    let n = ordenados.len();
    if n == 1 {
        return ordenados[0];
    }
    let rango = p / 100.0 * (n - 1) as f64;
    let lo = rango.floor() as usize;
    let hi = rango.ceil() as usize;
    ordenados[lo] + (ordenados[hi] - ordenados[lo]) * (rango - lo as f64)
}

/// Formate un montant en devise : 1234.5 → "$1,234.50"
pub fn formato_moneda(valor: f64) -> String {
    let negativo = valor < 0.0;
    let texto = format!("{:.2}", valor.abs());
    let (entero, decimales) = texto.split_once('.').unwrap_or((texto.as_str(), "00"));

    let mut con_comas = String::new();
    for (i, c) in entero.chars().enumerate() {
        if i > 0 && (entero.len() - i) % 3 == 0 {
            con_comas.push(',');
        }
        con_comas.push(c);
    }

    if negativo {
        format!("-${}.{}", con_comas, decimales)
    } else {
        format!("${}.{}", con_comas, decimales)
    }
}

/// Retrouve une colonne en ignorant les espaces parasites dans l'en-tête
fn columna<'a>(df: &'a DataFrame, nombre: &str) -> Result<&'a Series, String> {
    let real = df
        .get_column_names()
        .into_iter()
        .find(|c| c.as_str().trim() == nombre)
        .ok_or_else(|| format!("Missing column '{}' in CSV", nombre))?
        .clone();

    df.column(real.as_str())
        .map(|c| c.as_materialized_series())
        .map_err(|e| format!("Column access error: {}", e))
}

fn cargar_csv(ruta: &str) -> Result<DataFrame, String> {
    // Tout est lu en texte : les montants formatés et les dates sont
    // parsés à la main ensuite
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_separator(b';'))
        .try_into_reader_with_file_path(Some(PathBuf::from(ruta)))
        .map_err(|e| format!("Error loading CSV: {}", e))?
        .finish()
        .map_err(|e| format!("Error loading CSV: {}", e))
}

/// Série nettoyée d'un produit : (fecha, precio), triée, dédupliquée, prix > 0
fn serie_del_producto(df: &DataFrame, product_name: &str) -> Result<Vec<(NaiveDate, f64)>, String> {
    let fechas = columna(df, COLUMNA_FECHA)?
        .str()
        .map_err(|e| format!("Column type error: {}", e))?;
    let productos = columna(df, COLUMNA_PRODUCTO)?
        .str()
        .map_err(|e| format!("Column type error: {}", e))?;
    let precios = columna(df, COLUMNA_PRECIO)?
        .str()
        .map_err(|e| format!("Column type error: {}", e))?;

    let buscado = product_name.trim().to_lowercase();
    let mut serie: Vec<(NaiveDate, f64)> = Vec::new();

    for i in 0..df.height() {
        let producto = match productos.get(i) {
            Some(p) => p,
            None => continue,
        };
        if producto.trim().to_lowercase() != buscado {
            continue;
        }

        let fecha = match fechas.get(i).and_then(parsear_fecha) {
            Some(f) => f,
            None => continue,
        };
        let precio = match precios.get(i).and_then(limpiar_precio) {
            Some(p) if p > 0.0 => p,
            _ => continue,
        };

        serie.push((fecha, precio));
    }

    serie.sort_by_key(|(fecha, _)| *fecha);
    // Doublons (même date, même produit) : première occurrence conservée
    serie.dedup_by_key(|(fecha, _)| *fecha);

    Ok(serie)
}

/// Retire les outliers extrêmes avec la clôture de Tukey (1.5 × IQR)
fn filtrar_outliers(serie: Vec<(NaiveDate, f64)>) -> Vec<(NaiveDate, f64)> {
    if serie.len() < 4 {
        return serie;
    }

    let mut precios: Vec<f64> = serie.iter().map(|(_, p)| *p).collect();
    precios.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let q1 = percentil(&precios, 25.0);
    let q3 = percentil(&precios, 75.0);
    let iqr = q3 - q1;
    let (inferior, superior) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    serie
        .into_iter()
        .filter(|(_, p)| *p > inferior && *p < superior)
        .collect()
}

/// Régression linéaire par moindres carrés : (pente, ordonnée à l'origine)
fn ajuste_lineal(puntos: &[(f64, f64)]) -> (f64, f64) {
    let n = puntos.len() as f64;
    if puntos.len() < 2 {
        return (0.0, puntos.first().map(|(_, y)| *y).unwrap_or(0.0));
    }

    let media_x: f64 = puntos.iter().map(|(x, _)| x).sum::<f64>() / n;
    let media_y: f64 = puntos.iter().map(|(_, y)| y).sum::<f64>() / n;

    let covarianza: f64 = puntos.iter().map(|(x, y)| (x - media_x) * (y - media_y)).sum();
    let varianza_x: f64 = puntos.iter().map(|(x, _)| (x - media_x).powi(2)).sum();

    if varianza_x == 0.0 {
        return (0.0, media_y);
    }

    let pente = covarianza / varianza_x;
    (pente, media_y - pente * media_x)
}

pub fn predecir_desde_csv(
    ruta: &str,
    product_name: &str,
    months_ahead: usize,
) -> Result<Vec<PredictedPrice>, String> {
    println!("🔍 Loading price history from {}", ruta);
    let df = cargar_csv(ruta)?;

    let serie = serie_del_producto(&df, product_name)?;
    if serie.is_empty() {
        return Err(format!("No data found for {}", product_name));
    }

    let serie = filtrar_outliers(serie);
    if serie.is_empty() {
        return Err(format!("No data found for {}", product_name));
    }

    // Mise à l'échelle min-max sur la plage observée
    let y_min = serie.iter().map(|(_, p)| *p).fold(f64::INFINITY, f64::min);
    let y_max = serie.iter().map(|(_, p)| *p).fold(f64::NEG_INFINITY, f64::max);
    let rango = y_max - y_min;

    let primera_fecha = serie[0].0;
    let puntos: Vec<(f64, f64)> = serie
        .iter()
        .map(|(fecha, precio)| {
            let x = (*fecha - primera_fecha).num_days() as f64;
            let y = if rango > 0.0 { (precio - y_min) / rango } else { 0.0 };
            (x, y)
        })
        .collect();

    println!("🧠 Fitting trend for: {} ({} points)", product_name, puntos.len());
    let (pente, origen) = ajuste_lineal(&puntos);

    // Écart-type des résidus pour la bande de confiance
    let sigma = {
        let suma: f64 = puntos
            .iter()
            .map(|(x, y)| (y - (origen + pente * x)).powi(2))
            .sum();
        (suma / puntos.len() as f64).sqrt()
    };

    let ultima_fecha = serie.last().map(|(fecha, _)| *fecha).unwrap_or(primera_fecha);
    let reescalar = |v: f64| v.clamp(0.0, 1.0) * rango + y_min;

    let mut predicciones = Vec::with_capacity(months_ahead);
    for mes in 1..=months_ahead {
        let fecha = ultima_fecha
            .checked_add_months(Months::new(mes as u32))
            .ok_or("Prediction date out of range")?;
        let x = (fecha - primera_fecha).num_days() as f64;
        let yhat = origen + pente * x;

        predicciones.push(PredictedPrice {
            fecha: fecha.format("%Y-%m-%d").to_string(),
            precio_predicho: formato_moneda(reescalar(yhat)),
            minimo_estimado: formato_moneda(reescalar(yhat - Z_95 * sigma)),
            maximo_estimado: formato_moneda(reescalar(yhat + Z_95 * sigma)),
            nivel_confianza: NIVEL_CONFIANZA,
        });
    }

    println!("✅ Prediction complete for {}: {} months", product_name, predicciones.len());
    Ok(predicciones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn csv_temporal(nombre: &str, contenido: &str) -> String {
        let ruta = std::env::temp_dir().join(format!("precios_{}_{}.csv", nombre, std::process::id()));
        fs::write(&ruta, contenido).unwrap();
        ruta.to_string_lossy().into_owned()
    }

    #[test]
    fn test_formato_moneda() {
        assert_eq!(formato_moneda(999.0), "$999.00");
        assert_eq!(formato_moneda(1234.5), "$1,234.50");
        assert_eq!(formato_moneda(1234567.891), "$1,234,567.89");
        assert_eq!(formato_moneda(0.0), "$0.00");
    }

    #[test]
    fn test_limpiar_precio() {
        assert_eq!(limpiar_precio("$1,234.56"), Some(1234.56));
        assert_eq!(limpiar_precio(" 2500 "), Some(2500.0));
        assert_eq!(limpiar_precio("n/a"), None);
    }

    #[test]
    fn test_percentil_interpolation() {
        let datos = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentil(&datos, 25.0), 1.75);
        assert_eq!(percentil(&datos, 75.0), 3.25);
        assert_eq!(percentil(&datos, 0.0), 1.0);
        assert_eq!(percentil(&datos, 100.0), 4.0);
    }

    #[test]
    fn test_ajuste_lineal_recovers_slope() {
        let puntos: Vec<(f64, f64)> = (0..10).map(|x| (x as f64, 2.0 * x as f64 + 1.0)).collect();
        let (pente, origen) = ajuste_lineal(&puntos);
        assert!((pente - 2.0).abs() < 1e-9);
        assert!((origen - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_from_csv() {
        let contenido = "\
Fecha;Productos;Precio Por Kilogramo
2024-01-01;Gulupa;$1,000.00
2024-02-01;Gulupa;$1,100.00
2024-03-01;Gulupa;$1,200.00
2024-04-01;Gulupa;$1,300.00
2024-05-01;Gulupa;$1,400.00
2024-06-01;Gulupa;$1,500.00
2024-01-01;Tomate chonto;$2,000.00
";
        let ruta = csv_temporal("gulupa", contenido);

        let predicciones = predecir_desde_csv(&ruta, "gulupa", 3).unwrap();
        assert_eq!(predicciones.len(), 3);

        for (i, p) in predicciones.iter().enumerate() {
            // Fechas mensuelles après le dernier relevé
            let esperado = NaiveDate::from_ymd_opt(2024, 7 + i as u32, 1).unwrap();
            assert_eq!(p.fecha, esperado.format("%Y-%m-%d").to_string());
            assert_eq!(p.nivel_confianza, 95.0);
            // Les prédictions restent dans la plage observée (clip min-max)
            let valor = limpiar_precio(&p.precio_predicho).unwrap();
            assert!((1000.0..=1500.0).contains(&valor));
        }

        // Tendance croissante : les prédictions saturent vers le max observé
        let primera = limpiar_precio(&predicciones[0].precio_predicho).unwrap();
        assert!(primera > 1400.0);

        fs::remove_file(ruta).ok();
    }

    #[test]
    fn test_prediction_unknown_product() {
        let contenido = "Fecha;Productos;Precio Por Kilogramo\n2024-01-01;Gulupa;$1,000.00\n";
        let ruta = csv_temporal("desconocido", contenido);

        let resultado = predecir_desde_csv(&ruta, "Mangostino", 3);
        assert!(resultado.is_err());

        fs::remove_file(ruta).ok();
    }

    #[test]
    fn test_outlier_removed_by_iqr_fence() {
        let serie: Vec<(NaiveDate, f64)> = [100.0, 102.0, 101.0, 103.0, 99.0, 5000.0]
            .iter()
            .enumerate()
            .map(|(i, p)| (NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(), *p))
            .collect();

        let filtrada = filtrar_outliers(serie);
        assert_eq!(filtrada.len(), 5);
        assert!(filtrada.iter().all(|(_, p)| *p < 200.0));
    }
}
