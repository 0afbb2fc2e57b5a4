// ============================================================================
// SERVICE : ANALYSE DE TENDANCES
// ============================================================================
//
// Description:
//   Segmentation d'un historique de prix (trié par date croissante) en
//   périodes maximales de même tendance (Aumento / Disminución /
//   Estabilidad), plus statistiques globales de la série.
//
// Algorithme:
//   - Chaque paire de points adjacents est classée selon sa variation en %
//     avec une bande de ±2% (en dessous = Estabilidad).
//   - Une période prend la tendance de sa première paire et s'étend tant
//     que les paires suivantes gardent la même classification. La paire qui
//     diffère ferme la période; son point de droite ouvre la suivante.
//   - La variation d'une période se calcule sur ses prix de bord
//     (fin - début) / début, PAS en composant les variations point à point.
//   - La tendance générale de la série utilise une bande plus large de ±5%
//     (filtre de bruit local vs seuil de significativité global, les deux
//     seuils sont volontairement distincts).
//
// Points d'attention:
//   - Fonction pure, déterministe, aucun accès BD.
//   - Préconditions (prix strictement positifs, dates croissantes) à la
//     charge de l'appelant : violation = bug, on échoue bruyamment.
//
// ============================================================================

use chrono::NaiveDate;
use serde::Serialize;

/// Bande de classification point à point (±2%).
pub const UMBRAL_PERIODO: f64 = 2.0;
/// Bande de la tendance générale de la série (±5%).
pub const UMBRAL_GENERAL: f64 = 5.0;

/// Un relevé de prix daté, déjà filtré (plaza active, fenêtre temporelle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub fecha: NaiveDate,
    pub precio: f64,
}

/// Tendance d'un mouvement de prix. Les libellés JSON restent en espagnol,
/// c'est le contrat de l'API avec le client existant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tendencia {
    Aumento,
    #[serde(rename = "Disminución")]
    Disminucion,
    Estabilidad,
}

/// Période contiguë de l'historique partageant une même tendance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodoTendencia {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub precio_inicio: f64,
    pub precio_fin: f64,
    pub tendencia: Tendencia,
    pub variacion_porcentual: f64,
}

/// Statistiques calculées sur la série complète, hors segmentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumenHistorial {
    pub precio_inicial: f64,
    pub precio_final: f64,
    pub precio_promedio: f64,
    pub precio_maximo: f64,
    pub precio_minimo: f64,
    pub variacion_porcentual: f64,
    pub total_registros: usize,
    pub tendencia_general: Tendencia,
}

fn variacion_porcentual(precio_anterior: f64, precio_actual: f64) -> f64 {
    (precio_actual - precio_anterior) / precio_anterior * 100.0
}

fn clasificar(variacion: f64, umbral: f64) -> Tendencia {
    if variacion > umbral {
        Tendencia::Aumento
    } else if variacion < -umbral {
        Tendencia::Disminucion
    } else {
        Tendencia::Estabilidad
    }
}

fn redondear2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

// Préconditions de l'appelant : l'engin ne corrige jamais silencieusement.
fn verificar_precondiciones(historial: &[PricePoint]) {
    assert!(
        historial.iter().all(|p| p.precio > 0.0),
        "price history contains a non-positive price (caller must filter)"
    );
    assert!(
        historial.windows(2).all(|w| w[0].fecha <= w[1].fecha),
        "price history is not sorted by ascending date"
    );
}

/// Segmente l'historique en périodes maximales de même tendance.
/// Moins de 2 points : aucune tendance ne peut être établie, liste vide.
pub fn analizar_periodos(historial: &[PricePoint]) -> Vec<PeriodoTendencia> {
    verificar_precondiciones(historial);

    if historial.len() < 2 {
        return Vec::new();
    }

    let mut periodos = Vec::new();
    let mut i = 0;

    while i < historial.len() - 1 {
        let inicio = historial[i];

        // La tendance de la période est fixée par sa première paire
        let tendencia = clasificar(
            variacion_porcentual(historial[i].precio, historial[i + 1].precio),
            UMBRAL_PERIODO,
        );

        // Elle s'étend tant que les paires suivantes la confirment
        let mut j = i + 2;
        while j < historial.len() {
            let nueva = clasificar(
                variacion_porcentual(historial[j - 1].precio, historial[j].precio),
                UMBRAL_PERIODO,
            );
            if nueva != tendencia {
                break;
            }
            j += 1;
        }

        // Variation sur les prix de bord uniquement
        let fin = historial[j - 1];
        periodos.push(PeriodoTendencia {
            fecha_inicio: inicio.fecha,
            fecha_fin: fin.fecha,
            precio_inicio: inicio.precio,
            precio_fin: fin.precio,
            tendencia,
            variacion_porcentual: redondear2(variacion_porcentual(inicio.precio, fin.precio)),
        });

        // Le point dont la paire diffère ouvre la période suivante
        i = j;
    }

    periodos
}

/// Statistiques globales de la série (au moins un point requis).
pub fn resumen_historial(historial: &[PricePoint]) -> ResumenHistorial {
    verificar_precondiciones(historial);
    assert!(!historial.is_empty(), "summary requires at least one price point");

    let precio_inicial = historial[0].precio;
    let precio_final = historial[historial.len() - 1].precio;
    let variacion = variacion_porcentual(precio_inicial, precio_final);

    let suma: f64 = historial.iter().map(|p| p.precio).sum();
    let maximo = historial.iter().map(|p| p.precio).fold(f64::MIN, f64::max);
    let minimo = historial.iter().map(|p| p.precio).fold(f64::MAX, f64::min);

    ResumenHistorial {
        precio_inicial,
        precio_final,
        precio_promedio: redondear2(suma / historial.len() as f64),
        precio_maximo: maximo,
        precio_minimo: minimo,
        variacion_porcentual: redondear2(variacion),
        total_registros: historial.len(),
        tendencia_general: clasificar(variacion, UMBRAL_GENERAL),
    }
}

/// Segmentation + résumé en un appel (l'historique ne doit pas être vide).
pub fn segmentar_historial(historial: &[PricePoint]) -> (Vec<PeriodoTendencia>, ResumenHistorial) {
    (analizar_periodos(historial), resumen_historial(historial))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn punto(dia: u32, precio: f64) -> PricePoint {
        PricePoint {
            fecha: NaiveDate::from_ymd_opt(2024, 1, dia).unwrap(),
            precio,
        }
    }

    fn serie(precios: &[f64]) -> Vec<PricePoint> {
        precios
            .iter()
            .enumerate()
            .map(|(i, &p)| punto(i as u32 + 1, p))
            .collect()
    }

    #[test]
    fn test_less_than_two_points_yields_no_periods() {
        assert!(analizar_periodos(&[]).is_empty());
        assert!(analizar_periodos(&serie(&[2500.0])).is_empty());
    }

    #[test]
    fn test_stability_step_closes_an_increase_run() {
        // variations point à point : +3%, +2.91%, -1.89% (Estabilidad), -32.69%
        let historial = serie(&[100.0, 103.0, 106.0, 104.0, 70.0]);
        let periodos = analizar_periodos(&historial);

        assert_eq!(periodos.len(), 2);

        // La paire 106→104 (-1.89%, dans la bande ±2%) ferme la période
        // d'Aumento sur le point 106
        assert_eq!(periodos[0].tendencia, Tendencia::Aumento);
        assert_eq!(periodos[0].precio_inicio, 100.0);
        assert_eq!(periodos[0].precio_fin, 106.0);
        assert_eq!(periodos[0].fecha_inicio, punto(1, 0.0).fecha);
        assert_eq!(periodos[0].fecha_fin, punto(3, 0.0).fecha);
        assert!((periodos[0].variacion_porcentual - 6.0).abs() < 1e-9);

        // ... et le point 104 ouvre la période suivante
        assert_eq!(periodos[1].tendencia, Tendencia::Disminucion);
        assert_eq!(periodos[1].precio_inicio, 104.0);
        assert_eq!(periodos[1].precio_fin, 70.0);
        assert!((periodos[1].variacion_porcentual - (-32.69)).abs() < 1e-9);
    }

    #[test]
    fn test_flat_series_is_one_stability_period() {
        let historial = serie(&[100.0, 101.0, 99.5, 100.2, 98.9]);
        let periodos = analizar_periodos(&historial);

        assert_eq!(periodos.len(), 1);
        assert_eq!(periodos[0].tendencia, Tendencia::Estabilidad);
        // Variation de bord à bord, même si chaque pas est sous ±2%
        assert!((periodos[0].variacion_porcentual - (-1.1)).abs() < 1e-9);
    }

    #[test]
    fn test_period_variation_uses_boundary_prices_only() {
        // Deux pas d'Aumento dont la composition ne vaut pas la somme
        let historial = serie(&[100.0, 103.0, 106.2]);
        let periodos = analizar_periodos(&historial);

        assert_eq!(periodos.len(), 1);
        assert_eq!(periodos[0].tendencia, Tendencia::Aumento);
        assert!((periodos[0].variacion_porcentual - 6.2).abs() < 1e-9);
    }

    #[test]
    fn test_consecutive_periods_may_repeat_trend_label() {
        // Le pas stable 103→103 est absorbé entre deux hausses : chaque
        // période garde le label qui l'a ouverte
        let historial = serie(&[100.0, 103.5, 103.5, 106.8]);
        let periodos = analizar_periodos(&historial);

        assert_eq!(periodos.len(), 2);
        assert_eq!(periodos[0].tendencia, Tendencia::Aumento);
        assert_eq!(periodos[0].precio_fin, 103.5);
        assert_eq!(periodos[1].tendencia, Tendencia::Aumento);
        assert_eq!(periodos[1].precio_inicio, 103.5);
    }

    #[test]
    fn test_periods_cover_input_without_overlap() {
        let historial = serie(&[100.0, 95.0, 90.0, 93.0, 96.0, 95.8, 95.5]);
        let periodos = analizar_periodos(&historial);

        assert!(!periodos.is_empty());
        assert_eq!(periodos[0].fecha_inicio, historial[0].fecha);
        assert_eq!(periodos.last().unwrap().fecha_fin, historial.last().unwrap().fecha);
        for ventana in periodos.windows(2) {
            assert!(ventana[0].fecha_fin < ventana[1].fecha_inicio);
        }
    }

    #[test]
    fn test_general_trend_uses_wider_five_percent_band() {
        // +4% au total : Aumento au sens des périodes (±2%) mais Estabilidad
        // au sens de la série (±5%)
        let historial = serie(&[100.0, 103.5, 104.0]);

        let periodos = analizar_periodos(&historial);
        assert_eq!(periodos[0].tendencia, Tendencia::Aumento);

        let resumen = resumen_historial(&historial);
        assert_eq!(resumen.tendencia_general, Tendencia::Estabilidad);
        assert!((resumen.variacion_porcentual - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_statistics() {
        let historial = serie(&[2000.0, 2500.0, 1500.0, 3000.0]);
        let resumen = resumen_historial(&historial);

        assert_eq!(resumen.precio_inicial, 2000.0);
        assert_eq!(resumen.precio_final, 3000.0);
        assert_eq!(resumen.precio_promedio, 2250.0);
        assert_eq!(resumen.precio_maximo, 3000.0);
        assert_eq!(resumen.precio_minimo, 1500.0);
        assert_eq!(resumen.total_registros, 4);
        assert_eq!(resumen.tendencia_general, Tendencia::Aumento);
        assert!((resumen.variacion_porcentual - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let historial = serie(&[100.0, 103.0, 106.0, 104.0, 70.0, 71.0, 75.0]);
        let (p1, r1) = segmentar_historial(&historial);
        let (p2, r2) = segmentar_historial(&historial);
        assert_eq!(p1, p2);
        assert_eq!(r1, r2);
    }

    #[test]
    #[should_panic(expected = "non-positive price")]
    fn test_non_positive_price_panics() {
        analizar_periodos(&serie(&[100.0, 0.0, 90.0]));
    }

    #[test]
    #[should_panic(expected = "not sorted")]
    fn test_unsorted_dates_panic() {
        let historial = vec![punto(5, 100.0), punto(1, 101.0)];
        analizar_periodos(&historial);
    }
}
