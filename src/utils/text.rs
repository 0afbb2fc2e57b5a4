/// Normalisation des noms de produits et de plazas pour la recherche.
/// Le frontend envoie parfois "aguacate-comun" ou "aguacate_comun" pour
/// "Aguacate Común" : la comparaison ignore espaces, tirets et underscores,
/// et la casse.

/// Clé de comparaison : minuscules, sans espaces ni tirets ni underscores.
pub fn clave_busqueda(nombre: &str) -> String {
    nombre
        .chars()
        .filter(|c| *c != ' ' && *c != '-' && *c != '_')
        .collect::<String>()
        .to_lowercase()
}

/// Forme affichable : tirets et underscores remplacés par des espaces.
pub fn limpiar_nombre(nombre: &str) -> String {
    nombre.replace(['-', '_'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clave_busqueda_ignores_separators_and_case() {
        assert_eq!(clave_busqueda("Aguacate Común"), clave_busqueda("aguacate-común"));
        assert_eq!(clave_busqueda("Plaza_Mayorista"), clave_busqueda("plaza mayorista"));
        assert_ne!(clave_busqueda("Tomate"), clave_busqueda("Tomate chonto"));
    }

    #[test]
    fn test_limpiar_nombre() {
        assert_eq!(limpiar_nombre("aguacate-comun"), "aguacate comun");
        assert_eq!(limpiar_nombre("  plaza_minorista "), "plaza minorista");
    }
}
