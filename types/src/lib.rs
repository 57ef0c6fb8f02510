//! Row schema of the consolidated conflict dataset.
//!
//! This is the flat, Spanish-keyed shape written to
//! `conflictos_consolidados_*.json` and read back by the dashboard.
//! Field order here is the field order on disk.

use serde::{Deserialize, Serialize};

// ── Master row ───────────────────────────────────────────────────────────

/// One consolidated conflict, as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    /// `CONF-NNNN`
    pub id_maestro: String,
    /// `INDH`, `EJAtlas` or `OCMAL`
    pub fuente_principal: String,

    // Canonical fields, always from the primary source
    pub nombre: String,
    pub descripcion: String,
    pub region: String,
    pub localidad: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub sector: String,
    pub estado: String,
    #[serde(rename = "año_inicio")]
    pub anio_inicio: Option<i32>,
    pub territorio_indigena: Option<bool>,

    #[serde(flatten)]
    pub indh: IndhRef,
    #[serde(flatten)]
    pub ejatlas: EjAtlasRef,
    #[serde(flatten)]
    pub ocmal: OcmalRef,

    pub impactos: Vec<String>,
    pub actores: Vec<String>,
    pub resistencias: Vec<String>,
    pub resultados: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub impactos_inferido: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub actores_inferido: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub resistencias_inferido: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub resultados_inferido: bool,
}

// ── Per-catalog traceability columns ─────────────────────────────────────

/// `en_indh` / `id_indh` / `nombre_indh` / `url_indh`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndhRef {
    pub en_indh: bool,
    pub id_indh: Option<String>,
    pub nombre_indh: Option<String>,
    pub url_indh: Option<String>,
}

/// `en_ejatlas` / `id_ejatlas` / `nombre_ejatlas` / `url_ejatlas`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EjAtlasRef {
    pub en_ejatlas: bool,
    pub id_ejatlas: Option<String>,
    pub nombre_ejatlas: Option<String>,
    pub url_ejatlas: Option<String>,
}

/// `en_ocmal` / `id_ocmal` / `nombre_ocmal` / `url_ocmal`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcmalRef {
    pub en_ocmal: bool,
    pub id_ocmal: Option<String>,
    pub nombre_ocmal: Option<String>,
    pub url_ocmal: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MasterRow {
        MasterRow {
            id_maestro: "CONF-0001".into(),
            fuente_principal: "INDH".into(),
            nombre: "Pascua Lama".into(),
            descripcion: String::new(),
            region: "Atacama".into(),
            localidad: String::new(),
            latitud: None,
            longitud: None,
            sector: "Minería".into(),
            estado: "Activo".into(),
            anio_inicio: Some(2001),
            territorio_indigena: Some(true),
            indh: IndhRef {
                en_indh: true,
                id_indh: Some("12".into()),
                nombre_indh: Some("Pascua Lama".into()),
                url_indh: None,
            },
            ejatlas: EjAtlasRef {
                en_ejatlas: true,
                ..Default::default()
            },
            ocmal: OcmalRef::default(),
            impactos: vec!["agua".into()],
            actores: vec![],
            resistencias: vec![],
            resultados: vec![],
            impactos_inferido: false,
            actores_inferido: true,
            resistencias_inferido: false,
            resultados_inferido: false,
        }
    }

    #[test]
    fn test_flat_keys() {
        let json = serde_json::to_value(row()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("año_inicio"));
        assert!(obj.contains_key("en_ejatlas"));
        assert!(obj.contains_key("url_ocmal"));
        assert!(!obj.contains_key("indh"));
    }

    #[test]
    fn test_inferred_flag_only_when_set() {
        let json = serde_json::to_value(row()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.get("actores_inferido"), Some(&serde_json::Value::Bool(true)));
        assert!(!obj.contains_key("impactos_inferido"));
    }
}
