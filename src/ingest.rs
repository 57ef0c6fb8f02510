//! Per-catalog adapters from raw snapshot JSON to [`SourceRecord`].
//!
//! Snapshots are scraped data: every field may be missing, ids and years
//! show up as numbers or strings, coordinates as numbers or numeric
//! strings. Raw fields are therefore kept as `serde_json::Value` and
//! coerced one by one; a bad field becomes empty, never an error.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ConsolidateError, Result};
use crate::types::{Coordinates, SourceName, SourceRecord};

const INDH_URL: &str = "https://mapaconflictos.indh.cl/conflicto/";
const EJATLAS_URL: &str = "https://ejatlas.org/conflict/";
const OCMAL_URL: &str = "https://mapa.conflictosmineros.net/ocmal_db-v2/";
const OCMAL_SECTOR: &str = "Minería";

// ── Raw snapshot shapes ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawIndh {
    id: Option<Value>,
    titulo_conflicto: Option<Value>,
    resumen_conflicto: Option<Value>,
    /// `{"nombreRegion": …}` or a bare string
    region: Option<Value>,
    localidad_conflicto: Option<Value>,
    marca_mapa: Option<Value>,
    sector_productivo: Option<Value>,
    /// Misspelled upstream.
    #[serde(rename = "estadoConflico")]
    estado_conflicto: Option<Value>,
    anyo: Option<Value>,
    /// `Some(Null)` for an explicit null, `None` when the key is absent.
    #[serde(deserialize_with = "present")]
    es_territorio_indigena: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEjAtlas {
    id: Option<Value>,
    name: Option<Value>,
    headline: Option<Value>,
    slug: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOcmal {
    id: Option<Value>,
    nombre: Option<Value>,
    region: Option<Value>,
    ubicacion: Option<Value>,
    #[serde(rename = "año_inicio")]
    anio_inicio: Option<Value>,
}

// ── Loading ──────────────────────────────────────────────────────────

/// Read one catalog snapshot. A missing file yields an empty collection.
pub fn load_snapshot(source: SourceName, path: &Path) -> Result<Vec<SourceRecord>> {
    if !path.exists() {
        warn!("{} snapshot not found at {}; continuing without it", source.label(), path.display());
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(path).map_err(|source| ConsolidateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ConsolidateError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_snapshot(source, value).ok_or_else(|| ConsolidateError::NotAnArray {
        path: path.to_path_buf(),
    })?;
    info!("Loaded {} {} records from {}", records.len(), source.label(), path.display());
    Ok(records)
}

/// Map a snapshot document to records. `None` when the top level is not an
/// array.
pub fn parse_snapshot(source: SourceName, value: Value) -> Option<Vec<SourceRecord>> {
    let Value::Array(items) = value else {
        return None;
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!("Skipping {} entry #{}: not an object", source.label(), i);
            continue;
        }
        let record = match source {
            SourceName::Indh => serde_json::from_value(item).map(from_indh),
            SourceName::EjAtlas => serde_json::from_value(item).map(from_ejatlas),
            SourceName::Ocmal => serde_json::from_value(item).map(from_ocmal),
        };
        match record {
            Ok(r) => records.push(r),
            Err(e) => warn!("Skipping {} entry #{}: {}", source.label(), i, e),
        }
    }
    Some(records)
}

fn from_indh(raw: RawIndh) -> SourceRecord {
    let id = text(raw.id.as_ref());
    let coordinates = raw.marca_mapa.as_ref().and_then(|m| {
        Some(Coordinates {
            lat: number(m.get("latitud"))?,
            lon: number(m.get("longitud"))?,
        })
    });
    let region = match raw.region.as_ref() {
        Some(r @ Value::Object(_)) => text(r.get("nombreRegion")),
        other => text(other),
    };

    SourceRecord {
        external_url: if id.is_empty() { String::new() } else { format!("{INDH_URL}{id}") },
        source_id: id,
        source_name: SourceName::Indh,
        title: text(raw.titulo_conflicto.as_ref()),
        description: optional_text(raw.resumen_conflicto.as_ref()),
        region,
        locality: text(raw.localidad_conflicto.as_ref()),
        sector: text(raw.sector_productivo.as_ref().and_then(|s| s.get("nombreSector"))),
        status: text(raw.estado_conflicto.as_ref().and_then(|s| s.get("glosa"))),
        start_year: year(raw.anyo.as_ref()),
        coordinates,
        indigenous_territory: match raw.es_territorio_indigena {
            None => Some(false),
            Some(Value::Null) => None,
            Some(v) => Some(flag(Some(&v))),
        },
    }
}

fn from_ejatlas(raw: RawEjAtlas) -> SourceRecord {
    let slug = text(raw.slug.as_ref());
    let mut record = SourceRecord::new(SourceName::EjAtlas, text(raw.id.as_ref()), text(raw.name.as_ref()));
    record.description = optional_text(raw.headline.as_ref());
    if !slug.is_empty() {
        record.external_url = format!("{EJATLAS_URL}{slug}");
    }
    record
}

fn from_ocmal(raw: RawOcmal) -> SourceRecord {
    let mut record = SourceRecord::new(SourceName::Ocmal, text(raw.id.as_ref()), text(raw.nombre.as_ref()));
    record.region = text(raw.region.as_ref());
    record.locality = text(raw.ubicacion.as_ref());
    record.sector = OCMAL_SECTOR.to_string();
    record.start_year = year(raw.anio_inicio.as_ref());
    record.external_url = OCMAL_URL.to_string();
    record
}

// ── Field coercion ───────────────────────────────────────────────────

fn present<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

/// Strings verbatim, numbers and booleans printed, everything else empty.
fn text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn optional_text(v: Option<&Value>) -> Option<String> {
    Some(text(v)).filter(|s| !s.trim().is_empty())
}

fn number(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn year(v: Option<&Value>) -> Option<i32> {
    match v? {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i32),
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|i| i != 0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "si" | "sí" | "1"),
        _ => false,
    }
}
