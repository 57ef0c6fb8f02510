//! Published dataset files: pretty JSON rows and a spreadsheet-friendly CSV.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use conflict_types::{EjAtlasRef, IndhRef, MasterRow, OcmalRef};
use serde::Serialize;
use tracing::info;

use crate::consolidate::RunSummary;
use crate::error::{ConsolidateError, Result};
use crate::types::{MasterRecord, SourceName, SourceRef, Taxonomy};

/// Rows with inference applied.
pub const COMPLETE_STEM: &str = "conflictos_consolidados_completo";
/// Rows with classifier tags only.
pub const BASE_STEM: &str = "conflictos_consolidados_ids";
/// Run counts written next to the datasets.
pub const SUMMARY_FILE: &str = "resumen_consolidacion.json";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const LIST_SEPARATOR: &str = ";";

// ── Row mapping ──────────────────────────────────────────────────────

pub fn to_row(m: &MasterRecord) -> MasterRow {
    let f = &m.fields;
    let (id_indh, nombre_indh, url_indh) = ref_columns(m.source_ref(SourceName::Indh));
    let (id_ejatlas, nombre_ejatlas, url_ejatlas) = ref_columns(m.source_ref(SourceName::EjAtlas));
    let (id_ocmal, nombre_ocmal, url_ocmal) = ref_columns(m.source_ref(SourceName::Ocmal));
    let c = &m.categories;

    MasterRow {
        id_maestro: m.master_id.clone(),
        fuente_principal: m.primary_source.label().to_string(),
        nombre: f.title.clone(),
        descripcion: f.description.clone(),
        region: f.region.clone(),
        localidad: f.locality.clone(),
        latitud: f.coordinates.map(|c| c.lat),
        longitud: f.coordinates.map(|c| c.lon),
        sector: f.sector.clone(),
        estado: f.status.clone(),
        anio_inicio: f.start_year,
        territorio_indigena: f.indigenous_territory,
        indh: IndhRef {
            en_indh: m.is_present_in(SourceName::Indh),
            id_indh,
            nombre_indh,
            url_indh,
        },
        ejatlas: EjAtlasRef {
            en_ejatlas: m.is_present_in(SourceName::EjAtlas),
            id_ejatlas,
            nombre_ejatlas,
            url_ejatlas,
        },
        ocmal: OcmalRef {
            en_ocmal: m.is_present_in(SourceName::Ocmal),
            id_ocmal,
            nombre_ocmal,
            url_ocmal,
        },
        impactos: c.impacts.labels(),
        actores: c.actors.labels(),
        resistencias: c.resistances.labels(),
        resultados: c.outcomes.labels(),
        impactos_inferido: c.get(Taxonomy::Impact).inferred,
        actores_inferido: c.get(Taxonomy::Actor).inferred,
        resistencias_inferido: c.get(Taxonomy::Resistance).inferred,
        resultados_inferido: c.get(Taxonomy::Outcome).inferred,
    }
}

fn ref_columns(r: Option<&SourceRef>) -> (Option<String>, Option<String>, Option<String>) {
    match r {
        Some(r) => (
            Some(r.source_id.clone()),
            Some(r.title.clone()),
            Some(r.url.clone()).filter(|u| !u.is_empty()),
        ),
        None => (None, None, None),
    }
}

pub fn to_rows(masters: &[MasterRecord]) -> Vec<MasterRow> {
    masters.iter().map(to_row).collect()
}

// ── CSV projection ───────────────────────────────────────────────────

#[derive(Serialize)]
struct CsvRow<'a> {
    id_maestro: &'a str,
    fuente_principal: &'a str,
    nombre: &'a str,
    region: &'a str,
    sector: &'a str,
    estado: &'a str,
    #[serde(rename = "año_inicio")]
    anio_inicio: Option<i32>,
    en_ejatlas: bool,
    nombre_ejatlas: Option<&'a str>,
    en_ocmal: bool,
    nombre_ocmal: Option<&'a str>,
    impactos: String,
    actores: String,
    resistencias: String,
    resultados: String,
}

impl<'a> From<&'a MasterRow> for CsvRow<'a> {
    fn from(r: &'a MasterRow) -> Self {
        CsvRow {
            id_maestro: &r.id_maestro,
            fuente_principal: &r.fuente_principal,
            nombre: &r.nombre,
            region: &r.region,
            sector: &r.sector,
            estado: &r.estado,
            anio_inicio: r.anio_inicio,
            en_ejatlas: r.ejatlas.en_ejatlas,
            nombre_ejatlas: r.ejatlas.nombre_ejatlas.as_deref(),
            en_ocmal: r.ocmal.en_ocmal,
            nombre_ocmal: r.ocmal.nombre_ocmal.as_deref(),
            impactos: r.impactos.join(LIST_SEPARATOR),
            actores: r.actores.join(LIST_SEPARATOR),
            resistencias: r.resistencias.join(LIST_SEPARATOR),
            resultados: r.resultados.join(LIST_SEPARATOR),
        }
    }
}

// ── Writers ──────────────────────────────────────────────────────────

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConsolidateError + '_ {
    move |source| ConsolidateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Pretty-printed JSON with a trailing newline.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let file = File::create(path).map_err(io_err(path))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, data).map_err(|source| ConsolidateError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    w.write_all(b"\n").map_err(io_err(path))?;
    w.flush().map_err(io_err(path))
}

/// CSV projection of `rows`, prefixed with a UTF-8 byte-order mark.
pub fn write_csv(path: &Path, rows: &[MasterRow]) -> Result<()> {
    let mut file = File::create(path).map_err(io_err(path))?;
    file.write_all(UTF8_BOM).map_err(io_err(path))?;

    let mut w = csv::Writer::from_writer(file);
    for row in rows {
        w.serialize(CsvRow::from(row)).map_err(|source| ConsolidateError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    }
    w.flush().map_err(io_err(path))
}

/// Write `<stem>.json` and `<stem>.csv` under `dir`, creating it if needed.
pub fn write_dataset(dir: &Path, stem: &str, rows: &[MasterRow]) -> Result<[PathBuf; 2]> {
    fs::create_dir_all(dir).map_err(io_err(dir))?;

    let json_path = dir.join(format!("{stem}.json"));
    let csv_path = dir.join(format!("{stem}.csv"));
    write_json(&json_path, rows)?;
    write_csv(&csv_path, rows)?;

    info!("Wrote {} rows to {} and {}", rows.len(), json_path.display(), csv_path.display());
    Ok([json_path, csv_path])
}

pub fn write_summary(dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(SUMMARY_FILE);
    write_json(&path, summary)?;
    Ok(path)
}
