use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::json;

use conflict_consolidate::ingest::load_snapshot;
use conflict_consolidate::output::{self, BASE_STEM, COMPLETE_STEM};
use conflict_consolidate::scanner::{scan_data_dir, MAX_SCAN_DEPTH};
use conflict_consolidate::types::{CanonicalFields, SOURCE_PRIORITY};
use conflict_consolidate::{
    Classifier, ConsolidateConfig, Consolidator, MasterRecord, SourceName, SourceRecord, TaxonomyConfig,
};
use conflict_types::MasterRow;

// ── Fixture ──────────────────────────────────────────────────────────

fn write_snapshots(dir: &Path) {
    let indh = json!([
        {
            "id": 101,
            "tituloConflicto": "Proyecto Minero Pascua Lama",
            "resumenConflicto": "<p>Comunidades diaguitas denuncian daño a glaciares y contaminación del agua.</p>",
            "region": {"nombreRegion": "Atacama"},
            "localidadConflicto": "Alto del Carmen",
            "sectorProductivo": {"nombreSector": "Minería"},
            "estadoConflico": {"glosa": "Latente"},
            "anyo": 2001,
            "esTerritorioIndigena": true
        },
        {
            "id": 102,
            "tituloConflicto": "Central Termoeléctrica Castilla",
            "resumenConflicto": "Pescadores de Totoral presentaron un recurso de protección.",
            "region": "Atacama"
        },
        {
            "id": 103,
            "tituloConflicto": "Relleno sanitario Santa Marta",
            "resumenConflicto": ""
        }
    ]);
    let ejatlas = json!([
        {"id": 1, "name": "Pascua Lama gold mine", "headline": "Glaciers threatened", "slug": "pascua-lama"},
        {"id": 2, "name": "Caserones copper mine Tierra Amarilla", "headline": "Water extraction in the Copiapó valley", "slug": "caserones"},
        {"id": 3, "name": "Alto Maipo hydroelectric project", "headline": "", "slug": "alto-maipo"},
        "not a record"
    ]);
    let ocmal = json!([
        {"id": "o1", "nombre": "Conflicto Pascua Lama", "region": "Coquimbo", "ubicacion": "El Tránsito", "año_inicio": 2009},
        {"id": "o2", "nombre": "Minera Caserones en Tierra Amarilla"},
        {"id": "o3", "nombre": "Minera X", "año_inicio": "2015"},
        {"id": "o4", "nombre": "Comunidad Colla contra minera"},
        {"id": "o5", "nombre": "Relaves Minera Candelaria"}
    ]);

    fs::create_dir_all(dir.join("datos")).unwrap();
    fs::write(dir.join("indh_conflictos.json"), indh.to_string()).unwrap();
    fs::write(dir.join("datos/ejatlas_chile_filtrado.json"), ejatlas.to_string()).unwrap();
    fs::write(dir.join("datos/ocmal_chile.json"), ocmal.to_string()).unwrap();
}

struct Inputs {
    indh: Vec<SourceRecord>,
    ejatlas: Vec<SourceRecord>,
    ocmal: Vec<SourceRecord>,
}

fn load_inputs(dir: &Path) -> Inputs {
    let found = scan_data_dir(dir, MAX_SCAN_DEPTH);
    let load = |s: SourceName| load_snapshot(s, found.get(s).expect("snapshot discovered")).unwrap();
    Inputs {
        indh: load(SourceName::Indh),
        ejatlas: load(SourceName::EjAtlas),
        ocmal: load(SourceName::Ocmal),
    }
}

fn consolidate(inputs: &Inputs) -> Vec<MasterRecord> {
    let taxonomy = TaxonomyConfig::default();
    let classifier = Classifier::new(&taxonomy).unwrap();
    Consolidator::new(&classifier, &taxonomy.fallback, ConsolidateConfig::default()).consolidate(
        &inputs.indh,
        &inputs.ejatlas,
        &inputs.ocmal,
    )
}

fn fixture() -> (tempfile::TempDir, Inputs, Vec<MasterRecord>) {
    let dir = tempfile::tempdir().unwrap();
    write_snapshots(dir.path());
    let inputs = load_inputs(dir.path());
    let masters = consolidate(&inputs);
    (dir, inputs, masters)
}

fn find<'a>(masters: &'a [MasterRecord], title: &str) -> &'a MasterRecord {
    masters
        .iter()
        .find(|m| m.fields.title == title)
        .unwrap_or_else(|| panic!("no master titled {title}"))
}

// ── Properties ───────────────────────────────────────────────────────

#[test]
fn master_ids_are_unique_and_sequential() {
    let (_dir, _, masters) = fixture();
    let ids: HashSet<&str> = masters.iter().map(|m| m.master_id.as_str()).collect();
    assert_eq!(ids.len(), masters.len());
    for (i, m) in masters.iter().enumerate() {
        assert_eq!(m.master_id, format!("CONF-{:04}", i + 1));
    }
}

#[test]
fn every_source_record_lands_in_exactly_one_master() {
    let (_dir, inputs, masters) = fixture();
    assert_eq!(inputs.ejatlas.len(), 3, "non-object entry skipped");

    for (source, records) in [
        (SourceName::Indh, &inputs.indh),
        (SourceName::EjAtlas, &inputs.ejatlas),
        (SourceName::Ocmal, &inputs.ocmal),
    ] {
        for r in records.iter() {
            let holders = masters
                .iter()
                .filter(|m| m.source_ref(source).is_some_and(|s| s.source_id == r.source_id))
                .count();
            assert_eq!(holders, 1, "{} {}", source.label(), r.source_id);
        }
    }
}

#[test]
fn highest_priority_source_is_primary() {
    let (_dir, _, masters) = fixture();
    for m in &masters {
        let expected = SOURCE_PRIORITY
            .into_iter()
            .find(|s| m.is_present_in(*s))
            .unwrap();
        assert_eq!(m.primary_source, expected, "{}", m.master_id);
    }
}

#[test]
fn pascua_lama_merges_across_all_catalogs() {
    let (_dir, inputs, masters) = fixture();
    let m = find(&masters, "Proyecto Minero Pascua Lama");
    assert_eq!(m.primary_source, SourceName::Indh);
    assert_eq!(m.source_count(), 3);

    // Canonical fields come from the INDH record, not the OCMAL duplicate
    // which carries its own region, locality and year.
    assert_eq!(m.fields, CanonicalFields::from_record(&inputs.indh[0]));
    assert_ne!(m.fields, CanonicalFields::from_record(&inputs.ocmal[0]));

    let row = output::to_row(m);
    assert!(row.ejatlas.en_ejatlas);
    assert_eq!(row.ejatlas.nombre_ejatlas.as_deref(), Some("Pascua Lama gold mine"));
    assert_eq!(row.ejatlas.url_ejatlas.as_deref(), Some("https://ejatlas.org/conflict/pascua-lama"));
    assert_eq!(row.ocmal.id_ocmal.as_deref(), Some("o1"));
    assert_eq!(row.region, "Atacama");
    assert_eq!(row.localidad, "Alto del Carmen");
    assert_eq!(row.anio_inicio, Some(2001));
}

#[test]
fn secondary_catalogs_merge_without_primary() {
    let (_dir, _, masters) = fixture();
    let m = find(&masters, "Caserones copper mine Tierra Amarilla");
    assert_eq!(m.primary_source, SourceName::EjAtlas);
    assert_eq!(m.source_ref(SourceName::Ocmal).unwrap().source_id, "o2");
}

#[test]
fn minera_x_gets_mining_defaults() {
    let (_dir, _, masters) = fixture();
    let row = output::to_row(find(&masters, "Minera X"));
    assert_eq!(row.fuente_principal, "OCMAL");
    assert_eq!(row.impactos, vec!["agua", "suelo"]);
    assert!(row.impactos_inferido);
    assert_eq!(row.actores, vec!["urbano"]);
    assert!(row.actores_inferido);
    assert_eq!(row.anio_inicio, Some(2015));

    let colla = output::to_row(find(&masters, "Comunidad Colla contra minera"));
    assert_eq!(colla.actores, vec!["indigena"]);
}

#[test]
fn indh_records_are_never_inferred() {
    let (_dir, _, masters) = fixture();
    let m = find(&masters, "Relleno sanitario Santa Marta");
    let row = output::to_row(m);
    assert_eq!(row.impactos, vec!["suelo"]);
    assert!(row.actores.is_empty());
    assert!(!row.actores_inferido);
}

#[test]
fn extracted_tags_suppress_inference() {
    let (_dir, _, masters) = fixture();
    let row = output::to_row(find(&masters, "Relaves Minera Candelaria"));
    assert_eq!(row.fuente_principal, "OCMAL");
    // The classifier found "relave"; the mining default must not add agua
    assert_eq!(row.impactos, vec!["suelo"]);
    assert!(!row.impactos_inferido);
    // Actors had no text hit, so only that taxonomy is inferred
    assert_eq!(row.actores, vec!["urbano"]);
    assert!(row.actores_inferido);
}

#[test]
fn base_dataset_only_differs_by_inferred_lists() {
    let (_dir, _, masters) = fixture();
    for m in &masters {
        let complete = output::to_row(m);
        let base = output::to_row(&m.without_inference());

        for (c, b, inferred) in [
            (&complete.impactos, &base.impactos, complete.impactos_inferido),
            (&complete.actores, &base.actores, complete.actores_inferido),
            (&complete.resistencias, &base.resistencias, complete.resistencias_inferido),
            (&complete.resultados, &base.resultados, complete.resultados_inferido),
        ] {
            if inferred {
                assert!(b.is_empty());
            } else {
                assert_eq!(c, b);
            }
        }
        assert!(!base.impactos_inferido && !base.actores_inferido);
        assert_eq!(complete.id_maestro, base.id_maestro);
        assert_eq!(complete.nombre, base.nombre);
    }
}

#[test]
fn repeated_runs_write_identical_files() {
    let (dir, inputs, first) = fixture();
    let second = consolidate(&inputs);
    assert_eq!(first, second);

    let out_a = dir.path().join("out_a");
    let out_b = dir.path().join("out_b");
    for (out, masters) in [(&out_a, &first), (&out_b, &second)] {
        let rows = output::to_rows(masters);
        output::write_dataset(out, COMPLETE_STEM, &rows).unwrap();
        let base: Vec<MasterRecord> = masters.iter().map(MasterRecord::without_inference).collect();
        output::write_dataset(out, BASE_STEM, &output::to_rows(&base)).unwrap();
    }

    for name in [
        "conflictos_consolidados_completo.json",
        "conflictos_consolidados_completo.csv",
        "conflictos_consolidados_ids.json",
        "conflictos_consolidados_ids.csv",
    ] {
        let a = fs::read(out_a.join(name)).unwrap();
        let b = fs::read(out_b.join(name)).unwrap();
        assert_eq!(a, b, "{name}");
    }

    let rows: Vec<MasterRow> =
        serde_json::from_slice(&fs::read(out_a.join("conflictos_consolidados_completo.json")).unwrap()).unwrap();
    assert_eq!(rows.len(), first.len());
}
