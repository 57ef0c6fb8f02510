//! Built-in categorization rules and the configuration object that carries
//! them.
//!
//! Every pattern here is matched against *normalized* text (see
//! [`crate::normalize::normalize`]): lower-case ASCII, no accents, no
//! punctuation. That is why "hídrico" is written `hidric` and "MP2.5" is
//! written `mp2 ?5`. Short acronyms and words that commonly occur inside
//! longer words carry `\b` anchors.
//!
//! The tables are read-only. [`TaxonomyConfig::default`] copies them into an
//! owned, serializable configuration which can be dumped, edited and loaded
//! back, then compiled once into a [`crate::classifier::Classifier`].

use serde::{Deserialize, Serialize};

use crate::types::{Language, Tag, Taxonomy};

/// Bumped whenever a built-in table changes.
pub const TAXONOMY_VERSION: &str = "2";

type RuleTable = &'static [(Tag, &'static [&'static str])];

// ── Spanish rule set (INDH, OCMAL) ───────────────────────────────────

pub static ES_IMPACT: RuleTable = &[
    (
        Tag::Water,
        &[
            r"\bagua", r"hidric[oa]", r"\brios?\b", r"acuifer", r"\bnapas?\b", r"sequia",
            r"contaminacion.*agua", r"vertimiento", r"\briles\b", r"descarga",
            r"escasez.*agua", r"derechos de agua", r"caudal",
        ],
    ),
    (
        Tag::Air,
        &[
            r"\baire\b", r"emision", r"material particulado", r"\bmp2 ?5\b", r"\bmp10\b",
            r"\bgases\b", r"\bhumo", r"\bolor", r"\bpolvo", r"atmosfer",
        ],
    ),
    (
        Tag::Soil,
        &[
            r"\bsuelos?\b", r"contaminacion.*tierra", r"relave", r"residuos solidos",
            r"vertedero", r"relleno sanitario", r"erosion",
        ],
    ),
    (
        Tag::Health,
        &[
            r"\bsalud\b", r"enfermedad", r"\bcancer", r"intoxicacion", r"mortalidad",
            r"respiratori", r"dermatologic", r"neurologic", r"hospital",
        ],
    ),
    (
        Tag::Biodiversity,
        &[
            r"biodiversidad", r"\bflora\b", r"\bfauna\b", r"especie", r"ecosistema",
            r"\bbosque", r"glaciar", r"humedal", r"area protegida", r"parque nacional",
        ],
    ),
];

pub static ES_ACTOR: RuleTable = &[
    (
        Tag::Indigenous,
        &[
            r"indigena", r"mapuche", r"aymara", r"atacamen", r"diaguita", r"quechua",
            r"\bcollas?\b", r"rapa ?nui", r"kawesqar", r"yagan", r"comunidad.*ancestral",
            r"territorio.*ancestral", r"convenio 169",
        ],
    ),
    (
        Tag::Fisher,
        &[
            r"pescador", r"pesca artesanal", r"\bcaletas?\b", r"sindicato.*pesca",
            r"marisca", r"borde costero",
        ],
    ),
    (
        Tag::Farmer,
        &[
            r"agricultor", r"campesin", r"pequeno.*agricult", r"\bapr\b",
            r"agua potable rural", r"\briego", r"\bcultivo", r"\bhuerto",
        ],
    ),
    (
        Tag::Urban,
        &[
            r"\bvecin[oa]", r"junta de vecinos", r"poblador", r"habitante", r"residente",
            r"\bbarrios?\b", r"\bpoblacion",
        ],
    ),
];

pub static ES_RESISTANCE: RuleTable = &[
    (
        Tag::Judicial,
        &[
            r"recurso de proteccion", r"recurso.*amparo", r"\bdemanda", r"querella",
            r"tribunal", r"corte.*apelaciones", r"corte.*suprema", r"litigio",
            r"accion.*legal", r"defensoria",
        ],
    ),
    (
        Tag::Mobilization,
        &[
            r"protesta", r"\bmarcha", r"manifestacion", r"bloqueo", r"\btomas?\b",
            r"movilizacion", r"asamblea.*ciudadana", r"\bparos?\b",
        ],
    ),
    (
        Tag::Media,
        &[
            r"denuncia.*publica", r"\bcampanas?\b", r"redes sociales", r"\bprensa\b",
            r"medios?.*comunicacion", r"declaracion.*publica",
        ],
    ),
    (
        Tag::Institutional,
        &[
            r"participacion ciudadana", r"observaciones.*ciudadana", r"consulta.*indigena",
            r"\bseia\b", r"evaluacion ambiental",
        ],
    ),
];

pub static ES_OUTCOME: RuleTable = &[
    (
        Tag::Halted,
        &[
            r"paraliz", r"suspend", r"detenid", r"cancelad", r"rechazad", r"desistimiento",
            r"abandon", r"\bno\b.*aprobad",
        ],
    ),
    (
        Tag::Approved,
        &[
            r"aprobad", r"autoriza", r"\brca\b.*favorable", r"calificacion.*favorable",
            r"permiso", r"operacion",
        ],
    ),
    (
        Tag::InLitigation,
        &[r"\ben\b.*tramitacion", r"pendiente", r"espera.*fallo", r"proceso.*judicial"],
    ),
];

// ── English rule set (EJAtlas) ───────────────────────────────────────

pub static EN_IMPACT: RuleTable = &[
    (
        Tag::Water,
        &[
            r"\bwater", r"\brivers?\b", r"aquifer", r"groundwater", r"drought", r"hydric",
            r"wastewater", r"effluent", r"discharge", r"water rights", r"watershed",
        ],
    ),
    (
        Tag::Air,
        &[
            r"\bair\b", r"emissions?\b", r"particulate", r"\bpm2 ?5\b", r"\bpm10\b",
            r"\bsmoke", r"\bodou?rs?\b", r"\bdust\b", r"\bgases\b", r"atmospher",
        ],
    ),
    (
        Tag::Soil,
        &[
            r"\bsoils?\b", r"land contamination", r"tailings", r"solid waste", r"landfill",
            r"dump site", r"erosion",
        ],
    ),
    (
        Tag::Health,
        &[
            r"\bhealth", r"disease", r"\bcancer", r"poisoning", r"mortality", r"respiratory",
            r"dermatolog", r"neurolog", r"hospital",
        ],
    ),
    (
        Tag::Biodiversity,
        &[
            r"biodiversity", r"\bflora\b", r"\bfauna\b", r"\bspecies\b", r"ecosystem",
            r"\bforests?\b", r"glacier", r"wetland", r"protected area", r"national park",
        ],
    ),
];

pub static EN_ACTOR: RuleTable = &[
    (
        Tag::Indigenous,
        &[
            r"indigenous", r"mapuche", r"aymara", r"atacamen", r"diaguita", r"quechua",
            r"\bcollas?\b", r"rapa ?nui", r"kawesqar", r"yagan", r"ancestral",
            r"ilo 169", r"convention 169",
        ],
    ),
    (
        Tag::Fisher,
        &[
            r"fisher", r"artisanal fishing", r"\bcaletas?\b", r"fishing cove",
            r"shellfish", r"coastal communit",
        ],
    ),
    (
        Tag::Farmer,
        &[
            r"farmer", r"peasant", r"campesin", r"smallholder", r"irrigation",
            r"\bcrops?\b", r"rural water", r"agricultur",
        ],
    ),
    (
        Tag::Urban,
        &[
            r"neighbou?r", r"residents?\b", r"inhabitant", r"dwellers?\b", r"\burban\b",
            r"\btownspeople\b",
        ],
    ),
];

pub static EN_RESISTANCE: RuleTable = &[
    (
        Tag::Judicial,
        &[
            r"lawsuit", r"\bcourts?\b", r"legal action", r"injunction", r"litigation",
            r"\bappeal", r"tribunal", r"\bombudsman",
        ],
    ),
    (
        Tag::Mobilization,
        &[
            r"protest", r"\bmarch(es)?\b", r"demonstration", r"blockade", r"occupation",
            r"\bstrikes?\b", r"mobili[sz]ation", r"\brall(y|ies)\b",
        ],
    ),
    (
        Tag::Media,
        &[
            r"public denunciation", r"campaign", r"social media", r"\bpress\b",
            r"\bmedia\b", r"public statement",
        ],
    ),
    (
        Tag::Institutional,
        &[
            r"citizen participation", r"public consultation", r"indigenous consultation",
            r"\bseia\b", r"environmental impact assessment", r"\beia\b",
        ],
    ),
];

pub static EN_OUTCOME: RuleTable = &[
    (
        Tag::Halted,
        &[
            r"halted", r"suspend", r"\bstopped\b", r"cancell?ed", r"rejected", r"withdrawn",
            r"abandon", r"not approved", r"paraly[sz]ed",
        ],
    ),
    (
        Tag::Approved,
        &[r"approved", r"authori[sz]ed", r"\bpermits?\b", r"in operation", r"operating"],
    ),
    (
        Tag::InLitigation,
        &[r"pending", r"under review", r"awaiting.*ruling", r"court proceedings", r"ongoing legal"],
    ),
];

// ── Fallback tables ──────────────────────────────────────────────────

/// Fragments of indigenous-group names searched in mining-conflict titles.
pub static INDIGENOUS_FRAGMENTS: &[&str] = &["mapuche", "aymara", "atacamen", "diaguita", "colla"];

/// Looser English keywords for atlas records the main rules left untagged.
/// Plain substring containment, no regex.
pub static ATLAS_KEYWORDS: &[(Tag, &[&str])] = &[
    (Tag::Water, &["water", "river", "aquifer", "hydro"]),
    (Tag::Air, &["air", "emission", "pollution"]),
    (Tag::Soil, &["soil", "waste", "tailings", "mining"]),
    (Tag::Health, &["health", "disease", "cancer"]),
    (Tag::Biodiversity, &["biodiversity", "species", "ecosystem", "forest"]),
    (Tag::Indigenous, &["indigenous", "mapuche", "native", "ancestral"]),
    (Tag::Fisher, &["fisher", "coastal", "artisanal"]),
    (Tag::Farmer, &["farmer", "rural", "peasant", "agricultural"]),
    (Tag::Urban, &["community", "resident", "neighbor", "local"]),
];

pub static MINING_KEYWORDS: &[&str] = &["mining", "mine"];

// ── Configuration ────────────────────────────────────────────────────

/// A tag and the patterns any one of which makes it fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: Tag,
    pub patterns: Vec<String>,
}

/// Ordered rules for one taxonomy in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub language: Language,
    pub taxonomy: Taxonomy,
    pub rules: Vec<TagRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub tag: Tag,
    pub keywords: Vec<String>,
}

/// Inputs of the inference fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRules {
    /// Impact assigned to mining-observatory records with no impact text.
    pub mining_impacts: Vec<Tag>,
    pub indigenous_fragments: Vec<String>,
    /// Actor for mining-observatory titles without an indigenous fragment.
    pub default_actor: Tag,
    pub atlas_keywords: Vec<KeywordRule>,
    pub mining_keywords: Vec<String>,
}

/// The full categorization configuration: classifier rule sets for every
/// (language, taxonomy) pair plus the fallback tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub version: String,
    pub rule_sets: Vec<RuleSet>,
    pub fallback: FallbackRules,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        let tables: [(Language, Taxonomy, RuleTable); 8] = [
            (Language::Spanish, Taxonomy::Impact, ES_IMPACT),
            (Language::Spanish, Taxonomy::Actor, ES_ACTOR),
            (Language::Spanish, Taxonomy::Resistance, ES_RESISTANCE),
            (Language::Spanish, Taxonomy::Outcome, ES_OUTCOME),
            (Language::English, Taxonomy::Impact, EN_IMPACT),
            (Language::English, Taxonomy::Actor, EN_ACTOR),
            (Language::English, Taxonomy::Resistance, EN_RESISTANCE),
            (Language::English, Taxonomy::Outcome, EN_OUTCOME),
        ];

        let rule_sets = tables
            .into_iter()
            .map(|(language, taxonomy, table)| RuleSet {
                language,
                taxonomy,
                rules: table
                    .iter()
                    .map(|(tag, patterns)| TagRule {
                        tag: *tag,
                        patterns: to_strings(patterns),
                    })
                    .collect(),
            })
            .collect();

        TaxonomyConfig {
            version: TAXONOMY_VERSION.to_string(),
            rule_sets,
            fallback: FallbackRules::default(),
        }
    }
}

impl Default for FallbackRules {
    fn default() -> Self {
        FallbackRules {
            mining_impacts: vec![Tag::Water, Tag::Soil],
            indigenous_fragments: to_strings(INDIGENOUS_FRAGMENTS),
            default_actor: Tag::Urban,
            atlas_keywords: ATLAS_KEYWORDS
                .iter()
                .map(|(tag, kws)| KeywordRule {
                    tag: *tag,
                    keywords: to_strings(kws),
                })
                .collect(),
            mining_keywords: to_strings(MINING_KEYWORDS),
        }
    }
}

fn to_strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}
