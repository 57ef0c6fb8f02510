use serde::{Deserialize, Serialize};

// ── Which catalog a record comes from ──────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceName {
    /// INDH – national human-rights conflict registry
    Indh,
    /// EJAtlas – global environmental-justice atlas
    EjAtlas,
    /// OCMAL – mining-conflict observatory
    Ocmal,
}

/// Emission priority: earlier sources win primacy over later ones.
pub const SOURCE_PRIORITY: [SourceName; 3] = [SourceName::Indh, SourceName::EjAtlas, SourceName::Ocmal];

impl SourceName {
    /// Label used in `fuente_principal`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Indh => "INDH",
            Self::EjAtlas => "EJAtlas",
            Self::Ocmal => "OCMAL",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "indh" => Some(Self::Indh),
            "ejatlas" => Some(Self::EjAtlas),
            "ocmal" => Some(Self::Ocmal),
            _ => None,
        }
    }

    /// Language of the catalog's free text.
    pub fn language(&self) -> Language {
        match self {
            Self::EjAtlas => Language::English,
            Self::Indh | Self::Ocmal => Language::Spanish,
        }
    }

    /// Position in [`SOURCE_PRIORITY`].
    pub fn rank(&self) -> usize {
        match self {
            Self::Indh => 0,
            Self::EjAtlas => 1,
            Self::Ocmal => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Spanish,
    English,
}

// ── A single catalog entry ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One conflict as published by one catalog, already mapped to the common
/// shape. Never mutated once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source_id: String,
    pub source_name: SourceName,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub indigenous_territory: Option<bool>,
    #[serde(default)]
    pub external_url: String,
}

impl SourceRecord {
    /// Bare record with only identity and title set.
    pub fn new(source_name: SourceName, source_id: impl Into<String>, title: impl Into<String>) -> Self {
        SourceRecord {
            source_id: source_id.into(),
            source_name,
            title: title.into(),
            description: None,
            region: String::new(),
            locality: String::new(),
            sector: String::new(),
            status: String::new(),
            start_year: None,
            coordinates: None,
            indigenous_territory: None,
            external_url: String::new(),
        }
    }

    /// Text the classifier reads: description followed by title.
    pub fn descriptive_text(&self) -> String {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => format!("{d} {}", self.title),
            _ => self.title.clone(),
        }
    }
}

// ── Taxonomies and their tags ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    Impact,
    Actor,
    Resistance,
    Outcome,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 4] = [Self::Impact, Self::Actor, Self::Resistance, Self::Outcome];
}

/// Fixed tag vocabulary. Serialized with the dataset's Spanish labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    // impact
    #[serde(rename = "agua")]
    Water,
    #[serde(rename = "aire")]
    Air,
    #[serde(rename = "suelo")]
    Soil,
    #[serde(rename = "salud")]
    Health,
    #[serde(rename = "biodiversidad")]
    Biodiversity,
    // actor
    #[serde(rename = "indigena")]
    Indigenous,
    #[serde(rename = "pescador")]
    Fisher,
    #[serde(rename = "agricultor")]
    Farmer,
    #[serde(rename = "urbano")]
    Urban,
    // resistance
    #[serde(rename = "judicial")]
    Judicial,
    #[serde(rename = "movilizacion")]
    Mobilization,
    #[serde(rename = "mediatica")]
    Media,
    #[serde(rename = "institucional")]
    Institutional,
    // outcome
    #[serde(rename = "paralizado")]
    Halted,
    #[serde(rename = "aprobado")]
    Approved,
    #[serde(rename = "en_litigio")]
    InLitigation,
}

impl Tag {
    pub fn taxonomy(&self) -> Taxonomy {
        match self {
            Self::Water | Self::Air | Self::Soil | Self::Health | Self::Biodiversity => Taxonomy::Impact,
            Self::Indigenous | Self::Fisher | Self::Farmer | Self::Urban => Taxonomy::Actor,
            Self::Judicial | Self::Mobilization | Self::Media | Self::Institutional => {
                Taxonomy::Resistance
            }
            Self::Halted | Self::Approved | Self::InLitigation => Taxonomy::Outcome,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Water => "agua",
            Self::Air => "aire",
            Self::Soil => "suelo",
            Self::Health => "salud",
            Self::Biodiversity => "biodiversidad",
            Self::Indigenous => "indigena",
            Self::Fisher => "pescador",
            Self::Farmer => "agricultor",
            Self::Urban => "urbano",
            Self::Judicial => "judicial",
            Self::Mobilization => "movilizacion",
            Self::Media => "mediatica",
            Self::Institutional => "institucional",
            Self::Halted => "paralizado",
            Self::Approved => "aprobado",
            Self::InLitigation => "en_litigio",
        }
    }
}

// ── Categories attached to a master record ─────────────────────────────

/// Tags of one taxonomy plus where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList {
    pub tags: Vec<Tag>,
    /// `true` when the tags came from the inference fallback, not the text.
    pub inferred: bool,
}

impl TagList {
    pub fn extracted(tags: Vec<Tag>) -> Self {
        TagList { tags, inferred: false }
    }

    pub fn inferred(tags: Vec<Tag>) -> Self {
        TagList {
            inferred: !tags.is_empty(),
            tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.label().to_string()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categories {
    pub impacts: TagList,
    pub actors: TagList,
    pub resistances: TagList,
    pub outcomes: TagList,
}

impl Categories {
    pub fn get(&self, taxonomy: Taxonomy) -> &TagList {
        match taxonomy {
            Taxonomy::Impact => &self.impacts,
            Taxonomy::Actor => &self.actors,
            Taxonomy::Resistance => &self.resistances,
            Taxonomy::Outcome => &self.outcomes,
        }
    }

    pub fn get_mut(&mut self, taxonomy: Taxonomy) -> &mut TagList {
        match taxonomy {
            Taxonomy::Impact => &mut self.impacts,
            Taxonomy::Actor => &mut self.actors,
            Taxonomy::Resistance => &mut self.resistances,
            Taxonomy::Outcome => &mut self.outcomes,
        }
    }

    pub fn is_empty(&self) -> bool {
        Taxonomy::ALL.iter().all(|t| self.get(*t).is_empty())
    }
}

// ── Consolidated output ────────────────────────────────────────────────

/// Traceability link from a master record to one contributing catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source_id: String,
    pub title: String,
    pub url: String,
}

impl SourceRef {
    pub fn from_record(r: &SourceRecord) -> Self {
        SourceRef {
            source_id: r.source_id.clone(),
            title: r.title.clone(),
            url: r.external_url.clone(),
        }
    }
}

/// Canonical descriptive fields of a master record, copied verbatim from
/// the primary source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFields {
    pub title: String,
    pub description: String,
    pub region: String,
    pub locality: String,
    pub sector: String,
    pub status: String,
    pub start_year: Option<i32>,
    pub coordinates: Option<Coordinates>,
    pub indigenous_territory: Option<bool>,
}

impl CanonicalFields {
    pub fn from_record(r: &SourceRecord) -> Self {
        CanonicalFields {
            title: r.title.clone(),
            description: r.description.clone().unwrap_or_default(),
            region: r.region.clone(),
            locality: r.locality.clone(),
            sector: r.sector.clone(),
            status: r.status.clone(),
            start_year: r.start_year,
            coordinates: r.coordinates,
            indigenous_territory: r.indigenous_territory,
        }
    }
}

/// One canonical conflict aggregating one to three catalog entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub master_id: String,
    pub primary_source: SourceName,
    pub fields: CanonicalFields,
    /// Indexed by [`SourceName::rank`]; the primary slot is always filled.
    pub refs: [Option<SourceRef>; 3],
    pub categories: Categories,
}

impl MasterRecord {
    pub fn source_ref(&self, source: SourceName) -> Option<&SourceRef> {
        self.refs[source.rank()].as_ref()
    }

    pub fn is_present_in(&self, source: SourceName) -> bool {
        self.refs[source.rank()].is_some()
    }

    /// Number of catalogs this conflict appears in.
    pub fn source_count(&self) -> usize {
        self.refs.iter().filter(|r| r.is_some()).count()
    }

    /// The classifier-only view: inferred taxonomies are emptied.
    pub fn without_inference(&self) -> Self {
        let mut out = self.clone();
        for taxonomy in Taxonomy::ALL {
            let list = out.categories.get_mut(taxonomy);
            if list.inferred {
                *list = TagList::default();
            }
        }
        out
    }
}
