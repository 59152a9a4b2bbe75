//! Wire types of the data API (`/light-data`, `/tbia-data`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One brightness sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDataRecord {
    pub time: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub brightness: f64,
}

/// Taxonomic group used by the biodiversity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BioGroup {
    #[serde(rename = "鳥類")]
    Birds,
    #[serde(rename = "兩棲類")]
    Amphibians,
    #[serde(rename = "哺乳類")]
    Mammals,
    #[serde(rename = "爬蟲類")]
    Reptiles,
    #[serde(rename = "魚類")]
    Fish,
    #[serde(rename = "昆蟲")]
    Insects,
    #[serde(rename = "蜘蛛")]
    Spiders,
}

impl BioGroup {
    pub const ALL: [BioGroup; 7] = [
        BioGroup::Birds,
        BioGroup::Amphibians,
        BioGroup::Mammals,
        BioGroup::Reptiles,
        BioGroup::Fish,
        BioGroup::Insects,
        BioGroup::Spiders,
    ];

    /// Label as stored in the database and sent on the wire.
    pub fn label(self) -> &'static str {
        match self {
            BioGroup::Birds => "鳥類",
            BioGroup::Amphibians => "兩棲類",
            BioGroup::Mammals => "哺乳類",
            BioGroup::Reptiles => "爬蟲類",
            BioGroup::Fish => "魚類",
            BioGroup::Insects => "昆蟲",
            BioGroup::Spiders => "蜘蛛",
        }
    }

    pub fn from_label(label: &str) -> Option<BioGroup> {
        Self::ALL.into_iter().find(|g| g.label() == label.trim())
    }
}

/// One animal observation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SightingRecord {
    pub id: i64,
    pub source_scientific_name: Option<String>,
    pub scientific_name: Option<String>,
    pub common_name_c: Option<String>,
    /// Free-text group label; may be empty or outside `BioGroup`.
    pub bio_group: Option<String>,
    pub event_date: Option<String>,
    pub created: Option<String>,
    pub dataset_name: Option<String>,
    pub basis_of_record: Option<String>,
    pub standard_latitude: Option<f64>,
    pub standard_longitude: Option<f64>,
    pub county: Option<String>,
    pub municipality: Option<String>,
    pub locality: Option<String>,
    pub organism_quantity: Option<String>,
    pub taxon_id: Option<String>,
    pub catalog_number: Option<String>,
    pub record_number: Option<String>,
}

impl SightingRecord {
    /// The label as a known group, if it is one.
    pub fn group(&self) -> Option<BioGroup> {
        self.bio_group.as_deref().and_then(BioGroup::from_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Body of a successful paged response. Unknown fields (e.g. `filters`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PagedResponse<R> {
    #[serde(default = "Vec::new")]
    pub data: Vec<R>,
    pub pagination: PaginationInfo,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

/// Body of an error response (HTTP 400/500).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
