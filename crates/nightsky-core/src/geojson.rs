//! GeoJSON point collections for map layers.

use serde::Serialize;

use crate::api::{LightDataRecord, SightingRecord};

/// Bounding box the sightings layer draws (Taiwan and outlying islands).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

pub const TAIWAN_BOUNDS: Bounds = Bounds {
    min_lat: 21.8,
    max_lat: 26.5,
    min_lng: 118.0,
    max_lng: 122.2,
};

impl Bounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    fn new(lng: f64, lat: f64) -> Self {
        Self {
            kind: "Point",
            coordinates: [lng, lat],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: P,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature<P>>,
    /// Input records left out of `features`.
    #[serde(skip)]
    pub skipped: usize,
}

impl<P> FeatureCollection<P> {
    fn from_features(features: Vec<Feature<P>>, input_len: usize) -> Self {
        Self {
            kind: "FeatureCollection",
            skipped: input_len - features.len(),
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightProperties {
    pub brightness: f64,
    pub timestamp: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SightingProperties {
    pub id: i64,
    pub scientific_name: String,
    pub common_name_c: String,
    pub bio_group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    pub county: String,
    pub municipality: String,
}

fn valid_light_point(r: &LightDataRecord) -> bool {
    r.longitude.is_finite()
        && r.latitude.is_finite()
        && (-180.0..=180.0).contains(&r.longitude)
        && (-90.0..=90.0).contains(&r.latitude)
        && r.brightness.is_finite()
}

/// Heatmap points for brightness samples. Invalid samples are skipped.
pub fn light_feature_collection(records: &[LightDataRecord]) -> FeatureCollection<LightProperties> {
    let features: Vec<_> = records
        .iter()
        .filter(|r| valid_light_point(r))
        .map(|r| Feature {
            kind: "Feature",
            geometry: PointGeometry::new(r.longitude, r.latitude),
            properties: LightProperties {
                brightness: r.brightness,
                timestamp: crate::params::iso_string(&r.time),
                lat: r.latitude,
                lng: r.longitude,
            },
        })
        .collect();
    let fc = FeatureCollection::from_features(features, records.len());
    if fc.skipped > 0 {
        tracing::warn!(skipped = fc.skipped, "skipped invalid light data points");
    }
    tracing::debug!(features = fc.features.len(), "converted light data to GeoJSON");
    fc
}

/// Min and max brightness over valid samples.
pub fn brightness_range(records: &[LightDataRecord]) -> Option<(f64, f64)> {
    records
        .iter()
        .filter(|r| valid_light_point(r))
        .map(|r| r.brightness)
        .fold(None, |acc, b| match acc {
            None => Some((b, b)),
            Some((lo, hi)) => Some((lo.min(b), hi.max(b))),
        })
}

/// Map points for sightings inside `TAIWAN_BOUNDS`.
pub fn sighting_feature_collection(
    records: &[SightingRecord],
) -> FeatureCollection<SightingProperties> {
    let features: Vec<_> = records
        .iter()
        .filter_map(|r| {
            let lat = r.standard_latitude?;
            let lng = r.standard_longitude?;
            if !TAIWAN_BOUNDS.contains(lat, lng) {
                return None;
            }
            Some(Feature {
                kind: "Feature",
                geometry: PointGeometry::new(lng, lat),
                properties: SightingProperties {
                    id: r.id,
                    scientific_name: r
                        .scientific_name
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    common_name_c: r.common_name_c.clone().unwrap_or_else(|| "未知".to_string()),
                    bio_group: r
                        .bio_group
                        .as_deref()
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .unwrap_or("未知")
                        .to_string(),
                    event_date: r.event_date.clone(),
                    county: r.county.clone().unwrap_or_else(|| "未知".to_string()),
                    municipality: r.municipality.clone().unwrap_or_default(),
                },
            })
        })
        .collect();
    tracing::debug!(features = features.len(), "generated sighting points");
    FeatureCollection::from_features(features, records.len())
}
