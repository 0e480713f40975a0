//! Static reference data loaded once at startup: the tracked-country list,
//! country boundaries, and centroids.

use std::collections::HashMap;
use std::path::Path;

use observatory_common::{Country, GeoPoint, ObservatoryError};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

pub const TRACKED_COUNTRIES_FILE: &str = "african-countries.json";
pub const BOUNDARIES_FILE: &str = "countries.geo.json";
pub const CENTROIDS_FILE: &str = "centroids.geo.json";

/// The countries the dashboard tracks. Order is the order of the source list.
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct TrackedCountry {
    iso_code: String,
    #[serde(alias = "country")]
    name: String,
}

impl CountryCatalog {
    pub fn new(countries: Vec<Country>) -> Self {
        let mut catalog = Self::default();
        for country in countries {
            if catalog.by_code.contains_key(&country.code) {
                continue;
            }
            catalog
                .by_code
                .insert(country.code.clone(), catalog.countries.len());
            catalog.countries.push(country);
        }
        catalog
    }

    /// Parse a JSON array of `{ "iso_code", "name" }` entries.
    pub fn from_json(json: &str) -> Result<Self, ObservatoryError> {
        let entries: Vec<TrackedCountry> = serde_json::from_str(json)
            .map_err(|e| ObservatoryError::ReferenceData(format!("tracked countries: {e}")))?;
        Ok(Self::new(
            entries
                .into_iter()
                .map(|c| Country::new(c.iso_code, c.name))
                .collect(),
        ))
    }

    pub fn is_tracked(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(code)
            .map(|&i| self.countries[i].name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Value,
}

impl Feature {
    fn property(&self, keys: &[&str]) -> Option<String> {
        let props = self.properties.as_ref()?;
        keys.iter()
            .find_map(|k| props.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    }

    fn code(&self, property_keys: &[&str]) -> Option<String> {
        match &self.id {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            _ => self.property(property_keys),
        }
    }
}

/// One country boundary. The geometry is passed through untouched for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub code: String,
    pub name: String,
    pub geometry: Value,
}

#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    features: Vec<BoundaryFeature>,
}

impl Boundaries {
    /// Parse a GeoJSON `FeatureCollection` whose feature ids are ISO-3 codes.
    pub fn from_geojson(json: &str) -> Result<Self, ObservatoryError> {
        let collection: FeatureCollection = serde_json::from_str(json)
            .map_err(|e| ObservatoryError::ReferenceData(format!("boundaries: {e}")))?;

        let features = collection
            .features
            .into_iter()
            .filter_map(|f| {
                let code = f.code(&["id", "ISO_A3", "iso_a3"])?;
                let name = f.property(&["name", "NAME"]).unwrap_or_else(|| code.clone());
                Some(BoundaryFeature {
                    code,
                    name,
                    geometry: f.geometry,
                })
            })
            .collect();

        Ok(Self { features })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryFeature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Label anchor per country code.
#[derive(Debug, Clone, Default)]
pub struct Centroids {
    points: HashMap<String, GeoPoint>,
}

impl Centroids {
    /// Parse a GeoJSON `FeatureCollection` of `Point` features
    /// (`coordinates` are `[lng, lat]`).
    pub fn from_geojson(json: &str) -> Result<Self, ObservatoryError> {
        let collection: FeatureCollection = serde_json::from_str(json)
            .map_err(|e| ObservatoryError::ReferenceData(format!("centroids: {e}")))?;

        let points = collection
            .features
            .iter()
            .filter_map(|f| {
                let code = f.code(&["ISO", "ISO3", "iso_a3"])?;
                let coords = f.geometry.get("coordinates")?.as_array()?;
                let lng = coords.first()?.as_f64()?;
                let lat = coords.get(1)?.as_f64()?;
                Some((code, GeoPoint { lat, lng }))
            })
            .collect();

        Ok(Self { points })
    }

    pub fn get(&self, code: &str) -> Option<GeoPoint> {
        self.points.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Everything read from the reference directory.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub catalog: CountryCatalog,
    pub boundaries: Boundaries,
    pub centroids: Centroids,
}

impl ReferenceData {
    pub fn new(catalog: CountryCatalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    /// The tracked-country list is required; boundaries and centroids are
    /// optional and default to empty when their files are absent.
    pub fn load(dir: &Path) -> Result<Self, ObservatoryError> {
        let catalog = CountryCatalog::from_json(&read(dir, TRACKED_COUNTRIES_FILE)?)?;
        let boundaries = match read_optional(dir, BOUNDARIES_FILE)? {
            Some(json) => Boundaries::from_geojson(&json)?,
            None => Boundaries::default(),
        };
        let centroids = match read_optional(dir, CENTROIDS_FILE)? {
            Some(json) => Centroids::from_geojson(&json)?,
            None => Centroids::default(),
        };

        info!(
            tracked = catalog.len(),
            boundaries = boundaries.len(),
            centroids = centroids.len(),
            dir = %dir.display(),
            "Loaded reference data"
        );

        Ok(Self {
            catalog,
            boundaries,
            centroids,
        })
    }
}

fn read(dir: &Path, file: &str) -> Result<String, ObservatoryError> {
    let path = dir.join(file);
    std::fs::read_to_string(&path)
        .map_err(|e| ObservatoryError::ReferenceData(format!("{}: {e}", path.display())))
}

fn read_optional(dir: &Path, file: &str) -> Result<Option<String>, ObservatoryError> {
    let path = dir.join(file);
    if !path.exists() {
        warn!(path = %path.display(), "Reference file not found, skipping");
        return Ok(None);
    }
    read(dir, file).map(Some)
}
