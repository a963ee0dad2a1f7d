//! Dataset registry.
//!
//! Static description of every supported imagery collection: the remote
//! collection id, native resolution, display bands and stretch values. The
//! registry is built once at startup and never mutated.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when resolving a dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// Identifier does not name a supported dataset
    #[error("Unknown dataset '{0}' (expected one of: landsat, naip, sentinel)")]
    Unknown(String),
}

/// Supported imagery datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetId {
    /// Landsat 8 Collection 2 Tier 1 TOA reflectance
    Landsat,
    /// USDA National Agriculture Imagery Program
    Naip,
    /// Sentinel-2 surface reflectance (harmonized)
    Sentinel,
}

impl DatasetId {
    /// All supported datasets, in registry order.
    pub const ALL: [DatasetId; 3] = [DatasetId::Landsat, DatasetId::Naip, DatasetId::Sentinel];

    /// Position of this dataset in the registry table.
    fn index(self) -> usize {
        match self {
            DatasetId::Landsat => 0,
            DatasetId::Naip => 1,
            DatasetId::Sentinel => 2,
        }
    }

    /// Identifier used on the command line and in output filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetId::Landsat => "landsat",
            DatasetId::Naip => "naip",
            DatasetId::Sentinel => "sentinel",
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetId {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "landsat" => Ok(DatasetId::Landsat),
            "naip" => Ok(DatasetId::Naip),
            "sentinel" => Ok(DatasetId::Sentinel),
            _ => Err(DatasetError::Unknown(s.to_string())),
        }
    }
}

/// Scene-level metadata filter applied before compositing.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudFilter {
    /// Metadata property holding the cloud percentage
    pub property: &'static str,
    /// Maximum accepted value (inclusive)
    pub max_percent: f64,
}

/// Immutable description of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetProfile {
    pub id: DatasetId,
    /// Remote image collection id
    pub collection: &'static str,
    /// Native resolution in meters per pixel
    pub resolution: f64,
    /// Red, green and blue band names
    pub rgb: [&'static str; 3],
    /// Near-infrared band name
    pub nir: &'static str,
    /// Panchromatic band, when the sensor has one
    pub panchromatic: Option<&'static str>,
    /// Lower bound of the display stretch
    pub min: f64,
    /// Upper bound of the display stretch
    pub max: f64,
    /// Optional cloud-cover filter
    pub cloud_filter: Option<CloudFilter>,
}

impl DatasetProfile {
    /// Returns true if every RGB band is present in `bands`.
    pub fn has_rgb(&self, bands: &[String]) -> bool {
        self.rgb.iter().all(|band| bands.iter().any(|b| b == band))
    }

    /// Returns the panchromatic band if the profile has one and it is present in `bands`.
    pub fn available_panchromatic(&self, bands: &[String]) -> Option<&'static str> {
        self.panchromatic
            .filter(|pan| bands.iter().any(|b| b == pan))
    }
}

/// Lookup table from dataset id to profile.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    profiles: [DatasetProfile; 3],
}

impl DatasetRegistry {
    /// Builds the registry of the three supported datasets.
    pub fn standard() -> Self {
        let profiles = [
            DatasetProfile {
                id: DatasetId::Landsat,
                collection: "LANDSAT/LC08/C02/T1_TOA",
                resolution: 30.0,
                rgb: ["B4", "B3", "B2"],
                nir: "B5",
                panchromatic: Some("B8"),
                min: 0.0,
                max: 0.4,
                cloud_filter: None,
            },
            DatasetProfile {
                id: DatasetId::Naip,
                collection: "USDA/NAIP/DOQQ",
                resolution: 0.6,
                rgb: ["R", "G", "B"],
                nir: "N",
                panchromatic: None,
                min: 0.0,
                max: 255.0,
                cloud_filter: None,
            },
            DatasetProfile {
                id: DatasetId::Sentinel,
                collection: "COPERNICUS/S2_SR_HARMONIZED",
                resolution: 10.0,
                rgb: ["B4", "B3", "B2"],
                nir: "B8",
                panchromatic: None,
                min: 0.0,
                max: 4500.0,
                cloud_filter: Some(CloudFilter {
                    property: "CLOUDY_PIXEL_PERCENTAGE",
                    max_percent: 10.0,
                }),
            },
        ];

        Self { profiles }
    }

    /// Returns the profile for `id`.
    pub fn get(&self, id: DatasetId) -> &DatasetProfile {
        &self.profiles[id.index()]
    }

    /// Resolves a textual identifier to its profile.
    pub fn lookup(&self, name: &str) -> Result<&DatasetProfile, DatasetError> {
        let id: DatasetId = name.parse()?;
        Ok(self.get(id))
    }

    /// Iterates over all profiles.
    pub fn iter(&self) -> impl Iterator<Item = &DatasetProfile> {
        self.profiles.iter()
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_dataset_ids() {
        assert_eq!("landsat".parse::<DatasetId>().unwrap(), DatasetId::Landsat);
        assert_eq!("NAIP".parse::<DatasetId>().unwrap(), DatasetId::Naip);
        assert_eq!(" sentinel ".parse::<DatasetId>().unwrap(), DatasetId::Sentinel);
    }

    #[test]
    fn test_unknown_dataset_is_error() {
        let err = "modis".parse::<DatasetId>().unwrap_err();
        assert_eq!(err, DatasetError::Unknown("modis".to_string()));
        assert!(err.to_string().contains("modis"));
    }

    #[test]
    fn test_registry_covers_every_dataset() {
        let registry = DatasetRegistry::standard();
        for id in DatasetId::ALL {
            assert_eq!(registry.get(id).id, id);
        }
        assert_eq!(registry.iter().count(), DatasetId::ALL.len());
    }

    #[test]
    fn test_landsat_profile() {
        let registry = DatasetRegistry::standard();
        let landsat = registry.get(DatasetId::Landsat);
        assert_eq!(landsat.collection, "LANDSAT/LC08/C02/T1_TOA");
        assert_eq!(landsat.resolution, 30.0);
        assert_eq!(landsat.rgb, ["B4", "B3", "B2"]);
        assert_eq!(landsat.panchromatic, Some("B8"));
        assert_eq!(landsat.max, 0.4);
        assert!(landsat.cloud_filter.is_none());
    }

    #[test]
    fn test_only_sentinel_filters_clouds() {
        let registry = DatasetRegistry::standard();
        let sentinel = registry.get(DatasetId::Sentinel);
        let filter = sentinel.cloud_filter.as_ref().unwrap();
        assert_eq!(filter.property, "CLOUDY_PIXEL_PERCENTAGE");
        assert_eq!(filter.max_percent, 10.0);
        assert!(registry.get(DatasetId::Naip).cloud_filter.is_none());
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = DatasetRegistry::standard();
        assert_eq!(registry.lookup("naip").unwrap().resolution, 0.6);
        assert!(registry.lookup("unknown").is_err());
    }

    #[test]
    fn test_has_rgb() {
        let registry = DatasetRegistry::standard();
        let landsat = registry.get(DatasetId::Landsat);
        assert!(landsat.has_rgb(&bands(&["B1", "B2", "B3", "B4", "B8"])));
        assert!(!landsat.has_rgb(&bands(&["B2", "B3"])));
        assert!(!landsat.has_rgb(&[]));
    }

    #[test]
    fn test_available_panchromatic() {
        let registry = DatasetRegistry::standard();
        let landsat = registry.get(DatasetId::Landsat);
        assert_eq!(
            landsat.available_panchromatic(&bands(&["B2", "B3", "B4", "B8"])),
            Some("B8")
        );
        assert_eq!(landsat.available_panchromatic(&bands(&["B2", "B3", "B4"])), None);

        let naip = registry.get(DatasetId::Naip);
        assert_eq!(naip.available_panchromatic(&bands(&["R", "G", "B", "N"])), None);
    }
}
