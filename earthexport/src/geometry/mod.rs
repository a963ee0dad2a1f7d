//! Bounding-box geometry.
//!
//! Converts a center point, an output size in pixels and a dataset
//! resolution into a lat/lon rectangle suitable for an export region.

mod types;


pub use types::{canonical_decimal, BoundingBox, Coordinate, CoordinateKey, EARTH_RADIUS_METERS};

/// Angular half-width in degrees covered by `size` pixels at `resolution` m/px.
///
/// Small-angle approximation: `degrees(0.5 * size * resolution / R)`.
#[inline]
pub fn half_angle_degrees(size: u32, resolution: f64) -> f64 {
    (0.5 * (size as f64 * resolution) / EARTH_RADIUS_METERS).to_degrees()
}

/// Computes the square bounding box centered on (`lat`, `lon`).
///
/// The same angular offset is applied to latitude and longitude. No
/// correction is made for longitude compression away from the equator.
///
/// # Arguments
///
/// * `lat` - Latitude of the center in degrees
/// * `lon` - Longitude of the center in degrees
/// * `size` - Image size in pixels
/// * `resolution` - Dataset resolution in meters per pixel
#[inline]
pub fn bounding_box(lat: f64, lon: f64, size: u32, resolution: f64) -> BoundingBox {
    let offset = half_angle_degrees(size, resolution);

    BoundingBox {
        x_min: lon - offset,
        x_max: lon + offset,
        y_min: lat - offset,
        y_max: lat + offset,
    }
}
