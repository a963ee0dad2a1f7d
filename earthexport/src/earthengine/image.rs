//! Typed builders over [`Expression`] for collections, images and regions.

use super::expr::Expression;
use crate::geometry::BoundingBox;
use serde_json::json;

/// A rectangular region of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Region(Expression);

impl Region {
    /// Builds a rectangle from the south-west and north-east corners of `bbox`.
    pub fn rectangle(bbox: &BoundingBox) -> Self {
        Self(Expression::invoke(
            "GeometryConstructors.Rectangle",
            [("coordinates", Expression::constant(json!(bbox.corners())))],
        ))
    }

    pub fn expression(&self) -> &Expression {
        &self.0
    }
}

/// A remote image collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection(Expression);

impl ImageCollection {
    /// Loads a collection by id.
    pub fn load(id: &str) -> Self {
        Self(Expression::invoke(
            "ImageCollection.load",
            [("id", Expression::constant(id))],
        ))
    }

    fn filter(self, filter: Expression) -> Self {
        Self(Expression::invoke(
            "Collection.filter",
            [("collection", self.0), ("filter", filter)],
        ))
    }

    /// Keeps images acquired in `[start, end)`.
    pub fn filter_date(self, start: &str, end: &str) -> Self {
        let range = Expression::invoke(
            "DateRange",
            [
                ("start", Expression::constant(start)),
                ("end", Expression::constant(end)),
            ],
        );
        self.filter(Expression::invoke(
            "Filter.dateRangeContains",
            [
                ("leftValue", range),
                ("rightField", Expression::constant("system:time_start")),
            ],
        ))
    }

    /// Keeps images whose footprint intersects `region`.
    pub fn filter_bounds(self, region: &Region) -> Self {
        self.filter(Expression::invoke(
            "Filter.intersects",
            [
                ("leftField", Expression::constant(".all")),
                ("rightValue", region.0.clone()),
            ],
        ))
    }

    /// Keeps images whose metadata `property` is at most `value`.
    pub fn filter_lte(self, property: &str, value: f64) -> Self {
        self.filter(Expression::invoke(
            "Filter.lessThanOrEquals",
            [
                ("leftField", Expression::constant(property)),
                ("rightValue", Expression::constant(value)),
            ],
        ))
    }

    /// Reduces the collection to a per-pixel median composite.
    pub fn median(self) -> Image {
        Image(Expression::invoke("reduce.median", [("collection", self.0)]))
    }

    pub fn expression(&self) -> &Expression {
        &self.0
    }
}

/// A remote image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image(Expression);

impl Image {
    /// Clips the image to `region`.
    pub fn clip(self, region: &Region) -> Self {
        Self(Expression::invoke(
            "Image.clip",
            [("input", self.0), ("geometry", region.0.clone())],
        ))
    }

    /// Keeps only the named bands, in order.
    pub fn select(&self, bands: &[&str]) -> Self {
        Self(Expression::invoke(
            "Image.select",
            [
                ("input", self.0.clone()),
                ("bandSelectors", Expression::constant(json!(bands))),
            ],
        ))
    }

    /// Expression evaluating to the list of band names.
    pub fn band_names(&self) -> Expression {
        Expression::invoke("Image.bandNames", [("image", self.0.clone())])
    }

    /// Renders an 8-bit RGB visualization with a linear stretch.
    pub fn visualize(&self, bands: &[&str], min: f64, max: f64) -> Self {
        Self(Expression::invoke(
            "Image.visualize",
            [
                ("image", self.0.clone()),
                ("bands", Expression::constant(json!(bands))),
                ("min", Expression::constant(min)),
                ("max", Expression::constant(max)),
            ],
        ))
    }

    /// Converts a 3-band RGB image to hue, saturation and value.
    pub fn rgb_to_hsv(self) -> Self {
        Self(Expression::invoke("Image.rgbToHsv", [("image", self.0)]))
    }

    /// Converts a 3-band HSV image back to RGB.
    pub fn hsv_to_rgb(self) -> Self {
        Self(Expression::invoke("Image.hsvToRgb", [("image", self.0)]))
    }

    /// Appends the bands of `other` after the bands of this image.
    pub fn add_bands(self, other: Image) -> Self {
        Self(Expression::invoke(
            "Image.addBands",
            [("dstImg", self.0), ("srcImg", other.0)],
        ))
    }

    /// Reprojects the image to `crs`.
    pub fn reproject(self, crs: &str) -> Self {
        let projection = Expression::invoke("Projection", [("crs", Expression::constant(crs))]);
        Self(Expression::invoke(
            "Image.reproject",
            [("image", self.0), ("crs", projection)],
        ))
    }

    /// Clips to `region` and resamples to exactly `width` x `height` pixels.
    pub fn clip_to_bounds_and_scale(self, region: &Region, width: u32, height: u32) -> Self {
        Self(Expression::invoke(
            "Image.clipToBoundsAndScale",
            [
                ("input", self.0),
                ("geometry", region.0.clone()),
                ("width", Expression::constant(width)),
                ("height", Expression::constant(height)),
            ],
        ))
    }

    pub fn expression(&self) -> &Expression {
        &self.0
    }
}
