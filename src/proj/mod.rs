//! The projection contract and its shared state.
//!
//! Every projection is driven the same way: construct it from a Mapping
//! group (usually through [`factory`]), then call
//! [`set_ground`](Projection::set_ground) or
//! [`set_coordinate`](Projection::set_coordinate) and read the results from
//! the accessors. Both calls report success through their return value and
//! [`is_good`](Projection::is_good); a singular, out-of-domain, or
//! non-convergent input leaves the accessors holding the most recent values.
//!
//! Internally every projection works in radians with planetographic
//! latitudes and positive-east longitudes. [`ProjectionBase`] owns the
//! conversions between that representation and the caller's configured
//! conventions, the last-result state, and the running bounds used by
//! [`xy_range`](Projection::xy_range).

pub mod equirectangular;
pub mod factory;
pub mod lunar_azimuthal;
pub mod mercator;
pub mod point_perspective;
pub mod polar_stereographic;
pub mod robinson;
pub mod sinusoidal;
pub(crate) mod snyder;

use log::debug;

use crate::angle;
use crate::error::ProjError;
use crate::mapping::{LatitudeType, LongitudeDirection, LongitudeDomain, Mapping};

/// The configured latitude/longitude area of interest, degrees, in the
/// caller's conventions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundRange {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Axis-aligned bounding rectangle of the projected area of interest, in
/// the same linear units as the equatorial radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct XyRange {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// State and helpers shared by every projection.
#[derive(Clone, Debug)]
pub struct ProjectionBase {
    mapping: Mapping,
    equatorial_radius: f64,
    polar_radius: f64,
    eccentricity: f64,
    latitude_type: LatitudeType,
    longitude_direction: LongitudeDirection,
    longitude_domain: LongitudeDomain,
    ground_range: Option<GroundRange>,
    // Last-result state, caller conventions.
    latitude: f64,
    longitude: f64,
    x: f64,
    y: f64,
    good: bool,
    // Running bounds for xy_range.
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl ProjectionBase {
    /// Validate the common Mapping options and take ownership of the group.
    pub fn from_mapping(mapping: Mapping) -> Result<Self, ProjError> {
        let equatorial_radius = mapping.real("EquatorialRadius")?;
        if !equatorial_radius.is_finite() || equatorial_radius <= 0.0 {
            return Err(ProjError::InvalidRadius(format!(
                "value [{equatorial_radius}] for option [EquatorialRadius] \
                 must be greater than zero"
            )));
        }
        let polar_radius = mapping.real("PolarRadius")?;
        if !polar_radius.is_finite() || polar_radius <= 0.0 {
            return Err(ProjError::InvalidRadius(format!(
                "value [{polar_radius}] for option [PolarRadius] must be greater than zero"
            )));
        }
        if equatorial_radius < polar_radius {
            return Err(ProjError::InvalidRadius(format!(
                "[EquatorialRadius] = {equatorial_radius} must be greater than \
                 or equal to [PolarRadius] = {polar_radius}"
            )));
        }

        let latitude_type = LatitudeType::from_label(mapping.text("LatitudeType")?)?;
        let longitude_direction =
            LongitudeDirection::from_label(mapping.text("LongitudeDirection")?)?;
        let longitude_domain = LongitudeDomain::from_value(mapping.integer("LongitudeDomain")?)?;

        let ratio = polar_radius / equatorial_radius;
        let eccentricity = (1.0 - ratio * ratio).sqrt();

        let range_keys = [
            "MinimumLatitude",
            "MaximumLatitude",
            "MinimumLongitude",
            "MaximumLongitude",
        ];
        let ground_range = if range_keys.iter().all(|key| mapping.contains(key)) {
            let range = GroundRange {
                min_lat: mapping.real("MinimumLatitude")?,
                max_lat: mapping.real("MaximumLatitude")?,
                min_lon: mapping.real("MinimumLongitude")?,
                max_lon: mapping.real("MaximumLongitude")?,
            };
            for (key, lat) in [
                ("MinimumLatitude", range.min_lat),
                ("MaximumLatitude", range.max_lat),
            ] {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(ProjError::Configuration(format!(
                        "[{key}] of [{lat}] is outside the range of [-90:90]"
                    )));
                }
            }
            if range.min_lat >= range.max_lat {
                return Err(ProjError::Configuration(format!(
                    "[MinimumLatitude,MaximumLatitude] of \
                     [{},{}] are not properly ordered",
                    range.min_lat, range.max_lat
                )));
            }
            if range.min_lon >= range.max_lon {
                return Err(ProjError::Configuration(format!(
                    "[MinimumLongitude,MaximumLongitude] of \
                     [{},{}] are not properly ordered",
                    range.min_lon, range.max_lon
                )));
            }
            Some(range)
        } else {
            None
        };

        Ok(Self {
            mapping,
            equatorial_radius,
            polar_radius,
            eccentricity,
            latitude_type,
            longitude_direction,
            longitude_domain,
            ground_range,
            latitude: f64::NAN,
            longitude: f64::NAN,
            x: f64::NAN,
            y: f64::NAN,
            good: false,
            min_x: f64::MAX,
            max_x: f64::MIN,
            min_y: f64::MAX,
            max_y: f64::MIN,
        })
    }

    pub fn equatorial_radius(&self) -> f64 {
        self.equatorial_radius
    }

    pub fn polar_radius(&self) -> f64 {
        self.polar_radius
    }

    /// First eccentricity of the spheroid; 0 for spheres.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn latitude_type(&self) -> LatitudeType {
        self.latitude_type
    }

    pub fn longitude_direction(&self) -> LongitudeDirection {
        self.longitude_direction
    }

    pub fn longitude_domain(&self) -> LongitudeDomain {
        self.longitude_domain
    }

    pub fn has_ground_range(&self) -> bool {
        self.ground_range.is_some()
    }

    pub fn ground_range(&self) -> Option<&GroundRange> {
        self.ground_range.as_ref()
    }

    /// Spheroid radius at the given latitude (degrees).
    pub fn local_radius(&self, latitude: f64) -> Result<f64, ProjError> {
        angle::local_radius(latitude, self.equatorial_radius, self.polar_radius)
    }

    /// Latitude from the most recent set call, degrees, in the configured
    /// LatitudeType.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude from the most recent set call, degrees, in the configured
    /// LongitudeDirection and LongitudeDomain.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn x_coord(&self) -> f64 {
        self.x
    }

    pub fn y_coord(&self) -> f64 {
        self.y
    }

    pub fn is_good(&self) -> bool {
        self.good
    }

    /// The owned Mapping group, including any options written back by the
    /// constructor (defaulted centers, computed radii).
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub(crate) fn mapping_mut(&mut self) -> &mut Mapping {
        &mut self.mapping
    }

    /// True when the latitude lies inside the configured range. A range
    /// spanning the full 180 degrees accepts everything.
    pub fn in_latitude_range(&self, latitude: f64) -> bool {
        match self.ground_range {
            Some(range) => {
                range.max_lat - range.min_lat == 180.0
                    || (range.min_lat <= latitude && latitude <= range.max_lat)
            }
            None => false,
        }
    }

    /// True when the longitude lies inside the configured range, comparing
    /// in the 360 domain so ranges straddling the seam behave.
    pub fn in_longitude_range(&self, longitude: f64) -> bool {
        match self.ground_range {
            Some(range) => lon_in_range(range.min_lon, range.max_lon, longitude),
            None => false,
        }
    }

    // ---- internal representation ---------------------------------------

    /// Caller-convention ground point to internal (planetographic radians,
    /// positive-east radians). None for non-finite input or |lat| > 90.
    pub(crate) fn ground_to_internal(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 {
            return None;
        }
        Some((self.internal_latitude(lat), self.internal_longitude(lon)))
    }

    pub(crate) fn internal_latitude(&self, lat_deg: f64) -> f64 {
        let lat = match self.latitude_type {
            LatitudeType::Planetocentric => {
                angle::centric_to_graphic(lat_deg, self.equatorial_radius, self.polar_radius)
            }
            LatitudeType::Planetographic => lat_deg,
        };
        lat.to_radians()
    }

    pub(crate) fn internal_longitude(&self, lon_deg: f64) -> f64 {
        let lon = match self.longitude_direction {
            LongitudeDirection::PositiveWest => -lon_deg,
            LongitudeDirection::PositiveEast => lon_deg,
        };
        lon.to_radians()
    }

    /// Store an inverse result, normalizing from the internal representation
    /// into the caller's conventions, and mark the state good.
    pub(crate) fn internal_to_ground(&mut self, lat_rad: f64, lon_rad: f64) {
        let mut lon = lon_rad.to_degrees();
        if self.longitude_direction == LongitudeDirection::PositiveWest {
            lon = -lon;
        }
        lon = angle::to_360_domain(lon);
        if self.longitude_domain == LongitudeDomain::Domain180 {
            lon = angle::to_180_domain(lon);
        }

        // Inversions may overshoot the pole by rounding; pin before the
        // latitude-type conversion.
        let mut lat = lat_rad.to_degrees().clamp(-90.0, 90.0);
        if self.latitude_type == LatitudeType::Planetocentric {
            lat = angle::graphic_to_centric(lat, self.equatorial_radius, self.polar_radius);
        }

        self.latitude = lat;
        self.longitude = lon;
        self.good = true;
    }

    // ---- last-result state ---------------------------------------------

    pub(crate) fn store_ground(&mut self, lat: f64, lon: f64) {
        self.latitude = lat;
        self.longitude = lon;
    }

    pub(crate) fn set_computed_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.good = true;
    }

    pub(crate) fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn set_good(&mut self, good: bool) {
        self.good = good;
    }

    // ---- xy_range accumulation -----------------------------------------

    pub(crate) fn reset_xy_bounds(&mut self) {
        self.min_x = f64::MAX;
        self.max_x = f64::MIN;
        self.min_y = f64::MAX;
        self.max_y = f64::MIN;
    }

    pub(crate) fn extend_xy_bounds(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// The accumulated bounds, or None when degenerate.
    pub(crate) fn xy_bounds(&self) -> Option<XyRange> {
        if self.min_x < self.max_x && self.min_y < self.max_y {
            Some(XyRange {
                min_x: self.min_x,
                max_x: self.max_x,
                min_y: self.min_y,
                max_y: self.max_y,
            })
        } else {
            None
        }
    }

    // ---- defaulted parameters ------------------------------------------

    /// Read CenterLongitude, defaulting to the midpoint of the longitude
    /// range (and writing the default back) when permitted.
    pub(crate) fn center_longitude_degrees(
        &mut self,
        allow_defaults: bool,
    ) -> Result<f64, ProjError> {
        if allow_defaults && !self.mapping.contains("CenterLongitude") {
            let range = self
                .ground_range
                .ok_or_else(|| ProjError::MissingOption("CenterLongitude".to_string()))?;
            let lon = (range.min_lon + range.max_lon) / 2.0;
            debug!("defaulting CenterLongitude to {lon}");
            self.mapping.insert("CenterLongitude", lon);
        }
        let lon = self.mapping.real("CenterLongitude")?;
        if !(-360.0..=360.0).contains(&lon) {
            return Err(ProjError::Configuration(format!(
                "the center longitude cannot exceed [-360, 360], [{lon}] is not valid"
            )));
        }
        Ok(lon)
    }

    /// Read CenterLatitude, defaulting to the midpoint of the latitude range
    /// (and writing the default back) when permitted.
    pub(crate) fn center_latitude_degrees(
        &mut self,
        allow_defaults: bool,
    ) -> Result<f64, ProjError> {
        if allow_defaults && !self.mapping.contains("CenterLatitude") {
            let range = self
                .ground_range
                .ok_or_else(|| ProjError::MissingOption("CenterLatitude".to_string()))?;
            let lat = (range.min_lat + range.max_lat) / 2.0;
            debug!("defaulting CenterLatitude to {lat}");
            self.mapping.insert("CenterLatitude", lat);
        }
        let lat = self.mapping.real("CenterLatitude")?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProjError::Configuration(format!(
                "[CenterLatitude] of [{lat}] is outside the range of [-90:90]"
            )));
        }
        Ok(lat)
    }

    // ---- mapping echo --------------------------------------------------

    /// Copy one option from the owned Mapping into another group, if set.
    pub fn copy_option(&self, dst: &mut Mapping, name: &str) {
        if let Some(value) = self.mapping.get(name) {
            dst.insert(name, value.clone());
        }
    }

    /// The options every projection consumes, copied from the owned group.
    pub fn core_mapping(&self) -> Mapping {
        let mut out = Mapping::new();
        for key in [
            "ProjectionName",
            "EquatorialRadius",
            "PolarRadius",
            "LatitudeType",
            "LongitudeDirection",
            "LongitudeDomain",
            "MinimumLatitude",
            "MaximumLatitude",
            "MinimumLongitude",
            "MaximumLongitude",
            // Pass-through for rasterizer collaborators.
            "PixelResolution",
            "Scale",
            "UpperLeftCornerX",
            "UpperLeftCornerY",
        ] {
            self.copy_option(&mut out, key);
        }
        out
    }
}

/// Longitude membership test comparing in the 360 domain, tolerating ranges
/// that straddle the seam. A range covering a full revolution accepts
/// everything.
pub(crate) fn lon_in_range(min_lon: f64, max_lon: f64, longitude: f64) -> bool {
    if (max_lon - min_lon - 360.0).abs() < 1.0e-9 {
        return true;
    }
    let mut adjusted = angle::to_360_domain(longitude);
    let mut adjusted_min = angle::to_360_domain(min_lon);
    let adjusted_max = angle::to_360_domain(max_lon);
    if adjusted_min > adjusted_max {
        if adjusted > adjusted_min {
            adjusted -= 360.0;
        }
        adjusted_min -= 360.0;
    }
    adjusted_min <= adjusted && adjusted <= adjusted_max
}

/// A map projection: forward (`set_ground`) and inverse (`set_coordinate`)
/// transforms plus the bounding-box query, all reporting through the
/// last-result accessors.
pub trait Projection {
    fn base(&self) -> &ProjectionBase;

    fn base_mut(&mut self) -> &mut ProjectionBase;

    /// The registered projection name, e.g. "Sinusoidal".
    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str {
        "1.0"
    }

    /// Forward transform. `lat` and `lon` are degrees in the configured
    /// conventions. Returns the new validity state.
    fn set_ground(&mut self, lat: f64, lon: f64) -> bool;

    /// Inverse transform. `x` and `y` are in the units of the equatorial
    /// radius. Returns the new validity state.
    fn set_coordinate(&mut self, x: f64, y: f64) -> bool;

    /// Bounding box in map units covering the configured ground range.
    /// None when the range is missing or the result is degenerate.
    ///
    /// The default probes the four corners of the lat/lon rectangle, which
    /// suffices for projections monotone in both axes over the interior.
    fn xy_range(&mut self) -> Option<XyRange> {
        let range = *self.base().ground_range()?;
        self.base_mut().reset_xy_bounds();
        self.probe_ground_corners(&range);
        self.base().xy_bounds()
    }

    /// Latitude at which the projection preserves scale exactly.
    fn true_scale_latitude(&self) -> f64 {
        0.0
    }

    /// True for cylindrical projections centered on the equator, whose
    /// output repeats every 360 degrees of longitude.
    fn is_equatorial_cylindrical(&self) -> bool {
        false
    }

    /// The subset of the Mapping group this projection consumes, with
    /// effective (possibly defaulted or computed) values.
    fn mapping(&self) -> Mapping {
        self.base().core_mapping()
    }

    /// The latitude options this projection consumes.
    fn mapping_latitudes(&self) -> Mapping {
        let mut out = Mapping::new();
        self.base().copy_option(&mut out, "MinimumLatitude");
        self.base().copy_option(&mut out, "MaximumLatitude");
        out
    }

    /// The longitude options this projection consumes.
    fn mapping_longitudes(&self) -> Mapping {
        let mut out = Mapping::new();
        self.base().copy_option(&mut out, "MinimumLongitude");
        self.base().copy_option(&mut out, "MaximumLongitude");
        out
    }

    // ---- provided accessors --------------------------------------------

    fn latitude(&self) -> f64 {
        self.base().latitude()
    }

    fn longitude(&self) -> f64 {
        self.base().longitude()
    }

    fn x_coord(&self) -> f64 {
        self.base().x_coord()
    }

    fn y_coord(&self) -> f64 {
        self.base().y_coord()
    }

    fn is_good(&self) -> bool {
        self.base().is_good()
    }

    /// Forward transform from universal coordinates: planetocentric
    /// latitude, positive-east longitude (any domain).
    fn set_universal_ground(&mut self, lat: f64, lon: f64) -> bool {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 {
            self.base_mut().set_good(false);
            return false;
        }
        let base = self.base();
        let mut lon = match base.longitude_direction() {
            LongitudeDirection::PositiveWest => -lon,
            LongitudeDirection::PositiveEast => lon,
        };
        // The direction flip can land in (-360, 0); bring it back into the
        // configured domain.
        lon = match base.longitude_domain() {
            LongitudeDomain::Domain180 => angle::to_180_domain(lon),
            LongitudeDomain::Domain360 => angle::to_360_domain(lon),
        };
        let lat = match base.latitude_type() {
            LatitudeType::Planetographic => {
                angle::centric_to_graphic(lat, base.equatorial_radius(), base.polar_radius())
            }
            LatitudeType::Planetocentric => lat,
        };
        self.set_ground(lat, lon)
    }

    /// The last latitude as planetocentric degrees.
    fn universal_latitude(&self) -> f64 {
        let base = self.base();
        match base.latitude_type() {
            LatitudeType::Planetographic => angle::graphic_to_centric(
                base.latitude(),
                base.equatorial_radius(),
                base.polar_radius(),
            ),
            LatitudeType::Planetocentric => base.latitude(),
        }
    }

    /// The last longitude as positive-east degrees in the 360 domain.
    fn universal_longitude(&self) -> f64 {
        let base = self.base();
        let lon = match base.longitude_direction() {
            LongitudeDirection::PositiveWest => -base.longitude(),
            LongitudeDirection::PositiveEast => base.longitude(),
        };
        angle::to_360_domain(lon)
    }

    /// Compare configured parameters, ignoring transient state: equal when
    /// the names match and the consumed Mapping subsets agree.
    fn eq_projection(&self, other: &dyn Projection) -> bool {
        self.name().eq_ignore_ascii_case(other.name()) && self.mapping() == other.mapping()
    }

    // ---- xy_range helpers ----------------------------------------------

    /// Project a candidate extremum and fold it into the running bounds.
    fn xy_range_check(&mut self, lat: f64, lon: f64) {
        if self.set_ground(lat, lon) {
            let x = self.base().x_coord();
            let y = self.base().y_coord();
            self.base_mut().extend_xy_bounds(x, y);
        }
    }

    /// Probe the four corners of the ground-range rectangle.
    fn probe_ground_corners(&mut self, range: &GroundRange) {
        self.xy_range_check(range.min_lat, range.min_lon);
        self.xy_range_check(range.max_lat, range.min_lon);
        self.xy_range_check(range.min_lat, range.max_lon);
        self.xy_range_check(range.max_lat, range.max_lon);
    }
}
