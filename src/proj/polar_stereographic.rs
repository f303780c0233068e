//! Polar Stereographic projection, ellipsoidal form.
//!
//! With the latitude of true scale φ₀ away from the pole:
//!   ρ(φ) = Re·m(φ₀)·t(φ)/t(φ₀)
//! with φ₀ at the pole:
//!   ρ(φ) = 2·Re·t(φ)/sqrt((1+e)^(1+e)·(1-e)^(1-e))
//! then, with s the sign of φ₀:
//!   x = s·ρ·sin(s·(λ - λ₀)), y = -s·ρ·cos(s·(λ - λ₀))

use std::f64::consts::FRAC_PI_2;

use log::warn;

use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::snyder::{msfn, phi_from_ts, tsfn};
use crate::proj::{Projection, ProjectionBase, XyRange};

const POLE_EPSILON: f64 = 1.0e-10;

pub struct PolarStereographic {
    base: ProjectionBase,
    center_longitude: f64,
    center_longitude_deg: f64,
    center_latitude_deg: f64,
    /// +1 north aspect, -1 south aspect.
    sign: f64,
    /// ρ = rho_factor · t(s·φ).
    rho_factor: f64,
}

impl PolarStereographic {
    pub fn new(mapping: Mapping, allow_defaults: bool) -> Result<Self, ProjError> {
        let mut base = ProjectionBase::from_mapping(mapping)?;

        let center_longitude_deg = base.center_longitude_degrees(allow_defaults)?;

        // The default center latitude is the pole nearer the latitude range.
        if allow_defaults && !base.mapping().contains("CenterLatitude") {
            let range = base
                .ground_range()
                .copied()
                .ok_or_else(|| ProjError::MissingOption("CenterLatitude".to_string()))?;
            let pole = if range.min_lat + range.max_lat < 0.0 {
                -90.0
            } else {
                90.0
            };
            base.mapping_mut().insert("CenterLatitude", pole);
        }
        let center_latitude_deg = base.center_latitude_degrees(false)?;
        if center_latitude_deg == 0.0 {
            return Err(ProjError::Configuration(
                "[CenterLatitude] of 0 is invalid for PolarStereographic; \
                 the sign selects the projected pole"
                    .to_string(),
            ));
        }

        let center_longitude = base.internal_longitude(center_longitude_deg);
        let center_latitude = base.internal_latitude(center_latitude_deg);
        let sign = center_latitude.signum();

        let e = base.eccentricity();
        let radius = base.equatorial_radius();
        let rho_factor = if FRAC_PI_2 - center_latitude.abs() > POLE_EPSILON {
            // True scale at φ₀.
            let m0 = msfn(center_latitude.abs(), e * e);
            let t0 = tsfn(center_latitude.abs(), e);
            radius * m0 / t0
        } else {
            // True scale at the pole itself.
            let pole_scale = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
            2.0 * radius / pole_scale
        };

        Ok(Self {
            base,
            center_longitude,
            center_longitude_deg,
            center_latitude_deg,
            sign,
            rho_factor,
        })
    }

    fn rho_to_ts(&self, rho: f64) -> f64 {
        rho / self.rho_factor
    }
}

impl Projection for PolarStereographic {
    fn base(&self) -> &ProjectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProjectionBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "PolarStereographic"
    }

    fn set_ground(&mut self, lat: f64, lon: f64) -> bool {
        self.base.store_ground(lat, lon);
        let Some((phi, lam)) = self.base.ground_to_internal(lat, lon) else {
            self.base.set_good(false);
            return false;
        };
        // The pole opposite the center projects to infinity.
        if FRAC_PI_2 - self.sign * phi >= std::f64::consts::PI - POLE_EPSILON {
            self.base.set_good(false);
            return false;
        }
        let rho = self.rho_factor * tsfn(self.sign * phi, self.base.eccentricity());
        let dlam = self.sign * (lam - self.center_longitude);
        let x = self.sign * rho * dlam.sin();
        let y = -self.sign * rho * dlam.cos();
        self.base.set_computed_xy(x, y);
        true
    }

    fn set_coordinate(&mut self, x: f64, y: f64) -> bool {
        self.base.set_xy(x, y);
        if !x.is_finite() || !y.is_finite() {
            self.base.set_good(false);
            return false;
        }
        let rho = x.hypot(y);
        let (phi, lam) = if rho == 0.0 {
            (self.sign * FRAC_PI_2, self.center_longitude)
        } else {
            let ts = self.rho_to_ts(rho);
            let Some(phi_north) = phi_from_ts(ts, self.base.eccentricity()) else {
                warn!("PolarStereographic inverse failed to converge at (x, y) = ({x}, {y})");
                self.base.set_good(false);
                return false;
            };
            let dlam = self.sign * (self.sign * x).atan2(-self.sign * y);
            (self.sign * phi_north, self.center_longitude + dlam)
        };
        self.base.internal_to_ground(phi, lam);
        true
    }

    fn xy_range(&mut self) -> Option<XyRange> {
        let range = *self.base.ground_range()?;
        self.base.reset_xy_bounds();
        self.probe_ground_corners(&range);
        // The projected boundary circles reach their x/y extrema at
        // quarter-turn offsets from the center longitude; probe every such
        // offset inside the range, endpoints included.
        let first = ((range.min_lon - self.center_longitude_deg) / 90.0).ceil() as i64;
        let last = ((range.max_lon - self.center_longitude_deg) / 90.0).floor() as i64;
        for quarter in first..=last {
            let lon = self.center_longitude_deg + 90.0 * quarter as f64;
            self.xy_range_check(range.min_lat, lon);
            self.xy_range_check(range.max_lat, lon);
        }
        self.base.xy_bounds()
    }

    fn true_scale_latitude(&self) -> f64 {
        self.center_latitude_deg
    }

    fn mapping(&self) -> Mapping {
        let mut out = self.base.core_mapping();
        self.base.copy_option(&mut out, "CenterLatitude");
        self.base.copy_option(&mut out, "CenterLongitude");
        out
    }

    fn mapping_latitudes(&self) -> Mapping {
        let mut out = Mapping::new();
        self.base.copy_option(&mut out, "MinimumLatitude");
        self.base.copy_option(&mut out, "MaximumLatitude");
        self.base.copy_option(&mut out, "CenterLatitude");
        out
    }

    fn mapping_longitudes(&self) -> Mapping {
        let mut out = Mapping::new();
        self.base.copy_option(&mut out, "MinimumLongitude");
        self.base.copy_option(&mut out, "MaximumLongitude");
        self.base.copy_option(&mut out, "CenterLongitude");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// International 1924 ellipsoid, Snyder's Polar Stereographic example.
    fn south_aspect_mapping() -> Mapping {
        let mut m = Mapping::new();
        m.insert("ProjectionName", "PolarStereographic");
        m.insert("EquatorialRadius", 6378388.0);
        m.insert("PolarRadius", 6356911.9);
        m.insert("LatitudeType", "Planetographic");
        m.insert("LongitudeDirection", "PositiveEast");
        m.insert("LongitudeDomain", 360_i64);
        m.insert("MinimumLatitude", -90.0);
        m.insert("MaximumLatitude", -60.0);
        m.insert("MinimumLongitude", 0.0);
        m.insert("MaximumLongitude", 360.0);
        m.insert("CenterLatitude", -71.0);
        m.insert("CenterLongitude", -100.0);
        m
    }

    #[test]
    fn test_forward_snyder_example() {
        // Snyder PP 1395, p. 315: φ = -75°, λ = 150°.
        let mut proj = PolarStereographic::new(south_aspect_mapping(), false).unwrap();
        assert!(proj.set_ground(-75.0, 150.0));
        assert_relative_eq!(proj.x_coord(), -1_540_033.620970689, epsilon = 0.5);
        assert_relative_eq!(proj.y_coord(), -560_526.3978025292, epsilon = 0.5);
    }

    #[test]
    fn test_inverse_snyder_example() {
        let mut proj = PolarStereographic::new(south_aspect_mapping(), false).unwrap();
        assert!(proj.set_coordinate(-1_540_033.620970689, -560_526.3978025292));
        assert_relative_eq!(proj.latitude(), -75.0, epsilon = 1e-7);
        assert_relative_eq!(proj.longitude(), 150.0, epsilon = 1e-7);
    }

    #[test]
    fn test_opposite_pole_rejected() {
        let mut proj = PolarStereographic::new(south_aspect_mapping(), false).unwrap();
        assert!(!proj.set_ground(90.0, 0.0));
        assert!(!proj.is_good());
        // The center pole itself is fine and lands at the origin.
        assert!(proj.set_ground(-90.0, 42.0));
        assert_relative_eq!(proj.x_coord(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(proj.y_coord(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_north_aspect_pole_protection() {
        let mut m = south_aspect_mapping();
        m.insert("CenterLatitude", 71.0);
        m.insert("MinimumLatitude", 60.0);
        m.insert("MaximumLatitude", 90.0);
        let mut proj = PolarStereographic::new(m, false).unwrap();
        assert!(!proj.set_ground(-90.0, 17.0));
        assert!(proj.set_ground(90.0, 17.0));
    }

    #[test]
    fn test_round_trip() {
        let mut proj = PolarStereographic::new(south_aspect_mapping(), false).unwrap();
        let cases: &[(f64, f64)] = &[
            (-75.0, 150.0),
            (-71.0, 260.0),
            (-80.5, 10.0),
            (-61.0, 359.0),
        ];
        for &(lat, lon) in cases {
            assert!(proj.set_ground(lat, lon), "forward failed at ({lat}, {lon})");
            let (x, y) = (proj.x_coord(), proj.y_coord());
            assert!(proj.set_coordinate(x, y));
            assert_relative_eq!(proj.latitude(), lat, epsilon = 1e-7);
            assert_relative_eq!(proj.longitude(), lon, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_zero_center_latitude_rejected() {
        let mut m = south_aspect_mapping();
        m.insert("CenterLatitude", 0.0);
        assert!(matches!(
            PolarStereographic::new(m, false),
            Err(ProjError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_center_is_nearer_pole() {
        let mut m = south_aspect_mapping();
        let mut stripped = Mapping::new();
        for (k, v) in m.iter() {
            if !k.eq_ignore_ascii_case("CenterLatitude") {
                stripped.insert(k.to_string(), v.clone());
            }
        }
        m = stripped;
        let proj = PolarStereographic::new(m, true).unwrap();
        assert_relative_eq!(proj.mapping().real("CenterLatitude").unwrap(), -90.0);
    }

    #[test]
    fn test_center_at_pole_variant_round_trips() {
        let mut m = south_aspect_mapping();
        m.insert("CenterLatitude", -90.0);
        let mut proj = PolarStereographic::new(m, false).unwrap();
        assert!(proj.set_ground(-75.0, 150.0));
        let (x, y) = (proj.x_coord(), proj.y_coord());
        assert!(proj.set_coordinate(x, y));
        assert_relative_eq!(proj.latitude(), -75.0, epsilon = 1e-7);
        assert_relative_eq!(proj.longitude(), 150.0, epsilon = 1e-7);
    }

    #[test]
    fn test_xy_range_is_full_ring_disc() {
        // A full ring around the south pole: the bounding box must be
        // symmetric, which only happens when the quarter-turn offsets are
        // probed in addition to the corners.
        let mut proj = PolarStereographic::new(south_aspect_mapping(), false).unwrap();
        let range = proj.xy_range().unwrap();
        assert_relative_eq!(range.min_x, -range.max_x, epsilon = 1.0);
        assert_relative_eq!(range.min_y, -range.max_y, epsilon = 1.0);
        // The ring's outer radius is ρ at the shallowest latitude.
        assert!(proj.set_ground(-60.0, 260.0));
        let outer = proj.x_coord().hypot(proj.y_coord());
        assert_relative_eq!(range.max_x, outer, epsilon = 1.0);
    }

    #[test]
    fn test_xy_range_contains_interior_samples() {
        let mut proj = PolarStereographic::new(south_aspect_mapping(), false).unwrap();
        let range = proj.xy_range().unwrap();
        for &(lat, lon) in &[(-89.0, 5.0), (-60.0, 100.0), (-74.25, 312.0)] {
            assert!(proj.set_ground(lat, lon));
            assert!(range.min_x <= proj.x_coord() && proj.x_coord() <= range.max_x);
            assert!(range.min_y <= proj.y_coord() && proj.y_coord() <= range.max_y);
        }
    }
}
