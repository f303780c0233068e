//! Sinusoidal (Sanson–Flamsteed) projection. Spherical, equal-area.
//!
//! forward: x = Re·(λ - λ₀)·cos(φ), y = Re·φ
//! inverse: λ = λ₀ + x/(Re·cos(φ)), φ = y/Re

use std::f64::consts::FRAC_PI_2;

use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::{Projection, ProjectionBase, XyRange};

/// Longitudes past this magnitude (degrees) are treated as numeric garbage
/// rather than wrapped.
const LONGITUDE_LIMIT: f64 = 1.0e10;

pub struct Sinusoidal {
    base: ProjectionBase,
    center_longitude: f64,
}

impl Sinusoidal {
    pub fn new(mapping: Mapping, allow_defaults: bool) -> Result<Self, ProjError> {
        let mut base = ProjectionBase::from_mapping(mapping)?;
        let center_longitude_deg = base.center_longitude_degrees(allow_defaults)?;
        let center_longitude = base.internal_longitude(center_longitude_deg);
        Ok(Self {
            base,
            center_longitude,
        })
    }
}

impl Projection for Sinusoidal {
    fn base(&self) -> &ProjectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProjectionBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "Sinusoidal"
    }

    fn set_ground(&mut self, lat: f64, lon: f64) -> bool {
        self.base.store_ground(lat, lon);
        let Some((phi, lam)) = self.base.ground_to_internal(lat, lon) else {
            self.base.set_good(false);
            return false;
        };
        let radius = self.base.equatorial_radius();
        let x = radius * (lam - self.center_longitude) * phi.cos();
        let y = radius * phi;
        self.base.set_computed_xy(x, y);
        true
    }

    fn set_coordinate(&mut self, x: f64, y: f64) -> bool {
        self.base.set_xy(x, y);
        if !x.is_finite() || !y.is_finite() {
            self.base.set_good(false);
            return false;
        }
        let radius = self.base.equatorial_radius();
        let phi = y / radius;
        if phi.abs() > FRAC_PI_2 + 1.0e-10 {
            self.base.set_good(false);
            return false;
        }
        let cos_phi = phi.cos();
        let lam = if cos_phi.abs() < 1.0e-15 {
            // Longitude is undefined at the poles.
            self.center_longitude
        } else {
            self.center_longitude + x / (radius * cos_phi)
        };
        if lam.to_degrees().abs() > LONGITUDE_LIMIT {
            self.base.set_good(false);
            return false;
        }
        self.base.internal_to_ground(phi, lam);
        true
    }

    fn xy_range(&mut self) -> Option<XyRange> {
        let range = *self.base.ground_range()?;
        self.base.reset_xy_bounds();
        self.probe_ground_corners(&range);
        // |x| peaks where cosφ does; check the equator when it crosses.
        if self.base.in_latitude_range(0.0) {
            self.xy_range_check(0.0, range.min_lon);
            self.xy_range_check(0.0, range.max_lon);
        }
        self.base.xy_bounds()
    }

    fn mapping(&self) -> Mapping {
        let mut out = self.base.core_mapping();
        self.base.copy_option(&mut out, "CenterLongitude");
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

    fn unit_sphere_mapping() -> Mapping {
        let mut m = Mapping::new();
        m.insert("ProjectionName", "Sinusoidal");
        m.insert("EquatorialRadius", 1.0);
        m.insert("PolarRadius", 1.0);
        m.insert("LatitudeType", "Planetocentric");
        m.insert("LongitudeDirection", "PositiveEast");
        m.insert("LongitudeDomain", 180_i64);
        m.insert("MinimumLatitude", -90.0);
        m.insert("MaximumLatitude", 90.0);
        m.insert("MinimumLongitude", -180.0);
        m.insert("MaximumLongitude", 0.0);
        m.insert("CenterLongitude", -90.0);
        m
    }

    #[test]
    fn test_forward_reference_point() {
        let mut proj = Sinusoidal::new(unit_sphere_mapping(), false).unwrap();
        assert!(proj.set_ground(-50.0, -75.0));
        assert_relative_eq!(proj.x_coord(), 0.1682814027008146, epsilon = 1e-14);
        assert_relative_eq!(proj.y_coord(), -0.8726646259971648, epsilon = 1e-14);
    }

    #[test]
    fn test_round_trip() {
        let mut proj = Sinusoidal::new(unit_sphere_mapping(), false).unwrap();
        let cases: &[(f64, f64)] = &[
            (-50.0, -75.0),
            (0.0, -90.0),
            (45.0, -135.0),
            (-89.0, -91.0),
        ];
        for &(lat, lon) in cases {
            assert!(proj.set_ground(lat, lon), "forward failed at ({lat}, {lon})");
            let (x, y) = (proj.x_coord(), proj.y_coord());
            assert!(proj.set_coordinate(x, y));
            assert_relative_eq!(proj.latitude(), lat, epsilon = 1e-9);
            assert_relative_eq!(proj.longitude(), lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pole_longitude_collapses_to_center() {
        let mut proj = Sinusoidal::new(unit_sphere_mapping(), false).unwrap();
        assert!(proj.set_ground(90.0, -75.0));
        assert_relative_eq!(proj.x_coord(), 0.0, epsilon = 1e-15);
        assert!(proj.set_coordinate(0.0, std::f64::consts::FRAC_PI_2));
        assert_relative_eq!(proj.latitude(), 90.0, epsilon = 1e-10);
        assert_relative_eq!(proj.longitude(), -90.0, epsilon = 1e-10);
    }

    #[test]
    fn test_inverse_rejects_out_of_domain() {
        let mut proj = Sinusoidal::new(unit_sphere_mapping(), false).unwrap();
        // y beyond the pole
        assert!(!proj.set_coordinate(0.0, 1.6));
        assert!(!proj.is_good());
        // x so large near the pole that the longitude blows past the
        // double-precision safety limit
        assert!(!proj.set_coordinate(1.0e12, std::f64::consts::FRAC_PI_2 * 0.9999999999));
    }

    #[test]
    fn test_xy_range_includes_equator_bulge() {
        let mut m = unit_sphere_mapping();
        // A band whose corners are away from the equator.
        m.insert("MinimumLatitude", -60.0);
        m.insert("MaximumLatitude", 60.0);
        let mut proj = Sinusoidal::new(m, false).unwrap();
        let range = proj.xy_range().unwrap();
        // At the equator the full half-revolution is pi/2 wide on each side.
        assert_relative_eq!(range.min_x, -std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(range.max_x, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert!(proj.set_ground(0.0, -180.0));
        assert!(range.min_x <= proj.x_coord() && proj.x_coord() <= range.max_x);
    }

    #[test]
    fn test_not_equatorial_cylindrical() {
        let proj = Sinusoidal::new(unit_sphere_mapping(), false).unwrap();
        assert!(!proj.is_equatorial_cylindrical());
        assert_relative_eq!(proj.true_scale_latitude(), 0.0);
    }
}
