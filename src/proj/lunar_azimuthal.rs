//! Lunar Azimuthal Equal-Area projection.
//!
//! An azimuthal equal-area variant centered on (0°, 0°) that stretches the
//! visible hemisphere by the maximum libration L, so the whole surface a
//! librating observer can ever see fits on one map. With
//! Pfac = (π/2 + L)/(π/2) and E the angular distance to the center:
//!
//!   ρ = Re·sin(E/Pfac), x = ρ·cos D, y = ρ·sin D
//!
//! where D is the direction angle of the point about the center. Points
//! past the libration-extended hemisphere (E > π/2 + L) do not project.

use std::f64::consts::FRAC_PI_2;

use crate::angle;
use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::{Projection, ProjectionBase, XyRange};

const ORIGIN_EPSILON: f64 = 1.0e-15;

pub struct LunarAzimuthalEqualArea {
    base: ProjectionBase,
    /// Maximum libration, radians.
    max_libration: f64,
    /// Radial stretch: (π/2 + L)/(π/2).
    perspective_factor: f64,
}

impl LunarAzimuthalEqualArea {
    pub fn new(mapping: Mapping, _allow_defaults: bool) -> Result<Self, ProjError> {
        let base = ProjectionBase::from_mapping(mapping)?;
        let libration_deg = base.mapping().real("MaximumLibration")?;
        if !(0.0..90.0).contains(&libration_deg) {
            return Err(ProjError::Configuration(format!(
                "value [{libration_deg}] for option [MaximumLibration] \
                 must be in the range [0:90)"
            )));
        }
        let max_libration = libration_deg.to_radians();
        Ok(Self {
            base,
            max_libration,
            perspective_factor: (FRAC_PI_2 + max_libration) / FRAC_PI_2,
        })
    }
}

impl Projection for LunarAzimuthalEqualArea {
    fn base(&self) -> &ProjectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProjectionBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "LunarAzimuthalEqualArea"
    }

    fn set_ground(&mut self, lat: f64, lon: f64) -> bool {
        self.base.store_ground(lat, lon);
        let Some((phi, lam)) = self.base.ground_to_internal(lat, lon) else {
            self.base.set_good(false);
            return false;
        };
        // Work relative to the fixed (0, 0) center through the 180 domain.
        let dlam = angle::to_180_domain(lam.to_degrees()).to_radians();

        let cos_e = (phi.cos() * dlam.cos()).clamp(-1.0, 1.0);
        let e = cos_e.acos();
        if e > FRAC_PI_2 + self.max_libration + 1.0e-10 {
            self.base.set_good(false);
            return false;
        }
        if e < ORIGIN_EPSILON {
            self.base.set_computed_xy(0.0, 0.0);
            return true;
        }

        let direction_sin = (dlam.sin() * phi.cos() / e.sin()).clamp(-1.0, 1.0);
        let mut direction = FRAC_PI_2 - direction_sin.asin();
        if phi < 0.0 {
            direction = -direction;
        }

        let rho = self.base.equatorial_radius() * (e / self.perspective_factor).sin();
        let x = rho * direction.cos();
        let y = rho * direction.sin();
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
        let rho = x.hypot(y);
        if rho < ORIGIN_EPSILON * radius {
            self.base.internal_to_ground(0.0, 0.0);
            return true;
        }
        let ratio = rho / radius;
        if ratio > 1.0 + 1.0e-12 {
            self.base.set_good(false);
            return false;
        }
        let ratio = ratio.min(1.0);

        let e = self.perspective_factor * ratio.asin();
        let direction = y.atan2(x);
        let phi = (e.sin() * direction.sin()).clamp(-1.0, 1.0).asin();
        let lam = (e.sin() * direction.cos()).atan2(e.cos());
        self.base.internal_to_ground(phi, lam);
        true
    }

    fn xy_range(&mut self) -> Option<XyRange> {
        let range = *self.base.ground_range()?;
        self.base.reset_xy_bounds();
        self.probe_ground_corners(&range);
        // The extrema migrate to the axes when the range crosses them.
        if self.base.in_latitude_range(0.0) {
            self.xy_range_check(0.0, range.min_lon);
            self.xy_range_check(0.0, range.max_lon);
        }
        if self.base.in_longitude_range(0.0) {
            self.xy_range_check(range.min_lat, 0.0);
            self.xy_range_check(range.max_lat, 0.0);
        }
        self.base.xy_bounds()
    }

    fn mapping(&self) -> Mapping {
        let mut out = self.base.core_mapping();
        self.base.copy_option(&mut out, "MaximumLibration");
        out
    }
}
