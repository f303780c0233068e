//! Point Perspective (Vertical Perspective, near side) projection.
//!
//! An observer at distance d above the surface sees the spherical cap with
//! cos g ≥ 1/P, P = 1 + d/Re. The visible image is the disc of radius
//! Re·sqrt((P-1)/(P+1)) about the projected center.
//!
//! forward (Snyder 23-15..17): k' = (P-1)/(P - cos g),
//!   x = Re·k'·cosφ·sin(λ-λ₀)
//!   y = Re·k'·(cosφ₀·sinφ - sinφ₀·cosφ·cos(λ-λ₀))
//! inverse (Snyder 25-11): sin z from ρ, then the standard azimuthal
//! inversion about (φ₀, λ₀).

use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::{Projection, ProjectionBase, XyRange};

pub struct PointPerspective {
    base: ProjectionBase,
    center_longitude: f64,
    center_latitude: f64,
    center_longitude_deg: f64,
    center_latitude_deg: f64,
    sin_center_latitude: f64,
    cos_center_latitude: f64,
    /// Observer distance from the planet center in planet radii.
    p: f64,
}

impl PointPerspective {
    pub fn new(mapping: Mapping, allow_defaults: bool) -> Result<Self, ProjError> {
        let mut base = ProjectionBase::from_mapping(mapping)?;

        let center_longitude_deg = base.center_longitude_degrees(allow_defaults)?;
        let center_latitude_deg = base.center_latitude_degrees(allow_defaults)?;

        // Distance is given in kilometres; the radii are in metres.
        let distance = base.mapping().real("Distance")? * 1000.0;
        if !distance.is_finite() || distance <= 0.0 {
            return Err(ProjError::Configuration(format!(
                "value [{}] for option [Distance] must be greater than zero",
                distance / 1000.0
            )));
        }

        let center_longitude = base.internal_longitude(center_longitude_deg);
        let center_latitude = base.internal_latitude(center_latitude_deg);
        let p = 1.0 + distance / base.equatorial_radius();

        Ok(Self {
            base,
            center_longitude,
            center_latitude,
            center_longitude_deg,
            center_latitude_deg,
            sin_center_latitude: center_latitude.sin(),
            cos_center_latitude: center_latitude.cos(),
            p,
        })
    }

    /// Radius of the visible disc in map units.
    fn disc_radius(&self) -> f64 {
        self.base.equatorial_radius() * ((self.p - 1.0) / (self.p + 1.0)).sqrt()
    }
}

impl Projection for PointPerspective {
    fn base(&self) -> &ProjectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProjectionBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "PointPerspective"
    }

    fn set_ground(&mut self, lat: f64, lon: f64) -> bool {
        self.base.store_ground(lat, lon);
        let Some((phi, lam)) = self.base.ground_to_internal(lat, lon) else {
            self.base.set_good(false);
            return false;
        };
        let dlam = lam - self.center_longitude;
        let cos_g = self.sin_center_latitude * phi.sin()
            + self.cos_center_latitude * phi.cos() * dlam.cos();
        // Behind the horizon as seen from the observer.
        if cos_g < 1.0 / self.p {
            self.base.set_good(false);
            return false;
        }
        let radius = self.base.equatorial_radius();
        let k = (self.p - 1.0) / (self.p - cos_g);
        let x = radius * k * phi.cos() * dlam.sin();
        let y = radius
            * k
            * (self.cos_center_latitude * phi.sin()
                - self.sin_center_latitude * phi.cos() * dlam.cos());
        let limit = self.disc_radius();
        if x * x + y * y > limit * limit {
            self.base.set_good(false);
            return false;
        }
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
        if rho == 0.0 {
            self.base
                .internal_to_ground(self.center_latitude, self.center_longitude);
            return true;
        }
        let rho_norm = rho / radius;
        let limit = ((self.p - 1.0) / (self.p + 1.0)).sqrt();
        if rho_norm > limit * (1.0 + 1.0e-12) {
            self.base.set_good(false);
            return false;
        }
        let ratio = (self.p + 1.0) / (self.p - 1.0);
        let sin_z = (self.p - (1.0 - rho_norm * rho_norm * ratio).sqrt())
            / ((self.p - 1.0) / rho_norm + rho_norm / (self.p - 1.0));
        let z = sin_z.clamp(-1.0, 1.0).asin();
        let (sin_z, cos_z) = (z.sin(), z.cos());

        let phi = (cos_z * self.sin_center_latitude
            + y * sin_z * self.cos_center_latitude / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lam = self.center_longitude
            + (x * sin_z).atan2(
                rho * self.cos_center_latitude * cos_z - y * self.sin_center_latitude * sin_z,
            );
        self.base.internal_to_ground(phi, lam);
        true
    }

    /// The visible image is a disc; its bounding square is analytic.
    fn xy_range(&mut self) -> Option<XyRange> {
        let radius = self.disc_radius();
        if !self.set_ground(self.center_latitude_deg, self.center_longitude_deg) {
            return None;
        }
        let (center_x, center_y) = (self.base.x_coord(), self.base.y_coord());
        Some(XyRange {
            min_x: center_x - radius,
            max_x: center_x + radius,
            min_y: center_y - radius,
            max_y: center_y + radius,
        })
    }

    fn true_scale_latitude(&self) -> f64 {
        self.center_latitude_deg
    }

    fn mapping(&self) -> Mapping {
        let mut out = self.base.core_mapping();
        self.base.copy_option(&mut out, "CenterLatitude");
        self.base.copy_option(&mut out, "CenterLongitude");
        self.base.copy_option(&mut out, "Distance");
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
