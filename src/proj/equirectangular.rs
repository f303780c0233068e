//! Equirectangular projection.
//!
//! forward: x = R(φ₀)·cos(φ₀)·(λ - λ₀), y = R(φ₀)·φ
//! inverse: λ = λ₀ + x/(R(φ₀)·cos(φ₀)), φ = y/R(φ₀)
//!
//! R(φ₀) is the local spheroid radius at the center latitude; it is written
//! back into the Mapping as CenterLatitudeRadius so rasterizer collaborators
//! see the radius the projection actually used.

use std::f64::consts::FRAC_PI_2;

use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::{Projection, ProjectionBase};

pub struct Equirectangular {
    base: ProjectionBase,
    center_longitude: f64,
    cos_center_latitude: f64,
    center_radius: f64,
    center_latitude_deg: f64,
}

impl Equirectangular {
    pub fn new(mapping: Mapping, allow_defaults: bool) -> Result<Self, ProjError> {
        let mut base = ProjectionBase::from_mapping(mapping)?;

        let center_longitude_deg = base.center_longitude_degrees(allow_defaults)?;
        let center_latitude_deg = base.center_latitude_degrees(allow_defaults)?;

        let center_longitude = base.internal_longitude(center_longitude_deg);
        let center_latitude = base.internal_latitude(center_latitude_deg);

        let cos_center_latitude = center_latitude.cos();
        if cos_center_latitude.abs() < f64::EPSILON {
            return Err(ProjError::CenterAtPole(format!(
                "Equirectangular projections cannot be centered at a pole, \
                 [CenterLatitude] = {center_latitude_deg}"
            )));
        }

        let center_radius = base.local_radius(center_latitude.to_degrees())?;
        base.mapping_mut()
            .insert("CenterLatitudeRadius", center_radius);

        Ok(Self {
            base,
            center_longitude,
            cos_center_latitude,
            center_radius,
            center_latitude_deg,
        })
    }
}

impl Projection for Equirectangular {
    fn base(&self) -> &ProjectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProjectionBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "Equirectangular"
    }

    fn set_ground(&mut self, lat: f64, lon: f64) -> bool {
        self.base.store_ground(lat, lon);
        let Some((phi, lam)) = self.base.ground_to_internal(lat, lon) else {
            self.base.set_good(false);
            return false;
        };
        let x = self.center_radius * self.cos_center_latitude * (lam - self.center_longitude);
        let y = self.center_radius * phi;
        self.base.set_computed_xy(x, y);
        true
    }

    fn set_coordinate(&mut self, x: f64, y: f64) -> bool {
        self.base.set_xy(x, y);
        if !x.is_finite() || !y.is_finite() {
            self.base.set_good(false);
            return false;
        }
        let phi = y / self.center_radius;
        if phi.abs() > FRAC_PI_2 + 1.0e-10 {
            self.base.set_good(false);
            return false;
        }
        let lam =
            self.center_longitude + x / (self.center_radius * self.cos_center_latitude);
        self.base.internal_to_ground(phi, lam);
        true
    }

    fn true_scale_latitude(&self) -> f64 {
        self.center_latitude_deg
    }

    fn is_equatorial_cylindrical(&self) -> bool {
        true
    }

    fn mapping(&self) -> Mapping {
        let mut out = self.base.core_mapping();
        self.base.copy_option(&mut out, "CenterLatitude");
        self.base.copy_option(&mut out, "CenterLongitude");
        self.base.copy_option(&mut out, "CenterLatitudeRadius");
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
