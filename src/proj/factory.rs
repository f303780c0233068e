//! Projection factory: resolves a ProjectionName to a constructor.
//!
//! The registry is a plain value. [`Registry::default`] carries the
//! built-in projections; callers wanting their own projection register a
//! constructor under a new name before creating. The [`create`] free
//! function uses a process-wide default registry that is built once and
//! never mutated afterwards.

use std::sync::OnceLock;

use log::debug;

use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::equirectangular::Equirectangular;
use crate::proj::lunar_azimuthal::LunarAzimuthalEqualArea;
use crate::proj::mercator::Mercator;
use crate::proj::point_perspective::PointPerspective;
use crate::proj::polar_stereographic::PolarStereographic;
use crate::proj::robinson::Robinson;
use crate::proj::sinusoidal::Sinusoidal;
use crate::proj::Projection;

/// Builds a projection from its Mapping group. When `allow_defaults` is
/// true, missing defaultable options (the Center* parameters) are computed
/// from the latitude/longitude range and written back into the group.
pub type Constructor = fn(Mapping, bool) -> Result<Box<dyn Projection>, ProjError>;

/// Name → constructor table. Lookup is case-insensitive.
pub struct Registry {
    entries: Vec<(String, Constructor)>,
}

impl Registry {
    /// An empty registry with no projections.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a constructor, replacing any previous entry with the same
    /// name.
    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor) {
        let name = name.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = constructor,
            None => self.entries.push((name, constructor)),
        }
    }

    /// The registered projection names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Construct the projection the Mapping group names.
    pub fn create(
        &self,
        mapping: Mapping,
        allow_defaults: bool,
    ) -> Result<Box<dyn Projection>, ProjError> {
        let name = mapping.text("ProjectionName")?.to_string();
        let constructor = self
            .entries
            .iter()
            .find(|(registered, _)| registered.eq_ignore_ascii_case(&name))
            .map(|(_, constructor)| *constructor)
            .ok_or(ProjError::UnknownProjection(name.clone()))?;
        debug!("constructing [{name}] projection (allow_defaults = {allow_defaults})");
        constructor(mapping, allow_defaults)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("Equirectangular", |m, d| {
            Ok(Box::new(Equirectangular::new(m, d)?))
        });
        registry.register("Mercator", |m, d| Ok(Box::new(Mercator::new(m, d)?)));
        registry.register("Sinusoidal", |m, d| Ok(Box::new(Sinusoidal::new(m, d)?)));
        registry.register("PolarStereographic", |m, d| {
            Ok(Box::new(PolarStereographic::new(m, d)?))
        });
        registry.register("PointPerspective", |m, d| {
            Ok(Box::new(PointPerspective::new(m, d)?))
        });
        registry.register("Robinson", |m, d| Ok(Box::new(Robinson::new(m, d)?)));
        registry.register("LunarAzimuthalEqualArea", |m, d| {
            Ok(Box::new(LunarAzimuthalEqualArea::new(m, d)?))
        });
        registry
    }
}

/// Construct a projection from the built-in registry.
pub fn create(mapping: Mapping, allow_defaults: bool) -> Result<Box<dyn Projection>, ProjError> {
    static DEFAULT: OnceLock<Registry> = OnceLock::new();
    DEFAULT
        .get_or_init(Registry::default)
        .create(mapping, allow_defaults)
}
