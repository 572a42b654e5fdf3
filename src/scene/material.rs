//! Acoustic surface materials.
//!
//! Every surface is exactly one of: a sound source, a specular reflector, a
//! refractive (transmissive) panel, or a passive surface that ends
//! propagation. Absorption and transmission are given for three frequency
//! bands (400 Hz, 2.5 KHz, 15 KHz) and feed the attenuation of image-source
//! paths.

use crate::error::{EchoViewError, Result};

/// How a surface takes part in image-source propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceKind {
    /// Absorbs or scatters; visible but spawns no further views
    #[default]
    Passive,
    /// Emits sound; a view resolving to it is a result
    Source,
    /// Specular reflector; spawns one mirrored view
    Reflective,
    /// Transmissive panel; spawns a straight-through and a refracted view
    Refractive,
}

/// Capability queries the visibility search asks of a surface material.
pub trait Material {
    fn is_source(&self) -> bool;
    fn is_reflective(&self) -> bool;
    fn is_refractive(&self) -> bool;

    /// Neither source, reflector nor refractor.
    fn is_passive(&self) -> bool {
        !(self.is_source() || self.is_reflective() || self.is_refractive())
    }
}

/// Acoustic properties of a surface material.
///
/// # Example
///
/// ```
/// use echoview::scene::{AcousticMaterial, Material, SurfaceKind};
///
/// let mirror = AcousticMaterial::METAL;
/// assert!(mirror.is_reflective());
///
/// let panel = AcousticMaterial {
///     kind: SurfaceKind::Refractive,
///     absorption: [0.05, 0.04, 0.03],
///     transmission: [0.40, 0.30, 0.20],
/// };
/// assert!(panel.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcousticMaterial {
    pub kind: SurfaceKind,

    /// Fraction of energy absorbed at [low, mid, high] frequencies (0.0 - 1.0)
    pub absorption: [f32; 3],

    /// Fraction of energy transmitted through the surface at [low, mid, high]
    /// frequencies (0.0 - 1.0)
    pub transmission: [f32; 3],
}

impl AcousticMaterial {
    /// Generic passive surface
    pub const GENERIC: Self = Self {
        kind: SurfaceKind::Passive,
        absorption: [0.10, 0.20, 0.30],
        transmission: [0.100, 0.050, 0.030],
    };

    /// Carpet - passive, highly absorptive
    pub const CARPET: Self = Self {
        kind: SurfaceKind::Passive,
        absorption: [0.24, 0.69, 0.73],
        transmission: [0.020, 0.005, 0.003],
    };

    /// Brick - specular reflector
    pub const BRICK: Self = Self {
        kind: SurfaceKind::Reflective,
        absorption: [0.03, 0.04, 0.07],
        transmission: [0.015, 0.015, 0.015],
    };

    /// Concrete - specular reflector
    pub const CONCRETE: Self = Self {
        kind: SurfaceKind::Reflective,
        absorption: [0.05, 0.07, 0.08],
        transmission: [0.015, 0.002, 0.001],
    };

    /// Metal - specular reflector
    pub const METAL: Self = Self {
        kind: SurfaceKind::Reflective,
        absorption: [0.20, 0.07, 0.06],
        transmission: [0.200, 0.025, 0.010],
    };

    /// Glass - refractive panel
    pub const GLASS: Self = Self {
        kind: SurfaceKind::Refractive,
        absorption: [0.06, 0.03, 0.02],
        transmission: [0.060, 0.044, 0.011],
    };

    /// Loudspeaker membrane - sound source
    pub const SPEAKER: Self = Self {
        kind: SurfaceKind::Source,
        absorption: [0.0, 0.0, 0.0],
        transmission: [0.0, 0.0, 0.0],
    };

    pub const fn with_kind(mut self, kind: SurfaceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Validates that absorption and transmission are within [0.0, 1.0]
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        for &val in &self.absorption {
            if !(0.0..=1.0).contains(&val) {
                return Err("Absorption values must be between 0.0 and 1.0");
            }
        }

        for &val in &self.transmission {
            if !(0.0..=1.0).contains(&val) {
                return Err("Transmission values must be between 0.0 and 1.0");
            }
        }

        Ok(())
    }

    /// Energy kept on a specular bounce, per band.
    pub fn reflectance(&self) -> [f32; 3] {
        self.absorption.map(|a| 1.0 - a)
    }
}

impl Default for AcousticMaterial {
    fn default() -> Self {
        Self::GENERIC
    }
}

impl Material for AcousticMaterial {
    fn is_source(&self) -> bool {
        self.kind == SurfaceKind::Source
    }

    fn is_reflective(&self) -> bool {
        self.kind == SurfaceKind::Reflective
    }

    fn is_refractive(&self) -> bool {
        self.kind == SurfaceKind::Refractive
    }
}

/// Material lookup table; polygons refer to materials by `u8` index.
#[derive(Debug, Clone)]
pub struct MaterialTable {
    materials: Vec<AcousticMaterial>,
}

impl MaterialTable {
    /// Creates a new empty material table
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
        }
    }

    /// Creates a table pre-loaded with the presets, in this order:
    /// - 0: GENERIC
    /// - 1: CARPET
    /// - 2: BRICK
    /// - 3: CONCRETE
    /// - 4: METAL
    /// - 5: GLASS
    /// - 6: SPEAKER
    pub fn with_presets() -> Self {
        Self {
            materials: vec![
                AcousticMaterial::GENERIC,
                AcousticMaterial::CARPET,
                AcousticMaterial::BRICK,
                AcousticMaterial::CONCRETE,
                AcousticMaterial::METAL,
                AcousticMaterial::GLASS,
                AcousticMaterial::SPEAKER,
            ],
        }
    }

    /// Adds a material and returns its index.
    ///
    /// # Errors
    ///
    /// Fails if the material's properties are out of range or the table
    /// already holds 256 materials.
    pub fn add(&mut self, material: AcousticMaterial) -> Result<u8> {
        material
            .validate()
            .map_err(|e| EchoViewError::InvalidMaterial(e.to_string()))?;

        if self.materials.len() >= 256 {
            return Err(EchoViewError::InvalidMaterial(
                "Material table is full (max 256 materials)".into(),
            ));
        }

        let index = self.materials.len() as u8;
        self.materials.push(material);
        Ok(index)
    }

    /// Retrieves a material by its index
    pub fn get(&self, index: u8) -> Option<&AcousticMaterial> {
        self.materials.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &AcousticMaterial)> {
        self.materials.iter().enumerate().map(|(i, m)| (i as u8, m))
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_validation() {
        assert!(AcousticMaterial::CONCRETE.validate().is_ok());

        let invalid_absorption = AcousticMaterial {
            absorption: [0.5, 1.5, 0.3],
            ..AcousticMaterial::GENERIC
        };
        assert!(invalid_absorption.validate().is_err());

        let invalid_transmission = AcousticMaterial {
            transmission: [-0.1, 0.05, 0.03],
            ..AcousticMaterial::GENERIC
        };
        assert!(invalid_transmission.validate().is_err());
    }

    #[test]
    fn test_capabilities_are_exclusive() {
        let all = [
            AcousticMaterial::GENERIC,
            AcousticMaterial::METAL,
            AcousticMaterial::GLASS,
            AcousticMaterial::SPEAKER,
        ];
        for material in all {
            let flags = [
                material.is_source(),
                material.is_reflective(),
                material.is_refractive(),
                material.is_passive(),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{:?}", material);
        }
        assert!(AcousticMaterial::CARPET.is_passive());
        assert!(AcousticMaterial::GENERIC.with_kind(SurfaceKind::Source).is_source());
    }

    #[test]
    fn test_reflectance() {
        let r = AcousticMaterial::CONCRETE.reflectance();
        assert!((r[0] - 0.95).abs() < 1e-6);
        assert!((r[2] - 0.92).abs() < 1e-6);
    }

    #[test]
    fn test_material_table() {
        let mut table = MaterialTable::new();
        assert!(table.is_empty());

        let idx1 = table.add(AcousticMaterial::CONCRETE).unwrap();
        let idx2 = table.add(AcousticMaterial::SPEAKER).unwrap();
        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(idx2), Some(&AcousticMaterial::SPEAKER));
        assert_eq!(table.get(99), None);

        let invalid = AcousticMaterial {
            absorption: [2.0, 0.0, 0.0],
            ..AcousticMaterial::GENERIC
        };
        assert!(table.add(invalid).is_err());
    }

    #[test]
    fn test_material_table_full() {
        let mut table = MaterialTable::new();
        for _ in 0..256 {
            table.add(AcousticMaterial::GENERIC).unwrap();
        }
        assert!(table.add(AcousticMaterial::GENERIC).is_err());
    }

    #[test]
    fn test_material_table_with_presets() {
        let table = MaterialTable::with_presets();
        assert_eq!(table.len(), 7);
        assert_eq!(table.get(4), Some(&AcousticMaterial::METAL));
        assert!(table.get(6).unwrap().is_source());
        assert_eq!(table.iter().count(), 7);
    }
}
