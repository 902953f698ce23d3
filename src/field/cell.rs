//-------------------------------------------------------------------//
//          lemsim : electron avalanches in a LEM unit cell          //
//                            version 1.0                            //
//                        :) Share & enjoy :)                        //
//-------------------------------------------------------------------//
// Electron collision kinematics and argon cross sections follow     //
// eduPIC; when you use this code, please cite:                      //
// Z. Donko, A. Derzsi, M. Vass, B. Horvath, S. Wilczek              //
// B. Hartmann, P. Hartmann:                                         //
// "eduPIC: an introductory particle based code for radio-frequency  //
// plasma simulation"                                                //
// Plasma Sources Science and Technology, vol 30, 095017 (2021)      //
//-------------------------------------------------------------------//
// This program is free software: you can redistribute it and/or     //
// modify it under the terms of the GNU General Public License as    //
// published by the Free Software Foundation, version 3.             //
// This program is distributed in the hope that it will be useful,   //
// but WITHOUT ANY WARRANTY; without even the implied warranty of    //
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU  //
// General Public License for more details at                        //
// https://www.gnu.org/licenses/gpl-3.0.html.                        //
//-------------------------------------------------------------------//

//! Analytic LEM unit cell.
//!
//! The cell is a stack of horizontal layers, each with a uniform field. A
//! layer may be perforated by a cylindrical hole centred on the unit cell axis
//! (the LEM hole), in which case points outside the hole radius belong to the
//! layer's bulk material. Lengths in the description file are given in the
//! declared unit and converted to cm on load; fields are always in V/cm.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use super::{FieldProvider, FieldSample};
use crate::error::SetupError;
use crate::geometry::{fold_periodic, Axis, Vec3};
use crate::medium::Medium;

/// Length unit conversion factor to cm.
pub fn unit_to_cm(unit: &str) -> Result<f64, SetupError> {
    match unit.trim() {
        "cm" => Ok(1.0),
        "mm" => Ok(0.1),
        "um" | "micron" => Ok(1.0e-4),
        "m" => Ok(100.0),
        other => Err(SetupError::UnknownUnit(other.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct CellFile {
    unit: String,
    half_width: f64,
    materials: Vec<MaterialEntry>,
    layers: Vec<LayerEntry>,
    #[serde(default)]
    electrodes: Vec<ElectrodeEntry>,
}

#[derive(Debug, Deserialize)]
struct MaterialEntry {
    permittivity: f64,
}

#[derive(Debug, Deserialize)]
struct LayerEntry {
    name: String,
    z_min: f64,
    z_max: f64,
    field: [f64; 3],
    material: usize,
    #[serde(default)]
    hole: Option<HoleEntry>,
}

#[derive(Debug, Deserialize)]
struct HoleEntry {
    radius: f64,
    material: usize,
}

#[derive(Debug, Deserialize)]
struct ElectrodeEntry {
    label: String,
    z_min: f64,
    z_max: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub z_min: f64,
    pub z_max: f64,
    pub field: Vec3,
    pub material: usize,
    pub hole: Option<Hole>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hole {
    pub radius: f64,
    pub material: usize,
}

/// Parallel-plate weighting field region of an electrode.
#[derive(Clone, Debug, PartialEq)]
pub struct Electrode {
    pub label: String,
    pub z_min: f64,
    pub z_max: f64,
}

#[derive(Debug)]
pub struct LayeredCell {
    half_width: f64,
    permittivity: Vec<f64>,
    media: Vec<Option<Arc<dyn Medium>>>,
    layers: Vec<Layer>,
    electrodes: Vec<Electrode>,
    weighting: BTreeSet<String>,
    periodic: [bool; 2],
}

impl LayeredCell {
    /// Reads a YAML cell description.
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path).map_err(|source| SetupError::CellIo {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CellFile = serde_yaml::from_str(&text).map_err(|source| SetupError::CellFormat {
            path: path.to_path_buf(),
            source,
        })?;
        let cell = Self::from_file(file)?;
        debug!(path = %path.display(), layers = cell.layers.len(), "cell description loaded");
        Ok(cell)
    }

    pub fn from_yaml(text: &str) -> Result<Self, SetupError> {
        let file: CellFile = serde_yaml::from_str(text).map_err(|source| SetupError::CellFormat {
            path: "<inline>".into(),
            source,
        })?;
        Self::from_file(file)
    }

    fn from_file(file: CellFile) -> Result<Self, SetupError> {
        let scale = unit_to_cm(&file.unit)?;
        let n_materials = file.materials.len();
        if n_materials == 0 {
            return Err(SetupError::InvalidCell("no materials".into()));
        }
        let permittivity: Vec<f64> = file.materials.iter().map(|m| m.permittivity).collect();
        if let Some(eps) = permittivity.iter().find(|eps| !(**eps > 0.0)) {
            return Err(SetupError::InvalidCell(format!("permittivity {} must be positive", eps)));
        }
        if !(file.half_width > 0.0) {
            return Err(SetupError::InvalidCell("half_width must be positive".into()));
        }
        let half_width = file.half_width * scale;

        let check_material = |index: usize| {
            if index < n_materials {
                Ok(index)
            } else {
                Err(SetupError::MaterialOutOfRange { index, count: n_materials })
            }
        };

        let mut layers = Vec::with_capacity(file.layers.len());
        for entry in file.layers {
            if !(entry.z_min < entry.z_max) {
                return Err(SetupError::InvalidCell(format!(
                    "layer '{}' has z_min {} >= z_max {}",
                    entry.name, entry.z_min, entry.z_max
                )));
            }
            let hole = match entry.hole {
                Some(h) => {
                    if !(h.radius > 0.0) || h.radius * scale > half_width {
                        return Err(SetupError::InvalidCell(format!(
                            "hole radius {} of layer '{}' does not fit the unit cell",
                            h.radius, entry.name
                        )));
                    }
                    Some(Hole { radius: h.radius * scale, material: check_material(h.material)? })
                }
                None => None,
            };
            layers.push(Layer {
                name: entry.name,
                z_min: entry.z_min * scale,
                z_max: entry.z_max * scale,
                field: Vec3::from(entry.field),
                material: check_material(entry.material)?,
                hole,
            });
        }
        if layers.is_empty() {
            return Err(SetupError::InvalidCell("no layers".into()));
        }
        layers.sort_by(|a, b| a.z_min.total_cmp(&b.z_min));
        for pair in layers.windows(2) {
            if pair[1].z_min < pair[0].z_max {
                return Err(SetupError::InvalidCell(format!(
                    "layers '{}' and '{}' overlap",
                    pair[0].name, pair[1].name
                )));
            }
        }

        let electrodes = file
            .electrodes
            .into_iter()
            .map(|e| {
                if e.z_min < e.z_max {
                    Ok(Electrode { label: e.label, z_min: e.z_min * scale, z_max: e.z_max * scale })
                } else {
                    Err(SetupError::InvalidCell(format!("electrode '{}' has an empty gap", e.label)))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            half_width,
            media: vec![None; n_materials],
            permittivity,
            layers,
            electrodes,
            weighting: BTreeSet::new(),
            periodic: [false, false],
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Maps a lateral coordinate into the unit cell, or `None` when it lies
    /// outside a non-periodic axis.
    fn local(&self, value: f64, axis: Axis) -> Option<f64> {
        if self.periodic[axis.index()] {
            Some(fold_periodic(value, 2.0 * self.half_width))
        } else if value.abs() <= self.half_width {
            Some(value)
        } else {
            None
        }
    }

    fn layer_at(&self, z: f64) -> Option<&Layer> {
        self.layers.iter().find(|l| z >= l.z_min && z <= l.z_max)
    }

    /// Logs the extent of the cell.
    pub fn print_range(&self) {
        let (lo, hi) = self.bounding_box();
        info!(
            x = ?(lo.x, hi.x),
            y = ?(lo.y, hi.y),
            z = ?(lo.z, hi.z),
            periodic_x = self.periodic[0],
            periodic_y = self.periodic[1],
            "cell range [cm]"
        );
    }
}

impl FieldProvider for LayeredCell {
    fn electric_field(&self, p: Vec3) -> Option<FieldSample> {
        let x = self.local(p.x, Axis::X)?;
        let y = self.local(p.y, Axis::Y)?;
        let layer = self.layer_at(p.z)?;
        let material = match layer.hole {
            Some(hole) if (x * x + y * y).sqrt() <= hole.radius => hole.material,
            _ => layer.material,
        };
        Some(FieldSample { field: layer.field, material })
    }

    fn material_count(&self) -> usize {
        self.permittivity.len()
    }

    fn permittivity(&self, material: usize) -> Option<f64> {
        self.permittivity.get(material).copied()
    }

    fn set_medium(&mut self, material: usize, medium: Arc<dyn Medium>) -> Result<(), SetupError> {
        let count = self.media.len();
        let slot = self
            .media
            .get_mut(material)
            .ok_or(SetupError::MaterialOutOfRange { index: material, count })?;
        *slot = Some(medium);
        Ok(())
    }

    fn medium(&self, material: usize) -> Option<&dyn Medium> {
        self.media.get(material)?.as_deref()
    }

    fn enable_periodicity(&mut self, axis: Axis) {
        match axis {
            Axis::X | Axis::Y => self.periodic[axis.index()] = true,
            Axis::Z => debug!("periodicity along z is not supported by layered cells"),
        }
    }

    fn is_periodic(&self, axis: Axis) -> bool {
        match axis {
            Axis::X | Axis::Y => self.periodic[axis.index()],
            Axis::Z => false,
        }
    }

    fn set_weighting_field(&mut self, label: &str) -> Result<(), SetupError> {
        if !self.electrodes.iter().any(|e| e.label == label) {
            return Err(SetupError::UnknownElectrode(label.to_string()));
        }
        self.weighting.insert(label.to_string());
        Ok(())
    }

    fn weighting_field(&self, p: Vec3, label: &str) -> Option<Vec3> {
        if !self.weighting.contains(label) {
            return None;
        }
        let electrode = self.electrodes.iter().find(|e| e.label == label)?;
        if p.z >= electrode.z_min && p.z <= electrode.z_max {
            Some(Vec3::new(0.0, 0.0, 1.0 / (electrode.z_max - electrode.z_min)))
        } else {
            Some(Vec3::ZERO)
        }
    }

    fn bounding_box(&self) -> (Vec3, Vec3) {
        let z_min = self.layers.first().map(|l| l.z_min).unwrap_or(0.0);
        let z_max = self.layers.last().map(|l| l.z_max).unwrap_or(0.0);
        (
            Vec3::new(-self.half_width, -self.half_width, z_min),
            Vec3::new(self.half_width, self.half_width, z_max),
        )
    }
}
