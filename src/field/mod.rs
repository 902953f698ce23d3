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

//! Field providers.
//!
//! A field provider owns a field description over a bounded region, the
//! table of materials in it and the assignment of drift media to those
//! materials. The tracker only sees it through [`crate::sensor::Sensor`].

pub mod cell;

use std::fmt;
use std::sync::Arc;

use crate::error::SetupError;
use crate::geometry::{Axis, Vec3};
use crate::medium::Medium;

pub use cell::LayeredCell;

/// Field [V/cm] and material index at a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSample {
    pub field: Vec3,
    pub material: usize,
}

pub trait FieldProvider: fmt::Debug {
    /// Field at `p` [cm], or `None` outside the described region.
    fn electric_field(&self, p: Vec3) -> Option<FieldSample>;

    fn material_count(&self) -> usize;

    /// Relative permittivity of a material.
    fn permittivity(&self, material: usize) -> Option<f64>;

    fn set_medium(&mut self, material: usize, medium: Arc<dyn Medium>) -> Result<(), SetupError>;

    /// Drift medium assigned to a material, if any.
    fn medium(&self, material: usize) -> Option<&dyn Medium>;

    fn enable_periodicity(&mut self, axis: Axis);

    fn is_periodic(&self, axis: Axis) -> bool;

    /// Attaches the weighting field of the electrode called `label`.
    fn set_weighting_field(&mut self, label: &str) -> Result<(), SetupError>;

    /// Weighting field [1/cm] of an attached electrode at `p`.
    fn weighting_field(&self, p: Vec3, label: &str) -> Option<Vec3>;

    /// Extent of the described region (one unit cell for periodic axes).
    fn bounding_box(&self) -> (Vec3, Vec3);
}

/// Assigns `medium` to every material whose permittivity is that of a gas.
/// Returns the indices that were assigned.
pub fn assign_gas_medium(
    provider: &mut dyn FieldProvider,
    medium: Arc<dyn Medium>,
    tolerance: f64,
) -> Result<Vec<usize>, SetupError> {
    let n_materials = provider.material_count();
    let mut assigned = Vec::new();
    for i in 0..n_materials {
        let eps = provider
            .permittivity(i)
            .ok_or(SetupError::MaterialOutOfRange { index: i, count: n_materials })?;
        if (eps - 1.0).abs() < tolerance {
            provider.set_medium(i, Arc::clone(&medium))?;
            assigned.push(i);
        }
    }
    if assigned.is_empty() {
        return Err(SetupError::NoGasMaterial(n_materials));
    }
    Ok(assigned)
}
