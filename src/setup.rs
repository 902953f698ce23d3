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

//! Assembles field, medium, sensor and transport engine from a configuration.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{SimulationConfig, TransportConfig};
use crate::constants::GAS_PERMITTIVITY_TOLERANCE;
use crate::error::SimulationError;
use crate::field::{assign_gas_medium, FieldProvider, LayeredCell};
use crate::geometry::Axis;
use crate::medium::{GasMixture, Medium};
use crate::sensor::Sensor;
use crate::transport::microscopic::TrackerSettings;
use crate::transport::{DriftLineWriter, MicroscopicAvalanche};

impl From<&TransportConfig> for TrackerSettings {
    fn from(config: &TransportConfig) -> Self {
        Self {
            avalanche_size_limit: config.avalanche_size_limit,
            collision_steps: config.collision_steps,
            max_collisions: config.max_collisions,
            seed: config.seed,
        }
    }
}

/// Loads the cell, fills its gas regions with the configured mixture and
/// wraps it into a tracker. Any failure here is fatal for the run.
pub fn build_engine(config: &SimulationConfig) -> Result<MicroscopicAvalanche, SimulationError> {
    let mut cell = LayeredCell::load(&config.geometry.cell)?;
    if config.geometry.periodic_x {
        cell.enable_periodicity(Axis::X);
    }
    if config.geometry.periodic_y {
        cell.enable_periodicity(Axis::Y);
    }
    cell.set_weighting_field(&config.geometry.weighting_electrode)?;
    cell.print_range();

    let gas: Arc<dyn Medium> = Arc::new(GasMixture::initialise(&config.gas)?);
    let assigned = assign_gas_medium(&mut cell, gas, GAS_PERMITTIVITY_TOLERANCE)?;
    debug!(materials = ?assigned, "gas assigned");

    let mut sensor = Sensor::new(config.volume.to_volume()?);
    sensor.add_component(Box::new(cell));

    let mut engine = MicroscopicAvalanche::new(sensor, TrackerSettings::from(&config.transport));
    if let Some(path) = &config.visualization.drift_lines {
        let writer = DriftLineWriter::create(path).map_err(|source| SimulationError::DriftLines {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "recording drift lines");
        engine.enable_plotting(Box::new(writer));
    }
    Ok(engine)
}
