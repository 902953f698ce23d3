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

//! Microscopic electron transport.
//!
//! [`TransportEngine`] is the boundary the avalanche loop talks to: inject
//! one primary electron, then read back the cascade size and one endpoint
//! record per electron. [`MicroscopicAvalanche`] is the built-in tracker.

pub mod drift_lines;
pub mod microscopic;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::geometry::Vec3;

pub use drift_lines::{DriftLineWriter, DriftObserver};
pub use microscopic::MicroscopicAvalanche;

/// Termination codes written by the built-in tracker.
pub mod status {
    /// Still drifting when the cascade was cut.
    pub const ALIVE: i32 = 0;
    pub const LEFT_DRIFT_AREA: i32 = -1;
    pub const CALCULATION_ABANDONED: i32 = -3;
    pub const LEFT_DRIFT_MEDIUM: i32 = -5;
}

/// State of the injected primary electron.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimaryStart {
    pub position: Vec3,   // [cm]
    pub direction: Vec3,
    pub energy: f64,      // [eV]
    pub time: f64,        // [ns]
}

/// Start and end state of one electron of a cascade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectronEndpoint {
    pub x0: f64,
    pub y0: f64,
    pub z0: f64,
    pub e0: f64,
    pub t0: f64,
    pub x1: f64,
    pub y1: f64,
    pub z1: f64,
    pub e1: f64,
    pub t1: f64,
    /// Engine specific termination code, persisted without interpretation.
    pub status: i32,
}

pub trait TransportEngine {
    /// Simulates the full cascade started by one electron. Results replace
    /// those of the previous call.
    fn avalanche_electron(&mut self, start: &PrimaryStart) -> Result<(), TransportError>;

    /// Electrons and ions produced by the last cascade.
    fn avalanche_size(&self) -> (i32, i32);

    fn endpoint_count(&self) -> usize;

    fn endpoint(&self, index: usize) -> Option<ElectronEndpoint>;
}

impl<T: TransportEngine + ?Sized> TransportEngine for Box<T> {
    fn avalanche_electron(&mut self, start: &PrimaryStart) -> Result<(), TransportError> {
        (**self).avalanche_electron(start)
    }

    fn avalanche_size(&self) -> (i32, i32) {
        (**self).avalanche_size()
    }

    fn endpoint_count(&self) -> usize {
        (**self).endpoint_count()
    }

    fn endpoint(&self, index: usize) -> Option<ElectronEndpoint> {
        (**self).endpoint(index)
    }
}
