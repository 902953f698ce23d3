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

//! Monte Carlo simulation of electron avalanches in a Large Electron
//! Multiplier (LEM) cell.
//!
//! Primary electrons are injected at random lateral positions above the LEM
//! plate, each cascade is tracked microscopically through the gas and every
//! avalanche that multiplied is written to an event store together with the
//! start and end state of all its electrons. The fraction of avalanches whose
//! last electron reaches the readout region is reported as the transparency.

pub mod avalanche;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod geometry;
pub mod medium;
pub mod sensor;
pub mod setup;
pub mod store;
pub mod telemetry;
pub mod transport;

pub use avalanche::{AvalancheEvent, Candidate, Orchestrator, OrchestratorSettings, RunSummary};
pub use config::SimulationConfig;
pub use error::SimulationError;
pub use store::{EventRow, EventSink, TreeReader, TreeWriter};
pub use transport::{ElectronEndpoint, PrimaryStart, TransportEngine};
