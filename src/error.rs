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

//! Error types for every stage of a simulation run.

use std::path::PathBuf;

use thiserror::Error;
use validator::ValidationErrors;

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    #[error("configuration parsing error: {0}")]
    Parsing(#[from] Box<figment::Error>),
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parsing(Box::new(err))
    }
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (field, errors) in errors.field_errors() {
        let _ = writeln!(output, "field '{}':", field);
        for error in errors {
            let message = match &error.message {
                Some(msg) => msg.to_string(),
                None => error.code.to_string(),
            };
            let _ = writeln!(output, "  - {}", message);
        }
    }
    output
}

/// Failures while building the field provider, the medium or the sensor.
/// None of these are recoverable: the event loop never starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot read cell description {path}: {source}")]
    CellIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cell description {path}: {source}")]
    CellFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid cell description: {0}")]
    InvalidCell(String),

    #[error("unknown length unit '{0}' (expected cm, mm or um)")]
    UnknownUnit(String),

    #[error("invalid simulation volume: {0}")]
    InvalidVolume(String),

    #[error("no electrode labelled '{0}' in the cell description")]
    UnknownElectrode(String),

    #[error("no electron cross sections available for gas component '{0}'")]
    UnsupportedGas(String),

    #[error("invalid gas mixture: {0}")]
    InvalidGas(String),

    #[error("no material with gas permittivity found among {0} materials")]
    NoGasMaterial(usize),

    #[error("material index {index} out of range ({count} materials)")]
    MaterialOutOfRange { index: usize, count: usize },
}

/// Unrecoverable failures inside the transport engine.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("start point ({x}, {y}, {z}) is outside the drift medium")]
    StartOutsideDriftMedium { x: f64, y: f64, z: f64 },

    #[error("invalid start state: {0}")]
    InvalidStart(String),

    #[error("transport engine failure: {0}")]
    Engine(String),
}

/// Failures of the event store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("{path} is not an event store (bad header)")]
    BadHeader { path: PathBuf },

    #[error("store {path} was not finalized after {rows} rows")]
    Truncated { path: PathBuf, rows: u64 },

    #[error("store is already closed")]
    Closed,
}

/// Top level error of a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{rejections} consecutive single-electron avalanches, giving up")]
    RejectionLimit { rejections: u64 },

    #[error("drift line output {path}: {source}")]
    DriftLines {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
