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

//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! `LEMSIM_`-prefixed environment variables (`LEMSIM_RUN__EVENTS=500`
//! overrides `run.events`). Command line overrides are applied by the binary
//! on top of the extracted value, which is validated again afterwards.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ConfigError, SetupError};
use crate::geometry::{SimulationVolume, Vec3};

/// Lattice half-width of the LEM cell [cm].
pub const LATTICE_CONST: f64 = 0.00625;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimulationConfig {
    #[validate(nested)]
    pub run: RunConfig,
    #[validate(nested)]
    pub launch: LaunchConfig,
    pub readout: ReadoutConfig,
    pub volume: VolumeConfig,
    #[validate(nested)]
    pub geometry: GeometryConfig,
    #[validate(nested)]
    pub gas: GasConfig,
    #[validate(nested)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunConfig {
    /// Number of accepted avalanches to simulate.
    pub events: usize,
    /// Seed of the start-position generator.
    pub seed: u64,
    /// Event store written by the run.
    pub output: PathBuf,
    #[validate(length(min = 1))]
    pub tree_name: String,
    pub tree_title: String,
    /// Optional cap on consecutive single-electron avalanches. Unset means
    /// rejection sampling never gives up.
    #[validate(range(min = 1))]
    pub max_consecutive_rejections: Option<u64>,
}

/// Primary electron injection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LaunchConfig {
    /// Start positions are drawn from [-L, L] on x and y [cm].
    #[validate(range(exclusive_min = 0.0))]
    pub lattice_half_width: f64,
    /// Start height [cm].
    pub height: f64,
    pub direction: [f64; 3],
    /// Initial kinetic energy [eV].
    #[validate(range(exclusive_min = 0.0))]
    pub energy: f64,
    /// Initial time [ns].
    pub time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadoutConfig {
    /// An avalanche passed when its last endpoint ends below this z [cm].
    pub z_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl VolumeConfig {
    pub fn to_volume(&self) -> Result<SimulationVolume, SetupError> {
        SimulationVolume::new(Vec3::from(self.min), Vec3::from(self.max))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeometryConfig {
    /// Cell description (layers, materials, electrodes).
    pub cell: PathBuf,
    pub periodic_x: bool,
    pub periodic_y: bool,
    /// Electrode whose weighting field is attached at setup.
    #[validate(length(min = 1))]
    pub weighting_electrode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GasConfig {
    /// [K]
    #[validate(range(exclusive_min = 0.0))]
    pub temperature: f64,
    /// [Torr]
    #[validate(range(exclusive_min = 0.0))]
    pub pressure: f64,
    #[validate(length(min = 1), nested)]
    pub composition: Vec<GasComponent>,
    /// [eV]
    #[validate(range(exclusive_min = 0.0))]
    pub max_electron_energy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GasComponent {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransportConfig {
    /// Electrons per avalanche; the cascade is truncated beyond this.
    #[validate(range(min = 1))]
    pub avalanche_size_limit: usize,
    /// Real collisions between two recorded drift-line points.
    #[validate(range(min = 1))]
    pub collision_steps: u32,
    pub seed: u64,
    /// Real collisions after which a single electron is abandoned.
    #[validate(range(min = 1))]
    pub max_collisions: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Drift lines are written here when set.
    pub drift_lines: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let half = 2.0 * LATTICE_CONST;
        Self {
            run: RunConfig {
                events: 100,
                seed: 42,
                output: PathBuf::from("avalanche.tree"),
                tree_name: "avalancheTree".into(),
                tree_title: "Avalanches".into(),
                max_consecutive_rejections: None,
            },
            launch: LaunchConfig {
                lattice_half_width: LATTICE_CONST,
                height: 0.01,
                direction: [0.0, 0.0, -1.0],
                energy: 1.0,
                time: 0.0,
            },
            readout: ReadoutConfig { z_threshold: -0.017 },
            volume: VolumeConfig {
                min: [-half, -half, -0.0178],
                max: [half, half, 0.0328],
            },
            geometry: GeometryConfig {
                cell: PathBuf::from("geometry/cell.yaml"),
                periodic_x: true,
                periodic_y: true,
                weighting_electrode: "readout".into(),
            },
            gas: GasConfig {
                temperature: 293.15,
                pressure: 750.0,
                composition: vec![GasComponent { name: "ar".into(), fraction: 100.0 }],
                max_electron_energy: 200.0,
            },
            transport: TransportConfig {
                avalanche_size_limit: 10,
                collision_steps: 1,
                seed: 4357,
                max_collisions: 2_000_000,
            },
            visualization: VisualizationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Defaults, the optional YAML file and the environment, in that order.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(SimulationConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(figment.merge(Env::prefixed("LEMSIM_").split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(path)?)
    }
}
