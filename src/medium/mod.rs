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

//! Drift gas description and electron collision rates.

pub mod cross_sections;

use std::fmt;

use tracing::{debug, info, trace};

use crate::config::GasConfig;
use crate::constants::{DE_CS, E_MASS, EV_TO_J, K_BOLTZMANN, TORR_TO_PA};
use crate::error::SetupError;
use cross_sections::{Species, E_ELA, E_EXC, E_ION, N_PROCESSES};

/// Electron collision frequencies [1/s] at a given energy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionRates {
    pub elastic: f64,
    pub excitation: f64,
    pub ionization: f64,
}

impl CollisionRates {
    pub fn total(&self) -> f64 {
        self.elastic + self.excitation + self.ionization
    }
}

/// A medium electrons can drift in.
pub trait Medium: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Upper end of the tabulated energy range [eV].
    fn max_electron_energy(&self) -> f64;

    /// Collision rates at `energy` [eV]; energies above the table are clamped.
    fn collision_rates(&self, energy: f64) -> CollisionRates;

    /// Upper bound of the total collision rate over the whole table.
    fn max_collision_rate(&self) -> f64;

    /// Mass of the scattering partner in elastic collisions [kg].
    fn target_mass(&self) -> f64;

    fn excitation_threshold(&self) -> f64;

    fn ionization_threshold(&self) -> f64;
}

/// Gas mixture with tabulated electron collision rates.
pub struct GasMixture {
    name: String,
    temperature: f64,             // [K]
    pressure: f64,                // [Torr]
    max_energy: f64,              // [eV]
    target_mass: f64,             // density weighted atom mass [kg]
    excitation_threshold: f64,
    ionization_threshold: f64,
    rates: Vec<[f64; N_PROCESSES]>,
    max_rate: f64,
}

impl fmt::Debug for GasMixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GasMixture")
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .field("pressure", &self.pressure)
            .field("max_energy", &self.max_energy)
            .field("table_len", &self.rates.len())
            .finish()
    }
}

impl GasMixture {
    /// Builds the collision rate tables for the configured mixture.
    pub fn initialise(config: &GasConfig) -> Result<Self, SetupError> {
        if config.composition.is_empty() {
            return Err(SetupError::InvalidGas("empty composition".into()));
        }
        if !(config.temperature > 0.0) || !(config.pressure > 0.0) {
            return Err(SetupError::InvalidGas(format!(
                "temperature {} K and pressure {} Torr must be positive",
                config.temperature, config.pressure
            )));
        }
        if !(config.max_electron_energy > 10.0 * DE_CS) {
            return Err(SetupError::InvalidGas(format!(
                "max electron energy {} eV too small",
                config.max_electron_energy
            )));
        }

        let total_fraction: f64 = config.composition.iter().map(|c| c.fraction).sum();
        if !(total_fraction > 0.0) {
            return Err(SetupError::InvalidGas("fractions must sum to a positive value".into()));
        }

        let gas_density = config.pressure * TORR_TO_PA / (K_BOLTZMANN * config.temperature);
        let mut parts: Vec<(Species, f64)> = Vec::with_capacity(config.composition.len());
        for component in &config.composition {
            if component.fraction < 0.0 {
                return Err(SetupError::InvalidGas(format!(
                    "negative fraction for '{}'",
                    component.name
                )));
            }
            if component.fraction == 0.0 {
                continue;
            }
            let species = cross_sections::species(&component.name)
                .ok_or_else(|| SetupError::UnsupportedGas(component.name.clone()))?;
            parts.push((species, gas_density * component.fraction / total_fraction));
        }

        let name = config
            .composition
            .iter()
            .map(|c| format!("{} {}", c.name, c.fraction))
            .collect::<Vec<_>>()
            .join(" / ");

        let n_table = (config.max_electron_energy / DE_CS).ceil() as usize + 1;
        let mut rates = vec![[0.0; N_PROCESSES]; n_table];
        let mut max_rate: f64 = 0.0;
        for (ind, row) in rates.iter_mut().enumerate() {
            let e = (ind as f64) * DE_CS;
            let v = (2.0 * e * EV_TO_J / E_MASS).sqrt();
            for (species, density) in &parts {
                let cs = species.cross_sections(e);
                for p in 0..N_PROCESSES {
                    row[p] += cs[p] * density * v;
                }
            }
            max_rate = max_rate.max(row.iter().sum());
        }

        let weight: f64 = parts.iter().map(|(_, n)| n).sum();
        let target_mass = parts.iter().map(|(s, n)| s.mass * n).sum::<f64>() / weight;
        let excitation_threshold = parts
            .iter()
            .map(|(s, _)| s.excitation_threshold)
            .fold(f64::INFINITY, f64::min);
        let ionization_threshold = parts
            .iter()
            .map(|(s, _)| s.ionization_threshold)
            .fold(f64::INFINITY, f64::min);

        info!(
            gas = %name,
            temperature = config.temperature,
            pressure = config.pressure,
            density = gas_density,
            "gas mixture initialised"
        );
        debug!(entries = n_table, max_rate, "collision rate table built");

        Ok(Self {
            name,
            temperature: config.temperature,
            pressure: config.pressure,
            max_energy: config.max_electron_energy,
            target_mass,
            excitation_threshold,
            ionization_threshold,
            rates,
            max_rate,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }
}

impl Medium for GasMixture {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_electron_energy(&self) -> f64 {
        self.max_energy
    }

    fn collision_rates(&self, energy: f64) -> CollisionRates {
        let last = self.rates.len() - 1;
        let mut index = (energy / DE_CS + 0.5).trunc() as usize;
        if index > last {
            trace!(energy, max = self.max_energy, "electron energy above the tabulated range");
            index = last;
        }
        let row = &self.rates[index];
        CollisionRates {
            elastic: row[E_ELA],
            excitation: row[E_EXC],
            ionization: row[E_ION],
        }
    }

    fn max_collision_rate(&self) -> f64 {
        self.max_rate
    }

    fn target_mass(&self) -> f64 {
        self.target_mass
    }

    fn excitation_threshold(&self) -> f64 {
        self.excitation_threshold
    }

    fn ionization_threshold(&self) -> f64 {
        self.ionization_threshold
    }
}
