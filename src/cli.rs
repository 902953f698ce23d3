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

//! Command line interface of the `lemsim` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::SimulationConfig;

/// Electron avalanches in a periodic LEM cell.
#[derive(Debug, Parser)]
#[command(name = "lemsim", version, about)]
pub struct Cli {
    /// YAML configuration file layered over the built-in defaults.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of accepted avalanches to simulate.
    #[arg(short = 'n', long)]
    pub events: Option<usize>,

    /// Seed of the start-position generator.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Event store to write.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Record drift lines into this file.
    #[arg(long, value_name = "FILE")]
    pub drift_lines: Option<PathBuf>,

    /// Do not print the progress indicator.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Applies the command line overrides on top of `config`.
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(events) = self.events {
            config.run.events = events;
        }
        if let Some(seed) = self.seed {
            config.run.seed = seed;
        }
        if let Some(output) = &self.output {
            config.run.output = output.clone();
        }
        if let Some(path) = &self.drift_lines {
            config.visualization.drift_lines = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::try_parse_from(["lemsim", "-n", "7", "--seed", "3", "-o", "x.tree"]).unwrap();
        let mut config = SimulationConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.run.events, 7);
        assert_eq!(config.run.seed, 3);
        assert_eq!(config.run.output, PathBuf::from("x.tree"));
        assert!(config.visualization.drift_lines.is_none());
    }

    #[test]
    fn absent_flags_keep_configuration() {
        let cli = Cli::try_parse_from(["lemsim"]).unwrap();
        let mut config = SimulationConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.run.events, 100);
        assert_eq!(config.run.seed, 42);
    }

    #[test]
    fn negative_event_count_is_rejected() {
        assert!(Cli::try_parse_from(["lemsim", "--events", "-1"]).is_err());
    }
}
