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

// drift line recording for plotting

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::geometry::Vec3;

/// Receives points along electron trajectories while a cascade is tracked.
pub trait DriftObserver {
    /// A new primary electron is injected.
    fn new_avalanche(&mut self);

    /// Position [cm] and time [ns] of `electron` of the current cascade.
    fn point(&mut self, electron: usize, position: Vec3, time: f64);

    fn finish(&mut self) -> io::Result<()>;
}

/// Writes drift lines as whitespace separated columns:
/// avalanche, electron, x [cm], y [cm], z [cm], t [ns].
pub struct DriftLineWriter {
    path: PathBuf,
    file: BufWriter<File>,
    avalanche: i64,
    error: Option<io::Error>,
}

impl DriftLineWriter {
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "# avalanche electron x[cm] y[cm] z[cm] t[ns]")?;
        Ok(Self { path: path.to_path_buf(), file, avalanche: -1, error: None })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DriftObserver for DriftLineWriter {
    fn new_avalanche(&mut self) {
        self.avalanche += 1;
    }

    fn point(&mut self, electron: usize, position: Vec3, time: f64) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(
            self.file,
            "{:8} {:6} {:1.6e} {:1.6e} {:1.6e} {:1.6e}",
            self.avalanche, electron, position.x, position.y, position.z, time
        ) {
            self.error = Some(err);
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.file.flush()
    }
}
