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

// electron / gas cross sections [m^2] as analytic functions of the electron energy [eV]

use crate::constants::{E_EXC_TH, E_ION_TH};

/// Collision processes tracked for electrons.
pub const N_PROCESSES: usize = 3;
pub const E_ELA: usize       = 0;  // process identifier: electron/elastic
pub const E_EXC: usize       = 1;  // process identifier: electron/excitation
pub const E_ION: usize       = 2;  // process identifier: electron/ionization

/// Cross sections of one gas species.
#[derive(Clone, Copy, Debug)]
pub struct Species {
    pub name: &'static str,
    pub mass: f64,                                 // atom mass [kg]
    pub excitation_threshold: f64,                 // [eV]
    pub ionization_threshold: f64,                 // [eV]
    cross_sections: fn(f64) -> [f64; N_PROCESSES],
}

impl Species {
    pub fn cross_sections(&self, e: f64) -> [f64; N_PROCESSES] {
        (self.cross_sections)(e)
    }
}

/// Looks up a species by the name used in gas compositions.
pub fn species(name: &str) -> Option<Species> {
    match name.to_ascii_lowercase().as_str() {
        "ar" | "argon" => Some(ARGON),
        _ => None,
    }
}

pub const ARGON: Species = Species {
    name: "ar",
    mass: crate::constants::AR_MASS,
    excitation_threshold: E_EXC_TH,
    ionization_threshold: E_ION_TH,
    cross_sections: argon,
};

fn argon(e: f64) -> [f64; N_PROCESSES] {
    let e = e.max(crate::constants::DE_CS);
    [qmom(e), qexc(e), qion(e)]
}

// elastic momentum transfer
fn qmom(e: f64) -> f64 {
    1.0e-20*(
        (6.0/(1.0+e/0.1+(e/0.6).powf(2.0)).powf(3.3)-1.1*e.powf(1.4)/
        (1.0+(e/15.0).powf(1.2))/(1.0+(e/5.5).powf(2.5)+(e/60.0).powf(4.1)).sqrt()).abs()+0.05/(1.0+e/10.0).powf(2.0)+
        0.01*e.powf(3.0)/(1.0+(e/12.0).powf(6.0)))
}

// lumped excitation
fn qexc(e: f64) -> f64 {
    if e <= E_EXC_TH { 0.0 } else {
        (0.034 * (e - E_EXC_TH).powf(1.1) * (1.0 + (e / 15.0).powf(2.8))
        / (1.0 + (e / 23.0).powf(5.5)) + 0.023 * (e - E_EXC_TH) / (1.0 + e / 80.0).powf(1.9))*1.0e-20
    }
}

// ionization
fn qion(e: f64) -> f64 {
    if e <= E_ION_TH { 0.0 } else {
        (970.0 * (e - E_ION_TH) / (70.0 + e).powf(2.0)
        + 0.06 * (e - E_ION_TH).powf(2.0) * (-e / 9.0).exp())*1.0e-20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_respected() {
        let below = ARGON.cross_sections(10.0);
        assert!(below[E_ELA] > 0.0);
        assert_eq!(below[E_EXC], 0.0);
        assert_eq!(below[E_ION], 0.0);

        let above = ARGON.cross_sections(50.0);
        assert!(above[E_EXC] > 0.0);
        assert!(above[E_ION] > 0.0);
    }

    #[test]
    fn ramsauer_minimum_is_present() {
        // the momentum transfer cross section of argon dips near 0.2-0.3 eV
        let low = ARGON.cross_sections(0.25)[E_ELA];
        let high = ARGON.cross_sections(10.0)[E_ELA];
        assert!(low < high);
    }

    #[test]
    fn species_lookup() {
        assert!(species("Ar").is_some());
        assert!(species("argon").is_some());
        assert!(species("co2").is_none());
    }
}
