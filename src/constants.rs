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

// physical constants and unit conversions

pub const PI: f64              = std::f64::consts::PI;   // mathematical constant Pi
pub const TWO_PI: f64          = 2.0 * PI;               // two times Pi
pub const E_CHARGE: f64        = 1.60217662e-19;         // electron charge [C]
pub const EV_TO_J: f64         = E_CHARGE;               // eV <-> Joule conversion factor
pub const E_MASS: f64          = 9.10938356e-31;         // mass of electron [kg]
pub const AR_MASS: f64         = 6.63352090e-26;         // mass of argon atom [kg]
pub const K_BOLTZMANN: f64     = 1.38064852e-23;         // Boltzmann's constant [J/K]
pub const TORR_TO_PA: f64      = 133.322368;             // pressure conversion factor

// the transport boundary speaks cm / ns / eV / V/cm, the tracker works in SI

pub const CM_TO_M: f64         = 1.0e-2;
pub const M_TO_CM: f64         = 1.0e2;
pub const NS_TO_S: f64         = 1.0e-9;
pub const S_TO_NS: f64         = 1.0e9;
pub const V_PER_CM_TO_V_PER_M: f64 = 1.0e2;

// argon cross section thresholds

pub const E_EXC_TH: f64        = 11.5;                   // electron impact excitation threshold [eV]
pub const E_ION_TH: f64        = 15.8;                   // electron impact ionization threshold [eV]
pub const DE_CS: f64           = 0.001;                  // energy division in cross section arrays [eV]

/// Permittivity tolerance used to recognise gas regions of a geometry.
pub const GAS_PERMITTIVITY_TOLERANCE: f64 = 1.0e-3;
