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

//! Collision-by-collision electron tracking with ionization multiplication.
//!
//! Free flights are sampled with the null-collision method against the
//! maximum collision rate of the medium; the field is taken as constant over a
//! flight. Collisions are elastic, excitation or ionization, with the
//! scattering kinematics of a cold gas. In an ionization the available energy
//! is shared between the two electrons following Opal's formula and the
//! secondary is pushed onto the stack. Once the avalanche holds as many
//! electrons as the size limit allows, tracking stops: the current electron
//! and every electron still waiting on the stack are reported as alive at
//! their present state.

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp1;
use tracing::{debug, trace};

use super::{status, DriftObserver, ElectronEndpoint, PrimaryStart, TransportEngine};
use crate::constants::*;
use crate::error::TransportError;
use crate::geometry::Vec3;
use crate::medium::Medium;
use crate::sensor::{FieldQuery, Sensor};

/// Settings of the tracker.
#[derive(Clone, Copy, Debug)]
pub struct TrackerSettings {
    pub avalanche_size_limit: usize,
    pub collision_steps: u32,
    pub max_collisions: u64,
    pub seed: u64,
}

// electron on the stack, SI units
#[derive(Clone, Copy, Debug)]
struct Electron {
    id: usize,
    start: Vec3,             // [m]
    start_time: f64,         // [s]
    start_energy: f64,       // [eV]
    position: Vec3,          // [m]
    velocity: Vec3,          // [m/s]
    time: f64,               // [s]
}

impl Electron {
    fn new(id: usize, position: Vec3, velocity: Vec3, time: f64) -> Self {
        Self {
            id,
            start: position,
            start_time: time,
            start_energy: kinetic_energy(velocity),
            position,
            velocity,
            time,
        }
    }

    fn endpoint(&self, status: i32) -> ElectronEndpoint {
        ElectronEndpoint {
            x0: self.start.x * M_TO_CM,
            y0: self.start.y * M_TO_CM,
            z0: self.start.z * M_TO_CM,
            e0: self.start_energy,
            t0: self.start_time * S_TO_NS,
            x1: self.position.x * M_TO_CM,
            y1: self.position.y * M_TO_CM,
            z1: self.position.z * M_TO_CM,
            e1: kinetic_energy(self.velocity),
            t1: self.time * S_TO_NS,
            status,
        }
    }
}

// kinetic energy [eV] of an electron moving with `v` [m/s]
fn kinetic_energy(v: Vec3) -> f64 {
    0.5 * E_MASS * v.dot(v) / EV_TO_J
}

fn speed_from_energy(energy: f64) -> f64 {
    (2.0 * energy.max(0.0) * EV_TO_J / E_MASS).sqrt()
}

enum Process {
    Elastic,
    Excitation,
    Ionization,
}

/// Built-in microscopic avalanche tracker.
pub struct MicroscopicAvalanche {
    sensor: Sensor,
    settings: TrackerSettings,
    rng: ChaCha8Rng,
    stack: Vec<Electron>,
    endpoints: Vec<ElectronEndpoint>,
    n_electrons: usize,
    n_ions: usize,
    truncated: bool,
    observer: Option<Box<dyn DriftObserver>>,
}

impl fmt::Debug for MicroscopicAvalanche {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicroscopicAvalanche")
            .field("sensor", &self.sensor)
            .field("settings", &self.settings)
            .field("electrons", &self.n_electrons)
            .field("ions", &self.n_ions)
            .field("endpoints", &self.endpoints.len())
            .field("plotting", &self.observer.is_some())
            .finish()
    }
}

impl MicroscopicAvalanche {
    pub fn new(sensor: Sensor, settings: TrackerSettings) -> Self {
        Self {
            sensor,
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            settings,
            stack: Vec::new(),
            endpoints: Vec::new(),
            n_electrons: 0,
            n_ions: 0,
            truncated: false,
            observer: None,
        }
    }

    pub fn sensor(&self) -> &Sensor {
        &self.sensor
    }

    pub fn enable_plotting(&mut self, observer: Box<dyn DriftObserver>) {
        self.observer = Some(observer);
    }

    pub fn take_observer(&mut self) -> Option<Box<dyn DriftObserver>> {
        self.observer.take()
    }

    // follow one electron until it leaves the drift medium, leaves the area or
    // is abandoned
    fn transport(&mut self, mut electron: Electron) -> ElectronEndpoint {
        let sensor = &self.sensor;
        let rng = &mut self.rng;
        let settings = self.settings;

        let mut query = sensor.electric_field(electron.position * M_TO_CM);
        let mut collisions: u64 = 0;
        let status = loop {
            let (field, medium) = match query {
                FieldQuery::Drift { field, medium } => (field, medium),
                FieldQuery::OutsideArea => break status::LEFT_DRIFT_AREA,
                FieldQuery::OutsideMedium { .. } => break status::LEFT_DRIFT_MEDIUM,
            };

            // free flight in a constant field
            let accel = field * (-E_CHARGE / E_MASS * V_PER_CM_TO_V_PER_M);
            let nu_max = medium.max_collision_rate();
            let dt: f64 = rng.sample::<f64, _>(Exp1) / nu_max;
            electron.position = electron.position + electron.velocity * dt + accel * (0.5 * dt * dt);
            electron.velocity = electron.velocity + accel * dt;
            electron.time += dt;

            query = sensor.electric_field(electron.position * M_TO_CM);
            let medium = match query {
                FieldQuery::Drift { medium, .. } => medium,
                _ => continue,
            };

            let energy = kinetic_energy(electron.velocity);
            let rates = medium.collision_rates(energy);
            let r = rng.gen::<f64>() * nu_max;
            if r >= rates.total() {
                continue; // null collision
            }
            let process = if r < rates.elastic {
                Process::Elastic
            } else if r < rates.elastic + rates.excitation {
                Process::Excitation
            } else {
                Process::Ionization
            };

            let secondary = collide(&mut electron, medium, process, rng);
            if let Some((velocity, energy)) = secondary {
                if self.n_electrons < settings.avalanche_size_limit {
                    let id = self.n_electrons;
                    self.n_electrons += 1;
                    self.n_ions += 1;
                    let mut created = Electron::new(id, electron.position, velocity, electron.time);
                    created.start_energy = energy;
                    self.stack.push(created);
                    trace!(id, energy, "secondary electron");
                }
                if self.n_electrons >= settings.avalanche_size_limit {
                    self.truncated = true;
                    break status::ALIVE;
                }
            }

            collisions += 1;
            if let Some(observer) = self.observer.as_mut() {
                if collisions % u64::from(settings.collision_steps.max(1)) == 0 {
                    observer.point(electron.id, electron.position * M_TO_CM, electron.time * S_TO_NS);
                }
            }
            if collisions >= settings.max_collisions {
                debug!(id = electron.id, collisions, "electron abandoned");
                break status::CALCULATION_ABANDONED;
            }
        };

        if let Some(observer) = self.observer.as_mut() {
            observer.point(electron.id, electron.position * M_TO_CM, electron.time * S_TO_NS);
        }
        electron.endpoint(status)
    }
}

// Scatters `electron` and returns the velocity and energy of the secondary
// electron in case of an ionization.
fn collide(
    electron: &mut Electron,
    medium: &dyn Medium,
    process: Process,
    rng: &mut ChaCha8Rng,
) -> Option<(Vec3, f64)> {
    let target_mass = medium.target_mass();
    let f1 = E_MASS / (E_MASS + target_mass);
    let f2 = target_mass / (E_MASS + target_mass);

    let mut gx = electron.velocity.x;   // relative velocity in cold gas approximation
    let mut gy = electron.velocity.y;
    let mut gz = electron.velocity.z;
    let mut g = (gx * gx + gy * gy + gz * gz).sqrt();
    let wx = f1 * gx;
    let wy = f1 * gy;
    let wz = f1 * gz;

    // find Euler angles:
    let theta = if gx == 0.0 { 0.5 * PI } else { ((gy * gy + gz * gz).sqrt()).atan2(gx) };
    let phi = if gy == 0.0 {
        if gz > 0.0 { 0.5 * PI } else { -0.5 * PI }
    } else {
        gz.atan2(gy)
    };
    let st = theta.sin();
    let ct = theta.cos();
    let sp = phi.sin();
    let cp = phi.cos();

    let chi: f64;
    let eta: f64;
    let mut secondary = None;

    match process {
        Process::Elastic => {
            chi = (1.0 - 2.0 * rng.gen::<f64>()).acos();              // isotropic scattering
            eta = TWO_PI * rng.gen::<f64>();                          // azimuthal angle
        }
        Process::Excitation => {
            let mut energy = 0.5 * E_MASS * g * g;                     // electron energy
            energy = (energy - medium.excitation_threshold() * EV_TO_J).abs(); // subtract energy loss for excitation
            g = (2.0 * energy / E_MASS).sqrt();                        // relative velocity after energy loss
            chi = (1.0 - 2.0 * rng.gen::<f64>()).acos();
            eta = TWO_PI * rng.gen::<f64>();
        }
        Process::Ionization => {
            let mut energy = 0.5 * E_MASS * g * g;
            energy = (energy - medium.ionization_threshold() * EV_TO_J).abs();
            // share energy according to Opal et al., J. Chem. Phys. 55, 4100 (1971)
            let e_new = 10.0 * (rng.gen::<f64>() * (energy / EV_TO_J / 20.0).atan()).tan() * EV_TO_J;
            let e_orig = (energy - e_new).abs();
            g = (2.0 * e_orig / E_MASS).sqrt();                        // relative velocity of incoming electron
            let g_new = (2.0 * e_new / E_MASS).sqrt();                 // relative velocity of emitted electron
            chi = if energy > 0.0 { (e_orig / energy).sqrt().acos() } else { 0.0 };
            let chi_new = if energy > 0.0 { (e_new / energy).sqrt().acos() } else { 0.0 };
            eta = TWO_PI * rng.gen::<f64>();
            let eta_new = eta + PI;
            let (sc, cc, se, ce) = (chi_new.sin(), chi_new.cos(), eta_new.sin(), eta_new.cos());
            let nx = g_new * (ct * cc - st * sc * ce);
            let ny = g_new * (st * cp * cc + ct * cp * sc * ce - sp * sc * se);
            let nz = g_new * (st * sp * cc + ct * sp * sc * ce + cp * sc * se);
            let velocity = Vec3::new(wx + f2 * nx, wy + f2 * ny, wz + f2 * nz);
            secondary = Some((velocity, kinetic_energy(velocity)));
        }
    }

    // scatter the incoming electron
    let (sc, cc, se, ce) = (chi.sin(), chi.cos(), eta.sin(), eta.cos());
    gx = g * (ct * cc - st * sc * ce);
    gy = g * (st * cp * cc + ct * cp * sc * ce - sp * sc * se);
    gz = g * (st * sp * cc + ct * sp * sc * ce + cp * sc * se);
    electron.velocity = Vec3::new(wx + f2 * gx, wy + f2 * gy, wz + f2 * gz);

    secondary
}

impl TransportEngine for MicroscopicAvalanche {
    fn avalanche_electron(&mut self, start: &PrimaryStart) -> Result<(), TransportError> {
        let direction = start
            .direction
            .normalized()
            .ok_or_else(|| TransportError::InvalidStart(format!("direction {:?}", start.direction)))?;
        if !(start.energy >= 0.0) || !start.position.is_finite() || !start.time.is_finite() {
            return Err(TransportError::InvalidStart(format!("{:?}", start)));
        }
        if !matches!(self.sensor.electric_field(start.position), FieldQuery::Drift { .. }) {
            return Err(TransportError::StartOutsideDriftMedium {
                x: start.position.x,
                y: start.position.y,
                z: start.position.z,
            });
        }

        self.endpoints.clear();
        self.stack.clear();
        self.n_electrons = 1;
        self.n_ions = 0;
        self.truncated = false;
        if let Some(observer) = self.observer.as_mut() {
            observer.new_avalanche();
        }

        let velocity = direction * speed_from_energy(start.energy);
        let mut primary = Electron::new(0, start.position * CM_TO_M, velocity, start.time * NS_TO_S);
        primary.start_energy = start.energy;
        self.stack.push(primary);

        while let Some(electron) = self.stack.pop() {
            if let Some(observer) = self.observer.as_mut() {
                observer.point(electron.id, electron.position * M_TO_CM, electron.time * S_TO_NS);
            }
            let endpoint = self.transport(electron);
            self.endpoints.push(endpoint);
            if self.truncated {
                break;
            }
        }
        if self.truncated {
            debug!(limit = self.settings.avalanche_size_limit, waiting = self.stack.len(), "avalanche size limit reached");
            while let Some(electron) = self.stack.pop() {
                self.endpoints.push(electron.endpoint(status::ALIVE));
            }
        }
        debug!(
            electrons = self.n_electrons,
            ions = self.n_ions,
            endpoints = self.endpoints.len(),
            "avalanche finished"
        );
        Ok(())
    }

    fn avalanche_size(&self) -> (i32, i32) {
        (self.n_electrons as i32, self.n_ions as i32)
    }

    fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    fn endpoint(&self, index: usize) -> Option<ElectronEndpoint> {
        self.endpoints.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::{GasComponent, GasConfig};
    use crate::field::{assign_gas_medium, FieldProvider, LayeredCell};
    use crate::geometry::{Axis, SimulationVolume};
    use crate::medium::GasMixture;

    // short gap with a strong field so that tracks stay cheap
    const GAP: &str = r#"
unit: cm
half_width: 0.01
materials:
  - permittivity: 1.0
  - permittivity: 4.4
layers:
  - name: collection
    z_min: -0.003
    z_max: 0.0
    field: [0.0, 0.0, 5000.0]
    material: 0
  - name: gain
    z_min: 0.0
    z_max: 0.003
    field: [0.0, 0.0, 60000.0]
    material: 0
  - name: cover
    z_min: 0.003
    z_max: 0.004
    field: [0.0, 0.0, 0.0]
    material: 1
"#;

    fn tracker(size_limit: usize, seed: u64) -> MicroscopicAvalanche {
        let mut cell = LayeredCell::from_yaml(GAP).unwrap();
        cell.enable_periodicity(Axis::X);
        cell.enable_periodicity(Axis::Y);
        let gas = GasMixture::initialise(&GasConfig {
            temperature: 293.15,
            pressure: 750.0,
            composition: vec![GasComponent { name: "ar".into(), fraction: 100.0 }],
            max_electron_energy: 200.0,
        })
        .unwrap();
        assign_gas_medium(&mut cell, Arc::new(gas), GAS_PERMITTIVITY_TOLERANCE).unwrap();
        let volume = SimulationVolume::new(
            Vec3::new(-0.01, -0.01, -0.003),
            Vec3::new(0.01, 0.01, 0.004),
        )
        .unwrap();
        let mut sensor = Sensor::new(volume);
        sensor.add_component(Box::new(cell));
        MicroscopicAvalanche::new(
            sensor,
            TrackerSettings {
                avalanche_size_limit: size_limit,
                collision_steps: 1,
                max_collisions: 200_000,
                seed,
            },
        )
    }

    fn start() -> PrimaryStart {
        PrimaryStart {
            position: Vec3::new(0.0, 0.0, 0.0025),
            direction: Vec3::new(0.0, 0.0, -1.0),
            energy: 1.0,
            time: 0.0,
        }
    }

    #[test]
    fn size_limit_bounds_the_cascade() {
        let mut engine = tracker(4, 1);
        for _ in 0..3 {
            engine.avalanche_electron(&start()).unwrap();
            let (ne, ni) = engine.avalanche_size();
            assert!(ne >= 1 && ne <= 4);
            assert_eq!(ni, ne - 1);
            assert_eq!(engine.endpoint_count(), ne as usize);
        }
    }

    #[test]
    fn reaching_the_size_limit_stops_the_cascade() {
        let mut truncated = 0;
        for seed in 0..20 {
            let mut engine = tracker(2, seed);
            engine.avalanche_electron(&start()).unwrap();
            let (ne, _) = engine.avalanche_size();
            let n = engine.endpoint_count();
            assert_eq!(n, ne as usize);
            let last = engine.endpoint(n - 1).unwrap();
            if ne == 2 {
                truncated += 1;
                // the secondary created at the limit is never tracked
                assert_eq!(last.status, status::ALIVE);
                assert_eq!((last.x0, last.y0, last.z0), (last.x1, last.y1, last.z1));
            } else {
                assert_ne!(last.status, status::ALIVE);
            }
        }
        assert!(truncated > 0);
    }

    #[test]
    fn size_limit_of_one_allows_no_secondaries() {
        let mut engine = tracker(1, 4);
        for _ in 0..3 {
            engine.avalanche_electron(&start()).unwrap();
            assert_eq!(engine.avalanche_size(), (1, 0));
            assert_eq!(engine.endpoint_count(), 1);
        }
    }

    #[test]
    fn tracker_debug_omits_the_observer() {
        let text = format!("{:?}", tracker(3, 1));
        assert!(text.contains("MicroscopicAvalanche"));
        assert!(text.contains("plotting: false"));
    }

    #[test]
    fn endpoints_start_at_the_primary() {
        let mut engine = tracker(4, 2);
        engine.avalanche_electron(&start()).unwrap();
        let primary_end = (0..engine.endpoint_count())
            .filter_map(|i| engine.endpoint(i))
            .find(|e| (e.z0 - 0.0025).abs() < 1e-12 && e.t0 == 0.0)
            .unwrap();
        assert!((primary_end.e0 - 1.0).abs() < 1e-9);
        assert!(primary_end.t1 > 0.0);
        for i in 0..engine.endpoint_count() {
            let e = engine.endpoint(i).unwrap();
            assert!(e.t1 >= e.t0);
            assert!(matches!(
                e.status,
                status::ALIVE
                    | status::LEFT_DRIFT_AREA
                    | status::LEFT_DRIFT_MEDIUM
                    | status::CALCULATION_ABANDONED
            ));
        }
        assert!(engine.endpoint(engine.endpoint_count()).is_none());
    }

    #[test]
    fn same_seed_same_cascade() {
        let mut a = tracker(6, 9);
        let mut b = tracker(6, 9);
        a.avalanche_electron(&start()).unwrap();
        b.avalanche_electron(&start()).unwrap();
        assert_eq!(a.avalanche_size(), b.avalanche_size());
        let ea: Vec<_> = (0..a.endpoint_count()).filter_map(|i| a.endpoint(i)).collect();
        let eb: Vec<_> = (0..b.endpoint_count()).filter_map(|i| b.endpoint(i)).collect();
        assert_eq!(ea, eb);
    }

    #[test]
    fn start_in_solid_is_an_error() {
        let mut engine = tracker(4, 3);
        let mut s = start();
        s.position.z = 0.0035;
        assert!(matches!(
            engine.avalanche_electron(&s),
            Err(TransportError::StartOutsideDriftMedium { .. })
        ));
    }

    #[test]
    fn zero_direction_is_an_error() {
        let mut engine = tracker(4, 3);
        let mut s = start();
        s.direction = Vec3::ZERO;
        assert!(matches!(engine.avalanche_electron(&s), Err(TransportError::InvalidStart(_))));
    }

    #[test]
    fn elastic_collision_conserves_speed_closely() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let gas = GasMixture::initialise(&GasConfig {
            temperature: 293.15,
            pressure: 750.0,
            composition: vec![GasComponent { name: "ar".into(), fraction: 1.0 }],
            max_electron_energy: 200.0,
        })
        .unwrap();
        let v = Vec3::new(1.0e6, 2.0e5, -3.0e5);
        let mut electron = Electron::new(0, Vec3::ZERO, v, 0.0);
        let before = kinetic_energy(electron.velocity);
        assert!(collide(&mut electron, &gas, Process::Elastic, &mut rng).is_none());
        let after = kinetic_energy(electron.velocity);
        // recoil loss is at most 4 m / M of the energy
        assert!(after <= before * (1.0 + 1e-9));
        assert!(after >= before * (1.0 - 4.0 * E_MASS / AR_MASS) * (1.0 - 1e-9));
    }

    #[test]
    fn ionization_shares_the_excess_energy() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let gas = GasMixture::initialise(&GasConfig {
            temperature: 293.15,
            pressure: 750.0,
            composition: vec![GasComponent { name: "ar".into(), fraction: 1.0 }],
            max_electron_energy: 200.0,
        })
        .unwrap();
        let v = Vec3::new(0.0, 0.0, -speed_from_energy(60.0));
        let mut electron = Electron::new(0, Vec3::ZERO, v, 0.0);
        let (_, e_new) = collide(&mut electron, &gas, Process::Ionization, &mut rng).unwrap();
        let e_orig = kinetic_energy(electron.velocity);
        let excess = 60.0 - E_ION_TH;
        assert!(e_new <= 0.5 * excess * 1.01);
        assert!((e_new + e_orig - excess).abs() < 0.01 * excess);
    }
}
