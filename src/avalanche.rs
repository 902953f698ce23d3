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

//! The avalanche event loop.
//!
//! Every attempt injects one primary electron at a random lateral position,
//! lets the transport engine develop the cascade and reads back its endpoint
//! records. Cascades with a single endpoint (the primary never multiplied)
//! are rejected and the attempt is repeated; they are never stored and never
//! count towards the requested number of events. A cascade without any
//! endpoint is an engine failure. Accepted cascades are
//! classified as passed when the last enumerated endpoint ends below the
//! readout boundary, and appended to the event sink.

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::{LaunchConfig, SimulationConfig};
use crate::error::{SimulationError, TransportError};
use crate::geometry::Vec3;
use crate::store::EventSink;
use crate::transport::{ElectronEndpoint, PrimaryStart, TransportEngine};

/// One accepted primary injection and its cascade.
#[derive(Clone, Debug, PartialEq)]
pub struct AvalancheEvent {
    pub primary: PrimaryStart,
    /// Electrons reported by the engine (nele).
    pub electron_count: i32,
    pub ion_count: i32,
    /// Endpoint records in engine enumeration order.
    pub endpoints: Vec<ElectronEndpoint>,
}

impl AvalancheEvent {
    /// Number of endpoint records (nelep).
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the last enumerated electron ended below `z_threshold`.
    /// Earlier endpoints are not inspected.
    pub fn passed(&self, z_threshold: f64) -> bool {
        self.endpoints.last().map_or(false, |e| e.z1 < z_threshold)
    }
}

/// Outcome of one attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Candidate {
    Accepted(AvalancheEvent),
    /// The primary produced no secondary electron.
    Rejected { primary: PrimaryStart },
}

#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    pub seed: u64,
    pub launch: LaunchConfig,
    /// Readout boundary [cm].
    pub readout_z: f64,
    pub max_consecutive_rejections: Option<u64>,
}

impl OrchestratorSettings {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            seed: config.run.seed,
            launch: config.launch.clone(),
            readout_z: config.readout.z_threshold,
            max_consecutive_rejections: config.run.max_consecutive_rejections,
        }
    }
}

/// Counters of a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub requested: usize,
    pub accepted: usize,
    pub passed: usize,
    pub rejected: u64,
    /// Engine invocations, accepted plus rejected.
    pub attempts: u64,
}

impl RunSummary {
    /// Fraction of accepted avalanches that passed; undefined without events.
    pub fn transparency(&self) -> Option<f64> {
        if self.accepted == 0 {
            None
        } else {
            Some(self.passed as f64 / self.accepted as f64)
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transparency() {
            Some(t) => write!(f, "Transparency: {}%", t * 100.0),
            None => write!(f, "Transparency: undefined (no accepted avalanches)"),
        }
    }
}

pub struct Orchestrator<E> {
    engine: E,
    settings: OrchestratorSettings,
    rng: ChaCha8Rng,
}

impl<E: TransportEngine> Orchestrator<E> {
    pub fn new(engine: E, settings: OrchestratorSettings) -> Self {
        Self {
            engine,
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            settings,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Random start state: x then y uniform in [-L, L] at the launch height.
    pub fn draw_start(&mut self) -> PrimaryStart {
        let launch = &self.settings.launch;
        let l = launch.lattice_half_width;
        let x = (2.0 * self.rng.gen::<f64>() - 1.0) * l;
        let y = (2.0 * self.rng.gen::<f64>() - 1.0) * l;
        PrimaryStart {
            position: Vec3::new(x, y, launch.height),
            direction: Vec3::from(launch.direction),
            energy: launch.energy,
            time: launch.time,
        }
    }

    /// Runs one attempt.
    pub fn simulate_candidate(&mut self) -> Result<Candidate, TransportError> {
        let primary = self.draw_start();
        self.engine.avalanche_electron(&primary)?;

        let (ne, ni) = self.engine.avalanche_size();
        let np = self.engine.endpoint_count();
        match np {
            0 => return Err(TransportError::Engine("cascade without a primary endpoint".into())),
            1 => return Ok(Candidate::Rejected { primary }),
            _ => {}
        }

        let mut endpoints = Vec::with_capacity(np);
        for j in 0..np {
            let endpoint = self.engine.endpoint(j).ok_or_else(|| {
                TransportError::Engine(format!("endpoint {} of {} is missing", j, np))
            })?;
            endpoints.push(endpoint);
        }

        Ok(Candidate::Accepted(AvalancheEvent {
            primary,
            electron_count: ne,
            ion_count: ni,
            endpoints,
        }))
    }

    pub fn run<S: EventSink>(&mut self, n_events: usize, sink: &mut S) -> Result<RunSummary, SimulationError> {
        self.run_with_progress(n_events, sink, |_, _| {})
    }

    /// Collects `n_events` accepted avalanches into `sink`. `progress` is
    /// called with the number of events done and requested after each
    /// accepted event.
    pub fn run_with_progress<S, F>(
        &mut self,
        n_events: usize,
        sink: &mut S,
        mut progress: F,
    ) -> Result<RunSummary, SimulationError>
    where
        S: EventSink,
        F: FnMut(usize, usize),
    {
        let mut summary = RunSummary { requested: n_events, ..RunSummary::default() };
        let mut consecutive_rejections: u64 = 0;

        while summary.accepted < n_events {
            summary.attempts += 1;
            let event = match self.simulate_candidate()? {
                Candidate::Rejected { primary } => {
                    summary.rejected += 1;
                    consecutive_rejections += 1;
                    trace!(x = primary.position.x, y = primary.position.y, "primary did not multiply");
                    if let Some(limit) = self.settings.max_consecutive_rejections {
                        if consecutive_rejections >= limit {
                            return Err(SimulationError::RejectionLimit { rejections: consecutive_rejections });
                        }
                    }
                    continue;
                }
                Candidate::Accepted(event) => event,
            };
            consecutive_rejections = 0;

            let passed = event.passed(self.settings.readout_z);
            if passed {
                summary.passed += 1;
            }
            sink.append(&event)?;
            debug!(
                event = summary.accepted,
                nele = event.electron_count,
                nelep = event.endpoint_count(),
                passed,
                "avalanche stored"
            );
            summary.accepted += 1;
            progress(summary.accepted, n_events);
        }

        info!(
            accepted = summary.accepted,
            passed = summary.passed,
            rejected = summary.rejected,
            attempts = summary.attempts,
            "event loop finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventRow;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    // engine that replays scripted cascades; each cascade is a list of
    // terminal z positions
    struct Scripted {
        cascades: VecDeque<Vec<f64>>,
        current: Vec<f64>,
        starts: Vec<PrimaryStart>,
    }

    impl Scripted {
        fn new(cascades: Vec<Vec<f64>>) -> Self {
            Self { cascades: cascades.into(), current: Vec::new(), starts: Vec::new() }
        }
    }

    impl TransportEngine for Scripted {
        fn avalanche_electron(&mut self, start: &PrimaryStart) -> Result<(), TransportError> {
            self.starts.push(*start);
            self.current = self
                .cascades
                .pop_front()
                .ok_or_else(|| TransportError::Engine("script exhausted".into()))?;
            Ok(())
        }

        fn avalanche_size(&self) -> (i32, i32) {
            (self.current.len() as i32, self.current.len() as i32 - 1)
        }

        fn endpoint_count(&self) -> usize {
            self.current.len()
        }

        fn endpoint(&self, index: usize) -> Option<ElectronEndpoint> {
            self.current.get(index).map(|&z1| ElectronEndpoint {
                x0: 0.0,
                y0: 0.0,
                z0: 0.01,
                e0: 1.0,
                t0: 0.0,
                x1: 0.0,
                y1: 0.0,
                z1,
                e1: 0.5,
                t1: 10.0,
                status: -1,
            })
        }
    }

    fn settings() -> OrchestratorSettings {
        OrchestratorSettings::from_config(&SimulationConfig::default())
    }

    #[test]
    fn single_endpoint_cascades_are_retried() {
        let engine = Scripted::new(vec![
            vec![0.0],
            vec![0.0],
            vec![0.0],
            vec![-0.018, 0.0, 0.001, -0.0175, -0.02],
        ]);
        let mut orchestrator = Orchestrator::new(engine, settings());
        let mut rows: Vec<EventRow> = Vec::new();
        let summary = orchestrator.run(1, &mut rows).unwrap();

        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.rejected, 3);
        assert_eq!(summary.attempts, 4);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].nelep, 5);
        assert_eq!(rows[0].z1.len(), 5);
        assert_eq!(orchestrator.engine().starts.len(), 4);
    }

    #[test]
    fn only_the_last_endpoint_decides_passing() {
        let engine = Scripted::new(vec![
            vec![0.0, -0.02],  // last below threshold
            vec![-0.02, 0.0],  // earlier below, last above
        ]);
        let mut orchestrator = Orchestrator::new(engine, settings());
        let mut rows: Vec<EventRow> = Vec::new();
        let summary = orchestrator.run(2, &mut rows).unwrap();
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.transparency(), Some(0.5));
        assert_eq!(summary.to_string(), "Transparency: 50%");
    }

    #[test]
    fn zero_events_give_undefined_transparency() {
        let mut orchestrator = Orchestrator::new(Scripted::new(vec![]), settings());
        let mut rows: Vec<EventRow> = Vec::new();
        let summary = orchestrator.run(0, &mut rows).unwrap();
        assert!(rows.is_empty());
        assert_eq!(summary.attempts, 0);
        assert_eq!(summary.transparency(), None);
        assert!(summary.to_string().contains("undefined"));
    }

    #[test]
    fn engine_errors_are_fatal() {
        let mut orchestrator = Orchestrator::new(Scripted::new(vec![vec![0.0, 0.0]]), settings());
        let mut rows: Vec<EventRow> = Vec::new();
        let err = orchestrator.run(2, &mut rows).unwrap_err();
        assert!(matches!(err, SimulationError::Transport(_)));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn cascades_without_endpoints_are_fatal() {
        let mut orchestrator = Orchestrator::new(Scripted::new(vec![vec![]]), settings());
        let mut rows: Vec<EventRow> = Vec::new();
        let err = orchestrator.run(1, &mut rows).unwrap_err();
        assert!(matches!(err, SimulationError::Transport(TransportError::Engine(_))));
        assert!(rows.is_empty());
    }

    #[test]
    fn stored_rows_always_hold_several_endpoints() {
        let engine = Scripted::new(vec![vec![0.0], vec![0.0, -0.02], vec![0.0], vec![0.0], vec![0.0, 0.0, 0.0]]);
        let mut orchestrator = Orchestrator::new(engine, settings());
        let mut rows: Vec<EventRow> = Vec::new();
        orchestrator.run(2, &mut rows).unwrap();
        assert!(rows.iter().all(|r| r.nelep > 1 && r.z1.len() == r.nelep as usize));
    }

    #[test]
    fn rejection_cap_stops_the_run() {
        let mut settings = settings();
        settings.max_consecutive_rejections = Some(2);
        let engine = Scripted::new(vec![vec![0.0], vec![0.0], vec![0.0, 0.0]]);
        let mut orchestrator = Orchestrator::new(engine, settings);
        let mut rows: Vec<EventRow> = Vec::new();
        let err = orchestrator.run(1, &mut rows).unwrap_err();
        assert!(matches!(err, SimulationError::RejectionLimit { rejections: 2 }));
    }

    #[test]
    fn rejections_reset_the_cap() {
        let mut settings = settings();
        settings.max_consecutive_rejections = Some(2);
        let engine = Scripted::new(vec![
            vec![0.0],
            vec![0.0, 0.0],
            vec![0.0],
            vec![0.0, 0.0],
        ]);
        let mut orchestrator = Orchestrator::new(engine, settings);
        let mut rows: Vec<EventRow> = Vec::new();
        let summary = orchestrator.run(2, &mut rows).unwrap();
        assert_eq!(summary.rejected, 2);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn start_state_follows_launch_settings() {
        let engine = Scripted::new(vec![]);
        let mut orchestrator = Orchestrator::new(engine, settings());
        let l = orchestrator.settings.launch.lattice_half_width;
        for _ in 0..1000 {
            let s = orchestrator.draw_start();
            assert!(s.position.x >= -l && s.position.x <= l);
            assert!(s.position.y >= -l && s.position.y <= l);
            assert_eq!(s.position.z, 0.01);
            assert_eq!(s.direction, Vec3::new(0.0, 0.0, -1.0));
            assert_eq!(s.energy, 1.0);
            assert_eq!(s.time, 0.0);
        }
    }

    // Kolmogorov-Smirnov distance of the samples against U(-L, L)
    fn ks_distance(mut values: Vec<f64>, l: f64) -> f64 {
        values.sort_by(|a, b| a.total_cmp(b));
        let n = values.len() as f64;
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let cdf = (v + l) / (2.0 * l);
                let lo = i as f64 / n;
                let hi = (i + 1) as f64 / n;
                (cdf - lo).abs().max((hi - cdf).abs())
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn start_positions_cover_the_cell_uniformly() {
        let mut orchestrator = Orchestrator::new(Scripted::new(vec![]), settings());
        let l = orchestrator.settings.launch.lattice_half_width;
        let n = 20_000;
        let (xs, ys): (Vec<f64>, Vec<f64>) = (0..n)
            .map(|_| {
                let p = orchestrator.draw_start().position;
                (p.x, p.y)
            })
            .unzip();
        let critical = 1.63 / (n as f64).sqrt();
        let dx = ks_distance(xs, l);
        let dy = ks_distance(ys, l);
        assert!(dx < critical, "KS distance along x {}", dx);
        assert!(dy < critical, "KS distance along y {}", dy);
    }

    proptest! {
        #[test]
        fn draws_stay_inside_the_lattice(seed in any::<u64>(), l in 1e-5f64..1.0) {
            let mut s = settings();
            s.seed = seed;
            s.launch.lattice_half_width = l;
            let mut orchestrator = Orchestrator::new(Scripted::new(vec![]), s);
            for _ in 0..64 {
                let p = orchestrator.draw_start().position;
                prop_assert!(p.x >= -l && p.x <= l);
                prop_assert!(p.y >= -l && p.y <= l);
            }
        }

        #[test]
        fn same_seed_same_starts(seed in any::<u64>()) {
            let mut s = settings();
            s.seed = seed;
            let mut a = Orchestrator::new(Scripted::new(vec![]), s.clone());
            let mut b = Orchestrator::new(Scripted::new(vec![]), s);
            for _ in 0..16 {
                prop_assert_eq!(a.draw_start(), b.draw_start());
            }
        }
    }

    #[test]
    fn progress_reports_every_accepted_event() {
        let engine = Scripted::new(vec![vec![0.0, 0.0], vec![0.0], vec![0.0, 0.0]]);
        let mut orchestrator = Orchestrator::new(engine, settings());
        let mut rows: Vec<EventRow> = Vec::new();
        let mut seen = Vec::new();
        orchestrator
            .run_with_progress(2, &mut rows, |done, total| seen.push((done, total)))
            .unwrap();
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }
}
