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

use std::path::{Path, PathBuf};
use std::process::Command;

use lemsim::config::SimulationConfig;
use lemsim::error::{SetupError, SimulationError};
use lemsim::setup::build_engine;
use lemsim::{EventRow, Orchestrator, OrchestratorSettings, RunSummary, TreeReader, TreeWriter};
use tempfile::TempDir;

fn bundled_cell() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("geometry").join("cell.yaml")
}

fn small_config(output: PathBuf, events: usize) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.geometry.cell = bundled_cell();
    config.run.events = events;
    config.run.output = output;
    config.transport.avalanche_size_limit = 4;
    config
}

fn simulate(config: &SimulationConfig) -> Result<RunSummary, SimulationError> {
    let engine = build_engine(config)?;
    let mut store = TreeWriter::create(&config.run.output, &config.run.tree_name, &config.run.tree_title)?;
    let mut orchestrator = Orchestrator::new(engine, OrchestratorSettings::from_config(config));
    let summary = orchestrator.run(config.run.events, &mut store)?;
    store.close()?;
    Ok(summary)
}

#[test]
fn accepted_avalanches_are_stored() {
    let dir = TempDir::new().unwrap();
    let config = small_config(dir.path().join("run.tree"), 4);
    let summary = simulate(&config).unwrap();
    assert_eq!(summary.accepted, 4);
    assert_eq!(summary.attempts, summary.rejected + 4);

    let rows: Vec<EventRow> = TreeReader::open(&config.run.output).unwrap().read_all().unwrap();
    assert_eq!(rows.len(), 4);
    let mut passed = 0;
    for row in &rows {
        let n = row.nelep as usize;
        assert!(n >= 2);
        assert!(row.nele as usize <= config.transport.avalanche_size_limit);
        for column in [&row.x0, &row.y0, &row.z0, &row.e0, &row.t0, &row.x1, &row.y1, &row.z1, &row.e1, &row.t1] {
            assert_eq!(column.len(), n);
        }
        assert_eq!(row.status.len(), n);
        // every cascade is seeded by the primary drawn at the launch height
        assert!((row.z0[0] - config.launch.height).abs() < 1e-12);
        assert!(row.x0[0].abs() <= config.launch.lattice_half_width * (1.0 + 1e-12));
        if row.z1[n - 1] < config.readout.z_threshold {
            passed += 1;
        }
    }
    assert_eq!(summary.passed, passed);
}

#[test]
fn identical_seeds_give_identical_stores() {
    let dir = TempDir::new().unwrap();
    let a = small_config(dir.path().join("a.tree"), 3);
    let b = small_config(dir.path().join("b.tree"), 3);
    simulate(&a).unwrap();
    simulate(&b).unwrap();
    assert_eq!(std::fs::read(&a.run.output).unwrap(), std::fs::read(&b.run.output).unwrap());
}

#[test]
fn zero_events_leave_a_valid_empty_store() {
    let dir = TempDir::new().unwrap();
    let config = small_config(dir.path().join("empty.tree"), 0);
    let summary = simulate(&config).unwrap();
    assert_eq!(summary.transparency(), None);
    let reader = TreeReader::open(&config.run.output).unwrap();
    assert_eq!(reader.header().name, "avalancheTree");
    assert!(reader.read_all().unwrap().is_empty());
}

#[test]
fn missing_cell_aborts_before_the_loop() {
    let dir = TempDir::new().unwrap();
    let mut config = small_config(dir.path().join("never.tree"), 1);
    config.geometry.cell = dir.path().join("nope.yaml");
    let err = simulate(&config).unwrap_err();
    assert!(matches!(err, SimulationError::Setup(SetupError::CellIo { .. })));
    assert!(!config.run.output.exists());
}

#[test]
fn binary_reports_transparency() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("lemsim.yaml");
    std::fs::write(
        &config_path,
        format!(
            "geometry:\n  cell: {}\ntransport:\n  avalanche_size_limit: 4\n",
            bundled_cell().display()
        ),
    )
    .unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_lemsim"))
        .arg("--config")
        .arg(&config_path)
        .args(["--events", "2", "--quiet", "--output"])
        .arg(dir.path().join("cli.tree"))
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Transparency: "));
    assert!(stdout.trim_end().ends_with("Done."));
    assert_eq!(TreeReader::open(&dir.path().join("cli.tree")).unwrap().read_all().unwrap().len(), 2);
}

#[test]
fn binary_fails_on_missing_configuration() {
    let output = Command::new(env!("CARGO_BIN_EXE_lemsim"))
        .args(["--config", "/nonexistent/lemsim.yaml"])
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Done."));
}
