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

use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info, warn};
use validator::Validate;

use lemsim::cli::Cli;
use lemsim::config::SimulationConfig;
use lemsim::error::{ConfigError, SimulationError};
use lemsim::setup::build_engine;
use lemsim::store::TreeWriter;
use lemsim::telemetry::init_logging;
use lemsim::transport::DriftObserver;
use lemsim::{Orchestrator, OrchestratorSettings, RunSummary};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging("info");

    match run(&cli) {
        Ok(_) => {
            println!("Done.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "simulation aborted");
            eprintln!(">> lemsim: ERROR = {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary, SimulationError> {
    let mut config = SimulationConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate().map_err(ConfigError::from)?;
    info!(
        events = config.run.events,
        seed = config.run.seed,
        output = %config.run.output.display(),
        "configuration loaded"
    );

    let engine = build_engine(&config)?;
    let mut store = TreeWriter::create(&config.run.output, &config.run.tree_name, &config.run.tree_title)?;
    let mut orchestrator = Orchestrator::new(engine, OrchestratorSettings::from_config(&config));

    let started = Instant::now();
    let quiet = cli.quiet;
    let mut last_percent = None;
    let summary = orchestrator.run_with_progress(config.run.events, &mut store, |done, total| {
        let percent = done * 100 / total;
        if !quiet && last_percent != Some(percent) {
            last_percent = Some(percent);
            eprint!("\r {:3}%", percent);
            let _ = std::io::stderr().flush();
        }
    })?;
    if !quiet && summary.accepted > 0 {
        eprintln!();
    }
    info!(elapsed = ?started.elapsed(), "simulation finished");

    println!("{}", summary);
    store.close()?;

    if let Some(mut observer) = orchestrator.engine_mut().take_observer() {
        if let Err(source) = DriftObserver::finish(observer.as_mut()) {
            let path = config.visualization.drift_lines.clone().unwrap_or_default();
            warn!(path = %path.display(), error = %source, "drift lines incomplete");
            return Err(SimulationError::DriftLines { path, source });
        }
    }
    Ok(summary)
}
