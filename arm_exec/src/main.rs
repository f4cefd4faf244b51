//! # Arm Control Executable
//!
//! This executable drives the arm from a stream of perception samples:
//! - Reads target samples from a timed script or from stdin (one JSON sample per line)
//! - Maps each sample onto the four joints and applies them with the reach/height coupling
//! - Returns the arm to its rest pose whenever the target is lost

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use color_eyre::{eyre::WrapErr, Report, Result};
use log::{error, info, warn};
use serde::Serialize;
use structopt::StructOpt;

// Internal
use arm_lib::{
    arm_ctrl::{self, ArmCtrl, ArmCtrlError},
    params::ArmExecParams,
    perception::{
        JsonLinesSource, PerceptionError, PerceptionFrame, ScriptedSource, TargetSource,
        ThreadedSource,
    },
    servo_ctrl::{FirmataDriver, ServoDriver, SimDriver},
    target_map::{self, CycleOutput, TargetMapper},
};
use util::{
    archive::Archiver,
    host,
    logger::logger_init,
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "Drive the arm from perception samples")]
struct Opt {
    /// Use the simulated servo driver instead of the serial board
    #[structopt(long)]
    sim: bool,

    /// Replay a timed perception script instead of reading samples from stdin
    #[structopt(long, parse(from_os_str))]
    script: Option<PathBuf>,
}

/// One archived control cycle.
#[derive(Serialize)]
struct CycleRecord {
    time_s: f64,
    tracking: bool,
    base_deg: i32,
    reach_deg: i32,
    height_deg: i32,
    claw_deg: i32,
    writes_issued: usize,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Exec params carry the log levels so are needed before the logger
    let exec_params: ArmExecParams = util::params::load("arm_exec.toml")
        .wrap_err("Could not load exec params")?;

    // Initialise logger
    logger_init(&exec_params.logging, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Control Executable\n");
    info!("Running on: {}", host::get_platform());
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let arm_params: arm_ctrl::Params = util::params::load("arm_ctrl.toml")
        .wrap_err("Could not load arm control params")?;
    let map_params: target_map::Params = util::params::load("target_map.toml")
        .wrap_err("Could not load target mapping params")?;

    info!("Parameters loaded");

    // ---- INTERRUPT HANDLER ----

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })
        .wrap_err("Failed to set the interrupt handler")?;
    }

    // ---- TRANSPORT INITIALISATION ----

    let driver: Box<dyn ServoDriver> = if opt.sim {
        info!("Using the simulated servo driver");
        Box::new(SimDriver::new())
    } else {
        let t = &exec_params.transport;
        let driver = FirmataDriver::open(&t.port, t.baud_rate, t.min_pulse_us, t.max_pulse_us)
            .wrap_err_with(|| format!("Failed to open the servo board on {}", t.port))?;

        info!("Waiting {:.1} s for the board to settle", exec_params.settle_time_s);
        thread::sleep(Duration::from_secs_f64(exec_params.settle_time_s.max(0.0)));

        Box::new(driver)
    };

    // ---- MODULE INITIALISATION ----

    let mut arm = ArmCtrl::new(arm_params, driver)
        .wrap_err("Failed to initialise the arm")?;
    info!("ArmCtrl init complete, arm at rest: {}", arm.commanded());

    let mut mapper = TargetMapper::new(map_params)
        .wrap_err("Failed to initialise the target mapper")?;
    info!("TargetMapper init complete");

    // Sources give up waiting for a frame once the interrupt handler clears `running`
    let mut source: Box<dyn TargetSource> = match opt.script {
        Some(ref path) => Box::new(
            ScriptedSource::new(path)
                .wrap_err_with(|| format!("Failed to load the perception script {:?}", path))?
                .with_running_flag(running.clone()),
        ),
        None => {
            info!("Reading perception samples from stdin");
            Box::new(ThreadedSource::spawn(
                JsonLinesSource::new(io::BufReader::new(io::stdin())),
                running.clone(),
            ))
        }
    };

    let mut archiver = Archiver::from_path(&session, "arm_ctrl/commanded.csv")
        .wrap_err("Failed to create the command archive")?;

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop");

    let mut result = Ok(());

    while running.load(Ordering::SeqCst) {
        let sample = match source.next_frame() {
            Ok(PerceptionFrame::Target(s)) => Some(s),
            Ok(PerceptionFrame::Lost) => None,
            Ok(PerceptionFrame::EndOfStream) => {
                info!("End of perception stream");
                break;
            }
            Ok(PerceptionFrame::Stopped) => break,
            Err(PerceptionError::InvalidSample { line, source: err }) => {
                warn!("Skipping invalid perception sample {:?}: {}", line, err);
                continue;
            }
            Err(e) => {
                error!("Perception source failed: {}", e);
                break;
            }
        };

        let output = match mapper.proc(sample.as_ref(), &mut arm) {
            Ok(o) => o,
            Err(e @ ArmCtrlError::Transport { .. }) => {
                error!("{}", e);
                result = Err(Report::new(e).wrap_err("Lost the servo transport"));
                break;
            }
            Err(e) => {
                warn!("Cycle rejected: {}", e);
                continue;
            }
        };

        let (tracking, report) = match output {
            CycleOutput::Tracking { report, .. } => (true, report),
            CycleOutput::Lost { report } => (false, report),
        };
        let cmd = arm.commanded();

        if let Err(e) = archiver.serialise(CycleRecord {
            time_s: session::get_elapsed_seconds(),
            tracking,
            base_deg: cmd.base_deg,
            reach_deg: cmd.reach_deg,
            height_deg: cmd.height_deg,
            claw_deg: cmd.claw_deg,
            writes_issued: report.writes_issued,
        }) {
            warn!("Could not archive the cycle: {}", e);
        }
    }

    if !running.load(Ordering::SeqCst) {
        info!("Interrupted");
    }

    // ---- SHUTDOWN ----

    info!("Detaching servos");
    arm.close();

    info!("End of execution");

    result
}
