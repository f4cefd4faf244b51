//! # Arm Console
//!
//! Manual control of the arm from a terminal. Angles typed at the prompt go through the same
//! coupling and limit checks as the perception loop, and the committed angles are printed back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use structopt::StructOpt;

// Internal
use arm_lib::{
    arm_ctrl::{self, ArmCtrl, ArmCtrlError},
    console::{ConsoleCmd, HELP},
    params::ArmExecParams,
    servo_ctrl::{FirmataDriver, ServoDriver, SimDriver},
};
use comms_if::eqpt::arm::JointId;
use util::{
    logger::{logger_init, LogLevel, LoggerParams},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "arm $ ";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "arm_console", about = "Manually command the arm joints")]
struct Opt {
    /// Use the simulated servo driver instead of the serial board
    #[structopt(long)]
    sim: bool,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    let session = Session::new("arm_console", "sessions")
        .wrap_err("Failed to create the session")?;
    let exec_params: ArmExecParams = util::params::load("arm_exec.toml")
        .wrap_err("Could not load exec params")?;

    // Debug lines would bury the prompt
    let log_params = LoggerParams {
        level: LogLevel::Info,
        ..exec_params.logging.clone()
    };
    logger_init(&log_params, &session)
        .wrap_err("Failed to initialise logging")?;
    let arm_params: arm_ctrl::Params = util::params::load("arm_ctrl.toml")
        .wrap_err("Could not load arm control params")?;

    let driver: Box<dyn ServoDriver> = if opt.sim {
        Box::new(SimDriver::new())
    } else {
        let t = &exec_params.transport;
        let driver = FirmataDriver::open(&t.port, t.baud_rate, t.min_pulse_us, t.max_pulse_us)
            .wrap_err_with(|| format!("Failed to open the servo board on {}", t.port))?;
        std::thread::sleep(std::time::Duration::from_secs_f64(
            exec_params.settle_time_s.max(0.0),
        ));
        Box::new(driver)
    };

    let mut arm = ArmCtrl::new(arm_params, driver)
        .wrap_err("Failed to initialise the arm")?;

    println!("{}\n", HELP);
    println!("{}", arm.commanded());

    let mut rl = DefaultEditor::new().wrap_err("Failed to start the console")?;

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("Console error: {}", e);
                break;
            }
        };

        if !line.trim().is_empty() {
            if let Err(e) = rl.add_history_entry(line.as_str()) {
                warn!("Could not add the line to the history: {}", e);
            }
        }

        let cmd = match ConsoleCmd::parse(&line) {
            Ok(c) => c,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let res = match cmd {
            ConsoleCmd::Apply(dems) => arm.apply(&dems).map(|_| true),
            ConsoleCmd::Set { joint, angle_deg } => {
                arm.single_by_name(&joint, angle_deg).map(|_| true)
            }
            ConsoleCmd::Init => arm.initialize().map(|_| true),
            ConsoleCmd::Info(None) => {
                for id in JointId::ALL.iter() {
                    println!("{}", arm.info(*id));
                }
                Ok(false)
            }
            ConsoleCmd::Info(Some(name)) => {
                match name.parse::<JointId>() {
                    Ok(id) => println!("{}", arm.info(id)),
                    Err(e) => println!("{}", e),
                }
                Ok(false)
            }
            ConsoleCmd::Help => {
                println!("{}", HELP);
                Ok(false)
            }
            ConsoleCmd::Empty => Ok(false),
            ConsoleCmd::Quit => break,
        };

        match res {
            Ok(true) => println!("{}", arm.commanded()),
            Ok(false) => (),
            Err(e @ ArmCtrlError::Transport { .. }) => {
                arm.close();
                return Err(e).wrap_err("Lost the servo transport");
            }
            Err(e) => println!("{}", e),
        }
    }

    info!("Detaching servos");
    arm.close();

    Ok(())
}
