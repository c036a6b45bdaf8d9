use std::error::Error;

use odsx::{DeflectionFault, OrbitFault, Rig, Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Frame step of the headless run, matching a 60 Hz display.
const FRAME_SECONDS: f64 = 1.0 / 60.0;

/// Options accepted on the command line.
#[derive(Debug, Default)]
struct Options {
    /// Path of a JSON configuration file.
    config: Option<String>,
    /// Deflection fault overriding the configuration.
    fault: Option<DeflectionFault>,
    /// Orbit fault overriding the configuration.
    orbit_fault: Option<OrbitFault>,
    /// Number of frames to simulate.
    frames: usize,
}

/// Parse the flags after the program name.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, Box<dyn Error>> {
    let mut options = Options {
        frames: 240,
        ..Options::default()
    };
    while let Some(flag) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{flag} expects a value"));
        match flag.as_str() {
            "--config" => options.config = Some(value()?),
            "--fault" => options.fault = Some(value()?.parse()?),
            "--orbit-fault" => options.orbit_fault = Some(value()?.parse()?),
            "--frames" => options.frames = value()?.parse()?,
            "-h" | "--help" => {
                println!(
                    "usage: odsx [--config path] [--fault name] [--orbit-fault name] [--frames n]"
                );
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument {other:?}").into()),
        }
    }
    Ok(options)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = parse_args(std::env::args().skip(1))?;

    // Start from the file configuration, then let the command line pick the faults.
    let mut config = match &options.config {
        Some(path) => SimulationConfig::from_path(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(fault) = options.fault {
        config.deflection_fault = fault;
    }
    if let Some(fault) = options.orbit_fault {
        config.orbit_fault = fault;
    }
    let mut simulation = Simulation::new(config)?;
    info!(
        deflection = %simulation.deflection_fault(),
        orbit = %simulation.orbit_fault(),
        frames = options.frames,
        "running headless simulation"
    );

    // Drive the clock exactly as a renderer would, one frame at a time.
    let mut frame = simulation.frame();
    for _ in 0..options.frames {
        frame = simulation.advance(FRAME_SECONDS);
    }

    println!("Deflection rig: {}", simulation.deflection_fault());
    println!("{}", simulation.summary(Rig::Deflection));
    println!("Orbit rig: {}", simulation.orbit_fault());
    println!("{}", simulation.summary(Rig::Orbit));

    let (max_x, max_y) = simulation
        .trail()
        .iter()
        .fold((0.0_f64, 0.0_f64), |(x, y), sample| {
            (x.max(sample.position.x.abs()), y.max(sample.position.y.abs()))
        });
    let mark = simulation.trigger_position();
    println!(
        "Orbit after {:.2} s (shaft angle {:+.2} rad): {} trail samples, |x| <= {max_x:.4}, |y| <= {max_y:.4}",
        frame.time,
        frame.angle,
        simulation.trail().len()
    );
    if let Some(mark) = mark {
        println!("Keyphasor mark at ({:+.4}, {:+.4})", mark.x, mark.y);
    }

    Ok(())
}
