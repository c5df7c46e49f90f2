//! Drive a TrackIR bridge the way a polling tracking framework would.

use clap::*;
use log::*;
use std::path::Path;
use std::time::Duration;
use trackir::prelude::v1::{Result, *};
use trackir_sim::{SimProvider, SimSettings};

mod timer;

use timer::Timer;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("trackir-host")
        .version(crate_version!())
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("save-config")
                .long("save-config")
                .takes_value(true)
                .help("Write the effective configuration to this file"),
        )
        .arg(
            Arg::new("rate")
                .long("rate")
                .short('r')
                .takes_value(true)
                .default_value("60")
                .help("Host update rate in Hz"),
        )
        .arg(
            Arg::new("ticks")
                .long("ticks")
                .short('n')
                .takes_value(true)
                .help("Stop after this many updates"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .short('s')
                .takes_value(true)
                .multiple_occurrences(true)
                .help("Override a property, such as yaw_scale=2 or occlusion=0.1"),
        )
        .arg(
            Arg::new("cameras")
                .long("cameras")
                .takes_value(true)
                .default_value("1"),
        )
        .arg(
            Arg::new("backlog")
                .long("backlog")
                .takes_value(true)
                .default_value("0"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .takes_value(true)
                .default_value("0"),
        )
        .get_matches();

    let mut config = SessionConfig::load_or_default(matches.value_of("config").map(Path::new))?;

    let mut sim = SimSettings {
        cameras: matches.value_of_t("cameras")?,
        backlog: matches.value_of_t("backlog")?,
        seed: matches.value_of_t("seed")?,
        ..Default::default()
    };

    apply_overrides(
        matches.values_of("set").into_iter().flatten(),
        &mut config.scale,
        &mut sim,
    )?;

    if let Some(path) = matches.value_of("save-config") {
        config.save(path)?;
        info!("Configuration written to {path}");
    }

    let period = tick_period(matches.value_of_t("rate")?)?;

    let ticks: Option<usize> = matches
        .value_of("ticks")
        .map(str::parse)
        .transpose()?;

    let mut bridge = TrackerBridge::new(SimProvider::new(sim), config, |pose: &Pose| {
        println!("{pose}")
    });

    if let Err(e) = bridge.start() {
        error!("Tracker failed to start: {e}");
    }

    let mut timer = Timer::default();
    let mut cnt = 0usize;

    while ticks.map(|t| cnt < t).unwrap_or(true) {
        timer.tick(period);
        bridge.tick();
        cnt += 1;
    }

    Ok(())
}

/// Time between host updates at `rate` Hz.
fn tick_period(rate: f64) -> Result<Duration> {
    if rate.is_nan() || rate <= 0.0 {
        return Err(anyhow!("update rate must be positive, got {rate}"));
    }

    Duration::try_from_secs_f64(1.0 / rate)
        .map_err(|e| anyhow!("invalid update rate {rate}: {e}"))
}

/// Apply `name=value` overrides to the scale factors and simulator settings.
///
/// Scale factor names take precedence.
fn apply_overrides<'a>(
    overrides: impl IntoIterator<Item = &'a str>,
    scale: &mut ScaleFactors,
    sim: &mut SimSettings,
) -> Result<()> {
    for kv in overrides {
        let (name, value) = kv
            .split_once('=')
            .ok_or_else(|| anyhow!("expected name=value, got `{kv}`"))?;

        if scale.has_prop(name) {
            scale.parse_prop(name, value)?;
        } else {
            sim.parse_prop(name, value)?;
        }

        debug!("Set {name} to {value}");
    }

    Ok(())
}
