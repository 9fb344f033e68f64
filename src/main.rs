//! Headless driver: runs a wave sphere and the solar scene for a few seconds
//! of simulated time and logs what each produced.
//!
//! ```text
//! wavesphere [sphere-radius=2&sphere-wave-speed=0.3] [--frames N] [--solar]
//! ```
//!
//! Set `RUST_LOG=wavesphere=debug` for loop and resize events.

use tracing_subscriber::EnvFilter;

use wavesphere::animation::{AnimationLoop, ManualScheduler};
use wavesphere::config::SphereConfig;
use wavesphere::error::SphereError;
#[cfg(feature = "gpu")]
use wavesphere::error::PresentError;
use wavesphere::frame::RecordingSink;
#[cfg(feature = "gpu")]
use wavesphere::frame::{Frame, FrameSink, PresentOutcome};
use wavesphere::solar::SolarSystem;
use wavesphere::sphere::WaveSphere;

const FRAME_STEP: f64 = 1.0 / 60.0;

struct Args {
    query: String,
    frames: u64,
    solar: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        query: String::new(),
        frames: 240,
        solar: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--solar" => args.solar = true,
            "--frames" => {
                if let Some(n) = iter.next().and_then(|v| v.parse().ok()) {
                    args.frames = n;
                }
            }
            _ => args.query = arg,
        }
    }
    args
}

fn run_sphere(args: &Args) -> Result<(), SphereError> {
    let (config, report) = SphereConfig::from_params(&args.query)?;
    if !report.is_clean() {
        tracing::info!(
            unknown = ?report.unknown_keys,
            clamped = report.clamped.len(),
            "sphere options adjusted"
        );
    }

    let mut sphere = WaveSphere::with_config(config)?;
    sphere.on_resize(1280, 720);

    let mut recorder = RecordingSink::new();
    #[cfg(feature = "gpu")]
    let mut gpu = match sphere.gpu_sink() {
        Ok(sink) => Some(sink),
        Err(err) => {
            tracing::warn!("no GPU presenter, recording only: {err}");
            None
        }
    };

    sphere.start();
    for i in 0..args.frames {
        let now = i as f64 * FRAME_STEP;
        #[cfg(feature = "gpu")]
        if let Some(gpu) = gpu.as_mut() {
            sphere.on_frame(now, &mut |frame: &Frame<'_>| -> Result<PresentOutcome, PresentError> {
                recorder.present(frame)?;
                gpu.present(frame)
            });
            continue;
        }
        sphere.on_frame(now, &mut recorder);
    }

    if let Some(last) = recorder.last() {
        tracing::info!(
            frames = recorder.frames.len(),
            points = last.point_count,
            mean_radius = last.mean_radius,
            elapsed = last.state.time.elapsed,
            "sphere run finished"
        );
    }
    sphere.dispose();
    Ok(())
}

fn run_solar(args: &Args) -> Result<(), SphereError> {
    let mut system = SolarSystem::new(42)?;
    system.camera.resize(1280, 720);

    let mut animation = AnimationLoop::new(ManualScheduler::new());
    let mut recorder = RecordingSink::new();
    animation.start();
    for i in 0..args.frames {
        if !animation.scheduler_mut().take_request() {
            break;
        }
        animation.on_frame(i as f64 * FRAME_STEP, &mut system, &mut recorder);
    }

    for planet in system.planets() {
        tracing::info!(
            planet = %planet.spec().name,
            position = ?planet.position(),
            scale = planet.scale(),
            "planet"
        );
    }
    tracing::info!(
        frames = recorder.frames.len(),
        stars = system.star_field().len(),
        "solar run finished"
    );
    animation.dispose();
    system.release();
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wavesphere=info")),
        )
        .init();

    let args = parse_args();
    let result = if args.solar {
        run_solar(&args)
    } else {
        run_sphere(&args)
    };
    if let Err(err) = result {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
