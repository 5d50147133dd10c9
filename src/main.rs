use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};

use photobooth::camera::{self, CameraBackend, StillImageCamera};
use photobooth::compositor::ExportResult;
use photobooth::notification::DesktopNotifier;
use photobooth::scene::Scene;
use photobooth::{BoothDependencies, Config, Photobooth};

#[derive(Parser, Debug)]
#[command(name = "photobooth")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PHOTOBOOTH_GIT_HASH"), ")"),
    about = "Photobooth frames: capture, decorate with text and stickers, export PNG"
)]
struct Cli {
    /// Write the example configuration to ~/.config/photobooth/config.toml
    #[arg(long, action = ArgAction::SetTrue)]
    init_config: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also send desktop notifications
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    notify: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a frame from a scene file and export it
    Export {
        /// Scene description (TOML)
        #[arg(long, value_name = "FILE")]
        scene: PathBuf,

        /// Directory to write the PNG to
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output scale relative to the on-screen frame
        #[arg(long)]
        scale: Option<f64>,
    },

    /// Capture photos from a camera, apply overlays and export
    Shoot {
        /// Use an image file as the camera
        #[arg(long, value_name = "IMAGE", conflicts_with = "webcam", required_unless_present = "webcam")]
        still: Option<PathBuf>,

        /// Use a native webcam (requires the `webcam` feature)
        #[arg(long, action = ArgAction::SetTrue)]
        webcam: bool,

        /// Native camera index (defaults to camera.device_index)
        #[arg(long)]
        index: Option<u32>,

        /// Number of photos to take (1-4)
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
        shots: u8,

        /// Scene with orientation, background, text and stickers to apply
        #[arg(long, value_name = "FILE")]
        scene: Option<PathBuf>,

        /// Directory to write the PNG to
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output scale relative to the on-screen frame
        #[arg(long)]
        scale: Option<f64>,
    },

    /// List native cameras
    Cameras,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::create_default_file()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.notify {
        config.notifications.desktop = true;
    }

    let desktop = config
        .notifications
        .desktop
        .then(|| Arc::new(DesktopNotifier::new(tokio::runtime::Handle::current())));

    let outcome = run(command, config, desktop.clone()).await;
    if let Some(notifier) = &desktop {
        notifier.flush().await;
    }
    outcome
}

async fn run(
    command: Command,
    mut config: Config,
    desktop: Option<Arc<DesktopNotifier>>,
) -> Result<()> {
    match command {
        Command::Export {
            scene,
            output,
            scale,
        } => {
            apply_overrides(&mut config, output, scale);
            let scene = Scene::load(&scene)?;
            let mut booth = build_booth(
                config,
                Arc::new(StillImageCamera::new(Vec::new())),
                desktop,
            );
            let outcome = scene.apply(&mut booth)?;
            if outcome.rejected > 0 {
                log::warn!("{} scene entries were rejected", outcome.rejected);
            }
            report(booth.export().await?);
        }
        Command::Shoot {
            still,
            webcam,
            index,
            shots,
            scene,
            output,
            scale,
        } => {
            apply_overrides(&mut config, output, scale);
            let backend: Arc<dyn CameraBackend> = match still {
                Some(path) => Arc::new(StillImageCamera::from_path(&path)?),
                None if webcam => webcam_backend(index.unwrap_or(config.camera.device_index))?,
                None => bail!("either --still or --webcam is required"),
            };
            let scene = scene.as_deref().map(Scene::load).transpose()?;

            let mut booth = build_booth(config, backend, desktop);
            if let Some(scene) = &scene {
                if !scene.photos.is_empty() {
                    log::warn!(
                        "Ignoring {} scene photos; shoot captures its own",
                        scene.photos.len()
                    );
                }
                scene.apply_frame(&mut booth);
            }

            booth.start_camera().await?;
            for shot in 1..=shots {
                let slot = booth.capture()?;
                log::info!("Shot {shot}/{shots} stored in slot {}", slot + 1);
            }
            booth.stop_camera();

            if let Some(scene) = &scene {
                scene.apply_overlays(&mut booth)?;
            }
            report(booth.export().await?);
        }
        Command::Cameras => {
            let cameras = camera::list_cameras();
            if cameras.is_empty() {
                println!("No cameras found");
                if !cfg!(feature = "webcam") {
                    println!("(built without the `webcam` feature)");
                }
            }
            for info in cameras {
                println!("{}: {}", info.index, info.name);
            }
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, output: Option<PathBuf>, scale: Option<f64>) {
    if let Some(dir) = output {
        config.export.save_directory = dir.to_string_lossy().into_owned();
    }
    if let Some(scale) = scale {
        config.export.scale = scale;
    }
    config.validate_and_clamp();
}

fn build_booth(
    config: Config,
    camera: Arc<dyn CameraBackend>,
    desktop: Option<Arc<DesktopNotifier>>,
) -> Photobooth {
    let mut dependencies = BoothDependencies::new(camera, &config);
    if let Some(notifier) = desktop {
        dependencies.notifier = notifier;
    }
    Photobooth::new(config, dependencies)
}

fn report(result: ExportResult) {
    for failure in &result.report.failures {
        eprintln!("warning: {} omitted: {}", failure.layer, failure.reason);
    }
    println!("{}", result.path.display());
}

#[cfg(feature = "webcam")]
fn webcam_backend(index: u32) -> Result<Arc<dyn CameraBackend>> {
    Ok(Arc::new(camera::NokhwaCamera::new(index)))
}

#[cfg(not(feature = "webcam"))]
fn webcam_backend(index: u32) -> Result<Arc<dyn CameraBackend>> {
    bail!("webcam {index} requested, but photobooth was built without the `webcam` feature")
}
