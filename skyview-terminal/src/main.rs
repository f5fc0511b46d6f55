/// Skyview Terminal - reflective mesh inside a textured skybox
///
/// Controls:
///   - A/D or Left/Right: orbit the camera around the origin
///   - W/S: pitch the camera
///   - Up/Down: move along the view direction
///   - Left mouse drag: roll and pitch the mesh
///   - R/B/P: toggle reflection, reflection blending, world spin
///   - +/-: scale the mesh
///   - Q/ESC: Quit

use clap::Parser;
use log::{error, info};
use skyview_core::{load_mesh, load_skybox, FsSource, ViewerConfig};
use skyview_terminal::{Assets, TerminalApp};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "skyview-terminal", version, about = "Skybox and reflective mesh viewer for the terminal")]
struct Args {
    /// Mesh to display (OBJ text)
    #[arg(default_value = "assets/torus.obj")]
    mesh: PathBuf,

    /// Skybox cube geometry (OBJ text with 6 textured quads)
    #[arg(long, default_value = "assets/skybox.obj")]
    skybox: PathBuf,

    /// Directory holding pos-x.png, neg-x.png, ... neg-z.png
    #[arg(long, default_value = "assets")]
    images: PathBuf,

    /// Viewer configuration (.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where log output goes while the terminal is in use
    #[arg(long, default_value = "skyview.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = match &args.config {
        Some(path) => ViewerConfig::load_from_file(path)?,
        None => ViewerConfig::default(),
    };

    println!("Skyview Terminal - Loading...");
    let source = FsSource::new("");
    let assets = load_mesh(&source, &args.mesh.to_string_lossy())
        .and_then(|mesh| {
            let skybox = load_skybox(&source, &args.skybox.to_string_lossy())?;
            Ok(Assets { mesh, skybox })
        })
        .map_err(|e| {
            error!("load failed: {}", e);
            e
        })?;

    info!("starting terminal viewer");
    let mut app = TerminalApp::new(assets, &config, args.images)?;
    app.run()?;

    println!("Thank you for using Skyview!");
    Ok(())
}
