//! Asset inspector
//!
//! Loads models and HUD skins through the headless backend and prints what
//! the engine would see.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};

use nova_engine::assets::{DirectorySource, ObjLoader};
use nova_engine::config::{Config, EngineConfig};
use nova_engine::foundation::logging;
use nova_engine::render::HeadlessBackend;
use nova_engine::ui::hud::{HudLayout, RadarShape, Rect};

fn cli() -> Command {
    Command::new("asset_inspector")
        .about("Loads game assets headlessly and prints a summary")
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("DIR")
                .help("Game data directory (overrides the config search paths)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Engine configuration file (.toml or .ron)"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("object")
                .about("Summarise a Wavefront object and its materials")
                .arg(Arg::new("path").required(true).help("Object path relative to the data directory")),
        )
        .subcommand(
            Command::new("gui")
                .about("Resolve a HUD skin for a screen size")
                .arg(Arg::new("name").required(true).help("GUI name in the GUI descriptor file"))
                .arg(
                    Arg::new("width")
                        .long("width")
                        .value_parser(clap::value_parser!(f32))
                        .default_value("800")
                        .help("Screen width in pixels"),
                )
                .arg(
                    Arg::new("height")
                        .long("height")
                        .value_parser(clap::value_parser!(f32))
                        .default_value("600")
                        .help("Screen height in pixels"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => EngineConfig::load_from_file(path).with_context(|| format!("Failed to load config {}", path))?,
        None => EngineConfig::default(),
    };
    config.validate().context("Invalid configuration")?;

    logging::init_with_level(logging::parse_level(&config.log_level));

    let source = match matches.get_one::<String>("data") {
        Some(dir) => DirectorySource::new([PathBuf::from(dir)]),
        None => DirectorySource::new(config.search_paths.clone()),
    };

    let result = match matches.subcommand() {
        Some(("object", args)) => inspect_object(&source, args),
        Some(("gui", args)) => inspect_gui(&source, &config, args),
        _ => unreachable!("subcommand_required is set"),
    };
    if let Err(e) = &result {
        log::error!("{:#}", e);
    }
    result
}

fn inspect_object(source: &DirectorySource, args: &ArgMatches) -> Result<()> {
    let path = args.get_one::<String>("path").context("Missing object path")?;
    let mut backend = HeadlessBackend::new(800.0, 600.0);

    let object = ObjLoader::load(source, &mut backend, Path::new(path))
        .with_context(|| format!("Failed to load object {}", path))?;

    println!("{}", path);
    println!("  meshes: {}", object.meshes().len());
    for mesh in object.meshes() {
        let material = object.mesh_material(mesh);
        println!(
            "    {:<20} {:>6} triangles  material '{}'",
            mesh.name,
            mesh.num_corners / 3,
            material.name
        );
    }

    println!("  materials: {}", object.materials().len());
    for material in object.materials() {
        let texture = material
            .texture
            .map(|t| format!("{}x{} texture", t.width, t.height))
            .unwrap_or_else(|| "untextured".to_string());
        println!(
            "    {:<20} Kd {:?}  Ns {:.1}  d {:.2}  {}",
            material.name, material.diffuse, material.shininess, material.opacity, texture
        );
    }
    println!("  uploaded: {} bytes", backend.uploaded_bytes());

    object.release(&mut backend);
    Ok(())
}

fn inspect_gui(source: &DirectorySource, config: &EngineConfig, args: &ArgMatches) -> Result<()> {
    let name = args.get_one::<String>("name").context("Missing GUI name")?;
    let width = *args.get_one::<f32>("width").context("Missing width")?;
    let height = *args.get_one::<f32>("height").context("Missing height")?;
    let mut backend = HeadlessBackend::new(width, height);

    let layout = HudLayout::load(source, &mut backend, &config.hud, name)
        .with_context(|| format!("Failed to load GUI '{}'", name))?;
    let geometry = &layout.geometry;

    println!("GUI '{}' at {}x{}", layout.name, width, height);
    println!("  frame    ({:.0}, {:.0})", geometry.frame.x, geometry.frame.y);
    println!("  offset   ({:.0}, {:.0})", geometry.offset.x, geometry.offset.y);
    match geometry.radar.shape {
        RadarShape::Rectangle { width, height } => println!(
            "  radar    rectangle at ({:.0}, {:.0}) {:.0}x{:.0}",
            geometry.radar.position.x, geometry.radar.position.y, width, height
        ),
        RadarShape::Circle { radius } => println!(
            "  radar    circle at ({:.0}, {:.0}) radius {:.0}",
            geometry.radar.position.x, geometry.radar.position.y, radius
        ),
    }
    print_rect("nav", &geometry.nav);
    print_rect("shield", &geometry.shield);
    print_rect("armour", &geometry.armour);
    print_rect("energy", &geometry.energy);
    print_rect("weapon", &geometry.weapon);
    let target = &geometry.target;
    println!("  target   gfx ({:.0}, {:.0})", target.gfx.x, target.gfx.y);
    println!("           name ({:.0}, {:.0})", target.name.x, target.name.y);
    println!("           faction ({:.0}, {:.0})", target.faction.x, target.faction.y);
    println!("           health ({:.0}, {:.0})", target.health.x, target.health.y);
    print_rect("misc", &geometry.misc);

    layout.release(&mut backend);
    Ok(())
}

fn print_rect(label: &str, rect: &Rect) {
    println!("  {:<8} ({:.0}, {:.0}) {:.0}x{:.0}", label, rect.x, rect.y, rect.w, rect.h);
}
