use std::error::Error;

use bevy::math::UVec2;
use clap::Parser;

use mapgen_core::{
    generate_world, load_map_presets_from_env, load_terrain_ruleset_from_env, BiomeCategory,
    GeneratorMode, MapGenConfig, WorldMap,
};
use map_runtime::encode_snapshot_json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a map and print it", long_about = None)]
struct Args {
    /// Preset id from the presets file.
    #[arg(long, default_value = "earthlike")]
    preset: String,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, requires = "height")]
    width: Option<u32>,
    #[arg(long, requires = "width")]
    height: Option<u32>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    landpercent: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    steepness: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    wetness: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    temperature: Option<u8>,
    /// Use fracture relief rules regardless of the preset.
    #[arg(long)]
    fracture: bool,
    /// Print the snapshot as JSON instead of the ASCII map.
    #[arg(long)]
    json: bool,
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (ruleset, _) = load_terrain_ruleset_from_env();
    let (presets, _) = load_map_presets_from_env();

    if args.list_presets {
        for id in presets.ids() {
            if let Some(preset) = presets.get(id) {
                println!("{:<24} {}", preset.id, preset.description);
            }
        }
        return Ok(());
    }

    let config = MapGenConfig {
        map_preset_id: args.preset.clone(),
        map_seed: args.seed,
        grid_size: args.width.zip(args.height).map(|(w, h)| UVec2::new(w, h)),
        settings: None,
    };
    let mut request = config.resolve(&presets);
    let settings = &mut request.settings;
    settings.landpercent = args.landpercent.unwrap_or(settings.landpercent);
    settings.steepness = args.steepness.unwrap_or(settings.steepness);
    settings.wetness = args.wetness.unwrap_or(settings.wetness);
    settings.temperature = args.temperature.unwrap_or(settings.temperature);
    if args.fracture {
        settings.generator = GeneratorMode::Fracture;
    }

    let world = generate_world(&request, &ruleset)?;
    if args.json {
        println!("{}", encode_snapshot_json(&world.snapshot)?);
    } else {
        print!("{}", world.grid.render_ascii(&ruleset));
        print_summary(&world);
    }
    Ok(())
}

fn print_summary(world: &WorldMap) {
    let report = &world.report;
    let header = &world.snapshot.header;
    println!();
    println!(
        "preset {} seed {} size {}x{} hash {:016x}",
        world.preset_id, header.seed, header.width, header.height, header.hash
    );
    println!(
        "shore level {} land {} placed {} relief {} (peaks {}, ridges {})",
        report.shore_level(),
        report.land.land_tiles,
        report.placed_tiles,
        report.relief.total(),
        report.relief.peaks,
        report.relief.ridges
    );
    for category in BiomeCategory::ALL {
        let slot = category.index();
        println!(
            "  {:<10} target {:>5} placed {:>5}",
            category.label(),
            report.assignment.targets[slot],
            report.assignment.placed[slot]
        );
    }
    println!(
        "continents {} ocean bodies {} lakes {} removed islands {}",
        report.continents.continent_count(),
        report.continents.ocean_body_sizes.len(),
        report.continents.lake_bodies,
        report.continents.removed_islands
    );
}
