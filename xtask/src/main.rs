use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use map_runtime::{ruleset_schema, TerrainRuleset};
use mapgen_core::MapPresets;

const RULESET_GLOB: &str = "map_runtime/src/data/*ruleset*.json";
const PRESETS_GLOB: &str = "mapgen_core/src/data/*presets*.json";

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("validate-data") => validate_data(),
        Some("schema") => print_schema(),
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown xtask '{cmd}'.");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask validate-data");
    eprintln!("       cargo xtask schema");
    eprintln!("       cargo xtask help");
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn matching_files(pattern: &str) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let full = workspace_root().join(pattern);
    let mut files = Vec::new();
    for entry in glob::glob(&full.to_string_lossy())? {
        files.push(entry?);
    }
    if files.is_empty() {
        return Err(format!("no data files match {pattern}").into());
    }
    Ok(files)
}

fn print_schema() -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(&ruleset_schema())?);
    Ok(())
}

fn validate_data() -> Result<(), Box<dyn Error>> {
    let schema = serde_json::to_value(ruleset_schema())?;
    let compiled = JSONSchema::compile(&schema).map_err(|err| format!("invalid ruleset schema: {err}"))?;

    let mut failures = 0usize;
    for path in matching_files(RULESET_GLOB)? {
        let instance: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        if let Err(errors) = compiled.validate(&instance) {
            for error in errors {
                eprintln!("{}: {} at {}", path.display(), error, error.instance_path);
                failures += 1;
            }
            continue;
        }
        match TerrainRuleset::from_file(&path) {
            Ok(ruleset) => println!("ok {} ({} terrains)", path.display(), ruleset.len()),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
            }
        }
    }

    for path in matching_files(PRESETS_GLOB)? {
        match MapPresets::from_file(&path) {
            Ok(presets) => println!("ok {} ({} presets)", path.display(), presets.len()),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} data file problem(s)").into());
    }
    Ok(())
}
