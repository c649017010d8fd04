/// Ray pick against a LAS/LAZ point cloud from the command line
mod laz;
mod picker;

use constants::hit_test::MAX_RAYCAST_DISTANCE;
use point_cloud_hit_test::engine::spatial::OctreeConfig;
use std::env;
use std::path::Path;

const USAGE: &str =
    "<input.las|laz> <ox> <oy> <oz> <dx> <dy> <dz> [--radius <r>] [--max-distance <d>] [--json]";

/// Nearest hits shown in the text report.
const SHOWN_HITS: usize = 10;

struct Options {
    input: String,
    origin: [f64; 3],
    direction: [f64; 3],
    pick_radius: Option<f32>,
    max_distance: f32,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Options, Box<dyn std::error::Error>> {
    let mut positional = Vec::new();
    let mut pick_radius = None;
    let mut max_distance = MAX_RAYCAST_DISTANCE;
    let mut json = false;

    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--radius" => {
                let value = rest.next().ok_or("--radius needs a value")?;
                pick_radius = Some(value.parse()?);
            }
            "--max-distance" => {
                let value = rest.next().ok_or("--max-distance needs a value")?;
                max_distance = value.parse()?;
            }
            _ => positional.push(arg.as_str()),
        }
    }

    let [input, ox, oy, oz, dx, dy, dz] = positional[..] else {
        return Err(format!("expected 7 positional arguments, got {}", positional.len()).into());
    };
    Ok(Options {
        input: input.to_string(),
        origin: [ox.parse()?, oy.parse()?, oz.parse()?],
        direction: [dx.parse()?, dy.parse()?, dz.parse()?],
        pick_radius,
        max_distance,
        json,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args[1..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: {} {USAGE}", args[0]);
            std::process::exit(1);
        }
    };

    let cloud = laz::load_cloud(Path::new(&options.input))?;
    println!("Loaded {} points from {}", cloud.points.len(), options.input);

    let mut config = OctreeConfig::default();
    if let Some(radius) = options.pick_radius {
        config.pick_radius = radius;
    }
    let tree = picker::build_index(cloud.points.clone(), config)?;

    let report = picker::pick_along(
        &cloud,
        &tree,
        options.origin,
        options.direction,
        options.max_distance,
    )?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "✓ {} points within {} of the ray (max distance {})",
        report.hits.len(),
        report.pick_radius,
        report.max_distance
    );
    for hit in report.hits.iter().take(SHOWN_HITS) {
        println!(
            "  #{:<10} t = {:>10.3}  ({:.3}, {:.3}, {:.3})",
            hit.index, hit.distance, hit.position[0], hit.position[1], hit.position[2]
        );
    }
    if report.hits.len() > SHOWN_HITS {
        println!("  ... {} more", report.hits.len() - SHOWN_HITS);
    }
    Ok(())
}
