//! Example: Query elevation from raw .hgt tiles.
//!
//! Usage: cargo run --example query_elevation -- <lat> <lon> [dem_dir]

use demcraft_dem::{TileFormat, TileStore};
use std::env;
use std::time::Instant;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <lat> <lon> [dem_dir]", args[0]);
        eprintln!("Example: {} 47.0245 28.8322 ./dem_data", args[0]);
        std::process::exit(1);
    }

    let lat: f64 = args[1].parse().expect("Invalid latitude");
    let lon: f64 = args[2].parse().expect("Invalid longitude");
    let dem_dir = args.get(3).map(|s| s.as_str()).unwrap_or("dem_data");

    let mut store = TileStore::new(dem_dir, TileFormat::Srtm1);
    match store.available_tiles() {
        Ok(names) => println!("{} tile(s) available in {}", names.len(), dem_dir),
        Err(e) => eprintln!("Cannot list {}: {}", dem_dir, e),
    }

    println!("\nQuerying elevation at ({}, {})...", lat, lon);
    let query_start = Instant::now();

    match store.point_elevation(lat, lon) {
        Ok(elevation) => {
            println!(
                "Elevation: {:.0} meters (loaded in {:.2}s)",
                elevation,
                query_start.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    // Second query should be fast (tile already loaded)
    let query_start = Instant::now();
    if let Ok(again) = store.point_elevation(lat, lon) {
        println!(
            "Elevation: {:.0} meters (cached: {:.6}s)",
            again,
            query_start.elapsed().as_secs_f64()
        );
    }
}
