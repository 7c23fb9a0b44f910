//! List command

use crate::bundle::Bundle;
use std::path::Path;

pub fn run(bundle_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = Bundle::load(bundle_dir)?;

    println!(
        "{:<38} {:<32} {:>9} {:>6} {:>7}",
        "ID", "NAME", "SIZE", "TILES", "OBJECTS"
    );
    for map in &bundle.maps {
        println!(
            "{:<38} {:<32} {:>9} {:>6} {:>7}",
            map.id,
            map.name,
            format!("{}x{}", map.width, map.height),
            map.map_tiles.len(),
            map.map_objects.len()
        );
    }
    println!(
        "{} maps, {} object types",
        bundle.maps.len(),
        bundle.catalog.len()
    );

    Ok(())
}
