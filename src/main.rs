use log::info;
use onomap_hex::{HexGrid, OnoMapError};
use std::env;

fn parse_arg(args: &[String], idx: usize, name: &str, default: f64) -> Result<f64, OnoMapError> {
    match args.get(idx) {
        Some(raw) => raw
            .parse()
            .map_err(|_| OnoMapError::ConfigError(format!("invalid {}: '{}'", name, raw))),
        None => Ok(default),
    }
}

/// Usage: `onomap-hex [lon lat [size]]`
fn main() -> Result<(), OnoMapError> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let args: Vec<String> = env::args().skip(1).collect();
    let lon = parse_arg(&args, 0, "longitude", -1.5536)?;
    let lat = parse_arg(&args, 1, "latitude", 47.2184)?;
    let size = parse_arg(&args, 2, "size", onomap_hex::DEFAULT_HEX_SIZE)?;

    let grid = HexGrid::builder().size(size).build()?;
    info!("indexing ({}, {}) on a {} m grid", lon, lat, grid.size());

    let cell = grid.cell_at_wgs84(&(lon, lat))?;
    println!("Cell: q={} r={}", cell.q, cell.r);
    println!("Center (EPSG:3857): ({:.2}, {:.2})", cell.x(), cell.y());

    let query: Vec<String> = cell
        .query_params()
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    println!("Query: {}", query.join("&"));

    let outline = cell.to_wgs84_polygon()?;
    for (i, corner) in outline.exterior().coords().enumerate() {
        println!("  {}: ({:.6}, {:.6})", i, corner.x, corner.y);
    }

    Ok(())
}
