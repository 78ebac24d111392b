//! Density command - aggregate a point layer into a density tile

use anyhow::{Context, Result};
use brickmap_core::query::layer::Point;
use brickmap_core::{aggregate_density, PointLayer, QuadrantQuery, QueryBounds, Quantization};
use brickmap_render::{render_density, save_png, DensityStyle};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Parse `xmin,ymin,xmax,ymax`.
pub fn parse_bounds(input: &str) -> CliResult<QueryBounds> {
    let values = input
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| CliError::invalid_bounds(input.to_string(), e.to_string()))?;

    let (xmin, ymin, xmax, ymax) = match values.as_slice() {
        &[xmin, ymin, xmax, ymax] => (xmin, ymin, xmax, ymax),
        _ => {
            return Err(CliError::invalid_bounds(
                input.to_string(),
                format!("expected 4 values, got {}", values.len()),
            ))
        }
    };

    if values.iter().any(|v| !v.is_finite()) {
        return Err(CliError::invalid_bounds(input, "values must be finite"));
    }
    if xmax <= xmin || ymax <= ymin {
        return Err(CliError::invalid_bounds(input, "bounds have no area"));
    }
    Ok(QueryBounds::new(xmin, ymin, xmax, ymax))
}

/// Load a JSON array of `{"id", "x", "y"}` points.
pub fn load_points(path: &Path) -> CliResult<Vec<Point>> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }
    let file = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::invalid_points(file.clone(), e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| CliError::invalid_points(file, e.to_string()))
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    points: PathBuf,
    bounds: String,
    output: PathBuf,
    block_size: Option<u32>,
    transfer_limit: Option<usize>,
    max_depth: Option<u32>,
    allow_partial: bool,
) -> Result<()> {
    log::info!("Point layer: {}", points.display());
    log::info!("Output file: {}", output.display());

    let extent = parse_bounds(&bounds)?;
    let points = load_points(&points)?;
    log::info!("Loaded {} points", points.len());

    let tile_size = config.tile.tile_size;
    let block_size = block_size.unwrap_or(config.density.block_size);
    let transfer_limit = transfer_limit.unwrap_or(config.density.transfer_limit);
    let mut limits = config.query_limits();
    if let Some(depth) = max_depth {
        limits.max_depth = depth;
    }

    let layer = PointLayer::new(points, transfer_limit).map_err(CliError::from)?;
    let quantization = Quantization::for_tile(extent, tile_size, block_size).map_err(CliError::from)?;
    let blocks_per_axis = tile_size / block_size;

    let view = layer.view(quantization);
    let query = QuadrantQuery::new(&view).with_limits(limits);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let (grid, outcome) = runtime
        .block_on(aggregate_density(&query, extent, blocks_per_axis, allow_partial))
        .map_err(CliError::from)?;

    log::info!(
        "Aggregated {} features in {} requests ({} duplicates dropped, depth {})",
        outcome.features.len(),
        outcome.calls,
        outcome.duplicates,
        outcome.deepest
    );
    if outcome.truncated {
        log::warn!(
            "{} quadrants were still truncated at the depth limit; rendering a partial tile",
            outcome.capped.len()
        );
    }
    if grid.dropped() > 0 {
        log::warn!("{} features fell outside the tile grid", grid.dropped());
    }

    let style = DensityStyle {
        block_size,
        ..config.density_style()
    };
    save_png(&render_density(&grid, &style), &output)?;
    log::info!("Density tile complete (max count {})", grid.max_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_points(dir: &Path, n: u64) -> PathBuf {
        let points: Vec<Point> = (0..n)
            .map(|i| Point { id: i, x: (i % 16) as f64 * 4.0 + 2.0, y: (i / 16) as f64 * 4.0 + 2.0 })
            .collect();
        let path = dir.join("points.json");
        std::fs::write(&path, serde_json::to_string(&points).unwrap()).unwrap();
        path
    }

    fn small_config() -> Config {
        let mut config = Config::default();
        config.tile.tile_size = 64;
        config
    }

    #[test]
    fn test_parse_bounds() {
        let b = parse_bounds("0, -10.5, 256, 100").unwrap();
        assert_eq!(b, QueryBounds::new(0.0, -10.5, 256.0, 100.0));

        assert!(matches!(parse_bounds("0,0,1"), Err(CliError::InvalidBounds { .. })));
        assert!(matches!(parse_bounds("0,0,a,1"), Err(CliError::InvalidBounds { .. })));
        assert!(matches!(parse_bounds("5,0,5,1"), Err(CliError::InvalidBounds { .. })));
        assert!(matches!(parse_bounds("0,0,inf,1"), Err(CliError::InvalidBounds { .. })));
    }

    #[test]
    fn test_load_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_points(dir.path(), 3);
        let points = load_points(&path).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point { id: 1, x: 6.0, y: 2.0 });

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"[{"id": -1, "x": 0, "y": 0}]"#).unwrap();
        assert!(matches!(load_points(&bad), Err(CliError::InvalidPoints { .. })));
        assert!(matches!(
            load_points(&dir.path().join("missing.json")),
            Err(CliError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_density_writes_tile() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_points(dir.path(), 256);
        let output = dir.path().join("density.png");

        execute(
            &small_config(),
            points,
            "0,0,64,64".to_string(),
            output.clone(),
            None,
            Some(40),
            None,
            false,
        )
        .unwrap();

        let img = image::open(&output).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (64, 64));
        // one point per 4px block, max_value 200
        assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 1]);
    }

    #[test]
    fn test_partial_result_requires_flag() {
        let dir = tempfile::tempdir().unwrap();
        let points = write_points(dir.path(), 256);

        let err = execute(
            &small_config(),
            points.clone(),
            "0,0,64,64".to_string(),
            dir.path().join("strict.png"),
            None,
            Some(10),
            Some(1),
            false,
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::PartialResult { .. })));

        let output = dir.path().join("partial.png");
        execute(
            &small_config(),
            points,
            "0,0,64,64".to_string(),
            output.clone(),
            None,
            Some(10),
            Some(1),
            true,
        )
        .unwrap();
        assert!(output.exists());
    }
}
