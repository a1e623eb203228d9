//! Data source inspector entry point
//!
//! Usage: `datasource-demo [data.json] [config.json]`
//!
//! Builds a column data source from a JSON object of arrays (or built-in demo
//! data), exercises the column and selection operations, and prints the
//! resulting snapshot, notebook script and frame.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use dv_core::Model;
use dv_data::{
    ColumnDataSource, HasDataSource, ServerDataSource, SourceConfig, SourceOptions,
};

mod demo;

fn load_config(path: Option<PathBuf>) -> Result<SourceConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Ok(SourceConfig::from_json_str(&text)?)
        }
        None => Ok(SourceConfig::default()),
    }
}

fn load_source(path: Option<PathBuf>, config: &SourceConfig) -> Result<ColumnDataSource> {
    match path {
        Some(path) => {
            info!("Loading columns from {:?}", path);
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let data = dv_data::SourceData::try_from(value)?;
            Ok(ColumnDataSource::with_options(data, SourceOptions::new(), config)?)
        }
        None => {
            info!("No input given, using demo scatter data");
            Ok(ColumnDataSource::with_options(
                demo::scatter_frame()?,
                SourceOptions::new(),
                config,
            )?)
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let data_path = args.next();
    let config = load_config(args.next())?;

    let mut source = load_source(data_path, &config)?;
    info!(
        "Loaded {} with columns {:?}",
        source.model_ref().type_name,
        source.column_names()
    );

    // Unnamed columns get generated names
    let rows = source.row_count();
    let generated = source.add((0..rows).map(|i| json!(i % 3 == 0)).collect());
    info!("Added column '{}'", generated);

    // Missing columns only warn
    if let Some(missing) = source.remove("no-such-column") {
        info!("Ignored: {}", missing);
    }

    source.set_selected((0..rows).filter(|i| i % 4 == 0));
    let first = source.column_names().first().cloned().unwrap_or_default();
    info!("Selected {:?}: {:?}", first, source.selected_rows(&first));

    let row_count = source.validate()?;
    info!("Source is consistent with {} rows", row_count);

    println!("{}", serde_json::to_string_pretty(&source.to_json()?)?);
    println!("{}", source.notebook_script()?);

    let frame = source.to_df()?;
    println!(
        "{}",
        arrow::util::pretty::pretty_format_batches(&[frame.batch().clone()])?
    );

    let remote = ServerDataSource::new("http://localhost:5006/bokeh/data/demo")
        .with_owner("defaultuser")
        .with_transform("resample", "line1d")
        .with_transform("source", source.model_ref())
        .with_transform("domain", "x");
    let refs = remote.columns(["x", "y"]);
    info!("Server source refers to {:?}", refs);
    println!("{}", serde_json::to_string_pretty(&remote.to_json()?)?);

    Ok(())
}
