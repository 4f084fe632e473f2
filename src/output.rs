use crate::ensemble::Ensemble;
use crate::summary::RunSummary;
use anyhow::{Context, Result};
use beamline_common::{CherenkovEvent, OutputFormat};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const ENSEMBLE_CSV_HEADER: [&str; 6] = ["x_m", "y_m", "z_m", "px_gev", "py_gev", "pz_gev"];

/// `<dir>/<base><suffix>`.
pub fn output_path(dir: &Path, base_filename: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{}", base_filename, suffix))
}

/// Writes the Cherenkov events in the requested format and returns the path used.
pub fn write_events(dir: &Path, base_filename: &str, events: &[CherenkovEvent], format: OutputFormat) -> Result<PathBuf> {
    let path = output_path(dir, base_filename, &format!("_events.{}", format.extension()));
    let file = File::create(&path)
        .with_context(|| format!("Error creating events file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Json => serde_json::to_writer(&mut writer, events)
            .context("Error serializing events to JSON")?,
        OutputFormat::Bincode => bincode::serialize_into(&mut writer, events)
            .context("Error serializing events to bincode")?,
        OutputFormat::MessagePack => rmp_serde::encode::write(&mut writer, events)
            .context("Error serializing events to MessagePack")?,
    }
    writer.flush()?;

    info!("{} Cherenkov events saved to {} ({:?} format)", events.len(), path.display(), format);
    Ok(path)
}

/// Writes one CSV row `x,y,z,px,py,pz` per particle, in ensemble order.
pub fn write_final_ensemble_csv(path: &Path, ensemble: &Ensemble) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    writer.write_record(ENSEMBLE_CSV_HEADER)?;
    for row in ensemble.to_rows() {
        writer.write_record(row.iter().map(|v| format!("{:e}", v)))?;
    }
    writer.flush()?;
    info!("Final ensemble ({} particles) saved to {}", ensemble.len(), path.display());
    Ok(())
}

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Error creating summary file '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .context("Error serializing run summary to JSON")?;
    info!("Run summary saved to {}", path.display());
    Ok(())
}
