use crate::error::{PipelineError, Result};
use crate::pipeline::DerivedDatasets;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const MVP_FILE: &str = "mvp_data.json";
pub const CHAMPIONSHIP_FILE: &str = "champ_data.json";
pub const SCORING_FILE: &str = "scoring_data.json";
pub const BENCH_FILE: &str = "bench_data.json";
pub const TRADE_IMPACT_FILE: &str = "trade_impact_data.json";

pub fn write_json<T: Serialize + ?Sized>(
    output_dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf> {
    let path = output_dir.join(file_name);
    let io_err = |source| PipelineError::Io {
        path: path.clone(),
        source,
    };

    let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
    serde_json::to_writer(&mut writer, value).map_err(|source| PipelineError::Json {
        path: path.clone(),
        source,
    })?;
    writer.flush().map_err(io_err)?;

    Ok(path)
}

// Writes one file per chart into `output_dir`, creating it if needed.
pub fn output_report(datasets: &DerivedDatasets, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|source| PipelineError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let written = vec![
        write_json(output_dir, MVP_FILE, &datasets.mvp)?,
        write_json(output_dir, CHAMPIONSHIP_FILE, &datasets.championship)?,
        write_json(output_dir, SCORING_FILE, &datasets.scoring)?,
        write_json(output_dir, BENCH_FILE, &datasets.bench)?,
        write_json(output_dir, TRADE_IMPACT_FILE, &datasets.trade_impact)?,
    ];

    info!("|{0:24} | {1:>8}", "file", "records");
    for (path, count) in written.iter().zip([
        datasets.mvp.len(),
        datasets.championship.len(),
        datasets.scoring.len(),
        datasets.bench.len(),
        datasets.trade_impact.team_records.len(),
    ]) {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        info!("|{0:24} | {1:>8}", name, count);
    }

    Ok(written)
}
