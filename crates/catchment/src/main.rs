mod bootstrap;
mod output;

use anyhow::{Context, Result};
use catchment_core::settings::Settings;
use catchment_data::analysis::analyze_file;
use clap::Parser;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Catchment v{} starting", env!("CARGO_PKG_VERSION"));

    let options = settings.analysis_options()?;
    let format = settings.output_format()?;
    let decimals = usize::from(settings.decimals);

    tracing::info!(
        "Statistic: {}, measurement: \"{}\", files: {}",
        options.statistic,
        options.schema.value_column,
        settings.infiles.len()
    );

    let mut results = Vec::with_capacity(settings.infiles.len());
    for path in &settings.infiles {
        let result = analyze_file(path, &options)
            .with_context(|| format!("Failed to analyse {}", path.display()))?;

        tracing::debug!(
            "Run metadata: {}",
            serde_json::to_string(&result.metadata)?
        );
        tracing::info!(
            "{}: {} records -> {} rows x {} sites",
            path.display(),
            result.metadata.records_read,
            result.table.n_rows(),
            result.table.n_columns()
        );

        results.push((path.as_path(), result));
    }

    print!("{}", output::render_results(&results, format, decimals)?);

    Ok(())
}
