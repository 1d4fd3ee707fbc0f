use std::path::Path;

use catchment_core::error::Result;
use catchment_core::formatting::OutputFormat;
use catchment_data::analysis::{AnalysisResult, DerivedTable};
use serde::Serialize;

/// One file's table as it appears in JSON output.
#[derive(Serialize)]
struct LabelledTable<'a> {
    source: String,
    statistic: &'a str,
    table: &'a DerivedTable,
}

/// Render every analysed file as a single document.
///
/// Text and CSV print each table under a `# <path>` heading. JSON is one
/// array of `{ source, statistic, table }` objects in input order.
pub fn render_results(
    results: &[(&Path, AnalysisResult)],
    format: OutputFormat,
    decimals: usize,
) -> Result<String> {
    if format == OutputFormat::Json {
        let labelled: Vec<LabelledTable<'_>> = results
            .iter()
            .map(|(path, result)| LabelledTable {
                source: path.display().to_string(),
                statistic: &result.metadata.statistic,
                table: &result.table,
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&labelled)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for (i, (path, result)) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("# {}\n", path.display()));
        out.push_str(&result.table.render(format, decimals)?);
    }
    Ok(out)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
