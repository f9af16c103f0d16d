//! tabpq CLI: convert a TSV file to Parquet, picking dictionary or plain
//! encoding per column from a sample of the first rows.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Parser;
use tabpq_core::config::ConvertConfig;
use tabpq_exec::{ConversionPlan, Converter, TracingObserver};
use tabpq_io::ParquetAdapter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tabpq")]
#[command(about = "Convert a tab-delimited file to Parquet with automatic per-column encoding", long_about = None)]
struct Cli {
    /// Path to the tab-delimited input (UTF-8, first row is the header)
    input: PathBuf,

    /// Force dictionary encoding for this column (repeatable)
    #[arg(long = "dict-field", value_name = "NAME")]
    dict_fields: Vec<String>,

    /// Output compression: snappy, zstd, or uncompressed
    #[arg(long = "compression-type", value_name = "TYPE", default_value = "snappy")]
    compression_type: String,

    /// Print the encoding decision and exit without writing output
    #[arg(long)]
    explain: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = if cli.explain {
        explain_conversion(&cli)
    } else {
        run_conversion(&cli)
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn converter() -> Result<Converter<ParquetAdapter, TracingObserver>, Box<dyn std::error::Error>> {
    let config = ConvertConfig::from_env();
    let adapter = ParquetAdapter::from_config(&config);
    Ok(Converter::new(config, adapter, TracingObserver)?)
}

fn run_conversion(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut converter = converter()?;
    let manifest = converter.convert(&cli.input, &cli.dict_fields, &cli.compression_type)?;

    println!("✓ Wrote {}", manifest.output_path.display());
    println!(
        "  Rows: {} ({} sampled, {} streamed)",
        manifest.rows_written(),
        manifest.sampled_rows,
        manifest.tail_rows
    );
    println!("  Compression: {}", manifest.compression);
    println!("  Duration: {}ms", manifest.duration_ms());
    println!("  Schema hash: {}", manifest.schema_hash);
    Ok(())
}

fn explain_conversion(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let converter = converter()?;
    let plan = converter.explain(&cli.input, &cli.dict_fields)?;
    print!("{}", format_plan(&plan, converter.config()));
    Ok(())
}

fn format_plan(plan: &ConversionPlan, cfg: &ConvertConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Conversion Plan");
    let _ = writeln!(out, "===============");
    let _ = writeln!(out, "Input:  {}", plan.input_path.display());
    let _ = writeln!(out, "Output: {}", plan.output_path.display());
    let _ = writeln!(
        out,
        "Sampled rows: {}{}",
        plan.sampled_rows,
        if plan.input_exhausted { " (entire input)" } else { "" }
    );
    let _ = writeln!(out, "Dictionary threshold: {} distinct values", cfg.dictionary_threshold);
    let _ = writeln!(out);
    let _ = writeln!(out, "Columns:");
    for (field, col) in plan.schema.fields().iter().zip(&plan.columns) {
        let distinct = if col.saturated {
            format!(">{}", cfg.dictionary_threshold)
        } else {
            col.distinct_count.to_string()
        };
        let _ = writeln!(
            out,
            "  {:<24} {:<16} distinct={}{}",
            field.name,
            field.encoding.tag(),
            distinct,
            if col.forced { " (forced)" } else { "" }
        );
    }
    for name in &plan.unmatched_forced {
        let _ = writeln!(out, "  warning: --dict-field {name} matches no column");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabpq_core::schema::{EncodingChoice, Field, Schema};
    use tabpq_exec::pipeline::ColumnSummary;

    #[test]
    fn defaults_to_snappy_without_forced_fields() {
        let cli = Cli::try_parse_from(["tabpq", "data.tsv"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("data.tsv"));
        assert_eq!(cli.compression_type, "snappy");
        assert!(cli.dict_fields.is_empty());
        assert!(!cli.explain);
    }

    #[test]
    fn dict_field_is_repeatable() {
        let cli = Cli::try_parse_from([
            "tabpq",
            "--dict-field",
            "country",
            "--dict-field",
            "status",
            "--compression-type",
            "zstd",
            "data.tsv",
        ])
        .unwrap();
        assert_eq!(cli.dict_fields, vec!["country", "status"]);
        assert_eq!(cli.compression_type, "zstd");
    }

    #[test]
    fn input_path_is_required() {
        assert!(Cli::try_parse_from(["tabpq"]).is_err());
    }

    #[test]
    fn plan_lists_every_column() {
        let plan = ConversionPlan {
            input_path: "in.tsv".into(),
            output_path: "in.parquet".into(),
            header: vec!["id".into(), "kind".into()],
            schema: Schema::new(vec![
                Field::new("id", EncodingChoice::Plain),
                Field::new("kind", EncodingChoice::DictionaryEligible),
            ]),
            columns: vec![
                ColumnSummary {
                    name: "id".into(),
                    distinct_count: 17,
                    saturated: true,
                    forced: false,
                },
                ColumnSummary {
                    name: "kind".into(),
                    distinct_count: 3,
                    saturated: false,
                    forced: true,
                },
            ],
            sampled_rows: 8192,
            input_exhausted: false,
            unmatched_forced: vec!["nope".into()],
        };
        let text = format_plan(&plan, &ConvertConfig::default());
        assert!(text.contains("Sampled rows: 8192\n"));
        assert!(text.contains("distinct=>16"));
        assert!(text.contains("PLAIN_DICTIONARY"));
        assert!(text.contains("(forced)"));
        assert!(text.contains("--dict-field nope"));
    }
}
