use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use fee_data::{ColumnNames, FeeDataset, GradeVocabulary, ResultTable, Tier};
use pipeline::FilterEngine;
use selection::{build_filter_spec, FilterSpec, Selections};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// fee-filter - Fee schedule filtering tool
#[derive(Parser)]
#[command(name = "fee-filter")]
#[command(about = "Filter fee-schedule items by facility grade, department and exclusion rules", long_about = None)]
struct Cli {
    /// JSON file overriding the default column names
    #[arg(long, global = true)]
    columns: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a fee table and export the deduplicated result
    Filter {
        /// Fee table to read (.tsv, .txt or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the result (.tsv, .txt or .json)
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with saved selections; flags below override it
        #[arg(short, long)]
        selections: Option<PathBuf>,

        #[command(flatten)]
        overrides: SelectionFlags,

        /// Number of result rows to print
        #[arg(long, default_value = "10")]
        preview: usize,

        /// Evaluate rows in parallel (no per-step progress)
        #[arg(long)]
        parallel: bool,
    },

    /// List the values each selection control offers for a fee table
    Options {
        /// Fee table to read (.tsv, .txt or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the tier A/B/C grade vocabularies
    Vocab,
}

/// Selection overrides; an omitted flag leaves the selection untouched
#[derive(Args, Debug, Default)]
struct SelectionFlags {
    /// Allowed tier A grades (comma separated; pass with no value for none)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    tier_a: Option<Vec<String>>,

    /// Allowed tier B grades
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    tier_b: Option<Vec<String>>,

    /// Allowed tier C grades
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    tier_c: Option<Vec<String>>,

    /// Drop tier A tagged rows when no tier A grade is selected
    #[arg(long)]
    strict_a: Option<bool>,

    /// Drop tier B tagged rows when no tier B grade is selected
    #[arg(long)]
    strict_b: Option<bool>,

    /// Drop tier C tagged rows when no tier C grade is selected
    #[arg(long)]
    strict_c: Option<bool>,

    /// Exclude tags to drop
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    exclude_tag: Option<Vec<String>>,

    /// Departments to keep
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    department: Option<Vec<String>>,

    /// Drop items marked 'O' for cancer care (`--exclude-cancer false` to keep them)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    exclude_cancer: Option<bool>,

    /// Drop items marked 'O' for transplant
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    exclude_transplant: Option<bool>,

    /// Test rooms to drop
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    exclude_testroom: Option<Vec<String>>,
}

impl SelectionFlags {
    /// Layer the flags that were given over `base`
    fn apply_to(self, mut base: Selections) -> Selections {
        if self.tier_a.is_some() {
            base.tier_a = self.tier_a;
        }
        if self.tier_b.is_some() {
            base.tier_b = self.tier_b;
        }
        if self.tier_c.is_some() {
            base.tier_c = self.tier_c;
        }
        base.strict_a = self.strict_a.or(base.strict_a);
        base.strict_b = self.strict_b.or(base.strict_b);
        base.strict_c = self.strict_c.or(base.strict_c);
        if self.exclude_tag.is_some() {
            base.exclude_tags = self.exclude_tag;
        }
        if self.department.is_some() {
            base.departments = self.department;
        }
        base.exclude_cancer = self.exclude_cancer.or(base.exclude_cancer);
        base.exclude_transplant = self.exclude_transplant.or(base.exclude_transplant);
        if self.exclude_testroom.is_some() {
            base.exclude_testrooms = self.exclude_testroom;
        }
        base
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let columns = match &cli.columns {
        Some(path) => {
            tracing::info!("Using column names from {}", path.display());
            ColumnNames::from_json_file(path)
                .with_context(|| format!("Failed to read column names from {}", path.display()))?
        }
        None => ColumnNames::default(),
    };
    let vocabulary = Arc::new(GradeVocabulary::default());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Filter {
            input,
            output,
            selections,
            overrides,
            preview,
            parallel,
        } => handle_filter(
            &columns,
            vocabulary,
            &input,
            &output,
            selections.as_deref(),
            overrides,
            preview,
            parallel,
        )?,
        Commands::Options { input, json } => handle_options(&columns, &vocabulary, &input, json)?,
        Commands::Vocab => handle_vocab(&vocabulary),
    }

    Ok(())
}

/// Load a dataset, reporting how long it took
fn load_dataset(path: &Path, columns: &ColumnNames) -> Result<FeeDataset> {
    println!("Loading fee table from {}...", path.display());
    let start = Instant::now();
    let dataset = FeeDataset::load(path, columns)
        .with_context(|| format!("Failed to load fee table {}", path.display()))?;
    println!(
        "{} Loaded {} records in {:?}",
        "✓".green(),
        dataset.len(),
        start.elapsed()
    );
    Ok(dataset)
}

/// Handle the 'filter' command
#[allow(clippy::too_many_arguments)]
fn handle_filter(
    columns: &ColumnNames,
    vocabulary: Arc<GradeVocabulary>,
    input: &Path,
    output: &Path,
    selections_path: Option<&Path>,
    overrides: SelectionFlags,
    preview: usize,
    parallel: bool,
) -> Result<()> {
    let dataset = load_dataset(input, columns)?;

    let base = match selections_path {
        Some(path) => Selections::from_json_file(path)?,
        None => Selections::default(),
    };
    let selections = overrides.apply_to(base);
    let spec = build_filter_spec(&dataset, &vocabulary, &selections)?;
    print_spec(&spec);

    let engine = FilterEngine::new(vocabulary);
    let start = Instant::now();
    let result = if parallel {
        let survivors = engine.filter_parallel(&dataset.records, &spec);
        pipeline::project(&survivors, dataset.has_note)
    } else {
        engine.evaluate_with_progress(&dataset, &spec, |step| {
            println!(
                "  Step {}/{}: {} ({} remaining)",
                step.index, step.total, step.name, step.remaining
            );
        })
    };
    println!(
        "{} Filtering complete: {} rows in {:?}",
        "✓".green(),
        result.len(),
        start.elapsed()
    );

    print_result(&result, columns, preview);

    fee_data::write_result(&result, columns, output)
        .with_context(|| format!("Failed to write result to {}", output.display()))?;
    println!("{} Saved result to {}", "✓".green(), output.display());
    Ok(())
}

/// Everything a selection screen offers for one dataset
#[derive(Serialize)]
struct ControlOptions {
    tier_a: Vec<String>,
    tier_b: Vec<String>,
    tier_c: Vec<String>,
    exclude_tags: Vec<String>,
    departments: Vec<String>,
    testrooms: Vec<String>,
}

/// Handle the 'options' command
fn handle_options(columns: &ColumnNames, vocabulary: &GradeVocabulary, input: &Path, json: bool) -> Result<()> {
    let dataset = load_dataset(input, columns)?;
    let options = ControlOptions {
        tier_a: vocabulary.tokens(Tier::A).to_vec(),
        tier_b: vocabulary.tokens(Tier::B).to_vec(),
        tier_c: vocabulary.tokens(Tier::C).to_vec(),
        exclude_tags: dataset.exclude_values(),
        departments: dataset.departments(),
        testrooms: dataset.testroom_values(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    print_list("Tier A grades", &options.tier_a);
    print_list("Tier B grades", &options.tier_b);
    print_list("Tier C grades", &options.tier_c);
    print_list("Exclude tags", &options.exclude_tags);
    print_list("Departments", &options.departments);
    print_list("Test rooms", &options.testrooms);
    Ok(())
}

/// Handle the 'vocab' command
fn handle_vocab(vocabulary: &GradeVocabulary) {
    for tier in Tier::ALL {
        let title = format!("Tier {} grades", tier);
        print_list(&title, vocabulary.tokens(tier));
    }
}

fn print_list(title: &str, values: &[String]) {
    println!("{} ({})", title.bold().blue(), values.len());
    if values.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for value in values {
        println!("{}{}", "  • ".green(), value);
    }
}

fn join_or_none<'a>(values: impl Iterator<Item = &'a String>) -> String {
    let joined: Vec<&str> = values.map(String::as_str).collect();
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined.join(", ")
    }
}

/// Print the resolved criteria before filtering
fn print_spec(spec: &FilterSpec) {
    println!("{}", "Selected criteria:".bold().blue());
    for tier in Tier::ALL {
        let selection = spec.tier(tier);
        println!(
            "{}Tier {}: {}{}",
            "• ".cyan(),
            tier,
            join_or_none(selection.allowed.iter()),
            if selection.strict_when_empty { "" } else { " [lenient when empty]" }
        );
    }
    println!("{}Exclude tags: {}", "• ".cyan(), join_or_none(spec.excluded_tags.iter()));
    println!("{}Departments: {}", "• ".cyan(), join_or_none(spec.allowed_departments.iter()));
    println!("{}Exclude cancer care: {}", "• ".cyan(), spec.exclude_cancer);
    println!("{}Exclude transplant: {}", "• ".cyan(), spec.exclude_transplant);
    println!("{}Exclude test rooms: {}", "• ".cyan(), join_or_none(spec.excluded_testrooms.iter()));
}

/// Print the first `limit` result rows
fn print_result(result: &ResultTable, columns: &ColumnNames, limit: usize) {
    println!("{}", "Filtered result:".bold().blue());
    println!("{}", result.headers(columns).join(" | ").bold());
    for row in result.rows.iter().take(limit) {
        println!("{}", row.cells(result.include_note).join(" | "));
    }
    if result.len() > limit {
        println!("{}", format!("... {} more rows", result.len() - limit).dimmed());
    }
}
