// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use data_map::{
    group_systems, ordered_group_keys, schema::has_critical, unique_data_categories,
    CategoryIndex, Dataset, FilterSelection, LayoutMode, ViewConfig,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "data-map", version, about = "Explore a privacy data map of systems")]
struct Cli {
    /// Dataset file (JSON array of systems); bundled sample when omitted
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// View configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Counts and filter option lists
    Summary,
    /// Report questionable records
    Validate,
    /// Systems matching the selected data uses and categories
    Filter(FilterArgs),
    /// Systems partitioned into buckets
    Groups {
        /// system_type or data_use
        #[arg(
            long = "by",
            value_parser = str::parse::<LayoutMode>,
            default_value_t = LayoutMode::SystemType
        )]
        by: LayoutMode,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Systems sharing a data category with KEY
    Related {
        key: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Interactive terminal viewer (default)
    View,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Data use to keep (repeatable)
    #[arg(long = "use", value_name = "DATA_USE")]
    uses: Vec<String>,

    /// Short data category to keep (repeatable)
    #[arg(long = "category", value_name = "CATEGORY")]
    categories: Vec<String>,
}

impl FilterArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection::new(self.uses.clone(), self.categories.clone())
    }
}

// ============================================================================
// JSON OUTPUT SHAPES
// ============================================================================

#[derive(Serialize)]
struct SummaryOutput {
    raw_count: usize,
    system_count: usize,
    dropped_keys: Vec<String>,
    data_uses: Vec<String>,
    data_categories: Vec<CategoryCount>,
}

#[derive(Serialize)]
struct CategoryCount {
    category: String,
    systems: usize,
}

#[derive(Serialize)]
struct GroupOutput {
    key: String,
    systems: Vec<String>,
}

#[derive(Serialize)]
struct RelatedOutput {
    key: String,
    related: Vec<String>,
    connections: Vec<data_map::Connection>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = ViewConfig::load_or_default(cli.config.as_deref())?;
    let dataset = Dataset::load_or_sample(cli.data.as_deref())?;

    match cli.command.as_ref().unwrap_or(&Command::View) {
        Command::Summary => run_summary(&dataset, cli.json),
        Command::Validate => run_validate(&dataset, cli.json),
        Command::Filter(filters) => run_filter(&dataset, filters, cli.json),
        Command::Groups { by, filters } => {
            run_groups(&dataset, &config, *by, filters, cli.json)
        }
        Command::Related { key, filters } => run_related(&dataset, key, filters, cli.json),
        Command::View => run_ui_mode(dataset, config),
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_summary(dataset: &Dataset, json: bool) -> Result<()> {
    let index = CategoryIndex::build(&dataset.systems);
    let data_categories = dataset
        .data_categories()
        .into_iter()
        .map(|category| {
            let systems = index.systems_with_category(&category).map_or(0, |keys| keys.len());
            CategoryCount { category, systems }
        })
        .collect();

    let summary = SummaryOutput {
        raw_count: dataset.raw_count,
        system_count: index.system_count(),
        dropped_keys: dataset.dropped_keys.clone(),
        data_uses: dataset.data_uses(),
        data_categories,
    };

    if json {
        return print_json(&summary);
    }

    println!("📊 Data Map Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Records read:      {}", summary.raw_count);
    println!("Unique systems:    {}", summary.system_count);
    if !summary.dropped_keys.is_empty() {
        println!("Duplicates:        {}", summary.dropped_keys.join(", "));
    }
    println!("\nData uses ({}):", summary.data_uses.len());
    for data_use in &summary.data_uses {
        println!("  • {}", data_use);
    }
    println!("\nData categories ({}):", summary.data_categories.len());
    for entry in &summary.data_categories {
        println!("  • {:<24} {} systems", entry.category, entry.systems);
    }
    Ok(())
}

fn run_validate(dataset: &Dataset, json: bool) -> Result<()> {
    if json {
        print_json(&dataset.issues)?;
    } else if dataset.issues.is_empty() {
        println!("✓ No issues found in {} records", dataset.raw_count);
    } else {
        for issue in &dataset.issues {
            println!("{}", issue);
        }
    }

    if has_critical(&dataset.issues) {
        anyhow::bail!("dataset has critical issues");
    }
    Ok(())
}

fn run_filter(dataset: &Dataset, filters: &FilterArgs, json: bool) -> Result<()> {
    let filtered = filters.selection().apply(&dataset.systems);

    if json {
        return print_json(&filtered);
    }

    println!("{} of {} systems match", filtered.len(), dataset.systems.len());
    for system in &filtered {
        println!(
            "  {:<24} {:<14} {}",
            system.fides_key,
            system.system_type,
            unique_data_categories(system).join(", ")
        );
    }
    Ok(())
}

fn run_groups(
    dataset: &Dataset,
    config: &ViewConfig,
    mode: LayoutMode,
    filters: &FilterArgs,
    json: bool,
) -> Result<()> {
    let filtered = filters.selection().apply(&dataset.systems);
    let groups = group_systems(&filtered, mode);

    let output: Vec<GroupOutput> = ordered_group_keys(&groups, mode, &config.system_type_order)
        .into_iter()
        .map(|key| {
            let systems = groups
                .get(&key)
                .unwrap_or(&[])
                .iter()
                .map(|s| s.fides_key.clone())
                .collect();
            GroupOutput { key, systems }
        })
        .collect();

    if json {
        return print_json(&output);
    }

    println!("Grouped by {}", mode.title());
    for group in &output {
        println!("\n▸ {} ({})", group.key, group.systems.len());
        for key in &group.systems {
            println!("    {}", key);
        }
    }
    Ok(())
}

fn run_related(dataset: &Dataset, key: &str, filters: &FilterArgs, json: bool) -> Result<()> {
    let filtered = filters.selection().apply(&dataset.systems);
    let index = CategoryIndex::build(&filtered);

    if !filtered.iter().any(|s| s.fides_key == key) {
        log::warn!(
            "System '{}' is not among the {} filtered systems",
            key,
            index.system_count()
        );
    }

    let output = RelatedOutput {
        key: key.to_string(),
        related: index.related_keys(key).into_iter().collect(),
        connections: index.connections_for(key),
    };

    if json {
        return print_json(&output);
    }

    println!("Related to {} ({}):", output.key, output.related.len());
    for related in &output.related {
        let marker = if related == key { "●" } else { "○" };
        println!("  {} {}", marker, related);
    }
    if !output.connections.is_empty() {
        println!("\nConnections:");
        for connection in &output.connections {
            println!("  {} ⇢ {}", connection.from, connection.to);
        }
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(dataset: Dataset, config: ViewConfig) -> Result<()> {
    let mut app = ui::App::new(dataset, config);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_dataset: Dataset, _config: ViewConfig) -> Result<()> {
    anyhow::bail!("TUI mode not available; rebuild with --features tui or use a subcommand")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("data-map").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_groups_by_parses_layout_mode() {
        match parse(&["groups", "--by", "data_use"]).command {
            Some(Command::Groups { by, .. }) => assert_eq!(by, LayoutMode::DataUse),
            other => panic!("unexpected command: {:?}", other),
        }
        match parse(&["groups"]).command {
            Some(Command::Groups { by, .. }) => assert_eq!(by, LayoutMode::SystemType),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_groups_by_rejects_unknown_layout() {
        let err = Cli::try_parse_from(["data-map", "groups", "--by", "owner"]).unwrap_err();
        assert!(err.to_string().contains("Unknown layout mode 'owner'"));
    }

    #[test]
    fn test_filter_args_collect_repeated_values() {
        match parse(&["related", "web_app", "--category", "email", "--category", "email"]).command {
            Some(Command::Related { key, filters }) => {
                assert_eq!(key, "web_app");
                assert_eq!(filters.selection().selected_categories, vec!["email".to_string()]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
