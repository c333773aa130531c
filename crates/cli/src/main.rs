use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use coordinator::{
    BrowseCoordinator, MemoryBackend, Mutation, Persistence, ViewContext, ViewSource,
};
use filters::{DerivedView, FilterState, SortKey, SortOrder};
use records::{Facets, Record, RecordKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Gigboard - browse freelancers and job posts
#[derive(Parser)]
#[command(name = "gigboard")]
#[command(about = "Filter and manage marketplace listings from a JSON dataset", long_about = None)]
struct Cli {
    /// Path to the marketplace dataset (JSON object of collection -> rows)
    #[arg(short, long, default_value = "data/marketplace.json")]
    data: PathBuf,

    /// Act as this user id (tags own listings and applications)
    #[arg(long, global = true)]
    actor: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the records of a view that pass the given filters
    Browse {
        #[arg(value_enum, default_value = "jobs")]
        source: Source,

        #[command(flatten)]
        filter: FilterArgs,

        /// Sort keys applied in order (featured, display_order, recency)
        #[arg(long = "sort")]
        sort: Vec<SortKey>,

        /// Hide listings owned by the acting user
        #[arg(long)]
        exclude_own: bool,

        /// Maximum number of rows to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show tag, category and amount summaries for a view
    Facets {
        #[arg(value_enum, default_value = "jobs")]
        source: Source,

        /// Number of tags to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Delete a record and print the reloaded view
    Remove {
        #[arg(value_enum)]
        source: Source,

        /// Key of the record to delete
        key: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    /// Available freelancer profiles
    Freelancers,
    /// Open job posts
    Jobs,
    /// Job posts owned by the acting user
    Mine,
}

#[derive(Args)]
struct FilterArgs {
    /// Start from a JSON FilterState file; flags below override its fields
    #[arg(long)]
    filter_file: Option<PathBuf>,

    /// Case-insensitive substring over name, title, description and tags
    #[arg(long)]
    search: Option<String>,

    /// Minimum amount (rate or pay), inclusive
    #[arg(long, allow_negative_numbers = true)]
    min: Option<f64>,

    /// Maximum amount (rate or pay), inclusive
    #[arg(long, allow_negative_numbers = true)]
    max: Option<f64>,

    /// Exact category (experience level or job status)
    #[arg(long)]
    category: Option<String>,

    /// Tag to match; repeat to match any of several
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Case-insensitive substring over city or country
    #[arg(long)]
    location: Option<String>,
}

impl FilterArgs {
    fn into_state(self) -> Result<FilterState> {
        let mut state = match &self.filter_file {
            Some(path) => read_filter_file(path)?,
            None => FilterState::new(),
        };

        if let Some(search) = self.search {
            state = state.with_search(search);
        }
        if let Some(min) = self.min {
            state = state.with_min(min);
        }
        if let Some(max) = self.max {
            state = state.with_max(max);
        }
        if let Some(category) = self.category {
            state = state.with_category(category);
        }
        for tag in self.tags {
            state = state.with_tag(tag);
        }
        if let Some(location) = self.location {
            state = state.with_location(location);
        }
        Ok(state)
    }
}

fn read_filter_file(path: &Path) -> Result<FilterState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid filter file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading marketplace from {}...", cli.data.display());
    let start = Instant::now();
    let backend = Arc::new(
        MemoryBackend::from_json_file(&cli.data).context("Failed to load marketplace dataset")?,
    );
    if let Some(actor) = &cli.actor {
        backend.sign_in(actor.clone());
    }
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    let context = ViewContext::from_session(backend.session().as_ref());

    match cli.command {
        Commands::Browse {
            source,
            filter,
            sort,
            exclude_own,
            limit,
        } => {
            let context = if exclude_own {
                context.excluding_own()
            } else {
                context
            };
            handle_browse(backend, context, source, filter, sort, limit).await?
        }
        Commands::Facets { source, top } => handle_facets(backend, context, source, top).await?,
        Commands::Remove { source, key } => handle_remove(backend, context, source, key).await?,
    }

    Ok(())
}

fn view_source(source: Source, context: &ViewContext) -> Result<ViewSource> {
    Ok(match source {
        Source::Freelancers => ViewSource::freelancers(),
        Source::Jobs => ViewSource::open_jobs(),
        Source::Mine => match &context.actor_id {
            Some(actor) => ViewSource::jobs_posted_by(actor),
            None => bail!("--actor is required to list your own posts"),
        },
    })
}

async fn open_view(
    backend: Arc<MemoryBackend>,
    context: ViewContext,
    source: Source,
) -> Result<BrowseCoordinator> {
    let source = view_source(source, &context)?;
    let coordinator = BrowseCoordinator::new(backend, source, context);
    coordinator
        .reload()
        .await
        .context("Failed to load browse view")?;
    Ok(coordinator)
}

/// Handle the 'browse' command
async fn handle_browse(
    backend: Arc<MemoryBackend>,
    context: ViewContext,
    source: Source,
    filter: FilterArgs,
    sort: Vec<SortKey>,
    limit: usize,
) -> Result<()> {
    let state = filter.into_state()?;
    if let Err(e) = state.validate() {
        warn!("Filter matches nothing: {}", e);
    }

    let coordinator = open_view(backend, context, source).await?;
    if !sort.is_empty() {
        coordinator.set_sort(SortOrder::by(sort)).await;
    }
    let total = coordinator.store_len().await;
    let view = coordinator.set_filter(state).await;

    print_view(&view, total, limit);
    Ok(())
}

/// Handle the 'facets' command
async fn handle_facets(
    backend: Arc<MemoryBackend>,
    context: ViewContext,
    source: Source,
    top: usize,
) -> Result<()> {
    let coordinator = open_view(backend, context, source).await?;
    let facets = coordinator.facets().await;
    print_facets(&facets, top);
    Ok(())
}

/// Handle the 'remove' command
async fn handle_remove(
    backend: Arc<MemoryBackend>,
    context: ViewContext,
    source: Source,
    key: String,
) -> Result<()> {
    let coordinator = open_view(backend, context, source).await?;
    let outcome = coordinator
        .submit(Mutation::Delete { key: key.clone() })
        .await
        .with_context(|| format!("Failed to remove {}", key))?;

    println!(
        "{} Removed {} ({} remaining)",
        "✓".green(),
        outcome.ack.key,
        outcome.visible
    );
    let view = coordinator.view().await;
    print_view(&view, view.len(), view.len());
    Ok(())
}

fn print_view(view: &DerivedView, total: usize, limit: usize) {
    println!(
        "{}",
        format!("Showing {} of {} listings:", view.len(), total)
            .bold()
            .blue()
    );
    for (rank, record) in view.iter().take(limit).enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), describe(record));
    }
    if view.len() > limit {
        println!("   ... {} more", view.len() - limit);
    }
}

fn describe(record: &Record) -> String {
    let mut line = format!("{} [{}]", record.heading().bold(), record.key);

    if let Some(amount) = record.amount {
        let unit = match record.kind {
            RecordKind::Freelancer => "/hr",
            RecordKind::JobPost => "",
        };
        line.push_str(&format!(" ${:.0}{}", amount, unit));
    }
    if let Some(category) = &record.category {
        line.push_str(&format!(" ({})", category));
    }
    let place: Vec<&str> = [record.city.as_deref(), record.country.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        line.push_str(&format!(" - {}", place.join(", ")));
    }
    if !record.tags.is_empty() {
        line.push_str(&format!(" [{}]", record.tags.join(", ")));
    }
    if record.owned_by_actor {
        line.push_str(&format!(" {}", "yours".yellow()));
    }
    if record.applied_by_actor {
        line.push_str(&format!(" {}", "applied".cyan()));
    }
    line
}

fn print_facets(facets: &Facets, top: usize) {
    println!("{}", format!("{} listings", facets.total).bold().blue());

    match facets.amount_range {
        Some((lo, hi)) => println!("{}Amount: ${:.0} - ${:.0}", "• ".green(), lo, hi),
        None => println!("{}Amount: none set", "• ".green()),
    }
    if facets.missing_amount > 0 {
        println!("{}Without amount: {}", "• ".green(), facets.missing_amount);
    }

    println!("Categories:");
    for (category, count) in &facets.categories {
        println!("  - {}: {}", category, count);
    }

    println!("Top tags:");
    for (tag, count) in facets.top_tags(top) {
        println!("  - {}: {}", tag, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filters::ValidationError;

    fn browse_filter(args: &[&str]) -> FilterArgs {
        let mut argv = vec!["gigboard", "browse", "jobs"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Browse { filter, .. } => filter,
            _ => panic!("expected browse"),
        }
    }

    #[test]
    fn test_negative_bound_reaches_validation() {
        let state = browse_filter(&["--min", "-5", "--max", "10"]).into_state().unwrap();
        assert_eq!(state.min_value, Some(-5.0));
        assert!(matches!(
            state.validate(),
            Err(ValidationError::Negative { field: "min_value", .. })
        ));
    }

    #[test]
    fn test_repeated_tags_and_sort() {
        let cli = Cli::try_parse_from([
            "gigboard", "browse", "freelancers", "--tag", "react", "--tag", "rust", "--sort", "featured",
        ])
        .unwrap();
        let Commands::Browse { filter, sort, .. } = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(sort, vec![SortKey::Featured]);
        assert_eq!(filter.into_state().unwrap().tags.len(), 2);
    }
}
