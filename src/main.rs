//! worksheet-select command line interface.
//!
//! Loads a rendered worksheet list page together with its URL and runs the
//! selection tracker against it, printing JSON to stdout.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use worksheet_select::{
    load_settings, HtmlPage, PageLocation, RowId, SelectionController, SelectionPage, Settings,
};

#[derive(Parser)]
#[command(name = "worksheet-select", version, about = "Cross-page worksheet selection")]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML). Standard locations are searched when omitted.
    #[arg(long, global = true, env = "WORKSHEET_SELECT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PageArgs {
    /// URL the page was rendered for, including its query string.
    #[arg(long)]
    url: String,

    /// Rendered HTML of the page.
    #[arg(long)]
    html: PathBuf,

    /// Rows to check after the page has loaded.
    #[arg(long = "check", value_name = "PK")]
    check: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the rows that would be re-checked when the page loads.
    Restore {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show the pagination links after loading the page and applying checks.
    Links {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show the effective selection and download URL.
    Download {
        #[command(flatten)]
        page: PageArgs,

        /// Download endpoint, overriding configuration.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Decode the accumulator carried by a page URL.
    Accumulator {
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    let output = match cli.command {
        Commands::Restore { page } => {
            let mut controller = load_page(&settings, &page, None)?;
            let restored = controller.restore_checked_state();
            json!({
                "page": controller.location().current_page(&settings.params),
                "restored": restored,
            })
        }
        Commands::Links { page } => {
            let mut controller = load_page(&settings, &page, None)?;
            controller.on_load();
            let accumulator = apply_checks(&mut controller, &page.check);
            json!({
                "accumulator": accumulator,
                "links": controller.page().pagination_hrefs(),
            })
        }
        Commands::Download { page, endpoint } => {
            let mut controller = load_page(&settings, &page, endpoint)?;
            controller.on_load();
            apply_checks(&mut controller, &page.check);
            let request = controller.trigger_download();
            json!(request)
        }
        Commands::Accumulator { url } => {
            let location = PageLocation::parse(&url)?;
            json!({
                "page": location.current_page(&settings.params),
                "accumulator": location.accumulator(&settings.params),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("worksheet_select=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_page(
    settings: &Settings,
    args: &PageArgs,
    endpoint: Option<String>,
) -> anyhow::Result<SelectionController<HtmlPage>> {
    let location = PageLocation::parse(&args.url)?;
    let page = HtmlPage::from_file(&args.html, &settings.selectors)
        .with_context(|| format!("Failed to read page {}", args.html.display()))?;

    let endpoint = endpoint.unwrap_or_else(|| settings.download_endpoint.clone());
    let endpoint = location
        .follow(&endpoint)
        .with_context(|| format!("Invalid download endpoint {}", endpoint))?;

    Ok(SelectionController::new(
        location,
        page,
        settings.tracker(),
        endpoint.url().as_str(),
    ))
}

fn apply_checks(
    controller: &mut SelectionController<HtmlPage>,
    checks: &[String],
) -> worksheet_select::SelectionAccumulator {
    let mut accumulator = controller.merged_accumulator();
    for pk in checks {
        accumulator = controller.set_row_checked(&RowId::from(pk.as_str()), true);
    }
    accumulator
}
