use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use rental_cli::app::{self, DEFAULT_DATA_PATH, DEFAULT_LOG_LEVEL, OutputFormat};
use rental_cli::config::{CalculatorSection, Config};
use rental_cli::logging;
use rental_cli::utils::parse_decimal;
use rental_core::{
    CalculatorInputs, FilterOptions, NewProperty, PropertyRepository, PropertyUpdate, SortField,
    SortOrder,
};
use rental_data::PropertyLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Rental investment dashboard for buy-to-let listings.
///
/// Loads listings from a CSV file into the configured store and prints
/// yield rankings, comparisons and investment projections.
#[derive(Debug, Parser)]
#[command(name = "rental", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Listings CSV to load [default: data/properties.csv].
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Browse listings, best yield first.
    List {
        #[arg(long)]
        neighborhood: Option<String>,
        #[arg(long, value_parser = parse_decimal)]
        min_price: Option<Decimal>,
        #[arg(long, value_parser = parse_decimal)]
        max_price: Option<Decimal>,
        #[arg(long, value_parser = parse_decimal)]
        min_yield: Option<Decimal>,
        #[arg(long)]
        min_bedrooms: Option<u32>,
        /// yield, price, monthly-rent, sq-meters or bedrooms.
        #[arg(long, default_value_t = SortField::Yield)]
        sort: SortField,
        #[arg(long, default_value_t = SortOrder::Desc)]
        order: SortOrder,
    },

    /// Compare listings side by side.
    Compare {
        #[arg(required = true, num_args = 2..)]
        ids: Vec<i64>,
    },

    /// Neighborhoods ranked by average yield.
    Neighborhoods {
        /// Show only the best N.
        #[arg(long)]
        top: Option<usize>,
    },

    /// Project cash flow and returns for a purchase.
    Calculate(CalculateArgs),

    /// Add a listing and show it. Changes last for this run only.
    Add(AddArgs),

    /// Change fields of a listing and show the result.
    Edit {
        id: i64,
        #[command(flatten)]
        changes: EditArgs,
    },

    /// Remove a listing and show the ones left.
    Delete { id: i64 },

    /// Show the listing portals and their status.
    Sources,

    /// Simulate a scrape of every enabled portal. Ctrl-C cancels.
    Refresh {
        /// CSV of newly scraped listings to offer the refresh.
        #[arg(long)]
        from: Option<PathBuf>,
    },
}

/// Any flag left out falls back to the `[calculator]` config section, then
/// to the built-in scenario.
#[derive(Debug, clap::Args)]
struct CalculateArgs {
    #[arg(long, value_parser = parse_decimal)]
    price: Option<Decimal>,
    /// Percent of the price.
    #[arg(long, value_parser = parse_decimal)]
    down_payment: Option<Decimal>,
    /// Annual interest rate, percent.
    #[arg(long, value_parser = parse_decimal)]
    rate: Option<Decimal>,
    /// Loan term in years.
    #[arg(long, value_parser = parse_decimal)]
    term: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal)]
    rent: Option<Decimal>,
    /// Annual property tax.
    #[arg(long, value_parser = parse_decimal)]
    tax: Option<Decimal>,
    /// Annual insurance.
    #[arg(long, value_parser = parse_decimal)]
    insurance: Option<Decimal>,
    /// Percent of rent.
    #[arg(long, value_parser = parse_decimal)]
    maintenance: Option<Decimal>,
    /// Percent of rent.
    #[arg(long, value_parser = parse_decimal)]
    vacancy: Option<Decimal>,
}

#[derive(Debug, clap::Args)]
struct AddArgs {
    #[arg(long)]
    address: String,
    #[arg(long)]
    neighborhood: String,
    #[arg(long, value_parser = parse_decimal)]
    price: Decimal,
    /// Monthly rent.
    #[arg(long, value_parser = parse_decimal)]
    rent: Decimal,
    #[arg(long, default_value_t = 0)]
    sq_meters: u32,
    #[arg(long, default_value_t = 0)]
    bedrooms: u32,
    #[arg(long, default_value_t = 0)]
    bathrooms: u32,
    #[arg(long, default_value = "Manual")]
    source: String,
    #[arg(long)]
    image_url: Option<String>,
}

impl From<AddArgs> for NewProperty {
    fn from(args: AddArgs) -> Self {
        Self {
            address: args.address,
            neighborhood: args.neighborhood,
            price: args.price,
            monthly_rent: args.rent,
            sq_meters: args.sq_meters,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            source: args.source,
            image_url: args.image_url,
        }
    }
}

/// Only the flags given are changed.
#[derive(Debug, clap::Args)]
struct EditArgs {
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    neighborhood: Option<String>,
    #[arg(long, value_parser = parse_decimal)]
    price: Option<Decimal>,
    #[arg(long, value_parser = parse_decimal)]
    rent: Option<Decimal>,
    #[arg(long)]
    sq_meters: Option<u32>,
    #[arg(long)]
    bedrooms: Option<u32>,
    #[arg(long)]
    bathrooms: Option<u32>,
    #[arg(long)]
    source: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    /// Remove the listing's image.
    #[arg(long, conflicts_with = "image_url")]
    clear_image: bool,
}

impl From<EditArgs> for PropertyUpdate {
    fn from(args: EditArgs) -> Self {
        let image_url = if args.clear_image {
            Some(None)
        } else {
            args.image_url.map(Some)
        };
        Self {
            address: args.address,
            neighborhood: args.neighborhood,
            price: args.price,
            monthly_rent: args.rent,
            sq_meters: args.sq_meters,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            source: args.source,
            image_url,
        }
    }
}

impl CalculateArgs {
    fn resolve(
        self,
        config: &Config,
    ) -> CalculatorInputs {
        let mut inputs = CalculatorInputs::default();
        config.calculator.apply_to(&mut inputs);

        CalculatorSection {
            purchase_price: self.price,
            down_payment_percent: self.down_payment,
            interest_rate: self.rate,
            loan_term_years: self.term,
            monthly_rent: self.rent,
            property_tax_annual: self.tax,
            insurance_annual: self.insurance,
            maintenance_percent: self.maintenance,
            vacancy_percent: self.vacancy,
        }
        .apply_to(&mut inputs);
        inputs
    }
}

async fn run_with_store(
    command: Command,
    repo: &dyn PropertyRepository,
    config: &Config,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match command {
        Command::List {
            neighborhood,
            min_price,
            max_price,
            min_yield,
            min_bedrooms,
            sort,
            order,
        } => {
            let filters = FilterOptions {
                neighborhood,
                min_price,
                max_price,
                min_yield,
                min_bedrooms,
            };
            app::list(repo, &filters, sort, order, format).await
        }
        Command::Compare { ids } => app::compare(repo, &ids, format).await,
        Command::Neighborhoods { top } => app::neighborhoods(repo, top, format).await,
        Command::Calculate(args) => app::calculate(&args.resolve(config), format),
        Command::Add(args) => app::add(repo, args.into(), format).await,
        Command::Edit { id, changes } => app::edit(repo, id, changes.into(), format).await,
        Command::Delete { id } => app::delete(repo, id, format).await,
        Command::Sources => {
            let catalog = app::build_catalog(config);
            app::sources(repo, &catalog, format).await
        }
        Command::Refresh { from } => {
            let candidates = match &from {
                Some(path) => PropertyLoader::parse_file(path)
                    .with_context(|| format!("cannot load candidates from '{}'", path.display()))?,
                None => Vec::new(),
            };
            debug!(candidates = candidates.len(), "starting refresh");

            let mut catalog = app::build_catalog(config);
            let cancel = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    // no signal handler available: never cancel
                    std::future::pending::<()>().await;
                }
                info!("interrupt received");
            };
            app::refresh(repo, &mut catalog, candidates, cancel, format).await
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_optional(cli.config.as_deref())?;

    let log_level = cli
        .log_level
        .or_else(|| config.logging.level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let log_file = cli.log_file.or_else(|| config.logging.file.clone());
    logging::init_logging(&log_level, log_file.as_deref())?;

    let data_path = cli
        .data
        .or_else(|| config.data.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let format = cli.format;

    // The calculator needs no listings, so the store is only opened for the
    // other commands.
    let output = match cli.command {
        Command::Calculate(args) => app::calculate(&args.resolve(&config), format)?,
        command => {
            let repo = app::open_store(app::store_location(&config), &data_path).await?;
            run_with_store(command, &repo, &config, format).await?
        }
    };

    print!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("rental").chain(args.iter().copied()))
            .expect("arguments should parse")
            .command
    }

    #[test]
    fn add_fills_form_defaults() {
        let Command::Add(args) = parse(&[
            "add",
            "--address",
            "Carrer del Clot 73",
            "--neighborhood",
            "Clot",
            "--price",
            "195,000€",
            "--rent",
            "980",
        ]) else {
            panic!("expected add");
        };

        let property = NewProperty::from(args);

        assert_eq!(property.price, dec!(195000));
        assert_eq!(property.monthly_rent, dec!(980));
        assert_eq!(property.source, "Manual");
        assert_eq!(property.sq_meters, 0);
        assert_eq!(property.image_url, None);
    }

    #[test]
    fn edit_sets_only_given_fields() {
        let Command::Edit { id, changes } = parse(&["edit", "7", "--rent", "1250", "--clear-image"])
        else {
            panic!("expected edit");
        };

        assert_eq!(id, 7);
        assert_eq!(
            PropertyUpdate::from(changes),
            PropertyUpdate {
                monthly_rent: Some(dec!(1250)),
                image_url: Some(None),
                ..Default::default()
            }
        );
    }

    #[test]
    fn edit_rejects_image_and_clear_together() {
        let result = Cli::try_parse_from([
            "rental",
            "edit",
            "7",
            "--image-url",
            "https://images.example.com/a.jpg",
            "--clear-image",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn delete_takes_an_id() {
        assert!(matches!(parse(&["delete", "3"]), Command::Delete { id: 3 }));
    }
}
