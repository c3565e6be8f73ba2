//! Command handlers behind the `rental` binary.
//!
//! Each handler takes a repository snapshot, runs the pure calculations from
//! [`rental_core::calculations`] and renders the result as either a plain
//! text report or pretty-printed JSON. Handlers return the rendered string so
//! the binary only has to print it.

use std::fmt::Write as _;
use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use rental_core::calculations::{
    calculate_investment, calculate_neighborhood_stats, compare_properties, market_summary,
    price_per_sq_meter, query_properties, top_neighborhoods,
};
use rental_core::{
    CalculatorInputs, ComparisonMetric, FilterOptions, NewProperty, Property, PropertyRepository,
    PropertyUpdate, RepositoryError, SortField, SortOrder,
};
use rental_data::{PropertyLoader, SourceCatalog, mock_sources};
use rental_db_memory::{InMemoryRepository, MEMORY_LOCATION};

use crate::config::Config;
use crate::utils::{
    format_euros, format_grouped, format_percent, format_signed_euros, opt_display,
};

pub const DEFAULT_DATA_PATH: &str = "data/properties.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// ─── wiring ──────────────────────────────────────────────────────────────────

pub fn store_location(config: &Config) -> &str {
    config.data.store.as_deref().unwrap_or(MEMORY_LOCATION)
}

/// Opens the store at `location` and seeds it from the CSV at `data_path`.
pub async fn open_store(
    location: &str,
    data_path: &Path,
) -> Result<InMemoryRepository> {
    let repo = InMemoryRepository::open(location)
        .with_context(|| format!("cannot open property store '{location}'"))?;

    let records = PropertyLoader::parse_file(data_path)
        .with_context(|| format!("cannot load listings from '{}'", data_path.display()))?;
    let loaded = PropertyLoader::load(&repo, &records)
        .await
        .context("cannot store listings")?;

    info!(loaded, path = %data_path.display(), "property store ready");
    Ok(repo)
}

/// The built-in sources with the configured refresh settings applied.
pub fn build_catalog(config: &Config) -> SourceCatalog {
    let mut catalog = SourceCatalog::new(mock_sources(), config.refresh_config());
    for id in &config.refresh.disabled_sources {
        if !catalog.set_enabled(id, false) {
            warn!(source = %id, "ignoring unknown source in disabled_sources");
        }
    }
    catalog
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("cannot serialize output")
}

fn lookup_error(
    id: i64,
    err: RepositoryError,
) -> anyhow::Error {
    match err {
        RepositoryError::NotFound => anyhow::anyhow!("no listing with id {id}"),
        other => anyhow::Error::new(other),
    }
}

// ─── list ────────────────────────────────────────────────────────────────────

pub async fn list(
    repo: &dyn PropertyRepository,
    filters: &FilterOptions,
    field: SortField,
    order: SortOrder,
    format: OutputFormat,
) -> Result<String> {
    let properties = repo.list_properties().await?;
    let selected = query_properties(&properties, filters, field, order);
    debug!(total = properties.len(), shown = selected.len(), %field, %order, "listing");

    match format {
        OutputFormat::Json => to_json(&selected),
        OutputFormat::Text => Ok(render_listings(&selected, properties.len())),
    }
}

fn render_listings(
    properties: &[Property],
    total: usize,
) -> String {
    if properties.is_empty() {
        return format!("No listings match the filters (0 of {total}).\n");
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<32} {:<14} {:>10} {:>8} {:>7} {:>5} {:>5}  {}",
        "ID", "Address", "Neighborhood", "Price", "Rent/mo", "Yield", "m²", "Rooms", "Source"
    );
    for p in properties {
        let _ = writeln!(
            out,
            "{:>3}  {:<32} {:<14} {:>10} {:>8} {:>7} {:>5} {:>5}  {}",
            p.id,
            p.address,
            p.neighborhood,
            format_euros(p.price),
            format_euros(p.monthly_rent),
            format_percent(p.gross_yield),
            p.sq_meters,
            p.bedrooms,
            p.source
        );
    }
    let _ = writeln!(out, "\n{} of {} listings", properties.len(), total);
    out
}

// ─── compare ─────────────────────────────────────────────────────────────────

pub async fn compare(
    repo: &dyn PropertyRepository,
    ids: &[i64],
    format: OutputFormat,
) -> Result<String> {
    if ids.len() < 2 {
        bail!("compare needs at least two listing ids");
    }

    let mut properties = Vec::with_capacity(ids.len());
    for &id in ids {
        let property = repo.get_property(id).await.map_err(|err| lookup_error(id, err))?;
        properties.push(property);
    }
    let rows = compare_properties(&properties);

    match format {
        OutputFormat::Json => to_json(&json!({
            "properties": properties,
            "metrics": rows,
        })),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = write!(out, "{:<10}", "Metric");
            for p in &properties {
                let _ = write!(out, " {:>14}", format!("#{} {}", p.id, p.neighborhood));
            }
            out.push('\n');

            for row in &rows {
                let _ = write!(out, "{:<10}", row.metric.label());
                for (idx, value) in row.values.iter().enumerate() {
                    let mark = if row.winners.contains(&idx) { "*" } else { " " };
                    let cell = format!("{}{mark}", format_metric(row.metric, *value));
                    let _ = write!(out, " {cell:>14}");
                }
                out.push('\n');
            }
            out.push_str("\n* best value\n");
            Ok(out)
        }
    }
}

fn format_metric(
    metric: ComparisonMetric,
    value: Decimal,
) -> String {
    match metric {
        ComparisonMetric::Price
        | ComparisonMetric::MonthlyRent
        | ComparisonMetric::PricePerSqMeter => format_euros(value),
        ComparisonMetric::Yield => format_percent(value),
        ComparisonMetric::SqMeters => format!("{value} m²"),
        ComparisonMetric::Bedrooms => value.to_string(),
    }
}

// ─── neighborhoods ───────────────────────────────────────────────────────────

pub async fn neighborhoods(
    repo: &dyn PropertyRepository,
    top: Option<usize>,
    format: OutputFormat,
) -> Result<String> {
    let properties = repo.list_properties().await?;
    let stats = calculate_neighborhood_stats(&properties);
    let summary = market_summary(&stats, properties.len());
    let shown = match top {
        Some(n) => top_neighborhoods(&stats, n),
        None => &stats[..],
    };

    match format {
        OutputFormat::Json => to_json(&json!({
            "summary": summary,
            "neighborhoods": shown,
        })),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{} areas tracked, {} listings, average yield {}",
                summary.areas_tracked,
                summary.total_properties,
                format_percent(summary.average_yield)
            );
            if let Some((name, best)) = &summary.best {
                let _ = writeln!(out, "Best yield: {name} ({})", format_percent(*best));
            }
            out.push('\n');

            let _ = writeln!(
                out,
                "{:>3}  {:<14} {:>8} {:>10} {:>9} {:>9}  {}",
                "#", "Neighborhood", "Listings", "Avg price", "Avg rent", "Avg yield", "Range"
            );
            for (rank, s) in shown.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>3}  {:<14} {:>8} {:>10} {:>9} {:>9}  {} – {}",
                    rank + 1,
                    s.name,
                    s.property_count,
                    format_euros(s.avg_price),
                    format_euros(s.avg_rent),
                    format_percent(s.avg_yield),
                    format_euros(s.min_price),
                    format_euros(s.max_price)
                );
            }
            Ok(out)
        }
    }
}

// ─── calculate ───────────────────────────────────────────────────────────────

pub fn calculate(
    inputs: &CalculatorInputs,
    format: OutputFormat,
) -> Result<String> {
    let results = calculate_investment(inputs);

    match format {
        OutputFormat::Json => to_json(&json!({
            "inputs": inputs,
            "results": results,
        })),
        OutputFormat::Text => {
            let r = &results;
            let mut out = String::new();
            let _ = writeln!(
                out,
                "Monthly cash flow      {:>12}",
                format_signed_euros(r.monthly_cash_flow)
            );
            let _ = writeln!(
                out,
                "  Effective rent       {:>12}",
                format!("+{}", format_euros(r.effective_monthly_rent))
            );
            let _ = writeln!(
                out,
                "  Mortgage             {:>12}",
                format!("-{}", format_euros(r.monthly_mortgage))
            );
            let _ = writeln!(
                out,
                "  Expenses             {:>12}",
                format!("-{}", format_euros(r.monthly_expenses))
            );
            let _ = writeln!(
                out,
                "  Vacancy loss         {:>12}",
                format!("-{}", format_euros(r.monthly_vacancy_loss))
            );
            out.push('\n');
            let _ = writeln!(out, "Down payment           {:>12}", format_euros(r.down_payment));
            let _ = writeln!(out, "Loan amount            {:>12}", format_euros(r.loan_amount));
            let _ = writeln!(out, "Closing costs          {:>12}", format_euros(r.closing_costs));
            let _ = writeln!(
                out,
                "Total cash invested    {:>12}",
                format_euros(r.total_cash_invested)
            );
            let _ = writeln!(
                out,
                "Annual cash flow       {:>12}",
                format_signed_euros(r.annual_cash_flow)
            );
            let _ = writeln!(
                out,
                "Net operating income   {:>12}",
                format_euros(r.net_operating_income)
            );
            out.push('\n');
            let _ = writeln!(out, "Gross yield            {:>12}", format_percent(r.gross_yield));
            let _ = writeln!(out, "Net yield              {:>12}", format_percent(r.net_yield));
            let _ = writeln!(out, "Cap rate               {:>12}", format_percent(r.cap_rate));
            let _ = writeln!(out, "Cash on cash           {:>12}", format_percent(r.cash_on_cash));
            Ok(out)
        }
    }
}

// ─── add / edit / delete ─────────────────────────────────────────────────────

fn render_property(property: &Property) -> String {
    let p = property;
    let mut out = String::new();
    let _ = writeln!(out, "#{} {} ({})", p.id, p.address, p.neighborhood);
    let _ = writeln!(out, "  Price      {:>14}", format_euros(p.price));
    let _ = writeln!(out, "  Rent/mo    {:>14}", format_euros(p.monthly_rent));
    let _ = writeln!(out, "  Yield      {:>14}", format_percent(p.gross_yield));
    let _ = writeln!(out, "  Price/m²   {:>14}", format_euros(price_per_sq_meter(p)));
    let _ = writeln!(out, "  Size       {:>14}", format!("{} m²", p.sq_meters));
    let _ = writeln!(
        out,
        "  Rooms      {:>14}",
        format!("{} bd / {} ba", p.bedrooms, p.bathrooms)
    );
    let _ = writeln!(out, "  Source     {:>14}", p.source);
    let _ = writeln!(out, "  Image      {:>14}", opt_display(p.image_url.as_deref()));
    let _ = writeln!(out, "  Listed     {:>14}", p.created_at.to_string());
    out
}

fn render_one(
    verb: &str,
    property: &Property,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(property),
        OutputFormat::Text => Ok(format!("{verb} listing\n\n{}", render_property(property))),
    }
}

pub async fn add(
    repo: &dyn PropertyRepository,
    property: NewProperty,
    format: OutputFormat,
) -> Result<String> {
    let created = repo
        .add_property(property)
        .await
        .context("cannot add listing")?;
    render_one("Added", &created, format)
}

pub async fn edit(
    repo: &dyn PropertyRepository,
    id: i64,
    update: PropertyUpdate,
    format: OutputFormat,
) -> Result<String> {
    if update == PropertyUpdate::default() {
        bail!("nothing to change for listing {id}; pass at least one field");
    }

    let updated = repo
        .update_property(id, update)
        .await
        .map_err(|err| lookup_error(id, err))
        .with_context(|| format!("cannot edit listing {id}"))?;
    render_one("Updated", &updated, format)
}

/// Removes a listing and renders what is left, best yield first.
pub async fn delete(
    repo: &dyn PropertyRepository,
    id: i64,
    format: OutputFormat,
) -> Result<String> {
    if !repo.delete_property(id).await? {
        bail!("no listing with id {id}");
    }

    let remaining = repo.list_properties().await?;
    let ranked = query_properties(
        &remaining,
        &FilterOptions::default(),
        SortField::default(),
        SortOrder::default(),
    );

    match format {
        OutputFormat::Json => to_json(&json!({
            "deleted": id,
            "properties": ranked,
        })),
        OutputFormat::Text => Ok(format!(
            "Deleted listing #{id}\n\n{}",
            render_listings(&ranked, remaining.len())
        )),
    }
}

// ─── sources / refresh ───────────────────────────────────────────────────────

fn render_sources(catalog: &SourceCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<8} {:>8} {:<9} {:<20}  {}",
        "Source", "Status", "Listings", "Enabled", "Last scraped", "URL"
    );
    for s in catalog.sources() {
        let last = opt_display(s.last_scraped.map(|t| t.format("%Y-%m-%d %H:%M UTC")));
        let _ = writeln!(
            out,
            "{:<12} {:<8} {:>8} {:<9} {:<20}  {}",
            s.name,
            s.status.as_str(),
            format_grouped(Decimal::from(s.property_count)),
            if s.enabled { "yes" } else { "no" },
            last,
            s.url
        );
        if let Some(message) = &s.error_message {
            let _ = writeln!(out, "  error: {message}");
        }
    }
    out
}

pub async fn sources(
    repo: &dyn PropertyRepository,
    catalog: &SourceCatalog,
    format: OutputFormat,
) -> Result<String> {
    let stats = catalog.stats(repo.count_properties().await?);

    match format {
        OutputFormat::Json => to_json(&json!({
            "stats": stats,
            "sources": catalog.sources(),
        })),
        OutputFormat::Text => {
            let mut out = render_sources(catalog);
            let _ = writeln!(
                out,
                "\n{} listings from {} of {} sources",
                stats.total_properties, stats.active_sources, stats.total_sources
            );
            Ok(out)
        }
    }
}

/// Runs a refresh, handing it `candidates` as the freshly scraped listings.
/// Resolving `cancel` during the simulated delay aborts it.
pub async fn refresh<F>(
    repo: &dyn PropertyRepository,
    catalog: &mut SourceCatalog,
    candidates: Vec<NewProperty>,
    cancel: F,
    format: OutputFormat,
) -> Result<String>
where
    F: Future<Output = ()>,
{
    let outcome = catalog.refresh_until(repo, candidates, cancel).await;

    match format {
        OutputFormat::Json => to_json(&json!({
            "outcome": outcome,
            "sources": catalog.sources(),
        })),
        OutputFormat::Text => {
            let headline = if outcome.cancelled {
                "Refresh cancelled".to_string()
            } else if outcome.success {
                format!("Refresh complete: {} new listings", outcome.total_added)
            } else {
                format!("Refresh failed after {} new listings", outcome.total_added)
            };
            Ok(format!("{headline}\n\n{}", render_sources(catalog)))
        }
    }
}
