use std::{
    io::Write,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flashsale::{
    countdown::describe_phase_countdown,
    fixtures::Fixture,
    instants::{Clock, ManualClock, SystemClock},
    observability::{LogFormat, LoggingConfig},
    orders::quote_order,
    promotions::{PromotionDefinition, catalog::PromotionCatalog},
    receipt::Receipt,
    resolver::{campaign_overview, resolve},
    ticker::{OfferTicker, TickOutcome},
};
use jiff::{SignedDuration, Timestamp};

#[derive(Debug, Parser)]
#[command(name = "flashsale", about = "Promotional pricing CLI", long_about = None)]
pub(crate) struct Cli {
    /// Directory holding `promotions/` and `orders/` fixture sets
    #[arg(long, env = "FLASHSALE_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Default log filter when `RUST_LOG` is unset
    #[arg(long, env = "FLASHSALE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "FLASHSALE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the offer in effect
    Resolve(EvaluateArgs),

    /// List every campaign with its status and countdown
    Overview(EvaluateArgs),

    /// Price an order under the offer in effect
    Quote(QuoteArgs),

    /// Re-resolve on a timer and report changes
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
struct EvaluateArgs {
    /// Promotion fixture set name
    #[arg(short, long, default_value = "happy_hour")]
    set: String,

    /// Instant to evaluate at (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    #[command(flatten)]
    evaluate: EvaluateArgs,

    /// Order fixture name; defaults to the promotion set name
    #[arg(short, long)]
    order: Option<String>,
}

#[derive(Debug, Args)]
struct WatchArgs {
    /// Promotion fixture set name
    #[arg(short, long, default_value = "happy_hour")]
    set: String,

    /// Number of ticks before exiting
    #[arg(short = 'n', long, default_value_t = 10)]
    ticks: u32,

    /// Seconds between ticks
    #[arg(short, long, default_value_t = 1)]
    interval: u32,

    /// Replay from this instant on a simulated clock instead of sleeping
    #[arg(long)]
    from: Option<Timestamp>,
}

impl Cli {
    pub(crate) fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }

    pub(crate) fn run(self, out: &mut impl Write) -> Result<()> {
        match self.command {
            Commands::Resolve(args) => {
                let catalog = load_catalog(&self.fixtures, &args.set)?;
                run_resolve(out, catalog.as_slice(), instant(args.at))
            }
            Commands::Overview(args) => {
                let catalog = load_catalog(&self.fixtures, &args.set)?;
                run_overview(out, catalog.as_slice(), instant(args.at))
            }
            Commands::Quote(args) => run_quote(out, &self.fixtures, &args),
            Commands::Watch(args) => {
                let catalog = load_catalog(&self.fixtures, &args.set)?;
                let step = SignedDuration::from_secs(i64::from(args.interval));

                match args.from {
                    Some(from) => {
                        let clock = ManualClock::new(from);
                        run_watch(out, &catalog, OfferTicker::new(clock), args.ticks, |clock| {
                            clock.advance(step);
                        })
                    }
                    None => run_watch(out, &catalog, OfferTicker::new(SystemClock), args.ticks, |_| {
                        thread::sleep(Duration::from_secs(u64::from(args.interval)));
                    }),
                }
            }
        }
    }
}

fn instant(at: Option<Timestamp>) -> Timestamp {
    at.unwrap_or_else(|| SystemClock.now())
}

fn load_catalog(base: &Path, set: &str) -> Result<PromotionCatalog> {
    let mut fixture = Fixture::with_base_path(base);

    fixture
        .load_promotions(set)
        .with_context(|| format!("failed to load promotion set {set}"))?;

    Ok(fixture.catalog()?)
}

fn run_resolve(out: &mut impl Write, promotions: &[PromotionDefinition], now: Timestamp) -> Result<()> {
    match resolve(promotions, now) {
        Some(offer) => writeln!(
            out,
            "{} ({}): {}% off [{}]",
            offer.promotion.title,
            offer.promotion.id,
            offer.effective_percentage.normalize(),
            offer.phase
        )?,
        None => writeln!(out, "no offer applies at {now}")?,
    }

    Ok(())
}

fn run_overview(out: &mut impl Write, promotions: &[PromotionDefinition], now: Timestamp) -> Result<()> {
    for status in campaign_overview(promotions, now) {
        let promotion = status.promotion;

        write!(out, "{:<16} {:<16}", promotion.id, status.label())?;

        match describe_phase_countdown(promotion, now) {
            Ok(countdown) => writeln!(
                out,
                " {:>6}%  {countdown}",
                countdown.effective_percentage.normalize()
            )?,
            Err(error) => writeln!(out, " {error}")?,
        }

        if let Some(decay) = promotion.dynamic_pricing {
            writeln!(out, "{:<16} {decay}", "")?;
        }
    }

    Ok(())
}

fn run_quote(out: &mut impl Write, base: &Path, args: &QuoteArgs) -> Result<()> {
    let set = &args.evaluate.set;
    let order_name = args.order.as_deref().unwrap_or(set);

    let mut fixture = Fixture::with_base_path(base);

    fixture
        .load_promotions(set)
        .with_context(|| format!("failed to load promotion set {set}"))?
        .load_order(order_name)
        .with_context(|| format!("failed to load order {order_name}"))?;

    let catalog = fixture.catalog()?;
    let order = fixture.order()?;
    let offer = resolve(catalog.as_slice(), instant(args.evaluate.at));
    let quote = quote_order(&order, offer.as_ref())?;

    Receipt::new(&quote).write_to(out)?;

    Ok(())
}

fn run_watch<C: Clock>(
    out: &mut impl Write,
    catalog: &PromotionCatalog,
    mut ticker: OfferTicker<C>,
    ticks: u32,
    mut wait: impl FnMut(&C),
) -> Result<()> {
    for tick in 0..ticks {
        if tick > 0 {
            wait(ticker.clock());
        }

        let outcome = ticker.tick(catalog.as_slice());
        let now = ticker.last_tick().unwrap_or_else(|| ticker.clock().now());

        let banner = match ticker.latest() {
            Some(snapshot) => {
                let countdown = describe_phase_countdown(&snapshot.promotion, now)?;
                format!(
                    "{} {}% off, {countdown}",
                    snapshot.promotion.title,
                    snapshot.effective_percentage.normalize()
                )
            }
            None => "no offer".to_string(),
        };

        let marker = match outcome {
            TickOutcome::Changed => "*",
            TickOutcome::Unchanged => " ",
        };

        writeln!(out, "{marker} {now} {banner}")?;
    }

    Ok(())
}
