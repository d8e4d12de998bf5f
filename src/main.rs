use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use storefront::application::checkout::{CheckoutService, Shopper};
use storefront::application::session::CartSession;
use storefront::config::StorefrontConfig;
use storefront::domain::discount::AppliedDiscount;
use storefront::domain::money::{Money, Rate};
use storefront::domain::ports::SessionStorageBox;
use storefront::domain::pricing::{Role, UserFlags};
use storefront::infrastructure::flat_rate::FlatRatePreview;
use storefront::infrastructure::in_memory::InMemorySessionStorage;
use storefront::interfaces::csv::cart_reader::CartReader;
use storefront::interfaces::csv::totals_writer::TotalsWriter;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input cart CSV file
    input: PathBuf,

    /// Loyalty points to redeem
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    points: i64,

    /// Loyalty points the shopper holds
    #[arg(long, default_value_t = 0)]
    user_points: u64,

    /// Shopper has a premium membership
    #[arg(long)]
    premium: bool,

    /// Shopper role (customer, employee, admin, ...)
    #[arg(long, default_value = "customer")]
    role: String,

    /// Tax rate for local pricing, overriding STOREFRONT_TAX_RATE
    #[arg(long)]
    tax_rate: Option<Decimal>,

    /// Coupon code to apply after reconciliation
    #[arg(long)]
    coupon: Option<String>,

    /// POS discount id of a tiered reward to apply instead of points
    #[arg(long, requires = "reward_value")]
    reward_id: Option<String>,

    /// Dollar value of the reward given by --reward-id
    #[arg(long, requires = "reward_id")]
    reward_value: Option<Decimal>,

    /// Path to persistent session database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,storefront=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn session_storage(db_path: Option<PathBuf>) -> Result<SessionStorageBox> {
    use storefront::infrastructure::rocksdb::RocksDbSessionStorage;

    match db_path {
        Some(path) => Ok(Box::new(RocksDbSessionStorage::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemorySessionStorage::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn session_storage(db_path: Option<PathBuf>) -> Result<SessionStorageBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemorySessionStorage::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = StorefrontConfig::from_env().into_diagnostic()?;
    let tax_rate = match cli.tax_rate {
        Some(rate) => Rate::new(rate).into_diagnostic()?,
        None => config.tax_rate,
    };

    let session = CartSession::new(session_storage(cli.db_path)?);

    let file = File::open(&cli.input).into_diagnostic()?;
    for line in CartReader::new(file).lines() {
        match line {
            Ok(line) => {
                if let Err(e) = session.add_to_cart(line).await {
                    eprintln!("Error adding cart line: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading cart line: {}", e);
            }
        }
    }

    let mut preview = FlatRatePreview::new(tax_rate);
    let reward = match (cli.reward_id, cli.reward_value) {
        (Some(id), Some(value)) => {
            preview = preview.with_reward(id.clone(), Money::new(value));
            Some(AppliedDiscount {
                name: format!("Reward {id}"),
                pos_discount_id: id.clone(),
                id,
                dollar_value: Some(Money::new(value)),
                percentage_value: None,
            })
        }
        _ => None,
    };
    session.set_discount(reward).await.into_diagnostic()?;

    let checkout = CheckoutService::new(Box::new(preview), config.policy.clone())
        .with_coupons(config.coupons.clone());
    let shopper = Shopper {
        flags: UserFlags {
            premium: cli.premium,
            role: Role::from(cli.role.as_str()),
        },
        points: cli.user_points,
        pos_customer_id: String::new(),
    };

    let Some(quote) = checkout
        .quote(&session, &shopper, cli.points, false)
        .await
        .into_diagnostic()?
    else {
        eprintln!("Cart is empty; nothing to price");
        return Ok(());
    };

    let quote = match cli.coupon.as_deref() {
        Some(code) => match checkout.apply_coupon(&quote, code) {
            Ok(outcome) => {
                eprintln!("{}", outcome.message());
                quote.with_coupon(&outcome)
            }
            Err(e) => {
                eprintln!("{}", e);
                quote
            }
        },
        None => quote,
    };
    let totals = &quote.totals;

    info!(
        brand = %config.brand,
        total = %totals.final_total,
        points = totals.points_redeemed,
        "Priced cart"
    );

    let stdout = io::stdout();
    let mut writer = TotalsWriter::new(stdout.lock());
    writer.write_totals(totals).into_diagnostic()?;

    Ok(())
}
