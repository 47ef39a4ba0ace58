//! MoMo demo driver
//!
//! Wires configuration, logging and the gateway core together so deposits,
//! payouts, refunds, batch payouts, payment pages and reconciliation can be
//! exercised from the command line.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use momo_adapters::{
    BatchPayoutCoordinator, GatewayConfig, HttpTransport, PaymentPageClient, PaymentPageRequest,
    PayoutRecipient, TransactionOrchestrator,
};
use momo_protocol::{
    Environment, MetadataField, MoneyMovementRequest, MoneyMovementResult, OperationKind,
    UuidGenerator,
};
use momo_reconciler::{ConfigurationReconciler, CorrectiveRefetch, SnapshotStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Mobile-money gateway core driver
#[derive(Parser)]
#[command(name = "momo-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gateway environment (sandbox / production)
    #[arg(long, global = true)]
    environment: Option<String>,

    /// API generation (v1 / v2)
    #[arg(long = "api-version", global = true)]
    api_version: Option<String>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch both configuration feeds and print the merged operator catalog
    Reconcile,

    /// Show the newest complete snapshot pair on disk
    Snapshots,

    /// Collect from a payer
    Deposit(MovementArgs),

    /// Disburse to a recipient
    Payout(MovementArgs),

    /// Refund a completed deposit
    Refund {
        /// Deposit to refund
        #[arg(long)]
        deposit_id: String,
        /// Amount to refund
        #[arg(long)]
        amount: String,
        /// Currency (required by V2)
        #[arg(long, default_value = "")]
        currency: String,
    },

    /// Check one operation's status
    Status {
        /// Operation kind
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Operation id
        #[arg(long)]
        id: String,
    },

    /// Pay out to every recipient in a JSON file
    Batch {
        /// JSON array of recipients
        file: PathBuf,
    },

    /// Create a hosted payment-page session
    PaymentPage {
        /// Amount
        #[arg(long)]
        amount: String,
        /// Currency
        #[arg(long)]
        currency: String,
        /// Payer phone number
        #[arg(long)]
        msisdn: String,
        /// Statement description
        #[arg(long)]
        description: String,
        /// Return URL
        #[arg(long)]
        return_url: String,
        /// ISO-3 country
        #[arg(long)]
        country: Option<String>,
    },
}

#[derive(clap::Args)]
struct MovementArgs {
    /// Amount
    #[arg(long)]
    amount: String,
    /// Currency
    #[arg(long)]
    currency: String,
    /// Counterparty phone number
    #[arg(long)]
    msisdn: String,
    /// Correspondent (V1) / provider (V2) code
    #[arg(long)]
    operator: String,
    /// Statement description
    #[arg(long)]
    description: String,
    /// Metadata as name=value (repeatable)
    #[arg(long = "meta")]
    metadata: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Deposit,
    Payout,
    Refund,
}

impl From<KindArg> for OperationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Deposit => OperationKind::Deposit,
            KindArg::Payout => OperationKind::Payout,
            KindArg::Refund => OperationKind::Refund,
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let mut config = match &cli.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GatewayConfig::from_env()?,
    };
    if let Some(env) = &cli.environment {
        config.environment = Environment::from_name(env);
    }
    if let Some(version) = &cli.api_version {
        config.api_version = version.parse()?;
    }
    Ok(config)
}

fn parse_metadata(items: &[String]) -> Result<Vec<MetadataField>> {
    items
        .iter()
        .map(|item| match item.split_once('=') {
            Some((name, value)) => Ok(MetadataField::new(name, value)),
            None => bail!("metadata must be name=value, got {:?}", item),
        })
        .collect()
}

fn print_result(result: &MoneyMovementResult) {
    let status = format!("{:?}", result.status);
    let status = if result.success() { status.green() } else { status.red() };
    println!(
        "{} {} [{}] {}",
        result.kind.label().bold(),
        result.operation_id,
        result.version,
        status
    );
    println!("  {}", result.message);
    if let Some(code) = &result.failure_code {
        println!("  failure code: {}", code.yellow());
    }
}

async fn reconcile(config: &GatewayConfig) -> Result<()> {
    let reconciler = ConfigurationReconciler::from_config(config)?;
    let report = reconciler.reconcile(config.environment).await?;

    println!(
        "{} availability={} config={}",
        "Reconciled".bold(),
        report.availability_version,
        report.config_version
    );
    match &report.corrective_refetch {
        CorrectiveRefetch::None => {}
        CorrectiveRefetch::Succeeded { from, to } => {
            println!("  {} availability re-fetched {} -> {}", "skew repaired:".yellow(), from, to)
        }
        CorrectiveRefetch::Failed { from, to, reason } => {
            println!("  {} {} -> {}: {}", "skew unresolved:".red(), from, to, reason)
        }
    }
    if let Some(name) = report.merchant_name.as_ref().or(report.company_name.as_ref()) {
        println!("  merchant: {}", name);
    }

    for country in &report.merged_catalog {
        println!("{} ({})", country.country.bold(), country.iso3);
        for op in &country.operators {
            let mark = if op.available { "available".green() } else { "unavailable".dimmed() };
            let owner = op.owner_name.as_deref().unwrap_or("-");
            println!("  {:<24} {:<20} {:<12} {}", op.name, op.operator_code, mark, owner);
        }
    }
    for path in &report.snapshots_written {
        println!("{} {}", "snapshot".dimmed(), path.display());
    }
    Ok(())
}

async fn snapshots(config: &GatewayConfig) -> Result<()> {
    let store = SnapshotStore::new(config.data_dir.clone());
    match store.load_latest().await? {
        Some(pair) => {
            let label = pair.version.map_or("default", |v| v.as_str());
            println!("{} {} in {}", "snapshot pair".bold(), label, store.dir().display());
            println!("{}", serde_json::to_string_pretty(&pair.active_config)?);
        }
        None => println!("{} in {}", "no snapshot pair".yellow(), store.dir().display()),
    }
    Ok(())
}

async fn batch(config: &GatewayConfig, orchestrator: Arc<TransactionOrchestrator>, file: PathBuf) -> Result<()> {
    let content = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let recipients: Vec<PayoutRecipient> = serde_json::from_str(&content)?;

    let coordinator = BatchPayoutCoordinator::from_config(orchestrator, config);
    let result = coordinator
        .execute_batch(&recipients, config.api_version, config.environment)
        .await;

    for entry in &result.results {
        let mark = if entry.success { "ok".green() } else { "failed".red() };
        println!("  #{} {} {}", entry.index + 1, mark, entry.details);
    }
    let summary = if result.overall_success {
        result.message.green()
    } else {
        result.message.yellow()
    };
    println!("{}", summary);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = load_config(&cli)?;
    // Reading snapshots is offline and needs no credentials
    if !matches!(cli.command, Command::Snapshots) {
        config.validate(config.environment)?;
    }
    info!(environment = %config.environment, version = %config.api_version, "MoMo demo starting");

    let transport = Arc::new(HttpTransport::new(&config)?);
    let orchestrator = Arc::new(TransactionOrchestrator::new(
        transport.clone(),
        Arc::new(UuidGenerator),
    ));
    let (version, environment) = (config.api_version, config.environment);

    match cli.command {
        Command::Reconcile => reconcile(&config).await?,
        Command::Snapshots => snapshots(&config).await?,
        Command::Deposit(args) => {
            let request = MoneyMovementRequest::deposit(
                args.amount,
                args.currency,
                args.msisdn,
                args.operator,
                args.description,
            )
            .with_metadata(parse_metadata(&args.metadata)?);
            print_result(&orchestrator.execute_deposit(&request, version, environment).await);
        }
        Command::Payout(args) => {
            let request = MoneyMovementRequest::payout(
                args.amount,
                args.currency,
                args.msisdn,
                args.operator,
                args.description,
            )
            .with_metadata(parse_metadata(&args.metadata)?);
            print_result(&orchestrator.execute_payout(&request, version, environment).await);
        }
        Command::Refund { deposit_id, amount, currency } => {
            let request = MoneyMovementRequest::refund(deposit_id, amount, currency);
            print_result(&orchestrator.execute_refund(&request, version, environment).await);
        }
        Command::Status { kind, id } => {
            let result = orchestrator
                .check_status(kind.into(), &id, version, environment)
                .await;
            print_result(&result);
        }
        Command::Batch { file } => batch(&config, orchestrator, file).await?,
        Command::PaymentPage {
            amount,
            currency,
            msisdn,
            description,
            return_url,
            country,
        } => {
            let client = PaymentPageClient::new(transport, Arc::new(UuidGenerator));
            let request = PaymentPageRequest {
                amount,
                currency,
                payer_msisdn: msisdn,
                description,
                return_url,
                country,
                ..Default::default()
            };
            let result = client.create_session(&request, version, environment).await;
            match (&result.redirect_url, &result.error_message) {
                (Some(url), _) => println!("{} {}", "redirect:".green(), url),
                (None, message) => println!(
                    "{} {}",
                    "payment page failed:".red(),
                    message.as_deref().unwrap_or("unknown error")
                ),
            }
        }
    }
    Ok(())
}
