//! `cartkit` - command-line front end for the cart store.
//!
//! ```bash
//! cartkit show
//! cartkit add 3
//! cartkit set 3 2
//! cartkit remove 3
//! ```
//!
//! The catalog API and the database location come from `CARTKIT_*` variables
//! (see `CartConfig`) or the global flags.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cartkit_cart::Cart;
use cartkit_core::ProductId;
use cartkit_store::{CartConfig, CartHandle, ChannelNotifier, HttpCatalog, MutationOutcome, SqliteStorage};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cartkit")]
#[command(author, version, about = "Shopping cart backed by a remote stock API")]
struct Cli {
    /// Catalog API base URL (overrides CARTKIT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// SQLite file holding the saved cart (overrides CARTKIT_DB_PATH)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add { id: ProductId },
    /// Remove a product from the cart
    Remove { id: ProductId },
    /// Set the quantity of a product already in the cart
    Set {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cartkit_observability::init();

    let mut config = CartConfig::from_env().context("invalid cartkit configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(db_path) = cli.db_path {
        config.db_path = Some(db_path);
    }

    let mut catalog = HttpCatalog::new(config.api_url.clone(), config.request_timeout)
        .context("failed to build catalog client")?;
    if let Some(token) = config.auth_token.clone() {
        catalog = catalog.with_token(token);
    }

    let storage = match config.db_path.clone() {
        Some(path) => SqliteStorage::open(path),
        None => SqliteStorage::open_default().context("failed to locate cart database")?,
    };
    tracing::debug!(api_url = %config.api_url, db = ?storage.path(), "starting");

    let (notifier, mut notices) = ChannelNotifier::new();
    let cart = CartHandle::open(Arc::new(catalog), Arc::new(storage), Arc::new(notifier)).await;

    let outcome = match cli.command {
        Command::Show => None,
        Command::Add { id } => Some(cart.add_product(id).await),
        Command::Remove { id } => Some(cart.remove_product(id).await),
        Command::Set { id, amount } => Some(cart.update_product_amount(id, amount).await),
    };

    while let Ok(notice) = notices.try_recv() {
        eprintln!("{notice}");
    }
    if let Some(MutationOutcome::Failed(err)) = &outcome {
        tracing::debug!("operation failed: {err}");
    }

    print_cart(&cart.cart());
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    for entry in cart {
        println!(
            "{:>6}  {:<48}  x{}",
            entry.product_id(),
            entry.title().unwrap_or("-"),
            entry.amount()
        );
    }
    println!("{} products, {} units", cart.len(), cart.total_units());
}
