//! DDM CLI - Marketplace flows from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! ddm-cli catalog --page 2
//!
//! # Inspect one listing and whether an address bought it
//! ddm-cli show 4
//! ddm-cli status 4 --address 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266
//!
//! # Publish a dataset (requires DDM_OPERATOR_KEY)
//! ddm-cli publish -t "Weather data" -d "Hourly readings" -p 0.25 -f weather.csv
//!
//! # Decrypt and download a purchased dataset
//! ddm-cli download 4 -o weather.csv
//!
//! # Buyer and seller views
//! ddm-cli purchases --address 0xf39F...
//! ddm-cli listings --address 0xf39F...
//!
//! # Operator-signed transactions
//! ddm-cli purchase 4
//! ddm-cli confirm-delivery 4
//! ```
//!
//! Configuration comes from the same environment variables as the
//! `ddm-market` service (see its `config` module).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "ddm-cli")]
#[command(author, version, about = "DDM marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse one page of active listings
    Catalog {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u64,
    },
    /// Show one listing
    Show {
        /// Listing id
        id: u64,
    },
    /// Check whether an address has purchased a listing
    Status {
        /// Listing id
        id: u64,

        /// Viewer address
        #[arg(short, long)]
        address: String,
    },
    /// Publish a dataset: pin, seal, list
    Publish {
        /// Listing title
        #[arg(short, long)]
        title: String,

        /// Listing description
        #[arg(short, long)]
        description: String,

        /// Price in ether (e.g. 0.25)
        #[arg(short, long)]
        price: String,

        /// File to publish
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Decrypt a listing's pointer and download the file
    Download {
        /// Listing id
        id: u64,

        /// Output path (defaults to the pinned filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Everything an address has purchased
    Purchases {
        /// Buyer address
        #[arg(short, long)]
        address: String,
    },
    /// Every listing an address owns, with sales counts
    Listings {
        /// Owner address
        #[arg(short, long)]
        address: String,
    },
    /// Purchase a listing with the operator wallet
    Purchase {
        /// Listing id
        id: u64,
    },
    /// Confirm delivery, releasing escrow to the seller
    ConfirmDelivery {
        /// Listing id
        id: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog { page } => commands::catalog::catalog(page).await?,
        Commands::Show { id } => commands::catalog::show(id).await?,
        Commands::Status { id, address } => commands::catalog::status(id, &address).await?,
        Commands::Publish {
            title,
            description,
            price,
            file,
        } => commands::publish::publish(&title, &description, &price, &file).await?,
        Commands::Download { id, output } => {
            commands::download::download(id, output.as_deref()).await?;
        }
        Commands::Purchases { address } => commands::account::purchases(&address).await?,
        Commands::Listings { address } => commands::account::listings(&address).await?,
        Commands::Purchase { id } => commands::account::purchase(id).await?,
        Commands::ConfirmDelivery { id } => commands::account::confirm_delivery(id).await?,
    }
    Ok(())
}
