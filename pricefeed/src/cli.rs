// pricefeed/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use pricefeed_core::domain::snapshot::Stage;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pricefeed")]
#[command(about = "Product pricing pipeline: fetch, convert to GBP, load, query", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🌐 Fetches the product feed into a new raw snapshot
    Fetch {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🧮 Converts the latest raw snapshot into a clean snapshot
    Transform {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🗄️ Reconciles the latest clean snapshot into the product table
    Load {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🚀 Runs fetch -> transform -> load
    Run {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🛰️ Serves the read-only query API
    Serve {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Socket address to bind
        #[arg(long, default_value = "127.0.0.1:8000", env = "PRICEFEED_ADDR")]
        addr: SocketAddr,
    },

    /// 🏆 Lists the most expensive products (GBP)
    Top {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// 🔎 Lists products whose GBP price lies within [min, max]
    Search {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        min: f64,

        #[arg(long, default_value = "1000000000", allow_negative_numbers = true)]
        max: f64,
    },

    /// 📜 Lists the snapshots of a store, oldest first
    Snapshots {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, value_enum, default_value = "clean")]
        stage: StageArg,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    Raw,
    Clean,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Raw => Stage::Raw,
            StageArg::Clean => Stage::Clean,
        }
    }
}
