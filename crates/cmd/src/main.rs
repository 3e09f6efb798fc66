// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::commands;
use cmd::common::{EntityChoice, GridContext, KindChoice};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "gridls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog fixture (YAML) to serve queries from
    #[arg(long, global = true, env = "GRIDLS_CATALOG", default_value = "catalog.yaml")]
    catalog: PathBuf,

    /// User to act as
    #[arg(short, long, global = true, env = "GRIDLS_USER", default_value = "rods")]
    user: String,

    /// Home zone of the user (defaults to the catalog's zone)
    #[arg(long, global = true)]
    zone: Option<String>,

    /// Namespace configuration (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Synthesize `/`, `/<zone>` and `/<zone>/home` when ACLs hide them
    #[arg(long, global = true)]
    fallback: bool,

    /// Only show rows the user holds a grant on
    #[arg(long, global = true)]
    strict: bool,

    /// Federated zone to address every catalog query to
    #[arg(long, global = true)]
    hint: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stat record for a path
    Stat {
        path: String,
    },
    /// List the children of a collection
    Ls {
        path: String,
        /// Position of the first entry
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Rows per sub-query
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long, value_enum, default_value_t = KindChoice::All)]
        kind: KindChoice,
        /// Attach access control lists
        #[arg(short, long)]
        permissions: bool,
        /// Walk every page
        #[arg(short, long)]
        all: bool,
    },
    /// Count the children of a collection
    Count {
        path: String,
        #[arg(long, value_enum, default_value_t = KindChoice::All)]
        kind: KindChoice,
        /// Also sum data object sizes
        #[arg(long)]
        size: bool,
    },
    /// Show metadata attached at a path
    Meta {
        path: String,
    },
    /// Search by name
    Find {
        term: String,
        #[arg(long, value_enum, default_value_t = EntityChoice::Objects)]
        kind: EntityChoice,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long)]
        page_size: Option<usize>,
    },
}

impl Cli {
    fn context(&self) -> GridContext {
        GridContext {
            catalog: self.catalog.clone(),
            user: self.user.clone(),
            zone: self.zone.clone(),
            config: self.config.clone(),
            fallback: self.fallback,
            strict: self.strict,
            hint: self.hint.clone(),
            json: self.json,
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_output(output: &str) {
    print!("{output}");
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();

    let cli = Cli::parse();
    let ctx = cli.context();

    let result = match &cli.command {
        Commands::Stat { path } => commands::stat_command(&ctx, path, print_output).await,
        Commands::Ls {
            path,
            offset,
            page_size,
            kind,
            permissions,
            all,
        } => {
            let args = commands::ListArgs {
                offset: *offset,
                page_size: *page_size,
                kind: *kind,
                permissions: *permissions,
                all_pages: *all,
            };
            commands::list_command(&ctx, path, &args, print_output).await
        }
        Commands::Count { path, kind, size } => {
            commands::count_command(&ctx, path, *kind, *size, print_output).await
        }
        Commands::Meta { path } => commands::meta_command(&ctx, path, print_output).await,
        Commands::Find {
            term,
            kind,
            offset,
            page_size,
        } => commands::find_command(&ctx, term, *kind, *offset, *page_size, print_output).await,
    };

    if let Err(err) = &result {
        let message = format!("{err:#}");
        diagnostics::error!("gridls failed: {message}", message: message.as_str());
    }
    result
}
