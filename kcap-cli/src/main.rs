//! kcap - inspect and extract KCAP pack archives

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{ExtractOptions, ListOptions, cmd_extract, cmd_info, cmd_list, cmd_test};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kcap")]
#[command(author, version, about = "Inspect and extract KCAP pack archives")]
#[command(long_about = "
kcap reads KCAP pack archives: a directory of named entries, each stored
raw or compressed with LZSS.

Set RUST_LOG (e.g. RUST_LOG=kcap_pack=trace) for library logging; --verbose
also enables debug logging.

Examples:
  kcap list script.PAK
  kcap list -v --json bgm.PAK
  kcap extract script.PAK -o script/
  kcap extract --stream script.PAK -I '*.TXT'
  kcap test script.PAK
  kcap info script.PAK
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only entries matching pattern (glob syntax: *.txt, BGM*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Extract entries from an archive
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Entries to extract (all if empty)
        files: Vec<String>,

        /// Include only entries matching pattern (glob syntax: *.txt, BGM*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,

        /// Read the archive in a single forward pass
        #[arg(long)]
        stream: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Show progress bar
        #[arg(short = 'P', long, default_value = "true")]
        progress: bool,
    },

    /// Test archive integrity
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show archive information
    #[command(alias = "i")]
    Info {
        /// Archive file
        archive: PathBuf,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::List { verbose, .. } | Self::Extract { verbose, .. } | Self::Test { verbose, .. } => {
                *verbose
            }
            Self::Info { .. } => false,
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        for module in ["kcap_core", "kcap_lzss", "kcap_pack"] {
            builder.filter_module(module, LevelFilter::Debug);
        }
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.verbose());

    let result = match cli.command {
        Commands::List {
            archive,
            verbose,
            json,
            include,
            exclude,
        } => cmd_list(
            &archive,
            &ListOptions {
                verbose,
                json,
                include: &include,
                exclude: &exclude,
            },
        ),
        Commands::Extract {
            archive,
            output,
            files,
            include,
            exclude,
            stream,
            verbose,
            progress,
        } => cmd_extract(
            &archive,
            &output,
            &ExtractOptions {
                files: &files,
                include: &include,
                exclude: &exclude,
                stream,
                verbose,
                progress,
            },
        ),
        Commands::Test { archive, verbose } => cmd_test(&archive, verbose),
        Commands::Info { archive } => cmd_info(&archive),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
