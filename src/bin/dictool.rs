//! rimedict command-line tool
//!
//! Builds dictionaries from text and queries saved ones.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use rimedict::{open_dictionary, Backend, OnDuplicatedKey, ParseOptions};
use tracing_subscriber::{fmt, EnvFilter};

/// rimedict CLI
#[derive(Parser, Debug)]
#[command(name = "dictool")]
#[command(about = "Build and query static prefix-searchable dictionaries")]
#[command(version)]
struct Args {
    /// Dictionary backend
    #[arg(short, long, value_enum, default_value_t = BackendArg::Trie)]
    backend: BackendArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a dictionary from a delimited text file
    Build {
        /// Source text file
        input: PathBuf,

        /// Output file (trie, flatmap) or store directory (leveldb)
        output: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Look up a key exactly
    Find {
        /// Saved dictionary file or store directory
        dict: PathBuf,

        key: String,
    },

    /// List entries whose key starts with a prefix
    Prefix {
        /// Saved dictionary file or store directory
        dict: PathBuf,

        prefix: String,

        /// Print at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Text parsing flags, one per `ParseOptions` field
#[derive(ClapArgs, Debug)]
struct ParseArgs {
    /// Key/value delimiter
    #[arg(short, long, default_value = "\t")]
    delimiter: String,

    /// Comment line prefix
    #[arg(short, long, default_value = "#")]
    comment: String,

    /// Characters removed from every line before splitting
    #[arg(long, default_value = "\r")]
    chars_to_remove: String,

    /// Lines are value<delimiter>key
    #[arg(short, long)]
    reversed: bool,

    /// What to do with repeated keys
    #[arg(long, value_enum, default_value_t = DuplicateArg::Overwrite)]
    on_duplicate: DuplicateArg,

    /// Separator for --on-duplicate concat
    #[arg(long, default_value = rimedict::config::DEFAULT_CONCAT_SEPARATOR)]
    separator: String,

    /// Read at most this many lines (0 reads everything)
    #[arg(long)]
    lines: Option<usize>,
}

impl ParseArgs {
    fn to_options(&self) -> ParseOptions {
        let mut builder = ParseOptions::builder()
            .delimiter(self.delimiter.as_str())
            .comment(self.comment.as_str())
            .chars_to_remove(self.chars_to_remove.as_str())
            .reversed(self.reversed)
            .on_duplicated_key(self.on_duplicate.into())
            .concat_separator(self.separator.as_str());
        if let Some(lines) = self.lines {
            builder = builder.lines(lines);
        }
        builder.build()
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Trie,
    Flatmap,
    Leveldb,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Trie => Backend::Trie,
            BackendArg::Flatmap => Backend::FlatMap,
            BackendArg::Leveldb => Backend::LevelDb,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DuplicateArg {
    Overwrite,
    Skip,
    Concat,
}

impl From<DuplicateArg> for OnDuplicatedKey {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Overwrite => OnDuplicatedKey::Overwrite,
            DuplicateArg::Skip => OnDuplicatedKey::Skip,
            DuplicateArg::Concat => OnDuplicatedKey::Concat,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rimedict=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> rimedict::Result<()> {
    let backend = Backend::from(args.backend);
    let mut dict = open_dictionary(backend);

    match args.command {
        Commands::Build {
            input,
            output,
            parse,
        } => {
            let options = parse.to_options();

            let started = Instant::now();
            dict.load_text_file(&input, &options)?;
            dict.save_to_binary_file(&output)?;
            dict.close();

            tracing::info!(
                "Built {} dictionary {} in {:?}",
                backend,
                output.display(),
                started.elapsed()
            );
        }
        Commands::Find { dict: path, key } => {
            dict.load_binary_file(&path)?;
            match dict.find(&key)? {
                Some(value) => println!("{}", value),
                None => {
                    tracing::info!("Key not found: {}", key);
                    std::process::exit(2);
                }
            }
        }
        Commands::Prefix {
            dict: path,
            prefix,
            limit,
        } => {
            dict.load_binary_file(&path)?;
            let matches = dict.prefix_search(&prefix)?;
            let shown = limit.unwrap_or(matches.len());
            for (key, value) in matches.iter().take(shown) {
                println!("{}\t{}", key, value);
            }
            tracing::info!("{} matches for {:?}", matches.len(), prefix);
        }
    }

    Ok(())
}
