use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dtsbundle_core::{BundleOptions, BundleResult, Bundler, FsGateway};
use log::{debug, error, info};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dtsbundle")]
#[command(about = "Merge compiler-emitted declaration files into a single .d.ts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Bundle declaration files using command-line options
    Bundle(BundleOptions),
    /// Bundle declaration files using options read from a JSON file
    FromConfig {
        /// JSON file with `entry`, `output`, `libraryName` and optional `indent`
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let mut options = match cli.command {
        Commands::Bundle(options) => options,
        Commands::FromConfig { config } => BundleOptions::from_json_file(&config)?,
    };

    let start = Instant::now();
    match run(&mut options) {
        Ok(result) => {
            let elapsed_ms = start.elapsed().as_millis();
            info!("Bundle written to {}", result.output.display());
            writeln!(
                stdout,
                "{} Bundled {} declaration files into {} in {}ms.",
                "✓".green().bold(),
                result.files_bundled.to_string().cyan(),
                result.output.display().to_string().blue(),
                elapsed_ms.to_string().cyan()
            )?;
            stdout.flush()?;
            Ok(())
        }
        Err(e) => {
            error!("Bundling failed: {:#}", e);
            writeln!(stdout, "{} dtsbundle: {:#}", "✗".red().bold(), e)?;
            stdout.flush()?;

            // Non-zero exit to fail the build
            std::process::exit(1);
        }
    }
}

fn run(options: &mut BundleOptions) -> Result<BundleResult> {
    options.initialize()?;
    debug!(
        "Options: entry={:?}, output={:?}, library_name={:?}, indent={:?}",
        options.entry, options.output, options.library_name, options.indent
    );
    Bundler::new(options, &FsGateway).bundle()
}
