//! etcpak CLI - Command-line interface
//!
//! Compresses images to ETC1/ETC2/DXT1 PVR containers, decodes containers
//! back to images, and benchmarks both directions.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use commands::benchmark::{self, BenchmarkOptions};
use commands::common::{self, FormatFlags};
use commands::compress::{self, CompressOptions};
use commands::view;
use error::CliError;

const DITHER_NOTICE: &str = "Dithering is disabled in ETC2 mode, as it degrades image quality.";

#[derive(Debug, Parser)]
#[command(
    name = "etcpak",
    version,
    about = "Fast ETC1/ETC2/DXT1 texture compressor",
    override_usage = "etcpak [options] input.png {output.pvr}",
    after_help = "Output file name may be unneeded for some modes."
)]
struct Args {
    /// View mode (loads pvr file, decodes it and saves to png)
    #[arg(short = 'v')]
    view: bool,

    /// Display image quality measurements
    #[arg(short = 's')]
    stats: bool,

    /// Benchmark mode
    #[arg(short = 'b')]
    benchmark: bool,

    /// Generate mipmaps
    #[arg(short = 'm')]
    mipmaps: bool,

    /// Enable dithering
    #[arg(short = 'd')]
    dither: bool,

    /// Save alpha channel in a separate file
    #[arg(short = 'a', value_name = "alpha.pvr")]
    alpha: Option<PathBuf>,

    /// Enable ETC2 mode
    #[arg(long)]
    etc2: bool,

    /// Enable ETC2 RGBA mode
    #[arg(long)]
    rgba: bool,

    /// Use DXT1 compression
    #[arg(long)]
    dxt1: bool,

    /// Search more encoder candidates (slower, never worse)
    #[arg(long)]
    thorough: bool,

    /// Print debug diagnostics to stderr
    #[arg(long)]
    verbose: bool,

    /// Input image (or container in view mode)
    #[arg(value_name = "input.png")]
    input: PathBuf,

    /// Output container (or image in view mode)
    #[arg(value_name = "output.pvr")]
    output: Option<PathBuf>,
}

impl Args {
    fn format_flags(&self) -> FormatFlags {
        FormatFlags {
            etc2: self.etc2,
            rgba: self.rgba,
            dxt1: self.dxt1,
        }
    }
}

fn usage_error(message: &str) -> CliError {
    CliError::Usage {
        message: message.to_string(),
        usage: Args::command().render_usage().to_string(),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    etcpak::logging::init_logging(args.verbose)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let flags = args.format_flags();
    let mut dither = args.dither;
    if flags.etc2() && dither {
        println!("{}", DITHER_NOTICE);
        dither = false;
    }
    let effort = common::effort(args.thorough);

    if args.benchmark {
        if args.view {
            return benchmark::run_decode(&args.input);
        }
        return benchmark::run_compress(&BenchmarkOptions {
            input: &args.input,
            flags,
            dither,
            effort,
            alpha_only: args.alpha.is_some(),
        });
    }

    let output = args
        .output
        .as_deref()
        .ok_or_else(|| usage_error("an output file is required unless benchmarking"))?;

    if args.view {
        return view::run(&args.input, output);
    }

    compress::run(&CompressOptions {
        input: &args.input,
        output,
        alpha: args.alpha.as_deref(),
        flags,
        mipmaps: args.mipmaps,
        dither,
        effort,
        stats: args.stats,
    })
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                process::exit(1);
            }
        },
    };

    if let Err(e) = run(args) {
        e.exit();
    }
}
