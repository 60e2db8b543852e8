//! Font Preview CLI tool
//!
//! A command-line tool that builds a Word document showing every installed font.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::Level;

use font_preview::automation::NativeLauncher;
use font_preview::config::{
    default_output_path, OverwritePolicy, PreviewConfig, DEFAULT_HEADING_FONT, DEFAULT_SAMPLE_TEXT,
};
use font_preview::fonts::{FontFilter, DEFAULT_MARKER};
use font_preview::preview::{collect_fonts, run, Outcome};
use font_preview::viewer::SystemViewer;

/// Font Preview - One page per installed font in a Word document
#[derive(Parser)]
#[command(name = "font-preview")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Build the preview on the desktop and open it
    font-preview build

    # Write somewhere else and keep the previous file
    font-preview build -o fonts.docx --overwrite backup

    # Preview only the first 20 fonts, skipping Noto families
    font-preview build --limit 20 --exclude \"Noto*\"

    # Print the font names that would be previewed
    font-preview list")]
struct Cli {
    /// Additional directory to scan for fonts (repeatable)
    #[arg(long = "font-dir", value_name = "DIR", global = true)]
    font_dirs: Vec<PathBuf>,

    /// Ignore the fonts installed on the system
    #[arg(long, global = true)]
    no_system_fonts: bool,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the font preview document
    Build(BuildArgs),

    /// Print the fonts that would be previewed, one per line
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Output document path [default: Installed_Fonts_Preview.docx on the desktop]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text rendered in each font
    #[arg(long)]
    sample_text: Option<String>,

    /// Sample text size in points
    #[arg(long, default_value_t = 14.0)]
    body_size: f32,

    /// Font name heading size in points
    #[arg(long, default_value_t = 18.0)]
    heading_size: f32,

    /// Typeface for the font name headings
    #[arg(long, default_value = DEFAULT_HEADING_FONT)]
    heading_font: String,

    /// What to do when the output file already exists
    #[arg(long, value_enum, default_value_t = OverwritePolicy::Overwrite)]
    overwrite: OverwritePolicy,

    /// Do not open the document after saving
    #[arg(long)]
    no_open: bool,

    /// Only preview the first N fonts
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args)]
struct FilterArgs {
    /// Skip font names starting with this character (repeatable) [default: @]
    #[arg(long = "marker", value_name = "CHAR")]
    markers: Vec<char>,

    /// Keep font names regardless of their first character
    #[arg(long, conflicts_with = "markers")]
    no_marker: bool,

    /// Skip font names matching this glob pattern (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    excludes: Vec<String>,
}

impl FilterArgs {
    fn into_filter(self) -> anyhow::Result<FontFilter> {
        let markers = if self.no_marker {
            Vec::new()
        } else if self.markers.is_empty() {
            vec![DEFAULT_MARKER]
        } else {
            self.markers
        };

        Ok(FontFilter::with_markers(markers).exclude_patterns(&self.excludes)?)
    }
}

impl BuildArgs {
    fn into_config(self) -> anyhow::Result<PreviewConfig> {
        let config = PreviewConfig {
            output_path: self.output.unwrap_or_else(default_output_path),
            sample_text: self.sample_text.unwrap_or_else(|| DEFAULT_SAMPLE_TEXT.to_string()),
            body_font_size: self.body_size,
            heading_font_size: self.heading_size,
            heading_font: self.heading_font,
            overwrite: self.overwrite,
            open_when_done: !self.no_open,
            limit: self.limit,
            filter: self.filter.into_filter()?,
        };

        config.validate().context("invalid build options")?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let launcher = NativeLauncher {
        system_fonts: !cli.no_system_fonts,
        font_dirs: cli.font_dirs,
    };

    let code = match cli.command {
        Commands::Build(args) => cmd_build(&launcher, args),
        Commands::List { filter } => cmd_list(&launcher, filter),
    };

    process::exit(code);
}

/// Progress goes to stderr so `list` output stays clean
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Build the preview document
fn cmd_build(launcher: &NativeLauncher, args: BuildArgs) -> i32 {
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Outcome::BuildFailed.exit_code();
        }
    };

    run(launcher, &SystemViewer, &config).exit_code()
}

/// Print the filtered font list
fn cmd_list(launcher: &NativeLauncher, filter: FilterArgs) -> i32 {
    let fonts = filter
        .into_filter()
        .and_then(|filter| Ok(collect_fonts(launcher, &filter)?));

    match fonts {
        Ok(fonts) => {
            for font in &fonts {
                println!("{}", font);
            }
            Outcome::Completed.exit_code()
        }
        Err(e) => {
            eprintln!("Could not list fonts: {:#}", e);
            Outcome::ListingFailed.exit_code()
        }
    }
}
