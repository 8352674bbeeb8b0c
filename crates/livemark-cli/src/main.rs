mod config;
mod latex;
mod telemetry;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use livemark_core::{
    Decoration, EditorRope, MathCapability, MathDecision, Selection, StrongDecision, TextBuffer,
    TextRange, ViewDecorations, Viewport, build_view, split_literal_regions,
};
use miette::{Diagnostic, IntoDiagnostic, Result, WrapErr};
use serde::Serialize;

use crate::config::{Config, default_config_path};
use crate::latex::{MathMlRenderer, MathMlUnit};

#[derive(Parser)]
#[command(version, about = "livemark - live-preview match scanner for markdown notes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config file (defaults to the user config dir)
    #[arg(long, global = true, env = "LIVEMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a file and print matches, visibility decisions and decorations
    Scan {
        file: PathBuf,

        /// Caret position (char offset)
        #[arg(long, conflicts_with = "selection")]
        cursor: Option<usize>,

        /// Selection as ANCHOR..HEAD (char offsets)
        #[arg(long)]
        selection: Option<String>,

        /// Visible range as FROM..TO; repeat for several ranges
        #[arg(long)]
        viewport: Vec<String>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Print the literal and non-literal segments of a file
    Lines { file: PathBuf },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(thiserror::Error, Debug, Diagnostic, PartialEq, Eq)]
enum RangeError {
    #[error("`{input}` is not a range")]
    #[diagnostic(
        code(livemark::cli::range_syntax),
        help("write ranges as FROM..TO with char offsets, e.g. 0..120")
    )]
    Syntax { input: String },

    #[error("range `{input}` runs backwards")]
    #[diagnostic(code(livemark::cli::range_reversed), help("FROM must not exceed TO"))]
    Reversed { input: String },

    #[error("offset {offset} is past the end of the document ({len} chars)")]
    #[diagnostic(code(livemark::cli::out_of_bounds))]
    OutOfBounds { offset: usize, len: usize },
}

/// Parse `A..B` into its two offsets, in the order written.
fn parse_offsets(input: &str) -> Result<(usize, usize), RangeError> {
    let syntax = || RangeError::Syntax {
        input: input.to_owned(),
    };
    let (a, b) = input.split_once("..").ok_or_else(syntax)?;
    let a: usize = a.trim().parse().map_err(|_| syntax())?;
    let b: usize = b.trim().parse().map_err(|_| syntax())?;
    Ok((a, b))
}

fn parse_range(input: &str) -> Result<TextRange, RangeError> {
    let (from, to) = parse_offsets(input)?;
    if from > to {
        return Err(RangeError::Reversed {
            input: input.to_owned(),
        });
    }
    Ok(TextRange { from, to })
}

fn check_bounds(offset: usize, len: usize) -> Result<(), RangeError> {
    if offset > len {
        return Err(RangeError::OutOfBounds { offset, len });
    }
    Ok(())
}

fn parse_viewport(ranges: &[String], len: usize) -> Result<Option<Viewport>, RangeError> {
    if ranges.is_empty() {
        return Ok(None);
    }
    let parsed = ranges
        .iter()
        .map(|r| {
            let range = parse_range(r)?;
            check_bounds(range.to, len)?;
            Ok(range)
        })
        .collect::<Result<Vec<_>, RangeError>>()?;
    Ok(Some(Viewport::new(parsed)))
}

fn parse_selection(
    cursor: Option<usize>,
    selection: Option<&str>,
    len: usize,
) -> Result<Option<Selection>, RangeError> {
    if let Some(offset) = cursor {
        check_bounds(offset, len)?;
        return Ok(Some(Selection::caret(offset)));
    }
    let Some(input) = selection else {
        return Ok(None);
    };
    // Anchor and head may come in either order.
    let (anchor, head) = parse_offsets(input)?;
    check_bounds(anchor.max(head), len)?;
    Ok(Some(Selection::new(anchor, head)))
}

#[derive(Serialize)]
struct ScanReport<'a> {
    epoch: u64,
    viewport: &'a Viewport,
    selection: Option<&'a Selection>,
    strong: &'a [StrongDecision],
    math: &'a [MathDecision],
    decorations: &'a [Decoration<MathMlUnit>],
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    let config = match cli.config.as_deref().map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    telemetry::init(&config.log_level, cli.verbose);

    match cli.command {
        Commands::Scan {
            file,
            cursor,
            selection,
            viewport,
            format,
        } => run_scan(&config, &file, cursor, selection.as_deref(), &viewport, format),
        Commands::Lines { file } => run_lines(&file),
    }
}

fn read_document(file: &Path) -> Result<EditorRope> {
    let text = std::fs::read_to_string(file)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;
    Ok(EditorRope::from(text))
}

fn run_scan(
    config: &Config,
    file: &Path,
    cursor: Option<usize>,
    selection: Option<&str>,
    viewport: &[String],
    format: Format,
) -> Result<()> {
    let rope = read_document(file)?;
    let len = rope.len_chars();
    let viewport = parse_viewport(viewport, len)?.unwrap_or_else(|| Viewport::whole(&rope));
    let selection = parse_selection(cursor, selection, len)?;

    let mut capability = MathCapability::new();
    if config.render_math {
        capability.install(MathMlRenderer);
    }

    let view = build_view(
        &rope,
        &viewport,
        selection.as_ref(),
        capability.context(),
        &config.decorations,
    );
    tracing::info!(
        file = %file.display(),
        strong = view.output.strong.len(),
        math = view.output.math.len(),
        decorations = view.decorations.len(),
        "scan complete"
    );

    match format {
        Format::Json => {
            let report = ScanReport {
                epoch: view.epoch,
                viewport: &viewport,
                selection: selection.as_ref(),
                strong: &view.output.strong,
                math: &view.output.math,
                decorations: &view.decorations,
            };
            let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{json}");
        }
        Format::Text => print!("{}", render_text(&rope, &view)),
    }
    Ok(())
}

fn render_text(rope: &EditorRope, view: &ViewDecorations<MathMlUnit>) -> String {
    let mut out = String::new();
    for decision in &view.output.strong {
        let span = decision.span;
        let content = rope.slice(span.content().to_range()).unwrap_or_default();
        let markers = if decision.hide_markers { "hidden" } else { "shown" };
        out.push_str(&format!(
            "strong {}..{} markers {markers} {content:?}\n",
            span.open_marker_from, span.close_marker_to
        ));
    }
    for decision in &view.output.math {
        let span = &decision.span;
        let mode = if decision.suppress_replacement {
            "source"
        } else {
            "render"
        };
        out.push_str(&format!(
            "math {} {}..{} {mode} {:?}\n",
            if span.kind.is_block() { "block" } else { "inline" },
            span.open_marker_from,
            span.close_marker_to,
            span.expression
        ));
    }
    for decoration in &view.decorations {
        let range = decoration.range();
        match decoration {
            Decoration::Mark { class, .. } => {
                out.push_str(&format!("mark {}..{} {class}\n", range.from, range.to));
            }
            Decoration::Replace { unit, .. } => {
                out.push_str(&format!(
                    "replace {}..{} {}\n",
                    range.from, range.to, unit.mathml
                ));
            }
        }
    }
    out
}

fn run_lines(file: &Path) -> Result<()> {
    let rope = read_document(file)?;
    let text = rope.to_string();
    for segment in split_literal_regions(&text, 0) {
        let content = rope.slice(segment.range.to_range()).unwrap_or_default();
        println!(
            "{:<12} {}..{} {content:?}",
            format!("{:?}", segment.kind).to_lowercase(),
            segment.range.from,
            segment.range.to
        );
    }
    Ok(())
}

fn init_miette() {
    // A hook already installed (e.g. by a test harness) is fine to keep.
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }));
    miette::set_panic_hook();
}
