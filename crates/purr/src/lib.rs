//! The `purr` command line.
//!
//! Lexes and parses PureScript files and reports what it found: the token
//! stream, the syntax tree, or just the syntax errors.
//!
//! Everything runs through [`run`], which writes to the given streams so the
//! commands can be driven from tests without spawning a process.

#![warn(missing_docs)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use purr_diagnostics::{CargoRenderer, Diagnostic, DiagnosticHandler, RenderConfig, SourceMap};
use purr_lexer::{LayoutConfig, LexerConfig, SourceToken, TokenKind};
use purr_parser::{Parse, ParseOptions, ParseResult};
use purr_span::SourcePos;
use serde::Serialize;
use tracing::{debug, info};

/// Layout-aware lexer and parser for PureScript
#[derive(Parser, Debug)]
#[command(name = "purr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Accept `{ a; b }` after `where`, `of`, `let`, `do` and `ado` as a block
    #[arg(long, global = true)]
    pub explicit_blocks: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not color diagnostics
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the token stream, layout tokens included
    Tokens {
        /// Input file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Include whitespace and comments
        #[arg(long)]
        trivia: bool,
    },

    /// Print the syntax tree
    Parse {
        /// Input file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Try every alternative in order instead of using dispatch tables
        #[arg(long)]
        naive: bool,
    },

    /// Report syntax errors without printing anything else
    Check {
        /// Input files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    /// Parser options selected by the flags.
    #[must_use]
    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            naive_choice: matches!(self.command, Commands::Parse { naive: true, .. }),
            lexer: LexerConfig {
                layout: LayoutConfig {
                    explicit_blocks: self.explicit_blocks,
                },
            },
        }
    }

    fn render_config(&self) -> RenderConfig {
        if self.no_color {
            RenderConfig::plain()
        } else {
            RenderConfig::colored()
        }
    }
}

/// Run a command, writing results to `out` and diagnostics to `err`.
///
/// Returns `false` if any input had syntax errors.
///
/// # Errors
///
/// Fails if a file cannot be read or output cannot be written.
pub fn run(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> Result<bool> {
    match &cli.command {
        Commands::Tokens { file, trivia } => tokens(cli, file, *trivia, out),
        Commands::Parse { file, .. } => parse(cli, file, out, err),
        Commands::Check { files } => check(cli, files, out, err),
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[derive(Serialize)]
struct JsonToken<'a> {
    kind: TokenKind,
    start: SourcePos,
    end: SourcePos,
    text: &'a str,
}

fn tokens(cli: &Cli, path: &Path, trivia: bool, out: &mut impl Write) -> Result<bool> {
    let src = read(path)?;
    let tokens = purr_lexer::lex_with_config(&src, &cli.options().lexer);
    let shown: Vec<&SourceToken> = tokens
        .iter()
        .filter(|t| trivia || !t.kind.is_trivia())
        .collect();
    info!("{} token(s) in {}", shown.len(), path.display());

    if cli.json {
        let json: Vec<JsonToken<'_>> = shown
            .iter()
            .map(|t| JsonToken {
                kind: t.kind,
                start: t.start,
                end: t.end,
                text: t.text(&src),
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
    } else {
        for token in shown {
            writeln!(
                out,
                "{}-{} {:?} {:?}",
                token.start,
                token.end,
                token.kind,
                token.text(&src)
            )?;
        }
    }
    Ok(true)
}

#[derive(Serialize)]
struct JsonParse<'a> {
    file: String,
    #[serde(flatten)]
    result: &'a ParseResult,
    nodes: usize,
    diagnostics: Vec<purr_diagnostics::JsonDiagnostic>,
}

fn parse(cli: &Cli, path: &Path, out: &mut impl Write, err: &mut impl Write) -> Result<bool> {
    let src = read(path)?;
    let parse = purr_parser::parse_module_with(&src, &cli.options())?;
    debug!(success = parse.result.success, errors = parse.errors.len(), "parsed");

    let mut sources = SourceMap::new();
    let dump = parse.tree.debug_dump(&src);
    let file = sources.add_file(path.display().to_string(), src);
    let diagnostics = parse.diagnostics(file);

    if cli.json {
        let report = JsonParse {
            file: path.display().to_string(),
            result: &parse.result,
            nodes: parse.tree.len(),
            diagnostics: purr_diagnostics::diagnostics_to_json(&diagnostics, &sources),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        out.write_all(dump.as_bytes())?;
        render(cli, &sources, &diagnostics, err)?;
    }
    Ok(parse.is_ok())
}

fn check(cli: &Cli, paths: &[PathBuf], out: &mut impl Write, err: &mut impl Write) -> Result<bool> {
    info!("Checking {} file(s)", paths.len());
    let options = cli.options();
    let mut sources = SourceMap::new();
    let mut handler = DiagnosticHandler::new();

    for path in paths {
        let src = read(path)?;
        let parse: Parse = purr_parser::parse_module_with(&src, &options)?;
        let file = sources.add_file(path.display().to_string(), src);
        debug!(file = %path.display(), errors = parse.errors.len(), "checked");
        handler.extend(parse.diagnostics(file));
    }

    let diagnostics = handler.diagnostics();
    if cli.json {
        out.write_all(purr_diagnostics::to_json_lines(diagnostics, &sources)?.as_bytes())?;
    } else {
        render(cli, &sources, diagnostics, err)?;
        writeln!(
            err,
            "checked {} file(s): {} error(s)",
            paths.len(),
            handler.error_count()
        )?;
    }
    Ok(!handler.has_errors())
}

fn render(
    cli: &Cli,
    sources: &SourceMap,
    diagnostics: &[Diagnostic],
    err: &mut impl Write,
) -> Result<()> {
    let renderer = CargoRenderer::with_config(sources, cli.render_config());
    for diagnostic in diagnostics {
        renderer.render(diagnostic, err)?;
    }
    Ok(())
}
