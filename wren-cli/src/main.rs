//! Wren CLI
//!
//! Parses an HTML file, string or standard input and prints the tree in the
//! html5lib test format or as JSON.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde::Serialize;
use wren_common::issue::ParseIssue;
use wren_dom::{Namespace, NodeId};
use wren_html::serialize::{dump_nodes, dump_tree, to_json};
use wren_html::{FragmentContext, ParserOptions};

/// Wren: parse HTML the way browsers do and show the resulting tree
#[derive(Parser, Debug)]
#[command(name = "wren")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree of a file
    wren page.html

    # Parse inline HTML
    wren --html '<p>One<p>Two'

    # Legacy bytes with a transport-declared encoding
    wren --encoding shift_jis legacy.html

    # Parse as the contents of a <td>, or of an <svg>
    wren --fragment td --html '<b>x'
    wren --fragment svg:g --html '<rect/>'

    # JSON output, with every recoverable error listed
    wren --format json --issues page.html
"#)]
struct Cli {
    /// HTML file to parse; standard input when omitted
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Encoding label from the transport layer (e.g. an HTTP charset)
    #[arg(short, long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Locale for the fallback encoding, e.g. `ru` or `zh-TW`
    #[arg(long)]
    locale: Option<String>,

    /// Parse with the scripting flag set (`<noscript>` becomes raw text)
    #[arg(long)]
    scripting: bool,

    /// Parse as a fragment inside this context element (`td`, `svg:g`)
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// List every recoverable parse error
    #[arg(short, long)]
    issues: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// html5lib tree-construction test format
    Tree,
    /// JSON
    Json,
}

/// What `--format json` prints.
#[derive(Debug, Serialize)]
struct Report {
    character_set: Option<String>,
    quirks_mode: Option<String>,
    had_errors: bool,
    issues: Vec<String>,
    tree: serde_json::Value,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ParserOptions {
        transport_encoding: cli.encoding.clone(),
        locale: cli.locale.clone(),
        scripting: cli.scripting,
        collect_issues: cli.issues,
        ..ParserOptions::default()
    };

    match &cli.fragment {
        Some(context) => run_fragment(&cli, &options, &parse_context(context)?),
        None => run_document(&cli, &options),
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            let _ = builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            let _ = builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
}

/// `td`, `svg:g` or `math:mi`.
fn parse_context(spec: &str) -> Result<FragmentContext> {
    let Some((prefix, local_name)) = spec.split_once(':') else {
        return Ok(FragmentContext::html(spec));
    };
    let namespace = match prefix {
        "html" => Namespace::Html,
        "svg" => Namespace::Svg,
        "math" => Namespace::MathMl,
        other => bail!("unknown fragment namespace {other:?} (expected html, svg or math)"),
    };
    Ok(FragmentContext {
        local_name: local_name.to_string(),
        namespace,
    })
}

fn run_document(cli: &Cli, options: &ParserOptions) -> Result<()> {
    let document = if let Some(html) = &cli.html {
        wren_html::parse_with_options(html.as_bytes(), options)?
    } else if let Some(path) = &cli.path {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        wren_html::parse_with_options(file, options)
            .with_context(|| format!("parsing {}", path.display()))?
    } else {
        wren_html::parse_with_options(io::stdin().lock(), options)?
    };

    match cli.format {
        Format::Tree => {
            println!(
                "{} {} ({})",
                "===".dimmed(),
                "Document".bold(),
                document.character_set.cyan()
            );
            println!("mode: {}", document.quirks_mode);
            print!("{}", dump_tree(&document.tree, NodeId::ROOT));
            print_issues(document.had_errors, &document.issues);
        }
        Format::Json => {
            let report = Report {
                character_set: Some(document.character_set.clone()),
                quirks_mode: Some(document.quirks_mode.to_string()),
                had_errors: document.had_errors,
                issues: document.issues.iter().map(ToString::to_string).collect(),
                tree: to_json(&document.tree, NodeId::ROOT),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_fragment(cli: &Cli, options: &ParserOptions, context: &FragmentContext) -> Result<()> {
    let input = if let Some(html) = &cli.html {
        html.clone()
    } else if let Some(path) = &cli.path {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        io::read_to_string(io::stdin().lock())?
    };

    let fragment = wren_html::parse_fragment_with_options(&input, context, options);
    match cli.format {
        Format::Tree => {
            println!(
                "{} {} <{} {}>",
                "===".dimmed(),
                "Fragment in".bold(),
                context.namespace,
                context.local_name
            );
            print!("{}", dump_nodes(&fragment.tree, &fragment.nodes));
            print_issues(fragment.had_errors, &fragment.issues);
        }
        Format::Json => {
            let report = Report {
                character_set: None,
                quirks_mode: None,
                had_errors: fragment.had_errors,
                issues: fragment.issues.iter().map(ToString::to_string).collect(),
                tree: fragment
                    .nodes
                    .iter()
                    .map(|&node| to_json(&fragment.tree, node))
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn print_issues(had_errors: bool, issues: &[ParseIssue]) {
    if !had_errors {
        return;
    }
    if issues.is_empty() {
        eprintln!("{}", "input had parse errors (use --issues to list them)".yellow());
        return;
    }
    eprintln!("{} {}", "===".dimmed(), "Parse errors".bold());
    for issue in issues {
        eprintln!("{}", issue.to_string().yellow());
    }
}
