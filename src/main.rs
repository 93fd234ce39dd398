use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use statblock_import::ingestion::segmenter::LineHint;
use statblock_import::{ClassParse, ClassParser, Error, ImporterConfig, StatBlockParse, StatBlockParser};

#[derive(Parser, Debug)]
#[command(name = "statblock-import", version, about)]
pub struct Options {
    /// Text file to import; reads stdin when omitted
    pub file_path: Option<PathBuf>,

    /// Treat the input as a class writeup instead of a creature statblock
    #[arg(long)]
    pub class: bool,

    /// Config file; defaults to ~/.config/statblock-import/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force a line into a block, as "LINE=>blockId"
    #[arg(long = "hint", value_name = "LINE=>BLOCK")]
    pub hints: Vec<String>,

    /// Print the block map alongside the record
    #[arg(long)]
    pub blocks: bool,
}

fn main() {
    let options = Options::parse();

    let config = match &options.config {
        Some(path) => match ImporterConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load {}: {e}", path.display());
                std::process::exit(2);
            }
        },
        None => ImporterConfig::load(),
    };

    let _log_guard = statblock_import::core::logging::init(&config);
    log::debug!("{} v{} starting", statblock_import::NAME, statblock_import::VERSION);

    match run(&options, &config) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Error: nothing to import");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Returns `Ok(false)` when the input held no text.
fn run(options: &Options, config: &ImporterConfig) -> Result<bool> {
    let text = read_input(options.file_path.as_ref())?;

    let output = if options.class {
        let parser = ClassParser::new();
        render(options, |hints| parser.parse(&text, hints), |p: &ClassParse| &p.class)?
    } else {
        let parser = StatBlockParser::new(config);
        render(options, |hints| parser.parse(&text, hints), |p: &StatBlockParse| &p.creature)?
    };

    let Some(output) = output else {
        return Ok(false);
    };
    println!("{output}");
    Ok(true)
}

/// Parse with the CLI hints and serialize either the record or, with
/// `--blocks`, the whole parse including the block map.
fn render<Id, T, R>(
    options: &Options,
    parse: impl FnOnce(&[LineHint<Id>]) -> Option<T>,
    record: impl FnOnce(&T) -> &R,
) -> Result<Option<String>>
where
    Id: FromStr<Err = Error>,
    T: Serialize,
    R: Serialize,
{
    let hints = parse_hints(&options.hints)?;
    let Some(parsed) = parse(&hints) else {
        return Ok(None);
    };
    let json = if options.blocks {
        serde_json::to_string_pretty(&parsed)?
    } else {
        serde_json::to_string_pretty(record(&parsed))?
    };
    Ok(Some(json))
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn parse_hints<Id>(raw: &[String]) -> Result<Vec<LineHint<Id>>>
where
    Id: FromStr<Err = Error>,
{
    raw.iter()
        .map(|hint| {
            let (line, block) = hint
                .rsplit_once("=>")
                .ok_or_else(|| Error::config(format!("hint '{hint}' is not LINE=>blockId")))?;
            let block = block.parse::<Id>()?;
            Ok(LineHint::new(line.trim(), block))
        })
        .collect()
}
