//! Player card CLI
//!
//! Subcommands:
//!   render  Compose a player card from a decklist, photo and configured assets
//!   parse   Print a decklist as JSON
//!   config  Print the default configuration as RON
//!
//! Example:
//!   cargo run -- render --config card.ron --decklist decklist.txt --photo player.jpg

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use player_card::{create_player_card, decklist, CardConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Promotional player card generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a player card image
    Render(RenderArgs),
    /// Parse a decklist and print it as JSON
    Parse(ParseArgs),
    /// Print the default configuration as RON
    Config,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// RON config file; omitted keys use the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    decklist: Option<PathBuf>,
    #[arg(long)]
    photo: Option<PathBuf>,
    /// Output image; the extension picks the format
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ParseArgs {
    #[arg(long, default_value = "decklist.txt")]
    decklist: PathBuf,
}

fn load_config(path: Option<&Path>) -> Result<CardConfig> {
    let Some(path) = path else {
        info!("no --config given; using built-in defaults");
        return Ok(CardConfig::default());
    };
    CardConfig::load_from_file(path).with_context(|| format!("loading config {}", path.display()))
}

fn cmd_render(a: RenderArgs) -> Result<()> {
    let mut cfg = load_config(a.config.as_deref())?;
    if let Some(p) = a.decklist {
        cfg.inputs.decklist = p;
    }
    if let Some(p) = a.photo {
        cfg.inputs.photo = p;
    }
    if let Some(p) = a.out {
        cfg.output = p;
    }
    create_player_card(&cfg)?;
    println!("Player card saved as {}", cfg.output.display());
    Ok(())
}

fn cmd_parse(a: ParseArgs) -> Result<()> {
    let deck = decklist::load(&a.decklist)?;
    println!("{}", serde_json::to_string_pretty(&deck)?);
    Ok(())
}

fn cmd_config() -> Result<()> {
    let pretty = ron::ser::PrettyConfig::new().struct_names(false);
    println!("{}", ron::ser::to_string_pretty(&CardConfig::default(), pretty)?);
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::try_init()?;
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(a) => cmd_render(a),
        Commands::Parse(a) => cmd_parse(a),
        Commands::Config => cmd_config(),
    }
}
