use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use mctool_anvil::{ChunkPos, Compression};
use mctool_nbt::Compound;

mod config;
mod coords;
mod copy;
mod dump;
mod trade;

use config::{CopyConfig, TradeConfig};

#[derive(Parser)]
#[command(name = "mctool", about = "Inspect and edit Minecraft region (.mca) files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print an NBT document: a chunk from a region file or world, or a whole NBT file
    Nbt(NbtArgs),
    /// List the chunks stored in a region file
    List(ListArgs),
    /// Copy selected chunks into new region files
    Copy(ConfigArgs),
    /// Reset villager trade uses
    ResetTrade(ConfigArgs),
}

#[derive(Args)]
pub struct NbtArgs {
    /// Region file, or a compressed NBT file when no chunk is given
    #[arg(short, long, conflicts_with = "dir", required_unless_present = "dir")]
    pub file: Option<PathBuf>,

    /// Region directory of a world
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Chunk coordinate "x,z" or a slot index
    #[arg(short = 'C', long, allow_hyphen_values = true, conflicts_with = "block")]
    pub chunk: Option<String>,

    /// Block coordinate "x,z"; the chunk holding it is printed
    #[arg(short = 'B', long, allow_hyphen_values = true)]
    pub block: Option<String>,

    /// Output file (stdout if omitted)
    #[arg(short = 'O', long)]
    pub output: Option<PathBuf>,

    /// Compression of a standalone NBT file: "zlib" or "gzip"
    #[arg(long, default_value = "zlib")]
    pub compress: Compression,
}

#[derive(Args)]
pub struct ListArgs {
    /// Region file to list
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short = 'O', long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// JSON task file
    #[arg(short, long)]
    pub config: PathBuf,
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

fn chunk_arg(args: &NbtArgs) -> Result<Option<ChunkPos>> {
    match (&args.chunk, &args.block) {
        (Some(chunk), _) => coords::parse_chunk(chunk).map(Some),
        (None, Some(block)) => coords::parse_block(block).map(Some),
        (None, None) => Ok(None),
    }
}

fn run_nbt(args: &NbtArgs) -> Result<()> {
    let pos = chunk_arg(args)?;
    let document: Compound = match (&args.file, &args.dir, pos) {
        (Some(file), _, Some(pos)) => dump::read_region_chunk(file, pos)?,
        (Some(file), _, None) => dump::read_nbt_file(file, args.compress)?,
        (None, Some(dir), Some(pos)) => dump::read_world_chunk(dir, pos)?,
        (None, Some(_), None) => bail!("--dir needs --chunk or --block"),
        (None, None, _) => bail!("either --file or --dir is required"),
    };

    let mut out = open_output(args.output.as_ref())?;
    writeln!(out, "{}", dump::render_document(&document))?;
    out.flush()?;
    Ok(())
}

fn run_list(args: &ListArgs) -> Result<()> {
    let mut out = open_output(args.output.as_ref())?;
    dump::list_region(&args.file, &mut out, &chrono::Local)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Nbt(args) => run_nbt(args),
        Command::List(args) => run_list(args),
        Command::Copy(args) => {
            let config = CopyConfig::load(&args.config)?;
            log::info!("Copying from {} to {}", config.src.display(), config.dst.display());
            copy::run(&config)
        }
        Command::ResetTrade(args) => {
            let config = TradeConfig::load(&args.config)?;
            log::info!("Resetting trades in {}", config.src.display());
            trade::run(&config)
        }
    }
}
