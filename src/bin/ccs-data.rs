//! ccs-data: inspect, verify and build CCS static data blobs.
//!
//! `dump` prints the decoded block tree as JSON, `blocks` lists the raw top-level
//! blocks, `verify` checks the trailer CRC and `pack` encodes a TOML or JSON
//! document (the shape `dump` prints) into a blob.

use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ccs_data::{pack_static_data, BlockId, BlockReader, ParseOptions, StaticData};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, Level};

#[derive(Debug, Parser)]
#[command(name = "ccs-data", version, about = "Inspect, verify and build MIPI CCS static data")]
struct Cli {
    /// TOML file with decoding options (strict, max_depth, verify_checksum).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Fail on unknown block and rule ids.
    #[arg(long, global = true)]
    strict: bool,
    /// Deepest allowed chain of nested `If` rules.
    #[arg(long, global = true)]
    max_depth: Option<usize>,
    /// Decode even if the trailer CRC does not match.
    #[arg(long, global = true)]
    no_verify: bool,
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a blob and print the block tree as JSON.
    Dump { file: PathBuf },
    /// List the top-level blocks without interpreting them.
    Blocks { file: PathBuf },
    /// Check the trailer CRC.
    Verify { file: PathBuf },
    /// Encode a TOML or JSON document into a blob.
    Pack {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn load_options(cli: &Cli) -> Result<ParseOptions, Box<dyn Error>> {
    let mut options = match &cli.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ParseOptions::default(),
    };
    if cli.strict {
        options.strict = true;
    }
    if let Some(depth) = cli.max_depth {
        options.max_depth = depth;
    }
    if cli.no_verify {
        options.verify_checksum = false;
    }
    Ok(options)
}

fn read_document(path: &Path) -> Result<StaticData, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let data = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)?,
        _ => toml::from_str(&text)?,
    };
    Ok(data)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let options = load_options(&cli)?;
    info!(?options, "decoding options");

    match &cli.command {
        Command::Dump { file } => {
            let data = StaticData::open(file, &options)?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Blocks { file } => {
            let bytes = fs::read(file)?;
            let mut reader = BlockReader::top_level(&bytes);
            for block in reader.by_ref() {
                let block = block?;
                let name = format!("{:?}", BlockId::from(block.id));
                println!(
                    "{:#08x}  {:>3}  {:<24} {:>8}",
                    block.offset,
                    block.id,
                    name,
                    block.payload.len()
                );
            }
            let end = reader.expect_end()?;
            println!("{:#08x}  end, crc at {:#x}", end.offset, end.payload_offset());
        }
        Command::Verify { file } => {
            let bytes = fs::read(file)?;
            let crc = ccs_data::crc::verify(&bytes)?;
            println!("{}: ok (crc {:#010x})", file.display(), crc);
        }
        Command::Pack { input, output } => {
            let data = read_document(input)?;
            let mut out = File::create(output)?;
            let written = pack_static_data(&mut out, &data)?;
            out.sync_all()?;
            eprintln!("wrote {} ({} bytes)", output.display(), written);
        }
    }
    Ok(())
}
