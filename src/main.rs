use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use huffcode::{BitReader, BitWriter, ByteSink, Decoder, HuffmanCode, Symbol};
use log::{LevelFilter, info};

/// Symbol appended once after the input bytes so that decoding can stop
/// before the padding of the last byte.
const EOF: Symbol = 256;

#[derive(Parser, Debug)]
#[command(name = "huffcode")]
#[command(about = "Build Huffman codes and use them to pack and unpack files")]
#[command(version)]
struct Cli {
    /// Log more (-v for debug, -vv for trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count the bytes of a file and save the resulting code table
    Code {
        /// File whose byte frequencies define the code
        input: PathBuf,
        /// Where to write the code table
        code: PathBuf,
        /// Do not reserve the end-of-stream symbol
        #[arg(long)]
        no_eof: bool,
    },

    /// Encode a file with a saved code table
    Compress {
        input: PathBuf,
        code: PathBuf,
        output: PathBuf,
        /// Prefix the output with its exact bit length instead of ending it
        /// with the end-of-stream symbol
        #[arg(long)]
        no_eof: bool,
    },

    /// Decode a file produced by `compress`
    Decompress {
        input: PathBuf,
        code: PathBuf,
        output: PathBuf,
        /// The input starts with its bit length (written with `compress --no-eof`)
        #[arg(long)]
        no_eof: bool,
    },

    /// Print a saved code table
    Show { code: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Code {
            input,
            code,
            no_eof,
        } => make_code(&input, &code, no_eof),
        Commands::Compress {
            input,
            code,
            output,
            no_eof,
        } => compress(&input, &code, &output, no_eof),
        Commands::Decompress {
            input,
            code,
            output,
            no_eof,
        } => decompress(&input, &code, &output, no_eof),
        Commands::Show { code } => show(&code),
    }
}

fn load_code(path: &Path) -> Result<HuffmanCode> {
    let file = File::open(path).with_context(|| format!("open code table {}", path.display()))?;
    HuffmanCode::load(BufReader::new(file))
        .with_context(|| format!("load code table {}", path.display()))
}

fn make_code(input: &Path, code_path: &Path, no_eof: bool) -> Result<()> {
    let data = fs::read(input).context("read provided file")?;

    let mut frequencies = vec![0u64; EOF as usize + 1];
    for &byte in &data {
        frequencies[byte as usize] += 1;
    }
    if !no_eof {
        frequencies[EOF as usize] = 1;
    }

    let code = HuffmanCode::from_frequencies(&frequencies).context("build code")?;
    let file = File::create(code_path)
        .with_context(|| format!("create code table {}", code_path.display()))?;
    code.save(BufWriter::new(file)).context("save code table")?;

    info!(
        "{} symbols, longest code {} bits",
        code.symbol_count(),
        code.depth()
    );
    Ok(())
}

fn compress(input: &Path, code_path: &Path, output: &Path, no_eof: bool) -> Result<()> {
    let data = fs::read(input).context("read provided file")?;
    let code = load_code(code_path)?;

    let symbols = data.iter().map(|&b| b as Symbol);
    let mut writer = BitWriter::new();
    let encoded = if no_eof {
        code.encode(symbols, &mut writer)
    } else {
        code.encode(symbols.chain([EOF]), &mut writer)
    };
    encoded.context("encode input")?;
    let (bytes, bit_len) = writer.finish();

    let mut out = BufWriter::new(
        File::create(output).with_context(|| format!("create {}", output.display()))?,
    );
    if no_eof {
        out.write_all(&bit_len.to_le_bytes())?;
    }
    out.write_all(&bytes)?;
    out.flush()?;

    info!("{} bytes in, {} bits out", data.len(), bit_len);
    Ok(())
}

fn decompress(input: &Path, code_path: &Path, output: &Path, no_eof: bool) -> Result<()> {
    let data = fs::read(input).context("read provided file")?;
    let code = load_code(code_path)?;

    // Nothing is written to disk unless the whole input decodes.
    let mut sink = ByteSink::new(Vec::new());

    let decoded = if no_eof {
        ensure!(data.len() >= 8, "input too short for bit length header");
        let (len, payload) = data.split_at(8);
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(len);
        let bit_len = u64::from_le_bytes(len_bytes);
        ensure!(
            bit_len <= payload.len() as u64 * 8,
            "bit length {} exceeds the {} bytes of payload",
            bit_len,
            payload.len()
        );

        Decoder::new(&code).decode(&mut BitReader::with_len(payload, bit_len), &mut sink)
    } else {
        Decoder::new(&code)
            .with_terminator(EOF)
            .decode(&mut BitReader::new(&data), &mut sink)
    };
    let emitted = decoded.context("decode input")?;

    fs::write(output, sink.into_inner())
        .with_context(|| format!("write {}", output.display()))?;

    info!("{} bytes decoded", emitted);
    Ok(())
}

fn show(code_path: &Path) -> Result<()> {
    let code = load_code(code_path)?;

    for (symbol, path) in code.code_table() {
        let label = match u8::try_from(symbol) {
            Ok(byte) if byte.is_ascii_graphic() => format!("{:?}", byte as char),
            Ok(_) => String::new(),
            Err(_) if symbol == EOF => "EOF".to_string(),
            Err(_) => String::new(),
        };
        println!("{symbol:>5} {label:>5} {:>3} {path}", path.len());
    }

    if !code.is_complete() {
        println!("warning: table leaves some branches without a symbol");
    }
    Ok(())
}
