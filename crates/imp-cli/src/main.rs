//! IMP Virtual Machine - CLI
//!
//! Minimal command-line host: load a program, run or disassemble it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use imp_core::bytecode::disassemble;
use imp_core::{ImageLoader, Interpreter, LoadedImage, Program, VmConfig};

mod natives;

#[derive(Parser)]
#[command(name = "imp", version, about = "IMP bytecode virtual machine")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a program and print the final stack
    Run {
        /// Path to the program image
        file: PathBuf,
        /// Treat the file as bare code without an image header
        #[arg(long)]
        raw: bool,
        /// Entry point for raw code
        #[arg(long, default_value_t = 0)]
        entry: usize,
        /// Maximum operand stack depth
        #[arg(long, env = "IMP_MAX_STACK")]
        max_stack: Option<usize>,
    },
    /// Print the instructions of a program
    Disasm {
        /// Path to the program image
        file: PathBuf,
        /// Treat the file as bare code without an image header
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { file, raw, entry, max_stack } => {
            let image = load(&file, raw, entry)?;
            let mut config = VmConfig::default();
            if let Some(limit) = max_stack {
                config = config.with_max_stack_size(limit);
            }
            run(config, image)
        }
        Commands::Disasm { file, raw } => {
            let image = load(&file, raw, 0)?;
            disasm(&image)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load(path: &Path, raw: bool, entry: usize) -> Result<LoadedImage> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if raw {
        debug!(len = bytes.len(), entry, "loaded raw code");
        return Ok(LoadedImage { program: Program::new(bytes), entry_point: entry });
    }
    let image = ImageLoader::load(&bytes)
        .with_context(|| format!("invalid image {}", path.display()))?;
    debug!(len = image.program.len(), entry = image.entry_point, "loaded image");
    Ok(image)
}

fn run(config: VmConfig, image: LoadedImage) -> Result<()> {
    let mut vm = Interpreter::new(config, image.program, natives::standard())
        .with_entry_point(image.entry_point);
    vm.run()
        .with_context(|| format!("runtime error at pc {:#x}", vm.pc()))?;

    for value in vm.stack().as_slice() {
        println!("{}", value);
    }
    Ok(())
}

fn disasm(image: &LoadedImage) -> Result<()> {
    let natives = natives::standard();
    for (offset, ins) in disassemble(&image.program).context("malformed code")? {
        let marker = if offset == image.entry_point { ">" } else { " " };
        match ins {
            imp_core::Instruction::PushProto(id) => {
                let name = natives.name(id).unwrap_or("?");
                println!("{}{:04x}: {} ({})", marker, offset, ins, name);
            }
            _ => println!("{}{:04x}: {}", marker, offset, ins),
        }
    }
    Ok(())
}
