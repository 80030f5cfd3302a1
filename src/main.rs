mod bus;
mod cpu6502;
mod instructions;
mod rom;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use crate::bus::Bus;
use crate::cpu6502::{new_cpu, trace};
use crate::rom::Rom;

/// MOS 6502 (NES 2A03) CPU emulator.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// ROM image to run: an iNES file, or a raw binary mapped at 0x8000.
    rom: PathBuf,

    /// Print a one-line trace before every executed instruction.
    #[arg(long)]
    trace: bool,

    /// Cycle budget; execution stops at the next instruction boundary.
    #[arg(long, default_value_t = 1_000_000)]
    cycles: u64,

    /// Override the reset vector with a hex address (e.g. C000). Useful for
    /// test ROMs that start their headless suite off the vector path.
    #[arg(long, value_parser = parse_hex_addr)]
    start_pc: Option<u16>,
}

fn parse_hex_addr(s: &str) -> Result<u16, String> {
    u16::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| format!("invalid hex address {s:?}: {e}"))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let rom = match Rom::load(&args.rom) {
        Ok(rom) => rom,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "loaded {} (PRG {} bytes, mapper {})",
        args.rom.display(),
        rom.prg_rom.len(),
        rom.mapper
    );

    let bus = Bus::new(rom);
    let mut cpu = new_cpu(bus);
    cpu.reset();
    if let Some(pc) = args.start_pc {
        cpu.program_counter = pc;
    }
    info!("reset complete, PC={:04X}", cpu.program_counter);

    if args.trace {
        cpu.run_with_callback(args.cycles, |cpu| {
            println!("{}", trace(cpu));
        });
    } else {
        cpu.run(args.cycles);
    }
    info!("stopped after {} cycles at PC={:04X}", cpu.cycles, cpu.program_counter);

    ExitCode::SUCCESS
}
