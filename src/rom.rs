use std::path::Path;

use bitflags::bitflags;
use log::warn;
use thiserror::Error;

const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
const MAGIC_NUMBERS: &[u8; 4] = b"NES\x1a";
const PRG_BANK_SIZE: usize = 16384;
const CHR_BANK_SIZE: usize = 8192;

// The CPU sees cartridge space from 0x4020 upward, but every cartridge this
// loader supports maps its PRG ROM at 0x8000.
pub(crate) const PRG_BASE_ADDRESS: u16 = 0x8000;

bitflags! {
    // Byte 6 of the iNES header.
    // Ref: https://www.nesdev.org/wiki/INES#Flags_6
    struct Flags6: u8 {
        const VERTICAL_MIRRORING = 0b0000_0001;
        const BATTERY_RAM        = 0b0000_0010;
        const TRAINER            = 0b0000_0100;
        const FOUR_SCREEN        = 0b0000_1000;
        const MAPPER_LOW         = 0b1111_0000;
    }
}

bitflags! {
    // Byte 7 of the iNES header.
    // Ref: https://www.nesdev.org/wiki/INES#Flags_7
    struct Flags7: u8 {
        const VS_UNISYSTEM = 0b0000_0001;
        const PLAYCHOICE10 = 0b0000_0010;
        const MAPPER_HIGH  = 0b1111_0000;
    }
}

#[derive(Debug, Error)]
pub(crate) enum RomError {
    #[error("failed to read ROM file: {0}")]
    Io(#[from] std::io::Error),
    #[error("file is not in iNES format (bad magic numbers)")]
    BadMagic,
    #[error("ROM image is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("mapper {0} is not supported (only NROM)")]
    UnsupportedMapper(u8),
    #[error("invalid NROM PRG size: {0} banks (must be 1 or 2)")]
    BadPrgSize(u8),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum Mirroring {
    Vertical,
    Horizontal,
    FourScreen,
}

// Cartridge image exposed to the Bus through the 0x4020-0xFFFF window.
// Only mapper 0 (NROM) behavior is implemented: PRG sits at 0x8000, and a
// single 16KB bank is mirrored into 0xC000-0xFFFF.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub(crate) struct Rom {
    pub prg_rom: Vec<u8>,
    pub chr_rom: Vec<u8>,
    pub mapper: u8,
    pub mirroring: Mirroring,
    base: u16,
}

impl Rom {
    /// Wraps a raw binary image, served starting at `base` in cartridge
    /// space. No header is expected; reads outside the image return 0.
    pub(crate) fn from_raw(image: Vec<u8>, base: u16) -> Rom {
        Rom {
            prg_rom: image,
            chr_rom: Vec::new(),
            mapper: 0,
            mirroring: Mirroring::Horizontal,
            base,
        }
    }

    /// Parses an iNES image.
    /// Header layout: https://formats.kaitai.io/ines/index.html
    pub(crate) fn parse_ines(rom_data: Vec<u8>) -> Result<Rom, RomError> {
        if rom_data.len() < HEADER_SIZE || &rom_data[0..4] != MAGIC_NUMBERS {
            return Err(RomError::BadMagic);
        }

        let prg_banks = rom_data[4];
        let chr_banks = rom_data[5];
        let flags_6 = Flags6::from_bits_truncate(rom_data[6]);
        let flags_7 = Flags7::from_bits_truncate(rom_data[7]);

        // Bits 4-7 of byte 6 are the LOWER nibble of the mapper id,
        // bits 4-7 of byte 7 the UPPER nibble.
        let mapper =
            (flags_7 & Flags7::MAPPER_HIGH).bits() | (flags_6 & Flags6::MAPPER_LOW).bits() >> 4;

        let mirroring = if flags_6.contains(Flags6::FOUR_SCREEN) {
            Mirroring::FourScreen
        } else if flags_6.contains(Flags6::VERTICAL_MIRRORING) {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        // A 512-byte trainer, when present, sits between the header and PRG.
        let prg_rom_start = HEADER_SIZE
            + if flags_6.contains(Flags6::TRAINER) {
                TRAINER_SIZE
            } else {
                0
            };
        let prg_rom_len = prg_banks as usize * PRG_BANK_SIZE;
        let chr_rom_start = prg_rom_start + prg_rom_len;
        let chr_rom_len = chr_banks as usize * CHR_BANK_SIZE;

        let expected = chr_rom_start + chr_rom_len;
        if rom_data.len() < expected {
            return Err(RomError::Truncated {
                expected,
                found: rom_data.len(),
            });
        }

        let rom = Rom {
            prg_rom: rom_data[prg_rom_start..prg_rom_start + prg_rom_len].to_vec(),
            chr_rom: rom_data[chr_rom_start..chr_rom_start + chr_rom_len].to_vec(),
            mapper,
            mirroring,
            base: PRG_BASE_ADDRESS,
        };
        rom.check_validity()?;
        Ok(rom)
    }

    /// Reads a ROM from disk. Images carrying the iNES magic numbers go
    /// through the header parser; anything else is treated as a raw binary
    /// mapped at 0x8000.
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Rom, RomError> {
        let data = std::fs::read(path)?;
        if data.len() >= 4 && &data[0..4] == MAGIC_NUMBERS {
            Rom::parse_ines(data)
        } else {
            Ok(Rom::from_raw(data, PRG_BASE_ADDRESS))
        }
    }

    // Sanity check that the image is playable by this emulator.
    fn check_validity(&self) -> Result<(), RomError> {
        if self.mapper != 0 {
            return Err(RomError::UnsupportedMapper(self.mapper));
        }
        let banks = (self.prg_rom.len() / PRG_BANK_SIZE) as u8;
        if banks != 1 && banks != 2 {
            return Err(RomError::BadPrgSize(banks));
        }
        Ok(())
    }

    pub(crate) fn read_u8(&self, addr: u16) -> u8 {
        if addr < self.base {
            return 0;
        }
        let mut offset = (addr - self.base) as usize;
        // NROM-128: a single 16KB bank answers for both halves of the
        // 0x8000-0xFFFF window.
        if self.prg_rom.len() == PRG_BANK_SIZE && offset >= PRG_BANK_SIZE {
            offset %= PRG_BANK_SIZE;
        }
        self.prg_rom.get(offset).copied().unwrap_or(0)
    }

    pub(crate) fn write_u8(&mut self, addr: u16, _data: u8) {
        warn!("dropped write to PRG ROM at {:04X}", addr);
    }

    #[allow(dead_code)]
    pub(crate) fn test_rom() -> Rom {
        // One 16KB PRG bank full of NOPs, no CHR. Enough cartridge for the
        // CPU unit tests, which drive handlers directly or execute from RAM.
        Rom {
            prg_rom: vec![0xEA; PRG_BANK_SIZE],
            chr_rom: vec![0x00; CHR_BANK_SIZE],
            mapper: 0,
            mirroring: Mirroring::Horizontal,
            base: PRG_BASE_ADDRESS,
        }
    }

    /// Builds a 32KB cartridge with `program` at 0x8000 and the reset
    /// vector pointing at it. Used by tests that run whole instructions.
    #[allow(dead_code)]
    pub(crate) fn with_program(program: &[u8]) -> Rom {
        let mut prg = vec![0x00; 2 * PRG_BANK_SIZE];
        prg[..program.len()].copy_from_slice(program);
        // Reset vector at 0xFFFC/0xFFFD -> 0x8000.
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;
        Rom {
            prg_rom: prg,
            chr_rom: Vec::new(),
            mapper: 0,
            mirroring: Mirroring::Horizontal,
            base: PRG_BASE_ADDRESS,
        }
    }
}
