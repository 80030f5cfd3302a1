use log::{debug, warn};
use phf::phf_map;

use crate::bus::Bus;

#[derive(Debug)]
pub(crate) struct CPU {
    // More info about the 6502 registers can be found here:
    // https://www.nesdev.org/obelisk-6502-guide/registers.html

    // The program counter is a 16 bit register that holds the memory address
    // of the next instruction to be executed.
    pub program_counter: u16,

    // The stack pointer is an 8 bit register holding the low 8 bits of the
    // next free location on the stack. The stack lives in page one
    // (0x0100 - 0x01FF) and grows downward.
    pub stack_pointer: u8,

    // The accumulator is an 8 bit register used for arithmetic and logical operations.
    pub accumulator: u8,

    // The 8 bit index registers, most commonly used to hold counters or
    // offsets for accessing memory.
    pub x_register: u8,
    pub y_register: u8,

    // As instructions are executed a set of processor flags are set or
    // cleared to record the results of the operation.
    // Bit 7: Negative Flag (N)
    // Bit 6: Overflow Flag (V)
    // Bit 5: Unused (U) (pushed as 1)
    // Bit 4: Break Command (B) (only meaningful in the pushed byte)
    // Bit 3: Decimal Mode Flag (D) (stored but ignored by ADC/SBC on the 2A03)
    // Bit 2: Interrupt Disable (I)
    // Bit 1: Zero Flag (Z)
    // Bit 0: Carry Flag (C)
    pub status_register: u8,

    // All memory accesses go through the bus, which owns RAM, the register
    // windows and the cartridge.
    bus: Bus,

    // Global cycle counter (counts CPU cycles executed).
    pub cycles: u64,

    // NMI is edge triggered: external components set the latch and the CPU
    // clears it when the interrupt is serviced between instructions.
    nmi_pending: bool,
    // IRQ is level triggered: the line stays asserted until someone
    // deasserts it, and is sampled whenever the I flag is clear.
    irq_line: bool,

    // Unofficial opcodes are reported once each, not on every execution.
    unofficial_reported: [bool; 256],
}

// Each flag corresponds to a bit in the status register.
// Values are the bit positions.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StatusFlag {
    Carry = 0,
    Zero = 1,
    InterruptDisable = 2,
    DecimalMode = 3,
    BreakCommand = 4,
    Unused = 5,
    Overflow = 6,
    Negative = 7,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AddressingMode {
    Absolute,    // e.g. LDA $1234
    AbsoluteX,   // e.g. LDA $1234,X
    AbsoluteY,   // e.g. LDA $1234,Y
    Accumulator, // e.g. ASL A
    Immediate,   // e.g. LDA #$10
    Implicit,    // e.g. CLC, INX (no operand)
    Indirect,    // e.g. JMP ($1234)
    IndirectX,   // e.g. LDA ($10,X)
    IndirectY,   // e.g. LDA ($10),Y
    Relative,    // e.g. BEQ +5
    ZeroPage,    // e.g. LDA $10
    ZeroPageX,   // e.g. LDA $10,X
    ZeroPageY,   // e.g. LDX $10,Y
}

pub(crate) fn new_cpu(bus: Bus) -> CPU {
    CPU {
        program_counter: 0x0000,
        stack_pointer: CPU::STACK_POINTER_AFTER_RESET,
        accumulator: 0x00,
        x_register: 0x00,
        y_register: 0x00,
        status_register: CPU::STATUS_AFTER_RESET,
        bus,
        cycles: 0,
        nmi_pending: false,
        irq_line: false,
        unofficial_reported: [false; 256],
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Operand {
    pub name: &'static str,
    // Function pointer to the instruction handler.
    //                    memory value   address
    handler: fn(&mut CPU, Option<u8>, Option<u16>) -> u8,
    addressing_mode: AddressingMode,
    pub bytes: u8,
    cycles: u8,
    // Whether crossing a page boundary during address resolution costs an
    // extra cycle. Only read-like instructions pay it; stores and
    // read-modify-write instructions always take the worst case.
    page_cross: bool,
}

// List of all 256 opcodes and their corresponding Operand definitions.
// Cycle counts follow the official 6502 datasheet; opcodes outside the
// official set are named "???" and execute as NOPs of the documented
// byte length and cycle count.
static OPERAND_MAP: phf::Map<u8, Operand> = phf_map! {
        // ADC Instructions
        0x69u8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0x65u8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x75u8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0x6Du8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0x7Du8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },
        0x79u8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },
        0x61u8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0x71u8 => Operand { name: "ADC", handler: CPU::handle_adc, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true },

        // AND Instructions
        0x29u8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0x25u8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x35u8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0x2Du8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0x3Du8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },
        0x39u8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },
        0x21u8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0x31u8 => Operand { name: "AND", handler: CPU::handle_and, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true },

        // ASL Instructions
        0x0Au8 => Operand { name: "ASL", handler: CPU::handle_asl, addressing_mode: AddressingMode::Accumulator, bytes: 1, cycles: 2, page_cross: false },
        0x06u8 => Operand { name: "ASL", handler: CPU::handle_asl, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false },
        0x16u8 => Operand { name: "ASL", handler: CPU::handle_asl, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false },
        0x0Eu8 => Operand { name: "ASL", handler: CPU::handle_asl, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false },
        0x1Eu8 => Operand { name: "ASL", handler: CPU::handle_asl, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false },

        // Branch Instructions
        // Base cost is 2 cycles; the handler adds 1 when the branch is taken
        // and 1 more when the target is on another page.
        0x90u8 => Operand { name: "BCC", handler: CPU::handle_bcc, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },
        0xB0u8 => Operand { name: "BCS", handler: CPU::handle_bcs, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },
        0xF0u8 => Operand { name: "BEQ", handler: CPU::handle_beq, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },
        0x30u8 => Operand { name: "BMI", handler: CPU::handle_bmi, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },
        0xD0u8 => Operand { name: "BNE", handler: CPU::handle_bne, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },
        0x10u8 => Operand { name: "BPL", handler: CPU::handle_bpl, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },
        0x50u8 => Operand { name: "BVC", handler: CPU::handle_bvc, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },
        0x70u8 => Operand { name: "BVS", handler: CPU::handle_bvs, addressing_mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_cross: false },

        // BIT Instructions
        0x24u8 => Operand { name: "BIT", handler: CPU::handle_bit, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x2Cu8 => Operand { name: "BIT", handler: CPU::handle_bit, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },

        // BRK Instruction
        0x00u8 => Operand { name: "BRK", handler: CPU::handle_brk, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 7, page_cross: false },

        // Flag Instructions
        0x18u8 => Operand { name: "CLC", handler: CPU::handle_clc, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0xD8u8 => Operand { name: "CLD", handler: CPU::handle_cld, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0x58u8 => Operand { name: "CLI", handler: CPU::handle_cli, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0xB8u8 => Operand { name: "CLV", handler: CPU::handle_clv, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0x38u8 => Operand { name: "SEC", handler: CPU::handle_sec, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0xF8u8 => Operand { name: "SED", handler: CPU::handle_sed, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0x78u8 => Operand { name: "SEI", handler: CPU::handle_sei, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },

        // CMP Instructions
        0xC9u8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0xC5u8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0xD5u8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0xCDu8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0xDDu8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },
        0xD9u8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },
        0xC1u8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0xD1u8 => Operand { name: "CMP", handler: CPU::handle_cmp, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true },

        // CPX Instructions
        0xE0u8 => Operand { name: "CPX", handler: CPU::handle_cpx, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0xE4u8 => Operand { name: "CPX", handler: CPU::handle_cpx, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0xECu8 => Operand { name: "CPX", handler: CPU::handle_cpx, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },

        // CPY Instructions
        0xC0u8 => Operand { name: "CPY", handler: CPU::handle_cpy, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0xC4u8 => Operand { name: "CPY", handler: CPU::handle_cpy, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0xCCu8 => Operand { name: "CPY", handler: CPU::handle_cpy, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },

        // DEC Instructions
        0xC6u8 => Operand { name: "DEC", handler: CPU::handle_dec, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false },
        0xD6u8 => Operand { name: "DEC", handler: CPU::handle_dec, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false },
        0xCEu8 => Operand { name: "DEC", handler: CPU::handle_dec, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false },
        0xDEu8 => Operand { name: "DEC", handler: CPU::handle_dec, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false },

        // DEX / DEY Instructions
        0xCAu8 => Operand { name: "DEX", handler: CPU::handle_dex, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0x88u8 => Operand { name: "DEY", handler: CPU::handle_dey, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },

        // EOR Instructions
        0x49u8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0x45u8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x55u8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0x4Du8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0x5Du8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },
        0x59u8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },
        0x41u8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0x51u8 => Operand { name: "EOR", handler: CPU::handle_eor, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true },

        // INC Instructions
        0xE6u8 => Operand { name: "INC", handler: CPU::handle_inc, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false },
        0xF6u8 => Operand { name: "INC", handler: CPU::handle_inc, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false },
        0xEEu8 => Operand { name: "INC", handler: CPU::handle_inc, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false },
        0xFEu8 => Operand { name: "INC", handler: CPU::handle_inc, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false },

        // INX / INY Instructions
        0xE8u8 => Operand { name: "INX", handler: CPU::handle_inx, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0xC8u8 => Operand { name: "INY", handler: CPU::handle_iny, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },

        // JMP Instructions
        0x4Cu8 => Operand { name: "JMP", handler: CPU::handle_jmp, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 3, page_cross: false },
        0x6Cu8 => Operand { name: "JMP", handler: CPU::handle_jmp, addressing_mode: AddressingMode::Indirect, bytes: 3, cycles: 5, page_cross: false },

        // JSR Instruction
        0x20u8 => Operand { name: "JSR", handler: CPU::handle_jsr, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false },

        // LDA Instructions
        0xA9u8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0xA5u8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0xB5u8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0xADu8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0xBDu8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },
        0xB9u8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },
        0xA1u8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0xB1u8 => Operand { name: "LDA", handler: CPU::handle_lda, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true },

        // LDX Instructions
        0xA2u8 => Operand { name: "LDX", handler: CPU::handle_ldx, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0xA6u8 => Operand { name: "LDX", handler: CPU::handle_ldx, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0xB6u8 => Operand { name: "LDX", handler: CPU::handle_ldx, addressing_mode: AddressingMode::ZeroPageY, bytes: 2, cycles: 4, page_cross: false },
        0xAEu8 => Operand { name: "LDX", handler: CPU::handle_ldx, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0xBEu8 => Operand { name: "LDX", handler: CPU::handle_ldx, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },

        // LDY Instructions
        0xA0u8 => Operand { name: "LDY", handler: CPU::handle_ldy, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0xA4u8 => Operand { name: "LDY", handler: CPU::handle_ldy, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0xB4u8 => Operand { name: "LDY", handler: CPU::handle_ldy, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0xACu8 => Operand { name: "LDY", handler: CPU::handle_ldy, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0xBCu8 => Operand { name: "LDY", handler: CPU::handle_ldy, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },

        // LSR Instructions
        0x4Au8 => Operand { name: "LSR", handler: CPU::handle_lsr, addressing_mode: AddressingMode::Accumulator, bytes: 1, cycles: 2, page_cross: false },
        0x46u8 => Operand { name: "LSR", handler: CPU::handle_lsr, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false },
        0x56u8 => Operand { name: "LSR", handler: CPU::handle_lsr, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false },
        0x4Eu8 => Operand { name: "LSR", handler: CPU::handle_lsr, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false },
        0x5Eu8 => Operand { name: "LSR", handler: CPU::handle_lsr, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false },

        // NOP Instruction
        0xEAu8 => Operand { name: "NOP", handler: CPU::handle_nop, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },

        // ORA Instructions
        0x09u8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0x05u8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x15u8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0x0Du8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0x1Du8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },
        0x19u8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },
        0x01u8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0x11u8 => Operand { name: "ORA", handler: CPU::handle_ora, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true },

        // Stack Instructions
        0x48u8 => Operand { name: "PHA", handler: CPU::handle_pha, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 3, page_cross: false },
        0x08u8 => Operand { name: "PHP", handler: CPU::handle_php, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 3, page_cross: false },
        0x68u8 => Operand { name: "PLA", handler: CPU::handle_pla, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 4, page_cross: false },
        0x28u8 => Operand { name: "PLP", handler: CPU::handle_plp, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 4, page_cross: false },

        // ROL Instructions
        0x2Au8 => Operand { name: "ROL", handler: CPU::handle_rol, addressing_mode: AddressingMode::Accumulator, bytes: 1, cycles: 2, page_cross: false },
        0x26u8 => Operand { name: "ROL", handler: CPU::handle_rol, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false },
        0x36u8 => Operand { name: "ROL", handler: CPU::handle_rol, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false },
        0x2Eu8 => Operand { name: "ROL", handler: CPU::handle_rol, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false },
        0x3Eu8 => Operand { name: "ROL", handler: CPU::handle_rol, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false },

        // ROR Instructions
        0x6Au8 => Operand { name: "ROR", handler: CPU::handle_ror, addressing_mode: AddressingMode::Accumulator, bytes: 1, cycles: 2, page_cross: false },
        0x66u8 => Operand { name: "ROR", handler: CPU::handle_ror, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false },
        0x76u8 => Operand { name: "ROR", handler: CPU::handle_ror, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false },
        0x6Eu8 => Operand { name: "ROR", handler: CPU::handle_ror, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false },
        0x7Eu8 => Operand { name: "ROR", handler: CPU::handle_ror, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false },

        // RTI / RTS Instructions
        0x40u8 => Operand { name: "RTI", handler: CPU::handle_rti, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 6, page_cross: false },
        0x60u8 => Operand { name: "RTS", handler: CPU::handle_rts, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 6, page_cross: false },

        // SBC Instructions
        0xE9u8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false },
        0xE5u8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0xF5u8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0xEDu8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0xFDu8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true },
        0xF9u8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true },
        0xE1u8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0xF1u8 => Operand { name: "SBC", handler: CPU::handle_sbc, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true },

        // STA Instructions
        // Stores never pay the page-cross penalty; the indexed modes always
        // take the worst-case count.
        0x85u8 => Operand { name: "STA", handler: CPU::handle_sta, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x95u8 => Operand { name: "STA", handler: CPU::handle_sta, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0x8Du8 => Operand { name: "STA", handler: CPU::handle_sta, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },
        0x9Du8 => Operand { name: "STA", handler: CPU::handle_sta, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 5, page_cross: false },
        0x99u8 => Operand { name: "STA", handler: CPU::handle_sta, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 5, page_cross: false },
        0x81u8 => Operand { name: "STA", handler: CPU::handle_sta, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false },
        0x91u8 => Operand { name: "STA", handler: CPU::handle_sta, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 6, page_cross: false },

        // STX Instructions
        0x86u8 => Operand { name: "STX", handler: CPU::handle_stx, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x96u8 => Operand { name: "STX", handler: CPU::handle_stx, addressing_mode: AddressingMode::ZeroPageY, bytes: 2, cycles: 4, page_cross: false },
        0x8Eu8 => Operand { name: "STX", handler: CPU::handle_stx, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },

        // STY Instructions
        0x84u8 => Operand { name: "STY", handler: CPU::handle_sty, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false },
        0x94u8 => Operand { name: "STY", handler: CPU::handle_sty, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false },
        0x8Cu8 => Operand { name: "STY", handler: CPU::handle_sty, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false },

        // Transfer Instructions
        0xAAu8 => Operand { name: "TAX", handler: CPU::handle_tax, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0xA8u8 => Operand { name: "TAY", handler: CPU::handle_tay, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0xBAu8 => Operand { name: "TSX", handler: CPU::handle_tsx, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0x8Au8 => Operand { name: "TXA", handler: CPU::handle_txa, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0x9Au8 => Operand { name: "TXS", handler: CPU::handle_txs, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },
        0x98u8 => Operand { name: "TYA", handler: CPU::handle_tya, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false },

        // Unofficial opcodes. All of them execute as NOPs that consume the
        // documented operand bytes and cycle count. The halting KIL opcodes
        // have no defined timing and are charged 2 cycles.
        0x02u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x03u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 8, page_cross: false }, // SLO
        0x04u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false }, // NOP
        0x07u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false }, // SLO
        0x0Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // ANC
        0x0Cu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false }, // NOP
        0x0Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false }, // SLO
        0x12u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x13u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 8, page_cross: false }, // SLO
        0x14u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false }, // NOP
        0x17u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false }, // SLO
        0x1Au8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // NOP
        0x1Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 7, page_cross: false }, // SLO
        0x1Cu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true }, // NOP
        0x1Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false }, // SLO
        0x22u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x23u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 8, page_cross: false }, // RLA
        0x27u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false }, // RLA
        0x2Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // ANC
        0x2Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false }, // RLA
        0x32u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x33u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 8, page_cross: false }, // RLA
        0x34u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false }, // NOP
        0x37u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false }, // RLA
        0x3Au8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // NOP
        0x3Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 7, page_cross: false }, // RLA
        0x3Cu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true }, // NOP
        0x3Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false }, // RLA
        0x42u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x43u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 8, page_cross: false }, // SRE
        0x44u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false }, // NOP
        0x47u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false }, // SRE
        0x4Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // ALR
        0x4Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false }, // SRE
        0x52u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x53u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 8, page_cross: false }, // SRE
        0x54u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false }, // NOP
        0x57u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false }, // SRE
        0x5Au8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // NOP
        0x5Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 7, page_cross: false }, // SRE
        0x5Cu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true }, // NOP
        0x5Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false }, // SRE
        0x62u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x63u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 8, page_cross: false }, // RRA
        0x64u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false }, // NOP
        0x67u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false }, // RRA
        0x6Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // ARR
        0x6Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false }, // RRA
        0x72u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x73u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 8, page_cross: false }, // RRA
        0x74u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false }, // NOP
        0x77u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false }, // RRA
        0x7Au8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // NOP
        0x7Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 7, page_cross: false }, // RRA
        0x7Cu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true }, // NOP
        0x7Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false }, // RRA
        0x80u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // NOP
        0x82u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // NOP
        0x83u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false }, // SAX
        0x87u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false }, // SAX
        0x89u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // NOP
        0x8Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // XAA
        0x8Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false }, // SAX
        0x92u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0x93u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 6, page_cross: false }, // AHX
        0x97u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageY, bytes: 2, cycles: 4, page_cross: false }, // SAX
        0x9Bu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 5, page_cross: false }, // TAS
        0x9Cu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 5, page_cross: false }, // SHY
        0x9Eu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 5, page_cross: false }, // SHX
        0x9Fu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 5, page_cross: false }, // AHX
        0xA3u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_cross: false }, // LAX
        0xA7u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_cross: false }, // LAX
        0xABu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // LAX
        0xAFu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_cross: false }, // LAX
        0xB2u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0xB3u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_cross: true }, // LAX
        0xB7u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageY, bytes: 2, cycles: 4, page_cross: false }, // LAX
        0xBBu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true }, // LAS
        0xBFu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_cross: true }, // LAX
        0xC2u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // NOP
        0xC3u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 8, page_cross: false }, // DCP
        0xC7u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false }, // DCP
        0xCBu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // AXS
        0xCFu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false }, // DCP
        0xD2u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0xD3u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 8, page_cross: false }, // DCP
        0xD4u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false }, // NOP
        0xD7u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false }, // DCP
        0xDAu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // NOP
        0xDBu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 7, page_cross: false }, // DCP
        0xDCu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true }, // NOP
        0xDFu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false }, // DCP
        0xE2u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // NOP
        0xE3u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectX, bytes: 2, cycles: 8, page_cross: false }, // ISC
        0xE7u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_cross: false }, // ISC
        0xEBu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_cross: false }, // SBC
        0xEFu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_cross: false }, // ISC
        0xF2u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // KIL
        0xF3u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::IndirectY, bytes: 2, cycles: 8, page_cross: false }, // ISC
        0xF4u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_cross: false }, // NOP
        0xF7u8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_cross: false }, // ISC
        0xFAu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::Implicit, bytes: 1, cycles: 2, page_cross: false }, // NOP
        0xFBu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 7, page_cross: false }, // ISC
        0xFCu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_cross: true }, // NOP
        0xFFu8 => Operand { name: "???", handler: CPU::handle_invalid, addressing_mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_cross: false }, // ISC
};

#[allow(dead_code)]
impl CPU {
    pub(crate) const STACK_BASE_ADDRESS: u16 = 0x0100;
    pub(crate) const STACK_POINTER_AFTER_RESET: u8 = 0xFD;
    // I and the unused bit are set after reset.
    pub(crate) const STATUS_AFTER_RESET: u8 = 0x24;
    pub(crate) const NMI_VECTOR_ADDRESS: u16 = 0xFFFA;
    pub(crate) const RESET_VECTOR_ADDRESS: u16 = 0xFFFC;
    pub(crate) const IRQ_VECTOR_ADDRESS: u16 = 0xFFFE;

    pub(crate) fn decode(opcode: u8) -> &'static Operand {
        OPERAND_MAP
            .get(&opcode)
            .expect("the dispatch table covers all 256 opcodes")
    }

    pub(crate) fn read_u8(&self, addr: u16) -> u8 {
        self.bus.read_u8(addr)
    }

    pub(crate) fn write_u8(&mut self, addr: u16, value: u8) {
        self.bus.write_u8(addr, value);
    }

    // Little-endian format: low byte at addr, high byte at addr + 1.
    pub(crate) fn read_u16(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read_u8(addr), self.read_u8(addr.wrapping_add(1))])
    }

    pub(crate) fn write_u16(&mut self, addr: u16, value: u16) {
        let [low, high] = u16::to_le_bytes(value);
        self.write_u8(addr, low);
        self.write_u8(addr.wrapping_add(1), high);
    }

    /// Reads the byte at the program counter and advances it by 1.
    fn read_pc_u8(&mut self) -> u8 {
        let value = self.read_u8(self.program_counter);
        self.program_counter = self.program_counter.wrapping_add(1);
        value
    }

    /// Reads the little-endian word at the program counter and advances it by 2.
    fn read_pc_u16(&mut self) -> u16 {
        let low = self.read_pc_u8();
        let high = self.read_pc_u8();
        u16::from_le_bytes([low, high])
    }

    pub(crate) fn set_status_flag(&mut self, flag: StatusFlag, value: bool) {
        if value {
            self.status_register |= 1 << (flag as u8);
        } else {
            self.status_register &= !(1 << (flag as u8));
        }
    }

    pub(crate) fn get_status_flag(&self, flag: StatusFlag) -> bool {
        (self.status_register & (1 << (flag as u8))) != 0
    }

    // Z and N are set together by nearly every operation.
    pub(crate) fn update_zero_negative_flags(&mut self, value: u8) {
        self.set_status_flag(StatusFlag::Zero, value == 0);
        self.set_status_flag(StatusFlag::Negative, (value & 0x80) != 0);
    }

    // Shared by CMP/CPX/CPY: computes register - memory, sets C when the
    // register is at least the memory value, and Z/N from the difference.
    // The register itself is not modified.
    pub(crate) fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.set_status_flag(StatusFlag::Carry, register >= value);
        self.update_zero_negative_flags(result);
    }

    // Shifts and rotates write back to memory for the addressed modes and
    // to the accumulator for ASL A / LSR A / ROL A / ROR A.
    pub(crate) fn write_shift_result(&mut self, opt_address: Option<u16>, result: u8) {
        match opt_address {
            Some(address) => self.write_u8(address, result),
            None => self.accumulator = result,
        }
    }

    /// Pushes a byte onto the stack.
    pub(crate) fn push_u8(&mut self, value: u8) {
        let stack_addr = Self::STACK_BASE_ADDRESS | self.stack_pointer as u16;
        self.write_u8(stack_addr, value);
        self.stack_pointer = self.stack_pointer.wrapping_sub(1);
    }

    /// Pushes a 16-bit word onto the stack, high byte first, so it is stored
    /// in little-endian order.
    pub(crate) fn push_u16(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.push_u8(high);
        self.push_u8(low);
    }

    /// Pops a byte from the stack.
    pub(crate) fn pop_u8(&mut self) -> u8 {
        self.stack_pointer = self.stack_pointer.wrapping_add(1);
        let stack_addr = Self::STACK_BASE_ADDRESS | self.stack_pointer as u16;
        self.read_u8(stack_addr)
    }

    /// Pops a 16-bit word from the stack, low byte first.
    pub(crate) fn pop_u16(&mut self) -> u16 {
        let low = self.pop_u8();
        let high = self.pop_u8();
        u16::from_le_bytes([low, high])
    }

    // The status byte pushed when an interrupt is serviced has B clear and
    // the unused bit set, unlike the byte pushed by PHP/BRK.
    fn push_status_for_interrupt(&mut self) {
        let mut status = self.status_register;
        status &= !(1 << (StatusFlag::BreakCommand as u8));
        status |= 1 << (StatusFlag::Unused as u8);
        self.push_u8(status);
    }

    /// Hardware reset: registers are cleared, the stack pointer lands on
    /// 0xFD (the hardware performs three pseudo-pushes during reset), and
    /// execution continues at the reset vector.
    pub(crate) fn reset(&mut self) {
        self.accumulator = 0;
        self.x_register = 0;
        self.y_register = 0;
        self.stack_pointer = Self::STACK_POINTER_AFTER_RESET;
        self.status_register = Self::STATUS_AFTER_RESET;
        self.nmi_pending = false;
        self.irq_line = false;
        self.program_counter = self.read_u16(Self::RESET_VECTOR_ADDRESS);
        self.cycles += 7;
    }

    /// Services a maskable interrupt. Ignored while the I flag is set.
    /// Returns the cycles consumed (7, or 0 when ignored).
    pub(crate) fn irq(&mut self) -> u8 {
        if self.get_status_flag(StatusFlag::InterruptDisable) {
            return 0;
        }
        debug!("servicing IRQ, PC={:04X}", self.program_counter);
        self.push_u16(self.program_counter);
        self.push_status_for_interrupt();
        self.set_status_flag(StatusFlag::InterruptDisable, true);
        self.program_counter = self.read_u16(Self::IRQ_VECTOR_ADDRESS);
        self.cycles += 7;
        7
    }

    /// Services a non-maskable interrupt. Always taken. Returns the 8 cycles
    /// consumed.
    pub(crate) fn nmi(&mut self) -> u8 {
        debug!("servicing NMI, PC={:04X}", self.program_counter);
        self.push_u16(self.program_counter);
        self.push_status_for_interrupt();
        self.set_status_flag(StatusFlag::InterruptDisable, true);
        self.program_counter = self.read_u16(Self::NMI_VECTOR_ADDRESS);
        self.cycles += 8;
        8
    }

    /// Latches an NMI request. The CPU clears the latch when it services the
    /// interrupt at the next instruction boundary.
    pub(crate) fn assert_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drives the IRQ line. The line is sampled at each instruction boundary
    /// and must stay asserted until the CPU notices it with I clear.
    pub(crate) fn set_irq(&mut self, level: bool) {
        self.irq_line = level;
    }

    /// Executes exactly one instruction (or services a pending interrupt)
    /// and returns the cycles consumed.
    pub(crate) fn step(&mut self) -> u8 {
        // Interrupts are sampled only between instructions, NMI first.
        if self.nmi_pending {
            self.nmi_pending = false;
            return self.nmi();
        }
        if self.irq_line {
            let consumed = self.irq();
            if consumed > 0 {
                return consumed;
            }
        }

        let instruction_addr = self.program_counter;
        let opcode = self.read_pc_u8();
        let operand = CPU::decode(opcode);

        if operand.name == "???" && !self.unofficial_reported[opcode as usize] {
            self.unofficial_reported[opcode as usize] = true;
            warn!(
                "unofficial opcode {:02X} at {:04X} executed as NOP",
                opcode, instruction_addr
            );
        }

        let (value, address, page_crossed) = self.resolve_operand(operand.addressing_mode);
        let handler_extra = (operand.handler)(self, value, address);

        let mut consumed = operand.cycles + handler_extra;
        if page_crossed && operand.page_cross {
            consumed += 1;
        }
        self.cycles += consumed as u64;
        consumed
    }

    /// Steps until at least `cycle_budget` cycles have elapsed. Execution
    /// only stops at an instruction boundary, so the last instruction may
    /// overshoot the budget.
    pub(crate) fn run(&mut self, cycle_budget: u64) {
        self.run_with_callback(cycle_budget, |_| {});
    }

    /// Like `run`, but invokes `callback` before each instruction. Used by
    /// the trace mode in main.
    pub(crate) fn run_with_callback<F>(&mut self, cycle_budget: u64, mut callback: F)
    where
        F: FnMut(&mut CPU),
    {
        let start = self.cycles;
        while self.cycles - start < cycle_budget {
            callback(self);
            self.step();
        }
    }

    /// Branch helper: centralizes branch behavior for relative branches.
    /// `condition` indicates whether the branch should be taken.
    /// `offset` is the signed 8-bit relative offset.
    /// Returns additional cycles: 0 if not taken, +1 if taken, +2 if the
    /// target is on a different page.
    pub(crate) fn branch(&mut self, condition: bool, offset: i8) -> u8 {
        let mut additional_cycles: u8 = 0;
        if condition {
            let old_pc = self.program_counter;
            self.program_counter = self.program_counter.wrapping_add(offset as u16);
            additional_cycles += 1; // branch taken
            if (old_pc & 0xFF00) != (self.program_counter & 0xFF00) {
                additional_cycles += 1; // page crossed
            }
        }
        additional_cycles
    }

    // Resolves the operand for the current addressing mode, advancing the
    // program counter past the operand bytes. Returns the fetched value, the
    // effective address (None for register and relative operands) and
    // whether address computation crossed a page boundary.
    fn resolve_operand(&mut self, mode: AddressingMode) -> (Option<u8>, Option<u16>, bool) {
        match mode {
            AddressingMode::Implicit => (None, None, false),
            AddressingMode::Accumulator => (Some(self.accumulator), None, false),
            // Branch handlers receive the raw offset byte as their value.
            AddressingMode::Relative => (Some(self.read_pc_u8()), None, false),
            _ => {
                let (address, page_crossed) = self.operand_address(mode);
                (Some(self.read_u8(address)), Some(address), page_crossed)
            }
        }
    }

    // Computes the effective address for the memory addressing modes.
    fn operand_address(&mut self, mode: AddressingMode) -> (u16, bool) {
        match mode {
            AddressingMode::Immediate => {
                let addr = self.program_counter;
                self.program_counter = self.program_counter.wrapping_add(1);
                (addr, false)
            }

            AddressingMode::ZeroPage => (self.read_pc_u8() as u16, false),

            // Zero page indexing wraps within the zero page: $80,X with
            // X=0xFF reads from 0x7F, not 0x17F.
            AddressingMode::ZeroPageX => {
                let base = self.read_pc_u8();
                (base.wrapping_add(self.x_register) as u16, false)
            }

            AddressingMode::ZeroPageY => {
                let base = self.read_pc_u8();
                (base.wrapping_add(self.y_register) as u16, false)
            }

            AddressingMode::Absolute => (self.read_pc_u16(), false),

            AddressingMode::AbsoluteX => {
                let base = self.read_pc_u16();
                let addr = base.wrapping_add(self.x_register as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }

            AddressingMode::AbsoluteY => {
                let base = self.read_pc_u16();
                let addr = base.wrapping_add(self.y_register as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }

            AddressingMode::Indirect => {
                let ptr = self.read_pc_u16();
                let low = self.read_u8(ptr);
                // Hardware bug: when the pointer sits on the last byte of a
                // page, the high byte is read from the start of the SAME
                // page. JMP ($10FF) reads its high byte from 0x1000.
                let high = self.read_u8((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
                (u16::from_le_bytes([low, high]), false)
            }

            AddressingMode::IndirectX => {
                let zp = self.read_pc_u8().wrapping_add(self.x_register);
                let low = self.read_u8(zp as u16);
                let high = self.read_u8(zp.wrapping_add(1) as u16);
                (u16::from_le_bytes([low, high]), false)
            }

            AddressingMode::IndirectY => {
                let zp = self.read_pc_u8();
                let low = self.read_u8(zp as u16);
                let high = self.read_u8(zp.wrapping_add(1) as u16);
                let base = u16::from_le_bytes([low, high]);
                let addr = base.wrapping_add(self.y_register as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }

            // Accumulator, Implicit and Relative operands never produce an
            // effective address.
            AddressingMode::Accumulator
            | AddressingMode::Implicit
            | AddressingMode::Relative => {
                panic!("no effective address for {:?}", mode)
            }
        }
    }
}

/// Formats a one-line execution trace for the instruction at the current
/// program counter. Reads are routed through the bus, which is side-effect
/// free in this emulator.
pub(crate) fn trace(cpu: &CPU) -> String {
    let pc = cpu.program_counter;
    let opcode = cpu.read_u8(pc);
    let operand = CPU::decode(opcode);

    let mut raw_bytes = format!("{:02X}", opcode);
    for i in 1..operand.bytes as u16 {
        raw_bytes.push_str(&format!(" {:02X}", cpu.read_u8(pc.wrapping_add(i))));
    }

    format!(
        "{:04X}  {:<8}  {}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        pc,
        raw_bytes,
        operand.name,
        cpu.accumulator,
        cpu.x_register,
        cpu.y_register,
        cpu.status_register,
        cpu.stack_pointer,
        cpu.cycles,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::Rom;

    // Builds a CPU whose cartridge holds `program` at 0x8000 with the reset
    // vector pointing there, already reset and with the cycle counter
    // cleared so tests can assert on per-step costs.
    fn cpu_with_program(program: &[u8]) -> CPU {
        let mut cpu = new_cpu(Bus::new(Rom::with_program(program)));
        cpu.reset();
        cpu.cycles = 0;
        cpu
    }

    #[test]
    fn test_cpu_init() {
        let cpu = new_cpu(Bus::new(Rom::test_rom()));
        assert_eq!(cpu.program_counter, 0x0000);
        assert_eq!(cpu.stack_pointer, 0xFD);
        assert_eq!(cpu.accumulator, 0x00);
        assert_eq!(cpu.x_register, 0x00);
        assert_eq!(cpu.y_register, 0x00);
        assert_eq!(cpu.status_register, 0x24);
        assert_eq!(cpu.cycles, 0);
    }

    #[test]
    fn test_dispatch_table_covers_all_256_opcodes() {
        for opcode in 0..=0xFFu16 {
            let operand = OPERAND_MAP.get(&(opcode as u8));
            assert!(operand.is_some(), "opcode {:02X} missing from table", opcode);
            let operand = operand.unwrap();
            assert!(
                (1..=3).contains(&operand.bytes),
                "opcode {:02X} has bad byte count {}",
                opcode,
                operand.bytes
            );
            assert!(
                (2..=8).contains(&operand.cycles),
                "opcode {:02X} has bad cycle count {}",
                opcode,
                operand.cycles
            );
        }
    }

    #[test]
    fn test_reset_loads_vector_and_clears_registers() {
        let mut cpu = new_cpu(Bus::new(Rom::with_program(&[0xEA])));
        cpu.accumulator = 0x55;
        cpu.x_register = 0x66;
        cpu.y_register = 0x77;
        let cycles_before = cpu.cycles;

        cpu.reset();

        assert_eq!(cpu.program_counter, 0x8000);
        assert_eq!(cpu.stack_pointer, 0xFD);
        assert_eq!(cpu.accumulator, 0);
        assert_eq!(cpu.x_register, 0);
        assert_eq!(cpu.y_register, 0);
        assert_eq!(cpu.status_register, 0x24, "I and the unused bit are set");
        assert_eq!(cpu.cycles - cycles_before, 7);
    }

    // LDA immediate with positive, zero and negative values.

    #[test]
    fn test_lda_immediate_positive() {
        let mut cpu = cpu_with_program(&[0xA9, 0x42]);
        let cycles = cpu.step();
        assert_eq!(cpu.accumulator, 0x42);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), false);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), false);
        assert_eq!(cpu.program_counter, 0x8002);
        assert_eq!(cycles, 2);
    }

    #[test]
    fn test_lda_immediate_zero() {
        let mut cpu = cpu_with_program(&[0xA9, 0x00]);
        cpu.step();
        assert_eq!(cpu.accumulator, 0x00);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), false);
    }

    #[test]
    fn test_lda_immediate_negative() {
        let mut cpu = cpu_with_program(&[0xA9, 0x80]);
        cpu.step();
        assert_eq!(cpu.accumulator, 0x80);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), false);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), true);
    }

    #[test]
    fn test_adc_immediate_overflow() {
        let mut cpu = cpu_with_program(&[0x69, 0x50]);
        cpu.accumulator = 0x50;
        cpu.step();
        assert_eq!(cpu.accumulator, 0xA0);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Overflow), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Carry), false);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), false);
    }

    #[test]
    fn test_adc_immediate_carry_out() {
        let mut cpu = cpu_with_program(&[0x69, 0x01]);
        cpu.accumulator = 0xFF;
        cpu.step();
        assert_eq!(cpu.accumulator, 0x00);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Carry), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), false);
        assert_eq!(cpu.get_status_flag(StatusFlag::Overflow), false);
    }

    #[test]
    fn test_beq_taken_no_page_cross() {
        let mut cpu = cpu_with_program(&[0xF0, 0x10]);
        cpu.set_status_flag(StatusFlag::Zero, true);
        let cycles = cpu.step();
        assert_eq!(cpu.program_counter, 0x8012);
        assert_eq!(cycles, 3);
    }

    #[test]
    fn test_beq_taken_page_cross() {
        let mut program = vec![0x00u8; 0x100];
        program[0xF0] = 0xF0;
        program[0xF1] = 0x20;
        let mut cpu = cpu_with_program(&program);
        cpu.program_counter = 0x80F0;
        cpu.set_status_flag(StatusFlag::Zero, true);
        let cycles = cpu.step();
        assert_eq!(cpu.program_counter, 0x8112);
        assert_eq!(cycles, 4);
    }

    #[test]
    fn test_beq_not_taken() {
        let mut cpu = cpu_with_program(&[0xF0, 0x10]);
        cpu.set_status_flag(StatusFlag::Zero, false);
        let cycles = cpu.step();
        assert_eq!(cpu.program_counter, 0x8002);
        assert_eq!(cycles, 2);
    }

    #[test]
    fn test_indirect_jmp_page_bug() {
        let mut cpu = cpu_with_program(&[0x6C, 0xFF, 0x10]);
        // Pointer on a page boundary: low byte from 0x10FF, high byte
        // wraps to 0x1000 instead of 0x1100.
        cpu.write_u8(0x10FF, 0x34);
        cpu.write_u8(0x1000, 0x12);
        cpu.write_u8(0x1100, 0xAB);
        let cycles = cpu.step();
        assert_eq!(cpu.program_counter, 0x1234);
        assert_eq!(cycles, 5);
    }

    #[test]
    fn test_indirect_jmp_without_page_boundary() {
        let mut cpu = cpu_with_program(&[0x6C, 0x00, 0x02]);
        cpu.write_u8(0x0200, 0x78);
        cpu.write_u8(0x0201, 0x56);
        cpu.step();
        assert_eq!(cpu.program_counter, 0x5678);
    }

    #[test]
    fn test_jsr_rts_round_trip() {
        let mut program = vec![0x00u8; 0x1001];
        program[0] = 0x20; // JSR $9000
        program[1] = 0x00;
        program[2] = 0x90;
        program[0x1000] = 0x60; // RTS
        let mut cpu = cpu_with_program(&program);

        let jsr_cycles = cpu.step();
        assert_eq!(cpu.program_counter, 0x9000);
        assert_eq!(cpu.stack_pointer, 0xFB, "SP decremented by 2");
        // The pushed return address is the JSR's last operand byte: 0x8002.
        assert_eq!(cpu.read_u16(0x01FC), 0x8002);
        assert_eq!(jsr_cycles, 6);

        let rts_cycles = cpu.step();
        assert_eq!(cpu.program_counter, 0x8003);
        assert_eq!(cpu.stack_pointer, 0xFD, "SP restored");
        assert_eq!(rts_cycles, 6);
    }

    #[test]
    fn test_zero_page_wraparound() {
        // LDX #$FF; LDA $80,X must read from 0x7F, not 0x17F.
        let mut cpu = cpu_with_program(&[0xA2, 0xFF, 0xB5, 0x80]);
        cpu.write_u8(0x007F, 0x42);
        cpu.write_u8(0x017F, 0x99);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.accumulator, 0x42);
    }

    #[test]
    fn test_page_cross_costs_extra_cycle_for_loads() {
        // LDA $80FF,X with X=1 crosses into page 0x81.
        let mut cpu = cpu_with_program(&[0xBD, 0xFF, 0x80]);
        cpu.x_register = 0x01;
        assert_eq!(cpu.step(), 5);

        // Same access without the crossing costs the base 4 cycles.
        let mut cpu = cpu_with_program(&[0xBD, 0x00, 0x80]);
        cpu.x_register = 0x01;
        assert_eq!(cpu.step(), 4);
    }

    #[test]
    fn test_page_cross_is_free_for_stores() {
        // STA $00FF,X with X=1 crosses a page but still takes 5 cycles.
        let mut cpu = cpu_with_program(&[0x9D, 0xFF, 0x00]);
        cpu.x_register = 0x01;
        cpu.accumulator = 0x33;
        assert_eq!(cpu.step(), 5);
        assert_eq!(cpu.read_u8(0x0100), 0x33);
    }

    #[test]
    fn test_indirect_y_page_cross_cycle() {
        // LDA ($10),Y where the base 0x02FF + Y=1 crosses into 0x0300.
        let mut cpu = cpu_with_program(&[0xB1, 0x10]);
        cpu.write_u8(0x0010, 0xFF);
        cpu.write_u8(0x0011, 0x02);
        cpu.write_u8(0x0300, 0x77);
        cpu.y_register = 0x01;
        assert_eq!(cpu.step(), 6);
        assert_eq!(cpu.accumulator, 0x77);
    }

    #[test]
    fn test_indirect_x_zero_page_pointer_wraps() {
        // LDA ($FF,X) with X=1 reads the pointer from 0x00/0x01.
        let mut cpu = cpu_with_program(&[0xA1, 0xFF]);
        cpu.x_register = 0x01;
        cpu.write_u8(0x0000, 0x34);
        cpu.write_u8(0x0001, 0x02);
        cpu.write_u8(0x0234, 0x5A);
        cpu.step();
        assert_eq!(cpu.accumulator, 0x5A);
    }

    #[test]
    fn test_pha_pla_round_trip() {
        let mut cpu = cpu_with_program(&[0x48, 0xA9, 0x00, 0x68]);
        cpu.accumulator = 0x9C;
        let sp_before = cpu.stack_pointer;
        cpu.step(); // PHA
        cpu.step(); // LDA #$00 clobbers A
        assert_eq!(cpu.accumulator, 0x00);
        cpu.step(); // PLA
        assert_eq!(cpu.accumulator, 0x9C);
        assert_eq!(cpu.stack_pointer, sp_before);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), false);
    }

    #[test]
    fn test_php_plp_round_trip() {
        let mut cpu = cpu_with_program(&[0x08, 0x18, 0x28]);
        cpu.set_status_flag(StatusFlag::Carry, true);
        cpu.set_status_flag(StatusFlag::Negative, true);
        let observable = cpu.status_register & !0x30;

        cpu.step(); // PHP
        cpu.step(); // CLC clobbers carry
        assert_eq!(cpu.get_status_flag(StatusFlag::Carry), false);
        cpu.step(); // PLP
        assert_eq!(
            cpu.status_register & !0x30,
            observable,
            "C, Z, I, D, V, N restored"
        );
        // B stays clear and the unused bit reads as set in the register.
        assert_eq!(cpu.get_status_flag(StatusFlag::BreakCommand), false);
        assert_eq!(cpu.get_status_flag(StatusFlag::Unused), true);
    }

    #[test]
    fn test_txs_tsx_round_trip() {
        let mut cpu = cpu_with_program(&[0x9A, 0xBA]);
        cpu.x_register = 0x80;
        cpu.step(); // TXS
        assert_eq!(cpu.stack_pointer, 0x80);
        cpu.x_register = 0x00;
        cpu.step(); // TSX
        assert_eq!(cpu.x_register, 0x80);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), false);
    }

    #[test]
    fn test_brk_and_rti_round_trip() {
        let mut program = vec![0x00u8; 0x1001];
        program[0] = 0x00; // BRK
        program[0x1000] = 0x40; // RTI at 0x9000
        let mut rom = Rom::with_program(&program);
        // IRQ/BRK vector -> 0x9000.
        rom.prg_rom[0x7FFE] = 0x00;
        rom.prg_rom[0x7FFF] = 0x90;
        let mut cpu = new_cpu(Bus::new(rom));
        cpu.reset();
        cpu.cycles = 0;
        cpu.set_status_flag(StatusFlag::Carry, true);

        let brk_cycles = cpu.step();
        assert_eq!(cpu.program_counter, 0x9000);
        assert_eq!(brk_cycles, 7);
        assert_eq!(cpu.get_status_flag(StatusFlag::InterruptDisable), true);
        // The pushed status has B and the unused bit set.
        assert_eq!(cpu.read_u8(0x01FB) & 0x30, 0x30);

        let rti_cycles = cpu.step();
        // BRK pushes the address of the byte after its padding byte.
        assert_eq!(cpu.program_counter, 0x8002);
        assert_eq!(rti_cycles, 6);
        assert_eq!(cpu.get_status_flag(StatusFlag::Carry), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::BreakCommand), false);
        assert_eq!(cpu.get_status_flag(StatusFlag::Unused), true);
    }

    #[test]
    fn test_nmi_is_edge_triggered() {
        let program = vec![0xEAu8; 16];
        let mut rom = Rom::with_program(&program);
        rom.prg_rom[0x7FFA] = 0x08; // NMI vector -> 0x8008
        rom.prg_rom[0x7FFB] = 0x80;
        let mut cpu = new_cpu(Bus::new(rom));
        cpu.reset();
        cpu.cycles = 0;

        cpu.assert_nmi();
        let cycles = cpu.step();
        assert_eq!(cycles, 8);
        assert_eq!(cpu.program_counter, 0x8008);
        assert_eq!(cpu.get_status_flag(StatusFlag::InterruptDisable), true);
        // The pushed status byte has B clear and the unused bit set.
        assert_eq!(cpu.read_u8(0x01FB) & 0x30, 0x20);
        // The return address is the interrupted PC.
        assert_eq!(cpu.read_u16(0x01FC), 0x8000);

        // The latch was cleared: the next step runs a normal instruction.
        let cycles = cpu.step();
        assert_eq!(cycles, 2);
        assert_eq!(cpu.program_counter, 0x8009);
    }

    #[test]
    fn test_nmi_ignores_interrupt_disable() {
        let mut rom = Rom::with_program(&[0xEA]);
        rom.prg_rom[0x7FFA] = 0x00;
        rom.prg_rom[0x7FFB] = 0x90;
        let mut cpu = new_cpu(Bus::new(rom));
        cpu.reset();
        assert!(cpu.get_status_flag(StatusFlag::InterruptDisable));

        cpu.assert_nmi();
        cpu.step();
        assert_eq!(cpu.program_counter, 0x9000);
    }

    #[test]
    fn test_irq_respects_interrupt_disable() {
        let mut rom = Rom::with_program(&[0xEA, 0xEA]);
        rom.prg_rom[0x7FFE] = 0x00;
        rom.prg_rom[0x7FFF] = 0x90;
        let mut cpu = new_cpu(Bus::new(rom));
        cpu.reset();
        cpu.cycles = 0;

        // Reset leaves I set: the line is asserted but ignored.
        cpu.set_irq(true);
        let cycles = cpu.step();
        assert_eq!(cycles, 2, "instruction executes, IRQ masked");
        assert_eq!(cpu.program_counter, 0x8001);

        // Once I clears, the still-asserted line is serviced.
        cpu.set_status_flag(StatusFlag::InterruptDisable, false);
        let cycles = cpu.step();
        assert_eq!(cycles, 7);
        assert_eq!(cpu.program_counter, 0x9000);
        assert_eq!(cpu.get_status_flag(StatusFlag::InterruptDisable), true);
        // The interrupted PC was pushed for RTI.
        assert_eq!(cpu.read_u16(0x01FC), 0x8001);
    }

    #[test]
    fn test_unofficial_opcode_executes_as_nop() {
        // 0x80 is an unofficial 2-byte immediate NOP.
        let mut cpu = cpu_with_program(&[0x80, 0x12, 0xA9, 0x05]);
        let cycles = cpu.step();
        assert_eq!(cycles, 2);
        assert_eq!(cpu.program_counter, 0x8002);
        assert_eq!(cpu.accumulator, 0x00);
        cpu.step();
        assert_eq!(cpu.accumulator, 0x05);
    }

    #[test]
    fn test_unofficial_nop_abx_pays_page_cross() {
        let mut cpu = cpu_with_program(&[0x1C, 0xFF, 0x80]);
        cpu.x_register = 0x01;
        assert_eq!(cpu.step(), 5);

        let mut cpu = cpu_with_program(&[0x1C, 0x00, 0x80]);
        cpu.x_register = 0x01;
        assert_eq!(cpu.step(), 4);
    }

    #[test]
    fn test_run_stops_at_instruction_boundary() {
        // A stream of 2-cycle NOPs: a budget of 5 costs 6 cycles (3 steps).
        let mut cpu = cpu_with_program(&[0xEA; 8]);
        cpu.run(5);
        assert_eq!(cpu.cycles, 6);
        assert_eq!(cpu.program_counter, 0x8003);
    }

    #[test]
    fn test_run_with_callback_sees_every_instruction() {
        let mut cpu = cpu_with_program(&[0xEA; 4]);
        // Collect the PC before each executed instruction.
        let mut pcs = Vec::new();
        cpu.run_with_callback(6, |cpu| {
            pcs.push(cpu.program_counter);
        });
        assert_eq!(pcs, vec![0x8000, 0x8001, 0x8002]);
    }

    #[test]
    fn test_cycle_counter_accumulates() {
        let mut cpu = cpu_with_program(&[0xA9, 0x01, 0x8D, 0x00, 0x02]);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.cycles, 2 + 4);
    }

    #[test]
    fn test_trace_formats_instruction_line() {
        let mut cpu = cpu_with_program(&[0xA9, 0x42]);
        cpu.accumulator = 0x10;
        let line = trace(&cpu);
        assert!(line.starts_with("8000  A9 42"), "line was: {}", line);
        assert!(line.contains("LDA"), "line was: {}", line);
        assert!(line.contains("A:10"), "line was: {}", line);
        assert!(line.contains("SP:FD"), "line was: {}", line);
    }
}
