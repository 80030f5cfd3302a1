use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_asl(&mut self, opt_value: Option<u8>, opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of ASL should be present");
        let result = value << 1;

        // Bit 7 falls into the carry.
        self.set_status_flag(StatusFlag::Carry, (value & 0x80) != 0);
        self.update_zero_negative_flags(result);
        self.write_shift_result(opt_address, result);
        return 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::cpu6502::new_cpu;
    use crate::rom::Rom;

    #[test]
    fn test_asl_accumulator() {
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        cpu.accumulator = 0x40;
        cpu.handle_asl(Some(0x40), None);
        assert_eq!(cpu.accumulator, 0x80);
        assert_eq!(cpu.get_status_flag(StatusFlag::Carry), false);
        assert_eq!(cpu.get_status_flag(StatusFlag::Negative), true);
    }

    #[test]
    fn test_asl_shifts_bit7_into_carry() {
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        cpu.accumulator = 0x80;
        cpu.handle_asl(Some(0x80), None);
        assert_eq!(cpu.accumulator, 0x00);
        assert_eq!(cpu.get_status_flag(StatusFlag::Carry), true);
        assert_eq!(cpu.get_status_flag(StatusFlag::Zero), true);
    }

    #[test]
    fn test_asl_memory_mode_writes_back() {
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        cpu.write_u8(0x0200, 0x21);
        cpu.handle_asl(Some(0x21), Some(0x0200));
        assert_eq!(cpu.read_u8(0x0200), 0x42);
        assert_eq!(cpu.accumulator, 0x00, "A untouched in memory mode");
    }

    #[test]
    fn test_asl_carry_matches_bit7_for_all_values() {
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        for v in 0..=255u8 {
            cpu.handle_asl(Some(v), None);
            assert_eq!(cpu.accumulator, v << 1, "result for {v}");
            assert_eq!(
                cpu.get_status_flag(StatusFlag::Carry),
                v & 0x80 != 0,
                "carry for {v}"
            );
        }
    }
}
