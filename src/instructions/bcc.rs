use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_bcc(&mut self, opt_value: Option<u8>, _opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of BCC should be present");
        self.branch(!self.get_status_flag(StatusFlag::Carry), value as i8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::cpu6502::new_cpu;
    use crate::rom::Rom;

    #[test]
    fn test_bcc_taken_when_carry_clear() {
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        cpu.program_counter = 0x1000;
        cpu.set_status_flag(StatusFlag::Carry, false);
        let cycles = cpu.handle_bcc(Some(0x10), None);
        assert_eq!(cpu.program_counter, 0x1010);
        assert_eq!(cycles, 1);
    }

    #[test]
    fn test_bcc_not_taken_when_carry_set() {
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        cpu.program_counter = 0x1000;
        cpu.set_status_flag(StatusFlag::Carry, true);
        let cycles = cpu.handle_bcc(Some(0x10), None);
        assert_eq!(cpu.program_counter, 0x1000);
        assert_eq!(cycles, 0);
    }
}
