use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_sed(&mut self, _opt_value: Option<u8>, _opt_address: Option<u16>) -> u8 {
        self.set_status_flag(StatusFlag::DecimalMode, true);
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
    fn test_sed_sets_decimal_mode() {
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        cpu.handle_sed(None, None);
        assert_eq!(cpu.get_status_flag(StatusFlag::DecimalMode), true);
    }

    #[test]
    fn test_decimal_mode_does_not_change_adc() {
        // The flag is stored but ADC stays binary on the 2A03.
        let mut cpu = new_cpu(Bus::new(Rom::test_rom()));
        cpu.handle_sed(None, None);
        cpu.accumulator = 0x09;
        cpu.handle_adc(Some(0x01), None);
        assert_eq!(cpu.accumulator, 0x0A, "binary result, not BCD 0x10");
    }
}
