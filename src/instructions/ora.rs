use crate::cpu6502::CPU;

impl CPU {
    pub(crate) fn handle_ora(&mut self, opt_value: Option<u8>, _opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of ORA should be present");
        self.accumulator |= value;
        self.update_zero_negative_flags(self.accumulator);
        return 0;
    }
}
