use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_adc(&mut self, opt_value: Option<u8>, _opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of ADC should be present");

        // The addition runs over 9 bits: A + M + C. Decimal mode is stored
        // in the status register but the 2A03 ignores it.
        let carry_in = self.get_status_flag(StatusFlag::Carry) as u16;
        let sum = self.accumulator as u16 + value as u16 + carry_in;
        let result = sum as u8;

        self.set_status_flag(StatusFlag::Carry, sum > 0xFF);

        // Signed overflow: the operands agree in sign and the result
        // disagrees with both.
        let overflow = (self.accumulator ^ result) & (value ^ result) & 0x80 != 0;
        self.set_status_flag(StatusFlag::Overflow, overflow);

        self.accumulator = result;
        self.update_zero_negative_flags(result);
        return 0;
    }
}
