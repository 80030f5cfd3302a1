use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_lsr(&mut self, opt_value: Option<u8>, opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of LSR should be present");
        let result = value >> 1;

        // Bit 0 falls into the carry; bit 7 of the result is always 0, so N
        // always clears.
        self.set_status_flag(StatusFlag::Carry, (value & 0x01) != 0);
        self.update_zero_negative_flags(result);
        self.write_shift_result(opt_address, result);
        return 0;
    }
}
