use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_rol(&mut self, opt_value: Option<u8>, opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of ROL should be present");
        let carry_in = self.get_status_flag(StatusFlag::Carry) as u8;
        let result = (value << 1) | carry_in;

        self.set_status_flag(StatusFlag::Carry, (value & 0x80) != 0);
        self.update_zero_negative_flags(result);
        self.write_shift_result(opt_address, result);
        return 0;
    }
}
