use crate::cpu6502::CPU;

impl CPU {
    pub(crate) fn handle_inc(&mut self, opt_value: Option<u8>, opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of INC should be present");
        let address = opt_address.expect("BUG: address of INC should be present");
        let result = value.wrapping_add(1);
        self.write_u8(address, result);
        self.update_zero_negative_flags(result);
        return 0;
    }
}
