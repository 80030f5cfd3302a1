use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_beq(&mut self, opt_value: Option<u8>, _opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of BEQ should be present");
        self.branch(self.get_status_flag(StatusFlag::Zero), value as i8)
    }
}
