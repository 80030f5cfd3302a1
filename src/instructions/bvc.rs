use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    pub(crate) fn handle_bvc(&mut self, opt_value: Option<u8>, _opt_address: Option<u16>) -> u8 {
        let value = opt_value.expect("BUG: memory value of BVC should be present");
        self.branch(!self.get_status_flag(StatusFlag::Overflow), value as i8)
    }
}
