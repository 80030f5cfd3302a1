use crate::cpu6502::{CPU, StatusFlag};

impl CPU {
    // The decimal flag is stored faithfully even though the 2A03 never
    // consults it.
    pub(crate) fn handle_cld(&mut self, _opt_value: Option<u8>, _opt_address: Option<u16>) -> u8 {
        self.set_status_flag(StatusFlag::DecimalMode, false);
        return 0;
    }
}
