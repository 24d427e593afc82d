pub mod check_use_case;
pub mod ports;
