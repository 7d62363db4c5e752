//! Common test utilities and the simulated radio
#![allow(dead_code)]

pub mod test_utils;

pub use sim::{FifoWrite, Operation, SimError, SimRadio};
pub use test_utils::{create_radio, powered_up_radio, Call, Ctx, Radio, Recorder};
