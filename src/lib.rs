// Loop-interval power management for cooperative microcontroller firmware.
//
// kernel: host side (loop interval, component lifecycle, main loop)
// power:  the service and its scoped interval locks

#![cfg_attr(not(test), no_std)]

pub mod kernel;
pub mod power;
