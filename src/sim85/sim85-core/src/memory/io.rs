use crate::constants::PORT_COUNT;

use log::debug;

/// Latch behind IN/OUT: remembers the last value written to each port
/// No peripheral is attached, so nothing else ever changes a port
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Ports {
    port_map: [u8; PORT_COUNT],
}

impl Ports {
    pub fn new() -> Self {
        Self {
            port_map: [0; PORT_COUNT],
        }
    }

    pub fn read(&self, port: u8) -> u8 {
        debug!("Reading from I/O port: {:02X}", port);
        self.port_map[port as usize]
    }

    pub fn write(&mut self, port: u8, value: u8) {
        debug!("Writing to I/O port: {:02X} with value {:02X}", port, value);
        self.port_map[port as usize] = value;
    }
}

impl Default for Ports {
    fn default() -> Self {
        Self::new()
    }
}
