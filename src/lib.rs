// em8051 emulates the Intel 8051 at instruction level and traps the DSM-51
// trainer's EPROM monitor calls, emulating their console, input, timing and
// arithmetic services host-side. The engine is cooperative and never blocks:
// a monitor call that needs input the host has not pushed yet suspends the
// run loop with the program counter rewound, so the call replays on resume.

use log::info;

mod fields;
mod instructions;
mod loader;
mod memory;
mod parser;
mod processor;
pub mod dsm51;
pub mod monitor;

pub use loader::LoadError;
pub use monitor::{Syscall, WaitKind};
pub use processor::{Flag, Snapshot, CPU};

pub struct Emulator {
    cpu: CPU,
}

impl Emulator {
    pub fn new() -> Emulator {
        Emulator { cpu: CPU::new() }
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    pub fn load_hex_file(&mut self, path: &str) -> Result<(), LoadError> {
        loader::load_hex_file(path, &mut self.cpu.code)
    }

    pub fn load_hex_str(&mut self, text: &str) {
        loader::load_hex_str(text, &mut self.cpu.code);
    }

    // Direct program memory poke for hosts that already hold a binary image.
    pub fn load_bytes(&mut self, address: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.cpu.code.write(address as u32 + i as u32, byte);
        }
    }

    // Execute until stop(), a pending monitor call, or the cycle bound is
    // reached; max_cycles == 0 means no bound.
    pub fn run(&mut self, max_cycles: u64) {
        self.cpu.running = true;
        let start = self.cpu.cycles;
        while self.cpu.running {
            self.cpu.step();
            if max_cycles > 0 && self.cpu.cycles - start >= max_cycles {
                break;
            }
        }
    }

    pub fn step(&mut self) {
        self.cpu.step();
    }

    pub fn stop(&mut self) {
        self.cpu.running = false;
    }

    pub fn set_output_options(&mut self, capture: bool, mirror: bool) {
        self.cpu.console.set_options(capture, mirror);
    }

    pub fn read_output(&mut self, max_len: usize) -> Vec<u8> {
        self.cpu.console.read_output(max_len)
    }

    // Drains the entire captured partial line.
    pub fn take_output(&mut self) -> String {
        self.cpu.console.take_output()
    }

    pub fn output_len(&self) -> usize {
        self.cpu.console.output_len()
    }

    pub fn clear_output(&mut self) {
        self.cpu.console.clear_output();
    }

    pub fn push_input(&mut self, text: &str) {
        self.cpu.console.push_input(text.as_bytes());
    }

    pub fn is_waiting(&self) -> bool {
        self.cpu.waiting
    }

    pub fn wait_kind(&self) -> WaitKind {
        self.cpu.wait
    }

    pub fn register_monitor_call(&mut self, address: u16, call: Syscall) {
        info!("registered monitor call {:?} at 0x{:04x}", call, address);
        self.cpu.monitor.insert(address, call);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cpu.snapshot()
    }

    pub fn read_internal(&self, address: u8) -> u8 {
        self.cpu.read_data(address)
    }

    pub fn read_code(&self, address: u16) -> u8 {
        self.cpu.code.read(address)
    }
}
