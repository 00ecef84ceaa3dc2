// The trap-and-emulate layer for the DSM-51 EPROM monitor. A CALL whose
// target address is registered in the trap table never reaches guest code;
// its handler runs host-side against the console channels below. A handler
// that needs input it does not have parks the engine in a wait state and the
// call is replayed once the host has pushed more bytes.

use crate::processor::{Flag, CPU};
use std::collections::VecDeque;
use std::io::{self, Write};

// Wait-state discriminants are part of the host interface, keep them stable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaitKind {
    None = 0,
    WaitEnter = 1,
    WaitEnterNoMsg = 2,
    WaitEnterOrEsc = 3,
    WaitKey = 4,
    GetNum = 5,
}

impl WaitKind {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Syscall {
    WriteText,
    WriteData,
    WriteHex,
    WriteInstr,
    LcdInit,
    LcdOff,
    LcdClr,
    DelayUs,
    DelayMs,
    Delay100Ms,
    WaitEnter,
    WaitEnterNoMsg,
    TestEnter,
    WaitEnterOrEsc,
    WaitKey,
    GetNum,
    BcdHex,
    HexBcd,
    Mul22,
    Mul31,
    Div21,
    Div42,
}

pub enum CallOutcome {
    NotHandled,
    Handled,
    Pending,
}

// Host-facing byte channels. Output can be mirrored to stdout and/or
// captured; the capture buffer holds only the current partial line, since it
// is cleared whenever a newline goes out.
pub struct Console {
    input: VecDeque<u8>,
    output: VecDeque<u8>,
    pub capture: bool,
    pub mirror: bool,
}

impl Console {
    pub fn new() -> Self {
        Console { input: VecDeque::new(), output: VecDeque::new(), capture: false, mirror: true }
    }
    pub fn set_options(&mut self, capture: bool, mirror: bool) {
        self.capture = capture;
        self.mirror = mirror;
        if !capture {
            self.output.clear();
        }
    }
    // Carriage returns are stripped so DOS-style lines behave like Unix ones.
    pub fn push_input(&mut self, data: &[u8]) {
        for &ch in data {
            if ch != b'\r' {
                self.input.push_back(ch);
            }
        }
    }
    pub fn emit(&mut self, ch: u8) {
        if self.mirror {
            let mut out = io::stdout();
            let _ = out.write_all(&[ch]);
            if ch == b'\n' {
                let _ = out.flush();
            }
        }
        if self.capture {
            self.output.push_back(ch);
            if ch == b'\n' {
                self.output.clear();
            }
        }
    }
    pub fn emit_str(&mut self, text: &str) {
        for &ch in text.as_bytes() {
            self.emit(ch);
        }
    }
    // One complete line, newline removed; None if no newline has arrived yet.
    pub fn consume_line(&mut self) -> Option<Vec<u8>> {
        let end = self.input.iter().position(|&ch| ch == b'\n')?;
        let mut line: Vec<u8> = self.input.drain(..=end).collect();
        line.pop();
        Some(line)
    }
    pub fn consume_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
    pub fn read_output(&mut self, max_len: usize) -> Vec<u8> {
        let count = max_len.min(self.output.len());
        self.output.drain(..count).collect()
    }
    pub fn take_output(&mut self) -> String {
        let bytes: Vec<u8> = self.output.drain(..).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
    pub fn output_len(&self) -> usize {
        self.output.len()
    }
    pub fn clear_output(&mut self) {
        self.output.clear();
    }
    pub fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
    }
}

impl CPU {
    // Consulted by ACALL/LCALL before the return address is pushed.
    pub fn monitor_call(&mut self, target: u16) -> CallOutcome {
        let call = match self.monitor.get(&target) {
            Some(&call) => call,
            None => return CallOutcome::NotHandled,
        };
        self.dispatch(call);
        if self.waiting {
            CallOutcome::Pending
        } else {
            CallOutcome::Handled
        }
    }

    fn dispatch(&mut self, call: Syscall) {
        match call {
            Syscall::WriteText => self.emit_text(),
            Syscall::WriteData => {
                let ch = self.a;
                self.console.emit(ch);
            }
            Syscall::WriteHex => {
                let hex = format!("{:02X}", self.a);
                self.console.emit_str(&hex);
            }
            // LCD command register writes have no observable effect here
            Syscall::WriteInstr => {}
            Syscall::LcdInit => self.console.emit_str("[LCD INIT]\n"),
            Syscall::LcdOff => self.console.emit_str("[LCD OFF]\n"),
            Syscall::LcdClr => self.console.emit_str("\n"),
            Syscall::DelayUs => self.cycles += (2 * self.a as u64 + 6) * 12 / 11 / 10,
            Syscall::DelayMs => self.cycles += self.a as u64 * 1000,
            Syscall::Delay100Ms => self.cycles += self.a as u64 * 100_000,
            Syscall::WaitEnter => self.wait_enter(true),
            Syscall::WaitEnterNoMsg => self.wait_enter(false),
            // The trainer's keypad cannot be polled here, report "not pressed"
            Syscall::TestEnter => self.set_flag(Flag::Cy, false),
            Syscall::WaitEnterOrEsc => self.wait_enter_or_esc(),
            Syscall::WaitKey => self.wait_key(),
            Syscall::GetNum => self.get_num(),
            Syscall::BcdHex => self.bcd_to_hex(),
            Syscall::HexBcd => self.hex_to_bcd(),
            Syscall::Mul22 => self.mul_2_2(),
            Syscall::Mul31 => self.mul_3_1(),
            Syscall::Div21 => self.div_2_1(),
            Syscall::Div42 => self.div_4_2(),
        }
    }

    // NUL-terminated string in program memory at DPTR; a walk that wraps past
    // 0xFFFF stops without emitting the wrapping byte.
    fn emit_text(&mut self) {
        let mut address = self.dptr;
        loop {
            let ch = self.code.read(address);
            address = address.wrapping_add(1);
            if ch == 0 || address == 0 {
                break;
            }
            self.console.emit(ch);
        }
    }

    fn wait_enter(&mut self, prompt: bool) {
        // The prompt goes out on the first attempt only, not on replays
        if prompt && !(self.waiting && self.wait == WaitKind::WaitEnter) {
            self.console.emit_str("PRESS ENTER.\n");
        }
        if self.console.consume_line().is_some() {
            self.clear_wait();
        } else {
            self.set_wait(if prompt { WaitKind::WaitEnter } else { WaitKind::WaitEnterNoMsg });
        }
    }

    fn wait_enter_or_esc(&mut self) {
        let ch = match self.console.consume_byte() {
            Some(ch) => ch,
            None => return self.set_wait(WaitKind::WaitEnterOrEsc),
        };
        self.clear_wait();
        self.set_a(ch);
        if ch == b'\n' {
            self.set_flag(Flag::Cy, false);
        } else if ch == 0x1B {
            self.set_flag(Flag::Cy, true);
        }
    }

    // First byte of the line as a hex digit 0..15; anything else reads as 0.
    fn wait_key(&mut self) {
        let line = match self.console.consume_line() {
            Some(line) => line,
            None => return self.set_wait(WaitKind::WaitKey),
        };
        self.clear_wait();
        let value = match line.first().copied() {
            Some(ch @ b'0'..=b'9') => ch - b'0',
            Some(ch @ b'a'..=b'f') => 10 + ch - b'a',
            Some(ch @ b'A'..=b'F') => 10 + ch - b'A',
            _ => 0,
        };
        self.set_a(value);
    }

    // Four leading decimal digits of the first token, packed as BCD into
    // R3:R2; anything else leaves the registers alone.
    fn get_num(&mut self) {
        let line = match self.console.consume_line() {
            Some(line) => line,
            None => return self.set_wait(WaitKind::GetNum),
        };
        self.clear_wait();
        let text = String::from_utf8_lossy(&line).into_owned();
        let token = match text.split_whitespace().next() {
            Some(token) => token.as_bytes().to_vec(),
            None => return,
        };
        if token.len() >= 4 && token[..4].iter().all(|d| d.is_ascii_digit()) {
            self.set_r(3, (token[0] - b'0') << 4 | (token[1] - b'0'));
            self.set_r(2, (token[2] - b'0') << 4 | (token[3] - b'0'));
        }
    }

    fn bcd_to_hex(&mut self) {
        let bcd = (self.r(3) as u16) << 8 | self.r(2) as u16;
        let value = (bcd >> 12 & 0x0F) * 1000
            + (bcd >> 8 & 0x0F) * 100
            + (bcd >> 4 & 0x0F) * 10
            + (bcd & 0x0F);
        self.set_r(3, (value >> 8) as u8);
        self.set_r(2, value as u8);
    }

    fn hex_to_bcd(&mut self) {
        let value = (self.r(3) as u16) << 8 | self.r(2) as u16;
        let thousands = (value / 1000 % 10) as u8;
        let hundreds = (value / 100 % 10) as u8;
        let tens = (value / 10 % 10) as u8;
        let ones = (value % 10) as u8;
        self.set_r(3, thousands << 4 | hundreds);
        self.set_r(2, tens << 4 | ones);
    }

    fn mul_2_2(&mut self) {
        let lhs = (self.r(3) as u32) << 8 | self.r(2) as u32;
        let rhs = (self.r(5) as u32) << 8 | self.r(4) as u32;
        let product = lhs * rhs;
        self.set_r(7, (product >> 24) as u8);
        self.set_r(6, (product >> 16) as u8);
        self.set_r(5, (product >> 8) as u8);
        self.set_r(4, product as u8);
    }

    fn mul_3_1(&mut self) {
        let lhs = (self.r(4) as u32) << 16 | (self.r(3) as u32) << 8 | self.r(2) as u32;
        let product = lhs.wrapping_mul(self.r(5) as u32);
        self.set_r(7, (product >> 24) as u8);
        self.set_r(6, (product >> 16) as u8);
        self.set_r(5, (product >> 8) as u8);
        self.set_r(4, product as u8);
    }

    fn div_2_1(&mut self) {
        let dividend = (self.r(3) as u16) << 8 | self.r(2) as u16;
        let divisor = self.r(4) as u16;
        if divisor == 0 {
            self.set_flag(Flag::Ov, true);
            return;
        }
        let quotient = dividend / divisor;
        self.set_r(3, (quotient >> 8) as u8);
        self.set_r(2, quotient as u8);
        self.set_r(5, (dividend % divisor) as u8);
        self.set_flag(Flag::Ov, false);
    }

    fn div_4_2(&mut self) {
        let dividend = (self.r(7) as u32) << 24
            | (self.r(6) as u32) << 16
            | (self.r(5) as u32) << 8
            | self.r(4) as u32;
        let divisor = (self.r(3) as u32) << 8 | self.r(2) as u32;
        if divisor == 0 {
            self.set_flag(Flag::Ov, true);
            return;
        }
        let quotient = dividend / divisor;
        let remainder = dividend % divisor;
        self.set_r(5, (quotient >> 8) as u8);
        self.set_r(4, quotient as u8);
        self.set_r(7, (remainder >> 8) as u8);
        self.set_r(6, remainder as u8);
        self.set_flag(Flag::Ov, false);
    }
}
