// Monitor entry points of the DSM-51 trainer's EPROM. Guest programs reach
// the monitor with ACALL/LCALL to these addresses; the engine traps them
// instead of executing EPROM code. Hosts may register additional mappings at
// any address.

use crate::monitor::Syscall;
use std::collections::HashMap;

pub const WRITE_TEXT: u16 = 0x8100;
pub const WRITE_DATA: u16 = 0x8102;
pub const WRITE_HEX: u16 = 0x8104;
pub const WRITE_INSTR: u16 = 0x8106;
pub const LCD_INIT: u16 = 0x8108;
pub const LCD_OFF: u16 = 0x810A;
pub const LCD_CLR: u16 = 0x810C;
pub const DELAY_US: u16 = 0x810E;
pub const DELAY_MS: u16 = 0x8110;
pub const DELAY_100MS: u16 = 0x8112;
pub const WAIT_ENTER: u16 = 0x8114;
pub const WAIT_ENTER_NW: u16 = 0x8116;
pub const TEST_ENTER: u16 = 0x8118;
pub const WAIT_ENT_ESC: u16 = 0x811A;
pub const WAIT_KEY: u16 = 0x811C;
pub const GET_NUM: u16 = 0x811E;
pub const BCD_HEX: u16 = 0x8120;
pub const HEX_BCD: u16 = 0x8122;
pub const MUL_2_2: u16 = 0x8124;
pub const MUL_3_1: u16 = 0x8126;
pub const DIV_2_1: u16 = 0x8128;
pub const DIV_4_2: u16 = 0x812A;

const MONITOR_CALLS: [(u16, Syscall); 22] = [
    (WRITE_TEXT, Syscall::WriteText),
    (WRITE_DATA, Syscall::WriteData),
    (WRITE_HEX, Syscall::WriteHex),
    (WRITE_INSTR, Syscall::WriteInstr),
    (LCD_INIT, Syscall::LcdInit),
    (LCD_OFF, Syscall::LcdOff),
    (LCD_CLR, Syscall::LcdClr),
    (DELAY_US, Syscall::DelayUs),
    (DELAY_MS, Syscall::DelayMs),
    (DELAY_100MS, Syscall::Delay100Ms),
    (WAIT_ENTER, Syscall::WaitEnter),
    (WAIT_ENTER_NW, Syscall::WaitEnterNoMsg),
    (TEST_ENTER, Syscall::TestEnter),
    (WAIT_ENT_ESC, Syscall::WaitEnterOrEsc),
    (WAIT_KEY, Syscall::WaitKey),
    (GET_NUM, Syscall::GetNum),
    (BCD_HEX, Syscall::BcdHex),
    (HEX_BCD, Syscall::HexBcd),
    (MUL_2_2, Syscall::Mul22),
    (MUL_3_1, Syscall::Mul31),
    (DIV_2_1, Syscall::Div21),
    (DIV_4_2, Syscall::Div42),
];

pub fn monitor_calls() -> HashMap<u16, Syscall> {
    MONITOR_CALLS.iter().copied().collect()
}
