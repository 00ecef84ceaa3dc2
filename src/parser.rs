// This is where the dirty grunt work of making sense of our binary input
// happens. The fetched opcode byte uniquely identifies the instruction; the
// low octet selects the register operand within a family:
//
// x8-xF    Rn forms (register index in bits 0-2)
// x6/x7    @R0/@R1 indirect forms
// x5       direct forms
// x4       immediate / accumulator forms
// x1       AJMP/ACALL carry the page target in bits 5-7 of the opcode
//
// Operand bytes (immediates, direct addresses, bit addresses, relative
// offsets, 16-bit targets) are consumed here, so the program counter points
// at the next instruction by the time execute() runs.

use crate::fields::{Dst, Src, XAddr};
use crate::instructions::Instruction;
use crate::instructions::Instruction::*;
use crate::processor::CPU;

pub fn parse_instruction(opcode: u8, cpu: &mut CPU) -> Instruction {
    let reg = (opcode & 0x07) as usize;
    let ind = (opcode & 0x01) as usize;
    match opcode {
        0x00 => Nop,
        0x01 | 0x21 | 0x41 | 0x61 | 0x81 | 0xA1 | 0xC1 | 0xE1 => {
            let low = cpu.fetch();
            Ajmp { target: page_target(opcode, low, cpu.pc) }
        }
        0x02 => Ljmp { target: fetch_addr16(cpu) },
        0x03 => RrA,
        0x04 => IncA,
        0x05 => Inc { dst: Dst::Direct(cpu.fetch()) },
        0x06 | 0x07 => Inc { dst: Dst::Indirect(ind) },
        0x08..=0x0F => Inc { dst: Dst::Reg(reg) },
        0x10 => {
            let bit = cpu.fetch();
            Jbc { bit, offset: cpu.fetch() as i8 }
        }
        0x11 | 0x31 | 0x51 | 0x71 | 0x91 | 0xB1 | 0xD1 | 0xF1 => {
            let low = cpu.fetch();
            Acall { target: page_target(opcode, low, cpu.pc) }
        }
        0x12 => Lcall { target: fetch_addr16(cpu) },
        0x13 => RrcA,
        0x14 => DecA,
        0x15 => Dec { dst: Dst::Direct(cpu.fetch()) },
        0x16 | 0x17 => Dec { dst: Dst::Indirect(ind) },
        0x18..=0x1F => Dec { dst: Dst::Reg(reg) },
        0x20 => {
            let bit = cpu.fetch();
            Jb { bit, offset: cpu.fetch() as i8 }
        }
        0x22 => Ret,
        0x23 => RlA,
        0x24 => Add { src: Src::Imm(cpu.fetch()) },
        0x25 => Add { src: Src::Direct(cpu.fetch()) },
        0x26 | 0x27 => Add { src: Src::Indirect(ind) },
        0x28..=0x2F => Add { src: Src::Reg(reg) },
        0x30 => {
            let bit = cpu.fetch();
            Jnb { bit, offset: cpu.fetch() as i8 }
        }
        0x32 => Reti,
        0x33 => RlcA,
        0x34 => Addc { src: Src::Imm(cpu.fetch()) },
        0x35 => Addc { src: Src::Direct(cpu.fetch()) },
        0x36 | 0x37 => Addc { src: Src::Indirect(ind) },
        0x38..=0x3F => Addc { src: Src::Reg(reg) },
        0x40 => Jc { offset: cpu.fetch() as i8 },
        0x42 => OrlDirect { addr: cpu.fetch(), src: Src::Acc },
        0x43 => {
            let addr = cpu.fetch();
            OrlDirect { addr, src: Src::Imm(cpu.fetch()) }
        }
        0x44 => Orl { src: Src::Imm(cpu.fetch()) },
        0x45 => Orl { src: Src::Direct(cpu.fetch()) },
        0x46 | 0x47 => Orl { src: Src::Indirect(ind) },
        0x48..=0x4F => Orl { src: Src::Reg(reg) },
        0x50 => Jnc { offset: cpu.fetch() as i8 },
        0x52 => AnlDirect { addr: cpu.fetch(), src: Src::Acc },
        0x53 => {
            let addr = cpu.fetch();
            AnlDirect { addr, src: Src::Imm(cpu.fetch()) }
        }
        0x54 => Anl { src: Src::Imm(cpu.fetch()) },
        0x55 => Anl { src: Src::Direct(cpu.fetch()) },
        0x56 | 0x57 => Anl { src: Src::Indirect(ind) },
        0x58..=0x5F => Anl { src: Src::Reg(reg) },
        0x60 => Jz { offset: cpu.fetch() as i8 },
        0x62 => XrlDirect { addr: cpu.fetch(), src: Src::Acc },
        0x63 => {
            let addr = cpu.fetch();
            XrlDirect { addr, src: Src::Imm(cpu.fetch()) }
        }
        0x64 => Xrl { src: Src::Imm(cpu.fetch()) },
        0x65 => Xrl { src: Src::Direct(cpu.fetch()) },
        0x66 | 0x67 => Xrl { src: Src::Indirect(ind) },
        0x68..=0x6F => Xrl { src: Src::Reg(reg) },
        0x70 => Jnz { offset: cpu.fetch() as i8 },
        0x72 => OrlCarry { bit: cpu.fetch(), complement: false },
        0x73 => JmpDptr,
        0x74 => MovA { src: Src::Imm(cpu.fetch()) },
        0x75 => {
            let addr = cpu.fetch();
            Mov { dst: Dst::Direct(addr), src: Src::Imm(cpu.fetch()) }
        }
        0x76 | 0x77 => Mov { dst: Dst::Indirect(ind), src: Src::Imm(cpu.fetch()) },
        0x78..=0x7F => Mov { dst: Dst::Reg(reg), src: Src::Imm(cpu.fetch()) },
        0x80 => Sjmp { offset: cpu.fetch() as i8 },
        0x82 => AnlCarry { bit: cpu.fetch(), complement: false },
        0x83 => MovcPc,
        0x84 => Div,
        0x85 => {
            // MOV direct, direct encodes the source address first
            let src = cpu.fetch();
            Mov { dst: Dst::Direct(cpu.fetch()), src: Src::Direct(src) }
        }
        0x86 | 0x87 => Mov { dst: Dst::Direct(cpu.fetch()), src: Src::Indirect(ind) },
        0x88..=0x8F => Mov { dst: Dst::Direct(cpu.fetch()), src: Src::Reg(reg) },
        0x90 => MovDptr { value: fetch_addr16(cpu) },
        0x92 => MovCarryToBit { bit: cpu.fetch() },
        0x93 => MovcDptr,
        0x94 => Subb { src: Src::Imm(cpu.fetch()) },
        0x95 => Subb { src: Src::Direct(cpu.fetch()) },
        0x96 | 0x97 => Subb { src: Src::Indirect(ind) },
        0x98..=0x9F => Subb { src: Src::Reg(reg) },
        0xA0 => OrlCarry { bit: cpu.fetch(), complement: true },
        0xA2 => MovBitToCarry { bit: cpu.fetch() },
        0xA3 => IncDptr,
        0xA4 => Mul,
        0xA6 | 0xA7 => Mov { dst: Dst::Indirect(ind), src: Src::Direct(cpu.fetch()) },
        0xA8..=0xAF => Mov { dst: Dst::Reg(reg), src: Src::Direct(cpu.fetch()) },
        0xB0 => AnlCarry { bit: cpu.fetch(), complement: true },
        0xB2 => CplBit { bit: cpu.fetch() },
        0xB3 => CplCarry,
        0xB4 => {
            let data = cpu.fetch();
            Cjne { left: Src::Acc, right: Src::Imm(data), offset: cpu.fetch() as i8 }
        }
        0xB5 => {
            let addr = cpu.fetch();
            Cjne { left: Src::Acc, right: Src::Direct(addr), offset: cpu.fetch() as i8 }
        }
        0xB6 | 0xB7 => {
            let data = cpu.fetch();
            Cjne { left: Src::Indirect(ind), right: Src::Imm(data), offset: cpu.fetch() as i8 }
        }
        0xB8..=0xBF => {
            let data = cpu.fetch();
            Cjne { left: Src::Reg(reg), right: Src::Imm(data), offset: cpu.fetch() as i8 }
        }
        0xC0 => Push { addr: cpu.fetch() },
        0xC2 => ClrBit { bit: cpu.fetch() },
        0xC3 => ClrCarry,
        0xC4 => SwapA,
        0xC5 => Xch { with: Dst::Direct(cpu.fetch()) },
        0xC6 | 0xC7 => Xch { with: Dst::Indirect(ind) },
        0xC8..=0xCF => Xch { with: Dst::Reg(reg) },
        0xD0 => Pop { addr: cpu.fetch() },
        0xD2 => SetbBit { bit: cpu.fetch() },
        0xD3 => SetbCarry,
        0xD4 => Da,
        0xD5 => {
            let addr = cpu.fetch();
            Djnz { counter: Dst::Direct(addr), offset: cpu.fetch() as i8 }
        }
        0xD6 | 0xD7 => Xchd { reg: ind },
        0xD8..=0xDF => Djnz { counter: Dst::Reg(reg), offset: cpu.fetch() as i8 },
        0xE0 => MovxRead { addr: XAddr::Dptr },
        0xE2 | 0xE3 => MovxRead { addr: XAddr::Reg(ind) },
        0xE4 => ClrA,
        0xE5 => MovA { src: Src::Direct(cpu.fetch()) },
        0xE6 | 0xE7 => MovA { src: Src::Indirect(ind) },
        0xE8..=0xEF => MovA { src: Src::Reg(reg) },
        0xF0 => MovxWrite { addr: XAddr::Dptr },
        0xF2 | 0xF3 => MovxWrite { addr: XAddr::Reg(ind) },
        0xF4 => CplA,
        0xF5 => Mov { dst: Dst::Direct(cpu.fetch()), src: Src::Acc },
        0xF6 | 0xF7 => Mov { dst: Dst::Indirect(ind), src: Src::Acc },
        0xF8..=0xFF => Mov { dst: Dst::Reg(reg), src: Src::Acc },
        // 0xA5 is the only hole in the map
        _ => Undefined { opcode, at: cpu.pc.wrapping_sub(1) },
    }
}

// AJMP/ACALL replace the low eleven bits of the program counter with the
// opcode's page bits and the operand byte; the upper five bits come from the
// address of the following instruction.
fn page_target(opcode: u8, low: u8, pc: u16) -> u16 {
    let addr11 = (opcode as u16 & 0xE0) << 3 | low as u16;
    pc & 0xF800 | addr11
}

fn fetch_addr16(cpu: &mut CPU) -> u16 {
    let high = cpu.fetch();
    let low = cpu.fetch();
    (high as u16) << 8 | low as u16
}
