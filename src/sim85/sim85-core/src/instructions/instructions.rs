use super::{Pair, Reg};
use crate::constants::interrupts::*;
use crate::control::RunControl;
use crate::cpu::Cpu;
use crate::memory::Flags;
use crate::utils::{self, AluResult};

// Commit an add/subtract result to all five flags
fn commit(flags: &mut Flags, result: AluResult) {
    flags.cy = result.carry;
    flags.ac = result.aux;
    flags.set_zsp(result.value);
}

/// Register, pair and memory moves; no flag is touched
pub trait DataTransfer {
    fn mov(&mut self, dst: Reg, src: Reg); // Move register/memory
    fn mvi(&mut self, dst: Reg, value: u8); // Move immediate
    fn lxi(&mut self, rp: Pair, value: u16); // Load pair immediate
    fn lda(&mut self, addr: u16); // Load accumulator direct
    fn sta(&mut self, addr: u16); // Store accumulator direct
    fn lhld(&mut self, addr: u16); // Load HL direct
    fn shld(&mut self, addr: u16); // Store HL direct
    fn ldax(&mut self, rp: Pair); // Load accumulator via BC/DE
    fn stax(&mut self, rp: Pair); // Store accumulator via BC/DE
    fn xchg(&mut self); // Swap HL and DE
}

impl<'a> DataTransfer for Cpu<'a> {
    fn mov(&mut self, dst: Reg, src: Reg) {
        let value = self.reg(src);
        self.set_reg(dst, value);
    }

    fn mvi(&mut self, dst: Reg, value: u8) {
        self.set_reg(dst, value);
    }

    fn lxi(&mut self, rp: Pair, value: u16) {
        self.regs.set_pair(rp, value);
    }

    fn lda(&mut self, addr: u16) {
        self.regs.a = self.mem.read(addr);
    }

    fn sta(&mut self, addr: u16) {
        self.mem.write(addr, self.regs.a);
    }

    fn lhld(&mut self, addr: u16) {
        let value = self.mem.read_word(addr);
        self.regs.set_pair(Pair::H, value);
    }

    fn shld(&mut self, addr: u16) {
        self.mem.write_word(addr, self.regs.hl());
    }

    fn ldax(&mut self, rp: Pair) {
        self.regs.a = self.mem.read(self.regs.pair(rp));
    }

    fn stax(&mut self, rp: Pair) {
        let addr = self.regs.pair(rp);
        self.mem.write(addr, self.regs.a);
    }

    fn xchg(&mut self) {
        let regs = &mut *self.regs;
        core::mem::swap(&mut regs.h, &mut regs.d);
        core::mem::swap(&mut regs.l, &mut regs.e);
    }
}

/// 8-bit and 16-bit arithmetic
pub trait Arithmetic {
    fn add(&mut self, value: u8, carry_in: bool); // ADD ADC ADI ACI
    fn sub(&mut self, value: u8, borrow_in: bool); // SUB SBB SUI SBI
    fn inr(&mut self, r: Reg); // Increment, CY preserved
    fn dcr(&mut self, r: Reg); // Decrement, CY preserved
    fn inx(&mut self, rp: Pair); // Increment pair, no flags
    fn dcx(&mut self, rp: Pair); // Decrement pair, no flags
    fn dad(&mut self, rp: Pair); // HL += pair, CY only
    fn daa(&mut self); // Decimal adjust accumulator
}

impl<'a> Arithmetic for Cpu<'a> {
    fn add(&mut self, value: u8, carry_in: bool) {
        let result = utils::add8(self.regs.a, value, carry_in);
        commit(&mut self.regs.flags, result);
        self.regs.a = result.value;
    }

    fn sub(&mut self, value: u8, borrow_in: bool) {
        let result = utils::sub8(self.regs.a, value, borrow_in);
        commit(&mut self.regs.flags, result);
        self.regs.a = result.value;
    }

    fn inr(&mut self, r: Reg) {
        let result = utils::add8(self.reg(r), 1, false);
        self.regs.flags.ac = result.aux;
        self.regs.flags.set_zsp(result.value);
        self.set_reg(r, result.value);
    }

    fn dcr(&mut self, r: Reg) {
        let result = utils::sub8(self.reg(r), 1, false);
        self.regs.flags.ac = result.aux;
        self.regs.flags.set_zsp(result.value);
        self.set_reg(r, result.value);
    }

    fn inx(&mut self, rp: Pair) {
        let value = self.regs.pair(rp).wrapping_add(1);
        self.regs.set_pair(rp, value);
    }

    fn dcx(&mut self, rp: Pair) {
        let value = self.regs.pair(rp).wrapping_sub(1);
        self.regs.set_pair(rp, value);
    }

    fn dad(&mut self, rp: Pair) {
        let (sum, carry) = self.regs.hl().overflowing_add(self.regs.pair(rp));
        self.regs.set_pair(Pair::H, sum);
        self.regs.flags.cy = carry;
    }

    fn daa(&mut self) {
        let flags = &mut self.regs.flags;
        let (value, carry, aux) = utils::decimal_adjust(self.regs.a, flags.cy, flags.ac);
        flags.cy = carry;
        flags.ac = aux;
        flags.set_zsp(value);
        self.regs.a = value;
    }
}

/// Bitwise, compare, rotate and carry operations on the accumulator
pub trait Logical {
    fn ana(&mut self, value: u8); // AND, clears CY and AC
    fn xra(&mut self, value: u8); // XOR, clears CY and AC
    fn ora(&mut self, value: u8); // OR, clears CY and AC
    fn cmp(&mut self, value: u8); // Subtract without storing
    fn rlc(&mut self); // Rotate left
    fn rrc(&mut self); // Rotate right
    fn ral(&mut self); // Rotate left through carry
    fn rar(&mut self); // Rotate right through carry
    fn cma(&mut self); // Complement accumulator, no flags
    fn cmc(&mut self); // Complement carry
    fn stc(&mut self); // Set carry
}

impl<'a> Cpu<'a> {
    fn logic_result(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.flags.cy = false;
        self.regs.flags.ac = false;
        self.regs.flags.set_zsp(value);
    }
}

impl<'a> Logical for Cpu<'a> {
    fn ana(&mut self, value: u8) {
        self.logic_result(self.regs.a & value);
    }

    fn xra(&mut self, value: u8) {
        self.logic_result(self.regs.a ^ value);
    }

    fn ora(&mut self, value: u8) {
        self.logic_result(self.regs.a | value);
    }

    fn cmp(&mut self, value: u8) {
        let result = utils::sub8(self.regs.a, value, false);
        commit(&mut self.regs.flags, result);
    }

    fn rlc(&mut self) {
        let a = self.regs.a;
        self.regs.a = a.rotate_left(1);
        self.regs.flags.cy = a & 0x80 != 0;
    }

    fn rrc(&mut self) {
        let a = self.regs.a;
        self.regs.a = a.rotate_right(1);
        self.regs.flags.cy = a & 0x01 != 0;
    }

    fn ral(&mut self) {
        let a = self.regs.a;
        self.regs.a = (a << 1) | self.regs.flags.cy as u8;
        self.regs.flags.cy = a & 0x80 != 0;
    }

    fn rar(&mut self) {
        let a = self.regs.a;
        self.regs.a = (a >> 1) | ((self.regs.flags.cy as u8) << 7);
        self.regs.flags.cy = a & 0x01 != 0;
    }

    fn cma(&mut self) {
        self.regs.a = !self.regs.a;
    }

    fn cmc(&mut self) {
        self.regs.flags.cy = !self.regs.flags.cy;
    }

    fn stc(&mut self) {
        self.regs.flags.cy = true;
    }
}

/// Transfers of control. PC already holds the following instruction's address
/// when these run, so that is the return address pushed by calls
pub trait Branch {
    fn jmp(&mut self, addr: u16); // Jump
    fn call(&mut self, addr: u16); // Push return address and jump
    fn ret(&mut self); // Pop return address
    fn rst(&mut self, vector: u8); // Call to vector * 8
    fn pchl(&mut self); // Jump to HL
}

impl<'a> Branch for Cpu<'a> {
    fn jmp(&mut self, addr: u16) {
        self.regs.pc = addr;
    }

    fn call(&mut self, addr: u16) {
        let ret = self.regs.pc;
        self.push_word(ret);
        self.regs.pc = addr;
    }

    fn ret(&mut self) {
        self.regs.pc = self.pop_word();
    }

    fn rst(&mut self, vector: u8) {
        self.call(vector as u16 * RESTART_SPACING);
    }

    fn pchl(&mut self) {
        self.regs.pc = self.regs.hl();
    }
}

/// Stack, port and machine control
pub trait Machine {
    fn push(&mut self, rp: Pair); // Push pair or PSW
    fn pop(&mut self, rp: Pair); // Pop pair or PSW
    fn xthl(&mut self); // Swap HL with top of stack
    fn sphl(&mut self); // SP = HL
    fn input(&mut self, port: u8); // IN
    fn output(&mut self, port: u8); // OUT
    fn ei(&mut self); // Enable interrupts
    fn di(&mut self); // Disable interrupts
    fn rim(&mut self); // Read interrupt mask
    fn sim(&mut self); // Set interrupt mask
    fn hlt(&mut self, ctl: &mut RunControl); // Halt
}

impl<'a> Machine for Cpu<'a> {
    fn push(&mut self, rp: Pair) {
        let value = self.regs.pair(rp);
        self.push_word(value);
    }

    fn pop(&mut self, rp: Pair) {
        let value = self.pop_word();
        self.regs.set_pair(rp, value);
    }

    fn xthl(&mut self) {
        let sp = self.regs.sp;
        let top = self.mem.read_word(sp);
        self.mem.write_word(sp, self.regs.hl());
        self.regs.set_pair(Pair::H, top);
    }

    fn sphl(&mut self) {
        self.regs.sp = self.regs.hl();
    }

    fn input(&mut self, port: u8) {
        self.regs.a = self.io.read(port);
    }

    fn output(&mut self, port: u8) {
        self.io.write(port, self.regs.a);
    }

    fn ei(&mut self) {
        self.inte = true;
    }

    fn di(&mut self) {
        self.inte = false;
    }

    fn rim(&mut self) {
        let enabled = if self.inte { RIM_INTERRUPT_ENABLE } else { 0 };
        self.regs.a = self.mask | enabled;
    }

    fn sim(&mut self) {
        // Mask bits only load when bit 3 is set
        if self.regs.a & SIM_MASK_SET_ENABLE != 0 {
            self.mask = self.regs.a & INTERRUPT_MASK;
        }
    }

    fn hlt(&mut self, ctl: &mut RunControl) {
        ctl.signal_halt();
    }
}

#[cfg(test)]
mod instruction_tests {
    use super::*;
    use crate::memory::{Memory, Registers};

    // Run a closure against a fresh CPU and hand back the final state
    fn with_cpu<F: FnOnce(&mut Cpu)>(regs: Registers, f: F) -> (Memory, Registers) {
        let mut mem = Memory::new();
        let mut regs = regs;
        {
            let mut cpu = Cpu::new(&mut mem, &mut regs);
            f(&mut cpu);
        }
        (mem, regs)
    }

    #[test]
    fn test_sub_sets_borrow_and_aux_borrow() {
        let mut regs = Registers::new();
        regs.a = 0x10;
        let (_, regs) = with_cpu(regs, |cpu| cpu.sub(0x01, false));
        assert_eq!(regs.a, 0x0F);
        assert!(!regs.flags.cy);
        assert!(regs.flags.ac);
        assert!(!regs.flags.z);

        let mut regs = Registers::new();
        regs.a = 0x65;
        let (_, regs) = with_cpu(regs, |cpu| cpu.sub(0x95, false));
        assert_eq!(regs.a, 0xD0);
        assert!(regs.flags.cy);
        assert!(regs.flags.s);
    }

    #[test]
    fn test_sbb_and_adc_use_carry() {
        let mut regs = Registers::new();
        regs.a = 0x00;
        regs.flags.cy = true;
        let (_, regs) = with_cpu(regs, |cpu| cpu.sub(0x00, true));
        assert_eq!(regs.a, 0xFF);
        assert!(regs.flags.cy);

        let mut regs = Registers::new();
        regs.a = 0xFF;
        let (_, regs) = with_cpu(regs, |cpu| cpu.add(0x00, true));
        assert_eq!(regs.a, 0x00);
        assert!(regs.flags.cy);
        assert!(regs.flags.z);
        assert!(regs.flags.ac);
    }

    #[test]
    fn test_logic_clears_carries() {
        for op in 0..3 {
            let mut regs = Registers::new();
            regs.a = 0x96;
            regs.flags.cy = true;
            regs.flags.ac = true;
            let (_, regs) = with_cpu(regs, |cpu| match op {
                0 => cpu.ana(0xF0),
                1 => cpu.xra(0xF0),
                _ => cpu.ora(0x0F),
            });
            let expected = [0x90, 0x66, 0x9F][op];
            assert_eq!(regs.a, expected);
            assert!(!regs.flags.cy);
            assert!(!regs.flags.ac);
            assert_eq!(regs.flags.p, utils::even_parity(expected));
        }
    }

    #[test]
    fn test_cmp_leaves_accumulator() {
        let mut regs = Registers::new();
        regs.a = 0x40;
        let (_, regs) = with_cpu(regs, |cpu| cpu.cmp(0x40));
        assert_eq!(regs.a, 0x40);
        assert!(regs.flags.z);
        assert!(!regs.flags.cy);

        let mut regs = Registers::new();
        regs.a = 0x40;
        let (_, regs) = with_cpu(regs, |cpu| cpu.cmp(0x41));
        assert!(regs.flags.cy);
        assert!(!regs.flags.z);
    }

    #[test]
    fn test_rotates() {
        let mut regs = Registers::new();
        regs.a = 0x81;
        let (_, out) = with_cpu(regs, |cpu| cpu.rlc());
        assert_eq!((out.a, out.flags.cy), (0x03, true));
        let (_, out) = with_cpu(regs, |cpu| cpu.rrc());
        assert_eq!((out.a, out.flags.cy), (0xC0, true));
        let (_, out) = with_cpu(regs, |cpu| cpu.ral());
        assert_eq!((out.a, out.flags.cy), (0x02, true));
        let (_, out) = with_cpu(regs, |cpu| cpu.rar());
        assert_eq!((out.a, out.flags.cy), (0x40, true));

        regs.flags.cy = true;
        regs.a = 0x00;
        let (_, out) = with_cpu(regs, |cpu| cpu.ral());
        assert_eq!((out.a, out.flags.cy), (0x01, false));
        let (_, out) = with_cpu(regs, |cpu| cpu.rar());
        assert_eq!((out.a, out.flags.cy), (0x80, false));
    }

    #[test]
    fn test_carry_ops() {
        let (_, regs) = with_cpu(Registers::new(), |cpu| cpu.stc());
        assert!(regs.flags.cy);
        let (_, regs) = with_cpu(regs, |cpu| cpu.cmc());
        assert!(!regs.flags.cy);
    }

    #[test]
    fn test_daa_after_bcd_add() {
        // 0x38 + 0x45 = 0x7D -> 83
        let mut regs = Registers::new();
        regs.a = 0x38;
        let (_, regs) = with_cpu(regs, |cpu| {
            cpu.add(0x45, false);
            cpu.daa();
        });
        assert_eq!(regs.a, 0x83);
        assert!(!regs.flags.cy);

        // 0x99 + 0x01 -> 00 carry 1
        let mut regs = Registers::new();
        regs.a = 0x99;
        let (_, regs) = with_cpu(regs, |cpu| {
            cpu.add(0x01, false);
            cpu.daa();
        });
        assert_eq!(regs.a, 0x00);
        assert!(regs.flags.cy);
        assert!(regs.flags.z);
    }

    #[test]
    fn test_pair_moves() {
        let mut regs = Registers::new();
        regs.set_pair(Pair::H, 0x1234);
        regs.set_pair(Pair::D, 0xABCD);
        let (_, regs) = with_cpu(regs, |cpu| cpu.xchg());
        assert_eq!(regs.hl(), 0xABCD);
        assert_eq!(regs.de(), 0x1234);

        let (mem, regs) = with_cpu(Registers::new(), |cpu| {
            cpu.lxi(Pair::H, 0xEB2C);
            cpu.shld(0xC052);
            cpu.lxi(Pair::B, 0xC052);
            cpu.ldax(Pair::B);
        });
        assert_eq!(mem.read(0xC052), 0x2C);
        assert_eq!(mem.read(0xC053), 0xEB);
        assert_eq!(regs.a, 0x2C);
    }

    #[test]
    fn test_xthl_and_sphl() {
        let mut regs = Registers::new();
        regs.sp = 0xD000;
        regs.set_pair(Pair::H, 0x1122);
        let (mem, regs) = with_cpu(regs, |cpu| {
            cpu.mem.write_word(0xD000, 0x3344);
            cpu.xthl();
        });
        assert_eq!(regs.hl(), 0x3344);
        assert_eq!(mem.read_word(0xD000), 0x1122);

        let (_, regs) = with_cpu(regs, |cpu| cpu.sphl());
        assert_eq!(regs.sp, 0x3344);
    }

    #[test]
    fn test_interrupt_mask_latch() {
        let mut regs = Registers::new();
        regs.a = 0x0D; // mask-set-enable with mask 101
        let (_, regs) = with_cpu(regs, |cpu| {
            cpu.sim();
            cpu.ei();
            cpu.rim();
        });
        assert_eq!(regs.a, 0x0D);

        let mut regs = Registers::new();
        regs.a = 0x07; // bit 3 clear, mask stays 000
        let (_, regs) = with_cpu(regs, |cpu| {
            cpu.sim();
            cpu.di();
            cpu.rim();
        });
        assert_eq!(regs.a, 0x00);
    }

    #[test]
    fn test_port_latch() {
        let mut regs = Registers::new();
        regs.a = 0x5A;
        let (_, regs) = with_cpu(regs, |cpu| {
            cpu.output(0x10);
            cpu.regs.a = 0;
            cpu.input(0x10);
        });
        assert_eq!(regs.a, 0x5A);
    }

    #[test]
    fn test_hlt_signals_controller() {
        let mut ctl = RunControl::new();
        with_cpu(Registers::new(), |cpu| cpu.hlt(&mut ctl));
        assert!(ctl.is_halted());
    }
}
