use crate::constants::TRAIL_LENGTH;
use crate::control::RunControl;
use crate::decoder::decoder;
use crate::error::ExecError;
use crate::instructions::{Arithmetic, Branch, DataTransfer, Logical, Machine};
use crate::instructions::{Condition, Instruction, Mnemonic, Operand, Reg};
use crate::memory::{Memory, Ports, Registers};
use log::{debug, trace, warn};

/// Limits applied to a run
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct RunOptions {
    pub step_limit: Option<u64>, // Give up after this many instructions
}

/// Struct representing the CPU and its state
/// Memory and registers belong to the caller and stay inspectable after the run
pub struct Cpu<'a> {
    pub(crate) mem: &'a mut Memory,     // Address space
    pub(crate) regs: &'a mut Registers, // Register file and flags
    pub(crate) io: Ports,               // IN/OUT latch
    pub(crate) inte: bool,              // Interrupt enable latch (EI/DI)
    pub(crate) mask: u8,                // Interrupt mask bits (SIM/RIM)

    steps: u64,                                // Instructions executed
    trail: heapless::Deque<u16, TRAIL_LENGTH>, // PCs of the latest instructions
}

impl<'a> Cpu<'a> {
    pub fn new(mem: &'a mut Memory, regs: &'a mut Registers) -> Cpu<'a> {
        Cpu {
            mem,
            regs,
            io: Ports::new(),
            inte: false,
            mask: 0,
            steps: 0,
            trail: heapless::Deque::new(),
        }
    }

    pub fn registers(&self) -> &Registers {
        &*self.regs
    }

    pub fn memory(&self) -> &Memory {
        &*self.mem
    }

    pub fn ports(&self) -> &Ports {
        &self.io
    }

    pub fn ports_mut(&mut self) -> &mut Ports {
        &mut self.io
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Addresses of the most recently executed instructions, oldest first
    pub fn trail(&self) -> impl Iterator<Item = u16> + '_ {
        self.trail.iter().copied()
    }

    /// Read a register; M reads memory at HL
    pub(crate) fn reg(&self, r: Reg) -> u8 {
        match r {
            Reg::B => self.regs.b,
            Reg::C => self.regs.c,
            Reg::D => self.regs.d,
            Reg::E => self.regs.e,
            Reg::H => self.regs.h,
            Reg::L => self.regs.l,
            Reg::M => self.mem.read(self.regs.hl()),
            Reg::A => self.regs.a,
        }
    }

    pub(crate) fn set_reg(&mut self, r: Reg, value: u8) {
        match r {
            Reg::B => self.regs.b = value,
            Reg::C => self.regs.c = value,
            Reg::D => self.regs.d = value,
            Reg::E => self.regs.e = value,
            Reg::H => self.regs.h = value,
            Reg::L => self.regs.l = value,
            Reg::M => self.mem.write(self.regs.hl(), value),
            Reg::A => self.regs.a = value,
        }
    }

    /// High byte lands at SP-1, low byte at SP-2
    pub(crate) fn push_word(&mut self, value: u16) {
        let sp = self.regs.sp.wrapping_sub(2);
        self.mem.write_word(sp, value);
        self.regs.sp = sp;
    }

    pub(crate) fn pop_word(&mut self) -> u16 {
        let value = self.mem.read_word(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    fn condition(&self, cc: Condition) -> bool {
        let flags = &self.regs.flags;
        match cc {
            Condition::NZ => !flags.z,
            Condition::Z => flags.z,
            Condition::NC => !flags.cy,
            Condition::C => flags.cy,
            Condition::PO => !flags.p,
            Condition::PE => flags.p,
            Condition::P => !flags.s,
            Condition::M => flags.s,
        }
    }

    // Operand of the accumulator group: register, memory at HL or the immediate byte
    fn source(&self, inst: &Instruction) -> u8 {
        match inst.entry.operands[0] {
            Some(Operand::Reg(r)) => self.reg(r),
            _ => inst.imm8(),
        }
    }

    /// Execute a decoded instruction. PC already points past it
    fn execute(&mut self, inst: &Instruction, ctl: &mut RunControl) -> Result<(), ExecError> {
        let [first, second] = inst.entry.operands;
        let carry = self.regs.flags.cy;

        match (inst.mnemonic(), first, second) {
            (Mnemonic::MOV, Some(Operand::Reg(dst)), Some(Operand::Reg(src))) => self.mov(dst, src),
            (Mnemonic::MVI, Some(Operand::Reg(dst)), _) => self.mvi(dst, inst.imm8()),
            (Mnemonic::LXI, Some(Operand::Pair(rp)), _) => self.lxi(rp, inst.imm16()),
            (Mnemonic::LDA, ..) => self.lda(inst.imm16()),
            (Mnemonic::STA, ..) => self.sta(inst.imm16()),
            (Mnemonic::LHLD, ..) => self.lhld(inst.imm16()),
            (Mnemonic::SHLD, ..) => self.shld(inst.imm16()),
            (Mnemonic::LDAX, Some(Operand::Pair(rp)), _) => self.ldax(rp),
            (Mnemonic::STAX, Some(Operand::Pair(rp)), _) => self.stax(rp),
            (Mnemonic::XCHG, ..) => self.xchg(),

            (Mnemonic::ADD, ..) | (Mnemonic::ADI, ..) => self.add(self.source(inst), false),
            (Mnemonic::ADC, ..) | (Mnemonic::ACI, ..) => self.add(self.source(inst), carry),
            (Mnemonic::SUB, ..) | (Mnemonic::SUI, ..) => self.sub(self.source(inst), false),
            (Mnemonic::SBB, ..) | (Mnemonic::SBI, ..) => self.sub(self.source(inst), carry),
            (Mnemonic::INR, Some(Operand::Reg(r)), _) => self.inr(r),
            (Mnemonic::DCR, Some(Operand::Reg(r)), _) => self.dcr(r),
            (Mnemonic::INX, Some(Operand::Pair(rp)), _) => self.inx(rp),
            (Mnemonic::DCX, Some(Operand::Pair(rp)), _) => self.dcx(rp),
            (Mnemonic::DAD, Some(Operand::Pair(rp)), _) => self.dad(rp),
            (Mnemonic::DAA, ..) => self.daa(),

            (Mnemonic::ANA, ..) | (Mnemonic::ANI, ..) => self.ana(self.source(inst)),
            (Mnemonic::XRA, ..) | (Mnemonic::XRI, ..) => self.xra(self.source(inst)),
            (Mnemonic::ORA, ..) | (Mnemonic::ORI, ..) => self.ora(self.source(inst)),
            (Mnemonic::CMP, ..) | (Mnemonic::CPI, ..) => self.cmp(self.source(inst)),
            (Mnemonic::RLC, ..) => self.rlc(),
            (Mnemonic::RRC, ..) => self.rrc(),
            (Mnemonic::RAL, ..) => self.ral(),
            (Mnemonic::RAR, ..) => self.rar(),
            (Mnemonic::CMA, ..) => self.cma(),
            (Mnemonic::CMC, ..) => self.cmc(),
            (Mnemonic::STC, ..) => self.stc(),

            (Mnemonic::JMP, ..) => self.jmp(inst.imm16()),
            (Mnemonic::J(cc), ..) => {
                if self.condition(cc) {
                    self.jmp(inst.imm16())
                }
            }
            (Mnemonic::CALL, ..) => self.call(inst.imm16()),
            (Mnemonic::C(cc), ..) => {
                if self.condition(cc) {
                    self.call(inst.imm16())
                }
            }
            (Mnemonic::RET, ..) => self.ret(),
            (Mnemonic::R(cc), ..) => {
                if self.condition(cc) {
                    self.ret()
                }
            }
            (Mnemonic::RST, Some(Operand::Vector(n)), _) => self.rst(n),
            (Mnemonic::PCHL, ..) => self.pchl(),

            (Mnemonic::PUSH, Some(Operand::Pair(rp)), _) => self.push(rp),
            (Mnemonic::POP, Some(Operand::Pair(rp)), _) => self.pop(rp),
            (Mnemonic::XTHL, ..) => self.xthl(),
            (Mnemonic::SPHL, ..) => self.sphl(),
            (Mnemonic::IN, ..) => self.input(inst.imm8()),
            (Mnemonic::OUT, ..) => self.output(inst.imm8()),
            (Mnemonic::EI, ..) => self.ei(),
            (Mnemonic::DI, ..) => self.di(),
            (Mnemonic::RIM, ..) => self.rim(),
            (Mnemonic::SIM, ..) => self.sim(),
            (Mnemonic::NOP, ..) => {}
            (Mnemonic::HLT, ..) => self.hlt(ctl),

            // Entry operands that no handler accepts
            _ => {
                return Err(ExecError::IllegalOpcode {
                    opcode: inst.entry.opcode,
                    pc: inst.pc,
                })
            }
        }
        Ok(())
    }

    /// Fetch, decode and execute exactly one instruction
    /// A decode failure leaves registers and memory untouched
    pub fn step(&mut self, ctl: &mut RunControl) -> Result<Instruction, ExecError> {
        let inst = decoder(&*self.mem, self.regs.pc)?;
        trace!("{:04X}: {}", inst.pc, inst);

        if self.trail.is_full() {
            self.trail.pop_front();
        }
        self.trail.push_back(inst.pc).ok();

        self.regs.pc = inst.next_pc();
        if let Err(err) = self.execute(&inst, ctl) {
            self.regs.pc = inst.pc;
            return Err(err);
        }

        self.steps += 1;
        Ok(inst)
    }

    /// Step until the controller reports a halt; returns the instructions executed
    pub fn run(&mut self, ctl: &mut RunControl, opts: &RunOptions) -> Result<u64, ExecError> {
        debug!("Run started at {:04X}", self.regs.pc);
        let start = self.steps;

        while !ctl.is_halted() {
            if let Some(limit) = opts.step_limit {
                if self.steps - start >= limit {
                    warn!("Step limit of {} reached at {:04X}", limit, self.regs.pc);
                    return Err(ExecError::StepLimitExceeded { limit });
                }
            }
            self.step(ctl)?;
        }

        let executed = self.steps - start;
        debug!("Halted at {:04X} after {} instructions", self.regs.pc, executed);
        Ok(executed)
    }
}

/// Run from `start_pc` until HLT with no step limit
pub fn run(memory: &mut Memory, registers: &mut Registers, start_pc: u16) -> Result<(), ExecError> {
    run_with(memory, registers, start_pc, &RunOptions::default()).map(|_| ())
}

/// Run from `start_pc` until HLT, honouring `opts`
pub fn run_with(
    memory: &mut Memory,
    registers: &mut Registers,
    start_pc: u16,
    opts: &RunOptions,
) -> Result<u64, ExecError> {
    registers.pc = start_pc;
    let mut ctl = RunControl::new();
    Cpu::new(memory, registers).run(&mut ctl, opts)
}
