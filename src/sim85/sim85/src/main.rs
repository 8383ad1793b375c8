extern crate clap;
use crossbeam_channel::{bounded, Receiver}; // Ctrl-C notification
use ctrlc; // stop a runaway program with ctrl-c
use env_logger;
use log::{error, info, warn};

// Internal project crates
use sim85_core::utils::parse_hex;
use sim85_core::{load_program, Cpu, ExecError, Memory, Registers, RunControl};
use sim85_programs::{Program, ORIGIN, PROGRAMS};

// Bytes shown per row of a memory dump
const DUMP_ROW: usize = 16;

/// Configures command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    let max_steps = clap::Arg::with_name("max-steps")
        .long("max-steps")
        .takes_value(true)
        .value_name("N")
        .help("Stop with an error after N instructions");

    clap::App::new("sim85")
        .version("0.1")
        .about("Intel 8085 instruction-set simulator")
        .setting(clap::AppSettings::SubcommandRequiredElseHelp)
        .subcommand(clap::SubCommand::with_name("list").about("List the bundled programs"))
        .subcommand(
            clap::SubCommand::with_name("demo")
                .about("Run a bundled program and check its results")
                .arg(
                    clap::Arg::with_name("NAME")
                        .required(true)
                        .help("Program name, see `list`"),
                )
                .arg(max_steps.clone()),
        )
        .subcommand(
            clap::SubCommand::with_name("run")
                .about("Assemble a source file, one instruction per line, and run it")
                .arg(
                    clap::Arg::with_name("FILE")
                        .required(true)
                        .help("Source file; `;` starts a comment"),
                )
                .arg(
                    clap::Arg::with_name("origin")
                        .long("origin")
                        .takes_value(true)
                        .value_name("ADDR")
                        .default_value("0000")
                        .help("Load address (4 hex digits)"),
                )
                .arg(
                    clap::Arg::with_name("start")
                        .long("start")
                        .takes_value(true)
                        .value_name("ADDR")
                        .help("Start address, defaults to the load address"),
                )
                .arg(
                    clap::Arg::with_name("set")
                        .long("set")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .value_name("ADDR=VAL")
                        .help("Seed one memory cell before the run, e.g. C050=96"),
                )
                .arg(max_steps)
                .arg(
                    clap::Arg::with_name("dump")
                        .long("dump")
                        .takes_value(true)
                        .value_name("FROM:TO")
                        .help("Print memory FROM..=TO after the run, e.g. C050:C05F"),
                ),
        )
        .get_matches()
}

fn parse_max_steps(matches: &clap::ArgMatches) -> Result<Option<u64>, String> {
    match matches.value_of("max-steps") {
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid step count: {}", text)),
        None => Ok(None),
    }
}

fn parse_address(text: &str) -> Result<u16, String> {
    parse_hex(text, 4).ok_or_else(|| format!("invalid address (4 hex digits): {}", text))
}

fn parse_cell(text: &str) -> Result<(u16, u8), String> {
    let (addr, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VAL: {}", text))?;
    let value = parse_hex(value, 2).ok_or_else(|| format!("invalid byte (2 hex digits): {}", value))?;
    Ok((parse_address(addr)?, value as u8))
}

fn parse_range(text: &str) -> Result<(u16, u16), String> {
    let (from, to) = text
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO: {}", text))?;
    let range = (parse_address(from)?, parse_address(to)?);
    if range.0 > range.1 {
        return Err(format!("empty dump range: {}", text));
    }
    Ok(range)
}

/// Print the cells FROM..=TO, DUMP_ROW per line
fn dump(memory: &Memory, from: u16, to: u16) {
    let cells = &memory.as_slice()[from as usize..=to as usize];
    for (row, chunk) in cells.chunks(DUMP_ROW).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("{:04X}: {}", from as usize + row * DUMP_ROW, bytes.join(" "));
    }
}

/// Step until HLT, a failure, the step limit or ctrl-c
fn execute(
    memory: &mut Memory,
    registers: &mut Registers,
    start: u16,
    max_steps: Option<u64>,
    stop: &Receiver<()>,
) -> bool {
    registers.pc = start;
    let mut ctl = RunControl::new();
    let mut cpu = Cpu::new(memory, registers);

    while !ctl.is_halted() {
        if !stop.is_empty() {
            warn!(
                "Interrupted at {:04X} after {} instructions",
                cpu.registers().pc,
                cpu.steps()
            );
            return false;
        }

        let failure = match max_steps {
            Some(limit) if cpu.steps() >= limit => Some(ExecError::StepLimitExceeded { limit }),
            _ => cpu.step(&mut ctl).err(),
        };
        if let Some(err) = failure {
            error!("{}", err);
            let trail: Vec<String> = cpu.trail().map(|pc| format!("{:04X}", pc)).collect();
            error!("Recently executed: {}", trail.join(" "));
            return false;
        }
    }

    info!("Halted after {} instructions", cpu.steps());
    true
}

fn list() -> bool {
    for program in PROGRAMS.iter() {
        println!("{:<18} {}", program.name, program.title);
    }
    true
}

fn demo(program: &Program, max_steps: Option<u64>, stop: &Receiver<()>) -> bool {
    let mut memory = Memory::new();
    for &(addr, value) in program.inputs {
        memory.write(addr, value);
    }
    if let Err(e) = load_program(program.source.iter(), ORIGIN, &mut memory) {
        error!("{}: {}", program.name, e);
        return false;
    }

    let mut registers = Registers::new();
    let halted = execute(&mut memory, &mut registers, ORIGIN, max_steps, stop);
    println!("{}", registers);

    let mut ok = halted;
    for &(addr, expected) in program.expected {
        let actual = memory.read(addr);
        let verdict = if actual == expected { "ok" } else { "MISMATCH" };
        println!("{:04X}: {:02X} (expected {:02X}) {}", addr, actual, expected, verdict);
        ok &= actual == expected;
    }
    ok
}

fn run_file(matches: &clap::ArgMatches, stop: &Receiver<()>) -> Result<bool, String> {
    let path = matches.value_of("FILE").unwrap_or_default();
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;

    // Keep the file line number of every instruction for error reports
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(number, line)| (number + 1, line.split(';').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let origin = parse_address(matches.value_of("origin").unwrap_or("0000"))?;
    let start = match matches.value_of("start") {
        Some(text) => parse_address(text)?,
        None => origin,
    };
    let max_steps = parse_max_steps(matches)?;
    let range = matches.value_of("dump").map(parse_range).transpose()?;

    let mut memory = Memory::new();
    for cell in matches.values_of("set").into_iter().flatten() {
        let (addr, value) = parse_cell(cell)?;
        memory.write(addr, value);
    }

    let end = load_program(lines.iter().map(|(_, line)| *line), origin, &mut memory).map_err(|e| {
        let number = lines.get(e.line).map(|(number, _)| *number).unwrap_or(0);
        format!("{}:{}: {} (address {:04X})", path, number, e.error, e.address)
    })?;
    info!("Loaded {:04X}..{:04X}", origin, end);

    let mut registers = Registers::new();
    let halted = execute(&mut memory, &mut registers, start, max_steps, stop);
    println!("{}", registers);
    if let Some((from, to)) = range {
        dump(&memory, from, to);
    }
    Ok(halted)
}

/// Main entry point for the simulator
fn main() {
    env_logger::init();

    // Set up Ctrl-C handler with channel communication
    let (signal_sender, signal_receiver) = bounded(1);
    let handler_result = ctrlc::set_handler(move || {
        if signal_sender.is_full() {
            std::process::exit(-1); // Second ctrl-c while the first is still pending
        }
        let _send_result = signal_sender.send(());
    });

    if let Err(e) = handler_result {
        error!("Signal handler failed: {:?}", e);
        std::process::exit(1);
    }

    // Parse command-line arguments
    let cli_matches = get_cli_config();

    let ok = match cli_matches.subcommand() {
        ("list", _) => list(),
        ("demo", Some(sub)) => {
            let name = sub.value_of("NAME").unwrap_or_default();
            match (sim85_programs::find(name), parse_max_steps(sub)) {
                (Some(program), Ok(max_steps)) => demo(program, max_steps, &signal_receiver),
                (None, _) => {
                    error!("No bundled program named {}, see `sim85 list`", name);
                    false
                }
                (_, Err(e)) => {
                    error!("{}", e);
                    false
                }
            }
        }
        ("run", Some(sub)) => match run_file(sub, &signal_receiver) {
            Ok(halted) => halted,
            Err(e) => {
                error!("{}", e);
                false
            }
        },
        _ => {
            error!("Invalid subcommand specified");
            false
        }
    };

    if !ok {
        std::process::exit(1);
    }
}
