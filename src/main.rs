use anyhow::{bail, Context, Result};
use em8051::Emulator;
use std::env;
use std::io::{self, Write};
use termion::color;

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <hexfile> [options]", args[0]);
        eprintln!("Options:");
        eprintln!("  -r <cycles>      run for n cycles (0 = until stopped)");
        eprintln!("  -s <n>           step through n instructions");
        eprintln!("  -d <addr> <len>  dump program memory from hex address");
        std::process::exit(1);
    }

    let mut em = Emulator::new();
    em.load_hex_file(&args[1])?;

    let mut auto_run = false;
    let mut run_cycles = 1_000_000u64;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-r" if i + 1 < args.len() => {
                auto_run = true;
                i += 1;
                run_cycles = args[i].parse().context("invalid cycle count")?;
            }
            "-s" if i + 1 < args.len() => {
                i += 1;
                let steps: u64 = args[i].parse().context("invalid step count")?;
                println!("\nStepping through {} instructions...", steps);
                for _ in 0..steps {
                    em.step();
                    print_status(&em);
                }
            }
            "-d" if i + 2 < args.len() => {
                let start = u16::from_str_radix(&args[i + 1], 16).context("invalid address")?;
                let length: u16 = args[i + 2].parse().context("invalid length")?;
                i += 2;
                dump_memory(&em, start, length);
            }
            other => bail!("unknown option: {}", other),
        }
        i += 1;
    }

    if auto_run {
        println!("\nRunning emulator for {} cycles...", run_cycles);
        em.run(run_cycles);
        print_status(&em);
    } else {
        repl(&mut em)?;
    }

    println!("\nEmulation complete.");
    Ok(())
}

fn repl(em: &mut Emulator) -> Result<()> {
    println!("\nEntering interactive mode. Commands:");
    println!("  s [n]          - step n instructions (default: 1)");
    println!("  r [n]          - run n cycles (default: 1000)");
    println!("  p              - print CPU status");
    println!("  d <addr> <len> - dump program memory");
    println!("  i [text]       - push a line of input");
    println!("  q              - quit");

    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let mut words = line.split_whitespace();
        match words.next() {
            Some("q") | Some("quit") => break,
            Some("s") | Some("step") => {
                let n: u64 = words.next().and_then(|w| w.parse().ok()).unwrap_or(1);
                for _ in 0..n {
                    em.step();
                }
                print_status(em);
            }
            Some("r") | Some("run") => {
                let n: u64 = words.next().and_then(|w| w.parse().ok()).unwrap_or(1000);
                em.run(n);
                print_status(em);
            }
            Some("p") | Some("print") => print_status(em),
            Some("d") | Some("dump") => {
                let start = words.next().and_then(|w| u16::from_str_radix(w, 16).ok());
                let length = words.next().and_then(|w| w.parse::<u16>().ok());
                match (start, length) {
                    (Some(start), Some(length)) => dump_memory(em, start, length),
                    _ => println!("usage: d <hex-addr> <dec-len>"),
                }
            }
            Some("i") | Some("input") => {
                let text: Vec<&str> = words.collect();
                em.push_input(&format!("{}\n", text.join(" ")));
            }
            Some(other) => println!("Unknown command: {}", other),
            None => {}
        }
    }
    Ok(())
}

fn print_status(em: &Emulator) {
    println!(
        "\n{}=== 8051 CPU status ==={}",
        color::Fg(color::Green),
        color::Fg(color::Reset)
    );
    println!("{}", em.snapshot());
    if em.is_waiting() {
        println!(
            "{}waiting for input ({:?}){}",
            color::Fg(color::Yellow),
            em.wait_kind(),
            color::Fg(color::Reset)
        );
    }
}

fn dump_memory(em: &Emulator, start: u16, length: u16) {
    println!("\n=== Memory dump ===");
    let mut row = 0u16;
    while row < length {
        let address = start.wrapping_add(row);
        print!("{:04x}: ", address);
        for j in 0..16u16.min(length - row) {
            print!("{:02x} ", em.read_code(address.wrapping_add(j)));
        }
        println!();
        row = match row.checked_add(16) {
            Some(next) => next,
            None => break,
        };
    }
}
