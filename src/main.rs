use std::env;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::process;

use vtab::{AsciiFormatter, DummyFormatter, Formatter, LilypondFormatter, Tuning, VtabParser};

enum Mode {
    Ascii,
    Lilypond,
    Dump,
}

fn usage() -> ! {
    eprintln!("Usage: vtab [--ascii|--ly|--dump] [--tuning NAME] <input.vtab> [output]");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut mode = Mode::Ascii;
    let mut tuning = Tuning::standard();
    let mut paths: Vec<&String> = Vec::new();

    // Parse flags
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--ascii" => mode = Mode::Ascii,
            "--ly" => mode = Mode::Lilypond,
            "--dump" => mode = Mode::Dump,
            "--tuning" => {
                i += 1;
                let name = match args.get(i) {
                    Some(name) => name,
                    None => usage(),
                };
                tuning = match Tuning::by_name(name) {
                    Ok(tuning) => tuning,
                    Err(e) => {
                        eprintln!("{}", e);
                        process::exit(1);
                    }
                };
            }
            flag if flag.starts_with("--") => usage(),
            _ => paths.push(&args[i]),
        }
        i += 1;
    }

    let input_path = match paths.first() {
        Some(path) => path.as_str(),
        None => usage(),
    };
    let output_path = paths.get(1);

    let file = match File::open(input_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let formatter: Box<dyn Formatter> = match mode {
        Mode::Ascii => Box::new(AsciiFormatter::with_tuning(tuning.clone())),
        Mode::Lilypond => Box::new(LilypondFormatter::new()),
        Mode::Dump => Box::new(DummyFormatter::new()),
    };

    let mut parser = VtabParser::with_tuning(tuning);
    parser.add_formatter(formatter);
    let errors = parser.parse_reader(input_path, BufReader::new(file));

    // Output
    let output = parser.formatters()[0].output();
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, output) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }

    if errors > 0 {
        eprintln!("{}: {} lines could not be read", input_path, errors);
        process::exit(1);
    }
}
