use std::env;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use dos_unicode::{EmulatorHost, UnicodeConverter};

/// Host wiring for standalone use: a fixed resource directory and a fixed
/// code page taken from the command line.
struct CliHost {
    resource_root: PathBuf,
    code_page: u16,
}

impl EmulatorHost for CliHost {
    fn resource_path(&self, subdir: &str) -> PathBuf {
        self.resource_root.join(subdir)
    }

    fn loaded_code_page(&self) -> u16 {
        self.code_page
    }

    fn can_reload_character_set(&self) -> bool {
        true
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let reverse = args.get(3).map(String::as_str) == Some("--reverse");
    if args.len() < 3 || args.len() > 4 || (args.len() == 4 && !reverse) {
        eprintln!("usage: {} <resource-root> <code-page> [--reverse]", args[0]);
        eprintln!("  converts UTF-8 on stdin to DOS characters on stdout,");
        eprintln!("  or the other way around with --reverse");
        return ExitCode::FAILURE;
    }

    let code_page: u16 = args[2].parse().expect("code page must be a number");

    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .expect("failed to read stdin");

    let mut converter = UnicodeConverter::new(CliHost {
        resource_root: PathBuf::from(&args[1]),
        code_page,
    });

    let (output, complete) = if reverse {
        (converter.dos_to_utf8(&input), true)
    } else {
        converter.utf8_to_dos(&input)
    };
    io::stdout()
        .write_all(&output)
        .expect("failed to write stdout");

    if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
