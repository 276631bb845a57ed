use regexrs::{Regex, RegexOptions};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: program_dump <pattern> [flags: imsxnrE]");
        std::process::exit(0);
    }
    let pattern = &args[1];

    let mut options = RegexOptions::NONE;
    if let Some(flags) = args.get(2) {
        for c in flags.chars() {
            options |= match c {
                'i' => RegexOptions::IGNORE_CASE,
                'm' => RegexOptions::MULTILINE,
                's' => RegexOptions::SINGLELINE,
                'x' => RegexOptions::IGNORE_PATTERN_WHITESPACE,
                'n' => RegexOptions::EXPLICIT_CAPTURE,
                'r' => RegexOptions::RIGHT_TO_LEFT,
                'E' => RegexOptions::ECMA_SCRIPT,
                _ => {
                    eprintln!("unknown flag '{}'", c);
                    std::process::exit(2);
                }
            };
        }
    }

    match Regex::with_options(pattern, options) {
        Ok(re) => {
            println!("=== Pattern: {} ===\n", pattern);
            print!("{}", re.program_listing());
            println!("\ngroups:");
            for (i, name) in re.group_names().iter().enumerate() {
                println!("  {} = {}", i, name);
            }
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            std::process::exit(2);
        }
    }
}
