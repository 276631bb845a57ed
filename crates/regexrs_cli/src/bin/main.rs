use regexrs::{Match, Regex, RegexOptions};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::time::Duration;

fn print_usage() {
    eprintln!("usage: rex [options] <pattern> [file]");
    eprintln!("Matches the pattern against the file contents, or stdin.");
    eprintln!("Available options are:");
    eprintln!("  -i        case-insensitive matching");
    eprintln!("  -m        ^ and $ also match at line boundaries");
    eprintln!("  -s        . also matches newline");
    eprintln!("  -x        ignore unescaped whitespace in the pattern");
    eprintln!("  -n        only named groups capture");
    eprintln!("  -r        scan the input right to left");
    eprintln!("  -E        ECMAScript dialect");
    eprintln!("  -g        print capture groups for each match");
    eprintln!("  -1        stop after the first match");
    eprintln!("  -t ms     abort matching after 'ms' milliseconds");
    eprintln!("  --json    print matches as JSON");
    eprintln!("  --        stop handling options");
}

#[derive(Default)]
struct Options {
    regex_options: RegexOptions,
    pattern: Option<String>,
    file: Option<String>,
    show_groups: bool,
    first_only: bool,
    json: bool,
    timeout_ms: Option<u64>,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut opts = Options::default();
    let mut i = 1;
    let mut stop_options = false;

    while i < args.len() {
        let arg = &args[i];

        if !stop_options && arg.starts_with('-') && arg.len() > 1 {
            match arg.as_str() {
                "-i" => opts.regex_options |= RegexOptions::IGNORE_CASE,
                "-m" => opts.regex_options |= RegexOptions::MULTILINE,
                "-s" => opts.regex_options |= RegexOptions::SINGLELINE,
                "-x" => opts.regex_options |= RegexOptions::IGNORE_PATTERN_WHITESPACE,
                "-n" => opts.regex_options |= RegexOptions::EXPLICIT_CAPTURE,
                "-r" => opts.regex_options |= RegexOptions::RIGHT_TO_LEFT,
                "-E" => opts.regex_options |= RegexOptions::ECMA_SCRIPT,
                "-g" => opts.show_groups = true,
                "-1" => opts.first_only = true,
                "--json" => opts.json = true,
                "-t" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("'-t' needs argument".to_string());
                    }
                    let ms = args[i]
                        .parse::<u64>()
                        .map_err(|_| format!("bad timeout '{}'", args[i]))?;
                    opts.timeout_ms = Some(ms);
                }
                "--" => stop_options = true,
                _ => return Err(format!("unrecognized option '{}'", arg)),
            }
        } else if opts.pattern.is_none() {
            opts.pattern = Some(arg.clone());
        } else if opts.file.is_none() {
            opts.file = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument '{}'", arg));
        }
        i += 1;
    }

    Ok(opts)
}

fn read_input(file: Option<&str>) -> Result<String, String> {
    match file {
        Some(name) => {
            fs::read_to_string(name).map_err(|e| format!("cannot open {}: {}", name, e))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("error reading stdin: {}", e))?;
            Ok(text)
        }
    }
}

fn match_json(m: &Match<'_>) -> serde_json::Value {
    let groups: Vec<serde_json::Value> = m
        .groups()
        .iter()
        .map(|g| {
            let captures: Vec<serde_json::Value> = g
                .captures()
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "start": c.start(),
                        "length": c.len(),
                        "value": c.as_str(),
                    })
                })
                .collect();
            serde_json::json!({
                "name": g.name(),
                "success": g.success(),
                "value": g.as_str(),
                "captures": captures,
            })
        })
        .collect();
    serde_json::json!({
        "start": m.start(),
        "length": m.len(),
        "value": m.as_str(),
        "groups": groups,
    })
}

fn print_match(m: &Match<'_>, show_groups: bool) {
    println!("{}..{}: {}", m.start(), m.end(), m.as_str());
    if show_groups {
        for g in &m.groups()[1..] {
            match g.as_str() {
                Some(text) => println!("  {} = {}", g.name(), text),
                None => println!("  {} = <no capture>", g.name()),
            }
        }
    }
}

fn main() {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("rex: {}", e);
            print_usage();
            std::process::exit(2);
        }
    };

    let Some(pattern) = opts.pattern.as_deref() else {
        print_usage();
        std::process::exit(2);
    };

    let regex = match opts.timeout_ms {
        Some(ms) => Regex::with_options_and_timeout(
            pattern,
            opts.regex_options,
            Duration::from_millis(ms),
        ),
        None => Regex::with_options(pattern, opts.regex_options),
    };
    let regex = match regex {
        Ok(re) => re,
        Err(e) => {
            eprintln!("rex: {}", e);
            std::process::exit(2);
        }
    };

    let text = match read_input(opts.file.as_deref()) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("rex: {}", e);
            std::process::exit(2);
        }
    };

    let mut found = false;
    let mut json_matches: Vec<serde_json::Value> = Vec::new();
    for result in regex.find_iter(&text) {
        let m = match result {
            Ok(m) => m,
            // a timeout or blown backtrack limit is distinct from "no
            // match": report it and exit with its own status
            Err(e) => {
                eprintln!("rex: {}", e);
                std::process::exit(3);
            }
        };
        found = true;
        if opts.json {
            json_matches.push(match_json(&m));
        } else {
            print_match(&m, opts.show_groups);
        }
        if opts.first_only {
            break;
        }
    }

    if opts.json {
        println!("{}", serde_json::Value::Array(json_matches));
    }
    std::process::exit(if found { 0 } else { 1 });
}
