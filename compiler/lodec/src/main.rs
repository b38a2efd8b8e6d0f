//! lode linker CLI.

use lodec::commands::{dce, deps, link, CommandError, LinkOptions};

fn main() {
    lodec::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    let result = match command {
        "link" => LinkOptions::parse(&args[2..]).and_then(|options| {
            let stats = link(&options)?;
            if options.output.is_some() {
                eprintln!(
                    "linked {} packages: {}/{} declarations kept, {} bytes",
                    stats.packages, stats.selected, stats.declarations, stats.bytes_written
                );
            }
            Ok(())
        }),
        "deps" => LinkOptions::parse(&args[2..]).and_then(|options| {
            for path in deps(&options)? {
                println!("{path}");
            }
            Ok(())
        }),
        "dce" => LinkOptions::parse(&args[2..]).and_then(|options| {
            for summary in dce(&options)? {
                println!(
                    "{:<40} {:>6} / {:<6}",
                    summary.import_path, summary.selected, summary.total
                );
            }
            Ok(())
        }),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "version" | "--version" | "-v" => {
            println!("lodec {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        if matches!(e, CommandError::Usage(_)) {
            eprintln!();
            print_usage();
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("lodec: whole-program linker for compiled package archives");
    println!();
    println!("Usage: lodec <command> <import-path> --cache=<dir> [options]");
    println!();
    println!("Commands:");
    println!("  link <import-path>   Link a program from cached archives");
    println!("  deps <import-path>   Print the resolved link order");
    println!("  dce <import-path>    Print kept/total declarations per package");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --cache=<dir>        Archive cache directory (required)");
    println!("  -o <path>            Output file (default: stdout)");
    println!("  --source-map=<path>  Also write a v3 source map");
    println!("  --minify             Minify regardless of the entry package");
    println!();
    println!("Set RUST_LOG to enable logging; LODE_LOG_TREE=1 renders it as a tree.");
}
