/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 15/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use shapefile_reader::vector::{Metadata, Shapefile, ShapefileConfig};
use shapefile_reader::Result;
use std::env;
use std::path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut input_file = String::new();
    let mut config_file = String::new();
    let mut raw = false;
    let mut verbose = false;
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        help();
        return Ok(());
    }
    for arg in args {
        if arg.starts_with("-h") || arg.starts_with("--help") {
            help();
            return Ok(());
        } else if arg.starts_with("-i") || arg.starts_with("--input") {
            input_file = arg_value(&arg, &["--input", "-input", "-i"]);
        } else if arg.starts_with("--config") || arg.starts_with("-config") {
            config_file = arg_value(&arg, &["--config", "-config"]);
        } else if arg.starts_with("--raw") || arg.starts_with("-raw") {
            raw = true;
        } else if arg.starts_with("-version") || arg.starts_with("--version") {
            version();
            return Ok(());
        } else if arg.starts_with("-v") || arg.starts_with("--verbose") {
            verbose = true;
        } else {
            eprintln!("Unrecognized argument {}", arg);
        }
    }

    let mut config = if config_file.is_empty() {
        ShapefileConfig::default()
    } else {
        ShapefileConfig::from_json_file(&config_file)?
    };
    if raw {
        config.raw_metadata_only = true;
    }
    if verbose {
        config.verbose_mode = true;
    }

    let mut input = Shapefile::open(&input_file, config)?;
    println!("{}", input.get_short_filename());
    println!("{}", input.main_header()?);
    println!("Fields: {}", input.field_names()?.join(", "));

    for shape in input.shapes()? {
        let shape = shape?;
        let metadata = match &shape.metadata {
            Metadata::Attributes(record) => record
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<String>>()
                .join(", "),
            Metadata::Raw(row) => row
                .iter()
                .map(|value| format!("{:?}", value))
                .collect::<Vec<String>>()
                .join(", "),
        };
        println!(
            "{} {} parts={} points={} [{}]",
            shape.record_number,
            shape.shape_type(),
            shape.geometry.parts().map_or(0, |p| p.len()),
            shape.geometry.num_points(),
            metadata
        );
    }
    input.close();

    Ok(())
}

fn arg_value(arg: &str, flags: &[&str]) -> String {
    let mut v = arg.to_string();
    if let Some(flag) = flags.iter().find(|f| arg.starts_with(*f)) {
        v = arg[flag.len()..].to_string();
    }
    v = v.replace("\"", "").replace("\'", "");
    if v.starts_with("=") {
        v = v[1..v.len()].to_string();
    }
    v
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("shp_info{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = "shp_info Help

Prints the header of a Shapefile and one line for each of its shapes.

The following commands are recognized:
-i, --input      Input Shapefile; the .shx and .dbf files must sit beside it.
--raw            Prints typed attribute values rather than name=value pairs.
--config         JSON file of reader options.
-v, --verbose    Logs a summary when the file is opened.
--version        Prints the version.
-h, --help       Prints help information.

Logging goes to stderr and is filtered by the RUST_LOG variable.

Example Usage:
>> .*EXE_NAME -i=\"*path*to*data*rivers.shp\" --raw
"
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!("shp_info v{}", VERSION.unwrap_or("unknown"));
}
