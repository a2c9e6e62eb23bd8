//! mocap CLI - Edit motion tables and convert motion archives.

use mocap::archive::io::{is_archive_path, read_archive, write_archive};
use mocap::prelude::*;
use mocap::table::text::{read_table, write_table};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Options that take no value.
const FLAGS: &[&str] = &["--skip_last", "--reduce"];

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let command = filtered_args[0];
    let opts = match Options::parse(&filtered_args[1..]) {
        Ok(o) => o,
        Err(e) => fail(command, e),
    };
    let config = match opts.value(&["--config"]) {
        Some(path) => Config::load(path).unwrap_or_else(|e| fail(command, e)),
        None => Config::default(),
    };

    let result = match command {
        "pad" | "p" => cmd_pad(&opts, &config),
        "extract" | "x" => cmd_extract(&opts, &config),
        "mirror" | "m" => cmd_mirror(&opts, &config),
        "revert" | "r" | "pkl2csv" => cmd_revert(&opts, &config),
        "strip" | "s" => cmd_strip(&opts),
        "pack" => cmd_pack(&opts, &config),
        "info" | "i" => match opts.positional.first() {
            Some(path) => cmd_info(Path::new(path)),
            None => Err(Error::invalid_arg("missing file argument")),
        },
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "version" | "-V" | "--version" => {
            print_version();
            Ok(())
        }
        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(command).exists() {
                cmd_info(Path::new(command))
            } else {
                eprintln!("Unknown command: {}", command);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        fail(command, e);
    }
}

fn fail(command: &str, e: Error) -> ! {
    eprintln!("Error ({}): {}", command, e);
    std::process::exit(1);
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn print_help() {
    println!("mocap - motion table and archive toolkit");
    println!();
    println!("USAGE:");
    println!("    mocap-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    p, pad      --input <csv> --output <csv> [--values 0,0,0]");
    println!("                Append constant columns to every frame");
    println!("    x, extract  --input <csv> --output <csv> [--start 0] [--end -1]");
    println!("                Keep frames [start, end); -1 means to the end");
    println!("    m, mirror   --input <csv> --output <csv> [--mode simple|smooth]");
    println!("                [--skip_last] [--transition_frames 5]");
    println!("                Append the reversed motion");
    println!("    r, revert   --pklfile <archive> [--output <csv>]");
    println!("                Rebuild a table from an archive (dropped DoF become 0)");
    println!("    s, strip    --input_folder <dir> --output_folder <dir>");
    println!("                Remove contact_mask/smpl_joints/pose_aa from archives");
    println!("    pack        --input <csv> --output <archive> [--key id] [--reduce]");
    println!("                Split a table into an archive");
    println!("    i, info     <file>     Show table or archive summary");
    println!("    h, help                Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!("    --config <json>  Load settings (reduction policy, precision, ...)");
    println!("    -V, --version    Show version");
    println!();
    println!("NOTES:");
    println!("    - RUST_LOG overrides the verbosity flags");
    println!("    - Archives are .json or .json.gz; .gz outputs are compressed");
    println!("    - revert also accepts --filepath or --input for the archive path");
}

fn print_version() {
    println!(
        "mocap-cli {} (built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("MOCAP_BUILD_DATE").unwrap_or("unknown")
    );
}

// ============================================================================
// Argument parsing
// ============================================================================

/// `--name value` pairs, value-less flags and positional arguments.
#[derive(Debug, Default)]
struct Options<'a> {
    values: Vec<(&'a str, &'a str)>,
    flags: Vec<&'a str>,
    positional: Vec<&'a str>,
}

impl<'a> Options<'a> {
    fn parse(args: &[&'a str]) -> Result<Self> {
        let mut opts = Self::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            if !arg.starts_with("--") {
                opts.positional.push(arg);
            } else if let Some((name, value)) = arg.split_once('=') {
                opts.values.push((name, value));
            } else if FLAGS.contains(&arg) {
                opts.flags.push(arg);
            } else {
                let value = iter
                    .next()
                    .ok_or_else(|| Error::invalid_arg(format!("{} needs a value", arg)))?;
                opts.values.push((arg, value));
            }
        }
        Ok(opts)
    }

    /// Last value given for any of `names`.
    fn value(&self, names: &[&str]) -> Option<&'a str> {
        self.values
            .iter()
            .rev()
            .find(|(name, _)| names.contains(name))
            .map(|&(_, value)| value)
    }

    fn required(&self, names: &[&str]) -> Result<&'a str> {
        self.value(names)
            .ok_or_else(|| Error::invalid_arg(format!("missing required option {}", names[0])))
    }

    fn parsed<T: FromStr>(&self, name: &str, default: T) -> Result<T> {
        match self.value(&[name]) {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::invalid_arg(format!("{} expects a number, got {:?}", name, raw))),
            None => Ok(default),
        }
    }

    fn flag(&self, name: &str) -> bool {
        self.flags.contains(&name)
    }
}

fn report(warnings: &[Diagnostic]) {
    for w in warnings {
        warn!("{}", w);
    }
}

/// File name without `.gz` and `.json`/`.csv` extensions.
fn clip_stem(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("clip");
    let name = name.strip_suffix(".gz").unwrap_or(name);
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("clip")
        .to_string()
}

// ============================================================================
// Table commands
// ============================================================================

fn cmd_pad(opts: &Options, config: &Config) -> Result<()> {
    let input = opts.required(&["--input"])?;
    let output = opts.required(&["--output"])?;
    let values = match opts.value(&["--values"]) {
        Some(raw) => parse_values(raw)?,
        None => config.pad_values.clone(),
    };

    let table = read_table(input)?;
    info!("Original data shape: {:?}", table.shape());

    let padded = append_constant_columns(&table, &values, config.expected_width);
    report(&padded.warnings);
    info!("New data shape: {:?}", padded.value.shape());

    write_table(output, &padded.value, config.precision.pad)?;
    info!("Added {} constant columns", values.len());
    Ok(())
}

fn parse_values(raw: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| Error::invalid_arg(format!("bad value {:?} in --values", v)))
        })
        .collect()
}

fn cmd_extract(opts: &Options, config: &Config) -> Result<()> {
    let input = opts.required(&["--input"])?;
    let output = opts.required(&["--output"])?;
    let start: i64 = opts.parsed("--start", 0)?;
    let end: i64 = opts.parsed("--end", -1)?;

    let table = read_table(input)?;
    info!("Original data shape: {:?}", table.shape());

    let sliced = slice_frames(&table, start, end);
    info!("Extracted data shape: {:?}", sliced.shape());

    write_table(output, &sliced, config.precision.slice)
}

fn cmd_mirror(opts: &Options, config: &Config) -> Result<()> {
    let input = opts.required(&["--input"])?;
    let output = opts.required(&["--output"])?;
    let mode = match MirrorMode::from_str(opts.value(&["--mode"]).unwrap_or("simple"))? {
        MirrorMode::Simple { .. } => MirrorMode::Simple { skip_last: opts.flag("--skip_last") },
        MirrorMode::Smooth { .. } => MirrorMode::Smooth {
            transition_frames: opts.parsed("--transition_frames", config.transition_frames)?,
        },
    };

    let table = read_table(input)?;
    info!("Original data shape: {:?}, mode: {}", table.shape(), mode);

    let mirrored = mirror::mirror(&table, mode)?;
    report(&mirrored.warnings);
    info!("Frames: {} -> {}", table.frame_count(), mirrored.value.frame_count());

    write_table(output, &mirrored.value, config.precision.mirror)
}

// ============================================================================
// Archive commands
// ============================================================================

fn cmd_revert(opts: &Options, config: &Config) -> Result<()> {
    let input = match opts.value(&["--pklfile", "--filepath", "--input"]) {
        Some(p) => PathBuf::from(p),
        None => match opts.positional.first() {
            Some(p) => PathBuf::from(p),
            None => return Err(Error::invalid_arg("missing required option --pklfile")),
        },
    };
    let output = match opts.value(&["--output"]) {
        Some(p) => PathBuf::from(p),
        None => input.with_file_name(format!("{}_reconstructed.csv", clip_stem(&input))),
    };

    let archive = read_archive(&input)?;
    let record = &archive.record;
    debug!(
        "Fields: root {:?} {:?}, dof {:?}, annotations {:?}",
        record.root_translation.shape(),
        record.root_rotation.shape(),
        record.dof.shape(),
        record.annotations().map(|(name, _)| name).collect::<Vec<_>>()
    );

    let policy = config.reduction;
    let table = reconstruct(record, &policy)?;
    info!(
        "Reconstructed data shape: {:?} ({} zero columns at dof index {}; dropped values are not recoverable)",
        table.shape(),
        policy.dof_gap_width,
        policy.dof_split_index
    );

    write_table(&output, &table, config.precision.reconstruct)?;
    info!("Saved as {}", output.display());
    Ok(())
}

fn cmd_strip(opts: &Options) -> Result<()> {
    if let Some(folder) = opts.value(&["--input_folder"]) {
        let out_folder = opts.required(&["--output_folder"])?;
        return strip_folder(Path::new(folder), Path::new(out_folder));
    }
    let input = opts.required(&["--input"])?;
    let output = opts.required(&["--output"])?;
    strip_file(Path::new(input), Path::new(output))
}

fn strip_file(input: &Path, output: &Path) -> Result<()> {
    let mut archive = read_archive(input)?;
    for key in archive.record.strip_annotations() {
        info!("Removed key: '{}'", key);
    }
    info!("Note: 'dof' may already be reduced upstream; that change cannot be reverted");
    write_archive(output, &archive)
}

fn strip_folder(input: &Path, output: &Path) -> Result<()> {
    if !input.is_dir() {
        return Err(Error::FileNotFound(input.to_path_buf()));
    }
    if !output.exists() {
        fs::create_dir_all(output)?;
        info!("Created output folder: {}", output.display());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_archive_path(p))
        .collect();
    files.sort();
    info!("Found {} archives in {}", files.len(), input.display());

    let mut failed = 0;
    for path in &files {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let out_name = name.replace("_cont_mask", "");
        match strip_file(path, &output.join(&out_name)) {
            Ok(()) => info!("Processed '{}' -> '{}'", name, out_name),
            Err(e) => {
                error!("Error processing {}: {}", name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(Error::other(format!("{} of {} archives failed", failed, files.len())));
    }
    Ok(())
}

fn cmd_pack(opts: &Options, config: &Config) -> Result<()> {
    let input = Path::new(opts.required(&["--input"])?);
    let output = opts.required(&["--output"])?;
    let key = opts.value(&["--key"]).map(str::to_string).unwrap_or_else(|| clip_stem(input));

    let table = read_table(input)?;
    let mut record = split_table(&table)?;
    if opts.flag("--reduce") {
        record.dof = config.reduction.reduce(&record.dof)?;
        info!("Reduced dof to {} columns", record.dof.width());
    }

    write_archive(output, &Archive::new(key, record))
}

// ============================================================================
// Info
// ============================================================================

fn cmd_info(path: &Path) -> Result<()> {
    let (label, record) = if is_archive_path(path) {
        let archive = read_archive(path)?;
        println!("Archive: {}", path.display());
        println!("Key:     {}", archive.key);
        ("archive", archive.record)
    } else {
        let table = read_table(path)?;
        println!("Table:   {}", path.display());
        println!("Shape:   {} frames x {} columns", table.frame_count(), table.width());
        match split_table(&table) {
            Ok(record) => ("table", record),
            Err(_) => return Ok(()),
        }
    };

    let s = record.summary();
    println!();
    println!("Motion ({}):", label);
    println!("  Frames:           {}", s.frames);
    println!("  DoF width:        {}", s.dof_width);
    println!("  Root path length: {:.4}", s.root_path_length);
    println!("  Max |q| error:    {:.2e}", s.max_rotation_norm_error);
    if !s.annotations.is_empty() {
        println!("  Annotations:      {}", s.annotations.join(", "));
    }
    Ok(())
}
