//! redocx CLI - manuscript house-style reflow tool

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use redocx::{PolicyRegistry, Redocx, StylePolicy};

#[derive(Parser)]
#[command(name = "redocx")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Reflow academic DOCX manuscripts to a publication house style", long_about = None)]
struct Cli {
    /// Input DOCX files
    #[arg(value_name = "FILE", required_unless_present = "list_policies")]
    inputs: Vec<PathBuf>,

    /// Output file (single input) or directory (multiple inputs)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Style policy name
    #[arg(short, long, value_name = "NAME", default_value = "tech-science")]
    policy: String,

    /// Load the style policy from a JSON file instead
    #[arg(long, value_name = "FILE", conflicts_with = "policy")]
    policy_file: Option<PathBuf>,

    /// List the built-in policies and exit
    #[arg(long)]
    list_policies: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.list_policies {
        for name in PolicyRegistry::with_defaults().names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let policy = match resolve_policy(&cli) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let multiple = cli.inputs.len() > 1;
    let bar = if multiple && !cli.quiet {
        let bar = ProgressBar::new(cli.inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .expect("valid progress template"),
        );
        Some(bar)
    } else {
        None
    };

    let mut failures = 0usize;
    for input in &cli.inputs {
        if let Some(bar) = &bar {
            bar.set_message(
                input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }

        let output = match output_path(input, cli.output.as_deref(), multiple) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{} {}: {}", "error:".red().bold(), input.display(), e);
                failures += 1;
                continue;
            }
        };

        match Redocx::new().with_policy(policy.clone()).format(input, &output) {
            Ok(written) => {
                if !cli.quiet {
                    let line = format!("{} -> {}", input.display(), written.display());
                    match &bar {
                        Some(bar) => bar.println(line),
                        None => println!("{} {}", "ok:".green().bold(), line),
                    }
                }
            }
            Err(e) => {
                eprintln!("{} {}: {}", "error:".red().bold(), input.display(), e);
                failures += 1;
            }
        }

        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if failures > 0 {
        eprintln!(
            "{} {} of {} conversions failed",
            "error:".red().bold(),
            failures,
            cli.inputs.len()
        );
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn resolve_policy(cli: &Cli) -> Result<StylePolicy, String> {
    if let Some(path) = &cli.policy_file {
        let data = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        return serde_json::from_str(&data)
            .map_err(|e| format!("invalid policy file {}: {}", path.display(), e));
    }
    PolicyRegistry::with_defaults()
        .get(&cli.policy)
        .map(Clone::clone)
        .map_err(|e| e.to_string())
}

/// Choose a per-input output path so concurrent conversions never
/// collide on a shared filename.
fn output_path(
    input: &Path,
    output: Option<&Path>,
    multiple: bool,
) -> Result<PathBuf, String> {
    let default_name = {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into());
        format!("{}.formatted.docx", stem)
    };

    match output {
        None => Ok(input.with_file_name(default_name)),
        Some(path) if multiple || path.is_dir() => {
            fs::create_dir_all(path)
                .map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
            Ok(path.join(default_name))
        }
        Some(path) => Ok(path.to_path_buf()),
    }
}
