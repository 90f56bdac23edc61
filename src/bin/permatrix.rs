// SPDX-License-Identifier: MIT OR Apache-2.0

//! Headless tool to convert and inspect permission matrices.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use permission_matrix::{EXPORT_FILE_NAME, Editor, JsonFormat, Seed};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const JSON_FILE_NAME: &str = "permissions.json";

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "csv" => Some(Format::Csv),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    fn other(self) -> Self {
        match self {
            Format::Csv => Format::Json,
            Format::Json => Format::Csv,
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Format::Csv => EXPORT_FILE_NAME,
            Format::Json => JSON_FILE_NAME,
        }
    }
}

#[derive(Parser)]
#[command(name = "permatrix", version, about = "Convert permission matrices between CSV and JSON")]
struct Args {
    /// Write JSON on a single line instead of indenting it.
    #[arg(long, global = true, action)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a permission matrix and write it in the other format.
    Convert {
        /// File to read.
        input: PathBuf,

        /// File or directory to write to, prints to stdout when missing.
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Input format, derived from the file extension when missing.
        #[arg(long, value_enum)]
        from: Option<Format>,

        /// Output format, defaults to the format which is not the input format.
        #[arg(long, value_enum)]
        to: Option<Format>,
    },

    /// Read a permission matrix and print a summary of it.
    Check {
        /// File to read.
        input: PathBuf,

        /// Input format, derived from the file extension when missing.
        #[arg(long, value_enum)]
        from: Option<Format>,
    },

    /// Print the example permission policy.
    Example {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        to: Format,
    },
}

fn load(editor: &mut Editor, input: &Path, from: Option<Format>) -> Result<Format> {
    let format = from
        .or_else(|| Format::from_path(input))
        .ok_or_else(|| anyhow!("can't detect format of {}, use --from", input.display()))?;

    let text = fs::read_to_string(input)
        .with_context(|| format!("could not read {}", input.display()))?;

    match format {
        Format::Csv => editor.decode_csv(&text)?,
        Format::Json => editor.decode_json(&text)?,
    }

    info!(
        input = %input.display(),
        resources = editor.model().resources().len(),
        roles = editor.roles().len(),
        "loaded permission matrix"
    );

    Ok(format)
}

fn render(editor: &Editor, format: Format) -> Result<String> {
    Ok(match format {
        Format::Csv => editor.encode_csv(),
        Format::Json => editor.encode_json()?,
    })
}

fn main() -> Result<()> {
    setup_logging();

    let args = Args::parse();
    let json_format = if args.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    match args.command {
        Command::Convert {
            input,
            output,
            from,
            to,
        } => {
            let mut editor = Editor::builder().json_format(json_format).build();
            let from = load(&mut editor, &input, from)?;
            let to = to.unwrap_or(from.other());
            let text = render(&editor, to)?;

            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(to.file_name())
                    } else {
                        path
                    };
                    fs::write(&path, text)
                        .with_context(|| format!("could not write {}", path.display()))?;
                    info!(output = %path.display(), "wrote permission matrix");
                }
                None => println!("{}", text),
            }
        }
        Command::Check { input, from } => {
            let mut editor = Editor::new();
            load(&mut editor, &input, from)?;

            let snapshot = editor.snapshot();
            println!("resources: {}", snapshot.model.resources().len());
            for resource in snapshot.model.resources() {
                println!("  {} ({} grants)", resource.uri(), resource.grants().len());
            }
            println!("roles: {}", snapshot.roles.len());
            for role in snapshot.roles.iter() {
                println!("  {}", role);
            }
        }
        Command::Example { to } => {
            let editor = Editor::builder()
                .seed(Seed::Example)
                .json_format(json_format)
                .build();
            println!("{}", render(&editor, to)?);
        }
    }

    Ok(())
}
