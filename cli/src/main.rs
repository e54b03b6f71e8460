//! pdf2html CLI - PDF to HTML conversion through pdftohtml

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf2html::{ConversionJob, ConvertOptions, OutlineMode, OutlineNode, OutputFormat};

#[derive(Parser)]
#[command(name = "pdf2html")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert PDF to repaired HTML and an NCX outline using pdftohtml", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// pdftohtml executable
    #[arg(long, global = true, env = "PDFTOHTML", default_value = "pdftohtml")]
    tool: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF into index.html (or index.xml) and toc.ncx
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Write pdftohtml's XML instead of HTML
        #[arg(long)]
        xml: bool,

        /// Let pdftohtml extract images
        #[arg(long)]
        images: bool,

        /// Outline handling
        #[arg(long, value_enum, default_value = "strict")]
        outline: OutlineLevel,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the outline of a PDF without converting it
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the outline as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutlineLevel {
    /// Fail the conversion if the outline cannot be extracted
    Strict,
    /// Convert without toc.ncx if the outline cannot be extracted
    Lenient,
    /// Do not extract the outline
    Off,
}

impl From<OutlineLevel> for OutlineMode {
    fn from(level: OutlineLevel) -> Self {
        match level {
            OutlineLevel::Strict => OutlineMode::Strict,
            OutlineLevel::Lenient => OutlineMode::Lenient,
            OutlineLevel::Off => OutlineMode::Disabled,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let tool = cli.tool;

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            xml,
            images,
            outline,
            json,
        }) => {
            let mut options = ConvertOptions::new()
                .with_tool(&tool)
                .with_images(images)
                .with_outline_mode(outline.into());
            if xml {
                options = options.xml();
            }
            cmd_convert(&input, output.as_deref(), options, json)
        }
        Some(Commands::Outline { input, json }) => cmd_outline(&input, &tool, json),
        Some(Commands::Version) => cmd_version(&tool),
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                let options = ConvertOptions::new().with_tool(&tool);
                cmd_convert(&input, cli.output.as_deref(), options, false)
            } else {
                println!("{}", "Usage: pdf2html <FILE> [OUTPUT]".yellow());
                println!("       pdf2html --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        let code = match e.downcast_ref::<pdf2html::Error>() {
            Some(err) if err.is_protected() => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_html", stem))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    options: ConvertOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_dir(input));

    let job = ConversionJob::new(&output_dir, input, options);

    let result = if json {
        job.run()?
    } else {
        let pb = spinner("Running pdftohtml...");
        let result = job.run();
        pb.finish_and_clear();
        result?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.tool_log.is_empty() {
        println!("{}", "pdftohtml log:".yellow());
        println!("{}", result.tool_log.dimmed());
        println!();
    }

    println!("{}", "Output files:".green().bold());
    match &result.toc {
        Some(toc) => {
            println!("  {} {}", "├─".dimmed(), file_name(&result.document));
            println!(
                "  {} {} ({} entries)",
                "└─".dimmed(),
                file_name(toc),
                result.outline_entries
            );
        }
        None => {
            println!("  {} {}", "└─".dimmed(), file_name(&result.document));
            if result.format == OutputFormat::Html && result.outline_entries > 0 {
                println!(
                    "{} outline with {} entries not written",
                    "Note:".dimmed(),
                    result.outline_entries
                );
            }
        }
    }
    println!("{} {}", "Saved to".green(), output_dir.display());

    Ok(())
}

fn cmd_outline(input: &Path, tool: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let job = ConversionJob::new(scratch.path(), input, ConvertOptions::new().with_tool(tool));

    let Some(toc) = job.read_outline()? else {
        println!("{}", "No outline found".yellow());
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&toc)?);
        return Ok(());
    }

    println!("{}", "Outline".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print_nodes(&toc.entries, "");
    println!();
    println!("{}: {}", "Entries".bold(), toc.total_items());
    if !toc.is_substantial() {
        println!(
            "{}",
            "Too few entries, a conversion would not write toc.ncx".dimmed()
        );
    }

    Ok(())
}

fn print_nodes(nodes: &[OutlineNode], prefix: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let branch = if last { "└─" } else { "├─" };
        println!(
            "{}{} {} {}",
            prefix,
            branch.dimmed(),
            node.title,
            format!("#{}", node.anchor).dimmed()
        );
        let child_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
        print_nodes(&node.children, &child_prefix);
    }
}

fn cmd_version(tool: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} {}", "pdf2html".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF to HTML conversion through pdftohtml");
    println!();

    match pdf2html::tool::Tool::new(tool).version() {
        Ok(Some(version)) => println!("Tool: {}", version),
        Ok(None) => println!("Tool: {} (version unknown)", tool.display()),
        Err(e) => println!("Tool: {}", e.to_string().red()),
    }

    println!("Repository: {}", "https://github.com/iyulab/pdf2html".dimmed());
    println!("License: MIT");
    Ok(())
}
