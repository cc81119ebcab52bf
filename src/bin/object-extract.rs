use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use object_extractor::{
    archive, CommandSegmenter, ExtractionEngine, ProcessOptions, ProcessResult,
};

#[derive(Parser)]
#[command(
    name = "object-extract",
    about = "Extract foreground objects from images via an external segmenter",
    version,
    after_help = "The segmenter command receives a PNG on stdin and must write a\n\
                  segmented image (alpha = foreground mask) to stdout, e.g.:\n\n\
                  object-extract photo.jpg --segmenter 'rembg i' --opacity 0.5"
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output directory (default: extracted/ next to a single input file)
    #[arg(short, long)]
    output: Option<String>,

    /// External segmenter command (whitespace-separated, stdin -> stdout)
    #[arg(short, long)]
    segmenter: String,

    /// Also write an overlay blended at this opacity (0.0-1.0)
    #[arg(long)]
    opacity: Option<f32>,

    /// Bundle all successful masks into a ZIP archive at this path
    #[arg(short, long)]
    archive: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Some(opacity) = cli.opacity {
        if !(0.0..=1.0).contains(&opacity) {
            eprintln!("Error: Opacity must be between 0.0 and 1.0");
            process::exit(1);
        }
    }

    let segmenter = match CommandSegmenter::from_command_line(&cli.segmenter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: Invalid segmenter command: {e}");
            process::exit(1);
        }
    };
    let engine = ExtractionEngine::new(segmenter);

    let opts = ProcessOptions {
        opacity: cli.opacity,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if !opts.quiet {
        match opts.opacity {
            Some(opacity) => eprintln!(
                "Extracting masks and {:.0}% overlays via `{}`",
                opacity * 100.0,
                cli.segmenter
            ),
            None => eprintln!("Extracting masks via `{}`", cli.segmenter),
        }
        eprintln!();
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: object-extract <input_dir> -o <output_dir> -s <command>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir, &opts)
    } else {
        let output_dir = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => input_path
                .parent()
                .unwrap_or(Path::new("."))
                .join("extracted"),
        };
        vec![engine.process_file(input_path, &output_dir, &opts)]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if let Some(archive_path) = &cli.archive {
        let mask_paths: Vec<PathBuf> = results
            .iter()
            .filter_map(|r| r.mask_path.clone())
            .collect();
        if mask_paths.is_empty() {
            if !opts.quiet {
                eprintln!("[SKIP] No masks to archive");
            }
        } else {
            match archive::bundle_files(&mask_paths, Path::new(archive_path)) {
                Ok(()) => {
                    if !opts.quiet {
                        eprintln!("[OK] Archived {} mask(s) to {archive_path}", mask_paths.len());
                    }
                }
                Err(e) => {
                    eprintln!("[FAIL] Archive: {e}");
                    fail_count += 1;
                }
            }
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        if !opts.quiet {
            eprintln!("[OK] {filename}");
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
