//! Extract the foreground object from a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example extract_object -- input.jpg output_dir "rembg i"
//! ```

use std::env;
use std::process;

use object_extractor::{CommandSegmenter, ExtractionEngine, ProcessOptions};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <input> <output_dir> <segmenter command>", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output_dir = &args[2];
    let segmenter =
        CommandSegmenter::from_command_line(&args[3]).expect("invalid segmenter command");

    let engine = ExtractionEngine::new(segmenter);
    let opts = ProcessOptions {
        opacity: Some(0.5),
        ..ProcessOptions::default()
    };
    let result = engine.process_file(input.as_ref(), output_dir.as_ref(), &opts);

    if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
