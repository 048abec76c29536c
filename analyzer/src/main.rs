use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::debug;

use imsniff::{Detector, ImageInfo, Limits};

#[derive(Parser, Debug)]
#[command(name = "imsniff analyzer", version, about = "Detects format, size and orientation of image files.")]
struct Args {
    /// Skip metadata and report only type and size
    #[arg(long)]
    size_only: bool,

    /// Give up on files whose header extends beyond this many bytes
    #[arg(long, value_name = "BYTES")]
    max_scan_bytes: Option<u64>,

    /// Input files
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let limits = Limits { max_scan_bytes: args.max_scan_bytes };
    let mut detector = Detector::with_limits(limits);
    let mut failed = false;

    for path in &args.files {
        debug!("analyzing {}", path.display());
        let file = match std::fs::File::open(path) {
            Ok(f) => std::io::BufReader::new(f),
            Err(e) => {
                eprintln!("Cannot open {}: {}", path.display(), e);
                failed = true;
                continue;
            }
        };

        let result = if args.size_only {
            detector.detect(file).map(|(image_type, size)| ImageInfo { image_type, size, ..ImageInfo::default() })
        } else {
            detector.detect_info(file)
        };

        match result {
            Ok(info) => print_info(&path.display().to_string(), &info, args.size_only),
            Err(e) => {
                eprintln!("Cannot load image metadata from {}: {}", path.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

fn print_info(name: &str, info: &ImageInfo, size_only: bool) {
    println!("{}:", name);
    println!("  Type: {} ({})", info.image_type, info.image_type.mime_type());
    println!("  Width: {}", info.size.width);
    println!("  Height: {}", info.size.height);
    if !size_only {
        println!("  Rotation: {} degrees", info.rotation_degrees());
        println!("  Mirror: {:?}", info.mirror);
    }
}
