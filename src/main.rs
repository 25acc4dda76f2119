use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use chrono::Local;

use raycast::renderer::{self, RenderConfig};
use raycast::{scene_load, stats};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <scene> [output.png]", args[0]);
        process::exit(1);
    }
    let scene_path = Path::new(&args[1]);
    let output_path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output.png"));

    let (mut model, camera) = {
        let _t = stats::time("Load");
        match scene_load::load(scene_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Failed to load {}: {}", scene_path.display(), e);
                process::exit(1);
            }
        }
    };
    {
        let _t = stats::time("Index");
        if let Err(e) = model.build_indices() {
            eprintln!("Failed to index {}: {}", scene_path.display(), e);
            process::exit(1);
        }
    }

    let model = Arc::new(model);
    let image = renderer::render(&model, &camera, &RenderConfig::default());
    if let Err(e) = image.save(&output_path) {
        eprintln!("Failed to save {}: {}", output_path.display(), e);
        process::exit(1);
    }

    let stats_name = Local::now().format("render_%F_%H%M%S.txt").to_string();
    let stats_path = match output_path.parent() {
        Some(dir) => dir.join(stats_name),
        None => PathBuf::from(stats_name),
    };
    stats::print_and_save(&stats_path);
}
