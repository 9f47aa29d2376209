use eyespot::export::load_solution;
use eyespot::{GatewayConfig, ImageExporter, Renderer, Session, SolveGateway, ViewerApp};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "export" {
        // Render a saved solution to PNGs without opening a window
        run_export(&args[2..])?;
    } else {
        run_gui_app()?;
    }

    Ok(())
}

fn run_export(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(input), Some(output_dir)) = (args.first(), args.get(1)) else {
        return Err("usage: eyespot export <solution.json> <output_dir> [cell_size]".into());
    };
    let cell_size = match args.get(2) {
        Some(raw) => raw.parse::<u32>()?,
        None => 8,
    };

    let solution = load_solution(Path::new(input))?;
    println!(
        "Exporting {} frames of a {}x{} grid...",
        solution.frame_count(),
        solution.grid_size,
        solution.grid_size
    );

    let exporter = ImageExporter::new(Renderer::new(cell_size));
    let paths = exporter.export_frame_sequence(&solution, Path::new(output_dir), "eyespot")?;

    println!("Wrote {} frames to {}", paths.len(), output_dir);
    Ok(())
}

fn run_gui_app() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env();
    log::info!("solver endpoint: {}", config.solve_url());

    let gateway = SolveGateway::new(config)?;
    let app = ViewerApp::new(Session::new(), gateway)?;

    eframe::run_native(
        "eyespot",
        eyespot::viewer::native_options(),
        Box::new(|_cc| Box::new(app)),
    )?;

    Ok(())
}
