use std::path::PathBuf;
use std::time;

use anyhow::Context;
use image::RgbImage;
use log::info;
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use tiny_rasterizer::Scene;

use crate::demos::{self, Demo};

/// Everything a run needs, filled from the command line.
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub demo: Demo,
    pub asset_path: PathBuf,
    pub output_path: PathBuf,
    pub wireframe: bool,
    pub depth: bool,
    pub show: bool,
}

/// Helper, defining exit event to be an Escape key press.
fn is_exit_event(window_event: event::WindowEvent) -> bool {
    if let event::WindowEvent::KeyboardInput(event) = window_event {
        if event.input.key_code == Some(event::VirtualKeyCode::Escape) && event.input.state.is_released() {
            return true;
        }
    }

    return false;
}

/// Shows the frame and blocks until the window is closed or Escape is pressed.
fn show(image: &RgbImage) -> anyhow::Result<()> {
    let window_options = WindowOptions {
        size: Some([image.width(), image.height()]),
        ..Default::default()
    };
    let window = create_window("output", window_options)?;
    let image_data = ImageView::new(ImageInfo::rgb8(image.width(), image.height()), image.as_raw());
    window.set_image("image", image_data)?;

    // The channel disconnects when the window gets closed.
    for window_event in window.event_channel()? {
        if is_exit_event(window_event) {
            break;
        }
    }

    return Ok(());
}

/// Renders the requested demo once, writes it to the output path and optionally shows it.
pub fn run(params: Params) -> anyhow::Result<()> {
    let mut scene = Scene::new(params.width, params.height);

    let time_begin = time::Instant::now();
    demos::render(&mut scene, &params)?;
    info!(
        "Rendered {:?} demo at {}x{} in {:.2?}",
        params.demo,
        params.width,
        params.height,
        time_begin.elapsed()
    );

    let image = if params.depth { scene.depth_image() } else { scene.to_image() };
    image
        .save(&params.output_path)
        .with_context(|| format!("failed to write {}", params.output_path.display()))?;
    info!("Saved {}", params.output_path.display());

    if params.show {
        show(&image)?;
    }

    return Ok(());
}
