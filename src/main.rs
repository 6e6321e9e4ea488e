mod app;
mod demos;

use std::path::PathBuf;

use clap::Parser;

use demos::Demo;

/// Renders one of the demo scenes with the software rasterizer and saves the frame.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scene to render.
    #[arg(short, long, value_enum, default_value_t = Demo::Basic)]
    demo: Demo,

    /// Directory with demo resources (checkerboard.png, model.obj and its texture maps).
    #[arg(short, long, default_value = "assets")]
    assets: PathBuf,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Where the rendered frame is written, format follows the extension.
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Draw triangle edges instead of shaded triangles.
    #[arg(long)]
    wireframe: bool,

    /// Output the z-buffer instead of the frame buffer.
    #[arg(long)]
    depth: bool,

    /// Also show the frame in a window, Escape closes it.
    #[arg(long)]
    show: bool,
}

impl From<Args> for app::Params {
    fn from(args: Args) -> Self {
        return app::Params {
            width: args.width,
            height: args.height,
            demo: args.demo,
            asset_path: args.assets,
            output_path: args.output,
            wireframe: args.wireframe,
            depth: args.depth,
            show: args.show,
        };
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = app::Params::from(Args::parse());
    if params.show {
        // Windows live on the show-image context thread, which never gives control back.
        show_image::run_context(move || app::run(params));
    }

    return app::run(params);
}
