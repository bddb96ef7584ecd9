use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rasterbridge::{
    BackendEnv, Bitmap, Color, GraphicsBackend, GraphicsOpts, HeadlessPlatform, HeadlessWindow,
    IntRect, InvertMode, ManualEventLoop, Point, PolyPolygon, Polygon, Region, RenderColor,
    RenderConfig, RenderMethod, TwoRect,
};

#[derive(Parser, Debug)]
#[command(name = "rasterbridge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw a demo scene and write it as a PNG.
    Demo(DemoArgs),
}

#[derive(Parser, Debug)]
struct DemoArgs {
    /// Scene to draw.
    #[arg(long, value_enum)]
    scene: Scene,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Surface width.
    #[arg(long, default_value_t = 256)]
    width: u32,

    /// Surface height.
    #[arg(long, default_value_t = 256)]
    height: u32,

    /// Preferred backend tier.
    #[arg(long, value_enum, default_value_t = MethodChoice::Raster)]
    render_method: MethodChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scene {
    /// Rectangle drawn through a triangular clip region.
    Clip,
    /// Overlapping rectangles drawn in XOR mode.
    Xor,
    /// The three invert flavors side by side.
    Invert,
    /// Bitmap drawn through a separate alpha layer.
    Composite,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodChoice {
    Gpu,
    Raster,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo(args) => cmd_demo(args),
    }
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    if args.width == 0 || args.height == 0 {
        anyhow::bail!("width and height must be non-zero");
    }
    let method = match args.render_method {
        MethodChoice::Gpu => RenderMethod::Gpu,
        MethodChoice::Raster => RenderMethod::Raster,
    };
    let env = BackendEnv {
        config: Arc::new(RenderConfig::new(method)),
        platform: Rc::new(platform_for(method)),
        event_loop: Rc::new(ManualEventLoop::new()),
    };
    let window = HeadlessWindow::offscreen(args.width, args.height);
    let mut gfx = GraphicsBackend::new(&env, window, GraphicsOpts::default());

    gfx.set_line_color(None);
    gfx.set_fill_color(Some(Color::WHITE));
    gfx.draw_rect(0, 0, args.width as i32, args.height as i32);

    match args.scene {
        Scene::Clip => scene_clip(&mut gfx, args.width, args.height),
        Scene::Xor => scene_xor(&mut gfx, args.width, args.height),
        Scene::Invert => scene_invert(&mut gfx, args.width, args.height),
        Scene::Composite => scene_composite(&mut gfx, args.width, args.height)?,
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    gfx.dump_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    let used = if gfx.is_gpu() { "gpu" } else { "raster" };
    eprintln!("wrote {} ({used})", args.out.display());
    Ok(())
}

#[cfg(feature = "gpu")]
fn gpu_platform() -> HeadlessPlatform {
    match rasterbridge::WgpuContext::new() {
        Ok(ctx) => HeadlessPlatform::with_gpu(Rc::new(ctx)),
        Err(e) => {
            eprintln!("gpu unavailable: {e}");
            HeadlessPlatform::new()
        }
    }
}

#[cfg(not(feature = "gpu"))]
fn gpu_platform() -> HeadlessPlatform {
    HeadlessPlatform::simulated_gpu()
}

fn platform_for(method: RenderMethod) -> HeadlessPlatform {
    match method {
        RenderMethod::Gpu => gpu_platform(),
        RenderMethod::Raster => HeadlessPlatform::new(),
    }
}

fn scene_clip(gfx: &mut GraphicsBackend, w: u32, h: u32) {
    let (fw, fh) = (f64::from(w), f64::from(h));
    let triangle = Polygon::closed(vec![
        Point::new(fw / 2.0, fh * 0.1),
        Point::new(fw * 0.9, fh * 0.9),
        Point::new(fw * 0.1, fh * 0.9),
    ]);
    gfx.set_clip_region(&Region::from_poly_polygon(PolyPolygon::from(triangle)));
    gfx.set_fill_color(Some(Color::rgb(0, 0, 255)));
    gfx.draw_rect(0, 0, w as i32, h as i32);
    gfx.reset_clip_region();
}

fn scene_xor(gfx: &mut GraphicsBackend, w: u32, h: u32) {
    let (qw, qh) = (w as i32 / 4, h as i32 / 4);
    gfx.set_fill_color(Some(Color::rgb(255, 0, 0)));
    gfx.set_xor_mode(true);
    gfx.draw_rect(qw / 2, qh / 2, qw * 2, qh * 2);
    gfx.set_fill_color(Some(Color::rgb(0, 255, 0)));
    gfx.draw_rect(qw + qw / 2, qh + qh / 2, qw * 2, qh * 2);
    gfx.set_xor_mode(false);
}

fn scene_invert(gfx: &mut GraphicsBackend, w: u32, h: u32) {
    let third = w as i32 / 3;
    let hh = h as i32;
    gfx.set_fill_color(Some(Color::rgb(40, 120, 200)));
    gfx.draw_rect(0, 0, w as i32, hh);
    gfx.invert_rect(4, 4, third - 8, hh - 8, InvertMode::Solid);
    gfx.invert_rect(third + 4, 4, third - 8, hh - 8, InvertMode::TrackFrame);
    gfx.invert_rect(2 * third + 4, 4, third - 8, hh - 8, InvertMode::Checker);
}

fn scene_composite(gfx: &mut GraphicsBackend, w: u32, h: u32) -> anyhow::Result<()> {
    let source = Bitmap::solid(w, h, RenderColor::rgba(200, 30, 30, 255));
    let mut ramp = Vec::with_capacity((w * h) as usize);
    for _y in 0..h {
        for x in 0..w {
            ramp.push(((x * 255) / w.max(1)) as u8);
        }
    }
    let alpha = Bitmap::from_gray8(w, h, &ramp).context("build alpha ramp")?;
    let full = IntRect::from_size(w, h);
    gfx.draw_alpha_bitmap(&TwoRect::identity(full), &source, &alpha);
    Ok(())
}
