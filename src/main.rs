//! # lumen-cli
//!
//! An offline, physically-based Monte Carlo path tracer. Scenes of spheres,
//! rectangles, boxes, and participating media — optionally transformed,
//! motion-blurred, and textured — are rendered through a thin-lens camera
//! into a PNG/PPM image, with optional denoising and a terminal preview.
//!
//! ## Architecture
//!
//! - **Geometry**: sphere (static or moving), axis-aligned rectangles, box,
//!   translate/rotate decorators, constant-density media, all behind the
//!   `Hittable` protocol and accelerated by a BVH
//! - **Materials**: Lambertian, Metal, Dielectric, DiffuseLight, Isotropic
//!   over solid, checker, Perlin-turbulence, and image textures
//! - **Camera**: thin-lens model with depth of field and a motion-blur shutter
//! - **Execution**: a fixed worker pool renders per-worker sample slices of
//!   the full frame which are averaged into the final image; auxiliary
//!   albedo/normal passes feed Open Image Denoise when enabled
//!
//! ## Rendering equation
//!
//! The path tracer solves the rendering equation via Monte Carlo integration:
//!
//! ```text
//!   L_o(p, ω_o) = L_e(p, ω_o) + ∫_Ω f_r(p, ω_i, ω_o) · L_i(p, ω_i) · |cos θ_i| dω_i
//! ```
//!
//! Each material's `scatter` method importance-samples its BRDF lobe, and the
//! integrator recursively traces the scattered ray to evaluate `L_i`.

mod bvh;
mod camera;
mod denoise;
mod hittable;
mod material;
mod math;
mod presets;
mod preview;
mod renderer;
mod rng;
mod texture;
mod transform;
mod volume;

use anyhow::Context;
use camera::Camera;
use clap::Parser;
use denoise::FrameSet;
use presets::ScenePreset;
use preview::PreviewMode;
use renderer::{PathTracer, PixelBuffer, RenderConfig, ToneMapOp};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// scene construction draws from its own stream, far away from the worker ids
const SETUP_STREAM: u64 = u64::MAX;

/// lumen-cli — offline Monte Carlo path tracer
#[derive(Parser, Debug)]
#[command(
    name = "lumen-cli",
    version,
    about = "An offline Monte Carlo path tracer with motion blur, volumetrics, and denoised PNG output",
    after_help = "EXAMPLES:\n  \
                  lumen-cli --scene showcase --spp 200 -o showcase.png\n  \
                  lumen-cli --scene cornell --spp 500 --depth 20 --denoise\n  \
                  lumen-cli --scene smoke --width 600 --preview halfblock\n  \
                  lumen-cli --scene final --seed 7 --save-aux"
)]
struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Showcase)]
    scene: ScenePreset,

    /// Output image width in pixels
    #[arg(short = 'W', long, default_value_t = 800)]
    width: u32,

    /// Aspect ratio (width / height); defaults to the scene's own
    #[arg(short = 'a', long)]
    aspect_ratio: Option<f64>,

    /// Samples per pixel for the beauty pass — 10–50 for previews, 200+ for
    /// high quality
    #[arg(long, default_value_t = 100)]
    spp: u32,

    /// Samples per pixel for the auxiliary albedo/normal passes
    #[arg(long, default_value_t = 10)]
    aux_spp: u32,

    /// Maximum ray bounce depth
    #[arg(long, default_value_t = 10)]
    depth: u32,

    /// Output image path (.png, .jpg, or .ppm)
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Denoise the beauty pass using the albedo/normal guides
    #[arg(long)]
    denoise: bool,

    /// Also save the albedo and normal passes next to the output
    #[arg(long)]
    save_aux: bool,

    /// Worker threads (0 = all cores minus one)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Master RNG seed; omit for a fresh seed every run
    #[arg(long)]
    seed: Option<u64>,

    /// Tone mapping operator applied in linear space before gamma
    #[arg(long, value_enum, default_value_t = CliToneMap::None)]
    tone_map: CliToneMap,

    /// Disable gamma correction (output linear radiance values directly)
    #[arg(long)]
    no_gamma: bool,

    /// Show the finished frame in the terminal after saving
    #[arg(long, value_enum)]
    preview: Option<CliPreviewMode>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliToneMap {
    /// Clamp to [0,1] directly
    None,
    /// Reinhard global operator: x / (1 + x)
    Reinhard,
    /// ACES filmic curve (Narkowicz approximation)
    Aces,
}

impl From<CliToneMap> for ToneMapOp {
    fn from(op: CliToneMap) -> Self {
        match op {
            CliToneMap::None => ToneMapOp::None,
            CliToneMap::Reinhard => ToneMapOp::Reinhard,
            CliToneMap::Aces => ToneMapOp::Aces,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliPreviewMode {
    /// Full-block characters with 24-bit true color
    Truecolor,
    /// Half-block characters (▀) — 2 vertical pixels per cell
    Halfblock,
    /// ASCII grayscale density ramp
    Ascii,
}

impl From<CliPreviewMode> for PreviewMode {
    fn from(mode: CliPreviewMode) -> Self {
        match mode {
            CliPreviewMode::Truecolor => PreviewMode::TrueColor,
            CliPreviewMode::Halfblock => PreviewMode::HalfBlock,
            CliPreviewMode::Ascii => PreviewMode::Ascii,
        }
    }
}

fn print_header(scene_name: &str, object_count: usize, seed: u64, config: &RenderConfig) {
    eprintln!();
    eprintln!("  ╔═══════════════════════════════════════════════╗");
    eprintln!("  ║  lumen-cli  Offline Path Tracer               ║");
    eprintln!("  ╚═══════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("  Scene:    {scene_name} ({object_count} objects)");
    eprintln!("  Image:    {}×{}", config.width, config.height);
    eprintln!(
        "  Samples:  {} spp ({} aux)",
        config.samples_per_pixel, config.aux_samples_per_pixel
    );
    eprintln!("  Depth:    {}", config.max_depth);
    eprintln!("  Workers:  {}", renderer::worker_count(config));
    eprintln!("  Seed:     {seed:#018x}");
    eprintln!();
}

/// `render.png` → `render-albedo.png` and friends.
fn sibling_path(path: &Path, tag: &str) -> PathBuf {
    let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or("render");
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or("png");
    path.with_file_name(format!("{stem}-{tag}.{ext}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let seed = cli.seed.unwrap_or_else(rand::random);
    rng::set_master_seed(seed);
    let mut setup_rng = rng::stream_rng(SETUP_STREAM);

    let description = cli.scene.build(&mut setup_rng);
    let scene_name = description.name;
    let object_count = description.world.len();
    let (world, mut camera_config, sky) = description.into_bvh();

    if let Some(aspect) = cli.aspect_ratio {
        camera_config.aspect_ratio = aspect;
    }
    let height = ((cli.width as f64 / camera_config.aspect_ratio) as u32).max(1);

    let config = RenderConfig {
        width: cli.width,
        height,
        samples_per_pixel: cli.spp.max(1),
        aux_samples_per_pixel: cli.aux_spp.max(1),
        max_depth: cli.depth.max(1),
        threads: cli.threads,
        gamma: !cli.no_gamma,
        tone_map: cli.tone_map.into(),
    };
    print_header(scene_name, object_count, seed, &config);

    let tracer = PathTracer {
        scene: Arc::new(world),
        camera: Arc::new(Camera::new(&camera_config)),
        sky,
        config: Arc::new(config),
    };

    let aux_passes = cli.denoise || cli.save_aux;
    let output = renderer::render(&tracer, aux_passes);
    output.stats.print_summary();

    let beauty = output.color;
    let final_image = if cli.denoise {
        let albedo = output.albedo.as_ref().expect("aux passes were rendered");
        let normal = output.normal.as_ref().expect("aux passes were rendered");
        let frames = FrameSet::new(&beauty, albedo, normal);
        match denoise::denoise(&frames) {
            Ok(filtered) => filtered,
            Err(err) => {
                log::warn!("denoiser failed: {err}; writing the raw render instead");
                beauty
            }
        }
    } else {
        beauty
    };

    save_image(&final_image, &cli.output)?;
    if cli.save_aux {
        if let Some(albedo) = &output.albedo {
            save_image(albedo, &sibling_path(&cli.output, "albedo"))?;
        }
        if let Some(normal) = &output.normal {
            save_image(normal, &sibling_path(&cli.output, "normal"))?;
        }
    }

    if let Some(mode) = cli.preview {
        preview::display(&final_image, mode.into());
    }

    Ok(())
}

fn save_image(buffer: &PixelBuffer, path: &Path) -> anyhow::Result<()> {
    buffer
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("  Saved {}", path.display());
    Ok(())
}
