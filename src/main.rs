//! Tessera - render a layout description to a PNG or a window
//!
//! Usage: tessera [file.layout] [--out FILE.png] [--window] [--layout-log] [--config FILE]
//! Without a file, renders the built-in tutorial screen.

use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use softbuffer::{Context, Surface};
use tessera::config::Config;
use tessera::renderer::FrameBuffer;
use tessera::{demo, Preview};
use tracing::{error, info};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

#[derive(Debug, Default)]
struct Args {
    file: Option<PathBuf>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    window: bool,
    layout_log: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(a) = iter.next() {
        match a.as_str() {
            "--window" => args.window = true,
            "--layout-log" => args.layout_log = true,
            "--out" => args.out = Some(iter.next().context("--out needs a file name")?.into()),
            "--config" => args.config = Some(iter.next().context("--config needs a file name")?.into()),
            "-h" | "--help" => {
                println!("Usage: tessera [file.layout] [--out FILE.png] [--window] [--layout-log] [--config FILE]");
                std::process::exit(0);
            }
            s if s.starts_with("--") => bail!("unknown option {}", s),
            s => {
                if args.file.is_some() {
                    bail!("only one layout file can be previewed at a time");
                }
                args.file = Some(s.into());
            }
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .compact()
            .init();
    }

    let args = parse_args()?;
    let config = Config::load(args.config.as_deref()).context("loading config")?;

    let preview = match &args.file {
        Some(path) => Preview::from_file(path, &config)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            info!("No layout file given, showing the tutorial screen");
            let mut preview = Preview::new(demo::tutorial_screen(), &config)?;
            demo::ensure_card_image(preview.images_mut());
            preview
        }
    };

    if args.layout_log {
        print!("{}", preview.layout_report(config.width, config.height)?);
    }

    if args.window {
        return run_window(preview, &config);
    }

    if args.out.is_some() || !args.layout_log {
        let out = args.out.unwrap_or_else(|| config.output.clone());
        let fb = preview.render(config.width, config.height)?;
        fb.save_png(&out)
            .with_context(|| format!("writing {}", out.display()))?;
        info!("Wrote {}x{} preview to {}", fb.width, fb.height, out.display());
    }
    Ok(())
}

fn run_window(preview: Preview, config: &Config) -> Result<()> {
    // Surface errors while the loop runs cannot be returned, so validate once up front.
    preview.display_list(config.width, config.height)?;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_title("Tessera")
        .build(&event_loop)
        .context("creating window")?;

    let context = unsafe { Context::new(&window) }
        .map_err(|e| anyhow::anyhow!("creating softbuffer context: {}", e))?;
    let mut surface = unsafe { Surface::new(&context, &window) }
        .map_err(|e| anyhow::anyhow!("creating surface: {}", e))?;

    let size = window.inner_size();
    if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
        surface
            .resize(width, height)
            .map_err(|e| anyhow::anyhow!("sizing surface: {}", e))?;
    }
    let mut fb = FrameBuffer::new(size.width as usize, size.height as usize);
    let mut needs_render = true;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(new_size) => {
                    let (Some(width), Some(height)) =
                        (NonZeroU32::new(new_size.width), NonZeroU32::new(new_size.height))
                    else {
                        return;
                    };
                    if let Err(err) = surface.resize(width, height) {
                        error!("Failed to resize surface: {}", err);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    fb = FrameBuffer::new(new_size.width as usize, new_size.height as usize);
                    needs_render = true;
                    window.request_redraw();
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                if fb.width == 0 || fb.height == 0 {
                    return;
                }
                if needs_render {
                    if let Err(err) = preview.render_into(&mut fb) {
                        error!("Render failed: {}", err);
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    needs_render = false;
                }

                let mut buffer = match surface.buffer_mut() {
                    Ok(buffer) => buffer,
                    Err(err) => {
                        error!("Failed to map surface buffer: {}", err);
                        return;
                    }
                };
                if buffer.len() != fb.pixels.len() {
                    return;
                }
                buffer.copy_from_slice(&fb.pixels);
                if let Err(err) = buffer.present() {
                    error!("Failed to present frame: {}", err);
                }
            }
            _ => {}
        }
    });
}
