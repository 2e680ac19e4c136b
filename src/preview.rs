use crate::renderer::PixelBuffer;
use crossterm::style::{self, Stylize};
use std::io::{self, Write};

/// Terminal encodings for the optional post-render preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewMode {
    /// ANSI 24-bit true-color using full-block characters.
    TrueColor,
    /// Half-block rendering with separate fg/bg colors — 2 vertical pixels per cell.
    HalfBlock,
    /// ASCII grayscale density ramp.
    Ascii,
}

/// Paints the finished frame into the terminal. Purely cosmetic: the saved
/// image file is the authoritative output.
pub fn display(buffer: &PixelBuffer, mode: PreviewMode) {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match mode {
        PreviewMode::TrueColor => display_truecolor(&mut out, buffer),
        PreviewMode::HalfBlock => display_halfblock(&mut out, buffer),
        PreviewMode::Ascii => display_ascii(&mut out, buffer),
    }
    let _ = out.flush();
}

fn display_truecolor(out: &mut impl Write, buffer: &PixelBuffer) {
    for y in 0..buffer.height {
        for x in 0..buffer.width {
            let (r, g, b) = buffer.rgb_at(x, y);
            let _ = write!(out, "{}", "█".with(style::Color::Rgb { r, g, b }));
        }
        let _ = writeln!(out);
    }
}

fn display_halfblock(out: &mut impl Write, buffer: &PixelBuffer) {
    let rows = buffer.height / 2;
    for row in 0..rows {
        for x in 0..buffer.width {
            let (tr, tg, tb) = buffer.rgb_at(x, row * 2);
            let (br, bg, bb) = buffer.rgb_at(x, row * 2 + 1);
            let _ = write!(
                out,
                "{}",
                "▀"
                    .with(style::Color::Rgb {
                        r: tr,
                        g: tg,
                        b: tb
                    })
                    .on(style::Color::Rgb {
                        r: br,
                        g: bg,
                        b: bb
                    })
            );
        }
        let _ = writeln!(out);
    }
}

fn display_ascii(out: &mut impl Write, buffer: &PixelBuffer) {
    const RAMP: &[u8] = b" .:-=+*#%@";
    for y in 0..buffer.height {
        for x in 0..buffer.width {
            let (r, g, b) = buffer.rgb_at(x, y);
            let lum =
                (0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64) / 255.0;
            let idx = (lum.clamp(0.0, 0.999) * RAMP.len() as f64) as usize;
            let _ = write!(out, "{}", RAMP[idx] as char);
        }
        let _ = writeln!(out);
    }
}
