//! Headless capture: PNG screenshots of the rendered frame.

#![allow(clippy::cast_possible_truncation)]

use std::error::Error;
use std::fs;
use std::path::Path;

use crate::Mc10;

/// Save the current framebuffer as a PNG file.
///
/// The framebuffer is ARGB32 (`u32` array). This converts to RGBA bytes
/// for the PNG encoder.
pub fn save_screenshot(mc10: &Mc10, path: &Path) -> Result<(), Box<dyn Error>> {
    let width = mc10.framebuffer_width();
    let height = mc10.framebuffer_height();
    let fb = mc10.framebuffer();

    let file = fs::File::create(path)?;
    let w = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for &pixel in fb {
        let r = ((pixel >> 16) & 0xFF) as u8;
        let g = ((pixel >> 8) & 0xFF) as u8;
        let b = (pixel & 0xFF) as u8;
        rgba.push(r);
        rgba.push(g);
        rgba.push(b);
        rgba.push(0xFF);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Run the machine and save a sequence of frames as numbered PNGs.
///
/// Creates `dir/000001.png`, `dir/000002.png`, and so on.
pub fn save_frame_sequence(
    mc10: &mut Mc10,
    dir: &Path,
    num_frames: u32,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;

    for i in 1..=num_frames {
        mc10.run_frame();
        let filename = dir.join(format!("{i:06}.png"));
        save_screenshot(mc10, &filename)?;
    }

    Ok(())
}
