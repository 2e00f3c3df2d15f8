//! Writing rendered frames: PNG sequences, animated GIFs, in-memory PNGs.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::png::PngEncoder;
use image::{Delay, Frame, ImageEncoder, RgbaImage};
use log::info;

use crate::error::ExportError;
use crate::grid::Grid;
use crate::render::{render_bed, RenderOptions};

/// Animation container formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationFormat {
    Gif,
}

impl FromStr for AnimationFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gif" => Ok(Self::Gif),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn to_image(bed: &Grid<f64>, opts: &RenderOptions) -> Result<RgbaImage, ExportError> {
    let rgba = render_bed(bed, opts);
    RgbaImage::from_raw(bed.w as u32, bed.h as u32, rgba).ok_or_else(|| {
        ExportError::Io(std::io::Error::other("frame buffer does not match grid size"))
    })
}

/// Encode RGBA bytes as PNG in memory.
pub fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        rgba,
        w as u32,
        h as u32,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

/// File name of frame `i`: `{prefix}0000.png`, `{prefix}0001.png`, ...
pub fn frame_path(dir: &Path, prefix: &str, i: usize) -> PathBuf {
    dir.join(format!("{prefix}{i:04}.png"))
}

/// Save one PNG per frame into `dir`. Returns the written paths.
pub fn save_images(
    frames: &[Grid<f64>],
    dir: &Path,
    prefix: &str,
    opts: &RenderOptions,
) -> Result<Vec<PathBuf>, ExportError> {
    if frames.is_empty() {
        return Err(ExportError::NoFrames);
    }
    std::fs::create_dir_all(dir)?;
    info!("saving {} frames to {}", frames.len(), dir.display());

    let mut paths = Vec::with_capacity(frames.len());
    for (i, bed) in frames.iter().enumerate() {
        let path = frame_path(dir, prefix, i);
        to_image(bed, opts)?.save(&path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Save all frames as a looping animation, `interval_ms` per frame.
pub fn save_animation(
    frames: &[Grid<f64>],
    path: &Path,
    format: AnimationFormat,
    interval_ms: u32,
    opts: &RenderOptions,
) -> Result<(), ExportError> {
    if frames.is_empty() {
        return Err(ExportError::NoFrames);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!("saving {} frame animation to {}", frames.len(), path.display());

    match format {
        AnimationFormat::Gif => {
            let file = BufWriter::new(File::create(path)?);
            let mut encoder = GifEncoder::new(file);
            encoder.set_repeat(Repeat::Infinite)?;
            for bed in frames {
                let delay = Delay::from_numer_denom_ms(interval_ms, 1);
                encoder.encode_frame(Frame::from_parts(to_image(bed, opts)?, 0, 0, delay))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cellbedform-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn frame_names_are_zero_padded() {
        let p = frame_path(Path::new("out"), "bed", 7);
        assert_eq!(p, Path::new("out").join("bed0007.png"));
    }

    #[test]
    fn empty_frames_rejected() {
        let dir = scratch_dir("empty");
        assert!(matches!(
            save_images(&[], &dir, "bed", &RenderOptions::default()),
            Err(ExportError::NoFrames)
        ));
        assert!(matches!(
            save_animation(&[], &dir.join("a.gif"), AnimationFormat::Gif, 100, &RenderOptions::default()),
            Err(ExportError::NoFrames)
        ));
    }

    #[test]
    fn unknown_format_rejected() {
        assert_eq!("GIF".parse::<AnimationFormat>().unwrap(), AnimationFormat::Gif);
        assert!(matches!(
            "mp4".parse::<AnimationFormat>(),
            Err(ExportError::UnsupportedFormat(f)) if f == "mp4"
        ));
    }

    #[test]
    fn writes_png_sequence_and_gif() {
        let dir = scratch_dir("write");
        let frames: Vec<Grid<f64>> = (0..3)
            .map(|k| Grid::from_fn(8, 4, |x, _| (x + k) as f64 - 4.0))
            .collect();
        let opts = RenderOptions::default();

        let paths = save_images(&frames, &dir, "bed", &opts).unwrap();
        assert_eq!(paths.len(), 3);
        let img = image::open(&paths[2]).unwrap();
        assert_eq!((img.width(), img.height()), (8, 4));

        let gif = dir.join("anim.gif");
        save_animation(&frames, &gif, AnimationFormat::Gif, 100, &opts).unwrap();
        assert!(std::fs::metadata(&gif).unwrap().len() > 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn png_bytes_have_signature() {
        let bytes = encode_png(&[0, 0, 0, 255], 1, 1).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }
}
