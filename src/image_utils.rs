use std::io;

use image::{DynamicImage, GrayImage};

pub fn load_image(bytes: &[u8]) -> io::Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn to_color_image(image: &DynamicImage) -> egui::ColorImage {
    let rgba = image.to_rgba8();
    egui::ColorImage::from_rgba_unmultiplied(
        [rgba.width() as usize, rgba.height() as usize],
        rgba.as_raw(),
    )
}

/// Paints the included pixels of `mask` with `tint`, everything else stays transparent.
pub fn mask_preview(mask: &GrayImage, tint: [u8; 3], opacity: u8) -> egui::ColorImage {
    let [r, g, b] = tint;
    let rgba = mask
        .pixels()
        .flat_map(|p| {
            if p.0[0] > 0 {
                [r, g, b, opacity]
            } else {
                [0, 0, 0, 0]
            }
        })
        .collect::<Vec<_>>();
    egui::ColorImage::from_rgba_unmultiplied(
        [mask.width() as usize, mask.height() as usize],
        &rgba,
    )
}
