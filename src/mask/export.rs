use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{imageops::FilterType, GrayImage, ImageFormat, Luma, LumaA};

use super::{raster, Scene};

/// Flattens the mask objects of a scene into a black/white bitmap.
/// The base photo is never read.
#[derive(Debug, Clone, Copy)]
pub struct MaskExporter {
    overlay_threshold: u8,
}

impl Default for MaskExporter {
    fn default() -> Self {
        Self {
            overlay_threshold: 128,
        }
    }
}

impl MaskExporter {
    pub fn new(overlay_threshold: u8) -> Self {
        Self { overlay_threshold }
    }

    pub fn export(&self, scene: &Scene, [width, height]: [u32; 2]) -> GrayImage {
        let mut out = GrayImage::new(width, height);

        // Overlay goes first, manual objects always win
        if let Some(overlay) = scene.overlay() {
            let overlay = overlay.image();
            let resized;
            let overlay = if overlay.dimensions() == (width, height) {
                overlay
            } else {
                resized = image::imageops::resize(overlay, width, height, FilterType::Nearest);
                &resized
            };
            for (dst, LumaA([v, a])) in out.pixels_mut().zip(overlay.pixels()) {
                if *a > 0 && *v >= self.overlay_threshold {
                    *dst = Luma([255]);
                }
            }
        }

        for object in scene.objects() {
            raster::paint_object(&mut out, object, object.intent().mask_value());
        }
        out
    }
}

pub fn encode_mask_png(mask: &GrayImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    mask.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// PNG data url, usable wherever the generation service expects an image reference.
pub fn mask_data_url(mask: &GrayImage) -> Result<String, image::ImageError> {
    let png = encode_mask_png(mask)?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png)
    ))
}

#[cfg(test)]
mod tests {
    use image::GrayAlphaImage;

    use super::*;
    use crate::mask::{CircleShape, Intent, MaskObject, Overlay, Point, RectangleShape};

    fn rect(x: f32, y: f32, w: f32, h: f32, intent: Intent) -> MaskObject {
        MaskObject::Rectangle(RectangleShape {
            origin: Point::new(x, y),
            width: w,
            height: h,
            intent,
        })
    }

    #[test]
    fn empty_scene_is_black() {
        let scene = Scene::new("house.jpg".into());
        let mask = MaskExporter::default().export(&scene, [16, 8]);
        assert_eq!(mask.dimensions(), (16, 8));
        assert!(mask.pixels().all(|p| p == &Luma([0])));
    }

    #[test]
    fn exclude_cuts_into_include() {
        let mut scene = Scene::new("house.jpg".into());
        scene.push(rect(0., 0., 10., 10., Intent::Include));
        scene.push(rect(2., 2., 2., 2., Intent::Exclude));
        let mask = MaskExporter::default().export(&scene, [10, 10]);
        assert_eq!(mask.get_pixel(0, 0), &Luma([255]));
        assert_eq!(mask.get_pixel(2, 2), &Luma([0]));
        assert_eq!(mask.get_pixel(4, 4), &Luma([255]));
    }

    #[test]
    fn manual_exclude_wins_over_overlay() {
        let mut scene = Scene::new("house.jpg".into());
        scene.set_overlay(Some(Overlay::new(GrayAlphaImage::from_pixel(
            10,
            10,
            LumaA([200, 255]),
        ))));
        scene.push(MaskObject::Circle(CircleShape {
            center: Point::new(5., 5.),
            radius: 1.,
            intent: Intent::Exclude,
        }));
        let mask = MaskExporter::default().export(&scene, [10, 10]);
        assert_eq!(mask.get_pixel(5, 5), &Luma([0]));
        assert_eq!(mask.get_pixel(0, 0), &Luma([255]));
    }

    #[test]
    fn overlay_below_threshold_is_ignored() {
        let mut scene = Scene::new("house.jpg".into());
        scene.set_overlay(Some(Overlay::new(GrayAlphaImage::from_pixel(
            4,
            4,
            LumaA([127, 255]),
        ))));
        let mask = MaskExporter::default().export(&scene, [4, 4]);
        assert!(mask.pixels().all(|p| p == &Luma([0])));
    }

    #[test]
    fn overlay_is_scaled_to_canvas() {
        let mut overlay = GrayAlphaImage::from_pixel(2, 2, LumaA([0, 255]));
        overlay.put_pixel(1, 1, LumaA([255, 255]));
        let mut scene = Scene::new("house.jpg".into());
        scene.set_overlay(Some(Overlay::new(overlay)));
        let mask = MaskExporter::default().export(&scene, [4, 4]);
        assert_eq!(mask.get_pixel(3, 3), &Luma([255]));
        assert_eq!(mask.get_pixel(0, 0), &Luma([0]));
    }

    #[test]
    fn data_url_is_png() {
        let url = mask_data_url(&GrayImage::new(2, 2)).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }
}
