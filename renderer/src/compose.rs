use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCALE_FACTOR: f32 = 0.2;
pub const DEFAULT_MASK_DILATION_PERCENT: f32 = 0.30;

/// A source image the mockup editor has already measured.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// User-chosen compositing inputs: fixture center positions on the daytime
/// photo plus the knobs the editor exposes.
#[derive(Debug, Clone, Deserialize)]
pub struct CompositionSpec {
    pub coordinates: Vec<Point>,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,
    #[serde(default = "default_apply_night_filter")]
    pub apply_night_filter: bool,
    #[serde(default = "default_mask_dilation_percent")]
    pub mask_dilation_percent: f32,
}

fn default_scale_factor() -> f32 {
    DEFAULT_SCALE_FACTOR
}

fn default_apply_night_filter() -> bool {
    true
}

fn default_mask_dilation_percent() -> f32 {
    DEFAULT_MASK_DILATION_PERCENT
}

/// One fixture paste: top-left corner and scaled size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// A dilated white rectangle of the inpainting mask, clipped to the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaskRegion {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

/// Everything the inpainting vendor needs to rebuild the composite and the
/// mask: night filter toggle, fixture placements, dilated mask regions and
/// the blur radius that softens their edges.
#[derive(Debug, Clone, Serialize)]
pub struct CompositePlan {
    pub apply_night_filter: bool,
    pub placements: Vec<Placement>,
    pub mask_regions: Vec<MaskRegion>,
    pub mask_blur_radius: u32,
}

/// Scales the fixture by `scale_factor`, preserving aspect ratio and never
/// collapsing below one pixel.
pub fn scaled_fixture_size(width: u32, height: u32, scale_factor: f32) -> (u32, u32) {
    let w = ((width as f32 * scale_factor) as u32).max(1);
    let h = ((height as f32 * scale_factor) as u32).max(1);
    (w, h)
}

/// Converts a fixture center to a top-left corner, clamped inside the photo.
pub fn clamp_placement(center: Point, fw: u32, fh: u32, photo_w: u32, photo_h: u32) -> Point {
    let x = (center.x - fw as i64 / 2)
        .min(photo_w as i64 - fw as i64)
        .max(0);
    let y = (center.y - fh as i64 / 2)
        .min(photo_h as i64 - fh as i64)
        .max(0);
    Point { x, y }
}

/// Computes the full composite/mask plan for one render request.
pub fn build_plan(
    photo: &ImageRef,
    fixture: &ImageRef,
    spec: &CompositionSpec,
) -> Res<CompositePlan> {
    if spec.coordinates.is_empty() {
        return Err(AppError::BadRequest(
            "At least one fixture coordinate is required".to_string(),
        ));
    }
    if !(spec.scale_factor > 0.0 && spec.scale_factor <= 1.0) {
        return Err(AppError::BadRequest(
            "scale_factor must be within (0, 1]".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&spec.mask_dilation_percent) {
        return Err(AppError::BadRequest(
            "mask_dilation_percent must be within [0, 1]".to_string(),
        ));
    }
    if photo.width == 0 || photo.height == 0 || fixture.width == 0 || fixture.height == 0 {
        return Err(AppError::BadRequest(
            "Image dimensions must be non-zero".to_string(),
        ));
    }

    let (fw, fh) = scaled_fixture_size(fixture.width, fixture.height, spec.scale_factor);

    // Dilation padding on each side of the fixture footprint.
    let pad_x = (fw as f32 * spec.mask_dilation_percent / 2.0) as i64;
    let pad_y = (fh as f32 * spec.mask_dilation_percent / 2.0) as i64;

    let mut placements = Vec::with_capacity(spec.coordinates.len());
    let mut mask_regions = Vec::with_capacity(spec.coordinates.len());

    for center in &spec.coordinates {
        let top_left = clamp_placement(*center, fw, fh, photo.width, photo.height);
        placements.push(Placement {
            x: top_left.x,
            y: top_left.y,
            width: fw,
            height: fh,
        });
        mask_regions.push(MaskRegion {
            x0: (top_left.x - pad_x).max(0),
            y0: (top_left.y - pad_y).max(0),
            x1: (top_left.x + fw as i64 + pad_x).min(photo.width as i64),
            y1: (top_left.y + fh as i64 + pad_y).min(photo.height as i64),
        });
    }

    // Soft mask edges help the model blend the glow naturally.
    let mask_blur_radius = (pad_x.max(pad_y) / 2).max(1) as u32;

    Ok(CompositePlan {
        apply_night_filter: spec.apply_night_filter,
        placements,
        mask_regions,
        mask_blur_radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> ImageRef {
        ImageRef {
            url: "https://cdn.lumascape.dev/house.jpg".to_string(),
            width: 800,
            height: 600,
        }
    }

    fn fixture() -> ImageRef {
        ImageRef {
            url: "https://cdn.lumascape.dev/fixture.png".to_string(),
            width: 100,
            height: 100,
        }
    }

    fn spec(coordinates: Vec<Point>) -> CompositionSpec {
        CompositionSpec {
            coordinates,
            scale_factor: 0.2,
            apply_night_filter: true,
            mask_dilation_percent: 0.30,
        }
    }

    #[test]
    fn spec_defaults_apply_when_omitted() {
        let spec: CompositionSpec =
            serde_json::from_str(r#"{"coordinates":[{"x":280,"y":490}]}"#).unwrap();
        assert_eq!(spec.scale_factor, DEFAULT_SCALE_FACTOR);
        assert!(spec.apply_night_filter);
        assert_eq!(spec.mask_dilation_percent, DEFAULT_MASK_DILATION_PERCENT);
    }

    #[test]
    fn fixture_scales_with_aspect_ratio() {
        assert_eq!(scaled_fixture_size(100, 100, 0.2), (20, 20));
        assert_eq!(scaled_fixture_size(100, 50, 0.5), (50, 25));
    }

    #[test]
    fn fixture_never_scales_below_one_pixel() {
        assert_eq!(scaled_fixture_size(3, 3, 0.1), (1, 1));
    }

    #[test]
    fn center_converts_to_clamped_top_left() {
        // 100x100 fixture at scale 0.2 -> 20x20 footprint.
        assert_eq!(
            clamp_placement(Point { x: 280, y: 490 }, 20, 20, 800, 600),
            Point { x: 270, y: 480 }
        );
        assert_eq!(
            clamp_placement(Point { x: 5, y: 5 }, 20, 20, 800, 600),
            Point { x: 0, y: 0 }
        );
        assert_eq!(
            clamp_placement(Point { x: 799, y: 599 }, 20, 20, 800, 600),
            Point { x: 780, y: 580 }
        );
    }

    #[test]
    fn oversized_fixture_pins_to_origin() {
        assert_eq!(
            clamp_placement(Point { x: 5, y: 5 }, 20, 20, 10, 10),
            Point { x: 0, y: 0 }
        );
    }

    #[test]
    fn plan_dilates_and_clips_mask_regions() {
        let plan = build_plan(&photo(), &fixture(), &spec(vec![Point { x: 280, y: 490 }])).unwrap();

        assert_eq!(plan.placements.len(), 1);
        assert_eq!(
            plan.placements[0],
            Placement {
                x: 270,
                y: 480,
                width: 20,
                height: 20
            }
        );
        // 30% of a 20px footprint -> 3px of padding per side.
        assert_eq!(
            plan.mask_regions[0],
            MaskRegion {
                x0: 267,
                y0: 477,
                x1: 293,
                y1: 503
            }
        );
        assert_eq!(plan.mask_blur_radius, 1);
        assert!(plan.apply_night_filter);
    }

    #[test]
    fn mask_regions_never_leave_the_photo() {
        let plan = build_plan(
            &photo(),
            &fixture(),
            &spec(vec![Point { x: 0, y: 0 }, Point { x: 800, y: 600 }]),
        )
        .unwrap();

        for region in &plan.mask_regions {
            assert!(region.x0 >= 0 && region.y0 >= 0);
            assert!(region.x1 <= 800 && region.y1 <= 600);
        }
    }

    #[test]
    fn blur_radius_floors_at_one() {
        let mut spec = spec(vec![Point { x: 280, y: 490 }]);
        spec.mask_dilation_percent = 0.0;
        let plan = build_plan(&photo(), &fixture(), &spec).unwrap();
        assert_eq!(plan.mask_blur_radius, 1);
    }

    #[test]
    fn plan_rejects_bad_inputs() {
        assert!(build_plan(&photo(), &fixture(), &spec(vec![])).is_err());

        let mut bad_scale = spec(vec![Point { x: 1, y: 1 }]);
        bad_scale.scale_factor = 0.0;
        assert!(build_plan(&photo(), &fixture(), &bad_scale).is_err());
        bad_scale.scale_factor = 1.5;
        assert!(build_plan(&photo(), &fixture(), &bad_scale).is_err());

        let mut bad_dilation = spec(vec![Point { x: 1, y: 1 }]);
        bad_dilation.mask_dilation_percent = -0.1;
        assert!(build_plan(&photo(), &fixture(), &bad_dilation).is_err());

        let mut flat = photo();
        flat.width = 0;
        assert!(build_plan(&flat, &fixture(), &spec(vec![Point { x: 1, y: 1 }])).is_err());
    }
}
