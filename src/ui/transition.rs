use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::EffectChoice;
use crate::loader::DecodedImage;
use crate::ui::render::{centered_origin, unpack_rgb, Canvas, Rect, BG_COLOR};

/// Edge length of the dissolve tiles, in surface pixels.
pub const TILE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Fade,
    Dissolve,
    Paint,
    Roll,
}

pub const EFFECTS: [Effect; 4] = [Effect::Fade, Effect::Dissolve, Effect::Paint, Effect::Roll];

/// Corner the paint reveal starts from; it sweeps toward the opposite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagonal {
    FromTopLeft,
    FromTopRight,
    FromBottomLeft,
    FromBottomRight,
}

impl Diagonal {
    const ALL: [Diagonal; 4] = [
        Diagonal::FromTopLeft,
        Diagonal::FromTopRight,
        Diagonal::FromBottomLeft,
        Diagonal::FromBottomRight,
    ];

    fn from_bottom(self) -> bool {
        matches!(self, Diagonal::FromBottomLeft | Diagonal::FromBottomRight)
    }

    fn from_right(self) -> bool {
        matches!(self, Diagonal::FromTopRight | Diagonal::FromBottomRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollDirection {
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl RollDirection {
    const ALL: [RollDirection; 4] = [
        RollDirection::TopToBottom,
        RollDirection::BottomToTop,
        RollDirection::LeftToRight,
        RollDirection::RightToLeft,
    ];
}

/// Everything a transition decides up front, reused for each of its frames.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionState {
    Fade,
    /// Surface tiles in reveal order.
    Dissolve { tiles: Vec<Rect> },
    Paint { diagonal: Diagonal },
    Roll { direction: RollDirection },
}

impl TransitionState {
    /// Resolve `choice` (drawing from `rng` for `Random` and for directions)
    /// for a surface of `width` x `height`.
    pub fn begin<R: Rng>(choice: EffectChoice, rng: &mut R, width: u32, height: u32) -> Self {
        let effect = match choice {
            EffectChoice::Fade => Effect::Fade,
            EffectChoice::Dissolve => Effect::Dissolve,
            EffectChoice::Paint => Effect::Paint,
            EffectChoice::Roll => Effect::Roll,
            EffectChoice::Random => EFFECTS[rng.random_range(0..EFFECTS.len())],
        };

        let state = match effect {
            Effect::Fade => TransitionState::Fade,
            Effect::Dissolve => {
                let mut tiles = tile_grid(width, height, TILE_SIZE);
                tiles.shuffle(rng);
                TransitionState::Dissolve { tiles }
            }
            Effect::Paint => TransitionState::Paint {
                diagonal: Diagonal::ALL[rng.random_range(0..4)],
            },
            Effect::Roll => TransitionState::Roll {
                direction: RollDirection::ALL[rng.random_range(0..4)],
            },
        };
        log::debug!("Transition: {}", state.describe());
        state
    }

    fn describe(&self) -> String {
        match self {
            TransitionState::Fade => "fade".to_string(),
            TransitionState::Dissolve { tiles } => format!("dissolve ({} tiles)", tiles.len()),
            TransitionState::Paint { diagonal } => format!("paint {:?}", diagonal),
            TransitionState::Roll { direction } => format!("roll {:?}", direction),
        }
    }

    /// Compose one frame. `progress` 0 shows only `current`, 1 only `next`.
    pub fn render(
        &self,
        canvas: &mut Canvas,
        current: Option<&DecodedImage>,
        next: &DecodedImage,
        progress: f32,
    ) {
        let progress = progress.clamp(0.0, 1.0);
        let (current_alpha, next_alpha) = fade_alphas(progress);
        canvas.clear(BG_COLOR);

        match self {
            TransitionState::Fade => {
                if let Some(cur) = current {
                    canvas.blit_centered(cur, current_alpha);
                }
                canvas.blit_centered(next, next_alpha);
            }
            TransitionState::Dissolve { tiles } => {
                if let Some(cur) = current {
                    canvas.blit_centered(cur, 255);
                }
                render_dissolve(canvas, next, tiles, progress);
            }
            TransitionState::Paint { diagonal } => {
                if let Some(cur) = current {
                    canvas.blit_centered(cur, current_alpha);
                }
                render_paint(canvas, next, *diagonal, progress);
            }
            TransitionState::Roll { direction } => {
                if let Some(cur) = current {
                    canvas.blit_centered(cur, current_alpha);
                }
                let (x, y) = roll_origin(canvas, next, *direction, progress);
                canvas.blit(next, x, y, next_alpha);
            }
        }
    }
}

/// Opacity of (current, next) at `progress`. They always sum to 255.
pub fn fade_alphas(progress: f32) -> (u8, u8) {
    let next = (255.0 * progress.clamp(0.0, 1.0)).round() as u8;
    (255 - next, next)
}

/// Split the surface into `size` x `size` tiles, clipped at the right and
/// bottom edges, in row-major order.
pub fn tile_grid(width: u32, height: u32, size: u32) -> Vec<Rect> {
    let mut tiles = Vec::new();
    for y in (0..height).step_by(size as usize) {
        for x in (0..width).step_by(size as usize) {
            tiles.push(Rect::new(
                x as i32,
                y as i32,
                size.min(width - x),
                size.min(height - y),
            ));
        }
    }
    tiles
}

fn render_dissolve(canvas: &mut Canvas, next: &DecodedImage, tiles: &[Rect], progress: f32) {
    let revealed = ((tiles.len() as f32 * progress).floor() as usize).min(tiles.len());
    let (nx, ny) = centered_origin(next.width, next.height, canvas.width(), canvas.height());
    let next_rect = Rect::new(nx, ny, next.width, next.height);
    let bg = unpack_rgb(BG_COLOR);

    for tile in &tiles[..revealed] {
        // A tile shows the finished frame: next where it has pixels,
        // background around it.
        canvas.fill_rect(*tile, bg, 255);
        if let Some(part) = tile.intersect(&next_rect) {
            let src = Rect::new(part.x - nx, part.y - ny, part.w, part.h);
            canvas.blit_region(next, src, part.x, part.y, 255);
        }
    }
}

fn render_paint(canvas: &mut Canvas, next: &DecodedImage, diagonal: Diagonal, progress: f32) {
    let (sw, sh) = (canvas.width() as i32, canvas.height() as i32);
    let (nx, ny) = centered_origin(next.width, next.height, canvas.width(), canvas.height());
    let reach = progress * (sw + sh) as f32;

    for row in 0..next.height {
        let sy = ny + row as i32;
        if sy < 0 || sy >= sh {
            continue;
        }
        let offset = if diagonal.from_bottom() { sh - 1 - sy } else { sy };
        let cutoff = reach - offset as f32;
        if cutoff <= 0.0 {
            continue;
        }
        // Columns whose distance from the starting side is below the cutoff.
        let span = (cutoff.ceil() as i64).min(sw as i64) as i32;
        let (from, to) = if diagonal.from_right() {
            (sw - span, sw)
        } else {
            (0, span)
        };

        let x0 = from.max(nx);
        let x1 = to.min(nx + next.width as i32);
        if x1 <= x0 {
            continue;
        }
        let src = Rect::new(x0 - nx, row as i32, (x1 - x0) as u32, 1);
        canvas.blit_region(next, src, x0, sy, 255);
    }
}

fn roll_origin(canvas: &Canvas, next: &DecodedImage, direction: RollDirection, progress: f32) -> (i32, i32) {
    let (cx, cy) = centered_origin(next.width, next.height, canvas.width(), canvas.height());
    let lerp = |from: f32, to: i32| (from + (to as f32 - from) * progress).round() as i32;
    match direction {
        RollDirection::TopToBottom => (cx, lerp(-(next.height as f32), cy)),
        RollDirection::BottomToTop => (cx, lerp(canvas.height() as f32, cy)),
        RollDirection::LeftToRight => (lerp(-(next.width as f32), cx), cy),
        RollDirection::RightToLeft => (lerp(canvas.width() as f32, cx), cy),
    }
}
