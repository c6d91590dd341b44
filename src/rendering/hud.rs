/// Screen-space overlays: inverting crosshair and a tiny 3x5 bitmap font
/// for debug text.
use super::framebuffer::Framebuffer;

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
/// Horizontal advance per character, before scaling.
const ADVANCE: i32 = GLYPH_WIDTH + 1;
const LINE_HEIGHT: i32 = GLYPH_HEIGHT + 2;

/// Rows of a glyph, top to bottom; bit 2 is the leftmost pixel.
type Glyph = [u8; 5];

const UNKNOWN: Glyph = [0b111, 0b001, 0b010, 0b000, 0b010];

fn glyph(c: char) -> Glyph {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        ' ' => [0; 5],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        _ => UNKNOWN,
    }
}

/// Invert the pixels of a `+` centred on the image, `arm` pixels each way.
pub fn draw_crosshair(fb: &mut Framebuffer, arm: i32) {
    if fb.width == 0 || fb.height == 0 {
        return;
    }
    let cx = (fb.width / 2) as i32;
    let cy = (fb.height / 2) as i32;

    for dx in -arm..=arm {
        fb.invert_pixel(cx + dx, cy);
    }
    for dy in -arm..=arm {
        // Centre pixel already inverted by the horizontal bar.
        if dy != 0 {
            fb.invert_pixel(cx, cy + dy);
        }
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        0
    } else {
        (n * ADVANCE - 1) * scale
    }
}

/// Draw one line of text with its top-left corner at `(x, y)`.
pub fn draw_text(fb: &mut Framebuffer, x: i32, y: i32, text: &str, color: u32, scale: i32) {
    let scale = scale.max(1);
    let mut pen_x = x;
    for c in text.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                let px = pen_x + col * scale;
                let py = y + row as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        fb.set_pixel_no_depth(px + sx, py + sy, color);
                    }
                }
            }
        }
        pen_x += ADVANCE * scale;
    }
}

/// Draw lines of text from the top-left corner with a one-pixel shadow so
/// they stay readable on any background.
pub fn draw_text_block(fb: &mut Framebuffer, lines: &[String], color: u32, shadow: u32, scale: i32) {
    let scale = scale.max(1);
    let margin = 2 * scale;
    for (i, line) in lines.iter().enumerate() {
        let y = margin + i as i32 * LINE_HEIGHT * scale;
        draw_text(fb, margin + scale, y + scale, line, shadow, scale);
        draw_text(fb, margin, y, line, color, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosshair_inverts_each_pixel_once() {
        let mut fb = Framebuffer::new(21, 21);
        fb.clear(0xFF00_0000);
        draw_crosshair(&mut fb, 4);
        let inverted = fb.color_buffer.iter().filter(|c| **c == 0xFFFF_FFFF).count();
        assert_eq!(inverted, 17);
        assert_eq!(fb.pixel(10, 10), 0xFFFF_FFFF);

        // Drawing it twice restores the image.
        draw_crosshair(&mut fb, 4);
        assert!(fb.color_buffer.iter().all(|c| *c == 0xFF00_0000));
    }

    #[test]
    fn text_is_drawn_in_its_box() {
        let mut fb = Framebuffer::new(40, 10);
        fb.clear(0);
        draw_text(&mut fb, 1, 1, "HI 7", 5, 1);
        let width = text_width("HI 7", 1);
        assert_eq!(width, 15);
        for y in 0..10 {
            for x in 0..40 {
                let inside = (1..1 + width as usize).contains(&x) && (1..6).contains(&y);
                if !inside {
                    assert_eq!(fb.pixel(x, y), 0, "stray pixel at {x},{y}");
                }
            }
        }
        assert!(fb.color_buffer.iter().any(|c| *c == 5));
    }

    #[test]
    fn unknown_characters_fall_back() {
        assert_eq!(glyph('~'), UNKNOWN);
        assert_eq!(glyph('a'), glyph('A'));
    }
}
