//! Generate an HTML/SVG visualization of the Planka keymap.
//! One grid per layer; keys that fall through show the base layer's label.

use planka_keymap::planka::{layer_name, KEYMAP};
use planka_keymap::{Action, BitOp, Keycode, COLS, ROWS};

/// Physical key position and size for SVG rendering.
struct Key {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    row: usize,
    col: usize,
}

/// Key unit size in SVG pixels.
const U: f64 = 54.0;
/// Gap between keys.
const GAP: f64 = 4.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 4.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;

/// Bottom row positions without a switch.
const HOLES: [usize; 2] = [5, 8];
/// Bottom row keys widened to 1.5u to cover the holes.
const WIDE: [usize; 4] = [4, 6, 7, 9];

/// Build all physical key positions: a plain grid, except for the bottom
/// row where four 1.5u keys take the place of six columns.
fn build_keys() -> Vec<Key> {
    let mut keys = Vec::new();

    for row in 0..ROWS - 1 {
        for col in 0..COLS {
            keys.push(Key {
                x: col as f64 * S,
                y: row as f64 * S,
                w: U,
                h: U,
                row,
                col,
            });
        }
    }

    let row = ROWS - 1;
    let mut x = 0.0;
    for col in (0..COLS).filter(|col| !HOLES.contains(col)) {
        let units = if WIDE.contains(&col) { 1.5 } else { 1.0 };
        keys.push(Key {
            x,
            y: row as f64 * S,
            w: units * S - GAP,
            h: U,
            row,
            col,
        });
        x += units * S;
    }

    keys
}

/// Compute the bounding box of all keys: (max_x + w, max_y + h).
fn bbox(keys: &[Key]) -> (f64, f64) {
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    for k in keys {
        max_x = max_x.max(k.x + k.w);
        max_y = max_y.max(k.y + k.h);
    }
    (max_x, max_y)
}

/// Label for a fn key: what its action does.
fn fn_label(action: Action) -> String {
    match action {
        Action::LayerBitOp { op, part, bits, .. } => {
            let sign = match op {
                BitOp::Xor => "^",
                BitOp::Or => "+",
                BitOp::And => "&",
            };
            format!("L{sign}{:X}", u32::from(bits) << (4 * part))
        }
        Action::LayerMomentary(layer) => format!("L{layer}"),
        Action::DefaultLayerSet(layer) => layer_name(usize::from(layer))
            .map(|name| name.chars().take(4).collect())
            .unwrap_or_else(|| format!("D{layer}")),
        Action::ModsKey(_, kc) => format!("S-{}", kc.display_name()),
        Action::ModsTapKey(_, kc) => format!("{}/A", kc.display_name()),
        Action::Key(kc) => kc.display_name().to_string(),
        Action::Transparent => String::new(),
    }
}

/// Render a single layer as an SVG group.
fn render_layer(keys: &[Key], layer_idx: usize, y_offset: f64) -> String {
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<g transform="translate({MARGIN}, {y_offset})">"#
    ));

    // Layer title
    svg.push_str(&format!(
        r#"<text x="0" y="-10" class="layer-title">Layer {layer_idx} ({})</text>"#,
        layer_name(layer_idx).unwrap_or("?")
    ));

    for key in keys {
        let kc = KEYMAP.keycode(layer_idx, key.row, key.col);
        let is_transparent = kc.is_transparent();

        // Transparent keys show what the base layer does there
        let shown_layer = if is_transparent { 0 } else { layer_idx };
        let shown = KEYMAP.lookup(layer_idx, shown_layer, key.row, key.col);
        let label = if shown.fn_index().is_some() {
            fn_label(KEYMAP.action_for_key(shown_layer, key.row, key.col))
        } else {
            shown.display_name().to_string()
        };

        let key_class = if kc == Keycode::No {
            "key unused"
        } else if is_transparent {
            "key transparent"
        } else if kc.fn_index().is_some() {
            "key layer"
        } else if kc.is_modifier() {
            "key modifier"
        } else {
            "key"
        };

        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{R}" class="{key_class}"/>"#,
            key.x, key.y, key.w, key.h,
        ));

        if !label.is_empty() {
            let font_class = if label.chars().count() > 3 { " small" } else { "" };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
                key.x + key.w / 2.0,
                key.y + key.h / 2.0 + 1.0,
                html_escape(&label),
            ));
        }
    }

    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html() -> String {
    let keys = build_keys();
    let (content_w, content_h) = bbox(&keys);
    let layer_height = content_h + 60.0;
    let layers: Vec<usize> = KEYMAP
        .layers()
        .iter()
        .enumerate()
        .filter_map(|(idx, layer)| layer.as_ref().map(|_| idx))
        .collect();
    let total_width = content_w + 2.0 * MARGIN;
    let total_height = layers.len() as f64 * layer_height + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Planka Layout</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .key.unused {{
    fill: #0d1117;
    stroke: #21262d;
    stroke-dasharray: 3 3;
  }}
  .key.transparent {{
    fill: #1a1a2e;
    stroke: #30365e;
    stroke-dasharray: 2 2;
  }}
  .key.layer {{
    fill: #2d1b4e;
    stroke: #e94560;
    stroke-width: 2;
  }}
  .key.modifier {{
    fill: #1b2e4e;
    stroke: #53a8b6;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 13px;
    text-anchor: middle;
    dominant-baseline: middle;
    pointer-events: none;
  }}
  .label.small {{
    font-size: 10px;
  }}
  .layer-title {{
    fill: #e94560;
    font-size: 16px;
    font-weight: bold;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    for (slot, &layer_idx) in layers.iter().enumerate() {
        let y_offset = MARGIN + slot as f64 * layer_height + 30.0;
        html.push_str(&render_layer(&keys, layer_idx, y_offset));
        html.push('\n');
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_row_spans_the_full_width() {
        let keys = build_keys();
        assert_eq!(keys.len(), (ROWS - 1) * COLS + COLS - HOLES.len());
        let (w, _) = bbox(&keys);
        let last = keys.last().unwrap();
        assert_eq!(last.col, COLS - 1);
        assert!((last.x + last.w - w).abs() < 1e-9);
        assert!((w - (COLS as f64 * S - GAP)).abs() < 1e-9);
    }

    #[test]
    fn every_layer_but_the_hole_is_drawn() {
        let html = generate_html();
        assert_eq!(html.matches("class=\"layer-title\"").count(), 7);
        assert!(html.contains("Layer 6 (Fn1+Fn2)"));
        assert!(!html.contains("Layer 3"));
    }

    #[test]
    fn fn_keys_are_labelled_by_action() {
        assert_eq!(fn_label(KEYMAP.action_for_key(0, 1, 0)), "Tab/A");
        assert_eq!(fn_label(KEYMAP.action_for_key(0, 4, 4)), "L^10");
        assert_eq!(fn_label(KEYMAP.action_for_key(6, 0, 2)), "Dvor");
        assert_eq!(html_escape("<>"), "&lt;&gt;");
    }
}
