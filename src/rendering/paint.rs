/// Display list for the offline renderer

use super::layout::LayoutNode;
use crate::Viewport;
use scraper::Html;

pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
}

/// Background fill followed by one text run per laid out block.
pub fn build_display_list(nodes: &[LayoutNode], viewport: Viewport, background: Rgba) -> Vec<PaintCommand> {
    let mut commands = Vec::with_capacity(nodes.len() + 1);
    commands.push(PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: viewport.width,
        height: viewport.height,
        rgba: background,
    });

    for node in nodes {
        let inset = (node.lb.box_model.border + node.lb.box_model.padding) as i32;
        commands.push(PaintCommand::Text {
            x: node.lb.rect.x + inset,
            y: node.lb.rect.y + inset,
            text: node.text.clone(),
            scale: node.scale,
            rgba: BLACK,
        });
    }
    commands
}

/// Page background from `<body bgcolor>` or an inline `background(-color)`; white otherwise.
pub fn page_background(document: &Html) -> Rgba {
    let body = document
        .root_element()
        .descendants()
        .filter_map(scraper::ElementRef::wrap)
        .find(|e| e.value().name() == "body");
    let Some(body) = body else {
        return WHITE;
    };

    if let Some(style) = body.value().attr("style") {
        for decl in style.split(';') {
            let Some((prop, value)) = decl.split_once(':') else {
                continue;
            };
            let prop = prop.trim().to_ascii_lowercase();
            if prop == "background" || prop == "background-color" {
                if let Some(color) = value.split_whitespace().find_map(parse_hex_color) {
                    return color;
                }
            }
        }
    }

    body.value()
        .attr("bgcolor")
        .and_then(parse_hex_color)
        .unwrap_or(WHITE)
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<Rgba> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b, 255])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::layout_document;

    #[test]
    fn display_list_starts_with_background() {
        let doc = Html::parse_document("<p>Hello</p>");
        let v = Viewport { width: 64, height: 32 };
        let nodes = layout_document(&doc, v);
        let cmds = build_display_list(&nodes, v, WHITE);
        match &cmds[0] {
            PaintCommand::SolidRect { width, height, rgba, .. } => {
                assert_eq!((*width, *height), (64, 32));
                assert_eq!(*rgba, WHITE);
            }
            other => panic!("unexpected first command {:?}", other),
        }
        assert!(matches!(&cmds[1], PaintCommand::Text { text, .. } if text == "Hello"));
    }

    #[test]
    fn background_comes_from_body() {
        let styled = Html::parse_document(r#"<body style="margin:0; background-color: #336699">x</body>"#);
        assert_eq!(page_background(&styled), [0x33, 0x66, 0x99, 255]);
        let legacy = Html::parse_document(r##"<body bgcolor="#fff">x</body>"##);
        assert_eq!(page_background(&legacy), WHITE);
        let plain = Html::parse_document("<p>x</p>");
        assert_eq!(page_background(&plain), WHITE);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#000"), Some(BLACK));
        assert_eq!(parse_hex_color("#FF8000"), Some([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
