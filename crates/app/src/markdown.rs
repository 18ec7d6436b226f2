//! Lightweight markdown rendering for generated guidance.
//!
//! Covers what the mentor actually produces: `#`..`####` headings, `-`/`*`
//! bullets, `1.` numbered items, `**bold**`, `` `code` `` and `[text](url)`
//! links. Parsing is kept separate from drawing so it can be tested without
//! a UI context.

use eframe::egui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    Bold(&'a str),
    Code(&'a str),
    Link { text: &'a str, url: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Blank,
    Heading { level: u8, text: &'a str },
    Bullet(Vec<Span<'a>>),
    Numbered { marker: &'a str, spans: Vec<Span<'a>> },
    Paragraph(Vec<Span<'a>>),
}

pub fn parse_blocks(text: &str) -> Vec<Block<'_>> {
    text.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> Block<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Blank;
    }

    for (prefix, level) in [("#### ", 4), ("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return Block::Heading { level, text: rest };
        }
    }

    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Block::Bullet(parse_spans(rest));
    }

    if let Some(dot) = trimmed.find(". ") {
        let marker = &trimmed[..dot];
        if !marker.is_empty() && marker.len() <= 3 && marker.chars().all(|c| c.is_ascii_digit()) {
            return Block::Numbered {
                marker,
                spans: parse_spans(&trimmed[dot + 2..]),
            };
        }
    }

    Block::Paragraph(parse_spans(trimmed))
}

/// Split a line into inline spans. Unclosed markers are kept as plain text.
pub fn parse_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((pos, kind)) = find_next_marker(remaining) else {
            spans.push(Span::Text(remaining));
            break;
        };
        if pos > 0 {
            spans.push(Span::Text(&remaining[..pos]));
        }
        let rest = &remaining[pos..];

        let parsed = match kind {
            MarkerKind::Bold => rest[2..]
                .find("**")
                .map(|end| (Span::Bold(&rest[2..2 + end]), 2 + end + 2)),
            MarkerKind::Code => rest[1..]
                .find('`')
                .map(|end| (Span::Code(&rest[1..1 + end]), 1 + end + 1)),
            MarkerKind::Link => rest.find("](").and_then(|close| {
                rest[close + 2..].find(')').map(|paren| {
                    let url_end = close + 2 + paren;
                    (
                        Span::Link {
                            text: &rest[1..close],
                            url: &rest[close + 2..url_end],
                        },
                        url_end + 1,
                    )
                })
            }),
        };

        match parsed {
            Some((span, consumed)) => {
                spans.push(span);
                remaining = &rest[consumed..];
            }
            None => {
                spans.push(Span::Text(rest));
                break;
            }
        }
    }

    spans
}

#[derive(Debug, Clone, Copy)]
enum MarkerKind {
    Bold, // **
    Code, // `
    Link, // [
}

fn find_next_marker(text: &str) -> Option<(usize, MarkerKind)> {
    let candidates = [
        text.find("**").map(|p| (p, MarkerKind::Bold)),
        text.find('`').map(|p| (p, MarkerKind::Code)),
        // Only treat as link if followed by ]( somewhere
        text.find('[')
            .filter(|p| text[*p..].contains("]("))
            .map(|p| (p, MarkerKind::Link)),
    ];
    candidates.into_iter().flatten().min_by_key(|(p, _)| *p)
}

/// Render markdown text into an egui UI region.
pub fn render_markdown(ui: &mut egui::Ui, text: &str, base_color: egui::Color32) {
    for block in parse_blocks(text) {
        match block {
            Block::Blank => ui.add_space(6.0),
            Block::Heading { level, text } => {
                let size = match level {
                    1 => 18.0,
                    2 => 16.0,
                    3 => 15.0,
                    _ => 14.0,
                };
                ui.add_space(6.0);
                ui.label(egui::RichText::new(text).strong().size(size).color(base_color));
                ui.add_space(2.0);
            }
            Block::Bullet(spans) => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("  •  ").color(base_color));
                    render_spans(ui, &spans, base_color);
                });
            }
            Block::Numbered { marker, spans } => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(format!("  {}. ", marker)).color(base_color));
                    render_spans(ui, &spans, base_color);
                });
            }
            Block::Paragraph(spans) => {
                ui.horizontal_wrapped(|ui| render_spans(ui, &spans, base_color));
            }
        }
    }
}

fn render_spans(ui: &mut egui::Ui, spans: &[Span<'_>], base_color: egui::Color32) {
    let link_color = egui::Color32::from_rgb(37, 99, 235);
    for span in spans {
        match span {
            Span::Text(t) => {
                ui.label(egui::RichText::new(*t).color(base_color));
            }
            Span::Bold(t) => {
                ui.label(egui::RichText::new(*t).strong().color(base_color));
            }
            Span::Code(t) => {
                ui.label(egui::RichText::new(*t).monospace().color(base_color));
            }
            Span::Link { text, url } => {
                ui.add(egui::Hyperlink::from_label_and_url(
                    egui::RichText::new(*text).color(link_color).underline(),
                    *url,
                ))
                .on_hover_text(*url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kinds() {
        let blocks = parse_blocks("## Month 1\n\n- Learn **Rust**\n2. Build a CLI\nPlain text");
        assert_eq!(blocks[0], Block::Heading { level: 2, text: "Month 1" });
        assert_eq!(blocks[1], Block::Blank);
        assert_eq!(
            blocks[2],
            Block::Bullet(vec![Span::Text("Learn "), Span::Bold("Rust")])
        );
        assert!(matches!(blocks[3], Block::Numbered { marker: "2", .. }));
        assert_eq!(blocks[4], Block::Paragraph(vec![Span::Text("Plain text")]));
    }

    #[test]
    fn test_inline_spans() {
        let spans = parse_spans("Read [The Book](https://doc.rust-lang.org/book/) and run `cargo new`");
        assert_eq!(
            spans,
            vec![
                Span::Text("Read "),
                Span::Link {
                    text: "The Book",
                    url: "https://doc.rust-lang.org/book/"
                },
                Span::Text(" and run "),
                Span::Code("cargo new"),
            ]
        );
    }

    #[test]
    fn test_unclosed_markers_stay_text() {
        assert_eq!(
            parse_spans("a **b"),
            vec![Span::Text("a "), Span::Text("**b")]
        );
        assert_eq!(parse_spans("`open"), vec![Span::Text("`open")]);
    }

    #[test]
    fn test_sentence_with_period_is_paragraph() {
        assert!(matches!(
            parse_line("Focus on SQL. Then Python."),
            Block::Paragraph(_)
        ));
    }
}
