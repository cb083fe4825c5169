//! Approximate block/flex layout over a parsed document.
//!
//! This is not a CSS engine: block boxes stack vertically at the width of
//! their container, inline content flows in word-wrapped lines, and flex rows
//! place items side by side. The output is the same snapshot a browser
//! backend produces, so the rest of the pipeline cannot tell them apart.

use scraper::{ElementRef, Html, Node};

use super::style::{BoxStyle, Display, Edges, Font, Length};
use crate::snapshot::{ComputedStyle, LayoutSnapshot, Rect, SnapshotElement, SnapshotNode};
use crate::{Error, Result, Viewport};

pub struct LayoutEngine {
    viewport: Viewport,
    body_padding: f64,
    max_depth: usize,
}

/// Open line in an inline formatting context.
struct Line {
    x: f64,
    top: f64,
    height: f64,
    used: bool,
}

impl Line {
    fn new(start: f64, top: f64) -> Self {
        Self { x: start, top, height: 0.0, used: false }
    }

    fn bottom(&self) -> f64 {
        if self.used {
            self.top + self.height
        } else {
            self.top
        }
    }
}

fn style_of(el: ElementRef<'_>, font: Font) -> BoxStyle {
    let v = el.value();
    BoxStyle::resolve(v.name(), v.attr("class"), v.attr("style"), |n| v.attr(n).map(str::to_string), font)
}

fn text_width(text: &str, font: Font) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let chars: usize = words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len() - 1;
    chars as f64 * font.char_width()
}

fn translate(el: &mut SnapshotElement, dx: f64, dy: f64) {
    el.rect.x += dx;
    el.rect.y += dy;
    for child in el.children.iter_mut() {
        if let SnapshotNode::Element(c) = child {
            translate(c, dx, dy);
        }
    }
}

impl LayoutEngine {
    pub fn new(viewport: Viewport, body_padding: f64, max_depth: usize) -> Self {
        Self { viewport, body_padding, max_depth }
    }

    /// Lay out the `<body>` of `document`.
    pub fn layout_document(&self, document: &Html) -> Result<LayoutSnapshot> {
        let body = document
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "body")
            .ok_or_else(|| Error::Acquisition("document has no body".into()))?;

        let mut style = style_of(body, Font::BASE);
        style.padding = Edges::all(self.body_padding);
        style.margin_top = 0.0;
        style.margin_bottom = 0.0;
        style.width = Length::Auto;
        if let Display::None | Display::Inline = style.display {
            style.display = Display::Block;
        }

        let width = self.viewport.width as f64;
        let el = self.layout_box(body, &style, 0.0, 0.0, width, false, 0)?;
        Ok(LayoutSnapshot::new(el))
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::Render(format!("markup nested deeper than {} levels", self.max_depth)));
        }
        Ok(())
    }

    /// Max-content width of an element's border box.
    fn max_content(&self, el: ElementRef<'_>, style: &BoxStyle, depth: usize) -> Result<f64> {
        crate::with_stack(|| self.measure(el, style, depth))
    }

    fn measure(&self, el: ElementRef<'_>, style: &BoxStyle, depth: usize) -> Result<f64> {
        self.check_depth(depth)?;
        if let Length::Px(w) = style.width {
            return Ok(w);
        }
        let row = matches!(style.display, Display::Flex { column: false });
        let mut widest: f64 = 0.0;
        let mut line: f64 = 0.0;
        let mut items = 0usize;
        for child in el.children() {
            let (w, inline) = match child.value() {
                Node::Text(t) => {
                    let t: &str = t;
                    if t.trim().is_empty() {
                        continue;
                    }
                    (text_width(t, style.font), true)
                }
                Node::Element(_) => {
                    let Some(c) = ElementRef::wrap(child) else { continue };
                    let cs = style_of(c, style.font);
                    if cs.display == Display::None {
                        continue;
                    }
                    (self.max_content(c, &cs, depth + 1)?, cs.display.is_inline())
                }
                _ => continue,
            };
            if row {
                if items > 0 {
                    line += style.gap_x;
                }
                line += w;
            } else if inline {
                line += w;
            } else {
                widest = widest.max(line).max(w);
                line = 0.0;
            }
            items += 1;
        }
        let mut inner = widest.max(line);
        if let Some(m) = style.max_width {
            inner = inner.min(m);
        }
        Ok(inner + style.padding.horizontal())
    }

    /// Lay out one element whose border box starts at (`x`, `y`) inside a
    /// containing block of width `avail`. `shrink` selects shrink-to-fit
    /// sizing for auto widths (inline boxes and flex items).
    #[allow(clippy::too_many_arguments)]
    fn layout_box(
        &self,
        el: ElementRef<'_>,
        style: &BoxStyle,
        x: f64,
        y: f64,
        avail: f64,
        shrink: bool,
        depth: usize,
    ) -> Result<SnapshotElement> {
        crate::with_stack(|| self.place_box(el, style, x, y, avail, shrink, depth))
    }

    #[allow(clippy::too_many_arguments)]
    fn place_box(
        &self,
        el: ElementRef<'_>,
        style: &BoxStyle,
        x: f64,
        y: f64,
        avail: f64,
        shrink: bool,
        depth: usize,
    ) -> Result<SnapshotElement> {
        self.check_depth(depth)?;
        let tag = el.value().name();
        let class_name = el.value().attr("class").unwrap_or_default();

        if style.display == Display::None {
            return Ok(SnapshotElement::new(tag, Rect::new(x, y, 0.0, 0.0)).with_class(class_name));
        }

        let mut width = match style.width.resolve(avail) {
            Some(w) => w,
            None if shrink => self.max_content(el, style, depth)?.min(avail),
            None => avail,
        };
        if let Some(m) = style.max_width {
            width = width.min(m);
        }
        let width = width.max(0.0);
        let x = if style.center && !shrink && width < avail { x + (avail - width) / 2.0 } else { x };

        let cx = x + style.padding.left;
        let cy = y + style.padding.top;
        let cw = (width - style.padding.horizontal()).max(0.0);

        let (children, content_h) = match style.display {
            Display::Flex { column: false } => self.layout_row(el, style, cx, cy, cw, depth)?,
            Display::Flex { column: true } => self.layout_flow(el, style, cx, cy, cw, true, depth)?,
            _ => self.layout_flow(el, style, cx, cy, cw, false, depth)?,
        };

        let height = match style.height {
            Length::Px(h) => h,
            _ => content_h + style.padding.vertical(),
        };
        let border_radius = style.radius.resolve(width.min(height)).unwrap_or(0.0).max(0.0);

        Ok(SnapshotElement {
            tag: tag.to_ascii_lowercase(),
            class_name: class_name.to_string(),
            rect: Rect::new(x, y, width, height),
            style: ComputedStyle { border_radius },
            children,
        })
    }

    /// Block flow: blocks stack, inline content wraps into lines.
    #[allow(clippy::too_many_arguments)]
    fn layout_flow(
        &self,
        el: ElementRef<'_>,
        style: &BoxStyle,
        cx: f64,
        cy: f64,
        cw: f64,
        blockify: bool,
        depth: usize,
    ) -> Result<(Vec<SnapshotNode>, f64)> {
        let right = cx + cw;
        let mut children = Vec::new();
        let mut line = Line::new(cx, cy);
        let mut placed = 0usize;

        for child in el.children() {
            match child.value() {
                Node::Text(t) => {
                    let text: &str = t;
                    children.push(SnapshotNode::text(text));
                    let space = style.font.char_width();
                    for word in text.split_whitespace() {
                        let w = word.chars().count() as f64 * space;
                        if line.used && line.x + w > right {
                            line = Line::new(cx, line.bottom());
                        }
                        line.x += w + space;
                        line.height = line.height.max(style.font.line_height);
                        line.used = true;
                    }
                }
                Node::Element(_) => {
                    let Some(c) = ElementRef::wrap(child) else { continue };
                    let cs = style_of(c, style.font);
                    if c.value().name() == "br" {
                        let top = if line.used { line.bottom() } else { line.top + style.font.line_height };
                        line = Line::new(cx, top);
                        children.push(SnapshotElement::new("br", Rect::new(cx, top, 0.0, 0.0)).into());
                        continue;
                    }
                    if cs.display == Display::None {
                        children.push(self.layout_box(c, &cs, cx, line.top, cw, false, depth + 1)?.into());
                        continue;
                    }
                    if cs.display.is_inline() && !blockify {
                        let mut boxed = self.layout_box(c, &cs, line.x, line.top, (right - line.x).max(0.0), true, depth + 1)?;
                        if line.used && line.x + boxed.rect.width > right {
                            line = Line::new(cx, line.bottom());
                            boxed = self.layout_box(c, &cs, line.x, line.top, cw, true, depth + 1)?;
                        }
                        line.x += boxed.rect.width;
                        line.height = line.height.max(boxed.rect.height);
                        line.used = true;
                        children.push(boxed.into());
                        continue;
                    }

                    let mut top = line.bottom();
                    if placed > 0 {
                        top += style.gap_y;
                    }
                    top += cs.margin_top;
                    let shrink = blockify && style.items_center;
                    let mut boxed = self.layout_box(c, &cs, cx, top, cw, shrink, depth + 1)?;
                    if shrink && boxed.rect.width < cw {
                        let dx = (cw - boxed.rect.width) / 2.0;
                        translate(&mut boxed, dx, 0.0);
                    }
                    let bottom = boxed.rect.y + boxed.rect.height + cs.margin_bottom;
                    children.push(boxed.into());
                    line = Line::new(cx, bottom);
                    placed += 1;
                }
                _ => {}
            }
        }

        Ok((children, line.bottom() - cy))
    }

    /// Horizontal flex row: items sized to content, placed left to right.
    fn layout_row(
        &self,
        el: ElementRef<'_>,
        style: &BoxStyle,
        cx: f64,
        cy: f64,
        cw: f64,
        depth: usize,
    ) -> Result<(Vec<SnapshotNode>, f64)> {
        let right = cx + cw;
        let mut children = Vec::new();
        // (index into children, height) of every element item
        let mut items: Vec<(usize, f64)> = Vec::new();
        let mut x = cx;
        let mut row_h: f64 = 0.0;
        let mut count = 0usize;

        for child in el.children() {
            match child.value() {
                Node::Text(t) => {
                    let text: &str = t;
                    children.push(SnapshotNode::text(text));
                    if text.trim().is_empty() {
                        continue;
                    }
                    if count > 0 {
                        x += style.gap_x;
                    }
                    let avail = (right - x).max(style.font.char_width());
                    let tw = text_width(text, style.font);
                    let lines = (tw / avail).ceil().max(1.0);
                    x += tw.min(avail);
                    row_h = row_h.max(lines * style.font.line_height);
                    count += 1;
                }
                Node::Element(_) => {
                    let Some(c) = ElementRef::wrap(child) else { continue };
                    let cs = style_of(c, style.font);
                    if cs.display == Display::None {
                        children.push(self.layout_box(c, &cs, x, cy, 0.0, true, depth + 1)?.into());
                        continue;
                    }
                    if count > 0 {
                        x += style.gap_x;
                    }
                    let boxed = self.layout_box(c, &cs, x, cy + cs.margin_top, (right - x).max(0.0), true, depth + 1)?;
                    x += boxed.rect.width;
                    let h = boxed.rect.height + cs.margin_top + cs.margin_bottom;
                    row_h = row_h.max(h);
                    items.push((children.len(), h));
                    children.push(boxed.into());
                    count += 1;
                }
                _ => {}
            }
        }

        if style.items_center {
            for (idx, h) in items {
                if let SnapshotNode::Element(boxed) = &mut children[idx] {
                    translate(boxed, 0.0, (row_h - h) / 2.0);
                }
            }
        }

        Ok((children, row_h))
    }
}
