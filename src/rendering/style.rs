/// Style resolution for the built-in renderer.
///
/// Resolves the few properties the approximate layout needs from three
/// sources, later ones winning: tag defaults, utility classes, inline `style`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Display {
    None,
    Block,
    Inline,
    Flex { column: bool },
}

impl Display {
    pub fn is_inline(&self) -> bool {
        matches!(self, Display::Inline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Auto,
    Px(f64),
    Percent(f64),
}

impl Length {
    pub fn resolve(&self, basis: f64) -> Option<f64> {
        match *self {
            Length::Auto => None,
            Length::Px(v) => Some(v),
            Length::Percent(p) => Some(basis * p / 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn all(v: f64) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f64,
    pub line_height: f64,
}

impl Font {
    pub const BASE: Font = Font { size: 16.0, line_height: 24.0 };

    /// Approximate advance of one character
    pub fn char_width(&self) -> f64 {
        self.size * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub display: Display,
    pub width: Length,
    pub height: Length,
    pub max_width: Option<f64>,
    pub center: bool,
    pub padding: Edges,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub items_center: bool,
    pub font: Font,
    pub radius: Length,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            width: Length::Auto,
            height: Length::Auto,
            max_width: None,
            center: false,
            padding: Edges::default(),
            margin_top: 0.0,
            margin_bottom: 0.0,
            gap_x: 0.0,
            gap_y: 0.0,
            items_center: false,
            font: Font::BASE,
            radius: Length::Px(0.0),
        }
    }
}

const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "title", "meta", "link", "template", "noscript", "base"];
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "button", "code", "em", "i", "img", "input", "kbd", "label", "mark", "select", "small",
    "span", "strong", "sub", "sup", "svg", "textarea", "time", "u",
];

impl BoxStyle {
    /// Resolve the style of one element. `font` is the inherited font.
    pub fn resolve(tag: &str, class: Option<&str>, inline: Option<&str>, attr: impl Fn(&str) -> Option<String>, font: Font) -> Self {
        let mut style = Self::for_tag(tag, attr, font);
        if let Some(class) = class {
            for token in class.split_whitespace() {
                style.apply_class(token);
            }
        }
        if let Some(inline) = inline {
            style.apply_inline(inline);
        }
        style
    }

    fn for_tag(tag: &str, attr: impl Fn(&str) -> Option<String>, font: Font) -> Self {
        let mut s = BoxStyle { font, ..Default::default() };
        if HIDDEN_TAGS.contains(&tag) {
            s.display = Display::None;
            return s;
        }
        if INLINE_TAGS.contains(&tag) {
            s.display = Display::Inline;
        }
        match tag {
            "h1" => s.font = Font { size: 32.0, line_height: 40.0 },
            "h2" => s.font = Font { size: 24.0, line_height: 32.0 },
            "h3" => s.font = Font { size: 20.0, line_height: 28.0 },
            "button" => s.padding = Edges { top: 1.0, right: 6.0, bottom: 1.0, left: 6.0 },
            "input" => {
                s.width = Length::Px(160.0);
                s.height = Length::Px(26.0);
            }
            "textarea" => {
                s.width = Length::Px(180.0);
                s.height = Length::Px(48.0);
            }
            "img" | "svg" => {
                s.width = attr("width").and_then(|v| parse_px(&v)).map_or(Length::Px(0.0), Length::Px);
                s.height = attr("height").and_then(|v| parse_px(&v)).map_or(Length::Px(0.0), Length::Px);
            }
            _ => {}
        }
        s
    }

    /// Apply one utility class token. Unknown or variant-prefixed tokens are ignored.
    pub fn apply_class(&mut self, token: &str) {
        if token.contains(':') {
            return;
        }
        match token {
            "hidden" => self.display = Display::None,
            "block" | "grid" => self.display = Display::Block,
            "inline" | "inline-block" => self.display = Display::Inline,
            "flex" | "inline-flex" => self.display = Display::Flex { column: false },
            "flex-row" => {
                if let Display::Flex { .. } = self.display {
                    self.display = Display::Flex { column: false };
                }
            }
            "flex-col" => {
                if let Display::Flex { .. } = self.display {
                    self.display = Display::Flex { column: true };
                }
            }
            "items-center" => self.items_center = true,
            "mx-auto" => self.center = true,
            "w-full" | "w-screen" => self.width = Length::Percent(100.0),
            "h-full" => self.height = Length::Auto,
            "rounded" => self.radius = Length::Px(4.0),
            "rounded-none" => self.radius = Length::Px(0.0),
            "rounded-sm" => self.radius = Length::Px(2.0),
            "rounded-md" => self.radius = Length::Px(6.0),
            "rounded-lg" => self.radius = Length::Px(8.0),
            "rounded-xl" => self.radius = Length::Px(12.0),
            "rounded-2xl" => self.radius = Length::Px(16.0),
            "rounded-3xl" => self.radius = Length::Px(24.0),
            "rounded-full" => self.radius = Length::Px(9999.0),
            "text-xs" => self.font = Font { size: 12.0, line_height: 16.0 },
            "text-sm" => self.font = Font { size: 14.0, line_height: 20.0 },
            "text-base" => self.font = Font::BASE,
            "text-lg" => self.font = Font { size: 18.0, line_height: 28.0 },
            "text-xl" => self.font = Font { size: 20.0, line_height: 28.0 },
            "text-2xl" => self.font = Font { size: 24.0, line_height: 32.0 },
            "text-3xl" => self.font = Font { size: 30.0, line_height: 36.0 },
            "text-4xl" => self.font = Font { size: 36.0, line_height: 40.0 },
            "max-w-xs" => self.max_width = Some(320.0),
            "max-w-sm" => self.max_width = Some(384.0),
            "max-w-md" => self.max_width = Some(448.0),
            "max-w-lg" => self.max_width = Some(512.0),
            "max-w-xl" => self.max_width = Some(576.0),
            "max-w-2xl" => self.max_width = Some(672.0),
            _ => self.apply_spacing(token),
        }
    }

    fn apply_spacing(&mut self, token: &str) {
        let Some((prefix, value)) = token.rsplit_once('-') else { return };
        if prefix == "w" || prefix == "h" {
            let len = match value.split_once('/') {
                Some((n, d)) => match (n.parse::<f64>(), d.parse::<f64>()) {
                    (Ok(n), Ok(d)) if d > 0.0 => Length::Percent(n / d * 100.0),
                    _ => return,
                },
                None => match spacing(value) {
                    Some(px) => Length::Px(px),
                    None => return,
                },
            };
            if prefix == "w" {
                self.width = len;
            } else {
                self.height = len;
            }
            return;
        }
        let Some(px) = spacing(value) else { return };
        match prefix {
            "size" => {
                self.width = Length::Px(px);
                self.height = Length::Px(px);
            }
            "p" => self.padding = Edges::all(px),
            "px" => {
                self.padding.left = px;
                self.padding.right = px;
            }
            "py" => {
                self.padding.top = px;
                self.padding.bottom = px;
            }
            "pt" => self.padding.top = px,
            "pb" => self.padding.bottom = px,
            "pl" => self.padding.left = px,
            "pr" => self.padding.right = px,
            "m" | "my" => {
                self.margin_top = px;
                self.margin_bottom = px;
            }
            "mt" => self.margin_top = px,
            "mb" => self.margin_bottom = px,
            "gap" => {
                self.gap_x = px;
                self.gap_y = px;
            }
            "gap-x" | "space-x" => self.gap_x = px,
            "gap-y" | "space-y" => self.gap_y = px,
            _ => {}
        }
    }

    /// Apply declarations from an inline `style` attribute.
    pub fn apply_inline(&mut self, decls: &str) {
        for decl in decls.split(';') {
            let Some((prop, value)) = decl.split_once(':') else { continue };
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            match prop.as_str() {
                "display" => {
                    self.display = match value {
                        "none" => Display::None,
                        "flex" | "inline-flex" => Display::Flex { column: false },
                        "inline" | "inline-block" => Display::Inline,
                        _ => Display::Block,
                    }
                }
                "flex-direction" => {
                    if let Display::Flex { .. } = self.display {
                        self.display = Display::Flex { column: value.starts_with("column") };
                    }
                }
                "width" => {
                    if let Some(len) = parse_length(value) {
                        self.width = len;
                    }
                }
                "height" => {
                    if let Some(len) = parse_length(value) {
                        self.height = len;
                    }
                }
                "max-width" => self.max_width = parse_px(value),
                "padding" => {
                    if let Some(px) = value.split_whitespace().next().and_then(parse_px) {
                        self.padding = Edges::all(px);
                    }
                }
                "margin-top" => self.margin_top = parse_px(value).unwrap_or(self.margin_top),
                "margin-bottom" => self.margin_bottom = parse_px(value).unwrap_or(self.margin_bottom),
                "gap" => {
                    if let Some(px) = parse_px(value) {
                        self.gap_x = px;
                        self.gap_y = px;
                    }
                }
                "border-radius" => {
                    if let Some(len) = value.split_whitespace().next().and_then(parse_length) {
                        self.radius = len;
                    }
                }
                "font-size" => {
                    if let Some(px) = parse_px(value) {
                        self.font = Font { size: px, line_height: px * 1.5 };
                    }
                }
                _ => {}
            }
        }
    }
}

/// Utility spacing scale: `N` is `N * 4px`, `px` is one pixel.
fn spacing(value: &str) -> Option<f64> {
    if value == "px" {
        return Some(1.0);
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v * 4.0)
}

/// Parse `12`, `12px`, or `12.5px` into pixels.
pub fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim();
    let v = v.strip_suffix("px").unwrap_or(v);
    v.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_length(value: &str) -> Option<Length> {
    let v = value.trim();
    if v == "auto" {
        return Some(Length::Auto);
    }
    if let Some(pct) = v.strip_suffix('%') {
        return pct.trim().parse::<f64>().ok().filter(|p| p.is_finite()).map(Length::Percent);
    }
    parse_px(v).map(Length::Px)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(tag: &str, class: &str, inline: &str) -> BoxStyle {
        BoxStyle::resolve(tag, Some(class), Some(inline), |_| None, Font::BASE)
    }

    #[test]
    fn utility_sizes_use_four_pixel_scale() {
        let s = resolve("div", "w-16 h-12 p-6 px-4 mt-2", "");
        assert_eq!(s.width, Length::Px(64.0));
        assert_eq!(s.height, Length::Px(48.0));
        assert_eq!(s.padding, Edges { top: 24.0, right: 16.0, bottom: 24.0, left: 16.0 });
        assert_eq!(s.margin_top, 8.0);
    }

    #[test]
    fn inline_style_overrides_classes() {
        let s = resolve("div", "w-16 rounded-md", "width: 120px; border-radius: 50%");
        assert_eq!(s.width, Length::Px(120.0));
        assert_eq!(s.radius, Length::Percent(50.0));
        assert_eq!(s.radius.resolve(80.0), Some(40.0));
    }

    #[test]
    fn tag_defaults() {
        assert_eq!(resolve("script", "", "").display, Display::None);
        assert!(resolve("a", "", "").display.is_inline());
        assert_eq!(resolve("div", "flex flex-col", "").display, Display::Flex { column: true });
        let img = BoxStyle::resolve("img", None, None, |n| (n == "width").then(|| "48".to_string()), Font::BASE);
        assert_eq!(img.width, Length::Px(48.0));
        assert_eq!(img.height, Length::Px(0.0));
    }

    #[test]
    fn variant_prefixed_classes_are_ignored() {
        let s = resolve("div", "hover:hidden lg:w-full w-1/2", "");
        assert_eq!(s.display, Display::Block);
        assert_eq!(s.width, Length::Percent(50.0));
    }

    #[test]
    fn px_parsing() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px(" 7 "), Some(7.0));
        assert_eq!(parse_px("1em"), None);
    }
}
