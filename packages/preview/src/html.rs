//! HTML rendering of the surface (snapshots, debugging, the CLI)

use canvas_protocol::{is_void_tag, StyleConfig};

use crate::dom::{Outline, RenderedNode};
use crate::surface::{RenderSurface, SurfaceView};

pub const EMPTY_PLACEHOLDER: &str = "Drop elements here to start building";

struct Context {
    depth: usize,
    buffer: String,
}

impl Context {
    fn new() -> Self {
        Self {
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.add("  ");
        }
        self.add(text);
        self.add("\n");
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

pub(crate) fn render(surface: &RenderSurface) -> String {
    let mut ctx = Context::new();

    if !surface.style().is_empty() {
        render_style(surface.style(), &mut ctx);
    }

    match surface.view() {
        SurfaceView::Loading => ctx.add_line("<!-- loading -->"),
        SurfaceView::Empty => ctx.add_line(&format!(
            "<div class=\"canvas-empty\">{}</div>",
            escape(EMPTY_PLACEHOLDER)
        )),
        SurfaceView::Tree => {
            for node in surface.nodes() {
                render_node(node, &mut ctx);
            }
        }
    }

    ctx.get_output()
}

fn render_style(style: &StyleConfig, ctx: &mut Context) {
    ctx.add_line("<style>");
    ctx.indent();
    ctx.add_line(":root {");
    ctx.indent();
    for (key, value) in &style.0 {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        ctx.add_line(&format!("--{}: {};", key, value));
    }
    ctx.dedent();
    ctx.add_line("}");
    ctx.dedent();
    ctx.add_line("</style>");
}

fn render_node(node: &RenderedNode, ctx: &mut Context) {
    let mut open = format!("<{} data-element-id=\"{}\"", node.tag, escape(node.id.as_str()));
    if !node.classes.is_empty() {
        open.push_str(&format!(" class=\"{}\"", escape(&node.classes.join(" "))));
    }
    for (name, value) in &node.attributes {
        open.push_str(&format!(" {}=\"{}\"", name, escape(value)));
    }
    if node.outline != Outline::None {
        open.push_str(&format!(" data-outline=\"{}\"", node.outline.as_str()));
    }

    if is_void_tag(&node.tag) {
        ctx.add_line(&format!("{} />", open));
        return;
    }

    if node.is_leaf() {
        ctx.add_line(&format!(
            "{} contenteditable=\"true\">{}</{}>",
            open,
            escape(node.text()),
            node.tag
        ));
        return;
    }

    ctx.add_line(&format!("{}>", open));
    ctx.indent();
    if let Some(text) = node.text.as_deref().filter(|t| !t.is_empty()) {
        ctx.add_line(&escape(text));
    }
    for child in &node.children {
        render_node(child, ctx);
    }
    ctx.dedent();
    ctx.add_line(&format!("</{}>", node.tag));
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_protocol::{AuthorityMessage, Element, ElementId};

    fn surface_with(elements: Vec<Element>) -> RenderSurface {
        let mut surface = RenderSurface::new("o");
        surface.boot();
        surface.apply(AuthorityMessage::FullSync {
            elements,
            style_config: None,
        });
        surface
    }

    #[test]
    fn test_render_tree() {
        let mut surface = surface_with(vec![Element::new("a", "div")
            .with_class("card")
            .with_child(Element::new("b", "p").with_content("1 < 2"))
            .with_child(Element::new("c", "img").with_attribute("src", "x.png"))]);
        surface.apply(AuthorityMessage::SelectElement {
            element_id: Some(ElementId::new("b")),
        });

        let html = surface.to_html();
        assert!(html.contains("<div data-element-id=\"a\" class=\"card\">"));
        assert!(html.contains("data-outline=\"selected\" contenteditable=\"true\">1 &lt; 2</p>"));
        assert!(html.contains("<img data-element-id=\"c\" src=\"x.png\" />"));
    }

    #[test]
    fn test_render_placeholder() {
        let html = surface_with(Vec::new()).to_html();
        assert!(html.contains("canvas-empty"));
        assert!(html.contains(EMPTY_PLACEHOLDER));
    }

    #[test]
    fn test_render_style_config() {
        let mut surface = surface_with(Vec::new());
        let config = serde_json::from_str(r##"{ "primary": "#3366FF" }"##).unwrap();
        surface.apply(AuthorityMessage::StyleConfig { config });
        assert!(surface.to_html().contains("--primary: #3366FF;"));
    }
}
