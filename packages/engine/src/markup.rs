//! Markup collaborators.
//!
//! Parsing pasted markup into elements and rendering a tree out as markup
//! both live outside the engine. The engine only relies on these traits.

use canvas_protocol::Element;

/// Turns a markup string into root elements
pub trait MarkupImporter {
    type Error: std::fmt::Display;

    /// Ids on the returned elements are replaced by the engine on insert
    fn import(&self, markup: &str) -> Result<Vec<Element>, Self::Error>;
}

/// Renders root elements as a markup string
pub trait MarkupExporter {
    fn export(&self, elements: &[Element]) -> String;
}
