//! Names used when rendering highlight regions into a document

use crate::document::Element;

/// Element, attribute and class names for rendered regions.
///
/// Shared by the materializer, the extractor (which skips anything already
/// carrying the id attribute), `reset` and the markup strip pass.
#[derive(Debug, Clone)]
pub struct RegionMarkup {
    /// Wrapper element for a highlighted sub-range
    pub region_tag: String,
    /// Attribute holding the highlight id on regions and nav markers
    pub id_attribute: String,
    /// Custom property carrying a non-default color
    pub color_variable: String,
    /// Attribute holding the note text
    pub note_attribute: String,
    /// Class of the inline note glyph
    pub note_icon_class: String,
    /// Class of navigation markers
    pub nav_class: String,
}

impl Default for RegionMarkup {
    fn default() -> Self {
        Self {
            region_tag: "mark".to_string(),
            id_attribute: "data-rdhid".to_string(),
            color_variable: "--rdhc".to_string(),
            note_attribute: "title".to_string(),
            note_icon_class: "rdhni".to_string(),
            nav_class: "rdhnav".to_string(),
        }
    }
}

impl RegionMarkup {
    /// Is this element a rendered highlight region?
    pub fn is_region(&self, element: &Element) -> bool {
        element.name == self.region_tag && element.has_attribute(&self.id_attribute)
    }

    /// Is this element a navigation marker?
    pub fn is_nav_marker(&self, element: &Element) -> bool {
        element.has_class(&self.nav_class) && element.has_attribute(&self.id_attribute)
    }

    /// Is this element a region carrying the given id?
    pub fn is_region_for(&self, element: &Element, id: &str) -> bool {
        self.is_region(element) && element.attribute(&self.id_attribute) == Some(id)
    }

    /// `style` value declaring the color variable
    pub fn color_style(&self, color: &str) -> String {
        format!("{}: {}", self.color_variable, color)
    }

    /// Read the color variable back out of a `style` value
    pub fn color_from_style<'a>(&self, style: &'a str) -> Option<&'a str> {
        style.split(';').find_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            (name.trim() == self.color_variable)
                .then(|| value.trim())
                .filter(|v| !v.is_empty())
        })
    }
}
