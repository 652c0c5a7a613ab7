//! Layer naming convention and the category → tag taxonomy.
//!
//! Designers name layers `"<category>/<variant>"` or `"<category>"`
//! (`"button/primary"`, `"input/email"`, `"nav"`). The category picks the tag,
//! the variant seeds one suggested property.

use semtag_model::Properties;

/// A parsed layer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerName<'a> {
    pub category: &'a str,
    pub variant: Option<&'a str>,
}

/// Category → tag. Categories are matched case-sensitively.
pub const TAXONOMY: &[(&str, &str)] = &[
    ("button", "button"),
    ("input", "input"),
    ("textarea", "textarea"),
    ("select", "select"),
    ("checkbox", "input"),
    ("radio", "input"),
    ("link", "a"),
    ("nav", "nav"),
    ("header", "header"),
    ("footer", "footer"),
    ("main", "main"),
    ("section", "section"),
    ("aside", "aside"),
    ("article", "article"),
    ("card", "article"),
    ("form", "form"),
    ("label", "label"),
    ("heading", "h2"),
    ("title", "h1"),
    ("text", "p"),
    ("paragraph", "p"),
    ("image", "img"),
    ("img", "img"),
    ("icon", "span"),
    ("list", "ul"),
    ("item", "li"),
    ("container", "div"),
    ("div", "div"),
];

/// Button variants that are also valid values of the `type` attribute.
const BUTTON_TYPES: &[&str] = &["button", "submit", "reset"];

/// What auto-tagging derives from one layer name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inference {
    pub tag: &'static str,
    pub properties: Properties,
}

/// Split a layer name into category and optional variant.
///
/// Surrounding whitespace is ignored; an empty category yields `None`, an
/// empty variant is treated as absent.
pub fn parse_layer_name(name: &str) -> Option<LayerName<'_>> {
    let name = name.trim();
    let (category, variant) = match name.split_once('/') {
        Some((category, variant)) => (category.trim(), Some(variant.trim())),
        None => (name, None),
    };

    if category.is_empty() {
        return None;
    }

    Some(LayerName {
        category,
        variant: variant.filter(|v| !v.is_empty()),
    })
}

pub fn tag_for_category(category: &str) -> Option<&'static str> {
    TAXONOMY
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, tag)| *tag)
}

/// Default properties for `tag`, with `variant` folded into its slot.
pub fn suggested_properties(category: &str, tag: &str, variant: Option<&str>) -> Properties {
    let mut props = Properties::new();
    let mut set = |key: &str, value: &str| {
        props.insert(key.to_string(), value.to_string());
    };

    match tag {
        "button" => {
            set("type", "button");
            match variant {
                Some(v) if BUTTON_TYPES.contains(&v) => set("type", v),
                Some(v) => set("data-variant", v),
                None => {}
            }
        }
        "input" => match category {
            "checkbox" | "radio" => {
                set("type", category);
                if let Some(v) = variant {
                    set("data-variant", v);
                }
            }
            _ => {
                set("type", variant.unwrap_or("text"));
                set("required", "true");
            }
        },
        "a" => {
            set("target", "_blank");
            if let Some(v) = variant {
                set("data-variant", v);
            }
        }
        _ => {
            if let Some(v) = variant {
                set("data-variant", v);
            }
        }
    }

    props
}

/// Infer a tag and properties from a layer name, if it follows the convention.
pub fn infer(name: &str) -> Option<Inference> {
    let parsed = parse_layer_name(name)?;
    let tag = tag_for_category(parsed.category)?;
    Some(Inference {
        tag,
        properties: suggested_properties(parsed.category, tag, parsed.variant),
    })
}
