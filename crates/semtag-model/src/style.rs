//! Style and layout property bags.
//!
//! Every property is an optional string in the document's native units
//! (`"16px"`, `"#112233"`). An absent property means "not specified"; code
//! generation skips it instead of emitting an empty value.

use serde::{Deserialize, Serialize};

macro_rules! style_bag {
    ($( $field:ident : $key:literal => $css:literal ),+ $(,)?) => {
        /// Fixed-schema set of optional style properties for one element.
        ///
        /// Field declaration order is the canonical CSS emission order.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct StyleBag {
            $(
                #[serde(rename = $key, default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<String>,
            )+
        }

        impl StyleBag {
            /// `(key, css property)` pairs in canonical order.
            pub const PROPERTIES: &'static [(&'static str, &'static str)] = &[
                $( ($key, $css), )+
            ];

            /// Present properties in canonical order.
            pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
                [$( ($key, self.$field.as_deref()), )+]
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key, v)))
            }

            pub fn get(&self, key: &str) -> Option<&str> {
                match key {
                    $( $key => self.$field.as_deref(), )+
                    _ => None,
                }
            }

            /// Set a property by key. Returns `false` for keys outside the schema.
            pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
                match key {
                    $( $key => { self.$field = Some(value.into()); true } )+
                    _ => false,
                }
            }
        }
    };
}

style_bag! {
    width: "width" => "width",
    height: "height" => "height",
    position: "position" => "position",
    top: "top" => "top",
    right: "right" => "right",
    bottom: "bottom" => "bottom",
    left: "left" => "left",
    z_index: "zIndex" => "z-index",
    display: "display" => "display",
    flex_direction: "flexDirection" => "flex-direction",
    flex_wrap: "flexWrap" => "flex-wrap",
    justify_content: "justifyContent" => "justify-content",
    align_items: "alignItems" => "align-items",
    align_content: "alignContent" => "align-content",
    align_self: "alignSelf" => "align-self",
    flex_grow: "flexGrow" => "flex-grow",
    flex_shrink: "flexShrink" => "flex-shrink",
    flex_basis: "flexBasis" => "flex-basis",
    gap: "gap" => "gap",
    row_gap: "rowGap" => "row-gap",
    column_gap: "columnGap" => "column-gap",
    grid_template_columns: "gridTemplateColumns" => "grid-template-columns",
    grid_template_rows: "gridTemplateRows" => "grid-template-rows",
    box_sizing: "boxSizing" => "box-sizing",
    margin: "margin" => "margin",
    margin_top: "marginTop" => "margin-top",
    margin_right: "marginRight" => "margin-right",
    margin_bottom: "marginBottom" => "margin-bottom",
    margin_left: "marginLeft" => "margin-left",
    padding: "padding" => "padding",
    padding_top: "paddingTop" => "padding-top",
    padding_right: "paddingRight" => "padding-right",
    padding_bottom: "paddingBottom" => "padding-bottom",
    padding_left: "paddingLeft" => "padding-left",
    background: "background" => "background",
    background_color: "backgroundColor" => "background-color",
    background_image: "backgroundImage" => "background-image",
    background_clip: "backgroundClip" => "background-clip",
    webkit_background_clip: "webkitBackgroundClip" => "-webkit-background-clip",
    color: "color" => "color",
    webkit_text_fill_color: "webkitTextFillColor" => "-webkit-text-fill-color",
    font_family: "fontFamily" => "font-family",
    font_size: "fontSize" => "font-size",
    font_weight: "fontWeight" => "font-weight",
    font_style: "fontStyle" => "font-style",
    line_height: "lineHeight" => "line-height",
    letter_spacing: "letterSpacing" => "letter-spacing",
    text_align: "textAlign" => "text-align",
    text_decoration: "textDecoration" => "text-decoration",
    text_transform: "textTransform" => "text-transform",
    direction: "direction" => "direction",
    white_space: "whiteSpace" => "white-space",
    overflow_wrap: "overflowWrap" => "overflow-wrap",
    border: "border" => "border",
    border_radius: "borderRadius" => "border-radius",
    box_shadow: "boxShadow" => "box-shadow",
    opacity: "opacity" => "opacity",
    visibility: "visibility" => "visibility",
    overflow: "overflow" => "overflow",
    transform: "transform" => "transform",
    filter: "filter" => "filter",
    mix_blend_mode: "mixBlendMode" => "mix-blend-mode",
}

impl StyleBag {
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Position of `key` in the canonical order.
    pub fn canonical_index(key: &str) -> Option<usize> {
        Self::PROPERTIES.iter().position(|(k, _)| *k == key)
    }

    /// CSS property name for a schema key.
    pub fn css_property(key: &str) -> Option<&'static str> {
        Self::PROPERTIES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, css)| *css)
    }
}

/// Container layout: how an element arranges its children.
///
/// Keys are a subset of [`StyleBag`] keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex_direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_template_columns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_template_rows: Option<String>,
}

impl LayoutBag {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("display", self.display.as_deref()),
            ("flexDirection", self.flex_direction.as_deref()),
            ("justifyContent", self.justify_content.as_deref()),
            ("alignItems", self.align_items.as_deref()),
            ("gap", self.gap.as_deref()),
            ("gridTemplateColumns", self.grid_template_columns.as_deref()),
            ("gridTemplateRows", self.grid_template_rows.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_bag() {
        assert!(StyleBag::default().is_empty());
        assert_eq!(StyleBag::default().iter().count(), 0);
    }

    #[test]
    fn test_iter_follows_canonical_order() {
        let mut bag = StyleBag::default();
        bag.set("color", "#112233");
        bag.set("width", "10px");
        bag.set("zIndex", "2");
        let keys: Vec<_> = bag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["width", "zIndex", "color"]);
    }

    #[test]
    fn test_set_unknown_key() {
        let mut bag = StyleBag::default();
        assert!(!bag.set("cursor", "pointer"));
        assert!(bag.is_empty());
    }

    #[test]
    fn test_serde_uses_camel_case_and_skips_absent() {
        let bag: StyleBag =
            serde_json::from_str(r#"{"backgroundColor":"red","webkitTextFillColor":"blue"}"#)
                .unwrap();
        assert_eq!(bag.background_color.as_deref(), Some("red"));
        assert_eq!(bag.webkit_text_fill_color.as_deref(), Some("blue"));
        assert_eq!(
            serde_json::to_string(&bag).unwrap(),
            r#"{"backgroundColor":"red","webkitTextFillColor":"blue"}"#
        );
    }

    #[test]
    fn test_css_property_names() {
        assert_eq!(StyleBag::css_property("fontSize"), Some("font-size"));
        assert_eq!(
            StyleBag::css_property("webkitBackgroundClip"),
            Some("-webkit-background-clip")
        );
        assert_eq!(StyleBag::css_property("nope"), None);
    }

    #[test]
    fn test_canonical_keys_are_unique() {
        for (i, (key, _)) in StyleBag::PROPERTIES.iter().enumerate() {
            assert_eq!(StyleBag::canonical_index(key), Some(i));
        }
    }

    #[test]
    fn test_layout_keys_exist_in_style_schema() {
        let layout = LayoutBag {
            display: Some("flex".into()),
            flex_direction: Some("row".into()),
            justify_content: Some("center".into()),
            align_items: Some("center".into()),
            gap: Some("8px".into()),
            grid_template_columns: Some("1fr 1fr".into()),
            grid_template_rows: Some("auto".into()),
        };
        for (key, _) in layout.iter() {
            assert!(StyleBag::canonical_index(key).is_some(), "{key}");
        }
    }
}
