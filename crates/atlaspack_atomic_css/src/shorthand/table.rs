/// Emission bucket of a shorthand property. Broader shorthands sort first so narrower ones
/// declared for the same element override them.
pub(crate) fn shorthand_bucket(property: &str) -> Option<u8> {
  match property {
    "all" => Some(0),
    "animation"
    | "animation-range"
    | "background"
    | "border"
    | "border-image"
    | "border-radius"
    | "column-rule"
    | "columns"
    | "contain-intrinsic-size"
    | "container"
    | "flex"
    | "flex-flow"
    | "font"
    | "font-synthesis"
    | "gap"
    | "grid"
    | "grid-area"
    | "grid-template"
    | "inset"
    | "list-style"
    | "margin"
    | "mask"
    | "mask-border"
    | "offset"
    | "outline"
    | "overflow"
    | "overscroll-behavior"
    | "padding"
    | "place-content"
    | "place-items"
    | "place-self"
    | "position-try"
    | "scroll-margin"
    | "scroll-padding"
    | "scroll-timeline"
    | "text-decoration"
    | "text-emphasis"
    | "text-wrap"
    | "transition"
    | "view-timeline" => Some(1),
    "border-color"
    | "border-style"
    | "border-width"
    | "font-variant"
    | "grid-column"
    | "grid-row"
    | "inset-block"
    | "inset-inline"
    | "margin-block"
    | "margin-inline"
    | "padding-block"
    | "padding-inline"
    | "scroll-margin-block"
    | "scroll-margin-inline"
    | "scroll-padding-block"
    | "scroll-padding-inline" => Some(2),
    "border-block" | "border-inline" => Some(3),
    "border-top" | "border-right" | "border-bottom" | "border-left" => Some(4),
    "border-block-start" | "border-block-end" | "border-inline-start" | "border-inline-end" => {
      Some(5)
    }
    _ => None,
  }
}

/// The properties a shorthand sets directly. Some of them are shorthands themselves.
pub(crate) fn constituents(property: &str) -> &'static [&'static str] {
  match property {
    "margin" => &["margin-top", "margin-right", "margin-bottom", "margin-left"],
    "padding" => &["padding-top", "padding-right", "padding-bottom", "padding-left"],
    "inset" => &["top", "right", "bottom", "left"],
    "scroll-margin" => &[
      "scroll-margin-top",
      "scroll-margin-right",
      "scroll-margin-bottom",
      "scroll-margin-left",
    ],
    "scroll-padding" => &[
      "scroll-padding-top",
      "scroll-padding-right",
      "scroll-padding-bottom",
      "scroll-padding-left",
    ],
    "margin-block" => &["margin-block-start", "margin-block-end"],
    "margin-inline" => &["margin-inline-start", "margin-inline-end"],
    "padding-block" => &["padding-block-start", "padding-block-end"],
    "padding-inline" => &["padding-inline-start", "padding-inline-end"],
    "inset-block" => &["inset-block-start", "inset-block-end"],
    "inset-inline" => &["inset-inline-start", "inset-inline-end"],
    "scroll-margin-block" => &["scroll-margin-block-start", "scroll-margin-block-end"],
    "scroll-margin-inline" => &["scroll-margin-inline-start", "scroll-margin-inline-end"],
    "scroll-padding-block" => &["scroll-padding-block-start", "scroll-padding-block-end"],
    "scroll-padding-inline" => &["scroll-padding-inline-start", "scroll-padding-inline-end"],

    "border" => &["border-width", "border-style", "border-color"],
    "border-width" => &[
      "border-top-width",
      "border-right-width",
      "border-bottom-width",
      "border-left-width",
    ],
    "border-style" => &[
      "border-top-style",
      "border-right-style",
      "border-bottom-style",
      "border-left-style",
    ],
    "border-color" => &[
      "border-top-color",
      "border-right-color",
      "border-bottom-color",
      "border-left-color",
    ],
    "border-top" => &["border-top-width", "border-top-style", "border-top-color"],
    "border-right" => &["border-right-width", "border-right-style", "border-right-color"],
    "border-bottom" => &["border-bottom-width", "border-bottom-style", "border-bottom-color"],
    "border-left" => &["border-left-width", "border-left-style", "border-left-color"],
    "border-block" => &["border-block-start", "border-block-end"],
    "border-inline" => &["border-inline-start", "border-inline-end"],
    "border-block-start" => &[
      "border-block-start-width",
      "border-block-start-style",
      "border-block-start-color",
    ],
    "border-block-end" => &[
      "border-block-end-width",
      "border-block-end-style",
      "border-block-end-color",
    ],
    "border-inline-start" => &[
      "border-inline-start-width",
      "border-inline-start-style",
      "border-inline-start-color",
    ],
    "border-inline-end" => &[
      "border-inline-end-width",
      "border-inline-end-style",
      "border-inline-end-color",
    ],
    "border-radius" => &[
      "border-top-left-radius",
      "border-top-right-radius",
      "border-bottom-right-radius",
      "border-bottom-left-radius",
    ],
    "outline" => &["outline-color", "outline-style", "outline-width"],
    "column-rule" => &["column-rule-width", "column-rule-style", "column-rule-color"],

    "overflow" => &["overflow-x", "overflow-y"],
    "overscroll-behavior" => &["overscroll-behavior-x", "overscroll-behavior-y"],
    "gap" => &["row-gap", "column-gap"],
    "place-content" => &["align-content", "justify-content"],
    "place-items" => &["align-items", "justify-items"],
    "place-self" => &["align-self", "justify-self"],
    "flex-flow" => &["flex-direction", "flex-wrap"],
    "flex" => &["flex-grow", "flex-shrink", "flex-basis"],
    "columns" => &["column-width", "column-count"],

    "background" => &[
      "background-color",
      "background-image",
      "background-position",
      "background-size",
      "background-repeat",
      "background-attachment",
      "background-origin",
      "background-clip",
    ],
    "font" => &[
      "font-style",
      "font-variant",
      "font-weight",
      "font-stretch",
      "font-size",
      "line-height",
      "font-family",
    ],
    "font-variant" => &[
      "font-variant-caps",
      "font-variant-ligatures",
      "font-variant-numeric",
      "font-variant-east-asian",
      "font-variant-alternates",
      "font-variant-position",
    ],
    "animation" => &[
      "animation-name",
      "animation-duration",
      "animation-timing-function",
      "animation-delay",
      "animation-iteration-count",
      "animation-direction",
      "animation-fill-mode",
      "animation-play-state",
    ],
    "transition" => &[
      "transition-property",
      "transition-duration",
      "transition-timing-function",
      "transition-delay",
    ],
    "text-decoration" => &[
      "text-decoration-line",
      "text-decoration-style",
      "text-decoration-color",
      "text-decoration-thickness",
    ],
    "list-style" => &["list-style-type", "list-style-position", "list-style-image"],

    "grid" => &[
      "grid-template",
      "grid-auto-rows",
      "grid-auto-columns",
      "grid-auto-flow",
    ],
    "grid-template" => &["grid-template-rows", "grid-template-columns", "grid-template-areas"],
    "grid-area" => &["grid-row", "grid-column"],
    "grid-row" => &["grid-row-start", "grid-row-end"],
    "grid-column" => &["grid-column-start", "grid-column-end"],

    _ => &[],
  }
}
