use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Props React passes through to DOM elements.
const DOM_PROPS: &[&str] = &[
  "about", "accept", "acceptCharset", "accessKey", "action", "allow", "allowFullScreen", "alt",
  "as", "async", "autoCapitalize", "autoComplete", "autoCorrect", "autoFocus", "autoPlay",
  "autoSave", "capture", "cellPadding", "cellSpacing", "challenge", "charSet", "checked",
  "children", "cite", "className", "classID", "color", "cols", "colSpan", "content",
  "contentEditable", "contextMenu", "controls", "controlsList", "coords", "crossOrigin", "d",
  "dangerouslySetInnerHTML", "data", "dateTime", "decoding", "default", "defaultChecked",
  "defaultValue", "defer", "dir", "disabled", "disablePictureInPicture", "download", "draggable",
  "encType", "enterKeyHint", "fill", "form", "formAction", "formEncType", "formMethod",
  "formNoValidate", "formTarget", "frameBorder", "headers", "height", "hidden", "high", "href",
  "hrefLang", "htmlFor", "httpEquiv", "icon", "id", "inert", "inputMode", "integrity", "is",
  "itemID", "itemProp", "itemRef", "itemScope", "itemType", "key", "keyParams", "keyType",
  "kind", "label", "lang", "list", "loading", "loop", "low", "manifest", "marginHeight",
  "marginWidth", "max", "maxLength", "media", "mediaGroup", "method", "min", "minLength",
  "multiple", "muted", "name", "nonce", "noValidate", "open", "optimum", "pattern", "placeholder",
  "playsInline", "popover", "popoverTarget", "popoverTargetAction", "poster", "preload",
  "profile", "property", "radioGroup", "readOnly", "ref", "referrerPolicy", "rel", "required",
  "resource", "results", "reversed", "role", "rows", "rowSpan", "sandbox", "scope", "scoped",
  "scrolling", "seamless", "security", "selected", "shape", "size", "sizes", "slot", "span",
  "spellCheck", "src", "srcDoc", "srcLang", "srcSet", "start", "step", "stroke", "strokeWidth",
  "style", "summary", "suppressContentEditableWarning", "suppressHydrationWarning", "tabIndex",
  "target", "title", "translate", "type", "typeof", "unselectable", "useMap", "value", "viewBox",
  "vocab", "width", "wmode", "wrap", "xmlns",
];

static DOM_PROPS_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| DOM_PROPS.iter().copied().collect());

// `data-*`, `aria-*` and `x-*`, with the prefix matched case-insensitively.
fn is_prefixed_attribute(prop: &str) -> bool {
  let Some((prefix, rest)) = prop.split_once('-') else {
    return false;
  };
  if rest.is_empty() {
    return false;
  }
  ["data", "aria", "x"]
    .iter()
    .any(|expected| prefix.eq_ignore_ascii_case(expected))
}

fn is_event_handler(prop: &str) -> bool {
  let mut chars = prop.chars();
  chars.next() == Some('o')
    && chars.next() == Some('n')
    && chars.next().is_some_and(|ch| ch.is_ascii_uppercase())
}

/// Whether a component prop can be forwarded to a DOM element.
///
/// Props read by style interpolations that fail this check are removed before the rest are
/// spread onto the element.
pub fn is_html_attribute(prop: &str) -> bool {
  !prop.is_empty()
    && (DOM_PROPS_SET.contains(prop) || is_prefixed_attribute(prop) || is_event_handler(prop))
}
