//! HTML element grammar built from the engine's recognizers.
//!
//! The grammar accepts a single root element, optionally surrounded by
//! whitespace:
//!
//! ```text
//! root      := ws? element ws? END
//! element   := '<' (NAME | SLOT) (ws attrs)? ws? ('/>' | '>' child* '</' (NAME | SLOT) ws? '>')
//! attrs     := attr (ws attr)*
//! attr      := SLOT | NAME '=' (SLOT | '"' SLOT '"') | NAME '=' '"' TEXT '"' | NAME
//! child     := ws | SLOT | TEXT | element
//! ```
//!
//! Everything after a tag name is committed: a missing `>` or closing tag
//! aborts the parse with a fatal error.

use crate::ast::{AttrTemplate, ElementTemplate, NodeTemplate, TagTemplate, Template};
use once_cell::sync::Lazy;
use regex::Regex;
use template_parser::{
    any, end, find, next, optional, recursive, repeat, repeat_delimited, required, sequence,
    Parser,
};

static WHITE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").unwrap());
static TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^<]+").unwrap());
static TAG_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*").unwrap());
static ATTR_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9]*").unwrap());
static QUOTED_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[^"]*"#).unwrap());

fn attributes<V: 'static>(white_space: Parser<String, V>) -> Parser<Vec<AttrTemplate>, V> {
    let placeholder = next();
    let attr_name = find(&*ATTR_NAME);

    let spread = placeholder.then(|index, _| AttrTemplate::Spread { index });
    let with_slot = sequence((
        attr_name.clone(),
        find("="),
        any([
            placeholder.clone(),
            sequence((required(find("\"")), placeholder, required(find("\""))))
                .then(|(_, index, _), _| index),
        ]),
    ))
    .then(|(name, _, index), _| AttrTemplate::Slot { name, index });
    let quoted = sequence((
        attr_name.clone(),
        find("="),
        required(find("\"")),
        find(&*QUOTED_TEXT),
        required(find("\"")),
    ))
    .then(|(name, _, _, value, _), _| AttrTemplate::Static { name, value });
    let boolean = attr_name.then(|name, _| AttrTemplate::Boolean { name });

    repeat_delimited(any([spread, with_slot, quoted, boolean]), white_space)
}

/// Builds the grammar. The returned recognizer is cache-enabled, so
/// parsing the same fragments again replays the recorded derivation.
pub fn template<V: 'static>() -> Parser<Template, V> {
    let white_space: Parser<String, V> = find(&*WHITE_SPACE);
    let optional_white_space = optional(white_space.clone());
    let placeholder: Parser<usize, V> = next();
    let attrs = attributes(white_space.clone());

    let element = {
        let optional_white_space = optional_white_space.clone();
        recursive(move |element: Parser<ElementTemplate, V>| {
            let tag = required(any([
                find(&*TAG_NAME).then(|name, _| TagTemplate::Name(name)),
                placeholder.then(|index, _| TagTemplate::Slot(index)),
            ]));
            let attrs =
                optional(sequence((white_space.clone(), attrs)).then(|(_, attrs), _| attrs));

            let child = any([
                white_space.then(|text, _| NodeTemplate::Text(text)),
                placeholder.then(|index, _| NodeTemplate::Slot(index)),
                find(&*TEXT).then(|text, _| NodeTemplate::Text(text)),
                element.then(|element, _| NodeTemplate::Element(element)),
            ]);
            let closing_tag = required(sequence((
                find("</"),
                any([find(&*TAG_NAME).then(|_, _| ()), placeholder.then(|_, _| ())]),
                optional_white_space.clone(),
                find(">"),
            )));
            let body = sequence((required(find(">")), optional(repeat(child)), closing_tag))
                .then(|(_, children, _), _| children.unwrap_or_default());
            let self_closing = find("/>").then(|_, _| Vec::new());

            sequence((
                find("<").not(&find("</")),
                tag,
                attrs,
                optional_white_space,
                required(any([self_closing, body])),
            ))
            .then(|(_, tag, attrs, _, children), _| ElementTemplate {
                tag,
                attrs: attrs.unwrap_or_default(),
                children,
            })
        })
    };

    sequence((optional_white_space.clone(), element, optional_white_space, end()))
        .then(|(_, root, _, _), _| Template::new(root))
        .use_cache(true)
}
