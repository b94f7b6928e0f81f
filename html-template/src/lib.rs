//! HTML element trees from template fragments.
//!
//! [`HtmlParser`] parses the static fragments of a template into a
//! value-independent [`Template`] and fills in the values of each call.
//! Parsing the same fragments again replays the cached derivation, so only
//! the value resolution runs per call.

pub mod ast;
pub mod grammar;

pub use ast::{
    AttrTemplate, AttrValue, Element, ElementTemplate, Node, NodeTemplate, ResolveError,
    SpreadAttrs, Tag, TagTemplate, Template,
};

use template_common::Fragments;
use template_parser::{ParseError, ParseOptions, Parser};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("input is not a single HTML element")]
    NoMatch,
}

/// Parses HTML templates into element trees holding values of type `V`.
pub struct HtmlParser<V> {
    template: Parser<Template, V>,
    root: Parser<Result<Element<V>, ResolveError>, V>,
}

impl<V: Clone + 'static> HtmlParser<V> {
    pub fn new() -> Self {
        let template = grammar::template();
        let root = template.then(|template: Template, values: &[V]| template.resolve(values));
        Self { template, root }
    }

    /// The value-independent grammar root.
    pub fn template(&self) -> &Parser<Template, V> {
        &self.template
    }

    pub fn parse(
        &self,
        input: impl Into<Fragments>,
        values: &[V],
    ) -> Result<Element<V>, TemplateError> {
        self.parse_with(input, values, &ParseOptions::default())
    }

    pub fn parse_with(
        &self,
        input: impl Into<Fragments>,
        values: &[V],
        options: &ParseOptions,
    ) -> Result<Element<V>, TemplateError> {
        let fragments = input.into();
        match self.root.parse_with(&fragments, values, options)? {
            Some(element) => Ok(element?),
            None => {
                debug!(fragments = fragments.len(), "template did not match");
                Err(TemplateError::NoMatch)
            }
        }
    }

    /// Drops every recorded derivation.
    pub fn clear_cache(&self) {
        self.template.clear_cache();
    }
}

impl<V: Clone + SpreadAttrs + 'static> HtmlParser<V> {
    /// Parses like [`parse`](HtmlParser::parse), but expands spread values
    /// into the named attributes.
    pub fn parse_merged(
        &self,
        input: impl Into<Fragments>,
        values: &[V],
    ) -> Result<Element<V>, TemplateError> {
        let template = self
            .template
            .parse(input, values)?
            .ok_or(TemplateError::NoMatch)?;
        Ok(template.resolve_merged(values)?)
    }
}

impl<V: Clone + 'static> Default for HtmlParser<V> {
    fn default() -> Self {
        Self::new()
    }
}
