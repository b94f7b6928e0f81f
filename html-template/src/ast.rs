use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Value-independent template
// ============================================================================

/// Parse of a static template. Slots are referenced by index, so one
/// `Template` serves every call made with the same fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    root: ElementTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTemplate {
    pub tag: TagTemplate,
    pub attrs: Vec<AttrTemplate>,
    pub children: Vec<NodeTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagTemplate {
    Name(String),
    Slot(usize),
}

/// One attribute as written, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTemplate {
    /// `name="text"`
    Static { name: String, value: String },
    /// `name`
    Boolean { name: String },
    /// `name=${..}` or `name="${..}"`
    Slot { name: String, index: usize },
    /// A bare slot in attribute position.
    Spread { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTemplate {
    Text(String),
    Slot(usize),
    Element(ElementTemplate),
}

// ============================================================================
// Resolved tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag<V> {
    Name(String),
    Value(V),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue<V> {
    Text(String),
    /// Present without a value.
    Flag,
    Value(V),
}

/// An element with the call's values filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<V> {
    pub tag: Tag<V>,
    /// Named attributes; a later occurrence of a name replaces an earlier one.
    pub attrs: BTreeMap<String, AttrValue<V>>,
    /// Values spread into the attribute list, in source order.
    pub spread: Vec<V>,
    pub children: Vec<Node<V>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<V> {
    Text(String),
    Value(V),
    Element(Element<V>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("template references slot {index} but only {supplied} values were supplied")]
    MissingValue { index: usize, supplied: usize },
}

/// Values that can stand for a set of attributes when spread into a tag.
pub trait SpreadAttrs: Sized {
    /// The attributes this value contributes, in order.
    fn spread_attrs(&self) -> Vec<(String, AttrValue<Self>)>;
}

type SpreadFn<V> = fn(&V) -> Vec<(String, AttrValue<V>)>;

struct Resolver<'v, V> {
    values: &'v [V],
    /// Merges spread values into the named attributes instead of
    /// collecting them.
    merge: Option<SpreadFn<V>>,
}

impl<V: Clone> Resolver<'_, V> {
    fn value(&self, index: usize) -> Result<V, ResolveError> {
        self.values
            .get(index)
            .cloned()
            .ok_or(ResolveError::MissingValue {
                index,
                supplied: self.values.len(),
            })
    }

    fn element(&self, template: &ElementTemplate) -> Result<Element<V>, ResolveError> {
        let tag = match &template.tag {
            TagTemplate::Name(name) => Tag::Name(name.clone()),
            TagTemplate::Slot(index) => Tag::Value(self.value(*index)?),
        };

        let mut attrs = BTreeMap::new();
        let mut spread = Vec::new();
        for attr in &template.attrs {
            match attr {
                AttrTemplate::Static { name, value } => {
                    attrs.insert(name.clone(), AttrValue::Text(value.clone()));
                }
                AttrTemplate::Boolean { name } => {
                    attrs.insert(name.clone(), AttrValue::Flag);
                }
                AttrTemplate::Slot { name, index } => {
                    attrs.insert(name.clone(), AttrValue::Value(self.value(*index)?));
                }
                AttrTemplate::Spread { index } => {
                    let value = self.value(*index)?;
                    match self.merge {
                        Some(merge) => attrs.extend(merge(&value)),
                        None => spread.push(value),
                    }
                }
            }
        }

        let children = template
            .children
            .iter()
            .map(|child| self.node(child))
            .collect::<Result<_, _>>()?;

        Ok(Element {
            tag,
            attrs,
            spread,
            children,
        })
    }

    fn node(&self, template: &NodeTemplate) -> Result<Node<V>, ResolveError> {
        Ok(match template {
            NodeTemplate::Text(text) => Node::Text(text.clone()),
            NodeTemplate::Slot(index) => Node::Value(self.value(*index)?),
            NodeTemplate::Element(element) => Node::Element(self.element(element)?),
        })
    }
}

impl Template {
    pub fn new(root: ElementTemplate) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ElementTemplate {
        &self.root
    }

    /// Builds the element tree for one call, cloning each referenced value
    /// out of `values`.
    pub fn resolve<V: Clone>(&self, values: &[V]) -> Result<Element<V>, ResolveError> {
        Resolver {
            values,
            merge: None,
        }
        .element(&self.root)
    }

    /// Like [`resolve`](Template::resolve), but spread values are expanded
    /// into the named attributes in source order, so a later name replaces
    /// an earlier one. `Element::spread` stays empty.
    pub fn resolve_merged<V>(&self, values: &[V]) -> Result<Element<V>, ResolveError>
    where
        V: Clone + SpreadAttrs,
    {
        Resolver {
            values,
            merge: Some(V::spread_attrs as SpreadFn<V>),
        }
        .element(&self.root)
    }
}
