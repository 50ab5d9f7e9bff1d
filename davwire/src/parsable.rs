// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parsable element types and the registry that maps XML elements to them.
//!
//! Every protocol element and property is described by a static
//! [`ParsableType`]. Types form a tree rooted at [`PARSABLE`]; the
//! [`Registry`] resolves an XML element to the first concrete type below a
//! chosen root whose `(namespace, name)` matches.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, PoisonError, RwLock};

use reqwest::Url;

use crate::catalog;
use crate::error::ParseError;
use crate::property::PropertyClass;
use crate::xml::{Element, Node, XmlWriter, parse_document};

/// Static description of a parsable element type.
#[derive(Debug)]
pub struct ParsableType {
    name: &'static str,
    element: Option<(&'static str, &'static str)>,
    parent: Option<TypeId>,
    property: Option<PropertyClass>,
}

impl ParsableType {
    /// An abstract type; it groups subtypes but never matches an element.
    #[must_use]
    pub const fn abstract_type(name: &'static str, parent: Option<TypeId>) -> Self {
        Self {
            name,
            element: None,
            parent,
            property: None,
        }
    }

    /// A concrete protocol element.
    #[must_use]
    pub const fn element(
        name: &'static str,
        namespace: &'static str,
        element_name: &'static str,
        parent: TypeId,
    ) -> Self {
        Self {
            name,
            element: Some((namespace, element_name)),
            parent: Some(parent),
            property: None,
        }
    }

    /// A concrete property bound to `class`.
    #[must_use]
    pub const fn property(
        name: &'static str,
        namespace: &'static str,
        element_name: &'static str,
        parent: TypeId,
        class: PropertyClass,
    ) -> Self {
        Self {
            name,
            element: Some((namespace, element_name)),
            parent: Some(parent),
            property: Some(class),
        }
    }
}

/// Identity of a [`ParsableType`].
///
/// Two ids are equal when they refer to the same static descriptor.
#[derive(Clone, Copy)]
pub struct TypeId(&'static ParsableType);

impl TypeId {
    /// Wraps a static descriptor.
    #[must_use]
    pub const fn of(ty: &'static ParsableType) -> Self {
        Self(ty)
    }

    /// Type name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0.name
    }

    /// Local name of the bound element; `None` for abstract types.
    #[must_use]
    pub const fn element_name(self) -> Option<&'static str> {
        match self.0.element {
            Some((_, name)) => Some(name),
            None => None,
        }
    }

    /// Namespace of the bound element; `None` for abstract types.
    #[must_use]
    pub const fn element_namespace(self) -> Option<&'static str> {
        match self.0.element {
            Some((namespace, _)) => Some(namespace),
            None => None,
        }
    }

    /// Whether the type is abstract.
    #[must_use]
    pub const fn is_abstract(self) -> bool {
        self.0.element.is_none()
    }

    /// Parent type, `None` only for [`PARSABLE`].
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        self.0.parent
    }

    /// Property behavior, for property types.
    #[must_use]
    pub fn property_class(self) -> Option<&'static PropertyClass> {
        self.0.property.as_ref()
    }

    /// Whether `self` is `ancestor` or derives from it.
    #[must_use]
    pub fn is_a(self, ancestor: Self) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty == ancestor {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    fn matches(self, namespace: &str, name: &str) -> bool {
        self.0.element == Some((namespace, name))
    }
}

impl PartialEq for TypeId {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for TypeId {}

impl Hash for TypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state);
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

/// Root of every parsable type.
pub static PARSABLE: ParsableType = ParsableType::abstract_type("Parsable", None);

/// Catalog of registered types.
#[derive(Debug, Default)]
pub struct Registry {
    types: RwLock<Vec<TypeId>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ty` and its ancestors. Returns `false` if `ty` was
    /// already registered.
    pub fn register(&self, ty: TypeId) -> bool {
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        if types.contains(&ty) {
            return false;
        }

        let mut chain = Vec::new();
        let mut current = Some(ty);
        while let Some(t) = current {
            if types.contains(&t) {
                break;
            }
            chain.push(t);
            current = t.parent();
        }
        types.extend(chain.into_iter().rev());
        true
    }

    /// Whether `ty` has been registered.
    #[must_use]
    pub fn is_registered(&self, ty: TypeId) -> bool {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&ty)
    }

    /// Depth-first enumeration of the registered subtypes of `root`.
    ///
    /// Each type's own subtypes are listed before it, which is also the
    /// order [`Registry::lookup`] tries them in.
    #[must_use]
    pub fn subtypes(&self, root: TypeId) -> Vec<TypeId> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = Vec::new();
        walk(&types, root, &mut out);
        out
    }

    /// Finds the concrete subtype of `root` bound to `(namespace, name)`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownElement`] if the element has no
    /// namespace or no registered type matches.
    pub fn lookup(
        &self,
        root: TypeId,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<TypeId, ParseError> {
        let Some(namespace) = namespace else {
            return Err(ParseError::UnknownElement(format!(
                "No XML namespace for element <{name}>"
            )));
        };

        self.subtypes(root)
            .into_iter()
            .find(|ty| !ty.is_abstract() && ty.matches(namespace, name))
            .ok_or_else(|| ParseError::UnknownElement(format!("Unknown XML element <{name}>")))
    }

    /// Finds the concrete subtype of `root` bound to `element`.
    ///
    /// # Errors
    ///
    /// See [`Registry::lookup`].
    pub fn lookup_element(&self, root: TypeId, element: &Element) -> Result<TypeId, ParseError> {
        self.lookup(root, element.namespace(), element.name())
    }
}

fn walk(types: &[TypeId], parent: TypeId, out: &mut Vec<TypeId>) {
    for &child in types.iter().filter(|t| t.parent() == Some(parent)) {
        walk(types, child, out);
        out.push(child);
    }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let registry = Registry::new();
    for &ty in catalog::BUILTIN_TYPES {
        registry.register(ty);
    }
    tracing::debug!(
        count = registry.subtypes(TypeId::of(&PARSABLE)).len(),
        "registered built-in element types"
    );
    registry
});

/// The process-wide registry, populated with the built-in catalog on first use.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Registers an additional type with the process-wide registry.
///
/// Registration is idempotent; call it during setup.
pub fn register(ty: TypeId) -> bool {
    registry().register(ty)
}

/// Set of types found in an instance graph, plus any extra namespaces the
/// graph's values need declared.
#[derive(Debug, Clone, Default)]
pub struct TypeSet {
    types: Vec<TypeId>,
    namespaces: BTreeSet<&'static str>,
}

impl TypeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `ty`; returns `false` if it was already present.
    pub fn insert(&mut self, ty: TypeId) -> bool {
        if self.types.contains(&ty) {
            return false;
        }
        self.types.push(ty);
        true
    }

    /// Records a namespace used by element content rather than a type.
    pub fn insert_namespace(&mut self, namespace: &'static str) {
        self.namespaces.insert(namespace);
    }

    /// Whether `ty` is present.
    #[must_use]
    pub fn contains(&self, ty: TypeId) -> bool {
        self.types.contains(&ty)
    }

    /// Number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the set holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.iter().copied()
    }

    /// Every namespace the collected graph needs declared.
    #[must_use]
    pub fn namespaces(&self) -> BTreeSet<&'static str> {
        self.types
            .iter()
            .filter_map(|ty| ty.element_namespace())
            .chain(self.namespaces.iter().copied())
            .collect()
    }
}

/// An object bound to an XML element.
pub trait Parsable: Sized {
    /// Creates an empty instance of `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if `ty` is not a type this
    /// implementation can represent.
    fn instantiate(ty: TypeId) -> Result<Self, ParseError>;

    /// The concrete type of this instance.
    fn parsable_type(&self) -> TypeId;

    /// Consumes one child node of the element being bound.
    ///
    /// Implementations handle what they recognize and pass everything else
    /// to the next handler up the chain, ending in [`ignore_unknown`].
    ///
    /// # Errors
    ///
    /// Returns an error if recognized content is malformed.
    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        let _ = base_uri;
        ignore_unknown(self.parsable_type(), node)
    }

    /// Writes this instance as an element.
    ///
    /// # Errors
    ///
    /// Returns an error if a namespace is undeclared or writing fails.
    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError>;

    /// Adds the types present in this instance graph to `types`.
    fn collect_types(&self, types: &mut TypeSet) {
        types.insert(self.parsable_type());
    }
}

/// Terminal handler of every deserialization chain: discards the node.
///
/// # Errors
///
/// Never fails; the signature matches the other handlers.
pub fn ignore_unknown(owner: TypeId, node: &Node) -> Result<(), ParseError> {
    if let Node::Element(e) = node {
        tracing::trace!(
            owner = owner.name(),
            element = e.name(),
            namespace = e.namespace().unwrap_or_default(),
            "ignoring unrecognized element"
        );
    }
    Ok(())
}

/// Binds `element` and its children to a new instance of `ty`.
///
/// # Errors
///
/// The first child that fails to bind aborts the whole element.
pub fn new_from_element<T: Parsable>(
    ty: TypeId,
    base_uri: &Url,
    element: &Element,
) -> Result<T, ParseError> {
    let mut instance = T::instantiate(ty)?;
    for node in element.children() {
        instance.deserialize(base_uri, node)?;
    }
    Ok(instance)
}

/// Parses a document and binds its root element to a new instance of `ty`.
///
/// # Errors
///
/// Returns [`ParseError::ParserFailed`] or [`ParseError::EmptyDocument`]
/// for unusable input, or the first binding error.
pub fn new_from_bytes<T: Parsable>(
    ty: TypeId,
    base_uri: &Url,
    bytes: &[u8],
) -> Result<T, ParseError> {
    let root = parse_document(bytes)?;
    new_from_element(ty, base_uri, &root)
}

/// Serializes `value` as a standalone document.
///
/// # Errors
///
/// Returns an error if a namespace has no registered prefix.
pub fn to_bytes<T: Parsable>(value: &T) -> Result<Vec<u8>, ParseError> {
    let mut types = TypeSet::new();
    value.collect_types(&mut types);
    let namespaces = types.namespaces();
    let mut writer = XmlWriter::new(namespaces.iter().copied())?;
    value.serialize(&mut writer)?;
    Ok(writer.into_bytes())
}

/// Resolves href text against `base_uri`.
///
/// # Errors
///
/// Returns [`ParseError::ContentViolation`] if the result is not a valid URI.
pub fn resolve_href(base_uri: &Url, text: &str) -> Result<Url, ParseError> {
    base_uri
        .join(text.trim())
        .map_err(|e| ParseError::ContentViolation(format!("Invalid href value '{text}': {e}")))
}

/// Checks that `ty` is `expected` or one of its subtypes.
///
/// # Errors
///
/// Returns [`ParseError::Internal`] otherwise.
pub fn expect_type(ty: TypeId, expected: TypeId) -> Result<(), ParseError> {
    if ty.is_a(expected) {
        Ok(())
    } else {
        Err(ParseError::Internal(format!(
            "Type {ty} cannot be instantiated as {expected}"
        )))
    }
}
