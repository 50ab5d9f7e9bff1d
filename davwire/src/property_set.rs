// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `DAV:prop`: a collection of property instances and property types.

use reqwest::Url;

use crate::error::ParseError;
use crate::parsable::{
    PARSABLE, Parsable, ParsableType, TypeId, TypeSet, expect_type, ignore_unknown,
    new_from_element, registry,
};
use crate::property::{PROPERTY, Property};
use crate::xml::{Node, XmlWriter, ns};

/// `DAV:prop`.
pub static PROP: ParsableType =
    ParsableType::element("PropertySet", ns::DAV, "prop", TypeId::of(&PARSABLE));

/// Property instances plus the set of property types they were added under.
///
/// In names-only mode the set serializes one empty element per registered
/// type and no values, which is the shape of PROPFIND-by-name requests and
/// of `remove` instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    types: Vec<TypeId>,
    properties: Vec<Property>,
    names_only: bool,
}

impl PropertySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty names-only set.
    #[must_use]
    pub fn names_only_set() -> Self {
        Self {
            names_only: true,
            ..Self::default()
        }
    }

    /// Creates a names-only set of `types`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if a type is not a concrete property.
    pub fn from_types(types: impl IntoIterator<Item = TypeId>) -> Result<Self, ParseError> {
        let mut set = Self::names_only_set();
        for ty in types {
            set.add_type(ty)?;
        }
        Ok(set)
    }

    /// Registers the property's type and appends the property.
    pub fn add(&mut self, property: Property) {
        self.insert_type(property.property_type());
        self.properties.push(property);
    }

    /// Registers a property type without a value.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if `ty` is not a concrete property.
    pub fn add_type(&mut self, ty: TypeId) -> Result<(), ParseError> {
        expect_type(ty, TypeId::of(&PROPERTY))?;
        if ty.is_abstract() {
            return Err(ParseError::Internal(format!(
                "{ty} is not a concrete property type"
            )));
        }
        self.insert_type(ty);
        Ok(())
    }

    fn insert_type(&mut self, ty: TypeId) {
        if !self.types.contains(&ty) {
            self.types.push(ty);
        }
    }

    /// Whether `ty` has been registered.
    #[must_use]
    pub fn has_type(&self, ty: TypeId) -> bool {
        self.types.contains(&ty)
    }

    /// Registered types in registration order.
    #[must_use]
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    /// Copies of the properties whose type is `ty` or derives from it.
    #[must_use]
    pub fn list(&self, ty: TypeId) -> Vec<Property> {
        self.properties
            .iter()
            .filter(|p| p.property_type().is_a(ty))
            .cloned()
            .collect()
    }

    /// Copies of all properties in insertion order.
    #[must_use]
    pub fn list_all(&self) -> Vec<Property> {
        self.properties.clone()
    }

    /// First property whose type is exactly `ty`.
    #[must_use]
    pub fn get(&self, ty: TypeId) -> Option<&Property> {
        self.properties.iter().find(|p| p.property_type() == ty)
    }

    /// Number of property instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the set holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Whether serialization writes names only.
    #[must_use]
    pub const fn names_only(&self) -> bool {
        self.names_only
    }

    /// Switches between names-only and valued serialization.
    pub fn set_names_only(&mut self, names_only: bool) {
        self.names_only = names_only;
    }
}

impl Parsable for PropertySet {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&PROP))?;
        Ok(Self::new())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&PROP)
    }

    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        let Node::Element(e) = node else {
            return ignore_unknown(self.parsable_type(), node);
        };

        // Servers report extension properties freely; only known ones bind.
        match registry().lookup_element(TypeId::of(&PROPERTY), e) {
            Ok(ty) => {
                let property: Property = new_from_element(ty, base_uri, e)?;
                self.add(property);
                Ok(())
            }
            Err(_) => ignore_unknown(self.parsable_type(), node),
        }
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        if self.names_only {
            if self.types.is_empty() {
                return writer.empty(ns::DAV, "prop");
            }
            writer.start(ns::DAV, "prop")?;
            for ty in &self.types {
                let (Some(namespace), Some(name)) = (ty.element_namespace(), ty.element_name())
                else {
                    return Err(ParseError::Internal(format!("{ty} has no element name")));
                };
                writer.empty(namespace, name)?;
            }
            return writer.end(ns::DAV, "prop");
        }

        if self.properties.is_empty() {
            return writer.empty(ns::DAV, "prop");
        }
        writer.start(ns::DAV, "prop")?;
        for property in &self.properties {
            property.serialize(writer)?;
        }
        writer.end(ns::DAV, "prop")
    }

    fn collect_types(&self, types: &mut TypeSet) {
        types.insert(self.parsable_type());
        for &ty in &self.types {
            types.insert(ty);
        }
        if !self.names_only {
            for property in &self.properties {
                property.collect_types(types);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DISPLAY_NAME, GET_CONTENT_LENGTH, GET_ETAG};
    use crate::parsable::to_bytes;
    use crate::property::PCDATA_PROPERTY;

    #[test]
    fn adding_a_property_registers_its_type() {
        let mut set = PropertySet::new();
        set.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "Home").unwrap());
        assert!(set.has_type(TypeId::of(&DISPLAY_NAME)));
        assert!(!set.has_type(TypeId::of(&GET_ETAG)));
    }

    #[test]
    fn list_matches_subtypes() {
        let mut set = PropertySet::new();
        set.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "Home").unwrap());
        set.add(Property::with_value(TypeId::of(&GET_CONTENT_LENGTH), 12_u64).unwrap());

        assert_eq!(set.list(TypeId::of(&PCDATA_PROPERTY)).len(), 2);
        assert_eq!(set.list(TypeId::of(&GET_CONTENT_LENGTH)).len(), 1);
    }

    #[test]
    fn rejects_abstract_types() {
        let mut set = PropertySet::new();
        assert!(set.add_type(TypeId::of(&PCDATA_PROPERTY)).is_err());
        assert!(set.add_type(TypeId::of(&PROP)).is_err());
    }

    #[test]
    fn empty_set_writes_empty_prop() {
        let xml = String::from_utf8(to_bytes(&PropertySet::new()).unwrap()).unwrap();
        assert_eq!(xml, "<D:prop xmlns:D=\"DAV:\"/>");
    }
}
