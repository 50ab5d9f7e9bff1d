// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `DAV:propertyupdate`: the body of a PROPPATCH request.

use reqwest::Url;

use crate::error::ParseError;
use crate::parsable::{
    PARSABLE, Parsable, ParsableType, TypeId, TypeSet, expect_type, ignore_unknown,
    new_from_element,
};
use crate::property::Property;
use crate::property_set::{PROP, PropertySet};
use crate::xml::{Element, Node, XmlWriter, ns};

/// `DAV:propertyupdate`.
pub static PROPERTY_UPDATE: ParsableType = ParsableType::element(
    "PropertyUpdate",
    ns::DAV,
    "propertyupdate",
    TypeId::of(&PARSABLE),
);

/// One `set` or `remove` block.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Properties to store, with values.
    Set(PropertySet),
    /// Property types to delete; always names-only.
    Remove(PropertySet),
}

impl Instruction {
    /// The grouped property set.
    #[must_use]
    pub const fn properties(&self) -> &PropertySet {
        match self {
            Self::Set(set) | Self::Remove(set) => set,
        }
    }

    const fn element_name(&self) -> &'static str {
        match self {
            Self::Set(_) => "set",
            Self::Remove(_) => "remove",
        }
    }
}

/// Ordered `set` and `remove` instructions.
///
/// Consecutive instructions of the same kind share one block, so the
/// document lists blocks in the order the caller issued them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyUpdate {
    instructions: Vec<Instruction>,
}

impl PropertyUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `property` on the resource.
    pub fn set(&mut self, property: Property) {
        if let Some(Instruction::Set(set)) = self.instructions.last_mut() {
            set.add(property);
            return;
        }
        let mut set = PropertySet::new();
        set.add(property);
        self.instructions.push(Instruction::Set(set));
    }

    /// Deletes the property of type `ty` from the resource.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if `ty` is not a concrete property.
    pub fn remove(&mut self, ty: TypeId) -> Result<(), ParseError> {
        if let Some(Instruction::Remove(set)) = self.instructions.last_mut() {
            return set.add_type(ty);
        }
        let mut set = PropertySet::names_only_set();
        set.add_type(ty)?;
        self.instructions.push(Instruction::Remove(set));
        Ok(())
    }

    /// Instructions in document order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Whether no instruction has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    fn push_block(&mut self, base_uri: &Url, block: &Element, remove: bool) -> Result<(), ParseError> {
        for prop in block.elements().filter(|e| e.is(ns::DAV, "prop")) {
            let parsed: PropertySet = new_from_element(TypeId::of(&PROP), base_uri, prop)?;
            if remove {
                for &ty in parsed.types() {
                    self.remove(ty)?;
                }
            } else {
                for property in parsed.list_all() {
                    self.set(property);
                }
            }
        }
        Ok(())
    }
}

impl Parsable for PropertyUpdate {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&PROPERTY_UPDATE))?;
        Ok(Self::new())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&PROPERTY_UPDATE)
    }

    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        match node {
            Node::Element(e) if e.is(ns::DAV, "set") => self.push_block(base_uri, e, false),
            Node::Element(e) if e.is(ns::DAV, "remove") => self.push_block(base_uri, e, true),
            _ => ignore_unknown(self.parsable_type(), node),
        }
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        if self.instructions.is_empty() {
            return writer.empty(ns::DAV, "propertyupdate");
        }
        writer.start(ns::DAV, "propertyupdate")?;
        for instruction in &self.instructions {
            let name = instruction.element_name();
            writer.start(ns::DAV, name)?;
            instruction.properties().serialize(writer)?;
            writer.end(ns::DAV, name)?;
        }
        writer.end(ns::DAV, "propertyupdate")
    }

    fn collect_types(&self, types: &mut TypeSet) {
        types.insert(self.parsable_type());
        for instruction in &self.instructions {
            instruction.properties().collect_types(types);
        }
    }
}
