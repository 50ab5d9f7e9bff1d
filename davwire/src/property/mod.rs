// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Properties: parsable elements holding one [`Value`].
//!
//! The behavior of a property type is selected by its [`PropertyClass`]:
//! character data ([`PCData`]), a nested `href` ([`PropertyClass::HRef`]),
//! a homogeneous list ([`ListItem`]), or one of the structured
//! `resourcetype` / `redirect-lifetime` encodings.

mod href;
mod list;
mod pcdata;
mod redirect_lifetime;
mod resource_type;

use reqwest::Url;

pub use crate::property::list::ListItem;
pub use crate::property::pcdata::{PCData, TextCodec};
pub use crate::property::resource_type::ResourceType;

use crate::error::ParseError;
use crate::parsable::{PARSABLE, Parsable, ParsableType, TypeId, TypeSet, expect_type};
use crate::types::RedirectLifetime;
use crate::value::{EnumValue, Value, ValueKind};
use crate::xml::{Node, XmlWriter};

/// Root of all property types.
pub static PROPERTY: ParsableType =
    ParsableType::abstract_type("Property", Some(TypeId::of(&PARSABLE)));

/// Properties encoded as element character data.
pub static PCDATA_PROPERTY: ParsableType =
    ParsableType::abstract_type("PCDataProperty", Some(TypeId::of(&PROPERTY)));

/// Character-data properties holding a bounded unsigned integer.
pub static UINT_PROPERTY: ParsableType =
    ParsableType::abstract_type("UIntProperty", Some(TypeId::of(&PCDATA_PROPERTY)));

/// Character-data properties holding a timestamp.
pub static DATE_PROPERTY: ParsableType =
    ParsableType::abstract_type("DateProperty", Some(TypeId::of(&PCDATA_PROPERTY)));

/// Properties holding a URI inside a `DAV:href` child.
pub static HREF_PROPERTY: ParsableType =
    ParsableType::abstract_type("HRefProperty", Some(TypeId::of(&PROPERTY)));

/// Properties holding an ordered list of sub-values.
pub static LIST_PROPERTY: ParsableType =
    ParsableType::abstract_type("ListProperty", Some(TypeId::of(&PROPERTY)));

/// How a property type encodes its value.
#[derive(Debug, Clone, Copy)]
pub enum PropertyClass {
    /// Character data.
    PCData(PCData),
    /// A URI nested in a `DAV:href` child.
    HRef,
    /// A list of items.
    List(ListItem),
    /// Resource type flags, one empty child element per flag.
    ResourceType,
    /// Redirect lifetime, an empty `permanent` or `temporary` child.
    RedirectLifetime,
}

impl PropertyClass {
    /// Kind of the value held by properties of this class.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        match self {
            Self::PCData(codec) => codec.value_kind(),
            Self::HRef => ValueKind::Uri,
            Self::List(_) => ValueKind::List,
            Self::ResourceType => ValueKind::Flags,
            Self::RedirectLifetime => ValueKind::Enum,
        }
    }

    fn initial_value(&self) -> Value {
        match self {
            Self::List(_) => Value::List(Vec::new()),
            Self::ResourceType => Value::Flags(ResourceType::empty()),
            Self::RedirectLifetime => Value::from(RedirectLifetime::Unknown),
            Self::PCData(_) | Self::HRef => Value::Unit,
        }
    }
}

/// An instance of a property type.
#[derive(Debug, Clone)]
pub struct Property {
    ty: TypeId,
    class: &'static PropertyClass,
    value: Value,
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.value == other.value
    }
}

impl Property {
    /// Creates an unset property of type `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if `ty` is not a concrete property type.
    pub fn new(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&PROPERTY))?;
        let class = ty
            .property_class()
            .filter(|_| !ty.is_abstract())
            .ok_or_else(|| {
                ParseError::Internal(format!("{ty} is not a concrete property type"))
            })?;

        Ok(Self {
            ty,
            class,
            value: class.initial_value(),
        })
    }

    /// Creates a property of type `ty` holding `value`.
    ///
    /// An empty text value serializes as an empty element, so it reads
    /// back unset.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if `ty` is not a concrete property
    /// type or `value` cannot be converted to its value kind.
    pub fn with_value(ty: TypeId, value: impl Into<Value>) -> Result<Self, ParseError> {
        let mut property = Self::new(ty)?;
        let value = value.into();
        if property.set_value(&value) {
            Ok(property)
        } else {
            Err(ParseError::Internal(format!(
                "A {:?} value cannot be stored in {ty}",
                value.kind()
            )))
        }
    }

    /// Creates a character-data property from its textual encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if `ty` is not a character-data
    /// property, or [`ParseError::ContentViolation`] if `data` is rejected.
    pub fn from_data(ty: TypeId, data: &str) -> Result<Self, ParseError> {
        let mut property = Self::new(ty)?;
        let PropertyClass::PCData(codec) = *property.class else {
            return Err(ParseError::Internal(format!(
                "{ty} is not a character-data property"
            )));
        };
        property.value = pcdata::decode(ty, codec, data)?;
        Ok(property)
    }

    /// The concrete property type.
    #[must_use]
    pub const fn property_type(&self) -> TypeId {
        self.ty
    }

    /// The encoding behavior of this property.
    #[must_use]
    pub const fn class(&self) -> &'static PropertyClass {
        self.class
    }

    /// Kind of value this property holds.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        self.class.value_kind()
    }

    /// Borrows the value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns a copy of the value.
    #[must_use]
    pub fn get_value(&self) -> Value {
        self.value.clone()
    }

    /// Whether a value has been set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !self.value.is_unit()
    }

    /// Stores `value`, converting it to the declared kind.
    ///
    /// Returns `false` and leaves the property untouched when the value is
    /// not convertible.
    pub fn set_value(&mut self, value: &Value) -> bool {
        let converted = match (self.class, value) {
            (PropertyClass::List(item), Value::List(items)) => items
                .iter()
                .map(|v| v.convert(item.value_kind()))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            (PropertyClass::List(_), _) | (_, Value::Unit) => None,
            (PropertyClass::PCData(codec), _) => value
                .convert(self.value_kind())
                .map(|v| codec.normalize(v)),
            _ => value.convert(self.value_kind()),
        };

        match converted {
            Some(v) => {
                self.value = v;
                true
            }
            None => false,
        }
    }

    /// Parses character data with this type's codec.
    ///
    /// Returns `None` for non character-data properties or rejected text.
    #[must_use]
    pub fn parse_data(&self, data: &str) -> Option<Value> {
        match self.class {
            PropertyClass::PCData(codec) => codec.parse_data(data),
            _ => None,
        }
    }

    /// Encodes the value as character data.
    ///
    /// Returns `None` when unset or for non character-data properties.
    #[must_use]
    pub fn write_data(&self) -> Option<String> {
        match self.class {
            PropertyClass::PCData(codec) => codec.write_data(&self.value),
            _ => None,
        }
    }

    /// Declared kind of list items, for list properties.
    #[must_use]
    pub const fn element_kind(&self) -> Option<ValueKind> {
        match self.class {
            PropertyClass::List(item) => Some(item.value_kind()),
            _ => None,
        }
    }

    /// Appends an item to a list property.
    ///
    /// Returns `false` if this is not a list property or the item is not
    /// convertible to the declared item kind.
    pub fn add_value(&mut self, value: &Value) -> bool {
        let Some(kind) = self.element_kind() else {
            return false;
        };
        let Some(item) = value.convert(kind) else {
            return false;
        };
        match &mut self.value {
            Value::List(items) => {
                items.push(item);
                true
            }
            _ => false,
        }
    }

    /// Number of list items; zero for non-list properties.
    #[must_use]
    pub fn length(&self) -> usize {
        self.value.as_list().map_or(0, <[Value]>::len)
    }

    /// Returns a copy of the list item at `index`.
    #[must_use]
    pub fn get_value_at(&self, index: usize) -> Option<Value> {
        self.value.as_list().and_then(|items| items.get(index)).cloned()
    }

    /// Returns the redirect lifetime, for `redirect-lifetime` properties.
    #[must_use]
    pub const fn redirect_lifetime(&self) -> Option<RedirectLifetime> {
        match self.value {
            Value::Enum(EnumValue::RedirectLifetime(lifetime)) => Some(lifetime),
            _ => None,
        }
    }

    fn element(&self) -> (&'static str, &'static str) {
        (
            self.ty.element_namespace().unwrap_or_default(),
            self.ty.element_name().unwrap_or_default(),
        )
    }
}

impl Parsable for Property {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        Self::new(ty)
    }

    fn parsable_type(&self) -> TypeId {
        self.ty
    }

    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        match *self.class {
            PropertyClass::PCData(codec) => pcdata::deserialize(self, codec, node),
            PropertyClass::HRef => href::deserialize(self, base_uri, node),
            PropertyClass::List(item) => list::deserialize(self, item, base_uri, node),
            PropertyClass::ResourceType => resource_type::deserialize(self, node),
            PropertyClass::RedirectLifetime => redirect_lifetime::deserialize(self, node),
        }
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        let (namespace, name) = self.element();
        match *self.class {
            PropertyClass::PCData(_) => match self.write_data() {
                Some(data) => writer.text_element(namespace, name, &data),
                None => writer.empty(namespace, name),
            },
            PropertyClass::HRef => href::serialize(self, writer, namespace, name),
            PropertyClass::List(item) => list::serialize(self, item, writer, namespace, name),
            PropertyClass::ResourceType => {
                resource_type::serialize(self, writer, namespace, name)
            }
            PropertyClass::RedirectLifetime => {
                redirect_lifetime::serialize(self, writer, namespace, name)
            }
        }
    }

    fn collect_types(&self, types: &mut TypeSet) {
        types.insert(self.ty);
        if let Value::Flags(flags) = self.value {
            resource_type::collect_namespaces(flags, types);
        }
    }
}
