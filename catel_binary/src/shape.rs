// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shape discovery and the process-wide shape cache.
//!
//! A [`Shape`] is the resolved encoding plan for a type: a primitive, a
//! collection of one element shape, or an object listing its serialized
//! properties in ascending name order. Writer and reader walk the same shape,
//! so nothing but values ends up on the wire.

use core::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::error::BinaryError;
use crate::reflect::{Access, PrimitiveKind, Reflect, TypeInfo};

/// The discovered encoding plan of a type.
#[derive(Clone)]
pub enum Shape {
    /// A supported primitive.
    Primitive(PrimitiveKind),
    /// A collection of elements of one shape.
    Collection(Arc<Shape>),
    /// An object. Shared, so recursive types can refer back to themselves.
    Object(Arc<ObjectShape>),
}

impl Shape {
    /// Returns the object shape, if this is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectShape> {
        match self {
            Self::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
            Self::Collection(element) => f.debug_tuple("Collection").field(element).finish(),
            // Object shapes may be cyclic; print the name only.
            Self::Object(object) => f.debug_tuple("Object").field(&object.type_name).finish(),
        }
    }
}

/// The serialized properties of an object type.
pub struct ObjectShape {
    type_name: &'static str,
    properties: OnceLock<Vec<PropertyShape>>,
}

impl ObjectShape {
    /// Returns the object type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the serialized properties in ascending name order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyShape] {
        self.properties.get().map_or(&[], Vec::as_slice)
    }
}

impl fmt::Debug for ObjectShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectShape")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties())
            .finish()
    }
}

/// One serialized property of an object.
#[derive(Clone, Debug)]
pub struct PropertyShape {
    /// Property name.
    pub name: &'static str,
    /// Shape of the property type.
    pub shape: Shape,
}

/// Cache of discovered shapes keyed by type name.
///
/// Discovery runs entirely under one lock, so concurrent callers asking for
/// the same type observe a single discovery.
#[derive(Default)]
pub struct ShapeCache {
    shapes: Mutex<HashMap<&'static str, Shape>>,
}

static GLOBAL: LazyLock<ShapeCache> = LazyLock::new(ShapeCache::new);

impl ShapeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the shape of `T`, discovering it on first use.
    ///
    /// # Errors
    ///
    /// See [`discover_info`](Self::discover_info).
    pub fn discover<T: Reflect>(&self) -> Result<Shape, BinaryError> {
        self.discover_info(T::type_info())
    }

    /// Resolves a type description into a shape.
    ///
    /// Object properties that are not [`Access::ReadWrite`] are skipped; the
    /// rest are ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::NotSupported`] if the type or any type it
    /// reaches is unsupported. Nothing discovered by the failing call stays
    /// cached.
    pub fn discover_info(&self, info: TypeInfo) -> Result<Shape, BinaryError> {
        let mut shapes = self.shapes.lock();
        let mut added = Vec::new();
        let result = discover(&mut shapes, &mut added, info);
        if result.is_err() {
            for name in added {
                shapes.remove(name);
            }
        }
        result
    }

    /// Returns the number of cached collection and object shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.lock().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.lock().is_empty()
    }

    /// Returns `true` if a shape for `type_name` is cached.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.shapes.lock().contains_key(type_name)
    }
}

impl fmt::Debug for ShapeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

fn discover(
    shapes: &mut HashMap<&'static str, Shape>,
    added: &mut Vec<&'static str>,
    info: TypeInfo,
) -> Result<Shape, BinaryError> {
    match info {
        TypeInfo::Primitive(kind) => Ok(Shape::Primitive(kind)),
        TypeInfo::Unsupported(type_name) => Err(BinaryError::NotSupported(type_name)),
        TypeInfo::Collection { type_name, element } => {
            if let Some(shape) = shapes.get(type_name) {
                return Ok(shape.clone());
            }
            let element = discover(shapes, added, element())?;
            let shape = Shape::Collection(Arc::new(element));
            shapes.insert(type_name, shape.clone());
            added.push(type_name);
            Ok(shape)
        }
        TypeInfo::Object {
            type_name,
            properties,
        } => {
            if let Some(shape) = shapes.get(type_name) {
                return Ok(shape.clone());
            }
            // Registered before its properties so self references resolve to it.
            let object = Arc::new(ObjectShape {
                type_name,
                properties: OnceLock::new(),
            });
            let shape = Shape::Object(Arc::clone(&object));
            shapes.insert(type_name, shape.clone());
            added.push(type_name);

            let mut visible: Vec<_> = properties
                .into_iter()
                .filter(|p| p.access == Access::ReadWrite)
                .collect();
            visible.sort_by(|a, b| a.name.cmp(b.name));

            let mut resolved = Vec::with_capacity(visible.len());
            for property in visible {
                resolved.push(PropertyShape {
                    name: property.name,
                    shape: discover(shapes, added, (property.type_info)())?,
                });
            }
            log::debug!(
                "discovered shape of '{type_name}' with {} properties",
                resolved.len()
            );
            // Fresh cell, never set before.
            let _ = object.properties.set(resolved);
            Ok(shape)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::PropertyInfo;
    use crate::value::Value;

    struct Node;

    impl Reflect for Node {
        fn type_info() -> TypeInfo {
            TypeInfo::Object {
                type_name: "Node",
                properties: vec![
                    PropertyInfo::read_write::<Vec<Self>>("Children"),
                    PropertyInfo::read_write::<String>("Name"),
                    PropertyInfo::read_only::<i32>("Depth"),
                    PropertyInfo {
                        name: "Cache",
                        access: Access::Private,
                        type_info: <Vec<i32>>::type_info,
                    },
                ],
            }
        }

        fn to_value(&self) -> Value {
            Value::Null
        }

        fn from_value(_: Value) -> Result<Self, BinaryError> {
            Ok(Self)
        }
    }

    struct Broken;

    impl Reflect for Broken {
        fn type_info() -> TypeInfo {
            TypeInfo::Object {
                type_name: "Broken",
                properties: vec![
                    PropertyInfo::read_write::<Vec<i32>>("Fine"),
                    PropertyInfo::read_write::<u8>("Flag"),
                ],
            }
        }

        fn to_value(&self) -> Value {
            Value::Null
        }

        fn from_value(_: Value) -> Result<Self, BinaryError> {
            Ok(Self)
        }
    }

    #[test]
    fn only_read_write_properties_sorted_by_name() {
        let cache = ShapeCache::new();
        let shape = cache.discover::<Node>().unwrap();
        let object = shape.as_object().unwrap();
        let names: Vec<_> = object.properties().iter().map(|p| p.name).collect();
        assert_eq!(names, ["Children", "Name"]);
    }

    #[test]
    fn recursive_shape_refers_to_itself() {
        let cache = ShapeCache::new();
        let shape = cache.discover::<Node>().unwrap();
        let Shape::Object(node) = &shape else {
            panic!("expected object shape");
        };
        let Shape::Collection(element) = &node.properties()[0].shape else {
            panic!("expected collection shape");
        };
        let Shape::Object(child) = element.as_ref() else {
            panic!("expected object element");
        };
        assert!(Arc::ptr_eq(node, child));
        assert_eq!(format!("{shape:?}"), "Object(\"Node\")");
    }

    #[test]
    fn shapes_are_cached_by_type_name() {
        let cache = ShapeCache::new();
        let a = cache.discover::<Node>().unwrap();
        let b = cache.discover::<Node>().unwrap();
        let (Shape::Object(a), Shape::Object(b)) = (a, b) else {
            panic!("expected object shapes");
        };
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.contains("Node"));
    }

    #[test]
    fn unsupported_member_fails_and_rolls_back() {
        let cache = ShapeCache::new();
        assert!(matches!(
            cache.discover::<Broken>(),
            Err(BinaryError::NotSupported("u8"))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn primitives_are_not_cached() {
        let cache = ShapeCache::new();
        assert!(matches!(
            cache.discover::<i32>().unwrap(),
            Shape::Primitive(PrimitiveKind::I32)
        ));
        assert!(cache.is_empty());
    }
}
