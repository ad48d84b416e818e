// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary round trips of models, collections and shared children.

#![cfg(feature = "binary")]

use catel_model::binary::{BinaryError, BinarySerializer};
use catel_model::{
    Model, ModelBase, ModelExt, ModelType, ObservableCollection, Property,
    PropertyDescriptorBuilder, PropertyRegistrar, Shared, reflect_model,
};

const NAME: Property<Option<String>> = Property::new("Name");
const AGE: Property<i32> = Property::new("Age");
const SESSION: Property<String> = Property::new("Session");

#[derive(Debug)]
struct Person {
    base: ModelBase,
}

impl Default for Person {
    fn default() -> Self {
        Self {
            base: ModelBase::new::<Self>(),
        }
    }
}

impl ModelType for Person {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar
            .register(PropertyDescriptorBuilder::new(NAME, None).build())
            .register(PropertyDescriptorBuilder::new(AGE, 0).build())
            .register(
                PropertyDescriptorBuilder::new(SESSION, String::from("none"))
                    .include_in_serialization(false)
                    .build(),
            );
    }
}

impl Model for Person {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }
}

reflect_model!(Person { NAME, AGE, SESSION });

const ITEM_NAME: Property<String> = Property::new("Name");
const ITEMS: Property<ObservableCollection<Item>> = Property::new("Items");

#[derive(Debug)]
struct Item {
    base: ModelBase,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            base: ModelBase::new::<Self>(),
        }
    }
}

impl ModelType for Item {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar.register(PropertyDescriptorBuilder::new(ITEM_NAME, String::from("MyName")).build());
    }
}

impl Model for Item {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }
}

reflect_model!(Item { ITEM_NAME });

#[derive(Debug)]
struct Group {
    base: ModelBase,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            base: ModelBase::new::<Self>(),
        }
    }
}

impl ModelType for Group {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar.register(
            PropertyDescriptorBuilder::with_factory(ITEMS, ObservableCollection::new)
                .observable()
                .build(),
        );
    }
}

impl Model for Group {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }
}

reflect_model!(Group { ITEMS });

const CITY: Property<String> = Property::new("City");
const BILLING: Property<Shared<Address>> = Property::new("Billing");

#[derive(Debug)]
struct Address {
    base: ModelBase,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            base: ModelBase::new::<Self>(),
        }
    }
}

impl ModelType for Address {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar.register(PropertyDescriptorBuilder::new(CITY, String::new()).build());
    }
}

impl Model for Address {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }
}

reflect_model!(Address { CITY });

#[derive(Debug)]
struct Customer {
    base: ModelBase,
}

impl Default for Customer {
    fn default() -> Self {
        Self {
            base: ModelBase::new::<Self>(),
        }
    }
}

impl ModelType for Customer {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar.register(
            PropertyDescriptorBuilder::with_factory(BILLING, || Shared::new(Address::default()))
                .observable()
                .build(),
        );
    }
}

impl Model for Customer {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }
}

reflect_model!(Customer { BILLING });

const LEVEL: Property<i32> = Property::new("Level");

#[derive(Debug)]
struct Misregistered {
    base: ModelBase,
}

impl Default for Misregistered {
    fn default() -> Self {
        Self {
            base: ModelBase::new::<Self>(),
        }
    }
}

impl ModelType for Misregistered {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar
            .register(PropertyDescriptorBuilder::new(LEVEL, 0).build())
            .register(PropertyDescriptorBuilder::new(LEVEL, 1).build());
    }
}

impl Model for Misregistered {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }
}

reflect_model!(Misregistered { LEVEL });

#[test]
fn model_round_trip_loads_clean() {
    let serializer = BinarySerializer::new();
    let mut person = Person::default();
    person.set_value(NAME, Some(String::from("Alice")));
    person.set_value(AGE, 30);
    person.set_value(SESSION, String::from("abc"));

    let bytes = serializer.to_bytes(&person).unwrap();
    assert_eq!(&bytes[..4], &30_i32.to_le_bytes());
    assert_eq!(&bytes[4..8], &5_i32.to_le_bytes());
    assert_eq!(&bytes[8..], b"Alice");

    let copy: Person = serializer.from_bytes(&bytes).unwrap();
    assert_eq!(copy.get_value(NAME).as_deref(), Some("Alice"));
    assert_eq!(copy.get_value(AGE), 30);
    assert_eq!(copy.get_value(SESSION), "none");
    assert!(!copy.is_dirty());
}

#[test]
fn missing_name_round_trips_as_none() {
    let serializer = BinarySerializer::new();
    let bytes = serializer.to_bytes(&Person::default()).unwrap();
    let copy: Person = serializer.from_bytes(&bytes).unwrap();
    assert_eq!(copy.get_value(NAME), None);
    assert_eq!(copy.get_value(AGE), 0);
}

#[test]
fn truncated_input_is_an_error() {
    let serializer = BinarySerializer::new();
    let bytes = serializer
        .to_bytes(&{
            let mut person = Person::default();
            person.set_value(NAME, Some(String::from("Alice")));
            person
        })
        .unwrap();
    assert!(serializer.from_bytes::<Person>(&bytes[..6]).is_err());
}

#[test]
fn collection_of_models_round_trips_and_stays_observed() {
    let serializer = BinarySerializer::new();
    let group = Group::default();
    let items = group.get_value(ITEMS);
    items.push(Item::default());
    let mut renamed = Item::default();
    renamed.set_value(ITEM_NAME, String::from("Other"));
    items.push(renamed);

    let bytes = serializer.to_bytes(&group).unwrap();
    let copy: Group = serializer.from_bytes(&bytes).unwrap();
    assert!(!copy.is_dirty());

    let names: Vec<String> = copy
        .get_value(ITEMS)
        .items()
        .iter()
        .map(|item| item.get_value(ITEM_NAME))
        .collect();
    assert_eq!(names, ["MyName", "Other"]);

    copy.get_value(ITEMS).push(Item::default());
    assert!(copy.is_dirty());
}

#[test]
fn shared_child_round_trips() {
    let serializer = BinarySerializer::new();
    let customer = Customer::default();
    customer
        .get_value(BILLING)
        .borrow_mut()
        .set_value(CITY, String::from("Oslo"));

    let bytes = serializer.to_bytes(&customer).unwrap();
    let copy: Customer = serializer.from_bytes(&bytes).unwrap();
    assert_eq!(copy.get_value(BILLING).borrow().get_value(CITY), "Oslo");
    assert!(!copy.is_dirty());

    copy.get_value(BILLING)
        .borrow_mut()
        .set_value(CITY, String::from("Bergen"));
    assert!(copy.is_dirty());
}

#[test]
fn model_with_invalid_registration_has_no_shape() {
    let serializer = BinarySerializer::new();
    assert!(matches!(
        serializer.discover_shape::<Misregistered>(),
        Err(BinaryError::NotSupported(_))
    ));
    assert!(serializer.discover_shape::<Person>().is_ok());
}
