// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child models held by reference.

use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use std::rc::Rc;

use catel_property::{ChangeHandler, ChangeNotifier, SubscriptionId};

use crate::base::ModelShared;
use crate::model::Model;

/// A model shared between owners.
///
/// Store a `Shared<M>` in an observable property of a parent model to have
/// the child's property changes mark the parent dirty. Equality is identity.
///
/// ```rust
/// # use catel_model::{Model, ModelBase, ModelExt, ModelType, Property,
/// #     PropertyDescriptorBuilder, PropertyRegistrar, Shared};
/// # const CITY: Property<String> = Property::new("City");
/// # #[derive(Debug)]
/// # struct Address { base: ModelBase }
/// # impl ModelType for Address {
/// #     fn register_properties(r: &mut PropertyRegistrar) {
/// #         r.register(PropertyDescriptorBuilder::new(CITY, String::new()).build());
/// #     }
/// # }
/// # impl Model for Address {
/// #     fn model(&self) -> &ModelBase { &self.base }
/// #     fn model_mut(&mut self) -> &mut ModelBase { &mut self.base }
/// # }
/// let address = Shared::new(Address { base: ModelBase::new::<Address>() });
/// let alias = address.clone();
/// alias.borrow_mut().set_value(CITY, String::from("Oslo"));
/// assert_eq!(address.borrow().get_value(CITY), "Oslo");
/// assert_eq!(address, alias);
/// ```
pub struct Shared<M> {
    model: Rc<RefCell<M>>,
    hub: Rc<ModelShared>,
}

impl<M: Model> Shared<M> {
    /// Wraps `model`.
    #[must_use]
    pub fn new(model: M) -> Self {
        let hub = model.model().hub();
        Self {
            model: Rc::new(RefCell::new(model)),
            hub,
        }
    }

    /// Borrows the model.
    ///
    /// # Panics
    ///
    /// Panics if the model is mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, M> {
        self.model.borrow()
    }

    /// Borrows the model mutably.
    ///
    /// # Panics
    ///
    /// Panics if the model is borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, M> {
        self.model.borrow_mut()
    }
}

impl<M> Clone for Shared<M> {
    fn clone(&self) -> Self {
        Self {
            model: Rc::clone(&self.model),
            hub: Rc::clone(&self.hub),
        }
    }
}

impl<M> PartialEq for Shared<M> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.model, &other.model)
    }
}

impl<M> Eq for Shared<M> {}

impl<M: fmt::Debug> fmt::Debug for Shared<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.model.try_borrow() {
            Ok(model) => f.debug_tuple("Shared").field(&*model).finish(),
            Err(_) => f.write_str("Shared(<borrowed>)"),
        }
    }
}

impl<M: Model> ChangeNotifier for Shared<M> {
    fn subscribe(&self, handler: ChangeHandler) -> Option<SubscriptionId> {
        Some(self.hub.subscribe(handler))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id)
    }

    fn is_dirty(&self) -> bool {
        self.model
            .try_borrow()
            .map_or_else(|_| self.hub.is_dirty(), |model| model.model().is_dirty())
    }
}
