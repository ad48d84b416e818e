// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Begin, cancel and end edit sessions.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use catel_model::{
    CancelEditEventArgs, EditableModel, Model, ModelBase, ModelExt, ModelType, Property,
    PropertyChangedEventArgs, PropertyDescriptorBuilder, PropertyRegistrar, ValidatableModel,
    rules,
};

const TITLE: Property<String> = Property::new("Title");
const PAGES: Property<i32> = Property::new("Pages");
const SCRATCH: Property<String> = Property::new("Scratch");

#[derive(Debug, Default)]
struct Hooks {
    begun: usize,
    ended: usize,
    veto_next_cancel: bool,
    cancel_completed: usize,
}

#[derive(Debug)]
struct Document {
    base: ModelBase,
    hooks: Hooks,
}

impl Document {
    fn new() -> Self {
        Self {
            base: ModelBase::new::<Self>(),
            hooks: Hooks::default(),
        }
    }
}

impl ModelType for Document {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar
            .register(PropertyDescriptorBuilder::new(TITLE, String::from("Untitled")).build())
            .register(
                PropertyDescriptorBuilder::new(PAGES, 1)
                    .rule(rules::range(1, 500))
                    .build(),
            )
            .register(
                PropertyDescriptorBuilder::new(SCRATCH, String::new())
                    .include_in_backup(false)
                    .build(),
            );
    }
}

impl Model for Document {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn on_begin_edit(&mut self) {
        self.hooks.begun += 1;
    }

    fn on_end_edit(&mut self) {
        self.hooks.ended += 1;
    }

    fn on_cancel_edit(&mut self, args: &CancelEditEventArgs) {
        if core::mem::take(&mut self.hooks.veto_next_cancel) {
            args.cancel();
        }
    }

    fn on_cancel_edit_completed(&mut self) {
        self.hooks.cancel_completed += 1;
    }
}

#[test]
fn cancel_restores_backed_up_properties() {
    let mut doc = Document::new();
    doc.set_value(TITLE, String::from("Draft"));
    doc.clear_is_dirty();

    doc.begin_edit();
    assert!(doc.is_in_edit_session());
    doc.set_value(TITLE, String::from("Final"));
    doc.set_value(PAGES, 12);
    assert!(doc.is_dirty());

    assert!(doc.cancel_edit());
    assert!(!doc.is_in_edit_session());
    assert_eq!(doc.get_value(TITLE), "Draft");
    assert_eq!(doc.get_value(PAGES), 1);
    assert!(!doc.is_dirty());
    assert_eq!(doc.hooks.begun, 1);
    assert_eq!(doc.hooks.cancel_completed, 1);
}

#[test]
fn properties_outside_the_backup_survive_cancel() {
    let mut doc = Document::new();
    doc.begin_edit();
    doc.set_value(TITLE, String::from("Final"));
    doc.set_value(SCRATCH, String::from("notes"));

    assert!(doc.cancel_edit());
    assert_eq!(doc.get_value(TITLE), "Untitled");
    assert_eq!(doc.get_value(SCRATCH), "notes");
    assert!(doc.is_dirty());
}

#[test]
fn dirty_flag_returns_to_its_value_at_begin() {
    let mut doc = Document::new();
    doc.set_value(PAGES, 3);
    assert!(doc.is_dirty());

    doc.begin_edit();
    doc.clear_is_dirty();
    doc.set_value(PAGES, 4);
    assert!(doc.cancel_edit());
    assert!(doc.is_dirty());
    assert_eq!(doc.get_value(PAGES), 3);
}

#[test]
fn begin_edit_is_idempotent() {
    let mut doc = Document::new();
    doc.begin_edit();
    doc.set_value(PAGES, 2);
    doc.begin_edit();
    doc.set_value(PAGES, 3);
    assert_eq!(doc.hooks.begun, 1);

    assert!(doc.cancel_edit());
    assert_eq!(doc.get_value(PAGES), 1);
}

#[test]
fn restored_properties_raise_change_events() {
    let mut doc = Document::new();
    let changed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changed);
    doc.model()
        .events()
        .property_changed
        .subscribe(Rc::new(move |args: &PropertyChangedEventArgs| {
            sink.borrow_mut().push(args.property);
        }));

    doc.begin_edit();
    doc.set_value(PAGES, 5);
    doc.set_value(PAGES, 1);
    changed.borrow_mut().clear();

    assert!(doc.cancel_edit());
    let changed = changed.borrow();
    assert!(changed.contains(&"Pages"));
    assert!(changed.contains(&"Title"));
    assert!(!changed.contains(&"Scratch"));
}

#[test]
fn cancel_can_be_vetoed_by_handler_and_hook() {
    let mut doc = Document::new();
    let veto = Rc::new(Cell::new(true));
    let flag = Rc::clone(&veto);
    doc.model()
        .events()
        .cancel_edit
        .subscribe(Rc::new(move |args: &CancelEditEventArgs| {
            if flag.replace(false) {
                args.cancel();
            }
        }));

    doc.begin_edit();
    doc.set_value(TITLE, String::from("Kept"));

    assert!(!doc.cancel_edit());
    assert!(doc.is_in_edit_session());
    assert_eq!(doc.get_value(TITLE), "Kept");

    doc.hooks.veto_next_cancel = true;
    assert!(!doc.cancel_edit());
    assert!(doc.is_in_edit_session());
    assert_eq!(doc.hooks.cancel_completed, 0);

    assert!(doc.cancel_edit());
    assert_eq!(doc.get_value(TITLE), "Untitled");
    assert!(!doc.is_dirty());
    assert_eq!(doc.hooks.cancel_completed, 1);
}

#[test]
fn end_edit_commits() {
    let mut doc = Document::new();
    let ended = Rc::new(Cell::new(0));
    let sink = Rc::clone(&ended);
    doc.model()
        .events()
        .end_edit
        .subscribe(Rc::new(move |_: &()| sink.set(sink.get() + 1)));

    doc.begin_edit();
    doc.set_value(TITLE, String::from("Final"));
    assert!(doc.end_edit());
    assert!(!doc.is_in_edit_session());
    assert_eq!(doc.get_value(TITLE), "Final");
    assert!(doc.is_dirty());
    assert_eq!(ended.get(), 1);
    assert_eq!(doc.hooks.ended, 1);

    assert!(!doc.cancel_edit());
    assert_eq!(doc.get_value(TITLE), "Final");
}

#[test]
fn closing_without_a_session_does_nothing() {
    let mut doc = Document::new();
    assert!(!doc.end_edit());
    assert!(!doc.cancel_edit());
    assert_eq!(doc.hooks.ended, 0);
    assert_eq!(doc.hooks.cancel_completed, 0);
}

#[test]
fn cancel_revalidates_restored_properties() {
    let mut doc = Document::new();
    doc.validate();
    doc.begin_edit();
    doc.set_value(PAGES, 0);
    assert_eq!(doc.validation_context().field_errors("Pages").len(), 1);

    assert!(doc.cancel_edit());
    assert!(doc.validation_context().field_errors("Pages").is_empty());
}
