// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ready-made field rules for [`PropertyDescriptorBuilder::rule`].
//!
//! [`PropertyDescriptorBuilder::rule`]: crate::PropertyDescriptorBuilder::rule

use core::fmt::Debug;

use crate::descriptor::RuleViolation;

/// Values that can be missing.
pub trait Presence {
    /// Returns `true` if the value counts as provided.
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_present)
    }
}

macro_rules! always_present {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Presence for $ty {
                fn is_present(&self) -> bool {
                    true
                }
            }
        )*
    };
}

always_present!(bool, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Rejects missing values: `None`, empty or blank strings, empty vectors.
pub fn required<T: Presence>(
    message: &'static str,
) -> impl Fn(&T) -> Option<RuleViolation> + Send + Sync + 'static {
    move |value| (!value.is_present()).then(|| RuleViolation::error(message))
}

/// Rejects values outside `min..=max`.
pub fn range<T>(min: T, max: T) -> impl Fn(&T) -> Option<RuleViolation> + Send + Sync + 'static
where
    T: PartialOrd + Debug + Send + Sync + 'static,
{
    move |value| {
        (*value < min || *value > max).then(|| {
            RuleViolation::error(format!("value {value:?} must be between {min:?} and {max:?}"))
        })
    }
}

/// Rejects strings longer than `max` characters.
pub fn max_length(max: usize) -> impl Fn(&String) -> Option<RuleViolation> + Send + Sync + 'static {
    move |value| {
        let len = value.chars().count();
        (len > max).then(|| {
            RuleViolation::error(format!("length {len} exceeds the maximum of {max}"))
        })
    }
}
