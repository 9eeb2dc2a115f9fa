use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::annotation::Annotation;
use crate::decode::DecodeContext;
use crate::selection::{any_key_present, visit_member, Field, Selectable};

/// Object-safe view of a [`Selectable`] value, so differently typed values can share one
/// [`SelectionMap`].
pub trait AnySelectable: Send + Sync {
    fn selection_set(&self) -> Vec<Field>;
    fn decode_value(&mut self, value: &Value, cx: &mut DecodeContext);
    /// A default value of the same type, shaped like this one.
    fn blank(&self) -> Box<dyn AnySelectable>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> AnySelectable for T
where
    T: Selectable + Default + Send + Sync + 'static,
{
    fn selection_set(&self) -> Vec<Field> {
        <T as Selectable>::selections(Some(self))
    }

    fn decode_value(&mut self, value: &Value, cx: &mut DecodeContext) {
        <T as Selectable>::decode(self, value, cx)
    }

    fn blank(&self) -> Box<dyn AnySelectable> {
        let mut fresh = T::default();
        <T as Selectable>::copy_shape(self, &mut fresh);
        Box::new(fresh)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An ordered list of `(selection text, value)` pairs.
///
/// Each pair selects its value's shape under a literal field text, which lets one parent select
/// the same structure several times with different names or arguments:
///
/// ```
/// use graphql_mold::{construct_mutation, Selectable, SelectionMap, Variables};
///
/// #[derive(Default, Selectable)]
/// struct User {
///     login: String,
/// }
///
/// let users = SelectionMap::new()
///     .with("createUser(login: $first)", User::default())
///     .with("deleteUser(login: $second)", User::default());
/// let variables = Variables::new().with("first", "grihabor")?.with("second", "diman")?;
///
/// assert_eq!(
///     construct_mutation(&users, &variables),
///     "mutation ($first:String!$second:String!){createUser(login: $first){login},deleteUser(login: $second){login}}"
/// );
/// # Ok::<(), graphql_mold::GraphQLError>(())
/// ```
///
/// Pairs render and decode in insertion order. A map inside a list shapes the elements the
/// list appends while decoding, so every element decodes the same pairs.
#[derive(Default)]
pub struct SelectionMap {
    entries: Vec<(String, Box<dyn AnySelectable>)>,
}

impl SelectionMap {
    pub fn new() -> Self {
        SelectionMap::default()
    }

    pub fn with<T>(mut self, selection: impl Into<String>, value: T) -> Self
    where
        T: Selectable + Default + Send + Sync + 'static,
    {
        self.insert(selection, value);
        self
    }

    pub fn insert<T>(&mut self, selection: impl Into<String>, value: T)
    where
        T: Selectable + Default + Send + Sync + 'static,
    {
        self.entries.push((selection.into(), Box::new(value)));
    }

    /// The value stored under `selection`, if it exists and has type `T`.
    pub fn get<T: 'static>(&self, selection: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(text, _)| text == selection)
            .and_then(|(_, value)| value.as_any().downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self, selection: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(text, _)| text == selection)
            .and_then(|(_, value)| value.as_any_mut().downcast_mut())
    }

    pub fn get_index<T: 'static>(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(|(_, value)| value.as_any().downcast_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selection_texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(text, _)| text.as_str())
    }
}

impl fmt::Debug for SelectionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.selection_texts()).finish()
    }
}

impl Selectable for SelectionMap {
    fn selections(value: Option<&Self>) -> Vec<Field> {
        let Some(map) = value else {
            return Vec::new();
        };
        map.entries
            .iter()
            .map(|(text, value)| Field::from_annotation(&Annotation::parse(text), value.selection_set()))
            .collect()
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) {
        if !cx.expect_object(value) {
            return;
        }
        if self.entries.is_empty() && value.as_object().is_some_and(|object| !object.is_empty()) {
            cx.fail("no selections to decode the object into");
            return;
        }
        for (text, entry) in &mut self.entries {
            let annotation = Annotation::parse(text);
            if annotation.decodes_from_parent() && !any_key_present(&entry.selection_set(), value) {
                continue;
            }
            visit_member(&annotation, value, cx, |value, cx| entry.decode_value(value, cx));
        }
    }

    fn copy_shape(&self, fresh: &mut Self) {
        fresh.entries = self.entries.iter().map(|(text, value)| (text.clone(), value.blank())).collect();
    }
}
