use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::annotation::{self, Annotation};
use crate::decode::{decode_scalar, kind, DecodeContext};

/// A node of the selection tree a document is rendered from.
///
/// A field without children is a leaf. An `inline` field contributes its children directly to
/// the enclosing selection set; the document root is always inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub arguments: String,
    pub children: Vec<Field>,
    pub excluded: bool,
    pub scalar: bool,
    pub inline: bool,
}

impl Field {
    pub fn leaf(name: impl Into<String>) -> Field {
        Field { name: name.into(), ..Field::default() }
    }

    pub fn branch(name: impl Into<String>, children: Vec<Field>) -> Field {
        Field { name: name.into(), children, ..Field::default() }
    }

    pub fn root(children: Vec<Field>) -> Field {
        Field { children, inline: true, ..Field::default() }
    }

    pub fn from_annotation(annotation: &Annotation, children: Vec<Field>) -> Field {
        Field {
            name: annotation.name.clone(),
            arguments: annotation.arguments.clone(),
            children,
            excluded: annotation.excluded,
            scalar: annotation.scalar,
            inline: annotation.inline,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.scalar || self.children.is_empty()
    }
}

/// Whether `object` carries a key for any of `fields`. Inlined fields and fragment spreads
/// count through their children.
pub(crate) fn any_key_present(fields: &[Field], object: &Value) -> bool {
    fields.iter().any(|field| {
        if field.inline || annotation::is_fragment(&field.name) {
            any_key_present(&field.children, object)
        } else {
            object.get(annotation::response_key(&field.name)).is_some()
        }
    })
}

/// Types that describe a GraphQL selection and can be filled from response data.
///
/// Implemented for scalars, for `Option`, `Vec`, arrays and `Box` of selectable types, for
/// [`SelectionMap`](crate::SelectionMap), and for structs through `#[derive(Selectable)]`.
pub trait Selectable {
    /// The selections this type contributes below its field. Empty for leaves.
    ///
    /// The shape comes from the type; `value` is only consulted where the selection exists at
    /// runtime alone, as in a `SelectionMap`.
    fn selections(value: Option<&Self>) -> Vec<Field>
    where
        Self: Sized;

    /// Fills `self` from a response value. Problems are reported to `cx` and leave the
    /// affected part of `self` as it was.
    fn decode(&mut self, value: &Value, cx: &mut DecodeContext);

    /// Carries the selections that only exist at runtime, such as the pairs of a nested
    /// `SelectionMap`, over to `fresh`. Lists use it to shape elements they append.
    fn copy_shape(&self, _fresh: &mut Self) {}
}

/// Appends the selection of one struct member.
pub fn select_member<T: Selectable>(annotation: &Annotation, value: Option<&T>, fields: &mut Vec<Field>) {
    if annotation.excluded {
        return;
    }
    if annotation.scalar {
        fields.push(Field::from_annotation(annotation, Vec::new()));
        return;
    }
    let children = T::selections(value);
    if annotation.inline {
        fields.extend(children);
    } else {
        fields.push(Field::from_annotation(annotation, children));
    }
}

/// Appends a member whose type is never inspected.
pub fn select_opaque(annotation: &Annotation, fields: &mut Vec<Field>) {
    if !annotation.excluded {
        fields.push(Field::from_annotation(annotation, Vec::new()));
    }
}

/// Decodes one struct member from the enclosing response object.
///
/// A member that decodes from the parent is skipped when none of its keys are present, so an
/// optional fragment spread stays `None` for objects of another type.
pub fn decode_member<T: Selectable>(
    annotation: &Annotation,
    target: &mut T,
    object: &Value,
    cx: &mut DecodeContext,
) {
    if annotation.decodes_from_parent()
        && !annotation.scalar
        && !any_key_present(&T::selections(Some(&*target)), object)
    {
        return;
    }
    visit_member(annotation, object, cx, |value, cx| target.decode(value, cx));
}

/// Decodes a member marked as opaque scalar through its serde implementation.
pub fn decode_opaque<T: DeserializeOwned>(
    annotation: &Annotation,
    target: &mut T,
    object: &Value,
    cx: &mut DecodeContext,
) {
    visit_member(annotation, object, cx, |value, cx| decode_scalar(target, value, cx));
}

pub(crate) fn visit_member(
    annotation: &Annotation,
    object: &Value,
    cx: &mut DecodeContext,
    decode: impl FnOnce(&Value, &mut DecodeContext),
) {
    if annotation.excluded {
        return;
    }
    if annotation.decodes_from_parent() && !annotation.scalar {
        decode(object, cx);
        return;
    }
    let key = annotation.response_key();
    if let Some(value) = object.get(key) {
        cx.at_key(key, |cx| decode(value, cx));
    }
}

impl<T: Selectable + Default> Selectable for Option<T> {
    fn selections(value: Option<&Self>) -> Vec<Field> {
        T::selections(value.and_then(Option::as_ref))
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) {
        if value.is_null() {
            *self = None;
            return;
        }
        match self {
            Some(inner) => inner.decode(value, cx),
            None => {
                let mut inner = T::default();
                if !cx.rejects(|cx| inner.decode(value, cx)) {
                    *self = Some(inner);
                }
            }
        }
    }

    /// A `None` slot is only filled when the template carries runtime selections; otherwise
    /// the slot keeps meaning "not in the response".
    fn copy_shape(&self, fresh: &mut Self) {
        let Some(template) = self else {
            return;
        };
        match fresh {
            Some(inner) => template.copy_shape(inner),
            None if T::selections(Some(template)) != T::selections(None) => {
                let mut inner = T::default();
                template.copy_shape(&mut inner);
                *fresh = Some(inner);
            }
            None => {}
        }
    }
}

impl<T: Selectable + Default> Selectable for Vec<T> {
    fn selections(value: Option<&Self>) -> Vec<Field> {
        T::selections(value.and_then(|items| items.first()))
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                self.truncate(items.len());
                for (index, item) in items.iter().enumerate() {
                    if index == self.len() {
                        let mut element = T::default();
                        if let Some(template) = self.first() {
                            template.copy_shape(&mut element);
                        }
                        self.push(element);
                    }
                    cx.at_index(index, |cx| self[index].decode(item, cx));
                }
            }
            other => cx.fail(format!("expected a list, found {}", kind(other))),
        }
    }

    /// An empty list gets one shaped element when the template's elements carry runtime
    /// selections, so lists nested inside appended elements can shape their own elements.
    fn copy_shape(&self, fresh: &mut Self) {
        let Some(template) = self.first() else {
            return;
        };
        if fresh.is_empty() && T::selections(Some(template)) != T::selections(None) {
            fresh.push(T::default());
        }
        for element in fresh.iter_mut() {
            template.copy_shape(element);
        }
    }
}

impl<T: Selectable, const N: usize> Selectable for [T; N] {
    fn selections(value: Option<&Self>) -> Vec<Field> {
        T::selections(value.and_then(|items| items.first()))
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for (index, (slot, item)) in self.iter_mut().zip(items).enumerate() {
                    cx.at_index(index, |cx| slot.decode(item, cx));
                }
            }
            other => cx.fail(format!("expected a list, found {}", kind(other))),
        }
    }

    fn copy_shape(&self, fresh: &mut Self) {
        for (template, slot) in self.iter().zip(fresh.iter_mut()) {
            template.copy_shape(slot);
        }
    }
}

impl<T: Selectable> Selectable for Box<T> {
    fn selections(value: Option<&Self>) -> Vec<Field> {
        T::selections(value.map(|boxed| &**boxed))
    }

    fn decode(&mut self, value: &Value, cx: &mut DecodeContext) {
        (**self).decode(value, cx)
    }

    fn copy_shape(&self, fresh: &mut Self) {
        (**self).copy_shape(&mut **fresh)
    }
}
