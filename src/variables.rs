use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ErrorCode, GraphQLError};
use crate::scalar::ID;

/// The GraphQL type of a variable.
///
/// Every position is non-null unless wrapped in `Nullable`, mirroring how Rust types are
/// required unless wrapped in `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(Cow<'static, str>),
    List(Box<TypeRef>),
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn nullable(inner: TypeRef) -> Self {
        match inner {
            TypeRef::Nullable(_) => inner,
            other => TypeRef::Nullable(Box::new(other)),
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, required: bool) -> fmt::Result {
        match self {
            TypeRef::Nullable(inner) => return inner.write(f, false),
            TypeRef::Named(name) => f.write_str(name)?,
            TypeRef::List(inner) => {
                f.write_str("[")?;
                inner.write(f, true)?;
                f.write_str("]")?;
            }
        }
        if required {
            f.write_str("!")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, true)
    }
}

/// Types that know their GraphQL input type.
///
/// The type comes from the Rust type rather than the value, so `None` and empty lists still
/// declare a complete type. Custom scalars, enums and input objects implement this through
/// `#[derive(InputType)]`.
pub trait InputType {
    fn type_ref() -> TypeRef;
}

macro_rules! named_input_types {
    ($($name:literal => $($ty:ty),+;)*) => {
        $($(
            impl InputType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::named($name)
                }
            }
        )+)*
    };
}

named_input_types! {
    "String" => String, str, char;
    "Boolean" => bool;
    "Int" => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize;
    "Float" => f32, f64;
    "ID" => ID;
}

impl<T: InputType> InputType for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::nullable(T::type_ref())
    }
}

impl<T: InputType> InputType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::list(T::type_ref())
    }
}

impl<T: InputType> InputType for [T] {
    fn type_ref() -> TypeRef {
        TypeRef::list(T::type_ref())
    }
}

impl<T: InputType, const N: usize> InputType for [T; N] {
    fn type_ref() -> TypeRef {
        TypeRef::list(T::type_ref())
    }
}

impl<T: InputType + ?Sized> InputType for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

impl<T: InputType + ?Sized> InputType for &T {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }
}

/// A variable value together with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub type_ref: TypeRef,
    pub value: Value,
}

/// The variables of one operation, kept in name order so declarations render deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(BTreeMap<String, Variable>);

impl Variables {
    pub fn new() -> Self {
        Variables::default()
    }

    /// Binds `value` to `name`, typed from the Rust type of `value`. A value that cannot be
    /// serialized yields a `json_encode_error`.
    pub fn insert<T>(&mut self, name: impl Into<String>, value: T) -> Result<(), GraphQLError>
    where
        T: InputType + Serialize,
    {
        let value = serde_json::to_value(&value)
            .map_err(|error| GraphQLError::with_code(error.to_string(), ErrorCode::JsonEncodeError))?;
        self.typed(name, T::type_ref(), value);
        Ok(())
    }

    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Result<Self, GraphQLError>
    where
        T: InputType + Serialize,
    {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Binds a raw JSON value under an explicitly given type.
    pub fn typed(&mut self, name: impl Into<String>, type_ref: TypeRef, value: Value) {
        self.0.insert(name.into(), Variable { type_ref, value });
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.0.iter().map(|(name, variable)| (name.as_str(), variable))
    }

    /// Declarations in `$name:Type` form, sorted by name and not separated.
    pub fn declarations(&self) -> String {
        self.0
            .iter()
            .map(|(name, variable)| format!("${}:{}", name, variable.type_ref))
            .collect()
    }

    /// The values as the `variables` member of a request.
    pub fn to_json(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(name, variable)| (name.clone(), variable.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Serialize)]
    enum IssueState {
        #[serde(rename = "OPEN")]
        Open,
        #[serde(rename = "CLOSED")]
        Closed,
    }

    impl InputType for IssueState {
        fn type_ref() -> TypeRef {
            TypeRef::named("IssueState")
        }
    }

    fn declarations(variables: Variables) -> String {
        variables.declarations()
    }

    #[test]
    fn scalar_and_optional_types() -> Result<(), GraphQLError> {
        let variables = Variables::new().with("a", 123)?.with("b", Some(true))?;
        assert_eq!(declarations(variables), "$a:Int!$b:Boolean");
        Ok(())
    }

    #[test]
    fn sorted_regardless_of_insertion_order() -> Result<(), GraphQLError> {
        let variables = Variables::new().with("b", "x")?.with("a", 1.5)?;
        assert_eq!(declarations(variables), "$a:Float!$b:String!");
        Ok(())
    }

    #[test]
    fn lists_of_enums() -> Result<(), GraphQLError> {
        let variables = Variables::new()
            .with("required", vec![IssueState::Open, IssueState::Closed])?
            .with("optional", Some(vec![IssueState::Open, IssueState::Closed]))?;
        assert_eq!(declarations(variables), "$optional:[IssueState!]$required:[IssueState!]!");
        Ok(())
    }

    #[test]
    fn absent_values_still_have_a_type() -> Result<(), GraphQLError> {
        let variables = Variables::new()
            .with("required", Vec::<IssueState>::new())?
            .with("optional", None::<Vec<IssueState>>)?;
        assert_eq!(declarations(variables), "$optional:[IssueState!]$required:[IssueState!]!");
        Ok(())
    }

    #[test]
    fn arrays_and_ids() -> Result<(), GraphQLError> {
        let variables = Variables::new()
            .with("required", [IssueState::Open, IssueState::Closed])?
            .with("optional", Some([IssueState::Open, IssueState::Closed]))?;
        assert_eq!(declarations(variables), "$optional:[IssueState!]$required:[IssueState!]!");

        assert_eq!(declarations(Variables::new().with("id", ID::new("someID"))?), "$id:ID!");
        assert_eq!(
            declarations(Variables::new().with("ids", vec![ID::new("someID"), ID::new("anotherID")])?),
            "$ids:[ID!]!"
        );
        assert_eq!(
            declarations(Variables::new().with("ids", Some(vec![ID::new("someID")]))?),
            "$ids:[ID!]"
        );
        Ok(())
    }

    #[test]
    fn nested_nullability() {
        assert_eq!(<Option<Vec<Option<i32>>>>::type_ref().to_string(), "[Int]");
        assert_eq!(<Option<Option<bool>>>::type_ref().to_string(), "Boolean");
        assert_eq!(<&[String]>::type_ref().to_string(), "[String!]!");
    }

    #[test]
    fn values_are_serialized() -> Result<(), GraphQLError> {
        let mut variables = Variables::new();
        variables.insert("state", IssueState::Closed)?;
        variables.typed("raw", TypeRef::named("JSON"), json!({ "a": 1 }));
        assert_eq!(Value::Object(variables.to_json()), json!({ "state": "CLOSED", "raw": { "a": 1 } }));
        assert_eq!(variables.declarations(), "$raw:JSON!$state:IssueState!");
        Ok(())
    }
}
