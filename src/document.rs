use std::fmt;

use crate::selection::{Field, Selectable};
use crate::variables::Variables;
use crate::writer::DocumentWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub const fn keyword(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

/// Everything about an operation besides its selections and variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    kind: OperationKind,
    name: Option<String>,
    directives: Vec<String>,
}

impl Operation {
    pub fn new(kind: OperationKind) -> Self {
        Operation { kind, name: None, directives: Vec::new() }
    }

    pub fn query() -> Self {
        Operation::new(OperationKind::Query)
    }

    pub fn mutation() -> Self {
        Operation::new(OperationKind::Mutation)
    }

    pub fn subscription() -> Self {
        Operation::new(OperationKind::Subscription)
    }

    pub fn with_kind(mut self, kind: OperationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// Appends an operation directive such as `@cached(ttl: 100)`, rendered verbatim.
    pub fn directive(mut self, directive: impl fmt::Display) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn directives(&self) -> &[String] {
        &self.directives
    }
}

/// An operation ready to be rendered.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub operation: &'a Operation,
    pub variables: &'a Variables,
    pub root: Field,
}

impl<'a> Document<'a> {
    pub fn new<T: Selectable>(operation: &'a Operation, value: &T, variables: &'a Variables) -> Self {
        Document { operation, variables, root: Field::root(T::selections(Some(value))) }
    }

    /// Renders the document text.
    ///
    /// A plain query without name, variables or directives uses the shorthand form and is
    /// only its selection set.
    pub fn render(&self) -> String {
        let operation = self.operation;
        let mut writer = DocumentWriter::new();

        let shorthand = operation.kind == OperationKind::Query
            && operation.name.is_none()
            && self.variables.is_empty()
            && operation.directives.is_empty();

        if !shorthand {
            writer.push(operation.kind.keyword());
            if operation.name.is_some() || !self.variables.is_empty() {
                writer.push(" ");
                writer.push(operation.name.as_deref().unwrap_or_default());
                if !self.variables.is_empty() {
                    writer.push("(");
                    writer.push(&self.variables.declarations());
                    writer.push(")");
                }
            }
            if !operation.directives.is_empty() {
                writer.push(" ");
                writer.push(&operation.directives.join(" "));
                writer.push(" ");
            }
        }

        writer.selection_set(std::slice::from_ref(&self.root));
        writer.build_string()
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

pub fn construct_operation<T: Selectable>(value: &T, variables: &Variables, operation: &Operation) -> String {
    let document = Document::new(operation, value, variables).render();
    tracing::debug!(kind = operation.kind.keyword(), %document, "constructed document");
    document
}

pub fn construct_query<T: Selectable>(value: &T, variables: &Variables) -> String {
    construct_operation(value, variables, &Operation::query())
}

pub fn construct_mutation<T: Selectable>(value: &T, variables: &Variables) -> String {
    construct_operation(value, variables, &Operation::mutation())
}

pub fn construct_subscription<T: Selectable>(value: &T, variables: &Variables) -> String {
    construct_operation(value, variables, &Operation::subscription())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphQLError;
    use pretty_assertions::assert_eq;

    fn tree() -> Field {
        Field::root(vec![Field::branch(
            "viewer",
            vec![Field::leaf("login"), Field::leaf("createdAt")],
        )])
    }

    fn render(operation: &Operation, variables: &Variables) -> String {
        Document { operation, variables, root: tree() }.render()
    }

    #[test]
    fn query_shorthand() {
        assert_eq!(render(&Operation::query(), &Variables::new()), "{viewer{login,createdAt}}");
    }

    #[test]
    fn named_query_with_directives() {
        let operation = Operation::query().name("GetViewer").directive("@cached");
        assert_eq!(render(&operation, &Variables::new()), "query GetViewer @cached {viewer{login,createdAt}}");
    }

    #[test]
    fn variables_and_directives() -> Result<(), GraphQLError> {
        let variables = Variables::new().with("login", "gopher")?.with("first", 10)?;
        let operation = Operation::query().name("SearchViewer").directive("@cached(ttl: 100)");
        assert_eq!(
            render(&operation, &variables),
            "query SearchViewer($first:Int!$login:String!) @cached(ttl: 100) {viewer{login,createdAt}}"
        );
        assert_eq!(
            render(&Operation::query(), &variables),
            "query ($first:Int!$login:String!){viewer{login,createdAt}}"
        );
        Ok(())
    }

    #[test]
    fn keyword_always_written_for_other_kinds() {
        assert_eq!(render(&Operation::subscription(), &Variables::new()), "subscription{viewer{login,createdAt}}");
        assert_eq!(
            render(&Operation::subscription().name("Watch"), &Variables::new()),
            "subscription Watch{viewer{login,createdAt}}"
        );
        assert_eq!(render(&Operation::mutation(), &Variables::new()), "mutation{viewer{login,createdAt}}");
    }

    #[test]
    fn empty_name_is_no_name() {
        assert_eq!(render(&Operation::query().name(""), &Variables::new()), "{viewer{login,createdAt}}");
    }

    #[test]
    fn rendering_is_deterministic() -> Result<(), GraphQLError> {
        let variables = Variables::new().with("b", true)?.with("a", 1)?;
        let operation = Operation::mutation().name("Twice");
        assert_eq!(render(&operation, &variables), render(&operation, &variables));
        Ok(())
    }
}
