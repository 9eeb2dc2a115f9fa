use heck::ToLowerCamelCase;

/// Annotation text that removes a field from the document.
pub const EXCLUDE: &str = "-";

const FRAGMENT_PREFIX: &str = "...";

/// A parsed field annotation.
///
/// The annotation mini-language is `name(arguments)`, `name` or `-`. Argument text is kept
/// verbatim, including its parentheses, so `issue(number: $issueNumber)` renders back exactly as
/// written. Whether a field is an opaque scalar or an inlined member comes from separate markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub arguments: String,
    pub excluded: bool,
    pub scalar: bool,
    pub inline: bool,
}

impl Annotation {
    /// Parses annotation text. The name ends at the first `(`; everything from there up to
    /// the last `)` is the argument text. Text without a closing parenthesis is all name.
    pub fn parse(tag: &str) -> Annotation {
        let tag = tag.trim();
        if tag == EXCLUDE {
            return Annotation { excluded: true, ..Annotation::default() };
        }

        match (tag.find('('), tag.rfind(')')) {
            (Some(open), Some(close)) if open < close => Annotation {
                name: tag[..open].to_string(),
                arguments: tag[open..].to_string(),
                ..Annotation::default()
            },
            _ => Annotation { name: tag.to_string(), ..Annotation::default() },
        }
    }

    /// Resolves the annotation of a struct member.
    ///
    /// Without annotation text (or with empty text) the name is the member identifier in
    /// lowerCamelCase. A flattened member is only inlined when it carries no annotation text;
    /// an annotated one, such as `... on IssueComment`, stays a named selection.
    pub fn for_member(ident: &str, tag: Option<&str>, scalar: bool, flatten: bool) -> Annotation {
        let mut annotation = tag.map(Annotation::parse).unwrap_or_default();
        let annotated = !annotation.name.is_empty() || annotation.excluded;
        if annotation.name.is_empty() && !annotation.excluded {
            annotation.name = ident.trim_start_matches("r#").to_lower_camel_case();
        }
        annotation.scalar = scalar;
        annotation.inline = flatten && !annotated;
        annotation
    }

    /// Key under which the selection shows up in a response object: the alias when one is
    /// given, otherwise the field name.
    pub fn response_key(&self) -> &str {
        response_key(&self.name)
    }

    pub fn is_fragment(&self) -> bool {
        is_fragment(&self.name)
    }

    /// Inlined members and fragment spreads have no key of their own in the response;
    /// their fields sit on the enclosing object.
    pub fn decodes_from_parent(&self) -> bool {
        self.inline || self.is_fragment()
    }
}

pub(crate) fn response_key(name: &str) -> &str {
    let head = name.split(':').next().unwrap_or_default();
    head.split_whitespace().next().unwrap_or_default()
}

pub(crate) fn is_fragment(name: &str) -> bool {
    name.trim_start().starts_with(FRAGMENT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_name_and_arguments() {
        let annotation = Annotation::parse(r#"repository(owner: $repositoryOwner, name: "test-repo")"#);
        assert_eq!(annotation.name, "repository");
        assert_eq!(annotation.arguments, r#"(owner: $repositoryOwner, name: "test-repo")"#);
        assert!(!annotation.excluded);
    }

    #[test]
    fn parses_bare_name() {
        let annotation = Annotation::parse("login");
        assert_eq!(annotation.name, "login");
        assert_eq!(annotation.arguments, "");
    }

    #[test]
    fn splits_on_first_open_and_last_close() {
        let annotation = Annotation::parse(r#"node1: node(id: "a(b)")"#);
        assert_eq!(annotation.name, "node1: node");
        assert_eq!(annotation.arguments, r#"(id: "a(b)")"#);
    }

    #[test]
    fn unbalanced_parenthesis_is_part_of_the_name() {
        let annotation = Annotation::parse("weird(");
        assert_eq!(annotation.name, "weird(");
        assert_eq!(annotation.arguments, "");
    }

    #[test]
    fn dash_excludes() {
        let annotation = Annotation::parse("-");
        assert!(annotation.excluded);
        assert_eq!(annotation.name, "");
    }

    #[test]
    fn member_without_annotation_uses_lower_camel_case() {
        assert_eq!(Annotation::for_member("database_id", None, false, false).name, "databaseId");
        assert_eq!(Annotation::for_member("avatar_url", None, false, false).name, "avatarUrl");
        assert_eq!(Annotation::for_member("r#type", None, false, false).name, "type");
        assert_eq!(Annotation::for_member("login", Some(""), false, false).name, "login");
    }

    #[test]
    fn annotated_flatten_member_is_not_inlined() {
        let plain = Annotation::for_member("event", None, false, true);
        assert!(plain.inline);
        assert!(plain.decodes_from_parent());

        let fragment = Annotation::for_member("comment", Some("... on IssueComment"), false, true);
        assert!(!fragment.inline);
        assert!(fragment.is_fragment());
        assert!(fragment.decodes_from_parent());
    }

    #[test]
    fn response_key_prefers_alias() {
        assert_eq!(Annotation::parse(r#"node1: node(id: "X")"#).response_key(), "node1");
        assert_eq!(Annotation::parse("issue(number: 1)").response_key(), "issue");
        assert_eq!(Annotation::parse("user @include(if: $withUser)").response_key(), "user");
        assert_eq!(Annotation::parse("createdAt").response_key(), "createdAt");
    }
}
