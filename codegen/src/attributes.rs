use syn::parse::ParseStream;
use syn::{Attribute, Ident, LitBool, LitStr, Token};

const ATTRIBUTE: &str = "graphql";

/// Everything a `#[graphql(...)]` attribute can say, on a type or on a field.
#[derive(Default)]
pub(crate) struct Options {
    pub tag: Option<LitStr>,
    pub name: Option<LitStr>,
    pub skip: bool,
    pub scalar: bool,
    pub flatten: bool,
}

impl Options {
    pub fn from_attributes(attributes: &[Attribute]) -> syn::Result<Options> {
        let mut options = Options::default();
        for attribute in attributes.iter().filter(|attribute| attribute.path().is_ident(ATTRIBUTE)) {
            attribute.parse_args_with(|input: ParseStream| options.parse_into(input))?;
        }
        Ok(options)
    }

    fn parse_into(&mut self, input: ParseStream) -> syn::Result<()> {
        while !input.is_empty() {
            if input.peek(LitStr) {
                let tag: LitStr = input.parse()?;
                if self.tag.is_some() {
                    return Err(syn::Error::new(tag.span(), "duplicate annotation text"));
                }
                self.tag = Some(tag);
            } else {
                let option: Ident = input.parse()?;
                match option.to_string().as_str() {
                    "skip" => self.skip = true,
                    "flatten" => self.flatten = true,
                    "scalar" => {
                        self.scalar = if input.peek(Token![=]) {
                            input.parse::<Token![=]>()?;
                            input.parse::<LitBool>()?.value
                        } else {
                            true
                        }
                    }
                    "name" => {
                        input.parse::<Token![=]>()?;
                        self.name = Some(input.parse()?);
                    }
                    _ => {
                        return Err(syn::Error::new(
                            option.span(),
                            "expected annotation text, `name`, `skip`, `scalar` or `flatten`",
                        ))
                    }
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(())
    }

    /// The annotation text, from either the bare string or `name = ".."`.
    pub fn annotation_text(&self) -> syn::Result<Option<String>> {
        match (&self.tag, &self.name) {
            (Some(_), Some(name)) => Err(syn::Error::new(name.span(), "annotation text is already given")),
            (Some(text), None) | (None, Some(text)) => Ok(Some(text.value())),
            (None, None) => Ok(None),
        }
    }

    /// `true` for `skip` and for the `"-"` annotation.
    pub fn excluded(&self) -> syn::Result<bool> {
        Ok(self.skip || self.annotation_text()?.is_some_and(|text| text.trim() == "-"))
    }
}
