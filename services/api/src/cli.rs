//! services/api/src/cli.rs
//!
//! Command-line surface of the `quoteflow` client: argument parsing and the
//! text rendering of quotes.

use crate::error::ApiError;
use quoteflow_core::domain::{Category, Quote};

pub const USAGE: &str = "\
usage: quoteflow <command>

commands:
  categories                     list the quote categories
  generate [category] [--save]   generate a quote (random category if omitted)
  saved                          list saved quotes
  remove <id>                    remove a saved quote
  count                          show how many quotes were generated today";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Categories,
    Generate { category: Option<String>, save: bool },
    Saved,
    Remove { id: String },
    Count,
}

impl Command {
    /// Parses the arguments that follow the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| ApiError::Usage("missing command".to_string()))?;

        match name.as_str() {
            "categories" if rest.is_empty() => Ok(Self::Categories),
            "saved" if rest.is_empty() => Ok(Self::Saved),
            "count" if rest.is_empty() => Ok(Self::Count),
            "remove" => match rest {
                [id] => Ok(Self::Remove { id: id.clone() }),
                _ => Err(ApiError::Usage("remove takes exactly one quote id".to_string())),
            },
            "generate" => {
                let save = rest.iter().any(|a| a == "--save");
                let positional: Vec<&String> = rest.iter().filter(|a| *a != "--save").collect();
                match positional.as_slice() {
                    [] => Ok(Self::Generate { category: None, save }),
                    [category] if !category.starts_with("--") => Ok(Self::Generate {
                        category: Some(category.to_string()),
                        save,
                    }),
                    _ => Err(ApiError::Usage(
                        "generate takes at most one category".to_string(),
                    )),
                }
            }
            other => Err(ApiError::Usage(format!("unknown command '{}'", other))),
        }
    }
}

pub fn render_quote(quote: &Quote) -> String {
    format!(
        "\"{}\"\n  - {}  [{}] ({})",
        quote.text, quote.author, quote.category.name, quote.id
    )
}

pub fn render_category(category: &Category) -> String {
    format!("{:<14} {:<14} {}", category.id, category.name, category.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_and_without_category() {
        assert_eq!(
            Command::parse(["generate"]).unwrap(),
            Command::Generate { category: None, save: false }
        );
        assert_eq!(
            Command::parse(["generate", "wisdom", "--save"]).unwrap(),
            Command::Generate { category: Some("wisdom".to_string()), save: true }
        );
        assert_eq!(
            Command::parse(["generate", "--save", "life"]).unwrap(),
            Command::Generate { category: Some("life".to_string()), save: true }
        );
    }

    #[test]
    fn parses_remove_and_listing_commands() {
        assert_eq!(
            Command::parse(["remove", "life_1"]).unwrap(),
            Command::Remove { id: "life_1".to_string() }
        );
        assert_eq!(Command::parse(["saved"]).unwrap(), Command::Saved);
        assert_eq!(Command::parse(["count"]).unwrap(), Command::Count);
        assert_eq!(Command::parse(["categories"]).unwrap(), Command::Categories);
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(Command::parse(Vec::<String>::new()).is_err());
        assert!(Command::parse(["remove"]).is_err());
        assert!(Command::parse(["generate", "life", "wisdom"]).is_err());
        assert!(Command::parse(["generate", "--fast"]).is_err());
        assert!(Command::parse(["shuffle"]).is_err());
    }

    #[test]
    fn renders_quote_with_author_and_category() {
        let quote = Quote {
            id: "life_1".to_string(),
            text: "Be brave.".to_string(),
            author: "Maya".to_string(),
            category: Category::resolve("life"),
        };
        let rendered = render_quote(&quote);
        assert!(rendered.contains("\"Be brave.\""));
        assert!(rendered.contains("Maya"));
        assert!(rendered.contains("[Life]"));
    }
}
