//! Wiki infobox markup and source links
//!
//! The host wiki takes character metadata as a `{{Infobox Crt}}` template in
//! its raw-markup textarea. The template shape is fixed by the site; only
//! name, gender, aliases, and the citation URL vary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source page URL template; `{id}` is replaced by the catalog id
pub const DEFAULT_SOURCE_URL_TEMPLATE: &str = "http://w.atwiki.jp/moshimorpg/pages/{id}.html";

/// Gender label written into the infobox
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The label the host wiki expects
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" | "男" => Ok(Gender::Male),
            "female" | "f" | "女" => Ok(Gender::Female),
            other => Err(format!("Unknown gender: {} (expected male or female)", other)),
        }
    }
}

/// Expand a source URL template for one catalog id
pub fn source_url(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}

/// Build the infobox markup for one character. The alias block is only
/// emitted when nicknames exist.
pub fn build_infobox(name: &str, gender: Gender, nick_names: &[String], source_url: &str) -> String {
    let mut infobox = format!("{{{{Infobox Crt\n|简体中文名={}", name);

    infobox.push_str(&format!("\n|性别={}", gender.label()));

    if !nick_names.is_empty() {
        infobox.push_str("\n|别名={\n");
        for nick in nick_names {
            infobox.push_str(&format!("[{}]\n", nick));
        }
        infobox.push('}');
    }

    infobox.push_str(&format!("\n|引用来源={{\n[{}]\n}}", source_url));
    infobox.push_str("\n}}");

    infobox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_expansion() {
        assert_eq!(
            source_url(DEFAULT_SOURCE_URL_TEMPLATE, "42"),
            "http://w.atwiki.jp/moshimorpg/pages/42.html"
        );
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn test_infobox_without_nicknames() {
        let markup = build_infobox("Alice", Gender::Female, &[], "http://example.com/1.html");
        insta::assert_snapshot!(markup, @r###"
        {{Infobox Crt
        |简体中文名=Alice
        |性别=女
        |引用来源={
        [http://example.com/1.html]
        }
        }}
        "###);
    }

    #[test]
    fn test_infobox_with_nicknames() {
        let nicks = vec!["Al".to_string(), "Ally".to_string()];
        let markup = build_infobox("Alice", Gender::Male, &nicks, "http://example.com/1.html");
        insta::assert_snapshot!(markup, @r###"
        {{Infobox Crt
        |简体中文名=Alice
        |性别=男
        |别名={
        [Al]
        [Ally]
        }
        |引用来源={
        [http://example.com/1.html]
        }
        }}
        "###);
    }
}
