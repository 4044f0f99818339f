use std::collections::HashSet;

use crate::CompilerConfig;

/// Characters treated as word boundaries by the case conversions.
const WORD_SEPARATORS: &str = "-#@!$&=.+:;_~ (){}[]";

/// Turns schema names into identifiers of the target language.
///
/// Built once per compiler from [`CompilerConfig`]; the reserved-word,
/// predeclared-name and initialism tables are owned by the formatter.
#[derive(Debug, Clone)]
pub struct NameFormatter {
    reserved_words: HashSet<String>,
    predeclared_names: HashSet<String>,
    /// (capitalized form, canonical form), longest first.
    initialisms: Vec<(String, String)>,
}

impl NameFormatter {
    pub fn new(config: &CompilerConfig) -> Self {
        let mut initialisms: Vec<(String, String)> = config
            .initialisms
            .iter()
            .filter(|word| !word.is_empty())
            .map(|word| (capitalize(word), word.clone()))
            .collect();
        initialisms.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self {
            reserved_words: config.reserved_words.iter().cloned().collect(),
            predeclared_names: config.predeclared_names.iter().cloned().collect(),
            initialisms,
        }
    }

    /// `"word.word-word"` -> `"WordWordWord"`, with initialisms normalized.
    pub fn to_pascal_case(&self, s: &str) -> String {
        self.fix_initialisms(&convert_case(s, true))
    }

    pub fn to_camel_case(&self, s: &str) -> String {
        self.fix_initialisms(&convert_case(s, false))
    }

    /// Replaces capitalized initialisms (`Http`, `Id`) by their canonical form
    /// when they end a word, i.e. are not followed by a lowercase letter.
    fn fix_initialisms(&self, name: &str) -> String {
        let mut output = String::with_capacity(name.len());
        let mut rest = name;

        'scan: while let Some(c) = rest.chars().next() {
            if c.is_uppercase() {
                for (word, canonical) in &self.initialisms {
                    if let Some(tail) = rest.strip_prefix(word.as_str()) {
                        if !tail.starts_with(|next: char| next.is_ascii_lowercase()) {
                            output.push_str(canonical);
                            rest = tail;
                            continue 'scan;
                        }
                    }
                }
            }
            output.push(c);
            rest = &rest[c.len_utf8()..];
        }

        output
    }

    /// Converts a schema name to a type name, keeping information carried by
    /// leading symbols or digits (`-1` -> `Minus1`, `2xx` -> `N2xx`).
    pub fn schema_name_to_type_name(&self, name: &str) -> String {
        type_name_prefix(name) + &self.to_pascal_case(name)
    }

    /// Type name of a named schema, safe to declare: what both component
    /// definitions and references to them are called.
    pub fn identifier_type_name(&self, name: &str) -> String {
        self.sanitize_identifier(&self.schema_name_to_type_name(name))
    }

    pub fn schema_name_to_enum_value_name(&self, name: &str) -> String {
        type_name_prefix(name) + &self.to_pascal_case(&name.replace('_', "-"))
    }

    /// `["Object", "field1", "nested"]` -> `"Object_Field1_Nested"`
    pub fn path_to_type_name(&self, path: &[String]) -> String {
        path.iter()
            .map(|part| self.to_pascal_case(part))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn sanitize_identifier(&self, name: &str) -> String {
        let mut sanitized: String = name
            .chars()
            .map(|c| if is_identifier_char(c) { c } else { '_' })
            .collect();

        if sanitized.is_empty()
            || sanitized.starts_with(|c: char| c.is_numeric())
            || self.is_reserved_word(&sanitized)
            || self.is_predeclared_name(&sanitized)
        {
            sanitized.insert(0, '_');
        }

        sanitized
    }

    pub fn is_reserved_word(&self, name: &str) -> bool {
        self.reserved_words.contains(name)
    }

    pub fn is_predeclared_name(&self, name: &str) -> bool {
        self.predeclared_names.contains(name)
    }

    /// True if `name` can be declared as a type, constant or variable.
    pub fn is_valid_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if is_identifier_char(first) && !first.is_numeric() => {}
            _ => return false,
        }
        chars.all(is_identifier_char)
            && !self.is_reserved_word(name)
            && !self.is_predeclared_name(name)
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '_'
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
    }
}

/// Uppercase letters and digits pass through, lowercase letters are
/// capitalized after a separator, everything else is dropped.
fn convert_case(s: &str, capitalize_first: bool) -> String {
    let mut output = String::with_capacity(s.len());
    let mut capitalize_next = capitalize_first;

    for c in s.trim_matches(' ').chars() {
        if c.is_uppercase() || c.is_numeric() {
            output.push(c);
        } else if c.is_lowercase() {
            if capitalize_next {
                output.extend(c.to_uppercase());
            } else {
                output.push(c);
            }
        }
        capitalize_next = WORD_SEPARATORS.contains(c);
    }

    output
}

/// Spells out leading symbols that case conversion would otherwise drop.
pub fn type_name_prefix(name: &str) -> String {
    let mut prefix = String::new();

    for c in name.chars() {
        let word = match c {
            '$' if name.len() == 1 => return "DollarSign".to_string(),
            '$' => continue,
            '-' => "Minus",
            '+' => "Plus",
            '&' => "And",
            '~' => "Tilde",
            '=' => "Equal",
            '#' => "Hash",
            '.' => "Dot",
            c if prefix.is_empty() && c.is_numeric() => return "N".to_string(),
            _ => break,
        };
        prefix.push_str(word);
    }

    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn formatter() -> NameFormatter {
        NameFormatter::new(&CompilerConfig::default())
    }

    #[test]
    fn pascal_case_splits_on_every_separator() {
        let names = formatter();
        assert_eq!(
            names.to_pascal_case("word.word-word+word:word;word_word~word word(word)word{word}[word]"),
            "Word".repeat(13)
        );
        assert_eq!(names.to_pascal_case("  padded name "), "PaddedName");
        assert_eq!(names.to_pascal_case("v2beta"), "V2beta");
    }

    #[test]
    fn camel_case_keeps_first_letter() {
        let names = formatter();
        assert_eq!(names.to_camel_case("page_size"), "pageSize");
        assert_eq!(names.to_camel_case("user_id"), "userID");
    }

    #[test]
    fn initialisms_match_whole_words_only() {
        let names = formatter();
        assert_eq!(names.to_pascal_case("pet_id"), "PetID");
        assert_eq!(names.to_pascal_case("identity"), "Identity");
        assert_eq!(names.to_pascal_case("api_url"), "APIURL");
        assert_eq!(names.to_pascal_case("http_server"), "HTTPServer");
        assert_eq!(names.to_pascal_case("https"), "HTTPS");
        assert_eq!(names.to_pascal_case("oauth_token"), "OAuthToken");
        assert_eq!(names.to_pascal_case("uuid"), "UUID");
        assert_eq!(names.to_pascal_case("guide"), "Guide");
    }

    #[test]
    fn identifier_type_names_are_always_declarable() {
        let names = formatter();
        assert_eq!(names.identifier_type_name("@@"), "_");
        assert_eq!(names.identifier_type_name("pet_owner"), "PetOwner");
        assert_eq!(names.identifier_type_name("Café"), "Café");
        assert!(names.is_valid_identifier(&names.identifier_type_name("@@")));
    }

    #[test]
    fn type_names_keep_leading_symbols() {
        let names = formatter();
        assert_eq!(names.schema_name_to_type_name("$"), "DollarSign");
        assert_eq!(names.schema_name_to_type_name("-1"), "Minus1");
        assert_eq!(names.schema_name_to_type_name("+1"), "Plus1");
        assert_eq!(names.schema_name_to_type_name("2xx"), "N2xx");
        assert_eq!(names.schema_name_to_type_name("pet"), "Pet");
    }

    #[test]
    fn enum_value_names_split_on_underscores() {
        let names = formatter();
        assert_eq!(names.schema_name_to_enum_value_name("in_progress"), "InProgress");
        assert_eq!(names.schema_name_to_enum_value_name("1"), "N1");
    }

    #[test]
    fn path_to_type_name_joins_with_underscore() {
        let names = formatter();
        let path = vec!["pet".to_string(), "owner_info".to_string()];
        assert_eq!(names.path_to_type_name(&path), "Pet_OwnerInfo");
    }

    #[test]
    fn sanitize_never_returns_reserved_names() {
        let names = formatter();
        assert_eq!(names.sanitize_identifier("type"), "_type");
        assert_eq!(names.sanitize_identifier("string"), "_string");
        assert_eq!(names.sanitize_identifier("my-field"), "my_field");
        assert_eq!(names.sanitize_identifier(""), "_");

        let sanitized = names.sanitize_identifier("2fast");
        assert!(sanitized.starts_with('_'));
        assert!(names.is_valid_identifier(&sanitized));
    }

    #[test]
    fn validity_checks() {
        let names = formatter();
        assert!(names.is_valid_identifier("Pet"));
        assert!(!names.is_valid_identifier("9lives"));
        assert!(!names.is_valid_identifier("map"));
        assert!(!names.is_valid_identifier("nil"));
        assert!(!names.is_valid_identifier("a-b"));
    }

    #[test]
    fn custom_initialisms_come_from_config() {
        let config = CompilerConfig {
            initialisms: vec!["GRPC".to_string()],
            ..CompilerConfig::default()
        };
        let names = NameFormatter::new(&config);
        assert_eq!(names.to_pascal_case("grpc_api"), "GRPCApi");
    }
}
