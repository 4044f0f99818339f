use std::collections::{HashMap, HashSet};

use crate::{EnumValue, NameFormatter};

/// Separators that mark a literal as multi-word.
const MULTI_WORD_MARKERS: [char; 3] = ['_', '-', ' '];

/// Derives constant names for enum literals.
#[derive(Debug, Clone, Copy)]
pub struct EnumExtractor<'a> {
    names: &'a NameFormatter,
}

impl<'a> EnumExtractor<'a> {
    pub fn new(names: &'a NameFormatter) -> Self {
        Self { names }
    }

    /// Maps each distinct literal to a unique identifier, in input order.
    ///
    /// Later literals that sanitize to an already used identifier get the
    /// number of earlier occurrences appended: `["a", "A"]` gives `A`, `A1`.
    pub fn extract(&self, literals: &[String]) -> Vec<EnumValue> {
        let mut seen = HashSet::new();
        let distinct: Vec<&String> = literals.iter().filter(|l| seen.insert(*l)).collect();

        let multi_word = distinct.iter().any(|l| l.contains(MULTI_WORD_MARKERS));

        let mut occurrences: HashMap<String, usize> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();
        let mut values = Vec::with_capacity(distinct.len());

        for literal in distinct {
            let candidate = self.candidate_name(literal, multi_word);

            let count = occurrences.entry(candidate.clone()).or_insert(0);
            let mut name = if *count == 0 {
                candidate.clone()
            } else {
                format!("{}{}", candidate, count)
            };
            *count += 1;
            while taken.contains(&name) {
                name = format!("{}{}", candidate, count);
                *count += 1;
            }

            taken.insert(name.clone());
            values.push(EnumValue::new(&name, literal));
        }

        values
    }

    fn candidate_name(&self, literal: &str, multi_word: bool) -> String {
        if literal.is_empty() {
            return "Empty".to_string();
        }
        let literal = if multi_word {
            literal.to_lowercase()
        } else {
            literal.to_string()
        };
        self.names
            .sanitize_identifier(&self.names.schema_name_to_enum_value_name(&literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompilerConfig;
    use pretty_assertions::assert_eq;

    fn extract(literals: &[&str]) -> Vec<(String, String)> {
        let names = NameFormatter::new(&CompilerConfig::default());
        let literals: Vec<String> = literals.iter().map(|l| l.to_string()).collect();
        EnumExtractor::new(&names)
            .extract(&literals)
            .into_iter()
            .map(|v| (v.name, v.value))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mixed_word_enums_are_lower_cased_first() {
        assert_eq!(
            extract(&["A", "a-b", "c"]),
            pairs(&[("A", "A"), ("AB", "a-b"), ("C", "c")])
        );
    }

    #[test]
    fn exact_duplicates_collapse() {
        assert_eq!(extract(&["x", "x"]), pairs(&[("X", "x")]));
    }

    #[test]
    fn collisions_get_numeric_suffix_after_first() {
        assert_eq!(
            extract(&["a", "A", "A1"]),
            pairs(&[("A", "a"), ("A1", "A"), ("A11", "A1")])
        );
    }

    #[test]
    fn empty_literal_is_named_empty() {
        assert_eq!(extract(&["", "full"]), pairs(&[("Empty", ""), ("Full", "full")]));
    }

    #[test]
    fn numeric_literals_get_prefix() {
        assert_eq!(extract(&["1", "2"]), pairs(&[("N1", "1"), ("N2", "2")]));
    }

    #[test]
    fn upper_snake_case_is_normalized() {
        assert_eq!(
            extract(&["IN_PROGRESS", "DONE"]),
            pairs(&[("InProgress", "IN_PROGRESS"), ("Done", "DONE")])
        );
    }
}
