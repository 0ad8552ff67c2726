//! Author name splitting for the forwarding payload.

use serde::{Deserialize, Serialize};

/// An author name split into forename and surname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorName {
    pub forename: String,
    pub surname: String,
}

impl AuthorName {
    /// Split a full name on whitespace.
    ///
    /// The last token is the surname and the preceding tokens, joined with
    /// single spaces, are the forename. A single token becomes the surname.
    pub fn from_full_name(full_name: &str) -> Self {
        let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
        let surname = tokens.pop().unwrap_or_default().to_string();

        Self {
            forename: tokens.join(" "),
            surname,
        }
    }
}

/// Encode author names as a JSON array of `{forename, surname}` objects.
pub fn encode_authors<S: AsRef<str>>(authors: &[S]) -> Result<String, serde_json::Error> {
    let names: Vec<AuthorName> = authors
        .iter()
        .map(|a| AuthorName::from_full_name(a.as_ref()))
        .collect();
    serde_json::to_string(&names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        let name = AuthorName::from_full_name("Jane Q. Public");
        assert_eq!(name.forename, "Jane Q.");
        assert_eq!(name.surname, "Public");
    }

    #[test]
    fn test_split_single_token() {
        let name = AuthorName::from_full_name("Plato");
        assert_eq!(name.forename, "");
        assert_eq!(name.surname, "Plato");
    }

    #[test]
    fn test_split_irregular_whitespace() {
        let name = AuthorName::from_full_name("  Ada\tAugusta   King ");
        assert_eq!(name.forename, "Ada Augusta");
        assert_eq!(name.surname, "King");
    }

    #[test]
    fn test_split_blank() {
        let name = AuthorName::from_full_name("   ");
        assert_eq!(name.forename, "");
        assert_eq!(name.surname, "");
    }

    #[test]
    fn test_encode_authors_preserves_order() {
        let encoded = encode_authors(&["Jane Q. Public", "Plato", "Jane Q. Public"]).unwrap();
        assert_eq!(
            encoded,
            r#"[{"forename":"Jane Q.","surname":"Public"},{"forename":"","surname":"Plato"},{"forename":"Jane Q.","surname":"Public"}]"#
        );
    }

    #[test]
    fn test_encode_no_authors() {
        let empty: [&str; 0] = [];
        assert_eq!(encode_authors(&empty).unwrap(), "[]");
    }
}
