use serde::{Deserialize, Deserializer};

/// Accepts a JSON string or number and yields its string form. Blank strings
/// and `null` become `None`.
pub fn deserialize_opt_string_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    let raw = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(StringOrNumber::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(StringOrNumber::Int(i)) => Some(i.to_string()),
        Some(StringOrNumber::Float(f)) => Some(f.to_string()),
    })
}

/// Trims surrounding whitespace so validators see the value as it is stored.
pub fn deserialize_trimmed_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_opt_string_flexible")]
        id: Option<String>,
    }

    #[derive(Deserialize)]
    struct Contact {
        #[serde(default, deserialize_with = "deserialize_trimmed_string")]
        email: String,
    }

    #[test]
    fn trims_plain_strings() {
        let c: Contact = serde_json::from_str(r#"{"email": "  j@x.com "}"#).unwrap();
        assert_eq!(c.email, "j@x.com");
        let c: Contact = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(c.email, "");
    }

    #[test]
    fn accepts_numbers_strings_and_blanks() {
        let p: Holder = serde_json::from_str(r#"{"id": 1718000000000}"#).unwrap();
        assert_eq!(p.id.as_deref(), Some("1718000000000"));
        let p: Holder = serde_json::from_str(r#"{"id": " abc "}"#).unwrap();
        assert_eq!(p.id.as_deref(), Some("abc"));
        let p: Holder = serde_json::from_str(r#"{"id": "  "}"#).unwrap();
        assert_eq!(p.id, None);
        let p: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.id, None);
    }
}
