use serde::Serialize;

/// Decision path a group takes in the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// No street hint: title scoring only (Scenario A)
    TitleOnly,
    /// Street hint present: street gate, then title scoring (Scenario B)
    StreetGated,
}

/// Customer query split into its matching parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Raw search text
    pub raw: String,

    /// Text before the first comma, trimmed
    pub core_name: String,

    /// Text after the first comma, trimmed, if non-empty
    pub street_hint: Option<String>,
}

impl Query {
    /// Parse a raw query on its first comma
    pub fn parse(raw: &str) -> Self {
        let (core, rest) = match raw.split_once(',') {
            Some((core, rest)) => (core, Some(rest)),
            None => (raw, None),
        };

        let street_hint = rest
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .map(str::to_string);

        Self {
            raw: raw.to_string(),
            core_name: core.trim().to_string(),
            street_hint,
        }
    }

    pub fn scenario(&self) -> Scenario {
        if self.street_hint.is_some() {
            Scenario::StreetGated
        } else {
            Scenario::TitleOnly
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_and_street() {
        let query = Query::parse("Café Central, Bahnhofstrasse 5");
        assert_eq!(query.core_name, "Café Central");
        assert_eq!(query.street_hint.as_deref(), Some("Bahnhofstrasse 5"));
        assert_eq!(query.scenario(), Scenario::StreetGated);
    }

    #[test]
    fn test_no_comma() {
        let query = Query::parse("  Café Central ");
        assert_eq!(query.core_name, "Café Central");
        assert_eq!(query.street_hint, None);
        assert_eq!(query.scenario(), Scenario::TitleOnly);
    }

    #[test]
    fn test_blank_street_segment() {
        let query = Query::parse("Café Central,   ");
        assert_eq!(query.street_hint, None);
        assert_eq!(query.scenario(), Scenario::TitleOnly);
    }

    #[test]
    fn test_splits_on_first_comma_only() {
        let query = Query::parse("Central, Marktgasse 2, 3011 Bern");
        assert_eq!(query.core_name, "Central");
        assert_eq!(query.street_hint.as_deref(), Some("Marktgasse 2, 3011 Bern"));
    }

    #[test]
    fn test_empty_query() {
        let query = Query::parse("");
        assert_eq!(query.core_name, "");
        assert_eq!(query.scenario(), Scenario::TitleOnly);
    }
}
