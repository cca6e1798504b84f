//! Mock matching module
//!
//! Decides whether a live request satisfies a registered definition.
//! Only the method and the query parameters take part; the path has
//! already been used as the registry key.

use std::collections::BTreeMap;

use super::MockDefinition;
use crate::logger;

/// Parsed query parameters, one value per name
pub type QueryParams = BTreeMap<String, String>;

/// Result of checking a request against a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Match,
    MethodMismatch,
    /// Method matched but the query did not; carries the diagnostic line
    ParamsMismatch(String),
}

/// Check a request's method and query against a definition
///
/// A method mismatch fails silently. A parameter mismatch fails with a
/// warning naming the expected and given parameters.
pub fn matches(definition: Option<&MockDefinition>, method: &str, query: &QueryParams) -> bool {
    let Some(definition) = definition else {
        return false;
    };

    match evaluate(definition, method, query) {
        Verdict::Match => true,
        Verdict::MethodMismatch => false,
        Verdict::ParamsMismatch(message) => {
            logger::log_mock_mismatch(&message);
            false
        }
    }
}

pub fn evaluate(definition: &MockDefinition, method: &str, query: &QueryParams) -> Verdict {
    if definition.method != method {
        return Verdict::MethodMismatch;
    }
    if params_match(&definition.params, query) {
        return Verdict::Match;
    }
    Verdict::ParamsMismatch(mismatch_message(&definition.url, &definition.params, query))
}

fn mismatch_message(url: &str, expected: &QueryParams, given: &QueryParams) -> String {
    let render = |params: &QueryParams| {
        serde_json::to_string(params).unwrap_or_else(|_| format!("{params:?}"))
    };
    format!(
        "Hit {url} but did not match. Expected params {}. Given params {}.",
        render(expected),
        render(given)
    )
}

/// Exact set-and-value equality between expected and given parameters
///
/// Every name present on either side must be present on the other with
/// the same value.
pub fn params_match(expected: &QueryParams, actual: &QueryParams) -> bool {
    expected.iter().all(|(k, v)| actual.get(k) == Some(v))
        && actual.iter().all(|(k, v)| expected.get(k) == Some(v))
}

/// Parse a raw query string (without the leading `?`)
///
/// `+` decodes to a space and percent escapes are decoded. A name without
/// `=` maps to an empty value. When a name repeats, the first value wins.
pub fn parse_query(raw: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    let Some(raw) = raw else {
        return params;
    };

    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(decode_component(key))
            .or_insert_with(|| decode_component(value));
    }

    params
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), |s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockResponse;
    use rstest::rstest;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn make_mock(method: &str, expected: &[(&str, &str)]) -> MockDefinition {
        MockDefinition {
            url: "/api/x".to_string(),
            method: method.to_string(),
            params: params(expected),
            status: None,
            response: MockResponse {
                body: String::new(),
            },
            called: false,
        }
    }

    #[test]
    fn test_no_definition_never_matches() {
        assert!(!matches(None, "GET", &QueryParams::new()));
    }

    #[rstest]
    #[case("POST")]
    #[case("get")]
    #[case("DELETE")]
    fn test_method_mismatch(#[case] method: &str) {
        let mock = make_mock("GET", &[]);
        assert!(!matches(Some(&mock), method, &QueryParams::new()));
    }

    #[test]
    fn test_method_mismatch_ignores_params() {
        let mock = make_mock("GET", &[("id", "5")]);
        assert!(!matches(Some(&mock), "POST", &params(&[("id", "5")])));
    }

    #[test]
    fn test_params_mismatch_reports_both_sides() {
        let mock = make_mock("GET", &[("id", "5")]);
        assert_eq!(
            evaluate(&mock, "GET", &params(&[("id", "6")])),
            Verdict::ParamsMismatch(
                r#"Hit /api/x but did not match. Expected params {"id":"5"}. Given params {"id":"6"}."#
                    .to_string()
            )
        );
    }

    #[test]
    fn test_method_mismatch_has_no_diagnostic() {
        let mock = make_mock("GET", &[("id", "5")]);
        assert_eq!(
            evaluate(&mock, "POST", &params(&[("id", "6")])),
            Verdict::MethodMismatch
        );
        assert_eq!(evaluate(&mock, "GET", &params(&[("id", "5")])), Verdict::Match);
    }

    #[rstest]
    #[case(&[], &[], true)]
    #[case(&[("id", "5")], &[("id", "5")], true)]
    #[case(&[("a", "1"), ("b", "2")], &[("b", "2"), ("a", "1")], true)]
    #[case(&[("id", "5")], &[("id", "6")], false)]
    #[case(&[("id", "5")], &[], false)]
    #[case(&[], &[("id", "5")], false)]
    #[case(&[("id", "5")], &[("id", "5"), ("extra", "1")], false)]
    #[case(&[("id", "")], &[], false)]
    fn test_params_match(
        #[case] expected: &[(&str, &str)],
        #[case] actual: &[(&str, &str)],
        #[case] result: bool,
    ) {
        assert_eq!(params_match(&params(expected), &params(actual)), result);
        let mock = make_mock("GET", expected);
        assert_eq!(matches(Some(&mock), "GET", &params(actual)), result);
    }

    #[rstest]
    #[case(None, &[])]
    #[case(Some(""), &[])]
    #[case(Some("id=5"), &[("id", "5")])]
    #[case(Some("a=1&b=2"), &[("a", "1"), ("b", "2")])]
    #[case(Some("flag"), &[("flag", "")])]
    #[case(Some("q=hello+world"), &[("q", "hello world")])]
    #[case(Some("q=caf%C3%A9&x%20y=1"), &[("q", "café"), ("x y", "1")])]
    #[case(Some("id=1&id=2"), &[("id", "1")])]
    #[case(Some("a=1&&b=2&"), &[("a", "1"), ("b", "2")])]
    #[case(Some("eq=a=b"), &[("eq", "a=b")])]
    fn test_parse_query(#[case] raw: Option<&str>, #[case] expected: &[(&str, &str)]) {
        assert_eq!(parse_query(raw), params(expected));
    }
}
