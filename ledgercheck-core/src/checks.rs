//! Assertion layer: named, hard pass/fail checks against one HTTP response.
//!
//! JSON fields are addressed with dotted paths (`a.b`), `$` being the root. A field applied
//! to an array is projected over its elements, so `msg` on `[{"msg": "x"}]` selects `["x"]`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::http::HttpResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Records checks for a single response in evaluation order.
#[derive(Debug)]
pub struct Checks<'a> {
    response: &'a HttpResponse,
    json: Option<Value>,
    results: Vec<CheckResult>,
}

impl<'a> Checks<'a> {
    pub fn new(response: &'a HttpResponse) -> Self {
        Self {
            response,
            json: response.json(),
            results: Vec::new(),
        }
    }

    pub fn status(&mut self, expected: u16) -> bool {
        let actual = self.response.status;
        self.record(
            format!("status is {expected}"),
            actual == expected,
            expected.to_string(),
            actual.to_string(),
        )
    }

    pub fn response_time(&mut self, max: Duration) -> bool {
        let elapsed = self.response.elapsed;
        self.record(
            format!("response time < {}ms", max.as_millis()),
            elapsed < max,
            format!("< {}ms", max.as_millis()),
            format!("{}ms", elapsed.as_millis()),
        )
    }

    pub fn json_eq(&mut self, path: &str, expected: &str) -> bool {
        let selected = self.select(path);
        let passed = selected.as_ref().and_then(Value::as_str) == Some(expected);
        self.record(
            format!("{path} == {expected:?}"),
            passed,
            format!("{expected:?}"),
            describe(selected.as_ref()),
        )
    }

    pub fn json_len(&mut self, path: &str, expected: usize) -> bool {
        let selected = self.select(path);
        let len = selected.as_ref().and_then(Value::as_array).map(Vec::len);
        self.record(
            format!("{path} has {expected} item(s)"),
            len == Some(expected),
            format!("array of length {expected}"),
            match len {
                Some(n) => format!("array of length {n}"),
                None => describe(selected.as_ref()),
            },
        )
    }

    pub fn json_has_item(&mut self, path: &str, expected: &str) -> bool {
        let selected = self.select(path);
        let passed = selected
            .as_ref()
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(expected)));
        self.record(
            format!("{path} has item {expected:?}"),
            passed,
            format!("array containing {expected:?}"),
            describe(selected.as_ref()),
        )
    }

    pub fn json_not_null(&mut self, path: &str) -> bool {
        let selected = self.select(path);
        let passed = selected.as_ref().is_some_and(|v| !v.is_null());
        self.record(
            format!("{path} is not null"),
            passed,
            "non-null value".to_string(),
            describe(selected.as_ref()),
        )
    }

    /// Checks that `path` is a positive integer and returns it when it is.
    pub fn json_positive_id(&mut self, path: &str) -> Option<i64> {
        let selected = self.select(path);
        let id = selected.as_ref().and_then(Value::as_i64).filter(|id| *id > 0);
        self.record(
            format!("{path} is a positive integer"),
            id.is_some(),
            "positive integer".to_string(),
            describe(selected.as_ref()),
        );
        id
    }

    pub fn empty_body(&mut self) -> bool {
        let len = self.response.body.len();
        self.record(
            "body is empty".to_string(),
            len == 0,
            "0 bytes".to_string(),
            format!("{len} bytes"),
        )
    }

    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }

    fn select(&self, path: &str) -> Option<Value> {
        self.json.as_ref().and_then(|v| select(v, path))
    }

    fn record(&mut self, name: String, passed: bool, expected: String, actual: String) -> bool {
        self.results.push(CheckResult {
            name,
            passed,
            expected,
            actual,
        });
        passed
    }
}

/// Resolves a dotted path against `root`. Missing object fields yield `None`; inside an
/// array projection they yield `null` elements.
pub fn select(root: &Value, path: &str) -> Option<Value> {
    let path = path.trim();
    if path.is_empty() || path == "$" {
        return Some(root.clone());
    }

    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .try_fold(root.clone(), |cur, segment| step(&cur, segment))
}

fn step(cur: &Value, segment: &str) -> Option<Value> {
    match cur {
        Value::Object(map) => map.get(segment).cloned(),
        Value::Array(items) => {
            if let Ok(idx) = segment.parse::<usize>() {
                return items.get(idx).cloned();
            }
            Some(Value::Array(
                items
                    .iter()
                    .map(|item| step(item, segment).unwrap_or(Value::Null))
                    .collect(),
            ))
        }
        _ => None,
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "<missing>".to_string(),
        Some(v) => v.to_string(),
    }
}
