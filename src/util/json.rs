//! Short-circuiting navigation over loosely-typed upstream documents.
//!
//! Every step returns `Option`, so a missing key anywhere in a long chain
//! simply yields `None`:
//!
//! ```ignore
//! let status = data.key("playabilityStatus").key("status").text();
//! ```

use serde_json::Value;

pub trait JsonNav<'a> {
    fn node(self) -> Option<&'a Value>;

    fn key(self, key: &str) -> Option<&'a Value>
    where
        Self: Sized,
    {
        self.node().and_then(|v| v.get(key))
    }

    fn idx(self, index: usize) -> Option<&'a Value>
    where
        Self: Sized,
    {
        self.node().and_then(|v| v.get(index))
    }

    fn last(self) -> Option<&'a Value>
    where
        Self: Sized,
    {
        self.node()
            .and_then(|v| v.as_array())
            .and_then(|a| a.last())
    }

    fn text(self) -> Option<&'a str>
    where
        Self: Sized,
    {
        self.node().and_then(|v| v.as_str())
    }

    /// The array at this position, or an empty slice.
    fn items(self) -> &'a [Value]
    where
        Self: Sized,
    {
        self.node()
            .and_then(|v| v.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[])
    }

    /// Numbers or numeric strings.
    fn uint(self) -> Option<u64>
    where
        Self: Sized,
    {
        match self.node()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Concatenated `runs[].text` of an InnerTube-style formatted string.
    fn runs_text(self) -> Option<String>
    where
        Self: Sized,
    {
        let node = self.node()?;
        if let Some(simple) = node.get("simpleText").and_then(|v| v.as_str()) {
            return Some(simple.to_string());
        }
        let runs = node.get("runs")?.as_array()?;
        let joined: String = runs
            .iter()
            .filter_map(|r| r.get("text").and_then(|t| t.as_str()))
            .collect();
        Some(joined)
    }
}

impl<'a> JsonNav<'a> for &'a Value {
    fn node(self) -> Option<&'a Value> {
        Some(self)
    }
}

impl<'a> JsonNav<'a> for Option<&'a Value> {
    fn node(self) -> Option<&'a Value> {
        self
    }
}

/// Reads a top-level array either directly or from a wrapping object key
/// (`[...]` or `{"items": [...]}`).
pub fn array_or_wrapped<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    match data {
        Value::Array(items) => items.as_slice(),
        other => other.key(key).items(),
    }
}
