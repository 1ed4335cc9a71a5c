//! Parameter sets and parameter search ranges.
//!
//! A [`ParamSet`] maps parameter keys (`"SMA"`, `"MACD_fast"`, `"BB"`, ...)
//! to integer values. [`ParamRanges`] holds one candidate axis per key in
//! insertion order; that order defines the Cartesian product order.
//!
//! Range expressions accepted by [`parse_range_expr`]:
//! - `10,20,50`: explicit list
//! - `5..21`: half-open range
//! - `5..=20`: inclusive range
//! - `10..=50:10`: range with a step

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::CoinlabError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParamSet(BTreeMap<String, usize>);

impl ParamSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.0.get(key).copied()
    }

    pub fn get_or(&self, key: &str, default: usize) -> usize {
        self.get(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: usize) {
        self.0.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: usize) -> Self {
        self.insert(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, usize)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamAxis {
    pub key: String,
    pub values: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamRanges {
    axes: Vec<ParamAxis>,
}

impl ParamRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis, replacing the candidates of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<usize>) {
        let key = key.into();
        match self.axes.iter_mut().find(|a| a.key == key) {
            Some(axis) => axis.values = values,
            None => self.axes.push(ParamAxis { key, values }),
        }
    }

    pub fn with(mut self, key: impl Into<String>, values: impl IntoIterator<Item = usize>) -> Self {
        self.insert(key, values.into_iter().collect());
        self
    }

    pub fn axes(&self) -> &[ParamAxis] {
        &self.axes
    }

    pub fn contains(&self, key: &str) -> bool {
        self.axes.iter().any(|a| a.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Number of combinations in the full Cartesian product.
    ///
    /// Fails with `Configuration` when the product does not fit in `usize`.
    pub fn combination_count(&self) -> Result<usize, CoinlabError> {
        self.axes
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.values.len()))
            .ok_or_else(|| CoinlabError::Configuration {
                reason: format!(
                    "parameter grid over {} axes is too large to enumerate",
                    self.axes.len()
                ),
            })
    }

    /// Full Cartesian product, first axis outermost, candidates in listed order.
    pub fn combinations(&self) -> Result<Vec<ParamSet>, CoinlabError> {
        if self.combination_count()? == 0 {
            return Ok(Vec::new());
        }
        let mut result = vec![ParamSet::new()];
        for axis in &self.axes {
            let mut next = Vec::with_capacity(result.len() * axis.values.len());
            for prefix in &result {
                for &value in &axis.values {
                    next.push(prefix.clone().with(axis.key.clone(), value));
                }
            }
            result = next;
        }
        Ok(result)
    }

    /// Parse `key = expr` pairs, e.g. from a config section.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, CoinlabError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut ranges = Self::new();
        for (key, expr) in pairs {
            let values = parse_range_expr(expr).map_err(|reason| CoinlabError::ConfigInvalid {
                section: "ranges".into(),
                key: key.to_string(),
                reason,
            })?;
            ranges.insert(key.trim(), values);
        }
        Ok(ranges)
    }
}

pub fn parse_range_expr(expr: &str) -> Result<Vec<usize>, String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err("empty range expression".into());
    }

    let Some((start, rest)) = expr.split_once("..") else {
        return expr
            .split(',')
            .map(|token| parse_value(token.trim()))
            .collect();
    };

    let (end_part, step) = match rest.split_once(':') {
        Some((end, step)) => (end, parse_value(step.trim())?),
        None => (rest, 1),
    };
    if step == 0 {
        return Err("step must be positive".into());
    }

    let start = parse_value(start.trim())?;
    let values: Vec<usize> = match end_part.strip_prefix('=') {
        Some(end) => (start..=parse_value(end.trim())?).step_by(step).collect(),
        None => (start..parse_value(end_part.trim())?).step_by(step).collect(),
    };
    if values.is_empty() {
        return Err(format!("range {} is empty", expr));
    }
    Ok(values)
}

fn parse_value(token: &str) -> Result<usize, String> {
    token
        .parse::<usize>()
        .map_err(|_| format!("invalid parameter value '{}'", token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_set_display_is_sorted() {
        let params = ParamSet::new().with("SMA", 10).with("RSI", 14);
        assert_eq!(params.to_string(), "{RSI=14, SMA=10}");
        assert_eq!(params.get("SMA"), Some(10));
        assert_eq!(params.get_or("EMA", 20), 20);
    }

    #[test]
    fn combinations_first_axis_outermost() {
        let ranges = ParamRanges::new()
            .with("SMA", [10, 20])
            .with("RSI", [7, 14]);
        let combos = ranges.combinations().unwrap();

        assert_eq!(ranges.combination_count().unwrap(), 4);
        assert_eq!(
            combos,
            vec![
                ParamSet::new().with("SMA", 10).with("RSI", 7),
                ParamSet::new().with("SMA", 10).with("RSI", 14),
                ParamSet::new().with("SMA", 20).with("RSI", 7),
                ParamSet::new().with("SMA", 20).with("RSI", 14),
            ]
        );
    }

    #[test]
    fn combinations_of_no_axes_is_single_empty_set() {
        let combos = ParamRanges::new().combinations().unwrap();
        assert_eq!(combos, vec![ParamSet::new()]);
    }

    #[test]
    fn combinations_with_empty_axis_is_empty() {
        let ranges = ParamRanges::new().with("SMA", Vec::<usize>::new());
        assert!(ranges.combinations().unwrap().is_empty());
        assert_eq!(ranges.combination_count().unwrap(), 0);
    }

    #[test]
    fn oversized_grid_is_configuration_error() {
        let wide: Vec<usize> = (1..=100_000).collect();
        let ranges = (0..8).fold(ParamRanges::new(), |ranges, i| {
            ranges.with(format!("W{}", i), wide.clone())
        });

        assert!(matches!(
            ranges.combination_count(),
            Err(CoinlabError::Configuration { .. })
        ));
        assert!(matches!(
            ranges.combinations(),
            Err(CoinlabError::Configuration { .. })
        ));

        // An empty axis anywhere before the overflow keeps the product at zero.
        let empty_first = ParamRanges::new()
            .with("E", Vec::<usize>::new())
            .with("W0", wide.clone())
            .with("W1", wide.clone())
            .with("W2", wide.clone())
            .with("W3", wide);
        assert_eq!(empty_first.combination_count().unwrap(), 0);
    }

    #[test]
    fn insert_replaces_existing_axis() {
        let mut ranges = ParamRanges::new().with("SMA", [10]).with("RSI", [7]);
        ranges.insert("SMA", vec![5, 6]);
        assert_eq!(ranges.axes()[0].key, "SMA");
        assert_eq!(ranges.axes()[0].values, vec![5, 6]);
        assert_eq!(ranges.axes().len(), 2);
    }

    #[test]
    fn parse_list() {
        assert_eq!(parse_range_expr("10, 20,50").unwrap(), vec![10, 20, 50]);
        assert_eq!(parse_range_expr("7").unwrap(), vec![7]);
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(parse_range_expr("5..8").unwrap(), vec![5, 6, 7]);
        assert_eq!(parse_range_expr("5..=8").unwrap(), vec![5, 6, 7, 8]);
        assert_eq!(parse_range_expr("10..=50:20").unwrap(), vec![10, 30, 50]);
        assert_eq!(parse_range_expr("5..21").unwrap().len(), 16);
    }

    #[test]
    fn parse_errors() {
        assert!(parse_range_expr("").is_err());
        assert!(parse_range_expr("a,b").is_err());
        assert!(parse_range_expr("8..5").is_err());
        assert!(parse_range_expr("1..=5:0").is_err());
        assert!(parse_range_expr("-3").is_err());
    }

    #[test]
    fn from_pairs_reports_key() {
        let err = ParamRanges::from_pairs([("SMA", "10,20"), ("RSI", "x")]).unwrap_err();
        assert_eq!(
            err,
            CoinlabError::ConfigInvalid {
                section: "ranges".into(),
                key: "RSI".into(),
                reason: "invalid parameter value 'x'".into(),
            }
        );
    }
}
