//! Compositions: element multisets with canonical ordering.
//!
//! A `Composition` is stored as a sorted map from element symbol to a positive
//! integer count. Equality, hashing and ordering all run over that canonical
//! form, so `"OMg"` and `"MgO"` are the same key in an energy table.
//!
//! Formula syntax accepted by `parse`: element symbols (`Mg`, `O`), integer
//! counts, and parenthesised groups with multipliers (`Ca(OH)2`). Whitespace
//! is ignored. Fractional counts are rejected.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FormulaError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Composition {
    counts: BTreeMap<String, u32>,
}

impl Composition {
    /// Build from `(element, count)` pairs; repeated elements add up, zero counts vanish.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut counts = BTreeMap::new();
        for (el, n) in pairs {
            *counts.entry(el.into()).or_insert(0) += n;
        }
        counts.retain(|_, n| *n > 0);
        Self { counts }
    }

    /// One atom of `element`.
    pub fn element(element: &str) -> Self {
        Self::from_pairs([(element, 1)])
    }

    pub fn parse(formula: &str) -> Result<Self, FormulaError> {
        parse_formula(formula)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Element symbols in alphabetical order.
    pub fn elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.counts.keys().map(String::as_str)
    }

    #[inline]
    pub fn count(&self, element: &str) -> u32 {
        self.counts.get(element).copied().unwrap_or(0)
    }

    pub fn num_atoms(&self) -> u32 {
        self.counts.values().sum()
    }

    /// `count(element) / num_atoms`; zero for absent elements.
    pub fn fractional(&self, element: &str) -> f64 {
        let total = self.num_atoms();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.count(element)) / f64::from(total)
    }

    /// Composition divided by the GCD of its counts.
    pub fn reduced(&self) -> Composition {
        let g = self.counts.values().fold(0, |acc, &n| gcd(acc, n));
        if g <= 1 {
            return self.clone();
        }
        Composition {
            counts: self
                .counts
                .iter()
                .map(|(el, &n)| (el.clone(), n / g))
                .collect(),
        }
    }

    /// Canonical string of the reduced composition, e.g. `"MgO"` for `Mg2O2`.
    pub fn reduced_formula(&self) -> String {
        self.reduced().formula()
    }

    /// Canonical string of this composition (alphabetical, count 1 omitted).
    pub fn formula(&self) -> String {
        let mut out = String::new();
        for (el, &n) in &self.counts {
            out.push_str(el);
            if n != 1 {
                out.push_str(&n.to_string());
            }
        }
        out
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula())
    }
}

impl FromStr for Composition {
    type Err = FormulaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_formula(s)
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn parse_formula(formula: &str) -> Result<Composition, FormulaError> {
    let bytes = formula.as_bytes();
    let n = bytes.len();
    // One frame per open parenthesis; the bottom frame is the whole formula.
    let mut stack: Vec<BTreeMap<String, u64>> = vec![BTreeMap::new()];
    let mut i = 0usize;
    while i < n {
        let b = bytes[i];
        if b.is_ascii_uppercase() {
            let mut j = i + 1;
            while j < n && bytes[j].is_ascii_lowercase() {
                j += 1;
            }
            let symbol = &formula[i..j];
            let (count, next) = read_count(formula, j)?;
            let top = stack.last_mut().ok_or_else(|| unbalanced(formula))?;
            *top.entry(symbol.to_string()).or_insert(0) += count;
            i = next;
        } else if b == b'(' {
            stack.push(BTreeMap::new());
            i += 1;
        } else if b == b')' {
            if stack.len() < 2 {
                return Err(unbalanced(formula));
            }
            let group = stack.pop().ok_or_else(|| unbalanced(formula))?;
            let (mult, next) = read_count(formula, i + 1)?;
            let top = stack.last_mut().ok_or_else(|| unbalanced(formula))?;
            for (el, c) in group {
                *top.entry(el).or_insert(0) += c * mult;
            }
            i = next;
        } else if b.is_ascii_whitespace() {
            i += 1;
        } else {
            let ch = formula[i..].chars().next().unwrap_or('?');
            return Err(FormulaError::UnexpectedChar {
                formula: formula.to_string(),
                ch,
                pos: i,
            });
        }
    }
    if stack.len() != 1 {
        return Err(unbalanced(formula));
    }
    let mut pairs = Vec::new();
    for (el, c) in stack.pop().unwrap_or_default() {
        let c = u32::try_from(c).map_err(|_| FormulaError::BadCount {
            formula: formula.to_string(),
            count: c.to_string(),
        })?;
        pairs.push((el, c));
    }
    let comp = Composition::from_pairs(pairs);
    if comp.is_empty() {
        return Err(FormulaError::Empty);
    }
    Ok(comp)
}

/// Read an optional integer count starting at byte `start`; absent means 1.
fn read_count(formula: &str, start: usize) -> Result<(u64, usize), FormulaError> {
    let bytes = formula.as_bytes();
    let mut k = start;
    while k < bytes.len() && bytes[k].is_ascii_digit() {
        k += 1;
    }
    if k < bytes.len() && bytes[k] == b'.' {
        let mut end = k + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        return Err(FormulaError::BadCount {
            formula: formula.to_string(),
            count: formula[start..end].to_string(),
        });
    }
    if k == start {
        return Ok((1, k));
    }
    let digits = &formula[start..k];
    let count = digits.parse::<u64>().map_err(|_| FormulaError::BadCount {
        formula: formula.to_string(),
        count: digits.to_string(),
    })?;
    Ok((count, k))
}

fn unbalanced(formula: &str) -> FormulaError {
    FormulaError::Unbalanced {
        formula: formula.to_string(),
    }
}
