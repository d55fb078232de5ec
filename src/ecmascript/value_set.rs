// This module implements the value-set algebra of the ECMAScript backend. A value
// set over-approximates the runtime representations a compiled value can take: a
// range of safe integers plus one flag per other kind of host value. The central
// operation is merge_without_intersection, which folds one set into another only if
// the two are disjoint. The integer part is compared through the covering interval:
// two ranges are disjoint when the covering interval is at least as large as both
// ranges together, and a successful merge keeps the whole covering interval, so any
// gap between two separated ranges becomes part of the result.

//! Sets of ECMAScript runtime representations.

use std::fmt;

/// Largest integer an ECMAScript number represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Half-open range `[first, after_last)` of non-negative safe integers.
#[derive(Debug, Clone, Copy)]
pub struct SafeIntegerRange {
    first: u64,
    after_last: u64,
}

impl SafeIntegerRange {
    /// The inclusive range `first..=last`.
    pub fn new(first: u64, last: u64) -> Self {
        assert!(first <= last, "empty safe integer range {first}..{last}");
        assert!(
            last <= MAX_SAFE_INTEGER,
            "{last} is beyond the largest safe integer"
        );
        Self {
            first,
            after_last: last + 1,
        }
    }

    pub const fn empty() -> Self {
        Self {
            first: 0,
            after_last: 0,
        }
    }

    /// Every safe integer.
    pub fn any() -> Self {
        Self::new(0, MAX_SAFE_INTEGER)
    }

    /// Clamps `minimum..=maximum` to the safe integers.
    pub fn clamped(minimum: u64, maximum: u64) -> Self {
        if minimum > MAX_SAFE_INTEGER || minimum > maximum {
            return Self::empty();
        }
        Self::new(minimum, maximum.min(MAX_SAFE_INTEGER))
    }

    pub fn is_empty(&self) -> bool {
        self.after_last <= self.first
    }

    pub fn len(&self) -> u64 {
        self.after_last.saturating_sub(self.first)
    }

    pub fn first(&self) -> Option<u64> {
        (!self.is_empty()).then_some(self.first)
    }

    pub fn last(&self) -> Option<u64> {
        (!self.is_empty()).then(|| self.after_last - 1)
    }

    /// The smallest range containing both.
    fn covering(&self, other: &Self) -> Self {
        Self {
            first: self.first.min(other.first),
            after_last: self.after_last.max(other.after_last),
        }
    }

    /// Whether the covering range of the two is large enough to hold both
    /// without overlap. The covering size counts one less than the range
    /// holds, so touching ranges collide while any gap, even a single value,
    /// lets them merge.
    fn is_disjoint(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return true;
        }
        self.covering(other).len() > self.len() + other.len()
    }

    /// Extends `self` to the covering range of both if they are disjoint.
    pub fn merge_without_intersection(&mut self, from: Self) -> bool {
        if !self.is_disjoint(&from) {
            return false;
        }
        *self = self.union(&from);
        true
    }

    /// The covering range, regardless of overlap.
    pub fn union(&self, other: &Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => *other,
            (_, true) => *self,
            _ => self.covering(other),
        }
    }
}

impl PartialEq for SafeIntegerRange {
    fn eq(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.is_empty() && other.is_empty();
        }
        self.first == other.first && self.after_last == other.after_last
    }
}

impl Eq for SafeIntegerRange {}

impl Default for SafeIntegerRange {
    fn default() -> Self {
        Self::empty()
    }
}

/// Over-approximation of the representations a value may take at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueSet {
    pub integer: SafeIntegerRange,
    pub undefined: bool,
    pub null: bool,
    pub string: bool,
    pub array: bool,
    pub object: bool,
    pub function: bool,
    pub bool_true: bool,
    pub bool_false: bool,
}

impl ValueSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn undefined() -> Self {
        Self {
            undefined: true,
            ..Self::default()
        }
    }

    pub fn null() -> Self {
        Self {
            null: true,
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self {
            string: true,
            ..Self::default()
        }
    }

    pub fn array() -> Self {
        Self {
            array: true,
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self {
            object: true,
            ..Self::default()
        }
    }

    pub fn function() -> Self {
        Self {
            function: true,
            ..Self::default()
        }
    }

    pub fn integer_range(integer: SafeIntegerRange) -> Self {
        Self {
            integer,
            ..Self::default()
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            bool_true: value,
            bool_false: !value,
            ..Self::default()
        }
    }

    pub fn any_boolean() -> Self {
        Self {
            bool_true: true,
            bool_false: true,
            ..Self::default()
        }
    }

    /// Every representation, for values the compiler knows nothing about.
    pub fn anything() -> Self {
        Self {
            integer: SafeIntegerRange::any(),
            undefined: true,
            null: true,
            string: true,
            array: true,
            object: true,
            function: true,
            bool_true: true,
            bool_false: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.integer.is_empty() && self.flags().iter().all(|flag| !flag)
    }

    fn flags(&self) -> [bool; 8] {
        [
            self.undefined,
            self.null,
            self.string,
            self.array,
            self.object,
            self.function,
            self.bool_true,
            self.bool_false,
        ]
    }

    fn flags_mut(&mut self) -> [&mut bool; 8] {
        [
            &mut self.undefined,
            &mut self.null,
            &mut self.string,
            &mut self.array,
            &mut self.object,
            &mut self.function,
            &mut self.bool_true,
            &mut self.bool_false,
        ]
    }

    /// Folds `from` into `self` if no representation is claimed by both. Leaves
    /// `self` untouched and returns false otherwise.
    pub fn merge_without_intersection(&mut self, from: &ValueSet) -> bool {
        let flags_collide = self
            .flags()
            .iter()
            .zip(from.flags())
            .any(|(&mine, theirs)| mine && theirs);
        if flags_collide || !self.integer.is_disjoint(&from.integer) {
            return false;
        }
        self.integer = self.integer.union(&from.integer);
        for (mine, theirs) in self.flags_mut().into_iter().zip(from.flags()) {
            *mine |= theirs;
        }
        true
    }

    /// Everything in either set.
    pub fn union(&self, other: &ValueSet) -> ValueSet {
        let mut result = *self;
        result.integer = self.integer.union(&other.integer);
        for (mine, theirs) in result.flags_mut().into_iter().zip(other.flags()) {
            *mine |= theirs;
        }
        result
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 8] = [
            "undefined",
            "null",
            "string",
            "array",
            "object",
            "function",
            "true",
            "false",
        ];
        let mut parts = Vec::new();
        if let (Some(first), Some(last)) = (self.integer.first(), self.integer.last()) {
            parts.push(format!("int {first}..{last}"));
        }
        for (name, flag) in NAMES.iter().zip(self.flags()) {
            if flag {
                parts.push((*name).to_string());
            }
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}
