//! Value patterns: a field that is a literal, a list of literals, an increment/decrement
//! counter, or (where declared) an engine-assigned `auto` value.
//!
//! [`PatternField<T>`] is a [`ChoiceField`] over [`Pattern<T>`]; the typed accessors below
//! follow the choice engine's two-phase convention: `value()`, `increment()`, ... only read,
//! `value_or_default()`, `increment_or_default()`, ... switch the field to that variant first.

use crate::choice::{Choice, ChoiceField, ChoiceSlots, WireChoice};
use crate::schema::{ChoiceSpec, PatternSpec, AUTO, DECREMENT, INCREMENT, VALUE, VALUES};
use crate::sequence::{self, Direction, Sequence};
use crate::validate::{validate_range, ValidationContext, ValidationError};
use crate::value::{Domain, ScalarError, WireScalar};
use serde::{Deserialize, Serialize};

/// `count` values from `start`, `step` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter<T> {
    pub start: T,
    pub step: T,
    pub count: u32,
}

impl<T: Domain> Counter<T> {
    pub fn new(start: T, step: T, count: u32) -> Self {
        Counter { start, step, count }
    }

    /// Counter at `start` with the domain unit step and a count of 1.
    pub fn starting_at(start: T) -> Self {
        Counter::new(start, T::UNIT, 1)
    }

    pub fn sequence(&self, direction: Direction) -> Sequence<T> {
        sequence::sequence(self.start, self.step, self.count, direction)
    }
}

impl<T: Domain> Default for Counter<T> {
    fn default() -> Self {
        Counter::starting_at(T::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern<T> {
    Value(T),
    Values(Vec<T>),
    Increment(Counter<T>),
    Decrement(Counter<T>),
    /// Assigned by the traffic engine; the payload is the declared placeholder.
    Auto(T),
}

impl<T: Domain> Pattern<T> {
    /// Concrete values described by the pattern; `None` for `auto`.
    pub fn materialize(&self) -> Option<Vec<T>> {
        match self {
            Pattern::Value(v) => Some(vec![*v]),
            Pattern::Values(vs) => Some(vs.clone()),
            Pattern::Increment(c) => Some(c.sequence(Direction::Increment).collect()),
            Pattern::Decrement(c) => Some(c.sequence(Direction::Decrement).collect()),
            Pattern::Auto(_) => None,
        }
    }

    /// Number of values the pattern yields; `None` for `auto`.
    pub fn len(&self) -> Option<usize> {
        match self {
            Pattern::Value(_) => Some(1),
            Pattern::Values(vs) => Some(vs.len()),
            Pattern::Increment(c) | Pattern::Decrement(c) => Some(c.count as usize),
            Pattern::Auto(_) => None,
        }
    }
}

fn check_range<T: Domain>(schema: &PatternSpec<T>, field: &str, value: T, ctx: &mut ValidationContext) {
    if let (Some(range), Some(v)) = (schema.range, value.range_value()) {
        validate_range(ctx, field, v, range.min, range.max);
    }
}

impl<T: Domain> Choice for Pattern<T> {
    type Schema = PatternSpec<T>;

    fn spec(schema: &PatternSpec<T>) -> &ChoiceSpec {
        &schema.choice
    }

    fn variant(&self) -> &'static str {
        match self {
            Pattern::Value(_) => VALUE,
            Pattern::Values(_) => VALUES,
            Pattern::Increment(_) => INCREMENT,
            Pattern::Decrement(_) => DECREMENT,
            Pattern::Auto(_) => AUTO,
        }
    }

    fn default_for(variant: &str, schema: &PatternSpec<T>) -> Option<Self> {
        schema.choice.variant(variant)?;
        match variant {
            VALUE => Some(Pattern::Value(schema.default)),
            VALUES => Some(Pattern::Values(vec![schema.default])),
            INCREMENT => Some(Pattern::Increment(Counter::starting_at(schema.default))),
            DECREMENT => Some(Pattern::Decrement(Counter::starting_at(schema.default))),
            AUTO => schema.auto.map(Pattern::Auto),
            _ => None,
        }
    }

    fn validate(&self, schema: &PatternSpec<T>, ctx: &mut ValidationContext) {
        let path = schema.path();
        match self {
            Pattern::Value(v) => check_range(schema, &path, *v, ctx),
            Pattern::Values(vs) => {
                if let Some(bad) = vs.iter().find(|v| match (schema.range, v.range_value()) {
                    (Some(range), Some(n)) => !range.contains(n),
                    _ => false,
                }) {
                    check_range(schema, &path, *bad, ctx);
                }
            }
            Pattern::Increment(c) | Pattern::Decrement(c) => {
                check_range(schema, &format!("{}.start", path), c.start, ctx);
                check_range(schema, &format!("{}.step", path), c.step, ctx);
            }
            Pattern::Auto(placeholder) => check_range(schema, &path, *placeholder, ctx),
        }
    }
}

// Each helper switches `pattern` to its variant when another one is active, then hands out the
// payload of the arm it matched.

fn values_slot<T: Domain>(pattern: &mut Pattern<T>, default: T) -> &mut Vec<T> {
    match pattern {
        Pattern::Values(vs) => vs,
        _ => {
            *pattern = Pattern::Values(vec![default]);
            values_slot(pattern, default)
        }
    }
}

fn increment_slot<T: Domain>(pattern: &mut Pattern<T>, start: T) -> &mut Counter<T> {
    match pattern {
        Pattern::Increment(c) => c,
        _ => {
            *pattern = Pattern::Increment(Counter::starting_at(start));
            increment_slot(pattern, start)
        }
    }
}

fn decrement_slot<T: Domain>(pattern: &mut Pattern<T>, start: T) -> &mut Counter<T> {
    match pattern {
        Pattern::Decrement(c) => c,
        _ => {
            *pattern = Pattern::Decrement(Counter::starting_at(start));
            decrement_slot(pattern, start)
        }
    }
}

/// A pattern-valued field of a message.
pub type PatternField<T> = ChoiceField<Pattern<T>>;

impl<T: Domain> ChoiceField<Pattern<T>> {
    pub fn value(&self) -> Option<T> {
        match self.peek() {
            Some(Pattern::Value(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn set_value(&mut self, value: T) {
        self.set(Pattern::Value(value));
    }

    /// Switches to `value` (with the declared default) unless already there.
    pub fn value_or_default(&mut self) -> T {
        match self.peek() {
            Some(Pattern::Value(v)) => *v,
            _ => {
                let v = self.schema().default;
                self.set_value(v);
                v
            }
        }
    }

    pub fn values(&self) -> Option<&[T]> {
        match self.peek() {
            Some(Pattern::Values(vs)) => Some(vs),
            _ => None,
        }
    }

    pub fn set_values(&mut self, values: Vec<T>) {
        self.set(Pattern::Values(values));
    }

    pub fn values_or_default(&mut self) -> &mut Vec<T> {
        let default = self.schema().default;
        values_slot(self.get_or_insert_with(|| Pattern::Values(vec![default])), default)
    }

    pub fn increment(&self) -> Option<&Counter<T>> {
        match self.peek() {
            Some(Pattern::Increment(c)) => Some(c),
            _ => None,
        }
    }

    pub fn has_increment(&self) -> bool {
        self.increment().is_some()
    }

    pub fn set_increment(&mut self, counter: Counter<T>) {
        self.set(Pattern::Increment(counter));
    }

    pub fn increment_or_default(&mut self) -> &mut Counter<T> {
        let start = self.schema().default;
        increment_slot(self.get_or_insert_with(|| Pattern::Increment(Counter::starting_at(start))), start)
    }

    pub fn decrement(&self) -> Option<&Counter<T>> {
        match self.peek() {
            Some(Pattern::Decrement(c)) => Some(c),
            _ => None,
        }
    }

    pub fn has_decrement(&self) -> bool {
        self.decrement().is_some()
    }

    pub fn set_decrement(&mut self, counter: Counter<T>) {
        self.set(Pattern::Decrement(counter));
    }

    pub fn decrement_or_default(&mut self) -> &mut Counter<T> {
        let start = self.schema().default;
        decrement_slot(self.get_or_insert_with(|| Pattern::Decrement(Counter::starting_at(start))), start)
    }

    pub fn auto(&self) -> Option<T> {
        match self.peek() {
            Some(Pattern::Auto(v)) => Some(*v),
            _ => None,
        }
    }

    /// Hand the value over to the engine. Fields without `auto` append `InvalidChoice`.
    pub fn set_auto(&mut self, ctx: &mut ValidationContext) -> bool {
        self.set_variant(AUTO, None, ctx)
    }

    /// Materialized values of the active pattern; `None` when unset or `auto`.
    pub fn materialize(&self) -> Option<Vec<T>> {
        self.peek().and_then(Pattern::materialize)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireCounter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<WireScalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<WireScalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

/// Decoded pattern: a discriminator and one optional slot per variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WirePattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<WireScalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<WireScalar>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<WireCounter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrement: Option<WireCounter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto: Option<WireScalar>,
}

impl ChoiceSlots for WirePattern {
    fn declared(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn populated(&self) -> Vec<&'static str> {
        let slots = [
            (VALUE, self.value.is_some()),
            (VALUES, self.values.is_some()),
            (INCREMENT, self.increment.is_some()),
            (DECREMENT, self.decrement.is_some()),
            (AUTO, self.auto.is_some()),
        ];
        slots.iter().filter(|(_, set)| *set).map(|(name, _)| *name).collect()
    }
}

/// Converts one wire scalar; failures are reported against `field` and replaced by `fallback`
/// so the choice structure survives for the rest of the pass.
fn scalar<T: Domain>(
    raw: &WireScalar,
    field: &str,
    fallback: T,
    schema: &PatternSpec<T>,
    ctx: &mut ValidationContext,
) -> T {
    match T::from_wire(raw) {
        Ok(v) => v,
        Err(e) => {
            report_scalar(e, field, schema, ctx);
            fallback
        }
    }
}

fn report_scalar<T>(error: ScalarError, field: &str, schema: &PatternSpec<T>, ctx: &mut ValidationContext) {
    match error {
        ScalarError::Format { format, text } => ctx.error(ValidationError::FormatViolation {
            field: field.to_string(),
            format,
            value: text,
        }),
        ScalarError::OutOfRange { value } => {
            let (min, max) = schema
                .range
                .map(|r| (r.min, r.max))
                .unwrap_or((0, u32::MAX as i64));
            validate_range(ctx, field, value, min, max);
        }
    }
}

fn counter<T: Domain>(
    wire: WireCounter,
    field: &str,
    schema: &PatternSpec<T>,
    ctx: &mut ValidationContext,
) -> Counter<T> {
    let start = match &wire.start {
        Some(raw) => scalar(raw, &format!("{}.start", field), schema.default, schema, ctx),
        None => schema.default,
    };
    let step = match &wire.step {
        Some(raw) => scalar(raw, &format!("{}.step", field), T::UNIT, schema, ctx),
        None => T::UNIT,
    };
    let count = match wire.count {
        Some(n) => match u32::try_from(n) {
            Ok(n) => n,
            Err(_) => {
                validate_range(ctx, &format!("{}.count", field), n, 0, u32::MAX as i64);
                1
            }
        },
        None => 1,
    };
    Counter { start, step, count }
}

impl<T: Domain> WireChoice<Pattern<T>> for WirePattern {
    fn take(self, variant: &'static str, schema: &PatternSpec<T>, ctx: &mut ValidationContext) -> Option<Pattern<T>> {
        let path = schema.path();
        match variant {
            VALUE => self
                .value
                .map(|raw| Pattern::Value(scalar(&raw, &path, schema.default, schema, ctx))),
            VALUES => self.values.map(|raws| {
                let mut out = Vec::with_capacity(raws.len());
                let mut reported = false;
                for raw in &raws {
                    match T::from_wire(raw) {
                        Ok(v) => out.push(v),
                        Err(e) => {
                            if !reported {
                                report_scalar(e, &path, schema, ctx);
                                reported = true;
                            }
                            out.push(schema.default);
                        }
                    }
                }
                Pattern::Values(out)
            }),
            INCREMENT => self
                .increment
                .map(|w| Pattern::Increment(counter(w, &path, schema, ctx))),
            DECREMENT => self
                .decrement
                .map(|w| Pattern::Decrement(counter(w, &path, schema, ctx))),
            AUTO => {
                let placeholder = schema.auto?;
                self.auto
                    .map(|raw| Pattern::Auto(scalar(&raw, &path, placeholder, schema, ctx)))
            }
            _ => None,
        }
    }

    fn from_choice(choice: &Pattern<T>) -> Self {
        let mut wire = WirePattern {
            choice: Some(choice.variant().to_string()),
            ..Default::default()
        };
        match choice {
            Pattern::Value(v) => wire.value = Some(v.to_wire()),
            Pattern::Values(vs) => wire.values = Some(vs.iter().map(|v| v.to_wire()).collect()),
            Pattern::Increment(c) => wire.increment = Some(counter_to_wire(c)),
            Pattern::Decrement(c) => wire.decrement = Some(counter_to_wire(c)),
            Pattern::Auto(v) => wire.auto = Some(v.to_wire()),
        }
        wire
    }
}

fn counter_to_wire<T: Domain>(c: &Counter<T>) -> WireCounter {
    WireCounter {
        start: Some(c.start.to_wire()),
        step: Some(c.step.to_wire()),
        count: Some(c.count as i64),
    }
}
