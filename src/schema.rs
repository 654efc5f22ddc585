//! Schema metadata for discriminated-union fields: declared variants, default variant,
//! variant status and range constraints.
//!
//! Specs are `static` items; model fields hold a `&'static` reference to the spec that
//! describes them.

use std::fmt;

/// Lifecycle status of a declared variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stable,
    /// Selecting the variant produces a warning carrying the note.
    Deprecated(&'static str),
    UnderReview(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: &'static str,
    pub status: Status,
}

impl VariantSpec {
    pub const fn stable(name: &'static str) -> Self {
        VariantSpec {
            name,
            status: Status::Stable,
        }
    }

    pub const fn deprecated(name: &'static str, note: &'static str) -> Self {
        VariantSpec {
            name,
            status: Status::Deprecated(note),
        }
    }

    pub const fn under_review(name: &'static str, note: &'static str) -> Self {
        VariantSpec {
            name,
            status: Status::UnderReview(note),
        }
    }
}

/// Declaration of one choice field: which variants exist and how an unset field defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceSpec {
    /// Owning message type, e.g. `FlowIpv4`.
    pub type_name: &'static str,
    pub field: &'static str,
    /// Variants in schema order; resolution of ambiguous wire forms follows this order.
    pub variants: &'static [VariantSpec],
    /// Variant adopted when nothing is populated; `None` means the caller must choose.
    pub default: Option<&'static str>,
    /// Report `RequiredFieldMissing` when the field stays unset.
    pub required: bool,
}

impl ChoiceSpec {
    pub fn variant(&self, name: &str) -> Option<&'static VariantSpec> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Canonical `'static` name for a declared variant.
    pub fn canonical(&self, name: &str) -> Option<&'static str> {
        self.variant(name).map(|v| v.name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.variants.iter().map(|v| v.name).collect()
    }

    /// `Type.field`, as used in diagnostics.
    pub fn path(&self) -> String {
        format!("{}.{}", self.type_name, self.field)
    }
}

/// Closed interval `[min, max]` declared on a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    pub const fn new(min: i64, max: i64) -> Self {
        Range { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

pub const VALUE: &str = "value";
pub const VALUES: &str = "values";
pub const INCREMENT: &str = "increment";
pub const DECREMENT: &str = "decrement";
pub const AUTO: &str = "auto";

const PATTERN_VARIANTS: &[VariantSpec] = &[
    VariantSpec::stable(VALUE),
    VariantSpec::stable(VALUES),
    VariantSpec::stable(INCREMENT),
    VariantSpec::stable(DECREMENT),
];

const PATTERN_VARIANTS_WITH_AUTO: &[VariantSpec] = &[
    VariantSpec::stable(VALUE),
    VariantSpec::stable(VALUES),
    VariantSpec::stable(INCREMENT),
    VariantSpec::stable(DECREMENT),
    VariantSpec::stable(AUTO),
];

/// Declaration of a pattern field over domain `T`.
#[derive(Debug)]
pub struct PatternSpec<T> {
    pub choice: ChoiceSpec,
    /// Value used for `value`, `values` and counter `start` defaults.
    pub default: T,
    /// Placeholder written for the `auto` variant; `None` when the field has no `auto`.
    pub auto: Option<T>,
    pub range: Option<Range>,
}

impl<T> PatternSpec<T> {
    /// Pattern without `auto`; defaults to `value`.
    pub const fn new(type_name: &'static str, field: &'static str, default: T, range: Option<Range>) -> Self {
        PatternSpec {
            choice: ChoiceSpec {
                type_name,
                field,
                variants: PATTERN_VARIANTS,
                default: Some(VALUE),
                required: false,
            },
            default,
            auto: None,
            range,
        }
    }

    /// Pattern with an `auto` variant, which is also its default.
    pub const fn with_auto(
        type_name: &'static str,
        field: &'static str,
        default: T,
        auto: T,
        range: Option<Range>,
    ) -> Self {
        PatternSpec {
            choice: ChoiceSpec {
                type_name,
                field,
                variants: PATTERN_VARIANTS_WITH_AUTO,
                default: Some(AUTO),
                required: false,
            },
            default,
            auto: Some(auto),
            range,
        }
    }

    pub fn path(&self) -> String {
        self.choice.path()
    }
}

pub const GENERATED: &str = "generated";
pub const CUSTOM: &str = "custom";

const CHECKSUM_VARIANTS: &[VariantSpec] = &[
    VariantSpec::stable(GENERATED),
    VariantSpec::stable(CUSTOM),
];

/// Declaration of a checksum field; `max` bounds the `custom` value (255 or 65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumSpec {
    pub choice: ChoiceSpec,
    pub max: u32,
}

impl ChecksumSpec {
    pub const fn new(type_name: &'static str, field: &'static str, max: u32) -> Self {
        ChecksumSpec {
            choice: ChoiceSpec {
                type_name,
                field,
                variants: CHECKSUM_VARIANTS,
                default: Some(GENERATED),
                required: false,
            },
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TTL: PatternSpec<u32> = PatternSpec::new("FlowIpv4", "time_to_live", 64, Some(Range::new(0, 255)));
    static ETHER_TYPE: PatternSpec<u32> =
        PatternSpec::with_auto("FlowEthernet", "ether_type", 65535, 65535, Some(Range::new(0, 65535)));

    #[test]
    fn auto_only_declared_when_requested() {
        assert!(TTL.choice.variant(AUTO).is_none());
        assert_eq!(TTL.choice.default, Some(VALUE));
        assert_eq!(ETHER_TYPE.choice.canonical("auto"), Some(AUTO));
        assert_eq!(ETHER_TYPE.choice.default, Some(AUTO));
    }

    #[test]
    fn path_and_range() {
        assert_eq!(TTL.path(), "FlowIpv4.time_to_live");
        let r = Range::new(0, 255);
        assert!(r.contains(0) && r.contains(255));
        assert!(!r.contains(-1) && !r.contains(256));
    }
}
