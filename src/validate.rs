//! Validation context, diagnostics and the pure field validators.
//!
//! ## Taxonomy
//!
//! | Kind | Severity |
//! |------|----------|
//! | `InvalidChoice` – variant name not declared for the field | error |
//! | `InconsistentChoice` – declared discriminator disagrees with the populated payload(s) | error |
//! | `RangeViolation` – number outside the declared `[lo, hi]` | error |
//! | `FormatViolation` – MAC/IPv4/IPv6/hex/OID text does not parse | error |
//! | `RequiredFieldMissing` – a non-optional field was never set | error |
//! | `DuplicateName` – two named objects share a name | error |
//! | `DeprecatedUsage` / `UnderReview` | warning |
//!
//! Nothing here panics or returns early: every check appends to the [`ValidationContext`]
//! of the current pass and the caller inspects the [`ValidationReport`] at the end.
//! Diagnostics raised inside [`ValidationContext::scoped`] carry the enclosing location
//! (`flows[1].packet[0].FlowIpv4.time_to_live`), so the same fault in two objects is two lines.

use crate::config::ValidationOptions;
use crate::parser;
use crate::value::Format;
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid choice `{name}` for {field}, expected one of [{expected}]")]
    InvalidChoice {
        field: String,
        name: String,
        expected: String,
    },
    #[error("{field}: choice not matching with property (choice {declared}, populated {populated})")]
    InconsistentChoice {
        field: String,
        declared: String,
        populated: String,
    },
    #[error("{min} <= {field} <= {max} but Got {value}")]
    RangeViolation {
        field: String,
        min: String,
        max: String,
        value: String,
    },
    #[error("invalid {format} `{value}` on {field}")]
    FormatViolation {
        field: String,
        format: Format,
        value: String,
    },
    #[error("{field} is a required field")]
    RequiredFieldMissing { field: String },
    #[error("{field}: duplicate name `{name}`")]
    DuplicateName { field: String, name: String },
}

impl ValidationError {
    fn field_mut(&mut self) -> &mut String {
        match self {
            ValidationError::InvalidChoice { field, .. }
            | ValidationError::InconsistentChoice { field, .. }
            | ValidationError::RangeViolation { field, .. }
            | ValidationError::FormatViolation { field, .. }
            | ValidationError::RequiredFieldMissing { field }
            | ValidationError::DuplicateName { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Advisory {
    #[error("{field} is deprecated: {note}")]
    DeprecatedUsage { field: String, note: String },
    #[error("{field} is under review: {note}")]
    UnderReview { field: String, note: String },
}

impl Advisory {
    fn field_mut(&mut self) -> &mut String {
        match self {
            Advisory::DeprecatedUsage { field, .. } | Advisory::UnderReview { field, .. } => field,
        }
    }
}

/// State of one validation pass: options plus the accumulated diagnostics.
///
/// A context is created per pass and passed explicitly down the resolution/validation call
/// chain; it is never stored in model objects.
#[derive(Debug, Default)]
pub struct ValidationContext {
    options: ValidationOptions,
    errors: Vec<ValidationError>,
    warnings: Vec<Advisory>,
    /// Location segments of the object being checked, outermost first.
    scope: Vec<String>,
    choices_resolved: bool,
}

impl ValidationContext {
    pub fn new(options: ValidationOptions) -> Self {
        ValidationContext {
            options,
            errors: Vec::new(),
            warnings: Vec::new(),
            scope: Vec::new(),
            choices_resolved: false,
        }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Runs `f` with `segment` appended to the location of every diagnostic it records.
    pub fn scoped<R>(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scope.push(segment.into());
        let out = f(self);
        self.scope.pop();
        out
    }

    /// Marks that the message under validation was resolved from its wire form in this pass.
    pub fn mark_choices_resolved(&mut self) {
        self.choices_resolved = true;
    }

    /// Whether resolution already ran in this pass (and reported unset required choices).
    pub fn choices_resolved(&self) -> bool {
        self.choices_resolved
    }

    fn locate(&self, field: &mut String) {
        if !self.scope.is_empty() {
            *field = format!("{}.{}", self.scope.join("."), field);
        }
    }

    pub fn error(&mut self, mut error: ValidationError) {
        self.locate(error.field_mut());
        log::trace!("validation error: {}", error);
        self.errors.push(error);
    }

    pub fn warn(&mut self, mut advisory: Advisory) {
        self.locate(advisory.field_mut());
        log::trace!("validation warning: {}", advisory);
        self.warnings.push(advisory);
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Advisory] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drop accumulated diagnostics, keeping the options.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    /// Render the diagnostics into a flat report.
    pub fn finish(self) -> ValidationReport {
        let mut errors: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        let mut warnings: Vec<String> = self.warnings.iter().map(ToString::to_string).collect();
        if self.options.warnings_as_errors {
            errors.append(&mut warnings);
        }
        ValidationReport { errors, warnings }
    }
}

/// Outcome of a validation pass: flat, formatted error and warning strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// A pass fails iff at least one error was recorded; warnings never fail it.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages with their severity, errors first.
    pub fn messages(&self) -> impl Iterator<Item = (Severity, &str)> {
        self.errors
            .iter()
            .map(|e| (Severity::Error, e.as_str()))
            .chain(self.warnings.iter().map(|w| (Severity::Warning, w.as_str())))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (severity, message) in self.messages() {
            let tag = match severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            writeln!(f, "{}: {}", tag, message)?;
        }
        Ok(())
    }
}

/// Closed-interval check; appends a `RangeViolation` and returns `false` when outside.
pub fn validate_range<N>(ctx: &mut ValidationContext, field: &str, value: N, min: N, max: N) -> bool
where
    N: PartialOrd + fmt::Display,
{
    if min <= value && value <= max {
        return true;
    }
    ctx.error(ValidationError::RangeViolation {
        field: field.to_string(),
        min: min.to_string(),
        max: max.to_string(),
        value: value.to_string(),
    });
    false
}

/// Checks `value` against `format`; appends a `FormatViolation` on failure.
pub fn validate_format(ctx: &mut ValidationContext, field: &str, format: Format, value: &str) -> bool {
    match parser::check(format, value) {
        Ok(()) => true,
        Err(_) => {
            ctx.error(ValidationError::FormatViolation {
                field: field.to_string(),
                format,
                value: value.to_string(),
            });
            false
        }
    }
}

/// Checks every element; only the first failing element is reported.
pub fn validate_format_slice<S: AsRef<str>>(
    ctx: &mut ValidationContext,
    field: &str,
    format: Format,
    values: &[S],
) -> bool {
    match values
        .iter()
        .map(AsRef::as_ref)
        .find(|v| parser::check(format, v).is_err())
    {
        None => true,
        Some(bad) => validate_format(ctx, field, format, bad),
    }
}

pub fn validate_mac(ctx: &mut ValidationContext, field: &str, value: &str) -> bool {
    validate_format(ctx, field, Format::Mac, value)
}

pub fn validate_ipv4(ctx: &mut ValidationContext, field: &str, value: &str) -> bool {
    validate_format(ctx, field, Format::Ipv4, value)
}

pub fn validate_ipv6(ctx: &mut ValidationContext, field: &str, value: &str) -> bool {
    validate_format(ctx, field, Format::Ipv6, value)
}

pub fn validate_hex(ctx: &mut ValidationContext, field: &str, value: &str) -> bool {
    validate_format(ctx, field, Format::Hex, value)
}

pub fn validate_oid(ctx: &mut ValidationContext, field: &str, value: &str) -> bool {
    validate_format(ctx, field, Format::Oid, value)
}

pub fn validate_mac_slice<S: AsRef<str>>(ctx: &mut ValidationContext, field: &str, values: &[S]) -> bool {
    validate_format_slice(ctx, field, Format::Mac, values)
}

pub fn validate_ipv4_slice<S: AsRef<str>>(ctx: &mut ValidationContext, field: &str, values: &[S]) -> bool {
    validate_format_slice(ctx, field, Format::Ipv4, values)
}

pub fn validate_ipv6_slice<S: AsRef<str>>(ctx: &mut ValidationContext, field: &str, values: &[S]) -> bool {
    validate_format_slice(ctx, field, Format::Ipv6, values)
}

/// `RequiredFieldMissing` when a required string property is empty.
pub fn validate_required(ctx: &mut ValidationContext, field: &str, value: &str) -> bool {
    if value.is_empty() {
        ctx.error(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
        return false;
    }
    true
}
