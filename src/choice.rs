//! Choice engine: "exactly one of N" fields with deterministic default resolution.
//!
//! A resolved choice is a Rust enum held by a [`ChoiceField`], so at most one variant is ever
//! populated. The sibling-slot shape (`choice` discriminator plus one optional payload per
//! variant) only exists in decoded wire forms; [`resolve`] reconciles it:
//!
//! | Populated slots | Outcome |
//! |-----------------|---------|
//! | 0, discriminator set | that variant with its default payload |
//! | 0, no discriminator | schema default variant (if `apply_defaults`), else unset |
//! | 1 | that slot; a disagreeing discriminator is `InconsistentChoice` |
//! | >1 | first slot in schema order; `InconsistentChoice` under [`Ambiguity::Strict`] |
//!
//! Populated slots the field does not declare (e.g. `auto` on a pattern without it) are
//! reported as `InvalidChoice` and left out of the count.
//!
//! Accessors come in two flavours: [`ChoiceField::peek`] never mutates, while
//! [`ChoiceField::get_or_default`] instantiates the requested variant (switching the active
//! variant) when it is not the active one.

use crate::config::Ambiguity;
use crate::schema::{ChoiceSpec, Status};
use crate::validate::{Advisory, ValidationContext, ValidationError};
use std::fmt;

/// A discriminated union declared by the schema.
pub trait Choice: Clone + fmt::Debug + PartialEq + Sized {
    /// Per-field schema the union is declared with (e.g. a pattern's range and defaults).
    type Schema: fmt::Debug + Sync + 'static;

    fn spec(schema: &Self::Schema) -> &ChoiceSpec;

    /// Name of the active variant.
    fn variant(&self) -> &'static str;

    /// Domain default payload for `variant`; `None` when the variant is not declared.
    fn default_for(variant: &str, schema: &Self::Schema) -> Option<Self>;

    /// Payload-specific checks (ranges, required sub-fields).
    fn validate(&self, _schema: &Self::Schema, _ctx: &mut ValidationContext) {}
}

/// Sibling-slot view of a decoded choice.
pub trait ChoiceSlots {
    /// Discriminator carried by the decoded message, if any.
    fn declared(&self) -> Option<&str>;

    /// Names of the populated slots, in schema order.
    fn populated(&self) -> Vec<&'static str>;
}

/// Wire form of a choice: convertible from and to the resolved enum.
pub trait WireChoice<C: Choice>: ChoiceSlots + Sized {
    /// Converts the payload held in slot `variant`; `None` if that slot is empty.
    fn take(self, variant: &'static str, schema: &C::Schema, ctx: &mut ValidationContext) -> Option<C>;

    fn from_choice(choice: &C) -> Self;
}

/// What [`resolve`] decided for one decoded choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Adopt the payload decoded into this slot.
    Take(&'static str),
    /// Populate this variant with its default payload.
    Default(&'static str),
    Unset,
}

/// Reconcile a decoded discriminator with its populated slots.
pub fn resolve(
    spec: &ChoiceSpec,
    declared: Option<&str>,
    populated: &[&'static str],
    apply_defaults: bool,
    ctx: &mut ValidationContext,
) -> Resolution {
    let declared = match declared {
        Some(name) => match spec.canonical(name) {
            Some(canonical) => Some(canonical),
            None => {
                ctx.error(invalid_choice(spec, name));
                None
            }
        },
        None => None,
    };

    let mut slots: Vec<&'static str> = Vec::with_capacity(populated.len());
    for name in populated {
        match spec.canonical(name) {
            Some(canonical) => slots.push(canonical),
            None => ctx.error(invalid_choice(spec, name)),
        }
    }

    match slots.as_slice() {
        [] => match (declared, spec.default) {
            (Some(variant), _) => Resolution::Default(variant),
            (None, Some(default)) if apply_defaults => {
                log::debug!("{}: defaulting to `{}`", spec.path(), default);
                Resolution::Default(default)
            }
            _ => {
                if spec.required {
                    ctx.error(ValidationError::RequiredFieldMissing { field: spec.path() });
                }
                Resolution::Unset
            }
        },
        [only] => {
            if let Some(variant) = declared {
                if variant != *only {
                    ctx.error(ValidationError::InconsistentChoice {
                        field: spec.path(),
                        declared: variant.to_string(),
                        populated: only.to_string(),
                    });
                }
            }
            log::trace!("{}: resolved to `{}`", spec.path(), only);
            Resolution::Take(*only)
        }
        [first, ..] => {
            let listed = slots.join(", ");
            let ambiguity = ctx.options().ambiguity;
            match ambiguity {
                Ambiguity::Strict => ctx.error(ValidationError::InconsistentChoice {
                    field: spec.path(),
                    declared: declared.unwrap_or("unset").to_string(),
                    populated: listed,
                }),
                Ambiguity::FirstWins => {
                    log::warn!("{}: several variants populated ({}), keeping `{}`", spec.path(), listed, first)
                }
            }
            Resolution::Take(*first)
        }
    }
}

fn invalid_choice(spec: &ChoiceSpec, name: &str) -> ValidationError {
    ValidationError::InvalidChoice {
        field: spec.path(),
        name: name.to_string(),
        expected: spec.names().join(", "),
    }
}

/// A field holding at most one variant of `C`.
pub struct ChoiceField<C: Choice> {
    schema: &'static C::Schema,
    active: Option<C>,
}

impl<C: Choice> ChoiceField<C> {
    /// Field with its schema default applied.
    pub fn new(schema: &'static C::Schema) -> Self {
        let mut field = Self::unset(schema);
        field.set_default();
        field
    }

    pub fn unset(schema: &'static C::Schema) -> Self {
        ChoiceField { schema, active: None }
    }

    pub fn with(schema: &'static C::Schema, value: C) -> Self {
        ChoiceField {
            schema,
            active: Some(value),
        }
    }

    pub fn schema(&self) -> &'static C::Schema {
        self.schema
    }

    pub fn spec(&self) -> &'static ChoiceSpec {
        C::spec(self.schema)
    }

    /// Adopt the declared default variant when nothing is set. No-op otherwise.
    pub fn set_default(&mut self) {
        if self.active.is_some() {
            return;
        }
        if let Some(default) = self.spec().default {
            self.active = C::default_for(default, self.schema);
        }
    }

    /// Active payload, without side effects.
    pub fn peek(&self) -> Option<&C> {
        self.active.as_ref()
    }

    pub fn peek_mut(&mut self) -> Option<&mut C> {
        self.active.as_mut()
    }

    pub fn active_variant(&self) -> Option<&'static str> {
        self.active.as_ref().map(C::variant)
    }

    pub fn is_set(&self) -> bool {
        self.active.is_some()
    }

    /// Replace the active variant; the previous payload is dropped.
    pub fn set(&mut self, value: C) {
        self.active = Some(value);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn take(&mut self) -> Option<C> {
        self.active.take()
    }

    /// Active payload, inserting `make()` when the field is unset.
    pub(crate) fn get_or_insert_with(&mut self, make: impl FnOnce() -> C) -> &mut C {
        self.active.get_or_insert_with(make)
    }

    /// Select `name`, with `payload` or the variant's default payload.
    ///
    /// An undeclared `name` appends `InvalidChoice` and leaves the field untouched; a payload of
    /// another variant appends `InconsistentChoice`. Returns whether the field changed.
    pub fn set_variant(&mut self, name: &str, payload: Option<C>, ctx: &mut ValidationContext) -> bool {
        let spec = self.spec();
        let Some(variant) = spec.canonical(name) else {
            ctx.error(invalid_choice(spec, name));
            return false;
        };
        let value = match payload {
            Some(p) if p.variant() == variant => p,
            Some(p) => {
                ctx.error(ValidationError::InconsistentChoice {
                    field: spec.path(),
                    declared: variant.to_string(),
                    populated: p.variant().to_string(),
                });
                return false;
            }
            None => match C::default_for(variant, self.schema) {
                Some(d) => d,
                None => {
                    ctx.error(invalid_choice(spec, name));
                    return false;
                }
            },
        };
        self.active = Some(value);
        true
    }

    /// Payload of `name`, instantiating its default and switching to it when another variant
    /// (or none) is active. Reading through this accessor mutates the field.
    pub fn get_or_default(&mut self, name: &str, ctx: &mut ValidationContext) -> Option<&mut C> {
        if self.active_variant() != Some(name) && !self.set_variant(name, None, ctx) {
            return None;
        }
        self.active.as_mut()
    }

    /// Resolve a decoded wire form (see the module table). An absent wire form behaves like one
    /// with nothing populated.
    pub fn from_wire<W>(wire: Option<W>, schema: &'static C::Schema, ctx: &mut ValidationContext) -> Self
    where
        W: WireChoice<C>,
    {
        let spec = C::spec(schema);
        let apply_defaults = ctx.options().apply_defaults;
        let resolution = match &wire {
            Some(w) => resolve(spec, w.declared(), &w.populated(), apply_defaults, ctx),
            None => resolve(spec, None, &[], apply_defaults, ctx),
        };
        let active = match (resolution, wire) {
            (Resolution::Take(variant), Some(w)) => w
                .take(variant, schema, ctx)
                .or_else(|| C::default_for(variant, schema)),
            (Resolution::Take(variant), None) | (Resolution::Default(variant), _) => {
                C::default_for(variant, schema)
            }
            (Resolution::Unset, _) => None,
        };
        ChoiceField { schema, active }
    }

    pub fn to_wire<W>(&self) -> Option<W>
    where
        W: WireChoice<C>,
    {
        self.active.as_ref().map(W::from_choice)
    }

    /// Required-ness, declared variant, variant status warnings and payload checks.
    ///
    /// A required field left unset is not reported again when the context already resolved
    /// this message from its wire form, since [`resolve`] reported it then.
    pub fn validate(&self, ctx: &mut ValidationContext) {
        let spec = self.spec();
        let Some(active) = &self.active else {
            if spec.required && !ctx.choices_resolved() {
                ctx.error(ValidationError::RequiredFieldMissing { field: spec.path() });
            }
            return;
        };
        let Some(variant) = spec.variant(active.variant()) else {
            ctx.error(invalid_choice(spec, active.variant()));
            return;
        };
        let field = format!("{}.{}", spec.path(), variant.name);
        match variant.status {
            Status::Stable => {}
            Status::Deprecated(note) => ctx.warn(Advisory::DeprecatedUsage {
                field,
                note: note.to_string(),
            }),
            Status::UnderReview(note) => ctx.warn(Advisory::UnderReview {
                field,
                note: note.to_string(),
            }),
        }
        active.validate(self.schema, ctx);
    }
}

impl<C: Choice> Clone for ChoiceField<C> {
    fn clone(&self) -> Self {
        ChoiceField {
            schema: self.schema,
            active: self.active.clone(),
        }
    }
}

impl<C: Choice> fmt::Debug for ChoiceField<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceField")
            .field("field", &self.spec().path())
            .field("active", &self.active)
            .finish()
    }
}

impl<C: Choice> PartialEq for ChoiceField<C> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.active == other.active
    }
}
