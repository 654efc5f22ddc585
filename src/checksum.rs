//! Checksum fields: engine-generated (good or deliberately bad) or a custom value.

use crate::choice::{Choice, ChoiceField, ChoiceSlots, WireChoice};
use crate::schema::{ChecksumSpec, ChoiceSpec, CUSTOM, GENERATED};
use crate::validate::{validate_range, ValidationContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generated {
    #[default]
    Good,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    Generated(Generated),
    Custom(u32),
}

impl Choice for Checksum {
    type Schema = ChecksumSpec;

    fn spec(schema: &ChecksumSpec) -> &ChoiceSpec {
        &schema.choice
    }

    fn variant(&self) -> &'static str {
        match self {
            Checksum::Generated(_) => GENERATED,
            Checksum::Custom(_) => CUSTOM,
        }
    }

    fn default_for(variant: &str, _schema: &ChecksumSpec) -> Option<Self> {
        match variant {
            GENERATED => Some(Checksum::Generated(Generated::Good)),
            CUSTOM => Some(Checksum::Custom(0)),
            _ => None,
        }
    }

    fn validate(&self, schema: &ChecksumSpec, ctx: &mut ValidationContext) {
        if let Checksum::Custom(v) = self {
            let field = format!("{}.custom", schema.choice.path());
            validate_range(ctx, &field, *v, 0, schema.max);
        }
    }
}

pub type ChecksumField = ChoiceField<Checksum>;

impl ChoiceField<Checksum> {
    pub fn generated(&self) -> Option<Generated> {
        match self.peek() {
            Some(Checksum::Generated(g)) => Some(*g),
            _ => None,
        }
    }

    pub fn set_generated(&mut self, generated: Generated) {
        self.set(Checksum::Generated(generated));
    }

    pub fn custom(&self) -> Option<u32> {
        match self.peek() {
            Some(Checksum::Custom(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn set_custom(&mut self, value: u32) {
        self.set(Checksum::Custom(value));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireChecksum {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<Generated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<i64>,
}

impl ChoiceSlots for WireChecksum {
    fn declared(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn populated(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.generated.is_some() {
            out.push(GENERATED);
        }
        if self.custom.is_some() {
            out.push(CUSTOM);
        }
        out
    }
}

impl WireChoice<Checksum> for WireChecksum {
    fn take(self, variant: &'static str, schema: &ChecksumSpec, ctx: &mut ValidationContext) -> Option<Checksum> {
        match variant {
            GENERATED => self.generated.map(Checksum::Generated),
            CUSTOM => self.custom.map(|v| match u32::try_from(v) {
                Ok(v) => Checksum::Custom(v),
                Err(_) => {
                    let field = format!("{}.custom", schema.choice.path());
                    validate_range(ctx, &field, v, 0, schema.max as i64);
                    Checksum::Custom(0)
                }
            }),
            _ => None,
        }
    }

    fn from_choice(choice: &Checksum) -> Self {
        let mut wire = WireChecksum {
            choice: Some(choice.variant().to_string()),
            ..Default::default()
        };
        match choice {
            Checksum::Generated(g) => wire.generated = Some(*g),
            Checksum::Custom(v) => wire.custom = Some(*v as i64),
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static HEADER: ChecksumSpec = ChecksumSpec::new("FlowIpv4", "header_checksum", 65535);
    static INNER: ChecksumSpec = ChecksumSpec::new("FlowIcmp", "checksum", 255);

    #[test]
    fn defaults_to_generated_good() {
        let field = ChecksumField::new(&HEADER);
        assert_eq!(field.generated(), Some(Generated::Good));
        assert_eq!(field.custom(), None);
    }

    #[test]
    fn custom_range_depends_on_width() {
        let mut ctx = ValidationContext::default();
        let mut inner = ChecksumField::new(&INNER);
        inner.set_custom(255);
        inner.validate(&mut ctx);
        assert!(!ctx.has_errors());
        inner.set_custom(256);
        inner.validate(&mut ctx);
        assert_eq!(ctx.errors()[0].to_string(), "0 <= FlowIcmp.checksum.custom <= 255 but Got 256");

        let mut ctx = ValidationContext::default();
        let mut header = ChecksumField::new(&HEADER);
        header.set_custom(65535);
        header.validate(&mut ctx);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn wire_custom_resolves() {
        let mut ctx = ValidationContext::default();
        let wire = WireChecksum {
            custom: Some(0x1234),
            ..Default::default()
        };
        let field = ChecksumField::from_wire(Some(wire), &HEADER, &mut ctx);
        assert_eq!(field.custom(), Some(0x1234));
        assert_eq!(field.to_wire::<WireChecksum>().and_then(|w| w.choice), Some("custom".to_string()));
    }

    #[test]
    fn wire_generated_string() {
        let wire: WireChecksum = serde_json::from_str(r#"{"choice":"generated","generated":"bad"}"#).expect("decode");
        let mut ctx = ValidationContext::default();
        let field = ChecksumField::from_wire(Some(wire), &HEADER, &mut ctx);
        assert_eq!(field.generated(), Some(Generated::Bad));
        assert!(!ctx.has_errors());
    }
}
