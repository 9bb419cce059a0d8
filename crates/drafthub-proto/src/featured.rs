// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Featured rules: server-validated overrides applied at action time.

use serde::{Deserialize, Serialize};

/// Restriction applied to a character or accessory by a featured rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Banned everywhere, regardless of turn.
    GlobalBan,
    /// Forced pick-only; cannot be banned.
    GlobalPick,
    /// No restriction; also the coercion target for unknown wire values.
    #[default]
    #[serde(other)]
    None,
}

/// A character-scoped featured rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterRule {
    pub code: String,
    #[serde(default)]
    pub rule: RuleKind,
    #[serde(rename = "customCost", default, skip_serializing_if = "Option::is_none")]
    pub custom_cost: Option<f64>,
}

/// An accessory-scoped featured rule. `GlobalPick` is not a valid value here
/// (rejected/coerced to `None` at parse time by the caller).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessoryRule {
    pub id: String,
    #[serde(default)]
    pub rule: RuleKind,
    #[serde(rename = "customCost", default, skip_serializing_if = "Option::is_none")]
    pub custom_cost: Option<f64>,
}

/// A single featured rule entry, discriminated by `kind`. Unknown fields are
/// discarded by serde's default struct deserialization; unknown `rule`
/// strings fall back to `RuleKind::None` via `#[serde(other)]` on the enum's
/// wire form (see `parse_rule_kind`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeaturedRule {
    Character(CharacterRule),
    Accessory(AccessoryRule),
}

impl FeaturedRule {
    /// Validate and normalize a freshly-parsed rule list: `globalPick` on an
    /// accessory rule is rejected by downgrading it to `None`.
    pub fn normalize(rules: Vec<FeaturedRule>) -> Vec<FeaturedRule> {
        rules
            .into_iter()
            .map(|r| match r {
                FeaturedRule::Accessory(mut a) if a.rule == RuleKind::GlobalPick => {
                    a.rule = RuleKind::None;
                    FeaturedRule::Accessory(a)
                }
                other => other,
            })
            .collect()
    }
}

/// Lookup helpers over a featured rule list, used by the Reducer.
pub struct FeaturedRules<'a>(pub &'a [FeaturedRule]);

impl<'a> FeaturedRules<'a> {
    pub fn character_globally_banned(&self, code: &str) -> bool {
        self.0.iter().any(|r| match r {
            FeaturedRule::Character(c) => c.code == code && c.rule == RuleKind::GlobalBan,
            _ => false,
        })
    }

    pub fn character_globally_pick_locked(&self, code: &str) -> bool {
        self.0.iter().any(|r| match r {
            FeaturedRule::Character(c) => c.code == code && c.rule == RuleKind::GlobalPick,
            _ => false,
        })
    }

    pub fn accessory_globally_banned(&self, id: &str) -> bool {
        self.0.iter().any(|r| match r {
            FeaturedRule::Accessory(a) => a.id == id && a.rule == RuleKind::GlobalBan,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessory_global_pick_downgrades_to_none() {
        let rules = FeaturedRule::normalize(vec![FeaturedRule::Accessory(AccessoryRule {
            id: "acc1".into(),
            rule: RuleKind::GlobalPick,
            custom_cost: None,
        })]);
        match &rules[0] {
            FeaturedRule::Accessory(a) => assert_eq!(a.rule, RuleKind::None),
            _ => panic!("expected accessory rule"),
        }
    }

    #[test]
    fn unknown_rule_value_coerces_to_none() {
        let parsed: CharacterRule =
            serde_json::from_str(r#"{"code":"c1","rule":"somethingElse"}"#).unwrap();
        assert_eq!(parsed.rule, RuleKind::None);
    }
}
