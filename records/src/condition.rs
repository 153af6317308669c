//! Filter conditions on dialogue responses.
//!
//! A condition is stored as an `SCVR` rule string followed by an `INTV` or
//! `FLTV` value. The rule packs five header characters and a variable name:
//!
//! ```text
//! index  type  function(2)  comparison  variable...
//!   0     1       46           0        (empty for function tests)
//! ```
//!
//! Type `1` tests one of the numbered functions below. The other types
//! compare a named variable, journal, item, cell and so on; their two
//! function characters are fixed per type.

use std::fmt;
use std::io::{Read, Seek, Write};

use defs::{RecName, RefId};
use esm::{EsmError, EsmReader, EsmResult, EsmWriter};

macro_rules! condition_functions {
    ($($name:ident = $code:literal),* $(,)?) => {
        /// What a condition tests.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[repr(u8)]
        pub enum ConditionFunction {
            $($name = $code,)*
            Global,
            Local,
            Journal,
            Item,
            Dead,
            NotId,
            NotFaction,
            NotClass,
            NotRace,
            NotCell,
            NotLocal,
            /// Placeholder for unset conditions.
            #[default]
            None,
        }

        impl ConditionFunction {
            /// Looks up a numbered function test.
            #[must_use]
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$name),)*
                    _ => None,
                }
            }

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                    Self::Global => "Global",
                    Self::Local => "Local",
                    Self::Journal => "Journal",
                    Self::Item => "Item",
                    Self::Dead => "Dead",
                    Self::NotId => "NotId",
                    Self::NotFaction => "NotFaction",
                    Self::NotClass => "NotClass",
                    Self::NotRace => "NotRace",
                    Self::NotCell => "NotCell",
                    Self::NotLocal => "NotLocal",
                    Self::None => "None",
                }
            }
        }
    };
}

condition_functions! {
    FacReactionLowest = 0,
    FacReactionHighest = 1,
    RankRequirement = 2,
    Reputation = 3,
    HealthPercent = 4,
    PcReputation = 5,
    PcLevel = 6,
    PcHealthPercent = 7,
    PcMagicka = 8,
    PcFatigue = 9,
    PcStrength = 10,
    PcBlock = 11,
    PcArmorer = 12,
    PcMediumArmor = 13,
    PcHeavyArmor = 14,
    PcBluntWeapon = 15,
    PcLongBlade = 16,
    PcAxe = 17,
    PcSpear = 18,
    PcAthletics = 19,
    PcEnchant = 20,
    PcDestruction = 21,
    PcAlteration = 22,
    PcIllusion = 23,
    PcConjuration = 24,
    PcMysticism = 25,
    PcRestoration = 26,
    PcAlchemy = 27,
    PcUnarmored = 28,
    PcSecurity = 29,
    PcSneak = 30,
    PcAcrobatics = 31,
    PcLightArmor = 32,
    PcShortBlade = 33,
    PcMarksman = 34,
    PcMerchantile = 35,
    PcSpeechcraft = 36,
    PcHandToHand = 37,
    PcGender = 38,
    PcExpelled = 39,
    PcCommonDisease = 40,
    PcBlightDisease = 41,
    PcClothingModifier = 42,
    PcCrimeLevel = 43,
    SameSex = 44,
    SameRace = 45,
    SameFaction = 46,
    FactionRankDifference = 47,
    Detected = 48,
    Alarmed = 49,
    Choice = 50,
    PcIntelligence = 51,
    PcWillpower = 52,
    PcAgility = 53,
    PcSpeed = 54,
    PcEndurance = 55,
    PcPersonality = 56,
    PcLuck = 57,
    PcCorprus = 58,
    Weather = 59,
    PcVampire = 60,
    Level = 61,
    Attacked = 62,
    TalkedToPc = 63,
    PcDynamicStat = 64,
    CreatureTarget = 65,
    FriendHit = 66,
    Fight = 67,
    Hello = 68,
    Alarm = 69,
    Flee = 70,
    ShouldAttack = 71,
    Werewolf = 72,
    PcWerewolfKills = 73,
}

impl fmt::Display for ConditionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the tested value is compared against the condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Ls,
    Le,
    #[default]
    None,
}

impl Comparison {
    #[must_use]
    pub const fn from_char(c: u8) -> Option<Self> {
        match c {
            b'0' => Some(Self::Eq),
            b'1' => Some(Self::Ne),
            b'2' => Some(Self::Gt),
            b'3' => Some(Self::Ge),
            b'4' => Some(Self::Ls),
            b'5' => Some(Self::Le),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> u8 {
        match self {
            Self::Eq => b'0',
            Self::Ne => b'1',
            Self::Gt => b'2',
            Self::Ge => b'3',
            Self::Ls => b'4',
            Self::Le => b'5',
            Self::None => b' ',
        }
    }
}

/// The value a condition compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionValue {
    Int(i32),
    Float(f32),
}

impl Default for ConditionValue {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl ConditionValue {
    fn save<W: Write + Seek>(self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        match self {
            Self::Int(value) => w.write_hnt(b"INTV", &value),
            Self::Float(value) => w.write_hnt(b"FLTV", &value),
        }
    }

    fn load<R: Read + Seek>(r: &mut EsmReader<R>) -> EsmResult<Self> {
        let name = r.get_sub_name()?;
        match name.as_bytes() {
            b"INTV" => Ok(Self::Int(r.get_ht()?)),
            b"FLTV" => Ok(Self::Float(r.get_ht()?)),
            _ => Err(EsmError::UnexpectedTag {
                expected: Some(RecName::new(*b"INTV")),
                found: name,
                record: r.rec_name(),
            }),
        }
    }

    /// Two-character variable type tag used in rules.
    const fn type_tag(self) -> &'static str {
        match self {
            Self::Float(_) => "fX",
            Self::Int(value) if value >= i16::MIN as i32 && value <= i16::MAX as i32 => "sX",
            Self::Int(_) => "lX",
        }
    }
}

/// A dialogue response filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogueCondition {
    /// Variable, item, journal or cell name the condition refers to.
    pub variable: String,
    pub value: ConditionValue,
    /// Slot of the condition in the editor, `0..=9`.
    pub index: u8,
    pub function: ConditionFunction,
    pub comparison: Comparison,
}

impl DialogueCondition {
    /// Reads an `SCVR` rule and its value; the tag has already been consumed.
    ///
    /// Malformed rules are logged and yield `None` with the value consumed.
    pub fn load<R: Read + Seek>(
        r: &mut EsmReader<R>,
        context: &RefId,
    ) -> EsmResult<Option<Self>> {
        let rule = r.get_h_string()?;
        let value = ConditionValue::load(r)?;
        Ok(Self::parse(&rule, value, context))
    }

    fn parse(rule: &str, value: ConditionValue, context: &RefId) -> Option<Self> {
        let bytes = rule.as_bytes();
        if bytes.len() < 5 {
            tracing::warn!(info = %context, rule, "dialogue condition rule too short");
            return None;
        }
        let Some(comparison) = Comparison::from_char(bytes[4]) else {
            tracing::warn!(info = %context, rule, "invalid dialogue condition comparison");
            return None;
        };
        let index = if bytes[0].is_ascii_digit() {
            bytes[0] - b'0'
        } else {
            tracing::debug!(info = %context, rule, "invalid dialogue condition index");
            0
        };

        let variable_type = |function| {
            if bytes.len() == 5 {
                tracing::warn!(info = %context, rule, "dialogue condition without variable");
                return None;
            }
            Some(function)
        };
        let function = match bytes[1] {
            b'1' => {
                let code = rule.get(2..4).and_then(|code| code.parse::<u8>().ok());
                match code.and_then(ConditionFunction::from_code) {
                    Some(function) => function,
                    None => {
                        tracing::warn!(info = %context, rule, "unknown dialogue condition function");
                        return None;
                    }
                }
            }
            b'2' => variable_type(ConditionFunction::Global)?,
            b'3' => variable_type(ConditionFunction::Local)?,
            b'4' => variable_type(ConditionFunction::Journal)?,
            b'5' => variable_type(ConditionFunction::Item)?,
            b'6' => variable_type(ConditionFunction::Dead)?,
            b'7' => variable_type(ConditionFunction::NotId)?,
            b'8' => variable_type(ConditionFunction::NotFaction)?,
            b'9' => variable_type(ConditionFunction::NotClass)?,
            b'A' => variable_type(ConditionFunction::NotRace)?,
            b'B' => variable_type(ConditionFunction::NotCell)?,
            b'C' => variable_type(ConditionFunction::NotLocal)?,
            _ => {
                tracing::warn!(info = %context, rule, "unknown dialogue condition type");
                return None;
            }
        };

        Some(Self {
            variable: rule.get(5..).unwrap_or_default().to_string(),
            value,
            index,
            function,
            comparison,
        })
    }

    /// Builds the `SCVR` rule string.
    #[must_use]
    pub fn rule(&self) -> String {
        let mut rule = String::with_capacity(5 + self.variable.len());
        rule.push(char::from(b'0' + self.index.min(9)));
        match self.function {
            ConditionFunction::Global => {
                rule.push('2');
                rule.push_str(self.value.type_tag());
            }
            ConditionFunction::Local => {
                rule.push('3');
                rule.push_str(self.value.type_tag());
            }
            ConditionFunction::Journal => rule.push_str("4JX"),
            ConditionFunction::Item => rule.push_str("5IX"),
            ConditionFunction::Dead => rule.push_str("6DX"),
            ConditionFunction::NotId => rule.push_str("7XX"),
            ConditionFunction::NotFaction => rule.push_str("8FX"),
            ConditionFunction::NotClass => rule.push_str("9CX"),
            ConditionFunction::NotRace => rule.push_str("ARX"),
            ConditionFunction::NotCell => rule.push_str("BLX"),
            ConditionFunction::NotLocal => {
                rule.push('C');
                rule.push_str(self.value.type_tag());
            }
            ConditionFunction::None => rule.push_str("000"),
            function => {
                rule.push('1');
                rule.push_str(&format!("{:02}", function as u8));
            }
        }
        rule.push(char::from(self.comparison.as_char()));
        rule.push_str(&self.variable);
        rule
    }

    pub fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>) -> EsmResult<()> {
        w.write_hn_string(b"SCVR", &self.rule())?;
        self.value.save(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rule: &str) -> Option<DialogueCondition> {
        DialogueCondition::parse(rule, ConditionValue::Int(1), &RefId::Empty)
    }

    #[test]
    fn function_codes_cover_range() {
        for code in 0..=73 {
            let function = ConditionFunction::from_code(code).unwrap();
            assert_eq!(function as u8, code);
        }
        assert_eq!(ConditionFunction::from_code(74), None);
        assert_eq!(ConditionFunction::from_code(61), Some(ConditionFunction::Level));
        assert_eq!(ConditionFunction::PcWerewolfKills.to_string(), "PcWerewolfKills");
    }

    #[test]
    fn function_rule_format() {
        let condition = DialogueCondition {
            index: 2,
            function: ConditionFunction::Level,
            comparison: Comparison::Ge,
            value: ConditionValue::Int(42),
            ..DialogueCondition::default()
        };
        assert_eq!(condition.rule(), "21613");
        assert_eq!(parse("21613").map(|c| c.function), Some(ConditionFunction::Level));
    }

    #[test]
    fn variable_rule_formats() {
        let mut condition = DialogueCondition {
            function: ConditionFunction::Global,
            comparison: Comparison::Eq,
            variable: "PCRace".into(),
            value: ConditionValue::Float(1.0),
            ..DialogueCondition::default()
        };
        assert_eq!(condition.rule(), "02fX0PCRace");

        condition.value = ConditionValue::Int(70_000);
        assert_eq!(condition.rule(), "02lX0PCRace");
        condition.value = ConditionValue::Int(-3);
        assert_eq!(condition.rule(), "02sX0PCRace");

        condition.function = ConditionFunction::NotCell;
        assert_eq!(condition.rule(), "0BLX0PCRace");
    }

    #[test]
    fn parses_typed_rules() {
        let condition = parse("34JX3A1_1_FindSpiritFather").unwrap();
        assert_eq!(condition.index, 3);
        assert_eq!(condition.function, ConditionFunction::Journal);
        assert_eq!(condition.comparison, Comparison::Ge);
        assert_eq!(condition.variable, "A1_1_FindSpiritFather");

        let condition = parse("0CsX1nolore").unwrap();
        assert_eq!(condition.function, ConditionFunction::NotLocal);
    }

    #[test]
    fn malformed_rules_rejected() {
        assert!(parse("012").is_none());
        assert!(parse("01009").is_none());
        assert!(parse("01990").is_none());
        assert!(parse("02sX0").is_none());
        assert!(parse("0ZsX0name").is_none());
    }

    #[test]
    fn bad_index_defaults_to_zero() {
        assert_eq!(parse("x1610").map(|c| c.index), Some(0));
    }
}
