//! Strongly-typed value types for domain primitives.
//!
//! Money amounts, weekday lists and the coded choice fields (`sex`,
//! `academic_level`) are wrapped so that once constructed they are always
//! valid. Write payloads carry the raw text and run it through the same
//! parsers inside `validator` custom functions, which lets every bad field of
//! a payload be reported at once.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Error type for value type parsing failures.
///
/// The `Display` output is the message shown to API clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    InvalidNumber,
    MaxDigits,
    MaxDecimalPlaces,
    MaxWholeDigits,
    NotIntegerList,
    NotWeekdayList,
    WeekdayOutOfRange,
    InvalidChoice(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber => write!(f, "A valid number is required."),
            Self::MaxDigits => write!(
                f,
                "Ensure that there are no more than {} digits in total.",
                Money::MAX_DIGITS
            ),
            Self::MaxDecimalPlaces => write!(
                f,
                "Ensure that there are no more than {} decimal places.",
                Money::DECIMAL_PLACES
            ),
            Self::MaxWholeDigits => write!(
                f,
                "Ensure that there are no more than {} digits before the decimal point.",
                Money::MAX_DIGITS - Money::DECIMAL_PLACES
            ),
            Self::NotIntegerList => write!(f, "Enter only digits separated by commas."),
            Self::NotWeekdayList => {
                write!(f, "Days of the week must be a comma separated integer list")
            }
            Self::WeekdayOutOfRange => write!(f, "Days of the week must be between 1 and 7"),
            Self::InvalidChoice(value) => write!(f, "\"{}\" is not a valid choice.", value),
        }
    }
}

// ============================================================================
// Money
// ============================================================================

/// A fixed-point amount with two decimal places, held as cents.
///
/// Rendered on the wire as a string with exactly two decimals (`"100.00"`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, ToSchema)]
#[schema(value_type = String, example = "100.00")]
pub struct Money(i64);

impl Money {
    pub const MAX_DIGITS: usize = 8;
    pub const DECIMAL_PLACES: usize = 2;

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Parse a plain decimal literal such as `"150"`, `"-3.5"` or `"0.05"`.
    ///
    /// Digit limits are checked in the same order the messages are listed in
    /// [`ValueTypeError`]: total digits, decimal places, whole digits.
    pub fn parse(raw: &str) -> Result<Self, ValueTypeError> {
        let raw = raw.trim();
        let (negative, unsigned) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(ValueTypeError::InvalidNumber);
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(ValueTypeError::InvalidNumber);
        }

        let significant_whole = whole.trim_start_matches('0');
        if significant_whole.len() + fraction.len() > Self::MAX_DIGITS {
            return Err(ValueTypeError::MaxDigits);
        }
        if fraction.len() > Self::DECIMAL_PLACES {
            return Err(ValueTypeError::MaxDecimalPlaces);
        }
        if significant_whole.len() > Self::MAX_DIGITS - Self::DECIMAL_PLACES {
            return Err(ValueTypeError::MaxWholeDigits);
        }

        let whole_value: i64 = if significant_whole.is_empty() {
            0
        } else {
            significant_whole
                .parse()
                .map_err(|_| ValueTypeError::InvalidNumber)?
        };
        let mut fraction_value: i64 = 0;
        for (place, digit) in fraction.bytes().enumerate() {
            let scale = if place == 0 { 10 } else { 1 };
            fraction_value += i64::from(digit - b'0') * scale;
        }

        let cents = whole_value * 100 + fraction_value;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Type<sqlx::Postgres> for Money {
    fn type_info() -> PgTypeInfo {
        <i64 as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <i64 as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for Money {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <i64 as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
    }
}

/// Unvalidated decimal text as it arrived in a request body.
///
/// Clients may send the amount as a JSON number or a string; both are kept
/// as text so that [`Money::parse`] can report a field-level error instead of
/// the whole body being rejected. Serializes back to the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(value_type = String, example = "100.00")]
pub struct DecimalInput(String);

impl DecimalInput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_money(&self) -> Result<Money, ValueTypeError> {
        Money::parse(&self.0)
    }
}

impl From<Money> for DecimalInput {
    fn from(money: Money) -> Self {
        Self(money.to_string())
    }
}

impl<'de> Deserialize<'de> for DecimalInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = DecimalInput;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal number or a string containing one")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(DecimalInput(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(DecimalInput(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(DecimalInput(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(DecimalInput(v.to_string()))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}

// ============================================================================
// DaysOfWeek
// ============================================================================

/// Comma-encoded weekday list (`"1,3,5"`), 1 being Monday.
///
/// Kept in its original text form; [`DaysOfWeek::days`] yields the numbers.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "1,3,5")]
pub struct DaysOfWeek(String);

type TextValidator = fn(&str) -> Result<(), ValueTypeError>;

impl DaysOfWeek {
    /// Every validator runs, so one value can yield several errors.
    const VALIDATORS: [TextValidator; 2] = [comma_separated_integers, weekday_numbers];

    pub fn new(raw: impl Into<String>) -> Result<Self, Vec<ValueTypeError>> {
        let raw = raw.into();
        let errors = Self::check(&raw);
        if errors.is_empty() {
            Ok(Self(raw))
        } else {
            Err(errors)
        }
    }

    /// Wrap text already validated, e.g. loaded from the database.
    #[inline]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn check(raw: &str) -> Vec<ValueTypeError> {
        Self::VALIDATORS
            .iter()
            .filter_map(|validate| validate(raw).err())
            .collect()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn days(&self) -> Vec<u8> {
        self.0
            .split(',')
            .filter_map(|day| day.trim().parse().ok())
            .collect()
    }
}

fn comma_separated_integers(raw: &str) -> Result<(), ValueTypeError> {
    let valid = raw
        .split(',')
        .all(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(ValueTypeError::NotIntegerList)
    }
}

fn weekday_numbers(raw: &str) -> Result<(), ValueTypeError> {
    for token in raw.split(',') {
        let day: i64 = token
            .trim()
            .parse()
            .map_err(|_| ValueTypeError::NotWeekdayList)?;
        if !(1..=7).contains(&day) {
            return Err(ValueTypeError::WeekdayOutOfRange);
        }
    }
    Ok(())
}

impl fmt::Debug for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DaysOfWeek({})", self.0)
    }
}

impl fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Coded choices
// ============================================================================

/// Defines a closed set of short codes stored as TEXT and rendered as the
/// bare code in JSON.
macro_rules! define_choice {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValueTypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($name::$variant),)+
                    other => Err(ValueTypeError::InvalidChoice(other.to_string())),
                }
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let code = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(code.parse()?)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <String as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_choice!(
    /// Sex of a Member.
    Sex {
        Male => ("M", "Male"),
        Female => ("F", "Female"),
        Other => ("O", "Other"),
    }
);

define_choice!(
    /// Highest academic degree of a Teacher.
    AcademicLevel {
        Graduate => ("Gr", "Graduate"),
        Master => ("Ms", "Master"),
        Doctor => ("Dr", "Doctor"),
    }
);

// SQLx support for DaysOfWeek (TEXT column)
impl Type<sqlx::Postgres> for DaysOfWeek {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for DaysOfWeek {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for DaysOfWeek {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <String as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
    }
}
