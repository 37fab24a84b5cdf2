//! Custom field validators plugged into `#[derive(Validate)]` payloads.

use std::borrow::Cow;
use std::fmt::Display;

use chrono::{NaiveDate, NaiveTime, Utc};
use validator::ValidationError;

use crate::value_types::{AcademicLevel, DecimalInput, Sex};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const BLANK_MESSAGE: &str = "This field may not be blank.";

/// The calendar date birthdates are compared against.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn error_with(code: &'static str, message: impl Display) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message.to_string()))
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error_with("blank", BLANK_MESSAGE))
    } else {
        Ok(())
    }
}

pub fn validate_past_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < today() {
        Ok(())
    } else {
        Err(error_with("past_date", "The date must be in the past."))
    }
}

pub fn validate_sex(code: &str) -> Result<(), ValidationError> {
    code.parse::<Sex>()
        .map(|_| ())
        .map_err(|e| error_with("choice", e))
}

pub fn validate_academic_level(code: &str) -> Result<(), ValidationError> {
    code.parse::<AcademicLevel>()
        .map(|_| ())
        .map_err(|e| error_with("choice", e))
}

pub fn validate_money(amount: &DecimalInput) -> Result<(), ValidationError> {
    amount
        .to_money()
        .map(|_| ())
        .map_err(|e| error_with("decimal", e))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

pub fn validate_time(raw: &str) -> Result<(), ValidationError> {
    match parse_time(raw) {
        Some(_) => Ok(()),
        None => Err(error_with(
            "time",
            "Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]].",
        )),
    }
}
