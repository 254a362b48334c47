use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("range end {end} is before start {start}")]
    EndBeforeStart { start: usize, end: usize },
}

/// Inclusive UTF-16 code unit range. `end` is the last unit, not one past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextRange {
    start: usize,
    end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[0, end]`. Cannot be malformed.
    pub(crate) fn from_zero(end: usize) -> Self {
        Self { start: 0, end }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn set_start(&mut self, start: usize) -> Result<(), RangeError> {
        *self = Self::new(start, self.end)?;
        Ok(())
    }

    pub fn set_end(&mut self, end: usize) -> Result<(), RangeError> {
        *self = Self::new(self.start, end)?;
        Ok(())
    }
}

/// Outcome of weighing one tweet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResults {
    pub weighted_length: usize,
    /// Weighted length per thousand of the maximum, rounded.
    pub permillage: usize,
    pub valid: bool,
    pub display_range: TextRange,
    pub valid_range: TextRange,
}

impl ParseResults {
    pub fn new(
        weighted_length: usize,
        permillage: usize,
        valid: bool,
        display_range: (usize, usize),
        valid_range: (usize, usize),
    ) -> Result<Self, RangeError> {
        Ok(Self {
            weighted_length,
            permillage,
            valid,
            display_range: TextRange::new(display_range.0, display_range.1)?,
            valid_range: TextRange::new(valid_range.0, valid_range.1)?,
        })
    }

    /// All zeros, not valid. What an empty tweet parses to.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The flat record form.
    pub fn to_record(&self) -> ParseResultsRecord {
        ParseResultsRecord {
            weighted_length: self.weighted_length,
            valid: self.valid,
            permillage: self.permillage,
            display_range_start: self.display_range.start,
            display_range_end: self.display_range.end,
            valid_range_start: self.valid_range.start,
            valid_range_end: self.valid_range.end,
        }
    }
}

/// [`ParseResults`] with both ranges spread into start/end fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResultsRecord {
    pub weighted_length: usize,
    pub valid: bool,
    pub permillage: usize,
    pub display_range_start: usize,
    pub display_range_end: usize,
    pub valid_range_start: usize,
    pub valid_range_end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn construct() {
        let r = ParseResults::new(192, 685, true, (0, 210), (0, 210)).unwrap();
        assert_eq!(r.weighted_length, 192);
        assert_eq!(r.permillage, 685);
        assert!(r.valid);
        assert_eq!((r.display_range.start(), r.display_range.end()), (0, 210));
        assert_eq!((r.valid_range.start(), r.valid_range.end()), (0, 210));
    }

    #[test]
    fn empty_is_zero_and_invalid() {
        let r = ParseResults::empty();
        assert_eq!(r.weighted_length, 0);
        assert_eq!(r.permillage, 0);
        assert!(!r.valid);
        assert_eq!(r.display_range, TextRange::default());
        assert_eq!(r.valid_range, TextRange::default());
    }

    #[test]
    fn record_form() {
        let r = ParseResults::new(192, 685, true, (0, 210), (0, 210)).unwrap();
        assert_eq!(
            serde_json::to_value(r.to_record()).unwrap(),
            json!({
                "weightedLength": 192,
                "valid": true,
                "permillage": 685,
                "displayRangeStart": 0,
                "displayRangeEnd": 210,
                "validRangeStart": 0,
                "validRangeEnd": 210,
            })
        );
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert_eq!(
            TextRange::new(1, 0),
            Err(RangeError::EndBeforeStart { start: 1, end: 0 })
        );
        let mut r = ParseResults::empty();
        assert!(r.display_range.set_start(1).is_err());
        assert!(r.valid_range.set_start(1).is_err());
        assert!(r.valid_range.set_end(4).is_ok());
        assert!(r.valid_range.set_start(1).is_ok());
        assert!(ParseResults::new(0, 0, false, (3, 2), (0, 0)).is_err());
    }
}
