use super::error::CalendarError;
use super::types::Calendar;

/// Validates a calendar before creation or update.
pub fn validate_calendar(calendar: &Calendar) -> Result<(), CalendarError> {
    if let Some(scheme) = &calendar.color_scheme {
        if scheme.trim().is_empty() {
            return Err(CalendarError::EmptyColorScheme);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarOwner;
    use uuid::Uuid;

    #[test]
    fn test_validate_calendar_success() {
        let calendar = Calendar::new(CalendarOwner::User(Uuid::new_v4()));
        assert!(validate_calendar(&calendar).is_ok());

        let colored = calendar.with_color_scheme("forest");
        assert!(validate_calendar(&colored).is_ok());
    }

    #[test]
    fn test_validate_calendar_blank_color_scheme() {
        let calendar = Calendar::new(CalendarOwner::User(Uuid::new_v4())).with_color_scheme("  ");
        assert_eq!(
            validate_calendar(&calendar),
            Err(CalendarError::EmptyColorScheme)
        );
    }
}
