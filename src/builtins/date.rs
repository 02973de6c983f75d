use std::sync::Arc;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};

use crate::attribute_value::AttributeValue;
use crate::clock::Clock;
use crate::condition_set::ConditionSet;
use crate::context::Context;
use crate::field::{Field, FieldKind, Fields};
use crate::settings::Settings;

use super::{ACTIVE_TIMEZONE_TODAY_CONDITION_SET, APP_TODAY_CONDITION_SET, UTC_TODAY_CONDITION_SET};

fn today_fields() -> Fields {
    Fields::builtin(vec![
        Field::new("now_is_on_or_after", FieldKind::OnOrAfterDate).with_label("Now is on or after"),
        Field::new("now_is_before", FieldKind::BeforeDate).with_label("Now is before"),
    ])
}

fn today_value(field_name: &str, now: NaiveDateTime) -> Option<AttributeValue> {
    match field_name {
        "now_is_on_or_after" | "now_is_before" => Some(AttributeValue::DateTime(now)),
        _ => None,
    }
}

fn wall_clock(clock: &dyn Clock, offset: FixedOffset) -> NaiveDateTime {
    clock.now().with_timezone(&offset).naive_local()
}

/// Compares the current time in UTC.
pub struct UTCTodayConditionSet {
    fields: Fields,
    clock: Arc<dyn Clock>,
}

impl UTCTodayConditionSet {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        UTCTodayConditionSet {
            fields: today_fields(),
            clock,
        }
    }

    pub fn now(&self, _context: Option<&Context>) -> NaiveDateTime {
        self.clock.now().naive_utc()
    }
}

impl ConditionSet for UTCTodayConditionSet {
    fn id(&self) -> &str {
        UTC_TODAY_CONDITION_SET
    }

    fn label(&self) -> &str {
        "Today (UTC)"
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn field_value(&self, context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
        today_value(field_name, self.now(context))
    }
}

/// Compares the current time in the application's timezone.
///
/// With `use_tz` unset the server's local time is used; with it set, the configured `time_zone`
/// (UTC when absent).
pub struct AppTodayConditionSet {
    fields: Fields,
    clock: Arc<dyn Clock>,
    use_tz: bool,
    time_zone: Option<FixedOffset>,
}

impl AppTodayConditionSet {
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        AppTodayConditionSet {
            fields: today_fields(),
            clock,
            use_tz: settings.use_tz,
            time_zone: settings.time_zone,
        }
    }

    fn offset(&self) -> FixedOffset {
        if self.use_tz {
            self.time_zone.unwrap_or_else(|| Utc.fix())
        } else {
            self.clock.local_offset()
        }
    }

    pub fn now(&self, _context: Option<&Context>) -> NaiveDateTime {
        wall_clock(self.clock.as_ref(), self.offset())
    }
}

impl ConditionSet for AppTodayConditionSet {
    fn id(&self) -> &str {
        APP_TODAY_CONDITION_SET
    }

    fn label(&self) -> &str {
        "Today (application timezone)"
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn field_value(&self, context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
        today_value(field_name, self.now(context))
    }
}

/// Compares the current time in the timezone activated for the request, falling back to the
/// application timezone. With `use_tz` unset the server's local time is used.
pub struct ActiveTimezoneTodayConditionSet {
    fields: Fields,
    app: AppTodayConditionSet,
}

impl ActiveTimezoneTodayConditionSet {
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        ActiveTimezoneTodayConditionSet {
            fields: today_fields(),
            app: AppTodayConditionSet::new(settings, clock),
        }
    }

    pub fn now(&self, context: Option<&Context>) -> NaiveDateTime {
        let active = if self.app.use_tz {
            context.and_then(Context::timezone)
        } else {
            None
        };
        match active {
            Some(offset) => wall_clock(self.app.clock.as_ref(), offset),
            None => self.app.now(context),
        }
    }
}

impl ConditionSet for ActiveTimezoneTodayConditionSet {
    fn id(&self) -> &str {
        ACTIVE_TIMEZONE_TODAY_CONDITION_SET
    }

    fn label(&self) -> &str {
        "Today (active timezone)"
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn field_value(&self, context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
        today_value(field_name, self.now(context))
    }
}
