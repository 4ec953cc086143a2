use crate::{AsValue, FieldDef, Kind, Record, Result, Value};
use log::LevelFilter;
use rust_decimal::Decimal;
use std::env;
use time::OffsetDateTime;
use uuid::Uuid;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger.is_test(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

fn kind_of<T: AsValue>(_: &T) -> Kind {
    T::kind()
}

macro_rules! field {
    ($record:ty, $field:ident, $column:literal $(, $flag:ident)* $(,)?) => {{
        #[allow(unused_mut)]
        let mut def = FieldDef::<$record> {
            name: stringify!($field),
            column: $column,
            kind: kind_of(&<$record as Default>::default().$field),
            nullable: false,
            primary_key: false,
            auto_generated: false,
            default_on_zero: false,
            get: |r: &$record| AsValue::as_value(r.$field.clone()),
            set: |r: &mut $record, v: Value| -> Result<()> {
                r.$field = AsValue::try_from_value(v)?;
                Ok(())
            },
        };
        $(def.$flag = true;)*
        def
    }};
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub balance: Decimal,
    pub level: u8,
    pub active: bool,
    pub last_login: Option<OffsetDateTime>,
    pub token: Uuid,
    pub notes: String,
}

impl Record for Account {
    fn table_name() -> &'static str {
        "account"
    }
    fn fields() -> Vec<FieldDef<Self>> {
        vec![
            field!(Account, id, "id", primary_key, auto_generated),
            field!(Account, name, "name"),
            field!(Account, email, "email", nullable),
            field!(Account, balance, "balance", default_on_zero),
            field!(Account, level, "level"),
            field!(Account, active, "active"),
            field!(Account, last_login, "last_login", nullable),
            field!(Account, token, "token", default_on_zero),
        ]
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub weight: f32,
}

impl Record for Tag {
    fn table_name() -> &'static str {
        "tag"
    }
    fn fields() -> Vec<FieldDef<Self>> {
        vec![
            field!(Tag, name, "name", primary_key),
            field!(Tag, weight, "weight"),
        ]
    }
}

#[derive(Default, Debug)]
pub struct TwoKeys {
    pub a: i32,
    pub b: i32,
}

impl Record for TwoKeys {
    fn table_name() -> &'static str {
        "two_keys"
    }
    fn fields() -> Vec<FieldDef<Self>> {
        vec![
            field!(TwoKeys, a, "a", primary_key),
            field!(TwoKeys, b, "b", primary_key),
        ]
    }
}

#[derive(Default, Debug)]
pub struct Duplicated {
    pub first: i32,
    pub second: i32,
}

impl Record for Duplicated {
    fn table_name() -> &'static str {
        "duplicated"
    }
    fn fields() -> Vec<FieldDef<Self>> {
        vec![
            field!(Duplicated, first, "value"),
            field!(Duplicated, second, "value"),
        ]
    }
}
