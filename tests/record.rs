mod common;

#[cfg(test)]
mod tests {
    use crate::common::init_logs;
    use rust_decimal::Decimal;
    use sluice::{Kind, Record, RecordMapper, SchemaCache, Value};
    use std::sync::Arc;
    use time::{OffsetDateTime, macros::datetime};
    use uuid::Uuid;

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    struct UserAccount {
        #[sluice(column, primary_key, auto_increment)]
        id: u64,
        #[sluice(column = "user_name")]
        name: String,
        #[sluice(column)]
        email: Option<String>,
        #[sluice(column, default_on_zero)]
        credit: Decimal,
        #[sluice(column)]
        _score: f32,
        #[sluice(column)]
        joined: Option<OffsetDateTime>,
        #[sluice(column, default_on_zero)]
        token: Uuid,
        cache: Vec<String>,
    }

    #[derive(Record, Default, Debug)]
    #[sluice(name = "audit_log")]
    struct AuditEntry {
        #[sluice]
        message: String,
        #[sluice(column)]
        level: std::option::Option<u8>,
    }

    fn mapper() -> RecordMapper {
        RecordMapper::new(Arc::new(SchemaCache::new()))
    }

    #[test]
    fn derived_metadata() {
        init_logs();
        assert_eq!(UserAccount::table_name(), "useraccount");
        let fields = UserAccount::fields();
        let columns: Vec<_> = fields.iter().map(|f| f.column).collect();
        assert_eq!(
            columns,
            ["id", "user_name", "email", "credit", "score", "joined", "token"]
        );
        assert_eq!(fields[0].name, "id");
        assert!(fields[0].primary_key);
        assert!(fields[0].auto_generated);
        assert_eq!(fields[0].kind, Kind::UInt64);
        assert_eq!(fields[1].name, "name");
        assert!(!fields[1].nullable);
        assert!(fields[2].nullable);
        assert_eq!(fields[2].kind, Kind::Varchar);
        assert!(fields[3].default_on_zero);
        assert_eq!(fields[3].kind, Kind::Decimal);
        assert_eq!(fields[4].name, "_score");
        assert_eq!(fields[5].kind, Kind::Timestamp);
        assert!(fields[5].nullable);

        assert_eq!(AuditEntry::table_name(), "audit_log");
        let fields = AuditEntry::fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].column, "message");
        assert!(fields[1].nullable);
        assert_eq!(fields[1].kind, Kind::UInt8);
    }

    #[test]
    fn accessors() {
        let mut account = UserAccount {
            name: "ann".into(),
            ..Default::default()
        };
        let fields = UserAccount::fields();
        assert_eq!(fields[1].value(&account), Value::Varchar(Some("ann".into())));
        fields[2]
            .assign(&mut account, Value::Varchar(Some("ann@example.com".into())))
            .unwrap();
        assert_eq!(account.email.as_deref(), Some("ann@example.com"));
        fields[2].assign(&mut account, Value::Null).unwrap();
        assert_eq!(account.email, None);
        assert!(fields[0].assign(&mut account, Value::Int32(Some(-4))).is_err());
    }

    #[test]
    fn schema_is_cached() {
        let mapper = mapper();
        let first = mapper.schema::<UserAccount>().unwrap();
        let second = mapper.schema::<UserAccount>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.primary_key().unwrap().column, "id");
        let audit = mapper.schema::<AuditEntry>().unwrap();
        assert!(audit.primary_key().is_none());
        assert_eq!(mapper.cache().len(), 2);
    }

    #[test]
    fn writes_and_keys() {
        let mapper = mapper();
        let account = UserAccount {
            id: 0,
            name: "bob".into(),
            _score: 0.5,
            ..Default::default()
        };
        let map = mapper.to_column_map(Some(&account)).unwrap().unwrap();
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            ["user_name", "email", "score", "joined"]
        );
        assert_eq!(mapper.primary_key_value(&account).unwrap(), None);
        let account = UserAccount { id: 9, ..account };
        assert_eq!(
            mapper.primary_key_value(&account).unwrap(),
            Some(Value::UInt64(Some(9)))
        );
        let audit = AuditEntry::default();
        assert_eq!(mapper.primary_key_value(&audit).unwrap(), None);
    }

    #[derive(Record, Default, Debug)]
    struct Profile {
        #[sluice(column, primary_key)]
        id: Option<i64>,
        #[sluice(column, default_on_zero)]
        nickname: Option<String>,
        #[sluice(column, default_on_zero)]
        rank: f64,
    }

    #[test]
    fn optional_fields_are_zero_only_when_none() {
        let mapper = mapper();
        let profile = Profile {
            id: Some(0),
            nickname: Some(String::new()),
            rank: -0.0,
        };
        let map = mapper.to_column_map(Some(&profile)).unwrap().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["id", "nickname", "rank"]);
        assert_eq!(map["nickname"], Value::Varchar(Some(String::new())));
        assert_eq!(
            mapper.primary_key_value(&profile).unwrap(),
            Some(Value::Int64(Some(0)))
        );

        let profile = Profile::default();
        let map = mapper.to_column_map(Some(&profile)).unwrap().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["id"]);
        assert_eq!(mapper.primary_key_value(&profile).unwrap(), None);
    }

    #[test]
    fn round_trip() {
        init_logs();
        let mapper = mapper();
        let original = UserAccount {
            id: 77,
            name: "carla".into(),
            email: Some("carla@example.com".into()),
            credit: Decimal::new(-250, 1),
            _score: 4.25,
            joined: Some(datetime!(2023-11-12 13:14:15.5 +01:00)),
            token: Uuid::from_u128(42),
            cache: vec!["transient".into()],
        };
        let mut map = mapper.to_column_map(Some(&original)).unwrap().unwrap();
        map.insert("id".into(), Value::UInt64(Some(original.id)));
        let restored: UserAccount = mapper.from_column_map(map).unwrap();
        assert_eq!(
            restored,
            UserAccount {
                cache: Vec::new(),
                ..original
            }
        );
    }
}
