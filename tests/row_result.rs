mod common;

#[cfg(test)]
mod tests {
    use crate::common::init_logs;
    use sluice::{Record, RecordMapper, RowError, RowResult, SchemaCache, Value, values};
    use std::sync::Arc;
    use time::{OffsetDateTime, macros::datetime};

    #[derive(Record, Default, Debug, PartialEq)]
    #[sluice(name = "orders")]
    struct Order {
        #[sluice(column, primary_key, auto_increment)]
        id: i64,
        #[sluice(column)]
        customer: String,
        #[sluice(column)]
        total: f64,
        #[sluice(column)]
        shipped: Option<OffsetDateTime>,
        #[sluice(column)]
        priority: u8,
    }

    fn orders() -> RowResult {
        RowResult::new(
            ["id", "customer", "total", "shipped", "priority", "warehouse"],
            [
                values![
                    1,
                    "acme",
                    "19.90",
                    datetime!(2024-02-01 08:00 UTC),
                    Value::Null,
                    "north",
                ],
                values![2, "globex", 5.5, Value::Null, "3", "south"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rows_into_records() {
        init_logs();
        let mapper = RecordMapper::new(Arc::new(SchemaCache::new()));
        let records: Vec<Order> = orders().into_records(&mapper).unwrap();
        assert_eq!(
            records,
            [
                Order {
                    id: 1,
                    customer: "acme".into(),
                    total: 19.9,
                    shipped: Some(datetime!(2024-02-01 08:00 UTC)),
                    priority: 0,
                },
                Order {
                    id: 2,
                    customer: "globex".into(),
                    total: 5.5,
                    shipped: None,
                    priority: 3,
                },
            ]
        );
        let schema = mapper.schema::<Order>().unwrap();
        assert_eq!(schema.plan_count(), 1);

        let first: Order = orders().into_record(&mapper).unwrap();
        assert_eq!(first.customer, "acme");
        assert_eq!(schema.plan_count(), 1);
    }

    #[test]
    fn reordered_columns_get_their_own_plan() {
        let mapper = RecordMapper::new(Arc::new(SchemaCache::new()));
        let result = RowResult::new(["customer", "id"], [values!["initech", 7]]).unwrap();
        let order: Order = result.into_record(&mapper).unwrap();
        assert_eq!(order.id, 7);
        assert_eq!(order.customer, "initech");
        assert_eq!(order.total, 0.0);
        let _: Vec<Order> = orders().into_records(&mapper).unwrap();
        assert_eq!(mapper.schema::<Order>().unwrap().plan_count(), 2);
    }

    #[test]
    fn scalars_of_first_row() {
        let result = orders();
        assert_eq!(result.size().unwrap(), 2);
        assert_eq!(result.int("id").unwrap(), 1);
        assert_eq!(result.string("customer").unwrap(), "acme");
        assert_eq!(result.float("total").unwrap(), 19.9);
        assert_eq!(
            result.timestamp("shipped").unwrap(),
            datetime!(2024-02-01 08:00 UTC)
        );
        assert!(matches!(
            result.uint("priority").unwrap_err().downcast_ref::<RowError>(),
            Some(RowError::NullValue(column)) if column == "priority"
        ));
        assert_eq!(result.uint_opt("priority").unwrap(), None);
        assert_eq!(result.uint_or("priority", 9), 9);
        assert_eq!(result.string_or("missing", "none".into()), "none");
        let error = result.string("missing").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RowError>(),
            Some(RowError::MissingColumn(column)) if column == "missing"
        ));
        let ids: Vec<u32> = orders().into_vec().unwrap();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn failed_statement() {
        let result = RowResult::from_error(anyhow::anyhow!("connection reset"));
        let mapper = RecordMapper::default();
        for error in [
            result.size().unwrap_err(),
            result.int("id").unwrap_err(),
            result.clone().into_records::<Order>(&mapper).unwrap_err(),
        ] {
            assert_eq!(error.to_string(), "The statement failed: connection reset");
        }
        assert_eq!(result.int_or("id", -1), -1);
    }

    #[test]
    fn malformed_rows() {
        let error = RowResult::new(["a", "b"], [values![1, 2], values![3]]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RowError>(),
            Some(RowError::ColumnCount {
                expected: 2,
                found: 1
            })
        ));
        let empty = RowResult::new(["a"], Vec::<Vec<Value>>::new()).unwrap();
        assert!(empty.is_empty().unwrap());
        assert!(matches!(
            empty.int("a").unwrap_err().downcast_ref::<RowError>(),
            Some(RowError::NoRows)
        ));
    }
}
