#[cfg(test)]
mod tests {
    use keel_core::{AsValue, Value};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::{Date, Month, PrimitiveDateTime, Time};
    use uuid::Uuid;

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Null, Value::Int64(None));
        assert_eq!(Value::Varchar(None), Value::Boolean(None));
        assert_ne!(Value::Float64(Some(1.0)), Value::Null);
        assert!(Value::List(None, Box::new(Value::Int64(None))).is_null());
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(Some(false)));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert!(bool::try_from_value(val).unwrap());
        assert!(bool::try_from_value(Value::Int64(Some(3))).unwrap());
        assert!(!bool::try_from_value(Value::Int64(Some(0))).unwrap());
        assert!(bool::try_from_value(Value::Varchar(Some("TRUE".into()))).unwrap());
        assert!(!<bool as AsValue>::parse("0").unwrap());
        assert!(<bool as AsValue>::parse("yes").is_err());
        assert!(bool::try_from_value(Value::Float64(Some(0.5))).is_err());
    }

    #[test]
    fn value_integers() {
        assert_eq!(Value::from(-5i8), Value::Int64(Some(-5)));
        assert_eq!(Value::from(40_000u32), Value::Int64(Some(40_000)));
        assert_eq!(i8::try_from_value(Value::Int64(Some(127))).unwrap(), 127);
        assert!(i8::try_from_value(Value::Int64(Some(128))).unwrap_err().is_type());
        assert!(u8::try_from_value(Value::Int64(Some(-1))).unwrap_err().is_type());
        assert_eq!(i32::try_from_value(Value::Varchar(Some(" 42 ".into()))).unwrap(), 42);
        assert_eq!(i64::try_from_value(Value::Float64(Some(12.0))).unwrap(), 12);
        assert!(i64::try_from_value(Value::Float64(Some(12.5))).is_err());
        assert!(
            i64::try_from_value(Value::Decimal(Some(Decimal::from_str("1.5").unwrap())))
                .unwrap_err()
                .is_type()
        );
        assert!(i64::try_from_value(Value::Blob(Some(Box::new([1, 2])))).is_err());
    }

    #[test]
    fn value_u64_above_i64() {
        let val = u64::MAX.as_value();
        assert!(matches!(val, Value::Decimal(Some(..))));
        assert_eq!(u64::try_from_value(val).unwrap(), u64::MAX);
        assert_eq!(7u64.as_value(), Value::Int64(Some(7)));
        assert!(u64::try_from_value(Value::Int64(Some(-7))).is_err());
        assert_eq!(usize::try_from_value(Value::Int64(Some(9))).unwrap(), 9);
    }

    #[test]
    fn value_parse_consumes_everything() {
        assert_eq!(<i64 as AsValue>::parse("-120").unwrap(), -120);
        let error = <i64 as AsValue>::parse("123abc").unwrap_err();
        assert!(error.is_type());
        assert!(error.to_string().contains("abc"), "{error}");
        assert!(<i32 as AsValue>::parse("99999999999").is_err());
        assert_eq!(<f64 as AsValue>::parse("2.5").unwrap(), 2.5);
        assert!(<f64 as AsValue>::parse("2.5x").is_err());
        assert_eq!(
            <Decimal as AsValue>::parse("-10.25").unwrap(),
            Decimal::from_str("-10.25").unwrap()
        );
    }

    #[test]
    fn value_floats() {
        assert_eq!(Value::from(1.5f32), Value::Float64(Some(1.5)));
        assert_eq!(f64::try_from_value(Value::Int64(Some(3))).unwrap(), 3.0);
        assert_eq!(
            f64::try_from_value(Value::Decimal(Some(Decimal::new(125, 2)))).unwrap(),
            1.25
        );
        assert_eq!(
            Decimal::try_from_value(Value::Int64(Some(4))).unwrap(),
            Decimal::from(4)
        );
    }

    #[test]
    fn value_text() {
        let val: Value = "hello".into();
        assert_eq!(val, Value::Varchar(Some("hello".into())));
        assert_eq!(val.as_str(), Some("hello"));
        assert_eq!(val.to_string(), "'hello'");
        assert_eq!(String::try_from_value(val).unwrap(), "hello");
        assert!(String::try_from_value(Value::Int64(Some(1))).is_err());
    }

    #[test]
    fn value_temporal() {
        let date = Date::from_calendar_date(2024, Month::March, 9).unwrap();
        let time = Time::from_hms_milli(7, 5, 30, 250).unwrap();
        let timestamp = PrimitiveDateTime::new(date, time);
        assert_eq!(<Date as AsValue>::parse("2024-03-09").unwrap(), date);
        assert_eq!(<Time as AsValue>::parse("07:05:30.25").unwrap(), time);
        assert_eq!(
            <Time as AsValue>::parse("07:05:30").unwrap(),
            Time::from_hms(7, 5, 30).unwrap()
        );
        assert_eq!(
            <PrimitiveDateTime as AsValue>::parse("2024-03-09 07:05:30.250").unwrap(),
            timestamp
        );
        assert_eq!(
            <PrimitiveDateTime as AsValue>::parse("2024-03-09T07:05:30.25").unwrap(),
            timestamp
        );
        assert_eq!(
            Value::Timestamp(Some(timestamp)).to_string(),
            "'2024-03-09 07:05:30.25'"
        );
        assert_eq!(
            Date::try_from_value(Value::Timestamp(Some(timestamp))).unwrap(),
            date
        );
        assert!(<Date as AsValue>::parse("2024-13-01").unwrap_err().is_type());
    }

    #[test]
    fn value_uuid_and_json() {
        let id = Uuid::from_str("6f2a0ef4-4b44-4a3d-8f4e-9c1d2b3a4f50").unwrap();
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(id.to_string()))).unwrap(),
            id
        );
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(id.as_bytes().to_vec().into()))).unwrap(),
            id
        );
        let json = serde_json::Value::try_from_value(Value::Varchar(Some(
            r#"{"a":[1,2]}"#.into(),
        )))
        .unwrap();
        assert_eq!(json, serde_json::json!({"a": [1, 2]}));
        assert!(<serde_json::Value as AsValue>::parse("{oops").is_err());
    }

    #[test]
    fn value_option_and_list() {
        let val = Option::<i32>::None.as_value();
        assert_eq!(val, Value::Int64(None));
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int64(Some(4))).unwrap(),
            Some(4)
        );
        let list = vec![1, 2, 3].as_value();
        assert_eq!(list.as_list().map(<[Value]>::len), Some(3));
        assert_eq!(list.to_string(), "[1, 2, 3]");
        assert_eq!(Vec::<u8>::try_from_value(list).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn value_hash_follows_equality() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Value::Null);
        set.insert(Value::Int64(None));
        set.insert(Value::Int64(Some(10)));
        set.insert(Value::Int64(Some(10)));
        set.insert(Value::Varchar(Some("10".into())));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn value_float_equality_is_bitwise() {
        use std::collections::HashSet;
        let nan = Value::Float64(Some(f64::NAN));
        assert_eq!(nan, nan.clone());
        assert_ne!(Value::Float64(Some(0.0)), Value::Float64(Some(-0.0)));
        assert_eq!(Value::Float64(Some(1.5)), Value::from(1.5));

        let mut set = HashSet::new();
        set.insert(nan.clone());
        set.insert(nan);
        set.insert(Value::Float64(Some(0.0)));
        set.insert(Value::Float64(Some(-0.0)));
        set.insert(Value::Float64(Some(0.0)));
        assert_eq!(set.len(), 3);
    }
}
