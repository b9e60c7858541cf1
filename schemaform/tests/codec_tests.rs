//! Integration tests for form codecs derived through the Describe derive macro.

use proptest::prelude::*;
use schemaform::{
    DecodeError, DeriveConfig, DeriveError, Describe, NamingStrategy, ObjectInfo, Registry,
    ScalarCodec, SchemaNode, Validator, Value,
};

// =============================================================================
// Types under test
// =============================================================================

#[derive(Debug, Clone, PartialEq, Describe)]
struct Order {
    id: u32,
    customer: String,
    note: Option<String>,
    tags: Vec<String>,
    quantities: Vec<i64>,
    price: f64,
    express: bool,
    discount: Option<i16>,
}

#[derive(Debug, PartialEq, Describe)]
struct G {
    #[form(min = 5)]
    f1: i32,
}

#[derive(Debug, PartialEq, Describe)]
struct Rgb {
    channels: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Describe)]
struct Email(String);

#[derive(Debug, PartialEq, Describe)]
struct Contact {
    email: Email,
    backup: Option<Email>,
}

#[derive(Debug, PartialEq, Describe)]
struct Address {
    street_name: String,
    zip_code: Option<String>,
}

#[derive(Debug, PartialEq, Describe)]
struct Shipment {
    address: Address,
}

#[derive(Debug, PartialEq, Describe)]
struct Filter {
    #[form(rename = "q", min_length = 2, max_length = 10)]
    query: String,
    #[form(skip)]
    cursor: Option<String>,
    #[form(max = 3)]
    pages: Vec<u8>,
}

#[derive(Debug, PartialEq, Describe)]
struct Wrap<T> {
    v: T,
}

#[derive(Debug, PartialEq, Describe)]
enum Choice {
    Yes,
    No,
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn test_encode_pairs_in_declaration_order() {
    let codec = Registry::default().codec_for::<Order>().unwrap();
    let order = Order {
        id: 7,
        customer: "Ada Lovelace".to_string(),
        note: None,
        tags: vec!["gift".to_string(), "a&b".to_string()],
        quantities: vec![],
        price: 12.5,
        express: true,
        discount: Some(-3),
    };

    assert_eq!(
        codec.encode(&order),
        "id=7&customer=Ada+Lovelace&tags=gift&tags=a%26b&price=12.5&express=true&discount=-3"
    );
    assert_eq!(codec.decode(&codec.encode(&order)).unwrap(), order);
}

#[test]
fn test_encode_all_absent_is_empty() {
    let registry = Registry::default();
    let filter = registry.codec_for::<Filter>().unwrap();
    assert_eq!(filter.form_codec().encode(&Value::Record(Default::default())), "");
}

#[test]
fn test_keys_match_schema_names() {
    let registry =
        Registry::new(DeriveConfig::new().with_naming(NamingStrategy::KebabCase)).unwrap();
    let codec = registry.codec_for::<Address>().unwrap();
    let keys: Vec<&str> = codec.form_codec().keys().collect();
    assert_eq!(keys, vec!["street-name", "zip-code"]);

    let schema = codec.schema().node.as_product().unwrap();
    let names: Vec<&str> = schema
        .fields
        .iter()
        .map(|f| f.name.encoded_name.as_str())
        .collect();
    assert_eq!(keys, names);

    let address = Address {
        street_name: "Main St".to_string(),
        zip_code: Some("12345".to_string()),
    };
    assert_eq!(codec.encode(&address), "street-name=Main+St&zip-code=12345");
}

// =============================================================================
// Decoding failures
// =============================================================================

#[test]
fn test_missing_required_field() {
    let codec = Registry::default().codec_for::<Order>().unwrap();
    let err = codec.decode("customer=x&price=1&express=false").unwrap_err();
    assert_eq!(
        err,
        DecodeError::Missing {
            field: "id".to_string()
        }
    );
}

#[test]
fn test_missing_field_uses_wire_name() {
    let registry =
        Registry::new(DeriveConfig::new().with_naming(NamingStrategy::KebabCase)).unwrap();
    let codec = registry.codec_for::<Address>().unwrap();
    assert_eq!(codec.decode("").unwrap_err().field(), Some("street-name"));
    assert_eq!(
        codec.decode("street-name=Elm").unwrap(),
        Address {
            street_name: "Elm".to_string(),
            zip_code: None,
        }
    );
}

#[test]
fn test_validator_bound_by_attribute() {
    let codec = Registry::default().codec_for::<G>().unwrap();

    assert_eq!(
        codec.decode("f1=0").unwrap_err(),
        DecodeError::InvalidValue {
            field: "f1".to_string(),
            value: "0".to_string(),
            constraint: "minimum 5".to_string(),
        }
    );
    assert_eq!(codec.decode("f1=10").unwrap(), G { f1: 10 });
    assert_eq!(codec.decode("f1=5").unwrap(), G { f1: 5 });
}

#[test]
fn test_repeated_non_list_key() {
    let codec = Registry::default().codec_for::<G>().unwrap();
    assert_eq!(
        codec.decode("f1=6&f1=7").unwrap_err(),
        DecodeError::Multiple {
            field: "f1".to_string(),
            values: vec!["6".to_string(), "7".to_string()],
        }
    );
}

#[test]
fn test_error_values_are_percent_decoded() {
    let address = Registry::default().codec_for::<Address>().unwrap();
    assert_eq!(
        address
            .decode("street_name=Main%20St&street_name=Elm+Rd")
            .unwrap_err(),
        DecodeError::Multiple {
            field: "street_name".to_string(),
            values: vec!["Main St".to_string(), "Elm Rd".to_string()],
        }
    );

    let g = Registry::default().codec_for::<G>().unwrap();
    let err = g.decode("f1=4%2B2").unwrap_err();
    let DecodeError::Malformed { raw, .. } = &err else {
        panic!("expected malformed, got {:?}", err);
    };
    assert_eq!(raw, "4+2");
}

#[test]
fn test_malformed_value() {
    let codec = Registry::default().codec_for::<G>().unwrap();
    let err = codec.decode("f1=abc").unwrap_err();
    let DecodeError::Malformed { field, raw, .. } = &err else {
        panic!("expected malformed, got {:?}", err);
    };
    assert_eq!(field, "f1");
    assert_eq!(raw, "abc");

    let order = Registry::default().codec_for::<Order>().unwrap();
    let err = order
        .decode("id=1&customer=x&price=1&express=yes")
        .unwrap_err();
    assert_eq!(err.kind(), "malformed");
    assert_eq!(err.field(), Some("express"));
}

#[test]
fn test_integer_out_of_range_is_malformed() {
    let codec = Registry::default().codec_for::<Rgb>().unwrap();
    let err = codec.decode("channels=1&channels=256&channels=3").unwrap_err();
    assert_eq!(err.kind(), "malformed");
}

#[test]
fn test_array_length_mismatch() {
    let codec = Registry::default().codec_for::<Rgb>().unwrap();
    assert_eq!(
        codec.decode("channels=1&channels=2&channels=3").unwrap(),
        Rgb { channels: [1, 2, 3] }
    );

    let err = codec.decode("channels=1").unwrap_err();
    let DecodeError::Mismatch { type_name, .. } = &err else {
        panic!("expected mismatch, got {:?}", err);
    };
    assert!(type_name.ends_with("::Rgb"));
    assert_eq!(err.field(), None);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let codec = Registry::default().codec_for::<G>().unwrap();
    assert_eq!(codec.decode("f1=9&utm_source=mail").unwrap(), G { f1: 9 });
}

#[test]
fn test_rename_skip_and_length_bounds() {
    let codec = Registry::default().codec_for::<Filter>().unwrap();
    assert_eq!(codec.form_codec().keys().collect::<Vec<_>>(), vec!["q", "pages"]);

    assert_eq!(
        codec.decode("q=rust&pages=1&pages=3").unwrap(),
        Filter {
            query: "rust".to_string(),
            cursor: None,
            pages: vec![1, 3],
        }
    );

    let short = codec.decode("q=r").unwrap_err();
    assert_eq!(short.kind(), "invalid_value");
    assert_eq!(short.field(), Some("q"));

    let long = codec.decode("q=abcdefghijk").unwrap_err();
    assert!(matches!(
        long,
        DecodeError::InvalidValue { ref constraint, .. } if constraint == "maximum length 10"
    ));

    let page = codec.decode("q=rust&pages=1&pages=4").unwrap_err();
    assert!(matches!(
        page,
        DecodeError::InvalidValue { ref value, .. } if value == "4"
    ));
}

// =============================================================================
// Value classes
// =============================================================================

#[test]
fn test_value_class_field_is_scalar() {
    let codec = Registry::default().codec_for::<Contact>().unwrap();
    let contact = Contact {
        email: Email("ada@example.com".to_string()),
        backup: None,
    };
    assert_eq!(codec.encode(&contact), "email=ada%40example.com");
    assert_eq!(codec.decode("email=ada%40example.com").unwrap(), contact);
}

#[test]
fn test_validator_bound_to_value_class() {
    let registry = Registry::default().with_validator(
        Email::descriptor().identity(),
        Validator::pattern(r"^[^@]+@[^@]+$").unwrap(),
    );
    let codec = registry.codec_for::<Contact>().unwrap();

    assert!(codec.decode("email=a%40b").is_ok());
    let err = codec.decode("email=a%40b&backup=nobody").unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidValue {
            field: "backup".to_string(),
            value: "nobody".to_string(),
            constraint: "matches /^[^@]+@[^@]+$/".to_string(),
        }
    );
}

// =============================================================================
// Derivation failures
// =============================================================================

#[test]
fn test_nested_product_has_no_field_codec() {
    let err = Registry::default().codec_for::<Shipment>().unwrap_err();
    let DeriveError::NoFieldCodec { field, .. } = &err else {
        panic!("expected no field codec, got {:?}", err);
    };
    assert_eq!(field, "address");
}

#[test]
fn test_generic_codecs_are_cached_per_instantiation() {
    let registry = Registry::default();

    let ints = registry.codec_for::<Wrap<Vec<i32>>>().unwrap();
    assert_eq!(ints.decode("v=1&v=2").unwrap(), Wrap { v: vec![1, 2] });

    let texts = registry.codec_for::<Wrap<Vec<String>>>().unwrap();
    assert_eq!(
        texts.decode("v=abc").unwrap(),
        Wrap {
            v: vec!["abc".to_string()]
        }
    );
    assert_eq!(ints.decode("v=abc").unwrap_err().kind(), "malformed");
    assert!(!std::sync::Arc::ptr_eq(ints.form_codec(), texts.form_codec()));
}

#[test]
fn test_coproduct_has_no_form_codec() {
    let err = Registry::default().codec_for::<Choice>().unwrap_err();
    assert!(matches!(err, DeriveError::NoDerivation { .. }));
}

// =============================================================================
// Overrides
// =============================================================================

#[derive(Debug)]
struct Cents(i64);

impl Describe for Cents {
    fn descriptor() -> schemaform::TypeDescriptor {
        schemaform::TypeDescriptor::opaque(ObjectInfo::new("money::Cents"))
    }

    fn to_value(&self) -> Value {
        Value::Integer(self.0.into())
    }

    fn from_value(value: Value) -> Result<Self, schemaform::ValueError> {
        match value {
            Value::Integer(n) => i64::try_from(n)
                .map(Cents)
                .map_err(|_| schemaform::ValueError::out_of_range("money::Cents", n)),
            other => Err(schemaform::ValueError::unexpected(
                "money::Cents",
                "integer",
                &other,
            )),
        }
    }
}

/// Renders cents as `12.34`.
struct CentsCodec;

impl ScalarCodec for CentsCodec {
    fn encode(&self, value: &Value) -> String {
        match value {
            Value::Integer(n) => format!("{}.{:02}", n / 100, n % 100),
            other => other.to_string(),
        }
    }

    fn decode(&self, raw: &str) -> Result<Value, String> {
        let (units, cents) = raw
            .split_once('.')
            .ok_or_else(|| format!("expected `units.cents`, found `{}`", raw))?;
        let units: i128 = units.parse().map_err(|_| format!("bad units `{}`", units))?;
        let cents: i128 = cents.parse().map_err(|_| format!("bad cents `{}`", cents))?;
        Ok(Value::Integer(units * 100 + cents))
    }
}

#[derive(Debug, Describe)]
struct Invoice {
    total: Cents,
}

#[test]
fn test_codec_override() {
    let err = Registry::default().codec_for::<Invoice>().unwrap_err();
    assert!(matches!(err, DeriveError::NoDerivation { .. }));

    let registry = Registry::default()
        .with_schema_override(ObjectInfo::new("money::Cents"), SchemaNode::String)
        .with_codec_override(ObjectInfo::new("money::Cents"), CentsCodec);
    let codec = registry.codec_for::<Invoice>().unwrap();

    assert_eq!(codec.encode(&Invoice { total: Cents(1234) }), "total=12.34");
    assert_eq!(codec.decode("total=5.07").unwrap().total.0, 507);
    assert_eq!(codec.decode("total=5").unwrap_err().kind(), "malformed");
}

// =============================================================================
// Round trips
// =============================================================================

fn arb_order() -> impl Strategy<Value = Order> {
    (
        any::<u32>(),
        any::<String>(),
        proptest::option::of(any::<String>()),
        proptest::collection::vec(any::<String>(), 0..4),
        proptest::collection::vec(any::<i64>(), 0..4),
        -1.0e12..1.0e12f64,
        any::<bool>(),
        proptest::option::of(any::<i16>()),
    )
        .prop_map(
            |(id, customer, note, tags, quantities, price, express, discount)| Order {
                id,
                customer,
                note,
                tags,
                quantities,
                price,
                express,
                discount,
            },
        )
}

proptest! {
    #[test]
    fn prop_order_round_trips(order in arb_order()) {
        let codec = Registry::default().codec_for::<Order>().unwrap();
        let wire = codec.encode(&order);
        prop_assert_eq!(codec.decode(&wire).unwrap(), order);
    }

    #[test]
    fn prop_naming_does_not_change_round_trip(street in "[a-zA-Z ]{0,20}", zip in proptest::option::of("[0-9]{5}")) {
        let registry =
            Registry::new(DeriveConfig::new().with_naming(NamingStrategy::KebabCase)).unwrap();
        let codec = registry.codec_for::<Address>().unwrap();
        let address = Address { street_name: street, zip_code: zip };
        prop_assert_eq!(codec.decode(&codec.encode(&address)).unwrap(), address);
    }
}
