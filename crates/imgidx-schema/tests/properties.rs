//! Property tests for the evaluator over the manifest list schema.

use imgidx_core::MediaType;
use imgidx_schema::{validate_slice, ViolationKind};
use proptest::prelude::*;
use serde_json::{json, Value};

const LIST_MEDIA_TYPE: &str = "application/vnd.oci.image.manifest.list.v1+json";

fn base() -> Value {
    json!({
        "schemaVersion": 2,
        "mediaType": LIST_MEDIA_TYPE,
        "manifests": [{
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "size": 7143,
            "digest": "sha256:e692418e4cbaf90ca69d05a66403747baa33ee08806650b51fab815ad7fc331f",
            "platform": {"architecture": "ppc64le", "os": "linux"}
        }]
    })
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9_ ]{0,20}".prop_map(Value::String),
    ]
}

fn any_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// A manifest entry with exactly the required fields, all well-formed.
fn manifest_entry() -> impl Strategy<Value = Value> {
    (
        "[a-z][a-z0-9.+-]{0,20}/[a-z][a-z0-9.+-]{0,30}",
        any::<i64>(),
        "[a-z0-9]{1,8}:[a-f0-9]{8,64}",
        "[a-z0-9]{1,10}",
        "[a-z]{1,10}",
    )
        .prop_map(|(media_type, size, digest, architecture, os)| {
            json!({
                "mediaType": media_type,
                "size": size,
                "digest": digest,
                "platform": {"architecture": architecture, "os": os}
            })
        })
}

/// A manifest list with only required fields and `len` entries.
fn required_only_list(len: std::ops::Range<usize>) -> impl Strategy<Value = Value> {
    prop::collection::vec(manifest_entry(), len).prop_map(|manifests| {
        json!({
            "schemaVersion": 2,
            "mediaType": LIST_MEDIA_TYPE,
            "manifests": manifests
        })
    })
}

fn validate(value: &Value) -> Result<(), imgidx_schema::ValidationError> {
    let bytes = serde_json::to_vec(value).unwrap();
    validate_slice(MediaType::ManifestList, &bytes)
}

proptest! {
    /// Any top-level media type other than the list identifier is rejected
    /// at `mediaType`, and nowhere else.
    #[test]
    fn wrong_media_type_is_located(media_type in "[ -~]{0,40}") {
        prop_assume!(media_type != LIST_MEDIA_TYPE);
        let mut doc = base();
        doc["mediaType"] = Value::String(media_type);
        let err = validate(&doc).unwrap_err();
        let v = err.violations().unwrap();
        prop_assert_eq!(v.len(), 1);
        prop_assert!(v.contains("mediaType", ViolationKind::PatternMismatch));
    }

    /// Keys the schema does not mention never cause a failure.
    #[test]
    fn extra_keys_never_fail(key in "x-[a-z]{1,10}", value in any_value()) {
        let mut doc = base();
        doc[key.as_str()] = value.clone();
        doc["manifests"][0][key.as_str()] = value.clone();
        doc["manifests"][0]["platform"][key.as_str()] = value;
        prop_assert!(validate(&doc).is_ok());
    }

    /// Every integer other than 2 is out of range for `schemaVersion`.
    #[test]
    fn schema_version_out_of_range(version in any::<i64>()) {
        prop_assume!(version != 2);
        let mut doc = base();
        doc["schemaVersion"] = json!(version);
        let err = validate(&doc).unwrap_err();
        let v = err.violations().unwrap();
        prop_assert!(v.contains("schemaVersion", ViolationKind::RangeViolation));
    }

    /// Every well-formed required-only manifest list validates.
    #[test]
    fn required_only_lists_validate(doc in required_only_list(0..8)) {
        let result = validate(&doc);
        prop_assert!(result.is_ok(), "{:?}", result.err().map(|e| e.to_string()));
    }

    /// Quoting one manifest's size is reported at exactly that size.
    #[test]
    fn quoted_size_is_located(doc in required_only_list(1..8), index in any::<prop::sample::Index>()) {
        let mut doc = doc;
        let i = index.index(doc["manifests"].as_array().unwrap().len());
        let size = doc["manifests"][i]["size"].to_string();
        doc["manifests"][i]["size"] = Value::String(size);

        let err = validate(&doc).unwrap_err();
        let v = err.violations().unwrap();
        prop_assert_eq!(v.len(), 1);
        let path = format!("manifests.{i}.size");
        prop_assert!(v.contains(&path, ViolationKind::TypeMismatch), "{}", v);
    }

    /// Removing a required manifest field is reported on that manifest.
    #[test]
    fn missing_manifest_field_is_located(
        doc in required_only_list(1..8),
        index in any::<prop::sample::Index>(),
        field in prop::sample::select(vec!["digest", "platform"])
    ) {
        let mut doc = doc;
        let i = index.index(doc["manifests"].as_array().unwrap().len());
        doc["manifests"][i].as_object_mut().unwrap().remove(field);

        let err = validate(&doc).unwrap_err();
        let v = err.violations().unwrap();
        prop_assert_eq!(v.len(), 1);
        let violation = &v.violations()[0];
        prop_assert_eq!(violation.path.to_string(), format!("manifests.{i}"));
        prop_assert_eq!(violation.kind, ViolationKind::MissingRequiredProperty);
        prop_assert!(violation.message.contains(field));
    }

    /// Arbitrary values never panic the evaluator.
    #[test]
    fn arbitrary_documents_never_panic(value in any_value()) {
        let _ = validate(&value);
    }
}
