//! End-to-end tests over the seal / store / open / rotate lifecycle.

use std::sync::Arc;

use journal_crypto::{
    decode, encode, CryptoConfig, EncryptionContext, EnvelopeError, EnvelopeService,
    LocalKeyProvider, RotationCoordinator, ALGORITHM_AES_256_GCM,
};

fn ctx(pairs: &[(&str, &str)]) -> EncryptionContext {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn setup() -> (Arc<LocalKeyProvider>, EnvelopeService, RotationCoordinator) {
    let provider = Arc::new(LocalKeyProvider::new().unwrap());
    let service = EnvelopeService::new(provider.clone());
    let coordinator = RotationCoordinator::new(provider.clone());
    (provider, service, coordinator)
}

#[test]
fn diary_entry_scenario() {
    let (_, service, _) = setup();
    let context = ctx(&[("entryId", "42")]);

    let envelope = service.seal(b"diary entry body", &context, None).unwrap();
    assert_eq!(envelope.version, 1);
    assert_eq!(envelope.algorithm, "AES-256-GCM");
    assert_eq!(envelope.nonce.len(), 12);

    let plaintext = service.open(&envelope, Some(&context)).unwrap();
    assert_eq!(plaintext, b"diary entry body");

    let wrong = ctx(&[("entryId", "43")]);
    assert!(service.open(&envelope, Some(&wrong)).is_err());
}

#[test]
fn round_trip_through_storage_form() {
    let (_, service, _) = setup();
    let context = ctx(&[("entryId", "42"), ("type", "ai_comment")]);

    let envelope = service
        .seal("водоспад у горах".as_bytes(), &context, Some(b"user-77"))
        .unwrap();
    let stored = encode(&envelope).unwrap();

    // Persistence treats `stored` as an opaque value; parse it back fresh.
    let loaded = decode(&stored).unwrap();
    assert_eq!(loaded, envelope);
    let plaintext = service.open(&loaded, Some(&context)).unwrap();
    assert_eq!(plaintext, "водоспад у горах".as_bytes());
}

#[test]
fn every_ciphertext_bit_flip_is_detected() {
    let (_, service, _) = setup();
    let context = ctx(&[("entryId", "42")]);
    let envelope = service.seal(b"short body", &context, None).unwrap();

    for byte in 0..envelope.ciphertext.len() {
        for bit in 0..8 {
            let mut tampered = envelope.clone();
            tampered.ciphertext[byte] ^= 1 << bit;
            assert!(
                matches!(
                    service.open(&tampered, Some(&context)),
                    Err(EnvelopeError::Integrity)
                ),
                "flip of ciphertext byte {byte} bit {bit} was not detected"
            );
        }
    }
}

#[test]
fn every_tag_bit_flip_is_detected() {
    let (_, service, _) = setup();
    let context = ctx(&[("entryId", "42")]);
    let envelope = service.seal(b"short body", &context, None).unwrap();

    for byte in 0..envelope.auth_tag.len() {
        for bit in 0..8 {
            let mut tampered = envelope.clone();
            tampered.auth_tag[byte] ^= 1 << bit;
            assert!(service.open(&tampered, Some(&context)).is_err());
        }
    }
}

#[test]
fn context_substitution_in_stored_envelope_is_detected() {
    let (_, service, _) = setup();
    let envelope = service
        .seal(b"body", &ctx(&[("entryId", "42")]), None)
        .unwrap();

    // An attacker who rewrites the stored context cannot make the envelope
    // open under it: the original binding is in the AAD.
    let mut tampered = envelope;
    tampered
        .context
        .as_mut()
        .unwrap()
        .insert("entryId".to_string(), "43".to_string());
    assert!(matches!(
        service.open(&tampered, None),
        Err(EnvelopeError::Integrity)
    ));
}

#[test]
fn nonces_and_data_keys_are_fresh_per_seal() {
    let (_, service, _) = setup();
    let context = ctx(&[("entryId", "42")]);
    let a = service.seal(b"identical plaintext", &context, None).unwrap();
    let b = service.seal(b"identical plaintext", &context, None).unwrap();
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);
    assert_ne!(a.wrapped_data_key, b.wrapped_data_key);
}

#[test]
fn version_gating_happens_before_any_crypto() {
    let (_, service, _) = setup();
    let envelope = service
        .seal(b"body", &ctx(&[("entryId", "1")]), None)
        .unwrap();

    let mut value: serde_json::Value =
        serde_json::from_str(&encode(&envelope).unwrap()).unwrap();
    value["version"] = serde_json::json!(7);
    let err = decode(&value.to_string()).unwrap_err();
    assert!(matches!(err, EnvelopeError::UnsupportedVersion(7)));
}

#[test]
fn rotation_preserves_open_result_across_generations() {
    let (provider, service, coordinator) = setup();
    let context = ctx(&[("entryId", "42")]);
    let mut envelope = service.seal(b"diary entry body", &context, None).unwrap();

    for generation in 2..=5u32 {
        provider.rotate_master().unwrap();
        envelope = coordinator.rotate(&envelope).unwrap();
        assert_eq!(provider.active_key_id(), generation);
        assert_eq!(
            service.open(&envelope, Some(&context)).unwrap(),
            b"diary entry body"
        );
    }
}

#[test]
fn batch_rotation_reports_per_record_outcomes() {
    let (provider, service, coordinator) = setup();

    let doomed = service
        .seal(b"sealed under a master that will die", &ctx(&[("entryId", "1")]), None)
        .unwrap();
    provider.rotate_master().unwrap();
    let survivor = service
        .seal(b"sealed under the new master", &ctx(&[("entryId", "2")]), None)
        .unwrap();
    provider.retire(1);
    provider.rotate_master().unwrap();

    let outcomes = coordinator.rotate_batch(&[
        ("entry-1".to_string(), doomed),
        ("entry-2".to_string(), survivor),
    ]);

    assert_eq!(outcomes[0].0, "entry-1");
    assert!(outcomes[0].1.is_err());
    assert_eq!(outcomes[1].0, "entry-2");
    let rotated = outcomes[1].1.as_ref().unwrap();
    assert_eq!(
        service.open(rotated, Some(&ctx(&[("entryId", "2")]))).unwrap(),
        b"sealed under the new master"
    );
}

#[test]
fn concurrent_seal_open_against_shared_provider() {
    let (_, service, _) = setup();
    let service = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                let context = ctx(&[("entryId", &i.to_string())]);
                let body = format!("entry body {i}");
                for _ in 0..25 {
                    let envelope = service.seal(body.as_bytes(), &context, None).unwrap();
                    let plaintext = service.open(&envelope, Some(&context)).unwrap();
                    assert_eq!(plaintext, body.as_bytes());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn services_with_distinct_configs_do_not_interfere() {
    let provider = Arc::new(LocalKeyProvider::new().unwrap());
    let default_svc = EnvelopeService::new(provider.clone());
    let misconfigured = EnvelopeService::with_config(
        provider,
        CryptoConfig {
            version: 9,
            algorithm: ALGORITHM_AES_256_GCM.to_string(),
        },
    );

    let context = ctx(&[("entryId", "1")]);
    assert!(misconfigured.seal(b"x", &context, None).is_err());
    let envelope = default_svc.seal(b"x", &context, None).unwrap();
    assert_eq!(default_svc.open(&envelope, Some(&context)).unwrap(), b"x");
}
