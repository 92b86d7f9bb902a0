//! Integration tests for credential and model fallback.

mod common;

use std::sync::Arc;

use advocate::providers::FallbackOrchestrator;
use advocate::{AdvocateError, CredentialRotator};

use common::{FULL_REPLY, ScriptedProvider, models, quota};

fn orchestrator(provider: Arc<ScriptedProvider>, keys: &[&str]) -> FallbackOrchestrator {
    let rotator = Arc::new(CredentialRotator::new(keys.iter().copied()).unwrap());
    FallbackOrchestrator::new(provider, rotator, models()).unwrap()
}

// ============================================================================
// Credential-scoped failures
// ============================================================================

#[tokio::test]
async fn all_credentials_out_of_quota_fails_after_one_cycle() {
    let provider = ScriptedProvider::failing(quota);
    let orch = orchestrator(provider.clone(), &["k1", "k2", "k3"]);

    let err = orch.generate("prompt").await.unwrap_err();

    assert!(matches!(
        err,
        AdvocateError::ProvidersExhausted { last_error: Some(_) }
    ));
    // Quota skips the remaining models: one attempt per credential.
    assert_eq!(
        provider.calls(),
        vec![
            (0, "model-a".to_string()),
            (1, "model-a".to_string()),
            (2, "model-a".to_string()),
        ]
    );
    // Three rotations bring the index back to where it started.
    assert_eq!(orch.rotator().current_index(), 0);
}

#[tokio::test]
async fn exhaustion_cycle_starts_at_current_credential() {
    let provider = ScriptedProvider::failing(quota);
    let orch = orchestrator(provider.clone(), &["k1", "k2", "k3"]);
    orch.rotator().advance();

    orch.generate("prompt").await.unwrap_err();

    let order: Vec<usize> = provider.calls().into_iter().map(|(k, _)| k).collect();
    assert_eq!(order, vec![1, 2, 0]);
    assert_eq!(orch.rotator().current_index(), 1);
}

#[tokio::test]
async fn invalid_credential_rotates_and_sticks_to_working_key() {
    let provider = ScriptedProvider::new(|key, _| {
        if key == 0 {
            Err(AdvocateError::AuthenticationFailed("API key not valid".into()))
        } else {
            Ok(FULL_REPLY.to_string())
        }
    });
    let orch = orchestrator(provider.clone(), &["bad", "good"]);

    let generation = orch.generate("prompt").await.unwrap();

    assert_eq!(generation.credential_ordinal, 2);
    assert_eq!(generation.model, "model-a");
    assert_eq!(provider.call_count(), 2);
    assert_eq!(orch.rotator().current_index(), 1);

    // The next request starts on the working key.
    orch.generate("prompt").await.unwrap();
    assert_eq!(provider.calls()[2], (1, "model-a".to_string()));
}

#[tokio::test]
async fn unstructured_quota_message_rotates() {
    let provider = ScriptedProvider::new(|key, _| {
        if key == 0 {
            Err(AdvocateError::Provider(
                "429 Resource has been exhausted (e.g. check quota).".into(),
            ))
        } else {
            Ok(FULL_REPLY.to_string())
        }
    });
    let orch = orchestrator(provider.clone(), &["k1", "k2"]);

    let generation = orch.generate("prompt").await.unwrap();
    assert_eq!(generation.credential_ordinal, 2);
    assert_eq!(provider.call_count(), 2);
}

// ============================================================================
// Model-scoped failures
// ============================================================================

#[tokio::test]
async fn missing_model_falls_through_to_next_model() {
    let provider = ScriptedProvider::new(|_, model| {
        if model == "model-a" {
            Err(AdvocateError::ModelNotFound(model.to_string()))
        } else {
            Ok(FULL_REPLY.to_string())
        }
    });
    let orch = orchestrator(provider.clone(), &["k1", "k2"]);

    let generation = orch.generate("prompt").await.unwrap();

    assert_eq!(generation.credential_ordinal, 1);
    assert_eq!(generation.model, "model-b");
    assert_eq!(
        provider.calls(),
        vec![(0, "model-a".to_string()), (0, "model-b".to_string())]
    );
    assert_eq!(orch.rotator().current_index(), 0, "no rotation");
}

#[tokio::test]
async fn transient_error_tries_next_model() {
    let provider = ScriptedProvider::new(|_, model| {
        if model == "model-a" {
            Err(AdvocateError::Http("connection reset".into()))
        } else {
            Ok(FULL_REPLY.to_string())
        }
    });
    let orch = orchestrator(provider.clone(), &["k1"]);

    let generation = orch.generate("prompt").await.unwrap();
    assert_eq!(generation.model, "model-b");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn empty_reply_is_a_soft_failure() {
    let provider = ScriptedProvider::new(|_, model| {
        if model == "model-a" {
            Ok("   ".to_string())
        } else {
            Ok(FULL_REPLY.to_string())
        }
    });
    let orch = orchestrator(provider.clone(), &["k1"]);

    let generation = orch.generate("prompt").await.unwrap();
    assert_eq!(generation.model, "model-b");
    assert_eq!(generation.text, FULL_REPLY);
}

#[tokio::test]
async fn every_model_failing_rotates_through_all_credentials() {
    let provider = ScriptedProvider::failing(|| AdvocateError::Api {
        status: 500,
        message: "internal".into(),
    });
    let orch = orchestrator(provider.clone(), &["k1", "k2"]);

    let err = orch.generate("prompt").await.unwrap_err();

    // Two credentials × two models.
    assert_eq!(provider.call_count(), 4);
    match err {
        AdvocateError::ProvidersExhausted { last_error } => {
            assert!(last_error.unwrap().contains("internal"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn single_credential_exhausts_after_its_models() {
    let provider = ScriptedProvider::failing(quota);
    let orch = orchestrator(provider.clone(), &["only"]);

    assert!(orch.generate("prompt").await.is_err());
    assert_eq!(provider.call_count(), 1);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_exhaustion_advances_once() {
    let provider = ScriptedProvider::new(|key, _| {
        if key == 0 {
            Err(quota())
        } else {
            Ok(FULL_REPLY.to_string())
        }
    });
    let orch = Arc::new(orchestrator(provider.clone(), &["k1", "k2", "k3"]));

    let (a, b) = tokio::join!(
        {
            let orch = orch.clone();
            async move { orch.generate("a").await }
        },
        {
            let orch = orch.clone();
            async move { orch.generate("b").await }
        }
    );

    assert_eq!(a.unwrap().credential_ordinal, 2);
    assert_eq!(b.unwrap().credential_ordinal, 2);
    assert_eq!(orch.rotator().current_index(), 1, "key 2 was not skipped");
}

#[test]
fn empty_model_list_is_rejected() {
    let rotator = Arc::new(CredentialRotator::new(["k1"]).unwrap());
    let result = FallbackOrchestrator::new(ScriptedProvider::answering(), rotator, Vec::new());
    assert!(matches!(result, Err(AdvocateError::Configuration(_))));
}
