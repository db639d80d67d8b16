use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use askd::engine::router::{QueryRouter, Selection};
use askd::engine::{Engine, Reply};
use askd::generator::GenerationError;
use askd::generator::mock::MockGenerator;

fn build_router(replies: Vec<Result<serde_json::Value, GenerationError>>) -> (QueryRouter, Arc<MockGenerator>) {
    let generator = Arc::new(MockGenerator::new(replies));
    let router = QueryRouter::with_generator(generator.clone());
    (router, generator)
}

#[tokio::test]
async fn calculate_routes_to_calculator() {
    let (router, generator) = build_router(vec![]);

    let reply = router.route("calculate 2 + 2").await;
    assert_eq!(reply, Reply::Text("The result is: 4".to_string()));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn division_by_zero_is_text() {
    let (router, _) = build_router(vec![]);

    let reply = router.route("calculate 10 / 0").await;
    assert!(reply.as_text().unwrap().starts_with("Error in calculation:"));
}

#[tokio::test]
async fn define_routes_to_dictionary() {
    let (router, generator) = build_router(vec![]);

    let reply = router.route("define ai").await;
    assert_eq!(
        reply,
        Reply::Text(
            "Definition of ai:\nArtificial Intelligence is the simulation of human intelligence in machines."
                .to_string()
        )
    );

    let reply = router.route("define xyz").await;
    assert_eq!(
        reply,
        Reply::Text("Definition of xyz:\nDefinition not found.".to_string())
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn calculate_checked_before_define() {
    let (router, _) = build_router(vec![]);
    assert_eq!(router.select("define calculate").name(), "calculator");
}

#[tokio::test]
async fn other_queries_go_to_generator() {
    let output = json!([{"generated_text": "Once upon a time"}]);
    let (router, generator) = build_router(vec![Ok(output.clone())]);

    let reply = router.route("Once upon a time").await;
    assert_eq!(reply, Reply::Json(output));
    assert_eq!(generator.prompts(), vec!["Once upon a time".to_string()]);
}

#[tokio::test]
async fn generator_gets_the_raw_query() {
    let (router, generator) = build_router(vec![Ok(json!("ok"))]);

    router.answer("  Tell Me A Story ").await;
    assert_eq!(generator.prompts(), vec!["  Tell Me A Story ".to_string()]);
}

#[tokio::test]
async fn generator_errors_become_text() {
    let (router, _) = build_router(vec![
        Err(GenerationError::MissingCredential),
        Err(GenerationError::Status {
            code: 503,
            body: "model loading".to_string(),
        }),
        Err(GenerationError::Timeout(Duration::from_secs(10))),
    ]);

    assert_eq!(
        router.route("hello").await,
        Reply::Text("API key not found! Please set HUGGING_FACE_API_KEY.".to_string())
    );
    assert_eq!(
        router.route("hello").await,
        Reply::Text("Error 503: model loading".to_string())
    );
    assert_eq!(
        router.route("hello").await,
        Reply::Text("Request timed out after 10s".to_string())
    );
}

#[tokio::test]
async fn selection_is_deterministic() {
    let (router, _) = build_router(vec![]);

    for query in ["calculate 1", "define ai", "hello there", "CALCULATE", ""] {
        let first = router.select(query).name().to_string();
        for _ in 0..5 {
            assert_eq!(router.select(query).name(), first);
        }
    }
    assert!(matches!(router.select("hello"), Selection::Generator));
}
