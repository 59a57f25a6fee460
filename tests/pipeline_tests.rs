use std::sync::Arc;

use eatwise::errors::PipelineError;
use eatwise::handlers::APOLOGY;
use eatwise::intent::{Intent, IntentClassifier};
use eatwise::pipeline::{ConversationState, SpeechStage, StateDelta};
use eatwise::services::search::{Place, ShoppingItem};
use eatwise::test_utils::{RecordingSynthesizer, ScriptedGenerator, StaticGrocery, StaticPlaces, TestKit};
use eatwise::PipelineRuntime;

#[tokio::test]
async fn test_classifier_always_yields_a_label() {
    let outputs = ["LOG", "shop please", "CHAT", "", "Hello! How can I help?", "eat", "I think ASK"];
    for raw in outputs {
        let llm = Arc::new(ScriptedGenerator::new(move |_| Ok(raw.to_string())));
        let intent = IntentClassifier::new(llm).classify("anything").await.unwrap();
        assert!(Intent::PRIORITY.contains(&intent), "{raw:?} -> {intent:?}");
    }

    let chat = Arc::new(ScriptedGenerator::new(|_| Ok("CHAT".to_string())));
    assert_eq!(IntentClassifier::new(chat).classify("hi there").await.unwrap(), Intent::Ask);
}

#[tokio::test]
async fn test_log_scenario() {
    let kit = TestKit::default();
    let state = kit.pipeline().invoke("I ate an apple", false).await;

    assert_eq!(state.intent(), Intent::Log);
    assert!(state.response_text().contains("apple"));
    assert_eq!(state.response_text(), "Tracking: I've logged **apple** to your daily intake.");
    assert_eq!(state.audio_path(), None);
    assert_eq!(state.error(), None);

    let entries = kit.food_log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "apple");
    assert_eq!(entries[0].1, serde_json::json!({ "source": "user_input" }));

    // Exactly one handler ran: classify + one extraction
    assert_eq!(kit.llm.calls(), 2);
}

#[tokio::test]
async fn test_dietary_scenario_uses_no_web() {
    let kit = TestKit::default();
    let state = kit.pipeline().invoke("how much vitamin d do I need", false).await;

    assert_eq!(state.intent(), Intent::Ask);
    assert!(state.response_text().contains("Official Dietary Guidelines"));
    assert!(state.response_text().contains("10 mcg"));
    assert_eq!(kit.web.calls(), 0);
}

#[tokio::test]
async fn test_web_scenario_learns_fact() {
    let kit = TestKit::default();
    let state = kit.pipeline().invoke("tell me about dragon fruit", true).await;

    assert_eq!(state.intent(), Intent::Ask);
    assert!(state.response_text().contains("Learned from Web"));
    assert_eq!(kit.web.calls(), 1);
    assert!(kit.knowledge.contains_id("learned_tell_me_about_dragon_fruit").await);
    assert_eq!(state.audio_path(), Some("/static/audio/response_test.mp3"));

    // Second turn is served from the cache
    let again = kit.pipeline().invoke("tell me about dragon fruit", false).await;
    assert!(again.response_text().contains("Learned Knowledge"));
    assert_eq!(kit.web.calls(), 1);
}

#[tokio::test]
async fn test_shop_falls_back_to_organic_results() {
    let kit = TestKit::default();
    let state = kit.pipeline().invoke("buy noodles", false).await;

    assert_eq!(state.intent(), Intent::Shop);
    assert!(state.response_text().starts_with("**Grocery Search Results:**"));
    assert_eq!(kit.web.queries(), vec!["Buy noodles supermarkets London"]);
}

#[tokio::test]
async fn test_shop_lists_index_items() {
    let items = vec![ShoppingItem {
        title: Some("Tesco Noodles".into()),
        price: Some("£0.65".into()),
        source: Some("Tesco".into()),
    }];
    let kit = TestKit { grocery: Arc::new(StaticGrocery(items)), ..TestKit::default() };
    let state = kit.pipeline().invoke("buy noodles", false).await;

    assert_eq!(state.response_text(), "**Grocery Suggestions:**\n- Tesco Noodles (£0.65) @ Tesco\n");
    assert_eq!(kit.web.calls(), 0);
}

#[tokio::test]
async fn test_eat_formats_places_or_not_found() {
    let kit = TestKit::default();
    let state = kit.pipeline().invoke("restaurant serving vegan", false).await;
    assert_eq!(state.intent(), Intent::Eat);
    assert_eq!(state.response_text(), "I couldn't find any restaurants matching 'vegan' in London.");

    let places = vec![Place { title: Some("Mildreds".into()), rating: Some(4.5), address: Some("45 Lexington St".into()) }];
    let kit = TestKit { places: Arc::new(StaticPlaces(places)), ..TestKit::default() };
    let state = kit.pipeline().invoke("restaurant serving vegan", false).await;
    assert_eq!(
        state.response_text(),
        "**Restaurant Recommendations for vegan (London):**\n- **Mildreds** (⭐4.5): 45 Lexington St\n"
    );
}

#[tokio::test]
async fn test_generator_outage_still_answers() {
    let kit = TestKit { llm: Arc::new(ScriptedGenerator::failing()), ..TestKit::default() };
    let state = kit.pipeline().invoke("is keto healthy", false).await;

    // Classification failed, so the turn was routed to ASK, which failed too
    assert_eq!(state.intent(), Intent::Ask);
    assert_eq!(state.response_text(), APOLOGY);
    let error = state.error().unwrap_or_default();
    assert!(error.contains("classification failed"));
    assert!(error.contains("offline"));
}

#[tokio::test]
async fn test_persona_failure_is_caught() {
    let llm = ScriptedGenerator::new(|prompt| {
        if prompt.starts_with("You are EatWise") {
            Err(eatwise::errors::ServiceError::MissingCredential("openai chat"))
        } else {
            Ok(eatwise::test_utils::nutrition_script(prompt))
        }
    });
    let kit = TestKit { llm: Arc::new(llm), ..TestKit::default() };
    let state = kit.pipeline().invoke("how much vitamin c", false).await;

    assert_eq!(state.response_text(), APOLOGY);
    assert!(state.error().is_some());
}

#[tokio::test]
async fn test_voice_disabled_never_synthesizes() {
    let kit = TestKit::default();
    let state = kit.pipeline().invoke("I ate an apple", false).await;

    assert_eq!(state.audio_path(), None);
    assert!(kit.synthesizer.texts().is_empty());
}

#[tokio::test]
async fn test_long_response_is_truncated_for_speech() {
    let synthesizer = Arc::new(RecordingSynthesizer::default());
    let stage = SpeechStage::new(synthesizer.clone());

    let mut state = ConversationState::new("q", true);
    state.reduce(StateDelta::Responded(format!("**{}**", "a".repeat(1500))));
    stage.run(&mut state).await;

    let texts = synthesizer.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].chars().count() <= 1000);
    assert!(texts[0].ends_with("..."));
    assert!(!texts[0].contains('*'));
    assert!(state.audio_path().is_some());
}

#[tokio::test]
async fn test_speech_failure_keeps_response() {
    let kit = TestKit { synthesizer: Arc::new(RecordingSynthesizer::failing()), ..TestKit::default() };
    let state = kit.pipeline().invoke("I ate an apple", true).await;

    assert!(state.response_text().contains("apple"));
    assert_eq!(state.audio_path(), None);
    assert!(state.error().unwrap_or_default().starts_with("Voice failed"));
}

#[tokio::test]
async fn test_runtime_requires_initialization() {
    let runtime = PipelineRuntime::new();
    let result = runtime.invoke("I ate an apple", false).await;
    assert!(matches!(result, Err(PipelineError::NotInitialized)));

    let kit = TestKit::default();
    runtime.initialize(kit.pipeline()).unwrap();
    assert!(matches!(runtime.initialize(kit.pipeline()), Err(PipelineError::AlreadyInitialized)));

    let state = runtime.invoke("I ate an apple", false).await.unwrap();
    assert_eq!(state.intent(), Intent::Log);
}
