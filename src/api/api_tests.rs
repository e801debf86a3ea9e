#[cfg(test)]
mod answer_handler_tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::api::{app_state::AppState, create_router};
    use crate::generation::ExtractiveGenerator;
    use crate::index::{HashingEmbeddingModel, KnowledgeBase, VectorIndex};
    use crate::observability::AppMetrics;
    use crate::services::pipeline::{DEFAULT_TOP_K, create_answer_service};
    use crate::storage::repository::MemoryConversationStore;
    use crate::synonyms::{Normalizer, SynonymEntry, SynonymTable};

    const KNOWLEDGE: &str = "La oficina abre a las 8 de la mañana.\n\n\
        El soporte se atiende por correo electrónico.\n\n\
        Los pagos se realizan con tarjeta.";

    async fn app_with_knowledge(text: Option<&str>) -> Router {
        let table = SynonymTable::from_entries(vec![SynonymEntry::new(
            "horario",
            &["hora", "abre"],
        )]);

        let index: Option<Arc<dyn VectorIndex>> = match text {
            Some(text) => Some(Arc::new(
                KnowledgeBase::from_text("conocimiento.txt", text)
                    .build_index(Box::new(HashingEmbeddingModel::new(64)))
                    .await
                    .unwrap(),
            )),
            None => None,
        };

        let service = create_answer_service(
            Normalizer::new(Arc::new(table)),
            Arc::new(MemoryConversationStore::new()),
            index,
            Arc::new(ExtractiveGenerator::new()),
            DEFAULT_TOP_K,
        );

        create_router(AppState::new(service, Arc::new(AppMetrics::default())))
    }

    async fn app() -> Router {
        app_with_knowledge(Some(KNOWLEDGE)).await
    }

    fn post_answer(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/answer")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_answer_returns_200_with_history() {
        let response = app()
            .await
            .oneshot(post_answer(json!({"question": "¿A qué hora abre?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(!body["response"].as_str().unwrap().is_empty());
        assert!(!body["conversationId"].as_str().unwrap().is_empty());

        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["role"], "human");
        assert_eq!(history[0]["content"], "¿A qué hora abre?");
        assert_eq!(history[0]["sequence"], 0);
        assert_eq!(history[1]["role"], "ai");
        assert_eq!(history[1]["sequence"], 1);
    }

    #[tokio::test]
    async fn test_answer_accepts_prompt_alias_and_omits_history() {
        let response = app()
            .await
            .oneshot(post_answer(json!({"prompt": "pagos", "includeHistory": false})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body.get("history").is_none());
        assert!(body["conversationId"].is_string());
    }

    #[tokio::test]
    async fn test_answer_continues_conversation() {
        let app = app().await;

        let first = body_json(
            app.clone()
                .oneshot(post_answer(json!({"question": "soporte"})))
                .await
                .unwrap(),
        )
        .await;
        let id = first["conversationId"].as_str().unwrap().to_string();

        let second = app
            .clone()
            .oneshot(post_answer(json!({"question": "pagos", "conversationId": id})))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let second = body_json(second).await;
        assert_eq!(second["conversationId"], id.as_str());
        assert_eq!(second["history"].as_array().unwrap().len(), 4);

        let stored = app
            .oneshot(get(&format!("/api/v1/conversations/{}", id)))
            .await
            .unwrap();
        assert_eq!(stored.status(), StatusCode::OK);
        let stored = body_json(stored).await;
        assert_eq!(stored["conversationId"], id.as_str());
        let roles: Vec<&str> = stored["history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["human", "ai", "human", "ai"]);
    }

    #[tokio::test]
    async fn test_answer_returns_400_for_empty_question() {
        let app = app().await;

        for body in [json!({"question": ""}), json!({"question": "   "}), json!({})] {
            let response = app.clone().oneshot(post_answer(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response).await;
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_answer_returns_400_for_malformed_body() {
        let app = app().await;

        let wrong_type = app
            .clone()
            .oneshot(post_answer(json!({"question": 5})))
            .await
            .unwrap();
        assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);
        let body = body_json(wrong_type).await;
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["details"].is_string());
        assert!(body["request_id"].is_string());

        let not_json = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/answer")
                    .header("Content-Type", "application/json")
                    .body(Body::from("question=hola"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(not_json).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_answer_returns_500_without_knowledge_base() {
        let response = app_with_knowledge(None)
            .await
            .oneshot(post_answer(json!({"question": "horario"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "COLLABORATOR_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_partitions_returns_indexed_chunks() {
        let response = app().await.oneshot(get("/api/v1/partitions")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 3);
        assert_eq!(
            body["partitions"][0],
            "La oficina abre a las 8 de la mañana."
        );
    }

    #[tokio::test]
    async fn test_partitions_empty_without_knowledge_base() {
        let response = app_with_knowledge(None)
            .await
            .oneshot(get("/api/v1/partitions"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, json!({"partitions": [], "total": 0}));
    }

    #[tokio::test]
    async fn test_get_conversation_returns_404_for_unknown_id() {
        let response = app()
            .await
            .oneshot(get("/api/v1/conversations/does-not-exist"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
