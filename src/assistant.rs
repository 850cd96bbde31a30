//! Question answering flow
//!
//! question → related spots → model → map markers rewritten into links.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::answer::rewrite_markers;
use crate::catalog::{Catalog, Spot};
use crate::map_link::MapLinkResolver;
use crate::model::AnswerModel;
use crate::{Result, TravelGuideError};

/// Reference data sent along with a question
#[derive(Debug, Serialize)]
pub struct QueryContext<'a> {
    pub prompt: &'a str,
    pub related_spots: Vec<&'a Spot>,
}

impl<'a> QueryContext<'a> {
    #[must_use]
    pub fn build(catalog: &'a Catalog, question: &'a str, limit: usize) -> Self {
        Self {
            prompt: question,
            related_spots: catalog.search(question, limit),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// System instruction carrying the reference data
#[must_use]
pub fn system_instruction(context_json: &str) -> String {
    format!("你是一个旅游助手，这是已知的参考数据：{context_json},判断问题合法性，并给用户作出回答")
}

/// User message wrapping the question
#[must_use]
pub fn user_message(question: &str) -> String {
    format!("请根据提供的参考数据回答问题，问题：{question}")
}

/// Answers travel questions from the shared catalog and a language model
#[derive(Clone)]
pub struct TravelAssistant {
    catalog: Arc<Catalog>,
    resolver: MapLinkResolver,
    model: Arc<dyn AnswerModel>,
    search_limit: usize,
}

impl TravelAssistant {
    pub fn new(
        catalog: Arc<Catalog>,
        resolver: MapLinkResolver,
        model: Arc<dyn AnswerModel>,
        search_limit: usize,
    ) -> Self {
        Self {
            catalog,
            resolver,
            model,
            search_limit,
        }
    }

    /// Answer `question`, with every map marker in the reply resolved to a link.
    ///
    /// An upstream failure is returned as is; no partial answer is produced.
    pub async fn answer(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(TravelGuideError::validation("问题不能为空"));
        }
        info!("Received question: {}", question);

        let context = QueryContext::build(&self.catalog, question, self.search_limit);
        debug!("Found {} related spots", context.related_spots.len());
        let context_json = context.to_json()?;

        let reply = self
            .model
            .complete(&system_instruction(&context_json), &user_message(question))
            .await?;

        let answer = rewrite_markers(&reply, &self.resolver);
        info!("Answer ready ({} chars)", answer.chars().count());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingModel {
        reply: String,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl AnswerModel for RecordingModel {
        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    #[async_trait::async_trait]
    impl AnswerModel for FailingModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Err(TravelGuideError::api("status 503"))
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::from_categories(vec![
            (
                Category::Scenic,
                vec![Spot::new("蓬莱阁", Category::Scenic).with_detail("地址", "蓬莱区")],
            ),
            (Category::Romantic, vec![Spot::new("月亮湾", Category::Romantic)]),
            (Category::Family, vec![]),
        ]))
    }

    fn assistant(model: Arc<dyn AnswerModel>) -> TravelAssistant {
        TravelAssistant::new(
            catalog(),
            MapLinkResolver::new(Some("test_gaode_key")).unwrap(),
            model,
            5,
        )
    }

    #[test]
    fn test_context_json_keeps_chinese_and_labels() {
        let catalog = catalog();
        let context = QueryContext::build(&catalog, "蓬莱", 5);
        assert_eq!(
            context.to_json().unwrap(),
            r#"{"prompt":"蓬莱","related_spots":[{"景点名称":"蓬莱阁","分类":"经典景点","地址":"蓬莱区"}]}"#
        );
    }

    #[test]
    fn test_context_without_matches() {
        let catalog = catalog();
        let context = QueryContext::build(&catalog, "烟台有什么好玩的", 5);
        assert!(context.related_spots.is_empty());
    }

    #[tokio::test]
    async fn test_answer_rewrites_markers() {
        let model = Arc::new(RecordingModel {
            reply: "推荐@map:烟台:蓬莱阁 日出很美".to_string(),
            ..RecordingModel::default()
        });
        let answer = assistant(model.clone()).answer("蓬莱阁").await.unwrap();

        assert_eq!(
            answer,
            "推荐🔍 地图跳转：https://uri.amap.com/search?keywords=蓬莱阁&city=烟台&callnative=1 日出很美"
        );

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, user) = &calls[0];
        assert!(system.starts_with("你是一个旅游助手，这是已知的参考数据："));
        assert!(system.contains(r#""景点名称":"蓬莱阁""#));
        assert_eq!(user, "请根据提供的参考数据回答问题，问题：蓬莱阁");
    }

    #[tokio::test]
    async fn test_answer_propagates_upstream_failure() {
        let err = assistant(Arc::new(FailingModel))
            .answer("蓬莱阁")
            .await
            .unwrap_err();
        assert!(matches!(err, TravelGuideError::Api { .. }));
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected_without_model_call() {
        let model = Arc::new(RecordingModel::default());
        let err = assistant(model.clone()).answer("   ").await.unwrap_err();
        assert!(matches!(err, TravelGuideError::Validation { .. }));
        assert!(model.calls.lock().unwrap().is_empty());
    }
}
