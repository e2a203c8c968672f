//! Model catalog.
//!
//! The narrow interface through which the core sees the external model
//! store: schemas keyed by opaque string ids, with a get/list/create/
//! update/delete surface and cursor-style listing. [`InMemoryCatalog`] is a
//! reference implementation for tests and embedded use; production callers
//! plug in their own store behind [`ModelCatalog`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::LlmError;

/// What a model is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    ChatCompletion,
    TextEmbedding,
    Rerank,
}

/// Description of one model known to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSchema {
    /// Opaque catalog id.
    pub model_id: String,
    /// Display name.
    pub name: String,
    /// The id the serving vendor knows this model by.
    pub provider_model_id: String,
    /// What the model is for.
    pub model_type: ModelType,
    /// Vendor-specific properties (context length, embedding size, ...).
    #[serde(default)]
    pub properties: HashMap<String, Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Checks that a schema names a chat-completion model.
///
/// Run before `prepare_request` so that e.g. an embedding model id fails
/// synchronously, never reaching the network.
pub fn ensure_chat_model(schema: &ModelSchema) -> Result<(), LlmError> {
    if schema.model_type != ModelType::ChatCompletion {
        return Err(LlmError::UnsupportedConfiguration(format!(
            "model {} is not a chat completion model",
            schema.model_id
        )));
    }
    Ok(())
}

/// Listing order, by creation time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Cursor-style listing query.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Maximum number of items to return.
    pub limit: usize,
    pub order: SortOrder,
    /// Return items after this model id. Must name an existing model.
    pub after: Option<String>,
    /// Return items before this model id. Must name an existing model.
    pub before: Option<String>,
    /// Case-sensitive name prefix filter.
    pub name_prefix: Option<String>,
}

impl ListQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    /// Total matching items, across all pages.
    pub total: usize,
    pub has_more: bool,
}

/// Fields of a schema that may change after creation.
#[derive(Debug, Clone, Default)]
pub struct ModelUpdate {
    pub name: Option<String>,
    pub properties: Option<HashMap<String, Value>>,
}

/// The external model store, seen through opaque string ids.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn get(&self, model_id: &str) -> Result<ModelSchema, LlmError>;

    async fn list(&self, query: ListQuery) -> Result<ListResult<ModelSchema>, LlmError>;

    async fn create(
        &self,
        name: String,
        provider_model_id: String,
        model_type: ModelType,
        properties: HashMap<String, Value>,
    ) -> Result<ModelSchema, LlmError>;

    async fn update(&self, model_id: &str, update: ModelUpdate) -> Result<ModelSchema, LlmError>;

    async fn delete(&self, model_id: &str) -> Result<(), LlmError>;
}

/// In-memory catalog, for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    models: RwLock<Vec<ModelSchema>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn position_of(models: &[ModelSchema], model_id: &str) -> Result<usize, LlmError> {
        models
            .iter()
            .position(|m| m.model_id == model_id)
            .ok_or_else(|| LlmError::NotFound(format!("model {model_id} not found")))
    }
}

#[async_trait]
impl ModelCatalog for InMemoryCatalog {
    async fn get(&self, model_id: &str) -> Result<ModelSchema, LlmError> {
        let models = self
            .models
            .read()
            .map_err(|_| LlmError::Internal("catalog lock poisoned".to_string()))?;
        let position = Self::position_of(&models, model_id)?;
        Ok(models[position].clone())
    }

    async fn list(&self, query: ListQuery) -> Result<ListResult<ModelSchema>, LlmError> {
        let models = self
            .models
            .read()
            .map_err(|_| LlmError::Internal("catalog lock poisoned".to_string()))?;

        // Creation order is insertion order; reverse for descending.
        let mut ordered: Vec<&ModelSchema> = models
            .iter()
            .filter(|m| {
                query
                    .name_prefix
                    .as_deref()
                    .is_none_or(|prefix| m.name.starts_with(prefix))
            })
            .collect();
        if query.order == SortOrder::Desc {
            ordered.reverse();
        }
        let total = ordered.len();

        let mut start = 0;
        let mut end = ordered.len();
        if let Some(after) = &query.after {
            // The cursor must exist even if filtered out of this page.
            Self::position_of(&models, after)?;
            if let Some(position) = ordered.iter().position(|m| &m.model_id == after) {
                start = position + 1;
            }
        }
        if let Some(before) = &query.before {
            Self::position_of(&models, before)?;
            if let Some(position) = ordered.iter().position(|m| &m.model_id == before) {
                end = position;
            }
        }
        let end = end.max(start);

        let window = &ordered[start..end];
        let items: Vec<ModelSchema> = window.iter().take(query.limit).cloned().cloned().collect();
        // More pages exist only when the cursor window itself was truncated
        // by the limit; items beyond a `before` bound are excluded, not next.
        let has_more = window.len() > items.len();

        Ok(ListResult {
            items,
            total,
            has_more,
        })
    }

    async fn create(
        &self,
        name: String,
        provider_model_id: String,
        model_type: ModelType,
        properties: HashMap<String, Value>,
    ) -> Result<ModelSchema, LlmError> {
        let schema = ModelSchema {
            model_id: format!("model_{}", uuid::Uuid::new_v4().simple()),
            name,
            provider_model_id,
            model_type,
            properties,
            created_at: Utc::now(),
        };
        debug!(model_id = %schema.model_id, "created model schema");
        self.models
            .write()
            .map_err(|_| LlmError::Internal("catalog lock poisoned".to_string()))?
            .push(schema.clone());
        Ok(schema)
    }

    async fn update(&self, model_id: &str, update: ModelUpdate) -> Result<ModelSchema, LlmError> {
        let mut models = self
            .models
            .write()
            .map_err(|_| LlmError::Internal("catalog lock poisoned".to_string()))?;
        let position = Self::position_of(&models, model_id)?;
        let schema = &mut models[position];
        if let Some(name) = update.name {
            schema.name = name;
        }
        if let Some(properties) = update.properties {
            schema.properties = properties;
        }
        Ok(schema.clone())
    }

    async fn delete(&self, model_id: &str) -> Result<(), LlmError> {
        let mut models = self
            .models
            .write()
            .map_err(|_| LlmError::Internal("catalog lock poisoned".to_string()))?;
        let position = Self::position_of(&models, model_id)?;
        models.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(catalog: &InMemoryCatalog, count: usize) -> Vec<ModelSchema> {
        let mut schemas = Vec::new();
        for n in 0..count {
            schemas.push(
                catalog
                    .create(
                        format!("model-{n}"),
                        format!("vendor-model-{n}"),
                        ModelType::ChatCompletion,
                        HashMap::new(),
                    )
                    .await
                    .unwrap(),
            );
        }
        schemas
    }

    #[tokio::test]
    async fn create_get_update_delete_round_trip() {
        let catalog = InMemoryCatalog::new();
        let created = catalog
            .create(
                "assistant".to_string(),
                "llama3-70b".to_string(),
                ModelType::ChatCompletion,
                HashMap::new(),
            )
            .await
            .unwrap();
        assert!(created.model_id.starts_with("model_"));

        let fetched = catalog.get(&created.model_id).await.unwrap();
        assert_eq!(fetched, created);

        let updated = catalog
            .update(
                &created.model_id,
                ModelUpdate {
                    name: Some("renamed".to_string()),
                    properties: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.provider_model_id, "llama3-70b");

        catalog.delete(&created.model_id).await.unwrap();
        let err = catalog.get(&created.model_id).await.unwrap_err();
        assert!(matches!(err, LlmError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_paginates_with_cursors() {
        let catalog = InMemoryCatalog::new();
        let schemas = seed(&catalog, 5).await;

        let mut query = ListQuery::new(2);
        query.order = SortOrder::Asc;
        let page = catalog.list(query).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.items[0].model_id, schemas[0].model_id);

        let mut query = ListQuery::new(10);
        query.order = SortOrder::Asc;
        query.after = Some(schemas[2].model_id.clone());
        let page = catalog.list(query).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert_eq!(page.items[0].model_id, schemas[3].model_id);
    }

    #[tokio::test]
    async fn unknown_cursor_is_not_found() {
        let catalog = InMemoryCatalog::new();
        seed(&catalog, 2).await;

        let mut query = ListQuery::new(10);
        query.after = Some("model_missing".to_string());
        let err = catalog.list(query).await.unwrap_err();
        assert!(matches!(err, LlmError::NotFound(_)));
    }

    #[tokio::test]
    async fn name_prefix_filters_the_listing() {
        let catalog = InMemoryCatalog::new();
        catalog
            .create(
                "prod-chat".to_string(),
                "a".to_string(),
                ModelType::ChatCompletion,
                HashMap::new(),
            )
            .await
            .unwrap();
        catalog
            .create(
                "dev-chat".to_string(),
                "b".to_string(),
                ModelType::ChatCompletion,
                HashMap::new(),
            )
            .await
            .unwrap();

        let mut query = ListQuery::new(10);
        query.name_prefix = Some("prod-".to_string());
        let page = catalog.list(query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "prod-chat");
    }

    #[tokio::test]
    async fn embedding_models_are_rejected_for_chat() {
        let catalog = InMemoryCatalog::new();
        let embedding = catalog
            .create(
                "embedder".to_string(),
                "text-embedding-3-small".to_string(),
                ModelType::TextEmbedding,
                HashMap::new(),
            )
            .await
            .unwrap();

        let err = ensure_chat_model(&embedding).unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedConfiguration(_)));

        let chat = catalog
            .create(
                "chat".to_string(),
                "gpt-4o-mini".to_string(),
                ModelType::ChatCompletion,
                HashMap::new(),
            )
            .await
            .unwrap();
        assert!(ensure_chat_model(&chat).is_ok());
    }
}
